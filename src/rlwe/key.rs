//! RLWE secret keys.
//!
//! A secret key is a small-norm polynomial drawn from the error
//! distribution and stored in NTT form. Keys are additively homomorphic:
//! the sum of two keys decrypts the sum of ciphertexts encrypted under
//! them. Keys can also be carried across moduli through the
//! modulus-balanced conversion, which is how an aggregated key travels as a
//! compact integer vector.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SecAggError};
use crate::math::poly::{Poly, Representation};
use crate::math::sampling::sample_centered_binomial;
use crate::math::word::Word;
use crate::params::RingParams;
use crate::prng::SecurePrng;

/// Symmetric RLWE secret key, always held in NTT form.
///
/// Keys are never mutated after creation; [`add`](Self::add) returns a new
/// key.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "W: Word")]
pub struct SecretKey<W: Word> {
    key: Poly<W>,
    ring: Arc<RingParams<W>>,
    variance: u64,
    log_t: usize,
}

impl<W: Word> SecretKey<W> {
    /// Samples a fresh key from the centered binomial distribution with the
    /// given variance and stores its NTT image.
    pub fn sample(
        ring: &Arc<RingParams<W>>,
        variance: u64,
        log_t: usize,
        prng: &mut dyn SecurePrng,
    ) -> Result<Self> {
        let coeffs =
            sample_centered_binomial(ring.dimension(), variance, prng, ring.modulus())?;
        let mut key = Poly::from_montgomery(coeffs, Representation::Coefficient);
        key.forward_ntt(ring)?;
        Ok(Self {
            key,
            ring: Arc::clone(ring),
            variance,
            log_t,
        })
    }

    /// Wraps an externally supplied coefficient vector (standard-form
    /// integers mod q) as a secret key by taking its NTT image.
    pub fn from_coeffs(
        values: &[W],
        ring: &Arc<RingParams<W>>,
        variance: u64,
        log_t: usize,
    ) -> Result<Self> {
        let mut key = Poly::from_ints(values, ring)?;
        key.forward_ntt(ring)?;
        Ok(Self {
            key,
            ring: Arc::clone(ring),
            variance,
            log_t,
        })
    }

    /// The key polynomial (NTT form).
    #[inline]
    pub fn key(&self) -> &Poly<W> {
        &self.key
    }

    /// The ring this key lives in.
    #[inline]
    pub fn ring(&self) -> &Arc<RingParams<W>> {
        &self.ring
    }

    /// Variance of the distribution the key was drawn from.
    #[inline]
    pub fn variance(&self) -> u64 {
        self.variance
    }

    /// Plaintext bit-width this key encrypts under.
    #[inline]
    pub fn log_t(&self) -> usize {
        self.log_t
    }

    /// Coordinatewise key sum: `(k1 + k2).key = k1.key + k2.key mod q`.
    ///
    /// If the two operands have centered coefficients bounded by B₁ and B₂,
    /// the sum is bounded by B₁ + B₂.
    ///
    /// # Errors
    ///
    /// `ParamsMismatch` unless modulus, dimension, variance and log_t all
    /// agree.
    pub fn add(&self, other: &Self) -> Result<Self> {
        if !self.ring.compatible(&other.ring) {
            return Err(SecAggError::mismatch(
                "keys live in different rings".to_string(),
            ));
        }
        if self.variance != other.variance || self.log_t != other.log_t {
            return Err(SecAggError::mismatch(format!(
                "key parameters differ: variance {} vs {}, log_t {} vs {}",
                self.variance, other.variance, self.log_t, other.log_t
            )));
        }
        Ok(Self {
            key: self.key.add(&other.key, &self.ring)?,
            ring: Arc::clone(&self.ring),
            variance: self.variance,
            log_t: self.log_t,
        })
    }

    /// Serializes the key as integers mod p through the modulus-balanced
    /// conversion.
    ///
    /// Each coefficient c ∈ [0, q) is read as its centered representative
    /// c' ∈ (-q/2, q/2] and reduced mod p into [0, p). Small-norm keys
    /// survive the switch exactly, so sums of converted keys mod p match
    /// conversions of summed keys as long as the aggregate stays below p/2
    /// in magnitude.
    pub fn convert<V: Word>(&self, to: &RingParams<V>) -> Result<Vec<V>> {
        if to.dimension() != self.ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "target ring dimension {} does not match key dimension {}",
                to.dimension(),
                self.ring.dimension()
            )));
        }
        if to.modulus().log_modulus() > W::BITS {
            return Err(SecAggError::mismatch(
                "target modulus is wider than the key's word".to_string(),
            ));
        }

        let q = self.ring.modulus().modulus();
        let half_q = q >> 1;
        let p = W::from_u128(to.modulus().modulus().as_u128());

        let coeffs = self.key.inverse_ntt_new(&self.ring)?;
        let exported = coeffs.export(&self.ring);

        let mut out = Vec::with_capacity(exported.len());
        for c in exported {
            let reduced = if c <= half_q {
                c.rem(p)
            } else {
                // c represents the negative value -(q - c).
                let r = q.wrapping_sub(c).rem(p);
                if r == W::ZERO {
                    W::ZERO
                } else {
                    p.wrapping_sub(r)
                }
            };
            out.push(V::from_u128(reduced.as_u128()));
        }
        Ok(out)
    }

    /// Rebuilds a key over this ring from its mod-p integer vector, i.e.
    /// the inverse of [`convert`](Self::convert).
    ///
    /// Each value c ∈ [0, p) is read as its centered representative and
    /// lifted into [0, q): c when c ≤ p/2, otherwise q - (p - c).
    pub fn from_converted<V: Word>(
        values: &[V],
        from: &RingParams<V>,
        ring: &Arc<RingParams<W>>,
        variance: u64,
        log_t: usize,
    ) -> Result<Self> {
        if values.len() != ring.dimension() || from.dimension() != ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "expected {} coefficients, got {}",
                ring.dimension(),
                values.len()
            )));
        }
        if from.modulus().log_modulus() > W::BITS {
            return Err(SecAggError::mismatch(
                "source modulus is wider than the key's word".to_string(),
            ));
        }

        let q = ring.modulus().modulus();
        let p = W::from_u128(from.modulus().modulus().as_u128());
        let half_p = p >> 1;

        let lifted: Vec<W> = values
            .iter()
            .map(|&v| {
                let c = W::from_u128(v.as_u128());
                if c <= half_p {
                    c
                } else {
                    q.wrapping_sub(p.wrapping_sub(c))
                }
            })
            .collect();
        Self::from_coeffs(&lifted, ring, variance, log_t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::{
        RingParams, AGGREGATION_MODULUS, KEY_TRANSPORT_MODULUS,
    };
    use crate::prng::HkdfPrng;

    const VARIANCE: u64 = 20;
    const LOG_T: usize = 11;

    fn small_ring() -> Arc<RingParams<u128>> {
        Arc::new(RingParams::new(8, AGGREGATION_MODULUS).unwrap())
    }

    fn transport_ring() -> RingParams<u64> {
        RingParams::new(8, KEY_TRANSPORT_MODULUS).unwrap()
    }

    fn centered(c: u128, q: u128) -> i128 {
        if c <= q / 2 {
            c as i128
        } else {
            c as i128 - q as i128
        }
    }

    #[test]
    fn test_sampled_key_is_small() {
        let ring = small_ring();
        let mut prng = HkdfPrng::create(&[1u8; 32]).unwrap();
        let key = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();

        assert_eq!(key.key().representation(), Representation::Ntt);
        let coeffs = key.key().inverse_ntt_new(&ring).unwrap();
        for c in coeffs.export(&ring) {
            let x = centered(c, AGGREGATION_MODULUS);
            assert!(x.unsigned_abs() <= 2 * VARIANCE as u128);
        }
    }

    #[test]
    fn test_add_matches_coefficient_sum() {
        let ring = small_ring();
        let mut prng = HkdfPrng::create(&[2u8; 32]).unwrap();
        let k1 = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();
        let k2 = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();
        let sum = k1.add(&k2).unwrap();

        let c1 = k1.key().inverse_ntt_new(&ring).unwrap().export(&ring);
        let c2 = k2.key().inverse_ntt_new(&ring).unwrap().export(&ring);
        let cs = sum.key().inverse_ntt_new(&ring).unwrap().export(&ring);
        for i in 0..c1.len() {
            assert_eq!(cs[i], (c1[i] + c2[i]) % AGGREGATION_MODULUS);
        }
    }

    #[test]
    fn test_add_rejects_mismatched_params() {
        let ring = small_ring();
        let mut prng = HkdfPrng::create(&[3u8; 32]).unwrap();
        let k1 = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();
        let k2 = SecretKey::sample(&ring, VARIANCE + 1, LOG_T, &mut prng).unwrap();
        assert!(matches!(
            k1.add(&k2),
            Err(SecAggError::ParamsMismatch(_))
        ));
    }

    #[test]
    fn test_convert_roundtrip() {
        let ring = small_ring();
        let transport = transport_ring();
        let mut prng = HkdfPrng::create(&[4u8; 32]).unwrap();
        let key = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();

        let vector = key.convert(&transport).unwrap();
        assert!(vector.iter().all(|&v| v < KEY_TRANSPORT_MODULUS));

        let rebuilt =
            SecretKey::from_converted(&vector, &transport, &ring, VARIANCE, LOG_T).unwrap();
        assert_eq!(rebuilt.key(), key.key());
    }

    #[test]
    fn test_convert_commutes_with_add() {
        let ring = small_ring();
        let transport = transport_ring();
        let mut prng = HkdfPrng::create(&[5u8; 32]).unwrap();

        let mut sum_key = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();
        let mut sum_vector = sum_key.convert(&transport).unwrap();
        for _ in 1..8 {
            let k = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();
            let v = k.convert(&transport).unwrap();
            sum_key = sum_key.add(&k).unwrap();
            for (s, x) in sum_vector.iter_mut().zip(v) {
                *s = (*s + x) % KEY_TRANSPORT_MODULUS;
            }
        }

        assert_eq!(sum_key.convert(&transport).unwrap(), sum_vector);

        let rebuilt =
            SecretKey::from_converted(&sum_vector, &transport, &ring, VARIANCE, LOG_T)
                .unwrap();
        assert_eq!(rebuilt.key(), sum_key.key());
    }

    #[test]
    fn test_from_coeffs_centered_values() {
        // -1 mod q converts to p - 1, and back.
        let ring = small_ring();
        let transport = transport_ring();
        let n = ring.dimension();

        let mut values = vec![0u128; n];
        values[0] = 3;
        values[1] = AGGREGATION_MODULUS - 2;
        let key = SecretKey::from_coeffs(&values, &ring, VARIANCE, LOG_T).unwrap();

        let vector = key.convert(&transport).unwrap();
        assert_eq!(vector[0], 3);
        assert_eq!(vector[1], KEY_TRANSPORT_MODULUS - 2);
        assert!(vector[2..].iter().all(|&v| v == 0));
    }

    #[test]
    fn test_convert_dimension_mismatch() {
        let ring = small_ring();
        let mut prng = HkdfPrng::create(&[6u8; 32]).unwrap();
        let key = SecretKey::sample(&ring, VARIANCE, LOG_T, &mut prng).unwrap();
        let wrong = RingParams::new(7, KEY_TRANSPORT_MODULUS).unwrap();
        assert!(matches!(
            key.convert(&wrong),
            Err(SecAggError::ParamsMismatch(_))
        ));
    }
}
