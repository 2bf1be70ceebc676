//! PRNG-driven sampling of ring elements.
//!
//! Two distributions feed the aggregation flow: uniform residues (the
//! public `a` polynomials) and the centered binomial (keys and errors).
//! Both consume a fixed, documented bit budget per coefficient so a seeded
//! stream always reproduces the same output.

use crate::error::{Result, SecAggError};
use crate::math::montgomery::ModulusParams;
use crate::math::word::Word;
use crate::params::MAX_VARIANCE;
use crate::prng::SecurePrng;

/// Samples `num_coeffs` uniform residues mod q.
///
/// Each coefficient draws `ceil(log₂ q / 64)` 64-bit words, masks them to
/// `log₂ q` bits and rejects until the value falls below q. The output is
/// uniform in the Montgomery domain and may be used directly in either
/// polynomial representation.
pub fn sample_uniform<W: Word>(
    num_coeffs: usize,
    prng: &mut dyn SecurePrng,
    modulus: &ModulusParams<W>,
) -> Result<Vec<W>> {
    let q = modulus.modulus();
    let log_modulus = modulus.log_modulus();
    let words = ((log_modulus + 63) / 64) as usize;
    let mask = (W::ONE << log_modulus).wrapping_sub(W::ONE);

    let mut coeffs = Vec::with_capacity(num_coeffs);
    for _ in 0..num_coeffs {
        loop {
            let mut value = W::ZERO;
            for i in 0..words {
                value = value | (W::from_u64(prng.rand64()?) << (64 * i as u32));
            }
            value = value & mask;
            if value < q {
                coeffs.push(value);
                break;
            }
        }
    }
    Ok(coeffs)
}

/// Samples `num_coeffs` coefficients from the centered binomial
/// distribution with the given variance, reduced mod q and imported to the
/// Montgomery domain.
///
/// Per coefficient, `2·variance` bit-pairs are consumed: the popcount of
/// one draw is added and the popcount of a second subtracted, 64 bits at a
/// time, then 8, then a masked tail of 1-7 bits. Small negatives land at
/// `q - |x|`.
///
/// # Errors
///
/// `InvalidArgument` when the variance exceeds [`MAX_VARIANCE`].
pub fn sample_centered_binomial<W: Word>(
    num_coeffs: usize,
    variance: u64,
    prng: &mut dyn SecurePrng,
    modulus: &ModulusParams<W>,
) -> Result<Vec<W>> {
    if variance > MAX_VARIANCE {
        return Err(SecAggError::invalid(format!(
            "variance {} exceeds the maximum {}",
            variance, MAX_VARIANCE
        )));
    }

    let q = modulus.modulus();
    let mut coeffs = Vec::with_capacity(num_coeffs);
    for _ in 0..num_coeffs {
        // Accumulate around q so intermediate values never go negative;
        // a single conditional subtraction lands the result in [0, q).
        let mut c = q;
        let mut k = variance << 1;
        while k > 0 {
            if k >= 64 {
                c = c.wrapping_add(W::from_u64(prng.rand64()?.count_ones() as u64));
                c = c.wrapping_sub(W::from_u64(prng.rand64()?.count_ones() as u64));
                k -= 64;
            } else if k >= 8 {
                c = c.wrapping_add(W::from_u64(prng.rand8()?.count_ones() as u64));
                c = c.wrapping_sub(W::from_u64(prng.rand8()?.count_ones() as u64));
                k -= 8;
            } else {
                let mask = (1u8 << k) - 1;
                c = c.wrapping_add(W::from_u64((prng.rand8()? & mask).count_ones() as u64));
                c = c.wrapping_sub(W::from_u64((prng.rand8()? & mask).count_ones() as u64));
                break;
            }
        }
        if c >= q {
            c = c.wrapping_sub(q);
        }
        coeffs.push(modulus.import_int(c));
    }
    Ok(coeffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::KEY_TRANSPORT_MODULUS;
    use crate::prng::HkdfPrng;

    fn transport_modulus() -> ModulusParams<u64> {
        ModulusParams::new(KEY_TRANSPORT_MODULUS).unwrap()
    }

    fn centered(value: u64, q: u64) -> i64 {
        if value <= q / 2 {
            value as i64
        } else {
            value as i64 - q as i64
        }
    }

    #[test]
    fn test_uniform_in_range() {
        let modulus = transport_modulus();
        let mut prng = HkdfPrng::create(&[1u8; 32]).unwrap();
        let coeffs = sample_uniform(4096, &mut prng, &modulus).unwrap();
        assert!(coeffs.iter().all(|&c| c < KEY_TRANSPORT_MODULUS));
    }

    #[test]
    fn test_uniform_deterministic() {
        let modulus = transport_modulus();
        let mut a = HkdfPrng::create(&[8u8; 32]).unwrap();
        let mut b = HkdfPrng::create(&[8u8; 32]).unwrap();
        assert_eq!(
            sample_uniform(512, &mut a, &modulus).unwrap(),
            sample_uniform(512, &mut b, &modulus).unwrap()
        );
    }

    #[test]
    fn test_uniform_wide_modulus() {
        let modulus = ModulusParams::new(crate::params::AGGREGATION_MODULUS).unwrap();
        let mut prng = HkdfPrng::create(&[2u8; 32]).unwrap();
        let coeffs = sample_uniform(1024, &mut prng, &modulus).unwrap();
        assert!(coeffs.iter().all(|&c| c < crate::params::AGGREGATION_MODULUS));
        // With an 80-bit mask over an 80-bit modulus roughly half the draws
        // land above q; the sampler must still fill every slot.
        assert_eq!(coeffs.len(), 1024);
    }

    #[test]
    fn test_binomial_bounded_by_two_variance() {
        let modulus = transport_modulus();
        let q = KEY_TRANSPORT_MODULUS;
        let variance = 20;
        let mut prng = HkdfPrng::create(&[3u8; 32]).unwrap();
        let coeffs = sample_centered_binomial(8192, variance, &mut prng, &modulus).unwrap();

        for &c in &coeffs {
            let x = centered(modulus.export_int(c), q);
            assert!(x.unsigned_abs() <= 2 * variance);
        }
    }

    #[test]
    fn test_binomial_mean_and_variance() {
        let modulus = transport_modulus();
        let q = KEY_TRANSPORT_MODULUS;
        let variance = 20u64;
        let count = 1_000_000usize;

        let mut prng = HkdfPrng::create(&[4u8; 32]).unwrap();
        let coeffs = sample_centered_binomial(count, variance, &mut prng, &modulus).unwrap();
        let samples: Vec<i64> = coeffs
            .iter()
            .map(|&c| centered(modulus.export_int(c), q))
            .collect();

        let mean = samples.iter().map(|&x| x as f64).sum::<f64>() / count as f64;
        let sigma = (variance as f64).sqrt();
        assert!(
            mean.abs() < 3.0 * sigma / (count as f64).sqrt(),
            "mean {} too far from 0",
            mean
        );

        let empirical_variance = samples
            .iter()
            .map(|&x| (x as f64 - mean).powi(2))
            .sum::<f64>()
            / count as f64;
        let relative_error = (empirical_variance - variance as f64).abs() / variance as f64;
        assert!(
            relative_error < 0.1,
            "variance {} differs from {} by {:.1}%",
            empirical_variance,
            variance,
            relative_error * 100.0
        );
    }

    #[test]
    fn test_binomial_deterministic() {
        let modulus = transport_modulus();
        let mut a = HkdfPrng::create(&[5u8; 32]).unwrap();
        let mut b = HkdfPrng::create(&[5u8; 32]).unwrap();
        assert_eq!(
            sample_centered_binomial(2048, 20, &mut a, &modulus).unwrap(),
            sample_centered_binomial(2048, 20, &mut b, &modulus).unwrap()
        );
    }

    #[test]
    fn test_binomial_tail_bits() {
        // variance 3 consumes a 6-bit budget: no 64-bit or 8-bit blocks,
        // only the masked tail path.
        let modulus = transport_modulus();
        let mut prng = HkdfPrng::create(&[6u8; 32]).unwrap();
        let coeffs = sample_centered_binomial(1024, 3, &mut prng, &modulus).unwrap();
        for &c in &coeffs {
            let x = centered(modulus.export_int(c), KEY_TRANSPORT_MODULUS);
            assert!(x.unsigned_abs() <= 6);
        }
    }

    #[test]
    fn test_binomial_variance_cap() {
        let modulus = transport_modulus();
        let mut prng = HkdfPrng::create(&[7u8; 32]).unwrap();
        assert!(matches!(
            sample_centered_binomial(16, MAX_VARIANCE + 1, &mut prng, &modulus),
            Err(SecAggError::InvalidArgument(_))
        ));
    }
}
