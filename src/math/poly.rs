//! Ring elements of R_q = Z_q[X]/(X^n + 1) with a dual representation.
//!
//! A [`Poly`] owns exactly n Montgomery-form residues and a tag saying
//! whether they are coefficients or NTT evaluations. Operations between two
//! polynomials require the same ring and the same representation; the
//! checks are explicit and surface as errors rather than being encoded in
//! the type.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SecAggError};
use crate::math::word::Word;
use crate::params::RingParams;

/// Which domain a polynomial's values live in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Representation {
    /// Plain coefficients of powers of X.
    Coefficient,
    /// Evaluations at the odd powers of the 2n-th root of unity.
    Ntt,
}

/// Element of R_q: n Montgomery-form residues plus a representation tag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "W: Word")]
pub struct Poly<W: Word> {
    coeffs: Vec<W>,
    repr: Representation,
}

impl<W: Word> Poly<W> {
    /// The zero polynomial in coefficient form.
    pub fn zero(ring: &RingParams<W>) -> Self {
        Self {
            coeffs: vec![W::ZERO; ring.dimension()],
            repr: Representation::Coefficient,
        }
    }

    /// Wraps Montgomery-form values directly, trusting the caller's tag.
    ///
    /// Used by the samplers, whose output is already in the Montgomery
    /// domain (a uniform residue is uniform in either representation).
    pub fn from_montgomery(coeffs: Vec<W>, repr: Representation) -> Self {
        Self { coeffs, repr }
    }

    /// Imports standard-form integers as a coefficient-form polynomial.
    ///
    /// # Errors
    ///
    /// `ParamsMismatch` if the value count differs from the ring dimension.
    pub fn from_ints(values: &[W], ring: &RingParams<W>) -> Result<Self> {
        if values.len() != ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "expected {} coefficients, got {}",
                ring.dimension(),
                values.len()
            )));
        }
        Ok(Self {
            coeffs: ring.modulus().batch_import(values),
            repr: Representation::Coefficient,
        })
    }

    /// Number of stored residues.
    #[inline]
    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Current representation tag.
    #[inline]
    pub fn representation(&self) -> Representation {
        self.repr
    }

    /// Raw Montgomery-form value at index i.
    #[inline]
    pub fn coefficient(&self, i: usize) -> W {
        self.coeffs[i]
    }

    /// Raw Montgomery-form values.
    #[inline]
    pub fn coeffs(&self) -> &[W] {
        &self.coeffs
    }

    /// Standard-form values in `[0, q)`, in the current representation.
    pub fn export(&self, ring: &RingParams<W>) -> Vec<W> {
        ring.modulus().batch_export(&self.coeffs)
    }

    /// Whether every residue is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.iter().all(|&c| c == W::ZERO)
    }

    fn check_pairwise(&self, other: &Self, ring: &RingParams<W>) -> Result<()> {
        if self.len() != ring.dimension() || other.len() != ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "polynomial lengths {} and {} must equal the ring dimension {}",
                self.len(),
                other.len(),
                ring.dimension()
            )));
        }
        if self.repr != other.repr {
            return Err(SecAggError::RepresentationMismatch {
                expected: self.repr,
                found: other.repr,
            });
        }
        Ok(())
    }

    /// Coordinatewise sum; operands must share ring and representation.
    pub fn add(&self, other: &Self, ring: &RingParams<W>) -> Result<Self> {
        self.check_pairwise(other, ring)?;
        let modulus = ring.modulus();
        let coeffs = self
            .coeffs
            .iter()
            .zip(other.coeffs.iter())
            .map(|(&a, &b)| modulus.add(a, b))
            .collect();
        Ok(Self {
            coeffs,
            repr: self.repr,
        })
    }

    /// Coordinatewise difference.
    pub fn sub(&self, other: &Self, ring: &RingParams<W>) -> Result<Self> {
        self.check_pairwise(other, ring)?;
        let modulus = ring.modulus();
        let coeffs = self
            .coeffs
            .iter()
            .zip(other.coeffs.iter())
            .map(|(&a, &b)| modulus.sub(a, b))
            .collect();
        Ok(Self {
            coeffs,
            repr: self.repr,
        })
    }

    /// Coordinatewise negation.
    pub fn neg(&self, ring: &RingParams<W>) -> Self {
        let modulus = ring.modulus();
        Self {
            coeffs: self.coeffs.iter().map(|&c| modulus.neg(c)).collect(),
            repr: self.repr,
        }
    }

    /// Multiplies every residue by a Montgomery-form scalar.
    pub fn scalar_mul(&self, scalar: W, ring: &RingParams<W>) -> Self {
        let modulus = ring.modulus();
        Self {
            coeffs: self.coeffs.iter().map(|&c| modulus.mul(c, scalar)).collect(),
            repr: self.repr,
        }
    }

    /// Ring product of two polynomials.
    ///
    /// In NTT form this is the pointwise product. In coefficient form both
    /// operands are routed through the transform and the result is brought
    /// back, i.e. the negacyclic convolution.
    pub fn mul(&self, other: &Self, ring: &RingParams<W>) -> Result<Self> {
        self.check_pairwise(other, ring)?;
        match self.repr {
            Representation::Ntt => {
                let mut out = vec![W::ZERO; self.len()];
                ring.ntt()
                    .pointwise_mul(&self.coeffs, &other.coeffs, &mut out, ring.modulus());
                Ok(Self {
                    coeffs: out,
                    repr: Representation::Ntt,
                })
            }
            Representation::Coefficient => {
                let a = self.forward_ntt_new(ring)?;
                let b = other.forward_ntt_new(ring)?;
                let prod = a.mul(&b, ring)?;
                prod.inverse_ntt_new(ring)
            }
        }
    }

    /// Converts to NTT form in place.
    ///
    /// # Errors
    ///
    /// `RepresentationMismatch` if already in NTT form, `ParamsMismatch` on
    /// a dimension disagreement.
    pub fn forward_ntt(&mut self, ring: &RingParams<W>) -> Result<()> {
        if self.repr != Representation::Coefficient {
            return Err(SecAggError::RepresentationMismatch {
                expected: Representation::Coefficient,
                found: self.repr,
            });
        }
        if self.len() != ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "polynomial length {} does not match ring dimension {}",
                self.len(),
                ring.dimension()
            )));
        }
        ring.ntt().forward(&mut self.coeffs, ring.modulus());
        self.repr = Representation::Ntt;
        Ok(())
    }

    /// Converts back to coefficient form in place.
    pub fn inverse_ntt(&mut self, ring: &RingParams<W>) -> Result<()> {
        if self.repr != Representation::Ntt {
            return Err(SecAggError::RepresentationMismatch {
                expected: Representation::Ntt,
                found: self.repr,
            });
        }
        if self.len() != ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "polynomial length {} does not match ring dimension {}",
                self.len(),
                ring.dimension()
            )));
        }
        ring.ntt().inverse(&mut self.coeffs, ring.modulus());
        self.repr = Representation::Coefficient;
        Ok(())
    }

    /// Copy converted to NTT form.
    pub fn forward_ntt_new(&self, ring: &RingParams<W>) -> Result<Self> {
        let mut out = self.clone();
        out.forward_ntt(ring)?;
        Ok(out)
    }

    /// Copy converted to coefficient form.
    pub fn inverse_ntt_new(&self, ring: &RingParams<W>) -> Result<Self> {
        let mut out = self.clone();
        out.inverse_ntt(ring)?;
        Ok(out)
    }

    /// Applies the substitution X → X^power: Σ c_j X^j becomes
    /// Σ c_j X^{j·power mod 2n}, with exponents at or above n folding back
    /// with a sign flip because X^n = -1.
    ///
    /// Defined on coefficient form only; `power` must be odd (even powers
    /// are not ring automorphisms here).
    pub fn substitute(&self, power: usize, ring: &RingParams<W>) -> Result<Self> {
        if self.repr != Representation::Coefficient {
            return Err(SecAggError::RepresentationMismatch {
                expected: Representation::Coefficient,
                found: self.repr,
            });
        }
        let n = ring.dimension();
        if self.len() != n {
            return Err(SecAggError::mismatch(format!(
                "polynomial length {} does not match ring dimension {}",
                self.len(),
                n
            )));
        }
        if power % 2 == 0 || power >= 2 * n {
            return Err(SecAggError::invalid(format!(
                "substitution power {} must be odd and below 2n = {}",
                power,
                2 * n
            )));
        }

        let modulus = ring.modulus();
        let mut coeffs = vec![W::ZERO; n];
        for (j, &c) in self.coeffs.iter().enumerate() {
            let e = (j * power) % (2 * n);
            if e < n {
                coeffs[e] = c;
            } else {
                coeffs[e - n] = modulus.neg(c);
            }
        }
        Ok(Self {
            coeffs,
            repr: Representation::Coefficient,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const Q64: u64 = 1152921504606830593;

    fn make_ring(log_n: u32) -> RingParams<u64> {
        RingParams::new(log_n, Q64).unwrap()
    }

    fn poly_from(values: &[u64], ring: &RingParams<u64>) -> Poly<u64> {
        Poly::from_ints(values, ring).unwrap()
    }

    /// Schoolbook negacyclic product, for cross-checking the NTT path.
    fn naive_negacyclic_mul(a: &[u64], b: &[u64], q: u64) -> Vec<u64> {
        let n = a.len();
        let mut out = vec![0u64; n];
        for i in 0..n {
            for j in 0..n {
                let prod = ((a[i] as u128 * b[j] as u128) % q as u128) as u64;
                let k = (i + j) % n;
                if i + j < n {
                    out[k] = ((out[k] as u128 + prod as u128) % q as u128) as u64;
                } else {
                    out[k] = ((out[k] as u128 + (q - prod) as u128) % q as u128) as u64;
                }
            }
        }
        out
    }

    #[test]
    fn test_zero_and_accessors() {
        let ring = make_ring(4);
        let p = Poly::zero(&ring);
        assert!(p.is_zero());
        assert_eq!(p.len(), 16);
        assert_eq!(p.representation(), Representation::Coefficient);
    }

    #[test]
    fn test_import_export_roundtrip() {
        let ring = make_ring(4);
        let values: Vec<u64> = (0..16).map(|i| i * 1000).collect();
        let p = poly_from(&values, &ring);
        assert_eq!(p.export(&ring), values);
    }

    #[test]
    fn test_addition_and_subtraction() {
        let ring = make_ring(2);
        let a = poly_from(&[1, 2, 3, 4], &ring);
        let b = poly_from(&[10, 20, 30, Q64 - 1], &ring);

        let sum = a.add(&b, &ring).unwrap();
        assert_eq!(sum.export(&ring), vec![11, 22, 33, 3]);

        let diff = a.sub(&b, &ring).unwrap();
        assert_eq!(diff.export(&ring), vec![Q64 - 9, Q64 - 18, Q64 - 27, 5]);
    }

    #[test]
    fn test_negation_cancels() {
        let ring = make_ring(2);
        let a = poly_from(&[5, 0, 7, 9], &ring);
        let sum = a.add(&a.neg(&ring), &ring).unwrap();
        assert!(sum.is_zero());
    }

    #[test]
    fn test_scalar_mul() {
        let ring = make_ring(2);
        let a = poly_from(&[1, 2, 3, 4], &ring);
        let ten = ring.modulus().import_int(10);
        assert_eq!(a.scalar_mul(ten, &ring).export(&ring), vec![10, 20, 30, 40]);
    }

    #[test]
    fn test_ntt_roundtrip_restores_representation() {
        let ring = make_ring(6);
        let values: Vec<u64> = (0..64).collect();
        let p = poly_from(&values, &ring);

        let q = p.forward_ntt_new(&ring).unwrap();
        assert_eq!(q.representation(), Representation::Ntt);
        let r = q.inverse_ntt_new(&ring).unwrap();
        assert_eq!(r, p);
    }

    #[test]
    fn test_mul_matches_naive_convolution() {
        let ring = make_ring(5);
        let a_int: Vec<u64> = (0..32).map(|i| i * 7 + 1).collect();
        let b_int: Vec<u64> = (0..32).map(|i| i * i + 3).collect();

        let a = poly_from(&a_int, &ring);
        let b = poly_from(&b_int, &ring);
        let prod = a.mul(&b, &ring).unwrap();

        assert_eq!(
            prod.export(&ring),
            naive_negacyclic_mul(&a_int, &b_int, Q64)
        );
    }

    #[test]
    fn test_mul_in_ntt_domain() {
        let ring = make_ring(5);
        let a = poly_from(&(0..32).collect::<Vec<u64>>(), &ring);
        let b = poly_from(&(0..32).map(|i| i + 5).collect::<Vec<u64>>(), &ring);

        let direct = a.mul(&b, &ring).unwrap();
        let via_ntt = a
            .forward_ntt_new(&ring)
            .unwrap()
            .mul(&b.forward_ntt_new(&ring).unwrap(), &ring)
            .unwrap()
            .inverse_ntt_new(&ring)
            .unwrap();
        assert_eq!(direct, via_ntt);
    }

    #[test]
    fn test_representation_mismatch_rejected() {
        let ring = make_ring(4);
        let a = poly_from(&(0..16).collect::<Vec<u64>>(), &ring);
        let b = a.forward_ntt_new(&ring).unwrap();

        assert!(matches!(
            a.add(&b, &ring),
            Err(SecAggError::RepresentationMismatch { .. })
        ));
        assert!(matches!(
            b.forward_ntt_new(&ring),
            Err(SecAggError::RepresentationMismatch { .. })
        ));
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let small = make_ring(3);
        let big = make_ring(4);
        let a = poly_from(&(0..8).collect::<Vec<u64>>(), &small);
        let b = poly_from(&(0..16).collect::<Vec<u64>>(), &big);
        assert!(matches!(
            a.add(&b, &big),
            Err(SecAggError::ParamsMismatch(_))
        ));
    }

    #[test]
    fn test_substitute_rotates_with_sign() {
        // With n = 4: X -> X^3 sends X^2 to X^6 = -X^2 and X^3 to X^9 = X.
        let ring = make_ring(2);
        let p = poly_from(&[1, 2, 3, 4], &ring);
        let s = p.substitute(3, &ring).unwrap();
        assert_eq!(s.export(&ring), vec![1, 4, Q64 - 3, 2]);
    }

    #[test]
    fn test_substitute_identity_power() {
        let ring = make_ring(3);
        let p = poly_from(&(1..9).collect::<Vec<u64>>(), &ring);
        assert_eq!(p.substitute(1, &ring).unwrap(), p);
    }

    #[test]
    fn test_substitute_rejects_even_power() {
        let ring = make_ring(2);
        let p = poly_from(&[1, 2, 3, 4], &ring);
        assert!(matches!(
            p.substitute(2, &ring),
            Err(SecAggError::InvalidArgument(_))
        ));
        assert!(matches!(
            p.substitute(9, &ring),
            Err(SecAggError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_substitute_composes() {
        // Applying X -> X^k then X -> X^m equals X -> X^{km mod 2n}.
        let ring = make_ring(3);
        let p = poly_from(&(0..8).map(|i| i * 11 + 2).collect::<Vec<u64>>(), &ring);
        let double = p.substitute(3, &ring).unwrap().substitute(5, &ring).unwrap();
        let single = p.substitute((3 * 5) % 16, &ring).unwrap();
        assert_eq!(double, single);
    }
}
