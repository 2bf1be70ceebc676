//! Negacyclic Number-Theoretic Transform over R_q = Z_q[X]/(X^n + 1).
//!
//! Implements the Cooley-Tukey decimation-in-time forward transform and the
//! Gentleman-Sande decimation-in-frequency inverse, both in-place over
//! Montgomery-form coefficients.
//!
//! # Theory
//!
//! For multiplication modulo X^n + 1 the transform evaluates at odd powers
//! of a primitive 2n-th root of unity ψ (ψ^n = -1). After the forward
//! transform, slot i holds Σ_j c_j · ψ^{(2·br(i)+1)·j}, where br is the
//! log₂(n)-bit reversal. Pointwise products in this domain correspond to
//! negacyclic convolutions of the coefficient vectors.
//!
//! # Requirements
//!
//! The modulus must satisfy q ≡ 1 (mod 2n) for ψ to exist. Twiddle factors
//! are precomputed in bit-reversed order at construction; the transforms
//! allocate nothing.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SecAggError};
use crate::math::montgomery::ModulusParams;
use crate::math::word::Word;

/// Precomputed twiddle-factor tables for one (n, q) pair.
///
/// Create once and share; the tables are immutable. All stored values are
/// in Montgomery form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "W: Word")]
pub struct NttParams<W: Word> {
    /// Ring dimension (power of two).
    n: usize,
    /// log₂(n).
    log_n: u32,
    /// psi_rev[j] = ψ^{br(j)}, bit-reversed powers of the forward root.
    psi_rev: Vec<W>,
    /// Bit-reversed powers of ψ^(-1).
    psi_inv_rev: Vec<W>,
    /// n^(-1) mod q in Montgomery form, for the inverse scaling.
    n_inv: W,
}

impl<W: Word> NttParams<W> {
    /// Builds the twiddle tables for dimension `2^log_n` under `modulus`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `q ≢ 1 (mod 2n)`, i.e. no primitive 2n-th root
    /// of unity exists.
    pub fn new(log_n: u32, modulus: &ModulusParams<W>) -> Result<Self> {
        let n = 1usize << log_n;
        let q = modulus.modulus();
        let two_n = W::from_u64(2 * n as u64);
        if q.rem(two_n) != W::ONE {
            return Err(SecAggError::invalid(format!(
                "modulus must be 1 mod 2n for an NTT of dimension {}",
                n
            )));
        }

        let psi = Self::find_primitive_root(log_n, modulus);
        let psi_inv = modulus.inv(psi).expect("primitive root is invertible");

        let psi_rev = Self::bit_reversed_powers(psi, n, log_n, modulus);
        let psi_inv_rev = Self::bit_reversed_powers(psi_inv, n, log_n, modulus);

        let n_mont = modulus.import_int(W::from_u64(n as u64));
        let n_inv = modulus.inv(n_mont).expect("n is invertible mod a prime");

        Ok(Self {
            n,
            log_n,
            psi_rev,
            psi_inv_rev,
            n_inv,
        })
    }

    /// Ring dimension n.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.n
    }

    /// log₂ of the ring dimension.
    #[inline]
    pub fn log_dimension(&self) -> u32 {
        self.log_n
    }

    /// Forward negacyclic NTT, in-place over Montgomery-form coefficients.
    ///
    /// Cooley-Tukey decimation-in-time; the bit reversal is folded into the
    /// twiddle tables.
    pub fn forward(&self, coeffs: &mut [W], modulus: &ModulusParams<W>) {
        assert_eq!(coeffs.len(), self.n, "input length must equal dimension");

        let mut t = self.n;
        let mut m = 1;
        while m < self.n {
            t >>= 1;
            for i in 0..m {
                let j1 = 2 * i * t;
                let j2 = j1 + t;
                let w = self.psi_rev[m + i];
                for j in j1..j2 {
                    let u = coeffs[j];
                    let v = modulus.mul(coeffs[j + t], w);
                    coeffs[j] = modulus.add(u, v);
                    coeffs[j + t] = modulus.sub(u, v);
                }
            }
            m <<= 1;
        }
    }

    /// Inverse negacyclic NTT, in-place; scales by n^(-1) at the end.
    ///
    /// Gentleman-Sande decimation-in-frequency with the inverse tables.
    pub fn inverse(&self, coeffs: &mut [W], modulus: &ModulusParams<W>) {
        assert_eq!(coeffs.len(), self.n, "input length must equal dimension");

        let mut t = 1;
        let mut m = self.n;
        while m > 1 {
            m >>= 1;
            for i in 0..m {
                let j1 = i * 2 * t;
                let w = self.psi_inv_rev[m + i];
                for j in j1..(j1 + t) {
                    let u = coeffs[j];
                    let v = coeffs[j + t];
                    coeffs[j] = modulus.add(u, v);
                    coeffs[j + t] = modulus.mul(modulus.sub(u, v), w);
                }
            }
            t <<= 1;
        }

        for c in coeffs.iter_mut() {
            *c = modulus.mul(*c, self.n_inv);
        }
    }

    /// Pointwise Montgomery product of two transform-domain slices.
    pub fn pointwise_mul(&self, a: &[W], b: &[W], out: &mut [W], modulus: &ModulusParams<W>) {
        assert_eq!(a.len(), self.n);
        assert_eq!(b.len(), self.n);
        assert_eq!(out.len(), self.n);
        for i in 0..self.n {
            out[i] = modulus.mul(a[i], b[i]);
        }
    }

    /// Finds a primitive 2n-th root of unity ψ (Montgomery form).
    ///
    /// Tries small generator candidates g and tests ψ = g^((q-1)/2n) for
    /// ψ^n = -1, which for a power-of-two order is exactly primitivity.
    fn find_primitive_root(log_n: u32, modulus: &ModulusParams<W>) -> W {
        let q = modulus.modulus();
        // (q - 1) / 2n is exact because q ≡ 1 (mod 2n).
        let exp = q.wrapping_sub(W::ONE) >> (log_n + 1);
        let n_w = W::from_u64(1u64 << log_n);
        let minus_one = modulus.neg(modulus.one());

        let mut g = 2u64;
        loop {
            let candidate = modulus.pow(modulus.import_int(W::from_u64(g)), exp);
            if modulus.pow(candidate, n_w) == minus_one {
                return candidate;
            }
            g += 1;
            assert!(g < 1000, "no primitive root among small generators");
        }
    }

    /// Tabulates root^{br(j)} for j in 0..n, all in Montgomery form.
    fn bit_reversed_powers(
        root: W,
        n: usize,
        log_n: u32,
        modulus: &ModulusParams<W>,
    ) -> Vec<W> {
        let mut powers = Vec::with_capacity(n);
        let mut acc = modulus.one();
        for _ in 0..n {
            powers.push(acc);
            acc = modulus.mul(acc, root);
        }

        let mut table = vec![W::ZERO; n];
        for (j, &p) in powers.iter().enumerate() {
            table[bit_reverse(j, log_n)] = p;
        }
        table
    }
}

/// Reverses the low `bits` bits of `i`.
#[inline]
fn bit_reverse(i: usize, bits: u32) -> usize {
    i.reverse_bits() >> (usize::BITS - bits)
}
