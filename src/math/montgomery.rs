//! Modular arithmetic over Z_q using Montgomery reduction.
//!
//! Residues are kept in Montgomery form (`a * R mod q` with `R = 2^W`) so
//! multiplications avoid explicit division. All operations are branch-free
//! except for the single conditional subtraction of q that keeps results in
//! `[0, q)`.
//!
//! The modulus must be odd and leave two bits of headroom in the word
//! (`bitlen(q) <= W - 2`) so that intermediate sums never wrap.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SecAggError};
use crate::math::word::Word;

/// Precomputed Montgomery constants for a fixed odd modulus q.
///
/// Create once per modulus and share; the struct is immutable and cheap to
/// clone. Residues produced by [`import_int`](Self::import_int) stay valid
/// for the lifetime of any `ModulusParams` with the same q.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(bound = "W: Word")]
pub struct ModulusParams<W: Word> {
    /// The modulus q.
    modulus: W,
    /// -q^(-1) mod 2^W for Montgomery reduction.
    inv_modulus: W,
    /// R^2 mod q, used to enter the Montgomery domain.
    r_squared: W,
    /// R mod q, i.e. 1 in Montgomery form.
    one: W,
    /// Number of significant bits of q.
    log_modulus: u32,
}

impl<W: Word> ModulusParams<W> {
    /// Creates Montgomery parameters for the modulus `q`.
    ///
    /// # Errors
    ///
    /// * `InvalidArgument` if q is zero or even (Montgomery reduction needs
    ///   an odd modulus).
    /// * `Overflow` if q needs more than `W::BITS - 2` bits; the two spare
    ///   bits keep intermediate sums from wrapping.
    pub fn new(q: W) -> Result<Self> {
        if q == W::ZERO || (q & W::ONE) == W::ZERO {
            return Err(SecAggError::invalid(
                "modulus must be odd and non-zero for Montgomery arithmetic",
            ));
        }
        let log_modulus = q.bit_length();
        if log_modulus > W::BITS - 2 {
            return Err(SecAggError::Overflow {
                width: W::BITS,
                detail: format!("modulus needs {} bits", log_modulus),
            });
        }

        let inv_modulus = Self::compute_inv_modulus(q);
        // 2^W mod q == (0 - q) mod q in W-bit arithmetic.
        let one = q.wrapping_neg().rem(q);
        // R^2 = (R mod q) << W, reduced by W modular doublings.
        let mut r_squared = one;
        for _ in 0..W::BITS {
            r_squared = Self::add_mod(r_squared, r_squared, q);
        }

        Ok(Self {
            modulus: q,
            inv_modulus,
            r_squared,
            one,
            log_modulus,
        })
    }

    /// The modulus q.
    #[inline]
    pub fn modulus(&self) -> W {
        self.modulus
    }

    /// Number of significant bits of q.
    #[inline]
    pub fn log_modulus(&self) -> u32 {
        self.log_modulus
    }

    /// 1 in Montgomery form (R mod q).
    #[inline]
    pub fn one(&self) -> W {
        self.one
    }

    /// Reduces `x` mod q and converts it to Montgomery form.
    #[inline]
    pub fn import_int(&self, x: W) -> W {
        self.mul(x.rem(self.modulus), self.r_squared)
    }

    /// Converts a Montgomery-form residue back to `[0, q)`.
    #[inline]
    pub fn export_int(&self, a: W) -> W {
        self.reduce_wide(a, W::ZERO)
    }

    /// Modular addition with a single conditional subtraction.
    #[inline]
    pub fn add(&self, a: W, b: W) -> W {
        debug_assert!(a < self.modulus && b < self.modulus);
        Self::add_mod(a, b, self.modulus)
    }

    /// Modular subtraction.
    #[inline]
    pub fn sub(&self, a: W, b: W) -> W {
        debug_assert!(a < self.modulus && b < self.modulus);
        if a >= b {
            a.wrapping_sub(b)
        } else {
            self.modulus.wrapping_sub(b).wrapping_add(a)
        }
    }

    /// Modular negation.
    #[inline]
    pub fn neg(&self, a: W) -> W {
        debug_assert!(a < self.modulus);
        if a == W::ZERO {
            W::ZERO
        } else {
            self.modulus.wrapping_sub(a)
        }
    }

    /// Montgomery multiplication: `a * b * R^(-1) mod q`.
    #[inline]
    pub fn mul(&self, a: W, b: W) -> W {
        let (lo, hi) = a.widening_mul(b);
        self.reduce_wide(lo, hi)
    }

    /// Montgomery reduction of a double-width value `(lo, hi)`.
    ///
    /// Computes `(hi*2^W + lo) * R^(-1) mod q` with the word-level REDC:
    /// `m = lo * (-q^(-1)) mod R`, then `(value + m*q) / R`.
    #[inline]
    fn reduce_wide(&self, lo: W, hi: W) -> W {
        let m = lo.wrapping_mul(self.inv_modulus);
        let (mq_lo, mq_hi) = m.widening_mul(self.modulus);
        // lo + mq_lo is 0 or exactly 2^W; the carry is all that survives.
        let (sum, carry) = lo.overflowing_add(mq_lo);
        debug_assert!(sum == W::ZERO);
        let mut t = hi.wrapping_add(mq_hi);
        if carry {
            t = t.wrapping_add(W::ONE);
        }
        if t >= self.modulus {
            t.wrapping_sub(self.modulus)
        } else {
            t
        }
    }

    /// Modular exponentiation of a Montgomery-form base by a plain exponent.
    pub fn pow(&self, base: W, mut exp: W) -> W {
        let mut result = self.one;
        let mut base = base;
        while exp > W::ZERO {
            if (exp & W::ONE) == W::ONE {
                result = self.mul(result, base);
            }
            base = self.mul(base, base);
            exp = exp >> 1;
        }
        result
    }

    /// Modular inverse by Fermat's little theorem (q must be prime).
    /// Returns `None` for zero.
    pub fn inv(&self, a: W) -> Option<W> {
        if self.export_int(a) == W::ZERO {
            None
        } else {
            Some(self.pow(a, self.modulus.wrapping_sub(W::from_u64(2))))
        }
    }

    /// Imports a slice of standard-form values into the Montgomery domain.
    pub fn batch_import(&self, values: &[W]) -> Vec<W> {
        values.iter().map(|&v| self.import_int(v)).collect()
    }

    /// Exports a slice of Montgomery-form residues to `[0, q)`.
    pub fn batch_export(&self, values: &[W]) -> Vec<W> {
        values.iter().map(|&v| self.export_int(v)).collect()
    }

    #[inline]
    fn add_mod(a: W, b: W, q: W) -> W {
        let sum = a.wrapping_add(b);
        if sum >= q {
            sum.wrapping_sub(q)
        } else {
            sum
        }
    }

    /// Computes -q^(-1) mod 2^W by lifting the inverse one bit at a time.
    fn compute_inv_modulus(q: W) -> W {
        let mut y = W::ONE;
        for i in 1..W::BITS {
            let mask = W::ONE << i;
            if (y.wrapping_mul(q) & mask) != W::ZERO {
                y = y | mask;
            }
        }
        y.wrapping_neg()
    }
}
