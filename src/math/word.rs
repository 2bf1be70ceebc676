//! Integer-width abstraction for the modular arithmetic layer.
//!
//! The engine is generic over the unsigned word holding a residue: `u64`
//! (products computed in native 128-bit intermediates) or `u128` (products
//! computed in 256-bit intermediates via 64-bit limbs). The trait is the
//! capability set the Montgomery layer needs; it is deliberately small and
//! monomorphizes away.

use std::fmt::Debug;
use std::ops::{BitAnd, BitOr, Shl, Shr};

use serde::de::DeserializeOwned;
use serde::Serialize;

/// Unsigned machine word usable as a modular residue.
pub trait Word:
    Copy
    + Eq
    + Ord
    + Debug
    + Serialize
    + DeserializeOwned
    + BitAnd<Output = Self>
    + BitOr<Output = Self>
    + Shl<u32, Output = Self>
    + Shr<u32, Output = Self>
    + 'static
{
    /// Width of the word in bits.
    const BITS: u32;
    const ZERO: Self;
    const ONE: Self;

    fn wrapping_add(self, rhs: Self) -> Self;
    fn wrapping_sub(self, rhs: Self) -> Self;
    fn wrapping_mul(self, rhs: Self) -> Self;
    fn wrapping_neg(self) -> Self;
    fn overflowing_add(self, rhs: Self) -> (Self, bool);

    /// Full-width product: returns `(low, high)` words of `self * rhs`.
    fn widening_mul(self, rhs: Self) -> (Self, Self);

    /// Remainder of `self / rhs`. `rhs` must be non-zero.
    fn rem(self, rhs: Self) -> Self;

    fn leading_zeros(self) -> u32;
    fn count_ones(self) -> u32;

    fn from_u64(v: u64) -> Self;
    /// Truncates to the low 64 bits.
    fn as_u64(self) -> u64;

    /// Truncates to the low 128 bits (lossless for both supported widths).
    fn from_u128(v: u128) -> Self;
    fn as_u128(self) -> u128;

    /// Number of significant bits, i.e. `BITS - leading_zeros`.
    fn bit_length(self) -> u32 {
        Self::BITS - self.leading_zeros()
    }
}

impl Word for u64 {
    const BITS: u32 = 64;
    const ZERO: Self = 0;
    const ONE: Self = 1;

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        u64::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u64::wrapping_sub(self, rhs)
    }

    #[inline]
    fn wrapping_mul(self, rhs: Self) -> Self {
        u64::wrapping_mul(self, rhs)
    }

    #[inline]
    fn wrapping_neg(self) -> Self {
        u64::wrapping_neg(self)
    }

    #[inline]
    fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        u64::overflowing_add(self, rhs)
    }

    #[inline]
    fn widening_mul(self, rhs: Self) -> (Self, Self) {
        let wide = (self as u128) * (rhs as u128);
        (wide as u64, (wide >> 64) as u64)
    }

    #[inline]
    fn rem(self, rhs: Self) -> Self {
        self % rhs
    }

    #[inline]
    fn leading_zeros(self) -> u32 {
        u64::leading_zeros(self)
    }

    #[inline]
    fn count_ones(self) -> u32 {
        u64::count_ones(self)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        v
    }

    #[inline]
    fn as_u64(self) -> u64 {
        self
    }

    #[inline]
    fn from_u128(v: u128) -> Self {
        v as u64
    }

    #[inline]
    fn as_u128(self) -> u128 {
        self as u128
    }
}

impl Word for u128 {
    const BITS: u32 = 128;
    const ZERO: Self = 0;
    const ONE: Self = 1;

    #[inline]
    fn wrapping_add(self, rhs: Self) -> Self {
        u128::wrapping_add(self, rhs)
    }

    #[inline]
    fn wrapping_sub(self, rhs: Self) -> Self {
        u128::wrapping_sub(self, rhs)
    }

    #[inline]
    fn wrapping_mul(self, rhs: Self) -> Self {
        u128::wrapping_mul(self, rhs)
    }

    #[inline]
    fn wrapping_neg(self) -> Self {
        u128::wrapping_neg(self)
    }

    #[inline]
    fn overflowing_add(self, rhs: Self) -> (Self, bool) {
        u128::overflowing_add(self, rhs)
    }

    // Schoolbook 2x2 limb product; the cross terms cannot overflow because
    // each limb is < 2^64.
    #[inline]
    fn widening_mul(self, rhs: Self) -> (Self, Self) {
        const MASK: u128 = (1u128 << 64) - 1;
        let (a0, a1) = (self & MASK, self >> 64);
        let (b0, b1) = (rhs & MASK, rhs >> 64);

        let p00 = a0 * b0;
        let p01 = a0 * b1;
        let p10 = a1 * b0;
        let p11 = a1 * b1;

        let mid = (p00 >> 64) + (p01 & MASK) + (p10 & MASK);
        let lo = (p00 & MASK) | (mid << 64);
        let hi = p11 + (p01 >> 64) + (p10 >> 64) + (mid >> 64);
        (lo, hi)
    }

    #[inline]
    fn rem(self, rhs: Self) -> Self {
        self % rhs
    }

    #[inline]
    fn leading_zeros(self) -> u32 {
        u128::leading_zeros(self)
    }

    #[inline]
    fn count_ones(self) -> u32 {
        u128::count_ones(self)
    }

    #[inline]
    fn from_u64(v: u64) -> Self {
        v as u128
    }

    #[inline]
    fn as_u64(self) -> u64 {
        self as u64
    }

    #[inline]
    fn from_u128(v: u128) -> Self {
        v
    }

    #[inline]
    fn as_u128(self) -> u128 {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_widening_mul_u64() {
        let (lo, hi) = 0xFFFF_FFFF_FFFF_FFFFu64.widening_mul(0xFFFF_FFFF_FFFF_FFFF);
        // (2^64 - 1)^2 = 2^128 - 2^65 + 1
        assert_eq!(lo, 1);
        assert_eq!(hi, 0xFFFF_FFFF_FFFF_FFFE);
    }

    #[test]
    fn test_widening_mul_u128_small() {
        let (lo, hi) = 12345u128.widening_mul(67890);
        assert_eq!(lo, 12345 * 67890);
        assert_eq!(hi, 0);
    }

    #[test]
    fn test_widening_mul_u128_max() {
        let (lo, hi) = u128::MAX.widening_mul(u128::MAX);
        // (2^128 - 1)^2 = 2^256 - 2^129 + 1
        assert_eq!(lo, 1);
        assert_eq!(hi, u128::MAX - 1);
    }

    #[test]
    fn test_widening_mul_u128_cross_limbs() {
        let a = (1u128 << 80) + 12345;
        let b = (1u128 << 70) + 999;
        let (lo, hi) = a.widening_mul(b);
        // Cross-check against reduction mod 2^128 and a shifted estimate.
        assert_eq!(lo, a.wrapping_mul(b));
        assert_eq!(hi, 1u128 << (80 + 70 - 128));
    }

    #[test]
    fn test_bit_length() {
        assert_eq!(0u64.bit_length(), 0);
        assert_eq!(1u64.bit_length(), 1);
        assert_eq!(0xFFu64.bit_length(), 8);
        assert_eq!((1u128 << 79).bit_length(), 80);
    }
}
