//! Seedable pseudorandom byte streams for sampling.
//!
//! Two interchangeable generators sit behind [`SecurePrng`]: an
//! HKDF-SHA256 stream (the default for the aggregation flow) and a ChaCha20
//! keystream variant. Both are deterministic for a fixed seed and refill an
//! internal 255·32-byte pool per salt, bumping a salt counter when the pool
//! runs dry.
//!
//! A generator is single-threaded: all methods take `&mut self` and
//! instances must not be shared across tasks.

pub mod chacha;
pub mod hkdf;

pub use chacha::ChaChaPrng;
pub use hkdf::HkdfPrng;

use crate::error::Result;

/// Number of bytes produced per salt before the stream re-derives itself.
pub(crate) const POOL_LEN: usize = 255 * 32;

/// A deterministic, seedable source of pseudorandom bytes.
pub trait SecurePrng {
    /// Returns 8 bits of randomness.
    fn rand8(&mut self) -> Result<u8>;

    /// Returns 64 bits of randomness, assembled from eight successive
    /// bytes in little-endian order.
    fn rand64(&mut self) -> Result<u64> {
        let mut value = 0u64;
        for i in 0..8 {
            value |= (self.rand8()? as u64) << (8 * i);
        }
        Ok(value)
    }
}
