//! ChaCha20 keystream PRNG.
//!
//! Same interface and pooling discipline as the HKDF stream: 255·32 bytes
//! per salt, with the salt counter selecting the ChaCha20 stream number so
//! re-keying never touches the seed itself.

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;

use super::{SecurePrng, POOL_LEN};
use crate::error::{Result, SecAggError};

/// ChaCha20-based PRNG, interchangeable with [`super::HkdfPrng`].
pub struct ChaChaPrng {
    key: [u8; Self::SEED_LEN],
    pool: Vec<u8>,
    position: usize,
    salt_counter: u64,
}

impl ChaChaPrng {
    /// Required key length in bytes.
    pub const SEED_LEN: usize = 32;

    /// Creates a stream keyed by 32 bytes.
    ///
    /// # Errors
    ///
    /// `Prng` if the key length is wrong.
    pub fn create(key: &[u8]) -> Result<Self> {
        if key.len() != Self::SEED_LEN {
            return Err(SecAggError::Prng(format!(
                "key must be {} bytes, got {}",
                Self::SEED_LEN,
                key.len()
            )));
        }
        let mut fixed = [0u8; Self::SEED_LEN];
        fixed.copy_from_slice(key);

        let mut prng = Self {
            key: fixed,
            pool: vec![0u8; POOL_LEN],
            position: 0,
            salt_counter: 0,
        };
        prng.refill();
        Ok(prng)
    }

    /// Samples a fresh random key of the required length.
    pub fn generate_seed() -> [u8; Self::SEED_LEN] {
        let mut key = [0u8; Self::SEED_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        key
    }

    /// Required key length in bytes.
    pub fn seed_length() -> usize {
        Self::SEED_LEN
    }

    fn refill(&mut self) {
        let mut rng = ChaCha20Rng::from_seed(self.key);
        rng.set_stream(self.salt_counter);
        rng.fill_bytes(&mut self.pool);
        self.salt_counter += 1;
        self.position = 0;
    }
}

impl SecurePrng for ChaChaPrng {
    fn rand8(&mut self) -> Result<u8> {
        if self.position == POOL_LEN {
            self.refill();
        }
        let byte = self.pool[self.position];
        self.position += 1;
        Ok(byte)
    }
}
