//! Additively homomorphic symmetric RLWE encryption for secure
//! aggregation.
//!
//! This crate implements the cryptographic engine behind
//! privacy-preserving federated aggregation: N clients each encrypt a
//! vector under their own secret key, a server sums the ciphertexts
//! without learning any individual input, and the holder of the summed
//! keys recovers the summed plaintexts.
//!
//! Key components:
//! - Montgomery-domain modular arithmetic, generic over 64- and 128-bit
//!   words
//! - Negacyclic NTT over R_q = Z_q[X]/(X^n + 1)
//! - Seedable HKDF / ChaCha20 pseudorandom streams and centered-binomial
//!   error sampling
//! - Symmetric RLWE encryption whose ciphertexts *and* keys are additively
//!   homomorphic
//! - [`SecAggEngine`], which splits long vectors into ring-sized chunks
//!   and aggregates them chunkwise
//!
//! # Example
//!
//! ```
//! use rlwe_secagg::SecAggEngine;
//!
//! let mut engine = SecAggEngine::new(2048, 11)?;
//! let key = engine.sample_key()?;
//! let plaintext = vec![7u64; 2048];
//! let ciphertexts = engine.encrypt(&key, &plaintext)?;
//! assert_eq!(engine.decrypt(&key, &ciphertexts)?, plaintext);
//! # Ok::<(), rlwe_secagg::SecAggError>(())
//! ```

pub mod error;
pub mod math;
pub mod params;
pub mod prng;
pub mod rlwe;
pub mod secagg;

pub use error::{Result, SecAggError};
pub use math::{DiscreteGaussianSampler, ModulusParams, NttParams, Poly, Representation};
pub use params::{ErrorParams, RingParams};
pub use prng::{ChaChaPrng, HkdfPrng, SecurePrng};
pub use rlwe::{decrypt, encrypt, Ciphertext, SecretKey};
pub use secagg::SecAggEngine;
