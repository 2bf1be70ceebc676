//! Symmetric RLWE encryption over R_q = Z_q[X]/(X^n + 1).
//!
//! Ciphertexts are additively homomorphic, and so are the secret keys: the
//! sum of two keys decrypts the sum of ciphertexts produced under them,
//! which is what the aggregation layer builds on.

pub mod ciphertext;
pub mod enc;
pub mod key;

pub use ciphertext::Ciphertext;
pub use enc::{decrypt, encrypt};
pub use key::SecretKey;
