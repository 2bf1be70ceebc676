//! Error types for the secure-aggregation crate.
//!
//! Every fallible operation surfaces one of the variants below; nothing is
//! recovered silently and there are no retries. Panics are reserved for
//! internal invariant violations inside the Montgomery arithmetic layer.

use thiserror::Error;

use crate::math::poly::Representation;

/// All errors that can occur in the RLWE secure-aggregation engine.
#[derive(Debug, Error)]
pub enum SecAggError {
    /// A parameter is out of range (variance cap, plaintext bit-width,
    /// input sizing, negative stddev, mismatched vector lengths).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Two operands disagree on modulus, ring dimension, or derived
    /// parameters.
    #[error("parameter mismatch: {0}")]
    ParamsMismatch(String),

    /// A polynomial is in the wrong representation for the requested
    /// operation.
    #[error("polynomial in {found:?} representation, expected {expected:?}")]
    RepresentationMismatch {
        expected: Representation,
        found: Representation,
    },

    /// Ciphertexts encrypted under different powers of the secret key were
    /// combined.
    #[error("power-of-s mismatch: {0} vs {1}")]
    PowerOfSMismatch(usize, usize),

    /// The underlying pseudorandom generator failed or was mis-seeded.
    #[error("prng error: {0}")]
    Prng(String),

    /// The modulus does not fit the chosen integer width.
    #[error("modulus does not fit a {width}-bit word: {detail}")]
    Overflow { width: u32, detail: String },
}

pub type Result<T> = std::result::Result<T, SecAggError>;

impl SecAggError {
    /// Shorthand for an `InvalidArgument` with a formatted message.
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        SecAggError::InvalidArgument(msg.into())
    }

    /// Shorthand for a `ParamsMismatch` with a formatted message.
    pub(crate) fn mismatch(msg: impl Into<String>) -> Self {
        SecAggError::ParamsMismatch(msg.into())
    }
}
