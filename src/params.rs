//! Ring profiles and noise-bound parameters for secure aggregation.
//!
//! Two fixed rings drive the aggregation flow:
//!
//! - the **aggregation ring**: an 80-bit NTT-friendly prime over `u128`,
//!   dimension 2048, carrying ciphertexts and working keys;
//! - the **key-transport ring**: the NewHope modulus 12289 over `u64`,
//!   dimension 2048, carrying the compact integer vectors that aggregated
//!   keys are serialized through.
//!
//! Noise growth is tracked (never enforced) by [`ErrorParams`], whose
//! constants bound the l-infinity norm of transform-domain polynomials by
//! 6·sqrt(V) for coefficient variance V.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SecAggError};
use crate::math::montgomery::ModulusParams;
use crate::math::ntt::NttParams;
use crate::math::word::Word;

/// 80-bit NTT-friendly prime for the aggregation ring, q ≡ 1 (mod 4096).
pub const AGGREGATION_MODULUS: u128 = 646_119_422_561_999_443_726_337;

/// log₂ of the ring dimension used throughout the aggregation flow.
pub const AGGREGATION_LOG_N: u32 = 11;

/// NewHope modulus for the key-transport ring, 12289 ≡ 1 (mod 4096).
pub const KEY_TRANSPORT_MODULUS: u64 = 12289;

/// Plaintext bit-width associated with the key-transport ring.
pub const KEY_TRANSPORT_LOG_T: usize = 9;

/// Default standard deviation of the key/error distribution.
pub const DEFAULT_STDDEV: f64 = 4.5;

/// Upper bound on the centered-binomial variance accepted by the samplers.
pub const MAX_VARIANCE: u64 = 256;

/// A polynomial ring R_q = Z_q[X]/(X^n + 1): modulus constants plus NTT
/// twiddle tables for one (n, q) pair.
///
/// Created once and shared (typically behind an `Arc`); everything inside
/// is immutable.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "W: Word")]
pub struct RingParams<W: Word> {
    modulus: ModulusParams<W>,
    ntt: NttParams<W>,
}

impl<W: Word> RingParams<W> {
    /// Builds the ring of dimension `2^log_n` modulo `q`.
    ///
    /// # Errors
    ///
    /// Propagates `InvalidArgument`/`Overflow` from the Montgomery setup and
    /// `InvalidArgument` when q ≢ 1 (mod 2n).
    pub fn new(log_n: u32, q: W) -> Result<Self> {
        let modulus = ModulusParams::new(q)?;
        let ntt = NttParams::new(log_n, &modulus)?;
        Ok(Self { modulus, ntt })
    }

    /// Montgomery constants of the ring modulus.
    #[inline]
    pub fn modulus(&self) -> &ModulusParams<W> {
        &self.modulus
    }

    /// NTT twiddle tables of the ring.
    #[inline]
    pub fn ntt(&self) -> &NttParams<W> {
        &self.ntt
    }

    /// Ring dimension n.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.ntt.dimension()
    }

    /// log₂ of the ring dimension.
    #[inline]
    pub fn log_dimension(&self) -> u32 {
        self.ntt.log_dimension()
    }

    /// Whether two rings agree on modulus and dimension; operations between
    /// elements require this.
    #[inline]
    pub fn compatible(&self, other: &Self) -> bool {
        self.modulus.modulus() == other.modulus.modulus()
            && self.dimension() == other.dimension()
    }
}

impl RingParams<u128> {
    /// The fixed 80-bit ciphertext ring (n = 2048).
    pub fn aggregation_ring() -> Result<Self> {
        Self::new(AGGREGATION_LOG_N, AGGREGATION_MODULUS)
    }
}

impl RingParams<u64> {
    /// The fixed NewHope key-transport ring (n = 2048).
    pub fn key_transport_ring() -> Result<Self> {
        Self::new(AGGREGATION_LOG_N, KEY_TRANSPORT_MODULUS)
    }
}

/// Expected bounds on the noise carried by ciphertexts.
///
/// Each constant is 6·sqrt(V) where V is the variance of a transform-domain
/// coefficient of the corresponding polynomial; union-bounding over the n
/// slots this holds with high probability. The bounds are informational:
/// they are reported on ciphertexts and summed under addition, but they
/// never gate functional behavior.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorParams {
    log_t: usize,
    variance: u64,
    dimension: usize,
    b_plaintext: f64,
    b_encryption: f64,
    b_scale: f64,
}

impl ErrorParams {
    /// Derives the noise bounds for a plaintext modulus t = 2^log_t + 1,
    /// error variance, and ring dimension, under a modulus of
    /// `log_modulus` bits.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `log_t` is non-positive or does not leave a
    /// sign bit below the modulus (`log_t >= log_modulus - 1`), or when the
    /// variance exceeds [`MAX_VARIANCE`].
    pub fn create(
        log_t: usize,
        variance: u64,
        log_modulus: u32,
        dimension: usize,
    ) -> Result<Self> {
        if log_t == 0 {
            return Err(SecAggError::invalid("log_t must be positive"));
        }
        if log_t >= log_modulus as usize - 1 {
            return Err(SecAggError::invalid(format!(
                "log_t {} must be smaller than log_modulus - 1 = {}",
                log_t,
                log_modulus - 1
            )));
        }
        if variance > MAX_VARIANCE {
            return Err(SecAggError::invalid(format!(
                "variance {} exceeds the maximum {}",
                variance, MAX_VARIANCE
            )));
        }

        let t = ((1u64 << log_t) + 1) as f64;
        let sigma = (variance as f64).sqrt();
        let n = dimension as f64;

        // A uniform plaintext coefficient has variance t²/12; in the
        // transform domain that becomes n·t²/12, so 6·sqrt(V) = t·sqrt(3n).
        let b_plaintext = t * (3.0 * n).sqrt();
        // Fresh error-and-message |m + e·t| per transform-domain slot.
        let b_encryption = t * n.sqrt() * (3.0f64.sqrt() + 6.0 * sigma);
        // Rounding polynomial added by a modulus switch.
        let b_scale = t * ((3.0 * n).sqrt() + 8.0 * n * (1.0f64 / 3.0).sqrt());

        Ok(Self {
            log_t,
            variance,
            dimension,
            b_plaintext,
            b_encryption,
            b_scale,
        })
    }

    /// Plaintext bit-width log₂(t - 1).
    #[inline]
    pub fn log_t(&self) -> usize {
        self.log_t
    }

    /// Variance of the error distribution.
    #[inline]
    pub fn variance(&self) -> u64 {
        self.variance
    }

    /// Ring dimension the bounds were derived for.
    #[inline]
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Bound on a randomly sampled plaintext polynomial.
    #[inline]
    pub fn b_plaintext(&self) -> f64 {
        self.b_plaintext
    }

    /// Bound on the noise of a fresh symmetric encryption.
    #[inline]
    pub fn b_encryption(&self) -> f64 {
        self.b_encryption
    }

    /// Bound on the rounding noise of a modulus switch.
    #[inline]
    pub fn b_scale(&self) -> f64 {
        self.b_scale
    }
}
