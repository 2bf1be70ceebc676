//! Symmetric RLWE ciphertexts.
//!
//! A ciphertext is an ordered tuple of NTT-form polynomials (two in the
//! aggregation flow), tagged with the key power it decrypts under and a
//! running upper bound on its noise. The bound is informational: it grows
//! under addition and is reported by [`error`](Ciphertext::error), but it
//! never gates behavior.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SecAggError};
use crate::math::poly::{Poly, Representation};
use crate::math::word::Word;
use crate::params::{ErrorParams, RingParams};

/// RLWE ciphertext (c0, c1, ...) in NTT form.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "W: Word")]
pub struct Ciphertext<W: Word> {
    components: Vec<Poly<W>>,
    power_of_s: usize,
    error_bound: f64,
    ring: Arc<RingParams<W>>,
    error_params: Arc<ErrorParams>,
}

impl<W: Word> Ciphertext<W> {
    /// Assembles a ciphertext from its component polynomials.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` with fewer than two components,
    /// `RepresentationMismatch` for a coefficient-form component, and
    /// `ParamsMismatch` when a component length differs from the ring
    /// dimension.
    pub fn new(
        components: Vec<Poly<W>>,
        power_of_s: usize,
        error_bound: f64,
        ring: Arc<RingParams<W>>,
        error_params: Arc<ErrorParams>,
    ) -> Result<Self> {
        if components.len() < 2 {
            return Err(SecAggError::invalid(format!(
                "a ciphertext needs at least two components, got {}",
                components.len()
            )));
        }
        for c in &components {
            if c.representation() != Representation::Ntt {
                return Err(SecAggError::RepresentationMismatch {
                    expected: Representation::Ntt,
                    found: c.representation(),
                });
            }
            if c.len() != ring.dimension() {
                return Err(SecAggError::mismatch(format!(
                    "component length {} does not match ring dimension {}",
                    c.len(),
                    ring.dimension()
                )));
            }
        }
        Ok(Self {
            components,
            power_of_s,
            error_bound,
            ring,
            error_params,
        })
    }

    /// Aggregation sum: adds the first components and carries `self`'s
    /// remaining components through unchanged.
    ///
    /// All summands in an aggregation share the same mask polynomial
    /// (c1 = -a and any higher components), so only c0 accumulates;
    /// summing the masks would leave an uncancellable (1-n)·a·s term in
    /// the decryption. The result keeps the shared `power_of_s` and
    /// carries the summed noise bound.
    ///
    /// # Errors
    ///
    /// `ParamsMismatch` when rings or component counts disagree,
    /// `PowerOfSMismatch` when the key-power tags differ.
    pub fn add(&self, other: &Self) -> Result<Self> {
        if !self.ring.compatible(&other.ring) {
            return Err(SecAggError::mismatch(
                "ciphertexts live in different rings".to_string(),
            ));
        }
        if self.components.len() != other.components.len() {
            return Err(SecAggError::mismatch(format!(
                "component counts differ: {} vs {}",
                self.components.len(),
                other.components.len()
            )));
        }
        if self.power_of_s != other.power_of_s {
            return Err(SecAggError::PowerOfSMismatch(
                self.power_of_s,
                other.power_of_s,
            ));
        }

        let mut components = Vec::with_capacity(self.components.len());
        components.push(self.components[0].add(&other.components[0], &self.ring)?);
        components.extend(self.components[1..].iter().cloned());

        Ok(Self {
            components,
            power_of_s: self.power_of_s,
            error_bound: self.error_bound + other.error_bound,
            ring: Arc::clone(&self.ring),
            error_params: Arc::clone(&self.error_params),
        })
    }

    /// Number of component polynomials.
    #[inline]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// The i-th component polynomial.
    #[inline]
    pub fn component(&self, i: usize) -> &Poly<W> {
        &self.components[i]
    }

    /// The key power this ciphertext decrypts under (1 for fresh
    /// encryptions; aggregation never raises it).
    #[inline]
    pub fn power_of_s(&self) -> usize {
        self.power_of_s
    }

    /// Bit width of the ciphertext modulus.
    #[inline]
    pub fn log_modulus(&self) -> u32 {
        self.ring.modulus().log_modulus()
    }

    /// Number of coefficients per component.
    #[inline]
    pub fn num_coeffs(&self) -> usize {
        self.ring.dimension()
    }

    /// Current upper bound on the ciphertext noise.
    #[inline]
    pub fn error(&self) -> f64 {
        self.error_bound
    }

    /// The ring this ciphertext lives in.
    #[inline]
    pub fn ring(&self) -> &Arc<RingParams<W>> {
        &self.ring
    }

    /// The noise-bound constants this ciphertext was produced with.
    #[inline]
    pub fn error_params(&self) -> &Arc<ErrorParams> {
        &self.error_params
    }
}
