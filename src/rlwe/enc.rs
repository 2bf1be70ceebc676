//! Symmetric RLWE encryption and decryption.
//!
//! Encryption follows the convention (c0, c1) = (a·s + t·e + m, -a), so
//! that c0 + c1·s = t·e + m. Decryption recovers m exactly as long as the
//! l-infinity norm of t·e + m stays below q/2; under ciphertext addition
//! the error grows linearly, which is what bounds the number of inputs an
//! aggregation can absorb.

use std::sync::Arc;

use crate::error::{Result, SecAggError};
use crate::math::poly::{Poly, Representation};
use crate::math::sampling::sample_centered_binomial;
use crate::math::word::Word;
use crate::params::ErrorParams;
use crate::prng::SecurePrng;
use crate::rlwe::ciphertext::Ciphertext;
use crate::rlwe::key::SecretKey;

/// Encrypts an NTT-form message polynomial under `key`.
///
/// The random polynomial `a` is supplied by the caller (in the aggregation
/// flow it is a shared, seed-derived value); only the error term is drawn
/// from `prng`, with the key's variance. The resulting ciphertext carries
/// `power_of_s = 1` and the fresh-encryption noise bound.
///
/// # Errors
///
/// `RepresentationMismatch` unless both `message` and `a` are in NTT form;
/// `ParamsMismatch` on a dimension disagreement.
pub fn encrypt<W: Word>(
    key: &SecretKey<W>,
    message: &Poly<W>,
    a: &Poly<W>,
    error_params: &Arc<ErrorParams>,
    prng: &mut dyn SecurePrng,
) -> Result<Ciphertext<W>> {
    let ring = key.ring();
    for poly in [message, a] {
        if poly.representation() != Representation::Ntt {
            return Err(SecAggError::RepresentationMismatch {
                expected: Representation::Ntt,
                found: poly.representation(),
            });
        }
        if poly.len() != ring.dimension() {
            return Err(SecAggError::mismatch(format!(
                "polynomial length {} does not match ring dimension {}",
                poly.len(),
                ring.dimension()
            )));
        }
    }

    let error_coeffs =
        sample_centered_binomial(ring.dimension(), key.variance(), prng, ring.modulus())?;
    let mut error = Poly::from_montgomery(error_coeffs, Representation::Coefficient);
    error.forward_ntt(ring)?;

    let t = (1u128 << key.log_t()) + 1;
    let t_mont = ring.modulus().import_int(W::from_u128(t));
    let scaled_error = error.scalar_mul(t_mont, ring);

    // c0 = a·s + t·e + m
    let a_s = a.mul(key.key(), ring)?;
    let c0 = a_s.add(&scaled_error, ring)?.add(message, ring)?;
    // c1 = -a
    let c1 = a.neg(ring);

    Ciphertext::new(
        vec![c0, c1],
        1,
        error_params.b_encryption(),
        Arc::clone(ring),
        Arc::clone(error_params),
    )
}

/// Decrypts a ciphertext, returning standard-form plaintext coefficients
/// in `[0, t)` with t = 2^log_t + 1.
///
/// Accumulates c0 + c1·s (+ cᵢ·sⁱ for any further components), leaves the
/// transform domain, and reduces each centered coefficient mod t.
///
/// # Errors
///
/// `ParamsMismatch` when key and ciphertext rings disagree.
pub fn decrypt<W: Word>(key: &SecretKey<W>, ciphertext: &Ciphertext<W>) -> Result<Vec<W>> {
    let ring = key.ring();
    if !ring.compatible(ciphertext.ring()) {
        return Err(SecAggError::mismatch(
            "key and ciphertext live in different rings".to_string(),
        ));
    }

    let mut accumulator = ciphertext.component(0).clone();
    let mut key_power = key.key().clone();
    for i in 1..ciphertext.len() {
        let term = ciphertext.component(i).mul(&key_power, ring)?;
        accumulator = accumulator.add(&term, ring)?;
        if i + 1 < ciphertext.len() {
            key_power = key_power.mul(key.key(), ring)?;
        }
    }

    accumulator.inverse_ntt(ring)?;
    let exported = accumulator.export(ring);

    let q = ring.modulus().modulus();
    let half_q = q >> 1;
    let t = W::from_u128((1u128 << key.log_t()) + 1);

    let plaintext = exported
        .into_iter()
        .map(|x| {
            if x <= half_q {
                x.rem(t)
            } else {
                // x stands for the negative value -(q - x).
                let r = q.wrapping_sub(x).rem(t);
                if r == W::ZERO {
                    W::ZERO
                } else {
                    t.wrapping_sub(r)
                }
            }
        })
        .collect();
    Ok(plaintext)
}
