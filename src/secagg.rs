//! Secure-aggregation engine.
//!
//! Orchestrates the RLWE primitives for the federated-aggregation flow: N
//! clients each encrypt a long vector under their own key, a server sums
//! the ciphertexts chunk by chunk without learning anything, and whoever
//! holds the sum of the keys decrypts the sum of the vectors.
//!
//! The engine fixes the cryptographic profile: an 80-bit ciphertext
//! modulus with ring dimension 2048, a NewHope-modulus transport ring for
//! serialized keys, and a centered-binomial error distribution of stddev
//! 4.5. A long plaintext is split into `input_size / 2048` chunks, each
//! encrypted against a per-chunk public polynomial `a_i` derived from the
//! engine seed — two engines built from the same seed agree on every `a_i`
//! and on the randomness of the encryptions they produce, so clients that
//! never talk to each other still produce server-compatible ciphertexts.

use std::sync::Arc;

use rand_mt::Mt19937GenRand32;
use tracing::debug;

use crate::error::{Result, SecAggError};
use crate::math::poly::{Poly, Representation};
use crate::math::sampling::sample_uniform;
use crate::params::{ErrorParams, RingParams, DEFAULT_STDDEV};
use crate::prng::HkdfPrng;
use crate::rlwe::{decrypt, encrypt, Ciphertext, SecretKey};

/// Engine fixing parameters and per-chunk randomness for one aggregation.
///
/// Construction is the expensive step: it derives all `a_i` polynomials
/// eagerly. Methods that consume randomness (`sample_key`, `encrypt`) take
/// `&mut self` because they advance the seeded stream.
pub struct SecAggEngine {
    ring_q: Arc<RingParams<u128>>,
    ring_p: Arc<RingParams<u64>>,
    error_params: Arc<ErrorParams>,
    prng: HkdfPrng,
    seed: [u8; 32],
    input_size: usize,
    num_chunks: usize,
    log_t: usize,
    variance: u64,
    random_polys: Vec<Poly<u128>>,
}

impl SecAggEngine {
    /// Creates an engine with a fresh random seed and the default error
    /// stddev of 4.5.
    ///
    /// `input_size` is the client vector length and must be a positive
    /// multiple of the ring dimension 2048; `log_t` sets the plaintext
    /// modulus t = 2^log_t + 1.
    pub fn new(input_size: usize, log_t: usize) -> Result<Self> {
        Self::with_stddev(input_size, log_t, None, DEFAULT_STDDEV)
    }

    /// Creates an engine from an explicit 32-byte seed, reproducing the
    /// `a_i` sequence and encryption randomness of any other engine built
    /// from the same seed.
    pub fn with_seed(input_size: usize, log_t: usize, seed: [u8; 32]) -> Result<Self> {
        Self::with_stddev(input_size, log_t, Some(seed), DEFAULT_STDDEV)
    }

    /// Fully parameterized constructor.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` for a negative stddev, a zero or non-multiple
    /// `input_size`, or a `log_t` outside `(0, log q - 1)`; `Prng` if seed
    /// expansion fails.
    pub fn with_stddev(
        input_size: usize,
        log_t: usize,
        seed: Option<[u8; 32]>,
        stddev: f64,
    ) -> Result<Self> {
        if stddev < 0.0 {
            return Err(SecAggError::invalid(
                "standard deviation must be non-negative",
            ));
        }

        let ring_q = Arc::new(RingParams::aggregation_ring()?);
        let ring_p = Arc::new(RingParams::key_transport_ring()?);
        let n = ring_q.dimension();

        if input_size == 0 || input_size % n != 0 {
            return Err(SecAggError::invalid(format!(
                "input size {} must be a positive multiple of the ring dimension {}",
                input_size, n
            )));
        }
        let num_chunks = input_size / n;

        let variance = (stddev * stddev).round() as u64;
        let error_params = Arc::new(ErrorParams::create(
            log_t,
            variance,
            ring_q.modulus().log_modulus(),
            n,
        )?);

        let seed = seed.unwrap_or_else(HkdfPrng::generate_seed);
        let mut prng = HkdfPrng::create(&seed)?;

        // Uniform residues are uniform in either domain, so the samples are
        // taken to be the NTT image directly.
        let mut random_polys = Vec::with_capacity(num_chunks);
        for _ in 0..num_chunks {
            let coeffs = sample_uniform(n, &mut prng, ring_q.modulus())?;
            random_polys.push(Poly::from_montgomery(coeffs, Representation::Ntt));
        }

        debug!(
            input_size,
            num_chunks,
            log_t,
            variance,
            "secure-aggregation engine ready"
        );

        Ok(Self {
            ring_q,
            ring_p,
            error_params,
            prng,
            seed,
            input_size,
            num_chunks,
            log_t,
            variance,
            random_polys,
        })
    }

    /// The 32-byte seed this engine runs on. Passing it to
    /// [`with_seed`](Self::with_seed) reconstructs a compatible engine.
    pub fn seed(&self) -> [u8; 32] {
        self.seed
    }

    /// Client vector length.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Number of ring-sized chunks per client vector.
    pub fn num_chunks(&self) -> usize {
        self.num_chunks
    }

    /// Ring dimension (2048).
    pub fn ring_dimension(&self) -> usize {
        self.ring_q.dimension()
    }

    /// Plaintext bit-width.
    pub fn log_t(&self) -> usize {
        self.log_t
    }

    /// Noise-bound constants of this engine's profile.
    pub fn error_params(&self) -> &Arc<ErrorParams> {
        &self.error_params
    }

    /// Samples a fresh secret key over the aggregation ring.
    pub fn sample_key(&mut self) -> Result<SecretKey<u128>> {
        SecretKey::sample(&self.ring_q, self.variance, self.log_t, &mut self.prng)
    }

    /// Rebuilds a key from its transport-ring integer vector, typically the
    /// coordinatewise mod-p sum of several converted keys.
    pub fn create_key(&self, coeffs_mod_p: &[u64]) -> Result<SecretKey<u128>> {
        SecretKey::from_converted(
            coeffs_mod_p,
            &self.ring_p,
            &self.ring_q,
            self.variance,
            self.log_t,
        )
    }

    /// Serializes a key as integers mod p over the transport ring.
    pub fn convert_key(&self, key: &SecretKey<u128>) -> Result<Vec<u64>> {
        key.convert(&self.ring_p)
    }

    /// Coordinatewise key sum.
    pub fn sum_keys(
        &self,
        k1: &SecretKey<u128>,
        k2: &SecretKey<u128>,
    ) -> Result<SecretKey<u128>> {
        k1.add(k2)
    }

    /// Deterministic test plaintext: `num_coeffs` values in
    /// `[0, 2^log_t)` drawn from an MT19937 generator seeded with 1.
    ///
    /// This reproduces the reference test-vector generator; production
    /// callers supply their own plaintexts.
    pub fn sample_plaintext(num_coeffs: usize, log_t: usize) -> Vec<u64> {
        let t = 1u64 << log_t;
        let mut mt = Mt19937GenRand32::new(1);
        (0..num_coeffs)
            .map(|_| (mt.next_u32() as u64) % t)
            .collect()
    }

    /// Encrypts a client vector, one ciphertext per ring-sized chunk.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the plaintext length differs from
    /// `input_size`.
    pub fn encrypt(
        &mut self,
        key: &SecretKey<u128>,
        plaintext: &[u64],
    ) -> Result<Vec<Ciphertext<u128>>> {
        if plaintext.len() != self.input_size {
            return Err(SecAggError::invalid(format!(
                "plaintext length {} must equal the input size {}",
                plaintext.len(),
                self.input_size
            )));
        }

        let n = self.ring_q.dimension();
        let mut ciphertexts = Vec::with_capacity(self.num_chunks);
        for (i, chunk) in plaintext.chunks_exact(n).enumerate() {
            let values: Vec<u128> = chunk.iter().map(|&v| v as u128).collect();
            let mut message = Poly::from_ints(&values, &self.ring_q)?;
            message.forward_ntt(&self.ring_q)?;
            ciphertexts.push(encrypt(
                key,
                &message,
                &self.random_polys[i],
                &self.error_params,
                &mut self.prng,
            )?);
        }
        debug!(chunks = ciphertexts.len(), "vector encrypted");
        Ok(ciphertexts)
    }

    /// Decrypts a full chunk list and concatenates the plaintexts.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the ciphertext count differs from the
    /// engine's chunk count.
    pub fn decrypt(
        &self,
        key: &SecretKey<u128>,
        ciphertexts: &[Ciphertext<u128>],
    ) -> Result<Vec<u64>> {
        if ciphertexts.len() != self.num_chunks {
            return Err(SecAggError::invalid(format!(
                "expected {} ciphertexts, got {}",
                self.num_chunks,
                ciphertexts.len()
            )));
        }

        let mut plaintext = Vec::with_capacity(self.input_size);
        for ct in ciphertexts {
            let chunk = decrypt(key, ct)?;
            plaintext.extend(chunk.into_iter().map(|v| v as u64));
        }
        Ok(plaintext)
    }

    /// Adds a client's chunk list into a running sum, chunk by chunk.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when either list's length differs from the chunk
    /// count; per-chunk mismatches surface from [`Ciphertext::add`].
    pub fn aggregate(
        &self,
        sum: &[Ciphertext<u128>],
        fresh: &[Ciphertext<u128>],
    ) -> Result<Vec<Ciphertext<u128>>> {
        if sum.len() != self.num_chunks || fresh.len() != self.num_chunks {
            return Err(SecAggError::invalid(format!(
                "ciphertext counts {} and {} must both equal {}",
                sum.len(),
                fresh.len(),
                self.num_chunks
            )));
        }
        sum.iter()
            .zip(fresh.iter())
            .map(|(a, b)| a.add(b))
            .collect()
    }
}
