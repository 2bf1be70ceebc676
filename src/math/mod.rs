//! Mathematical primitives for RLWE secure aggregation.
//!
//! This module provides the numeric core the cryptographic layers are
//! built on:
//!
//! - **Montgomery arithmetic** over Z_q, generic over the word width
//! - **Number-Theoretic Transform (NTT)** for negacyclic convolution
//! - **Polynomial operations** over R_q = Z_q[X]/(X^n + 1)
//! - **Samplers** for uniform, centered-binomial, and discrete-Gaussian
//!   coefficient vectors

pub mod gaussian;
pub mod montgomery;
pub mod ntt;
pub mod poly;
pub mod sampling;
pub mod word;

pub use gaussian::DiscreteGaussianSampler;
pub use montgomery::ModulusParams;
pub use ntt::NttParams;
pub use poly::{Poly, Representation};
pub use sampling::{sample_centered_binomial, sample_uniform};
pub use word::Word;
