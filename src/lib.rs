//! FV ― leveled homomorphic encryption over NTT polynomial rings

#![forbid(unsafe_code)]
#![warn(clippy::pedantic, missing_docs)]

pub mod arith;
pub mod ciphertext;
pub mod context;
pub mod decryptor;
pub mod encryptor;
pub mod errors;
pub mod evaluator;
pub mod keys;
mod ntt;
pub mod params;
pub mod plaintext;
pub mod polynomial;
pub mod sampler;

pub use ciphertext::Ciphertext;
pub use context::{FvContext, FvParameters};
pub use decryptor::Decryptor;
pub use encryptor::Encryptor;
pub use errors::{Error, Result};
pub use evaluator::Evaluator;
pub use keys::{EvaluationKey, KeyGenerator, PublicKey, SecretKey};
pub use params::NttParameters;
pub use plaintext::Plaintext;
pub use polynomial::{Domain, Polynomial};
pub use sampler::Sampler;
