//! Error type shared by every layer of the crate.

use thiserror::Error;

use crate::polynomial::Domain;

/// The Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

/// Enum encapsulating all the possible errors from this library.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Invalid global parameters (degree, moduli, noise width, digit width).
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// Operands disagree on degree or modulus, or a coefficient vector has the
    /// wrong length.
    #[error("shape mismatch: {0}")]
    ShapeError(String),

    /// An operation was invoked while a polynomial was in the wrong transform
    /// domain.
    #[error("domain mismatch: expected {expected:?}, found {found:?}")]
    DomainError {
        /// Domain the operation requires.
        expected: Domain,
        /// Domain the operand was in.
        found: Domain,
    },

    /// Division or reduction by zero, or a value with no `f64` approximation.
    #[error("numeric error: {0}")]
    NumericError(String),

    /// A sampler hit its retry bound.
    #[error("sampler exhausted after {0} attempts")]
    SamplingExhausted(usize),
}
