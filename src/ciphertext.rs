//! FV ciphertexts.

use crate::polynomial::Polynomial;

/// (c0, c1), both in the frequency domain of the `q` ring.
///
/// Decrypts as `c0 + c1 * s`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ciphertext {
    /// Constant component.
    pub c0: Polynomial,
    /// Component multiplied by `s`.
    pub c1: Polynomial,
}

impl Ciphertext {
    /// Pair up two frequency-domain components.
    pub fn new(c0: Polynomial, c1: Polynomial) -> Self {
        Self { c0, c1 }
    }
}
