//! Encoded messages.

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::context::FvContext;
use crate::errors::{Error, Result};
use crate::polynomial::Polynomial;

/// Message polynomial with coefficients in `[0, t)`, held in the
/// coefficient domain of the `q` ring.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Plaintext {
    poly: Polynomial,
}

impl Plaintext {
    /// Plaintext from exactly `n` values, each reduced mod `t`.
    pub fn new(values: &[u64], ctx: &FvContext) -> Result<Self> {
        if values.len() != ctx.degree() {
            return Err(Error::ShapeError(format!(
                "expected {} plaintext values, got {}",
                ctx.degree(),
                values.len()
            )));
        }
        let t = ctx.parameters().t;
        let coeffs = values.iter().map(|&v| BigInt::from(v % t)).collect();
        Ok(Self {
            poly: Polynomial::from_coefficients(coeffs, ctx.q_params())?,
        })
    }

    /// The all-zero message.
    pub fn zero(ctx: &FvContext) -> Self {
        Self {
            poly: Polynomial::zero(ctx.q_params()),
        }
    }

    pub(crate) fn from_poly(poly: Polynomial) -> Self {
        Self { poly }
    }

    /// Underlying coefficient-domain polynomial.
    pub fn poly(&self) -> &Polynomial {
        &self.poly
    }

    /// Message values, each in `[0, t)`.
    pub fn values(&self) -> Vec<u64> {
        self.poly
            .coefficients()
            .iter()
            // below t, which fits in a u64
            .map(|c| c.to_u64().unwrap_or_default())
            .collect()
    }
}
