//! Homomorphic operations on ciphertexts.

use std::sync::Arc;

use log::trace;
use num_bigint::BigInt;
use num_traits::One;

use crate::ciphertext::Ciphertext;
use crate::context::FvContext;
use crate::errors::{Error, Result};
use crate::keys::EvaluationKey;
use crate::polynomial::Polynomial;

/// Runs homomorphic operations with a relinearization key.
pub struct Evaluator {
    ctx: Arc<FvContext>,
    ek: EvaluationKey,
}

impl Evaluator {
    /// Evaluator for ciphertexts of `ctx`, relinearizing with `ek`.
    pub fn new(ctx: &Arc<FvContext>, ek: &EvaluationKey) -> Self {
        Self {
            ctx: ctx.clone(),
            ek: ek.clone(),
        }
    }

    fn check(&self, ct: &Ciphertext) -> Result<()> {
        for p in [&ct.c0, &ct.c1] {
            if p.degree() != self.ctx.degree() || p.modulus() != self.ctx.modulus() {
                return Err(Error::ShapeError(format!(
                    "ciphertext over (n = {}, q = {}) does not belong to this context",
                    p.degree(),
                    p.modulus()
                )));
            }
        }
        Ok(())
    }

    /// Encrypts the sum of the two messages mod `t`.
    pub fn add(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check(a)?;
        self.check(b)?;
        Ok(Ciphertext::new(a.c0.add(&b.c0)?, a.c1.add(&b.c1)?))
    }

    /// Encrypts `a - b` mod `t`.
    pub fn sub(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check(a)?;
        self.check(b)?;
        Ok(Ciphertext::new(a.c0.sub(&b.c0)?, a.c1.sub(&b.c1)?))
    }

    /// Encrypts the negated message.
    pub fn negate(&self, a: &Ciphertext) -> Result<Ciphertext> {
        self.check(a)?;
        Ok(Ciphertext::new(-&a.c0, -&a.c1))
    }

    /// Centered lift of a `q`-ring component into the big ring, transformed.
    fn lift(&self, p: &Polynomial) -> Result<Polynomial> {
        p.to_coefficient()?
            .center()?
            .with_params(self.ctx.big_q_params())?
            .to_frequency()
    }

    /// `round(t x / q) mod q` for a big-ring product `x`, returned in the
    /// coefficient domain of the `q` ring.
    fn scale_down(&self, p: &Polynomial) -> Result<Polynomial> {
        let q = self.ctx.modulus();
        p.to_coefficient()?
            .center()?
            .mul_scalar(self.ctx.plain_modulus())
            .div_round(q)?
            .modulo(q)?
            .with_params(self.ctx.q_params())
    }

    /// Tensor product in the big ring, rescaled by `t / q` and relinearized
    /// back to two components.
    pub fn multiply(&self, a: &Ciphertext, b: &Ciphertext) -> Result<Ciphertext> {
        self.check(a)?;
        self.check(b)?;

        let (a0, a1) = (self.lift(&a.c0)?, self.lift(&a.c1)?);
        let (b0, b1) = (self.lift(&b.c0)?, self.lift(&b.c1)?);

        let t0 = a0.mul_coeffs(&b0)?;
        let t1 = a0.mul_coeffs(&b1)?.add(&a1.mul_coeffs(&b0)?)?;
        let t2 = a1.mul_coeffs(&b1)?;

        let mut c0 = self.scale_down(&t0)?.to_frequency()?;
        let mut c1 = self.scale_down(&t1)?.to_frequency()?;
        let mut rest = self.scale_down(&t2)?;

        let w = self.ek.bits;
        let mask = (BigInt::one() << w) - 1u32;
        for (k0, k1) in &self.ek.digits {
            let digit = rest.bit_and(&mask).to_frequency()?;
            rest = rest.shr(w);
            c0 = c0.add(&digit.mul_coeffs(k0)?)?;
            c1 = c1.add(&digit.mul_coeffs(k1)?)?;
        }
        trace!("relinearized over {} digits", self.ek.digits.len());

        Ok(Ciphertext::new(c0, c1))
    }
}
