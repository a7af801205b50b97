//! Secret, public and evaluation keys.

use std::sync::Arc;

use log::debug;
use num_bigint::BigInt;
use num_traits::One;
use rand::{CryptoRng, RngCore};

use crate::context::FvContext;
use crate::errors::Result;
use crate::polynomial::Polynomial;

/// Binary secret `s`, frequency domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecretKey {
    pub(crate) s: Polynomial,
}

impl SecretKey {
    /// The secret polynomial.
    pub fn poly(&self) -> &Polynomial {
        &self.s
    }
}

/// `(p0, p1) = (-(a s + e), a)`, frequency domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey {
    /// `-(a s + e)`.
    pub p0: Polynomial,
    /// Uniform `a`.
    pub p1: Polynomial,
}

/// Relinearization key: one pair per base-`2^w` digit of `q`,
/// `(-(a_i s + e_i) + 2^(w i) s^2, a_i)`, frequency domain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvaluationKey {
    pub(crate) bits: usize,
    pub(crate) digits: Vec<(Polynomial, Polynomial)>,
}

impl EvaluationKey {
    /// Digit width `w`.
    pub fn decomposition_bits(&self) -> usize {
        self.bits
    }

    /// One key pair per digit, lowest digit first.
    pub fn digits(&self) -> &[(Polynomial, Polynomial)] {
        &self.digits
    }
}

/// Samples fresh key material for a context.
pub struct KeyGenerator {
    ctx: Arc<FvContext>,
}

impl KeyGenerator {
    /// Key generator for `ctx`.
    pub fn new(ctx: &Arc<FvContext>) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Sample `-(a s + e)` together with the uniform `a`, both transformed.
    fn rlwe_pair<R: RngCore + CryptoRng>(
        &self,
        s: &Polynomial,
        rng: &mut R,
    ) -> Result<(Polynomial, Polynomial)> {
        let sampler = self.ctx.sampler();
        let params = self.ctx.q_params();
        let a = sampler
            .uniform_poly(params, self.ctx.modulus(), rng)?
            .to_frequency()?;
        let e = sampler.gaussian_poly(params, rng)?.to_frequency()?;
        let b = -a.mul_coeffs(s)?.add(&e)?;
        Ok((b, a))
    }

    /// Secret, public and evaluation keys from one fresh secret.
    pub fn generate<R: RngCore + CryptoRng>(
        &self,
        rng: &mut R,
    ) -> Result<(SecretKey, PublicKey, EvaluationKey)> {
        let ctx = &self.ctx;
        let s = ctx
            .sampler()
            .uniform_poly(ctx.q_params(), &BigInt::from(2), rng)?
            .to_frequency()?;

        let (p0, p1) = self.rlwe_pair(&s, rng)?;

        let s_squared = s.mul_coeffs(&s)?;
        let w = ctx.decomposition_bits();
        let digits = (0..ctx.digit_count())
            .map(|i| -> Result<(Polynomial, Polynomial)> {
                let (b, a) = self.rlwe_pair(&s, rng)?;
                let power = BigInt::one() << (w * i);
                let shifted = s_squared.mul_scalar(&power).modulo(ctx.modulus())?;
                Ok((b.add(&shifted)?, a))
            })
            .collect::<Result<Vec<_>>>()?;
        debug!("generated evaluation key with {} digits", digits.len());

        Ok((
            SecretKey { s },
            PublicKey { p0, p1 },
            EvaluationKey { bits: w, digits },
        ))
    }
}
