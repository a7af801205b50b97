//! Public-key encryption.

use std::sync::Arc;

use num_bigint::BigInt;
use rand::{CryptoRng, RngCore};

use crate::ciphertext::Ciphertext;
use crate::context::FvContext;
use crate::errors::Result;
use crate::keys::PublicKey;
use crate::plaintext::Plaintext;

/// Public-key encryptor bound to one context.
pub struct Encryptor {
    ctx: Arc<FvContext>,
    pk: PublicKey,
}

impl Encryptor {
    /// Encryptor under `pk`.
    pub fn new(ctx: &Arc<FvContext>, pk: &PublicKey) -> Self {
        Self {
            ctx: ctx.clone(),
            pk: pk.clone(),
        }
    }

    /// `(p0 u + delta m + e1, p1 u + e2)` with binary `u` and Gaussian
    /// `e1`, `e2`. The plaintext is left untouched.
    pub fn encrypt<R: RngCore + CryptoRng>(
        &self,
        pt: &Plaintext,
        rng: &mut R,
    ) -> Result<Ciphertext> {
        let ctx = &self.ctx;
        let params = ctx.q_params();
        let sampler = ctx.sampler();

        let delta_m = pt
            .poly()
            .mul_scalar(ctx.delta())
            .modulo(ctx.modulus())?
            .to_frequency()?;
        let u = sampler
            .uniform_poly(params, &BigInt::from(2), rng)?
            .to_frequency()?;
        let e1 = sampler.gaussian_poly(params, rng)?.to_frequency()?;
        let e2 = sampler.gaussian_poly(params, rng)?.to_frequency()?;

        let c0 = self.pk.p0.mul_coeffs(&u)?.add(&delta_m)?.add(&e1)?;
        let c1 = self.pk.p1.mul_coeffs(&u)?.add(&e2)?;
        Ok(Ciphertext::new(c0, c1))
    }

    /// Fresh encryption of the zero message.
    pub fn encrypt_zero<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<Ciphertext> {
        self.encrypt(&Plaintext::zero(&self.ctx), rng)
    }
}
