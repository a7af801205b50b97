//! Secret-key decryption and noise measurement.

use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{Signed, ToPrimitive, Zero};

use crate::ciphertext::Ciphertext;
use crate::context::FvContext;
use crate::errors::{Error, Result};
use crate::keys::SecretKey;
use crate::plaintext::Plaintext;
use crate::polynomial::Polynomial;

/// Holds the secret key; turns ciphertexts back into plaintexts.
pub struct Decryptor {
    ctx: Arc<FvContext>,
    sk: SecretKey,
}

impl Decryptor {
    /// Decryptor for ciphertexts of `ctx` under `sk`.
    pub fn new(ctx: &Arc<FvContext>, sk: &SecretKey) -> Self {
        Self {
            ctx: ctx.clone(),
            sk: sk.clone(),
        }
    }

    /// `c0 + c1 s` in the coefficient domain, in `[0, q)`.
    fn phase(&self, ct: &Ciphertext) -> Result<Polynomial> {
        ct.c1.mul_coeffs(&self.sk.s)?.add(&ct.c0)?.to_coefficient()
    }

    /// `round(t (c0 + c1 s) / q) mod t`.
    ///
    /// Noise beyond `q / 2t` yields a wrong plaintext, not an error.
    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Plaintext> {
        let scaled = self
            .phase(ct)?
            .center()?
            .mul_scalar(self.ctx.plain_modulus())
            .div_round(self.ctx.modulus())?
            .modulo(self.ctx.plain_modulus())?;
        Ok(Plaintext::from_poly(scaled))
    }

    /// Bits of noise headroom left in `ct` as an encryption of `expected`:
    /// `log2(q / 2t) - log2(max |v|)` with `v = [c0 + c1 s - delta m]_q`
    /// centered. Negative once the noise has outgrown `q / 2t`, at which
    /// point [`Decryptor::decrypt`] returns the wrong message.
    pub fn noise_budget(&self, ct: &Ciphertext, expected: &Plaintext) -> Result<f64> {
        let q = self.ctx.modulus();
        let delta_m = expected.poly().mul_scalar(self.ctx.delta()).modulo(q)?;
        let noise = self.phase(ct)?.sub(&delta_m)?.center()?;
        let max = noise
            .coefficients()
            .iter()
            .map(Signed::abs)
            .max()
            .unwrap_or_else(BigInt::zero);
        let log2 = |v: &BigInt| {
            v.to_f64()
                .map(f64::log2)
                .ok_or_else(|| Error::NumericError(format!("{v} does not fit an f64")))
        };
        let noise_bits = if max.is_zero() { 0.0 } else { log2(&max)? };
        let headroom = log2(q)? - log2(&(self.ctx.plain_modulus() * 2u32))?;
        Ok(headroom - noise_bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::FvParameters;
    use crate::encryptor::Encryptor;
    use crate::keys::KeyGenerator;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha20Rng;

    #[test]
    fn test_round_trip() {
        let params = FvParameters::new(
            32,
            10,
            "8380417".parse().unwrap(),
            "4611686018326724609".parse().unwrap(),
        );
        let ctx = FvContext::new(params).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(40);
        let (sk, pk, _) = KeyGenerator::new(&ctx).generate(&mut rng).unwrap();
        let encryptor = Encryptor::new(&ctx, &pk);
        let decryptor = Decryptor::new(&ctx, &sk);

        for _ in 0..10 {
            let values: Vec<u64> = (0..32).map(|_| rng.gen_range(0..10)).collect();
            let pt = Plaintext::new(&values, &ctx).unwrap();
            let ct = encryptor.encrypt(&pt, &mut rng).unwrap();
            assert_eq!(decryptor.decrypt(&ct).unwrap().values(), values);
        }
    }

    #[test]
    fn test_constant_message() {
        let params = FvParameters::new(
            256,
            30,
            "8380417".parse().unwrap(),
            "4611686018326724609".parse().unwrap(),
        );
        let ctx = FvContext::new(params).unwrap();
        let mut rng = ChaCha20Rng::seed_from_u64(41);
        let (sk, pk, _) = KeyGenerator::new(&ctx).generate(&mut rng).unwrap();

        let pt = Plaintext::new(&[9; 256], &ctx).unwrap();
        let ct = Encryptor::new(&ctx, &pk).encrypt(&pt, &mut rng).unwrap();
        assert_eq!(Decryptor::new(&ctx, &sk).decrypt(&ct).unwrap(), pt);
    }

    fn small_context() -> Arc<FvContext> {
        let params = FvParameters::new(
            32,
            10,
            "8380417".parse().unwrap(),
            "4611686018326724609".parse().unwrap(),
        );
        FvContext::new(params).unwrap()
    }

    /// Adds `amount` to the constant coefficient of `c0`.
    fn shift_constant(ctx: &Arc<FvContext>, ct: &Ciphertext, amount: i64) -> Ciphertext {
        let mut bump = vec![0i64; ctx.degree()];
        bump[0] = amount;
        let bump = Polynomial::from_i64s(&bump, ctx.q_params())
            .unwrap()
            .to_frequency()
            .unwrap();
        Ciphertext::new(ct.c0.add(&bump).unwrap(), ct.c1.clone())
    }

    #[test]
    fn test_noise_budget() {
        let ctx = small_context();
        let mut rng = ChaCha20Rng::seed_from_u64(42);
        let (sk, pk, _) = KeyGenerator::new(&ctx).generate(&mut rng).unwrap();
        let encryptor = Encryptor::new(&ctx, &pk);
        let decryptor = Decryptor::new(&ctx, &sk);
        let headroom = (8380417f64 / 20.0).log2();

        let zero = Plaintext::zero(&ctx);
        let ct = encryptor.encrypt_zero(&mut rng).unwrap();
        let budget = decryptor.noise_budget(&ct, &zero).unwrap();
        // q / 2t is about 2^18.7 and fresh noise stays well below 2^12.
        assert!(budget > 6.0 && budget < headroom, "budget {budget}");

        let values: Vec<u64> = (0..32).map(|_| rng.gen_range(0..10)).collect();
        let pt = Plaintext::new(&values, &ctx).unwrap();
        let ct = encryptor.encrypt(&pt, &mut rng).unwrap();
        let budget = decryptor.noise_budget(&ct, &pt).unwrap();
        assert!(budget > 6.0 && budget < headroom, "budget {budget}");

        // A ciphertext with no noise at all.
        let clean = Ciphertext::new(
            Polynomial::zero(ctx.q_params()).to_frequency().unwrap(),
            Polynomial::zero(ctx.q_params()).to_frequency().unwrap(),
        );
        let full = decryptor.noise_budget(&clean, &zero).unwrap();
        assert!((full - headroom).abs() < 1e-9);
    }

    #[test]
    fn test_noise_budget_goes_negative() {
        let ctx = small_context();
        let mut rng = ChaCha20Rng::seed_from_u64(43);
        let (sk, pk, _) = KeyGenerator::new(&ctx).generate(&mut rng).unwrap();
        let decryptor = Decryptor::new(&ctx, &sk);
        let zero = Plaintext::zero(&ctx);
        let ct = Encryptor::new(&ctx, &pk).encrypt_zero(&mut rng).unwrap();

        // Just past q / 2t = 419020.85.
        let noisy = shift_constant(&ctx, &ct, 8380417 / 20 + 1000);
        let budget = decryptor.noise_budget(&noisy, &zero).unwrap();
        assert!(budget < 0.0, "budget {budget}");

        // Well inside the bound the budget stays positive.
        let mild = shift_constant(&ctx, &ct, 1000);
        assert!(decryptor.noise_budget(&mild, &zero).unwrap() > 0.0);
    }

    #[test]
    fn test_excess_noise_decrypts_silently_wrong() {
        let ctx = small_context();
        let mut rng = ChaCha20Rng::seed_from_u64(44);
        let (sk, pk, _) = KeyGenerator::new(&ctx).generate(&mut rng).unwrap();
        let decryptor = Decryptor::new(&ctx, &sk);
        let ct = Encryptor::new(&ctx, &pk).encrypt_zero(&mut rng).unwrap();

        let noisy = shift_constant(&ctx, &ct, 8380417 / 20 + 1000);
        let values = decryptor.decrypt(&noisy).unwrap().values();
        assert_ne!(values, vec![0; 32]);
        assert_eq!(values[0], 1);
        assert!(values[1..].iter().all(|&v| v == 0));
    }
}
