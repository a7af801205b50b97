//! Uniform and discrete Gaussian samplers.
//!
//! The Gaussian sampler follows the BLISS construction: a binary Gaussian base
//! sample is stretched by `k` and corrected by exponential Bernoulli trials,
//! one per set bit of the rejection exponent. No floating-point CDF tables.

use std::f64::consts::LN_2;
use std::sync::Arc;

use log::trace;
use num_bigint::{BigInt, RandBigInt};
use num_traits::Signed;
use rand::{CryptoRng, Rng, RngCore};
use rand_distr::{Bernoulli, Distribution};

use crate::errors::{Error, Result};
use crate::params::NttParameters;
use crate::polynomial::Polynomial;

/// Default noise width.
pub const DEFAULT_SIGMA: f64 = 3.19;

/// Default bound on the retry loops of a single draw.
pub const DEFAULT_MAX_ATTEMPTS: usize = 1_000_000;

/// Samples further than this many standard deviations from zero are redrawn.
const TAIL_CUT: f64 = 6.0;

/// Rounds of the binary Gaussian inner loop before it restarts.
const BINARY_GAUSS_ROUNDS: u32 = 16;

/// Noise source for one parameter set.
#[derive(Debug, Clone)]
pub struct Sampler {
    sigma: f64,
    k: u64,
    tail_bound: u64,
    max_attempts: usize,
    // exp(-2^j / (2 sigma^2)) for every bit j of a u64 exponent
    bit_trials: Vec<Bernoulli>,
}

impl Sampler {
    /// Sampler of width `sigma` whose draws give up after `max_attempts`
    /// rejections.
    pub fn new(sigma: f64, max_attempts: usize) -> Result<Self> {
        if !sigma.is_finite() || sigma <= 0.0 {
            return Err(Error::ConfigError(format!("sigma {sigma} is not positive")));
        }
        if max_attempts == 0 {
            return Err(Error::ConfigError("max_attempts must be at least 1".to_string()));
        }
        let sigma2 = (1.0 / (2.0 * LN_2)).sqrt();
        let k = (sigma / sigma2).round();
        if k < 1.0 || k > f64::from(u32::MAX) {
            return Err(Error::ConfigError(format!(
                "sigma {sigma} gives a stretch factor of {k}"
            )));
        }

        let f = 2.0 * sigma * sigma;
        let bit_trials = (0..u64::BITS)
            .map(|j| {
                let p = (-(f64::from(j).exp2()) / f).exp();
                Bernoulli::new(p).map_err(|e| Error::ConfigError(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (k, tail_bound) = (k as u64, (TAIL_CUT * sigma).floor() as u64);
        Ok(Self {
            sigma,
            k,
            tail_bound,
            max_attempts,
            bit_trials,
        })
    }

    /// Configured Gaussian width.
    pub fn sigma(&self) -> f64 {
        self.sigma
    }

    /// Stretch factor `k = round(sigma / sigma2)`.
    pub fn k(&self) -> u64 {
        self.k
    }

    /// Retry bound of a single draw.
    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    /// Uniform value in `[0, bound)`, by rejection over `ceil(log2(bound))`
    /// random bits.
    pub fn uniform<R: RngCore + CryptoRng>(&self, bound: &BigInt, rng: &mut R) -> Result<BigInt> {
        if !bound.is_positive() {
            return Err(Error::ConfigError(format!("uniform bound {bound} is not positive")));
        }
        let bits = (bound - 1u32).bits();
        for attempt in 1..=self.max_attempts {
            let v = rng.gen_biguint(bits);
            if &v < bound.magnitude() {
                if attempt > 1 {
                    trace!("uniform sample below {bound} after {attempt} draws");
                }
                return Ok(BigInt::from(v));
            }
        }
        Err(Error::SamplingExhausted(self.max_attempts))
    }

    /// Base sample `x >= 0` with `P(x) ∝ 2^(-x^2)`.
    fn binary_gauss<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<u64> {
        'restart: for _ in 0..self.max_attempts {
            if !rng.gen::<bool>() {
                return Ok(0);
            }
            for i in 1..=BINARY_GAUSS_ROUNDS {
                let bits = 2 * i - 1;
                let draw: u64 = rng.gen_range(0..1u64 << bits);
                // Leading bits must all be zero; the last one decides.
                if draw >> 1 != 0 {
                    continue 'restart;
                }
                if draw & 1 == 0 {
                    return Ok(u64::from(i));
                }
            }
        }
        Err(Error::SamplingExhausted(self.max_attempts))
    }

    /// Bernoulli trial with success probability `exp(-x / (2 sigma^2))`.
    fn bernoulli_exp<R: RngCore + CryptoRng>(&self, x: u64, rng: &mut R) -> bool {
        let mut rest = x;
        let mut j = 0;
        while rest != 0 {
            if rest & 1 == 1 && !self.bit_trials[j].sample(rng) {
                return false;
            }
            rest >>= 1;
            j += 1;
        }
        true
    }

    /// Signed discrete Gaussian sample of width `sigma`, with `|z| <= 6 sigma`.
    pub fn gaussian<R: RngCore + CryptoRng>(&self, rng: &mut R) -> Result<i64> {
        let k = self.k;
        for attempt in 1..=self.max_attempts {
            let x = self.binary_gauss(rng)?;
            let y = rng.gen_range(0..k);
            let Some(exponent) = (2 * k)
                .checked_mul(x)
                .and_then(|v| v.checked_add(y))
                .and_then(|v| v.checked_mul(y))
            else {
                continue;
            };
            if !self.bernoulli_exp(exponent, rng) {
                continue;
            }

            let z = k * x + y;
            let positive = rng.gen::<bool>();
            // Zero would otherwise be drawn with both signs.
            if z == 0 && !positive {
                continue;
            }
            if z > self.tail_bound {
                continue;
            }
            let Ok(z) = i64::try_from(z) else {
                continue;
            };

            trace!("gaussian sample {z} after {attempt} rounds");
            return Ok(if positive { z } else { -z });
        }
        Err(Error::SamplingExhausted(self.max_attempts))
    }

    /// Coefficient-domain polynomial with entries uniform in `[0, bound)`,
    /// reduced mod the ring modulus.
    pub fn uniform_poly<R: RngCore + CryptoRng>(
        &self,
        params: &Arc<NttParameters>,
        bound: &BigInt,
        rng: &mut R,
    ) -> Result<Polynomial> {
        let coeffs = (0..params.degree())
            .map(|_| self.uniform(bound, rng))
            .collect::<Result<Vec<_>>>()?;
        Polynomial::from_coefficients(coeffs, params)
    }

    /// Coefficient-domain polynomial of Gaussian noise, reduced mod the ring
    /// modulus.
    pub fn gaussian_poly<R: RngCore + CryptoRng>(
        &self,
        params: &Arc<NttParameters>,
        rng: &mut R,
    ) -> Result<Polynomial> {
        let coeffs = (0..params.degree())
            .map(|_| self.gaussian(rng).map(BigInt::from))
            .collect::<Result<Vec<_>>>()?;
        Polynomial::from_coefficients(coeffs, params)
    }
}
