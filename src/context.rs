//! Global FV parameters and the derived, shared context.

use std::sync::Arc;

use log::{debug, warn};
use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};
use crate::params::NttParameters;
use crate::sampler::{Sampler, DEFAULT_MAX_ATTEMPTS, DEFAULT_SIGMA};

/// Default relinearization digit width, in bits.
pub const DEFAULT_DECOMPOSITION_BITS: usize = 16;

fn default_sigma() -> f64 {
    DEFAULT_SIGMA
}

fn default_decomposition_bits() -> usize {
    DEFAULT_DECOMPOSITION_BITS
}

fn default_max_sampling_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}

/// Big moduli travel as decimal strings.
mod decimal {
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &BigInt, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BigInt, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.trim().parse().map_err(de::Error::custom)
    }
}

/// User-facing parameter set. Nothing is checked until [`FvContext::new`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FvParameters {
    /// Ring degree, a power of two.
    pub n: usize,
    /// Plaintext modulus.
    pub t: u64,
    /// Ciphertext modulus, a prime with `q = 1 mod 2n`.
    #[serde(with = "decimal")]
    pub q: BigInt,
    /// Multiplication modulus, a prime above `q^2` with `big_q = 1 mod 2n`.
    #[serde(with = "decimal")]
    pub big_q: BigInt,
    /// Width of the discrete Gaussian noise.
    #[serde(default = "default_sigma")]
    pub sigma: f64,
    /// Relinearization digit width `w`.
    #[serde(default = "default_decomposition_bits")]
    pub decomposition_bits: usize,
    /// Bound on the retry loops of a single sampler draw.
    #[serde(default = "default_max_sampling_attempts")]
    pub max_sampling_attempts: usize,
}

impl FvParameters {
    /// Parameter set with the default sigma, digit width and retry bound.
    pub fn new(n: usize, t: u64, q: BigInt, big_q: BigInt) -> Self {
        Self {
            n,
            t,
            q,
            big_q,
            sigma: DEFAULT_SIGMA,
            decomposition_bits: DEFAULT_DECOMPOSITION_BITS,
            max_sampling_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Replace the Gaussian width.
    #[must_use]
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    /// Replace the relinearization digit width.
    #[must_use]
    pub fn with_decomposition_bits(mut self, bits: usize) -> Self {
        self.decomposition_bits = bits;
        self
    }

    /// Replace the sampler retry bound.
    #[must_use]
    pub fn with_max_sampling_attempts(mut self, attempts: usize) -> Self {
        self.max_sampling_attempts = attempts;
        self
    }
}

/// Validated parameters plus everything derived from them: `delta`, the
/// digit count and the transform tables for both moduli.
///
/// Built once and shared through `Arc` by keys, encryptors, decryptors and
/// evaluators.
#[derive(Debug)]
pub struct FvContext {
    params: FvParameters,
    t: BigInt,
    delta: BigInt,
    digit_count: usize,
    q_params: Arc<NttParameters>,
    big_q_params: Arc<NttParameters>,
    sampler: Sampler,
}

impl FvContext {
    /// Validate `params` and derive the tables; `ConfigError` on any bad value.
    pub fn new(params: FvParameters) -> Result<Arc<Self>> {
        if params.decomposition_bits == 0 {
            return Err(Error::ConfigError(
                "decomposition width must be at least one bit".to_string(),
            ));
        }
        if params.t < 2 {
            return Err(Error::ConfigError(format!(
                "plaintext modulus {} is below 2",
                params.t
            )));
        }
        let t = BigInt::from(params.t);
        if t >= params.q {
            return Err(Error::ConfigError(format!(
                "plaintext modulus {} is not below q = {}",
                params.t, params.q
            )));
        }
        let q_squared = &params.q * &params.q;
        if params.big_q <= q_squared {
            return Err(Error::ConfigError(format!(
                "big_q = {} does not exceed q^2",
                params.big_q
            )));
        }
        if params.big_q <= &q_squared * BigInt::from(params.n) {
            warn!(
                "big_q = {} is below n * q^2; products in the big ring may wrap",
                params.big_q
            );
        }

        let sampler = Sampler::new(params.sigma, params.max_sampling_attempts)?;
        let q_params = Arc::new(NttParameters::generate(params.n, &params.q)?);
        let big_q_params = Arc::new(NttParameters::generate(params.n, &params.big_q)?);

        let delta = &params.q / &t;
        let q_bits = usize::try_from(params.q.bits())
            .map_err(|_| Error::ConfigError(format!("q = {} is too large", params.q)))?;
        let digit_count = q_bits.div_ceil(params.decomposition_bits);

        debug!(
            "fv context: n = {}, t = {}, q = {}, big_q = {}, delta = {delta}, {digit_count} digits of {} bits",
            params.n, params.t, params.q, params.big_q, params.decomposition_bits
        );

        Ok(Arc::new(Self {
            params,
            t,
            delta,
            digit_count,
            q_params,
            big_q_params,
            sampler,
        }))
    }

    /// The parameters this context was built from.
    pub fn parameters(&self) -> &FvParameters {
        &self.params
    }

    /// Ring degree `n`.
    pub fn degree(&self) -> usize {
        self.params.n
    }

    /// Plaintext modulus `t`.
    pub fn plain_modulus(&self) -> &BigInt {
        &self.t
    }

    /// Ciphertext modulus `q`.
    pub fn modulus(&self) -> &BigInt {
        &self.params.q
    }

    /// Multiplication modulus.
    pub fn big_modulus(&self) -> &BigInt {
        &self.params.big_q
    }

    /// `floor(q / t)`.
    pub fn delta(&self) -> &BigInt {
        &self.delta
    }

    /// Digit width `w`.
    pub fn decomposition_bits(&self) -> usize {
        self.params.decomposition_bits
    }

    /// Number of base-`2^w` digits of `q`, `ceil(bitlen(q) / w)`.
    pub fn digit_count(&self) -> usize {
        self.digit_count
    }

    /// Transform tables for `q`.
    pub fn q_params(&self) -> &Arc<NttParameters> {
        &self.q_params
    }

    /// Transform tables for `big_q`.
    pub fn big_q_params(&self) -> &Arc<NttParameters> {
        &self.big_q_params
    }

    /// Noise source shared by key generation and encryption.
    pub fn sampler(&self) -> &Sampler {
        &self.sampler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(s: &str) -> BigInt {
        s.parse().unwrap()
    }

    fn small_params() -> FvParameters {
        FvParameters::new(32, 10, big("8380417"), big("4611686018326724609"))
            .with_decomposition_bits(8)
    }

    #[test]
    fn test_derived_values() {
        let ctx = FvContext::new(small_params()).unwrap();
        assert_eq!(ctx.degree(), 32);
        assert_eq!(ctx.delta(), &BigInt::from(838041));
        // 8380417 has 23 bits.
        assert_eq!(ctx.digit_count(), 3);
        assert_eq!(ctx.q_params().modulus(), ctx.modulus());
        assert_eq!(ctx.big_q_params().modulus(), ctx.big_modulus());
        assert_eq!(ctx.q_params().degree(), 32);
        assert_eq!(ctx.sampler().k(), 4);

        let ctx = FvContext::new(small_params().with_decomposition_bits(16)).unwrap();
        assert_eq!(ctx.digit_count(), 2);
        let ctx = FvContext::new(small_params().with_decomposition_bits(64)).unwrap();
        assert_eq!(ctx.digit_count(), 1);
    }

    #[test]
    fn test_defaults() {
        let params = FvParameters::new(32, 10, big("8380417"), big("4611686018326724609"));
        assert_eq!(params.sigma, DEFAULT_SIGMA);
        assert_eq!(params.decomposition_bits, DEFAULT_DECOMPOSITION_BITS);
        assert_eq!(params.max_sampling_attempts, DEFAULT_MAX_ATTEMPTS);
    }

    #[test]
    fn test_rejects_invalid_parameters() {
        let cases = [
            small_params().with_decomposition_bits(0),
            FvParameters { t: 1, ..small_params() },
            FvParameters { t: 8380417, ..small_params() },
            // big_q must exceed q^2
            FvParameters { big_q: big("70231389093889"), ..small_params() },
            // not a power of two
            FvParameters { n: 24, ..small_params() },
            // 7681 is not 1 mod 1024
            FvParameters { n: 512, q: big("7681"), ..small_params() },
            // 4611686018326724611 = 3 mod 64
            FvParameters { big_q: big("4611686018326724611"), ..small_params() },
            // 4611686018326724609 * 65 = 1 mod 64 but composite
            FvParameters { big_q: big("299759591191237099585"), ..small_params() },
            small_params().with_sigma(0.0),
            small_params().with_max_sampling_attempts(0),
        ];
        for params in cases {
            assert!(
                matches!(FvContext::new(params.clone()), Err(Error::ConfigError(_))),
                "{params:?} accepted"
            );
        }
    }

    #[test]
    fn test_accepts_narrow_big_modulus() {
        // q^2 < big_q < n * q^2 only warns.
        let params = FvParameters::new(16, 2, big("257"), big("114689"));
        assert!(FvContext::new(params).is_ok());
    }
}
