//! NTT parameter generation: primitive-root search by factoring `q - 1`, and
//! the bit-reversed twiddle tables consumed by the transforms.

use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::arith::{is_probable_prime, mod_inverse};
use crate::errors::{Error, Result};

/// Primes below 200, stripped off by trial division before Pollard's Rho.
const SMALL_PRIMES: [u32; 46] = [
    2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53, 59, 61, 67, 71, 73, 79, 83, 89,
    97, 101, 103, 107, 109, 113, 127, 131, 137, 139, 149, 151, 157, 163, 167, 173, 179, 181, 191,
    193, 197, 199,
];

/// Largest constant `c` tried in the Rho polynomial `x^2 + c`.
const MAX_RHO_CONSTANT: u32 = 64;

/// Transform tables for one `(n, q)` pair.
///
/// `psi_reverse[bit_reverse(i)] = psi^i` where `psi` is a primitive `2n`-th
/// root of unity modulo `q`; `psi_inv_reverse` holds the powers of its
/// inverse in the same order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NttParameters {
    n: usize,
    log_n: u32,
    q: BigInt,
    generator: BigInt,
    psi: BigInt,
    psi_reverse: Box<[BigInt]>,
    psi_inv_reverse: Box<[BigInt]>,
    n_inv: BigInt,
}

impl NttParameters {
    /// Build the tables for degree `n` and prime modulus `q`.
    ///
    /// Fails with `ConfigError` when `n` is not a power of two, when
    /// `q mod 2n != 1`, or when `q` is not prime.
    pub fn generate(n: usize, q: &BigInt) -> Result<Self> {
        if n < 2 || !n.is_power_of_two() {
            return Err(Error::ConfigError(format!(
                "degree {n} is not a power of two"
            )));
        }
        let two_n = BigInt::from(2 * n);
        if q <= &two_n || !q.mod_floor(&two_n).is_one() {
            return Err(Error::ConfigError(format!(
                "modulus {q} is not congruent to 1 modulo {two_n}"
            )));
        }
        if !is_probable_prime(q) {
            return Err(Error::ConfigError(format!("modulus {q} is not prime")));
        }

        let generator = primitive_root(q)?;
        let q_minus_one: BigInt = q - 1u32;
        let psi = generator.modpow(&(&q_minus_one / &two_n), q);
        let psi_inv = mod_inverse(&psi, q)
            .ok_or_else(|| Error::ConfigError(format!("{psi} is not invertible modulo {q}")))?;
        let n_inv = mod_inverse(&BigInt::from(n), q)
            .ok_or_else(|| Error::ConfigError(format!("{n} is not invertible modulo {q}")))?;

        let log_n = n.trailing_zeros();
        let mut psi_reverse = vec![BigInt::zero(); n];
        let mut psi_inv_reverse = vec![BigInt::zero(); n];
        let mut power = BigInt::one();
        let mut power_inv = BigInt::one();
        for i in 0..n {
            let j = bit_reverse(i, log_n);
            psi_reverse[j] = power.clone();
            psi_inv_reverse[j] = power_inv.clone();
            power = (&power * &psi).mod_floor(q);
            power_inv = (&power_inv * &psi_inv).mod_floor(q);
        }

        debug!("ntt parameters for n = {n}, q = {q}: generator {generator}, psi {psi}");

        Ok(Self {
            n,
            log_n,
            q: q.clone(),
            generator,
            psi,
            psi_reverse: psi_reverse.into_boxed_slice(),
            psi_inv_reverse: psi_inv_reverse.into_boxed_slice(),
            n_inv,
        })
    }

    /// Ring degree `n`.
    pub fn degree(&self) -> usize {
        self.n
    }

    /// `log2(n)`.
    pub fn log_degree(&self) -> u32 {
        self.log_n
    }

    /// Modulus `q`.
    pub fn modulus(&self) -> &BigInt {
        &self.q
    }

    /// Primitive root of `q` the tables were derived from.
    pub fn generator(&self) -> &BigInt {
        &self.generator
    }

    /// Primitive `2n`-th root of unity.
    pub fn psi(&self) -> &BigInt {
        &self.psi
    }

    /// Powers of `psi` in bit-reversed order.
    pub fn psi_reverse(&self) -> &[BigInt] {
        &self.psi_reverse
    }

    /// Powers of `psi^-1` in bit-reversed order.
    pub fn psi_inv_reverse(&self) -> &[BigInt] {
        &self.psi_inv_reverse
    }

    /// `n^-1 mod q`.
    pub fn n_inv(&self) -> &BigInt {
        &self.n_inv
    }
}

/// Reverse the low `bits` bits of `index`.
///
/// `bit_reverse(6, 3) == 3` (`110` becomes `011`).
pub fn bit_reverse(index: usize, bits: u32) -> usize {
    if bits == 0 {
        0
    } else {
        index.reverse_bits() >> (usize::BITS - bits)
    }
}

/// Distinct prime factors of `n`, in increasing order.
pub fn prime_factors(n: &BigInt) -> Result<Vec<BigInt>> {
    if !n.is_positive() {
        return Err(Error::ConfigError(format!("cannot factor {n}")));
    }
    let mut m = n.clone();
    let mut factors = Vec::new();

    for p in SMALL_PRIMES {
        let p = BigInt::from(p);
        if (&m % &p).is_zero() {
            while (&m % &p).is_zero() {
                m /= &p;
            }
            factors.push(p);
        }
    }

    let mut pending = Vec::new();
    if !m.is_one() {
        pending.push(m);
    }
    while let Some(m) = pending.pop() {
        if is_probable_prime(&m) {
            factors.push(m);
            continue;
        }
        let d = pollard_rho(&m, MAX_RHO_CONSTANT)?;
        pending.push(&m / &d);
        pending.push(d);
    }

    factors.sort();
    factors.dedup();
    Ok(factors)
}

/// One non-trivial divisor of the composite `m`, trying `x^2 + c` for
/// `c = 1..=max_constant`.
fn pollard_rho(m: &BigInt, max_constant: u32) -> Result<BigInt> {
    // Some constants cycle before splitting m; move on to the next one.
    for c in 1..=max_constant {
        let c = BigInt::from(c);
        let step = |x: &BigInt| (x * x + &c).mod_floor(m);
        let mut x = BigInt::from(2u32);
        let mut y = BigInt::from(2u32);
        let mut d = BigInt::one();
        while d.is_one() {
            x = step(&x);
            y = step(&step(&y));
            d = (&x - &y).abs().gcd(m);
        }
        if &d != m {
            return Ok(d);
        }
        debug!("pollard rho with c = {c} failed to split {m}");
    }
    Err(Error::ConfigError(format!("could not factor {m}")))
}

/// Smallest primitive root of the prime `q`.
pub fn primitive_root(q: &BigInt) -> Result<BigInt> {
    let q_minus_one: BigInt = q - 1u32;
    let factors = prime_factors(&q_minus_one)?;
    debug!("factors of {q_minus_one}: {factors:?}");

    let mut g = BigInt::from(2u32);
    while &g < q {
        if factors
            .iter()
            .all(|p| !g.modpow(&(&q_minus_one / p), q).is_one())
        {
            return Ok(g);
        }
        g += 1u32;
    }
    Err(Error::ConfigError(format!("{q} has no primitive root")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn big(v: u64) -> BigInt {
        BigInt::from(v)
    }

    fn bigs(values: &[u64]) -> Vec<BigInt> {
        values.iter().map(|&v| big(v)).collect()
    }

    #[test]
    fn test_bit_reverse() {
        assert_eq!(bit_reverse(6, 3), 3);
        assert_eq!(bit_reverse(1, 8), 128);
        assert_eq!(bit_reverse(0, 4), 0);
        assert_eq!(bit_reverse(0, 0), 0);
        for i in 0..64 {
            assert_eq!(bit_reverse(bit_reverse(i, 6), 6), i);
        }
    }

    #[test]
    fn test_prime_factors() {
        assert_eq!(prime_factors(&big(7680)).unwrap(), bigs(&[2, 3, 5]));
        assert_eq!(
            prime_factors(&big(1152921504382476288)).unwrap(),
            bigs(&[2, 3, 131, 358110657323])
        );
        assert_eq!(prime_factors(&big(1)).unwrap(), Vec::<BigInt>::new());
        assert!(prime_factors(&big(0)).is_err());
    }

    #[test]
    fn test_prime_factors_needs_rho() {
        // Both factors are above the trial-division table.
        assert_eq!(
            prime_factors(&big(1000003 * 1000033)).unwrap(),
            bigs(&[1000003, 1000033])
        );
        assert_eq!(
            prime_factors(&big(4611686018326724608)).unwrap(),
            bigs(&[2, 47189, 2912521])
        );
        assert_eq!(prime_factors(&big(1000003 * 1000003)).unwrap(), bigs(&[1000003]));
        // x^2 + 1 cycles on 211 * 239 without splitting it.
        assert_eq!(prime_factors(&big(50429)).unwrap(), bigs(&[211, 239]));
    }

    #[test]
    fn test_pollard_rho_retries_and_gives_up() {
        assert_eq!(pollard_rho(&big(50429), 2).unwrap(), big(239));
        assert_eq!(pollard_rho(&big(50429), MAX_RHO_CONSTANT).unwrap(), big(239));
        assert!(matches!(
            pollard_rho(&big(50429), 1),
            Err(Error::ConfigError(_))
        ));
    }

    #[test]
    fn test_primitive_root() {
        assert_eq!(primitive_root(&big(7681)).unwrap(), big(17));
        assert_eq!(primitive_root(&big(8380417)).unwrap(), big(10));
        assert_eq!(primitive_root(&big(257)).unwrap(), big(3));
        assert_eq!(primitive_root(&big(1152921504382476289)).unwrap(), big(11));
    }

    #[test]
    fn test_generate_tables() {
        let params = NttParameters::generate(256, &big(7681)).unwrap();
        assert_eq!(params.degree(), 256);
        assert_eq!(params.log_degree(), 8);
        assert_eq!(params.generator(), &big(17));
        assert_eq!(params.psi(), &big(7146));
        assert_eq!(&params.psi_reverse()[..4], bigs(&[1, 3383, 1925, 6468]).as_slice());
        assert_eq!(&params.psi_inv_reverse()[..4], bigs(&[1, 4298, 1213, 5756]).as_slice());
        assert_eq!(params.n_inv(), &big(7651));

        let params = NttParameters::generate(16, &big(257)).unwrap();
        assert_eq!(&params.psi_reverse()[..4], bigs(&[1, 241, 64, 4]).as_slice());
        assert_eq!(&params.psi_inv_reverse()[..4], bigs(&[1, 16, 253, 193]).as_slice());
    }

    #[test]
    fn test_psi_is_primitive_2n_th_root() {
        for (n, q) in [(16usize, 257u64), (64, 769), (256, 8380417)] {
            let q = big(q);
            let params = NttParameters::generate(n, &q).unwrap();
            let psi = params.psi();
            // psi^n = -1 makes psi a primitive 2n-th root.
            assert_eq!(psi.modpow(&BigInt::from(n), &q), &q - 1u32);
            for i in 0..n {
                let product = (&params.psi_reverse()[i] * &params.psi_inv_reverse()[i]) % &q;
                assert!(product.is_one());
            }
            assert!(((BigInt::from(n) * params.n_inv()) % &q).is_one());
        }
    }

    #[test]
    fn test_generate_rejects_bad_parameters() {
        // Not a power of two.
        assert!(matches!(
            NttParameters::generate(12, &big(97)),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            NttParameters::generate(1, &big(3)),
            Err(Error::ConfigError(_))
        ));
        // 7681 mod 1024 = 513.
        assert!(matches!(
            NttParameters::generate(512, &big(7681)),
            Err(Error::ConfigError(_))
        ));
        // 33 = 1 mod 16 but composite.
        assert!(matches!(
            NttParameters::generate(8, &big(33)),
            Err(Error::ConfigError(_))
        ));
        assert!(matches!(
            NttParameters::generate(8, &big(1)),
            Err(Error::ConfigError(_))
        ));
    }
}
