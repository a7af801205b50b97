//! Big-integer helpers with the exact rounding and reduction semantics the
//! ring engine relies on.

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::errors::{Error, Result};

/// Bases for the Miller-Rabin test; deterministic below 3.3·10^24.
const WITNESSES: [u32; 13] = [2, 3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41];

/// Rounded division `a / b`, ties rounded away from zero.
///
/// `div_round(5, 2) == 3`, `div_round(-5, 2) == -3`, `div_round(5, -2) == -3`.
pub fn div_round(a: &BigInt, b: &BigInt) -> Result<BigInt> {
    if b.is_zero() {
        return Err(Error::NumericError("rounded division by zero".to_string()));
    }
    // `/` and `%` on BigInt truncate toward zero.
    let mut quotient = a / b;
    let remainder = a % b;
    if remainder.abs() * 2u32 >= b.abs() {
        if a.is_negative() != b.is_negative() {
            quotient -= 1;
        } else {
            quotient += 1;
        }
    }
    Ok(quotient)
}

/// Truncating division, rejecting a zero divisor.
pub fn div_trunc(a: &BigInt, b: &BigInt) -> Result<BigInt> {
    if b.is_zero() {
        return Err(Error::NumericError("division by zero".to_string()));
    }
    Ok(a / b)
}

/// Reduction into `[0, |m|)`, rejecting a zero modulus.
pub fn reduce(a: &BigInt, m: &BigInt) -> Result<BigInt> {
    if m.is_zero() {
        return Err(Error::NumericError("reduction modulo zero".to_string()));
    }
    Ok(a.mod_floor(&m.abs()))
}

/// Modular inverse of `a` modulo `m`, if it exists.
pub fn mod_inverse(a: &BigInt, m: &BigInt) -> Option<BigInt> {
    if m.is_zero() {
        return None;
    }
    let egcd = a.mod_floor(m).extended_gcd(m);
    if egcd.gcd.is_one() {
        Some(egcd.x.mod_floor(m))
    } else {
        None
    }
}

/// Miller-Rabin probable-prime test.
pub fn is_probable_prime(n: &BigInt) -> bool {
    let two = BigInt::from(2u32);
    if n < &two {
        return false;
    }
    for w in WITNESSES {
        let w = BigInt::from(w);
        if n == &w {
            return true;
        }
        if (n % &w).is_zero() {
            return false;
        }
    }

    let n_minus_one = n - 1u32;
    let Some(s) = n_minus_one.trailing_zeros() else {
        return false;
    };
    let d = &n_minus_one >> s;

    'witness: for w in WITNESSES {
        let mut x = BigInt::from(w).modpow(&d, n);
        if x.is_one() || x == n_minus_one {
            continue;
        }
        for _ in 1..s {
            x = (&x * &x).mod_floor(n);
            if x == n_minus_one {
                continue 'witness;
            }
        }
        return false;
    }
    true
}
