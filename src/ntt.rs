// ------------------------------------------------------------
// Negacyclic NTT butterflies over Z_q, q = 1 mod 2n
// ------------------------------------------------------------
//
// Forward: Cooley-Tukey decimation in frequency, natural-order input,
// bit-reversed output. Inverse: Gentleman-Sande, bit-reversed input,
// natural-order output, scaled by n^-1. Stage m only reads values written by
// stage m/2; butterflies inside a stage are independent.

use std::mem;

use num_bigint::BigInt;
use num_integer::Integer;

use crate::params::NttParameters;

/// In-place forward transform of `a` (length `n`).
pub(crate) fn forward(a: &mut [BigInt], params: &NttParameters) {
    let n = a.len();
    debug_assert_eq!(n, params.degree());
    let q = params.modulus();
    let psi = params.psi_reverse();

    let mut t = n;
    let mut m = 1;
    while m < n {
        t >>= 1;
        for i in 0..m {
            let j1 = 2 * i * t;
            let s = &psi[m + i];
            for j in j1..j1 + t {
                let u = mem::take(&mut a[j]);
                let v = (&a[j + t] * s).mod_floor(q);
                a[j] = (&u + &v).mod_floor(q);
                a[j + t] = (u - v).mod_floor(q);
            }
        }
        m <<= 1;
    }
}

/// In-place inverse transform of `a` (length `n`), including the `n^-1`
/// scaling.
pub(crate) fn inverse(a: &mut [BigInt], params: &NttParameters) {
    let n = a.len();
    debug_assert_eq!(n, params.degree());
    let q = params.modulus();
    let psi_inv = params.psi_inv_reverse();

    let mut t = 1;
    let mut m = n;
    while m > 1 {
        let h = m >> 1;
        let mut j1 = 0;
        for i in 0..h {
            let s = &psi_inv[h + i];
            for j in j1..j1 + t {
                let u = mem::take(&mut a[j]);
                let v = mem::take(&mut a[j + t]);
                a[j] = (&u + &v).mod_floor(q);
                a[j + t] = ((u - v) * s).mod_floor(q);
            }
            j1 += t << 1;
        }
        t <<= 1;
        m >>= 1;
    }

    let n_inv = params.n_inv();
    for x in a.iter_mut() {
        *x = (&*x * n_inv).mod_floor(q);
    }
}
