//! Polynomials in Z_q[X]/(X^n + 1) with big-integer coefficients and an
//! explicit transform domain.

use std::ops::Neg;
use std::sync::Arc;

use itertools::izip;
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::arith;
use crate::errors::{Error, Result};
use crate::ntt;
use crate::params::NttParameters;

/// Representation a polynomial is currently held in.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Domain {
    /// Coefficients `c_0, ..., c_(n-1)` of `c_0 + c_1 X + ...`.
    #[default]
    Coefficient,
    /// Evaluations at the odd powers of `psi`, in bit-reversed order.
    Frequency,
}

/// f(x) = coeffs[0] + coeffs[1]·x + ... + coeffs[n-1]·x^(n-1)
///
/// The forward and inverse transforms are the only operations that change
/// the domain; every binary operation requires both operands to share degree,
/// modulus and domain. Everything except the transforms returns a fresh value.
#[derive(Debug, Clone)]
pub struct Polynomial {
    coeffs: Vec<BigInt>,
    domain: Domain,
    params: Arc<NttParameters>,
}

impl PartialEq for Polynomial {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.degree() == other.degree()
            && self.modulus() == other.modulus()
            && self.coeffs == other.coeffs
    }
}

impl Eq for Polynomial {}

impl Polynomial {
    /// Zero polynomial in the coefficient domain.
    pub fn zero(params: &Arc<NttParameters>) -> Self {
        Self {
            coeffs: vec![BigInt::zero(); params.degree()],
            domain: Domain::Coefficient,
            params: params.clone(),
        }
    }

    /// Coefficient-domain polynomial from exactly `n` coefficients, reduced
    /// into `[0, q)`.
    pub fn from_coefficients(coeffs: Vec<BigInt>, params: &Arc<NttParameters>) -> Result<Self> {
        if coeffs.len() != params.degree() {
            return Err(Error::ShapeError(format!(
                "expected {} coefficients, got {}",
                params.degree(),
                coeffs.len()
            )));
        }
        let q = params.modulus();
        Ok(Self {
            coeffs: coeffs.into_iter().map(|c| c.mod_floor(q)).collect(),
            domain: Domain::Coefficient,
            params: params.clone(),
        })
    }

    /// Shorthand for [`Polynomial::from_coefficients`] on machine integers.
    pub fn from_i64s(values: &[i64], params: &Arc<NttParameters>) -> Result<Self> {
        Self::from_coefficients(values.iter().map(|&v| BigInt::from(v)).collect(), params)
    }

    /// Coefficients, or evaluations in the frequency domain.
    pub fn coefficients(&self) -> &[BigInt] {
        &self.coeffs
    }

    /// Current representation.
    pub fn domain(&self) -> Domain {
        self.domain
    }

    /// Ring degree `n`.
    pub fn degree(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient modulus `q`.
    pub fn modulus(&self) -> &BigInt {
        self.params.modulus()
    }

    /// Tables of the ring this polynomial lives in.
    pub fn params(&self) -> &Arc<NttParameters> {
        &self.params
    }

    /// Coefficient → Frequency, in place.
    pub fn forward_transform(&mut self) -> Result<()> {
        self.expect_domain(Domain::Coefficient)?;
        ntt::forward(&mut self.coeffs, &self.params);
        self.domain = Domain::Frequency;
        Ok(())
    }

    /// Frequency → Coefficient, in place.
    pub fn inverse_transform(&mut self) -> Result<()> {
        self.expect_domain(Domain::Frequency)?;
        ntt::inverse(&mut self.coeffs, &self.params);
        self.domain = Domain::Coefficient;
        Ok(())
    }

    /// Transformed copy; `self` is left untouched.
    pub fn to_frequency(&self) -> Result<Self> {
        let mut p = self.clone();
        p.forward_transform()?;
        Ok(p)
    }

    /// Inverse-transformed copy; `self` is left untouched.
    pub fn to_coefficient(&self) -> Result<Self> {
        let mut p = self.clone();
        p.inverse_transform()?;
        Ok(p)
    }

    fn expect_domain(&self, expected: Domain) -> Result<()> {
        if self.domain == expected {
            Ok(())
        } else {
            Err(Error::DomainError {
                expected,
                found: self.domain,
            })
        }
    }

    fn check_shape(&self, other: &Self) -> Result<()> {
        if self.degree() != other.degree() || self.modulus() != other.modulus() {
            return Err(Error::ShapeError(format!(
                "operands over (n = {}, q = {}) and (n = {}, q = {})",
                self.degree(),
                self.modulus(),
                other.degree(),
                other.modulus()
            )));
        }
        Ok(())
    }

    fn check_compatible(&self, other: &Self) -> Result<()> {
        self.check_shape(other)?;
        other.expect_domain(self.domain)
    }

    fn map<F>(&self, f: F) -> Self
    where
        F: Fn(&BigInt) -> BigInt,
    {
        Self {
            coeffs: self.coeffs.iter().map(f).collect(),
            domain: self.domain,
            params: self.params.clone(),
        }
    }

    fn try_map<F>(&self, f: F) -> Result<Self>
    where
        F: Fn(&BigInt) -> Result<BigInt>,
    {
        Ok(Self {
            coeffs: self.coeffs.iter().map(f).collect::<Result<_>>()?,
            domain: self.domain,
            params: self.params.clone(),
        })
    }

    fn zip_map<F>(&self, other: &Self, f: F) -> Result<Self>
    where
        F: Fn(&BigInt, &BigInt) -> BigInt,
    {
        self.check_compatible(other)?;
        Ok(Self {
            coeffs: izip!(&self.coeffs, &other.coeffs)
                .map(|(a, b)| f(a, b))
                .collect(),
            domain: self.domain,
            params: self.params.clone(),
        })
    }

    /// `(self + other) mod q`.
    pub fn add(&self, other: &Self) -> Result<Self> {
        let q = self.modulus();
        self.zip_map(other, |a, b| (a + b).mod_floor(q))
    }

    /// `(self - other) mod q`.
    pub fn sub(&self, other: &Self) -> Result<Self> {
        let q = self.modulus();
        self.zip_map(other, |a, b| (a - b).mod_floor(q))
    }

    /// Pointwise `(self_i * other_i) mod q`; the ring product when both
    /// operands are in the frequency domain.
    pub fn mul_coeffs(&self, other: &Self) -> Result<Self> {
        let q = self.modulus();
        self.zip_map(other, |a, b| (a * b).mod_floor(q))
    }

    /// `self_i * scalar`, not reduced.
    pub fn mul_scalar(&self, scalar: &BigInt) -> Self {
        self.map(|c| c * scalar)
    }

    /// `self_i / scalar`, truncated toward zero.
    pub fn div(&self, scalar: &BigInt) -> Result<Self> {
        self.try_map(|c| arith::div_trunc(c, scalar))
    }

    /// `self_i / scalar`, rounded half away from zero.
    pub fn div_round(&self, scalar: &BigInt) -> Result<Self> {
        self.try_map(|c| arith::div_round(c, scalar))
    }

    /// `self_i mod m`, into `[0, |m|)`.
    pub fn modulo(&self, m: &BigInt) -> Result<Self> {
        self.try_map(|c| arith::reduce(c, m))
    }

    /// `self_i & mask`.
    pub fn bit_and(&self, mask: &BigInt) -> Self {
        self.map(|c| c & mask)
    }

    /// `self_i << bits`.
    pub fn shl(&self, bits: usize) -> Self {
        self.map(|c| c << bits)
    }

    /// `self_i >> bits`.
    pub fn shr(&self, bits: usize) -> Self {
        self.map(|c| c >> bits)
    }

    /// Representatives in `(-q/2, q/2]`: any residue above `floor(q/2)` has
    /// `q` subtracted.
    pub fn center(&self) -> Result<Self> {
        self.expect_domain(Domain::Coefficient)?;
        let q = self.modulus();
        let half = q >> 1u32;
        Ok(self.map(|c| {
            let r = c.mod_floor(q);
            if r > half {
                r - q
            } else {
                r
            }
        }))
    }

    /// Same coefficient representatives, read in the ring described by
    /// `params` and reduced into its `[0, q')`.
    pub fn with_params(&self, params: &Arc<NttParameters>) -> Result<Self> {
        self.expect_domain(Domain::Coefficient)?;
        if params.degree() != self.degree() {
            return Err(Error::ShapeError(format!(
                "cannot move a degree {} polynomial into a degree {} ring",
                self.degree(),
                params.degree()
            )));
        }
        Self::from_coefficients(self.coeffs.clone(), params)
    }

    /// Negacyclic product via the NTT, returned in the coefficient domain.
    ///
    /// Coefficient-domain operands are transformed on copies, frequency-domain
    /// operands are used directly.
    pub fn multiply(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let mut product = match self.domain {
            Domain::Coefficient => self.to_frequency()?.mul_coeffs(&other.to_frequency()?)?,
            Domain::Frequency => self.mul_coeffs(other)?,
        };
        product.inverse_transform()?;
        Ok(product)
    }

    /// Quadratic-time reference product modulo `X^n + 1` and `q`.
    pub fn multiply_schoolbook(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        self.expect_domain(Domain::Coefficient)?;
        let n = self.degree();
        let mut acc = vec![BigInt::zero(); n];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                let prod = a * b;
                // X^n = -1
                if i + j < n {
                    acc[i + j] += prod;
                } else {
                    acc[i + j - n] -= prod;
                }
            }
        }
        Self::from_coefficients(acc, &self.params)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        let q = self.modulus();
        self.map(|c| (-c).mod_floor(q))
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Polynomial {
        -&self
    }
}
