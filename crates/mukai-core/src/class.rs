//! The truncated cohomology ring of a polarized surface
//!
//! A class is `(c0, c1, c2)`: rank, the coefficient of the polarization `H`
//! in degree 1, and the degree-2 part of the Chern character. The ring is
//! parameterized by `d = H²`, which every class carries with it.

use crate::scalar::Scalar;
use crate::{CohomologyError, Result};
use log::trace;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// A truncated Chern character on a surface of degree `d`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohomologyClass {
    components: [Scalar; 3],
    degree: Scalar,
}

impl CohomologyClass {
    pub fn new(components: [Scalar; 3], degree: impl Into<Scalar>) -> Self {
        CohomologyClass {
            components,
            degree: degree.into(),
        }
    }

    /// Build a class from integer components.
    pub fn from_ints(c0: i64, c1: i64, c2: i64, degree: impl Into<Scalar>) -> Self {
        Self::new([c0.into(), c1.into(), c2.into()], degree)
    }

    /// The multiplicative identity `(1, 0, 0)`.
    pub fn identity(degree: impl Into<Scalar>) -> Self {
        Self::from_ints(1, 0, 0, degree)
    }

    pub fn zero(degree: impl Into<Scalar>) -> Self {
        Self::from_ints(0, 0, 0, degree)
    }

    pub fn components(&self) -> [Scalar; 3] {
        self.components
    }

    pub fn degree(&self) -> Scalar {
        self.degree
    }

    pub fn rank(&self) -> Scalar {
        self.components[0]
    }

    pub fn get(&self, index: usize) -> Result<Scalar> {
        self.components
            .get(index)
            .copied()
            .ok_or(CohomologyError::InvalidIndex(index))
    }

    pub fn set(&mut self, index: usize, value: impl Into<Scalar>) -> Result<()> {
        let slot = self
            .components
            .get_mut(index)
            .ok_or(CohomologyError::InvalidIndex(index))?;
        *slot = value.into();
        Ok(())
    }

    /// Mukai vector `(c0, c1, c0 + c2)`.
    pub fn mukai(&self) -> [Scalar; 3] {
        let [c0, c1, c2] = self.components;
        [c0, c1, c0 + c2]
    }

    /// Component `l` of the Chern character twisted by `-b·H`.
    ///
    /// - `l = 0`: `c0`, unchanged
    /// - `l = 1`: `-b·c0 + c1`, truncated toward zero
    /// - `l = 2`: `d·(b²/2·c0 - b·c1) + c2`, truncated toward zero
    pub fn ch(&self, l: usize, b: impl Into<Scalar>) -> Result<Scalar> {
        let twisted = self.twisted(b.into());
        match l {
            0 => Ok(twisted[0]),
            1 | 2 => Ok(twisted[l].trunc()),
            _ => Err(CohomologyError::InvalidChernDegree(l)),
        }
    }

    /// All three twisted components, untruncated.
    pub(crate) fn twisted(&self, b: Scalar) -> [Scalar; 3] {
        let [c0, c1, c2] = self.components;
        let half = Scalar::ratio(1, 2);
        [
            c0,
            -(b * c0) + c1,
            self.degree * (b.square() * half * c0 - b * c1) + c2,
        ]
    }

    /// Dual class `(c0, -c1, c2)`.
    pub fn dual(&self) -> Self {
        let [c0, c1, c2] = self.components;
        Self::new([c0, -c1, c2], self.degree)
    }

    /// Cup product in the truncated ring, tagged with `self`'s degree.
    pub fn cup(&self, other: &CohomologyClass) -> Self {
        let [a0, a1, a2] = self.components;
        let [b0, b1, b2] = other.components;
        Self::new(
            [
                a0 * b0,
                a1 * b0 + a0 * b1,
                a2 * b0 + a1 * b1 * self.degree + a0 * b2,
            ],
            self.degree,
        )
    }

    pub fn scale(&self, factor: impl Into<Scalar>) -> Self {
        let factor = factor.into();
        Self::new(self.components.map(|c| c * factor), self.degree)
    }

    /// Formal inverse. Only classes of rank `±1` are units.
    pub fn inverse(&self) -> Result<Self> {
        let [c0, c1, c2] = self.components;
        if c0.is_zero() {
            return Err(CohomologyError::DivisionByZero);
        }
        if c0.abs() != Scalar::ONE {
            return Err(CohomologyError::NotInvertible(c0));
        }
        Ok(Self::new(
            [c0, -c1, c0 * c1.square() * self.degree - c2],
            self.degree,
        ))
    }

    /// Integer power by repeated squaring. Negative exponents go through
    /// [`inverse`](Self::inverse).
    pub fn pow(&self, n: i64) -> Result<Self> {
        trace!("pow {self} ^ {n}");
        let mut base = if n < 0 { self.inverse()? } else { self.clone() };
        let mut exp = n.unsigned_abs();
        let mut acc = Self::identity(self.degree);
        while exp > 0 {
            if exp & 1 == 1 {
                acc = acc.cup(&base);
            }
            exp >>= 1;
            if exp > 0 {
                base = base.cup(&base);
            }
        }
        Ok(acc)
    }

    /// Power with a scalar exponent, which must be integral.
    pub fn pow_scalar(&self, exponent: Scalar) -> Result<Self> {
        let n = exponent
            .as_integer()
            .ok_or(CohomologyError::NonIntegerExponent(exponent))?;
        self.pow(n)
    }

    /// `self * other⁻¹`
    pub fn checked_div(&self, other: &CohomologyClass) -> Result<Self> {
        Ok(self.cup(&other.inverse()?))
    }

    pub fn checked_add(&self, other: &CohomologyClass) -> Result<Self> {
        self.same_degree(other)?;
        Ok(self + other)
    }

    pub fn checked_sub(&self, other: &CohomologyClass) -> Result<Self> {
        self.same_degree(other)?;
        Ok(self - other)
    }

    pub fn checked_mul(&self, other: &CohomologyClass) -> Result<Self> {
        self.same_degree(other)?;
        Ok(self.cup(other))
    }

    pub(crate) fn same_degree(&self, other: &CohomologyClass) -> Result<()> {
        if self.degree != other.degree {
            return Err(CohomologyError::DegreeMismatch {
                left: self.degree,
                right: other.degree,
            });
        }
        Ok(())
    }

    fn zip_with(&self, other: &CohomologyClass, f: impl Fn(Scalar, Scalar) -> Scalar) -> Self {
        let [a0, a1, a2] = self.components;
        let [b0, b1, b2] = other.components;
        Self::new([f(a0, b0), f(a1, b1), f(a2, b2)], self.degree)
    }
}

impl Add for &CohomologyClass {
    type Output = CohomologyClass;

    fn add(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a + b)
    }
}

impl Add for CohomologyClass {
    type Output = CohomologyClass;

    fn add(self, rhs: Self) -> Self::Output {
        &self + &rhs
    }
}

impl Sub for &CohomologyClass {
    type Output = CohomologyClass;

    fn sub(self, rhs: Self) -> Self::Output {
        self.zip_with(rhs, |a, b| a - b)
    }
}

impl Sub for CohomologyClass {
    type Output = CohomologyClass;

    fn sub(self, rhs: Self) -> Self::Output {
        &self - &rhs
    }
}

impl Mul for &CohomologyClass {
    type Output = CohomologyClass;

    fn mul(self, rhs: Self) -> Self::Output {
        self.cup(rhs)
    }
}

impl Mul for CohomologyClass {
    type Output = CohomologyClass;

    fn mul(self, rhs: Self) -> Self::Output {
        self.cup(&rhs)
    }
}

impl Mul<Scalar> for &CohomologyClass {
    type Output = CohomologyClass;

    fn mul(self, rhs: Scalar) -> Self::Output {
        self.scale(rhs)
    }
}

impl Mul<Scalar> for CohomologyClass {
    type Output = CohomologyClass;

    fn mul(self, rhs: Scalar) -> Self::Output {
        self.scale(rhs)
    }
}

impl Neg for &CohomologyClass {
    type Output = CohomologyClass;

    fn neg(self) -> Self::Output {
        CohomologyClass::new(self.components.map(|c| -c), self.degree)
    }
}

impl Neg for CohomologyClass {
    type Output = CohomologyClass;

    fn neg(self) -> Self::Output {
        -&self
    }
}

impl fmt::Display for CohomologyClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [c0, c1, c2] = self.components;
        write!(f, "({c0}, {c1}, {c2})")
    }
}
