//! Scalar numbers for cohomology components
//!
//! Components, surface degrees and twist parameters are kept as exact
//! rationals so that quantities like `d·n²/2` do not pick up rounding error.
//! Arithmetic that would overflow `i64` degrades to `f64`.

use crate::{CohomologyError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};
use std::str::FromStr;

/// Callers pass at least one positive argument, so the result fits in `i64`.
fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        let t = b;
        b = a % b;
        a = t;
    }
    a as i64
}

/// A rational or approximate real number
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(untagged)]
pub enum Scalar {
    /// Exact rational (numerator, denominator)
    /// Invariant: denominator > 0, gcd(num, den) == 1
    Exact(i64, i64),
    /// Floating-point approximation
    Approx(f64),
}

impl Scalar {
    pub const ZERO: Scalar = Scalar::Exact(0, 1);
    pub const ONE: Scalar = Scalar::Exact(1, 1);

    pub fn int(n: i64) -> Self {
        Scalar::Exact(n, 1)
    }

    /// Build `num/den` in lowest terms. A zero denominator yields a signed
    /// infinity.
    pub fn ratio(num: i64, den: i64) -> Self {
        if den == 0 {
            return Scalar::Approx(if num >= 0 {
                f64::INFINITY
            } else {
                f64::NEG_INFINITY
            });
        }
        let (num, den) = if den < 0 {
            match (num.checked_neg(), den.checked_neg()) {
                (Some(num), Some(den)) => (num, den),
                _ => return Scalar::Approx(num as f64 / den as f64),
            }
        } else {
            (num, den)
        };
        let g = gcd(num, den).max(1);
        Scalar::Exact(num / g, den / g)
    }

    /// Exact when the value fits in `i64`.
    pub fn from_u64(n: u64) -> Self {
        i64::try_from(n)
            .map(Scalar::int)
            .unwrap_or(Scalar::Approx(n as f64))
    }

    /// Integral floats become exact, everything else stays approximate.
    pub fn from_f64(f: f64) -> Self {
        if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
            Scalar::int(f as i64)
        } else {
            Scalar::Approx(f)
        }
    }

    pub fn is_zero(&self) -> bool {
        match self {
            Scalar::Exact(n, _) => *n == 0,
            Scalar::Approx(f) => *f == 0.0,
        }
    }

    pub fn is_exact(&self) -> bool {
        matches!(self, Scalar::Exact(..))
    }

    /// The value as an `i64`, if it is one.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Scalar::Exact(n, 1) => Some(*n),
            Scalar::Exact(..) => None,
            Scalar::Approx(f) => {
                if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
                    Some(*f as i64)
                } else {
                    None
                }
            }
        }
    }

    pub fn to_f64(&self) -> f64 {
        match self {
            Scalar::Exact(n, d) => *n as f64 / *d as f64,
            Scalar::Approx(f) => *f,
        }
    }

    pub fn is_finite(&self) -> bool {
        match self {
            Scalar::Exact(..) => true,
            Scalar::Approx(f) => f.is_finite(),
        }
    }

    /// Round toward zero, keeping approximate values approximate.
    pub fn trunc(&self) -> Self {
        match self {
            Scalar::Exact(n, d) => Scalar::int(n / d),
            Scalar::Approx(f) => Scalar::Approx(f.trunc()),
        }
    }

    pub fn abs(&self) -> Self {
        match self {
            Scalar::Exact(n, d) => match n.checked_abs() {
                Some(n) => Scalar::Exact(n, *d),
                None => Scalar::Approx((*n as f64 / *d as f64).abs()),
            },
            Scalar::Approx(f) => Scalar::Approx(f.abs()),
        }
    }

    pub fn square(self) -> Self {
        self * self
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Scalar::Exact(n1, d1), Scalar::Exact(n2, d2)) => n1 == n2 && d1 == d2,
            (a, b) => {
                let (a, b) = (a.to_f64(), b.to_f64());
                a == b || (a - b).abs() < 1e-12
            }
        }
    }
}

impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Scalar::Exact(n1, d1), Scalar::Exact(n2, d2)) => {
                // denominators are positive, so cross-multiplying keeps the order
                let lhs = *n1 as i128 * *d2 as i128;
                let rhs = *n2 as i128 * *d1 as i128;
                Some(lhs.cmp(&rhs))
            }
            (a, b) => a.to_f64().partial_cmp(&b.to_f64()),
        }
    }
}

/// Wire form; every value goes through [`Scalar::ratio`] so the invariant
/// holds after deserialization.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarRepr {
    Exact(i64, i64),
    Approx(f64),
}

impl TryFrom<ScalarRepr> for Scalar {
    type Error = CohomologyError;

    fn try_from(repr: ScalarRepr) -> Result<Self> {
        match repr {
            ScalarRepr::Exact(_, 0) => Err(CohomologyError::Parse(
                "zero denominator".to_string(),
            )),
            ScalarRepr::Exact(n, d) => Ok(Scalar::ratio(n, d)),
            ScalarRepr::Approx(f) => Ok(Scalar::Approx(f)),
        }
    }
}

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let repr = ScalarRepr::deserialize(deserializer)?;
        Scalar::try_from(repr).map_err(serde::de::Error::custom)
    }
}

impl Default for Scalar {
    fn default() -> Self {
        Scalar::ZERO
    }
}

impl From<i64> for Scalar {
    fn from(n: i64) -> Self {
        Scalar::int(n)
    }
}

impl From<i32> for Scalar {
    fn from(n: i32) -> Self {
        Scalar::int(n as i64)
    }
}

impl From<f64> for Scalar {
    fn from(f: f64) -> Self {
        Scalar::from_f64(f)
    }
}

impl Neg for Scalar {
    type Output = Scalar;

    fn neg(self) -> Self::Output {
        match self {
            Scalar::Exact(n, d) => match n.checked_neg() {
                Some(n) => Scalar::Exact(n, d),
                None => Scalar::Approx(-(n as f64) / d as f64),
            },
            Scalar::Approx(f) => Scalar::Approx(-f),
        }
    }
}

impl Add for Scalar {
    type Output = Scalar;

    fn add(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Scalar::Exact(n1, d1), Scalar::Exact(n2, d2)) => {
                let num = n1
                    .checked_mul(d2)
                    .zip(n2.checked_mul(d1))
                    .and_then(|(a, b)| a.checked_add(b));
                match (num, d1.checked_mul(d2)) {
                    (Some(num), Some(den)) => Scalar::ratio(num, den),
                    _ => Scalar::Approx(self.to_f64() + rhs.to_f64()),
                }
            }
            (a, b) => Scalar::Approx(a.to_f64() + b.to_f64()),
        }
    }
}

impl Sub for Scalar {
    type Output = Scalar;

    fn sub(self, rhs: Self) -> Self::Output {
        self + (-rhs)
    }
}

impl Mul for Scalar {
    type Output = Scalar;

    fn mul(self, rhs: Self) -> Self::Output {
        match (self, rhs) {
            (Scalar::Exact(n1, d1), Scalar::Exact(n2, d2)) => {
                // cross-reduce first to keep the products small
                let g1 = gcd(n1, d2).max(1);
                let g2 = gcd(n2, d1).max(1);
                let (n1, d2) = (n1 / g1, d2 / g1);
                let (n2, d1) = (n2 / g2, d1 / g2);
                match (n1.checked_mul(n2), d1.checked_mul(d2)) {
                    (Some(num), Some(den)) => Scalar::ratio(num, den),
                    _ => Scalar::Approx(n1 as f64 * n2 as f64 / (d1 as f64 * d2 as f64)),
                }
            }
            (a, b) => Scalar::Approx(a.to_f64() * b.to_f64()),
        }
    }
}

impl Div for Scalar {
    type Output = Scalar;

    fn div(self, rhs: Self) -> Self::Output {
        match rhs {
            Scalar::Exact(0, _) => Scalar::Approx(self.to_f64() / 0.0),
            Scalar::Exact(n, d) => self * Scalar::ratio(d, n),
            Scalar::Approx(f) => Scalar::Approx(self.to_f64() / f),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Exact(n, 1) => write!(f, "{n}"),
            Scalar::Exact(n, d) => write!(f, "{n}/{d}"),
            Scalar::Approx(v) => write!(f, "{v}"),
        }
    }
}

/// Accepts integers (`-3`), fractions (`7/2`) and decimals (`0.25`).
impl FromStr for Scalar {
    type Err = CohomologyError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        let bad = || CohomologyError::Parse(format!("invalid number '{s}'"));
        if let Some((num, den)) = s.split_once('/') {
            let num: i64 = num.trim().parse().map_err(|_| bad())?;
            let den: i64 = den.trim().parse().map_err(|_| bad())?;
            if den == 0 {
                return Err(CohomologyError::Parse(format!(
                    "zero denominator in '{s}'"
                )));
            }
            return Ok(Scalar::ratio(num, den));
        }
        if let Ok(n) = s.parse::<i64>() {
            return Ok(Scalar::int(n));
        }
        s.parse::<f64>().map(Scalar::from_f64).map_err(|_| bad())
    }
}
