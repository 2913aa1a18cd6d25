//! Line bundles, ideal sheaves and skyscraper sheaves
//!
//! The surface is taken to be a degree-`d` surface `S ⊂ P³` with Picard group
//! generated by the hyperplane class, so that
//! `h⁰(O_S(k)) = C(k+3, 3) - C(k-d+3, 3)` for `k ≥ 0`.

use crate::class::CohomologyClass;
use crate::scalar::Scalar;
use crate::{CohomologyError, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A geometric object with a closed-form Chern character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Sheaf {
    /// `O(twist)`
    LineBundle { twist: i64, degree: i64 },
    /// `I_Z(twist)` for a zero-dimensional `Z` of the given length
    IdealSheaf { twist: i64, length: u64, degree: i64 },
    /// `k(p)` for a closed point `p`
    Skyscraper { degree: i64 },
}

impl Sheaf {
    pub fn line_bundle(twist: i64, degree: i64) -> Self {
        Sheaf::LineBundle { twist, degree }
    }

    pub fn ideal(twist: i64, length: u64, degree: i64) -> Self {
        Sheaf::IdealSheaf {
            twist,
            length,
            degree,
        }
    }

    pub fn skyscraper(degree: i64) -> Self {
        Sheaf::Skyscraper { degree }
    }

    pub fn degree(&self) -> i64 {
        match self {
            Sheaf::LineBundle { degree, .. }
            | Sheaf::IdealSheaf { degree, .. }
            | Sheaf::Skyscraper { degree } => *degree,
        }
    }

    /// Chern character of the object. The degree-2 part of `O(n)` is
    /// `d·n²/2` rounded toward zero; values past `i64` are approximate.
    pub fn chern_character(&self) -> CohomologyClass {
        match *self {
            Sheaf::LineBundle { twist, degree } => CohomologyClass::new(
                [Scalar::ONE, Scalar::int(twist), twisted_ch2(twist, degree)],
                degree,
            ),
            Sheaf::IdealSheaf {
                twist,
                length,
                degree,
            } => CohomologyClass::new(
                [
                    Scalar::ONE,
                    Scalar::int(twist),
                    twisted_ch2(twist, degree) - Scalar::from_u64(length),
                ],
                degree,
            ),
            Sheaf::Skyscraper { degree } => CohomologyClass::from_ints(0, 0, 1, degree),
        }
    }
}

fn twisted_ch2(twist: i64, degree: i64) -> Scalar {
    (Scalar::int(degree) * Scalar::int(twist).square() * Scalar::ratio(1, 2)).trunc()
}

impl From<Sheaf> for CohomologyClass {
    fn from(sheaf: Sheaf) -> Self {
        sheaf.chern_character()
    }
}

impl fmt::Display for Sheaf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sheaf::LineBundle { twist, .. } => write!(f, "O({twist})"),
            Sheaf::IdealSheaf { twist, length, .. } => write!(f, "I({twist},{length})"),
            Sheaf::Skyscraper { .. } => write!(f, "k"),
        }
    }
}

fn choose3(n: i128) -> Option<i128> {
    if n < 3 {
        return Some(0);
    }
    n.checked_mul(n - 1)?.checked_mul(n - 2).map(|p| p / 6)
}

/// `h⁰(O(k))` on a degree-`d` surface in `P³`.
pub fn line_bundle_sections(k: i64, degree: i64) -> Result<u64> {
    sections(k.into(), degree)
}

/// Twists are widened so that differences of two `i64` twists fit.
fn sections(k: i128, degree: i64) -> Result<u64> {
    if degree <= 0 {
        return Err(CohomologyError::InvalidDegree(degree.into()));
    }
    if k < 0 {
        return Ok(0);
    }
    let overflow =
        || CohomologyError::NumericOverflow(format!("h0(O({k})) on degree {degree}"));
    let all = choose3(k + 3).ok_or_else(overflow)?;
    let vanishing = choose3(k - i128::from(degree) + 3).ok_or_else(overflow)?;
    u64::try_from(all - vanishing).map_err(|_| overflow())
}

/// Euler characteristic `χ(E, F) = ∫ ch(E)^∨ · ch(F) · td` with
/// `td = (1, 0, 2)`, evaluated on a surface of the given degree and
/// truncated toward zero.
///
/// This equals the negated Mukai pairing of the Mukai vectors of `E` and `F`.
pub fn chi(e: &CohomologyClass, f: &CohomologyClass, degree: impl Into<Scalar>) -> Scalar {
    let degree = degree.into();
    let dual = CohomologyClass::new(e.dual().components(), degree);
    let todd = CohomologyClass::from_ints(1, 0, 2, degree);
    let top = dual.cup(f).cup(&todd).components()[2];
    top.trunc()
}

/// Dimension of `Hom(a, b)`.
///
/// Points and the subschemes `Z` are taken in general position. The
/// ideal-to-ideal case has no closed form here and is reported as
/// unimplemented.
pub fn hom(a: &Sheaf, b: &Sheaf) -> Result<u64> {
    let degree = a.degree();
    if degree != b.degree() {
        return Err(CohomologyError::DegreeMismatch {
            left: degree.into(),
            right: b.degree().into(),
        });
    }
    if degree <= 0 {
        return Err(CohomologyError::InvalidDegree(degree.into()));
    }
    let gap = |m: i64, n: i64| i128::from(n) - i128::from(m);

    use Sheaf::*;
    let dim = match (*a, *b) {
        (LineBundle { twist: m, .. }, LineBundle { twist: n, .. }) => {
            sections(gap(m, n), degree)?
        }
        (LineBundle { twist: m, .. }, IdealSheaf { twist: n, length, .. }) => {
            sections(gap(m, n), degree)?.saturating_sub(length)
        }
        (IdealSheaf { twist: m, .. }, LineBundle { twist: n, .. }) => {
            sections(gap(m, n), degree)?
        }
        (LineBundle { .. } | IdealSheaf { .. }, Skyscraper { .. }) => 1,
        (Skyscraper { .. }, LineBundle { .. } | IdealSheaf { .. }) => 0,
        (Skyscraper { .. }, Skyscraper { .. }) => 1,
        (IdealSheaf { .. }, IdealSheaf { .. }) => {
            return Err(CohomologyError::UnimplementedCase(format!(
                "hom between ideal sheaves {a} and {b}"
            )));
        }
    };
    debug!("hom({a}, {b}) = {dim} on degree {degree}");
    Ok(dim)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_bundle_sections_on_plane() {
        // d = 1 is P², where h⁰(O(k)) = C(k+2, 2)
        let expected = [1, 3, 6, 10, 15];
        for (k, want) in expected.iter().enumerate() {
            assert_eq!(line_bundle_sections(k as i64, 1).unwrap(), *want);
        }
        assert_eq!(line_bundle_sections(-1, 1).unwrap(), 0);
        assert_eq!(line_bundle_sections(i64::MIN, 1).unwrap(), 0);
    }

    #[test]
    fn test_line_bundle_sections_rejects_bad_degree() {
        assert_eq!(
            line_bundle_sections(1, 0),
            Err(CohomologyError::InvalidDegree(Scalar::ZERO))
        );
        assert_eq!(
            line_bundle_sections(0, -3),
            Err(CohomologyError::InvalidDegree(Scalar::int(-3)))
        );
    }

    #[test]
    fn test_line_bundle_sections_large_twist() {
        // on P², h⁰(O(k)) = (k+2)(k+1)/2
        assert_eq!(
            line_bundle_sections(2_000_000, 1).unwrap(),
            2_000_003_000_001
        );
        assert!(matches!(
            line_bundle_sections(i64::MAX, 4),
            Err(CohomologyError::NumericOverflow(_))
        ));
    }

    #[test]
    fn test_line_bundle_sections_on_quartic() {
        // quartic K3: h⁰(O(k)) = 2k² + 2
        for k in 1..6 {
            assert_eq!(line_bundle_sections(k, 4).unwrap(), (2 * k * k + 2) as u64);
        }
    }

    #[test]
    fn test_named_chern_characters() {
        assert_eq!(
            Sheaf::line_bundle(3, 2).chern_character(),
            CohomologyClass::from_ints(1, 3, 9, 2)
        );
        assert_eq!(
            Sheaf::ideal(1, 2, 4).chern_character(),
            CohomologyClass::from_ints(1, 1, 0, 4)
        );
        assert_eq!(
            Sheaf::skyscraper(5).chern_character(),
            CohomologyClass::from_ints(0, 0, 1, 5)
        );
    }

    #[test]
    fn test_huge_twists_do_not_overflow() {
        // d·n²/2 = 1.25e19 is past i64::MAX
        let line = Sheaf::line_bundle(5_000_000_000, 1).chern_character();
        assert_eq!(line.get(1).unwrap(), Scalar::int(5_000_000_000));
        assert_eq!(line.get(2).unwrap().to_f64(), 1.25e19);

        let line = Sheaf::line_bundle(i64::MIN, 3).chern_character();
        assert_eq!(line.get(1).unwrap(), Scalar::int(i64::MIN));
        assert!(line.get(2).unwrap().to_f64() > 0.0);

        let ideal = Sheaf::ideal(0, u64::MAX, 2).chern_character();
        assert_eq!(ideal.get(2).unwrap().to_f64(), -(u64::MAX as f64));
    }

    #[test]
    fn test_chi_matches_mukai_pairing() {
        let e = Sheaf::ideal(1, 3, 4).chern_character();
        let f = Sheaf::line_bundle(2, 4).chern_character();
        let [r, c, s] = e.mukai();
        let [r2, c2, s2] = f.mukai();
        let pairing = c * c2 * Scalar::int(4) - r * s2 - r2 * s;
        assert_eq!(chi(&e, &f, 4), (-pairing).trunc());
        assert_eq!(chi(&e, &f, 4), Scalar::ONE);
    }

    #[test]
    fn test_chi_of_line_bundle_is_sections_on_quartic() {
        // no higher cohomology for O(k), k > 0, on a K3
        let o = Sheaf::line_bundle(0, 4).chern_character();
        for k in 1..4 {
            let ok = Sheaf::line_bundle(k, 4).chern_character();
            let sections = line_bundle_sections(k, 4).unwrap();
            assert_eq!(chi(&o, &ok, 4), Scalar::from_u64(sections));
        }
    }

    #[test]
    fn test_hom_table() {
        let o1 = Sheaf::line_bundle(1, 1);
        let o3 = Sheaf::line_bundle(3, 1);
        let ideal = Sheaf::ideal(3, 4, 1);
        let point = Sheaf::skyscraper(1);

        assert_eq!(hom(&o1, &o3).unwrap(), 6);
        assert_eq!(hom(&o3, &o1).unwrap(), 0);
        assert_eq!(hom(&o1, &ideal).unwrap(), 2);
        assert_eq!(hom(&ideal, &o3).unwrap(), 1);
        assert_eq!(hom(&o1, &point).unwrap(), 1);
        assert_eq!(hom(&ideal, &point).unwrap(), 1);
        assert_eq!(hom(&point, &o1).unwrap(), 0);
        assert_eq!(hom(&point, &ideal).unwrap(), 0);
        assert_eq!(hom(&point, &point).unwrap(), 1);
    }

    #[test]
    fn test_hom_too_many_points_is_zero() {
        let o = Sheaf::line_bundle(0, 1);
        let ideal = Sheaf::ideal(1, 7, 1);
        assert_eq!(hom(&o, &ideal).unwrap(), 0);
    }

    #[test]
    fn test_hom_with_extreme_twists() {
        let low = Sheaf::line_bundle(-5, 4);
        let high = Sheaf::line_bundle(i64::MAX, 4);
        assert!(matches!(
            hom(&low, &high),
            Err(CohomologyError::NumericOverflow(_))
        ));
        assert_eq!(hom(&high, &low).unwrap(), 0);

        let bottom = Sheaf::line_bundle(i64::MIN, 4);
        assert_eq!(hom(&high, &bottom).unwrap(), 0);
        assert!(hom(&bottom, &high).is_err());
    }

    #[test]
    fn test_hom_between_ideals_is_unimplemented() {
        let a = Sheaf::ideal(0, 1, 2);
        let b = Sheaf::ideal(1, 2, 2);
        assert!(matches!(
            hom(&a, &b),
            Err(CohomologyError::UnimplementedCase(_))
        ));
    }

    #[test]
    fn test_hom_rejects_mixed_degrees() {
        let a = Sheaf::line_bundle(0, 2);
        let b = Sheaf::line_bundle(0, 4);
        assert_eq!(
            hom(&a, &b),
            Err(CohomologyError::DegreeMismatch {
                left: Scalar::int(2),
                right: Scalar::int(4),
            })
        );
        let bad = Sheaf::skyscraper(0);
        assert_eq!(
            hom(&bad, &bad),
            Err(CohomologyError::InvalidDegree(Scalar::ZERO))
        );
    }
}
