//! Text notation for sheaves and classes
//!
//! - `O(n)` (or bare `O`): line bundle
//! - `I(n,len)`: ideal sheaf of `len` points twisted by `n`
//! - `k` (or `k(p)`): skyscraper sheaf of a point
//! - `(c0,c1,c2)`: raw class; entries may be fractions such as `-1/2`
//!
//! Whitespace is ignored everywhere.

use crate::class::CohomologyClass;
use crate::scalar::Scalar;
use crate::sheaf::Sheaf;
use crate::{CohomologyError, Result};
use log::trace;
use std::fmt;

/// Either a geometric object or a bare class
#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Sheaf(Sheaf),
    Class(CohomologyClass),
}

impl Object {
    pub fn class(&self) -> CohomologyClass {
        match self {
            Object::Sheaf(sheaf) => sheaf.chern_character(),
            Object::Class(class) => class.clone(),
        }
    }

    /// The underlying sheaf; bare classes carry no geometric kind.
    pub fn as_sheaf(&self) -> Result<&Sheaf> {
        match self {
            Object::Sheaf(sheaf) => Ok(sheaf),
            Object::Class(class) => Err(CohomologyError::UnsupportedOperandKind(format!(
                "bare class {class} is not a line bundle, ideal sheaf or skyscraper"
            ))),
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Sheaf(sheaf) => write!(f, "{sheaf}"),
            Object::Class(class) => write!(f, "{class}"),
        }
    }
}

pub fn parse_object(input: &str, degree: i64) -> Result<Object> {
    let s: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    trace!("parsing object '{s}' on degree {degree}");
    let first = s
        .chars()
        .next()
        .ok_or_else(|| CohomologyError::Parse("empty object".to_string()))?;
    if matches!(first, '(' | '[' | '-' | '0'..='9') {
        return parse_triple(&s, degree).map(Object::Class);
    }

    let (head, args) = split_call(&s)?;
    let sheaf = match (head, args.as_slice()) {
        ("O", []) => Sheaf::line_bundle(0, degree),
        ("O", [twist]) => Sheaf::line_bundle(parse_int(twist)?, degree),
        ("I", [twist, length]) => {
            let length = length
                .parse::<u64>()
                .map_err(|_| CohomologyError::Parse(format!("invalid length '{length}'")))?;
            Sheaf::ideal(parse_int(twist)?, length, degree)
        }
        ("k", []) | ("k", ["p"]) => Sheaf::skyscraper(degree),
        ("O" | "I" | "k", _) => {
            return Err(CohomologyError::Parse(format!(
                "wrong number of arguments in '{s}'"
            )))
        }
        (other, _) => {
            return Err(CohomologyError::UnsupportedOperandKind(format!(
                "'{other}' (expected O(n), I(n,len), k or a triple)"
            )))
        }
    };
    Ok(Object::Sheaf(sheaf))
}

pub fn parse_sheaf(input: &str, degree: i64) -> Result<Sheaf> {
    parse_object(input, degree)?.as_sheaf().copied()
}

pub fn parse_class(input: &str, degree: i64) -> Result<CohomologyClass> {
    Ok(parse_object(input, degree)?.class())
}

fn split_call(s: &str) -> Result<(&str, Vec<&str>)> {
    let Some(open) = s.find('(') else {
        return Ok((s, Vec::new()));
    };
    let inner = s[open + 1..]
        .strip_suffix(')')
        .ok_or_else(|| CohomologyError::Parse(format!("unbalanced parentheses in '{s}'")))?;
    let args = if inner.is_empty() {
        Vec::new()
    } else {
        inner.split(',').collect()
    };
    Ok((&s[..open], args))
}

fn parse_triple(s: &str, degree: i64) -> Result<CohomologyClass> {
    let inner = s
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .or_else(|| s.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')))
        .unwrap_or(s);
    let parts = inner
        .split(',')
        .map(str::parse::<Scalar>)
        .collect::<Result<Vec<_>>>()?;
    let components: [Scalar; 3] = parts.try_into().map_err(|parts: Vec<Scalar>| {
        CohomologyError::Parse(format!(
            "expected 3 components in '{s}', found {}",
            parts.len()
        ))
    })?;
    Ok(CohomologyClass::new(components, degree))
}

fn parse_int(s: &str) -> Result<i64> {
    s.parse()
        .map_err(|_| CohomologyError::Parse(format!("invalid integer '{s}'")))
}
