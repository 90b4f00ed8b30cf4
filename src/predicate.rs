//! Predicates deciding which data lines are kept.
//!
//! A predicate only ever sees data lines; header lines bypass it. It must not
//! carry state from one line to the next.

use std::fmt;

use bstr::ByteSlice;

use crate::error::{EvalError, Result, SieveError};
use crate::eval::evaluate;
use crate::record::Record;
use crate::rule::{Expr, parse_rule};

/// A decision rule applied to each data line.
pub trait Predicate {
    /// Returns whether `record` should be written to the output.
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError>;
}

impl<P: Predicate + ?Sized> Predicate for &P {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        (**self).test(record)
    }
}

impl<P: Predicate + ?Sized> Predicate for Box<P> {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        (**self).test(record)
    }
}

/// Keeps lines whose raw bytes contain a literal substring.
#[derive(Debug, Clone, PartialEq)]
pub struct Contains {
    needle: String,
}

impl Contains {
    pub fn new(needle: impl Into<String>) -> Self {
        Self {
            needle: needle.into(),
        }
    }

    /// The default predicate: the line contains `PASS` anywhere.
    pub fn pass() -> Self {
        Self::new("PASS")
    }

    pub fn needle(&self) -> &str {
        &self.needle
    }
}

impl Default for Contains {
    fn default() -> Self {
        Self::pass()
    }
}

impl Predicate for Contains {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        Ok(record.bytes().contains_str(&self.needle))
    }
}

/// Keeps lines whose FILTER column lists `token`.
///
/// Unlike [`Contains`], a `PASS` in some other column does not count.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterColumn {
    token: String,
}

impl FilterColumn {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl Predicate for FilterColumn {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        Ok(record
            .fixed("FILTER")?
            .is_some_and(|filter| filter.split(';').any(|t| t == self.token)))
    }
}

/// Inverts another predicate. Errors pass through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Not<P>(pub P);

impl<P: Predicate> Predicate for Not<P> {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        self.0.test(record).map(|keep| !keep)
    }
}

/// A compiled rule expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    source: String,
    expr: Expr,
}

impl Rule {
    /// Parse a rule such as `FILTER == "PASS" && QUAL >= 30`.
    pub fn parse(source: &str) -> Result<Self> {
        let expr = parse_rule(source).map_err(|errs| {
            SieveError::RuleParse(
                errs.into_iter()
                    .map(|e| e.to_string())
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        })?;
        Ok(Self {
            source: source.to_string(),
            expr,
        })
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Predicate for Rule {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        evaluate(&self.expr, record).map(|value| value.truthy())
    }
}

/// Adapter for an infallible function over the line text.
#[derive(Clone)]
pub struct FromFn<F>(F);

/// Wrap `f`, which receives the line without its terminator. A line that is
/// not valid UTF-8 fails the predicate instead of reaching `f`.
pub fn from_fn<F: Fn(&str) -> bool>(f: F) -> FromFn<F> {
    FromFn(f)
}

impl<F: Fn(&str) -> bool> Predicate for FromFn<F> {
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        Ok((self.0)(record.text()?))
    }
}

/// Adapter for a fallible function over the whole record.
#[derive(Clone)]
pub struct TryFromFn<F>(F);

/// Wrap `f`; an `Err` it returns becomes a predicate failure for that line.
pub fn try_from_fn<F>(f: F) -> TryFromFn<F>
where
    F: Fn(&Record<'_>) -> std::result::Result<bool, EvalError>,
{
    TryFromFn(f)
}

impl<F> Predicate for TryFromFn<F>
where
    F: Fn(&Record<'_>) -> std::result::Result<bool, EvalError>,
{
    fn test(&self, record: &Record<'_>) -> std::result::Result<bool, EvalError> {
        (self.0)(record)
    }
}
