//! Signature parsing and declaration-level invariants.
//!
//! A signature is an ordered list of entries, one per declared parameter.
//! Text entries use a small grammar:
//!
//! - `number|string`: union, first matching alternative wins
//! - `[string]`: optional
//! - `...number`: repeatable, absorbs every remaining argument
//! - `[...number]`: both
//!
//! Entries may also be [`TypeDescriptor`]s, which carry their own flags.
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as Json;

use crate::config::Mode;
use crate::descriptor::TypeDescriptor;
use crate::error::ArgvError;
use crate::token::TypeToken;
use crate::value::Value;

static OPTIONAL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\[(\S+)\]$").expect("optional wrapper is a valid regex"));

const REPEATABLE_PREFIX: &str = "...";

// ————————————————————————————————————————————————————————————————————————————
// INPUT
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug)]
pub enum SigEntry {
    Text(String),
    Custom(TypeDescriptor),
}

impl From<&str> for SigEntry {
    fn from(s: &str) -> Self { SigEntry::Text(s.to_string()) }
}

impl From<String> for SigEntry {
    fn from(s: String) -> Self { SigEntry::Text(s) }
}

impl From<TypeDescriptor> for SigEntry {
    fn from(t: TypeDescriptor) -> Self { SigEntry::Custom(t) }
}

impl From<&TypeDescriptor> for SigEntry {
    fn from(t: &TypeDescriptor) -> Self { SigEntry::Custom(t.clone()) }
}

/// Declared parameter list, as written by the caller. Nothing is checked
/// until [`Declaration::parse`].
#[derive(Clone, Debug, Default)]
pub struct Signature {
    entries: Vec<SigEntry>,
}

impl Signature {
    pub fn new<I>(entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SigEntry>,
    {
        Self { entries: entries.into_iter().map(Into::into).collect() }
    }

    pub fn single(entry: impl Into<SigEntry>) -> Self { Self { entries: vec![entry.into()] } }

    pub fn entries(&self) -> &[SigEntry] { &self.entries }
    pub fn len(&self) -> usize { self.entries.len() }
    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Accepts a single string entry or an array of string entries.
    pub fn parse_json(json: &Json) -> Result<Self, ArgvError> {
        match json {
            Json::String(s) => Ok(Self::single(s.as_str())),
            Json::Array(xs) => xs
                .iter()
                .enumerate()
                .map(|(i, x)| match x {
                    Json::String(s) => Ok(SigEntry::from(s.as_str())),
                    other => Err(ArgvError::invalid(format!(
                        "expected signature entry {i} to be 'string', '{}' given",
                        crate::predicates::detail_type_of(&Value::from(other)),
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(|entries| Self { entries }),
            other => Err(ArgvError::invalid(format!(
                "expected signature to be 'string' or 'array', '{}' given",
                crate::predicates::detail_type_of(&Value::from(other)),
            ))),
        }
    }
}

impl<T: Into<SigEntry>> FromIterator<T> for Signature {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self { Self::new(iter) }
}

// ————————————————————————————————————————————————————————————————————————————
// RESOLVED FORM
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Debug)]
pub enum Alternative {
    Builtin(TypeToken),
    Custom(TypeDescriptor),
}

impl Alternative {
    pub fn matches(&self, v: &Value) -> bool {
        match self {
            Alternative::Builtin(t) => t.matches(v),
            Alternative::Custom(t) => t.matches(v),
        }
    }
}

/// One declared parameter after parsing.
#[derive(Clone, Debug)]
pub struct ParamSpec {
    pub alternatives: Vec<Alternative>,
    pub optional: bool,
    pub repeatable: bool,
    /// Display form: union members joined with `,`, or the descriptor name.
    pub expected: String,
}

impl ParamSpec {
    pub fn parse(entry: &SigEntry, mode: Mode) -> Result<Self, ArgvError> {
        match entry {
            SigEntry::Custom(t) => Ok(Self {
                alternatives: vec![Alternative::Custom(t.clone())],
                optional: t.is_optional(),
                repeatable: t.is_repeatable(),
                expected: t.name().to_string(),
            }),
            SigEntry::Text(text) => Self::parse_text(text, mode),
        }
    }

    fn parse_text(text: &str, mode: Mode) -> Result<Self, ArgvError> {
        let (optional, rest) = match OPTIONAL_RE.captures(text).and_then(|c| c.get(1)) {
            Some(inner) => (true, inner.as_str()),
            None => (false, text),
        };
        let (repeatable, rest) = match rest.strip_prefix(REPEATABLE_PREFIX) {
            Some(r) => (true, r),
            None => (false, rest),
        };
        let members: Vec<&str> = rest.split('|').collect();
        let alternatives = members
            .iter()
            .map(|m| TypeToken::resolve(m, mode).map(Alternative::Builtin))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { alternatives, optional, repeatable, expected: members.join(",") })
    }

    /// Optional parameters accept an absent value; otherwise the first
    /// satisfied alternative wins.
    pub fn accepts(&self, v: &Value) -> bool {
        (self.optional && matches!(v, Value::Undefined))
            || self.alternatives.iter().any(|alt| alt.matches(v))
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DECLARATION
// ————————————————————————————————————————————————————————————————————————————

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    Exact,
    AtLeast,
    AtMost,
}

/// Argument count that fails the declared arity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CountMismatch {
    pub expected: usize,
    pub bound: Bound,
    pub given: usize,
}

impl fmt::Display for CountMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bound = match self.bound {
            Bound::Exact => "",
            Bound::AtLeast => "at least ",
            Bound::AtMost => "at most ",
        };
        write!(
            f,
            "Argument number mismatch: Expected {bound}{} argument(s), {} given",
            self.expected, self.given
        )
    }
}

/// A parsed signature whose ordering invariants hold:
/// required entries come first, at most one entry is repeatable, and it is last.
#[derive(Clone, Debug, Default)]
pub struct Declaration {
    specs: Vec<ParamSpec>,
}

impl Declaration {
    pub fn parse(signature: &Signature, mode: Mode) -> Result<Self, ArgvError> {
        let mut specs: Vec<ParamSpec> = Vec::with_capacity(signature.len());
        let mut seen_optional = false;
        let mut seen_repeatable = false;

        for (i, entry) in signature.entries().iter().enumerate() {
            let spec = ParamSpec::parse(entry, mode)?;
            if seen_repeatable {
                return Err(ArgvError::invalid(if spec.repeatable {
                    "only one variable-length argument is allowed in the declaration"
                } else {
                    "variable-length argument must be the last signature of the declaration"
                }));
            }
            if spec.optional {
                seen_optional = true;
            } else if seen_optional {
                return Err(ArgvError::invalid(format!(
                    "optional argument must appear at the end of the declaration, \
                     entry {i} ('{}') is required",
                    spec.expected
                )));
            }
            seen_repeatable |= spec.repeatable;
            specs.push(spec);
        }

        tracing::trace!(entries = specs.len(), "parsed declaration");
        Ok(Self { specs })
    }

    pub fn specs(&self) -> &[ParamSpec] { &self.specs }

    pub fn required(&self) -> usize { self.specs.iter().filter(|s| !s.optional).count() }

    pub fn has_repeatable(&self) -> bool { self.specs.last().is_some_and(|s| s.repeatable) }

    /// Spec bound to the actual argument at `index`. The repeatable entry
    /// covers every position from its own onwards.
    pub fn spec_for(&self, index: usize) -> Option<&ParamSpec> {
        match self.specs.get(index) {
            Some(spec) => Some(spec),
            None if self.has_repeatable() => self.specs.last(),
            None => None,
        }
    }

    pub fn check_count(&self, given: usize) -> Result<(), CountMismatch> {
        let required = self.required();
        let total = self.specs.len();
        if given < required {
            let bound = if required < total || self.has_repeatable() {
                Bound::AtLeast
            } else {
                Bound::Exact
            };
            return Err(CountMismatch { expected: required, bound, given });
        }
        if given > total && !self.has_repeatable() {
            let bound = if required < total { Bound::AtMost } else { Bound::Exact };
            return Err(CountMismatch { expected: total, bound, given });
        }
        Ok(())
    }
}
