//! User-defined, composable type rules.
//!
//! A [`TypeDescriptor`] wraps a boolean predicate under a display name.
//! Modifiers never touch the receiver; each returns a fresh descriptor with one
//! more flag set, so a base type can be shared freely:
//!
//! ```
//! use argv_sig::{TypeDescriptor, Value};
//!
//! let even = TypeDescriptor::new("even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
//! let pairs = even.array(Some(2)).unwrap().optional();
//!
//! assert_eq!(pairs.name(), "even[2]");
//! assert!(pairs.matches(&Value::Undefined));
//! assert!(!even.is_optional());
//! ```
use std::fmt;
use std::sync::Arc;

use crate::error::ArgvError;
use crate::value::Value;

pub type Predicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Name given to descriptors built without one.
pub const ANONYMOUS_NAME: &str = "{Type}";

#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    predicate: Predicate,
    optional: bool,
    is_array: bool,
    max_size: Option<usize>,
    repeatable: bool,
}

impl TypeDescriptor {
    pub fn new<F>(name: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            optional: false,
            is_array: false,
            max_size: None,
            repeatable: false,
        }
    }

    pub fn anonymous<F>(predicate: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::new(ANONYMOUS_NAME, predicate)
    }

    pub fn name(&self) -> &str { &self.name }
    pub fn is_optional(&self) -> bool { self.optional }
    pub fn is_array(&self) -> bool { self.is_array }
    pub fn max_size(&self) -> Option<usize> { self.max_size }
    pub fn is_repeatable(&self) -> bool { self.repeatable }

    pub fn optional(&self) -> Self {
        Self { optional: true, ..self.clone() }
    }

    pub fn repeatable(&self) -> Self {
        Self { repeatable: true, ..self.clone() }
    }

    /// Array form, at most `max_size` elements long when given. The size must
    /// be a positive integer.
    pub fn array(&self, max_size: Option<i64>) -> Result<Self, ArgvError> {
        let max_size = match max_size {
            None => None,
            Some(n) if n > 0 => Some(usize::try_from(n).map_err(|_| {
                ArgvError::invalid(format!("array size {n} does not fit this platform"))
            })?),
            Some(n) => {
                return Err(ArgvError::invalid(format!(
                    "expected array size to be a positive integer, {n} given"
                )));
            }
        };
        let suffix = max_size.map(|n| n.to_string()).unwrap_or_default();
        Ok(Self {
            name: format!("{}[{}]", self.name, suffix),
            is_array: true,
            max_size,
            ..self.clone()
        })
    }

    pub fn matches(&self, v: &Value) -> bool {
        if self.optional && matches!(v, Value::Undefined) {
            return true;
        }
        if !self.is_array {
            return (self.predicate)(v);
        }
        let Value::Array(xs) = v else { return false };
        if self.max_size.is_some_and(|n| xs.len() > n) {
            return false;
        }
        xs.iter().all(|x| (self.predicate)(x))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("optional", &self.optional)
            .field("is_array", &self.is_array)
            .field("max_size", &self.max_size)
            .field("repeatable", &self.repeatable)
            .finish_non_exhaustive()
    }
}
