//! Type predicate library.
//!
//! Every predicate is total: it answers `false` rather than failing on values
//! of the wrong shape. Array-shaped predicates live in [`arr`].
pub mod arr;

use crate::value::{format_number, Value};

pub use arr::{
    is_boolean_array, is_char_sequence, is_decimal_array, is_function_array,
    is_integer_array, is_mixed_array, is_number_array, is_object_array,
    is_string_array,
};

// ------------------------------- Classes ---------------------------------- //

/// Class name of a value, in the `[object <Class>]` vocabulary.
pub fn get_class(v: &Value) -> &'static str {
    match v {
        Value::Undefined => "Undefined",
        Value::Null => "Null",
        Value::Bool(_) => "Boolean",
        Value::Number(_) => "Number",
        Value::String(_) => "String",
        Value::Array(_) => "Array",
        Value::Object(_) => "Object",
        Value::Function(_) => "Function",
    }
}

/// Lower-cased class, with arrays described by element class and length:
/// `number[3]` when homogeneous, `mixed[2]` when not, `array[0]` when empty.
pub fn detail_type_of(v: &Value) -> String {
    let Value::Array(xs) = v else {
        return get_class(v).to_lowercase();
    };
    let mut classes = xs.iter().map(get_class);
    let elem = match classes.next() {
        None => "array",
        Some(first) if classes.all(|c| c == first) => first,
        Some(_) => "mixed",
    };
    format!("{}[{}]", elem.to_lowercase(), xs.len())
}

// ------------------------------- Scalars ---------------------------------- //

/// Anything that is not `undefined`.
pub fn is_mixed(v: &Value) -> bool { !matches!(v, Value::Undefined) }

pub fn is_defined(v: &Value) -> bool { is_mixed(v) }

pub fn is_null(v: &Value) -> bool { matches!(v, Value::Null) }

/// Defined and not null.
pub fn is_set(v: &Value) -> bool { is_defined(v) && !is_null(v) }

pub fn is_nan(v: &Value) -> bool { v.as_f64().is_some_and(f64::is_nan) }

pub fn is_object(v: &Value) -> bool { matches!(v, Value::Object(_)) }

pub fn is_number(v: &Value) -> bool { matches!(v, Value::Number(_)) }

pub fn is_function(v: &Value) -> bool { matches!(v, Value::Function(_)) }

pub fn is_boolean(v: &Value) -> bool { matches!(v, Value::Bool(_)) }

pub fn is_array(v: &Value) -> bool { matches!(v, Value::Array(_)) }

pub fn is_string(v: &Value) -> bool { matches!(v, Value::String(_)) }

/// A number with no fractional part. `NaN` and the infinities are not integers.
pub fn is_integer(v: &Value) -> bool {
    v.as_f64().is_some_and(|n| n.is_finite() && n.fract() == 0.0)
}

/// A single character string.
pub fn is_char(v: &Value) -> bool {
    matches!(v, Value::String(s) if s.chars().count() == 1)
}

/// Any number is a decimal. With `whole`, the printed integral part must have
/// exactly that many characters; with `decimal`, a fractional part (when the
/// number has one) must have at most that many digits.
pub fn is_decimal(v: &Value, whole: Option<usize>, decimal: Option<usize>) -> bool {
    let Some(n) = v.as_f64() else { return false };
    if whole.is_none() && decimal.is_none() {
        return true;
    }
    let printed = format_number(n);
    let mut parts = printed.splitn(2, '.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();

    let whole_ok = whole.is_none_or(|w| int_part.len() == w);
    let decimal_ok = match (decimal, frac_part) {
        (Some(d), Some(frac)) => frac.len() <= d,
        _ => true,
    };
    whole_ok && decimal_ok
}

// ------------------------------- Deep paths ------------------------------- //

/// One hop in a property chain such as `root.items[0].name`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathSeg<'a> {
    Key(&'a str),
    Index(usize),
}

impl<'a> From<&'a str> for PathSeg<'a> {
    fn from(key: &'a str) -> Self { PathSeg::Key(key) }
}

impl From<usize> for PathSeg<'_> {
    fn from(index: usize) -> Self { PathSeg::Index(index) }
}

/// True when every hop of the chain resolves to a defined value.
pub fn is_deep_defined(root: &Value, path: &[PathSeg<'_>]) -> bool {
    let mut cur = root;
    for seg in path {
        let next = match (cur, seg) {
            (Value::Object(m), PathSeg::Key(k)) => m.get(*k),
            (Value::Array(xs), PathSeg::Index(i)) => xs.get(*i),
            _ => None,
        };
        match next {
            Some(v) if is_defined(v) => cur = v,
            _ => return false,
        }
    }
    true
}

// ------------------------------- Tests ------------------------------------ //
