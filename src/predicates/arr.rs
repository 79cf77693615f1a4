use crate::value::Value;

use super::{is_boolean, is_function, is_integer, is_mixed, is_number, is_object, is_string};

/// Shared shape check: an array, of exactly `size` elements when given, whose
/// elements all satisfy `item`.
fn every(v: &Value, size: Option<usize>, item: fn(&Value) -> bool) -> bool {
    let Value::Array(xs) = v else { return false };
    if size.is_some_and(|n| xs.len() != n) {
        return false;
    }
    xs.iter().all(item)
}

pub fn is_mixed_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_mixed) }

pub fn is_object_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_object) }

pub fn is_number_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_number) }

pub fn is_function_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_function) }

pub fn is_boolean_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_boolean) }

pub fn is_integer_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_integer) }

/// Every number is a decimal, so this is the number-array check.
pub fn is_decimal_array(v: &Value, size: Option<usize>) -> bool { is_number_array(v, size) }

pub fn is_string_array(v: &Value, size: Option<usize>) -> bool { every(v, size, is_string) }

/// `char[]` is spelled as a string; with `size` it must hold exactly that
/// many characters.
pub fn is_char_sequence(v: &Value, size: Option<usize>) -> bool {
    match v {
        Value::String(s) => size.is_none_or(|n| s.chars().count() == n),
        _ => false,
    }
}
