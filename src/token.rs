//! Built-in type tokens and their textual grammar.
//!
//! Grammar: `*`, `array`, `null`, or `<kind>`, `<kind>[]`, `<kind>[N]` with
//! `N` a positive integer. `bool` and `int` are aliases, as are `float` and
//! `double` for `decimal`.
use std::num::NonZeroUsize;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::Mode;
use crate::error::ArgvError;
use crate::predicates::{self as p, arr};
use crate::value::Value;

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"^(?:(?P<bare>\*|array|null)|",
        r"(?P<kind>mixed|object|number|boolean|bool|function|string|",
        r"integer|int|decimal|float|double|char)",
        r"(?P<suffix>\[(?P<size>[1-9][0-9]*)?\])?)$",
    ))
    .expect("token grammar is a valid regex")
});

/// Element kinds that may appear on their own or with an array suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Mixed,
    Object,
    Number,
    Boolean,
    Function,
    String,
    Integer,
    Decimal,
    Char,
}

impl Kind {
    fn from_name(name: &str) -> Option<Self> {
        Some(match name {
            "mixed" => Kind::Mixed,
            "object" => Kind::Object,
            "number" => Kind::Number,
            "boolean" | "bool" => Kind::Boolean,
            "function" => Kind::Function,
            "string" => Kind::String,
            "integer" | "int" => Kind::Integer,
            "decimal" | "float" | "double" => Kind::Decimal,
            "char" => Kind::Char,
            _ => return None,
        })
    }

    /// Kinds outside the basic JavaScript set.
    pub fn is_extended(self) -> bool {
        matches!(self, Kind::Mixed | Kind::Integer | Kind::Decimal | Kind::Char)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeToken {
    /// `*`: any defined value.
    Any,
    /// `array`: any array.
    Array,
    Null,
    Scalar(Kind),
    /// `<kind>[]` or `<kind>[N]`; `N` is an exact length.
    ArrayOf { elem: Kind, size: Option<NonZeroUsize> },
}

impl TypeToken {
    /// Parse one union member. Does not consult the mode.
    pub fn parse(text: &str) -> Result<Self, ArgvError> {
        let unrecognized = || ArgvError::invalid(format!("unrecognized data type '{text}'"));
        let caps = TOKEN_RE.captures(text).ok_or_else(unrecognized)?;

        if let Some(bare) = caps.name("bare") {
            return Ok(match bare.as_str() {
                "*" => TypeToken::Any,
                "array" => TypeToken::Array,
                _ => TypeToken::Null,
            });
        }
        let elem = caps
            .name("kind")
            .and_then(|m| Kind::from_name(m.as_str()))
            .ok_or_else(unrecognized)?;
        if caps.name("suffix").is_none() {
            return Ok(TypeToken::Scalar(elem));
        }
        let size = match caps.name("size") {
            None => None,
            // the grammar already excludes zero; overflow is the only failure left
            Some(m) => Some(m.as_str().parse::<NonZeroUsize>().map_err(|_| unrecognized())?),
        };
        Ok(TypeToken::ArrayOf { elem, size })
    }

    /// Parse and check the token against the configured mode.
    pub fn resolve(text: &str, mode: Mode) -> Result<Self, ArgvError> {
        let token = Self::parse(text)?;
        if mode == Mode::Strict && token.is_extended() {
            return Err(ArgvError::invalid(format!(
                "extended types unsupported in strict mode: '{text}'"
            )));
        }
        Ok(token)
    }

    /// Extended tokens: the extra scalar kinds and every array form.
    pub fn is_extended(&self) -> bool {
        match self {
            TypeToken::Scalar(k) => k.is_extended(),
            TypeToken::ArrayOf { .. } => true,
            TypeToken::Any | TypeToken::Array | TypeToken::Null => false,
        }
    }

    pub fn matches(&self, v: &Value) -> bool {
        match *self {
            TypeToken::Any => p::is_mixed(v),
            TypeToken::Array => p::is_array(v),
            TypeToken::Null => p::is_null(v),
            TypeToken::Scalar(kind) => match kind {
                Kind::Mixed => p::is_mixed(v),
                Kind::Object => p::is_object(v),
                Kind::Number => p::is_number(v),
                Kind::Boolean => p::is_boolean(v),
                Kind::Function => p::is_function(v),
                Kind::String => p::is_string(v),
                Kind::Integer => p::is_integer(v),
                Kind::Decimal => p::is_decimal(v, None, None),
                Kind::Char => p::is_char(v),
            },
            TypeToken::ArrayOf { elem, size } => {
                let size = size.map(NonZeroUsize::get);
                match elem {
                    Kind::Mixed => arr::is_mixed_array(v, size),
                    Kind::Object => arr::is_object_array(v, size),
                    Kind::Number => arr::is_number_array(v, size),
                    Kind::Boolean => arr::is_boolean_array(v, size),
                    Kind::Function => arr::is_function_array(v, size),
                    Kind::String => arr::is_string_array(v, size),
                    Kind::Integer => arr::is_integer_array(v, size),
                    Kind::Decimal => arr::is_decimal_array(v, size),
                    Kind::Char => arr::is_char_sequence(v, size),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("*", TypeToken::Any)]
    #[case("array", TypeToken::Array)]
    #[case("null", TypeToken::Null)]
    #[case("bool", TypeToken::Scalar(Kind::Boolean))]
    #[case("int", TypeToken::Scalar(Kind::Integer))]
    #[case("double", TypeToken::Scalar(Kind::Decimal))]
    #[case("string[]", TypeToken::ArrayOf { elem: Kind::String, size: None })]
    #[case("number[12]", TypeToken::ArrayOf { elem: Kind::Number, size: NonZeroUsize::new(12) })]
    fn grammar_accepts(#[case] text: &str, #[case] expected: TypeToken) {
        assert_eq!(TypeToken::parse(text).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("str")]
    #[case("array[]")]
    #[case("null[2]")]
    #[case("*[]")]
    #[case("number[0]")]
    #[case("number[01]")]
    #[case("number[-1]")]
    #[case(" number")]
    #[case("Number")]
    #[case("number[99999999999999999999999999]")]
    fn grammar_rejects(#[case] text: &str) {
        let err = TypeToken::parse(text).unwrap_err();
        assert!(err.to_string().contains("unrecognized data type"), "{err}");
    }

    #[rstest]
    #[case("integer")]
    #[case("mixed")]
    #[case("char")]
    #[case("float")]
    #[case("number[]")]
    #[case("string[3]")]
    fn strict_mode_rejects_extended(#[case] text: &str) {
        let err = TypeToken::resolve(text, Mode::Strict).unwrap_err();
        assert!(err.to_string().contains("strict mode"), "{err}");
        assert!(TypeToken::resolve(text, Mode::Extend).is_ok());
    }

    #[rstest]
    #[case("*")]
    #[case("array")]
    #[case("null")]
    #[case("object")]
    #[case("number")]
    #[case("boolean")]
    #[case("function")]
    #[case("string")]
    fn strict_mode_accepts_basic(#[case] text: &str) {
        assert!(TypeToken::resolve(text, Mode::Strict).is_ok());
    }

    #[rstest]
    #[case("*", json!(0), true)]
    #[case("*", json!(null), true)]
    #[case("array", json!([1, "a"]), true)]
    #[case("null", json!(null), true)]
    #[case("null", json!({}), false)]
    #[case("object", json!([]), false)]
    #[case("integer", json!(3), true)]
    #[case("integer", json!(3.5), false)]
    #[case("decimal", json!(3.5), true)]
    #[case("char", json!("ab"), false)]
    #[case("number[3]", json!([1, 2, 3]), true)]
    #[case("number[3]", json!([1, 2]), false)]
    #[case("int[]", json!([1, 2.5]), false)]
    #[case("char[3]", json!("abc"), true)]
    #[case("char[]", json!(["a"]), false)]
    #[case("mixed[2]", json!([null, "a"]), true)]
    fn tokens_match_values(#[case] text: &str, #[case] value: serde_json::Value, #[case] ok: bool) {
        let token = TypeToken::parse(text).unwrap();
        assert_eq!(token.matches(&Value::from(value)), ok, "{text}");
    }

    #[test]
    fn any_rejects_undefined() {
        assert!(!TypeToken::Any.matches(&Value::Undefined));
        assert!(TypeToken::Scalar(Kind::Function).matches(&Value::function("f")));
    }
}
