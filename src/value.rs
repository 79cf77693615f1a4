//! Dynamic values inspected by the argument checker.
//!
//! JSON has no `undefined` and no callables, so the model carries both
//! explicitly: `Undefined` stands for an absent argument and `Function` for a
//! callable known only by its name.
use indexmap::IndexMap;
use ordered_float::OrderedFloat;
use serde::{Serialize, Serializer};
use serde_json::Value as Json;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Value {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(OrderedFloat<f64>),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    Function(String),
}

impl Value {
    pub fn number(n: f64) -> Self { Value::Number(OrderedFloat(n)) }
    pub fn function(name: impl Into<String>) -> Self { Value::Function(name.into()) }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(n.0),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    /// Lossy projection back to JSON, used for diagnostics.
    /// `Undefined` and non-finite numbers become `null`, functions their tag.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Undefined | Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => json_number(n.0),
            Value::String(s) => Json::String(s.clone()),
            Value::Array(xs) => Json::Array(xs.iter().map(Value::to_json).collect()),
            Value::Object(m) => Json::Object(
                m.iter().map(|(k, v)| (k.clone(), v.to_json())).collect()
            ),
            Value::Function(name) => Json::String(format!("[function {name}]")),
        }
    }
}

// prefer integers when exact so `1` does not come back as `1.0`
fn json_number(n: f64) -> Json {
    if n.is_finite() && n.fract() == 0.0 && n >= i64::MIN as f64 && n <= i64::MAX as f64 {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

/// Render a number the way a JavaScript engine prints it: shortest
/// round-trip digits, integral values without a fractional part, exponent
/// form (`1e+21`, `1.5e-7`) below 1e-6 and from 1e21 up, `NaN`, `Infinity`,
/// and no negative zero.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() };
    }
    if n == 0.0 {
        return "0".to_string();
    }
    // `{:e}` yields the shortest round-trip mantissa, e.g. `-1.5e-7`
    let sci = format!("{n:e}");
    let (mantissa, exponent) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    match exponent.parse::<i32>() {
        Ok(exp) if exp >= 21 => format!("{mantissa}e+{exp}"),
        Ok(exp) if exp < -6 => format!("{mantissa}e{exp}"),
        _ => format!("{n}"),
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSIONS
// ————————————————————————————————————————————————————————————————————————————

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(*b),
            Json::Number(n) => n.as_f64().map_or(Value::Null, Value::number),
            Json::String(s) => Value::String(s.clone()),
            Json::Array(xs) => Value::Array(xs.iter().map(Value::from).collect()),
            Json::Object(m) => Value::Object(
                m.iter().map(|(k, v)| (k.clone(), Value::from(v))).collect()
            ),
        }
    }
}

impl From<Json> for Value {
    fn from(json: Json) -> Self { Value::from(&json) }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::number(n) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::number(n as f64) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::number(n as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl From<Vec<Value>> for Value {
    fn from(xs: Vec<Value>) -> Self { Value::Array(xs) }
}
