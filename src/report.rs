//! Diagnostics and messages for rejected calls.
use serde::Serialize;

use crate::error::FailureKind;
use crate::predicates::get_class;
use crate::signature::CountMismatch;
use crate::stack::Frame;
use crate::value::{format_number, Value};

/// Caller name used when the stack cannot tell.
pub const UNKNOWN_CALLER: &str = "function";

/// One actual argument as seen by the checker.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ArgumentReport {
    pub valid: bool,
    pub index: usize,
    pub value: Value,
    pub expected: String,
    pub given: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<FailureKind>,
}

/// Structured payload handed to the failure callback.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Diagnostic {
    pub arguments: Vec<ArgumentReport>,
    pub invoked_by: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

/// What went wrong, before it is rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Failure {
    Count(CountMismatch),
    /// First argument whose value matched none of its alternatives.
    Type { index: usize, expected: String, given: String },
}

impl Failure {
    pub fn kind(&self) -> FailureKind {
        match self {
            Failure::Count(_) => FailureKind::MismatchArgCount,
            Failure::Type { .. } => FailureKind::UnexpectedDataType,
        }
    }

    /// Argument to highlight in the message, if the failure has one.
    pub fn index(&self) -> Option<usize> {
        match self {
            Failure::Count(_) => None,
            Failure::Type { index, .. } => Some(*index),
        }
    }

    pub fn reason(&self) -> String {
        match self {
            Failure::Count(m) => m.to_string(),
            Failure::Type { expected, given, .. } => format!("Expected '{expected}', '{given}' given"),
        }
    }
}

// ------------------------------- Call site -------------------------------- //

/// Who called the checked function and from where.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallSite {
    pub invoked_by: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub column: Option<u32>,
}

impl CallSite {
    pub fn unknown() -> Self {
        Self { invoked_by: UNKNOWN_CALLER.to_string(), ..Self::default() }
    }

    /// Anchor on the first frame named after one of `entries` (bare, or
    /// path-qualified as `...::name`), skipping any directly enclosing frames
    /// that match too, so `validate_with` called through `validate` anchors
    /// once. The next frame is the checked function and the one after it is
    /// where it was called from. The innermost run of matching frames wins.
    pub fn locate(frames: &[Frame], entries: &[&str]) -> Self {
        let is_entry = |f: &Frame| {
            entries.iter().any(|e| {
                f.invoked_by == *e
                    || f.invoked_by.strip_suffix(*e).is_some_and(|head| head.ends_with("::"))
            })
        };
        let Some(mut at) = frames.iter().position(is_entry) else {
            return Self::unknown();
        };
        while frames.get(at + 1).is_some_and(is_entry) {
            at += 1;
        }
        let Some(caller) = frames.get(at + 1) else {
            return Self::unknown();
        };
        let origin = frames.get(at + 2);
        Self {
            invoked_by: caller.invoked_by.clone(),
            file: origin.and_then(|f| f.file.clone()),
            line: origin.and_then(|f| f.line),
            column: origin.and_then(|f| f.column),
        }
    }
}

// ------------------------------- Rendering -------------------------------- //

/// Strings quoted, numbers bare, anything else as `[object <Class>]`.
pub fn render_value(v: &Value) -> String {
    match v {
        Value::String(s) => format!("\"{s}\""),
        Value::Number(n) => format_number(n.0),
        other => format!("[object {}]", get_class(other)),
    }
}

pub fn render_arguments(values: &[&Value], highlight: Option<usize>) -> String {
    values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let shown = render_value(v);
            if Some(i) == highlight { format!("-->{shown}<--") } else { shown }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// `caller(args): reason in file on line N`; the location tail is dropped
/// when the call site has no file or line.
pub fn compose_message(site: &CallSite, arguments: &str, reason: &str) -> String {
    let mut message = format!("{}({arguments}): {reason}", site.invoked_by);
    if let (Some(file), Some(line)) = (&site.file, site.line) {
        message.push_str(&format!(" in {file} on line {line}"));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::Bound;
    use serde_json::json;

    const ENTRIES: &[&str] = &["validate", "validate_with"];

    fn trace() -> Vec<Frame> {
        vec![
            Frame::named("argv_sig::argv::Validator::validate").at("src/argv.rs", 10, 1),
            Frame::named("for_each_property").at("src/lib.rs", 20, 5),
            Frame::named("main").at("src/main.rs", 42, 9),
        ]
    }

    #[test]
    fn locate_reports_caller_and_its_call_site() {
        let site = CallSite::locate(&trace(), ENTRIES);
        assert_eq!(site.invoked_by, "for_each_property");
        assert_eq!(site.file.as_deref(), Some("src/main.rs"));
        assert_eq!(site.line, Some(42));
        assert_eq!(site.column, Some(9));
    }

    #[test]
    fn locate_without_anchor_or_caller_is_unknown() {
        assert_eq!(CallSite::locate(&trace()[1..], ENTRIES), CallSite::unknown());
        assert_eq!(CallSite::locate(&trace()[..1], ENTRIES), CallSite::unknown());
    }

    #[test]
    fn locate_without_origin_keeps_the_name() {
        let site = CallSite::locate(&trace()[..2], ENTRIES);
        assert_eq!(site.invoked_by, "for_each_property");
        assert_eq!(site.file, None);
    }

    #[test]
    fn any_entry_point_anchors_the_search() {
        let frames = vec![
            Frame::named("argv_sig::argv::Validator::run"),
            Frame::named("argv_sig::argv::Validator::validate_with"),
            Frame::named("handler").at("src/lib.rs", 3, 1),
            Frame::named("main").at("main.rs", 7, 2),
        ];
        let site = CallSite::locate(&frames, ENTRIES);
        assert_eq!(site.invoked_by, "handler");
        assert_eq!(site.file.as_deref(), Some("main.rs"));
        assert_eq!(site.line, Some(7));
    }

    #[test]
    fn nested_entry_points_anchor_once() {
        let frames = vec![
            Frame::named("argv_sig::argv::Validator::validate_with"),
            Frame::named("argv_sig::argv::Validator::validate"),
            Frame::named("handler"),
            Frame::named("main").at("main.rs", 7, 2),
        ];
        assert_eq!(CallSite::locate(&frames, ENTRIES).invoked_by, "handler");
    }

    #[test]
    fn suffix_match_needs_a_path_separator() {
        let frames = vec![Frame::named("prevalidate"), Frame::named("handler")];
        assert_eq!(CallSite::locate(&frames, ENTRIES), CallSite::unknown());
    }

    #[test]
    fn values_render_like_literals() {
        assert_eq!(render_value(&Value::from("a")), "\"a\"");
        assert_eq!(render_value(&Value::from(2)), "2");
        assert_eq!(render_value(&Value::from(json!([1]))), "[object Array]");
        assert_eq!(render_value(&Value::Null), "[object Null]");
        assert_eq!(render_value(&Value::Undefined), "[object Undefined]");
        assert_eq!(render_value(&Value::function("f")), "[object Function]");
    }

    #[test]
    fn highlighted_argument_is_bracketed() {
        let a = Value::from(1);
        let b = Value::from("x");
        assert_eq!(render_arguments(&[&a, &b], Some(1)), "1, -->\"x\"<--");
        assert_eq!(render_arguments(&[&a, &b], None), "1, \"x\"");
        assert_eq!(render_arguments(&[], None), "");
    }

    #[test]
    fn message_with_and_without_location() {
        let site = CallSite::locate(&trace(), ENTRIES);
        assert_eq!(
            compose_message(&site, "-->1<--", "Expected 'string', 'number' given"),
            "for_each_property(-->1<--): Expected 'string', 'number' given in src/main.rs on line 42"
        );
        assert_eq!(
            compose_message(&CallSite::unknown(), "", "boom"),
            "function(): boom"
        );
    }

    #[test]
    fn failure_reasons() {
        let f = Failure::Type { index: 0, expected: "string".into(), given: "number".into() };
        assert_eq!(f.reason(), "Expected 'string', 'number' given");
        assert_eq!(f.index(), Some(0));
        let f = Failure::Count(CountMismatch { expected: 2, bound: Bound::Exact, given: 3 });
        assert_eq!(f.kind(), FailureKind::MismatchArgCount);
        assert_eq!(f.index(), None);
    }
}
