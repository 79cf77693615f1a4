//! Runtime argument checking.
//!
//! ```
//! use argv_sig::{Config, ErrorMode, Mode, Signature, Validator, Value};
//!
//! let checker = Validator::new(Config::new(Mode::Extend, ErrorMode::Silent));
//! let sig = Signature::new(["number", "[string]"]);
//!
//! assert!(checker.validate(&[Value::from(1)], &sig).unwrap());
//! assert!(!checker.validate(&[Value::from(1), Value::from(2)], &sig).unwrap());
//! ```
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value as Json;

use crate::config::{Config, ErrorMode, Mode};
use crate::error::{ArgvError, FailureKind, Rejection};
use crate::predicates::detail_type_of;
use crate::report::{self, ArgumentReport, CallSite, Diagnostic, Failure};
use crate::signature::{Declaration, ParamSpec, Signature};
use crate::stack::{StackIntrospection, Unsupported};
use crate::value::Value;

// ————————————————————————————————————————————————————————————————————————————
// ARGUMENT LIST
// ————————————————————————————————————————————————————————————————————————————

/// Actual arguments of one call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Arguments(pub Vec<Value>);

impl Arguments {
    pub fn as_slice(&self) -> &[Value] { &self.0 }
}

impl TryFrom<&Json> for Arguments {
    type Error = ArgvError;
    /// Only a JSON array is an argument list.
    fn try_from(json: &Json) -> Result<Self, Self::Error> {
        match json {
            Json::Array(xs) => Ok(Arguments(xs.iter().map(Value::from).collect())),
            other => Err(ArgvError::invalid(format!(
                "expected an argument list ('array'), '{}' given",
                detail_type_of(&Value::from(other))
            ))),
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// PER-CALL RECORDS
// ————————————————————————————————————————————————————————————————————————————

/// Working state for one actual argument. Lives for a single call.
#[derive(Clone, Debug)]
pub struct ArgumentRecord<'a> {
    pub valid: bool,
    pub index: usize,
    pub value: &'a Value,
    pub expected: String,
    pub given: String,
    pub spec: Option<&'a ParamSpec>,
    pub optional: bool,
    pub error: Option<FailureKind>,
}

impl<'a> ArgumentRecord<'a> {
    fn new(index: usize, value: &'a Value, spec: Option<&'a ParamSpec>) -> Self {
        Self {
            valid: false,
            index,
            value,
            expected: spec.map(|s| s.expected.clone()).unwrap_or_default(),
            given: detail_type_of(value),
            spec,
            optional: spec.is_some_and(|s| s.optional),
            error: None,
        }
    }

    fn check(&self) -> bool { self.spec.is_some_and(|s| s.accepts(self.value)) }

    fn to_report(&self) -> ArgumentReport {
        ArgumentReport {
            valid: self.valid,
            index: self.index,
            value: self.value.clone(),
            expected: self.expected.clone(),
            given: self.given.clone(),
            error: self.error,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// VALIDATOR
// ————————————————————————————————————————————————————————————————————————————

pub struct Validator {
    config: Config,
    stack: Arc<dyn StackIntrospection>,
    warned: AtomicBool,
}

impl Default for Validator {
    fn default() -> Self { Self::new(Config::default()) }
}

impl Validator {
    /// Frame names the stack is searched for when locating the caller: the
    /// public checking methods.
    pub const ENTRY_POINTS: &'static [&'static str] = &["validate", "validate_with"];

    pub fn new(config: Config) -> Self {
        Self { config, stack: Arc::new(Unsupported), warned: AtomicBool::new(false) }
    }

    pub fn with_stack(mut self, stack: impl StackIntrospection + 'static) -> Self {
        self.stack = Arc::new(stack);
        self
    }

    pub fn with_shared_stack(mut self, stack: Arc<dyn StackIntrospection>) -> Self {
        self.stack = stack;
        self
    }

    pub fn config(&self) -> &Config { &self.config }
    pub fn mode(&self) -> Mode { self.config.mode }
    pub fn error_mode(&self) -> ErrorMode { self.config.error_mode }

    /// Returns the mode now in effect.
    pub fn set_mode(&mut self, mode: Mode) -> Mode {
        self.config.mode = mode;
        self.config.mode
    }

    /// Returns the error mode now in effect.
    pub fn set_error_mode(&mut self, error_mode: ErrorMode) -> ErrorMode {
        self.config.error_mode = error_mode;
        self.config.error_mode
    }

    /// Check `actuals` against `signature`.
    ///
    /// `Ok(true)` when every argument fits. On a mismatch: `Ok(false)` under
    /// [`ErrorMode::Silent`], [`ArgvError::Rejected`] under
    /// [`ErrorMode::Error`]. A malformed signature is always
    /// [`ArgvError::InvalidArgument`].
    pub fn validate(&self, actuals: &[Value], signature: &Signature) -> Result<bool, ArgvError> {
        self.run(actuals, signature, None::<fn(&Diagnostic)>)
    }

    /// Like [`Validator::validate`], and calls `on_failure` exactly once with
    /// the diagnostic when the arguments are rejected (in either error mode).
    pub fn validate_with<F>(
        &self,
        actuals: &[Value],
        signature: &Signature,
        on_failure: F,
    ) -> Result<bool, ArgvError>
    where
        F: FnOnce(&Diagnostic),
    {
        self.run(actuals, signature, Some(on_failure))
    }

    fn run<F>(
        &self,
        actuals: &[Value],
        signature: &Signature,
        on_failure: Option<F>,
    ) -> Result<bool, ArgvError>
    where
        F: FnOnce(&Diagnostic),
    {
        let declaration = Declaration::parse(signature, self.config.mode)?;

        let mut records: Vec<ArgumentRecord<'_>> = actuals
            .iter()
            .enumerate()
            .map(|(i, v)| ArgumentRecord::new(i, v, declaration.spec_for(i)))
            .collect();

        let failure = match declaration.check_count(actuals.len()) {
            Err(mismatch) => {
                for r in &mut records {
                    r.valid = false;
                    r.error = Some(FailureKind::MismatchArgCount);
                }
                Some(Failure::Count(mismatch))
            }
            Ok(()) => first_type_failure(&mut records),
        };

        let Some(failure) = failure else {
            return Ok(true);
        };
        tracing::debug!(kind = ?failure.kind(), reason = %failure.reason(), "arguments rejected");

        let site = self.call_site();
        let values: Vec<&Value> = records.iter().map(|r| r.value).collect();
        let message = report::compose_message(
            &site,
            &report::render_arguments(&values, failure.index()),
            &failure.reason(),
        );
        let diagnostic = Diagnostic {
            arguments: records.iter().map(ArgumentRecord::to_report).collect(),
            invoked_by: site.invoked_by,
            file: site.file,
            line: site.line,
            column: site.column,
        };

        if let Some(callback) = on_failure {
            callback(&diagnostic);
        }

        match self.config.error_mode {
            ErrorMode::Silent => Ok(false),
            ErrorMode::Error => Err(ArgvError::Rejected(Box::new(Rejection {
                kind: failure.kind(),
                message,
                diagnostic,
            }))),
        }
    }

    fn call_site(&self) -> CallSite {
        match self.stack.capture() {
            Some(frames) => CallSite::locate(&frames, Self::ENTRY_POINTS),
            None => {
                if !self.warned.swap(true, Ordering::Relaxed) {
                    tracing::warn!("stack introspection unavailable; reports will omit caller location");
                }
                CallSite::unknown()
            }
        }
    }
}

/// Walk records in order, marking passes; stop at the first rejection.
fn first_type_failure(records: &mut [ArgumentRecord<'_>]) -> Option<Failure> {
    for r in records.iter_mut() {
        if r.check() {
            r.valid = true;
            continue;
        }
        r.error = Some(FailureKind::UnexpectedDataType);
        return Some(Failure::Type {
            index: r.index,
            expected: r.expected.clone(),
            given: r.given.clone(),
        });
    }
    None
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::stack::{FixedTrace, Frame};
    use serde_json::json;
    use std::cell::Cell;
    use std::sync::atomic::AtomicUsize;

    fn args(json: Json) -> Vec<Value> {
        Arguments::try_from(&json).unwrap().0
    }

    fn silent() -> Validator { Validator::new(Config::new(Mode::Extend, ErrorMode::Silent)) }

    fn loud() -> Validator { Validator::new(Config::new(Mode::Extend, ErrorMode::Error)) }

    fn diagnose(v: &Validator, actuals: Json, sig: &Signature) -> Option<Diagnostic> {
        let mut seen = None;
        let ok = v.validate_with(&args(actuals), sig, |d| seen = Some(d.clone())).unwrap();
        assert_eq!(ok, seen.is_none());
        seen
    }

    #[test]
    fn single_string_signature() {
        let sig = Signature::single("string");
        assert!(silent().validate(&args(json!(["x"])), &sig).unwrap());

        let d = diagnose(&silent(), json!([1]), &sig).expect("rejected");
        let arg = &d.arguments[0];
        assert!(!arg.valid);
        assert_eq!(arg.index, 0);
        assert_eq!(arg.error, Some(FailureKind::UnexpectedDataType));
        assert_eq!(arg.expected, "string");
        assert_eq!(arg.given, "number");
    }

    #[test]
    fn optional_second_argument() {
        let sig = Signature::new(["number", "[string]"]);
        assert!(silent().validate(&args(json!([1])), &sig).unwrap());
        assert!(silent().validate(&args(json!([1, "a"])), &sig).unwrap());
        assert!(!silent().validate(&args(json!([1, 2])), &sig).unwrap());
        // an explicit undefined fills the optional slot
        assert!(silent().validate(&[Value::from(1), Value::Undefined], &sig).unwrap());
    }

    #[test]
    fn repeatable_absorbs_the_tail() {
        let sig = Signature::single("...number");
        assert!(silent().validate(&args(json!([1, 2, 3])), &sig).unwrap());

        let d = diagnose(&silent(), json!([1, "a", 3]), &sig).expect("rejected");
        assert!(d.arguments[0].valid);
        assert_eq!(d.arguments[1].error, Some(FailureKind::UnexpectedDataType));
        // not evaluated past the first failure
        assert!(!d.arguments[2].valid);
        assert_eq!(d.arguments[2].error, None);
        assert_eq!(d.arguments[2].expected, "number");
    }

    #[test]
    fn union_tries_each_alternative() {
        let sig = Signature::single("number|null");
        assert!(silent().validate(&args(json!([null])), &sig).unwrap());
        assert!(silent().validate(&args(json!([4])), &sig).unwrap());
        let d = diagnose(&silent(), json!(["4"]), &sig).unwrap();
        assert_eq!(d.arguments[0].expected, "number,null");
    }

    #[test]
    fn count_mismatch_tags_every_argument() {
        let sig = Signature::new(["number"]);
        let d = diagnose(&silent(), json!([1, 2]), &sig).unwrap();
        assert!(d.arguments.iter().all(|a| !a.valid));
        assert!(d.arguments.iter().all(|a| a.error == Some(FailureKind::MismatchArgCount)));

        let err = loud().validate(&args(json!([])), &sig).unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::MismatchArgCount));
        assert_eq!(
            err.to_string(),
            "function(): Argument number mismatch: Expected 1 argument(s), 0 given"
        );
    }

    #[test]
    fn count_mismatch_short_circuits_type_checks() {
        let sig = Signature::new(["string", "string"]);
        let err = loud().validate(&args(json!([1, 2, 3])), &sig).unwrap_err();
        assert_eq!(err.failure_kind(), Some(FailureKind::MismatchArgCount));
    }

    #[test]
    fn two_repeatables_fail_regardless_of_arguments() {
        let sig = Signature::new(["...number", "...string"]);
        for v in [silent(), loud()] {
            assert!(matches!(v.validate(&[], &sig), Err(ArgvError::InvalidArgument(_))));
            assert!(matches!(
                v.validate(&args(json!([1, "a"])), &sig),
                Err(ArgvError::InvalidArgument(_))
            ));
        }
    }

    #[test]
    fn strict_mode_rejects_extended_before_inspecting_arguments() {
        let mut v = silent();
        assert_eq!(v.set_mode(Mode::Strict), Mode::Strict);
        let called = Cell::new(false);
        let res = v.validate_with(&args(json!([1])), &Signature::single("integer"), |_| called.set(true));
        assert!(matches!(res, Err(ArgvError::InvalidArgument(_))));
        assert!(!called.get());
        // count would also fail, yet the signature error comes first
        assert!(matches!(
            v.validate(&[], &Signature::single("integer")),
            Err(ArgvError::InvalidArgument(_))
        ));
    }

    #[test]
    fn callback_fires_once_on_failure_and_never_on_success() {
        let calls = Cell::new(0);
        let sig = Signature::single("string");
        let v = loud();
        assert!(v.validate_with(&args(json!(["ok"])), &sig, |_| calls.set(calls.get() + 1)).unwrap());
        assert_eq!(calls.get(), 0);
        assert!(v.validate_with(&args(json!([false])), &sig, |_| calls.set(calls.get() + 1)).is_err());
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn error_mode_message_is_located_from_the_stack() {
        let v = loud().with_stack(FixedTrace(vec![
            Frame::named("validate"),
            Frame::named("for_each_property").at("lib.rs", 3, 1),
            Frame::named("main").at("main.rs", 12, 4),
        ]));
        let sig = Signature::new(["object", "function"]);
        let err = v.validate(&[Value::from(json!({})), Value::from("nope")], &sig).unwrap_err();
        let rejection = err.rejection().unwrap();
        assert_eq!(
            rejection.message,
            "for_each_property([object Object], -->\"nope\"<--): \
             Expected 'function', 'string' given in main.rs on line 12"
        );
        assert_eq!(rejection.diagnostic.invoked_by, "for_each_property");
        assert_eq!(rejection.diagnostic.line, Some(12));
        assert_eq!(rejection.diagnostic.column, Some(4));
    }

    #[test]
    fn error_mode_can_be_switched_at_runtime() {
        let mut v = loud();
        let sig = Signature::single("number");
        assert!(v.validate(&args(json!(["a"])), &sig).is_err());
        assert_eq!(v.set_error_mode(ErrorMode::Silent), ErrorMode::Silent);
        assert!(!v.validate(&args(json!(["a"])), &sig).unwrap());
    }

    #[test]
    fn custom_descriptors_mix_with_text_entries() {
        let even = TypeDescriptor::new("even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
        let sig = Signature::new([
            crate::signature::SigEntry::from("string"),
            even.array(Some(3)).unwrap().into(),
            even.optional().into(),
        ]);
        let v = silent();
        assert!(v.validate(&args(json!(["a", [2, 4]])), &sig).unwrap());
        assert!(v.validate(&args(json!(["a", [2, 4], 6])), &sig).unwrap());
        let d = diagnose(&v, json!(["a", [2, 4, 6, 8]]), &sig).unwrap();
        assert_eq!(d.arguments[1].expected, "even[3]");
        assert_eq!(d.arguments[1].given, "number[4]");
    }

    #[test]
    fn repeatable_descriptor() {
        let word = TypeDescriptor::anonymous(crate::predicates::is_string).repeatable();
        let sig = Signature::single(&word);
        assert!(silent().validate(&args(json!(["a", "b", "c"])), &sig).unwrap());
        assert!(!silent().validate(&args(json!(["a", 1])), &sig).unwrap());
    }

    #[test]
    fn arguments_must_be_a_json_array() {
        let err = Arguments::try_from(&json!({"a": 1})).unwrap_err();
        assert!(matches!(err, ArgvError::InvalidArgument(_)));
        assert!(err.to_string().contains("'object' given"), "{err}");
    }

    #[test]
    fn diagnostic_serializes_with_error_tags() {
        let d = diagnose(&silent(), json!([1]), &Signature::single("string")).unwrap();
        let out = serde_json::to_value(&d).unwrap();
        assert_eq!(out["arguments"][0]["error"], json!("UNEXPECTED_DATA_TYPE"));
        assert_eq!(out["arguments"][0]["value"], json!(1));
        assert_eq!(out["invoked_by"], json!("function"));
        assert_eq!(out["file"], json!(null));
    }

    #[test]
    fn callback_entry_point_is_located_from_the_stack() {
        let v = loud().with_stack(FixedTrace(vec![
            Frame::named("argv_sig::argv::Validator::run"),
            Frame::named("argv_sig::argv::Validator::validate_with"),
            Frame::named("handler"),
            Frame::named("main").at("main.rs", 7, 3),
        ]));
        let called = Cell::new(false);
        let err = v
            .validate_with(&[Value::from(1)], &Signature::single("string"), |_| called.set(true))
            .unwrap_err();
        assert!(called.get());
        assert_eq!(
            err.to_string(),
            "handler(-->1<--): Expected 'string', 'number' given in main.rs on line 7"
        );
    }

    /// Counts WARN events seen while installed.
    struct WarnCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    #[test]
    fn missing_stack_is_warned_about_once_per_validator() {
        use tracing_subscriber::layer::SubscriberExt;

        let warnings = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(WarnCounter(warnings.clone()));
        let sig = Signature::single("string");

        tracing::subscriber::with_default(subscriber, || {
            let v = silent();
            assert!(!v.validate(&args(json!([1])), &sig).unwrap());
            assert_eq!(warnings.load(Ordering::SeqCst), 1);
            assert!(!v.validate(&args(json!([2])), &sig).unwrap());
            assert!(!v.validate_with(&args(json!([3])), &sig, |_| ()).unwrap());
            assert_eq!(warnings.load(Ordering::SeqCst), 1);

            // a passing call never asks for the stack
            let fresh = silent();
            assert!(fresh.validate(&args(json!(["ok"])), &sig).unwrap());
            assert_eq!(warnings.load(Ordering::SeqCst), 1);
            assert!(!fresh.validate(&args(json!([4])), &sig).unwrap());
            assert_eq!(warnings.load(Ordering::SeqCst), 2);
        });
    }

    #[test]
    fn validator_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Validator>();
    }
}
