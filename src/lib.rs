//! Runtime argument-signature checking for dynamically typed values.
//!
//! A [`Signature`] lists one entry per parameter: a type token such as
//! `"number"`, `"[string]"`, `"integer|null"` or `"...mixed"`, or a custom
//! [`TypeDescriptor`]. A [`Validator`] checks a list of actual [`Value`]s
//! against it and reports the first problem with a [`Diagnostic`].
pub mod argv;
pub mod cli;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod jq_exec;
pub mod path_de;
pub mod predicates;
pub mod report;
pub mod signature;
pub mod stack;
pub mod token;
pub mod value;

pub use argv::{ArgumentRecord, Arguments, Validator};
pub use config::{Config, ErrorMode, Mode};
pub use descriptor::TypeDescriptor;
pub use error::{ArgvError, FailureKind, Rejection};
pub use report::{ArgumentReport, Diagnostic};
pub use signature::{SigEntry, Signature};
pub use stack::{FixedTrace, Frame, StackIntrospection, Unsupported};
pub use value::Value;
