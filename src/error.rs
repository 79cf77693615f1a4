//! Error taxonomy for the argument checker.
use serde::Serialize;
use thiserror::Error;

use crate::report::Diagnostic;

/// Why a validation call rejected its arguments.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailureKind {
    /// The number of actual arguments does not satisfy the declared arity.
    MismatchArgCount,
    /// An argument satisfied none of the alternatives declared for its position.
    UnexpectedDataType,
}

/// A rejected call under [`crate::config::ErrorMode::Error`].
#[derive(Clone, Debug)]
pub struct Rejection {
    pub kind: FailureKind,
    /// Location-annotated, human-readable message.
    pub message: String,
    pub diagnostic: Diagnostic,
}

#[derive(Debug, Error)]
pub enum ArgvError {
    /// The checker itself was misused: bad signature syntax, a bad descriptor
    /// modifier, an unknown mode name, or input that is not an argument list.
    /// Reported regardless of the error mode.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("{}", .0.message)]
    Rejected(Box<Rejection>),
}

impl ArgvError {
    pub fn invalid(msg: impl Into<String>) -> Self { ArgvError::InvalidArgument(msg.into()) }

    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            ArgvError::Rejected(r) => Some(r),
            ArgvError::InvalidArgument(_) => None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> { self.rejection().map(|r| r.kind) }
}

pub type Result<T, E = ArgvError> = std::result::Result<T, E>;
