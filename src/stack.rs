//! Call-stack introspection, injected into the validator.
//!
//! Nothing here parses engine-specific trace text. An implementation either
//! knows the frames (innermost first) or answers `None`, in which case the
//! report goes without a location.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    pub invoked_by: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub line: Option<u32>,
    #[serde(default)]
    pub column: Option<u32>,
}

impl Frame {
    pub fn named(invoked_by: impl Into<String>) -> Self {
        Self { invoked_by: invoked_by.into(), ..Self::default() }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32, column: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

pub trait StackIntrospection: Send + Sync {
    /// Frames of the current call, innermost first, or `None` when the host
    /// cannot say.
    fn capture(&self) -> Option<Vec<Frame>>;
}

/// Never knows anything. The default collaborator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unsupported;

impl StackIntrospection for Unsupported {
    fn capture(&self) -> Option<Vec<Frame>> { None }
}

/// A trace fixed up front, for hosts that track their own call sites.
#[derive(Clone, Debug, Default)]
pub struct FixedTrace(pub Vec<Frame>);

impl StackIntrospection for FixedTrace {
    fn capture(&self) -> Option<Vec<Frame>> { Some(self.0.clone()) }
}

impl<F> StackIntrospection for F
where
    F: Fn() -> Option<Vec<Frame>> + Send + Sync,
{
    fn capture(&self) -> Option<Vec<Frame>> { self() }
}
