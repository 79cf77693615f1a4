//! Checker configuration: which token set is accepted and how failures surface.
use std::path::Path;
use std::str::FromStr;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::error::ArgvError;

/// Token set accepted in signatures.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Only the basic kinds: any, array, null, object, number, boolean,
    /// function, string.
    Strict,
    /// Adds mixed, integer, decimal/float/double, char and every `[]` form.
    #[default]
    Extend,
}

/// What a failed validation does.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorMode {
    /// Return [`ArgvError::Rejected`] with the formatted message.
    #[default]
    Error,
    /// Return `Ok(false)`; the callback is the only notification.
    Silent,
}

impl FromStr for Mode {
    type Err = ArgvError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Mode::Strict),
            "extend" => Ok(Mode::Extend),
            _ => Err(ArgvError::invalid(format!("unrecognized mode '{s}'"))),
        }
    }
}

impl FromStr for ErrorMode {
    type Err = ArgvError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(ErrorMode::Error),
            "silent" => Ok(ErrorMode::Silent),
            _ => Err(ArgvError::invalid(format!("unrecognized error mode '{s}'"))),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mode: Mode,
    pub error_mode: ErrorMode,
}

impl Config {
    pub fn new(mode: Mode, error_mode: ErrorMode) -> Self { Self { mode, error_mode } }

    pub fn from_json_str(src: &str) -> Result<Self, ArgvError> {
        crate::path_de::from_str_with_path(src)
    }

    /// Load a JSON config file, e.g. `{"mode": "strict", "error_mode": "silent"}`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_json_str(&src)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }
}
