//! Minimal CLI: check JSON argument lists against a signature, or describe them.
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use rayon::prelude::*;
use serde::Deserialize;

use crate::argv::{Arguments, Validator};
use crate::config::{Config, ErrorMode, Mode};
use crate::error::ArgvError;
use crate::predicates::detail_type_of;
use crate::report::Diagnostic;
use crate::signature::{Declaration, Signature};
use crate::stack::{FixedTrace, Frame};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// check JSON argument lists against a declared signature
#[derive(Parser, Debug)]
#[command(name = "argv-sig", version)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// validate every input document (a JSON array of arguments) against a signature
    Check(CheckOut),
    /// print the detailed runtime type of every argument
    Describe(DescribeOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// treat input as newline-delimited JSON (NDJSON), one argument list per line
    #[arg(long, default_value_t = false)]
    ndjson: bool,

    /// JSON Pointer to select the argument list in each document (e.g. /call/args)
    #[arg(long)]
    json_pointer: Option<String>,

    /// JQ pre-process filter; each output is checked as its own argument list
    #[arg(long)]
    jq_expr: Option<String>,

    /// One or more inputs. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct CheckOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// signature entries in declaration order, e.g. `--sig number --sig '[string]'`
    #[arg(long = "sig", num_args = 1.., required_unless_present = "signature_file")]
    sig: Vec<String>,

    /// JSON file: {"name": "...", "signature": [...], "config": {...}}
    #[arg(long, conflicts_with = "sig")]
    signature_file: Option<PathBuf>,

    /// JSON config file: {"mode": "strict|extend", "error_mode": "error|silent"}
    #[arg(long)]
    config: Option<PathBuf>,

    /// overrides the config file
    #[arg(long)]
    mode: Option<Mode>,

    /// overrides the config file
    #[arg(long)]
    error_mode: Option<ErrorMode>,

    /// name reported for the checked function
    #[arg(long)]
    name: Option<String>,

    /// print failure diagnostics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(clap::Parser, Debug)]
struct DescribeOut {
    #[command(flatten)]
    input_settings: InputSettings,
}

/// Signature declared in a file rather than on the command line.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SignatureFile {
    #[serde(default)]
    name: Option<String>,
    signature: serde_json::Value,
    #[serde(default)]
    config: Option<Config>,
}

/// One argument list pulled from the inputs.
#[derive(Debug, Clone)]
struct Document {
    source: String,
    line: Option<u32>,
    value: serde_json::Value,
}

impl Document {
    fn label(&self) -> String {
        match self.line {
            Some(line) => format!("{}:{line}", self.source),
            None => self.source.clone(),
        }
    }
}

enum Outcome {
    Pass,
    Fail { message: Option<String>, diagnostic: Option<Diagnostic> },
    Invalid(String),
}

const DEFAULT_CALLER: &str = "args";

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn load_documents(&self) -> Result<Vec<Document>> {
        let mut docs = Vec::new();
        for source_path in resolve_file_path_patterns(&self.input)? {
            let source = source_path.to_string_lossy().to_string();
            let text = std::fs::read_to_string(&source_path)
                .with_context(|| format!("failed to read source file {source}"))?;
            if self.ndjson {
                for (i, raw) in text.lines().enumerate() {
                    if raw.trim().is_empty() {
                        continue;
                    }
                    let line = u32::try_from(i + 1).unwrap_or(u32::MAX);
                    let value = serde_json::from_str(raw)
                        .with_context(|| format!("failed to parse JSON ({source}:{line})"))?;
                    self.select(&source, Some(line), value, &mut docs)?;
                }
            } else {
                let value = serde_json::from_str(&text)
                    .with_context(|| format!("failed to parse JSON source file ({source})"))?;
                self.select(&source, None, value, &mut docs)?;
            }
        }
        tracing::debug!(documents = docs.len(), "loaded inputs");
        Ok(docs)
    }

    /// Apply the JSON pointer, then the jq filter.
    fn select(
        &self,
        source: &str,
        line: Option<u32>,
        value: serde_json::Value,
        out: &mut Vec<Document>,
    ) -> Result<()> {
        let value = match self.json_pointer.as_deref() {
            None => value,
            Some(ptr) => value
                .pointer(ptr)
                .cloned()
                .ok_or_else(|| anyhow!("JSON pointer {ptr} matched nothing in {source}"))?,
        };
        let values = match self.jq_expr.as_deref() {
            None => vec![value],
            Some(expr) => crate::jq_exec::filter_documents(expr, &value)
                .with_context(|| format!("failed to apply jq expression to {source}"))?,
        };
        out.extend(values.into_iter().map(|value| Document { source: source.to_string(), line, value }));
        Ok(())
    }
}

impl CheckOut {
    fn resolve(&self) -> Result<(Config, Signature, String)> {
        let file = self
            .signature_file
            .as_deref()
            .map(load_signature_file)
            .transpose()?;

        let mut config = match (&self.config, file.as_ref().and_then(|f| f.config)) {
            (Some(path), _) => Config::load(path)?,
            (None, Some(config)) => config,
            (None, None) => Config::default(),
        };
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(error_mode) = self.error_mode {
            config.error_mode = error_mode;
        }

        let signature = match &file {
            Some(f) => Signature::parse_json(&f.signature)?,
            None => Signature::new(self.sig.iter().map(String::as_str)),
        };
        // fail on a bad declaration before touching any input
        Declaration::parse(&signature, config.mode)?;

        let name = self
            .name
            .clone()
            .or_else(|| file.and_then(|f| f.name))
            .unwrap_or_else(|| DEFAULT_CALLER.to_string());
        Ok((config, signature, name))
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<ExitCode> {
        match &self.cmd {
            Command::Check(target) => {
                let (config, signature, name) = target.resolve()?;
                let docs = target.input_settings.load_documents()?;

                let outcomes: Vec<Outcome> = docs
                    .par_iter()
                    .map(|doc| check_document(doc, config, &signature, &name))
                    .collect();

                let mut failed = 0usize;
                for (doc, outcome) in docs.iter().zip(&outcomes) {
                    match outcome {
                        Outcome::Pass => println!("{} {}", "PASS".green().bold(), doc.label()),
                        Outcome::Fail { message, diagnostic } => {
                            failed += 1;
                            println!("{} {}", "FAIL".red().bold(), doc.label());
                            if let Some(message) = message {
                                println!("    {message}");
                            }
                            if let (true, Some(diagnostic)) = (target.json, diagnostic) {
                                println!("{}", serde_json::to_string_pretty(diagnostic)?);
                            }
                        }
                        Outcome::Invalid(reason) => {
                            failed += 1;
                            println!("{} {}: {reason}", "INVALID".yellow().bold(), doc.label());
                        }
                    }
                }
                eprintln!("{} checked, {} failed", docs.len(), failed);
                Ok(if failed == 0 { ExitCode::SUCCESS } else { ExitCode::FAILURE })
            }
            Command::Describe(target) => {
                for doc in target.input_settings.load_documents()? {
                    match Arguments::try_from(&doc.value) {
                        Ok(args) => {
                            let kinds: Vec<String> = args.as_slice().iter().map(detail_type_of).collect();
                            println!("{}: ({})", doc.label(), kinds.join(", "));
                        }
                        Err(error) => println!("{} {}: {error}", "INVALID".yellow().bold(), doc.label()),
                    }
                }
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn check_document(doc: &Document, config: Config, signature: &Signature, name: &str) -> Outcome {
    let args = match Arguments::try_from(&doc.value) {
        Ok(args) => args,
        Err(error) => return Outcome::Invalid(error.to_string()),
    };
    // the input position stands in for the call site
    let origin = Frame {
        invoked_by: "<input>".to_string(),
        file: Some(doc.source.clone()),
        line: doc.line,
        column: None,
    };
    let validator = Validator::new(config).with_stack(FixedTrace(vec![
        Frame::named(Validator::ENTRY_POINTS[0]),
        Frame::named(name),
        origin,
    ]));

    let mut seen = None;
    let result = validator.validate_with(args.as_slice(), signature, |d| seen = Some(d.clone()));
    match result {
        Ok(true) => Outcome::Pass,
        Ok(false) => Outcome::Fail { message: None, diagnostic: seen },
        Err(ArgvError::Rejected(rejection)) => Outcome::Fail {
            message: Some(rejection.message),
            diagnostic: Some(rejection.diagnostic),
        },
        Err(error @ ArgvError::InvalidArgument(_)) => Outcome::Invalid(error.to_string()),
    }
}

fn load_signature_file(path: &Path) -> Result<SignatureFile> {
    let src = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read signature file {}", path.display()))?;
    crate::path_de::from_str_with_path(&src)
        .with_context(|| format!("failed to parse signature file {}", path.display()))
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    let mut out = Vec::<PathBuf>::new();
    for raw in patterns {
        let pattern = raw.as_ref();
        if !has_glob_chars(pattern) {
            out.push(PathBuf::from(pattern));
            continue;
        }
        let before = out.len();
        for entry in glob::glob(pattern).with_context(|| format!("bad glob pattern {pattern}"))? {
            out.push(entry?);
        }
        if out.len() == before {
            bail!("glob pattern matched no files: {pattern}");
        }
    }
    Ok(out)
}
