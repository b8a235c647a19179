//! Lowering and Go code generation for the Nitro compiler.
//!
//! This crate turns a parsed Nitro file into the source of a Go web
//! server built on echo and `lib/pq`.
//!
//! ## Architecture
//!
//! - [`ir`]: the definition/expression IR and its construction from the CST
//! - [`lower`]: SQL extraction, component classification and loop
//!   decomposition
//! - [`go`]: Go source rendering
//!
//! ## Pipeline
//!
//! ```text
//! source -> CST -> IR -> SQL lowering -> classification -> Go source
//! ```
//!
//! Every stage stops at the first problem; nothing is written for a
//! program that fails to compile.

pub mod go;
pub mod ir;
pub mod lower;

use std::fmt;

use nitro_common::span::Span;
use nitro_parser::ParseError;
use tracing::debug;

pub use go::{generate, GoOptions, GO_MOD};
pub use ir::build::parse_module;
pub use lower::{lower, LowerError, Lowered, Pass};

/// Why a Nitro program failed to compile.
#[derive(Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The source does not parse.
    Syntax(ParseError),
    /// The program parses but cannot be lowered to Go.
    Lower(LowerError),
}

impl CompileError {
    /// Source location, for syntax errors.
    pub fn span(&self) -> Option<Span> {
        match self {
            CompileError::Syntax(err) => Some(err.span),
            CompileError::Lower(_) => None,
        }
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompileError::Syntax(err) => err.fmt(f),
            CompileError::Lower(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for CompileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompileError::Syntax(err) => Some(err),
            CompileError::Lower(err) => Some(err),
        }
    }
}

impl From<ParseError> for CompileError {
    fn from(err: ParseError) -> Self {
        CompileError::Syntax(err)
    }
}

impl From<LowerError> for CompileError {
    fn from(err: LowerError) -> Self {
        CompileError::Lower(err)
    }
}

/// Compile Nitro source text to a Go `main` package.
///
/// # Errors
///
/// Returns the first syntax error, or the first lowering failure.
pub fn compile(source: &str, options: &GoOptions) -> Result<String, CompileError> {
    let module = parse_module(source)?;
    debug!(definitions = module.definitions.len(), "built IR");
    let lowered = lower(&module)?;
    Ok(generate(&lowered, options)?)
}
