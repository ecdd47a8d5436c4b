//! Error types for template compilation and rendering.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from compiling, loading or rendering a template.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("template '{template}': parse error at offset {offset}: {message}")]
    Parse {
        template: String,
        offset: usize,
        message: String,
    },

    #[error("template '{template}': unknown function '{function}'")]
    UnknownFunction { template: String, function: String },

    #[error("template '{template}': function '{function}' expects {expected} argument(s), got {got}")]
    Arity {
        template: String,
        function: String,
        expected: String,
        got: usize,
    },

    #[error("template '{template}': {function}: {source}")]
    Function {
        template: String,
        function: String,
        #[source]
        source: FunctionError,
    },

    #[error("template '{name}' not found (searched {searched:?})")]
    NotFound { name: String, searched: Vec<PathBuf> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by a generator function at render time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FunctionError {
    #[error("argument {index} must be {expected}, got '{got}'")]
    ArgType {
        index: usize,
        expected: &'static str,
        got: String,
    },

    #[error("{0}")]
    Invalid(String),
}
