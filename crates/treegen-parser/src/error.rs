use crate::Rule;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Syntax error:\n{0}")]
    Syntax(#[from] Box<pest::error::Error<Rule>>),

    #[error("Failed to read {path}: {message}")]
    Io { path: String, message: String },

    #[error("Malformed source: {0}")]
    Structure(String),

    #[error("Duplicate class {0}")]
    DuplicateClass(String),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("Unknown class {0}")]
    UnknownClass(String),

    #[error("Class {class} has no method {method}")]
    UnknownMethod { class: String, method: String },

    #[error("Class {class} has no field {field}")]
    UnknownField { class: String, field: String },

    #[error("Field {field}: {message}")]
    BadGroupField { field: String, message: String },

    #[error("data[{col}] read from a row of {len} features")]
    ColumnOutOfRange { col: usize, len: usize },

    #[error("Call depth exceeded {0}")]
    CallDepthExceeded(usize),
}

pub type ParseResult<T> = Result<T, ParseError>;
pub type EvalResult<T> = Result<T, EvalError>;
