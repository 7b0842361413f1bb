//! Core error types for diagram processing
//!
//! This module defines common error types used throughout the diagram processing pipeline.

use thiserror::Error;

/// Core error types for diagram processing
#[derive(Error, Debug)]
pub enum DiagramError {
    #[error("Parse error: {message} at line {line}, column {column}")]
    ParseError {
        message: String,
        line: usize,
        column: usize,
    },

    #[error("{value} is not a valid direction")]
    InvalidDirection { value: String },

    #[error("{value} is not a valid curve style")]
    InvalidCurveStyle { value: String },

    #[error("{value} is not a valid output format")]
    InvalidOutputFormat { value: String },

    #[error("Unknown node kind: {kind}")]
    UnknownNodeKind { kind: String },

    #[error("Duplicate node id: {id}")]
    DuplicateNode { id: String },

    #[error("Unknown node: {id}")]
    UnknownNode { id: String },

    #[error("Unknown cluster: {index}")]
    UnknownCluster { index: usize },

    #[error("Invalid chain: {message}")]
    InvalidChain { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Render error: {message}")]
    RenderError { message: String },

    #[error("Backend error: {message}")]
    BackendError { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Unknown input format")]
    UnknownInputFormat,
}

impl DiagramError {
    /// Create a new parse error
    pub fn parse_error(message: impl Into<String>, line: usize, column: usize) -> Self {
        Self::ParseError {
            message: message.into(),
            line,
            column,
        }
    }

    /// Create a new chain error
    pub fn invalid_chain(message: impl Into<String>) -> Self {
        Self::InvalidChain {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::ValidationError {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render_error(message: impl Into<String>) -> Self {
        Self::RenderError {
            message: message.into(),
        }
    }

    /// Create a new backend error
    pub fn backend_error(message: impl Into<String>) -> Self {
        Self::BackendError {
            message: message.into(),
        }
    }
}
