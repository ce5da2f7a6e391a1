//! # Error Handling Module
//!
//! ## Purpose
//! Centralized error handling for the corpus engine, providing structured error
//! types and conversion utilities for all components.
//!
//! ## Input/Output Specification
//! - **Input**: Error conditions from configuration, serialization, and the
//!   division forest builder
//! - **Output**: Structured error types with context
//! - **Error Categories**: Configuration, Text Processing, Classification, Serialization
//!
//! ## Design
//! The core computations are total over well-typed input: a malformed per-entry
//! lemma index is treated as "no match" during search and never surfaces here.
//! Errors are reserved for contract violations — a cyclic division forest, a
//! dangling parent reference, an invalid configuration value.

use thiserror::Error;

/// Result type used throughout the application
pub type Result<T> = std::result::Result<T, CorpusError>;

/// Error types for the corpus engine
#[derive(Debug, Error)]
pub enum CorpusError {
    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Validation errors
    #[error("Validation failed for field '{field}': {reason}")]
    ValidationFailed { field: String, reason: String },

    // Classification errors
    #[error("Division {division_id} appears more than once in the forest")]
    DuplicateDivision { division_id: u32 },

    #[error("Division {division_id} references unknown parent {parent_id}")]
    UnknownParent { division_id: u32, parent_id: u32 },

    #[error("Division forest contains a cycle through division {division_id}")]
    CyclicForest { division_id: u32 },

    // Text processing errors
    #[error("Tokenizer pattern failed to compile: {details}")]
    TokenizerPattern { details: String },

    /// Serialization/deserialization errors
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal system errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CorpusError {
    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            CorpusError::Config { .. } | CorpusError::ValidationFailed { .. } => "configuration",
            CorpusError::DuplicateDivision { .. }
            | CorpusError::UnknownParent { .. }
            | CorpusError::CyclicForest { .. } => "classification",
            CorpusError::TokenizerPattern { .. } => "text_processing",
            CorpusError::Serialization(_) => "serialization",
            CorpusError::Io(_) | CorpusError::Internal { .. } => "system",
        }
    }
}
