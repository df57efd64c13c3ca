use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::settings::ConfigError;
use crate::llm::client::LLMError;
use crate::security::validator::ValidationError;

/// Errors that can occur during git operations.
///
/// A closed set of tagged variants. The boundary layer maps each kind to
/// whatever transport code it needs; the core knows nothing about HTTP.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("invalid repository path: {0}")]
    InvalidPath(String),

    #[error("not a git repository")]
    RepoNotFound,

    #[error("git executable not found. Is git installed?")]
    CommandUnavailable,

    #[error("git command timed out")]
    CommandTimeout,

    /// Non-zero exit. `summary` holds at most the first two operation
    /// arguments so logs never echo full commit-message bodies.
    #[error("git command failed: {summary}: {stderr}")]
    CommandFailed { summary: String, stderr: String },

    /// Raised before any process is spawned; never wraps a process error.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Top-level application error that wraps all module-specific errors
///
/// This provides a unified error type for application-level code while
/// preserving the specific error context from each module. All module errors
/// automatically convert to AppError via the `From` trait.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LLMError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for git operations
pub type GitResult<T> = std::result::Result<T, GitError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
