use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContribError>;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("Malformed git log line ({reason}): {line}")]
    Grammar { line: String, reason: String },
    #[error("Error reading git log output: {0}")]
    SourceIo(#[from] std::io::Error),
    #[error("Git command failed: {0}")]
    GitCommand(String),
    #[error("Configuration error: {0}")]
    Configuration(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("{} is not a git directory", .0.display())]
    NotARepository(PathBuf),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl ContribError {
    pub(crate) fn grammar(line: &str, reason: impl Into<String>) -> Self {
        ContribError::Grammar {
            line: line.to_string(),
            reason: reason.into(),
        }
    }
}
