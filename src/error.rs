use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplitCfgError {
    #[error("Invalid configuration root {path}: {reason}")]
    InvalidRoot { path: PathBuf, reason: String },

    #[error("Failed to create configuration root {path}: {source}")]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid property key '{key}': {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Invalid value for property '{key}': {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Duplicate property '{key}' - already defined in category '{category}'")]
    DuplicateKey { key: String, category: String },

    #[error("Property not found: {key}")]
    KeyNotFound { key: String },

    #[error("Type mismatch for property '{key}': expected {expected}, got {actual}")]
    TypeMismatch {
        key: String,
        expected: String,
        actual: String,
    },

    #[error("Parse error in {path} at line {line}: {message}")]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, SplitCfgError>;
