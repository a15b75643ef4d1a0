use std::path::PathBuf;
use thiserror::Error;

use super::section::SectionName;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("field '{field}' already registered in section {section}")]
    DuplicateField { section: SectionName, field: String },

    #[error("failed to open config file '{path}': {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("malformed line {line}: {text:?}")]
    MalformedLine { line: usize, text: String },

    #[error("line {line}: field '{field}' in section {section}: {source}")]
    TypeConversion {
        section: SectionName,
        field: String,
        line: usize,
        #[source]
        source: ValueError,
    },

    #[error("failed to deserialize config: {0}")]
    Deserialize(#[from] toml::de::Error),
}

/// A text token that could not be converted into a value's native type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} value {token:?}: {reason}")]
pub struct ValueError {
    pub token: String,
    pub kind: &'static str,
    pub reason: String,
}

impl ValueError {
    pub fn new(token: &str, kind: &'static str, reason: impl ToString) -> Self {
        Self {
            token: token.to_string(),
            kind,
            reason: reason.to_string(),
        }
    }
}
