use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no section '{0}'")]
    NoSection(String),

    #[error("no option '{option}' in section '{section}'")]
    NoOption { section: String, option: String },

    #[error("bad value for '{section}.{option}': {reason}")]
    Conversion {
        section: String,
        option: String,
        reason: String,
    },

    #[error("not a boolean: '{0}'")]
    NotABoolean(String),

    #[error("'bar' accepts only a list, got {0}")]
    NotAList(String),

    #[error("members must be '+something' or '-something', or none of them: got '{0}'")]
    MixedPlusMinus(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("unknown value function '{0}'")]
    UnknownFunction(String),

    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl FetchError {
    /// Wrap a function-level failure with the option it occurred on.
    pub(crate) fn conversion(section: &str, option: &str, inner: FetchError) -> FetchError {
        FetchError::Conversion {
            section: section.to_string(),
            option: option.to_string(),
            reason: inner.to_string(),
        }
    }
}
