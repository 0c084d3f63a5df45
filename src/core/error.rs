//! Error types for the fallible edges of the engine.
//!
//! Only loading and saving can fail. Dispatch, condition evaluation and
//! effect execution recover locally and never produce an `EngineError`:
//! malformed arguments fall back to defaults, unknown names are ignored.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot encoding error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("invalid ability '{ability}': {reason}")]
    InvalidCatalogue { ability: String, reason: String },
}

impl EngineError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(ability: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCatalogue {
            ability: ability.into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_catalogue_message() {
        let err = EngineError::invalid("Speed", "level 2 missing");
        assert_eq!(err.to_string(), "invalid ability 'Speed': level 2 missing");
    }

    #[test]
    fn test_io_message_names_path() {
        let err = EngineError::io(
            "/tmp/enchants.json",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.to_string().contains("/tmp/enchants.json"));
    }
}
