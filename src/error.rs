use std::path::PathBuf;

use thiserror::Error;

/// Failures this crate can hit while servicing engine callbacks.
///
/// None of these ever propagate back to the engine: every listener callback
/// catches at its boundary and logs (see §7 of the error policy in DESIGN.md).
#[derive(Debug, Error)]
pub enum DebugError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("variable query failed: {0}")]
    Variables(String),
}

impl DebugError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Json {
            path: path.into(),
            source,
        }
    }
}
