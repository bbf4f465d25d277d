//! Error types for loading surveys and mutating the view.

use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

/// Failure to turn a survey file into a [`Survey`](crate::Survey).
///
/// Every variant names the offending file so a host can report it verbatim.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}:{line}: {message}", path.display())]
    Parse {
        path: PathBuf,
        line: usize,
        message: String,
    },

    #[error("{}:{line}: invalid path: {message}", path.display())]
    InvalidPath {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::Io { path, .. }
            | LoadError::Parse { path, .. }
            | LoadError::InvalidPath { path, .. } => path,
        }
    }
}

/// A view mutation was rejected before it could reach the projection.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ViewError {
    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("scale must be positive, got {0}")]
    NonPositiveScale(f64),
}

/// Log a rejected view change. Rejected input leaves the view as it was, so
/// callers only learn whether it took.
pub(crate) fn accepted(result: Result<(), ViewError>, change: &'static str) -> bool {
    match result {
        Ok(()) => true,
        Err(err) => {
            debug!(%err, change, "view change rejected");
            false
        }
    }
}

pub type Result<T, E = LoadError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepted() {
        assert!(accepted(Ok(()), "scale"));
        assert!(!accepted(Err(ViewError::NonPositiveScale(0.0)), "scale"));
    }
}
