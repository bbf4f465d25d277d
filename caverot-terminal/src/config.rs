//! Viewer preferences, read from `caverot.json`.

use std::fs;
use std::path::{Path, PathBuf};

use caverot_core::{Angles, EngineConfig, Units};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Name looked up in the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "caverot.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub units: Units,
    pub angles: Angles,
    /// Swap the direction of keyboard pans and mouse drags.
    pub reverse_controls: bool,
    pub engine: EngineConfig,
}

impl Preferences {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// An explicit path must load; the default file is optional.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.exists() {
                    Self::load(path)
                } else {
                    debug!("no {DEFAULT_CONFIG_FILE}, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_preferences() {
        let prefs: Preferences = serde_json::from_str(
            r#"{ "units": "imperial", "angles": "grads", "engine": { "zoom_factor": 1.5 } }"#,
        )
        .unwrap();
        assert_eq!(prefs.units, Units::Imperial);
        assert_eq!(prefs.angles, Angles::Grads);
        assert!(!prefs.reverse_controls);
        assert_eq!(prefs.engine.zoom_factor, 1.5);
        assert_eq!(prefs.engine.band_capacity, 40_000);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let err = Preferences::resolve(Some(Path::new("/no/such/caverot.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
