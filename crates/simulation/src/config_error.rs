use std::path::PathBuf;

use thiserror::Error;

/// Error while loading a YAML file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("can't read file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("can't parse YAML from file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Reads and deserializes a YAML file.
pub fn read_yaml<T: serde::de::DeserializeOwned>(path: impl Into<PathBuf>) -> Result<T, ConfigError> {
    let path = path.into();
    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
        path: path.clone(),
        source,
    })?;
    serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse { path, source })
}
