use std::io;
use std::path::PathBuf;

/// Errors raised while locating or reading the config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No candidate location held a config file
    #[error("config file not found (searched {} locations)", .searched.len())]
    NotFound { searched: Vec<PathBuf> },

    #[error("cannot open config file {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot decode config file {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }

    /// The file exists but could not be turned into a configuration
    pub fn is_decode(&self) -> bool {
        matches!(self, ConfigError::Open { .. } | ConfigError::Decode { .. })
    }
}
