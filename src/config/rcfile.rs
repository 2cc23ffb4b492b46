//! Locating the user's config file
//!
//! Follows the XDG base-directory layout, then falls back to the legacy
//! dotted directory in the user's home:
//!
//! 1. `$XDG_CONFIG_HOME/peco/config.json`, or `~/.config/peco/config.json`
//!    when `XDG_CONFIG_HOME` is unset or empty
//! 2. `<dir>/peco/config.json` for each `<dir>` in `$XDG_CONFIG_DIRS`
//! 3. `~/.peco/config.json`

use std::collections::HashMap;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::error::ConfigError;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const APP_DIR_NAME: &str = "peco";
pub const LEGACY_DIR_NAME: &str = ".peco";

pub const XDG_CONFIG_HOME: &str = "XDG_CONFIG_HOME";
pub const XDG_CONFIG_DIRS: &str = "XDG_CONFIG_DIRS";

/// Where the locator reads environment variables and the home directory from
pub trait Environment {
    fn var(&self, key: &str) -> Option<OsString>;
    fn home_dir(&self) -> Option<PathBuf>;
}

/// The real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, key: &str) -> Option<OsString> {
        env::var_os(key)
    }

    fn home_dir(&self) -> Option<PathBuf> {
        dirs::home_dir()
    }
}

/// A fixed environment, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    vars: HashMap<String, OsString>,
    home: Option<PathBuf>,
}

impl StaticEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, key: &str, value: impl Into<OsString>) -> Self {
        self.vars.insert(key.to_string(), value.into());
        self
    }

    pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.home = Some(home.into());
        self
    }
}

impl Environment for StaticEnv {
    fn var(&self, key: &str) -> Option<OsString> {
        self.vars.get(key).cloned()
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }
}

pub struct RcfileLocator<E = ProcessEnv> {
    env: E,
}

impl RcfileLocator<ProcessEnv> {
    pub fn new() -> Self {
        Self { env: ProcessEnv }
    }
}

impl Default for RcfileLocator<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Environment> RcfileLocator<E> {
    pub fn with_env(env: E) -> Self {
        Self { env }
    }

    fn non_empty_var(&self, key: &str) -> Option<OsString> {
        self.env.var(key).filter(|value| !value.is_empty())
    }

    /// Candidate paths in search order. Nothing is checked on disk here.
    pub fn candidates(&self) -> Vec<PathBuf> {
        // A missing home directory only removes the home-based candidates
        let home = self.env.home_dir();
        let mut candidates = Vec::new();

        if let Some(dir) = self.non_empty_var(XDG_CONFIG_HOME) {
            candidates.push(PathBuf::from(dir).join(APP_DIR_NAME));
        } else if let Some(home) = &home {
            candidates.push(home.join(".config").join(APP_DIR_NAME));
        }

        if let Some(dirs) = self.non_empty_var(XDG_CONFIG_DIRS) {
            candidates.extend(
                env::split_paths(&dirs)
                    .filter(|dir| !dir.as_os_str().is_empty())
                    .map(|dir| dir.join(APP_DIR_NAME)),
            );
        }

        if let Some(home) = &home {
            candidates.push(home.join(LEGACY_DIR_NAME));
        }

        candidates
            .into_iter()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .collect()
    }

    /// Path of the first candidate that exists as a regular file
    pub fn locate(&self) -> Result<PathBuf, ConfigError> {
        let searched = self.candidates();

        for candidate in &searched {
            debug!(target: "config", "Probing {}", candidate.display());
            if is_regular_file(candidate) {
                info!(target: "config", "Found config file at {}", candidate.display());
                return Ok(candidate.clone());
            }
        }

        debug!(target: "config", "No config file in {} locations", searched.len());
        Err(ConfigError::NotFound { searched })
    }
}

fn is_regular_file(path: &Path) -> bool {
    path.metadata().map(|m| m.is_file()).unwrap_or(false)
}
