//! Configuration module
//!
//! Locates the user's config file, decodes it on top of the built-in
//! defaults, and resolves style tokens into display attributes.

pub mod config;
pub mod error;
pub mod rcfile;
pub mod style;

pub use config::{Config, ConfigPatch};
pub use error::ConfigError;
pub use rcfile::{Environment, ProcessEnv, RcfileLocator, StaticEnv};
pub use style::{Attribute, Style, StyleSet};
