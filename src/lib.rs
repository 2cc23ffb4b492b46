pub mod config;
pub mod logging;

pub use config::{Config, ConfigError, RcfileLocator};
