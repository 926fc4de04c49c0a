//! Configuration errors

use std::path::PathBuf;
use thiserror::Error;

/// Anything that can go wrong while loading, validating or writing configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file could not be read or written
    #[error("Config file {path}: {source}")]
    Io {
        /// The configuration file
        path: PathBuf,
        /// What the filesystem reported
        source: std::io::Error,
    },

    /// Merged layers could not be parsed into [`crate::Config`]
    #[error("Invalid configuration: {message}")]
    Parse {
        /// Parser diagnostic
        message: String,
    },

    /// A value is outside its accepted range
    #[error("Configuration validation failed: {message}")]
    Validation {
        /// Which value and why
        message: String,
    },

    /// The configuration could not be rendered
    #[error("Serialization error: {message}")]
    Serialization {
        /// Serializer diagnostic
        message: String,
    },
}

/// Result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

impl ConfigError {
    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }
}

impl From<config::ConfigError> for ConfigError {
    fn from(error: config::ConfigError) -> Self {
        Self::parse(error.to_string())
    }
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(error: serde_yaml::Error) -> Self {
        Self::Serialization {
            message: error.to_string(),
        }
    }
}

impl From<ConfigError> for feedrep_types::Error {
    fn from(error: ConfigError) -> Self {
        Self::config(error.to_string())
    }
}
