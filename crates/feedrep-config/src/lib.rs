//! Configuration management for feedrep
//!
//! Configuration is layered: built-in defaults, then an optional file (YAML,
//! TOML or JSON), then environment variables prefixed with `FEEDREP`, using
//! `__` between the prefix and each nested key:
//!
//! ```text
//! FEEDREP__REPLICATION__INCLUDE_PATH=/data/in/clicks/2024/*
//! FEEDREP__MARKER__FILE_NAME=_READY
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use feedrep_config::ConfigBuilder;
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_source_file("feedrep.yaml")
//!     .add_env_prefix("FEEDREP")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Max workers: {}", config.replication.max_maps.get());
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use feedrep_types::{BandwidthKb, WorkerCount, DEFAULT_MARKER_FILE_NAME};
use serde::{Deserialize, Serialize};

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigFormat, ConfigLoader};

/// Main configuration structure for feedrep
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Replication tuning and the include path
    pub replication: ReplicationConfig,
    /// Completion marker settings
    pub marker: MarkerConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Replication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Maximum number of parallel copy workers
    pub max_maps: WorkerCount,
    /// Bandwidth cap per worker in KiB/s
    pub map_bandwidth_kb: BandwidthKb,
    /// Copy source contents into the target and skip files already in sync
    pub sync_folder: bool,
    /// Wait for the copy to finish before returning
    pub blocking: bool,
    /// Logical, possibly pattern-bearing location whose readiness is signalled
    #[serde(default)]
    pub include_path: Option<String>,
}

impl Default for ReplicationConfig {
    fn default() -> Self {
        Self {
            max_maps: WorkerCount::default(),
            map_bandwidth_kb: BandwidthKb::default(),
            sync_folder: true,
            blocking: true,
            include_path: None,
        }
    }
}

/// Completion marker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    /// Name of the empty file written into each ready directory
    #[serde(default = "default_marker_file_name")]
    pub file_name: String,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            file_name: default_marker_file_name(),
        }
    }
}

fn default_marker_file_name() -> String {
    DEFAULT_MARKER_FILE_NAME.to_string()
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable JSON formatting
    pub json_format: bool,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            colored_output: true,
        }
    }
}
