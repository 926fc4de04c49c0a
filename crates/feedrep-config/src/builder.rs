//! Layered configuration loading

use crate::{Config, ConfigError, ConfigFormat, ConfigResult};
use config::builder::DefaultState;
use config::{Environment, File, FileFormat};
use feedrep_types::{BandwidthKb, WorkerCount};
use std::path::{Path, PathBuf};

/// Log levels accepted in `logging.level`
const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Stacks configuration layers; later layers override earlier ones
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    layers: Vec<Layer>,
    env_separator: String,
}

#[derive(Debug, Clone)]
enum Layer {
    Defaults,
    File(PathBuf),
    Environment(String),
}

impl ConfigBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self {
            layers: Vec::new(),
            env_separator: "__".to_string(),
        }
    }

    /// Start from the built-in defaults
    ///
    /// Defaults are always the bottom layer, so this only documents intent.
    pub fn add_defaults(mut self) -> Self {
        self.layers.push(Layer::Defaults);
        self
    }

    /// Layer a YAML, TOML or JSON file; a missing file is skipped
    pub fn add_source_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.layers.push(Layer::File(path.as_ref().to_path_buf()));
        self
    }

    /// Layer environment variables starting with `prefix`
    pub fn add_env_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.layers.push(Layer::Environment(prefix.into()));
        self
    }

    /// Separator between nested keys in environment variable names
    pub fn env_separator<S: Into<String>>(mut self, separator: S) -> Self {
        self.env_separator = separator.into();
        self
    }

    /// Merge every layer, deserialize and validate
    pub fn build(self) -> ConfigResult<Config> {
        let defaults = serde_yaml::to_value(Config::default())?;
        let base = config::Config::builder().add_source(config::Config::try_from(&defaults)?);

        let merged = self
            .layers
            .iter()
            .fold(base, |builder, layer| self.apply(builder, layer))
            .build()?;

        let config: Config = merged.try_deserialize()?;
        Self::validate(&config)?;
        Ok(config)
    }

    fn apply(
        &self,
        builder: config::ConfigBuilder<DefaultState>,
        layer: &Layer,
    ) -> config::ConfigBuilder<DefaultState> {
        match layer {
            Layer::Defaults => builder,
            Layer::File(path) if path.is_file() => {
                builder.add_source(File::from(path.as_path()).format(file_format(path)))
            }
            Layer::File(_) => builder,
            Layer::Environment(prefix) => builder.add_source(
                Environment::with_prefix(prefix).separator(&self.env_separator),
            ),
        }
    }

    /// Validate the configuration
    pub fn validate(config: &Config) -> ConfigResult<()> {
        WorkerCount::new(config.replication.max_maps.get()).map_err(ConfigError::validation)?;
        BandwidthKb::new(config.replication.map_bandwidth_kb.get())
            .map_err(ConfigError::validation)?;

        if let Some(include_path) = &config.replication.include_path {
            if !include_path.starts_with('/') {
                return Err(ConfigError::validation(format!(
                    "Include path '{}' must be absolute",
                    include_path
                )));
            }
        }

        let file_name = config.marker.file_name.as_str();
        if file_name.is_empty() || file_name == "." || file_name == ".." || file_name.contains('/')
        {
            return Err(ConfigError::validation(format!(
                "Marker file name '{}' must be a plain file name",
                file_name
            )));
        }

        if !LOG_LEVELS.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::validation(format!(
                "Log level '{}' is not one of {}",
                config.logging.level,
                LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }
}

fn file_format(path: &Path) -> FileFormat {
    match ConfigFormat::from_path(path) {
        ConfigFormat::Yaml => FileFormat::Yaml,
        ConfigFormat::Toml => FileFormat::Toml,
        ConfigFormat::Json => FileFormat::Json,
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
