//! Configuration loader utilities

use crate::{Config, ConfigBuilder, ConfigError, ConfigResult};
use std::io;
use std::path::{Path, PathBuf};

/// Environment prefix for configuration overrides
pub const ENV_PREFIX: &str = "FEEDREP";

/// Extensions probed in each search location
const FILE_EXTENSIONS: &[&str] = &["yaml", "yml", "toml"];

/// On-disk configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// YAML, the default
    Yaml,
    /// TOML
    Toml,
    /// JSON
    Json,
}

impl ConfigFormat {
    /// Pick the format from a file extension, falling back to YAML
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::Toml,
            Some("json") => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Render a configuration in this format
    pub fn render(self, config: &Config) -> ConfigResult<String> {
        let rendered = match self {
            Self::Yaml => serde_yaml::to_string(config)?,
            Self::Toml => toml::to_string_pretty(config).map_err(|e| ConfigError::Serialization {
                message: format!("TOML: {}", e),
            })?,
            Self::Json => {
                serde_json::to_string_pretty(config).map_err(|e| ConfigError::Serialization {
                    message: format!("JSON: {}", e),
                })?
            }
        };
        Ok(rendered)
    }
}

/// Loads, locates and writes feedrep configuration files
pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, then the first file found in the search locations, then the environment
    pub fn load_default() -> ConfigResult<Config> {
        let builder = ConfigBuilder::new().add_defaults();
        let builder = match Self::config_exists() {
            Some(path) => builder.add_source_file(path),
            None => builder,
        };
        builder.add_env_prefix(ENV_PREFIX).build()
    }

    /// Defaults, then `path`, then the environment; `path` must exist
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: io::Error::new(io::ErrorKind::NotFound, "no such configuration file"),
            });
        }

        ConfigBuilder::new()
            .add_defaults()
            .add_source_file(path)
            .add_env_prefix(ENV_PREFIX)
            .build()
    }

    /// Write `config` in the format matching the file extension
    pub fn save_to_file<P: AsRef<Path>>(config: &Config, path: P) -> ConfigResult<()> {
        let path = path.as_ref();
        let content = ConfigFormat::from_path(path).render(config)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Write the built-in defaults to `path`
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> ConfigResult<()> {
        Self::save_to_file(&Config::default(), path)
    }

    /// Render a configuration as YAML
    pub fn to_yaml(config: &Config) -> ConfigResult<String> {
        ConfigFormat::Yaml.render(config)
    }

    /// First configuration file present in the search locations
    pub fn config_exists() -> Option<PathBuf> {
        Self::search_paths().into_iter().find(|path| path.is_file())
    }

    /// Candidate files, most specific first
    pub fn search_paths() -> Vec<PathBuf> {
        let mut locations = vec![(PathBuf::new(), "feedrep")];
        if let Some(dir) = user_config_dir() {
            locations.push((dir.join("feedrep"), "config"));
        }
        #[cfg(unix)]
        locations.push((PathBuf::from("/etc/feedrep"), "config"));

        locations
            .into_iter()
            .flat_map(|(dir, stem)| {
                FILE_EXTENSIONS
                    .iter()
                    .map(move |ext| dir.join(format!("{}.{}", stem, ext)))
            })
            .collect()
    }
}

fn user_config_dir() -> Option<PathBuf> {
    let var = |name: &str| {
        std::env::var_os(name)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    };

    if cfg!(windows) {
        var("APPDATA")
    } else {
        var("XDG_CONFIG_HOME").or_else(|| var("HOME").map(|home| home.join(".config")))
    }
}
