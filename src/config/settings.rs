use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use crate::format::DEFAULT_MAX_REPR_LEN;
use crate::util::paths::config_path;

/// Example configuration file contents (bundled with the binary)
pub const EXAMPLE_CONFIG: &str = include_str!("config.toml.example");

/// Errors raised while reading or writing a config file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("config already exists at {0}")]
    Exists(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Dump configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpConfig {
    /// Restrict dumps to frames from this package
    pub package_name: Option<String>,
    /// Append dumps to this file instead of a fresh temp file
    pub dump_path: Option<PathBuf>,
    /// Directory for temp dump files (system temp dir when unset)
    pub temp_dir: Option<PathBuf>,
    /// Dump on every warning-or-worse log event
    pub dump_locals: bool,
    /// 0 = warn, 1 = info, 2+ = debug
    pub verbosity: u8,
    /// Longest leaf text before it is replaced by a placeholder
    pub max_repr_len: usize,
    /// Scrub secrets out of leaf text
    pub redact: bool,
    /// Extra redaction patterns on top of the built-in ones
    pub redact_patterns: Vec<String>,
}

impl Default for DumpConfig {
    fn default() -> Self {
        Self {
            package_name: None,
            dump_path: None,
            temp_dir: None,
            dump_locals: false,
            verbosity: 0,
            max_repr_len: DEFAULT_MAX_REPR_LEN,
            redact: false,
            redact_patterns: Vec::new(),
        }
    }
}

/// TOML representation of the config file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub dump: Option<TomlDumpConfig>,
    pub logging: Option<TomlLoggingConfig>,
    pub redact: Option<TomlRedactConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlDumpConfig {
    pub package_name: Option<String>,
    pub path: Option<PathBuf>,
    pub temp_dir: Option<PathBuf>,
    pub dump_locals: Option<bool>,
    pub max_repr_len: Option<usize>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlLoggingConfig {
    pub verbosity: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlRedactConfig {
    pub enabled: Option<bool>,
    pub patterns: Option<Vec<String>>,
}

impl DumpConfig {
    /// Load the default config file, merging it over defaults.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// logged and ignored.
    pub fn load() -> Self {
        Self::try_load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring config file, using defaults");
            Self::default()
        })
    }

    /// Load the default config file; a missing file yields the defaults.
    pub fn try_load() -> Result<Self, ConfigError> {
        let config_file = config_path();
        if !config_file.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&config_file)
    }

    /// Load a specific config file, merging it over defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let toml_config: TomlConfig = toml::from_str(contents)?;
        let mut config = Self::default();
        config.merge(toml_config);
        Ok(config)
    }

    fn merge(&mut self, toml_config: TomlConfig) {
        if let Some(dump) = toml_config.dump {
            if let Some(package_name) = dump.package_name {
                self.package_name = Some(package_name);
            }
            if let Some(path) = dump.path {
                self.dump_path = Some(path);
            }
            if let Some(temp_dir) = dump.temp_dir {
                self.temp_dir = Some(temp_dir);
            }
            if let Some(dump_locals) = dump.dump_locals {
                self.dump_locals = dump_locals;
            }
            if let Some(max_repr_len) = dump.max_repr_len {
                self.max_repr_len = max_repr_len;
            }
        }

        if let Some(logging) = toml_config.logging {
            if let Some(verbosity) = logging.verbosity {
                self.verbosity = verbosity;
            }
        }

        if let Some(redact) = toml_config.redact {
            if let Some(enabled) = redact.enabled {
                self.redact = enabled;
            }
            if let Some(patterns) = redact.patterns {
                self.redact_patterns = patterns;
            }
        }
    }

    /// Write the bundled example config to `path`
    pub fn write_example(path: &Path, force: bool) -> Result<(), ConfigError> {
        if path.exists() && !force {
            return Err(ConfigError::Exists(path.to_path_buf()));
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, EXAMPLE_CONFIG)?;
        Ok(())
    }

    pub fn with_package_name(mut self, package_name: impl Into<String>) -> Self {
        self.package_name = Some(package_name.into());
        self
    }

    pub fn with_dump_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.dump_path = Some(path.into());
        self
    }

    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    pub fn with_dump_locals(mut self, dump_locals: bool) -> Self {
        self.dump_locals = dump_locals;
        self
    }

    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn with_redaction(mut self, patterns: Vec<String>) -> Self {
        self.redact = true;
        self.redact_patterns = patterns;
        self
    }

    pub fn log_level(&self) -> Level {
        match self.verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            _ => Level::DEBUG,
        }
    }

    /// `RUST_LOG` directives with the verbosity level as the floor
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::from_default_env().add_directive(self.log_level().into())
    }
}
