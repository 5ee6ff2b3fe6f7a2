//! TOML configuration file for the console.
//!
//! ```toml
//! log_level = "info"
//!
//! [settings]
//! width = 120
//! queryprefix = true
//! showprefix = true
//! workdir = "queries"
//!
//! [namespaces]
//! ex = "http://example.org/"
//! ```
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::model::Namespace;
use crate::settings::{SettingValue, Settings, QUERY_PREFIX, SHOW_PREFIX, WIDTH, WORK_DIR};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV: &str = "RDFSH_CONFIG";

/// Loaded configuration; every section is optional.
#[derive(Debug, Default)]
pub struct ConsoleConfig {
    path: Option<PathBuf>,
    data: RawConfig,
}

impl ConsoleConfig {
    /// Loads `explicit`, or the default location when `None`.
    ///
    /// A file that does not exist yields the defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let data = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        Ok(Self { path, data })
    }

    /// Parses configuration text; relative paths resolve against `base`.
    pub fn from_toml(text: &str, base: &Path) -> Result<Self, ConfigError> {
        let data = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: base.to_path_buf(),
            source,
        })?;
        Ok(Self {
            path: Some(base.join("console.toml")),
            data,
        })
    }

    /// File the configuration was read from, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Settings from the `[settings]` section.
    ///
    /// A relative `workdir` is resolved against the configuration file's directory.
    pub fn settings(&self) -> Result<Settings, ConfigError> {
        let raw = &self.data.settings;
        let mut settings = Settings::new();
        let mut put = |name: &str, value: SettingValue| {
            settings
                .insert(name, value)
                .map_err(|err| ConfigError::InvalidSetting {
                    name: name.to_string(),
                    message: err.to_string(),
                })
        };
        if let Some(width) = raw.width {
            put(WIDTH, SettingValue::Int(width))?;
        }
        if let Some(flag) = raw.queryprefix {
            put(QUERY_PREFIX, SettingValue::Bool(flag))?;
        }
        if let Some(flag) = raw.showprefix {
            put(SHOW_PREFIX, SettingValue::Bool(flag))?;
        }
        if let Some(dir) = raw.workdir.as_ref() {
            let dir = match self.path.as_deref().and_then(Path::parent) {
                Some(base) if dir.is_relative() => base.join(dir),
                _ => dir.clone(),
            };
            put(WORK_DIR, SettingValue::Path(dir))?;
        }
        Ok(settings)
    }

    /// Namespaces from the `[namespaces]` section, ordered by prefix.
    pub fn namespaces(&self) -> Vec<Namespace> {
        self.data
            .namespaces
            .iter()
            .map(|(prefix, name)| Namespace::new(prefix.as_str(), name.as_str()))
            .collect()
    }

    /// Configured log filter.
    pub fn log_level(&self) -> Option<&str> {
        self.data.log_level.as_deref()
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    settings: SettingsSection,
    #[serde(default)]
    namespaces: BTreeMap<String, String>,
    #[serde(default)]
    log_level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct SettingsSection {
    width: Option<usize>,
    queryprefix: Option<bool>,
    showprefix: Option<bool>,
    workdir: Option<PathBuf>,
}

/// Failures loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// Configuration file.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// A setting has a value the console rejects.
    #[error("invalid setting '{name}': {message}")]
    InvalidSetting {
        /// Setting name.
        name: String,
        /// Validation message.
        message: String,
    },
}

/// `<config_dir>/rdfsh/console.toml`, when the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("rdfsh").join("console.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = ConsoleConfig::load(Some(dir.path().join("absent.toml"))).unwrap();
        assert!(config.namespaces().is_empty());
        assert_eq!(config.log_level(), None);
        assert_eq!(config.settings().unwrap().console_width(), 80);
    }

    #[test]
    fn reads_every_section() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("console.toml");
        fs::write(
            &path,
            "log_level = \"debug\"\n\n[settings]\nwidth = 100\nqueryprefix = false\nworkdir = \"q\"\n\n[namespaces]\nfoaf = \"http://xmlns.com/foaf/0.1/\"\nex = \"http://example.org/\"\n",
        )
        .unwrap();
        let config = ConsoleConfig::load(Some(path)).unwrap();
        let settings = config.settings().unwrap();
        assert_eq!(settings.console_width(), 100);
        assert!(!settings.query_prefix());
        assert!(settings.show_prefix());
        assert_eq!(settings.work_dir(), dir.path().join("q"));
        assert_eq!(config.log_level(), Some("debug"));
        let prefixes: Vec<_> = config.namespaces().into_iter().map(|ns| ns.prefix).collect();
        assert_eq!(prefixes, vec!["ex", "foaf"]);
    }

    #[test]
    fn parse_errors_name_the_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("console.toml");
        fs::write(&path, "[settings]\nwidth = \"wide\"\n").unwrap();
        let err = ConsoleConfig::load(Some(path.clone())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { path: ref p, .. } if *p == path));
    }

    #[test]
    fn zero_width_is_rejected() {
        let config = ConsoleConfig::from_toml("[settings]\nwidth = 0\n", Path::new("/etc")).unwrap();
        assert!(matches!(
            config.settings(),
            Err(ConfigError::InvalidSetting { ref name, .. }) if name == "width"
        ));
    }
}
