//! Console settings with per-key fallbacks.
//!
//! Settings are stored by name and resolved when a component needs them, so
//! a key that was never configured still yields a usable value.
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{ConsoleError, Result};

/// Console width used by the console writers.
pub const WIDTH: &str = "width";
/// Toggles namespace prefix injection into queries.
pub const QUERY_PREFIX: &str = "queryprefix";
/// Toggles IRI abbreviation in console output.
pub const SHOW_PREFIX: &str = "showprefix";
/// Directory relative input and output files resolve against.
pub const WORK_DIR: &str = "workdir";

/// Fallback console width.
pub const DEFAULT_WIDTH: usize = 80;

const KNOWN: [&str; 4] = [WIDTH, QUERY_PREFIX, SHOW_PREFIX, WORK_DIR];

/// Typed setting value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SettingValue {
    /// Positive integer.
    Int(usize),
    /// Toggle.
    Bool(bool),
    /// Absolute filesystem path.
    Path(PathBuf),
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingValue::Int(v) => write!(f, "{v}"),
            SettingValue::Bool(v) => write!(f, "{v}"),
            SettingValue::Path(p) => write!(f, "{}", p.display()),
        }
    }
}

/// Settings keyed by name.
#[derive(Clone, Debug, Default)]
pub struct Settings {
    values: BTreeMap<String, SettingValue>,
}

impl Settings {
    /// Empty settings; every lookup falls back to its default.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value after validating it against its key.
    pub fn insert(&mut self, name: &str, value: SettingValue) -> Result<()> {
        let name = name.to_ascii_lowercase();
        let valid = match (name.as_str(), &value) {
            (WIDTH, SettingValue::Int(w)) => *w > 0,
            (QUERY_PREFIX | SHOW_PREFIX, SettingValue::Bool(_)) => true,
            (WORK_DIR, SettingValue::Path(p)) => p.is_absolute(),
            _ => false,
        };
        if !valid {
            return Err(ConsoleError::InvalidArgument(format!(
                "invalid value '{value}' for setting '{name}'"
            )));
        }
        self.values.insert(name, value);
        Ok(())
    }

    /// Builder-style [`Settings::insert`].
    pub fn with(mut self, name: &str, value: SettingValue) -> Result<Self> {
        self.insert(name, value)?;
        Ok(self)
    }

    /// Parses `name=value` and stores it.
    pub fn apply(&mut self, assignment: &str) -> Result<()> {
        let (name, raw) = assignment.split_once('=').ok_or_else(|| {
            ConsoleError::InvalidArgument(format!("expected name=value, got '{assignment}'"))
        })?;
        let name = name.trim().to_ascii_lowercase();
        let raw = raw.trim();
        let value = match name.as_str() {
            WIDTH => raw.parse::<usize>().map(SettingValue::Int).map_err(|_| {
                ConsoleError::InvalidArgument(format!("width must be a positive integer, got '{raw}'"))
            })?,
            QUERY_PREFIX | SHOW_PREFIX => SettingValue::Bool(parse_bool(raw)?),
            WORK_DIR => {
                let path = PathBuf::from(raw);
                let path = if path.is_absolute() {
                    path
                } else {
                    self.work_dir().join(path)
                };
                SettingValue::Path(path)
            }
            other => {
                return Err(ConsoleError::InvalidArgument(format!(
                    "unknown setting '{other}'"
                )))
            }
        };
        self.insert(&name, value)
    }

    /// Current value of a known setting, explicit or default.
    pub fn get(&self, name: &str) -> Option<SettingValue> {
        let name = name.to_ascii_lowercase();
        if let Some(value) = self.values.get(&name) {
            return Some(value.clone());
        }
        match name.as_str() {
            WIDTH => Some(SettingValue::Int(self.console_width())),
            QUERY_PREFIX => Some(SettingValue::Bool(self.query_prefix())),
            SHOW_PREFIX => Some(SettingValue::Bool(self.show_prefix())),
            WORK_DIR => Some(SettingValue::Path(self.work_dir())),
            _ => None,
        }
    }

    /// All known settings with their effective values.
    pub fn entries(&self) -> Vec<(&'static str, SettingValue)> {
        KNOWN
            .iter()
            .filter_map(|name| self.get(name).map(|v| (*name, v)))
            .collect()
    }

    /// Console width, default [`DEFAULT_WIDTH`].
    pub fn console_width(&self) -> usize {
        match self.values.get(WIDTH) {
            Some(SettingValue::Int(w)) => *w,
            _ => DEFAULT_WIDTH,
        }
    }

    /// Whether repository namespaces are injected into queries, default `true`.
    pub fn query_prefix(&self) -> bool {
        match self.values.get(QUERY_PREFIX) {
            Some(SettingValue::Bool(b)) => *b,
            _ => true,
        }
    }

    /// Whether console output abbreviates IRIs, default `true`.
    pub fn show_prefix(&self) -> bool {
        match self.values.get(SHOW_PREFIX) {
            Some(SettingValue::Bool(b)) => *b,
            _ => true,
        }
    }

    /// Working directory, default the process current directory.
    pub fn work_dir(&self) -> PathBuf {
        match self.values.get(WORK_DIR) {
            Some(SettingValue::Path(p)) => p.clone(),
            _ => std::env::current_dir().unwrap_or_else(|_| Path::new("/").to_path_buf()),
        }
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(ConsoleError::InvalidArgument(format!(
            "expected a boolean, got '{other}'"
        ))),
    }
}
