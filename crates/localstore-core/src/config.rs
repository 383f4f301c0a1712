//! Default configuration for the local store
//!
//! Defaults are typed (`string | bool | number`) but everything the store hands
//! back is a string, so each `DefaultValue` knows how to coerce itself.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Placeholder returned for keys with no cached, persisted or default value
pub const UNDEFINED: &str = "undefined";

/// Keys every configuration must define
pub const LANGUAGE_KEY: &str = "language";
pub const MUSIC_KEY: &str = "music";
pub const SOUND_KEY: &str = "sound";

/// A single default value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(f64),
    String(String),
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultValue::String(s) => f.write_str(s),
            DefaultValue::Bool(b) => write!(f, "{}", b),
            DefaultValue::Number(n) => fmt_number(*n, f),
        }
    }
}

/// Format a number the way script hosts stringify it (`1`, `1.5`, `NaN`, `Infinity`)
fn fmt_number(n: f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if n.is_nan() {
        f.write_str("NaN")
    } else if n.is_infinite() {
        f.write_str(if n > 0.0 { "Infinity" } else { "-Infinity" })
    } else if n == 0.0 {
        // -0 stringifies as "0"
        f.write_str("0")
    } else {
        // Shortest round-trip digits; decimal form only for exponents -6..=20
        let sci = format!("{:e}", n);
        let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
        match exp.parse::<i32>() {
            Ok(exp) if !(-6..=20).contains(&exp) => {
                let sign = if exp < 0 { '-' } else { '+' };
                write!(f, "{}e{}{}", mantissa, sign, exp.abs())
            }
            _ => write!(f, "{}", n),
        }
    }
}

impl From<&str> for DefaultValue {
    fn from(value: &str) -> Self {
        DefaultValue::String(value.to_string())
    }
}

impl From<String> for DefaultValue {
    fn from(value: String) -> Self {
        DefaultValue::String(value)
    }
}

impl From<bool> for DefaultValue {
    fn from(value: bool) -> Self {
        DefaultValue::Bool(value)
    }
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Number(value)
    }
}

impl From<i64> for DefaultValue {
    fn from(value: i64) -> Self {
        DefaultValue::Number(value as f64)
    }
}

impl From<i32> for DefaultValue {
    fn from(value: i32) -> Self {
        DefaultValue::Number(f64::from(value))
    }
}

impl From<u32> for DefaultValue {
    fn from(value: u32) -> Self {
        DefaultValue::Number(f64::from(value))
    }
}

/// Immutable set of defaults the store falls back to
///
/// Always contains `language`, `music` and `sound` once validated. Extra keys
/// are allowed and behave the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Configuration {
    values: BTreeMap<String, DefaultValue>,
}

impl Configuration {
    /// Minimal valid configuration: the given language, music and sound on
    pub fn new(language: impl Into<String>) -> Self {
        let mut values = BTreeMap::new();
        values.insert(
            LANGUAGE_KEY.to_string(),
            DefaultValue::String(language.into()),
        );
        values.insert(MUSIC_KEY.to_string(), DefaultValue::Bool(true));
        values.insert(SOUND_KEY.to_string(), DefaultValue::Bool(true));
        Self { values }
    }

    /// Add or replace a default
    pub fn with(mut self, key: impl Into<String>, value: impl Into<DefaultValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Parse a flat JSON object of defaults and validate it
    pub fn from_json_str(content: &str) -> Result<Self, StoreError> {
        let config: Self = serde_json::from_str(content).map_err(|source| StoreError::ConfigJson {
            message: source.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a flat TOML table of defaults and validate it
    pub fn from_toml_str(content: &str) -> Result<Self, StoreError> {
        let config: Self = toml::from_str(content).map_err(|source| StoreError::ConfigToml {
            message: source.message().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load defaults from a `.json` or `.toml` file
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| StoreError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            other => Err(StoreError::invalid_config(format!(
                "unsupported configuration format {:?} for {}",
                other.unwrap_or(""),
                path.display()
            ))),
        }
    }

    /// Check the required keys and their types
    pub fn validate(&self) -> Result<(), StoreError> {
        match self.values.get(LANGUAGE_KEY) {
            Some(DefaultValue::String(_)) => {}
            Some(other) => {
                return Err(StoreError::invalid_config(format!(
                    "'{}' must be a string, got {}",
                    LANGUAGE_KEY, other
                )))
            }
            None => {
                return Err(StoreError::invalid_config(format!(
                    "missing required key '{}'",
                    LANGUAGE_KEY
                )))
            }
        }

        for key in [MUSIC_KEY, SOUND_KEY] {
            match self.values.get(key) {
                Some(DefaultValue::Bool(true)) => {}
                Some(other) => {
                    return Err(StoreError::invalid_config(format!(
                        "'{}' must default to true, got {}",
                        key, other
                    )))
                }
                None => {
                    return Err(StoreError::invalid_config(format!(
                        "missing required key '{}'",
                        key
                    )))
                }
            }
        }

        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&DefaultValue> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// String form of the default for `key`, or `"undefined"` when there is none
    pub fn default_string(&self, key: &str) -> String {
        self.values
            .get(key)
            .map(ToString::to_string)
            .unwrap_or_else(|| UNDEFINED.to_string())
    }

    /// Default language
    pub fn language(&self) -> Option<&str> {
        match self.values.get(LANGUAGE_KEY) {
            Some(DefaultValue::String(s)) => Some(s),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DefaultValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new("en")
    }
}
