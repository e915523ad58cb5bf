// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Consumer configuration resolved from layered Storm settings.
//!
//! Storm passes its topology configuration (usually loaded from
//! `storm.yaml`) and an optional registration argument. Both are flat
//! string-keyed maps; later layers override earlier ones key by key.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// InfluxDB endpoint, e.g. `http://localhost:8086`.
pub const INFLUXDB_URL: &str = "metrics.influxdb.url";
pub const INFLUXDB_USERNAME: &str = "metrics.influxdb.username";
pub const INFLUXDB_PASSWORD: &str = "metrics.influxdb.password";
pub const INFLUXDB_DATABASE: &str = "metrics.influxdb.db";
/// Prepended to every measurement name.
pub const INFLUXDB_MEASUREMENT_PREFIX: &str = "metrics.influxdb.measurement.prefix";
/// Standard Storm topology name key.
pub const TOPOLOGY_NAME: &str = "topology.name";

/// Configuration parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings must be a mapping, got {0}")]
    NotAMapping(&'static str),
}

/// One layer of string-keyed settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings(serde_json::Map<String, serde_json::Value>);

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse settings from a YAML mapping.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::try_from(value)
    }

    /// Parse settings from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Settings {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self(map)
    }
}

impl TryFrom<serde_json::Value> for Settings {
    type Error = ConfigError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        match value {
            serde_json::Value::Object(map) => Ok(Self(map)),
            serde_json::Value::Null => Ok(Self::default()),
            serde_json::Value::Bool(_) => Err(ConfigError::NotAMapping("a boolean")),
            serde_json::Value::Number(_) => Err(ConfigError::NotAMapping("a number")),
            serde_json::Value::String(_) => Err(ConfigError::NotAMapping("a string")),
            serde_json::Value::Array(_) => Err(ConfigError::NotAMapping("a sequence")),
        }
    }
}

impl<K: Into<String>, V: Into<serde_json::Value>> FromIterator<(K, V)> for Settings {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

/// A string that must not show up in logs.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("***")
    }
}

/// Resolved consumer configuration.
///
/// Nothing is validated here; an incomplete configuration is reported
/// when the InfluxDB client is built or used.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InfluxConfig {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<Secret>,
    pub database: Option<String>,
    /// Empty unless configured.
    pub measurement_prefix: String,
    pub topology_name: Option<String>,
}

impl InfluxConfig {
    /// Overlay the recognized keys of `settings` onto this configuration.
    ///
    /// Keys absent from `settings` keep their current value; unknown keys
    /// are ignored. A key present with a null value clears the setting.
    pub fn apply(&mut self, settings: &Settings) {
        if let Some(v) = setting_str(settings, TOPOLOGY_NAME) {
            self.topology_name = v;
        }
        if let Some(v) = setting_str(settings, INFLUXDB_URL) {
            self.url = v;
        }
        if let Some(v) = setting_str(settings, INFLUXDB_USERNAME) {
            self.username = v;
        }
        if let Some(v) = setting_str(settings, INFLUXDB_PASSWORD) {
            self.password = v.map(Secret);
        }
        if let Some(v) = setting_str(settings, INFLUXDB_DATABASE) {
            self.database = v;
        }
        if let Some(v) = setting_str(settings, INFLUXDB_MEASUREMENT_PREFIX) {
            self.measurement_prefix = v.unwrap_or_default();
        }
    }

    /// Builder-style variant of [`InfluxConfig::apply`].
    pub fn layered(mut self, settings: &Settings) -> Self {
        self.apply(settings);
        self
    }
}

/// Resolve a configuration from settings layers, later layers winning.
pub fn resolve(sources: &[&Settings]) -> InfluxConfig {
    sources
        .iter()
        .fold(InfluxConfig::default(), |config, settings| config.layered(settings))
}

/// `None` when the key is absent or unusable, `Some(None)` when it is
/// explicitly null.
fn setting_str(settings: &Settings, key: &str) -> Option<Option<String>> {
    match settings.get(key)? {
        serde_json::Value::Null => Some(None),
        serde_json::Value::String(s) => Some(Some(s.clone())),
        serde_json::Value::Number(n) => Some(Some(n.to_string())),
        serde_json::Value::Bool(b) => Some(Some(b.to_string())),
        serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            log::warn!("Ignoring setting '{}': expected a scalar, got a nested value", key);
            None
        }
    }
}
