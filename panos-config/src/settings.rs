//! Library defaults, loaded from TOML.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::{Location, RuleScope, Rulebase};
use crate::version::Version;

/// Defaults used when a caller leaves a scope or firmware unspecified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub version: Version,
    pub vsys: String,
    pub device_group: String,
    pub rulebase: Rulebase,
    /// `nlogs` requested per audit-comment history page.
    pub audit_history_page_size: u32,
    /// Fragment of the device message that marks a rejected bulk rule SET.
    pub bulk_invalid_marker: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: Version::new(10, 0, 0),
            vsys: "vsys1".to_string(),
            device_group: "shared".to_string(),
            rulebase: Rulebase::Rulebase,
            audit_history_page_size: 100,
            bulk_invalid_marker: "rules is invalid".to_string(),
        }
    }
}

/// Errors returned when loading a settings file.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

impl Settings {
    /// Settings from `path`, or the embedded defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|source| SettingsError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                parse_settings(&raw, path.display().to_string())
            }
            None => Ok(Self::embedded()),
        }
    }

    /// Built-in defaults.
    pub fn embedded() -> Self {
        let embedded = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/settings/default.toml"));
        parse_settings(embedded, "embedded settings".to_string()).unwrap_or_default()
    }

    /// Object location implied by the defaults: the device group for
    /// Panorama rulebases, the vsys otherwise.
    pub fn location(&self) -> Location {
        match self.rulebase {
            Rulebase::Rulebase => Location::vsys(self.vsys.as_str()),
            Rulebase::Pre | Rulebase::Post => Location::device_group(self.device_group.as_str()),
        }
    }

    pub fn rule_scope(&self) -> RuleScope {
        RuleScope {
            location: self.location(),
            base: self.rulebase,
        }
    }
}

fn parse_settings(raw: &str, path: String) -> Result<Settings, SettingsError> {
    toml::from_str(raw).map_err(|source| SettingsError::Parse { path, source })
}
