//! Firmware version parsing and ordering.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A PAN-OS firmware version such as `10.0.0` or `9.1.3-h3`.
///
/// Ordering compares `(major, minor, patch, suffix)` in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub suffix: String,
}

/// Errors returned when a version string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionError {
    #[error("empty version string")]
    Empty,
    #[error("invalid version component '{component}' in '{input}'")]
    Component { input: String, component: String },
    #[error("too many version components in '{0}'")]
    TooLong(String),
}

impl Version {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
            suffix: String::new(),
        }
    }

    /// `self >= other` under the full tuple ordering.
    pub fn gte(&self, other: &Version) -> bool {
        self >= other
    }

    /// `self >= major.minor.patch`, ignoring any suffix.
    pub fn at_least(&self, major: u32, minor: u32, patch: u32) -> bool {
        (self.major, self.minor, self.patch) >= (major, minor, patch)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(VersionError::Empty);
        }

        let (numbers, suffix) = match trimmed.split_once('-') {
            Some((numbers, suffix)) => (numbers, suffix.to_string()),
            None => (trimmed, String::new()),
        };

        let mut parts = [0u32; 3];
        for (idx, component) in numbers.split('.').enumerate() {
            if idx >= parts.len() {
                return Err(VersionError::TooLong(input.to_string()));
            }
            parts[idx] = component.parse().map_err(|_| VersionError::Component {
                input: input.to_string(),
                component: component.to_string(),
            })?;
        }

        Ok(Self {
            major: parts[0],
            minor: parts[1],
            patch: parts[2],
            suffix,
        })
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Version> for String {
    fn from(value: Version) -> Self {
        value.to_string()
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.suffix.is_empty() {
            write!(f, "-{}", self.suffix)?;
        }
        Ok(())
    }
}
