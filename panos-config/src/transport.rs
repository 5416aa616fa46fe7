//! Contract for the HTTPS API client the object model drives.
//!
//! The crate never talks to a device itself. Callers plug in an implementation
//! of [`Transport`] that issues the XML API requests and hands back the parsed
//! `<response>` element.

use std::fmt::{self, Display, Formatter};

use thiserror::Error;
use xml_tree::XmlNode;

use crate::version::Version;

/// PAN-OS error code for "object not present".
pub const CODE_OBJECT_NOT_PRESENT: u32 = 7;

/// Errors reported by a [`Transport`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The device answered with `status="error"`.
    #[error("device error {code}: {message}")]
    Device { code: u32, message: String },
    /// The request never produced a device response.
    #[error("connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// The device message, or the connection failure text.
    pub fn message(&self) -> &str {
        match self {
            Self::Device { message, .. } => message,
            Self::Connection(message) => message,
        }
    }

    pub fn is_object_not_present(&self) -> bool {
        matches!(self, Self::Device { code, .. } if *code == CODE_OBJECT_NOT_PRESENT)
    }
}

/// Placement argument of the `move` API action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovePosition {
    Top,
    Bottom,
    Before,
    After,
}

impl MovePosition {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}

impl Display for MovePosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of a log retrieval request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub log_type: String,
    pub query: String,
    /// `"backward"` (newest first) or `"forward"`.
    pub direction: String,
    pub nlogs: u32,
    pub skip: u32,
}

/// The remote API operations the object model needs.
///
/// Read operations return the whole `<response>` element. Write operations
/// take the xpath of the container (`set`) or of the object itself (`edit`,
/// `delete`, `move_entry`).
pub trait Transport {
    /// Firmware version of the connected device.
    fn version(&self) -> Result<Version, TransportError>;

    /// Candidate configuration read.
    fn get(&self, xpath: &str) -> Result<XmlNode, TransportError>;

    /// Running configuration read.
    fn show(&self, xpath: &str) -> Result<XmlNode, TransportError>;

    /// Merge `elements` under the container at `xpath`.
    fn set(&self, xpath: &str, elements: &[XmlNode]) -> Result<(), TransportError>;

    /// Replace the object at `xpath` with `element`.
    fn edit(&self, xpath: &str, element: &XmlNode) -> Result<(), TransportError>;

    fn delete(&self, xpath: &str) -> Result<(), TransportError>;

    /// Relocate the entry at `xpath`; `reference` names the destination
    /// entry for before/after moves and is empty otherwise.
    fn move_entry(
        &self,
        xpath: &str,
        position: MovePosition,
        reference: &str,
    ) -> Result<(), TransportError>;

    /// Run an operational command, optionally targeted at a vsys.
    fn op(&self, command: &XmlNode, vsys: &str) -> Result<XmlNode, TransportError>;

    /// Retrieve logs; the returned response carries `result/log/logs/entry`.
    fn logs(&self, query: &LogQuery) -> Result<XmlNode, TransportError>;

    /// Import `names` into the vsys rooted at `vsys_xpath`. `list` is the
    /// import list under `import/network` (`interface`, `virtual-router`).
    fn vsys_import(
        &self,
        vsys_xpath: &str,
        list: &str,
        names: &[&str],
    ) -> Result<(), TransportError> {
        if names.is_empty() {
            return Ok(());
        }
        let members: Vec<XmlNode> = names
            .iter()
            .map(|name| XmlNode::with_text("member", *name))
            .collect();
        self.set(&format!("{vsys_xpath}/import/network/{list}"), &members)
    }

    /// Remove `names` from the `list` imports of the vsys at `vsys_xpath`.
    fn vsys_unimport(
        &self,
        vsys_xpath: &str,
        list: &str,
        names: &[&str],
    ) -> Result<(), TransportError> {
        for name in names {
            self.delete(&format!(
                "{vsys_xpath}/import/network/{list}/member[text()='{name}']"
            ))?;
        }
        Ok(())
    }
}
