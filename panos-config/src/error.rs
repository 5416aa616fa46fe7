use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced by the object model, path builder and namespaces.
#[derive(Debug, Error)]
pub enum Error {
    /// A scope parameter required by the object was left empty.
    #[error("{0} is not specified")]
    NotSpecified(&'static str),
    /// A scope parameter was given but is illegal for the object.
    #[error("{0}")]
    Semantic(String),
    /// The device rejected a bulk rule SET; `index` points at the first
    /// offending rule in the caller's list.
    #[error("rule {index} ({name}) is invalid: {message}")]
    BulkRuleInvalid {
        index: usize,
        name: String,
        message: String,
    },
    /// An error from the transport collaborator, with the operation context.
    #[error("{op} {xpath}: {source}")]
    Transport {
        op: &'static str,
        xpath: String,
        #[source]
        source: TransportError,
    },
    /// The device returned XML that does not fit the object schema.
    #[error("failed to decode <{element}>: {reason}")]
    Decode { element: String, reason: String },
    /// The device returned bytes that are not well-formed XML.
    #[error(transparent)]
    Xml(#[from] xml_tree::ParseError),
    /// A record could not be serialized for the selected firmware.
    #[error("failed to encode {field}: {reason}")]
    Encode { field: String, reason: String },
    /// GET/SHOW found no object at the given location.
    #[error("object not found: {xpath}")]
    NotFound { xpath: String },
    /// A record could not be converted to or from its JSON form.
    #[error("invalid {kind} record: {source}")]
    Json {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    pub(crate) fn decode(element: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Decode {
            element: element.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn encode(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Encode {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn transport(op: &'static str, xpath: &str, source: TransportError) -> Self {
        Self::Transport {
            op,
            xpath: xpath.to_string(),
            source,
        }
    }

    /// True for the not-found outcome, whether detected locally or reported
    /// by the device.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport { source, .. } => source.is_object_not_present(),
            _ => false,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
