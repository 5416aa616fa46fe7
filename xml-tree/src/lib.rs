//! Owned XML tree primitives used by the PAN-OS object model.
//!
//! The tree keeps element order, attributes and text, and drops
//! whitespace-only text between elements so that pretty-printed and compact
//! device responses compare equal.

pub mod canonical;
pub mod parser;
pub mod tree;
pub mod writer;

pub use canonical::{canonical_string, capture_inner, equivalent, restore_inner, CanonicalError};
pub use parser::{parse, parse_file, parse_str, ParseError};
pub use tree::XmlNode;
pub use writer::{write, write_compact, write_file, write_fragment, WriteError};
