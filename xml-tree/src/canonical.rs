//! Canonical whitespace handling and inner-XML capture.
//!
//! Two documents are canonically equal when they parse to the same tree after
//! inter-element whitespace is dropped and text content is trimmed.

use quick_xml::escape::escape;

use crate::parser::{parse, parse_str, ParseError};
use crate::tree::XmlNode;
use crate::writer::{write_compact, write_fragment, WriteError};

/// Capture the inner XML of `node` (text and children, no wrapper) as a
/// compact, whitespace-normalized string.
pub fn capture_inner(node: &XmlNode) -> Result<String, WriteError> {
    let mut out = String::new();
    if let Some(text) = node.text.as_deref().map(str::trim) {
        out.push_str(&escape(text));
    }
    out.push_str(&write_fragment(&node.children)?);
    Ok(out)
}

/// Rebuild an element named `tag` whose body is the captured `inner` XML.
pub fn restore_inner(tag: &str, inner: &str) -> Result<XmlNode, ParseError> {
    let mut node = parse_str(&format!("<{tag}>{inner}</{tag}>"))?;
    trim_text(&mut node);
    Ok(node)
}

/// Return a tree with all text content trimmed.
pub fn normalize(node: &XmlNode) -> XmlNode {
    let mut out = node.clone();
    trim_text(&mut out);
    out
}

/// Render `xml` in canonical form: compact, trimmed text.
pub fn canonical_string(xml: &[u8]) -> Result<String, CanonicalError> {
    let node = normalize(&parse(xml)?);
    Ok(write_compact(&node)?)
}

/// True when two XML documents are canonically equal.
pub fn equivalent(left: &[u8], right: &[u8]) -> Result<bool, CanonicalError> {
    Ok(normalize(&parse(left)?) == normalize(&parse(right)?))
}

/// Errors from canonicalization, which both parses and writes.
#[derive(Debug, thiserror::Error)]
pub enum CanonicalError {
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Write(#[from] WriteError),
}

fn trim_text(node: &mut XmlNode) {
    if let Some(text) = node.text.take() {
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            node.text = Some(trimmed.to_string());
        }
    }
    for child in &mut node.children {
        trim_text(child);
    }
}

#[cfg(test)]
mod tests {
    use super::{canonical_string, capture_inner, equivalent, restore_inner};
    use crate::parser::parse_str;

    #[test]
    fn capture_drops_indentation_and_wrapper() {
        let node = parse_str(
            "<auth-profile>\n  <entry name=\"ap1\">\n    <secret>x</secret>\n  </entry>\n</auth-profile>",
        )
        .expect("parse");

        assert_eq!(
            capture_inner(&node).expect("capture"),
            r#"<entry name="ap1"><secret>x</secret></entry>"#
        );
    }

    #[test]
    fn restore_reverses_capture() {
        let original = parse_str("<arp><entry name=\"10.0.0.1\"><hw-address>aa</hw-address></entry></arp>")
            .expect("parse");
        let inner = capture_inner(&original).expect("capture");
        let restored = restore_inner("arp", &inner).expect("restore");
        assert_eq!(restored, original);
    }

    #[test]
    fn text_only_bodies_survive_capture() {
        let original = parse_str("<comment> a &amp; b </comment>").expect("parse");
        let inner = capture_inner(&original).expect("capture");
        assert_eq!(inner, "a &amp; b");
        assert_eq!(restore_inner("comment", &inner).expect("restore").text.as_deref(), Some("a & b"));
    }

    #[test]
    fn whitespace_variants_are_equivalent() {
        assert!(equivalent(b"<a><b> x </b></a>", b"<a>\n  <b>x</b>\n</a>").expect("compare"));
        assert!(!equivalent(b"<a><b>x</b></a>", b"<a><b>y</b></a>").expect("compare"));
        assert_eq!(
            canonical_string(b"<a>\n <b/>\n</a>").expect("canonical"),
            "<a><b/></a>"
        );
    }
}
