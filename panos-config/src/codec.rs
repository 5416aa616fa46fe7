//! Shared wire conventions: yes/no booleans, `<member>` and `<entry>` lists,
//! opaque sub-tree capture, and rule target maps.
//!
//! Encoding helpers append to a parent element and skip zero values, so an
//! encoder can call them unconditionally and only populated elements reach
//! the wire. Decoding helpers take an optional node and a child path and
//! treat a missing element as the zero value.

use std::collections::BTreeMap;

use xml_tree::{capture_inner, restore_inner, XmlNode};

use crate::error::{Error, Result};

/// Opaque raw-XML carrier: short key → captured inner XML.
pub type RawXml = BTreeMap<String, String>;

/// Rule target map: device serial → vsys names (empty means all vsys).
pub type TargetMap = BTreeMap<String, Vec<String>>;

pub fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}

/// Anything other than `"yes"` is false.
pub fn is_yes(value: Option<&str>) -> bool {
    value.map(str::trim) == Some("yes")
}

// ===== encoding =====

/// `<tag>value</tag>` when `value` is non-empty.
pub fn push_text(parent: &mut XmlNode, tag: &str, value: &str) {
    if !value.is_empty() {
        parent.push(XmlNode::with_text(tag, value));
    }
}

/// `<tag>value</tag>` when `value` is non-zero.
pub fn push_int(parent: &mut XmlNode, tag: &str, value: u32) {
    if value != 0 {
        parent.push(XmlNode::with_text(tag, value.to_string()));
    }
}

/// `<tag>yes</tag>` when `value` is true; false is left to the device default.
pub fn push_flag(parent: &mut XmlNode, tag: &str, value: bool) {
    if value {
        parent.push(XmlNode::with_text(tag, "yes"));
    }
}

/// `<tag>yes|no</tag>` always. Used for default-true and mandatory toggles.
pub fn push_bool(parent: &mut XmlNode, tag: &str, value: bool) {
    parent.push(XmlNode::with_text(tag, yes_no(value)));
}

/// `<tag/>`.
pub fn push_marker(parent: &mut XmlNode, tag: &str) {
    parent.push(XmlNode::new(tag));
}

/// `<tag><member>v</member>...</tag>` when `values` is non-empty.
pub fn push_members(parent: &mut XmlNode, tag: &str, values: &[String]) {
    if let Some(node) = member_list(tag, values) {
        parent.push(node);
    }
}

pub fn member_list(tag: &str, values: &[String]) -> Option<XmlNode> {
    if values.is_empty() {
        return None;
    }
    let mut node = XmlNode::new(tag);
    for value in values {
        node.push(XmlNode::with_text("member", value.as_str()));
    }
    Some(node)
}

/// `<tag><entry name="v"/>...</tag>` when `names` is non-empty.
pub fn push_entries(parent: &mut XmlNode, tag: &str, names: &[String]) {
    if names.is_empty() {
        return;
    }
    let mut node = XmlNode::new(tag);
    for name in names {
        node.push(entry(name));
    }
    parent.push(node);
}

/// `<tag><entry name="k"><inner>yes|no</inner></entry>...</tag>`.
pub fn push_bool_map(parent: &mut XmlNode, tag: &str, inner: &str, map: &BTreeMap<String, bool>) {
    if map.is_empty() {
        return;
    }
    let mut node = XmlNode::new(tag);
    for (key, value) in map {
        let mut item = entry(key);
        push_bool(&mut item, inner, *value);
        node.push(item);
    }
    parent.push(node);
}

/// An `<entry name="…">` element.
pub fn entry(name: &str) -> XmlNode {
    XmlNode::new("entry").attr("name", name)
}

/// Re-emit the raw fragment stored under `key` as `<tag>…</tag>`.
pub fn push_raw(parent: &mut XmlNode, tag: &str, raw: &RawXml, key: &str) -> Result<()> {
    if let Some(inner) = raw.get(key) {
        let node = restore_inner(tag, inner)
            .map_err(|err| Error::encode(format!("raw[{key}]"), err.to_string()))?;
        parent.push(node);
    }
    Ok(())
}

/// `<target>` block of a rule. Emitted only when there is a device or the
/// negate flag is set.
pub fn push_target(parent: &mut XmlNode, target: &TargetMap, negate: bool) {
    if target.is_empty() && !negate {
        return;
    }
    let mut node = XmlNode::new("target");
    if !target.is_empty() {
        let mut devices = XmlNode::new("devices");
        for (serial, vsys_list) in target {
            let mut device = entry(serial);
            push_entries(&mut device, "vsys", vsys_list);
            devices.push(device);
        }
        node.push(devices);
    }
    push_flag(&mut node, "negate", negate);
    parent.push(node);
}

// ===== decoding =====

/// Text at `path` under `node`, or empty.
pub fn text(node: Option<&XmlNode>, path: &[&str]) -> String {
    node.and_then(|n| n.get_text(path))
        .map(|t| t.trim().to_string())
        .unwrap_or_default()
}

/// Free-form text at `path` (descriptions, comments), kept verbatim.
pub fn free_text(node: Option<&XmlNode>, path: &[&str]) -> String {
    node.and_then(|n| n.get_text(path))
        .map(ToString::to_string)
        .unwrap_or_default()
}

/// `"yes"` at `path` under `node`.
pub fn flag(node: Option<&XmlNode>, path: &[&str]) -> bool {
    is_yes(node.and_then(|n| n.get_text(path)))
}

/// Boolean at `path`, or `default` when the element is absent.
pub fn bool_or(node: Option<&XmlNode>, path: &[&str], default: bool) -> bool {
    match node.and_then(|n| n.get_path(path)) {
        Some(found) => is_yes(found.text.as_deref()),
        None => default,
    }
}

/// Unsigned integer at `path`, or zero.
pub fn int(node: Option<&XmlNode>, path: &[&str]) -> Result<u32> {
    int_or(node, path, 0)
}

/// Unsigned integer at `path`, or `default` when the element is absent.
pub fn int_or(node: Option<&XmlNode>, path: &[&str], default: u32) -> Result<u32> {
    let Some(raw) = node.and_then(|n| n.get_text(path)) else {
        return Ok(default);
    };
    raw.trim().parse().map_err(|_| {
        Error::decode(
            path.last().copied().unwrap_or_default(),
            format!("expected an unsigned integer, got '{raw}'"),
        )
    })
}

/// `<member>` texts of the list at `path`.
pub fn members(node: Option<&XmlNode>, path: &[&str]) -> Vec<String> {
    node.and_then(|n| n.get_path(path))
        .map(|list| {
            list.get_children("member")
                .into_iter()
                .filter_map(|m| m.text.as_deref())
                .map(|t| t.trim().to_string())
                .collect()
        })
        .unwrap_or_default()
}

/// `name` attributes of the `<entry>` list at `path`.
pub fn entry_names(node: Option<&XmlNode>, path: &[&str]) -> Vec<String> {
    node.and_then(|n| n.get_path(path))
        .map(|list| {
            list.get_children("entry")
                .into_iter()
                .filter_map(|e| e.get_attr("name"))
                .map(ToString::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// `<entry name="k"><inner>yes</inner></entry>` list at `path` as a map.
pub fn bool_map(node: Option<&XmlNode>, path: &[&str], inner: &str) -> BTreeMap<String, bool> {
    node.and_then(|n| n.get_path(path))
        .map(|list| {
            list.get_children("entry")
                .into_iter()
                .filter_map(|e| Some((e.get_attr("name")?.to_string(), flag(Some(e), &[inner]))))
                .collect()
        })
        .unwrap_or_default()
}

/// Required `name` attribute of an `<entry>`.
pub fn entry_name(node: &XmlNode) -> Result<String> {
    node.get_attr("name")
        .map(ToString::to_string)
        .ok_or_else(|| Error::decode(node.tag.as_str(), "missing name attribute"))
}

/// Store the inner XML of `node`'s child `tag` under `key`. Absent and
/// empty elements store nothing.
pub fn capture_raw(node: Option<&XmlNode>, tag: &str, key: &str, raw: &mut RawXml) -> Result<()> {
    if let Some(child) = node.and_then(|n| n.get_child(tag)).filter(|c| !c.is_blank()) {
        let inner = capture_inner(child).map_err(|err| Error::decode(tag, err.to_string()))?;
        raw.insert(key.to_string(), inner);
    }
    Ok(())
}

/// Name of the first child of `node` among `choices`, in declared order.
pub fn choice<'a>(node: Option<&'a XmlNode>, choices: &[&str]) -> Option<&'a XmlNode> {
    node.and_then(|n| n.first_of(choices))
}

/// Decode a `<target>` block.
pub fn target(node: Option<&XmlNode>) -> (TargetMap, bool) {
    let Some(target) = node.and_then(|n| n.get_child("target")) else {
        return (TargetMap::new(), false);
    };
    let devices = target
        .get_child("devices")
        .map(|devices| {
            devices
                .get_children("entry")
                .into_iter()
                .filter_map(|device| {
                    let serial = device.get_attr("name")?.to_string();
                    Some((serial, entry_names(Some(device), &["vsys"])))
                })
                .collect()
        })
        .unwrap_or_default();
    (devices, flag(Some(target), &["negate"]))
}
