//! Address objects.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::{Location, Placement};

pub const IP_NETMASK: &str = "ip-netmask";
pub const IP_RANGE: &str = "ip-range";
pub const FQDN: &str = "fqdn";
/// PAN-OS 9.0+.
pub const IP_WILDCARD: &str = "ip-wildcard";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub name: String,
    /// Which value element is present: one of the type constants above.
    pub value_type: String,
    pub value: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Address {
    fn value_types(variant: Variant) -> &'static [&'static str] {
        if variant >= Variant::V2 {
            &[IP_NETMASK, IP_RANGE, FQDN, IP_WILDCARD]
        } else {
            &[IP_NETMASK, IP_RANGE, FQDN]
        }
    }
}

impl Object for Address {
    const KIND: &'static str = "address";
    const THRESHOLDS: &'static [Threshold] = &[Threshold::new(9, 0, 0, Variant::V2)];

    fn name(&self) -> &str {
        &self.name
    }

    fn copy_from(&mut self, src: &Self) {
        let name = std::mem::take(&mut self.name);
        *self = Self {
            name,
            ..src.clone()
        };
    }

    fn encode(&self, variant: Variant) -> Result<XmlNode> {
        let mut entry = codec::entry(&self.name);
        match self.value_type.as_str() {
            "" => {}
            IP_WILDCARD if variant < Variant::V2 => {
                return Err(Error::encode(
                    "value_type",
                    "ip-wildcard requires PAN-OS 9.0 or later",
                ))
            }
            kind if Self::value_types(variant).contains(&kind) => {
                entry.push(XmlNode::with_text(kind, self.value.as_str()));
            }
            other => {
                return Err(Error::encode(
                    "value_type",
                    format!("unknown address type '{other}'"),
                ))
            }
        }
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "tag", &self.tags);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let value = codec::choice(Some(node), Self::value_types(variant));
        Ok(Self {
            name: codec::entry_name(node)?,
            value_type: value.map(|v| v.tag.clone()).unwrap_or_default(),
            value: codec::text(value, &[]),
            description: codec::free_text(Some(node), &["description"]),
            tags: codec::members(Some(node), &["tag"]),
        })
    }
}

impl Entry for Address {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("address".to_string());
        Ok(out)
    }
}

crate::register_kind!(Address);
