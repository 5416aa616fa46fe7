//! Address groups: a static member list or a dynamic tag filter.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::Result;
use crate::object::{Entry, Object, Variant};
use crate::path::{Location, Placement};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressGroup {
    pub name: String,
    pub description: String,
    /// Used when non-empty; otherwise `dynamic_match` applies.
    pub static_addresses: Vec<String>,
    pub dynamic_match: String,
    pub tags: Vec<String>,
}

impl Object for AddressGroup {
    const KIND: &'static str = "address-group";

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

    fn encode(&self, _variant: Variant) -> Result<XmlNode> {
        let mut entry = codec::entry(&self.name);
        if !self.static_addresses.is_empty() {
            codec::push_members(&mut entry, "static", &self.static_addresses);
        } else if !self.dynamic_match.is_empty() {
            let mut dynamic = XmlNode::new("dynamic");
            codec::push_text(&mut dynamic, "filter", &self.dynamic_match);
            entry.push(dynamic);
        }
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "tag", &self.tags);
        Ok(entry)
    }

    fn decode(node: &XmlNode, _variant: Variant) -> Result<Self> {
        let mut group = Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(Some(node), &["description"]),
            tags: codec::members(Some(node), &["tag"]),
            ..Self::default()
        };
        match codec::choice(Some(node), &["static", "dynamic"]) {
            Some(found) if found.tag == "static" => {
                group.static_addresses = codec::members(Some(found), &[]);
            }
            Some(found) => group.dynamic_match = codec::text(Some(found), &["filter"]),
            None => {}
        }
        Ok(group)
    }
}

impl Entry for AddressGroup {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("address-group".to_string());
        Ok(out)
    }
}

crate::register_kind!(AddressGroup);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::{parse_str, write_compact};

    use super::*;

    #[test]
    fn static_and_dynamic_round_trip() {
        let static_group = AddressGroup {
            name: "servers".to_string(),
            static_addresses: vec!["web".to_string(), "db".to_string()],
            tags: vec!["prod".to_string()],
            ..AddressGroup::default()
        };
        let dynamic_group = AddressGroup {
            name: "tagged".to_string(),
            description: "by tag".to_string(),
            dynamic_match: "'prod' and 'web'".to_string(),
            ..AddressGroup::default()
        };
        for record in [static_group, dynamic_group] {
            let node = record.encode(Variant::V1).expect("encode");
            assert_eq!(AddressGroup::decode(&node, Variant::V1).expect("decode"), record);
        }
    }

    #[test]
    fn static_members_win_over_a_filter() {
        let record = AddressGroup {
            name: "g".to_string(),
            static_addresses: vec!["a".to_string()],
            dynamic_match: "'x'".to_string(),
            ..AddressGroup::default()
        };
        let xml = write_compact(&record.encode(Variant::V1).expect("encode")).expect("write");
        assert!(!xml.contains("dynamic"));

        let conflicting = parse_str(
            r#"<entry name="g"><dynamic><filter>'x'</filter></dynamic><static><member>a</member></static></entry>"#,
        )
        .expect("parse");
        let decoded = AddressGroup::decode(&conflicting, Variant::V1).expect("decode");
        assert_eq!(decoded.static_addresses, vec!["a"]);
        assert!(decoded.dynamic_match.is_empty());
    }
}
