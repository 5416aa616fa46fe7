//! BGP peer groups.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Variant};
use crate::path::VirtualRouterScope;

pub const TYPE_EBGP: &str = "ebgp";
pub const TYPE_IBGP: &str = "ibgp";
pub const TYPE_EBGP_CONFED: &str = "ebgp-confed";
pub const TYPE_IBGP_CONFED: &str = "ibgp-confed";

const TYPES: &[&str] = &[TYPE_EBGP, TYPE_IBGP, TYPE_EBGP_CONFED, TYPE_IBGP_CONFED];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PeerGroup {
    pub name: String,
    pub enable: bool,
    pub aggregated_confed_as_path: bool,
    pub soft_reset_with_stored_info: bool,
    /// `ebgp`, `ibgp`, `ebgp-confed` or `ibgp-confed`.
    pub group_type: String,
    /// eBGP only.
    pub remove_private_as: bool,
    /// `original` or `use-peer`; eBGP only.
    pub import_next_hop: String,
    /// `resolve`, `use-self` or `original`.
    pub export_next_hop: String,
}

impl Object for PeerGroup {
    const KIND: &'static str = "bgp-peer-group";

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
        codec::push_bool(&mut entry, "enable", self.enable);
        codec::push_flag(&mut entry, "aggregated-confed-as-path", self.aggregated_confed_as_path);
        codec::push_flag(
            &mut entry,
            "soft-reset-with-stored-info",
            self.soft_reset_with_stored_info,
        );

        if !self.group_type.is_empty() {
            if !TYPES.contains(&self.group_type.as_str()) {
                return Err(Error::encode(
                    "group_type",
                    format!("unknown peer group type '{}'", self.group_type),
                ));
            }
            let mut kind = XmlNode::new(self.group_type.as_str());
            if self.group_type == TYPE_EBGP {
                codec::push_flag(&mut kind, "remove-private-as", self.remove_private_as);
                codec::push_text(&mut kind, "import-nexthop", &self.import_next_hop);
            }
            codec::push_text(&mut kind, "export-nexthop", &self.export_next_hop);
            entry.push(XmlNode::new("type").child(kind));
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, _variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let mut group = Self {
            name: codec::entry_name(node)?,
            enable: codec::flag(entry, &["enable"]),
            aggregated_confed_as_path: codec::flag(entry, &["aggregated-confed-as-path"]),
            soft_reset_with_stored_info: codec::flag(entry, &["soft-reset-with-stored-info"]),
            ..Self::default()
        };
        if let Some(kind) = codec::choice(node.get_child("type"), TYPES) {
            group.group_type = kind.tag.clone();
            group.remove_private_as = codec::flag(Some(kind), &["remove-private-as"]);
            group.import_next_hop = codec::text(Some(kind), &["import-nexthop"]);
            group.export_next_hop = codec::text(Some(kind), &["export-nexthop"]);
        }
        Ok(group)
    }
}

impl Entry for PeerGroup {
    type Scope = VirtualRouterScope;

    fn container(scope: &VirtualRouterScope) -> Result<Vec<String>> {
        let mut out = scope.bgp()?;
        out.push("peer-group".to_string());
        Ok(out)
    }
}

crate::register_kind!(PeerGroup);
