//! BGP export policy rules.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::VirtualRouterScope;

pub const ACTION_ALLOW: &str = "allow";
pub const ACTION_DENY: &str = "deny";

const ACTIONS: &[&str] = &[ACTION_ALLOW, ACTION_DENY];
const AS_PATH_TYPES: &[&str] = &["none", "remove", "prepend", "remove-and-prepend"];
const COMMUNITY_TYPES: &[&str] = &["none", "remove-all", "remove-regex", "append", "overwrite"];

/// Community rewrite of an allow action.
///
/// `kind` selects which of `regex` (for `remove-regex`) or `members` (for
/// `append` and `overwrite`) is used.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunityAction {
    pub kind: String,
    pub regex: String,
    pub members: Vec<String>,
}

impl CommunityAction {
    fn encode_into(&self, parent: &mut XmlNode, tag: &str) -> Result<()> {
        let node = match self.kind.as_str() {
            "" => return Ok(()),
            "none" | "remove-all" => XmlNode::new(self.kind.as_str()),
            "remove-regex" => XmlNode::with_text("remove-regex", self.regex.as_str()),
            "append" | "overwrite" => {
                codec::member_list(self.kind.as_str(), &self.members)
                    .unwrap_or_else(|| XmlNode::new(self.kind.as_str()))
            }
            other => {
                return Err(Error::encode(
                    tag,
                    format!("unknown community action '{other}'"),
                ))
            }
        };
        parent.push(XmlNode::new(tag).child(node));
        Ok(())
    }

    fn decode(node: Option<&XmlNode>) -> Self {
        let Some(kind) = codec::choice(node, COMMUNITY_TYPES) else {
            return Self::default();
        };
        let mut action = Self {
            kind: kind.tag.clone(),
            ..Self::default()
        };
        match kind.tag.as_str() {
            "remove-regex" => action.regex = codec::text(Some(kind), &[]),
            "append" | "overwrite" => action.members = codec::members(Some(kind), &[]),
            _ => {}
        }
        action
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Export {
    pub name: String,
    pub enable: bool,
    /// Peer groups the rule applies to.
    pub used_by: Vec<String>,
    /// `unicast`, `multicast` or `both`. 8.0+.
    pub match_route_table: String,
    /// Prefix → exact match.
    pub match_address_prefix: BTreeMap<String, bool>,
    pub match_next_hop: Vec<String>,
    pub match_from_peer: Vec<String>,
    pub match_med: String,
    pub match_as_path_regex: String,
    pub match_community_regex: String,
    pub match_extended_community_regex: String,
    /// `allow` or `deny`.
    pub action: String,
    pub local_preference: String,
    pub med: String,
    pub next_hop: String,
    pub origin: String,
    pub as_path_limit: u32,
    /// `none`, `remove`, `prepend` or `remove-and-prepend`.
    pub as_path_type: String,
    pub as_path_value: u32,
    pub community: CommunityAction,
    pub extended_community: CommunityAction,
}

impl Object for Export {
    const KIND: &'static str = "bgp-export";
    const THRESHOLDS: &'static [Threshold] = &[Threshold::new(8, 0, 0, Variant::V2)];

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
        codec::push_bool(&mut entry, "enable", self.enable);
        codec::push_members(&mut entry, "used-by", &self.used_by);
        entry.push_populated(self.encode_match(variant));

        match self.action.as_str() {
            "" => {}
            ACTION_DENY => {
                entry.push(XmlNode::new("action").child(XmlNode::new(ACTION_DENY)));
            }
            ACTION_ALLOW => {
                let mut allow = XmlNode::new(ACTION_ALLOW);
                allow.push_populated(self.encode_update()?);
                entry.push(XmlNode::new("action").child(allow));
            }
            other => {
                return Err(Error::encode(
                    "action",
                    format!("unknown export action '{other}'"),
                ))
            }
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let matcher = node.get_child("match");
        let mut rule = Self {
            name: codec::entry_name(node)?,
            enable: codec::flag(entry, &["enable"]),
            used_by: codec::members(entry, &["used-by"]),
            match_address_prefix: codec::bool_map(matcher, &["address-prefix"], "exact"),
            match_next_hop: codec::members(matcher, &["nexthop"]),
            match_from_peer: codec::members(matcher, &["from-peer"]),
            match_med: codec::text(matcher, &["med"]),
            match_as_path_regex: codec::text(matcher, &["as-path", "regex"]),
            match_community_regex: codec::text(matcher, &["community", "regex"]),
            match_extended_community_regex: codec::text(
                matcher,
                &["extended-community", "regex"],
            ),
            ..Self::default()
        };
        if variant >= Variant::V2 {
            rule.match_route_table = codec::text(matcher, &["route-table"]);
        }

        let Some(action) = codec::choice(node.get_child("action"), ACTIONS) else {
            return Ok(rule);
        };
        rule.action = action.tag.clone();
        if let Some(update) = action.get_child("update") {
            rule.decode_update(update)?;
        }
        Ok(rule)
    }
}

impl Export {
    fn encode_match(&self, variant: Variant) -> XmlNode {
        let mut matcher = XmlNode::new("match");
        if variant >= Variant::V2 {
            codec::push_text(&mut matcher, "route-table", &self.match_route_table);
        }
        codec::push_bool_map(&mut matcher, "address-prefix", "exact", &self.match_address_prefix);
        codec::push_members(&mut matcher, "nexthop", &self.match_next_hop);
        codec::push_members(&mut matcher, "from-peer", &self.match_from_peer);
        codec::push_text(&mut matcher, "med", &self.match_med);
        for (tag, regex) in [
            ("as-path", &self.match_as_path_regex),
            ("community", &self.match_community_regex),
            ("extended-community", &self.match_extended_community_regex),
        ] {
            if !regex.is_empty() {
                matcher.push(XmlNode::new(tag).child(XmlNode::with_text("regex", regex.as_str())));
            }
        }
        matcher
    }

    fn encode_update(&self) -> Result<XmlNode> {
        let mut update = XmlNode::new("update");
        codec::push_text(&mut update, "local-preference", &self.local_preference);
        codec::push_text(&mut update, "med", &self.med);
        codec::push_text(&mut update, "nexthop", &self.next_hop);
        codec::push_text(&mut update, "origin", &self.origin);
        codec::push_int(&mut update, "as-path-limit", self.as_path_limit);

        match self.as_path_type.as_str() {
            "" => {}
            kind @ ("none" | "remove") => {
                update.push(XmlNode::new("as-path").child(XmlNode::new(kind)));
            }
            kind @ ("prepend" | "remove-and-prepend") => {
                update.push(
                    XmlNode::new("as-path")
                        .child(XmlNode::with_text(kind, self.as_path_value.to_string())),
                );
            }
            other => {
                return Err(Error::encode(
                    "as_path_type",
                    format!("unknown as-path action '{other}'"),
                ))
            }
        }

        self.community.encode_into(&mut update, "community")?;
        self.extended_community.encode_into(&mut update, "extended-community")?;
        Ok(update)
    }

    fn decode_update(&mut self, update: &XmlNode) -> Result<()> {
        let node = Some(update);
        self.local_preference = codec::text(node, &["local-preference"]);
        self.med = codec::text(node, &["med"]);
        self.next_hop = codec::text(node, &["nexthop"]);
        self.origin = codec::text(node, &["origin"]);
        self.as_path_limit = codec::int(node, &["as-path-limit"])?;
        if let Some(kind) = codec::choice(update.get_child("as-path"), AS_PATH_TYPES) {
            self.as_path_type = kind.tag.clone();
            self.as_path_value = codec::int(Some(kind), &[])?;
        }
        self.community = CommunityAction::decode(update.get_child("community"));
        self.extended_community = CommunityAction::decode(update.get_child("extended-community"));
        Ok(())
    }
}

impl Entry for Export {
    type Scope = VirtualRouterScope;

    fn container(scope: &VirtualRouterScope) -> Result<Vec<String>> {
        let mut out = scope.bgp()?;
        out.extend(["policy", "export", "rules"].map(String::from));
        Ok(out)
    }
}

crate::register_kind!(Export);
