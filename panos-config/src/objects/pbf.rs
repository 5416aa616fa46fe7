//! Policy-based forwarding rules.
//!
//! The source is either a zone list or an interface list, chosen by
//! `from_type`. The action is a tag-presence choice: `forward` carries the
//! egress interface, next hop and monitor settings, `forward-to-vsys` a vsys
//! name, and `discard` and `no-pbf` are markers.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, TargetMap};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::RuleScope;
use crate::rules::Rule;

pub const FROM_ZONE: &str = "zone";
pub const FROM_INTERFACE: &str = "interface";

pub const ACTION_FORWARD: &str = "forward";
pub const ACTION_FORWARD_VSYS: &str = "forward-to-vsys";
pub const ACTION_DISCARD: &str = "discard";
pub const ACTION_NO_PBF: &str = "no-pbf";

pub const NEXT_HOP_IP: &str = "ip-address";
pub const NEXT_HOP_FQDN: &str = "fqdn";

const FROM_TYPES: &[&str] = &[FROM_ZONE, FROM_INTERFACE];
const ACTIONS: &[&str] = &[ACTION_FORWARD, ACTION_FORWARD_VSYS, ACTION_DISCARD, ACTION_NO_PBF];
const NEXT_HOPS: &[&str] = &[NEXT_HOP_IP, NEXT_HOP_FQDN];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PbfRule {
    pub name: String,
    /// 9.0+.
    pub uuid: String,
    pub description: String,
    pub tags: Vec<String>,
    /// `zone` or `interface`.
    pub from_type: String,
    pub from_values: Vec<String>,
    pub source_addresses: Vec<String>,
    pub source_users: Vec<String>,
    pub negate_source: bool,
    pub destination_addresses: Vec<String>,
    pub negate_destination: bool,
    pub applications: Vec<String>,
    pub services: Vec<String>,
    pub schedule: String,
    pub disabled: bool,
    pub action: String,
    /// Forward: egress interface.
    pub forward_egress_interface: String,
    /// Forward: `ip-address`, or `fqdn` on 9.0+.
    pub forward_next_hop_type: String,
    pub forward_next_hop_value: String,
    pub forward_monitor_profile: String,
    pub forward_monitor_ip_address: String,
    pub forward_monitor_disable_if_unreachable: bool,
    /// Forward-to-vsys: target vsys.
    pub forward_vsys: String,
    pub enable_enforce_symmetric_return: bool,
    pub symmetric_return_addresses: Vec<String>,
    pub active_active_device_binding: String,
    /// 10.0+.
    pub group_tag: String,
    pub target: TargetMap,
    pub negate_target: bool,
}

impl Object for PbfRule {
    const KIND: &'static str = "pbf-rule";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(10, 0, 0, Variant::V3),
        Threshold::new(9, 0, 0, Variant::V2),
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn copy_from(&mut self, src: &Self) {
        let name = std::mem::take(&mut self.name);
        let uuid = std::mem::take(&mut self.uuid);
        *self = Self {
            name,
            uuid,
            ..src.clone()
        };
    }

    fn encode(&self, variant: Variant) -> Result<XmlNode> {
        let mut entry = codec::entry(&self.name);
        if variant >= Variant::V2 && !self.uuid.is_empty() {
            entry = entry.attr("uuid", self.uuid.as_str());
        }

        match self.from_type.as_str() {
            "" => {}
            FROM_ZONE | FROM_INTERFACE => {
                let mut from = XmlNode::new("from");
                codec::push_members(&mut from, &self.from_type, &self.from_values);
                entry.push_populated(from);
            }
            other => {
                return Err(Error::encode("from_type", format!("unknown source type '{other}'")))
            }
        }
        codec::push_members(&mut entry, "source", &self.source_addresses);
        codec::push_members(&mut entry, "source-user", &self.source_users);
        codec::push_flag(&mut entry, "negate-source", self.negate_source);
        codec::push_members(&mut entry, "destination", &self.destination_addresses);
        codec::push_flag(&mut entry, "negate-destination", self.negate_destination);
        codec::push_members(&mut entry, "application", &self.applications);
        codec::push_members(&mut entry, "service", &self.services);
        codec::push_text(&mut entry, "schedule", &self.schedule);
        codec::push_flag(&mut entry, "disabled", self.disabled);
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "tag", &self.tags);

        if let Some(action) = self.encode_action(variant)? {
            entry.push(XmlNode::new("action").child(action));
        }

        let mut symmetric = XmlNode::new("enforce-symmetric-return");
        codec::push_flag(&mut symmetric, "enabled", self.enable_enforce_symmetric_return);
        codec::push_entries(
            &mut symmetric,
            "nexthop-address-list",
            &self.symmetric_return_addresses,
        );
        entry.push_populated(symmetric);

        codec::push_text(
            &mut entry,
            "active-active-device-binding",
            &self.active_active_device_binding,
        );
        if variant >= Variant::V3 {
            codec::push_text(&mut entry, "group-tag", &self.group_tag);
        }
        codec::push_target(&mut entry, &self.target, self.negate_target);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let (target, negate_target) = codec::target(entry);
        let mut rule = Self {
            name: codec::entry_name(node)?,
            source_addresses: codec::members(entry, &["source"]),
            source_users: codec::members(entry, &["source-user"]),
            negate_source: codec::flag(entry, &["negate-source"]),
            destination_addresses: codec::members(entry, &["destination"]),
            negate_destination: codec::flag(entry, &["negate-destination"]),
            applications: codec::members(entry, &["application"]),
            services: codec::members(entry, &["service"]),
            schedule: codec::text(entry, &["schedule"]),
            disabled: codec::flag(entry, &["disabled"]),
            description: codec::free_text(entry, &["description"]),
            tags: codec::members(entry, &["tag"]),
            enable_enforce_symmetric_return: codec::flag(
                entry,
                &["enforce-symmetric-return", "enabled"],
            ),
            symmetric_return_addresses: codec::entry_names(
                entry,
                &["enforce-symmetric-return", "nexthop-address-list"],
            ),
            active_active_device_binding: codec::text(entry, &["active-active-device-binding"]),
            target,
            negate_target,
            ..Self::default()
        };

        if let Some(from) = codec::choice(node.get_child("from"), FROM_TYPES) {
            rule.from_type = from.tag.clone();
            rule.from_values = codec::members(Some(from), &[]);
        }
        if let Some(action) = codec::choice(node.get_child("action"), ACTIONS) {
            rule.decode_action(action, variant);
        }
        if variant >= Variant::V2 {
            rule.uuid = node.get_attr("uuid").unwrap_or_default().to_string();
        }
        if variant >= Variant::V3 {
            rule.group_tag = codec::text(entry, &["group-tag"]);
        }
        Ok(rule)
    }
}

impl PbfRule {
    fn encode_action(&self, variant: Variant) -> Result<Option<XmlNode>> {
        let node = match self.action.as_str() {
            "" => return Ok(None),
            ACTION_FORWARD => {
                let mut forward = XmlNode::new(ACTION_FORWARD);
                codec::push_text(&mut forward, "egress-interface", &self.forward_egress_interface);
                match self.forward_next_hop_type.as_str() {
                    "" => {}
                    NEXT_HOP_FQDN if variant < Variant::V2 => {
                        return Err(Error::encode(
                            "forward_next_hop_type",
                            "fqdn next hops need PAN-OS 9.0 or later",
                        ))
                    }
                    kind @ (NEXT_HOP_IP | NEXT_HOP_FQDN) => forward.push(
                        XmlNode::new("nexthop")
                            .child(XmlNode::with_text(kind, self.forward_next_hop_value.as_str())),
                    ),
                    other => {
                        return Err(Error::encode(
                            "forward_next_hop_type",
                            format!("unknown next hop type '{other}'"),
                        ))
                    }
                }
                let mut monitor = XmlNode::new("monitor");
                codec::push_text(&mut monitor, "profile", &self.forward_monitor_profile);
                codec::push_flag(
                    &mut monitor,
                    "disable-if-unreachable",
                    self.forward_monitor_disable_if_unreachable,
                );
                codec::push_text(&mut monitor, "ip-address", &self.forward_monitor_ip_address);
                forward.push_populated(monitor);
                forward
            }
            ACTION_FORWARD_VSYS => XmlNode::with_text(ACTION_FORWARD_VSYS, self.forward_vsys.as_str()),
            ACTION_DISCARD | ACTION_NO_PBF => XmlNode::new(self.action.as_str()),
            other => {
                return Err(Error::encode("action", format!("unknown pbf action '{other}'")))
            }
        };
        Ok(Some(node))
    }

    fn decode_action(&mut self, action: &XmlNode, variant: Variant) {
        self.action = action.tag.clone();
        match action.tag.as_str() {
            ACTION_FORWARD => {
                let forward = Some(action);
                self.forward_egress_interface = codec::text(forward, &["egress-interface"]);
                let hops: &[&str] = if variant >= Variant::V2 {
                    NEXT_HOPS
                } else {
                    &NEXT_HOPS[..1]
                };
                if let Some(hop) = codec::choice(action.get_child("nexthop"), hops) {
                    self.forward_next_hop_type = hop.tag.clone();
                    self.forward_next_hop_value = codec::text(Some(hop), &[]);
                }
                self.forward_monitor_profile = codec::text(forward, &["monitor", "profile"]);
                self.forward_monitor_ip_address = codec::text(forward, &["monitor", "ip-address"]);
                self.forward_monitor_disable_if_unreachable =
                    codec::flag(forward, &["monitor", "disable-if-unreachable"]);
            }
            ACTION_FORWARD_VSYS => self.forward_vsys = codec::text(Some(action), &[]),
            _ => {}
        }
    }

    /// Copy with the uuid cleared and unordered lists sorted.
    fn canonical(&self) -> Self {
        let mut out = self.clone();
        out.uuid.clear();
        for list in [
            &mut out.tags,
            &mut out.from_values,
            &mut out.source_addresses,
            &mut out.source_users,
            &mut out.destination_addresses,
            &mut out.applications,
            &mut out.services,
            &mut out.symmetric_return_addresses,
        ] {
            list.sort();
        }
        for vsys in out.target.values_mut() {
            vsys.sort();
        }
        out
    }
}

impl Entry for PbfRule {
    type Scope = RuleScope;

    fn container(scope: &RuleScope) -> Result<Vec<String>> {
        scope.rules(Self::RULE_TYPE)
    }
}

impl Rule for PbfRule {
    const RULE_TYPE: &'static str = "pbf";

    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn set_uuid(&mut self, uuid: &str) {
        self.uuid = uuid.to_string();
    }

    fn rules_match(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

crate::register_kind!(PbfRule);
