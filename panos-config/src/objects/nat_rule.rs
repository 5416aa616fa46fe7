//! NAT policy rules.
//!
//! Source translation is one of three choices, each with its own address
//! shape. PAN-OS 8.1 added dynamic destination translation; PAN-OS 9.0 added
//! the rule uuid and group tag.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml, TargetMap};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::RuleScope;
use crate::rules::Rule;

pub const NAT_IPV4: &str = "ipv4";
pub const NAT_64: &str = "nat64";
pub const NPTV6: &str = "nptv6";

pub const DYNAMIC_IP_AND_PORT: &str = "dynamic-ip-and-port";
pub const DYNAMIC_IP: &str = "dynamic-ip";
pub const STATIC_IP: &str = "static-ip";

pub const TRANSLATED_ADDRESS: &str = "translated-address";
pub const INTERFACE_ADDRESS: &str = "interface-address";

pub const DAT_STATIC: &str = "static";
pub const DAT_DYNAMIC: &str = "dynamic";

const NAT_TYPES: &[&str] = &[NAT_IPV4, NAT_64, NPTV6];
const SOURCE_TYPES: &[&str] = &[DYNAMIC_IP_AND_PORT, DYNAMIC_IP, STATIC_IP];
const DISTRIBUTIONS: &[&str] = &[
    "round-robin",
    "source-ip-hash",
    "ip-modulo",
    "ip-hash",
    "least-sessions",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NatRule {
    pub name: String,
    /// 9.0+.
    pub uuid: String,
    pub description: String,
    /// `ipv4`, `nat64` or `nptv6`.
    pub nat_type: String,
    pub source_zones: Vec<String>,
    /// NAT rules take exactly one destination zone.
    pub destination_zone: String,
    pub to_interface: String,
    pub service: String,
    pub source_addresses: Vec<String>,
    pub destination_addresses: Vec<String>,
    /// `dynamic-ip-and-port`, `dynamic-ip`, `static-ip`, or empty for none.
    pub sat_type: String,
    /// Dynamic IP and port only: `translated-address` or `interface-address`.
    pub sat_address_type: String,
    pub sat_translated_addresses: Vec<String>,
    pub sat_interface: String,
    pub sat_ip_address: String,
    /// Static IP only.
    pub sat_static_translated_address: String,
    /// Static IP only.
    pub sat_static_bi_directional: bool,
    /// `static`, `dynamic` (8.1+), or empty for none.
    pub dat_type: String,
    pub dat_address: String,
    pub dat_port: u32,
    /// Dynamic destination translation only.
    pub dat_distribution: String,
    pub active_active_device_binding: String,
    pub tags: Vec<String>,
    pub disabled: bool,
    /// 9.0+.
    pub group_tag: String,
    pub target: TargetMap,
    pub negate_target: bool,
    /// `fallback`: dynamic-ip fallback block.
    pub raw: RawXml,
}

impl Object for NatRule {
    const KIND: &'static str = "nat-rule";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(9, 0, 0, Variant::V3),
        Threshold::new(8, 1, 0, Variant::V2),
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
        if variant >= Variant::V3 && !self.uuid.is_empty() {
            entry = entry.attr("uuid", self.uuid.as_str());
        }
        if !self.nat_type.is_empty() && !NAT_TYPES.contains(&self.nat_type.as_str()) {
            return Err(Error::encode(
                "nat_type",
                format!("unknown nat type '{}'", self.nat_type),
            ));
        }

        if let Some(source) = self.encode_source_translation()? {
            entry.push(source);
        }
        if let Some(destination) = self.encode_destination_translation(variant)? {
            entry.push(destination);
        }

        let to: Vec<String> = Some(self.destination_zone.clone())
            .filter(|zone| !zone.is_empty())
            .into_iter()
            .collect();
        codec::push_members(&mut entry, "to", &to);
        codec::push_members(&mut entry, "from", &self.source_zones);
        codec::push_members(&mut entry, "source", &self.source_addresses);
        codec::push_members(&mut entry, "destination", &self.destination_addresses);
        codec::push_text(&mut entry, "service", &self.service);
        codec::push_text(&mut entry, "nat-type", &self.nat_type);
        codec::push_text(&mut entry, "to-interface", &self.to_interface);
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "tag", &self.tags);
        codec::push_flag(&mut entry, "disabled", self.disabled);
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
            description: codec::free_text(entry, &["description"]),
            nat_type: codec::text(entry, &["nat-type"]),
            source_zones: codec::members(entry, &["from"]),
            destination_zone: codec::members(entry, &["to"])
                .into_iter()
                .next()
                .unwrap_or_default(),
            to_interface: codec::text(entry, &["to-interface"]),
            service: codec::text(entry, &["service"]),
            source_addresses: codec::members(entry, &["source"]),
            destination_addresses: codec::members(entry, &["destination"]),
            active_active_device_binding: codec::text(entry, &["active-active-device-binding"]),
            tags: codec::members(entry, &["tag"]),
            disabled: codec::flag(entry, &["disabled"]),
            target,
            negate_target,
            ..Self::default()
        };

        rule.decode_source_translation(node.get_child("source-translation"))?;

        if let Some(dat) = node.get_child("destination-translation") {
            rule.dat_type = DAT_STATIC.to_string();
            rule.dat_address = codec::text(Some(dat), &["translated-address"]);
            rule.dat_port = codec::int(Some(dat), &["translated-port"])?;
        } else if let Some(dat) = node
            .get_child("dynamic-destination-translation")
            .filter(|_| variant >= Variant::V2)
        {
            rule.dat_type = DAT_DYNAMIC.to_string();
            rule.dat_address = codec::text(Some(dat), &["translated-address"]);
            rule.dat_port = codec::int(Some(dat), &["translated-port"])?;
            rule.dat_distribution = codec::text(Some(dat), &["distribution"]);
        }

        if variant >= Variant::V3 {
            rule.uuid = node.get_attr("uuid").unwrap_or_default().to_string();
            rule.group_tag = codec::text(entry, &["group-tag"]);
        }
        Ok(rule)
    }
}

impl NatRule {
    fn encode_source_translation(&self) -> Result<Option<XmlNode>> {
        let kind = match self.sat_type.as_str() {
            "" => return Ok(None),
            DYNAMIC_IP_AND_PORT => {
                let mut node = XmlNode::new(DYNAMIC_IP_AND_PORT);
                match self.sat_address_type.as_str() {
                    TRANSLATED_ADDRESS => codec::push_members(
                        &mut node,
                        TRANSLATED_ADDRESS,
                        &self.sat_translated_addresses,
                    ),
                    INTERFACE_ADDRESS => {
                        let mut interface = XmlNode::new(INTERFACE_ADDRESS);
                        codec::push_text(&mut interface, "interface", &self.sat_interface);
                        codec::push_text(&mut interface, "ip", &self.sat_ip_address);
                        node.push(interface);
                    }
                    other => {
                        return Err(Error::encode(
                            "sat_address_type",
                            format!("unknown translated address type '{other}'"),
                        ))
                    }
                }
                node
            }
            DYNAMIC_IP => {
                let mut node = XmlNode::new(DYNAMIC_IP);
                codec::push_members(&mut node, TRANSLATED_ADDRESS, &self.sat_translated_addresses);
                codec::push_raw(&mut node, "fallback", &self.raw, "fallback")?;
                node
            }
            STATIC_IP => {
                let mut node = XmlNode::new(STATIC_IP);
                codec::push_text(&mut node, TRANSLATED_ADDRESS, &self.sat_static_translated_address);
                codec::push_flag(&mut node, "bi-directional", self.sat_static_bi_directional);
                node
            }
            other => {
                return Err(Error::encode(
                    "sat_type",
                    format!("unknown source translation type '{other}'"),
                ))
            }
        };
        Ok(Some(XmlNode::new("source-translation").child(kind)))
    }

    fn decode_source_translation(&mut self, node: Option<&XmlNode>) -> Result<()> {
        let Some(kind) = codec::choice(node, SOURCE_TYPES) else {
            return Ok(());
        };
        let inner = Some(kind);
        self.sat_type = kind.tag.clone();
        match kind.tag.as_str() {
            DYNAMIC_IP_AND_PORT => {
                if let Some(interface) = kind.get_child(INTERFACE_ADDRESS) {
                    self.sat_address_type = INTERFACE_ADDRESS.to_string();
                    self.sat_interface = codec::text(Some(interface), &["interface"]);
                    self.sat_ip_address = codec::text(Some(interface), &["ip"]);
                } else {
                    self.sat_address_type = TRANSLATED_ADDRESS.to_string();
                    self.sat_translated_addresses = codec::members(inner, &[TRANSLATED_ADDRESS]);
                }
            }
            DYNAMIC_IP => {
                self.sat_translated_addresses = codec::members(inner, &[TRANSLATED_ADDRESS]);
                codec::capture_raw(inner, "fallback", "fallback", &mut self.raw)?;
            }
            _ => {
                self.sat_static_translated_address = codec::text(inner, &[TRANSLATED_ADDRESS]);
                self.sat_static_bi_directional = codec::flag(inner, &["bi-directional"]);
            }
        }
        Ok(())
    }

    fn encode_destination_translation(&self, variant: Variant) -> Result<Option<XmlNode>> {
        let mut node = match self.dat_type.as_str() {
            "" => return Ok(None),
            DAT_STATIC => XmlNode::new("destination-translation"),
            DAT_DYNAMIC if variant < Variant::V2 => {
                return Err(Error::encode(
                    "dat_type",
                    "dynamic destination translation needs PAN-OS 8.1 or later",
                ))
            }
            DAT_DYNAMIC => XmlNode::new("dynamic-destination-translation"),
            other => {
                return Err(Error::encode(
                    "dat_type",
                    format!("unknown destination translation type '{other}'"),
                ))
            }
        };
        codec::push_text(&mut node, "translated-address", &self.dat_address);
        codec::push_int(&mut node, "translated-port", self.dat_port);
        if self.dat_type == DAT_DYNAMIC {
            match self.dat_distribution.as_str() {
                "" => {}
                method if DISTRIBUTIONS.contains(&method) => {
                    codec::push_text(&mut node, "distribution", method)
                }
                other => {
                    return Err(Error::encode(
                        "dat_distribution",
                        format!("unknown distribution method '{other}'"),
                    ))
                }
            }
        }
        Ok(Some(node))
    }

    /// Copy with the uuid cleared and unordered lists sorted.
    fn canonical(&self) -> Self {
        let mut out = self.clone();
        out.uuid.clear();
        for list in [
            &mut out.source_zones,
            &mut out.source_addresses,
            &mut out.destination_addresses,
            &mut out.sat_translated_addresses,
            &mut out.tags,
        ] {
            list.sort();
        }
        for vsys in out.target.values_mut() {
            vsys.sort();
        }
        out
    }
}

impl Entry for NatRule {
    type Scope = RuleScope;

    fn container(scope: &RuleScope) -> Result<Vec<String>> {
        scope.rules(Self::RULE_TYPE)
    }
}

impl Rule for NatRule {
    const RULE_TYPE: &'static str = "nat";

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

crate::register_kind!(NatRule);
