//! Security zones.
//!
//! The zone mode is a tag-presence choice under `<network>`; the interface
//! list lives inside the chosen mode element.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::{Location, Placement};

pub const MODE_LAYER2: &str = "layer2";
pub const MODE_LAYER3: &str = "layer3";
pub const MODE_VIRTUAL_WIRE: &str = "virtual-wire";
pub const MODE_TAP: &str = "tap";
pub const MODE_EXTERNAL: &str = "external";
pub const MODE_TUNNEL: &str = "tunnel";

/// Declared order; the decoder takes the first one present.
const MODES: &[&str] = &[
    MODE_TAP,
    MODE_VIRTUAL_WIRE,
    MODE_LAYER2,
    MODE_LAYER3,
    MODE_EXTERNAL,
    MODE_TUNNEL,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Zone {
    pub name: String,
    pub mode: String,
    pub interfaces: Vec<String>,
    pub zone_profile: String,
    pub log_setting: String,
    pub enable_user_id: bool,
    pub include_acls: Vec<String>,
    pub exclude_acls: Vec<String>,
    /// 8.0+.
    pub enable_packet_buffer_protection: bool,
    /// 10.0+.
    pub enable_device_identification: bool,
    /// 10.0+.
    pub device_include_acls: Vec<String>,
    /// 10.0+.
    pub device_exclude_acls: Vec<String>,
}

impl Object for Zone {
    const KIND: &'static str = "zone";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(10, 0, 0, Variant::V3),
        Threshold::new(8, 0, 0, Variant::V2),
    ];

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

        let mut network = XmlNode::new("network");
        if !self.mode.is_empty() {
            if !MODES.contains(&self.mode.as_str()) {
                return Err(Error::encode("mode", format!("unknown zone mode '{}'", self.mode)));
            }
            let mut mode = XmlNode::new(self.mode.as_str());
            for iface in &self.interfaces {
                mode.push(XmlNode::with_text("member", iface.as_str()));
            }
            network.push(mode);
        }
        codec::push_text(&mut network, "zone-protection-profile", &self.zone_profile);
        codec::push_text(&mut network, "log-setting", &self.log_setting);
        if variant >= Variant::V2 {
            codec::push_flag(
                &mut network,
                "enable-packet-buffer-protection",
                self.enable_packet_buffer_protection,
            );
        }
        entry.push_populated(network);

        codec::push_flag(&mut entry, "enable-user-identification", self.enable_user_id);
        entry.push_populated(acl("user-acl", &self.include_acls, &self.exclude_acls));

        if variant >= Variant::V3 {
            codec::push_flag(
                &mut entry,
                "enable-device-identification",
                self.enable_device_identification,
            );
            entry.push_populated(acl(
                "device-acl",
                &self.device_include_acls,
                &self.device_exclude_acls,
            ));
        }

        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let network = node.get_child("network");
        let mode = codec::choice(network, MODES);

        let mut zone = Self {
            name: codec::entry_name(node)?,
            mode: mode.map(|m| m.tag.clone()).unwrap_or_default(),
            interfaces: codec::members(mode, &[]),
            zone_profile: codec::text(network, &["zone-protection-profile"]),
            log_setting: codec::text(network, &["log-setting"]),
            enable_user_id: codec::flag(Some(node), &["enable-user-identification"]),
            include_acls: codec::members(Some(node), &["user-acl", "include-list"]),
            exclude_acls: codec::members(Some(node), &["user-acl", "exclude-list"]),
            ..Self::default()
        };
        if variant >= Variant::V2 {
            zone.enable_packet_buffer_protection =
                codec::flag(network, &["enable-packet-buffer-protection"]);
        }
        if variant >= Variant::V3 {
            zone.enable_device_identification =
                codec::flag(Some(node), &["enable-device-identification"]);
            zone.device_include_acls =
                codec::members(Some(node), &["device-acl", "include-list"]);
            zone.device_exclude_acls =
                codec::members(Some(node), &["device-acl", "exclude-list"]);
        }
        Ok(zone)
    }
}

impl Entry for Zone {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::VSYS_NETWORK)?;
        out.push("zone".to_string());
        Ok(out)
    }
}

fn acl(tag: &str, include: &[String], exclude: &[String]) -> XmlNode {
    let mut node = XmlNode::new(tag);
    codec::push_members(&mut node, "include-list", include);
    codec::push_members(&mut node, "exclude-list", exclude);
    node
}

crate::register_kind!(Zone);
