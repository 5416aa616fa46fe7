//! Physical ethernet interfaces.
//!
//! Creating an interface through a scope that names a vsys also imports it
//! into that vsys; deleting it removes the import first.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::layer3::Layer3;
use crate::path::InterfaceScope;

pub const MODE_LAYER3: &str = "layer3";
pub const MODE_LAYER2: &str = "layer2";
pub const MODE_VIRTUAL_WIRE: &str = "virtual-wire";
pub const MODE_TAP: &str = "tap";
pub const MODE_HA: &str = "ha";
pub const MODE_DECRYPT_MIRROR: &str = "decrypt-mirror";
pub const MODE_AGGREGATE_GROUP: &str = "aggregate-group";

const MODES: &[&str] = &[
    MODE_LAYER3,
    MODE_LAYER2,
    MODE_VIRTUAL_WIRE,
    MODE_TAP,
    MODE_HA,
    MODE_DECRYPT_MIRROR,
    MODE_AGGREGATE_GROUP,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ethernet {
    pub name: String,
    pub mode: String,
    /// Layer-3 mode only.
    #[serde(flatten)]
    pub layer3: Layer3,
    /// Layer-2, layer-3 and virtual-wire modes.
    pub netflow_profile: String,
    pub lldp_enabled: bool,
    pub lldp_profile: String,
    /// Parent bundle in aggregate-group mode.
    pub aggregate_group: String,
    pub link_speed: String,
    pub link_duplex: String,
    pub link_state: String,
    pub comment: String,
    /// `arp`, `ndp`, `v6adr`, and `ddns` (9.0+).
    pub raw: RawXml,
}

impl Object for Ethernet {
    const KIND: &'static str = "ethernet";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(9, 0, 0, Variant::V3),
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

        match self.mode.as_str() {
            "" => {}
            MODE_LAYER3 => {
                let mut layer3 = XmlNode::new(MODE_LAYER3);
                self.layer3.encode_into(&mut layer3, &self.raw, variant)?;
                self.encode_switching(&mut layer3);
                if variant >= Variant::V3 {
                    codec::push_raw(&mut layer3, "ddns-config", &self.raw, "ddns")?;
                }
                entry.push(layer3);
            }
            MODE_LAYER2 | MODE_VIRTUAL_WIRE => {
                let mut mode = XmlNode::new(self.mode.as_str());
                self.encode_switching(&mut mode);
                entry.push(mode);
            }
            MODE_AGGREGATE_GROUP => {
                entry.push(XmlNode::with_text(MODE_AGGREGATE_GROUP, self.aggregate_group.as_str()));
            }
            MODE_TAP | MODE_HA | MODE_DECRYPT_MIRROR => codec::push_marker(&mut entry, &self.mode),
            other => {
                return Err(Error::encode("mode", format!("unknown interface mode '{other}'")))
            }
        }

        codec::push_text(&mut entry, "link-speed", &self.link_speed);
        codec::push_text(&mut entry, "link-duplex", &self.link_duplex);
        codec::push_text(&mut entry, "link-state", &self.link_state);
        codec::push_text(&mut entry, "comment", &self.comment);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let mut eth = Self {
            name: codec::entry_name(node)?,
            link_speed: codec::text(Some(node), &["link-speed"]),
            link_duplex: codec::text(Some(node), &["link-duplex"]),
            link_state: codec::text(Some(node), &["link-state"]),
            comment: codec::free_text(Some(node), &["comment"]),
            ..Self::default()
        };

        let Some(mode) = codec::choice(Some(node), MODES) else {
            return Ok(eth);
        };
        eth.mode = mode.tag.clone();
        match mode.tag.as_str() {
            MODE_LAYER3 => {
                eth.layer3 = Layer3::decode(Some(mode), &mut eth.raw, variant)?;
                eth.decode_switching(mode);
                if variant >= Variant::V3 {
                    codec::capture_raw(Some(mode), "ddns-config", "ddns", &mut eth.raw)?;
                }
            }
            MODE_LAYER2 | MODE_VIRTUAL_WIRE => eth.decode_switching(mode),
            MODE_AGGREGATE_GROUP => eth.aggregate_group = codec::text(Some(mode), &[]),
            _ => {}
        }
        Ok(eth)
    }
}

impl Ethernet {
    fn encode_switching(&self, parent: &mut XmlNode) {
        codec::push_text(parent, "netflow-profile", &self.netflow_profile);
        let mut lldp = XmlNode::new("lldp");
        codec::push_flag(&mut lldp, "enable", self.lldp_enabled);
        codec::push_text(&mut lldp, "profile", &self.lldp_profile);
        parent.push_populated(lldp);
    }

    fn decode_switching(&mut self, mode: &XmlNode) {
        self.netflow_profile = codec::text(Some(mode), &["netflow-profile"]);
        self.lldp_enabled = codec::flag(Some(mode), &["lldp", "enable"]);
        self.lldp_profile = codec::text(Some(mode), &["lldp", "profile"]);
    }
}

impl Entry for Ethernet {
    type Scope = InterfaceScope;

    fn container(scope: &InterfaceScope) -> Result<Vec<String>> {
        scope.interfaces("ethernet")
    }

    fn import_vsys(scope: &InterfaceScope) -> Result<Option<String>> {
        scope.import_target()
    }
}

crate::register_kind!(Ethernet);
