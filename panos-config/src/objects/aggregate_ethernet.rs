//! Aggregate ethernet bundles (`ae1`, `ae2`, ...).
//!
//! Member ports join a bundle through [`Ethernet`](super::Ethernet) in
//! `aggregate-group` mode; LACP settings are kept opaque.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::ethernet::{
    MODE_DECRYPT_MIRROR, MODE_HA, MODE_LAYER2, MODE_LAYER3, MODE_VIRTUAL_WIRE,
};
use crate::objects::layer3::Layer3;
use crate::path::InterfaceScope;

const MODES: &[&str] = &[
    MODE_LAYER3,
    MODE_LAYER2,
    MODE_VIRTUAL_WIRE,
    MODE_HA,
    MODE_DECRYPT_MIRROR,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateEthernet {
    pub name: String,
    pub mode: String,
    /// Layer-3 mode only.
    #[serde(flatten)]
    pub layer3: Layer3,
    pub netflow_profile: String,
    pub lldp_enabled: bool,
    pub lldp_profile: String,
    pub comment: String,
    /// `lacp` (layer-2 and layer-3 modes), `arp`, `ndp`, `v6adr`, and `ddns`
    /// (9.0+).
    pub raw: RawXml,
}

impl Object for AggregateEthernet {
    const KIND: &'static str = "aggregate-ethernet";
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
                self.encode_switching(&mut layer3)?;
                if variant >= Variant::V3 {
                    codec::push_raw(&mut layer3, "ddns-config", &self.raw, "ddns")?;
                }
                entry.push(layer3);
            }
            MODE_LAYER2 => {
                let mut layer2 = XmlNode::new(MODE_LAYER2);
                self.encode_switching(&mut layer2)?;
                entry.push(layer2);
            }
            MODE_VIRTUAL_WIRE => {
                let mut wire = XmlNode::new(MODE_VIRTUAL_WIRE);
                codec::push_text(&mut wire, "netflow-profile", &self.netflow_profile);
                self.push_lldp(&mut wire);
                entry.push(wire);
            }
            MODE_HA | MODE_DECRYPT_MIRROR => codec::push_marker(&mut entry, &self.mode),
            other => {
                return Err(Error::encode(
                    "mode",
                    format!("unknown aggregate interface mode '{other}'"),
                ))
            }
        }
        codec::push_text(&mut entry, "comment", &self.comment);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let mut ae = Self {
            name: codec::entry_name(node)?,
            comment: codec::free_text(Some(node), &["comment"]),
            ..Self::default()
        };
        let Some(mode) = codec::choice(Some(node), MODES) else {
            return Ok(ae);
        };
        ae.mode = mode.tag.clone();
        let inner = Some(mode);
        match mode.tag.as_str() {
            MODE_LAYER3 | MODE_LAYER2 | MODE_VIRTUAL_WIRE => {
                if mode.tag == MODE_LAYER3 {
                    ae.layer3 = Layer3::decode(inner, &mut ae.raw, variant)?;
                    if variant >= Variant::V3 {
                        codec::capture_raw(inner, "ddns-config", "ddns", &mut ae.raw)?;
                    }
                }
                if mode.tag != MODE_VIRTUAL_WIRE {
                    codec::capture_raw(inner, "lacp", "lacp", &mut ae.raw)?;
                }
                ae.netflow_profile = codec::text(inner, &["netflow-profile"]);
                ae.lldp_enabled = codec::flag(inner, &["lldp", "enable"]);
                ae.lldp_profile = codec::text(inner, &["lldp", "profile"]);
            }
            _ => {}
        }
        Ok(ae)
    }
}

impl AggregateEthernet {
    fn encode_switching(&self, parent: &mut XmlNode) -> Result<()> {
        codec::push_raw(parent, "lacp", &self.raw, "lacp")?;
        codec::push_text(parent, "netflow-profile", &self.netflow_profile);
        self.push_lldp(parent);
        Ok(())
    }

    fn push_lldp(&self, parent: &mut XmlNode) {
        let mut lldp = XmlNode::new("lldp");
        codec::push_flag(&mut lldp, "enable", self.lldp_enabled);
        codec::push_text(&mut lldp, "profile", &self.lldp_profile);
        parent.push_populated(lldp);
    }
}

impl Entry for AggregateEthernet {
    type Scope = InterfaceScope;

    fn container(scope: &InterfaceScope) -> Result<Vec<String>> {
        scope.interfaces("aggregate-ethernet")
    }

    fn import_vsys(scope: &InterfaceScope) -> Result<Option<String>> {
        scope.import_target()
    }
}

crate::register_kind!(AggregateEthernet);
