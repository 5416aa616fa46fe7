//! Layer-3 subinterfaces of ethernet and aggregate ethernet ports.
//!
//! On 9.0+ the dynamic DNS tree is read into `raw["ddns"]` but never written
//! back: the encoder for that firmware does not emit `ddns-config`, so an
//! edit through this object leaves the device's DDNS settings to the device.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::Result;
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::layer3::Layer3;
use crate::path::SubinterfaceScope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer3Subinterface {
    pub name: String,
    /// 802.1Q VLAN tag.
    pub tag: u32,
    #[serde(flatten)]
    pub layer3: Layer3,
    pub netflow_profile: String,
    pub comment: String,
    /// `arp`, `ndp`, `v6adr`; `ddns` is read-only.
    pub raw: RawXml,
}

impl Object for Layer3Subinterface {
    const KIND: &'static str = "layer3-subinterface";
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
        codec::push_int(&mut entry, "tag", self.tag);
        self.layer3.encode_into(&mut entry, &self.raw, variant)?;
        codec::push_text(&mut entry, "netflow-profile", &self.netflow_profile);
        codec::push_text(&mut entry, "comment", &self.comment);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let mut sub = Self {
            name: codec::entry_name(node)?,
            tag: codec::int(Some(node), &["tag"])?,
            netflow_profile: codec::text(Some(node), &["netflow-profile"]),
            comment: codec::free_text(Some(node), &["comment"]),
            ..Self::default()
        };
        sub.layer3 = Layer3::decode(Some(node), &mut sub.raw, variant)?;
        if variant >= Variant::V3 {
            codec::capture_raw(Some(node), "ddns-config", "ddns", &mut sub.raw)?;
        }
        Ok(sub)
    }
}

impl Entry for Layer3Subinterface {
    type Scope = SubinterfaceScope;

    fn container(scope: &SubinterfaceScope) -> Result<Vec<String>> {
        scope.root()
    }

    fn import_vsys(scope: &SubinterfaceScope) -> Result<Option<String>> {
        if scope.vsys.is_empty() {
            return Ok(None);
        }
        scope.device.vsys_xpath(&scope.vsys).map(Some)
    }
}

crate::register_kind!(Layer3Subinterface);
