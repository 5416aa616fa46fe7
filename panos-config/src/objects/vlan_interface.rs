//! VLAN interface units (`vlan.N`): the layer-3 side of a layer-2 VLAN.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::Result;
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::layer3::Layer3;
use crate::path::InterfaceScope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VlanInterface {
    pub name: String,
    #[serde(flatten)]
    pub layer3: Layer3,
    pub netflow_profile: String,
    pub comment: String,
    /// `arp`, `ndp`, `v6adr`.
    pub raw: RawXml,
}

impl Object for VlanInterface {
    const KIND: &'static str = "vlan-interface";
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
        self.layer3.encode_into(&mut entry, &self.raw, variant)?;
        codec::push_text(&mut entry, "netflow-profile", &self.netflow_profile);
        codec::push_text(&mut entry, "comment", &self.comment);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let mut unit = Self {
            name: codec::entry_name(node)?,
            netflow_profile: codec::text(Some(node), &["netflow-profile"]),
            comment: codec::free_text(Some(node), &["comment"]),
            ..Self::default()
        };
        unit.layer3 = Layer3::decode(Some(node), &mut unit.raw, variant)?;
        Ok(unit)
    }
}

impl Entry for VlanInterface {
    type Scope = InterfaceScope;

    fn container(scope: &InterfaceScope) -> Result<Vec<String>> {
        let mut out = scope.interfaces("vlan")?;
        out.push("units".to_string());
        Ok(out)
    }

    fn import_vsys(scope: &InterfaceScope) -> Result<Option<String>> {
        scope.import_target()
    }
}

crate::register_kind!(VlanInterface);
