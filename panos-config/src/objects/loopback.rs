//! Loopback interface units (`loopback.N`).

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::layer3::Layer3;
use crate::path::InterfaceScope;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Loopback {
    pub name: String,
    /// Static addressing only; loopbacks have no DHCP client.
    #[serde(flatten)]
    pub layer3: Layer3,
    pub netflow_profile: String,
    pub comment: String,
    /// `ndp`, `v6adr`.
    pub raw: RawXml,
}

impl Object for Loopback {
    const KIND: &'static str = "loopback";
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
        if self.layer3.enable_dhcp {
            return Err(Error::encode("enable_dhcp", "loopback interfaces have no DHCP client"));
        }
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

impl Entry for Loopback {
    type Scope = InterfaceScope;

    fn container(scope: &InterfaceScope) -> Result<Vec<String>> {
        let mut out = scope.interfaces("loopback")?;
        out.push("units".to_string());
        Ok(out)
    }

    fn import_vsys(scope: &InterfaceScope) -> Result<Option<String>> {
        scope.import_target()
    }
}

crate::register_kind!(Loopback);
