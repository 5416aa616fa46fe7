//! Antivirus security profiles.
//!
//! PAN-OS 10.0 added a machine learning action per decoder and the
//! file-based ML engine list, which is carried as opaque XML.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::Result;
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::threat::{self, Exception};
use crate::path::{Location, Placement};

/// Per-protocol decoder actions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Decoder {
    pub name: String,
    pub action: String,
    pub wildfire_action: String,
    /// 10.0+.
    pub machine_learning_action: String,
}

/// Action override for one application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationException {
    pub application: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntivirusProfile {
    pub name: String,
    pub description: String,
    pub packet_capture: bool,
    pub decoders: Vec<Decoder>,
    pub application_exceptions: Vec<ApplicationException>,
    pub threat_exceptions: Vec<Exception>,
    /// `mlav`: mlav-engine-filebased-enabled (10.0+).
    pub raw: RawXml,
}

impl Object for AntivirusProfile {
    const KIND: &'static str = "antivirus";
    const THRESHOLDS: &'static [Threshold] = &[Threshold::new(10, 0, 0, Variant::V2)];

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
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_flag(&mut entry, "packet-capture", self.packet_capture);

        if !self.decoders.is_empty() {
            let mut list = XmlNode::new("decoder");
            for decoder in &self.decoders {
                let mut item = codec::entry(&decoder.name);
                threat::push_decoder_action(&mut item, "action", "decoders", &decoder.action)?;
                threat::push_decoder_action(
                    &mut item,
                    "wildfire-action",
                    "decoders",
                    &decoder.wildfire_action,
                )?;
                if variant >= Variant::V2 {
                    threat::push_decoder_action(
                        &mut item,
                        "mlav-action",
                        "decoders",
                        &decoder.machine_learning_action,
                    )?;
                }
                list.push(item);
            }
            entry.push(list);
        }

        if !self.application_exceptions.is_empty() {
            let mut list = XmlNode::new("application");
            for exception in &self.application_exceptions {
                let mut item = codec::entry(&exception.application);
                threat::push_decoder_action(
                    &mut item,
                    "action",
                    "application_exceptions",
                    &exception.action,
                )?;
                list.push(item);
            }
            entry.push(list);
        }

        threat::push_exceptions(&mut entry, &self.threat_exceptions)?;
        if variant >= Variant::V2 {
            codec::push_raw(&mut entry, "mlav-engine-filebased-enabled", &self.raw, "mlav")?;
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let decoders = node
            .get_path(&["decoder"])
            .map(|list| list.get_children("entry"))
            .unwrap_or_default()
            .into_iter()
            .map(|item| -> Result<Decoder> {
                let fields = Some(item);
                let mut decoder = Decoder {
                    name: codec::entry_name(item)?,
                    action: codec::text(fields, &["action"]),
                    wildfire_action: codec::text(fields, &["wildfire-action"]),
                    ..Decoder::default()
                };
                if variant >= Variant::V2 {
                    decoder.machine_learning_action = codec::text(fields, &["mlav-action"]);
                }
                Ok(decoder)
            })
            .collect::<Result<Vec<_>>>()?;
        let application_exceptions = node
            .get_path(&["application"])
            .map(|list| list.get_children("entry"))
            .unwrap_or_default()
            .into_iter()
            .map(|item| -> Result<ApplicationException> {
                Ok(ApplicationException {
                    application: codec::entry_name(item)?,
                    action: codec::text(Some(item), &["action"]),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut profile = Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            packet_capture: codec::flag(entry, &["packet-capture"]),
            decoders,
            application_exceptions,
            threat_exceptions: threat::exceptions(entry)?,
            ..Self::default()
        };
        if variant >= Variant::V2 {
            codec::capture_raw(entry, "mlav-engine-filebased-enabled", "mlav", &mut profile.raw)?;
        }
        Ok(profile)
    }
}

impl Entry for AntivirusProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("virus".to_string());
        Ok(out)
    }
}

crate::register_kind!(AntivirusProfile);
