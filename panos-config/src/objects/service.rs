//! Service objects. PAN-OS 8.1 added per-service session timeout overrides.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::{Location, Placement};

pub const TCP: &str = "tcp";
pub const UDP: &str = "udp";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Service {
    pub name: String,
    pub description: String,
    pub protocol: String,
    pub source_port: String,
    pub destination_port: String,
    pub tags: Vec<String>,
    /// Zero timeouts are legal once overriding, so the override itself is
    /// a separate flag. 8.1+.
    pub override_session_timeout: bool,
    pub override_timeout: u32,
    /// TCP only.
    pub override_half_closed_timeout: u32,
    /// TCP only.
    pub override_time_wait_timeout: u32,
}

impl Object for Service {
    const KIND: &'static str = "service";
    const THRESHOLDS: &'static [Threshold] = &[Threshold::new(8, 1, 0, Variant::V2)];

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

        match self.protocol.as_str() {
            "" => {}
            TCP | UDP => {
                let mut proto = XmlNode::new(self.protocol.as_str());
                codec::push_text(&mut proto, "port", &self.destination_port);
                codec::push_text(&mut proto, "source-port", &self.source_port);
                if variant >= Variant::V2 && self.override_session_timeout {
                    let mut yes = XmlNode::new("yes");
                    codec::push_int(&mut yes, "timeout", self.override_timeout);
                    if self.protocol == TCP {
                        codec::push_int(&mut yes, "halfclose-timeout", self.override_half_closed_timeout);
                        codec::push_int(&mut yes, "timewait-timeout", self.override_time_wait_timeout);
                    }
                    proto.push(XmlNode::new("override").child(yes));
                }
                entry.push(XmlNode::new("protocol").child(proto));
            }
            other => {
                return Err(Error::encode(
                    "protocol",
                    format!("expected tcp or udp, got '{other}'"),
                ))
            }
        }

        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "tag", &self.tags);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let proto = codec::choice(node.get_child("protocol"), &[TCP, UDP]);
        let mut service = Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(Some(node), &["description"]),
            protocol: proto.map(|p| p.tag.clone()).unwrap_or_default(),
            source_port: codec::text(proto, &["source-port"]),
            destination_port: codec::text(proto, &["port"]),
            tags: codec::members(Some(node), &["tag"]),
            ..Self::default()
        };

        if variant >= Variant::V2 {
            if let Some(yes) = proto.and_then(|p| p.get_path(&["override", "yes"])) {
                service.override_session_timeout = true;
                service.override_timeout = codec::int(Some(yes), &["timeout"])?;
                service.override_half_closed_timeout = codec::int(Some(yes), &["halfclose-timeout"])?;
                service.override_time_wait_timeout = codec::int(Some(yes), &["timewait-timeout"])?;
            }
        }
        Ok(service)
    }
}

impl Entry for Service {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("service".to_string());
        Ok(out)
    }
}

crate::register_kind!(Service);
