//! Vulnerability protection security profiles.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Variant};
use crate::objects::threat::{self, Exception, ThreatAction};
use crate::path::{Location, Placement};

const HOSTS: &[&str] = &["any", "client", "server"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityRule {
    pub name: String,
    pub threat_name: String,
    pub cves: Vec<String>,
    /// `any`, `client` or `server`.
    pub host: String,
    pub vendor_ids: Vec<String>,
    pub severities: Vec<String>,
    pub category: String,
    pub packet_capture: String,
    pub action: ThreatAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VulnerabilityProfile {
    pub name: String,
    pub description: String,
    pub rules: Vec<VulnerabilityRule>,
    pub threat_exceptions: Vec<Exception>,
}

impl Object for VulnerabilityProfile {
    const KIND: &'static str = "vulnerability";

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

    fn encode(&self, _variant: Variant) -> Result<XmlNode> {
        let mut entry = codec::entry(&self.name);
        codec::push_text(&mut entry, "description", &self.description);
        if !self.rules.is_empty() {
            let mut list = XmlNode::new("rules");
            for rule in &self.rules {
                if !rule.host.is_empty() && !HOSTS.contains(&rule.host.as_str()) {
                    return Err(Error::encode(
                        "rules",
                        format!("unknown host type '{}' in rule '{}'", rule.host, rule.name),
                    ));
                }
                let mut item = codec::entry(&rule.name);
                codec::push_text(&mut item, "threat-name", &rule.threat_name);
                codec::push_members(&mut item, "cve", &rule.cves);
                codec::push_text(&mut item, "host", &rule.host);
                codec::push_members(&mut item, "vendor-id", &rule.vendor_ids);
                codec::push_members(&mut item, "severity", &rule.severities);
                codec::push_text(&mut item, "category", &rule.category);
                codec::push_text(&mut item, "packet-capture", &rule.packet_capture);
                rule.action.push(&mut item, "rules")?;
                list.push(item);
            }
            entry.push(list);
        }
        threat::push_exceptions(&mut entry, &self.threat_exceptions)?;
        Ok(entry)
    }

    fn decode(node: &XmlNode, _variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let rules = node
            .get_path(&["rules"])
            .map(|list| list.get_children("entry"))
            .unwrap_or_default()
            .into_iter()
            .map(|item| -> Result<VulnerabilityRule> {
                let fields = Some(item);
                Ok(VulnerabilityRule {
                    name: codec::entry_name(item)?,
                    threat_name: codec::text(fields, &["threat-name"]),
                    cves: codec::members(fields, &["cve"]),
                    host: codec::text(fields, &["host"]),
                    vendor_ids: codec::members(fields, &["vendor-id"]),
                    severities: codec::members(fields, &["severity"]),
                    category: codec::text(fields, &["category"]),
                    packet_capture: codec::text(fields, &["packet-capture"]),
                    action: ThreatAction::decode(fields)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            rules,
            threat_exceptions: threat::exceptions(entry)?,
        })
    }
}

impl Entry for VulnerabilityProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("vulnerability".to_string());
        Ok(out)
    }
}

crate::register_kind!(VulnerabilityProfile);
