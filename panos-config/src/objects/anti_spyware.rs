//! Anti-spyware security profiles.
//!
//! PAN-OS 10.0 moved DNS signature handling to DNS security categories; the
//! category list and the DNS signature lists are both opaque.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::Result;
use crate::object::{Entry, Object, Threshold, Variant};
use crate::objects::threat::{self, Exception, ThreatAction};
use crate::path::{Location, Placement};

/// One signature policy rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpywareRule {
    pub name: String,
    pub threat_name: String,
    pub category: String,
    pub severities: Vec<String>,
    /// `disable`, `single-packet` or `extended-capture`.
    pub packet_capture: String,
    pub action: ThreatAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AntiSpywareProfile {
    pub name: String,
    pub description: String,
    pub rules: Vec<SpywareRule>,
    pub threat_exceptions: Vec<Exception>,
    pub sinkhole_ipv4_address: String,
    pub sinkhole_ipv6_address: String,
    /// `lists`: DNS signature lists; `dns`: dns-security-categories (10.0+).
    pub raw: RawXml,
}

impl Object for AntiSpywareProfile {
    const KIND: &'static str = "anti-spyware";
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

        let mut botnet = XmlNode::new("botnet-domains");
        codec::push_raw(&mut botnet, "lists", &self.raw, "lists")?;
        if variant >= Variant::V2 {
            codec::push_raw(&mut botnet, "dns-security-categories", &self.raw, "dns")?;
        }
        let mut sinkhole = XmlNode::new("sinkhole");
        codec::push_text(&mut sinkhole, "ipv4-address", &self.sinkhole_ipv4_address);
        codec::push_text(&mut sinkhole, "ipv6-address", &self.sinkhole_ipv6_address);
        botnet.push_populated(sinkhole);
        entry.push_populated(botnet);

        if !self.rules.is_empty() {
            let mut list = XmlNode::new("rules");
            for rule in &self.rules {
                let mut item = codec::entry(&rule.name);
                codec::push_text(&mut item, "threat-name", &rule.threat_name);
                codec::push_text(&mut item, "category", &rule.category);
                codec::push_members(&mut item, "severity", &rule.severities);
                codec::push_text(&mut item, "packet-capture", &rule.packet_capture);
                rule.action.push(&mut item, "rules")?;
                list.push(item);
            }
            entry.push(list);
        }
        threat::push_exceptions(&mut entry, &self.threat_exceptions)?;
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let botnet = node.get_child("botnet-domains");
        let rules = node
            .get_path(&["rules"])
            .map(|list| list.get_children("entry"))
            .unwrap_or_default()
            .into_iter()
            .map(|item| -> Result<SpywareRule> {
                let fields = Some(item);
                Ok(SpywareRule {
                    name: codec::entry_name(item)?,
                    threat_name: codec::text(fields, &["threat-name"]),
                    category: codec::text(fields, &["category"]),
                    severities: codec::members(fields, &["severity"]),
                    packet_capture: codec::text(fields, &["packet-capture"]),
                    action: ThreatAction::decode(fields)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut profile = Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            rules,
            threat_exceptions: threat::exceptions(entry)?,
            sinkhole_ipv4_address: codec::text(botnet, &["sinkhole", "ipv4-address"]),
            sinkhole_ipv6_address: codec::text(botnet, &["sinkhole", "ipv6-address"]),
            ..Self::default()
        };
        codec::capture_raw(botnet, "lists", "lists", &mut profile.raw)?;
        if variant >= Variant::V2 {
            codec::capture_raw(botnet, "dns-security-categories", "dns", &mut profile.raw)?;
        }
        Ok(profile)
    }
}

impl Entry for AntiSpywareProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("spyware".to_string());
        Ok(out)
    }
}

crate::register_kind!(AntiSpywareProfile);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::write_compact;

    use super::*;
    use crate::error::Error;
    use crate::objects::threat::ACTION_BLOCK_IP;

    fn profile() -> AntiSpywareProfile {
        AntiSpywareProfile {
            name: "strict-as".to_string(),
            rules: vec![
                SpywareRule {
                    name: "critical".to_string(),
                    threat_name: "any".to_string(),
                    category: "any".to_string(),
                    severities: vec!["critical".to_string(), "high".to_string()],
                    packet_capture: "single-packet".to_string(),
                    action: ThreatAction {
                        action: ACTION_BLOCK_IP.to_string(),
                        track_by: "source".to_string(),
                        duration: 3600,
                    },
                },
                SpywareRule {
                    name: "rest".to_string(),
                    threat_name: "any".to_string(),
                    category: "any".to_string(),
                    severities: vec!["medium".to_string()],
                    action: ThreatAction {
                        action: "reset-both".to_string(),
                        ..ThreatAction::default()
                    },
                    ..SpywareRule::default()
                },
            ],
            sinkhole_ipv4_address: "sinkhole.paloaltonetworks.com".to_string(),
            sinkhole_ipv6_address: "2600:5200::1".to_string(),
            raw: RawXml::from([(
                "lists".to_string(),
                r#"<entry name="default-paloalto-dns"><action><sinkhole/></action></entry>"#
                    .to_string(),
            )]),
            ..AntiSpywareProfile::default()
        }
    }

    #[test]
    fn round_trips_every_variant() {
        let mut v2 = profile();
        v2.raw.insert(
            "dns".to_string(),
            r#"<entry name="pan-dns-sec-malware"><action>sinkhole</action></entry>"#.to_string(),
        );
        for (record, variant) in [(profile(), Variant::V1), (v2, Variant::V2)] {
            let node = record.encode(variant).expect("encode");
            assert_eq!(AntiSpywareProfile::decode(&node, variant).expect("decode"), record);
        }
    }

    #[test]
    fn rules_carry_the_action_choice() {
        let xml = write_compact(&profile().encode(Variant::V1).expect("encode")).expect("write");
        assert!(xml.contains(
            "<action><block-ip><track-by>source</track-by><duration>3600</duration></block-ip></action>"
        ));
        assert!(xml.contains("<action><reset-both/></action>"));
        assert!(xml.contains("<sinkhole><ipv4-address>sinkhole.paloaltonetworks.com</ipv4-address>"));
    }

    #[test]
    fn unknown_rule_action_is_an_encode_error() {
        let mut record = profile();
        record.rules[1].action.action = "sinkhole".to_string();
        let err = record.encode(Variant::V2).expect_err("invalid");
        assert!(matches!(err, Error::Encode { ref field, .. } if field == "rules"));
    }
}
