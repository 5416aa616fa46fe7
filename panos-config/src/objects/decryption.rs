//! Decryption policy rules.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, TargetMap};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::RuleScope;
use crate::rules::Rule;

pub const TYPE_SSL_FORWARD_PROXY: &str = "ssl-forward-proxy";
pub const TYPE_SSH_PROXY: &str = "ssh-proxy";
pub const TYPE_SSL_INBOUND_INSPECTION: &str = "ssl-inbound-inspection";

const TYPES: &[&str] = &[
    TYPE_SSL_FORWARD_PROXY,
    TYPE_SSH_PROXY,
    TYPE_SSL_INBOUND_INSPECTION,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecryptionRule {
    pub name: String,
    /// 9.0+.
    pub uuid: String,
    pub description: String,
    pub source_zones: Vec<String>,
    pub source_addresses: Vec<String>,
    pub negate_source: bool,
    pub source_users: Vec<String>,
    /// 10.0+.
    pub source_hips: Vec<String>,
    pub destination_zones: Vec<String>,
    pub destination_addresses: Vec<String>,
    pub negate_destination: bool,
    /// 10.0+.
    pub destination_hips: Vec<String>,
    pub tags: Vec<String>,
    pub disabled: bool,
    pub services: Vec<String>,
    pub url_categories: Vec<String>,
    /// `decrypt` or `no-decrypt`.
    pub action: String,
    /// `ssl-forward-proxy`, `ssh-proxy` or `ssl-inbound-inspection`.
    pub decryption_type: String,
    /// Inbound inspection only.
    pub ssl_certificate: String,
    pub decryption_profile: String,
    /// 8.1+.
    pub forwarding_profile: String,
    /// 9.0+.
    pub group_tag: String,
    /// 10.0+.
    pub log_successful_tls_handshakes: bool,
    /// Device default is on. 10.0+.
    pub log_failed_tls_handshakes: bool,
    /// 10.0+.
    pub log_setting: String,
    pub target: TargetMap,
    pub negate_target: bool,
}

impl Object for DecryptionRule {
    const KIND: &'static str = "decryption-rule";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(10, 0, 0, Variant::V4),
        Threshold::new(9, 0, 0, Variant::V3),
        Threshold::new(8, 1, 0, Variant::V2),
    ];

    fn name(&self) -> &str {
        &self.name
    }

    fn copy_from(&mut self, src: &Self) {
        let name = std::mem::take(&mut self.name);
        let uuid = std::mem::take(&mut self.uuid);
        *self = Self {
            name,
            uuid,
            ..src.clone()
        };
    }

    fn encode(&self, variant: Variant) -> Result<XmlNode> {
        let mut entry = codec::entry(&self.name);
        if variant >= Variant::V3 && !self.uuid.is_empty() {
            entry = entry.attr("uuid", self.uuid.as_str());
        }
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "from", &self.source_zones);
        codec::push_members(&mut entry, "to", &self.destination_zones);
        codec::push_members(&mut entry, "source", &self.source_addresses);
        codec::push_members(&mut entry, "destination", &self.destination_addresses);
        codec::push_flag(&mut entry, "negate-source", self.negate_source);
        codec::push_flag(&mut entry, "negate-destination", self.negate_destination);
        codec::push_members(&mut entry, "source-user", &self.source_users);
        if variant >= Variant::V4 {
            codec::push_members(&mut entry, "source-hip", &self.source_hips);
            codec::push_members(&mut entry, "destination-hip", &self.destination_hips);
        }
        codec::push_members(&mut entry, "tag", &self.tags);
        codec::push_flag(&mut entry, "disabled", self.disabled);
        codec::push_members(&mut entry, "service", &self.services);
        codec::push_members(&mut entry, "category", &self.url_categories);
        codec::push_text(&mut entry, "action", &self.action);

        match self.decryption_type.as_str() {
            "" => {}
            TYPE_SSL_FORWARD_PROXY | TYPE_SSH_PROXY => {
                entry.push(XmlNode::new("type").child(XmlNode::new(self.decryption_type.as_str())));
            }
            TYPE_SSL_INBOUND_INSPECTION => entry.push(XmlNode::new("type").child(
                XmlNode::with_text(TYPE_SSL_INBOUND_INSPECTION, self.ssl_certificate.as_str()),
            )),
            other => {
                return Err(Error::encode(
                    "decryption_type",
                    format!("unknown decryption type '{other}'"),
                ))
            }
        }

        codec::push_text(&mut entry, "profile", &self.decryption_profile);
        if variant >= Variant::V2 {
            codec::push_text(&mut entry, "forwarding-profile", &self.forwarding_profile);
        }
        if variant >= Variant::V3 {
            codec::push_text(&mut entry, "group-tag", &self.group_tag);
        }
        if variant >= Variant::V4 {
            codec::push_flag(&mut entry, "log-success", self.log_successful_tls_handshakes);
            codec::push_bool(&mut entry, "log-fail", self.log_failed_tls_handshakes);
            codec::push_text(&mut entry, "log-setting", &self.log_setting);
        }
        codec::push_target(&mut entry, &self.target, self.negate_target);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let (target, negate_target) = codec::target(entry);
        let mut rule = Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            source_zones: codec::members(entry, &["from"]),
            destination_zones: codec::members(entry, &["to"]),
            source_addresses: codec::members(entry, &["source"]),
            destination_addresses: codec::members(entry, &["destination"]),
            negate_source: codec::flag(entry, &["negate-source"]),
            negate_destination: codec::flag(entry, &["negate-destination"]),
            source_users: codec::members(entry, &["source-user"]),
            tags: codec::members(entry, &["tag"]),
            disabled: codec::flag(entry, &["disabled"]),
            services: codec::members(entry, &["service"]),
            url_categories: codec::members(entry, &["category"]),
            action: codec::text(entry, &["action"]),
            decryption_profile: codec::text(entry, &["profile"]),
            target,
            negate_target,
            ..Self::default()
        };

        if let Some(kind) = codec::choice(node.get_child("type"), TYPES) {
            rule.decryption_type = kind.tag.clone();
            if kind.tag == TYPE_SSL_INBOUND_INSPECTION {
                rule.ssl_certificate = codec::text(Some(kind), &[]);
            }
        }
        if variant >= Variant::V2 {
            rule.forwarding_profile = codec::text(entry, &["forwarding-profile"]);
        }
        if variant >= Variant::V3 {
            rule.uuid = node.get_attr("uuid").unwrap_or_default().to_string();
            rule.group_tag = codec::text(entry, &["group-tag"]);
        }
        if variant >= Variant::V4 {
            rule.source_hips = codec::members(entry, &["source-hip"]);
            rule.destination_hips = codec::members(entry, &["destination-hip"]);
            rule.log_successful_tls_handshakes = codec::flag(entry, &["log-success"]);
            rule.log_failed_tls_handshakes = codec::bool_or(entry, &["log-fail"], true);
            rule.log_setting = codec::text(entry, &["log-setting"]);
        }
        Ok(rule)
    }
}

impl DecryptionRule {
    /// Copy with the uuid cleared and unordered lists sorted.
    fn canonical(&self) -> Self {
        let mut out = self.clone();
        out.uuid.clear();
        for list in [
            &mut out.source_zones,
            &mut out.destination_zones,
            &mut out.source_addresses,
            &mut out.destination_addresses,
            &mut out.source_users,
            &mut out.source_hips,
            &mut out.destination_hips,
            &mut out.tags,
            &mut out.services,
            &mut out.url_categories,
        ] {
            list.sort();
        }
        for vsys in out.target.values_mut() {
            vsys.sort();
        }
        out
    }
}

impl Entry for DecryptionRule {
    type Scope = RuleScope;

    fn container(scope: &RuleScope) -> Result<Vec<String>> {
        scope.rules(Self::RULE_TYPE)
    }
}

impl Rule for DecryptionRule {
    const RULE_TYPE: &'static str = "decryption";

    fn uuid(&self) -> &str {
        &self.uuid
    }

    fn set_uuid(&mut self, uuid: &str) {
        self.uuid = uuid.to_string();
    }

    fn rules_match(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }
}

crate::register_kind!(DecryptionRule);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::{parse_str, write_compact};

    use super::*;
    use crate::object::specify;
    use crate::version::Version;

    fn rule() -> DecryptionRule {
        DecryptionRule {
            name: "decrypt-outbound".to_string(),
            description: "outbound inspection".to_string(),
            source_zones: vec!["trust".to_string()],
            destination_zones: vec!["untrust".to_string()],
            source_addresses: vec!["any".to_string()],
            destination_addresses: vec!["any".to_string()],
            source_users: vec!["any".to_string()],
            services: vec!["service-https".to_string()],
            url_categories: vec!["any".to_string()],
            tags: vec!["decrypt".to_string()],
            action: "decrypt".to_string(),
            decryption_type: TYPE_SSL_FORWARD_PROXY.to_string(),
            decryption_profile: "default".to_string(),
            ..DecryptionRule::default()
        }
    }

    fn v4_rule() -> DecryptionRule {
        DecryptionRule {
            uuid: "2a4c9b34-6f5e-4b7a-9d1e-8f0c3a2b1d00".to_string(),
            forwarding_profile: "fwd".to_string(),
            group_tag: "web".to_string(),
            source_hips: vec!["managed".to_string()],
            destination_hips: vec!["any".to_string()],
            log_successful_tls_handshakes: true,
            log_failed_tls_handshakes: true,
            log_setting: "default".to_string(),
            ..rule()
        }
    }

    fn version(raw: &str) -> Version {
        raw.parse().expect("version")
    }

    #[test]
    fn selector_picks_the_variant_per_firmware() {
        for (firmware, variant) in [
            ("10.0.0", Variant::V4),
            ("9.0.0", Variant::V3),
            ("8.1.0", Variant::V2),
            ("8.0.0", Variant::V1),
        ] {
            let (container, encoder) = specify::<DecryptionRule>(&version(firmware));
            assert_eq!(container.variant(), variant, "{firmware}");
            assert_eq!(encoder.variant(), variant, "{firmware}");
        }
    }

    #[test]
    fn newer_variants_add_fields() {
        let record = v4_rule();
        let xml = |variant| write_compact(&record.encode(variant).expect("encode")).expect("write");

        let v4 = xml(Variant::V4);
        assert!(v4.contains(r#"uuid="2a4c9b34-6f5e-4b7a-9d1e-8f0c3a2b1d00""#));
        assert!(v4.contains("<source-hip><member>managed</member></source-hip>"));
        assert!(v4.contains("<log-success>yes</log-success>"));
        assert!(v4.contains("<log-fail>yes</log-fail>"));
        assert!(v4.contains("<log-setting>default</log-setting>"));

        let v3 = xml(Variant::V3);
        assert!(v3.contains("uuid="));
        assert!(!v3.contains("source-hip"));
        assert!(!v3.contains("log-success"));

        let v2 = xml(Variant::V2);
        assert!(!v2.contains("uuid="));
        assert!(v2.contains("<forwarding-profile>fwd</forwarding-profile>"));

        let v1 = xml(Variant::V1);
        assert!(!v1.contains("forwarding-profile"));
    }

    #[test]
    fn round_trips_every_variant() {
        let v2 = DecryptionRule {
            forwarding_profile: "fwd".to_string(),
            ..rule()
        };
        let v3 = DecryptionRule {
            uuid: "2a4c9b34-6f5e-4b7a-9d1e-8f0c3a2b1d00".to_string(),
            group_tag: "web".to_string(),
            ..v2.clone()
        };
        let inbound = DecryptionRule {
            name: "inbound".to_string(),
            decryption_type: TYPE_SSL_INBOUND_INSPECTION.to_string(),
            ssl_certificate: "web-cert".to_string(),
            log_failed_tls_handshakes: false,
            ..v4_rule()
        };
        for (record, variant) in [
            (rule(), Variant::V1),
            (v2, Variant::V2),
            (v3, Variant::V3),
            (v4_rule(), Variant::V4),
            (inbound, Variant::V4),
        ] {
            let node = record.encode(variant).expect("encode");
            assert_eq!(node.get_attr("name"), Some(record.name.as_str()));
            assert_eq!(DecryptionRule::decode(&node, variant).expect("decode"), record);
        }
    }

    #[test]
    fn failed_handshake_logging_defaults_on() {
        let node = parse_str(r#"<entry name="r"><action>decrypt</action></entry>"#).expect("parse");
        assert!(DecryptionRule::decode(&node, Variant::V4).expect("decode").log_failed_tls_handshakes);
        assert!(!DecryptionRule::decode(&node, Variant::V3).expect("decode").log_failed_tls_handshakes);
    }

    #[test]
    fn matching_ignores_uuid_and_list_order() {
        let a = v4_rule();
        let mut b = a.clone();
        b.uuid.clear();
        b.source_zones = vec!["dmz".to_string(), "trust".to_string()];
        assert!(!a.rules_match(&b));

        let mut a2 = a.clone();
        a2.source_zones = vec!["trust".to_string(), "dmz".to_string()];
        assert!(a2.rules_match(&b));

        b.action = "no-decrypt".to_string();
        assert!(!a2.rules_match(&b));
    }

    #[test]
    fn copy_keeps_identity() {
        let src = v4_rule();
        let mut dst = DecryptionRule {
            name: "other".to_string(),
            uuid: "00000000-0000-0000-0000-000000000001".to_string(),
            ..DecryptionRule::default()
        };
        dst.copy_from(&src);
        dst.tags.push("extra".to_string());
        assert_eq!(dst.name, "other");
        assert_eq!(dst.uuid, "00000000-0000-0000-0000-000000000001");
        assert_eq!(dst.action, "decrypt");
        assert_eq!(src.tags, vec!["decrypt".to_string()]);
    }

    #[test]
    fn rules_live_in_the_decryption_rulebase() {
        let path = DecryptionRule::container(&RuleScope::vsys("vsys1")).expect("container");
        assert_eq!(path.last().map(String::as_str), Some("rules"));
        assert_eq!(path[path.len() - 2], "decryption");
    }
}
