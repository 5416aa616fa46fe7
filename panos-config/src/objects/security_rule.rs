//! Security policy rules.
//!
//! Profiles are attached either as one profile group or as individual
//! profiles under `profile-setting`, never both. PAN-OS 9.0 added the rule
//! uuid and group tag; PAN-OS 10.0 replaced HIP profiles with separate source
//! and destination HIP lists.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, TargetMap};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::RuleScope;
use crate::rules::Rule;

pub const TYPE_UNIVERSAL: &str = "universal";
pub const TYPE_INTRAZONE: &str = "intrazone";
pub const TYPE_INTERZONE: &str = "interzone";

pub const ACTION_ALLOW: &str = "allow";
pub const ACTION_DENY: &str = "deny";
pub const ACTION_DROP: &str = "drop";
pub const ACTION_RESET_CLIENT: &str = "reset-client";
pub const ACTION_RESET_SERVER: &str = "reset-server";
pub const ACTION_RESET_BOTH: &str = "reset-both";

const TYPES: &[&str] = &[TYPE_UNIVERSAL, TYPE_INTRAZONE, TYPE_INTERZONE];
const ACTIONS: &[&str] = &[
    ACTION_ALLOW,
    ACTION_DENY,
    ACTION_DROP,
    ACTION_RESET_CLIENT,
    ACTION_RESET_SERVER,
    ACTION_RESET_BOTH,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityRule {
    pub name: String,
    /// 9.0+.
    pub uuid: String,
    /// `universal`, `intrazone` or `interzone`; empty leaves the device
    /// default (universal).
    pub rule_type: String,
    pub description: String,
    pub tags: Vec<String>,
    pub source_zones: Vec<String>,
    pub destination_zones: Vec<String>,
    pub source_addresses: Vec<String>,
    pub negate_source: bool,
    pub source_users: Vec<String>,
    /// Pre-10.0.
    pub hip_profiles: Vec<String>,
    /// 10.0+.
    pub source_hips: Vec<String>,
    /// 10.0+.
    pub destination_hips: Vec<String>,
    pub destination_addresses: Vec<String>,
    pub negate_destination: bool,
    pub applications: Vec<String>,
    pub services: Vec<String>,
    pub categories: Vec<String>,
    pub action: String,
    pub log_setting: String,
    pub log_start: bool,
    /// Device default is on.
    pub log_end: bool,
    pub disabled: bool,
    pub schedule: String,
    pub icmp_unreachable: bool,
    pub disable_server_response_inspection: bool,
    /// Profile group; exclusive with the individual profiles below.
    pub profile_group: String,
    pub antivirus: String,
    pub anti_spyware: String,
    pub vulnerability: String,
    pub url_filtering: String,
    pub file_blocking: String,
    pub wildfire_analysis: String,
    pub data_filtering: String,
    /// 9.0+.
    pub group_tag: String,
    pub target: TargetMap,
    pub negate_target: bool,
}

impl Object for SecurityRule {
    const KIND: &'static str = "security-rule";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(10, 0, 0, Variant::V3),
        Threshold::new(9, 0, 0, Variant::V2),
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
        if variant >= Variant::V2 && !self.uuid.is_empty() {
            entry = entry.attr("uuid", self.uuid.as_str());
        }
        if !self.rule_type.is_empty() && !TYPES.contains(&self.rule_type.as_str()) {
            return Err(Error::encode(
                "rule_type",
                format!("unknown rule type '{}'", self.rule_type),
            ));
        }
        if !self.action.is_empty() && !ACTIONS.contains(&self.action.as_str()) {
            return Err(Error::encode(
                "action",
                format!("unknown security action '{}'", self.action),
            ));
        }

        codec::push_text(&mut entry, "rule-type", &self.rule_type);
        codec::push_text(&mut entry, "description", &self.description);
        codec::push_members(&mut entry, "tag", &self.tags);
        codec::push_members(&mut entry, "from", &self.source_zones);
        codec::push_members(&mut entry, "to", &self.destination_zones);
        codec::push_members(&mut entry, "source", &self.source_addresses);
        codec::push_flag(&mut entry, "negate-source", self.negate_source);
        codec::push_members(&mut entry, "source-user", &self.source_users);
        if variant >= Variant::V3 {
            codec::push_members(&mut entry, "source-hip", &self.source_hips);
            codec::push_members(&mut entry, "destination-hip", &self.destination_hips);
        } else {
            codec::push_members(&mut entry, "hip-profiles", &self.hip_profiles);
        }
        codec::push_members(&mut entry, "destination", &self.destination_addresses);
        codec::push_flag(&mut entry, "negate-destination", self.negate_destination);
        codec::push_members(&mut entry, "application", &self.applications);
        codec::push_members(&mut entry, "service", &self.services);
        codec::push_members(&mut entry, "category", &self.categories);
        codec::push_text(&mut entry, "action", &self.action);
        codec::push_text(&mut entry, "log-setting", &self.log_setting);
        codec::push_flag(&mut entry, "log-start", self.log_start);
        codec::push_bool(&mut entry, "log-end", self.log_end);
        codec::push_flag(&mut entry, "disabled", self.disabled);
        codec::push_text(&mut entry, "schedule", &self.schedule);
        codec::push_flag(&mut entry, "icmp-unreachable", self.icmp_unreachable);

        let mut option = XmlNode::new("option");
        codec::push_flag(
            &mut option,
            "disable-server-response-inspection",
            self.disable_server_response_inspection,
        );
        entry.push_populated(option);

        if let Some(profiles) = self.encode_profiles()? {
            entry.push(profiles);
        }
        if variant >= Variant::V2 {
            codec::push_text(&mut entry, "group-tag", &self.group_tag);
        }
        codec::push_target(&mut entry, &self.target, self.negate_target);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let (target, negate_target) = codec::target(entry);
        let profiles = node.get_path(&["profile-setting", "profiles"]);
        let first = |path: &[&str]| {
            codec::members(entry, path)
                .into_iter()
                .next()
                .unwrap_or_default()
        };
        let single = |tag: &str| {
            codec::members(profiles, &[tag])
                .into_iter()
                .next()
                .unwrap_or_default()
        };

        let mut rule = Self {
            name: codec::entry_name(node)?,
            rule_type: codec::text(entry, &["rule-type"]),
            description: codec::free_text(entry, &["description"]),
            tags: codec::members(entry, &["tag"]),
            source_zones: codec::members(entry, &["from"]),
            destination_zones: codec::members(entry, &["to"]),
            source_addresses: codec::members(entry, &["source"]),
            negate_source: codec::flag(entry, &["negate-source"]),
            source_users: codec::members(entry, &["source-user"]),
            destination_addresses: codec::members(entry, &["destination"]),
            negate_destination: codec::flag(entry, &["negate-destination"]),
            applications: codec::members(entry, &["application"]),
            services: codec::members(entry, &["service"]),
            categories: codec::members(entry, &["category"]),
            action: codec::text(entry, &["action"]),
            log_setting: codec::text(entry, &["log-setting"]),
            log_start: codec::flag(entry, &["log-start"]),
            log_end: codec::bool_or(entry, &["log-end"], true),
            disabled: codec::flag(entry, &["disabled"]),
            schedule: codec::text(entry, &["schedule"]),
            icmp_unreachable: codec::flag(entry, &["icmp-unreachable"]),
            disable_server_response_inspection: codec::flag(
                entry,
                &["option", "disable-server-response-inspection"],
            ),
            profile_group: first(&["profile-setting", "group"]),
            antivirus: single("virus"),
            anti_spyware: single("spyware"),
            vulnerability: single("vulnerability"),
            url_filtering: single("url-filtering"),
            file_blocking: single("file-blocking"),
            wildfire_analysis: single("wildfire-analysis"),
            data_filtering: single("data-filtering"),
            target,
            negate_target,
            ..Self::default()
        };

        if variant >= Variant::V2 {
            rule.uuid = node.get_attr("uuid").unwrap_or_default().to_string();
            rule.group_tag = codec::text(entry, &["group-tag"]);
        }
        if variant >= Variant::V3 {
            rule.source_hips = codec::members(entry, &["source-hip"]);
            rule.destination_hips = codec::members(entry, &["destination-hip"]);
        } else {
            rule.hip_profiles = codec::members(entry, &["hip-profiles"]);
        }
        Ok(rule)
    }
}

impl SecurityRule {
    fn profile_slots(&self) -> [(&'static str, &str); 7] {
        [
            ("virus", &self.antivirus),
            ("spyware", &self.anti_spyware),
            ("vulnerability", &self.vulnerability),
            ("url-filtering", &self.url_filtering),
            ("file-blocking", &self.file_blocking),
            ("wildfire-analysis", &self.wildfire_analysis),
            ("data-filtering", &self.data_filtering),
        ]
    }

    fn encode_profiles(&self) -> Result<Option<XmlNode>> {
        let slots = self.profile_slots();
        let has_profiles = slots.iter().any(|(_, name)| !name.is_empty());

        let mut setting = XmlNode::new("profile-setting");
        if !self.profile_group.is_empty() {
            if has_profiles {
                return Err(Error::encode(
                    "profile_group",
                    "a profile group excludes individual security profiles",
                ));
            }
            codec::push_members(&mut setting, "group", &[self.profile_group.clone()]);
        } else if has_profiles {
            let mut profiles = XmlNode::new("profiles");
            for (tag, name) in slots {
                if !name.is_empty() {
                    codec::push_members(&mut profiles, tag, &[name.to_string()]);
                }
            }
            setting.push(profiles);
        }
        Ok((!setting.is_blank()).then_some(setting))
    }

    /// Copy with the uuid cleared and unordered lists sorted.
    fn canonical(&self) -> Self {
        let mut out = self.clone();
        out.uuid.clear();
        for list in [
            &mut out.tags,
            &mut out.source_zones,
            &mut out.destination_zones,
            &mut out.source_addresses,
            &mut out.source_users,
            &mut out.hip_profiles,
            &mut out.source_hips,
            &mut out.destination_hips,
            &mut out.destination_addresses,
            &mut out.applications,
            &mut out.services,
            &mut out.categories,
        ] {
            list.sort();
        }
        for vsys in out.target.values_mut() {
            vsys.sort();
        }
        out
    }
}

impl Entry for SecurityRule {
    type Scope = RuleScope;

    fn container(scope: &RuleScope) -> Result<Vec<String>> {
        scope.rules(Self::RULE_TYPE)
    }
}

impl Rule for SecurityRule {
    const RULE_TYPE: &'static str = "security";

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

crate::register_kind!(SecurityRule);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::{parse_str, write_compact};

    use super::*;
    use crate::path::{join, Rulebase};

    fn allow_web() -> SecurityRule {
        SecurityRule {
            name: "allow-web".to_string(),
            description: "outbound browsing".to_string(),
            tags: vec!["egress".to_string()],
            source_zones: vec!["trust".to_string()],
            destination_zones: vec!["untrust".to_string()],
            source_addresses: vec!["any".to_string()],
            source_users: vec!["any".to_string()],
            destination_addresses: vec!["any".to_string()],
            applications: vec!["ssl".to_string(), "web-browsing".to_string()],
            services: vec!["application-default".to_string()],
            categories: vec!["any".to_string()],
            action: ACTION_ALLOW.to_string(),
            log_end: true,
            profile_group: "default".to_string(),
            ..SecurityRule::default()
        }
    }

    fn xml(rule: &SecurityRule, variant: Variant) -> String {
        write_compact(&rule.encode(variant).expect("encode")).expect("write")
    }

    #[test]
    fn selector_picks_the_variant_per_firmware() {
        for (firmware, variant) in [
            ("10.1.0", Variant::V3),
            ("10.0.0", Variant::V3),
            ("9.1.4", Variant::V2),
            ("9.0.0", Variant::V2),
            ("8.1.0", Variant::V1),
        ] {
            let version = firmware.parse().expect("version");
            assert_eq!(SecurityRule::variant_for(&version), variant, "{firmware}");
        }
    }

    #[test]
    fn round_trips_every_variant() {
        let v1 = SecurityRule {
            hip_profiles: vec!["managed".to_string()],
            log_start: true,
            schedule: "business-hours".to_string(),
            disable_server_response_inspection: true,
            ..allow_web()
        };
        let v2 = SecurityRule {
            uuid: "7f1e2d3c-4b5a-4968-8776-655443322110".to_string(),
            group_tag: "web".to_string(),
            rule_type: TYPE_INTERZONE.to_string(),
            ..v1.clone()
        };
        let v3 = SecurityRule {
            hip_profiles: Vec::new(),
            source_hips: vec!["managed".to_string()],
            destination_hips: vec!["any".to_string()],
            profile_group: String::new(),
            antivirus: "av".to_string(),
            vulnerability: "strict".to_string(),
            wildfire_analysis: "wf".to_string(),
            ..v2.clone()
        };
        for (record, variant) in [(v1, Variant::V1), (v2, Variant::V2), (v3, Variant::V3)] {
            let node = record.encode(variant).expect("encode");
            assert_eq!(node.get_attr("name"), Some(record.name.as_str()));
            assert_eq!(SecurityRule::decode(&node, variant).expect("decode"), record);
        }
    }

    #[test]
    fn hip_lists_follow_the_firmware() {
        let record = SecurityRule {
            uuid: "7f1e2d3c-4b5a-4968-8776-655443322110".to_string(),
            group_tag: "web".to_string(),
            hip_profiles: vec!["legacy".to_string()],
            source_hips: vec!["managed".to_string()],
            ..allow_web()
        };

        let v3 = xml(&record, Variant::V3);
        assert!(v3.contains("<source-hip><member>managed</member></source-hip>"));
        assert!(!v3.contains("hip-profiles"));
        assert!(v3.contains(r#"uuid="7f1e2d3c-4b5a-4968-8776-655443322110""#));

        let v2 = xml(&record, Variant::V2);
        assert!(v2.contains("<hip-profiles><member>legacy</member></hip-profiles>"));
        assert!(!v2.contains("source-hip"));
        assert!(v2.contains("<group-tag>web</group-tag>"));

        let v1 = xml(&record, Variant::V1);
        assert!(!v1.contains("uuid="));
        assert!(!v1.contains("group-tag"));
    }

    #[test]
    fn profile_group_and_profiles_are_exclusive() {
        let grouped = xml(&allow_web(), Variant::V3);
        assert!(grouped.contains(
            "<profile-setting><group><member>default</member></group></profile-setting>"
        ));

        let both = SecurityRule {
            antivirus: "av".to_string(),
            ..allow_web()
        };
        let err = both.encode(Variant::V3).expect_err("exclusive");
        assert!(matches!(err, Error::Encode { ref field, .. } if field == "profile_group"));
    }

    #[test]
    fn unknown_action_and_type_are_encode_errors() {
        let bad_action = SecurityRule {
            action: "permit".to_string(),
            ..allow_web()
        };
        assert!(matches!(
            bad_action.encode(Variant::V1).expect_err("action"),
            Error::Encode { ref field, .. } if field == "action"
        ));

        let bad_type = SecurityRule {
            rule_type: "crosszone".to_string(),
            ..allow_web()
        };
        assert!(matches!(
            bad_type.encode(Variant::V1).expect_err("type"),
            Error::Encode { ref field, .. } if field == "rule_type"
        ));
    }

    #[test]
    fn session_end_logging_defaults_on() {
        let node = parse_str(r#"<entry name="r"><action>deny</action></entry>"#).expect("parse");
        assert!(SecurityRule::decode(&node, Variant::V1).expect("decode").log_end);

        let quiet = SecurityRule {
            log_end: false,
            ..allow_web()
        };
        assert!(xml(&quiet, Variant::V1).contains("<log-end>no</log-end>"));
    }

    #[test]
    fn matching_ignores_uuid_and_list_order() {
        let a = SecurityRule {
            uuid: "7f1e2d3c-4b5a-4968-8776-655443322110".to_string(),
            ..allow_web()
        };
        let mut b = allow_web();
        b.applications.reverse();
        assert!(a.rules_match(&b));

        b.action = ACTION_DENY.to_string();
        assert!(!a.rules_match(&b));
    }

    #[test]
    fn copy_keeps_identity() {
        let src = allow_web();
        let mut dst = SecurityRule {
            name: "other".to_string(),
            uuid: "00000000-0000-0000-0000-000000000002".to_string(),
            ..SecurityRule::default()
        };
        dst.copy_from(&src);
        dst.applications.push("dns".to_string());
        assert_eq!(dst.name, "other");
        assert_eq!(dst.uuid, "00000000-0000-0000-0000-000000000002");
        assert_eq!(src.applications.len(), 2);
    }

    #[test]
    fn rules_live_in_the_security_rulebase() {
        assert_eq!(
            join(&SecurityRule::xpath(&RuleScope::vsys("vsys1"), &["allow-web"]).expect("xpath")),
            "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']\
             /rulebase/security/rules/entry[@name='allow-web']"
        );
        assert_eq!(
            join(
                &SecurityRule::container(&RuleScope::device_group("branch", Rulebase::Pre))
                    .expect("xpath")
            ),
            "/config/devices/entry[@name='localhost.localdomain']/device-group/entry[@name='branch']\
             /pre-rulebase/security/rules"
        );
    }
}
