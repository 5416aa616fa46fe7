//! URL filtering security profiles.
//!
//! PAN-OS 8.0 added user credential detection. PAN-OS 9.0 moved the block
//! and allow lists into custom URL categories and added HTTP header
//! insertion, which is carried as opaque XML.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::{Location, Placement};

const UCD_MODES: &[&str] = &["disabled", "ip-user", "domain-credentials", "group-mapping"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlFilteringProfile {
    pub name: String,
    pub description: String,
    /// Pre-9.0.
    pub dynamic_url: bool,
    /// Pre-9.0.
    pub expired_license_action: bool,
    /// Pre-9.0.
    pub block_list_action: String,
    /// Pre-9.0.
    pub block_list: Vec<String>,
    /// Pre-9.0.
    pub allow_list: Vec<String>,
    pub allow_categories: Vec<String>,
    pub alert_categories: Vec<String>,
    pub block_categories: Vec<String>,
    pub continue_categories: Vec<String>,
    pub override_categories: Vec<String>,
    pub track_container_page: bool,
    /// Device default is on.
    pub log_container_page_only: bool,
    pub safe_search_enforcement: bool,
    pub log_http_header_xff: bool,
    pub log_http_header_user_agent: bool,
    pub log_http_header_referer: bool,
    /// One of `disabled`, `ip-user`, `domain-credentials`, `group-mapping`.
    /// 8.0+.
    pub ucd_mode: String,
    /// Group mapping name when `ucd_mode` is `group-mapping`. 8.0+.
    pub ucd_mode_group_mapping: String,
    pub ucd_log_severity: String,
    pub ucd_allow_categories: Vec<String>,
    pub ucd_alert_categories: Vec<String>,
    pub ucd_block_categories: Vec<String>,
    pub ucd_continue_categories: Vec<String>,
    /// `hhi`: http-header-insertion (9.0+).
    pub raw: RawXml,
}

impl Object for UrlFilteringProfile {
    const KIND: &'static str = "url-filtering";
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
        codec::push_text(&mut entry, "description", &self.description);

        if variant < Variant::V3 {
            codec::push_flag(&mut entry, "dynamic-url", self.dynamic_url);
            codec::push_flag(&mut entry, "license-expired", self.expired_license_action);
            codec::push_text(&mut entry, "action", &self.block_list_action);
            codec::push_members(&mut entry, "block-list", &self.block_list);
            codec::push_members(&mut entry, "allow-list", &self.allow_list);
        }

        codec::push_members(&mut entry, "allow", &self.allow_categories);
        codec::push_members(&mut entry, "alert", &self.alert_categories);
        codec::push_members(&mut entry, "block", &self.block_categories);
        codec::push_members(&mut entry, "continue", &self.continue_categories);
        codec::push_members(&mut entry, "override", &self.override_categories);
        codec::push_flag(&mut entry, "enable-container-page", self.track_container_page);
        codec::push_bool(&mut entry, "log-container-page-only", self.log_container_page_only);
        codec::push_flag(&mut entry, "safe-search-enforcement", self.safe_search_enforcement);
        codec::push_flag(&mut entry, "log-http-hdr-xff", self.log_http_header_xff);
        codec::push_flag(&mut entry, "log-http-hdr-user-agent", self.log_http_header_user_agent);
        codec::push_flag(&mut entry, "log-http-hdr-referer", self.log_http_header_referer);

        if variant >= Variant::V2 {
            let mut ucd = XmlNode::new("credential-enforcement");
            match self.ucd_mode.as_str() {
                "" => {}
                "group-mapping" => {
                    let mut mode = XmlNode::new("mode");
                    mode.push(XmlNode::with_text("group-mapping", self.ucd_mode_group_mapping.as_str()));
                    ucd.push(mode);
                }
                mode if UCD_MODES.contains(&mode) => {
                    ucd.push(XmlNode::new("mode").child(XmlNode::new(mode)))
                }
                other => {
                    return Err(Error::encode(
                        "ucd_mode",
                        format!("unknown credential detection mode '{other}'"),
                    ))
                }
            }
            codec::push_text(&mut ucd, "log-severity", &self.ucd_log_severity);
            codec::push_members(&mut ucd, "allow", &self.ucd_allow_categories);
            codec::push_members(&mut ucd, "alert", &self.ucd_alert_categories);
            codec::push_members(&mut ucd, "block", &self.ucd_block_categories);
            codec::push_members(&mut ucd, "continue", &self.ucd_continue_categories);
            entry.push_populated(ucd);
        }

        if variant >= Variant::V3 {
            codec::push_raw(&mut entry, "http-header-insertion", &self.raw, "hhi")?;
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let mut profile = Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            allow_categories: codec::members(entry, &["allow"]),
            alert_categories: codec::members(entry, &["alert"]),
            block_categories: codec::members(entry, &["block"]),
            continue_categories: codec::members(entry, &["continue"]),
            override_categories: codec::members(entry, &["override"]),
            track_container_page: codec::flag(entry, &["enable-container-page"]),
            log_container_page_only: codec::bool_or(entry, &["log-container-page-only"], true),
            safe_search_enforcement: codec::flag(entry, &["safe-search-enforcement"]),
            log_http_header_xff: codec::flag(entry, &["log-http-hdr-xff"]),
            log_http_header_user_agent: codec::flag(entry, &["log-http-hdr-user-agent"]),
            log_http_header_referer: codec::flag(entry, &["log-http-hdr-referer"]),
            ..Self::default()
        };

        if variant < Variant::V3 {
            profile.dynamic_url = codec::flag(entry, &["dynamic-url"]);
            profile.expired_license_action = codec::flag(entry, &["license-expired"]);
            profile.block_list_action = codec::text(entry, &["action"]);
            profile.block_list = codec::members(entry, &["block-list"]);
            profile.allow_list = codec::members(entry, &["allow-list"]);
        }

        if variant >= Variant::V2 {
            let ucd = node.get_child("credential-enforcement");
            if let Some(mode) = codec::choice(ucd.and_then(|u| u.get_child("mode")), UCD_MODES) {
                profile.ucd_mode = mode.tag.clone();
                if mode.tag == "group-mapping" {
                    profile.ucd_mode_group_mapping = codec::text(Some(mode), &[]);
                }
            }
            profile.ucd_log_severity = codec::text(ucd, &["log-severity"]);
            profile.ucd_allow_categories = codec::members(ucd, &["allow"]);
            profile.ucd_alert_categories = codec::members(ucd, &["alert"]);
            profile.ucd_block_categories = codec::members(ucd, &["block"]);
            profile.ucd_continue_categories = codec::members(ucd, &["continue"]);
        }

        if variant >= Variant::V3 {
            codec::capture_raw(entry, "http-header-insertion", "hhi", &mut profile.raw)?;
        }
        Ok(profile)
    }
}

impl Entry for UrlFilteringProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("url-filtering".to_string());
        Ok(out)
    }
}

crate::register_kind!(UrlFilteringProfile);
