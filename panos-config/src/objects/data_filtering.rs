//! Data filtering security profiles.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::Result;
use crate::object::{Entry, Object, Variant};
use crate::objects::file_blocking::{check_choice, DIRECTIONS};
use crate::path::{Location, Placement};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFilteringRule {
    pub name: String,
    pub data_object: String,
    pub applications: Vec<String>,
    pub file_types: Vec<String>,
    pub direction: String,
    pub alert_threshold: u32,
    pub block_threshold: u32,
    pub log_severity: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataFilteringProfile {
    pub name: String,
    pub description: String,
    pub data_capture: bool,
    pub rules: Vec<DataFilteringRule>,
}

impl Object for DataFilteringProfile {
    const KIND: &'static str = "data-filtering";

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
        codec::push_flag(&mut entry, "data-capture", self.data_capture);
        if !self.rules.is_empty() {
            let mut list = XmlNode::new("rules");
            for rule in &self.rules {
                check_choice("direction", &rule.direction, DIRECTIONS)?;
                let mut item = codec::entry(&rule.name);
                codec::push_text(&mut item, "data-object", &rule.data_object);
                codec::push_members(&mut item, "application", &rule.applications);
                codec::push_members(&mut item, "file-type", &rule.file_types);
                codec::push_text(&mut item, "direction", &rule.direction);
                codec::push_int(&mut item, "alert-threshold", rule.alert_threshold);
                codec::push_int(&mut item, "block-threshold", rule.block_threshold);
                codec::push_text(&mut item, "log-severity", &rule.log_severity);
                list.push(item);
            }
            entry.push(list);
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, _variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let rules = node
            .get_path(&["rules"])
            .map(|list| list.get_children("entry"))
            .unwrap_or_default()
            .into_iter()
            .map(|item| -> Result<DataFilteringRule> {
                let fields = Some(item);
                Ok(DataFilteringRule {
                    name: codec::entry_name(item)?,
                    data_object: codec::text(fields, &["data-object"]),
                    applications: codec::members(fields, &["application"]),
                    file_types: codec::members(fields, &["file-type"]),
                    direction: codec::text(fields, &["direction"]),
                    alert_threshold: codec::int(fields, &["alert-threshold"])?,
                    block_threshold: codec::int(fields, &["block-threshold"])?,
                    log_severity: codec::text(fields, &["log-severity"]),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            data_capture: codec::flag(entry, &["data-capture"]),
            rules,
        })
    }
}

impl Entry for DataFilteringProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("data-filtering".to_string());
        Ok(out)
    }
}

crate::register_kind!(DataFilteringProfile);
