//! WildFire analysis security profiles.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::Result;
use crate::object::{Entry, Object, Variant};
use crate::objects::file_blocking::{check_choice, DIRECTIONS};
use crate::path::{Location, Placement};

const ANALYSIS: &[&str] = &["public-cloud", "private-cloud"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WildfireRule {
    pub name: String,
    pub applications: Vec<String>,
    pub file_types: Vec<String>,
    pub direction: String,
    /// `public-cloud` or `private-cloud`.
    pub analysis: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WildfireAnalysisProfile {
    pub name: String,
    pub description: String,
    pub rules: Vec<WildfireRule>,
}

impl Object for WildfireAnalysisProfile {
    const KIND: &'static str = "wildfire-analysis";

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
                check_choice("direction", &rule.direction, DIRECTIONS)?;
                check_choice("analysis", &rule.analysis, ANALYSIS)?;
                let mut item = codec::entry(&rule.name);
                codec::push_members(&mut item, "application", &rule.applications);
                codec::push_members(&mut item, "file-type", &rule.file_types);
                codec::push_text(&mut item, "direction", &rule.direction);
                codec::push_text(&mut item, "analysis", &rule.analysis);
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
            .map(|item| -> Result<WildfireRule> {
                let fields = Some(item);
                Ok(WildfireRule {
                    name: codec::entry_name(item)?,
                    applications: codec::members(fields, &["application"]),
                    file_types: codec::members(fields, &["file-type"]),
                    direction: codec::text(fields, &["direction"]),
                    analysis: codec::text(fields, &["analysis"]),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            name: codec::entry_name(node)?,
            description: codec::free_text(entry, &["description"]),
            rules,
        })
    }
}

impl Entry for WildfireAnalysisProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("wildfire-analysis".to_string());
        Ok(out)
    }
}

crate::register_kind!(WildfireAnalysisProfile);
