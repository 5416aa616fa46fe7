//! File blocking security profiles.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Variant};
use crate::path::{Location, Placement};

/// Transfer directions shared with WildFire analysis rules.
pub const DIRECTIONS: &[&str] = &["upload", "download", "both"];
const ACTIONS: &[&str] = &["alert", "block", "continue"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBlockingRule {
    pub name: String,
    pub applications: Vec<String>,
    pub file_types: Vec<String>,
    /// `upload`, `download` or `both`.
    pub direction: String,
    /// `alert`, `block` or `continue`.
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBlockingProfile {
    pub name: String,
    pub description: String,
    pub rules: Vec<FileBlockingRule>,
}

impl Object for FileBlockingProfile {
    const KIND: &'static str = "file-blocking";

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
                check_choice("action", &rule.action, ACTIONS)?;
                let mut item = codec::entry(&rule.name);
                codec::push_members(&mut item, "application", &rule.applications);
                codec::push_members(&mut item, "file-type", &rule.file_types);
                codec::push_text(&mut item, "direction", &rule.direction);
                codec::push_text(&mut item, "action", &rule.action);
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
            .map(|item| -> Result<FileBlockingRule> {
                let fields = Some(item);
                Ok(FileBlockingRule {
                    name: codec::entry_name(item)?,
                    applications: codec::members(fields, &["application"]),
                    file_types: codec::members(fields, &["file-type"]),
                    direction: codec::text(fields, &["direction"]),
                    action: codec::text(fields, &["action"]),
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

/// Reject a non-empty `value` outside `choices`.
pub(crate) fn check_choice(field: &str, value: &str, choices: &[&str]) -> Result<()> {
    if value.is_empty() || choices.contains(&value) {
        return Ok(());
    }
    Err(Error::encode(field, format!("unknown {field} '{value}'")))
}

impl Entry for FileBlockingProfile {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profiles".to_string());
        out.push("file-blocking".to_string());
        Ok(out)
    }
}

crate::register_kind!(FileBlockingProfile);
