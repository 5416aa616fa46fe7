//! Administrative tags.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::Result;
use crate::object::{Entry, Object, Variant};
use crate::path::{Location, Placement};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    /// Palette entry such as `color3`.
    pub color: String,
    pub comments: String,
}

impl Object for Tag {
    const KIND: &'static str = "tag";

    fn name(&self) -> &str {
        &self.name
    }

    fn copy_from(&mut self, src: &Self) {
        self.color = src.color.clone();
        self.comments = src.comments.clone();
    }

    fn encode(&self, _variant: Variant) -> Result<XmlNode> {
        let mut entry = codec::entry(&self.name);
        codec::push_text(&mut entry, "color", &self.color);
        codec::push_text(&mut entry, "comments", &self.comments);
        Ok(entry)
    }

    fn decode(node: &XmlNode, _variant: Variant) -> Result<Self> {
        Ok(Self {
            name: codec::entry_name(node)?,
            color: codec::text(Some(node), &["color"]),
            comments: codec::free_text(Some(node), &["comments"]),
        })
    }
}

impl Entry for Tag {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("tag".to_string());
        Ok(out)
    }
}

crate::register_kind!(Tag);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let record = Tag {
            name: "prod".to_string(),
            color: "color3".to_string(),
            comments: "production".to_string(),
        };
        let node = record.encode(Variant::V1).expect("encode");
        assert_eq!(Tag::decode(&node, Variant::V1).expect("decode"), record);
    }
}
