//! Security profile groups. Each slot names at most one profile.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::Result;
use crate::object::{Entry, Object, Variant};
use crate::path::{Location, Placement};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileGroup {
    pub name: String,
    pub antivirus: String,
    pub anti_spyware: String,
    pub vulnerability: String,
    pub url_filtering: String,
    pub file_blocking: String,
    pub wildfire_analysis: String,
    pub data_filtering: String,
}

impl ProfileGroup {
    fn slots(&self) -> [(&'static str, &String); 7] {
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
}

impl Object for ProfileGroup {
    const KIND: &'static str = "profile-group";

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
        for (tag, profile) in self.slots() {
            if !profile.is_empty() {
                codec::push_members(&mut entry, tag, std::slice::from_ref(profile));
            }
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, _variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let first = |tag: &str| {
            codec::members(entry, &[tag])
                .into_iter()
                .next()
                .unwrap_or_default()
        };
        Ok(Self {
            name: codec::entry_name(node)?,
            antivirus: first("virus"),
            anti_spyware: first("spyware"),
            vulnerability: first("vulnerability"),
            url_filtering: first("url-filtering"),
            file_blocking: first("file-blocking"),
            wildfire_analysis: first("wildfire-analysis"),
            data_filtering: first("data-filtering"),
        })
    }
}

impl Entry for ProfileGroup {
    type Scope = Location;

    fn container(scope: &Location) -> Result<Vec<String>> {
        let mut out = scope.root(Self::KIND, Placement::OBJECT)?;
        out.push("profile-group".to_string());
        Ok(out)
    }
}

crate::register_kind!(ProfileGroup);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::write_compact;

    use super::*;
    use crate::path::join;

    #[test]
    fn slots_are_single_member_lists() {
        let group = ProfileGroup {
            name: "default".to_string(),
            antivirus: "strict-av".to_string(),
            vulnerability: "strict-vp".to_string(),
            ..ProfileGroup::default()
        };
        let node = group.encode(Variant::V1).expect("encode");
        assert_eq!(
            write_compact(&node).expect("write"),
            r#"<entry name="default"><virus><member>strict-av</member></virus><vulnerability><member>strict-vp</member></vulnerability></entry>"#
        );
        assert_eq!(ProfileGroup::decode(&node, Variant::V1).expect("decode"), group);
    }

    #[test]
    fn groups_sit_beside_the_profiles() {
        assert_eq!(
            join(&ProfileGroup::container(&Location::vsys("vsys1")).expect("xpath")),
            "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']/profile-group"
        );
    }
}
