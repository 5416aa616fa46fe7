//! IPv4 static routes of a virtual router.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::VirtualRouterScope;

pub const NEXT_HOP_IP: &str = "ip-address";
pub const NEXT_HOP_DISCARD: &str = "discard";
pub const NEXT_HOP_VR: &str = "next-vr";

const NEXT_HOPS: &[&str] = &[NEXT_HOP_IP, NEXT_HOP_DISCARD, NEXT_HOP_VR];
const ROUTE_TABLES: &[&str] = &["unicast", "multicast", "both", "no-install"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticRoute {
    pub name: String,
    pub destination: String,
    pub interface: String,
    pub next_hop_type: String,
    /// Address for `ip-address`, router name for `next-vr`.
    pub next_hop: String,
    pub admin_distance: u32,
    pub metric: u32,
    /// `unicast`, `multicast`, `both` or `no-install`.
    pub route_table: String,
    /// 8.0+.
    pub bfd_profile: String,
    /// `pathmonitor`: path monitoring settings.
    pub raw: RawXml,
}

impl Object for StaticRoute {
    const KIND: &'static str = "static-route";
    const THRESHOLDS: &'static [Threshold] = &[Threshold::new(8, 0, 0, Variant::V2)];

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
        codec::push_text(&mut entry, "destination", &self.destination);
        codec::push_text(&mut entry, "interface", &self.interface);

        match self.next_hop_type.as_str() {
            "" => {}
            NEXT_HOP_DISCARD => {
                entry.push(XmlNode::new("nexthop").child(XmlNode::new(NEXT_HOP_DISCARD)))
            }
            NEXT_HOP_IP | NEXT_HOP_VR => entry.push(XmlNode::new("nexthop").child(
                XmlNode::with_text(self.next_hop_type.as_str(), self.next_hop.as_str()),
            )),
            other => {
                return Err(Error::encode(
                    "next_hop_type",
                    format!("unknown next hop type '{other}'"),
                ))
            }
        }

        codec::push_int(&mut entry, "admin-dist", self.admin_distance);
        codec::push_int(&mut entry, "metric", self.metric);
        if !self.route_table.is_empty() {
            if !ROUTE_TABLES.contains(&self.route_table.as_str()) {
                return Err(Error::encode(
                    "route_table",
                    format!("unknown route table '{}'", self.route_table),
                ));
            }
            entry.push(XmlNode::new("route-table").child(XmlNode::new(self.route_table.as_str())));
        }
        if variant >= Variant::V2 && !self.bfd_profile.is_empty() {
            entry.push(XmlNode::new("bfd").child(XmlNode::with_text("profile", self.bfd_profile.as_str())));
        }
        codec::push_raw(&mut entry, "path-monitor", &self.raw, "pathmonitor")?;
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let mut route = Self {
            name: codec::entry_name(node)?,
            destination: codec::text(entry, &["destination"]),
            interface: codec::text(entry, &["interface"]),
            admin_distance: codec::int(entry, &["admin-dist"])?,
            metric: codec::int(entry, &["metric"])?,
            ..Self::default()
        };
        if let Some(hop) = codec::choice(node.get_child("nexthop"), NEXT_HOPS) {
            route.next_hop_type = hop.tag.clone();
            route.next_hop = codec::text(Some(hop), &[]);
        }
        if let Some(table) = codec::choice(node.get_child("route-table"), ROUTE_TABLES) {
            route.route_table = table.tag.clone();
        }
        if variant >= Variant::V2 {
            route.bfd_profile = codec::text(entry, &["bfd", "profile"]);
        }
        codec::capture_raw(entry, "path-monitor", "pathmonitor", &mut route.raw)?;
        Ok(route)
    }
}

impl Entry for StaticRoute {
    type Scope = VirtualRouterScope;

    fn container(scope: &VirtualRouterScope) -> Result<Vec<String>> {
        let mut out = scope.root()?;
        out.extend(["routing-table", "ip", "static-route"].map(String::from));
        Ok(out)
    }
}

crate::register_kind!(StaticRoute);
