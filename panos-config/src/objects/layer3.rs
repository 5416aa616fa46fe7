//! Layer-3 addressing shared by physical interfaces and subinterfaces.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::Result;
use crate::object::Variant;

/// Addressing and MTU settings of a layer-3 interface.
///
/// The MSS adjustment values need PAN-OS 8.0, where `adjust-tcp-mss` turned
/// from a flag into a subtree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Layer3 {
    /// Ignored when `enable_dhcp` is set.
    pub static_ips: Vec<String>,
    pub enable_dhcp: bool,
    pub create_dhcp_default_route: bool,
    pub dhcp_default_route_metric: u32,
    pub ipv6_enabled: bool,
    pub ipv6_interface_id: String,
    pub management_profile: String,
    pub mtu: u32,
    pub adjust_tcp_mss: bool,
    pub ipv4_mss_adjust: u32,
    pub ipv6_mss_adjust: u32,
}

impl Layer3 {
    /// Append the addressing elements to `parent`.
    pub fn encode_into(&self, parent: &mut XmlNode, raw: &RawXml, variant: Variant) -> Result<()> {
        if self.enable_dhcp {
            let mut dhcp = XmlNode::new("dhcp-client");
            codec::push_bool(&mut dhcp, "enable", true);
            codec::push_flag(&mut dhcp, "create-default-route", self.create_dhcp_default_route);
            codec::push_int(&mut dhcp, "default-route-metric", self.dhcp_default_route_metric);
            parent.push(dhcp);
        } else {
            codec::push_entries(parent, "ip", &self.static_ips);
        }

        let mut ipv6 = XmlNode::new("ipv6");
        codec::push_flag(&mut ipv6, "enabled", self.ipv6_enabled);
        codec::push_text(&mut ipv6, "interface-id", &self.ipv6_interface_id);
        codec::push_raw(&mut ipv6, "address", raw, "v6adr")?;
        codec::push_raw(&mut ipv6, "neighbor-discovery", raw, "ndp")?;
        parent.push_populated(ipv6);

        codec::push_text(parent, "interface-management-profile", &self.management_profile);
        codec::push_int(parent, "mtu", self.mtu);

        if variant >= Variant::V2 {
            let mut mss = XmlNode::new("adjust-tcp-mss");
            codec::push_flag(&mut mss, "enable", self.adjust_tcp_mss);
            codec::push_int(&mut mss, "ipv4-mss-adjustment", self.ipv4_mss_adjust);
            codec::push_int(&mut mss, "ipv6-mss-adjustment", self.ipv6_mss_adjust);
            parent.push_populated(mss);
        } else {
            codec::push_flag(parent, "adjust-tcp-mss", self.adjust_tcp_mss);
        }

        codec::push_raw(parent, "arp", raw, "arp")
    }

    /// Read the addressing elements of `node`, capturing the ARP, IPv6
    /// address and neighbor discovery trees into `raw`.
    pub fn decode(node: Option<&XmlNode>, raw: &mut RawXml, variant: Variant) -> Result<Self> {
        let dhcp = node.and_then(|n| n.get_child("dhcp-client"));
        let ipv6 = node.and_then(|n| n.get_child("ipv6"));

        let mut layer3 = Self {
            static_ips: codec::entry_names(node, &["ip"]),
            enable_dhcp: codec::flag(dhcp, &["enable"]),
            create_dhcp_default_route: codec::flag(dhcp, &["create-default-route"]),
            dhcp_default_route_metric: codec::int(dhcp, &["default-route-metric"])?,
            ipv6_enabled: codec::flag(ipv6, &["enabled"]),
            ipv6_interface_id: codec::text(ipv6, &["interface-id"]),
            management_profile: codec::text(node, &["interface-management-profile"]),
            mtu: codec::int(node, &["mtu"])?,
            ..Self::default()
        };
        if variant >= Variant::V2 {
            let mss = node.and_then(|n| n.get_child("adjust-tcp-mss"));
            layer3.adjust_tcp_mss = codec::flag(mss, &["enable"]);
            layer3.ipv4_mss_adjust = codec::int(mss, &["ipv4-mss-adjustment"])?;
            layer3.ipv6_mss_adjust = codec::int(mss, &["ipv6-mss-adjustment"])?;
        } else {
            layer3.adjust_tcp_mss = codec::flag(node, &["adjust-tcp-mss"]);
        }

        codec::capture_raw(ipv6, "address", "v6adr", raw)?;
        codec::capture_raw(ipv6, "neighbor-discovery", "ndp", raw)?;
        codec::capture_raw(node, "arp", "arp", raw)?;
        Ok(layer3)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::write_compact;

    use super::*;

    #[test]
    fn mss_adjustment_moves_into_a_subtree() {
        let layer3 = Layer3 {
            adjust_tcp_mss: true,
            ipv4_mss_adjust: 40,
            ..Layer3::default()
        };

        let mut old = XmlNode::new("layer3");
        layer3.encode_into(&mut old, &RawXml::new(), Variant::V1).expect("encode");
        assert_eq!(
            write_compact(&old).expect("write"),
            "<layer3><adjust-tcp-mss>yes</adjust-tcp-mss></layer3>"
        );

        let mut new = XmlNode::new("layer3");
        layer3.encode_into(&mut new, &RawXml::new(), Variant::V2).expect("encode");
        assert_eq!(
            write_compact(&new).expect("write"),
            "<layer3><adjust-tcp-mss><enable>yes</enable>\
             <ipv4-mss-adjustment>40</ipv4-mss-adjustment></adjust-tcp-mss></layer3>"
        );

        let mut raw = RawXml::new();
        assert_eq!(Layer3::decode(Some(&new), &mut raw, Variant::V2).expect("decode"), layer3);
        assert!(raw.is_empty());
    }

    #[test]
    fn dhcp_replaces_static_addresses() {
        let layer3 = Layer3 {
            static_ips: vec!["10.0.0.1/24".to_string()],
            enable_dhcp: true,
            create_dhcp_default_route: true,
            dhcp_default_route_metric: 10,
            ..Layer3::default()
        };
        let mut node = XmlNode::new("layer3");
        layer3.encode_into(&mut node, &RawXml::new(), Variant::V3).expect("encode");
        assert!(node.get_child("ip").is_none());

        let decoded = Layer3::decode(Some(&node), &mut RawXml::new(), Variant::V3).expect("decode");
        assert!(decoded.enable_dhcp);
        assert!(decoded.static_ips.is_empty());
        assert_eq!(decoded.dhcp_default_route_metric, 10);
    }
}
