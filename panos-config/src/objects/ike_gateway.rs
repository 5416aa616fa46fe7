//! IKE gateways.
//!
//! PAN-OS 7.0 introduced IKEv2 alongside IKEv1; 8.0 added the disabled
//! toggle. Certificate authentication is carried as opaque XML.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::DeviceScope;

pub const IKEV1: &str = "ikev1";
pub const IKEV2: &str = "ikev2";
pub const IKEV2_PREFERRED: &str = "ikev2-preferred";

pub const PEER_IP: &str = "ip";
pub const PEER_DYNAMIC: &str = "dynamic";
pub const PEER_FQDN: &str = "fqdn";

pub const AUTH_PRE_SHARED_KEY: &str = "pre-shared-key";
pub const AUTH_CERTIFICATE: &str = "certificate";

/// Seconds; applied when the device omits the element.
pub const DEFAULT_DPD_INTERVAL: u32 = 5;
pub const DEFAULT_DPD_RETRY: u32 = 5;
pub const DEFAULT_LIVENESS_INTERVAL: u32 = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IkeGateway {
    pub name: String,
    /// IKE protocol version. Pre-7.0 firmware only speaks IKEv1.
    pub version: String,
    /// 7.0+.
    pub enable_ipv6: bool,
    /// 8.0+.
    pub disabled: bool,

    pub peer_ip_type: String,
    pub peer_ip_value: String,
    pub interface: String,
    /// `ip` or `floating-ip`.
    pub local_ip_address_type: String,
    pub local_ip_address_value: String,

    pub auth_type: String,
    pub pre_shared_key: String,
    pub local_id_type: String,
    pub local_id_value: String,
    pub peer_id_type: String,
    pub peer_id_value: String,

    pub enable_passive_mode: bool,
    pub enable_nat_traversal: bool,
    pub nat_traversal_keep_alive: u32,
    pub nat_traversal_enable_udp_checksum: bool,
    pub enable_fragmentation: bool,

    pub ikev1_exchange_mode: String,
    pub ikev1_crypto_profile: String,
    pub enable_dead_peer_detection: bool,
    pub dead_peer_detection_interval: u32,
    pub dead_peer_detection_retry: u32,

    /// 7.0+.
    pub ikev2_crypto_profile: String,
    /// 7.0+.
    pub ikev2_cookie_validation: bool,
    /// 7.0+.
    pub enable_liveness_check: bool,
    /// 7.0+.
    pub liveness_check_interval: u32,

    /// `cert`: certificate authentication settings.
    pub raw: RawXml,
}

impl Object for IkeGateway {
    const KIND: &'static str = "ike-gateway";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(8, 0, 0, Variant::V3),
        Threshold::new(7, 0, 0, Variant::V2),
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
        entry.push_populated(self.encode_protocol(variant)?);

        let mut common = XmlNode::new("protocol-common");
        codec::push_flag(&mut common, "passive-mode", self.enable_passive_mode);
        let mut nat = XmlNode::new("nat-traversal");
        codec::push_flag(&mut nat, "enable", self.enable_nat_traversal);
        codec::push_int(&mut nat, "keep-alive-interval", self.nat_traversal_keep_alive);
        codec::push_flag(&mut nat, "udp-checksum-enable", self.nat_traversal_enable_udp_checksum);
        common.push_populated(nat);
        if self.enable_fragmentation {
            common.push(XmlNode::new("fragmentation").child(XmlNode::with_text("enable", "yes")));
        }
        entry.push_populated(common);

        let mut auth = XmlNode::new("authentication");
        match self.auth_type.as_str() {
            "" => {}
            AUTH_PRE_SHARED_KEY => {
                let mut psk = XmlNode::new(AUTH_PRE_SHARED_KEY);
                codec::push_text(&mut psk, "key", &self.pre_shared_key);
                auth.push(psk);
            }
            AUTH_CERTIFICATE => {
                if self.raw.contains_key("cert") {
                    codec::push_raw(&mut auth, AUTH_CERTIFICATE, &self.raw, "cert")?;
                } else {
                    codec::push_marker(&mut auth, AUTH_CERTIFICATE);
                }
            }
            other => {
                return Err(Error::encode(
                    "auth_type",
                    format!("unknown authentication type '{other}'"),
                ))
            }
        }
        entry.push_populated(auth);

        entry.push_populated(identity("local-id", &self.local_id_type, &self.local_id_value));
        entry.push_populated(identity("peer-id", &self.peer_id_type, &self.peer_id_value));

        let mut local = XmlNode::new("local-address");
        codec::push_text(&mut local, "interface", &self.interface);
        if !self.local_ip_address_type.is_empty() {
            codec::push_text(&mut local, &self.local_ip_address_type, &self.local_ip_address_value);
        }
        entry.push_populated(local);

        let mut peer = XmlNode::new("peer-address");
        match self.peer_ip_type.as_str() {
            "" => {}
            PEER_DYNAMIC => codec::push_marker(&mut peer, PEER_DYNAMIC),
            PEER_FQDN if variant < Variant::V2 => {
                return Err(Error::encode("peer_ip_type", "fqdn peers require PAN-OS 7.0 or later"))
            }
            PEER_IP | PEER_FQDN => {
                peer.push(XmlNode::with_text(self.peer_ip_type.as_str(), self.peer_ip_value.as_str()))
            }
            other => {
                return Err(Error::encode(
                    "peer_ip_type",
                    format!("unknown peer address type '{other}'"),
                ))
            }
        }
        entry.push_populated(peer);

        if variant >= Variant::V2 {
            codec::push_flag(&mut entry, "ipv6", self.enable_ipv6);
        }
        if variant >= Variant::V3 {
            codec::push_flag(&mut entry, "disabled", self.disabled);
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let protocol = node.get_child("protocol");
        let ikev1 = protocol.and_then(|p| p.get_child(IKEV1));
        let common = node.get_child("protocol-common");
        let nat = common.and_then(|c| c.get_child("nat-traversal"));

        let mut gw = Self {
            name: codec::entry_name(node)?,
            version: IKEV1.to_string(),
            enable_passive_mode: codec::flag(common, &["passive-mode"]),
            enable_nat_traversal: codec::flag(nat, &["enable"]),
            nat_traversal_keep_alive: codec::int(nat, &["keep-alive-interval"])?,
            nat_traversal_enable_udp_checksum: codec::flag(nat, &["udp-checksum-enable"]),
            enable_fragmentation: codec::flag(common, &["fragmentation", "enable"]),
            ikev1_exchange_mode: codec::text(ikev1, &["exchange-mode"]),
            ikev1_crypto_profile: codec::text(ikev1, &["ike-crypto-profile"]),
            enable_dead_peer_detection: codec::flag(ikev1, &["dpd", "enable"]),
            dead_peer_detection_interval: codec::int_or(ikev1, &["dpd", "interval"], DEFAULT_DPD_INTERVAL)?,
            dead_peer_detection_retry: codec::int_or(ikev1, &["dpd", "retry"], DEFAULT_DPD_RETRY)?,
            local_id_type: codec::text(entry, &["local-id", "type"]),
            local_id_value: codec::text(entry, &["local-id", "id"]),
            peer_id_type: codec::text(entry, &["peer-id", "type"]),
            peer_id_value: codec::text(entry, &["peer-id", "id"]),
            interface: codec::text(entry, &["local-address", "interface"]),
            ..Self::default()
        };

        let auth = node.get_child("authentication");
        if let Some(found) = codec::choice(auth, &[AUTH_PRE_SHARED_KEY, AUTH_CERTIFICATE]) {
            gw.auth_type = found.tag.clone();
            if found.tag == AUTH_PRE_SHARED_KEY {
                gw.pre_shared_key = codec::text(Some(found), &["key"]);
            } else {
                codec::capture_raw(auth, AUTH_CERTIFICATE, "cert", &mut gw.raw)?;
            }
        }

        let local = node.get_child("local-address");
        if let Some(found) = codec::choice(local, &["ip", "floating-ip"]) {
            gw.local_ip_address_type = found.tag.clone();
            gw.local_ip_address_value = codec::text(Some(found), &[]);
        }

        let peer_types: &[&str] = if variant >= Variant::V2 {
            &[PEER_IP, PEER_DYNAMIC, PEER_FQDN]
        } else {
            &[PEER_IP, PEER_DYNAMIC]
        };
        if let Some(found) = codec::choice(node.get_child("peer-address"), peer_types) {
            gw.peer_ip_type = found.tag.clone();
            gw.peer_ip_value = codec::text(Some(found), &[]);
        }

        if variant >= Variant::V2 {
            let ikev2 = protocol.and_then(|p| p.get_child(IKEV2));
            let version = codec::text(protocol, &["version"]);
            if !version.is_empty() {
                gw.version = version;
            }
            gw.enable_ipv6 = codec::flag(entry, &["ipv6"]);
            gw.ikev2_crypto_profile = codec::text(ikev2, &["ike-crypto-profile"]);
            gw.ikev2_cookie_validation = codec::flag(ikev2, &["require-cookie"]);
            gw.enable_liveness_check = codec::flag(ikev2, &["dpd", "enable"]);
            gw.liveness_check_interval =
                codec::int_or(ikev2, &["dpd", "interval"], DEFAULT_LIVENESS_INTERVAL)?;
        }
        if variant >= Variant::V3 {
            gw.disabled = codec::flag(entry, &["disabled"]);
        }
        Ok(gw)
    }
}

impl IkeGateway {
    fn encode_protocol(&self, variant: Variant) -> Result<XmlNode> {
        let mut protocol = XmlNode::new("protocol");

        let mut ikev1 = XmlNode::new(IKEV1);
        codec::push_text(&mut ikev1, "exchange-mode", &self.ikev1_exchange_mode);
        codec::push_text(&mut ikev1, "ike-crypto-profile", &self.ikev1_crypto_profile);
        let mut dpd = XmlNode::new("dpd");
        codec::push_flag(&mut dpd, "enable", self.enable_dead_peer_detection);
        codec::push_int(&mut dpd, "interval", self.dead_peer_detection_interval);
        codec::push_int(&mut dpd, "retry", self.dead_peer_detection_retry);
        ikev1.push_populated(dpd);
        protocol.push_populated(ikev1);

        if variant < Variant::V2 {
            if !matches!(self.version.as_str(), "" | IKEV1) {
                return Err(Error::encode("version", "IKEv2 requires PAN-OS 7.0 or later"));
            }
            return Ok(protocol);
        }

        let mut ikev2 = XmlNode::new(IKEV2);
        codec::push_text(&mut ikev2, "ike-crypto-profile", &self.ikev2_crypto_profile);
        codec::push_flag(&mut ikev2, "require-cookie", self.ikev2_cookie_validation);
        let mut liveness = XmlNode::new("dpd");
        codec::push_flag(&mut liveness, "enable", self.enable_liveness_check);
        codec::push_int(&mut liveness, "interval", self.liveness_check_interval);
        ikev2.push_populated(liveness);
        protocol.push_populated(ikev2);
        codec::push_text(&mut protocol, "version", &self.version);
        Ok(protocol)
    }
}

fn identity(tag: &str, kind: &str, value: &str) -> XmlNode {
    let mut node = XmlNode::new(tag);
    codec::push_text(&mut node, "id", value);
    codec::push_text(&mut node, "type", kind);
    node
}

impl Entry for IkeGateway {
    type Scope = DeviceScope;

    fn container(scope: &DeviceScope) -> Result<Vec<String>> {
        let mut out = scope.network()?;
        out.push("ike".to_string());
        out.push("gateway".to_string());
        Ok(out)
    }
}

crate::register_kind!(IkeGateway);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::{parse_str, write_compact};

    use super::*;

    fn v1() -> IkeGateway {
        IkeGateway {
            name: "branch".to_string(),
            version: IKEV1.to_string(),
            peer_ip_type: PEER_IP.to_string(),
            peer_ip_value: "198.51.100.7".to_string(),
            interface: "ethernet1/1".to_string(),
            local_ip_address_type: "ip".to_string(),
            local_ip_address_value: "203.0.113.1/24".to_string(),
            auth_type: AUTH_PRE_SHARED_KEY.to_string(),
            pre_shared_key: "-AQ==secret".to_string(),
            local_id_type: "ipaddr".to_string(),
            local_id_value: "203.0.113.1".to_string(),
            enable_nat_traversal: true,
            nat_traversal_keep_alive: 20,
            ikev1_exchange_mode: "main".to_string(),
            ikev1_crypto_profile: "default".to_string(),
            enable_dead_peer_detection: true,
            dead_peer_detection_interval: 10,
            dead_peer_detection_retry: DEFAULT_DPD_RETRY,
            ..IkeGateway::default()
        }
    }

    #[test]
    fn round_trips_every_variant() {
        let mut v2 = v1();
        v2.version = IKEV2_PREFERRED.to_string();
        v2.peer_ip_type = PEER_FQDN.to_string();
        v2.peer_ip_value = "vpn.example.com".to_string();
        v2.enable_ipv6 = true;
        v2.ikev2_crypto_profile = "suite-b".to_string();
        v2.ikev2_cookie_validation = true;
        v2.enable_liveness_check = true;
        v2.liveness_check_interval = DEFAULT_LIVENESS_INTERVAL;
        let mut v3 = v2.clone();
        v3.disabled = true;
        v3.peer_ip_type = PEER_DYNAMIC.to_string();
        v3.peer_ip_value.clear();

        for (record, variant) in [(v1(), Variant::V1), (v2, Variant::V2), (v3, Variant::V3)] {
            let node = record.encode(variant).expect("encode");
            assert_eq!(IkeGateway::decode(&node, variant).expect("decode"), record);
        }
    }

    #[test]
    fn timer_defaults_are_materialized() {
        let node = parse_str(
            r#"<entry name="gw"><protocol><ikev1><dpd><enable>yes</enable></dpd></ikev1></protocol></entry>"#,
        )
        .expect("parse");
        let gw = IkeGateway::decode(&node, Variant::V2).expect("decode");
        assert_eq!(gw.dead_peer_detection_interval, 5);
        assert_eq!(gw.dead_peer_detection_retry, 5);
        assert_eq!(gw.liveness_check_interval, 5);
        assert_eq!(gw.version, IKEV1);
    }

    #[test]
    fn ikev2_is_rejected_for_old_firmware() {
        let mut record = v1();
        record.version = IKEV2.to_string();
        assert!(record.encode(Variant::V1).is_err());

        record.version = IKEV1.to_string();
        record.peer_ip_type = PEER_FQDN.to_string();
        assert!(record.encode(Variant::V1).is_err());
    }

    #[test]
    fn certificate_settings_are_opaque() {
        let node = parse_str(
            r#"<entry name="gw"><authentication><certificate><local-certificate><name>gw-cert</name></local-certificate><strict-validation-revocation>yes</strict-validation-revocation></certificate></authentication></entry>"#,
        )
        .expect("parse");
        let gw = IkeGateway::decode(&node, Variant::V3).expect("decode");
        assert_eq!(gw.auth_type, AUTH_CERTIFICATE);
        assert_eq!(
            gw.raw.get("cert").map(String::as_str),
            Some("<local-certificate><name>gw-cert</name></local-certificate><strict-validation-revocation>yes</strict-validation-revocation>")
        );

        let xml = write_compact(&gw.encode(Variant::V3).expect("encode")).expect("write");
        assert!(xml.contains("<authentication><certificate><local-certificate><name>gw-cert</name>"));
    }
}
