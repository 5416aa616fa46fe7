//! BGP peers of a peer group.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::Result;
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::PeerScope;

/// Seconds.
pub const DEFAULT_KEEP_ALIVE_INTERVAL: u32 = 30;
pub const DEFAULT_HOLD_TIME: u32 = 90;
pub const DEFAULT_IDLE_HOLD_TIME: u32 = 15;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Peer {
    pub name: String,
    pub enable: bool,
    pub peer_as: String,
    /// `bilateral` or `unspecified`.
    pub peering_type: String,
    pub max_prefixes: String,
    pub local_address_interface: String,
    pub local_address_ip: String,
    pub peer_address_ip: String,
    pub reflector_client: String,
    pub address_family_identifier: String,
    pub subsequent_address_unicast: bool,
    pub subsequent_address_multicast: bool,
    pub auth_profile: String,
    pub keep_alive_interval: u32,
    pub multi_hop: u32,
    pub open_delay_time: u32,
    pub hold_time: u32,
    pub idle_hold_time: u32,
    /// Device default is on.
    pub allow_incoming_connections: bool,
    pub incoming_connections_remote_port: u32,
    /// Device default is on.
    pub allow_outgoing_connections: bool,
    pub outgoing_connections_local_port: u32,
    /// 8.0+.
    pub bfd_profile: String,
    /// Device default is on. 8.0+.
    pub enable_sender_side_loop_detection: bool,
}

impl Object for Peer {
    const KIND: &'static str = "bgp-peer";
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
        codec::push_bool(&mut entry, "enable", self.enable);
        codec::push_text(&mut entry, "peer-as", &self.peer_as);
        codec::push_text(&mut entry, "peering-type", &self.peering_type);
        codec::push_text(&mut entry, "max-prefixes", &self.max_prefixes);

        let mut local = XmlNode::new("local-address");
        codec::push_text(&mut local, "interface", &self.local_address_interface);
        codec::push_text(&mut local, "ip", &self.local_address_ip);
        entry.push_populated(local);

        let mut peer = XmlNode::new("peer-address");
        codec::push_text(&mut peer, "ip", &self.peer_address_ip);
        entry.push_populated(peer);

        codec::push_text(&mut entry, "reflector-client", &self.reflector_client);
        codec::push_text(
            &mut entry,
            "address-family-identifier",
            &self.address_family_identifier,
        );
        let mut safi = XmlNode::new("subsequent-address-family-identifier");
        codec::push_flag(&mut safi, "unicast", self.subsequent_address_unicast);
        codec::push_flag(&mut safi, "multicast", self.subsequent_address_multicast);
        entry.push_populated(safi);

        entry.push(self.encode_connection_options());

        if variant >= Variant::V2 {
            if !self.bfd_profile.is_empty() {
                entry.push(
                    XmlNode::new("bfd").child(XmlNode::with_text("profile", self.bfd_profile.as_str())),
                );
            }
            codec::push_bool(
                &mut entry,
                "enable-sender-side-loop-detection",
                self.enable_sender_side_loop_detection,
            );
        }
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let options = node.get_child("connection-options");
        let incoming = options.and_then(|o| o.get_child("incoming-bgp-connection"));
        let outgoing = options.and_then(|o| o.get_child("outgoing-bgp-connection"));

        let mut peer = Self {
            name: codec::entry_name(node)?,
            enable: codec::flag(entry, &["enable"]),
            peer_as: codec::text(entry, &["peer-as"]),
            peering_type: codec::text(entry, &["peering-type"]),
            max_prefixes: codec::text(entry, &["max-prefixes"]),
            local_address_interface: codec::text(entry, &["local-address", "interface"]),
            local_address_ip: codec::text(entry, &["local-address", "ip"]),
            peer_address_ip: codec::text(entry, &["peer-address", "ip"]),
            reflector_client: codec::text(entry, &["reflector-client"]),
            address_family_identifier: codec::text(entry, &["address-family-identifier"]),
            subsequent_address_unicast: codec::flag(
                entry,
                &["subsequent-address-family-identifier", "unicast"],
            ),
            subsequent_address_multicast: codec::flag(
                entry,
                &["subsequent-address-family-identifier", "multicast"],
            ),
            auth_profile: codec::text(options, &["authentication"]),
            keep_alive_interval: codec::int_or(
                options,
                &["keep-alive-interval"],
                DEFAULT_KEEP_ALIVE_INTERVAL,
            )?,
            multi_hop: codec::int(options, &["multihop"])?,
            open_delay_time: codec::int(options, &["open-delay-time"])?,
            hold_time: codec::int_or(options, &["hold-time"], DEFAULT_HOLD_TIME)?,
            idle_hold_time: codec::int_or(options, &["idle-hold-time"], DEFAULT_IDLE_HOLD_TIME)?,
            allow_incoming_connections: codec::bool_or(incoming, &["allow"], true),
            incoming_connections_remote_port: codec::int(incoming, &["remote-port"])?,
            allow_outgoing_connections: codec::bool_or(outgoing, &["allow"], true),
            outgoing_connections_local_port: codec::int(outgoing, &["local-port"])?,
            ..Self::default()
        };
        if variant >= Variant::V2 {
            peer.bfd_profile = codec::text(entry, &["bfd", "profile"]);
            peer.enable_sender_side_loop_detection =
                codec::bool_or(entry, &["enable-sender-side-loop-detection"], true);
        }
        Ok(peer)
    }
}

impl Peer {
    fn encode_connection_options(&self) -> XmlNode {
        let mut options = XmlNode::new("connection-options");
        codec::push_text(&mut options, "authentication", &self.auth_profile);
        codec::push_int(&mut options, "keep-alive-interval", self.keep_alive_interval);
        codec::push_int(&mut options, "multihop", self.multi_hop);
        codec::push_int(&mut options, "open-delay-time", self.open_delay_time);
        codec::push_int(&mut options, "hold-time", self.hold_time);
        codec::push_int(&mut options, "idle-hold-time", self.idle_hold_time);

        let mut incoming = XmlNode::new("incoming-bgp-connection");
        codec::push_bool(&mut incoming, "allow", self.allow_incoming_connections);
        codec::push_int(&mut incoming, "remote-port", self.incoming_connections_remote_port);
        options.push(incoming);

        let mut outgoing = XmlNode::new("outgoing-bgp-connection");
        codec::push_bool(&mut outgoing, "allow", self.allow_outgoing_connections);
        codec::push_int(&mut outgoing, "local-port", self.outgoing_connections_local_port);
        options.push(outgoing);
        options
    }
}

impl Entry for Peer {
    type Scope = PeerScope;

    fn container(scope: &PeerScope) -> Result<Vec<String>> {
        let mut out = scope.root()?;
        out.push("peer".to_string());
        Ok(out)
    }
}

crate::register_kind!(Peer);
