//! Virtual routers.
//!
//! Static routes and BGP have their own classes, so the routing table and
//! protocol trees travel as opaque XML: editing a router never drops routes
//! or peers created elsewhere. A router created through a scope naming a
//! vsys is imported into that vsys.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Entry, Object, Threshold, Variant};
use crate::path::InterfaceScope;

pub const ECMP_IP_MODULO: &str = "ip-modulo";
pub const ECMP_IP_HASH: &str = "ip-hash";
pub const ECMP_WEIGHTED_ROUND_ROBIN: &str = "weighted-round-robin";
pub const ECMP_BALANCED_ROUND_ROBIN: &str = "balanced-round-robin";

const ECMP_ALGORITHMS: &[&str] = &[
    ECMP_IP_MODULO,
    ECMP_IP_HASH,
    ECMP_WEIGHTED_ROUND_ROBIN,
    ECMP_BALANCED_ROUND_ROBIN,
];

/// Device defaults for each route source, by `admin-dists` element.
const ADMIN_DISTANCES: [(&str, u32); 9] = [
    ("static", 10),
    ("static-ipv6", 10),
    ("ospf-int", 30),
    ("ospf-ext", 110),
    ("ospfv3-int", 30),
    ("ospfv3-ext", 110),
    ("ibgp", 200),
    ("ebgp", 20),
    ("rip", 120),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VirtualRouter {
    pub name: String,
    pub interfaces: Vec<String>,
    pub static_dist: u32,
    pub static_ipv6_dist: u32,
    pub ospf_int_dist: u32,
    pub ospf_ext_dist: u32,
    pub ospfv3_int_dist: u32,
    pub ospfv3_ext_dist: u32,
    pub ibgp_dist: u32,
    pub ebgp_dist: u32,
    pub rip_dist: u32,
    pub ecmp_enable: bool,
    pub ecmp_symmetric_return: bool,
    /// 8.0+.
    pub ecmp_strict_source_path: bool,
    pub ecmp_max_path: u32,
    /// `ip-modulo`, `ip-hash`, `weighted-round-robin` or
    /// `balanced-round-robin`.
    pub ecmp_algorithm: String,
    pub ecmp_hash_source_only: bool,
    pub ecmp_hash_use_port: bool,
    pub ecmp_hash_seed: u32,
    /// `rt`: routing-table, `proto`: protocol, `mc`: multicast, `wrr`: the
    /// weighted-round-robin interface weights.
    pub raw: RawXml,
}

impl VirtualRouter {
    fn distances(&self) -> [u32; 9] {
        [
            self.static_dist,
            self.static_ipv6_dist,
            self.ospf_int_dist,
            self.ospf_ext_dist,
            self.ospfv3_int_dist,
            self.ospfv3_ext_dist,
            self.ibgp_dist,
            self.ebgp_dist,
            self.rip_dist,
        ]
    }

    fn distances_mut(&mut self) -> [&mut u32; 9] {
        [
            &mut self.static_dist,
            &mut self.static_ipv6_dist,
            &mut self.ospf_int_dist,
            &mut self.ospf_ext_dist,
            &mut self.ospfv3_int_dist,
            &mut self.ospfv3_ext_dist,
            &mut self.ibgp_dist,
            &mut self.ebgp_dist,
            &mut self.rip_dist,
        ]
    }

    fn encode_ecmp(&self, variant: Variant) -> Result<XmlNode> {
        let mut ecmp = XmlNode::new("ecmp");
        codec::push_flag(&mut ecmp, "enable", self.ecmp_enable);
        codec::push_flag(&mut ecmp, "symmetric-return", self.ecmp_symmetric_return);
        if variant >= Variant::V2 {
            codec::push_flag(&mut ecmp, "strict-source-path", self.ecmp_strict_source_path);
        }
        codec::push_int(&mut ecmp, "max-path", self.ecmp_max_path);

        let algorithm = match self.ecmp_algorithm.as_str() {
            "" => None,
            ECMP_IP_HASH => {
                let mut hash = XmlNode::new(ECMP_IP_HASH);
                codec::push_flag(&mut hash, "src-only", self.ecmp_hash_source_only);
                codec::push_flag(&mut hash, "use-port", self.ecmp_hash_use_port);
                codec::push_int(&mut hash, "hash-seed", self.ecmp_hash_seed);
                Some(hash)
            }
            ECMP_WEIGHTED_ROUND_ROBIN => {
                let mut wrr = XmlNode::new(ECMP_WEIGHTED_ROUND_ROBIN);
                codec::push_raw(&mut wrr, "interface", &self.raw, "wrr")?;
                Some(wrr)
            }
            ECMP_IP_MODULO | ECMP_BALANCED_ROUND_ROBIN => {
                Some(XmlNode::new(self.ecmp_algorithm.as_str()))
            }
            other => {
                return Err(Error::encode(
                    "ecmp_algorithm",
                    format!("unknown ECMP load balance method '{other}'"),
                ))
            }
        };
        if let Some(algorithm) = algorithm {
            ecmp.push(XmlNode::new("algorithm").child(algorithm));
        }
        Ok(ecmp)
    }

    fn decode_ecmp(&mut self, ecmp: Option<&XmlNode>, variant: Variant) -> Result<()> {
        self.ecmp_enable = codec::flag(ecmp, &["enable"]);
        self.ecmp_symmetric_return = codec::flag(ecmp, &["symmetric-return"]);
        if variant >= Variant::V2 {
            self.ecmp_strict_source_path = codec::flag(ecmp, &["strict-source-path"]);
        }
        self.ecmp_max_path = codec::int(ecmp, &["max-path"])?;

        let algorithm = ecmp.and_then(|e| e.get_child("algorithm"));
        let Some(method) = codec::choice(algorithm, ECMP_ALGORITHMS) else {
            return Ok(());
        };
        self.ecmp_algorithm = method.tag.clone();
        match method.tag.as_str() {
            ECMP_IP_HASH => {
                self.ecmp_hash_source_only = codec::flag(Some(method), &["src-only"]);
                self.ecmp_hash_use_port = codec::flag(Some(method), &["use-port"]);
                self.ecmp_hash_seed = codec::int(Some(method), &["hash-seed"])?;
            }
            ECMP_WEIGHTED_ROUND_ROBIN => {
                codec::capture_raw(Some(method), "interface", "wrr", &mut self.raw)?;
            }
            _ => {}
        }
        Ok(())
    }
}

impl Object for VirtualRouter {
    const KIND: &'static str = "virtual-router";
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
        codec::push_members(&mut entry, "interface", &self.interfaces);
        codec::push_raw(&mut entry, "routing-table", &self.raw, "rt")?;
        codec::push_raw(&mut entry, "protocol", &self.raw, "proto")?;
        codec::push_raw(&mut entry, "multicast", &self.raw, "mc")?;

        let mut dists = XmlNode::new("admin-dists");
        for ((tag, _), value) in ADMIN_DISTANCES.iter().zip(self.distances()) {
            codec::push_int(&mut dists, tag, value);
        }
        entry.push_populated(dists);
        entry.push_populated(self.encode_ecmp(variant)?);
        Ok(entry)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let entry = Some(node);
        let mut router = Self {
            name: codec::entry_name(node)?,
            interfaces: codec::members(entry, &["interface"]),
            ..Self::default()
        };

        let dists = node.get_child("admin-dists");
        for (slot, (tag, default)) in router.distances_mut().into_iter().zip(ADMIN_DISTANCES) {
            *slot = codec::int_or(dists, &[tag], default)?;
        }
        router.decode_ecmp(node.get_child("ecmp"), variant)?;

        codec::capture_raw(entry, "routing-table", "rt", &mut router.raw)?;
        codec::capture_raw(entry, "protocol", "proto", &mut router.raw)?;
        codec::capture_raw(entry, "multicast", "mc", &mut router.raw)?;
        Ok(router)
    }
}

impl Entry for VirtualRouter {
    type Scope = InterfaceScope;

    const IMPORT_LIST: &'static str = "virtual-router";

    fn container(scope: &InterfaceScope) -> Result<Vec<String>> {
        let mut out = scope.device.network()?;
        out.push("virtual-router".to_string());
        Ok(out)
    }

    fn import_vsys(scope: &InterfaceScope) -> Result<Option<String>> {
        scope.import_target()
    }
}

crate::register_kind!(VirtualRouter);
