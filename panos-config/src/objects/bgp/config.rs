//! The BGP protocol config of a virtual router.
//!
//! Auth profiles, dampening profiles, peer groups, policy and redistribution
//! rules are kept as opaque XML so an edit of the protocol settings does not
//! drop them. Peer groups, peers and export rules also have their own
//! objects for callers that manage them individually.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::Result;
use crate::object::{Object, Singleton, Threshold, Variant};
use crate::path::VirtualRouterScope;

pub const DEFAULT_LOCAL_PREFERENCE: u32 = 100;
/// Seconds.
pub const DEFAULT_RESTART_TIME: u32 = 120;

/// Opaque subtrees: wire element and raw key.
const OPAQUE: &[(&str, &str)] = &[
    ("auth-profile", "ap"),
    ("dampening-profile", "dp"),
    ("peer-group", "pg"),
    ("policy", "pol"),
    ("redist-rules", "redist"),
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BgpConfig {
    pub enable: bool,
    pub router_id: String,
    pub as_number: String,
    /// Device default is on.
    pub reject_default_route: bool,
    pub allow_redistribute_default_route: bool,
    pub install_route: bool,
    /// `2-byte` or `4-byte`.
    pub as_format: String,
    pub always_compare_med: bool,
    /// Device default is on.
    pub deterministic_med_comparison: bool,
    pub default_local_preference: u32,
    /// Device default is on.
    pub enable_graceful_restart: bool,
    pub stale_route_time: u32,
    pub local_restart_time: u32,
    pub max_peer_restart_time: u32,
    pub reflector_cluster_id: String,
    pub confederation_member_as: String,
    /// Device default is on.
    pub aggregate_med: bool,
    /// Global BFD profile. 8.0+.
    pub bfd_profile: String,
    /// 8.1+.
    pub ecmp_multi_as: bool,
    /// Device default is on. 8.1+.
    pub enforce_first_as: bool,
    /// `ap`, `dp`, `pg`, `pol`, `redist`.
    pub raw: RawXml,
}

impl Object for BgpConfig {
    const KIND: &'static str = "bgp";
    const TAG: &'static str = "bgp";
    const THRESHOLDS: &'static [Threshold] = &[
        Threshold::new(8, 1, 0, Variant::V3),
        Threshold::new(8, 0, 0, Variant::V2),
    ];

    fn copy_from(&mut self, src: &Self) {
        *self = src.clone();
    }

    fn encode(&self, variant: Variant) -> Result<XmlNode> {
        let mut bgp = XmlNode::new(Self::TAG);
        codec::push_bool(&mut bgp, "enable", self.enable);
        codec::push_text(&mut bgp, "router-id", &self.router_id);
        codec::push_text(&mut bgp, "local-as", &self.as_number);
        codec::push_flag(&mut bgp, "install-route", self.install_route);
        codec::push_bool(&mut bgp, "reject-default-route", self.reject_default_route);
        codec::push_flag(
            &mut bgp,
            "allow-redist-default-route",
            self.allow_redistribute_default_route,
        );

        let mut options = XmlNode::new("routing-options");
        codec::push_text(&mut options, "as-format", &self.as_format);
        let mut med = XmlNode::new("med");
        codec::push_flag(&mut med, "always-compare-med", self.always_compare_med);
        codec::push_bool(
            &mut med,
            "deterministic-med-comparison",
            self.deterministic_med_comparison,
        );
        options.push(med);
        codec::push_int(&mut options, "default-local-preference", self.default_local_preference);

        let mut restart = XmlNode::new("graceful-restart");
        codec::push_bool(&mut restart, "enable", self.enable_graceful_restart);
        codec::push_int(&mut restart, "stale-route-time", self.stale_route_time);
        codec::push_int(&mut restart, "local-restart-time", self.local_restart_time);
        codec::push_int(&mut restart, "max-peer-restart-time", self.max_peer_restart_time);
        options.push(restart);

        codec::push_text(&mut options, "reflector-cluster-id", &self.reflector_cluster_id);
        codec::push_text(&mut options, "confederation-member-as", &self.confederation_member_as);
        options.push(
            XmlNode::new("aggregate")
                .child(XmlNode::with_text("aggregate-med", codec::yes_no(self.aggregate_med))),
        );
        if variant >= Variant::V3 {
            codec::push_flag(&mut options, "ecmp-multi-as", self.ecmp_multi_as);
            codec::push_bool(&mut options, "enforce-first-as", self.enforce_first_as);
        }
        bgp.push(options);

        if variant >= Variant::V2 && !self.bfd_profile.is_empty() {
            bgp.push(
                XmlNode::new("global-bfd")
                    .child(XmlNode::with_text("profile", self.bfd_profile.as_str())),
            );
        }

        for (tag, key) in OPAQUE {
            codec::push_raw(&mut bgp, tag, &self.raw, key)?;
        }
        Ok(bgp)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let bgp = Some(node);
        let options = node.get_child("routing-options");
        let restart = options.and_then(|o| o.get_child("graceful-restart"));

        let mut config = Self {
            enable: codec::flag(bgp, &["enable"]),
            router_id: codec::text(bgp, &["router-id"]),
            as_number: codec::text(bgp, &["local-as"]),
            install_route: codec::flag(bgp, &["install-route"]),
            reject_default_route: codec::bool_or(bgp, &["reject-default-route"], true),
            allow_redistribute_default_route: codec::flag(bgp, &["allow-redist-default-route"]),
            as_format: codec::text(options, &["as-format"]),
            always_compare_med: codec::flag(options, &["med", "always-compare-med"]),
            deterministic_med_comparison: codec::bool_or(
                options,
                &["med", "deterministic-med-comparison"],
                true,
            ),
            default_local_preference: codec::int_or(
                options,
                &["default-local-preference"],
                DEFAULT_LOCAL_PREFERENCE,
            )?,
            enable_graceful_restart: codec::bool_or(restart, &["enable"], true),
            stale_route_time: codec::int_or(restart, &["stale-route-time"], DEFAULT_RESTART_TIME)?,
            local_restart_time: codec::int_or(
                restart,
                &["local-restart-time"],
                DEFAULT_RESTART_TIME,
            )?,
            max_peer_restart_time: codec::int_or(
                restart,
                &["max-peer-restart-time"],
                DEFAULT_RESTART_TIME,
            )?,
            reflector_cluster_id: codec::text(options, &["reflector-cluster-id"]),
            confederation_member_as: codec::text(options, &["confederation-member-as"]),
            aggregate_med: codec::bool_or(options, &["aggregate", "aggregate-med"], true),
            ..Self::default()
        };

        if variant >= Variant::V2 {
            config.bfd_profile = codec::text(bgp, &["global-bfd", "profile"]);
        }
        if variant >= Variant::V3 {
            config.ecmp_multi_as = codec::flag(options, &["ecmp-multi-as"]);
            config.enforce_first_as = codec::bool_or(options, &["enforce-first-as"], true);
        }

        for (tag, key) in OPAQUE {
            codec::capture_raw(bgp, tag, key, &mut config.raw)?;
        }
        Ok(config)
    }
}

impl Singleton for BgpConfig {
    type Scope = VirtualRouterScope;

    fn xpath(scope: &VirtualRouterScope) -> Result<Vec<String>> {
        scope.bgp()
    }
}

crate::register_kind!(BgpConfig);
