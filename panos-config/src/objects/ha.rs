//! High availability device config.
//!
//! One per device. The HA interfaces and the link and path monitoring trees
//! are carried as opaque XML; PAN-OS 10.0 added HA clustering.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec::{self, RawXml};
use crate::error::{Error, Result};
use crate::object::{Object, Singleton, Threshold, Variant};
use crate::path::DeviceScope;

pub const ACTIVE_PASSIVE: &str = "active-passive";
pub const ACTIVE_ACTIVE: &str = "active-active";

pub const TIMERS_RECOMMENDED: &str = "recommended";
pub const TIMERS_AGGRESSIVE: &str = "aggressive";
pub const TIMERS_ADVANCED: &str = "advanced";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighAvailability {
    pub enable: bool,
    pub group_id: u32,
    pub description: String,
    /// Device default is on.
    pub config_sync_enable: bool,
    pub peer_ha1_ip_address: String,
    pub backup_peer_ha1_ip_address: String,

    /// [`ACTIVE_PASSIVE`] or [`ACTIVE_ACTIVE`].
    pub mode: String,
    pub ap_passive_link_state: String,
    pub ap_monitor_fail_hold_down_time: u32,
    pub aa_device_id: String,
    pub aa_tentative_hold_time: u32,

    pub election_device_priority: u32,
    pub election_preemptive: bool,
    pub election_heartbeat_backup: bool,
    /// Timer profile; [`TIMERS_ADVANCED`] uses the explicit timers below.
    pub election_timer_type: String,
    pub election_timer_promotion_hold_time: u32,
    pub election_timer_hello_interval: u32,
    pub election_timer_heartbeat_interval: u32,
    pub election_timer_flap_max: u32,
    pub election_timer_preemption_hold_time: u32,
    pub election_timer_monitor_fail_hold_up_time: u32,
    pub election_timer_additional_master_hold_up_time: u32,

    /// Device default is on.
    pub state_sync_enable: bool,
    pub state_sync_transport: String,
    pub ha2_keep_alive_enable: bool,
    pub ha2_keep_alive_action: String,
    pub ha2_keep_alive_threshold: u32,

    /// 10.0+.
    pub cluster_enable: bool,
    /// 10.0+.
    pub cluster_id: u32,
    /// 10.0+.
    pub cluster_description: String,

    /// `intf`: HA interfaces, `mon`: link and path monitoring.
    pub raw: RawXml,
}

impl Object for HighAvailability {
    const KIND: &'static str = "ha";
    const TAG: &'static str = "high-availability";
    const THRESHOLDS: &'static [Threshold] = &[Threshold::new(10, 0, 0, Variant::V2)];

    fn copy_from(&mut self, src: &Self) {
        *self = src.clone();
    }

    fn encode(&self, variant: Variant) -> Result<XmlNode> {
        let mut ha = XmlNode::new(Self::TAG);
        codec::push_bool(&mut ha, "enabled", self.enable);

        let mut group = XmlNode::new("group");
        codec::push_int(&mut group, "group-id", self.group_id);
        codec::push_text(&mut group, "description", &self.description);
        group.push(XmlNode::new("configuration-synchronization").child(XmlNode::with_text(
            "enabled",
            codec::yes_no(self.config_sync_enable),
        )));
        codec::push_text(&mut group, "peer-ip", &self.peer_ha1_ip_address);
        codec::push_text(&mut group, "peer-ip-backup", &self.backup_peer_ha1_ip_address);
        group.push_populated(self.encode_mode()?);
        group.push_populated(self.encode_election()?);
        group.push(self.encode_state_sync());
        codec::push_raw(&mut group, "monitoring", &self.raw, "mon")?;
        ha.push(group);

        codec::push_raw(&mut ha, "interface", &self.raw, "intf")?;

        if variant >= Variant::V2 {
            let mut cluster = XmlNode::new("cluster");
            codec::push_flag(&mut cluster, "enabled", self.cluster_enable);
            codec::push_int(&mut cluster, "cluster-id", self.cluster_id);
            codec::push_text(&mut cluster, "description", &self.cluster_description);
            ha.push_populated(cluster);
        }
        Ok(ha)
    }

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self> {
        let group = node.get_child("group");
        let mut ha = Self {
            enable: codec::flag(Some(node), &["enabled"]),
            group_id: codec::int(group, &["group-id"])?,
            description: codec::free_text(group, &["description"]),
            config_sync_enable: codec::bool_or(
                group,
                &["configuration-synchronization", "enabled"],
                true,
            ),
            peer_ha1_ip_address: codec::text(group, &["peer-ip"]),
            backup_peer_ha1_ip_address: codec::text(group, &["peer-ip-backup"]),
            ..Self::default()
        };

        let mode = codec::choice(
            group.and_then(|g| g.get_child("mode")),
            &[ACTIVE_PASSIVE, ACTIVE_ACTIVE],
        );
        if let Some(mode) = mode {
            ha.mode = mode.tag.clone();
            if mode.tag == ACTIVE_PASSIVE {
                ha.ap_passive_link_state = codec::text(Some(mode), &["passive-link-state"]);
                ha.ap_monitor_fail_hold_down_time =
                    codec::int(Some(mode), &["monitor-fail-hold-down-time"])?;
            } else {
                ha.aa_device_id = codec::text(Some(mode), &["device-id"]);
                ha.aa_tentative_hold_time = codec::int(Some(mode), &["tentative-hold-time"])?;
            }
        }

        let election = group.and_then(|g| g.get_child("election-option"));
        ha.election_device_priority = codec::int(election, &["device-priority"])?;
        ha.election_preemptive = codec::flag(election, &["preemptive"]);
        ha.election_heartbeat_backup = codec::flag(election, &["heartbeat-backup"]);
        let timers = codec::choice(
            election.and_then(|e| e.get_child("timers")),
            &[TIMERS_RECOMMENDED, TIMERS_AGGRESSIVE, TIMERS_ADVANCED],
        );
        if let Some(timers) = timers {
            ha.election_timer_type = timers.tag.clone();
            if timers.tag == TIMERS_ADVANCED {
                let t = Some(timers);
                ha.election_timer_promotion_hold_time = codec::int(t, &["promotion-hold-time"])?;
                ha.election_timer_hello_interval = codec::int(t, &["hello-interval"])?;
                ha.election_timer_heartbeat_interval = codec::int(t, &["heartbeat-interval"])?;
                ha.election_timer_flap_max = codec::int(t, &["flap-max"])?;
                ha.election_timer_preemption_hold_time = codec::int(t, &["preemption-hold-time"])?;
                ha.election_timer_monitor_fail_hold_up_time =
                    codec::int(t, &["monitor-fail-hold-up-time"])?;
                ha.election_timer_additional_master_hold_up_time =
                    codec::int(t, &["additional-master-hold-up-time"])?;
            }
        }

        let sync = group.and_then(|g| g.get_child("state-synchronization"));
        ha.state_sync_enable = codec::bool_or(sync, &["enabled"], true);
        ha.state_sync_transport = codec::text(sync, &["transport"]);
        ha.ha2_keep_alive_enable = codec::flag(sync, &["ha2-keep-alive", "enabled"]);
        ha.ha2_keep_alive_action = codec::text(sync, &["ha2-keep-alive", "action"]);
        ha.ha2_keep_alive_threshold = codec::int(sync, &["ha2-keep-alive", "threshold"])?;

        codec::capture_raw(group, "monitoring", "mon", &mut ha.raw)?;
        codec::capture_raw(Some(node), "interface", "intf", &mut ha.raw)?;

        if variant >= Variant::V2 {
            let cluster = node.get_child("cluster");
            ha.cluster_enable = codec::flag(cluster, &["enabled"]);
            ha.cluster_id = codec::int(cluster, &["cluster-id"])?;
            ha.cluster_description = codec::free_text(cluster, &["description"]);
        }
        Ok(ha)
    }
}

impl HighAvailability {
    fn encode_mode(&self) -> Result<XmlNode> {
        let mut mode = XmlNode::new("mode");
        match self.mode.as_str() {
            ACTIVE_PASSIVE => {
                let mut ap = XmlNode::new(ACTIVE_PASSIVE);
                codec::push_text(&mut ap, "passive-link-state", &self.ap_passive_link_state);
                codec::push_int(
                    &mut ap,
                    "monitor-fail-hold-down-time",
                    self.ap_monitor_fail_hold_down_time,
                );
                mode.push(ap);
            }
            ACTIVE_ACTIVE => {
                let mut aa = XmlNode::new(ACTIVE_ACTIVE);
                codec::push_text(&mut aa, "device-id", &self.aa_device_id);
                codec::push_int(&mut aa, "tentative-hold-time", self.aa_tentative_hold_time);
                mode.push(aa);
            }
            "" => {}
            other => return Err(Error::encode("mode", format!("unknown HA mode '{other}'"))),
        }
        Ok(mode)
    }

    fn encode_election(&self) -> Result<XmlNode> {
        let mut election = XmlNode::new("election-option");
        codec::push_int(&mut election, "device-priority", self.election_device_priority);
        codec::push_flag(&mut election, "preemptive", self.election_preemptive);
        codec::push_flag(&mut election, "heartbeat-backup", self.election_heartbeat_backup);

        let mut timers = XmlNode::new("timers");
        match self.election_timer_type.as_str() {
            "" => {}
            TIMERS_ADVANCED => {
                let mut advanced = XmlNode::new(TIMERS_ADVANCED);
                for (tag, value) in [
                    ("promotion-hold-time", self.election_timer_promotion_hold_time),
                    ("hello-interval", self.election_timer_hello_interval),
                    ("heartbeat-interval", self.election_timer_heartbeat_interval),
                    ("flap-max", self.election_timer_flap_max),
                    ("preemption-hold-time", self.election_timer_preemption_hold_time),
                    ("monitor-fail-hold-up-time", self.election_timer_monitor_fail_hold_up_time),
                    (
                        "additional-master-hold-up-time",
                        self.election_timer_additional_master_hold_up_time,
                    ),
                ] {
                    codec::push_int(&mut advanced, tag, value);
                }
                timers.push(advanced);
            }
            TIMERS_RECOMMENDED | TIMERS_AGGRESSIVE => {
                codec::push_marker(&mut timers, &self.election_timer_type)
            }
            other => {
                return Err(Error::encode(
                    "election_timer_type",
                    format!("unknown election timer profile '{other}'"),
                ))
            }
        }
        election.push_populated(timers);
        Ok(election)
    }

    fn encode_state_sync(&self) -> XmlNode {
        let mut sync = XmlNode::new("state-synchronization");
        codec::push_bool(&mut sync, "enabled", self.state_sync_enable);
        codec::push_text(&mut sync, "transport", &self.state_sync_transport);

        let mut keep_alive = XmlNode::new("ha2-keep-alive");
        codec::push_flag(&mut keep_alive, "enabled", self.ha2_keep_alive_enable);
        codec::push_text(&mut keep_alive, "action", &self.ha2_keep_alive_action);
        codec::push_int(&mut keep_alive, "threshold", self.ha2_keep_alive_threshold);
        sync.push_populated(keep_alive);
        sync
    }
}

impl Singleton for HighAvailability {
    type Scope = DeviceScope;

    fn xpath(scope: &DeviceScope) -> Result<Vec<String>> {
        let mut out = scope.root()?;
        out.push("deviceconfig".to_string());
        out.push("high-availability".to_string());
        Ok(out)
    }
}

crate::register_kind!(HighAvailability);

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use xml_tree::{equivalent, parse_str, write_compact};

    use super::*;
    use crate::path::join;

    fn active_passive() -> HighAvailability {
        HighAvailability {
            enable: true,
            group_id: 7,
            mode: ACTIVE_PASSIVE.to_string(),
            ap_passive_link_state: "auto".to_string(),
            ap_monitor_fail_hold_down_time: 30,
            config_sync_enable: true,
            peer_ha1_ip_address: "10.0.0.2".to_string(),
            ..HighAvailability::default()
        }
    }

    #[test]
    fn active_passive_emits_only_its_branch() {
        let node = active_passive().encode(Variant::V1).expect("encode");
        let xml = write_compact(&node).expect("write");
        assert!(xml.contains("<enabled>yes</enabled>"));
        assert!(xml.contains("<group-id>7</group-id>"));
        assert!(xml.contains(
            "<mode><active-passive><passive-link-state>auto</passive-link-state>\
             <monitor-fail-hold-down-time>30</monitor-fail-hold-down-time></active-passive></mode>"
        ));
        assert!(!xml.contains("active-active"));
        assert_eq!(
            HighAvailability::decode(&node, Variant::V1).expect("decode"),
            active_passive()
        );
    }

    #[test]
    fn round_trips_every_variant() {
        let v1 = HighAvailability {
            enable: true,
            group_id: 2,
            description: "pair".to_string(),
            backup_peer_ha1_ip_address: "10.1.0.2".to_string(),
            mode: ACTIVE_ACTIVE.to_string(),
            aa_device_id: "1".to_string(),
            aa_tentative_hold_time: 60,
            election_device_priority: 90,
            election_preemptive: true,
            election_timer_type: TIMERS_ADVANCED.to_string(),
            election_timer_hello_interval: 8000,
            election_timer_flap_max: 3,
            state_sync_enable: true,
            state_sync_transport: "ethernet".to_string(),
            ha2_keep_alive_enable: true,
            ha2_keep_alive_action: "log-only".to_string(),
            ha2_keep_alive_threshold: 10000,
            ..HighAvailability::default()
        };
        let mut v2 = v1.clone();
        v2.election_timer_type = TIMERS_AGGRESSIVE.to_string();
        v2.election_timer_hello_interval = 0;
        v2.election_timer_flap_max = 0;
        v2.cluster_enable = true;
        v2.cluster_id = 12;
        v2.cluster_description = "dc1".to_string();

        for (record, variant) in [(v1, Variant::V1), (v2, Variant::V2)] {
            let node = record.encode(variant).expect("encode");
            assert_eq!(HighAvailability::decode(&node, variant).expect("decode"), record);
        }
    }

    #[test]
    fn unknown_mode_is_an_encode_error() {
        let record = HighAvailability {
            mode: "active-standby".to_string(),
            ..active_passive()
        };
        let err = record.encode(Variant::V1).expect_err("invalid mode");
        assert!(matches!(err, Error::Encode { ref field, .. } if field == "mode"));
    }

    #[test]
    fn unknown_election_timer_type_is_an_encode_error() {
        let record = HighAvailability {
            election_timer_type: "fast".to_string(),
            ..active_passive()
        };
        let err = record.encode(Variant::V2).expect_err("invalid timer profile");
        assert!(
            matches!(err, Error::Encode { ref field, .. } if field == "election_timer_type")
        );
        assert!(err.to_string().contains("'fast'"));
    }

    #[test]
    fn sync_toggles_default_on_when_absent() {
        let node = parse_str("<high-availability><enabled>yes</enabled><group><group-id>1</group-id></group></high-availability>")
            .expect("parse");
        let ha = HighAvailability::decode(&node, Variant::V1).expect("decode");
        assert!(ha.config_sync_enable);
        assert!(ha.state_sync_enable);

        let disabled = HighAvailability {
            state_sync_enable: false,
            ..ha
        };
        let xml = write_compact(&disabled.encode(Variant::V1).expect("encode")).expect("write");
        assert!(xml.contains("<state-synchronization><enabled>no</enabled>"));
    }

    #[test]
    fn interfaces_and_monitoring_are_preserved() {
        let fixture = r#"
            <high-availability>
              <enabled>yes</enabled>
              <group>
                <group-id>1</group-id>
                <configuration-synchronization><enabled>yes</enabled></configuration-synchronization>
                <state-synchronization><enabled>yes</enabled></state-synchronization>
                <monitoring>
                  <link-monitoring>
                    <link-group><entry name="uplinks"><interface><member>ethernet1/1</member></interface></entry></link-group>
                  </link-monitoring>
                </monitoring>
              </group>
              <interface>
                <ha1><port>ha1-a</port></ha1>
                <ha2><port>ha2-a</port></ha2>
              </interface>
            </high-availability>"#;
        let node = parse_str(fixture).expect("parse");
        let ha = HighAvailability::decode(&node, Variant::V1).expect("decode");
        assert_eq!(
            ha.raw.get("intf").map(String::as_str),
            Some("<ha1><port>ha1-a</port></ha1><ha2><port>ha2-a</port></ha2>")
        );
        assert!(ha.raw.contains_key("mon"));

        let encoded = write_compact(&ha.encode(Variant::V1).expect("encode")).expect("write");
        assert!(equivalent(fixture.as_bytes(), encoded.as_bytes()).expect("compare"));
    }

    #[test]
    fn lives_under_deviceconfig() {
        assert_eq!(
            join(&HighAvailability::xpath(&DeviceScope::template("t1")).expect("xpath")),
            "/config/devices/entry[@name='localhost.localdomain']/template/entry[@name='t1']\
             /config/devices/entry[@name='localhost.localdomain']/deviceconfig/high-availability"
        );
    }
}
