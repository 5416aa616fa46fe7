mod common;

use common::{wrap, Call, FakeDevice};
use panos_config::objects::ethernet::MODE_LAYER3;
use panos_config::objects::ha::ACTIVE_PASSIVE;
use panos_config::objects::layer3::Layer3;
use panos_config::objects::service::TCP;
use panos_config::objects::zone::MODE_LAYER3 as ZONE_LAYER3;
use panos_config::objects::security_rule::ACTION_ALLOW;
use panos_config::objects::{
    Address, BgpConfig, DecryptionRule, Ethernet, HighAvailability, SecurityRule, Service,
    VirtualRouter, Zone,
};
use panos_config::registry;
use panos_config::{
    specify, ConfigureOptions, DeviceScope, Error, InterfaceScope, Location, Namespace, Object,
    RuleScope, Rulebase, SingletonNamespace, Variant, Version, VirtualRouterScope,
};
use pretty_assertions::assert_eq;
use xml_tree::{parse_str, write_compact};

const LOCALHOST: &str = "/config/devices/entry[@name='localhost.localdomain']";

fn version(raw: &str) -> Version {
    raw.parse().expect("version")
}

fn encoded<T: Object>(record: &T, firmware: &str) -> String {
    let (_, encoder) = specify::<T>(&version(firmware));
    write_compact(&encoder.encode(record).expect("encode")).expect("write")
}

fn ha_record() -> HighAvailability {
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
fn ha_active_passive_is_written_under_deviceconfig() {
    let device = FakeDevice::new("9.1.0");
    let namespace = SingletonNamespace::<HighAvailability, _>::new(&device);
    namespace
        .set(&DeviceScope::firewall(), &ha_record())
        .expect("set");

    let calls = device.calls();
    let Call::Set { xpath, elements } = &calls[0] else {
        panic!("expected a set, got {calls:?}");
    };
    assert_eq!(xpath, &format!("{LOCALHOST}/deviceconfig"));
    assert_eq!(elements.len(), 1);
    let body = &elements[0];
    assert!(body.starts_with("<high-availability>"));
    assert!(body.contains("<enabled>yes</enabled>"));
    assert!(body.contains("<group-id>7</group-id>"));
    assert!(body.contains(
        "<mode><active-passive><passive-link-state>auto</passive-link-state>\
         <monitor-fail-hold-down-time>30</monitor-fail-hold-down-time></active-passive></mode>"
    ));
    assert!(!body.contains("active-active"));
    assert!(!body.contains("<cluster>"));

    let xpath = format!("{LOCALHOST}/deviceconfig/high-availability");
    device.respond_raw(&xpath, wrap(parse_str(body).expect("parse")));
    assert_eq!(namespace.get(&DeviceScope::firewall()).expect("get"), ha_record());
}

#[test]
fn zone_acls_are_member_lists() {
    let zone = Zone {
        name: "trust".to_string(),
        mode: ZONE_LAYER3.to_string(),
        interfaces: vec!["ethernet1/1".to_string(), "ethernet1/2".to_string()],
        include_acls: vec!["10.0.0.0/8".to_string()],
        exclude_acls: vec!["10.0.99.0/24".to_string()],
        enable_user_id: true,
        ..Zone::default()
    };
    let body = encoded(&zone, "10.1.0");
    assert!(body.contains(
        "<network><layer3><member>ethernet1/1</member><member>ethernet1/2</member></layer3></network>"
    ));
    assert!(body.contains(
        "<user-acl><include-list><member>10.0.0.0/8</member></include-list>\
         <exclude-list><member>10.0.99.0/24</member></exclude-list></user-acl>"
    ));
    assert!(body.contains("<enable-user-identification>yes</enable-user-identification>"));
}

#[test]
fn service_timeout_override_on_newer_firmware() {
    let service = Service {
        name: "web".to_string(),
        protocol: TCP.to_string(),
        destination_port: "80".to_string(),
        override_session_timeout: true,
        override_timeout: 300,
        override_half_closed_timeout: 60,
        override_time_wait_timeout: 15,
        ..Service::default()
    };
    let override_block = "<tcp><port>80</port><override><yes><timeout>300</timeout>\
                          <halfclose-timeout>60</halfclose-timeout>\
                          <timewait-timeout>15</timewait-timeout></yes></override></tcp>";

    assert!(encoded(&service, "9.0.0").contains(override_block));
    let older = encoded(&service, "8.0.0");
    assert!(!older.contains("override"));
    assert!(older.contains("<tcp><port>80</port></tcp>"));
}

#[test]
fn decryption_variant_follows_firmware() {
    let kind = registry::find("decryption-rule").expect("registered");
    for (firmware, expected) in [
        ("10.0.0", Variant::V4),
        ("9.0.0", Variant::V3),
        ("8.1.0", Variant::V2),
        ("8.0.0", Variant::V1),
    ] {
        assert_eq!((kind.variant_for)(&version(firmware)), expected, "{firmware}");
        assert_eq!(DecryptionRule::variant_for(&version(firmware)), expected);
    }
}

#[test]
fn bgp_auth_profiles_survive_a_read_modify_write() {
    let device = FakeDevice::new("10.0.0");
    let scope = VirtualRouterScope::new(DeviceScope::firewall(), "default");
    let xpath = format!(
        "{LOCALHOST}/network/virtual-router/entry[@name='default']/protocol/bgp"
    );
    device.respond_raw(
        &xpath,
        wrap(
            parse_str(
                r#"<bgp>
                     <enable>yes</enable>
                     <router-id>10.0.0.1</router-id>
                     <local-as>65001</local-as>
                     <auth-profile>
                       <entry name="md5">
                         <secret>-AQ==encrypted</secret>
                       </entry>
                     </auth-profile>
                   </bgp>"#,
            )
            .expect("parse"),
        ),
    );

    let namespace = SingletonNamespace::<BgpConfig, _>::new(&device);
    let mut config = namespace.get(&scope).expect("get");
    assert_eq!(
        config.raw.get("ap").map(String::as_str),
        Some(r#"<entry name="md5"><secret>-AQ==encrypted</secret></entry>"#)
    );

    config.router_id = "10.0.0.2".to_string();
    namespace.edit(&scope, &config).expect("edit");
    let Some(Call::Edit { xpath: edited, element }) = device.calls().pop() else {
        panic!("expected an edit");
    };
    assert_eq!(edited, xpath);
    assert!(element.contains("<router-id>10.0.0.2</router-id>"));
    assert!(element.contains(
        r#"<auth-profile><entry name="md5"><secret>-AQ==encrypted</secret></entry></auth-profile>"#
    ));
}

#[test]
fn copies_do_not_share_state() {
    let mut source = Zone {
        name: "trust".to_string(),
        mode: ZONE_LAYER3.to_string(),
        interfaces: vec!["ethernet1/1".to_string()],
        ..Zone::default()
    };
    let mut copy = Zone {
        name: "dmz".to_string(),
        ..Zone::default()
    };
    copy.copy_from(&source);
    source.interfaces.push("ethernet1/9".to_string());

    assert_eq!(copy.name, "dmz");
    assert_eq!(copy.mode, ZONE_LAYER3);
    assert_eq!(copy.interfaces, vec!["ethernet1/1".to_string()]);
}

#[test]
fn names_travel_as_the_entry_attribute() {
    let address = Address {
        name: "web-server".to_string(),
        value_type: "ip-netmask".to_string(),
        value: "10.1.1.10/32".to_string(),
        ..Address::default()
    };
    let body = encoded(&address, "10.0.0");
    assert!(body.starts_with(r#"<entry name="web-server">"#));
    assert!(!body.contains("<name>"));
}

#[test]
fn interfaces_are_imported_into_and_removed_from_a_vsys() {
    let device = FakeDevice::new("10.0.0");
    let scope = InterfaceScope {
        device: DeviceScope::firewall(),
        vsys: "vsys2".to_string(),
    };
    let port = Ethernet {
        name: "ethernet1/3".to_string(),
        mode: MODE_LAYER3.to_string(),
        layer3: Layer3 {
            static_ips: vec!["192.0.2.1/24".to_string()],
            ..Layer3::default()
        },
        ..Ethernet::default()
    };
    let namespace = Namespace::<Ethernet, _>::new(&device);
    namespace.set(&scope, std::slice::from_ref(&port)).expect("set");
    namespace.delete(&scope, &["ethernet1/3"]).expect("delete");

    let imports = format!("{LOCALHOST}/vsys/entry[@name='vsys2']/import/network/interface");
    assert_eq!(
        device.calls(),
        vec![
            Call::Set {
                xpath: format!("{LOCALHOST}/network/interface/ethernet"),
                elements: vec![encoded(&port, "10.0.0")],
            },
            Call::Set {
                xpath: imports.clone(),
                elements: vec!["<member>ethernet1/3</member>".to_string()],
            },
            Call::Delete {
                xpath: format!("{imports}/member[text()='ethernet1/3']"),
            },
            Call::Delete {
                xpath: format!("{LOCALHOST}/network/interface/ethernet/entry[@name='ethernet1/3']"),
            },
        ]
    );
}

#[test]
fn reads_of_missing_objects() {
    let device = FakeDevice::new("10.0.0");
    let namespace = Namespace::<Zone, _>::new(&device);
    let scope = Location::vsys("vsys1");

    assert!(namespace.get_all(&scope).expect("get_all").is_empty());
    assert!(namespace.get_list(&scope).expect("get_list").is_empty());
    let err = namespace.get(&scope, "trust").expect_err("missing");
    assert!(matches!(err, Error::NotFound { .. }));
    assert!(err.is_not_found());
}

#[test]
fn listing_reads_entry_names() {
    let device = FakeDevice::new("10.0.0");
    let zones: Vec<Zone> = ["trust", "untrust"]
        .iter()
        .map(|name| Zone {
            name: name.to_string(),
            mode: ZONE_LAYER3.to_string(),
            ..Zone::default()
        })
        .collect();
    device.respond(
        &format!("{LOCALHOST}/vsys/entry[@name='vsys1']/zone"),
        zones
            .iter()
            .map(|zone| zone.encode(Variant::V3).expect("encode"))
            .collect(),
    );

    let namespace = Namespace::<Zone, _>::new(&device);
    let scope = Location::vsys("vsys1");
    assert_eq!(
        namespace.get_list(&scope).expect("list"),
        vec!["trust".to_string(), "untrust".to_string()]
    );
    assert_eq!(namespace.get_all(&scope).expect("all"), zones);
    assert_eq!(namespace.show_list(&scope).expect("show list").len(), 2);
    assert_eq!(namespace.show_all(&scope).expect("show all"), zones);

    namespace.delete_records(&scope, &zones).expect("delete");
    assert_eq!(
        device.writes(),
        vec![Call::Delete {
            xpath: format!(
                "{LOCALHOST}/vsys/entry[@name='vsys1']/zone/entry[@name='trust' or @name='untrust']"
            ),
        }]
    );
}

#[test]
fn virtual_routers_are_imported_into_the_router_list() {
    let device = FakeDevice::new("10.0.0");
    let scope = InterfaceScope::new(DeviceScope::firewall(), "vsys2");
    let router = VirtualRouter {
        name: "branch".to_string(),
        interfaces: vec!["ethernet1/3".to_string()],
        ..VirtualRouter::default()
    };
    let namespace = Namespace::<VirtualRouter, _>::new(&device);
    namespace.set(&scope, std::slice::from_ref(&router)).expect("set");
    namespace.delete(&scope, &["branch"]).expect("delete");

    let imports = format!("{LOCALHOST}/vsys/entry[@name='vsys2']/import/network/virtual-router");
    assert_eq!(
        device.calls(),
        vec![
            Call::Set {
                xpath: format!("{LOCALHOST}/network/virtual-router"),
                elements: vec![encoded(&router, "10.0.0")],
            },
            Call::Set {
                xpath: imports.clone(),
                elements: vec!["<member>branch</member>".to_string()],
            },
            Call::Delete {
                xpath: format!("{imports}/member[text()='branch']"),
            },
            Call::Delete {
                xpath: format!("{LOCALHOST}/network/virtual-router/entry[@name='branch']"),
            },
        ]
    );
}

fn web_rule() -> SecurityRule {
    SecurityRule {
        name: "allow-web".to_string(),
        source_zones: vec!["trust".to_string()],
        destination_zones: vec!["untrust".to_string()],
        source_addresses: vec!["any".to_string()],
        destination_addresses: vec!["any".to_string()],
        applications: vec!["web-browsing".to_string()],
        services: vec!["application-default".to_string()],
        action: ACTION_ALLOW.to_string(),
        log_end: true,
        ..SecurityRule::default()
    }
}

#[test]
fn security_rules_go_to_the_device_group_pre_rulebase() {
    let device = FakeDevice::new("10.0.0");
    let scope = RuleScope::device_group("branch", Rulebase::Pre);
    Namespace::<SecurityRule, _>::new(&device)
        .set(&scope, &[web_rule()])
        .expect("set");

    let Some(Call::Set { xpath, elements }) = device.writes().pop() else {
        panic!("expected a set");
    };
    assert_eq!(
        xpath,
        format!("{LOCALHOST}/device-group/entry[@name='branch']/pre-rulebase/security/rules")
    );
    assert_eq!(elements, vec![encoded(&web_rule(), "10.0.0")]);
}

#[test]
fn security_rule_hips_are_not_a_change_on_older_firmware() {
    let requested = SecurityRule {
        source_hips: vec!["managed".to_string()],
        group_tag: "web".to_string(),
        ..web_rule()
    };
    let rules = format!("{LOCALHOST}/vsys/entry[@name='vsys1']/rulebase/security/rules");
    let device = FakeDevice::new("9.1.0");
    device.respond(&rules, vec![requested.encode(Variant::V2).expect("encode")]);

    Namespace::<SecurityRule, _>::new(&device)
        .configure_rules(
            &RuleScope::vsys("vsys1"),
            std::slice::from_ref(&requested),
            &ConfigureOptions::default(),
        )
        .expect("configure");
    assert_eq!(device.writes(), Vec::new());
}
