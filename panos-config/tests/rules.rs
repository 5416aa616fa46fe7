mod common;

use common::{Call, FakeDevice};
use panos_config::objects::decryption::{DecryptionRule, TYPE_SSL_FORWARD_PROXY};
use panos_config::objects::pbf::{PbfRule, ACTION_DISCARD};
use panos_config::rules::{plan_rules, AuditComment, HitCount};
use panos_config::{
    ConfigureOptions, Error, MovePosition, Movement, Namespace, Object, Rule, RuleScope,
    Rulebase, Variant,
};
use pretty_assertions::assert_eq;
use xml_tree::{parse_str, write_compact, XmlNode};

const RULES: &str = "/config/devices/entry[@name='localhost.localdomain']/vsys/entry[@name='vsys1']\
                     /rulebase/decryption/rules";

fn rule_xpath(name: &str) -> String {
    format!("{RULES}/entry[@name='{name}']")
}

fn rule(name: &str, action: &str) -> DecryptionRule {
    DecryptionRule {
        name: name.to_string(),
        source_zones: vec!["trust".to_string()],
        destination_zones: vec!["untrust".to_string()],
        source_addresses: vec!["any".to_string()],
        destination_addresses: vec!["any".to_string()],
        services: vec!["any".to_string()],
        url_categories: vec!["any".to_string()],
        action: action.to_string(),
        decryption_type: TYPE_SSL_FORWARD_PROXY.to_string(),
        log_failed_tls_handshakes: true,
        ..DecryptionRule::default()
    }
}

fn with_uuid(mut rule: DecryptionRule, uuid: &str) -> DecryptionRule {
    rule.set_uuid(uuid);
    rule
}

fn compact(rule: &DecryptionRule) -> String {
    write_compact(&rule.encode(Variant::V4).expect("encode")).expect("write")
}

/// A 10.0 firewall whose decryption rulebase holds `existing`.
fn device_with(existing: &[DecryptionRule]) -> FakeDevice {
    let device = FakeDevice::new("10.0.2");
    device.respond(
        RULES,
        existing
            .iter()
            .map(|rule| rule.encode(Variant::V4).expect("encode"))
            .collect(),
    );
    device
}

#[test]
fn partial_change_sets_only_new_rules_and_edits_changed_ones() {
    let a = with_uuid(rule("A", "decrypt"), "11111111-1111-1111-1111-111111111111");
    let b = with_uuid(rule("B", "decrypt"), "22222222-2222-2222-2222-222222222222");
    let device = device_with(&[a.clone(), b]);

    let a_prime = rule("A", "no-decrypt");
    let requested = vec![a_prime.clone(), rule("B", "decrypt"), rule("C", "decrypt")];
    let options = ConfigureOptions {
        movement: Movement::Before("deny-all".to_string()),
        ..ConfigureOptions::default()
    };

    Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(&RuleScope::vsys("vsys1"), &requested, &options)
        .expect("configure");

    let edited = with_uuid(a_prime, a.uuid());
    assert_eq!(
        device.writes(),
        vec![
            Call::Set {
                xpath: RULES.to_string(),
                elements: vec![compact(&rule("C", "decrypt"))],
            },
            Call::Edit {
                xpath: rule_xpath("A"),
                element: compact(&edited),
            },
            Call::Move {
                xpath: rule_xpath("A"),
                position: MovePosition::Before,
                reference: "deny-all".to_string(),
            },
            Call::Move {
                xpath: rule_xpath("B"),
                position: MovePosition::After,
                reference: "A".to_string(),
            },
            Call::Move {
                xpath: rule_xpath("C"),
                position: MovePosition::After,
                reference: "B".to_string(),
            },
        ]
    );
}

#[test]
fn bulk_rejection_reports_the_offending_rule_index() {
    let device = FakeDevice::new("10.0.0").rejecting(&["bad"]);
    let requested = vec![
        rule("good-1", "decrypt"),
        rule("bad", "decrypt"),
        rule("good-2", "decrypt"),
    ];

    let err = Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(&RuleScope::vsys("vsys1"), &requested, &ConfigureOptions::default())
        .expect_err("bulk set fails");

    match err {
        Error::BulkRuleInvalid {
            index,
            name,
            message,
        } => {
            assert_eq!(index, 1);
            assert_eq!(name, "bad");
            assert_eq!(message, "bad -> from is invalid");
        }
        other => panic!("unexpected error: {other}"),
    }

    let sets: Vec<usize> = device
        .writes()
        .into_iter()
        .filter_map(|call| match call {
            Call::Set { elements, .. } => Some(elements.len()),
            _ => None,
        })
        .collect();
    assert_eq!(sets, vec![3, 1, 1]);
}

#[test]
fn other_set_failures_are_passed_through() {
    let device = FakeDevice::new("10.0.0").rejecting(&["bad"]);
    let options = ConfigureOptions {
        bulk_invalid_marker: "something else".to_string(),
        ..ConfigureOptions::default()
    };
    let err = Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(
            &RuleScope::vsys("vsys1"),
            &[rule("bad", "decrypt"), rule("ok", "decrypt")],
            &options,
        )
        .expect_err("set fails");
    assert!(matches!(err, Error::Transport { op: "set", .. }));
    assert_eq!(device.writes().len(), 1);
}

#[test]
fn policy_mode_deletes_rules_missing_from_the_request() {
    let device = device_with(&[rule("A", "decrypt"), rule("B", "decrypt"), rule("X", "decrypt")]);
    let options = ConfigureOptions {
        policy: true,
        ..ConfigureOptions::default()
    };
    Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(
            &RuleScope::vsys("vsys1"),
            &[rule("A", "decrypt"), rule("B", "decrypt")],
            &options,
        )
        .expect("configure");

    assert_eq!(
        device.writes(),
        vec![Call::Delete {
            xpath: rule_xpath("X")
        }]
    );
}

#[test]
fn previous_names_are_advisory() {
    let existing = [rule("A", "decrypt"), rule("B", "decrypt"), rule("Y", "decrypt")];
    let requested = [rule("A", "decrypt"), rule("B", "decrypt")];

    let device = device_with(&existing);
    Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(&RuleScope::vsys("vsys1"), &requested, &ConfigureOptions::default())
        .expect("configure");
    assert!(device.writes().is_empty());

    let device = device_with(&existing);
    let options = ConfigureOptions {
        previous_names: vec!["Y".to_string(), "Z".to_string(), "A".to_string()],
        ..ConfigureOptions::default()
    };
    Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(&RuleScope::vsys("vsys1"), &requested, &options)
        .expect("configure");
    assert_eq!(
        device.writes(),
        vec![Call::Delete {
            xpath: rule_xpath("Y")
        }]
    );
}

#[test]
fn audit_comment_follows_every_create_and_edit() {
    let device = device_with(&[rule("A", "decrypt")]);
    let options = ConfigureOptions {
        audit_comment: "CHG-1042".to_string(),
        ..ConfigureOptions::default()
    };
    Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(
            &RuleScope::vsys("vsys1"),
            &[rule("A", "no-decrypt"), rule("C", "decrypt")],
            &options,
        )
        .expect("configure");

    let audit = |name: &str| {
        let command = XmlNode::new("set").child(
            XmlNode::new("audit-comment")
                .child(XmlNode::with_text("xpath", rule_xpath(name)))
                .child(XmlNode::with_text("comment", "CHG-1042")),
        );
        Call::Op {
            command: write_compact(&command).expect("write"),
            vsys: String::new(),
        }
    };
    let calls = device.calls();
    assert_eq!(calls.len(), 4);
    assert!(matches!(&calls[0], Call::Set { .. }));
    assert_eq!(calls[1], audit("C"));
    assert!(matches!(&calls[2], Call::Edit { .. }));
    assert_eq!(calls[3], audit("A"));
}

#[test]
fn rules_match_agrees_with_the_plan() {
    let base = with_uuid(rule("A", "decrypt"), "11111111-1111-1111-1111-111111111111");
    let mut more_zones = base.clone();
    more_zones.source_zones.push("dmz".to_string());
    let mut shuffled = more_zones.clone();
    shuffled.source_zones.reverse();

    let candidates = [
        (base.clone(), rule("A", "decrypt")),
        (base.clone(), rule("A", "no-decrypt")),
        (more_zones, shuffled),
        (base.clone(), with_uuid(rule("A", "decrypt"), "other")),
        (base, DecryptionRule { disabled: true, ..rule("A", "decrypt") }),
    ];
    for (existing, requested) in candidates {
        let plan = plan_rules(
            std::slice::from_ref(&existing),
            std::slice::from_ref(&requested),
            Variant::V4,
        )
        .expect("plan");
        assert_eq!(
            existing.rules_match(&requested),
            plan.unchanged == vec!["A".to_string()],
            "{requested:?}"
        );
        assert_eq!(plan.create.len(), 0);
    }
}

#[test]
fn fields_the_firmware_cannot_hold_are_not_a_change() {
    let requested = DecryptionRule {
        source_hips: vec!["managed".to_string()],
        log_setting: "forward-to-panorama".to_string(),
        ..rule("A", "decrypt")
    };
    let device = FakeDevice::new("9.0.0");
    device.respond(RULES, vec![requested.encode(Variant::V3).expect("encode")]);

    Namespace::<DecryptionRule, _>::new(&device)
        .configure_rules(
            &RuleScope::vsys("vsys1"),
            std::slice::from_ref(&requested),
            &ConfigureOptions::default(),
        )
        .expect("configure");
    assert_eq!(device.writes(), Vec::new());

    let stored = DecryptionRule::decode(&requested.encode(Variant::V3).expect("encode"), Variant::V3)
        .expect("decode");
    let at = |variant| {
        plan_rules(
            std::slice::from_ref(&stored),
            std::slice::from_ref(&requested),
            variant,
        )
        .expect("plan")
    };
    assert_eq!(at(Variant::V3).unchanged, vec!["A".to_string()]);
    assert_eq!(at(Variant::V4).edit.len(), 1);
}

#[test]
fn hit_counts_are_read_per_vsys() {
    let device = FakeDevice::new("10.0.0");
    device.respond_op(
        parse_str(
            r#"<response status="success"><result><rule-hit-count><vsys><entry name="vsys1">
                 <rule-base><entry name="decryption"><rules>
                   <entry name="A">
                     <latest>yes</latest>
                     <hit-count>42</hit-count>
                     <last-hit-timestamp>1700000100</last-hit-timestamp>
                     <last-reset-timestamp>0</last-reset-timestamp>
                     <first-hit-timestamp>1700000000</first-hit-timestamp>
                     <rule-creation-timestamp>1690000000</rule-creation-timestamp>
                     <rule-modification-timestamp>1695000000</rule-modification-timestamp>
                   </entry>
                 </rules></entry></rule-base>
               </entry></vsys></rule-hit-count></result></response>"#,
        )
        .expect("parse"),
    );

    let namespace = Namespace::<DecryptionRule, _>::new(&device);
    let counts = namespace
        .hit_count(&RuleScope::vsys("vsys1"), &["A"])
        .expect("hit count");
    assert_eq!(
        counts,
        vec![HitCount {
            name: "A".to_string(),
            latest: true,
            hit_count: 42,
            last_hit: 1_700_000_100,
            last_reset: 0,
            first_hit: 1_700_000_000,
            created: 1_690_000_000,
            modified: 1_695_000_000,
        }]
    );
    assert_eq!(
        device.calls(),
        vec![Call::Op {
            command: "<show><rule-hit-count><vsys><vsys-name><entry name=\"vsys1\"><rule-base>\
                      <entry name=\"decryption\"><rules><list><member>A</member></list></rules>\
                      </entry></rule-base></entry></vsys-name></vsys></rule-hit-count></show>"
                .to_string(),
            vsys: String::new(),
        }]
    );

    let err = namespace
        .hit_count(&RuleScope::device_group("dg1", Rulebase::Pre), &[])
        .expect_err("panorama");
    assert!(matches!(err, Error::Semantic(_)));
}

#[test]
fn audit_history_reads_config_logs() {
    let device = FakeDevice::new("10.0.0");
    device.respond_op(
        parse_str(
            r#"<response status="success"><result><log><logs count="1">
                 <entry>
                   <admin>admin</admin>
                   <comment>CHG-1042</comment>
                   <config_ver>12</config_ver>
                   <time_generated>2024/01/02 10:00:00</time_generated>
                 </entry>
               </logs></log></result></response>"#,
        )
        .expect("parse"),
    );

    let history = Namespace::<DecryptionRule, _>::new(&device)
        .audit_comment_history(&RuleScope::vsys("vsys1"), "A", 10, 0)
        .expect("history");
    assert_eq!(
        history,
        vec![AuditComment {
            admin: "admin".to_string(),
            comment: "CHG-1042".to_string(),
            config_version: 12,
            time_generated: "2024/01/02 10:00:00".to_string(),
        }]
    );
    assert_eq!(
        device.calls(),
        vec![Call::Logs {
            log_type: "config".to_string(),
            query: "(subtype eq audit-comment) and (path contains 'A')".to_string(),
        }]
    );
}

#[test]
fn current_audit_comment_reads_the_op_result() {
    let device = FakeDevice::new("10.0.0");
    device.respond_op(
        parse_str(
            r#"<response status="success"><result><entry name="x"><comment>pending</comment></entry></result></response>"#,
        )
        .expect("parse"),
    );
    let comment = Namespace::<DecryptionRule, _>::new(&device)
        .current_audit_comment(&RuleScope::vsys("vsys1"), "A")
        .expect("comment");
    assert_eq!(comment, "pending");
}

#[test]
fn bottom_move_on_a_panorama_post_rulebase() {
    let device = FakeDevice::new("10.0.0");
    let rules: Vec<PbfRule> = ["p1", "p2"]
        .iter()
        .map(|name| PbfRule {
            name: name.to_string(),
            action: ACTION_DISCARD.to_string(),
            ..PbfRule::default()
        })
        .collect();
    let scope = RuleScope::device_group("branch", Rulebase::Post);
    Namespace::<PbfRule, _>::new(&device)
        .move_group(&scope, &Movement::Bottom, &rules)
        .expect("move");

    let base = "/config/devices/entry[@name='localhost.localdomain']/device-group/entry[@name='branch']\
                /post-rulebase/pbf/rules";
    assert_eq!(
        device.calls(),
        vec![
            Call::Move {
                xpath: format!("{base}/entry[@name='p2']"),
                position: MovePosition::Bottom,
                reference: String::new(),
            },
            Call::Move {
                xpath: format!("{base}/entry[@name='p1']"),
                position: MovePosition::Before,
                reference: "p2".to_string(),
            },
        ]
    );
}
