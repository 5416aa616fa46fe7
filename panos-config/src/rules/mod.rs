//! Operations specific to ordered rulebases: group moves, audit comments,
//! hit counts, and the [`Namespace::configure_rules`] orchestrator.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};
use crate::namespace::Namespace;
use crate::object::{Entry, Variant};
use crate::path::{self, RuleScope};
use crate::settings::Settings;
use crate::transport::{LogQuery, MovePosition, Transport};

/// A policy rule class.
pub trait Rule: Entry<Scope = RuleScope> {
    /// Rulebase element holding this rule type (`decryption`, `pbf`).
    const RULE_TYPE: &'static str;

    /// Device-assigned identifier; empty on firmware without rule UUIDs.
    fn uuid(&self) -> &str;

    fn set_uuid(&mut self, uuid: &str);

    /// Field equality ignoring the uuid. Unordered list fields compare as
    /// sets.
    fn rules_match(&self, other: &Self) -> bool;
}

/// Where [`Namespace::move_group`] places a group of rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "where", content = "reference")]
pub enum Movement {
    /// Leave the rules where the device put them.
    #[default]
    Skip,
    /// Before the named rule. An empty name leaves the first rule in place.
    Before(String),
    /// After the named rule. An empty name leaves the first rule in place.
    After(String),
    Top,
    Bottom,
}

/// One `move` action: entry, position, and reference entry.
pub type MoveStep = (String, MovePosition, String);

/// The moves that place `names`, in order, at `movement`.
///
/// The first rule (the last one for [`Movement::Bottom`]) anchors the group;
/// every other rule is then moved next to its neighbor.
pub fn move_plan(movement: &Movement, names: &[&str]) -> Result<Vec<MoveStep>> {
    if names.is_empty() || *movement == Movement::Skip {
        return Ok(Vec::new());
    }

    let mut plan = Vec::with_capacity(names.len());
    let anchor = match movement {
        Movement::Before(reference) | Movement::After(reference) => {
            if names.contains(&reference.as_str()) {
                return Err(Error::Semantic(format!(
                    "reference rule '{reference}' is part of the group being moved"
                )));
            }
            if reference.is_empty() {
                None
            } else if matches!(movement, Movement::Before(_)) {
                Some((MovePosition::Before, reference.clone()))
            } else {
                Some((MovePosition::After, reference.clone()))
            }
        }
        Movement::Top => Some((MovePosition::Top, String::new())),
        Movement::Bottom => {
            let last = names.len() - 1;
            plan.push((names[last].to_string(), MovePosition::Bottom, String::new()));
            for idx in (0..last).rev() {
                plan.push((
                    names[idx].to_string(),
                    MovePosition::Before,
                    names[idx + 1].to_string(),
                ));
            }
            return Ok(plan);
        }
        Movement::Skip => None,
    };

    if let Some((position, reference)) = anchor {
        plan.push((names[0].to_string(), position, reference));
    }
    for pair in names.windows(2) {
        plan.push((pair[1].to_string(), MovePosition::After, pair[0].to_string()));
    }
    Ok(plan)
}

/// One entry of a rule's audit-comment history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditComment {
    pub admin: String,
    pub comment: String,
    pub config_version: u32,
    pub time_generated: String,
}

/// Hit counter of one rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct HitCount {
    pub name: String,
    pub latest: bool,
    pub hit_count: u64,
    pub last_hit: u64,
    pub last_reset: u64,
    pub first_hit: u64,
    pub created: u64,
    pub modified: u64,
}

/// Inputs of [`Namespace::configure_rules`] besides the rules themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigureOptions {
    /// Attached to every created or edited rule when non-empty.
    pub audit_comment: String,
    /// Delete every existing rule missing from the requested list.
    pub policy: bool,
    pub movement: Movement,
    /// Names the caller used previously; any not requested again is removed.
    pub previous_names: Vec<String>,
    pub bulk_invalid_marker: String,
}

impl Default for ConfigureOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl ConfigureOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            audit_comment: String::new(),
            policy: false,
            movement: Movement::Skip,
            previous_names: Vec::new(),
            bulk_invalid_marker: settings.bulk_invalid_marker.clone(),
        }
    }
}

/// How the orchestrator classified each requested rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RulePlan<T> {
    /// Caller index and rule.
    pub create: Vec<(usize, T)>,
    pub edit: Vec<T>,
    pub unchanged: Vec<String>,
}

/// Partition `requested` against `existing`: absent names are created,
/// present names whose content differs are edited, the rest are left alone.
/// Edited rules without a uuid inherit the existing one.
///
/// Both sides are compared as the device at `variant` would store them, so
/// fields the firmware cannot hold never count as a change.
pub fn plan_rules<T: Rule>(
    existing: &[T],
    requested: &[T],
    variant: Variant,
) -> Result<RulePlan<T>> {
    let by_name: BTreeMap<&str, &T> = existing.iter().map(|rule| (rule.name(), rule)).collect();
    let mut plan = RulePlan {
        create: Vec::new(),
        edit: Vec::new(),
        unchanged: Vec::new(),
    };
    for (idx, rule) in requested.iter().enumerate() {
        let Some(current) = by_name.get(rule.name()) else {
            plan.create.push((idx, rule.clone()));
            continue;
        };
        if as_stored(*current, variant)?.rules_match(&as_stored(rule, variant)?) {
            plan.unchanged.push(rule.name().to_string());
            continue;
        }
        let mut rule = rule.clone();
        if rule.uuid().is_empty() {
            rule.set_uuid(current.uuid());
        }
        plan.edit.push(rule);
    }
    Ok(plan)
}

/// `rule` after a trip through the wire form of `variant`.
fn as_stored<T: Rule>(rule: &T, variant: Variant) -> Result<T> {
    T::decode(&rule.encode(variant)?, variant)
}

impl<'a, T, C> Namespace<'a, T, C>
where
    T: Rule,
    C: Transport + ?Sized,
{
    fn rule_xpath(&self, scope: &RuleScope, name: &str) -> Result<String> {
        Ok(path::join(&T::xpath(scope, &[name])?))
    }

    /// Place `rules`, in order, at `movement`.
    pub fn move_group(&self, scope: &RuleScope, movement: &Movement, rules: &[T]) -> Result<()> {
        let names: Vec<&str> = rules.iter().map(|rule| rule.name()).collect();
        for (name, position, reference) in move_plan(movement, &names)? {
            let xpath = self.rule_xpath(scope, &name)?;
            debug!(kind = T::KIND, name = %name, %position, reference = %reference, "move");
            self.client()
                .move_entry(&xpath, position, &reference)
                .map_err(|source| Error::transport("move", &xpath, source))?;
        }
        Ok(())
    }

    pub fn set_audit_comment(&self, scope: &RuleScope, name: &str, comment: &str) -> Result<()> {
        let xpath = self.rule_xpath(scope, name)?;
        let command = XmlNode::new("set").child(
            XmlNode::new("audit-comment")
                .child(XmlNode::with_text("xpath", xpath.as_str()))
                .child(XmlNode::with_text("comment", comment)),
        );
        debug!(kind = T::KIND, name, "set audit comment");
        self.client()
            .op(&command, "")
            .map(|_| ())
            .map_err(|source| Error::transport("op", &xpath, source))
    }

    /// The audit comment staged for the next commit, or empty.
    pub fn current_audit_comment(&self, scope: &RuleScope, name: &str) -> Result<String> {
        let xpath = self.rule_xpath(scope, name)?;
        let command = XmlNode::new("show").child(
            XmlNode::new("config").child(
                XmlNode::new("list").child(
                    XmlNode::new("audit-comments")
                        .child(XmlNode::with_text("xpath", xpath.as_str())),
                ),
            ),
        );
        let response = self
            .client()
            .op(&command, "")
            .map_err(|source| Error::transport("op", &xpath, source))?;
        Ok(codec::text(Some(&response), &["result", "entry", "comment"]))
    }

    /// Committed audit comments of a rule, newest first.
    pub fn audit_comment_history(
        &self,
        scope: &RuleScope,
        name: &str,
        nlogs: u32,
        skip: u32,
    ) -> Result<Vec<AuditComment>> {
        let xpath = self.rule_xpath(scope, name)?;
        let query = LogQuery {
            log_type: "config".to_string(),
            query: format!("(subtype eq audit-comment) and (path contains '{name}')"),
            direction: "backward".to_string(),
            nlogs,
            skip,
        };
        let response = self
            .client()
            .logs(&query)
            .map_err(|source| Error::transport("log", &xpath, source))?;

        let Some(logs) = response.get_path(&["result", "log", "logs"]) else {
            return Ok(Vec::new());
        };
        logs.get_children("entry")
            .into_iter()
            .map(|entry| {
                Ok(AuditComment {
                    admin: codec::text(Some(entry), &["admin"]),
                    comment: codec::text(Some(entry), &["comment"]),
                    config_version: codec::int(Some(entry), &["config_ver"])?,
                    time_generated: codec::text(Some(entry), &["time_generated"]),
                })
            })
            .collect()
    }

    /// Hit counters for `names` (every rule when empty). Firewall vsys only.
    pub fn hit_count(&self, scope: &RuleScope, names: &[&str]) -> Result<Vec<HitCount>> {
        let Some(vsys) = scope.location.firewall_vsys() else {
            return Err(Error::Semantic(
                "hit counts are only available for a firewall vsys".to_string(),
            ));
        };
        if vsys.is_empty() {
            return Err(Error::NotSpecified("vsys"));
        }

        let mut rules = XmlNode::new("rules");
        if names.is_empty() {
            codec::push_marker(&mut rules, "all");
        } else {
            let names: Vec<String> = names.iter().map(ToString::to_string).collect();
            codec::push_members(&mut rules, "list", &names);
        }
        let command = XmlNode::new("show").child(
            XmlNode::new("rule-hit-count").child(
                XmlNode::new("vsys").child(
                    XmlNode::new("vsys-name").child(
                        codec::entry(vsys).child(
                            XmlNode::new("rule-base")
                                .child(codec::entry(T::RULE_TYPE).child(rules)),
                        ),
                    ),
                ),
            ),
        );
        let response = self
            .client()
            .op(&command, "")
            .map_err(|source| Error::transport("op", "rule-hit-count", source))?;

        let Some(entries) = response
            .get_path(&["result", "rule-hit-count", "vsys", "entry", "rule-base", "entry", "rules"])
        else {
            return Ok(Vec::new());
        };
        entries
            .get_children("entry")
            .into_iter()
            .map(|entry| {
                Ok(HitCount {
                    name: codec::entry_name(entry)?,
                    latest: codec::flag(Some(entry), &["latest"]),
                    hit_count: counter(entry, "hit-count")?,
                    last_hit: counter(entry, "last-hit-timestamp")?,
                    last_reset: counter(entry, "last-reset-timestamp")?,
                    first_hit: counter(entry, "first-hit-timestamp")?,
                    created: counter(entry, "rule-creation-timestamp")?,
                    modified: counter(entry, "rule-modification-timestamp")?,
                })
            })
            .collect()
    }

    /// Converge the rulebase at `scope` on `rules`.
    ///
    /// New rules go out in one bulk SET. When the device rejects it with the
    /// bulk-invalid marker, the rules are re-sent one at a time and the first
    /// failure is reported with its index in `rules`. Changed rules are
    /// edited one by one. The group is then moved, and rules dropped from the
    /// list are deleted in policy mode or when named in `previous_names`.
    pub fn configure_rules(
        &self,
        scope: &RuleScope,
        rules: &[T],
        options: &ConfigureOptions,
    ) -> Result<()> {
        let existing = self.get_all(scope)?;
        let variant = T::variant_for(&self.version()?);
        let plan = plan_rules(&existing, rules, variant)?;
        debug!(
            kind = T::KIND,
            create = plan.create.len(),
            edit = plan.edit.len(),
            unchanged = plan.unchanged.len(),
            "configuring rules"
        );

        if !plan.create.is_empty() {
            self.create_rules(scope, &plan.create, &options.bulk_invalid_marker)?;
            for (_, rule) in &plan.create {
                self.audit(scope, rule.name(), &options.audit_comment)?;
            }
        }

        for rule in &plan.edit {
            self.edit(scope, rule)?;
            self.audit(scope, rule.name(), &options.audit_comment)?;
        }

        self.move_group(scope, &options.movement, rules)?;

        let requested: BTreeSet<&str> = rules.iter().map(|rule| rule.name()).collect();
        let mut stale: Vec<&str> = Vec::new();
        if options.policy {
            stale.extend(
                existing
                    .iter()
                    .map(|rule| rule.name())
                    .filter(|name| !requested.contains(name)),
            );
        }
        let present: BTreeSet<&str> = existing.iter().map(|rule| rule.name()).collect();
        for name in &options.previous_names {
            let name = name.as_str();
            if !requested.contains(name) && present.contains(name) && !stale.contains(&name) {
                stale.push(name);
            }
        }
        if !stale.is_empty() {
            debug!(kind = T::KIND, count = stale.len(), "deleting stale rules");
            self.delete(scope, &stale)?;
        }
        Ok(())
    }

    fn create_rules(&self, scope: &RuleScope, create: &[(usize, T)], marker: &str) -> Result<()> {
        let records: Vec<T> = create.iter().map(|(_, rule)| rule.clone()).collect();
        let err = match self.set(scope, &records) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        let bulk_rejected = matches!(
            &err,
            Error::Transport { source, .. } if !marker.is_empty() && source.message().contains(marker)
        );
        if !bulk_rejected {
            return Err(err);
        }

        warn!(kind = T::KIND, count = records.len(), "bulk set rejected, retrying one by one");
        for (index, rule) in create {
            if let Err(err) = self.set(scope, std::slice::from_ref(rule)) {
                let message = match err {
                    Error::Transport { source, .. } => source.message().to_string(),
                    other => other.to_string(),
                };
                return Err(Error::BulkRuleInvalid {
                    index: *index,
                    name: rule.name().to_string(),
                    message,
                });
            }
        }
        Ok(())
    }

    fn audit(&self, scope: &RuleScope, name: &str, comment: &str) -> Result<()> {
        if comment.is_empty() {
            return Ok(());
        }
        self.set_audit_comment(scope, name, comment)
    }
}

fn counter(entry: &XmlNode, tag: &str) -> Result<u64> {
    let raw = codec::text(Some(entry), &[tag]);
    if raw.is_empty() {
        return Ok(0);
    }
    raw.parse()
        .map_err(|_| Error::decode(tag, format!("expected a counter, got '{raw}'")))
}
