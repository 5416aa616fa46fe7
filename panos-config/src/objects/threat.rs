//! Pieces shared by the threat prevention profiles: signature actions and
//! threat exceptions.

use serde::{Deserialize, Serialize};
use xml_tree::XmlNode;

use crate::codec;
use crate::error::{Error, Result};

pub const ACTION_BLOCK_IP: &str = "block-ip";

/// Plain actions. Signature rules write them as marker elements, decoders
/// and application overrides as text.
pub const ACTIONS: &[&str] = &[
    "default",
    "allow",
    "alert",
    "drop",
    "reset-client",
    "reset-server",
    "reset-both",
];

const TRACK_BY: &[&str] = &["source", "source-and-destination"];

/// Signature action, with the tracking settings of `block-ip`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreatAction {
    pub action: String,
    /// `source` or `source-and-destination`; `block-ip` only.
    pub track_by: String,
    /// Seconds; `block-ip` only.
    pub duration: u32,
}

impl ThreatAction {
    /// Push `<action><choice/></action>` onto `parent`.
    pub fn push(&self, parent: &mut XmlNode, field: &str) -> Result<()> {
        let choice = match self.action.as_str() {
            "" => return Ok(()),
            ACTION_BLOCK_IP => {
                if !TRACK_BY.contains(&self.track_by.as_str()) {
                    return Err(Error::encode(
                        field,
                        format!("unknown block-ip track-by '{}'", self.track_by),
                    ));
                }
                let mut block = XmlNode::new(ACTION_BLOCK_IP);
                codec::push_text(&mut block, "track-by", &self.track_by);
                codec::push_int(&mut block, "duration", self.duration);
                block
            }
            action if ACTIONS.contains(&action) => XmlNode::new(action),
            other => {
                return Err(Error::encode(
                    field,
                    format!("unknown threat action '{other}'"),
                ))
            }
        };
        parent.push(XmlNode::new("action").child(choice));
        Ok(())
    }

    /// Read the `<action>` choice under `node`.
    pub fn decode(node: Option<&XmlNode>) -> Result<Self> {
        let Some(choice) = node
            .and_then(|n| n.get_child("action"))
            .and_then(|action| action.children.first())
        else {
            return Ok(Self::default());
        };
        let block = Some(choice);
        Ok(Self {
            action: choice.tag.clone(),
            track_by: codec::text(block, &["track-by"]),
            duration: codec::int(block, &["duration"])?,
        })
    }
}

/// Text action of a decoder or application override.
pub fn push_decoder_action(
    parent: &mut XmlNode,
    tag: &str,
    field: &str,
    action: &str,
) -> Result<()> {
    match action {
        "" => Ok(()),
        known if ACTIONS.contains(&known) => {
            codec::push_text(parent, tag, known);
            Ok(())
        }
        other => Err(Error::encode(field, format!("unknown action '{other}'"))),
    }
}

/// Threat exception: signature id plus an optional action override and
/// exempted addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Exception {
    pub name: String,
    pub action: ThreatAction,
    pub packet_capture: String,
    pub exempt_ips: Vec<String>,
}

pub fn push_exceptions(parent: &mut XmlNode, exceptions: &[Exception]) -> Result<()> {
    if exceptions.is_empty() {
        return Ok(());
    }
    let mut list = XmlNode::new("threat-exception");
    for exception in exceptions {
        let mut entry = codec::entry(&exception.name);
        exception.action.push(&mut entry, "exceptions")?;
        codec::push_text(&mut entry, "packet-capture", &exception.packet_capture);
        if !exception.exempt_ips.is_empty() {
            let mut exempt = XmlNode::new("exempt-ip");
            for ip in &exception.exempt_ips {
                exempt.push(codec::entry(ip));
            }
            entry.push(exempt);
        }
        list.push(entry);
    }
    parent.push(list);
    Ok(())
}

pub fn exceptions(node: Option<&XmlNode>) -> Result<Vec<Exception>> {
    node.and_then(|n| n.get_child("threat-exception"))
        .map(|list| list.get_children("entry"))
        .unwrap_or_default()
        .into_iter()
        .map(|entry| -> Result<Exception> {
            Ok(Exception {
                name: codec::entry_name(entry)?,
                action: ThreatAction::decode(Some(entry))?,
                packet_capture: codec::text(Some(entry), &["packet-capture"]),
                exempt_ips: codec::entry_names(Some(entry), &["exempt-ip"]),
            })
        })
        .collect()
}
