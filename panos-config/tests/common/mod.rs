#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use panos_config::{LogQuery, MovePosition, Transport, TransportError, Version};
use xml_tree::{write_compact, XmlNode};

/// One recorded transport call, with XML rendered compactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Set { xpath: String, elements: Vec<String> },
    Edit { xpath: String, element: String },
    Delete { xpath: String },
    Move { xpath: String, position: MovePosition, reference: String },
    Op { command: String, vsys: String },
    Logs { log_type: String, query: String },
}

/// In-memory device that answers reads from canned responses and records
/// every write.
pub struct FakeDevice {
    version: Version,
    responses: RefCell<BTreeMap<String, XmlNode>>,
    op_response: RefCell<Option<XmlNode>>,
    rejected: BTreeSet<String>,
    calls: RefCell<Vec<Call>>,
}

impl FakeDevice {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.parse().expect("version"),
            responses: RefCell::new(BTreeMap::new()),
            op_response: RefCell::new(None),
            rejected: BTreeSet::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    /// Entries named here make any SET containing them fail. A bulk SET
    /// fails with the "rules is invalid" marker.
    pub fn rejecting(mut self, names: &[&str]) -> Self {
        self.rejected = names.iter().map(ToString::to_string).collect();
        self
    }

    /// Answer reads of `xpath` with `records` wrapped in a `<response>`.
    pub fn respond(&self, xpath: &str, records: Vec<XmlNode>) {
        let list = records
            .into_iter()
            .fold(XmlNode::new("list"), |list, record| list.child(record));
        self.respond_raw(xpath, wrap(list));
    }

    pub fn respond_raw(&self, xpath: &str, response: XmlNode) {
        self.responses.borrow_mut().insert(xpath.to_string(), response);
    }

    /// Answer every `op` and `logs` call with `response`.
    pub fn respond_op(&self, response: XmlNode) {
        *self.op_response.borrow_mut() = Some(response);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| !matches!(call, Call::Op { .. } | Call::Logs { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.borrow_mut().push(call);
    }

    fn lookup(&self, xpath: &str) -> Result<XmlNode, TransportError> {
        self.responses
            .borrow()
            .get(xpath)
            .cloned()
            .ok_or_else(|| TransportError::Device {
                code: 7,
                message: "No such node".to_string(),
            })
    }
}

pub fn wrap(result: XmlNode) -> XmlNode {
    XmlNode::new("response")
        .attr("status", "success")
        .child(XmlNode::new("result").child(result))
}

fn compact(node: &XmlNode) -> String {
    write_compact(node).expect("write")
}

impl Transport for FakeDevice {
    fn version(&self) -> Result<Version, TransportError> {
        Ok(self.version.clone())
    }

    fn get(&self, xpath: &str) -> Result<XmlNode, TransportError> {
        self.lookup(xpath)
    }

    fn show(&self, xpath: &str) -> Result<XmlNode, TransportError> {
        self.lookup(xpath)
    }

    fn set(&self, xpath: &str, elements: &[XmlNode]) -> Result<(), TransportError> {
        self.record(Call::Set {
            xpath: xpath.to_string(),
            elements: elements.iter().map(compact).collect(),
        });
        let rejected = elements
            .iter()
            .filter_map(|element| element.get_attr("name"))
            .find(|name| self.rejected.contains(*name));
        match rejected {
            None => Ok(()),
            Some(_) if elements.len() > 1 => Err(TransportError::Device {
                code: 12,
                message: "Validation error: rules is invalid".to_string(),
            }),
            Some(name) => Err(TransportError::Device {
                code: 12,
                message: format!("{name} -> from is invalid"),
            }),
        }
    }

    fn edit(&self, xpath: &str, element: &XmlNode) -> Result<(), TransportError> {
        self.record(Call::Edit {
            xpath: xpath.to_string(),
            element: compact(element),
        });
        Ok(())
    }

    fn delete(&self, xpath: &str) -> Result<(), TransportError> {
        self.record(Call::Delete {
            xpath: xpath.to_string(),
        });
        Ok(())
    }

    fn move_entry(
        &self,
        xpath: &str,
        position: MovePosition,
        reference: &str,
    ) -> Result<(), TransportError> {
        self.record(Call::Move {
            xpath: xpath.to_string(),
            position,
            reference: reference.to_string(),
        });
        Ok(())
    }

    fn op(&self, command: &XmlNode, vsys: &str) -> Result<XmlNode, TransportError> {
        self.record(Call::Op {
            command: compact(command),
            vsys: vsys.to_string(),
        });
        Ok(self
            .op_response
            .borrow()
            .clone()
            .unwrap_or_else(|| wrap(XmlNode::new("ok"))))
    }

    fn logs(&self, query: &LogQuery) -> Result<XmlNode, TransportError> {
        self.record(Call::Logs {
            log_type: query.log_type.clone(),
            query: query.query.clone(),
        });
        Ok(self
            .op_response
            .borrow()
            .clone()
            .unwrap_or_else(|| wrap(XmlNode::new("log"))))
    }
}
