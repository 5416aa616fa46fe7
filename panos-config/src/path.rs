//! XPath construction for the containers an object can live in.
//!
//! Paths are built as ordered segment lists; the last segment of an object
//! path is its `entry[@name='…']` selector. Listing operations drop that last
//! segment before calling the transport.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// The device-local root entry every firewall and template path goes through.
pub const LOCALHOST: &str = "entry[@name='localhost.localdomain']";

/// `entry[@name='name']`.
pub fn as_entry(name: &str) -> String {
    format!("entry[@name='{name}']")
}

/// Selector for zero (all entries), one, or several names.
pub fn entry_selector(names: &[&str]) -> String {
    match names {
        [] => "entry".to_string(),
        [one] => as_entry(one),
        many => {
            let alternatives: Vec<String> =
                many.iter().map(|name| format!("@name='{name}'")).collect();
            format!("entry[{}]", alternatives.join(" or "))
        }
    }
}

/// Render segments as an absolute xpath.
pub fn join(segments: &[String]) -> String {
    let mut out = String::new();
    for segment in segments {
        out.push('/');
        out.push_str(segment);
    }
    out
}

fn segments(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Which containers an object class may live in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub shared: bool,
    pub device_group: bool,
    pub template: bool,
}

impl Placement {
    /// Policy objects (addresses, services, profiles).
    pub const OBJECT: Self = Self {
        shared: true,
        device_group: true,
        template: false,
    };
    /// Vsys-local network objects such as zones.
    pub const VSYS_NETWORK: Self = Self {
        shared: false,
        device_group: false,
        template: true,
    };
    /// Security rulebases.
    pub const RULE: Self = Self {
        shared: false,
        device_group: true,
        template: false,
    };
}

/// Where a vsys-level object lives: a firewall vsys, a Panorama device
/// group, or a vsys inside a Panorama template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Location {
    Vsys {
        vsys: String,
    },
    DeviceGroup {
        device_group: String,
    },
    Template {
        template: String,
        template_stack: String,
        vsys: String,
    },
}

impl Default for Location {
    fn default() -> Self {
        Self::vsys("vsys1")
    }
}

impl Location {
    pub fn vsys(vsys: impl Into<String>) -> Self {
        Self::Vsys { vsys: vsys.into() }
    }

    pub fn device_group(device_group: impl Into<String>) -> Self {
        Self::DeviceGroup {
            device_group: device_group.into(),
        }
    }

    pub fn template(
        template: impl Into<String>,
        template_stack: impl Into<String>,
        vsys: impl Into<String>,
    ) -> Self {
        Self::Template {
            template: template.into(),
            template_stack: template_stack.into(),
            vsys: vsys.into(),
        }
    }

    /// Segments of the container (vsys, shared, or device group) holding
    /// objects of a class with the given placement.
    pub fn root(&self, object: &str, placement: Placement) -> Result<Vec<String>> {
        match self {
            Self::Vsys { vsys } => vsys_root(
                vec!["config".to_string(), "devices".to_string(), LOCALHOST.to_string()],
                vsys,
                object,
                placement,
            ),
            Self::DeviceGroup { device_group } => {
                if !placement.device_group {
                    return Err(Error::Semantic(format!(
                        "{object} cannot be configured in a device group"
                    )));
                }
                if device_group.is_empty() || device_group == "shared" {
                    if !placement.shared {
                        return Err(Error::Semantic(format!(
                            "{object} cannot be configured in shared"
                        )));
                    }
                    return Ok(segments(&["config", "shared"]));
                }
                Ok(vec![
                    "config".to_string(),
                    "devices".to_string(),
                    LOCALHOST.to_string(),
                    "device-group".to_string(),
                    as_entry(device_group),
                ])
            }
            Self::Template {
                template,
                template_stack,
                vsys,
            } => {
                if !placement.template {
                    return Err(Error::Semantic(format!(
                        "{object} cannot be configured in a template"
                    )));
                }
                let device = DeviceScope {
                    template: template.clone(),
                    template_stack: template_stack.clone(),
                };
                if device.template.is_empty() && device.template_stack.is_empty() {
                    return Err(Error::NotSpecified("template"));
                }
                vsys_root(device.root()?, vsys, object, placement)
            }
        }
    }

    /// The vsys name when this is a firewall location.
    pub fn firewall_vsys(&self) -> Option<&str> {
        match self {
            Self::Vsys { vsys } => Some(vsys),
            _ => None,
        }
    }
}

fn vsys_root(
    mut root: Vec<String>,
    vsys: &str,
    object: &str,
    placement: Placement,
) -> Result<Vec<String>> {
    match vsys {
        "" => Err(Error::NotSpecified("vsys")),
        "shared" if !placement.shared => Err(Error::Semantic(format!(
            "{object} cannot be configured in vsys shared"
        ))),
        "shared" => {
            // `shared` is a sibling of `devices`, both on the firewall and
            // inside a template's `config`.
            root.truncate(root.len().saturating_sub(2));
            root.push("shared".to_string());
            Ok(root)
        }
        name => {
            root.push("vsys".to_string());
            root.push(as_entry(name));
            Ok(root)
        }
    }
}

/// Device-level container: the firewall itself, or a Panorama template or
/// template stack. Leaving both empty targets the firewall.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceScope {
    #[serde(default)]
    pub template: String,
    #[serde(default)]
    pub template_stack: String,
}

impl DeviceScope {
    pub fn firewall() -> Self {
        Self::default()
    }

    pub fn template(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            template_stack: String::new(),
        }
    }

    pub fn template_stack(template_stack: impl Into<String>) -> Self {
        Self {
            template: String::new(),
            template_stack: template_stack.into(),
        }
    }

    /// Segments ending at the device's `localhost.localdomain` entry.
    pub fn root(&self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        match (self.template.as_str(), self.template_stack.as_str()) {
            ("", "") => {}
            (template, "") => {
                out.extend(segments(&["config", "devices", LOCALHOST, "template"]));
                out.push(as_entry(template));
            }
            ("", stack) => {
                out.extend(segments(&["config", "devices", LOCALHOST, "template-stack"]));
                out.push(as_entry(stack));
            }
            _ => {
                return Err(Error::Semantic(
                    "template and template stack are mutually exclusive".to_string(),
                ))
            }
        }
        out.extend(segments(&["config", "devices", LOCALHOST]));
        Ok(out)
    }

    /// Segments of the `network` container.
    pub fn network(&self) -> Result<Vec<String>> {
        let mut out = self.root()?;
        out.push("network".to_string());
        Ok(out)
    }

    /// Xpath of a vsys on this device, used for interface and virtual router
    /// imports.
    pub fn vsys_xpath(&self, vsys: &str) -> Result<String> {
        if vsys.is_empty() {
            return Err(Error::NotSpecified("vsys"));
        }
        if vsys == "shared" {
            return Err(Error::Semantic(
                "nothing can be imported into vsys shared".to_string(),
            ));
        }
        let mut out = self.root()?;
        out.push("vsys".to_string());
        out.push(as_entry(vsys));
        Ok(join(&out))
    }
}

/// A virtual router on a device.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualRouterScope {
    #[serde(default)]
    pub device: DeviceScope,
    pub virtual_router: String,
}

impl VirtualRouterScope {
    pub fn new(device: DeviceScope, virtual_router: impl Into<String>) -> Self {
        Self {
            device,
            virtual_router: virtual_router.into(),
        }
    }

    /// Segments ending at the virtual router entry.
    pub fn root(&self) -> Result<Vec<String>> {
        if self.virtual_router.is_empty() {
            return Err(Error::NotSpecified("virtual router"));
        }
        let mut out = self.device.network()?;
        out.push("virtual-router".to_string());
        out.push(as_entry(&self.virtual_router));
        Ok(out)
    }

    /// Segments ending at the BGP protocol container.
    pub fn bgp(&self) -> Result<Vec<String>> {
        let mut out = self.root()?;
        out.push("protocol".to_string());
        out.push("bgp".to_string());
        Ok(out)
    }
}

/// A BGP peer group inside a virtual router.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerScope {
    pub virtual_router: VirtualRouterScope,
    pub peer_group: String,
}

impl PeerScope {
    pub fn root(&self) -> Result<Vec<String>> {
        if self.peer_group.is_empty() {
            return Err(Error::NotSpecified("peer group"));
        }
        let mut out = self.virtual_router.bgp()?;
        out.push("peer-group".to_string());
        out.push(as_entry(&self.peer_group));
        Ok(out)
    }
}

/// Scope of device-level network objects (interfaces, virtual routers);
/// `vsys`, when set, receives an import of every entry created through it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceScope {
    #[serde(default)]
    pub device: DeviceScope,
    #[serde(default)]
    pub vsys: String,
}

impl InterfaceScope {
    pub fn new(device: DeviceScope, vsys: impl Into<String>) -> Self {
        Self {
            device,
            vsys: vsys.into(),
        }
    }

    /// Segments of `network/interface/<kind>`.
    pub fn interfaces(&self, kind: &str) -> Result<Vec<String>> {
        let mut out = self.device.network()?;
        out.push("interface".to_string());
        out.push(kind.to_string());
        Ok(out)
    }

    /// Xpath of the vsys that imports new entries, when `vsys` is set.
    pub fn import_target(&self) -> Result<Option<String>> {
        if self.vsys.is_empty() {
            return Ok(None);
        }
        self.device.vsys_xpath(&self.vsys).map(Some)
    }
}

/// Layer-3 subinterface scope: parent interface type and name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubinterfaceScope {
    #[serde(default)]
    pub device: DeviceScope,
    /// `ethernet` or `aggregate-ethernet`.
    pub interface_type: String,
    pub parent: String,
    #[serde(default)]
    pub vsys: String,
}

impl SubinterfaceScope {
    pub fn root(&self) -> Result<Vec<String>> {
        match self.interface_type.as_str() {
            "" => return Err(Error::NotSpecified("interface type")),
            "ethernet" | "aggregate-ethernet" => {}
            other => {
                return Err(Error::Semantic(format!(
                    "unsupported parent interface type '{other}'"
                )))
            }
        }
        if self.parent.is_empty() {
            return Err(Error::NotSpecified("parent interface"));
        }
        let mut out = self.device.network()?;
        out.push("interface".to_string());
        out.push(self.interface_type.clone());
        out.push(as_entry(&self.parent));
        out.push("layer3".to_string());
        out.push("units".to_string());
        Ok(out)
    }
}

/// Which rulebase a rule lives in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Rulebase {
    /// The firewall's own rulebase.
    #[default]
    Rulebase,
    /// Panorama pre-rulebase.
    Pre,
    /// Panorama post-rulebase.
    Post,
}

impl Rulebase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rulebase => "rulebase",
            Self::Pre => "pre-rulebase",
            Self::Post => "post-rulebase",
        }
    }
}

/// Rule scope: a firewall vsys or a Panorama device group, plus a rulebase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleScope {
    pub location: Location,
    #[serde(default)]
    pub base: Rulebase,
}

impl RuleScope {
    pub fn vsys(vsys: impl Into<String>) -> Self {
        Self {
            location: Location::vsys(vsys),
            base: Rulebase::Rulebase,
        }
    }

    pub fn device_group(device_group: impl Into<String>, base: Rulebase) -> Self {
        Self {
            location: Location::device_group(device_group),
            base,
        }
    }

    /// Segments ending at `<rulebase>/<rule_type>/rules`.
    pub fn rules(&self, rule_type: &str) -> Result<Vec<String>> {
        let is_panorama = matches!(self.location, Location::DeviceGroup { .. });
        match (is_panorama, self.base) {
            (false, Rulebase::Rulebase) | (true, Rulebase::Pre | Rulebase::Post) => {}
            (false, base) => {
                return Err(Error::Semantic(format!(
                    "{} is only valid on Panorama",
                    base.as_str()
                )))
            }
            (true, _) => {
                return Err(Error::Semantic(
                    "device groups require pre-rulebase or post-rulebase".to_string(),
                ))
            }
        }
        // Panorama's shared pre/post rulebases are legal even though the
        // firewall has no shared rulebase.
        let placement = Placement {
            shared: is_panorama,
            ..Placement::RULE
        };
        let mut out = self.location.root(&format!("{rule_type} rule"), placement)?;
        out.push(self.base.as_str().to_string());
        out.push(rule_type.to_string());
        out.push("rules".to_string());
        Ok(out)
    }
}
