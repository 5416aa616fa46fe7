//! Version-aware configuration object model for PAN-OS firewalls and
//! Panorama.
//!
//! Each configuration object (zones, interfaces, routing, rules, profiles)
//! has one normalized record type and a set of firmware-specific wire
//! variants. The crate selects the variant for a device's firmware, encodes
//! records to the XML the device expects, decodes device responses back into
//! records, and builds the xpath of every object from its scope.
//!
//! # Layout
//!
//! - [`version`]: firmware version parsing and ordering
//! - [`codec`]: shared wire conventions (yes/no, member and entry lists,
//!   opaque sub-trees, rule targets)
//! - [`object`]: the [`Object`] contract, variant selection, containers
//! - [`path`]: scopes and xpath construction
//! - [`objects`]: the object catalog
//! - [`transport`]: the API client contract a caller plugs in
//! - [`namespace`]: read and write operations per object class
//! - [`rules`]: group moves, audit comments, hit counts, and the rule
//!   orchestrator
//! - [`registry`]: name-indexed kinds for tooling
//! - [`settings`]: library defaults
//!
//! The crate never talks to a device itself; every remote call goes through
//! a [`Transport`] implementation.

pub mod codec;
pub mod error;
pub mod namespace;
pub mod object;
pub mod objects;
pub mod path;
pub mod registry;
pub mod rules;
pub mod settings;
pub mod transport;
pub mod version;

pub use error::{Error, Result};
pub use namespace::{Namespace, SingletonNamespace};
pub use object::{specify, Container, Encoder, Entry, Object, Singleton, Threshold, Variant};
pub use path::{
    DeviceScope, InterfaceScope, Location, PeerScope, RuleScope, Rulebase, SubinterfaceScope,
    VirtualRouterScope,
};
pub use rules::{ConfigureOptions, Movement, Rule};
pub use settings::Settings;
pub use transport::{LogQuery, MovePosition, Transport, TransportError};
pub use version::Version;
