//! The per-object contract: normalized record, firmware variants, version
//! selection, and response containers.
//!
//! Every configuration object implements [`Object`] once. Its encoder and
//! decoder take the selected [`Variant`] and include or route fields per
//! variant, so one schema description covers every supported firmware.

use std::fmt::{self, Debug, Display, Formatter};
use std::marker::PhantomData;

use xml_tree::XmlNode;

use crate::error::Result;
use crate::path::entry_selector;
use crate::version::Version;

/// A wire variant number; `V1` is the oldest supported schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variant(pub u8);

impl Variant {
    pub const V1: Self = Self(1);
    pub const V2: Self = Self(2);
    pub const V3: Self = Self(3);
    pub const V4: Self = Self(4);
    pub const V5: Self = Self(5);
}

impl Display for Variant {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// First firmware at which `variant` applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Threshold {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub variant: Variant,
}

impl Threshold {
    pub const fn new(major: u32, minor: u32, patch: u32, variant: Variant) -> Self {
        Self {
            major,
            minor,
            patch,
            variant,
        }
    }

    pub fn version(&self) -> Version {
        Version::new(self.major, self.minor, self.patch)
    }
}

/// Walk `thresholds` (newest first) and return the first variant whose
/// threshold `version` meets, falling back to [`Variant::V1`].
pub fn select_variant(thresholds: &[Threshold], version: &Version) -> Variant {
    thresholds
        .iter()
        .find(|t| version.at_least(t.major, t.minor, t.patch))
        .map(|t| t.variant)
        .unwrap_or(Variant::V1)
}

/// A configuration object class.
pub trait Object: Sized + Clone + Default + PartialEq + Debug {
    /// Stable kind name used by the registry and error messages.
    const KIND: &'static str;

    /// Element wrapping one record on the wire.
    const TAG: &'static str = "entry";

    /// Variant thresholds, newest first. Empty for single-variant objects.
    const THRESHOLDS: &'static [Threshold] = &[];

    /// Identity used in the xpath. Singletons have none.
    fn name(&self) -> &str {
        ""
    }

    /// Copy every field from `src` except identity fields, deep-cloning all
    /// sequences, maps and nested records.
    fn copy_from(&mut self, src: &Self);

    fn encode(&self, variant: Variant) -> Result<XmlNode>;

    fn decode(node: &XmlNode, variant: Variant) -> Result<Self>;

    fn variant_for(version: &Version) -> Variant {
        select_variant(Self::THRESHOLDS, version)
    }

    /// Every variant this class declares, oldest first.
    fn variants() -> Vec<Variant> {
        let mut out: Vec<Variant> = Self::THRESHOLDS.iter().map(|t| t.variant).collect();
        out.push(Variant::V1);
        out.sort();
        out.dedup();
        out
    }
}

/// Objects addressed as `entry[@name='…']` inside a container.
pub trait Entry: Object {
    type Scope;

    /// Segments of the container holding every entry of this class.
    fn container(scope: &Self::Scope) -> Result<Vec<String>>;

    /// Object path: the container plus an entry selector for `names`.
    fn xpath(scope: &Self::Scope, names: &[&str]) -> Result<Vec<String>> {
        let mut out = Self::container(scope)?;
        out.push(entry_selector(names));
        Ok(out)
    }

    /// Import list under `import/network` that [`Entry::import_vsys`] feeds.
    const IMPORT_LIST: &'static str = "interface";

    /// Xpath of the vsys to import new entries into, if the scope asks for it.
    fn import_vsys(_scope: &Self::Scope) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Objects of which a scope holds exactly one (HA, BGP).
pub trait Singleton: Object {
    type Scope;

    /// Segments ending at the object element itself.
    fn xpath(scope: &Self::Scope) -> Result<Vec<String>>;
}

/// Records of one device response, kept in wire form until normalized.
pub struct Container<T> {
    variant: Variant,
    records: Vec<XmlNode>,
    _object: PhantomData<fn() -> T>,
}

impl<T: Object> Container<T> {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            records: Vec::new(),
            _object: PhantomData,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    /// Collect the records found in `response`: a `<response>`, its
    /// `<result>`, a list wrapper, or a single record element.
    pub fn load(&mut self, response: &XmlNode) {
        let node = if response.tag == "response" {
            match response.get_child("result") {
                Some(result) => result,
                None => return,
            }
        } else {
            response
        };

        if node.tag == T::TAG {
            self.records.push(node.clone());
            return;
        }
        for child in &node.children {
            if child.tag == T::TAG {
                self.records.push(child.clone());
            } else {
                self.records.extend(
                    child
                        .children
                        .iter()
                        .filter(|grandchild| grandchild.tag == T::TAG)
                        .cloned(),
                );
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Decode every record with this container's variant.
    pub fn normalize(&self) -> Result<Vec<T>> {
        self.records
            .iter()
            .map(|record| T::decode(record, self.variant))
            .collect()
    }

    /// `name` attributes of the records, in response order.
    pub fn names(&self) -> Vec<String> {
        self.records
            .iter()
            .filter_map(|record| record.get_attr("name"))
            .map(ToString::to_string)
            .collect()
    }
}

/// Encoder bound to the variant selected for a firmware.
#[derive(Debug, Clone)]
pub struct Encoder<T> {
    variant: Variant,
    _object: PhantomData<fn(&T)>,
}

impl<T: Object> Encoder<T> {
    pub fn new(variant: Variant) -> Self {
        Self {
            variant,
            _object: PhantomData,
        }
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn encode(&self, record: &T) -> Result<XmlNode> {
        record.encode(self.variant)
    }
}

/// The version selector: an empty container and an encoder for the variant
/// that applies to `version`.
pub fn specify<T: Object>(version: &Version) -> (Container<T>, Encoder<T>) {
    let variant = T::variant_for(version);
    (Container::new(variant), Encoder::new(variant))
}
