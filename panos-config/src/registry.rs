//! Name-indexed registry of object kinds, used by the CLI to dispatch
//! offline encode/decode without knowing the concrete record types.

use serde::de::DeserializeOwned;
use serde::Serialize;
use xml_tree::XmlNode;

use crate::error::{Error, Result};
use crate::object::{specify, Object, Threshold, Variant};
use crate::version::Version;

/// Type-erased entry points of one object kind.
pub struct Kind {
    pub name: &'static str,
    /// Element wrapping one record on the wire.
    pub tag: &'static str,
    /// Variant thresholds, newest first.
    pub thresholds: &'static [Threshold],
    pub variant_for: fn(&Version) -> Variant,
    /// Device XML (response, list, or single record) to JSON records.
    pub decode: fn(&XmlNode, &Version) -> Result<serde_json::Value>,
    /// JSON records (an array or a single object) to wire elements.
    pub encode: fn(&serde_json::Value, &Version) -> Result<Vec<XmlNode>>,
}

inventory::collect!(Kind);

/// Registers an [`Object`] implementation with the kind registry.
#[doc(hidden)]
#[macro_export]
macro_rules! register_kind {
    ($ty:ty) => {
        ::inventory::submit! {
            $crate::registry::Kind {
                name: <$ty as $crate::object::Object>::KIND,
                tag: <$ty as $crate::object::Object>::TAG,
                thresholds: <$ty as $crate::object::Object>::THRESHOLDS,
                variant_for: <$ty as $crate::object::Object>::variant_for,
                decode: $crate::registry::decode_json::<$ty>,
                encode: $crate::registry::encode_json::<$ty>,
            }
        }
    };
}

/// Every registered kind, sorted by name.
pub fn kinds() -> Vec<&'static Kind> {
    let mut out: Vec<&'static Kind> = inventory::iter::<Kind>.into_iter().collect();
    out.sort_by_key(|kind| kind.name);
    out
}

pub fn find(name: &str) -> Option<&'static Kind> {
    inventory::iter::<Kind>
        .into_iter()
        .find(|kind| kind.name == name)
}

#[doc(hidden)]
pub fn decode_json<T>(node: &XmlNode, version: &Version) -> Result<serde_json::Value>
where
    T: Object + Serialize,
{
    let (mut container, _) = specify::<T>(version);
    container.load(node);
    let records = container.normalize()?;
    serde_json::to_value(records).map_err(|source| Error::Json {
        kind: T::KIND,
        source,
    })
}

#[doc(hidden)]
pub fn encode_json<T>(value: &serde_json::Value, version: &Version) -> Result<Vec<XmlNode>>
where
    T: Object + DeserializeOwned,
{
    let records: Vec<T> = match value {
        serde_json::Value::Array(_) => serde_json::from_value(value.clone()),
        _ => serde_json::from_value(value.clone()).map(|record| vec![record]),
    }
    .map_err(|source| Error::Json {
        kind: T::KIND,
        source,
    })?;

    let (_, encoder) = specify::<T>(version);
    records.iter().map(|record| encoder.encode(record)).collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn version(raw: &str) -> Version {
        raw.parse().expect("version")
    }

    #[test]
    fn every_catalog_kind_is_registered_once() {
        let names: Vec<&str> = kinds().iter().map(|kind| kind.name).collect();
        for expected in [
            "address",
            "address-group",
            "aggregate-ethernet",
            "anti-spyware",
            "antivirus",
            "bgp",
            "bgp-export",
            "bgp-peer",
            "bgp-peer-group",
            "data-filtering",
            "decryption-rule",
            "ethernet",
            "file-blocking",
            "ha",
            "ike-gateway",
            "layer3-subinterface",
            "loopback",
            "nat-rule",
            "pbf-rule",
            "profile-group",
            "security-rule",
            "service",
            "static-route",
            "tag",
            "tunnel",
            "url-filtering",
            "virtual-router",
            "vlan-interface",
            "vulnerability",
            "wildfire-analysis",
            "zone",
        ] {
            assert_eq!(
                names.iter().filter(|name| **name == expected).count(),
                1,
                "{expected}"
            );
        }
    }

    #[test]
    fn registered_selector_matches_the_object() {
        let kind = find("decryption-rule").expect("registered");
        assert_eq!((kind.variant_for)(&version("10.0.0")), Variant::V4);
        assert_eq!((kind.variant_for)(&version("8.0.0")), Variant::V1);
        assert!(find("no-such-kind").is_none());
    }

    #[test]
    fn json_records_survive_encode_then_decode() {
        let kind = find("tag").expect("registered");
        let records = json!([{ "name": "prod", "color": "color3", "comments": "production" }]);

        let elements = (kind.encode)(&records, &version("9.1.0")).expect("encode");
        let list = elements
            .into_iter()
            .fold(XmlNode::new("tag"), |list, element| list.child(element));
        let decoded = (kind.decode)(&list, &version("9.1.0")).expect("decode");
        assert_eq!(decoded, records);
    }

    #[test]
    fn malformed_json_names_the_kind() {
        let kind = find("zone").expect("registered");
        let err = (kind.encode)(&json!({ "name": 5 }), &version("9.0.0")).expect_err("bad json");
        assert!(err.to_string().contains("zone"));
    }
}
