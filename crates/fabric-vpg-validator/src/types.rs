//! Identifier and input record types.
//!
//! VN, VLAN and interface identifiers are kept as the opaque strings found in
//! the annotations. Two identifiers are the same only if their text is equal;
//! `"100"` and `"0100"` are different VLANs as far as the audit is concerned.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps a raw identifier.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the identifier text.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id!(
    /// Virtual network identifier (the `vn` annotation field).
    VnId
);

string_id!(
    /// VLAN identifier (the `vlan_id` field, or the untagged VLAN value).
    VlanId
);

string_id!(
    /// Opaque key of a virtual machine interface attached to a VPG.
    InterfaceId
);

/// One raw `(annotation, value)` pair as stored on a VPG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationPair {
    /// Annotation string, e.g. `validation:enterprise/vn:<uuid>/vlan_id:100`
    pub key: String,
    /// Associated value, `<token>:<interface-id>`
    pub value: String,
}

impl AnnotationPair {
    /// Creates a new annotation pair
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A virtual port group as supplied by the VPG data source.
///
/// Read-only input to the checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualPortGroup {
    /// VPG UUID
    pub uuid: String,
    /// Display name (last element of the fully-qualified name)
    pub name: String,
    /// Annotations in the order the source returned them
    pub annotations: Vec<AnnotationPair>,
}

impl VirtualPortGroup {
    /// Creates a VPG with no annotations
    pub fn new(uuid: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            name: name.into(),
            annotations: Vec::new(),
        }
    }

    /// Appends an annotation
    pub fn with_annotation(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.annotations.push(AnnotationPair::new(key, value));
        self
    }

    /// Returns the key under which this VPG's findings are reported
    pub fn key(&self) -> VpgKey {
        VpgKey {
            uuid: self.uuid.clone(),
            name: self.name.clone(),
        }
    }
}

/// Identity of a VPG in a scan result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VpgKey {
    /// VPG UUID
    pub uuid: String,
    /// VPG display name
    pub name: String,
}

impl fmt::Display for VpgKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.uuid, self.name)
    }
}

/// The first place a VN or VLAN was seen in the fabric.
///
/// Used only to attribute cross-fabric collisions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FabricOwner {
    /// Name of the VPG holding the first use
    pub vpg_name: String,
    /// UUID of that VPG
    pub vpg_uuid: String,
    /// Interface that made the first use
    pub interface: InterfaceId,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_ids_compare_by_text() {
        assert_eq!(VlanId::from("100"), VlanId::new("100".to_string()));
        assert_ne!(VlanId::from("100"), VlanId::from("0100"));
    }

    #[test]
    fn test_id_serializes_transparently() {
        let json = serde_json::to_string(&VnId::from("vn-1")).unwrap();
        assert_eq!(json, "\"vn-1\"");
    }

    #[test]
    fn test_vpg_key_display() {
        let vpg = VirtualPortGroup::new("1b2c", "vpg-a");
        assert_eq!(vpg.key().to_string(), "1b2c:vpg-a");
    }

    #[test]
    fn test_vpg_builder_keeps_order() {
        let vpg = VirtualPortGroup::new("u", "n")
            .with_annotation("a", "1:x")
            .with_annotation("b", "2:y");
        let keys: Vec<_> = vpg.annotations.iter().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["a", "b"]);
    }
}
