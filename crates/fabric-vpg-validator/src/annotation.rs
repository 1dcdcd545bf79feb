//! Annotation parsing.
//!
//! A VPG annotation binds one interface to a VN/VLAN combination. The key is a
//! `/`-separated list of `field:value` segments and the value carries the
//! interface, e.g.
//!
//! ```text
//! key:   validation:enterprise/vn:0b7e.../vlan_id:100
//! value: 100:5d4c...
//! ```
//!
//! Parsing is best-effort. Segments that are not exactly one `field:value`
//! pair are dropped without a trace, and when a field appears more than once
//! the leftmost occurrence wins.

use std::collections::HashMap;
use std::str::FromStr;

use crate::types::{InterfaceId, VlanId, VnId};

/// Substring of an annotation key that marks an untagged VLAN binding.
pub const UNTAGGED_MARKER: &str = "untagged_vlan_id";

/// Annotation field names
pub mod fields {
    /// Virtual network field
    pub const VN: &str = "vn";

    /// VLAN ID field
    pub const VLAN_ID: &str = "vlan_id";

    /// Validation mode field
    pub const VALIDATION: &str = "validation";
}

/// Fabric validation policy named by an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// One interface per VN and per VLAN in a VPG, pair-exact reuse across VPGs
    Enterprise,
    /// Anything else, including a missing `validation` field
    #[default]
    Other,
}

impl FromStr for ValidationMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "enterprise" => ValidationMode::Enterprise,
            _ => ValidationMode::Other,
        })
    }
}

impl ValidationMode {
    /// Convert to string
    pub fn as_str(&self) -> &str {
        match self {
            ValidationMode::Enterprise => "enterprise",
            ValidationMode::Other => "other",
        }
    }
}

/// Untagged VLAN declared by an annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntaggedVlan {
    /// First colon token of the annotation value
    pub vlan: VlanId,
    /// Second colon token of the annotation value
    pub owner: InterfaceId,
}

/// Structured facts extracted from one annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRecord {
    /// Raw annotation key, compared verbatim for duplicate detection
    pub annotation: String,
    /// Interface the annotation belongs to (the full value string)
    pub interface: InterfaceId,
    /// `vn` field
    pub vn: Option<VnId>,
    /// `vlan_id` field
    pub vlan: Option<VlanId>,
    /// `validation` field
    pub mode: ValidationMode,
    /// Set when the key carries [`UNTAGGED_MARKER`]
    pub untagged: Option<UntaggedVlan>,
}

impl AnnotationRecord {
    /// Parses an annotation key and its associated value.
    ///
    /// Never fails; unusable input simply yields a record without a binding.
    pub fn parse(annotation: &str, value: &str) -> Self {
        let untagged = annotation.contains(UNTAGGED_MARKER).then(|| UntaggedVlan {
            vlan: VlanId::new(value.split_once(':').map_or(value, |(head, _)| head)),
            owner: InterfaceId::new(value.split(':').nth(1).unwrap_or(value)),
        });

        let facts = parse_fields(annotation);

        Self {
            annotation: annotation.to_string(),
            interface: InterfaceId::new(value),
            vn: facts.get(fields::VN).map(|v| VnId::new(*v)),
            vlan: facts.get(fields::VLAN_ID).map(|v| VlanId::new(*v)),
            mode: facts
                .get(fields::VALIDATION)
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            untagged,
        }
    }

    /// Returns the VN/VLAN binding, or `None` when either field is missing.
    pub fn binding(&self) -> Option<(&VnId, &VlanId)> {
        Some((self.vn.as_ref()?, self.vlan.as_ref()?))
    }

    /// Returns true when enterprise exclusivity rules apply
    pub fn is_enterprise(&self) -> bool {
        self.mode == ValidationMode::Enterprise
    }
}

/// Splits an annotation key into its `field:value` facts.
fn parse_fields(annotation: &str) -> HashMap<&str, &str> {
    let mut facts = HashMap::new();
    for segment in annotation.split('/') {
        match segment.split_once(':') {
            Some((field, value)) if !value.contains(':') => {
                facts.entry(field).or_insert(value);
            }
            _ => {}
        }
    }
    facts
}
