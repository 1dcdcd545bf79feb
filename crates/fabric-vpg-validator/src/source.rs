//! External collaborators: the VPG data source and the interface name resolver.
//!
//! The checking core only depends on the traits. The JSON implementations read
//! a configuration-store export, the same shape the API server returns for a
//! `virtual-port-groups` list with the `annotations` field requested.

use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{AuditError, AuditResult};
use crate::types::{AnnotationPair, InterfaceId, VirtualPortGroup};

/// Supplies the VPGs of a fabric, in scan order.
pub trait VpgSource {
    /// Returns every VPG to audit
    fn virtual_port_groups(&self) -> AuditResult<Vec<VirtualPortGroup>>;
}

impl VpgSource for [VirtualPortGroup] {
    fn virtual_port_groups(&self) -> AuditResult<Vec<VirtualPortGroup>> {
        Ok(self.to_vec())
    }
}

impl VpgSource for Vec<VirtualPortGroup> {
    fn virtual_port_groups(&self) -> AuditResult<Vec<VirtualPortGroup>> {
        Ok(self.clone())
    }
}

/// Maps interface identifiers to display names for reporting.
pub trait InterfaceResolver {
    /// Returns the display name of an interface
    fn display_name(&self, id: &InterfaceId) -> AuditResult<String>;
}

/// Resolver that uses the identifier itself as the display name.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityResolver;

impl InterfaceResolver for IdentityResolver {
    fn display_name(&self, id: &InterfaceId) -> AuditResult<String> {
        Ok(id.to_string())
    }
}

/// Resolver backed by an in-memory id -> display name table.
///
/// An identifier of the form `<token>:<interface>` that has no entry of its
/// own is looked up by its interface part.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: HashMap<String, String>,
}

impl NameTable {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads a JSON object of `"id": "display name"` entries
    pub fn from_path(path: impl AsRef<Path>) -> AuditResult<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }

    /// Parses a JSON object of `"id": "display name"` entries
    pub fn from_json(json: &str) -> AuditResult<Self> {
        let names: HashMap<String, String> = serde_json::from_str(json)?;
        Ok(Self { names })
    }

    /// Adds or replaces an entry
    pub fn insert(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.names.insert(id.into(), name.into());
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if the table has no entries
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for NameTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            names: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

impl InterfaceResolver for NameTable {
    fn display_name(&self, id: &InterfaceId) -> AuditResult<String> {
        let id = id.as_str();
        self.names
            .get(id)
            .or_else(|| {
                id.split(':')
                    .nth(1)
                    .and_then(|interface| self.names.get(interface))
            })
            .cloned()
            .ok_or_else(|| AuditError::unknown_interface(id))
    }
}

/// VPG source reading a JSON list export from disk.
#[derive(Debug, Clone)]
pub struct JsonVpgSource {
    path: PathBuf,
}

impl JsonVpgSource {
    /// Creates a source for the given export file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the export file
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl VpgSource for JsonVpgSource {
    fn virtual_port_groups(&self) -> AuditResult<Vec<VirtualPortGroup>> {
        debug!("Reading VPG export {}", self.path.display());
        let content = fs::read_to_string(&self.path).map_err(|e| {
            AuditError::Source(format!("failed to read {}: {}", self.path.display(), e))
        })?;
        parse_vpg_list(&content)
    }
}

/// `virtual-port-groups` list response
#[derive(Debug, Deserialize)]
struct VpgList {
    #[serde(rename = "virtual-port-groups")]
    virtual_port_groups: Vec<VpgRecord>,
}

#[derive(Debug, Deserialize)]
struct VpgRecord {
    #[serde(default)]
    uuid: String,
    #[serde(default)]
    fq_name: Vec<String>,
    #[serde(default)]
    annotations: Option<KeyValuePairs>,
}

#[derive(Debug, Default, Deserialize)]
struct KeyValuePairs {
    #[serde(default)]
    key_value_pair: Vec<AnnotationPair>,
}

impl TryFrom<VpgRecord> for VirtualPortGroup {
    type Error = AuditError;

    fn try_from(record: VpgRecord) -> Result<Self, Self::Error> {
        if record.uuid.is_empty() {
            return Err(AuditError::malformed_vpg("", "missing uuid"));
        }
        let Some(name) = record.fq_name.last() else {
            return Err(AuditError::malformed_vpg(record.uuid, "empty fq_name"));
        };

        Ok(Self {
            name: name.clone(),
            annotations: record.annotations.unwrap_or_default().key_value_pair,
            uuid: record.uuid,
        })
    }
}

/// Parses a `virtual-port-groups` list export.
///
/// VPG order is preserved. A record without `uuid` or with an empty `fq_name`
/// fails the whole parse.
pub fn parse_vpg_list(json: &str) -> AuditResult<Vec<VirtualPortGroup>> {
    let list: VpgList = serde_json::from_str(json)?;
    list.virtual_port_groups
        .into_iter()
        .map(VirtualPortGroup::try_from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const EXPORT: &str = r#"{
        "virtual-port-groups": [
            {
                "uuid": "7a1e",
                "fq_name": ["default-global-system-config", "fab1", "vpg-a"],
                "annotations": {
                    "key_value_pair": [
                        {"key": "validation:enterprise/vn:vn1/vlan_id:100", "value": "100:vmi1"}
                    ]
                }
            },
            {
                "uuid": "7a1f",
                "fq_name": ["default-global-system-config", "fab1", "vpg-b"]
            }
        ]
    }"#;

    #[test]
    fn test_parse_vpg_list() {
        let vpgs = parse_vpg_list(EXPORT).unwrap();
        assert_eq!(vpgs.len(), 2);
        assert_eq!(vpgs[0].name, "vpg-a");
        assert_eq!(vpgs[0].uuid, "7a1e");
        assert_eq!(
            vpgs[0].annotations,
            vec![AnnotationPair::new(
                "validation:enterprise/vn:vn1/vlan_id:100",
                "100:vmi1"
            )]
        );
        assert!(vpgs[1].annotations.is_empty());
    }

    #[test]
    fn test_parse_rejects_empty_fq_name() {
        let json = r#"{"virtual-port-groups": [{"uuid": "7a1e", "fq_name": []}]}"#;
        let err = parse_vpg_list(json).unwrap_err();
        assert!(matches!(err, AuditError::MalformedVpg { .. }));
    }

    #[test]
    fn test_parse_rejects_missing_uuid() {
        let json = r#"{"virtual-port-groups": [{"fq_name": ["x"]}]}"#;
        assert!(parse_vpg_list(json).is_err());
    }

    #[test]
    fn test_parse_rejects_missing_list() {
        assert!(matches!(parse_vpg_list("{}"), Err(AuditError::Json(_))));
    }

    #[test]
    fn test_name_table_lookup() {
        let table: NameTable = [("vmi1", "server1-eth0")].into_iter().collect();

        assert_eq!(
            table.display_name(&InterfaceId::from("vmi1")).unwrap(),
            "server1-eth0"
        );
        assert_eq!(
            table.display_name(&InterfaceId::from("100:vmi1")).unwrap(),
            "server1-eth0"
        );
        assert!(matches!(
            table.display_name(&InterfaceId::from("vmi2")),
            Err(AuditError::UnknownInterface { .. })
        ));
    }

    #[test]
    fn test_name_table_from_json() {
        let table = NameTable::from_json(r#"{"vmi1": "a", "vmi2": "b"}"#).unwrap();
        assert_eq!(table.len(), 2);
        assert!(!table.is_empty());
    }

    #[test]
    fn test_identity_resolver() {
        let id = InterfaceId::from("100:vmi1");
        assert_eq!(IdentityResolver.display_name(&id).unwrap(), "100:vmi1");
    }

    #[test]
    fn test_slice_source_preserves_order() {
        let vpgs = vec![VirtualPortGroup::new("1", "a"), VirtualPortGroup::new("2", "b")];
        let listed = vpgs.virtual_port_groups().unwrap();
        assert_eq!(listed, vpgs);
    }
}
