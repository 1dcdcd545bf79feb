//! Fabric aggregator.
//!
//! Folds the intra-VPG checker over every VPG in source order, merging each
//! VPG's contribution into the fabric sets before the next VPG is checked.

use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::checker::{check_vpg, FabricSets, OwnerIndex};
use crate::error::AuditResult;
use crate::failures::VpgFailures;
use crate::source::VpgSource;
use crate::types::{VirtualPortGroup, VpgKey};

/// Indentation of the JSON dump
const JSON_INDENT: &[u8] = b"   ";

/// Findings of one VPG in a scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VpgScan {
    /// The VPG
    pub key: VpgKey,
    /// Its findings
    pub failures: VpgFailures,
}

/// Fabric-wide counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Intra-VPG duplicates
    pub local_check_errors: usize,
    /// Untagged VLAN conflicts
    pub untagged_vlan_errors: usize,
    /// Cross-fabric collisions
    pub across_fabric_errors: usize,
    /// VPGs with at least one failure
    pub invalid_vpgs: usize,
    /// VPGs scanned
    pub total_vpgs: usize,
}

impl ScanStats {
    /// Total failures of all kinds
    pub fn total_errors(&self) -> usize {
        self.local_check_errors + self.untagged_vlan_errors + self.across_fabric_errors
    }

    fn record(&mut self, failures: &VpgFailures) {
        self.total_vpgs += 1;
        self.local_check_errors += failures.local_check.len();
        self.untagged_vlan_errors += failures.untagged_vlan.len();
        self.across_fabric_errors += failures.across_fabric.len();
        if !failures.is_clean() {
            self.invalid_vpgs += 1;
        }
    }
}

/// Result of a full fabric scan. Read-only once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Per-VPG findings in scan order
    pub vpgs: Vec<VpgScan>,
    /// Counters
    pub stats: ScanStats,
}

impl ScanResult {
    /// Findings of a VPG by name (first match in scan order)
    pub fn failures_by_name(&self, name: &str) -> Option<&VpgFailures> {
        self.vpgs
            .iter()
            .find(|scan| scan.key.name == name)
            .map(|scan| &scan.failures)
    }

    /// Findings keyed by `"<uuid>:<name>"`, sorted by key.
    ///
    /// A key that occurs twice keeps the later VPG's findings.
    pub fn failure_map(&self) -> BTreeMap<String, &VpgFailures> {
        self.vpgs
            .iter()
            .map(|scan| (scan.key.to_string(), &scan.failures))
            .collect()
    }

    /// Renders [`failure_map`](Self::failure_map) as pretty JSON
    pub fn to_json(&self) -> AuditResult<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(JSON_INDENT);
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.failure_map().serialize(&mut ser)?;
        // serde_json only ever emits UTF-8
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }

    /// Writes the JSON dump to a file
    pub fn write_json(&self, path: impl AsRef<Path>) -> AuditResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_json()?)?;
        info!("Wrote validation failures to {}", path.display());
        Ok(())
    }
}

/// Drives the checker over a fabric.
#[derive(Debug, Default)]
pub struct FabricAggregator {
    fabric: FabricSets,
    owners: OwnerIndex,
    result: ScanResult,
}

impl FabricAggregator {
    /// Creates an aggregator with empty fabric state
    pub fn new() -> Self {
        Self::default()
    }

    /// Scans every VPG in order
    #[instrument(skip_all, fields(vpgs = vpgs.len()))]
    pub fn scan(vpgs: &[VirtualPortGroup]) -> ScanResult {
        let mut aggregator = Self::new();
        for vpg in vpgs {
            aggregator.scan_vpg(vpg);
        }
        aggregator.finish()
    }

    /// Fetches the VPGs from a source and scans them.
    ///
    /// Source failures abort the scan.
    pub fn scan_source<S: VpgSource + ?Sized>(source: &S) -> AuditResult<ScanResult> {
        let vpgs = source.virtual_port_groups()?;
        info!("Validating {} virtual port groups", vpgs.len());
        Ok(Self::scan(&vpgs))
    }

    /// Checks one VPG and folds its contribution into the fabric
    pub fn scan_vpg(&mut self, vpg: &VirtualPortGroup) {
        let check = check_vpg(vpg, &self.fabric, &mut self.owners);
        self.fabric.merge(check.contribution);
        self.result.stats.record(&check.failures);
        debug!(
            "VPG {} checked: {} failures, fabric holds {} VNs, {} VLANs, {} pairs",
            check.key,
            check.failures.len(),
            self.fabric.vn_count(),
            self.fabric.vlan_count(),
            self.fabric.pair_count()
        );
        self.result.vpgs.push(VpgScan {
            key: check.key,
            failures: check.failures,
        });
    }

    /// Fabric state accumulated so far
    pub fn fabric(&self) -> &FabricSets {
        &self.fabric
    }

    /// Ends the scan
    pub fn finish(self) -> ScanResult {
        self.result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn enterprise(vn: &str, vlan: &str) -> String {
        format!("validation:enterprise/vn:{}/vlan_id:{}", vn, vlan)
    }

    #[test]
    fn test_empty_fabric() {
        let result = FabricAggregator::scan(&[]);
        assert!(result.vpgs.is_empty());
        assert_eq!(result.stats, ScanStats::default());
        assert_eq!(result.to_json().unwrap(), "{}");
    }

    #[test]
    fn test_stats_accumulate() {
        let vpgs = vec![
            VirtualPortGroup::new("ua", "vpgA")
                .with_annotation(enterprise("vn1", "100"), "100:vmi1")
                .with_annotation(enterprise("vn1", "100"), "100:vmi2"),
            VirtualPortGroup::new("ub", "vpgB").with_annotation(enterprise("vn1", "200"), "200:vmi3"),
            VirtualPortGroup::new("uc", "vpgC").with_annotation(enterprise("vn3", "300"), "300:vmi4"),
        ];

        let result = FabricAggregator::scan(&vpgs);

        assert_eq!(
            result.stats,
            ScanStats {
                local_check_errors: 1,
                untagged_vlan_errors: 0,
                across_fabric_errors: 1,
                invalid_vpgs: 2,
                total_vpgs: 3,
            }
        );
        assert_eq!(result.stats.total_errors(), 2);
        assert!(result.failures_by_name("vpgC").unwrap().is_clean());
    }

    #[test]
    fn test_incremental_scan_matches_batch() {
        let vpgs = vec![
            VirtualPortGroup::new("ua", "vpgA").with_annotation(enterprise("vn1", "100"), "100:vmi1"),
            VirtualPortGroup::new("ub", "vpgB").with_annotation(enterprise("vn2", "100"), "100:vmi2"),
        ];

        let mut aggregator = FabricAggregator::new();
        for vpg in &vpgs {
            aggregator.scan_vpg(vpg);
        }
        assert!(aggregator.fabric().contains_vn(&"vn2".into()));

        assert_eq!(aggregator.finish(), FabricAggregator::scan(&vpgs));
    }

    #[test]
    fn test_json_dump_keys_are_sorted() {
        let vpgs = vec![VirtualPortGroup::new("zz", "last"), VirtualPortGroup::new("aa", "first")];
        let json = FabricAggregator::scan(&vpgs).to_json().unwrap();

        let first = json.find("aa:first").unwrap();
        let last = json.find("zz:last").unwrap();
        assert!(first < last);
        assert!(json.contains("\n   \"aa:first\": {"));
    }

    #[test]
    fn test_scan_source() {
        let vpgs = vec![VirtualPortGroup::new("ua", "vpgA")];
        let result = FabricAggregator::scan_source(&vpgs).unwrap();
        assert_eq!(result.stats.total_vpgs, 1);
    }
}
