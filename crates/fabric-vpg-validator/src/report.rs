//! Human-readable audit report.
//!
//! Stateless rendering over a [`ScanResult`]. The only collaborator is the
//! [`InterfaceResolver`], consulted for display names; resolution failures
//! abort rendering.

use std::fmt;
use tracing::info;

use crate::aggregator::{ScanResult, ScanStats};
use crate::error::AuditResult;
use crate::failures::{AcrossFabricFailure, LocalCheckFailure, UntaggedVlanFailure, VpgFailures};
use crate::source::InterfaceResolver;
use crate::types::{InterfaceId, VpgKey};

/// Renders scan results as audit messages.
pub struct Reporter<'a, R: InterfaceResolver + ?Sized> {
    resolver: &'a R,
}

impl<'a, R: InterfaceResolver + ?Sized> Reporter<'a, R> {
    /// Creates a reporter using the given name resolver
    pub fn new(resolver: &'a R) -> Self {
        Self { resolver }
    }

    /// Renders every VPG of the scan, in scan order
    pub fn render(&self, result: &ScanResult) -> AuditResult<Vec<String>> {
        let mut lines = Vec::new();
        for scan in &result.vpgs {
            self.render_vpg(&scan.key, &scan.failures, &mut lines)?;
        }
        Ok(lines)
    }

    /// Renders the scan and logs every line at info level
    pub fn emit(&self, result: &ScanResult) -> AuditResult<()> {
        for line in self.render(result)? {
            info!("{}", line);
        }
        Ok(())
    }

    fn render_vpg(&self, key: &VpgKey, failures: &VpgFailures, lines: &mut Vec<String>) -> AuditResult<()> {
        if failures.is_clean() {
            lines.push(format!("For vpg {}, there were no failures", key));
            return Ok(());
        }

        lines.push(format!("The following errors occurred for vpg {}", key));

        if !failures.local_check.is_empty() {
            lines.push("Validation errors that occurred in VPG due to wrong combination:".to_string());
            for failure in &failures.local_check {
                lines.push(self.local_check_message(key, failure)?);
            }
        }

        if !failures.across_fabric.is_empty() {
            lines.push("Validation errors that occurred due to other VPGs within fabric:".to_string());
            for failure in &failures.across_fabric {
                lines.push(self.across_fabric_message(key, failure)?);
            }
        }

        if !failures.untagged_vlan.is_empty() {
            lines.push("Validation errors that occurred due to multiple untagged VLANs:".to_string());
            for failure in &failures.untagged_vlan {
                lines.push(self.untagged_vlan_message(key, failure)?);
            }
        }

        Ok(())
    }

    /// Message for an intra-VPG duplicate
    pub fn local_check_message(&self, key: &VpgKey, failure: &LocalCheckFailure) -> AuditResult<String> {
        Ok(format!(
            "VN-VLAN REUSED IN A VPG: {vpg}({uuid}):{} and {vpg}({uuid}):{} has same VN({}) or VLAN({}) or both",
            self.interface(&failure.interface)?,
            self.interface(&failure.other_interface)?,
            failure.vn,
            failure.vlan,
            vpg = key.name,
            uuid = key.uuid,
        ))
    }

    /// Message for a cross-fabric collision
    pub fn across_fabric_message(&self, key: &VpgKey, failure: &AcrossFabricFailure) -> AuditResult<String> {
        Ok(format!(
            "VN-VLAN REUSED IN A FABRIC: {}({}):{} and {}({}):{} has same VN({}) or VLAN({})",
            key.name,
            key.uuid,
            self.interface(&failure.interface)?,
            failure.owner.vpg_name,
            failure.owner.vpg_uuid,
            self.interface(&failure.owner.interface)?,
            failure.vn,
            failure.vlan,
        ))
    }

    /// Message for an untagged VLAN conflict
    pub fn untagged_vlan_message(&self, key: &VpgKey, failure: &UntaggedVlanFailure) -> AuditResult<String> {
        Ok(format!(
            "MULTIPLE UNTAGGED VLANS: {vpg}({uuid}):{}:VLAN({}), {vpg}({uuid}):{}:VLAN({})",
            self.interface(&failure.interface)?,
            failure.vlan,
            self.interface(&failure.fixed_by)?,
            failure.fixed_vlan,
            vpg = key.name,
            uuid = key.uuid,
        ))
    }

    /// `<display name>(<id>)`
    fn interface(&self, id: &InterfaceId) -> AuditResult<String> {
        Ok(format!("{}({})", self.resolver.display_name(id)?, id))
    }
}

/// Summary percentages of a scan.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Statistics {
    /// Share of failures that are cross-fabric collisions
    pub across_fabric_percent: f64,
    /// Share of failures that are untagged VLAN conflicts
    pub untagged_vlan_percent: f64,
    /// Share of failures that are intra-VPG duplicates
    pub local_check_percent: f64,
    /// Share of scanned VPGs with at least one failure
    pub invalid_vpg_percent: f64,
}

impl From<&ScanStats> for Statistics {
    fn from(stats: &ScanStats) -> Self {
        let total = stats.total_errors();
        Self {
            across_fabric_percent: percent(stats.across_fabric_errors, total),
            untagged_vlan_percent: percent(stats.untagged_vlan_errors, total),
            local_check_percent: percent(stats.local_check_errors, total),
            invalid_vpg_percent: percent(stats.invalid_vpgs, stats.total_vpgs),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reporting Statistics:")?;
        writeln!(
            f,
            "Percentage of errors that occur due to Across Fabric VN/VLAN combinations is {:.2}%",
            self.across_fabric_percent
        )?;
        writeln!(
            f,
            "Percentage of errors that occur due to Duplicate Untagged VLANs is {:.2}%",
            self.untagged_vlan_percent
        )?;
        writeln!(
            f,
            "Percentage of errors that occur due to invalid VN/VLAN combinations within vpgs is {:.2}%",
            self.local_check_percent
        )?;
        write!(f, "Invalid VPG percentage is {:.2}%", self.invalid_vpg_percent)
    }
}

/// `part / whole` as a percentage, 0 when `whole` is 0
fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{IdentityResolver, NameTable};
    use crate::types::FabricOwner;
    use crate::aggregator::VpgScan;
    use crate::error::AuditError;
    use pretty_assertions::assert_eq;

    fn key() -> VpgKey {
        VpgKey {
            uuid: "u1".to_string(),
            name: "vpg1".to_string(),
        }
    }

    fn names() -> NameTable {
        [("vmi1", "eth0"), ("vmi2", "eth1")].into_iter().collect()
    }

    #[test]
    fn test_local_check_message() {
        let names = names();
        let reporter = Reporter::new(&names);
        let failure = LocalCheckFailure {
            interface: "100:vmi2".into(),
            other_interface: "100:vmi1".into(),
            vn: "vn1".into(),
            vlan: "100".into(),
        };

        assert_eq!(
            reporter.local_check_message(&key(), &failure).unwrap(),
            "VN-VLAN REUSED IN A VPG: vpg1(u1):eth1(100:vmi2) and vpg1(u1):eth0(100:vmi1) \
             has same VN(vn1) or VLAN(100) or both"
        );
    }

    #[test]
    fn test_across_fabric_message() {
        let names = names();
        let reporter = Reporter::new(&names);
        let failure = AcrossFabricFailure {
            interface: "vmi2".into(),
            owner: FabricOwner {
                vpg_name: "vpg0".to_string(),
                vpg_uuid: "u0".to_string(),
                interface: "vmi1".into(),
            },
            vn: "vn1".into(),
            vlan: "200".into(),
        };

        assert_eq!(
            reporter.across_fabric_message(&key(), &failure).unwrap(),
            "VN-VLAN REUSED IN A FABRIC: vpg1(u1):eth1(vmi2) and vpg0(u0):eth0(vmi1) \
             has same VN(vn1) or VLAN(200)"
        );
    }

    #[test]
    fn test_untagged_vlan_message_names_both_interfaces() {
        let reporter = Reporter::new(&IdentityResolver);
        let failure = UntaggedVlanFailure {
            interface: "vmi2".into(),
            vlan: "600".into(),
            fixed_by: "vmi1".into(),
            fixed_vlan: "500".into(),
        };

        assert_eq!(
            reporter.untagged_vlan_message(&key(), &failure).unwrap(),
            "MULTIPLE UNTAGGED VLANS: vpg1(u1):vmi2(vmi2):VLAN(600), vpg1(u1):vmi1(vmi1):VLAN(500)"
        );
    }

    #[test]
    fn test_render_groups_by_category() {
        let mut failures = VpgFailures::default();
        failures.untagged_vlan.push(UntaggedVlanFailure {
            interface: "vmi2".into(),
            vlan: "600".into(),
            fixed_by: "vmi1".into(),
            fixed_vlan: "500".into(),
        });
        let result = ScanResult {
            vpgs: vec![
                VpgScan {
                    key: VpgKey {
                        uuid: "u0".to_string(),
                        name: "clean".to_string(),
                    },
                    failures: VpgFailures::default(),
                },
                VpgScan { key: key(), failures },
            ],
            stats: ScanStats::default(),
        };

        let lines = Reporter::new(&IdentityResolver).render(&result).unwrap();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "For vpg u0:clean, there were no failures");
        assert_eq!(lines[1], "The following errors occurred for vpg u1:vpg1");
        assert!(lines[2].contains("multiple untagged VLANs"));
        assert!(lines[3].starts_with("MULTIPLE UNTAGGED VLANS"));
    }

    #[test]
    fn test_render_fails_on_unknown_interface() {
        let mut failures = VpgFailures::default();
        failures.local_check.push(LocalCheckFailure {
            interface: "vmi9".into(),
            other_interface: "vmi1".into(),
            vn: "vn1".into(),
            vlan: "1".into(),
        });
        let result = ScanResult {
            vpgs: vec![VpgScan { key: key(), failures }],
            stats: ScanStats::default(),
        };
        let names = names();

        let err = Reporter::new(&names).render(&result).unwrap_err();
        assert!(matches!(err, AuditError::UnknownInterface { .. }));
    }

    #[test]
    fn test_statistics_zero_failures() {
        let stats = ScanStats {
            total_vpgs: 4,
            ..ScanStats::default()
        };
        assert_eq!(Statistics::from(&stats), Statistics::default());
        assert_eq!(Statistics::from(&ScanStats::default()), Statistics::default());
    }

    #[test]
    fn test_statistics_percentages() {
        let stats = ScanStats {
            local_check_errors: 1,
            untagged_vlan_errors: 1,
            across_fabric_errors: 2,
            invalid_vpgs: 1,
            total_vpgs: 4,
        };

        let statistics = Statistics::from(&stats);

        assert_eq!(statistics.across_fabric_percent, 50.0);
        assert_eq!(statistics.untagged_vlan_percent, 25.0);
        assert_eq!(statistics.local_check_percent, 25.0);
        assert_eq!(statistics.invalid_vpg_percent, 25.0);
        let text = statistics.to_string();
        assert!(text.contains("Across Fabric VN/VLAN combinations is 50.00%"));
        assert!(text.ends_with("Invalid VPG percentage is 25.00%"));
    }
}
