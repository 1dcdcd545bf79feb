//! Verification helpers for scan results

use fabric_vpg_validator::{ScanResult, VpgFailures};
use thiserror::Error;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("VPG '{name}' not found in scan result")]
    VpgNotFound { name: String },

    #[error("Expected VPG '{name}' to be clean, found {count} failures")]
    NotClean { name: String, count: usize },

    #[error("Count mismatch for {what}: expected {expected}, got {actual}")]
    CountMismatch {
        what: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

/// Expected failure counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExpectedCounts {
    pub local_check: usize,
    pub untagged_vlan: usize,
    pub across_fabric: usize,
}

/// Scan result verification helper
pub struct ScanVerifier<'a> {
    result: &'a ScanResult,
}

impl<'a> ScanVerifier<'a> {
    /// Create a new verifier
    pub fn new(result: &'a ScanResult) -> Self {
        Self { result }
    }

    /// Findings of a VPG by name
    pub fn vpg(&self, name: &str) -> VerifyResult<&'a VpgFailures> {
        self.result
            .failures_by_name(name)
            .ok_or_else(|| VerificationError::VpgNotFound {
                name: name.to_string(),
            })
    }

    /// Verify that a VPG has no failures
    pub fn assert_clean(&self, name: &str) -> VerifyResult<()> {
        let failures = self.vpg(name)?;
        if !failures.is_clean() {
            return Err(VerificationError::NotClean {
                name: name.to_string(),
                count: failures.len(),
            });
        }
        Ok(())
    }

    /// Verify the failure counts of one VPG
    pub fn assert_vpg_counts(&self, name: &str, expected: ExpectedCounts) -> VerifyResult<()> {
        let failures = self.vpg(name)?;
        check_count(format!("{} local_check", name), expected.local_check, failures.local_check.len())?;
        check_count(
            format!("{} untagged_vlan", name),
            expected.untagged_vlan,
            failures.untagged_vlan.len(),
        )?;
        check_count(
            format!("{} across_fabric", name),
            expected.across_fabric,
            failures.across_fabric.len(),
        )
    }

    /// Verify the fabric-wide counters
    pub fn assert_totals(&self, expected: ExpectedCounts) -> VerifyResult<()> {
        let stats = &self.result.stats;
        check_count("local_check_errors".to_string(), expected.local_check, stats.local_check_errors)?;
        check_count(
            "untagged_vlan_errors".to_string(),
            expected.untagged_vlan,
            stats.untagged_vlan_errors,
        )?;
        check_count(
            "across_fabric_errors".to_string(),
            expected.across_fabric,
            stats.across_fabric_errors,
        )
    }
}

fn check_count(what: String, expected: usize, actual: usize) -> VerifyResult<()> {
    if expected != actual {
        return Err(VerificationError::CountMismatch {
            what,
            expected,
            actual,
        });
    }
    Ok(())
}
