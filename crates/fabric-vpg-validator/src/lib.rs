//! fabric-vpg-validator - VN/VLAN consistency audit for fabric virtual port groups
//!
//! Scans every virtual port group (VPG) of a fabric and reports three kinds of
//! conflict between virtual networks (VNs) and VLANs:
//!
//! - duplicate annotations, VNs or VLANs within one VPG
//! - more than one untagged VLAN value within one VPG
//! - a VN or VLAN reused across VPGs with a different partner
//!
//! The audit is offline and read-only. It never prevents or repairs a
//! conflict, it only reports it.
//!
//! # Example
//!
//! ```
//! use fabric_vpg_validator::{FabricAggregator, VirtualPortGroup};
//!
//! let vpgs = vec![
//!     VirtualPortGroup::new("3b1d", "vpg-a")
//!         .with_annotation("validation:enterprise/vn:vn1/vlan_id:100", "100:vmi-1"),
//!     VirtualPortGroup::new("3b1e", "vpg-b")
//!         .with_annotation("validation:enterprise/vn:vn1/vlan_id:200", "200:vmi-2"),
//! ];
//!
//! let result = FabricAggregator::scan(&vpgs);
//! assert_eq!(result.stats.across_fabric_errors, 1);
//! ```

pub mod annotation;
pub mod checker;
pub mod config;
pub mod error;
pub mod failures;
pub mod logging;
pub mod report;
pub mod source;

mod aggregator;
mod types;

pub use aggregator::{FabricAggregator, ScanResult, ScanStats, VpgScan};
pub use annotation::{AnnotationRecord, ValidationMode};
pub use checker::{check_vpg, FabricSets, OwnerIndex, VpgCheck, VpgContribution};
pub use error::{AuditError, AuditResult};
pub use failures::{AcrossFabricFailure, LocalCheckFailure, UntaggedVlanFailure, VpgFailures};
pub use report::{Reporter, Statistics};
pub use source::{IdentityResolver, InterfaceResolver, JsonVpgSource, NameTable, VpgSource};
pub use types::*;
