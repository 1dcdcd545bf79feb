//! Failure taxonomy.
//!
//! Failures are findings, not faults. Each record carries enough identifiers to
//! regenerate a report message without going back to the source data.

use serde::{Deserialize, Serialize};

use crate::types::{FabricOwner, InterfaceId, VlanId, VnId};

/// Same annotation, VN or VLAN used by two interfaces of one VPG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalCheckFailure {
    /// Interface that repeated the use
    pub interface: InterfaceId,
    /// Interface that made the use first
    pub other_interface: InterfaceId,
    /// VN of the repeating annotation
    pub vn: VnId,
    /// VLAN of the repeating annotation
    pub vlan: VlanId,
}

/// Second untagged VLAN value declared within one VPG.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UntaggedVlanFailure {
    /// Interface declaring the conflicting value
    pub interface: InterfaceId,
    /// Conflicting untagged VLAN
    pub vlan: VlanId,
    /// Interface that fixed the VPG's untagged VLAN
    pub fixed_by: InterfaceId,
    /// The VPG's untagged VLAN
    pub fixed_vlan: VlanId,
}

/// VN or VLAN reused across VPGs without an exact pair match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcrossFabricFailure {
    /// Interface in the VPG being checked
    pub interface: InterfaceId,
    /// First user of the colliding VN (or VLAN when the VN is new)
    pub owner: FabricOwner,
    /// VN of the colliding annotation
    pub vn: VnId,
    /// VLAN of the colliding annotation
    pub vlan: VlanId,
}

/// All findings of one VPG.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpgFailures {
    /// Intra-VPG duplicates
    pub local_check: Vec<LocalCheckFailure>,
    /// Untagged VLAN conflicts
    pub untagged_vlan: Vec<UntaggedVlanFailure>,
    /// Cross-fabric collisions
    pub across_fabric: Vec<AcrossFabricFailure>,
}

impl VpgFailures {
    /// Returns true when no failure of any kind was found
    pub fn is_clean(&self) -> bool {
        self.local_check.is_empty() && self.untagged_vlan.is_empty() && self.across_fabric.is_empty()
    }

    /// Total number of failures
    pub fn len(&self) -> usize {
        self.local_check.len() + self.untagged_vlan.len() + self.across_fabric.len()
    }

    /// Same as [`is_clean`](Self::is_clean)
    pub fn is_empty(&self) -> bool {
        self.is_clean()
    }
}
