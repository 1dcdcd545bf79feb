//! Intra-VPG checker.
//!
//! Walks the annotations of one VPG in order and evaluates them against two
//! kinds of state:
//!
//! 1. Local accumulators, created empty for the VPG.
//! 2. [`FabricSets`] built from the VPGs scanned before this one. These are
//!    read-only for the duration of the pass.
//!
//! The pass yields the VPG's failures plus a [`VpgContribution`] that the
//! caller merges into the fabric sets once the whole VPG has been checked.
//! Because the merge happens per VPG, a collision between two VPGs is only
//! reported on the one scanned later.

use std::collections::{HashMap, HashSet};
use tracing::{debug, instrument};

use crate::annotation::AnnotationRecord;
use crate::failures::{AcrossFabricFailure, LocalCheckFailure, UntaggedVlanFailure, VpgFailures};
use crate::types::{FabricOwner, InterfaceId, VirtualPortGroup, VlanId, VnId, VpgKey};

/// VN/VLAN pair as seen on one annotation
pub type VnVlanPair = (VnId, VlanId);

/// Fabric-wide aggregate sets.
///
/// Only ever grow; see [`FabricSets::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FabricSets {
    vns: HashSet<VnId>,
    vlans: HashSet<VlanId>,
    pairs: HashSet<VnVlanPair>,
}

impl FabricSets {
    /// Creates empty fabric sets
    pub fn new() -> Self {
        Self::default()
    }

    /// VN is in exclusive use somewhere in the fabric
    pub fn contains_vn(&self, vn: &VnId) -> bool {
        self.vns.contains(vn)
    }

    /// VLAN is in exclusive use somewhere in the fabric
    pub fn contains_vlan(&self, vlan: &VlanId) -> bool {
        self.vlans.contains(vlan)
    }

    /// VN and VLAN have already been seen together
    pub fn contains_pair(&self, pair: &VnVlanPair) -> bool {
        self.pairs.contains(pair)
    }

    /// Unions a VPG's contribution into the fabric sets
    pub fn merge(&mut self, contribution: VpgContribution) {
        self.vns.extend(contribution.vns);
        self.vlans.extend(contribution.vlans);
        self.pairs.extend(contribution.pairs);
    }

    /// Number of VNs in exclusive use
    pub fn vn_count(&self) -> usize {
        self.vns.len()
    }

    /// Number of VLANs in exclusive use
    pub fn vlan_count(&self) -> usize {
        self.vlans.len()
    }

    /// Number of distinct pairs seen
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }
}

/// First owner of every VN and VLAN seen in the fabric.
///
/// Write-once per key and independent of the exclusivity sets: any annotation
/// with a complete binding claims its VN and VLAN, whatever its validation
/// mode and whether or not it later fails a check.
#[derive(Debug, Clone, Default)]
pub struct OwnerIndex {
    vns: HashMap<VnId, FabricOwner>,
    vlans: HashMap<VlanId, FabricOwner>,
}

impl OwnerIndex {
    /// Creates an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// First owner of a VN
    pub fn vn_owner(&self, vn: &VnId) -> Option<&FabricOwner> {
        self.vns.get(vn)
    }

    /// First owner of a VLAN
    pub fn vlan_owner(&self, vlan: &VlanId) -> Option<&FabricOwner> {
        self.vlans.get(vlan)
    }

    /// Records `owner` for the VN and the VLAN unless they already have one,
    /// and returns the owners now on file.
    fn claim(&mut self, vn: &VnId, vlan: &VlanId, owner: FabricOwner) -> (FabricOwner, FabricOwner) {
        let vn_owner = self
            .vns
            .entry(vn.clone())
            .or_insert_with(|| owner.clone())
            .clone();
        let vlan_owner = self.vlans.entry(vlan.clone()).or_insert(owner).clone();
        (vn_owner, vlan_owner)
    }
}

/// What one VPG adds to the fabric sets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VpgContribution {
    /// VNs used by enterprise annotations
    pub vns: HashSet<VnId>,
    /// VLANs used by enterprise annotations
    pub vlans: HashSet<VlanId>,
    /// Pairs of every accepted annotation, any validation mode
    pub pairs: HashSet<VnVlanPair>,
}

/// Outcome of checking one VPG.
#[derive(Debug, Clone)]
pub struct VpgCheck {
    /// The VPG checked
    pub key: VpgKey,
    /// Findings
    pub failures: VpgFailures,
    /// Sets to merge into the fabric
    pub contribution: VpgContribution,
}

/// Checks one VPG against the fabric state accumulated so far.
#[instrument(skip_all, fields(vpg = %vpg.name, uuid = %vpg.uuid))]
pub fn check_vpg(vpg: &VirtualPortGroup, fabric: &FabricSets, owners: &mut OwnerIndex) -> VpgCheck {
    let mut checker = VpgChecker::new(vpg, fabric, owners);
    for pair in &vpg.annotations {
        let record = AnnotationRecord::parse(&pair.key, &pair.value);
        checker.check_record(&record);
    }
    checker.finish()
}

/// Per-VPG checking state.
struct VpgChecker<'a> {
    vpg: &'a VirtualPortGroup,
    fabric: &'a FabricSets,
    owners: &'a mut OwnerIndex,

    /// Untagged VLAN fixed by the first untagged annotation, with its owner
    untagged: Option<(VlanId, InterfaceId)>,
    /// Raw annotation -> interface that used it first
    annotations_seen: HashMap<String, InterfaceId>,
    /// VN -> interface that used it first
    vn_first_user: HashMap<VnId, InterfaceId>,
    /// VLAN -> interface that used it first
    vlan_first_user: HashMap<VlanId, InterfaceId>,

    contribution: VpgContribution,
    failures: VpgFailures,
}

impl<'a> VpgChecker<'a> {
    fn new(vpg: &'a VirtualPortGroup, fabric: &'a FabricSets, owners: &'a mut OwnerIndex) -> Self {
        Self {
            vpg,
            fabric,
            owners,
            untagged: None,
            annotations_seen: HashMap::new(),
            vn_first_user: HashMap::new(),
            vlan_first_user: HashMap::new(),
            contribution: VpgContribution::default(),
            failures: VpgFailures::default(),
        }
    }

    fn finish(self) -> VpgCheck {
        VpgCheck {
            key: self.vpg.key(),
            failures: self.failures,
            contribution: self.contribution,
        }
    }

    fn check_record(&mut self, record: &AnnotationRecord) {
        if !self.check_untagged(record) {
            return;
        }

        let Some((vn, vlan)) = record.binding() else {
            return;
        };

        let owner = FabricOwner {
            vpg_name: self.vpg.name.clone(),
            vpg_uuid: self.vpg.uuid.clone(),
            interface: record.interface.clone(),
        };
        let (vn_owner, vlan_owner) = self.owners.claim(vn, vlan, owner);

        let vn_first_user = self
            .vn_first_user
            .entry(vn.clone())
            .or_insert_with(|| record.interface.clone())
            .clone();
        let vlan_first_user = self
            .vlan_first_user
            .entry(vlan.clone())
            .or_insert_with(|| record.interface.clone())
            .clone();

        if let Some(first) = self.annotations_seen.get(&record.annotation) {
            debug!("Annotation {} already used by {}", record.annotation, first);
            self.failures.local_check.push(LocalCheckFailure {
                interface: record.interface.clone(),
                other_interface: first.clone(),
                vn: vn.clone(),
                vlan: vlan.clone(),
            });
            return;
        }
        self.annotations_seen
            .insert(record.annotation.clone(), record.interface.clone());

        let pair: VnVlanPair = (vn.clone(), vlan.clone());
        self.contribution.pairs.insert(pair.clone());

        if !record.is_enterprise() {
            return;
        }

        if !self.contribution.vns.insert(vn.clone()) {
            debug!("VN with uuid {} already in use by a different VMI", vn);
            self.contribution.pairs.remove(&pair);
            self.failures.local_check.push(LocalCheckFailure {
                interface: record.interface.clone(),
                other_interface: vn_first_user,
                vn: vn.clone(),
                vlan: vlan.clone(),
            });
            return;
        }

        if !self.contribution.vlans.insert(vlan.clone()) {
            debug!("VLAN {} already in use by a different VMI", vlan);
            self.contribution.pairs.remove(&pair);
            self.failures.local_check.push(LocalCheckFailure {
                interface: record.interface.clone(),
                other_interface: vlan_first_user,
                vn: vn.clone(),
                vlan: vlan.clone(),
            });
            return;
        }

        let vn_seen = self.fabric.contains_vn(vn);
        let vlan_seen = self.fabric.contains_vlan(vlan);
        if self.fabric.contains_pair(&pair) || (!vn_seen && !vlan_seen) {
            return;
        }

        debug!("VN/VLAN combination ({}, {}) not exact in different VPG", vn, vlan);
        // VN attribution takes precedence over VLAN
        let owner = if vn_seen { vn_owner } else { vlan_owner };
        self.failures.across_fabric.push(AcrossFabricFailure {
            interface: record.interface.clone(),
            owner,
            vn: vn.clone(),
            vlan: vlan.clone(),
        });
    }

    /// Applies the single-untagged-VLAN rule.
    ///
    /// Returns false when the record conflicts and must not be checked further.
    fn check_untagged(&mut self, record: &AnnotationRecord) -> bool {
        let Some(untagged) = &record.untagged else {
            return true;
        };

        let Some((fixed_vlan, fixed_by)) = &self.untagged else {
            self.untagged = Some((untagged.vlan.clone(), untagged.owner.clone()));
            self.vlan_first_user
                .entry(untagged.vlan.clone())
                .or_insert_with(|| untagged.owner.clone());
            return true;
        };

        if *fixed_vlan == untagged.vlan {
            return true;
        }

        debug!(
            "Untagged VLAN {} conflicts with untagged VLAN {} of {}",
            untagged.vlan, fixed_vlan, fixed_by
        );
        self.failures.untagged_vlan.push(UntaggedVlanFailure {
            interface: untagged.owner.clone(),
            vlan: untagged.vlan.clone(),
            fixed_by: fixed_by.clone(),
            fixed_vlan: fixed_vlan.clone(),
        });
        false
    }
}
