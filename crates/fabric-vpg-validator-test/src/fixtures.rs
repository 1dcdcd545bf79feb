//! Test fixtures for common VPG layouts
//!
//! Annotation strings follow the layout the fabric manager writes:
//! `validation:<mode>/vn:<vn>/vlan_id:<vlan>` with a `<vlan>:<vmi>` value.

use fabric_vpg_validator::VirtualPortGroup;
use serde_json::{json, Value};

/// Annotation key for an enterprise-style binding
pub fn enterprise(vn: &str, vlan: &str) -> String {
    format!("validation:enterprise/vn:{}/vlan_id:{}", vn, vlan)
}

/// Annotation key for a service-provider-style binding
pub fn service_provider(vn: &str, vlan: &str) -> String {
    format!("validation:serviceprovider/vn:{}/vlan_id:{}", vn, vlan)
}

/// Annotation key for an untagged binding
pub fn untagged(vn: &str, vlan: &str) -> String {
    format!("validation:enterprise/vn:{}/untagged_vlan_id:{}", vn, vlan)
}

/// Annotation value binding `vmi`
pub fn vmi_value(vlan: &str, vmi: &str) -> String {
    format!("{}:{}", vlan, vmi)
}

/// Builder for a VPG fixture
#[derive(Debug, Clone)]
pub struct VpgFixture {
    vpg: VirtualPortGroup,
}

impl VpgFixture {
    /// New VPG whose uuid is derived from its name
    pub fn new(name: &str) -> Self {
        Self {
            vpg: VirtualPortGroup::new(format!("uuid-{}", name), name),
        }
    }

    /// Enterprise binding of `vmi` to `vn`/`vlan`
    pub fn enterprise(mut self, vn: &str, vlan: &str, vmi: &str) -> Self {
        self.vpg = self.vpg.with_annotation(enterprise(vn, vlan), vmi_value(vlan, vmi));
        self
    }

    /// Service-provider binding of `vmi` to `vn`/`vlan`
    pub fn service_provider(mut self, vn: &str, vlan: &str, vmi: &str) -> Self {
        self.vpg = self
            .vpg
            .with_annotation(service_provider(vn, vlan), vmi_value(vlan, vmi));
        self
    }

    /// Untagged binding of `vmi` to `vn` on `vlan`
    pub fn untagged(mut self, vn: &str, vlan: &str, vmi: &str) -> Self {
        self.vpg = self.vpg.with_annotation(untagged(vn, vlan), vmi_value(vlan, vmi));
        self
    }

    /// Arbitrary annotation
    pub fn raw(mut self, key: &str, value: &str) -> Self {
        self.vpg = self.vpg.with_annotation(key, value);
        self
    }

    /// Finishes the fixture
    pub fn build(self) -> VirtualPortGroup {
        self.vpg
    }
}

/// Renders VPGs as a `virtual-port-groups` list export
pub fn vpg_export(vpgs: &[VirtualPortGroup]) -> Value {
    let records: Vec<Value> = vpgs
        .iter()
        .map(|vpg| {
            let pairs: Vec<Value> = vpg
                .annotations
                .iter()
                .map(|a| json!({ "key": a.key, "value": a.value }))
                .collect();
            json!({
                "uuid": vpg.uuid,
                "fq_name": ["default-global-system-config", "fabric1", vpg.name],
                "annotations": { "key_value_pair": pairs },
            })
        })
        .collect();
    json!({ "virtual-port-groups": records })
}

/// Scenario fixtures used across integration tests
pub mod scenarios {
    use super::*;

    /// Two VPGs sharing VN `vn1` with different VLANs
    pub fn vn_shared_across_vpgs() -> (VirtualPortGroup, VirtualPortGroup) {
        (
            VpgFixture::new("vpg-a").enterprise("vn1", "100", "vmi-a").build(),
            VpgFixture::new("vpg-b").enterprise("vn1", "200", "vmi-b").build(),
        )
    }

    /// A fabric where every VN and VLAN is used exactly once
    pub fn globally_unique_fabric(vpg_count: usize, per_vpg: usize) -> Vec<VirtualPortGroup> {
        (0..vpg_count)
            .map(|v| {
                let fixture = VpgFixture::new(&format!("vpg-{}", v));
                (0..per_vpg)
                    .map(|i| v * per_vpg + i)
                    .fold(fixture, |fixture, n| {
                        fixture.enterprise(
                            &format!("vn-{}", n),
                            &(100 + n).to_string(),
                            &format!("vmi-{}", n),
                        )
                    })
                    .build()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fixture_builds_annotations() {
        let vpg = VpgFixture::new("vpg1")
            .enterprise("vn1", "100", "vmi1")
            .untagged("vn2", "500", "vmi2")
            .build();

        assert_eq!(vpg.uuid, "uuid-vpg1");
        assert_eq!(vpg.annotations.len(), 2);
        assert_eq!(vpg.annotations[0].key, "validation:enterprise/vn:vn1/vlan_id:100");
        assert_eq!(vpg.annotations[1].value, "500:vmi2");
    }

    #[test]
    fn test_vpg_export_shape() {
        let export = vpg_export(&[VpgFixture::new("vpg1").enterprise("vn1", "1", "vmi1").build()]);
        let record = &export["virtual-port-groups"][0];
        assert_eq!(record["uuid"], "uuid-vpg1");
        assert_eq!(record["fq_name"][2], "vpg1");
        assert_eq!(record["annotations"]["key_value_pair"][0]["value"], "1:vmi1");
    }

    #[test]
    fn test_globally_unique_fabric() {
        let vpgs = scenarios::globally_unique_fabric(3, 2);
        assert_eq!(vpgs.len(), 3);
        assert_eq!(vpgs[2].annotations[1].value, "105:vmi-5");
    }
}
