// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The EVPN overlay of leaves: VTEP, VPC VRFs, attached subnets and peerings

use config::AgentSpec;
use config::intent::VpcSubnet;
use spec::{
    Spec, SpecAcl, SpecAclAction, SpecAclEntry, SpecAclInterface, SpecDhcpRelay, SpecInterface,
    SpecSuppressVlanNeigh, SpecVrfInterface, SpecVrfTableConnection, SpecVrfVniEntry,
    SpecVxlanEvpnNvo, SpecVxlanTunnel, SpecVxlanTunnelMap,
};
use std::collections::BTreeSet;
use tracing::debug;

use crate::underlay::max_paths;
use crate::{
    LOOPBACK_SWITCH, NVO, PlanError, TABLE_DIRECTLY_CONNECTED, VTEP_FABRIC, attached_subnet,
    subnet_cidr, vlan_interface, vpc_vrf,
};

/// Sequence of the entry letting through what the isolation entries don't drop
const ACL_ACCEPT_SEQ: u32 = 9999;

fn isolation_acl(vpc: &str, subnet: &str) -> String {
    format!("vpc-{vpc}-{subnet}-isolation")
}

/// Map `vni` to the VLAN interface `vlan` and suppress ARP/ND on it
fn bind_vni(spec: &mut Spec, vni: u32, vlan: &str) {
    spec.vxlan_tunnel_maps.insert(
        format!("map_{vni}_{vlan}"),
        SpecVxlanTunnelMap {
            vtep: Some(VTEP_FABRIC.to_owned()),
            vni: Some(vni),
            vlan: Some(vlan.to_owned()),
        },
    );
    spec.suppress_vlan_neighs
        .insert(vlan.to_owned(), SpecSuppressVlanNeigh {});
}

pub(crate) fn plan_vxlan(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    if !intent.role.is_leaf() {
        return Ok(());
    }
    let vtep_ip = intent.vtep_ip.ok_or(PlanError::MissingParameter("vtepIP"))?;
    spec.vxlan_tunnels.insert(
        VTEP_FABRIC.to_owned(),
        SpecVxlanTunnel {
            source_ip: Some(vtep_ip.addr().to_string()),
            ..Default::default()
        },
    );
    spec.vxlan_evpn_nvos.insert(
        NVO.to_owned(),
        SpecVxlanEvpnNvo {
            source_vtep: Some(VTEP_FABRIC.to_owned()),
        },
    );
    Ok(())
}

/// One VRF per VPC, routed between leaves over its IRB VLAN
pub(crate) fn plan_vpcs(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    if !intent.role.is_leaf() {
        return Ok(());
    }
    let protocol_ip = intent
        .protocol_ip
        .ok_or(PlanError::MissingParameter("protocolIP"))?;
    for name in intent.vpcs.keys() {
        let vni = *intent
            .vnis
            .get(name)
            .ok_or_else(|| PlanError::MissingVni(name.clone()))?;
        let irb = *intent
            .irb_vlans
            .get(name)
            .ok_or_else(|| PlanError::MissingIrbVlan(name.clone()))?;
        let irb = vlan_interface(irb);
        let vrf_name = vpc_vrf(name);

        spec.interfaces.insert(
            irb.clone(),
            SpecInterface {
                description: Some(format!("VPC {name} IRB")),
                enabled: Some(true),
                ..Default::default()
            },
        );

        let vrf = spec.vrfs.entry(vrf_name.clone()).or_default();
        vrf.enabled = Some(true);
        vrf.description = Some(format!("VPC {name}"));
        vrf.interfaces.insert(irb.clone(), SpecVrfInterface {});
        vrf.table_connections.insert(
            TABLE_DIRECTLY_CONNECTED.to_owned(),
            SpecVrfTableConnection::default(),
        );
        let bgp = vrf.bgp_mut();
        bgp.asn = Some(intent.asn);
        bgp.router_id = Some(protocol_ip.addr().to_string());
        bgp.ipv4_unicast.enabled = true;
        bgp.ipv4_unicast.max_paths = Some(max_paths(intent));
        bgp.l2vpn_evpn.enabled = true;
        bgp.l2vpn_evpn.advertise_ipv4_unicast = Some(true);

        spec.vrf_vni_map
            .insert(vrf_name, SpecVrfVniEntry { vni: Some(vni) });
        bind_vni(spec, vni, &irb);
    }
    Ok(())
}

/// Drop traffic from an isolated subnet to the other subnets of its VPC
fn plan_isolation(
    intent: &AgentSpec,
    spec: &mut Spec,
    vpc: &str,
    subnet: &str,
    vlan: &str,
) -> Result<(), PlanError> {
    let others: Vec<(&String, &VpcSubnet)> = intent
        .vpcs
        .get(vpc)
        .map(|vpc| vpc.subnets.iter().filter(|(name, _)| *name != subnet).collect())
        .unwrap_or_default();

    let mut acl = SpecAcl {
        description: Some(format!("Isolation of {vpc}/{subnet}")),
        ..Default::default()
    };
    for (seq, (name, other)) in (1..).map(|i| i * 10).zip(others) {
        acl.entries.insert(
            seq,
            SpecAclEntry {
                description: Some(format!("Deny {vpc}/{name}")),
                action: Some(SpecAclAction::Drop),
                destination_address: Some(subnet_cidr(other)?.trunc().to_string()),
                ..Default::default()
            },
        );
    }
    acl.entries.insert(
        ACL_ACCEPT_SEQ,
        SpecAclEntry {
            description: Some("Allow".to_owned()),
            action: Some(SpecAclAction::Accept),
            ..Default::default()
        },
    );

    let name = isolation_acl(vpc, subnet);
    spec.acls.insert(name.clone(), acl);
    spec.acl_interfaces.insert(
        vlan.to_owned(),
        SpecAclInterface {
            ingress: Some(name),
            egress: None,
        },
    );
    Ok(())
}

/// Subnets attached to a local connection get their VLAN interface, with the subnet
/// gateway as anycast address, in the VRF of their VPC
pub(crate) fn plan_attachments(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    for attach in intent.vpc_attachments.values() {
        if !intent.connections.contains_key(&attach.connection) {
            return Err(PlanError::NoSuchConnection(attach.connection.clone()));
        }
    }
    if !intent.role.is_leaf() {
        return Ok(());
    }

    for (_, attach) in intent.local_attachments() {
        let (vpc, subnet_name, subnet) = attached_subnet(intent, attach)?;
        let vni = *intent
            .vnis
            .get(&attach.subnet)
            .ok_or_else(|| PlanError::MissingVni(attach.subnet.clone()))?;
        let cidr = subnet_cidr(subnet)?;
        let gateway = subnet
            .gateway()
            .map_err(|_| PlanError::InvalidCidr(subnet.subnet.clone()))?;
        if !cidr.contains(&gateway) {
            return Err(PlanError::InvalidCidr(subnet.subnet.clone()));
        }
        let vlan = vlan_interface(subnet.vlan);

        spec.interfaces.insert(
            vlan.clone(),
            SpecInterface {
                description: Some(format!("VPC {vpc}/{subnet_name}")),
                enabled: Some(true),
                vlan_anycast_gateway: vec![format!("{gateway}/{}", cidr.prefix_len())],
                ..Default::default()
            },
        );
        spec.vrfs
            .get_mut(&vpc_vrf(vpc))
            .ok_or_else(|| PlanError::NoSuchVpc(vpc.to_owned()))?
            .interfaces
            .insert(vlan.clone(), SpecVrfInterface {});
        bind_vni(spec, vni, &vlan);

        if subnet.dhcp.enable {
            let vip = intent
                .control_vip
                .ok_or(PlanError::MissingParameter("controlVIP"))?;
            spec.dhcp_relays.insert(
                vlan.clone(),
                SpecDhcpRelay {
                    source_interface: Some(LOOPBACK_SWITCH.to_owned()),
                    relay_address: vec![vip.addr().to_string()],
                    link_select: true,
                    vrf_select: true,
                },
            );
        }
        if subnet.isolated {
            plan_isolation(intent, spec, vpc, subnet_name, &vlan)?;
        }
    }
    Ok(())
}

/// Peered VPCs import each other's routes. Two VPCs both attached to this switch would
/// need a loopback between their VRFs instead, which isn't planned here.
pub(crate) fn plan_peerings(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    if !intent.role.is_leaf() {
        return Ok(());
    }
    let attached = intent
        .local_attachments()
        .map(|(_, attach)| attach.vpc())
        .collect::<Result<BTreeSet<_>, _>>()?;

    for (name, peering) in &intent.vpc_peerings {
        let (a, b) = (&peering.vpcs.0, &peering.vpcs.1);
        for vpc in [a, b] {
            if !intent.vpcs.contains_key(vpc) {
                return Err(PlanError::NoSuchVpc(vpc.clone()));
            }
        }
        if attached.contains(a.as_str()) && attached.contains(b.as_str()) {
            debug!("Peering {name} joins VPCs {a} and {b} both attached locally, deferred");
            continue;
        }
        for (vpc, other) in [(a, b), (b, a)] {
            spec.vrfs
                .get_mut(&vpc_vrf(vpc))
                .ok_or_else(|| PlanError::NoSuchVpc(vpc.clone()))?
                .bgp_mut()
                .ipv4_unicast
                .import_vrfs
                .insert(vpc_vrf(other));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan;
    use config::intent::{VpcPeering, VpcSpec};
    use pretty_assertions::assert_eq;
    use test_utils::leaf_intent;
    use tracing_test::traced_test;

    fn with_v2(mut intent: AgentSpec) -> AgentSpec {
        let mut vpc = VpcSpec::default();
        vpc.subnets.insert(
            "s1".to_owned(),
            VpcSubnet {
                subnet: "10.20.0.0/24".to_owned(),
                vlan: 1001,
                ..Default::default()
            },
        );
        intent.vpcs.insert("v2".to_owned(), vpc);
        intent.vnis.insert("v2".to_owned(), 200_000);
        intent.vnis.insert("v2/s1".to_owned(), 210_000);
        intent.irb_vlans.insert("v2".to_owned(), 3001);
        intent.vpc_peerings.insert(
            "v1--v2".to_owned(),
            VpcPeering {
                vpcs: ("v1".to_owned(), "v2".to_owned()),
            },
        );
        intent
    }

    fn import_vrfs(spec: &Spec, vrf: &str) -> Vec<String> {
        spec.vrfs[vrf]
            .bgp
            .as_ref()
            .map(|bgp| bgp.ipv4_unicast.import_vrfs.iter().cloned().collect())
            .unwrap_or_default()
    }

    #[test]
    fn test_peering_across_attachments() {
        let spec = plan(&with_v2(leaf_intent())).unwrap();
        assert_eq!(import_vrfs(&spec, "VrfVv1"), vec!["VrfVv2".to_owned()]);
        assert_eq!(import_vrfs(&spec, "VrfVv2"), vec!["VrfVv1".to_owned()]);
        /* v2 isn't attached here: its VRF exists but none of its subnets */
        assert!(spec.interfaces.contains_key("Vlan3001"));
        assert!(!spec.interfaces.contains_key("Vlan1001"));
    }

    #[test]
    #[traced_test]
    fn test_peering_both_attached_deferred() {
        let mut intent = with_v2(leaf_intent());
        intent.vpc_attachments.insert(
            "server-1--v2--s1".to_owned(),
            config::intent::VpcAttachment {
                subnet: "v2/s1".to_owned(),
                connection: "server-1--unbundled--leaf-1".to_owned(),
            },
        );
        let spec = plan(&intent).unwrap();
        assert!(import_vrfs(&spec, "VrfVv1").is_empty());
        assert!(import_vrfs(&spec, "VrfVv2").is_empty());
        assert!(logs_contain("deferred"));
        assert_eq!(
            spec.interfaces["Ethernet1"].trunk_vlans,
            vec!["1000".to_owned(), "1001".to_owned()]
        );
    }

    #[test]
    fn test_peering_unknown_vpc() {
        let mut intent = leaf_intent();
        intent.vpc_peerings.insert(
            "v1--v9".to_owned(),
            VpcPeering {
                vpcs: ("v1".to_owned(), "v9".to_owned()),
            },
        );
        assert_eq!(plan(&intent), Err(PlanError::NoSuchVpc("v9".to_owned())));
    }

    #[test]
    fn test_isolated_subnet() {
        let mut intent = leaf_intent();
        let vpc = intent.vpcs.get_mut("v1").unwrap();
        vpc.subnets.get_mut("s1").unwrap().isolated = true;
        vpc.subnets.insert(
            "s2".to_owned(),
            VpcSubnet {
                subnet: "10.10.20.0/24".to_owned(),
                vlan: 1002,
                ..Default::default()
            },
        );
        let spec = plan(&intent).unwrap();

        let acl = &spec.acls["vpc-v1-s1-isolation"];
        assert_eq!(
            acl.entries[&10],
            SpecAclEntry {
                description: Some("Deny v1/s2".to_owned()),
                action: Some(SpecAclAction::Drop),
                destination_address: Some("10.10.20.0/24".to_owned()),
                ..Default::default()
            }
        );
        assert_eq!(acl.entries[&ACL_ACCEPT_SEQ].action, Some(SpecAclAction::Accept));
        assert_eq!(acl.entries.len(), 2);
        assert_eq!(
            spec.acl_interfaces["Vlan1000"].ingress.as_deref(),
            Some("vpc-v1-s1-isolation")
        );
    }

    #[test]
    fn test_missing_allocations() {
        let mut intent = leaf_intent();
        intent.irb_vlans.clear();
        assert_eq!(plan(&intent), Err(PlanError::MissingIrbVlan("v1".to_owned())));

        let mut intent = leaf_intent();
        intent.vnis.remove("v1/s1");
        assert_eq!(plan(&intent), Err(PlanError::MissingVni("v1/s1".to_owned())));
    }

    #[test]
    fn test_attachment_errors() {
        let mut intent = leaf_intent();
        if let Some(attach) = intent.vpc_attachments.get_mut("server-1--v1--s1") {
            attach.subnet = "v1/s9".to_owned();
        }
        assert_eq!(
            plan(&intent),
            Err(PlanError::NoSuchSubnet("v1".to_owned(), "s9".to_owned()))
        );

        let mut intent = leaf_intent();
        if let Some(attach) = intent.vpc_attachments.get_mut("server-1--v1--s1") {
            attach.connection = "server-9--unbundled--leaf-1".to_owned();
        }
        assert_eq!(
            plan(&intent),
            Err(PlanError::NoSuchConnection(
                "server-9--unbundled--leaf-1".to_owned()
            ))
        );
    }

    #[test]
    fn test_no_dhcp_relay_without_dhcp() {
        let mut intent = leaf_intent();
        intent
            .vpcs
            .get_mut("v1")
            .unwrap()
            .subnets
            .get_mut("s1")
            .unwrap()
            .dhcp
            .enable = false;
        let spec = plan(&intent).unwrap();
        assert!(spec.dhcp_relays.is_empty());
    }
}
