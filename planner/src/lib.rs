// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Derivation of the desired configuration of a switch from its intent.
//!
//! [`plan`] is a pure function of the [`AgentSpec`]: it builds the [`Spec`] in a fixed
//! sequence of stages, later stages reading what earlier ones put in the draft. The
//! same intent always yields the same (normalized) spec. [`dhcp_subnets`] derives the
//! subnets the DHCP server of the fabric has to serve for this switch.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

mod connections;
mod dhcp;
mod errors;
mod overlay;
mod system;
mod underlay;

pub use dhcp::dhcp_subnets;
pub use errors::PlanError;

use config::AgentSpec;
use config::intent::{PortRef, VpcAttachment, VpcSubnet};
use ipnet::Ipv4Net;
use spec::{Spec, SpecInterface, SpecInterfaceIp};
use tracing::debug;

use tracectl::trace_target;
trace_target!("planner", LevelFilter::INFO, &["agent"]);

/// User the agent logs in as, never planned
pub const AGENT_USER: &str = "agent";
/// Anycast MAC of the default VRF
pub const ANYCAST_MAC: &str = "00:00:00:11:11:11";
pub const MAX_PATHS: u32 = 64;
pub const MAX_PATHS_VIRTUAL: u32 = 16;
pub const LLDP_HELLO_TIMER: u64 = 5;
pub const BFD_PROFILE_FABRIC: &str = "fabric";
pub const MANAGEMENT_INTERFACE: &str = "eth0";
pub const LOOPBACK_SWITCH: &str = "Loopback0";
pub const LOOPBACK_PROTOCOL: &str = "Loopback1";
pub const LOOPBACK_VTEP: &str = "Loopback2";
pub const VTEP_FABRIC: &str = "vtepfabric";
pub const NVO: &str = "nvo1";
pub const MCLAG_DOMAIN_ID: u32 = 100;
pub const MCLAG_PEER_LINK: &str = "PortChannel250";
pub const MCLAG_SESSION_LINK: &str = "PortChannel251";
pub const MCLAG_SYSTEM_MAC: &str = "02:00:00:00:00:64";
pub const LST_GROUP: &str = "l3";
pub const TABLE_DIRECTLY_CONNECTED: &str = "DIRECTLY_CONNECTED";
pub const TABLE_STATIC: &str = "STATIC";

pub(crate) fn vpc_vrf(vpc: &str) -> String {
    format!("VrfV{vpc}")
}
pub(crate) fn vlan_interface(vlan: u16) -> String {
    format!("Vlan{vlan}")
}
pub(crate) fn portchannel(id: u16) -> String {
    format!("PortChannel{id}")
}
pub(crate) fn address(net: &Ipv4Net) -> (String, SpecInterfaceIp) {
    (
        net.addr().to_string(),
        SpecInterfaceIp {
            prefix_len: Some(net.prefix_len()),
        },
    )
}

/// Name of a front panel port of this switch
pub(crate) fn local_port(port: &PortRef) -> Result<String, PlanError> {
    if SpecInterface::is_ethernet(&port.port) {
        Ok(port.port.clone())
    } else {
        Err(PlanError::InvalidPort(port.to_string()))
    }
}

/// Resolve the `<vpc>/<subnet>` reference of an attachment
pub(crate) fn attached_subnet<'a>(
    intent: &'a AgentSpec,
    attach: &'a VpcAttachment,
) -> Result<(&'a str, &'a str, &'a VpcSubnet), PlanError> {
    let (vpc_name, subnet_name) = attach.vpc_subnet()?;
    let vpc = intent
        .vpcs
        .get(vpc_name)
        .ok_or_else(|| PlanError::NoSuchVpc(vpc_name.to_owned()))?;
    let subnet = vpc.subnets.get(subnet_name).ok_or_else(|| {
        PlanError::NoSuchSubnet(vpc_name.to_owned(), subnet_name.to_owned())
    })?;
    Ok((vpc_name, subnet_name, subnet))
}

pub(crate) fn subnet_cidr(subnet: &VpcSubnet) -> Result<Ipv4Net, PlanError> {
    subnet
        .cidr()
        .map_err(|_| PlanError::InvalidCidr(subnet.subnet.clone()))
}

/// Build the desired configuration of the switch `intent` is for
pub fn plan(intent: &AgentSpec) -> Result<Spec, PlanError> {
    intent.validate()?;
    debug!("Planning configuration of switch {}", intent.name);

    let mut spec = Spec::default();
    system::plan_global(intent, &mut spec);
    system::plan_ports(intent, &mut spec);
    underlay::plan_management(intent, &mut spec)?;
    system::plan_lldp(intent, &mut spec)?;
    system::plan_users(intent, &mut spec);
    underlay::plan_loopbacks(intent, &mut spec)?;
    underlay::plan_default_vrf(intent, &mut spec)?;
    underlay::plan_fabric(intent, &mut spec)?;
    underlay::plan_vpc_loopbacks(intent, &mut spec)?;
    connections::plan_server_facing(intent, &mut spec)?;
    overlay::plan_vxlan(intent, &mut spec)?;
    connections::plan_mclag_domain(intent, &mut spec)?;
    overlay::plan_vpcs(intent, &mut spec)?;
    overlay::plan_attachments(intent, &mut spec)?;
    overlay::plan_peerings(intent, &mut spec)?;
    system::plan_ntp(intent, &mut spec);
    system::plan_roce(intent, &mut spec);

    spec.normalize();
    debug!(
        "Planned {} interfaces and {} VRFs for switch {}",
        spec.interfaces.len(),
        spec.vrfs.len(),
        intent.name
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use spec::{SpecDhcpRelay, SpecVxlanTunnelMap};
    use test_utils::leaf_intent;

    #[test]
    fn test_single_leaf_single_vpc() {
        let spec = plan(&leaf_intent()).unwrap();

        for loopback in [LOOPBACK_SWITCH, LOOPBACK_PROTOCOL, LOOPBACK_VTEP] {
            assert!(spec.interfaces.contains_key(loopback), "{loopback}");
        }
        assert_eq!(
            spec.interfaces["Loopback0"].ips["10.0.0.1"].prefix_len,
            Some(32)
        );
        assert!(spec.interfaces.contains_key("Vlan3000"));
        assert_eq!(
            spec.interfaces["Vlan1000"].vlan_anycast_gateway,
            vec!["10.10.10.1/24".to_owned()]
        );

        let vrf = &spec.vrfs["VrfVv1"];
        assert_eq!(vrf.enabled, Some(true));
        assert_eq!(vrf.bgp.as_ref().and_then(|bgp| bgp.asn), Some(65101));
        assert!(vrf.interfaces.contains_key("Vlan1000"));
        assert!(vrf.interfaces.contains_key("Vlan3000"));
        assert_eq!(spec.vrf_vni_map["VrfVv1"].vni, Some(100_000));

        assert_eq!(
            spec.vxlan_tunnel_maps["map_100000_Vlan3000"],
            SpecVxlanTunnelMap {
                vtep: Some(VTEP_FABRIC.to_owned()),
                vni: Some(100_000),
                vlan: Some("Vlan3000".to_owned()),
            }
        );
        assert_eq!(
            spec.vxlan_tunnel_maps["map_110000_Vlan1000"].vni,
            Some(110_000)
        );
        assert!(spec.suppress_vlan_neighs.contains_key("Vlan3000"));
        assert!(spec.suppress_vlan_neighs.contains_key("Vlan1000"));
        assert_eq!(
            spec.dhcp_relays["Vlan1000"],
            SpecDhcpRelay {
                source_interface: Some("Loopback0".to_owned()),
                relay_address: vec!["172.30.1.1".to_owned()],
                link_select: true,
                vrf_select: true,
            }
        );
    }

    #[test]
    fn test_plan_is_deterministic() {
        let intent = leaf_intent();
        assert_eq!(plan(&intent).unwrap(), plan(&intent).unwrap());
    }

    #[test]
    fn test_plan_is_normalized() {
        let spec = plan(&leaf_intent()).unwrap();
        assert_eq!(spec.clone().normalized(), spec);
    }

    #[test]
    fn test_invalid_intent() {
        let mut intent = leaf_intent();
        intent.protocol_ip = None;
        assert_eq!(
            plan(&intent),
            Err(PlanError::Config(config::ConfigError::MissingParameter(
                "protocolIP"
            )))
        );
    }
}
