// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! DHCP subnets to be served for the subnets attached to a switch

use config::intent::VpcSubnet;
use config::{AgentSpec, DhcpSubnet, DhcpSubnetSpec};
use ipnet::Ipv4Net;
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::{PlanError, attached_subnet, subnet_cidr, vlan_interface, vpc_vrf};

/// From the address following the gateway up to the one before broadcast
fn default_range(cidr: Ipv4Net, gateway: Ipv4Addr) -> Option<(Ipv4Addr, Ipv4Addr)> {
    let start = Ipv4Addr::from(u32::from(gateway).checked_add(1)?);
    let end = Ipv4Addr::from(u32::from(cidr.broadcast()).checked_sub(1)?);
    (cidr.contains(&start) && start <= end).then_some((start, end))
}

fn subnet_spec(name: &str, vpc: &str, subnet: &VpcSubnet) -> Result<DhcpSubnetSpec, PlanError> {
    let invalid = || PlanError::InvalidCidr(subnet.subnet.clone());
    let cidr = subnet_cidr(subnet)?;
    let gateway = subnet.gateway().map_err(|_| invalid())?;
    let dhcp = &subnet.dhcp;
    let (start, end) = match &dhcp.range {
        Some(range) => (range.start, range.end),
        None => default_range(cidr, gateway).ok_or_else(invalid)?,
    };
    Ok(DhcpSubnetSpec {
        subnet: name.to_owned(),
        cidr: Some(cidr),
        gateway: Some(gateway),
        start_ip: Some(start),
        end_ip: Some(end),
        vrf: vpc_vrf(vpc),
        circuit_id: vlan_interface(subnet.vlan),
        pxe_url: dhcp.pxe_url.clone(),
        dns_servers: dhcp.dns_servers.clone(),
        ntp_servers: dhcp.ntp_servers.clone(),
        mtu: dhcp.mtu,
        default_url: dhcp.default_url.clone(),
    })
}

/// The DHCP subnets of the subnets with DHCP enabled attached to this switch, one per
/// subnet however many times it is attached
pub fn dhcp_subnets(intent: &AgentSpec) -> Result<Vec<DhcpSubnet>, PlanError> {
    let mut subnets = BTreeMap::new();
    for (_, attach) in intent.local_attachments() {
        let (vpc, _, subnet) = attached_subnet(intent, attach)?;
        if !subnet.dhcp.enable || subnets.contains_key(&attach.subnet) {
            continue;
        }
        subnets.insert(
            attach.subnet.clone(),
            subnet_spec(&attach.subnet, vpc, subnet)?,
        );
    }
    Ok(subnets.into_values().map(DhcpSubnet::new).collect())
}
