// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VXLAN / EVPN, MCLAG and link-state tracking

use crate::{empty_if_all_empty, presence};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVxlanTunnel {
    pub source_ip: Option<String>,
    pub source_interface: Option<String>,
    pub qos_mode: Option<String>,
}
empty_if_all_empty!(SpecVxlanTunnel {
    source_ip,
    source_interface,
    qos_mode
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVxlanEvpnNvo {
    pub source_vtep: Option<String>,
}
empty_if_all_empty!(SpecVxlanEvpnNvo { source_vtep });

/// VLAN to VNI mapping of a tunnel
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVxlanTunnelMap {
    pub vtep: Option<String>,
    pub vni: Option<u32>,
    pub vlan: Option<String>,
}
empty_if_all_empty!(SpecVxlanTunnelMap { vtep, vni, vlan });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfVniEntry {
    pub vni: Option<u32>,
}
empty_if_all_empty!(SpecVrfVniEntry { vni });

/// ARP/ND suppression on a VLAN
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecSuppressVlanNeigh {}
presence!(SpecSuppressVlanNeigh);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecMclagDomain {
    pub source_ip: Option<String>,
    pub peer_ip: Option<String>,
    pub peer_link: Option<String>,
}
empty_if_all_empty!(SpecMclagDomain {
    source_ip,
    peer_ip,
    peer_link
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecMclagInterface {
    pub domain_id: Option<u32>,
}
empty_if_all_empty!(SpecMclagInterface { domain_id });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecPortChannelConfig {
    pub system_mac: Option<String>,
    pub fallback: Option<bool>,
}
empty_if_all_empty!(SpecPortChannelConfig {
    system_mac,
    fallback
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecLstGroup {
    pub all_mclags_downstream: Option<bool>,
    pub timeout: Option<u16>,
}
empty_if_all_empty!(SpecLstGroup {
    all_mclags_downstream,
    timeout
});

/// Upstream groups an interface is tracked in
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecLstInterface {
    pub groups: Vec<String>,
}
empty_if_all_empty!(SpecLstInterface { groups });
