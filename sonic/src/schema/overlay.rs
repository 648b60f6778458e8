// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VXLAN / EVPN tables, VRF to VNI bindings, MCLAG and link-state tracking models.
//! The VXLAN and VRF tables follow the naming of the switch database.

use serde::{Deserialize, Serialize};

pub const SONIC_VXLAN: &str = "/sonic-vxlan:sonic-vxlan";
pub const VXLAN_TUNNEL: &str = "/sonic-vxlan:sonic-vxlan/VXLAN_TUNNEL/VXLAN_TUNNEL_LIST[name=%s]";
pub const VXLAN_EVPN_NVO: &str = "/sonic-vxlan:sonic-vxlan/EVPN_NVO/EVPN_NVO_LIST[name=%s]";
pub const VXLAN_TUNNEL_MAP: &str =
    "/sonic-vxlan:sonic-vxlan/VXLAN_TUNNEL_MAP/VXLAN_TUNNEL_MAP_LIST[mapname=%s]";
pub const SUPPRESS_VLAN_NEIGH: &str =
    "/sonic-vxlan:sonic-vxlan/SUPPRESS_VLAN_NEIGH/SUPPRESS_VLAN_NEIGH_LIST[name=%s]";

pub const SONIC_VRF: &str = "/sonic-vrf:sonic-vrf/VRF";
pub const VRF_VNI: &str = "/sonic-vrf:sonic-vrf/VRF/VRF_LIST[vrf_name=%s]/vni";

pub const MCLAG: &str = "/openconfig-mclag:mclag";
pub const MCLAG_DOMAIN_CONFIG: &str =
    "/openconfig-mclag:mclag/mclag-domains/mclag-domain[domain-id=%s]/config";
pub const MCLAG_INTERFACE_CONFIG: &str =
    "/openconfig-mclag:mclag/interfaces/interface[name=%s]/config";

pub const LST: &str = "/openconfig-lst-ext:lst";
pub const LST_GROUP_CONFIG: &str = "/openconfig-lst-ext:lst/lst-groups/lst-group[name=%s]/config";
pub const LST_INTERFACE_CONFIG: &str = "/openconfig-lst-ext:lst/interfaces/interface[id=%s]/config";

/// Value of an enabled neighbour suppression
pub const SUPPRESS_ON: &str = "on";

#[derive(Debug, Default, Deserialize)]
pub struct SonicVxlan {
    #[serde(rename = "VXLAN_TUNNEL")]
    pub tunnels: Option<TunnelTable>,
    #[serde(rename = "EVPN_NVO")]
    pub nvos: Option<NvoTable>,
    #[serde(rename = "VXLAN_TUNNEL_MAP")]
    pub maps: Option<TunnelMapTable>,
    #[serde(rename = "SUPPRESS_VLAN_NEIGH")]
    pub suppress: Option<SuppressTable>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TunnelTable {
    #[serde(rename = "VXLAN_TUNNEL_LIST", default)]
    pub list: Vec<TunnelEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelEntry {
    #[serde(default, skip_serializing)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_intf: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub qos_mode: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NvoTable {
    #[serde(rename = "EVPN_NVO_LIST", default)]
    pub list: Vec<NvoEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NvoEntry {
    #[serde(default, skip_serializing)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_vtep: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TunnelMapTable {
    #[serde(rename = "VXLAN_TUNNEL_MAP_LIST", default)]
    pub list: Vec<TunnelMapEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TunnelMapEntry {
    #[serde(default, skip_serializing)]
    pub mapname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>, /* the tunnel */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vni: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SuppressTable {
    #[serde(rename = "SUPPRESS_VLAN_NEIGH_LIST", default)]
    pub list: Vec<SuppressEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SuppressEntry {
    #[serde(default, skip_serializing)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppress: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VrfTable {
    #[serde(rename = "VRF_LIST", default)]
    pub list: Vec<VrfListEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VrfListEntry {
    pub vrf_name: String,
    pub vni: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Mclag {
    pub mclag_domains: Option<MclagDomains>,
    pub interfaces: Option<MclagInterfaces>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MclagDomains {
    #[serde(default)]
    pub mclag_domain: Vec<MclagDomainEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MclagDomainEntry {
    pub domain_id: String,
    pub config: Option<MclagDomainConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MclagDomainConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MclagInterfaces {
    #[serde(default)]
    pub interface: Vec<MclagInterfaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MclagInterfaceEntry {
    pub name: String,
    pub config: Option<MclagInterfaceConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct MclagInterfaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mclag_domain_id: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Lst {
    pub lst_groups: Option<LstGroups>,
    pub interfaces: Option<LstInterfaces>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LstGroups {
    #[serde(default)]
    pub lst_group: Vec<LstGroupEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LstGroupEntry {
    pub name: String,
    pub config: Option<LstGroupConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LstGroupConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub all_mclags_downstream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LstInterfaces {
    #[serde(default)]
    pub interface: Vec<LstInterfaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LstInterfaceEntry {
    pub id: String,
    pub config: Option<LstInterfaceConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LstInterfaceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub upstream_groups: Vec<String>,
}
