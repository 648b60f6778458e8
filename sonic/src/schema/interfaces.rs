// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Interface models. Everything but [`INTERFACES`], [`INTERFACE`] and
//! [`PORTCHANNEL_CONFIG`] is relative to the path of an interface, and
//! [`SUBIF_CONFIG`] / [`SUBIF_ADDRESS`] to the path of a sub-interface.

use serde::{Deserialize, Serialize};

pub const INTERFACES: &str = "/openconfig-interfaces:interfaces";
pub const INTERFACE: &str = "/openconfig-interfaces:interfaces/interface[name=%s]";
pub const PORTCHANNEL_CONFIG: &str =
    "/openconfig-interfaces:interfaces/interface[name=%s]/aggregation/config";

pub const IF_CONFIG: &str = "/config";
pub const IF_SPEED: &str = "/ethernet/config/port-speed";
pub const IF_AUTONEG: &str = "/ethernet/config/auto-negotiate";
pub const IF_AGGREGATE: &str = "/ethernet/config/aggregate-id";
pub const IF_ETHERNET_VLANS: &str = "/ethernet/switched-vlan/config";
pub const IF_AGGREGATION_VLANS: &str = "/aggregation/switched-vlan/config";
pub const IF_ADDRESS: &str =
    "/subinterfaces/subinterface[index=0]/ipv4/addresses/address[ip=%s]/config";
pub const IF_VLAN_ADDRESS: &str = "/routed-vlan/ipv4/addresses/address[ip=%s]/config";
pub const IF_VLAN_ANYCAST: &str = "/routed-vlan/ipv4/sag-ipv4/config/static-anycast-gateway";
pub const IF_NAT_ZONE: &str = "/nat-zone/config";
pub const IF_SUBINTERFACE: &str = "/subinterfaces/subinterface[index=%s]";

pub const SUBIF_CONFIG: &str = "/config";
pub const SUBIF_ADDRESS: &str = "/ipv4/addresses/address[ip=%s]/config";

/// Description of a physical port the fabric does not use
pub const DISABLED_DESCRIPTION: &str = "Disabled by Fabric";

#[derive(Debug, Default, Deserialize)]
pub struct Interfaces {
    #[serde(default)]
    pub interface: Vec<InterfaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceEntry {
    pub name: String,
    pub config: Option<InterfaceConfig>,
    pub ethernet: Option<Ethernet>,
    pub aggregation: Option<Aggregation>,
    pub subinterfaces: Option<Subinterfaces>,
    pub routed_vlan: Option<RoutedVlan>,
    pub nat_zone: Option<NatZone>,
    pub state: Option<InterfaceState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
}
impl InterfaceConfig {
    /// Tell if this is what the agent leaves on a physical port it releases
    #[must_use]
    pub fn is_disabled_by_fabric(&self) -> bool {
        self.enabled == Some(false) && self.description.as_deref() == Some(DISABLED_DESCRIPTION)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ethernet {
    pub config: Option<EthernetConfig>,
    pub switched_vlan: Option<SwitchedVlan>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EthernetConfig {
    pub port_speed: Option<String>,
    pub auto_negotiate: Option<bool>,
    pub aggregate_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Aggregation {
    pub config: Option<AggregationConfig>,
    pub switched_vlan: Option<SwitchedVlan>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AggregationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_mac: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SwitchedVlan {
    pub config: Option<SwitchedVlanConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SwitchedVlanConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trunk_vlans: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_vlan: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Subinterfaces {
    #[serde(default)]
    pub subinterface: Vec<SubinterfaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SubinterfaceEntry {
    pub index: String,
    pub config: Option<SubinterfaceConfig>,
    pub ipv4: Option<Ipv4>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SubinterfaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vlan_id: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ipv4 {
    pub addresses: Option<Addresses>,
    pub sag_ipv4: Option<SagIpv4>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Addresses {
    #[serde(default)]
    pub address: Vec<AddressEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AddressEntry {
    pub ip: String,
    pub config: Option<AddressConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AddressConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix_length: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SagIpv4 {
    pub config: Option<SagConfig>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SagConfig {
    #[serde(default)]
    pub static_anycast_gateway: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RoutedVlan {
    pub ipv4: Option<Ipv4>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NatZone {
    pub config: Option<NatZoneConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatZoneConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_zone: Option<u8>,
}

/// Read-only view of an interface
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceState {
    pub admin_status: Option<String>,
    pub oper_status: Option<String>,
    pub counters: Option<InterfaceCounters>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct InterfaceCounters {
    pub in_octets: Option<u64>,
    pub out_octets: Option<u64>,
    pub in_pkts: Option<u64>,
    pub out_pkts: Option<u64>,
    pub in_errors: Option<u64>,
    pub out_errors: Option<u64>,
}
