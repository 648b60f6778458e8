// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Network instance (VRF) models, with the BGP and static routing protocols they run.
//! Templates other than [`NETWORK_INSTANCES`] and [`NETWORK_INSTANCE`] are relative to
//! the path of a network instance, the `BGP_*` ones to [`BGP`].

use serde::{Deserialize, Serialize};

pub const NETWORK_INSTANCES: &str = "/openconfig-network-instance:network-instances";
pub const NETWORK_INSTANCE: &str =
    "/openconfig-network-instance:network-instances/network-instance[name=%s]";

pub const NI_CONFIG: &str = "/config";
pub const NI_INTERFACE: &str = "/interfaces/interface[id=%s]/config";
pub const TABLE_CONNECTION: &str =
    "/table-connections/table-connection[src-protocol=%s][dst-protocol=BGP][address-family=IPV4]/config";
pub const STATIC_ROUTE: &str =
    "/protocols/protocol[identifier=STATIC][name=static]/static-routes/static[prefix=%s]";
pub const BGP: &str = "/protocols/protocol[identifier=BGP][name=bgp]/bgp";

pub const BGP_GLOBAL_CONFIG: &str = "/global/config";
pub const BGP_IPV4_CONFIG: &str = "/global/afi-safis/afi-safi[afi-safi-name=IPV4_UNICAST]/config";
pub const BGP_IPV4_IMPORT: &str =
    "/global/afi-safis/afi-safi[afi-safi-name=IPV4_UNICAST]/import-network-instance/config";
pub const BGP_IPV4_NETWORK: &str =
    "/global/afi-safis/afi-safi[afi-safi-name=IPV4_UNICAST]/network-config/network[prefix=%s]/config";
pub const BGP_L2VPN_CONFIG: &str = "/global/afi-safis/afi-safi[afi-safi-name=L2VPN_EVPN]/config";
pub const BGP_NEIGHBOR_CONFIG: &str = "/neighbors/neighbor[neighbor-address=%s]/config";

pub const PROTOCOL_BGP: &str = "BGP";
pub const PROTOCOL_STATIC: &str = "STATIC";
pub const AFI_IPV4_UNICAST: &str = "IPV4_UNICAST";
pub const AFI_L2VPN_EVPN: &str = "L2VPN_EVPN";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkInstances {
    #[serde(default)]
    pub network_instance: Vec<NetworkInstanceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkInstanceEntry {
    pub name: String,
    pub config: Option<NiConfig>,
    pub interfaces: Option<NiInterfaces>,
    pub protocols: Option<Protocols>,
    pub table_connections: Option<TableConnections>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anycast_mac: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NiInterfaces {
    #[serde(default)]
    pub interface: Vec<NiInterfaceEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NiInterfaceEntry {
    pub id: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NiInterfaceConfig {
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct Protocols {
    #[serde(default)]
    pub protocol: Vec<ProtocolEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ProtocolEntry {
    pub identifier: String,
    pub name: String,
    pub bgp: Option<Bgp>,
    pub static_routes: Option<StaticRoutes>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Bgp {
    pub global: Option<BgpGlobal>,
    pub neighbors: Option<BgpNeighbors>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BgpGlobal {
    pub config: Option<BgpGlobalConfig>,
    pub afi_safis: Option<AfiSafis>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BgpGlobalConfig {
    #[serde(rename = "as", skip_serializing_if = "Option::is_none")]
    pub asn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub router_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AfiSafis {
    #[serde(default)]
    pub afi_safi: Vec<AfiSafiEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AfiSafiEntry {
    pub afi_safi_name: String,
    pub config: Option<AfiSafiConfig>,
    pub import_network_instance: Option<ImportNetworkInstance>,
    pub network_config: Option<NetworkConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AfiSafiConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_paths: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_policy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_all_vni: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_ipv4_unicast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advertise_default_gw: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportNetworkInstance {
    pub config: Option<ImportNetworkInstanceConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportNetworkInstanceConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkConfig {
    #[serde(default)]
    pub network: Vec<NetworkEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NetworkEntry {
    pub prefix: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkEntryConfig {
    pub prefix: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct BgpNeighbors {
    #[serde(default)]
    pub neighbor: Vec<NeighborEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NeighborEntry {
    pub neighbor_address: String,
    pub config: Option<NeighborConfig>,
    pub state: Option<NeighborState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NeighborConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_as: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4_unicast: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub l2vpn_evpn: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bfd_profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_source: Option<String>,
}

/// Read-only view of a BGP session
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NeighborState {
    pub session_state: Option<String>,
    pub established_transitions: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableConnections {
    #[serde(default)]
    pub table_connection: Vec<TableConnectionEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableConnectionEntry {
    pub src_protocol: String,
    pub dst_protocol: String,
    pub address_family: String,
    pub config: Option<TableConnectionConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TableConnectionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_policy: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StaticRoutes {
    #[serde(rename = "static", default)]
    pub routes: Vec<StaticRouteEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct StaticRouteEntry {
    #[serde(default, skip_serializing)]
    pub prefix: String,
    #[serde(default)]
    pub next_hops: Vec<NextHop>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NextHop {
    pub ip: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interface: Option<String>,
}
