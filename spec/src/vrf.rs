// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VRFs and the BGP instance each of them runs

use std::collections::{BTreeMap, BTreeSet};

use crate::{empty_if_all_empty, presence};

/// Membership of an interface in a VRF
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfInterface {}

/// Source protocol redistributed into BGP
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfTableConnection {
    pub import_policy: Option<String>,
}

/// A network advertised by BGP
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfBgpNetwork {}

presence!(SpecVrfInterface, SpecVrfTableConnection, SpecVrfBgpNetwork);

#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct SpecVrfStaticRouteNextHop {
    pub ip: String,
    pub interface: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfStaticRoute {
    pub next_hops: Vec<SpecVrfStaticRouteNextHop>,
}
empty_if_all_empty!(SpecVrfStaticRoute { next_hops });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfBgpIpv4Unicast {
    pub enabled: bool,
    pub max_paths: Option<u32>,
    pub import_policy: Option<String>,
    pub import_vrfs: BTreeSet<String>,
    pub networks: BTreeMap<String, SpecVrfBgpNetwork>,
}
empty_if_all_empty!(SpecVrfBgpIpv4Unicast {
    enabled,
    max_paths,
    import_policy,
    import_vrfs,
    networks
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfBgpL2vpnEvpn {
    pub enabled: bool,
    pub advertise_all_vni: Option<bool>,
    pub advertise_ipv4_unicast: Option<bool>,
    pub advertise_default_gw: Option<bool>,
}
empty_if_all_empty!(SpecVrfBgpL2vpnEvpn {
    enabled,
    advertise_all_vni,
    advertise_ipv4_unicast,
    advertise_default_gw
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfBgpNeighbor {
    pub enabled: Option<bool>,
    pub description: Option<String>,
    pub remote_as: Option<u32>,
    pub peer_type: Option<String>, /* internal / external */
    pub ipv4_unicast: Option<bool>,
    pub l2vpn_evpn: Option<bool>,
    pub bfd_profile: Option<String>,
    pub update_source: Option<String>,
}
empty_if_all_empty!(SpecVrfBgpNeighbor {
    enabled,
    description,
    remote_as,
    peer_type,
    ipv4_unicast,
    l2vpn_evpn,
    bfd_profile,
    update_source
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrfBgp {
    pub asn: Option<u32>,
    pub router_id: Option<String>,
    pub ipv4_unicast: SpecVrfBgpIpv4Unicast,
    pub l2vpn_evpn: SpecVrfBgpL2vpnEvpn,
    pub neighbors: BTreeMap<String, SpecVrfBgpNeighbor>,
}
empty_if_all_empty!(SpecVrfBgp {
    asn,
    router_id,
    ipv4_unicast,
    l2vpn_evpn,
    neighbors
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecVrf {
    pub enabled: Option<bool>,
    pub description: Option<String>,
    pub anycast_mac: Option<String>,
    pub interfaces: BTreeMap<String, SpecVrfInterface>,
    pub bgp: Option<SpecVrfBgp>,
    pub table_connections: BTreeMap<String, SpecVrfTableConnection>, /* keyed by source protocol */
    pub static_routes: BTreeMap<String, SpecVrfStaticRoute>,          /* keyed by prefix */
}
empty_if_all_empty!(SpecVrf {
    enabled,
    description,
    anycast_mac,
    interfaces,
    bgp,
    table_connections,
    static_routes
});

impl SpecVrf {
    /// The BGP instance of the VRF, created if missing
    pub fn bgp_mut(&mut self) -> &mut SpecVrfBgp {
        self.bgp.get_or_insert_with(SpecVrfBgp::default)
    }
}
