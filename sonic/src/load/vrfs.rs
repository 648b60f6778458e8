// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use spec::{
    DEFAULT_VRF, Spec, SpecVrf, SpecVrfBgp, SpecVrfBgpIpv4Unicast, SpecVrfBgpL2vpnEvpn,
    SpecVrfBgpNeighbor, SpecVrfBgpNetwork, SpecVrfInterface, SpecVrfStaticRoute,
    SpecVrfStaticRouteNextHop, SpecVrfTableConnection,
};
use tracing::trace;

use crate::schema::network::{
    AFI_IPV4_UNICAST, AFI_L2VPN_EVPN, Bgp, NetworkInstanceEntry, NetworkInstances, PROTOCOL_BGP,
    PROTOCOL_STATIC,
};

/// VRFs the agent manages: the default one and the ones it names `Vrf*`
pub(crate) fn is_managed_vrf(name: &str) -> bool {
    name == DEFAULT_VRF || name.starts_with("Vrf")
}

fn load_bgp(bgp: Bgp) -> SpecVrfBgp {
    let global = bgp.global.unwrap_or_default();
    let config = global.config.unwrap_or_default();
    let mut spec_bgp = SpecVrfBgp {
        asn: config.asn,
        router_id: config.router_id,
        ..Default::default()
    };
    for afi in global.afi_safis.map(|a| a.afi_safi).unwrap_or_default() {
        let config = afi.config.unwrap_or_default();
        match afi.afi_safi_name.as_str() {
            AFI_IPV4_UNICAST => {
                spec_bgp.ipv4_unicast = SpecVrfBgpIpv4Unicast {
                    enabled: config.enabled.unwrap_or(false),
                    max_paths: config.maximum_paths,
                    import_policy: config.import_policy,
                    import_vrfs: afi
                        .import_network_instance
                        .and_then(|i| i.config)
                        .map(|c| c.name.into_iter().collect())
                        .unwrap_or_default(),
                    networks: afi
                        .network_config
                        .map(|n| n.network)
                        .unwrap_or_default()
                        .into_iter()
                        .map(|network| (network.prefix, SpecVrfBgpNetwork {}))
                        .collect(),
                };
            }
            AFI_L2VPN_EVPN => {
                spec_bgp.l2vpn_evpn = SpecVrfBgpL2vpnEvpn {
                    enabled: config.enabled.unwrap_or(false),
                    advertise_all_vni: config.advertise_all_vni,
                    advertise_ipv4_unicast: config.advertise_ipv4_unicast,
                    advertise_default_gw: config.advertise_default_gw,
                };
            }
            other => trace!("Ignoring address family {other}"),
        }
    }
    for neighbor in bgp.neighbors.map(|n| n.neighbor).unwrap_or_default() {
        let config = neighbor.config.unwrap_or_default();
        spec_bgp.neighbors.insert(
            neighbor.neighbor_address,
            SpecVrfBgpNeighbor {
                enabled: config.enabled,
                description: config.description,
                remote_as: config.peer_as,
                peer_type: config.peer_type,
                ipv4_unicast: config.ipv4_unicast,
                l2vpn_evpn: config.l2vpn_evpn,
                bfd_profile: config.bfd_profile,
                update_source: config.update_source,
            },
        );
    }
    spec_bgp
}

fn load_vrf(entry: NetworkInstanceEntry) -> SpecVrf {
    let config = entry.config.unwrap_or_default();
    let mut vrf = SpecVrf {
        enabled: config.enabled,
        description: config.description,
        anycast_mac: config.anycast_mac,
        ..Default::default()
    };
    for iface in entry.interfaces.map(|i| i.interface).unwrap_or_default() {
        vrf.interfaces.insert(iface.id, SpecVrfInterface {});
    }
    for protocol in entry.protocols.map(|p| p.protocol).unwrap_or_default() {
        match protocol.identifier.as_str() {
            PROTOCOL_BGP => vrf.bgp = protocol.bgp.map(load_bgp),
            PROTOCOL_STATIC => {
                let routes = protocol.static_routes.map(|s| s.routes).unwrap_or_default();
                for route in routes {
                    let next_hops = route
                        .next_hops
                        .into_iter()
                        .map(|hop| SpecVrfStaticRouteNextHop {
                            ip: hop.ip,
                            interface: hop.interface,
                        })
                        .collect();
                    vrf.static_routes
                        .insert(route.prefix, SpecVrfStaticRoute { next_hops });
                }
            }
            other => trace!("Ignoring protocol {other}"),
        }
    }
    for connection in entry
        .table_connections
        .map(|t| t.table_connection)
        .unwrap_or_default()
    {
        if connection.dst_protocol != PROTOCOL_BGP || connection.address_family != "IPV4" {
            continue;
        }
        vrf.table_connections.insert(
            connection.src_protocol,
            SpecVrfTableConnection {
                import_policy: connection.config.and_then(|c| c.import_policy),
            },
        );
    }
    vrf
}

pub(super) fn load_vrfs(instances: NetworkInstances, spec: &mut Spec) {
    for entry in instances.network_instance {
        if !is_managed_vrf(&entry.name) {
            trace!("Skipping network instance {}", entry.name);
            continue;
        }
        let name = entry.name.clone();
        spec.vrfs.insert(name, load_vrf(entry));
    }
}
