// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VRFs: membership, BGP, table connections and static routes

use serde_json::Value;
use spec::{
    Spec, SpecVrf, SpecVrfBgp, SpecVrfBgpIpv4Unicast, SpecVrfBgpL2vpnEvpn, SpecVrfBgpNeighbor,
    SpecVrfBgpNetwork, SpecVrfInterface, SpecVrfStaticRoute, SpecVrfTableConnection,
};

use crate::enforce::{
    ActionQueue, ActionWeight, EnforcerError, ValueEnforcer, enforce_map, to_value,
};
use crate::schema::expand_path;
use crate::schema::network::{
    AfiSafiConfig, BGP, BGP_GLOBAL_CONFIG, BGP_IPV4_CONFIG, BGP_IPV4_IMPORT, BGP_IPV4_NETWORK,
    BGP_L2VPN_CONFIG, BGP_NEIGHBOR_CONFIG, BgpGlobalConfig, ImportNetworkInstanceConfig,
    NETWORK_INSTANCE, NI_CONFIG, NI_INTERFACE, NeighborConfig, NetworkEntryConfig, NextHop,
    NiConfig, NiInterfaceConfig, STATIC_ROUTE, StaticRouteEntry, TABLE_CONNECTION,
    TableConnectionConfig,
};

fn get_vrf_base(vrf: &SpecVrf) -> SpecVrf {
    SpecVrf {
        enabled: vrf.enabled,
        description: vrf.description.clone(),
        anycast_mac: vrf.anycast_mac.clone(),
        ..Default::default()
    }
}
fn marshal_vrf_base(name: &String, vrf: &SpecVrf) -> Result<Value, EnforcerError> {
    let config = NiConfig {
        enabled: vrf.enabled,
        description: vrf.description.clone(),
        anycast_mac: vrf.anycast_mac.clone(),
    };
    to_value(&format!("VRF {name}"), &config)
}
static VRF_BASE: ValueEnforcer<String, SpecVrf> = ValueEnforcer {
    summary: "VRF %s",
    path: NI_CONFIG,
    getter: Some(get_vrf_base),
    marshal: Some(marshal_vrf_base),
    update_weight: ActionWeight::VrfBaseUpdate,
    delete_weight: ActionWeight::VrfBaseDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_vrf_interface(name: &String, _: &SpecVrfInterface) -> Result<Value, EnforcerError> {
    to_value(
        &format!("VRF interface {name}"),
        &NiInterfaceConfig { id: name.clone() },
    )
}
static VRF_INTERFACES: ValueEnforcer<String, SpecVrfInterface> = ValueEnforcer {
    summary: "VRF interface %s",
    path: NI_INTERFACE,
    marshal: Some(marshal_vrf_interface),
    update_weight: ActionWeight::VrfInterfaceUpdate,
    delete_weight: ActionWeight::VrfInterfaceDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_bgp_base(bgp: &SpecVrfBgp) -> SpecVrfBgp {
    SpecVrfBgp {
        asn: bgp.asn,
        router_id: bgp.router_id.clone(),
        ..Default::default()
    }
}
fn marshal_bgp_base(vrf: &String, bgp: &SpecVrfBgp) -> Result<Value, EnforcerError> {
    let config = BgpGlobalConfig {
        asn: bgp.asn,
        router_id: bgp.router_id.clone(),
    };
    to_value(&format!("BGP of VRF {vrf}"), &config)
}
static BGP_BASE: ValueEnforcer<String, SpecVrfBgp> = ValueEnforcer {
    summary: "BGP of VRF %s",
    path: BGP_GLOBAL_CONFIG,
    getter: Some(get_bgp_base),
    marshal: Some(marshal_bgp_base),
    update_weight: ActionWeight::VrfBgpBaseUpdate,
    delete_weight: ActionWeight::VrfBgpBaseDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_bgp_ipv4(bgp: &SpecVrfBgp) -> SpecVrfBgp {
    SpecVrfBgp {
        ipv4_unicast: SpecVrfBgpIpv4Unicast {
            enabled: bgp.ipv4_unicast.enabled,
            max_paths: bgp.ipv4_unicast.max_paths,
            import_policy: bgp.ipv4_unicast.import_policy.clone(),
            ..Default::default()
        },
        ..Default::default()
    }
}
fn marshal_bgp_ipv4(vrf: &String, bgp: &SpecVrfBgp) -> Result<Value, EnforcerError> {
    let config = AfiSafiConfig {
        enabled: Some(bgp.ipv4_unicast.enabled),
        maximum_paths: bgp.ipv4_unicast.max_paths,
        import_policy: bgp.ipv4_unicast.import_policy.clone(),
        ..Default::default()
    };
    to_value(&format!("BGP IPv4 unicast of VRF {vrf}"), &config)
}
static BGP_IPV4: ValueEnforcer<String, SpecVrfBgp> = ValueEnforcer {
    summary: "BGP IPv4 unicast of VRF %s",
    path: BGP_IPV4_CONFIG,
    getter: Some(get_bgp_ipv4),
    marshal: Some(marshal_bgp_ipv4),
    update_weight: ActionWeight::VrfBgpIpv4Update,
    delete_weight: ActionWeight::VrfBgpIpv4Delete,
    ..ValueEnforcer::DEFAULT
};

fn get_bgp_import_vrfs(bgp: &SpecVrfBgp) -> SpecVrfBgp {
    SpecVrfBgp {
        ipv4_unicast: SpecVrfBgpIpv4Unicast {
            import_vrfs: bgp.ipv4_unicast.import_vrfs.clone(),
            ..Default::default()
        },
        ..Default::default()
    }
}
fn marshal_bgp_import_vrfs(vrf: &String, bgp: &SpecVrfBgp) -> Result<Value, EnforcerError> {
    let config = ImportNetworkInstanceConfig {
        name: bgp.ipv4_unicast.import_vrfs.iter().cloned().collect(),
    };
    to_value(&format!("VRF imports of VRF {vrf}"), &config)
}
static BGP_IMPORT_VRFS: ValueEnforcer<String, SpecVrfBgp> = ValueEnforcer {
    summary: "VRF imports of VRF %s",
    path: BGP_IPV4_IMPORT,
    getter: Some(get_bgp_import_vrfs),
    marshal: Some(marshal_bgp_import_vrfs),
    update_weight: ActionWeight::VrfBgpImportVrfUpdate,
    delete_weight: ActionWeight::VrfBgpImportVrfDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_bgp_l2vpn(bgp: &SpecVrfBgp) -> SpecVrfBgp {
    SpecVrfBgp {
        l2vpn_evpn: bgp.l2vpn_evpn.clone(),
        ..Default::default()
    }
}
fn marshal_bgp_l2vpn(vrf: &String, bgp: &SpecVrfBgp) -> Result<Value, EnforcerError> {
    let l2vpn: &SpecVrfBgpL2vpnEvpn = &bgp.l2vpn_evpn;
    let config = AfiSafiConfig {
        enabled: Some(l2vpn.enabled),
        advertise_all_vni: l2vpn.advertise_all_vni,
        advertise_ipv4_unicast: l2vpn.advertise_ipv4_unicast,
        advertise_default_gw: l2vpn.advertise_default_gw,
        ..Default::default()
    };
    to_value(&format!("BGP L2VPN EVPN of VRF {vrf}"), &config)
}
static BGP_L2VPN: ValueEnforcer<String, SpecVrfBgp> = ValueEnforcer {
    summary: "BGP L2VPN EVPN of VRF %s",
    path: BGP_L2VPN_CONFIG,
    getter: Some(get_bgp_l2vpn),
    marshal: Some(marshal_bgp_l2vpn),
    update_weight: ActionWeight::VrfBgpL2vpnUpdate,
    delete_weight: ActionWeight::VrfBgpL2vpnDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_bgp_neighbor(
    address: &String,
    neighbor: &SpecVrfBgpNeighbor,
) -> Result<Value, EnforcerError> {
    let config = NeighborConfig {
        enabled: neighbor.enabled,
        description: neighbor.description.clone(),
        peer_as: neighbor.remote_as,
        peer_type: neighbor.peer_type.clone(),
        ipv4_unicast: neighbor.ipv4_unicast,
        l2vpn_evpn: neighbor.l2vpn_evpn,
        bfd_profile: neighbor.bfd_profile.clone(),
        update_source: neighbor.update_source.clone(),
    };
    to_value(&format!("BGP neighbor {address}"), &config)
}
static BGP_NEIGHBORS: ValueEnforcer<String, SpecVrfBgpNeighbor> = ValueEnforcer {
    summary: "BGP neighbor %s",
    path: BGP_NEIGHBOR_CONFIG,
    marshal: Some(marshal_bgp_neighbor),
    update_weight: ActionWeight::VrfBgpNeighborUpdate,
    delete_weight: ActionWeight::VrfBgpNeighborDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_bgp_network(prefix: &String, _: &SpecVrfBgpNetwork) -> Result<Value, EnforcerError> {
    to_value(
        &format!("BGP network {prefix}"),
        &NetworkEntryConfig {
            prefix: prefix.clone(),
        },
    )
}
static BGP_NETWORKS: ValueEnforcer<String, SpecVrfBgpNetwork> = ValueEnforcer {
    summary: "BGP network %s",
    path: BGP_IPV4_NETWORK,
    marshal: Some(marshal_bgp_network),
    update_weight: ActionWeight::VrfBgpNetworkUpdate,
    delete_weight: ActionWeight::VrfBgpNetworkDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_table_connection(
    protocol: &String,
    connection: &SpecVrfTableConnection,
) -> Result<Value, EnforcerError> {
    let config = TableConnectionConfig {
        import_policy: connection.import_policy.clone(),
    };
    to_value(&format!("table connection {protocol}"), &config)
}
static TABLE_CONNECTIONS: ValueEnforcer<String, SpecVrfTableConnection> = ValueEnforcer {
    summary: "table connection from %s",
    path: TABLE_CONNECTION,
    marshal: Some(marshal_table_connection),
    update_weight: ActionWeight::VrfTableConnectionUpdate,
    delete_weight: ActionWeight::VrfTableConnectionDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_static_route(
    prefix: &String,
    route: &SpecVrfStaticRoute,
) -> Result<Value, EnforcerError> {
    let entry = StaticRouteEntry {
        prefix: prefix.clone(),
        next_hops: route
            .next_hops
            .iter()
            .map(|hop| NextHop {
                ip: hop.ip.clone(),
                interface: hop.interface.clone(),
            })
            .collect(),
    };
    to_value(&format!("static route {prefix}"), &entry)
}
static STATIC_ROUTES: ValueEnforcer<String, SpecVrfStaticRoute> = ValueEnforcer {
    summary: "static route %s",
    path: STATIC_ROUTE,
    marshal: Some(marshal_static_route),
    update_weight: ActionWeight::VrfStaticRouteUpdate,
    delete_weight: ActionWeight::VrfStaticRouteDelete,
    ..ValueEnforcer::DEFAULT
};

fn handle_vrf(
    basepath: &str,
    name: &String,
    actual: Option<&SpecVrf>,
    desired: Option<&SpecVrf>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    let base = format!("{basepath}{}", expand_path(NETWORK_INSTANCE, name));
    VRF_BASE.handle(&base, name, actual, desired, queue)?;
    enforce_map(
        &VRF_INTERFACES,
        &base,
        actual.map(|vrf| &vrf.interfaces),
        desired.map(|vrf| &vrf.interfaces),
        queue,
    )?;

    let bgp_base = format!("{base}{BGP}");
    let actual_bgp = actual.and_then(|vrf| vrf.bgp.as_ref());
    let desired_bgp = desired.and_then(|vrf| vrf.bgp.as_ref());
    BGP_BASE.handle(&bgp_base, name, actual_bgp, desired_bgp, queue)?;
    BGP_IPV4.handle(&bgp_base, name, actual_bgp, desired_bgp, queue)?;
    BGP_IMPORT_VRFS.handle(&bgp_base, name, actual_bgp, desired_bgp, queue)?;
    BGP_L2VPN.handle(&bgp_base, name, actual_bgp, desired_bgp, queue)?;
    enforce_map(
        &BGP_NEIGHBORS,
        &bgp_base,
        actual_bgp.map(|bgp| &bgp.neighbors),
        desired_bgp.map(|bgp| &bgp.neighbors),
        queue,
    )?;
    enforce_map(
        &BGP_NETWORKS,
        &bgp_base,
        actual_bgp.map(|bgp| &bgp.ipv4_unicast.networks),
        desired_bgp.map(|bgp| &bgp.ipv4_unicast.networks),
        queue,
    )?;

    enforce_map(
        &TABLE_CONNECTIONS,
        &base,
        actual.map(|vrf| &vrf.table_connections),
        desired.map(|vrf| &vrf.table_connections),
        queue,
    )?;
    enforce_map(
        &STATIC_ROUTES,
        &base,
        actual.map(|vrf| &vrf.static_routes),
        desired.map(|vrf| &vrf.static_routes),
        queue,
    )
}
static VRFS: ValueEnforcer<String, SpecVrf> = ValueEnforcer {
    summary: "VRF %s",
    custom_handler: Some(handle_vrf),
    ..ValueEnforcer::DEFAULT
};

pub(super) fn enforce(
    actual: &Spec,
    desired: &Spec,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    enforce_map(&VRFS, "", Some(&actual.vrfs), Some(&desired.vrfs), queue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforce::{ActionKind, enforce as enforce_all};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn vpc_vrf() -> SpecVrf {
        SpecVrf {
            enabled: Some(true),
            description: Some("VPC v1".to_owned()),
            interfaces: BTreeMap::from([("Vlan3000".to_owned(), SpecVrfInterface {})]),
            bgp: Some(SpecVrfBgp {
                asn: Some(65101),
                router_id: Some("172.30.8.1".to_owned()),
                ipv4_unicast: SpecVrfBgpIpv4Unicast {
                    enabled: true,
                    max_paths: Some(16),
                    ..Default::default()
                },
                l2vpn_evpn: SpecVrfBgpL2vpnEvpn {
                    enabled: true,
                    advertise_ipv4_unicast: Some(true),
                    ..Default::default()
                },
                neighbors: BTreeMap::new(),
            }),
            table_connections: BTreeMap::from([(
                "DIRECTLY_CONNECTED".to_owned(),
                SpecVrfTableConnection::default(),
            )]),
            ..Default::default()
        }
    }

    #[test]
    fn test_vrf_removal_order() {
        let mut actual = Spec::default();
        actual.vrfs.insert("VrfVv1".to_owned(), vpc_vrf());
        let actions = enforce_all(&actual, &Spec::default()).unwrap().into_sorted();
        assert!(actions.iter().all(|a| a.kind == ActionKind::Delete));
        let weights: Vec<ActionWeight> = actions.iter().map(|a| a.weight).collect();
        assert_eq!(
            weights,
            vec![
                ActionWeight::VrfTableConnectionDelete,
                ActionWeight::VrfBgpL2vpnDelete,
                ActionWeight::VrfBgpIpv4Delete,
                ActionWeight::VrfBgpBaseDelete,
                ActionWeight::VrfInterfaceDelete,
                ActionWeight::VrfBaseDelete,
            ]
        );
        assert_eq!(
            actions[3].path,
            "/openconfig-network-instance:network-instances/network-instance[name=VrfVv1]/protocols/protocol[identifier=BGP][name=bgp]/bgp/global/config"
        );
    }

    #[test]
    fn test_vrf_noop() {
        let mut spec = Spec::default();
        spec.vrfs.insert("VrfVv1".to_owned(), vpc_vrf());
        assert!(enforce_all(&spec, &spec).unwrap().is_empty());
    }
}
