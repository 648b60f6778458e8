// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The routed underlay: management, loopbacks, the default VRF and fabric links

use config::AgentSpec;
use config::intent::Connection;
use spec::{
    Spec, SpecBfdProfile, SpecInterface, SpecVrfStaticRoute, SpecVrfStaticRouteNextHop,
    SpecVrfBgpNeighbor, SpecVrfTableConnection,
};

use crate::{
    ANYCAST_MAC, BFD_PROFILE_FABRIC, LOOPBACK_PROTOCOL, LOOPBACK_SWITCH, LOOPBACK_VTEP,
    MANAGEMENT_INTERFACE, MAX_PATHS, MAX_PATHS_VIRTUAL, PlanError, TABLE_DIRECTLY_CONNECTED,
    TABLE_STATIC, address, local_port,
};

pub(crate) fn max_paths(intent: &AgentSpec) -> u32 {
    if intent.is_virtual {
        MAX_PATHS_VIRTUAL
    } else {
        MAX_PATHS
    }
}

/// The management port gets the switch end of the management link, and the control
/// VIP is reached through the control end
pub(crate) fn plan_management(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    for (_, conn) in intent.local_connections() {
        let Connection::Management { link } = conn else {
            continue;
        };
        let vip = intent
            .control_vip
            .ok_or(PlanError::MissingParameter("controlVIP"))?;
        spec.interfaces.insert(
            MANAGEMENT_INTERFACE.to_owned(),
            SpecInterface {
                description: Some("Management".to_owned()),
                enabled: Some(true),
                ips: [address(&link.switch.ip)].into(),
                ..Default::default()
            },
        );
        spec.default_vrf_mut().static_routes.insert(
            format!("{}/32", vip.addr()),
            SpecVrfStaticRoute {
                next_hops: vec![SpecVrfStaticRouteNextHop {
                    ip: link.control.ip.addr().to_string(),
                    interface: None,
                }],
            },
        );
    }
    Ok(())
}

pub(crate) fn plan_loopbacks(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    let ip = intent.ip.ok_or(PlanError::MissingParameter("ip"))?;
    let protocol_ip = intent
        .protocol_ip
        .ok_or(PlanError::MissingParameter("protocolIP"))?;
    let mut loopbacks = vec![(LOOPBACK_SWITCH, ip), (LOOPBACK_PROTOCOL, protocol_ip)];
    if intent.role.is_leaf() {
        let vtep_ip = intent.vtep_ip.ok_or(PlanError::MissingParameter("vtepIP"))?;
        loopbacks.push((LOOPBACK_VTEP, vtep_ip));
    }
    for (name, net) in loopbacks {
        spec.interfaces.insert(
            name.to_owned(),
            SpecInterface {
                enabled: Some(true),
                ips: [address(&net)].into(),
                ..Default::default()
            },
        );
    }
    Ok(())
}

pub(crate) fn plan_default_vrf(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    let protocol_ip = intent
        .protocol_ip
        .ok_or(PlanError::MissingParameter("protocolIP"))?;
    let vrf = spec.default_vrf_mut();
    vrf.anycast_mac = Some(ANYCAST_MAC.to_owned());
    for table in [TABLE_DIRECTLY_CONNECTED, TABLE_STATIC] {
        vrf.table_connections
            .insert(table.to_owned(), SpecVrfTableConnection::default());
    }
    let bgp = vrf.bgp_mut();
    bgp.asn = Some(intent.asn);
    bgp.router_id = Some(protocol_ip.addr().to_string());
    bgp.ipv4_unicast.enabled = true;
    bgp.ipv4_unicast.max_paths = Some(max_paths(intent));
    bgp.l2vpn_evpn.enabled = true;
    if intent.role.is_leaf() {
        bgp.l2vpn_evpn.advertise_all_vni = Some(true);
    }
    Ok(())
}

/// Routed point-to-point links between leaves and spines, each with an eBGP session
pub(crate) fn plan_fabric(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    let mut any = false;
    for (_, conn) in intent.local_connections() {
        let Connection::Fabric { links } = conn else {
            continue;
        };
        for (local, remote) in links.iter().filter_map(|link| link.ends_for(&intent.name)) {
            let port = local_port(&local.port)?;
            let peer = intent
                .switch(&remote.port.device)
                .ok_or_else(|| PlanError::NoSuchSwitch(remote.port.device.clone()))?;

            let iface = spec.interfaces.entry(port).or_default();
            iface.enabled = Some(true);
            iface.ips.extend([address(&local.ip)]);

            spec.default_vrf_mut().bgp_mut().neighbors.insert(
                remote.ip.addr().to_string(),
                SpecVrfBgpNeighbor {
                    enabled: Some(true),
                    description: Some(format!("Fabric {}", remote.port)),
                    remote_as: Some(peer.asn),
                    peer_type: Some("external".to_owned()),
                    ipv4_unicast: Some(true),
                    l2vpn_evpn: Some(true),
                    bfd_profile: Some(BFD_PROFILE_FABRIC.to_owned()),
                    update_source: None,
                },
            );
            any = true;
        }
    }
    if any {
        spec.bfd_profiles.insert(
            BFD_PROFILE_FABRIC.to_owned(),
            SpecBfdProfile {
                passive_mode: None,
                required_min_rx: Some(300),
                desired_min_tx: Some(300),
                detection_multiplier: Some(3),
            },
        );
    }
    Ok(())
}

/// Ports cabled back to the same switch
pub(crate) fn plan_vpc_loopbacks(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    for (name, conn) in intent.local_connections() {
        let Connection::VpcLoopback { links } = conn else {
            continue;
        };
        for link in links {
            for port in [&link.switch1, &link.switch2] {
                if !port.is_on(&intent.name) {
                    continue;
                }
                spec.interfaces.insert(
                    local_port(port)?,
                    SpecInterface {
                        description: Some(format!("VPC loopback {name}")),
                        enabled: Some(true),
                        ..Default::default()
                    },
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan;
    use pretty_assertions::assert_eq;
    use spec::DEFAULT_VRF;
    use test_utils::{leaf_intent, spine_intent};

    #[test]
    fn test_management() {
        let spec = plan(&leaf_intent()).unwrap();
        let eth0 = &spec.interfaces[MANAGEMENT_INTERFACE];
        assert_eq!(eth0.ips["172.30.20.1"].prefix_len, Some(31));
        let route = &spec.vrfs[DEFAULT_VRF].static_routes["172.30.1.1/32"];
        assert_eq!(route.next_hops[0].ip, "172.30.20.0");
    }

    #[test]
    fn test_default_vrf() {
        let mut intent = leaf_intent();
        let spec = plan(&intent).unwrap();
        let vrf = &spec.vrfs[DEFAULT_VRF];
        assert_eq!(vrf.enabled, Some(true));
        assert_eq!(vrf.anycast_mac.as_deref(), Some(ANYCAST_MAC));
        assert!(vrf.table_connections.contains_key(TABLE_DIRECTLY_CONNECTED));
        assert!(vrf.table_connections.contains_key(TABLE_STATIC));
        let bgp = vrf.bgp.as_ref().unwrap();
        assert_eq!(bgp.asn, Some(65101));
        assert_eq!(bgp.router_id.as_deref(), Some("10.0.1.1"));
        assert_eq!(bgp.ipv4_unicast.max_paths, Some(64));
        assert_eq!(bgp.l2vpn_evpn.advertise_all_vni, Some(true));

        intent.is_virtual = true;
        let spec = plan(&intent).unwrap();
        let bgp = spec.vrfs[DEFAULT_VRF].bgp.as_ref().unwrap();
        assert_eq!(bgp.ipv4_unicast.max_paths, Some(16));
    }

    #[test]
    fn test_fabric_link() {
        let spec = plan(&leaf_intent()).unwrap();
        let uplink = &spec.interfaces["Ethernet48"];
        assert_eq!(uplink.enabled, Some(true));
        assert_eq!(uplink.ips["172.30.30.1"].prefix_len, Some(31));

        let bgp = spec.vrfs[DEFAULT_VRF].bgp.as_ref().unwrap();
        let neighbor = &bgp.neighbors["172.30.30.0"];
        assert_eq!(neighbor.remote_as, Some(65100));
        assert_eq!(neighbor.ipv4_unicast, Some(true));
        assert_eq!(neighbor.l2vpn_evpn, Some(true));
        assert_eq!(neighbor.bfd_profile.as_deref(), Some(BFD_PROFILE_FABRIC));
        assert_eq!(
            spec.bfd_profiles[BFD_PROFILE_FABRIC].detection_multiplier,
            Some(3)
        );
    }

    #[test]
    fn test_spine() {
        let spec = plan(&spine_intent()).unwrap();
        assert!(spec.interfaces.contains_key(LOOPBACK_PROTOCOL));
        assert!(!spec.interfaces.contains_key(LOOPBACK_VTEP));
        assert!(spec.vxlan_tunnels.is_empty());
        let bgp = spec.vrfs[DEFAULT_VRF].bgp.as_ref().unwrap();
        assert_eq!(bgp.neighbors["172.30.30.1"].remote_as, Some(65101));
        assert_eq!(bgp.l2vpn_evpn.advertise_all_vni, None);
        assert_eq!(spec.vrfs.len(), 1);
    }

    #[test]
    fn test_unknown_peer() {
        let mut intent = leaf_intent();
        intent.switches.remove("spine-1");
        assert_eq!(
            plan(&intent),
            Err(PlanError::NoSuchSwitch("spine-1".to_owned()))
        );
    }

    #[test]
    fn test_vpc_loopback_ports() {
        let mut intent = leaf_intent();
        intent.connections.insert(
            "leaf-1--vpc-loopback".to_owned(),
            serde_yaml_ng::from_str(
                r"
type: vpc-loopback
links:
  - switch1: leaf-1/Ethernet16
    switch2: leaf-1/Ethernet17
",
            )
            .unwrap(),
        );
        let spec = plan(&intent).unwrap();
        for port in ["Ethernet16", "Ethernet17"] {
            let iface = &spec.interfaces[port];
            assert_eq!(iface.enabled, Some(true));
            assert!(iface.ips.is_empty());
        }
    }
}
