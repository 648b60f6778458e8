// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VXLAN / EVPN, MCLAG and link-state tracking

use serde_json::{Value, json};
use spec::{
    Spec, SpecLstGroup, SpecLstInterface, SpecMclagDomain, SpecMclagInterface,
    SpecSuppressVlanNeigh, SpecVrfVniEntry, SpecVxlanEvpnNvo, SpecVxlanTunnel, SpecVxlanTunnelMap,
};

use crate::enforce::{
    ActionQueue, ActionWeight, EnforcerError, ValueEnforcer, enforce_map, to_value,
};
use crate::schema::overlay::{
    LST_GROUP_CONFIG, LST_INTERFACE_CONFIG, LstGroupConfig, LstInterfaceConfig,
    MCLAG_DOMAIN_CONFIG, MCLAG_INTERFACE_CONFIG, MclagDomainConfig, MclagInterfaceConfig,
    NvoEntry, SUPPRESS_ON, SUPPRESS_VLAN_NEIGH, SuppressEntry, TunnelEntry, TunnelMapEntry,
    VRF_VNI, VXLAN_EVPN_NVO, VXLAN_TUNNEL, VXLAN_TUNNEL_MAP,
};

fn marshal_tunnel(name: &String, tunnel: &SpecVxlanTunnel) -> Result<Value, EnforcerError> {
    let entry = TunnelEntry {
        name: name.clone(),
        src_ip: tunnel.source_ip.clone(),
        src_intf: tunnel.source_interface.clone(),
        qos_mode: tunnel.qos_mode.clone(),
    };
    to_value(&format!("VXLAN tunnel {name}"), &entry)
}
static VXLAN_TUNNELS: ValueEnforcer<String, SpecVxlanTunnel> = ValueEnforcer {
    summary: "VXLAN tunnel %s",
    path: VXLAN_TUNNEL,
    marshal: Some(marshal_tunnel),
    update_weight: ActionWeight::VxlanTunnelUpdate,
    delete_weight: ActionWeight::VxlanTunnelDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_nvo(name: &String, nvo: &SpecVxlanEvpnNvo) -> Result<Value, EnforcerError> {
    let entry = NvoEntry {
        name: name.clone(),
        source_vtep: nvo.source_vtep.clone(),
    };
    to_value(&format!("EVPN NVO {name}"), &entry)
}
static VXLAN_EVPN_NVOS: ValueEnforcer<String, SpecVxlanEvpnNvo> = ValueEnforcer {
    summary: "EVPN NVO %s",
    path: VXLAN_EVPN_NVO,
    marshal: Some(marshal_nvo),
    update_weight: ActionWeight::VxlanEvpnNvoUpdate,
    delete_weight: ActionWeight::VxlanEvpnNvoDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_tunnel_map(name: &String, map: &SpecVxlanTunnelMap) -> Result<Value, EnforcerError> {
    let entry = TunnelMapEntry {
        mapname: name.clone(),
        name: map.vtep.clone(),
        vni: map.vni,
        vlan: map.vlan.clone(),
    };
    to_value(&format!("VXLAN tunnel map {name}"), &entry)
}
static VXLAN_TUNNEL_MAPS: ValueEnforcer<String, SpecVxlanTunnelMap> = ValueEnforcer {
    summary: "VXLAN tunnel map %s",
    path: VXLAN_TUNNEL_MAP,
    marshal: Some(marshal_tunnel_map),
    update_weight: ActionWeight::VxlanTunnelMapUpdate,
    delete_weight: ActionWeight::VxlanTunnelMapDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_vrf_vni(_: &String, entry: &SpecVrfVniEntry) -> Result<Value, EnforcerError> {
    Ok(json!(entry.vni))
}
static VRF_VNI_MAP: ValueEnforcer<String, SpecVrfVniEntry> = ValueEnforcer {
    summary: "VNI of VRF %s",
    path: VRF_VNI,
    marshal: Some(marshal_vrf_vni),
    update_weight: ActionWeight::VrfVniUpdate,
    delete_weight: ActionWeight::VrfVniDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_suppress(name: &String, _: &SpecSuppressVlanNeigh) -> Result<Value, EnforcerError> {
    let entry = SuppressEntry {
        name: name.clone(),
        suppress: Some(SUPPRESS_ON.to_owned()),
    };
    to_value(&format!("neighbour suppression on {name}"), &entry)
}
static SUPPRESS_VLAN_NEIGHS: ValueEnforcer<String, SpecSuppressVlanNeigh> = ValueEnforcer {
    summary: "neighbour suppression on %s",
    path: SUPPRESS_VLAN_NEIGH,
    marshal: Some(marshal_suppress),
    update_weight: ActionWeight::SuppressVlanNeighUpdate,
    delete_weight: ActionWeight::SuppressVlanNeighDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_mclag_domain(id: &u32, domain: &SpecMclagDomain) -> Result<Value, EnforcerError> {
    let config = MclagDomainConfig {
        source_address: domain.source_ip.clone(),
        peer_address: domain.peer_ip.clone(),
        peer_link: domain.peer_link.clone(),
    };
    to_value(&format!("MCLAG domain {id}"), &config)
}
static MCLAG_DOMAINS: ValueEnforcer<u32, SpecMclagDomain> = ValueEnforcer {
    summary: "MCLAG domain %s",
    path: MCLAG_DOMAIN_CONFIG,
    marshal: Some(marshal_mclag_domain),
    update_weight: ActionWeight::McLagDomainUpdate,
    delete_weight: ActionWeight::McLagDomainDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_mclag_interface(
    name: &String,
    iface: &SpecMclagInterface,
) -> Result<Value, EnforcerError> {
    let config = MclagInterfaceConfig {
        mclag_domain_id: iface.domain_id,
    };
    to_value(&format!("MCLAG interface {name}"), &config)
}
static MCLAG_INTERFACES: ValueEnforcer<String, SpecMclagInterface> = ValueEnforcer {
    summary: "MCLAG interface %s",
    path: MCLAG_INTERFACE_CONFIG,
    marshal: Some(marshal_mclag_interface),
    update_weight: ActionWeight::McLagInterfaceUpdate,
    delete_weight: ActionWeight::McLagInterfaceDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_lst_group(name: &String, group: &SpecLstGroup) -> Result<Value, EnforcerError> {
    let config = LstGroupConfig {
        all_mclags_downstream: group.all_mclags_downstream,
        timeout: group.timeout,
    };
    to_value(&format!("LST group {name}"), &config)
}
static LST_GROUPS: ValueEnforcer<String, SpecLstGroup> = ValueEnforcer {
    summary: "LST group %s",
    path: LST_GROUP_CONFIG,
    marshal: Some(marshal_lst_group),
    update_weight: ActionWeight::LstGroupUpdate,
    delete_weight: ActionWeight::LstGroupDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_lst_interface(name: &String, iface: &SpecLstInterface) -> Result<Value, EnforcerError> {
    let config = LstInterfaceConfig {
        upstream_groups: iface.groups.clone(),
    };
    to_value(&format!("LST interface {name}"), &config)
}
static LST_INTERFACES: ValueEnforcer<String, SpecLstInterface> = ValueEnforcer {
    summary: "LST interface %s",
    path: LST_INTERFACE_CONFIG,
    marshal: Some(marshal_lst_interface),
    update_weight: ActionWeight::LstInterfaceUpdate,
    delete_weight: ActionWeight::LstInterfaceDelete,
    ..ValueEnforcer::DEFAULT
};

pub(super) fn enforce(
    actual: &Spec,
    desired: &Spec,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    enforce_map(
        &VXLAN_TUNNELS,
        "",
        Some(&actual.vxlan_tunnels),
        Some(&desired.vxlan_tunnels),
        queue,
    )?;
    enforce_map(
        &VXLAN_EVPN_NVOS,
        "",
        Some(&actual.vxlan_evpn_nvos),
        Some(&desired.vxlan_evpn_nvos),
        queue,
    )?;
    enforce_map(
        &VXLAN_TUNNEL_MAPS,
        "",
        Some(&actual.vxlan_tunnel_maps),
        Some(&desired.vxlan_tunnel_maps),
        queue,
    )?;
    enforce_map(
        &VRF_VNI_MAP,
        "",
        Some(&actual.vrf_vni_map),
        Some(&desired.vrf_vni_map),
        queue,
    )?;
    enforce_map(
        &SUPPRESS_VLAN_NEIGHS,
        "",
        Some(&actual.suppress_vlan_neighs),
        Some(&desired.suppress_vlan_neighs),
        queue,
    )?;
    enforce_map(
        &MCLAG_DOMAINS,
        "",
        Some(&actual.mclag_domains),
        Some(&desired.mclag_domains),
        queue,
    )?;
    enforce_map(
        &MCLAG_INTERFACES,
        "",
        Some(&actual.mclag_interfaces),
        Some(&desired.mclag_interfaces),
        queue,
    )?;
    enforce_map(
        &LST_GROUPS,
        "",
        Some(&actual.lst_groups),
        Some(&desired.lst_groups),
        queue,
    )?;
    enforce_map(
        &LST_INTERFACES,
        "",
        Some(&actual.lst_interfaces),
        Some(&desired.lst_interfaces),
        queue,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforce::{ActionKind, enforce as enforce_all};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_tunnel_map_payload() {
        let mut desired = Spec::default();
        desired.vxlan_tunnel_maps.insert(
            "map_1000_Vlan1000".to_owned(),
            SpecVxlanTunnelMap {
                vtep: Some("vtepfabric".to_owned()),
                vni: Some(1000),
                vlan: Some("Vlan1000".to_owned()),
            },
        );
        let actions = enforce_all(&Spec::default(), &desired).unwrap().into_sorted();
        assert_eq!(actions.len(), 1);
        assert_eq!(
            actions[0].path,
            "/sonic-vxlan:sonic-vxlan/VXLAN_TUNNEL_MAP/VXLAN_TUNNEL_MAP_LIST[mapname=map_1000_Vlan1000]"
        );
        assert_eq!(
            actions[0].value,
            Some(json!({"name": "vtepfabric", "vni": 1000, "vlan": "Vlan1000"}))
        );
    }

    #[test]
    fn test_mclag_domain_change_replaces() {
        let domain = SpecMclagDomain {
            source_ip: Some("172.30.5.0".to_owned()),
            peer_ip: Some("172.30.5.1".to_owned()),
            peer_link: Some("PortChannel250".to_owned()),
        };
        let mut actual = Spec::default();
        actual.mclag_domains.insert(100, domain.clone());
        let mut desired = Spec::default();
        desired.mclag_domains.insert(
            100,
            SpecMclagDomain {
                peer_link: Some("PortChannel249".to_owned()),
                ..domain
            },
        );
        let actions = enforce_all(&actual, &desired).unwrap().into_sorted();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Replace);
        assert_eq!(
            actions[0].path,
            "/openconfig-mclag:mclag/mclag-domains/mclag-domain[domain-id=100]/config"
        );
    }
}
