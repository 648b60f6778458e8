// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use spec::{
    Spec, SpecLstGroup, SpecLstInterface, SpecMclagDomain, SpecMclagInterface,
    SpecSuppressVlanNeigh, SpecVrfVniEntry, SpecVxlanEvpnNvo, SpecVxlanTunnel, SpecVxlanTunnelMap,
};

use crate::load::{LoaderError, parse_key};
use crate::schema::overlay::{
    Lst, MCLAG_DOMAIN_CONFIG, Mclag, SUPPRESS_ON, SonicVxlan, VrfTable,
};

pub(super) fn load_vxlan(vxlan: SonicVxlan, spec: &mut Spec) {
    for tunnel in vxlan.tunnels.map(|t| t.list).unwrap_or_default() {
        spec.vxlan_tunnels.insert(
            tunnel.name,
            SpecVxlanTunnel {
                source_ip: tunnel.src_ip,
                source_interface: tunnel.src_intf,
                qos_mode: tunnel.qos_mode,
            },
        );
    }
    for nvo in vxlan.nvos.map(|n| n.list).unwrap_or_default() {
        spec.vxlan_evpn_nvos.insert(
            nvo.name,
            SpecVxlanEvpnNvo {
                source_vtep: nvo.source_vtep,
            },
        );
    }
    for map in vxlan.maps.map(|m| m.list).unwrap_or_default() {
        spec.vxlan_tunnel_maps.insert(
            map.mapname,
            SpecVxlanTunnelMap {
                vtep: map.name,
                vni: map.vni,
                vlan: map.vlan,
            },
        );
    }
    for entry in vxlan.suppress.map(|s| s.list).unwrap_or_default() {
        if entry.suppress.as_deref() == Some(SUPPRESS_ON) {
            spec.suppress_vlan_neighs
                .insert(entry.name, SpecSuppressVlanNeigh {});
        }
    }
}

/// Only VRFs bound to a VNI are of interest here, the VRFs themselves are loaded from
/// the network instances
pub(super) fn load_vrf_vnis(vrfs: VrfTable, spec: &mut Spec) {
    for vrf in vrfs.list {
        if let Some(vni) = vrf.vni {
            spec.vrf_vni_map
                .insert(vrf.vrf_name, SpecVrfVniEntry { vni: Some(vni) });
        }
    }
}

pub(super) fn load_mclag(mclag: Mclag, spec: &mut Spec) -> Result<(), LoaderError> {
    for domain in mclag.mclag_domains.map(|d| d.mclag_domain).unwrap_or_default() {
        let id: u32 = parse_key(MCLAG_DOMAIN_CONFIG, &domain.domain_id)?;
        let config = domain.config.unwrap_or_default();
        spec.mclag_domains.insert(
            id,
            SpecMclagDomain {
                source_ip: config.source_address,
                peer_ip: config.peer_address,
                peer_link: config.peer_link,
            },
        );
    }
    for iface in mclag.interfaces.map(|i| i.interface).unwrap_or_default() {
        let config = iface.config.unwrap_or_default();
        spec.mclag_interfaces.insert(
            iface.name,
            SpecMclagInterface {
                domain_id: config.mclag_domain_id,
            },
        );
    }
    Ok(())
}

pub(super) fn load_lst(lst: Lst, spec: &mut Spec) {
    for group in lst.lst_groups.map(|g| g.lst_group).unwrap_or_default() {
        let config = group.config.unwrap_or_default();
        spec.lst_groups.insert(
            group.name,
            SpecLstGroup {
                all_mclags_downstream: config.all_mclags_downstream,
                timeout: config.timeout,
            },
        );
    }
    for iface in lst.interfaces.map(|i| i.interface).unwrap_or_default() {
        let config = iface.config.unwrap_or_default();
        spec.lst_interfaces.insert(
            iface.id,
            SpecLstInterface {
                groups: config.upstream_groups,
            },
        );
    }
}
