// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use spec::{Spec, SpecInterface, SpecInterfaceIp, SpecPortChannelConfig, SpecSubinterface};
use std::collections::BTreeMap;
use tracing::trace;

use crate::load::{LoaderError, parse_key};
use crate::schema::expand_path;
use crate::schema::interfaces::{
    Addresses, IF_SUBINTERFACE, INTERFACE, InterfaceEntry, Interfaces,
};

fn load_addresses(addresses: Option<Addresses>) -> BTreeMap<String, SpecInterfaceIp> {
    addresses
        .map(|a| a.address)
        .unwrap_or_default()
        .into_iter()
        .map(|address| {
            let prefix_len = address.config.and_then(|c| c.prefix_length);
            (address.ip, SpecInterfaceIp { prefix_len })
        })
        .collect()
}

/// Tell if the interface is one the agent leaves alone
fn is_foreign(name: &str) -> bool {
    !SpecInterface::is_known(name) || (SpecInterface::is_loopback(name) && name.contains(':'))
}

fn load_interface(entry: InterfaceEntry, spec: &mut Spec) -> Result<(), LoaderError> {
    let name = entry.name;
    let path = expand_path(INTERFACE, &name);
    let misplaced = |part: &str, what: &str| {
        LoaderError::structure(format!("{path}{part}"), format!("{what} on interface {name}"))
    };

    let config = entry.config.unwrap_or_default();
    if SpecInterface::is_physical(&name) && config.is_disabled_by_fabric() {
        trace!("Interface {name} is disabled, skipping");
        return Ok(());
    }
    let mut iface = SpecInterface {
        description: config.description,
        enabled: config.enabled,
        mtu: config.mtu,
        ..Default::default()
    };

    if let Some(ethernet) = entry.ethernet {
        if let Some(config) = ethernet.config {
            if config.aggregate_id.is_some() && !SpecInterface::is_ethernet(&name) {
                return Err(misplaced("/ethernet/config/aggregate-id", "aggregate-id"));
            }
            iface.speed = config.port_speed;
            iface.auto_negotiate = config.auto_negotiate;
            iface.aggregate_id = config.aggregate_id;
        }
        if let Some(vlans) = ethernet.switched_vlan.and_then(|v| v.config) {
            if !SpecInterface::is_ethernet(&name) {
                return Err(misplaced("/ethernet/switched-vlan", "switched-vlan"));
            }
            iface.trunk_vlans = vlans.trunk_vlans;
            iface.access_vlan = vlans.access_vlan;
        }
    }

    if let Some(aggregation) = entry.aggregation {
        if !SpecInterface::is_portchannel(&name) {
            return Err(misplaced("/aggregation", "aggregation"));
        }
        if let Some(config) = aggregation.config {
            spec.portchannel_configs.insert(
                name.clone(),
                SpecPortChannelConfig {
                    system_mac: config.system_mac,
                    fallback: config.fallback,
                },
            );
        }
        if let Some(vlans) = aggregation.switched_vlan.and_then(|v| v.config) {
            iface.trunk_vlans = vlans.trunk_vlans;
            iface.access_vlan = vlans.access_vlan;
        }
    }

    if let Some(routed) = entry.routed_vlan {
        if !SpecInterface::is_vlan(&name) {
            return Err(misplaced("/routed-vlan", "routed-vlan"));
        }
        if let Some(ipv4) = routed.ipv4 {
            iface.ips = load_addresses(ipv4.addresses);
            iface.vlan_anycast_gateway = ipv4
                .sag_ipv4
                .and_then(|sag| sag.config)
                .map(|config| config.static_anycast_gateway)
                .unwrap_or_default();
        }
    }

    for subif in entry.subinterfaces.map(|s| s.subinterface).unwrap_or_default() {
        let index: u32 = parse_key(&format!("{path}{IF_SUBINTERFACE}"), &subif.index)?;
        let ips = load_addresses(subif.ipv4.and_then(|ipv4| ipv4.addresses));
        if index == 0 {
            if SpecInterface::is_vlan(&name) {
                trace!("Ignoring sub-interface 0 of {name}");
            } else {
                iface.ips = ips;
            }
            continue;
        }
        iface.subinterfaces.insert(
            index,
            SpecSubinterface {
                vlan_id: subif.config.and_then(|c| c.vlan_id),
                ips,
            },
        );
    }

    iface.nat_zone = entry
        .nat_zone
        .and_then(|zone| zone.config)
        .and_then(|config| config.nat_zone);

    spec.interfaces.insert(name, iface);
    Ok(())
}

pub(super) fn load_interfaces(interfaces: Interfaces, spec: &mut Spec) -> Result<(), LoaderError> {
    for entry in interfaces.interface {
        if is_foreign(&entry.name) {
            trace!("Skipping interface {}", entry.name);
            continue;
        }
        load_interface(entry, spec)?;
    }
    Ok(())
}
