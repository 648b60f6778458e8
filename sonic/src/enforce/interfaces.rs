// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Interfaces, their addresses, VLAN membership and sub-interfaces. Each part of an
//! interface lives in its own container or leaf, so that writing one never clobbers
//! another.

use serde_json::{Value, json};
use spec::{Spec, SpecInterface, SpecInterfaceIp, SpecPortChannelConfig, SpecSubinterface};

use crate::enforce::{
    ActionQueue, ActionWeight, EnforcerError, ValueEnforcer, enforce_map, to_value,
};
use crate::schema::expand_path;
use crate::schema::interfaces::{
    AddressConfig, AggregationConfig, DISABLED_DESCRIPTION, IF_ADDRESS, IF_AGGREGATE,
    IF_AGGREGATION_VLANS, IF_AUTONEG, IF_CONFIG, IF_ETHERNET_VLANS, IF_NAT_ZONE, IF_SPEED,
    IF_SUBINTERFACE, IF_VLAN_ADDRESS, IF_VLAN_ANYCAST, INTERFACE, InterfaceConfig,
    NatZoneConfig, PORTCHANNEL_CONFIG, SUBIF_ADDRESS, SUBIF_CONFIG, SubinterfaceConfig,
    SwitchedVlanConfig,
};

/// What a physical port the fabric doesn't use is left with
fn disabled_port() -> SpecInterface {
    SpecInterface {
        description: Some(DISABLED_DESCRIPTION.to_owned()),
        enabled: Some(false),
        ..Default::default()
    }
}

/// Physical ports are disabled instead of deleted. Interfaces are enabled unless told
/// otherwise.
fn mutate_base(name: &String, desired: Option<SpecInterface>) -> Option<SpecInterface> {
    match desired {
        None if SpecInterface::is_physical(name) => Some(disabled_port()),
        None => None,
        Some(mut iface) => {
            iface.enabled.get_or_insert(true);
            Some(iface)
        }
    }
}
fn get_base(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        description: iface.description.clone(),
        enabled: iface.enabled,
        mtu: iface.mtu,
        ..Default::default()
    }
}
fn marshal_base(name: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    let config = InterfaceConfig {
        description: iface.description.clone(),
        enabled: iface.enabled,
        mtu: iface.mtu,
    };
    to_value(&format!("interface {name}"), &config)
}
static INTERFACE_BASE: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "interface %s",
    path: IF_CONFIG,
    getter: Some(get_base),
    mutate_desired: Some(mutate_base),
    marshal: Some(marshal_base),
    update_weight: ActionWeight::InterfaceBaseUpdate,
    delete_weight: ActionWeight::InterfaceBaseDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_speed(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        speed: iface.speed.clone(),
        ..Default::default()
    }
}
fn marshal_speed(_: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    Ok(json!(iface.speed))
}
static INTERFACE_SPEED: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "speed of interface %s",
    path: IF_SPEED,
    getter: Some(get_speed),
    marshal: Some(marshal_speed),
    update_weight: ActionWeight::InterfaceSpeedUpdate,
    delete_weight: ActionWeight::InterfaceSpeedDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_autoneg(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        auto_negotiate: iface.auto_negotiate,
        ..Default::default()
    }
}
fn marshal_autoneg(_: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    Ok(json!(iface.auto_negotiate))
}
static INTERFACE_AUTONEG: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "auto-negotiation of interface %s",
    path: IF_AUTONEG,
    getter: Some(get_autoneg),
    marshal: Some(marshal_autoneg),
    update_weight: ActionWeight::InterfaceSpeedUpdate,
    delete_weight: ActionWeight::InterfaceSpeedDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_aggregate(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        aggregate_id: iface.aggregate_id.clone(),
        ..Default::default()
    }
}
fn marshal_aggregate(_: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    Ok(json!(iface.aggregate_id))
}
static INTERFACE_AGGREGATE: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "port channel membership of interface %s",
    path: IF_AGGREGATE,
    getter: Some(get_aggregate),
    marshal: Some(marshal_aggregate),
    update_weight: ActionWeight::InterfacePortChannelMemberUpdate,
    delete_weight: ActionWeight::InterfacePortChannelMemberDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_vlans(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        trunk_vlans: iface.trunk_vlans.clone(),
        access_vlan: iface.access_vlan,
        ..Default::default()
    }
}
fn marshal_vlans(name: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    let config = SwitchedVlanConfig {
        trunk_vlans: iface.trunk_vlans.clone(),
        access_vlan: iface.access_vlan,
    };
    to_value(&format!("VLANs of {name}"), &config)
}
const ETHERNET_VLANS: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "VLANs of interface %s",
    path: IF_ETHERNET_VLANS,
    getter: Some(get_vlans),
    marshal: Some(marshal_vlans),
    update_weight: ActionWeight::InterfaceVlansUpdate,
    delete_weight: ActionWeight::InterfaceVlansDelete,
    ..ValueEnforcer::DEFAULT
};
static AGGREGATION_VLANS: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    path: IF_AGGREGATION_VLANS,
    ..ETHERNET_VLANS
};

fn get_anycast(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        vlan_anycast_gateway: iface.vlan_anycast_gateway.clone(),
        ..Default::default()
    }
}
fn marshal_anycast(_: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    Ok(json!(iface.vlan_anycast_gateway))
}
static ANYCAST_GATEWAY: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "anycast gateway of interface %s",
    path: IF_VLAN_ANYCAST,
    getter: Some(get_anycast),
    marshal: Some(marshal_anycast),
    update_weight: ActionWeight::InterfaceAnycastGatewayUpdate,
    delete_weight: ActionWeight::InterfaceAnycastGatewayDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_nat_zone(iface: &SpecInterface) -> SpecInterface {
    SpecInterface {
        nat_zone: iface.nat_zone,
        ..Default::default()
    }
}
fn marshal_nat_zone(name: &String, iface: &SpecInterface) -> Result<Value, EnforcerError> {
    let config = NatZoneConfig {
        nat_zone: iface.nat_zone,
    };
    to_value(&format!("NAT zone of {name}"), &config)
}
static NAT_ZONE: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "NAT zone of interface %s",
    path: IF_NAT_ZONE,
    getter: Some(get_nat_zone),
    marshal: Some(marshal_nat_zone),
    update_weight: ActionWeight::InterfaceNatZoneUpdate,
    delete_weight: ActionWeight::InterfaceNatZoneDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_ip(ip: &String, addr: &SpecInterfaceIp) -> Result<Value, EnforcerError> {
    let config = AddressConfig {
        prefix_length: addr.prefix_len,
    };
    to_value(&format!("address {ip}"), &config)
}
const INTERFACE_IPS: ValueEnforcer<String, SpecInterfaceIp> = ValueEnforcer {
    summary: "address %s",
    path: IF_ADDRESS,
    marshal: Some(marshal_ip),
    update_weight: ActionWeight::InterfaceIpsUpdate,
    delete_weight: ActionWeight::InterfaceIpsDelete,
    ..ValueEnforcer::DEFAULT
};
static VLAN_IPS: ValueEnforcer<String, SpecInterfaceIp> = ValueEnforcer {
    path: IF_VLAN_ADDRESS,
    ..INTERFACE_IPS
};
static SUBINTERFACE_IPS: ValueEnforcer<String, SpecInterfaceIp> = ValueEnforcer {
    summary: "sub-interface address %s",
    path: SUBIF_ADDRESS,
    update_weight: ActionWeight::InterfaceSubinterfaceIpsUpdate,
    delete_weight: ActionWeight::InterfaceSubinterfaceIpsDelete,
    ..INTERFACE_IPS
};

fn get_subinterface_base(subif: &SpecSubinterface) -> SpecSubinterface {
    SpecSubinterface {
        vlan_id: subif.vlan_id,
        ..Default::default()
    }
}
fn marshal_subinterface(index: &u32, subif: &SpecSubinterface) -> Result<Value, EnforcerError> {
    let config = SubinterfaceConfig {
        vlan_id: subif.vlan_id,
    };
    to_value(&format!("sub-interface {index}"), &config)
}
static SUBINTERFACE_BASE: ValueEnforcer<u32, SpecSubinterface> = ValueEnforcer {
    summary: "sub-interface %s",
    path: SUBIF_CONFIG,
    getter: Some(get_subinterface_base),
    marshal: Some(marshal_subinterface),
    update_weight: ActionWeight::InterfaceSubinterfaceUpdate,
    delete_weight: ActionWeight::InterfaceSubinterfaceDelete,
    ..ValueEnforcer::DEFAULT
};

fn handle_subinterface(
    basepath: &str,
    index: &u32,
    actual: Option<&SpecSubinterface>,
    desired: Option<&SpecSubinterface>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    let base = format!("{basepath}{}", expand_path(IF_SUBINTERFACE, &index.to_string()));
    SUBINTERFACE_BASE.handle(&base, index, actual, desired, queue)?;
    enforce_map(
        &SUBINTERFACE_IPS,
        &base,
        actual.map(|s| &s.ips),
        desired.map(|s| &s.ips),
        queue,
    )
}
static SUBINTERFACES: ValueEnforcer<u32, SpecSubinterface> = ValueEnforcer {
    summary: "sub-interface %s",
    custom_handler: Some(handle_subinterface),
    ..ValueEnforcer::DEFAULT
};

fn handle_interface(
    basepath: &str,
    name: &String,
    actual: Option<&SpecInterface>,
    desired: Option<&SpecInterface>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    let base = format!("{basepath}{}", expand_path(INTERFACE, name));
    INTERFACE_BASE.handle(&base, name, actual, desired, queue)?;
    let (actual_ips, desired_ips) = (actual.map(|i| &i.ips), desired.map(|i| &i.ips));
    if SpecInterface::is_vlan(name) {
        enforce_map(&VLAN_IPS, &base, actual_ips, desired_ips, queue)?;
        ANYCAST_GATEWAY.handle(&base, name, actual, desired, queue)?;
    } else {
        enforce_map(&INTERFACE_IPS, &base, actual_ips, desired_ips, queue)?;
    }
    if SpecInterface::is_ethernet(name) {
        INTERFACE_SPEED.handle(&base, name, actual, desired, queue)?;
        INTERFACE_AUTONEG.handle(&base, name, actual, desired, queue)?;
        INTERFACE_AGGREGATE.handle(&base, name, actual, desired, queue)?;
        ETHERNET_VLANS.handle(&base, name, actual, desired, queue)?;
    }
    if SpecInterface::is_portchannel(name) {
        AGGREGATION_VLANS.handle(&base, name, actual, desired, queue)?;
    }
    NAT_ZONE.handle(&base, name, actual, desired, queue)?;
    enforce_map(
        &SUBINTERFACES,
        &base,
        actual.map(|i| &i.subinterfaces),
        desired.map(|i| &i.subinterfaces),
        queue,
    )
}
static INTERFACES: ValueEnforcer<String, SpecInterface> = ValueEnforcer {
    summary: "interface %s",
    custom_handler: Some(handle_interface),
    ..ValueEnforcer::DEFAULT
};

fn marshal_portchannel(
    name: &String,
    config: &SpecPortChannelConfig,
) -> Result<Value, EnforcerError> {
    let config = AggregationConfig {
        system_mac: config.system_mac.clone(),
        fallback: config.fallback,
    };
    to_value(&format!("port channel {name}"), &config)
}
static PORTCHANNEL_CONFIGS: ValueEnforcer<String, SpecPortChannelConfig> = ValueEnforcer {
    summary: "port channel %s",
    path: PORTCHANNEL_CONFIG,
    marshal: Some(marshal_portchannel),
    update_weight: ActionWeight::PortChannelConfigUpdate,
    delete_weight: ActionWeight::PortChannelConfigDelete,
    ..ValueEnforcer::DEFAULT
};

pub(super) fn enforce(
    actual: &Spec,
    desired: &Spec,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    enforce_map(
        &INTERFACES,
        "",
        Some(&actual.interfaces),
        Some(&desired.interfaces),
        queue,
    )?;
    enforce_map(
        &PORTCHANNEL_CONFIGS,
        "",
        Some(&actual.portchannel_configs),
        Some(&desired.portchannel_configs),
        queue,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforce::{ActionKind, enforce as enforce_all};
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn ip(prefix_len: u8) -> SpecInterfaceIp {
        SpecInterfaceIp {
            prefix_len: Some(prefix_len),
        }
    }

    #[test]
    fn test_unused_physical_port_disabled() {
        let mut actual = Spec::default();
        actual.interfaces.insert(
            "Ethernet4".to_owned(),
            SpecInterface {
                description: Some("uplink".to_owned()),
                enabled: Some(true),
                ips: BTreeMap::from([("172.30.0.1".to_owned(), ip(31))]),
                ..Default::default()
            },
        );
        let queue = enforce_all(&actual, &Spec::default()).unwrap();
        let actions = queue.into_sorted();
        assert_eq!(actions.len(), 2);
        assert_eq!(actions[0].kind, ActionKind::Replace);
        assert_eq!(
            actions[0].path,
            "/openconfig-interfaces:interfaces/interface[name=Ethernet4]/config"
        );
        assert_eq!(
            actions[0].value,
            Some(json!({"description": DISABLED_DESCRIPTION, "enabled": false}))
        );
        assert_eq!(actions[1].kind, ActionKind::Delete);
        assert_eq!(
            actions[1].path,
            "/openconfig-interfaces:interfaces/interface[name=Ethernet4]/subinterfaces/subinterface[index=0]/ipv4/addresses/address[ip=172.30.0.1]/config"
        );
    }

    #[test]
    fn test_virtual_interface_deleted_last() {
        let mut actual = Spec::default();
        actual.interfaces.insert(
            "Vlan1000".to_owned(),
            SpecInterface {
                enabled: Some(true),
                ips: BTreeMap::from([("10.0.1.1".to_owned(), ip(24))]),
                vlan_anycast_gateway: vec!["10.0.1.1/24".to_owned()],
                ..Default::default()
            },
        );
        let actions = enforce_all(&actual, &Spec::default()).unwrap().into_sorted();
        assert_eq!(actions.len(), 3);
        assert!(actions.iter().all(|a| a.kind == ActionKind::Delete));
        assert_eq!(actions[2].weight, ActionWeight::InterfaceBaseDelete);
        assert!(actions[0].path.contains("routed-vlan"));
    }

    #[test]
    fn test_enabled_by_default() {
        let mut desired = Spec::default();
        desired.interfaces.insert(
            "Loopback0".to_owned(),
            SpecInterface {
                description: Some("protocol".to_owned()),
                ..Default::default()
            },
        );
        let actions = enforce_all(&Spec::default(), &desired).unwrap().into_sorted();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Update);
        assert_eq!(
            actions[0].value,
            Some(json!({"description": "protocol", "enabled": true}))
        );
    }

    #[test]
    fn test_parts_enforced_separately() {
        let iface = SpecInterface {
            enabled: Some(true),
            speed: Some("SPEED_25GB".to_owned()),
            trunk_vlans: vec!["1000".to_owned()],
            ..Default::default()
        };
        let mut actual = Spec::default();
        actual.interfaces.insert("Ethernet0".to_owned(), iface.clone());
        let mut desired = Spec::default();
        desired.interfaces.insert(
            "Ethernet0".to_owned(),
            SpecInterface {
                speed: Some("SPEED_10GB".to_owned()),
                ..iface
            },
        );
        let actions = enforce_all(&actual, &desired).unwrap().into_sorted();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Replace);
        assert_eq!(
            actions[0].path,
            "/openconfig-interfaces:interfaces/interface[name=Ethernet0]/ethernet/config/port-speed"
        );
        assert_eq!(actions[0].value, Some(json!("SPEED_10GB")));
    }
}
