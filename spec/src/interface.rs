// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Interfaces. The name tells the kind: `Ethernet*` and `Management*` / `eth0` are
//! physical ports, `Vlan*` are routed VLANs, `PortChannel*` are link aggregations and
//! `Loopback*` are loopbacks.

use std::collections::BTreeMap;

use crate::empty_if_all_empty;

/// An IPv4 address of an interface, keyed by address
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecInterfaceIp {
    pub prefix_len: Option<u8>,
}
empty_if_all_empty!(SpecInterfaceIp { prefix_len });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecSubinterface {
    pub vlan_id: Option<u16>,
    pub ips: BTreeMap<String, SpecInterfaceIp>,
}
empty_if_all_empty!(SpecSubinterface { vlan_id, ips });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecInterface {
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub mtu: Option<u16>,
    pub speed: Option<String>,
    pub auto_negotiate: Option<bool>,
    /// addresses of the interface itself (routed VLAN addresses for `Vlan*`)
    pub ips: BTreeMap<String, SpecInterfaceIp>,
    pub vlan_anycast_gateway: Vec<String>, /* CIDRs, Vlan* only */
    pub aggregate_id: Option<String>,      /* PortChannel membership, Ethernet* only */
    pub trunk_vlans: Vec<String>,          /* Ethernet* and PortChannel* only */
    pub access_vlan: Option<u16>,          /* Ethernet* and PortChannel* only */
    pub nat_zone: Option<u8>,
    pub subinterfaces: BTreeMap<u32, SpecSubinterface>, /* index > 0 */
}
empty_if_all_empty!(SpecInterface {
    description,
    enabled,
    mtu,
    speed,
    auto_negotiate,
    ips,
    vlan_anycast_gateway,
    aggregate_id,
    trunk_vlans,
    access_vlan,
    nat_zone,
    subinterfaces
});

/// Prefixes of physical port names
const PHYSICAL: [&str; 3] = ["Ethernet", "Management", "eth0"];

impl SpecInterface {
    /// Physical ports can't be deleted, only disabled
    #[must_use]
    pub fn is_physical(name: &str) -> bool {
        PHYSICAL.iter().any(|prefix| name.starts_with(prefix))
    }
    #[must_use]
    pub fn is_vlan(name: &str) -> bool {
        name.starts_with("Vlan")
    }
    #[must_use]
    pub fn is_portchannel(name: &str) -> bool {
        name.starts_with("PortChannel")
    }
    #[must_use]
    pub fn is_ethernet(name: &str) -> bool {
        name.starts_with("Ethernet")
    }
    #[must_use]
    pub fn is_loopback(name: &str) -> bool {
        name.starts_with("Loopback")
    }
    /// Tell if `name` belongs to one of the interface name-spaces the agent manages
    #[must_use]
    pub fn is_known(name: &str) -> bool {
        Self::is_physical(name)
            || Self::is_vlan(name)
            || Self::is_portchannel(name)
            || Self::is_loopback(name)
    }
}
