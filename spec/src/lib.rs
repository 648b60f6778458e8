// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The configuration tree of a switch.
//!
//! A [`Spec`] is used both for the configuration the agent wants (desired) and for the one
//! read back from the switch (actual), so that comparing them is plain structural
//! equality. Every collection maps an identifier to an entity. An entity is either absent
//! or present; a present entity with nothing in it ([`IsEmpty`]) means the same as an
//! absent one.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::struct_excessive_bools)]

mod interface;
mod nat;
mod overlay;
mod policy;
mod system;
mod vrf;

pub use interface::{SpecInterface, SpecInterfaceIp, SpecSubinterface};
pub use nat::{SpecNat, SpecNatBinding, SpecNatEntry, SpecNatPool, SpecNatType};
pub use overlay::{
    SpecLstGroup, SpecLstInterface, SpecMclagDomain, SpecMclagInterface, SpecPortChannelConfig,
    SpecSuppressVlanNeigh, SpecVrfVniEntry, SpecVxlanEvpnNvo, SpecVxlanTunnel, SpecVxlanTunnelMap,
};
pub use policy::{
    SpecAcl, SpecAclAction, SpecAclEntry, SpecAclInterface, SpecCommunityList, SpecPrefixList,
    SpecPrefixListAction, SpecPrefixListEntry, SpecRouteMap, SpecRouteMapConditions,
    SpecRouteMapResult, SpecRouteMapStatement,
};
pub use system::{
    SpecBfdProfile, SpecDhcpRelay, SpecLldp, SpecLldpInterface, SpecNtp, SpecNtpServer,
    SpecPortBreakout, SpecPortGroup, SpecUser,
};
pub use vrf::{
    SpecVrf, SpecVrfBgp, SpecVrfBgpIpv4Unicast, SpecVrfBgpL2vpnEvpn, SpecVrfBgpNeighbor,
    SpecVrfBgpNetwork, SpecVrfInterface, SpecVrfStaticRoute, SpecVrfStaticRouteNextHop,
    SpecVrfTableConnection,
};

use std::collections::{BTreeMap, BTreeSet};

/// Name of the VRF that always exists
pub const DEFAULT_VRF: &str = "default";

/// Tells whether a present value carries nothing, and should therefore be handled as
/// if it were absent.
pub trait IsEmpty {
    /// Set for leaves whose every value is meaningful once present: `Some(false)` is a
    /// value, a plain `false` field is not.
    const LEAF: bool = false;

    fn is_empty(&self) -> bool;
}

impl<T: IsEmpty> IsEmpty for Option<T> {
    fn is_empty(&self) -> bool {
        self.as_ref().is_none_or(|v| !T::LEAF && v.is_empty())
    }
}
impl<T> IsEmpty for Vec<T> {
    fn is_empty(&self) -> bool {
        Vec::is_empty(self)
    }
}
impl<K, V> IsEmpty for BTreeMap<K, V> {
    fn is_empty(&self) -> bool {
        BTreeMap::is_empty(self)
    }
}
impl<T> IsEmpty for BTreeSet<T> {
    fn is_empty(&self) -> bool {
        BTreeSet::is_empty(self)
    }
}
impl IsEmpty for String {
    fn is_empty(&self) -> bool {
        String::is_empty(self)
    }
}
impl IsEmpty for bool {
    const LEAF: bool = true;

    fn is_empty(&self) -> bool {
        !*self
    }
}
macro_rules! never_empty {
    ($($ty:ty),*) => {
        $(impl IsEmpty for $ty {
            fn is_empty(&self) -> bool {
                false
            }
        })*
    };
}
never_empty!(u8, u16, u32, u64);

/// Implement [`IsEmpty`] for a struct as "every listed field is empty"
macro_rules! empty_if_all_empty {
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::IsEmpty for $ty {
            fn is_empty(&self) -> bool {
                true $(&& $crate::IsEmpty::is_empty(&self.$field))*
            }
        }
    };
}
pub(crate) use empty_if_all_empty;

/// Implement [`IsEmpty`] for a struct whose presence alone is meaningful
macro_rules! presence {
    ($($ty:ty),*) => {
        $(impl $crate::IsEmpty for $ty {
            fn is_empty(&self) -> bool {
                false
            }
        })*
    };
}
pub(crate) use presence;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Spec {
    pub hostname: Option<String>,
    pub ztp: Option<bool>,
    pub users: BTreeMap<String, SpecUser>,
    pub port_groups: BTreeMap<String, SpecPortGroup>,
    pub port_breakouts: BTreeMap<String, SpecPortBreakout>,
    pub interfaces: BTreeMap<String, SpecInterface>,
    pub mclag_domains: BTreeMap<u32, SpecMclagDomain>,
    pub mclag_interfaces: BTreeMap<String, SpecMclagInterface>,
    pub vrfs: BTreeMap<String, SpecVrf>,
    pub route_maps: BTreeMap<String, SpecRouteMap>,
    pub prefix_lists: BTreeMap<String, SpecPrefixList>,
    pub community_lists: BTreeMap<String, SpecCommunityList>,
    pub dhcp_relays: BTreeMap<String, SpecDhcpRelay>,
    pub nats: BTreeMap<u32, SpecNat>,
    pub acls: BTreeMap<String, SpecAcl>,
    pub acl_interfaces: BTreeMap<String, SpecAclInterface>,
    pub vxlan_tunnels: BTreeMap<String, SpecVxlanTunnel>,
    pub vxlan_evpn_nvos: BTreeMap<String, SpecVxlanEvpnNvo>,
    pub vxlan_tunnel_maps: BTreeMap<String, SpecVxlanTunnelMap>,
    pub vrf_vni_map: BTreeMap<String, SpecVrfVniEntry>,
    pub suppress_vlan_neighs: BTreeMap<String, SpecSuppressVlanNeigh>,
    pub lst_groups: BTreeMap<String, SpecLstGroup>,
    pub lst_interfaces: BTreeMap<String, SpecLstInterface>,
    pub lldp: Option<SpecLldp>,
    pub lldp_interfaces: BTreeMap<String, SpecLldpInterface>,
    pub ntp: Option<SpecNtp>,
    pub ntp_servers: BTreeMap<String, SpecNtpServer>,
    pub bfd_profiles: BTreeMap<String, SpecBfdProfile>,
    pub portchannel_configs: BTreeMap<String, SpecPortChannelConfig>,
    pub ecmp_roce_qpn: Option<bool>,
}

fn sort_dedup(list: &mut Vec<String>) {
    list.sort();
    list.dedup();
}

impl Spec {
    /// Put the unordered lists of the tree in a canonical order, so that two trees
    /// differing only in the order of those lists compare equal. Idempotent.
    pub fn normalize(&mut self) {
        for user in self.users.values_mut() {
            user.authorized_keys.sort();
        }
        for relay in self.dhcp_relays.values_mut() {
            relay.relay_address.sort();
        }
        for list in self.community_lists.values_mut() {
            sort_dedup(&mut list.members);
        }
        for iface in self.lst_interfaces.values_mut() {
            iface.groups.sort();
        }
        if let Some(ntp) = &mut self.ntp {
            ntp.source_interface.sort();
        }
        for iface in self.interfaces.values_mut() {
            iface.trunk_vlans.sort();
            iface.vlan_anycast_gateway.sort();
        }
        for vrf in self.vrfs.values_mut() {
            for route in vrf.static_routes.values_mut() {
                route.next_hops.sort();
            }
        }
    }

    /// A normalized copy
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.normalize();
        self
    }

    /// The `default` VRF, created if missing
    pub fn default_vrf_mut(&mut self) -> &mut SpecVrf {
        self.vrfs.entry(DEFAULT_VRF.to_owned()).or_default()
    }
}
