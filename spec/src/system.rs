// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! System-wide entities: users, ports, LLDP, NTP, BFD and DHCP relays

use crate::empty_if_all_empty;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecUser {
    pub password: Option<String>, /* plain text, or hashed if it starts with '$' */
    pub role: Option<String>,
    pub authorized_keys: Vec<String>,
}
empty_if_all_empty!(SpecUser { password, role, authorized_keys });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecPortGroup {
    pub speed: Option<String>,
}
empty_if_all_empty!(SpecPortGroup { speed });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecPortBreakout {
    pub mode: Option<String>,
}
empty_if_all_empty!(SpecPortBreakout { mode });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecDhcpRelay {
    pub source_interface: Option<String>,
    pub relay_address: Vec<String>,
    pub link_select: bool,
    pub vrf_select: bool,
}
empty_if_all_empty!(SpecDhcpRelay {
    source_interface,
    relay_address,
    link_select,
    vrf_select
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecLldp {
    pub enabled: Option<bool>,
    pub hello_timer: Option<u64>,
    pub system_name: Option<String>,
    pub system_description: Option<String>,
}
empty_if_all_empty!(SpecLldp {
    enabled,
    hello_timer,
    system_name,
    system_description
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecLldpInterface {
    pub enabled: Option<bool>,
    pub management_ipv4: Option<String>,
}
empty_if_all_empty!(SpecLldpInterface {
    enabled,
    management_ipv4
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecNtp {
    pub source_interface: Vec<String>,
}
empty_if_all_empty!(SpecNtp { source_interface });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecNtpServer {
    pub prefer: Option<bool>,
}
empty_if_all_empty!(SpecNtpServer { prefer });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecBfdProfile {
    pub passive_mode: Option<bool>,
    pub required_min_rx: Option<u32>,
    pub desired_min_tx: Option<u32>,
    pub detection_multiplier: Option<u8>,
}
empty_if_all_empty!(SpecBfdProfile {
    passive_mode,
    required_min_rx,
    desired_min_tx,
    detection_multiplier
});
