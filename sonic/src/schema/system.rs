// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! System models: hostname, ZTP, users, NTP, port groups and breakouts, LLDP, BFD
//! profiles, load sharing and DHCP relays.

use serde::{Deserialize, Serialize};

pub const SYSTEM_CONFIG: &str = "/openconfig-system:system/config";
pub const SYSTEM_HOSTNAME: &str = "/openconfig-system:system/config/hostname";
pub const ZTP_CONFIG: &str = "/openconfig-ztp:ztp/config";
pub const USERS: &str = "/openconfig-system:system/aaa/authentication/users";
pub const USER_CONFIG: &str =
    "/openconfig-system:system/aaa/authentication/users/user[username=%s]/config";
pub const NTP: &str = "/openconfig-system:system/ntp";
pub const NTP_CONFIG: &str = "/openconfig-system:system/ntp/config";
pub const NTP_SERVER_CONFIG: &str =
    "/openconfig-system:system/ntp/servers/server[address=%s]/config";
pub const PORT_GROUPS: &str = "/openconfig-port-group:port-groups";
pub const PORT_GROUP_CONFIG: &str = "/openconfig-port-group:port-groups/port-group[id=%s]/config";
pub const BREAKOUTS: &str = "/sonic-port-breakout:sonic-port-breakout/BREAKOUT_CFG";
pub const BREAKOUT: &str =
    "/sonic-port-breakout:sonic-port-breakout/BREAKOUT_CFG/BREAKOUT_CFG_LIST[port=%s]";
pub const LLDP: &str = "/openconfig-lldp:lldp";
pub const LLDP_CONFIG: &str = "/openconfig-lldp:lldp/config";
pub const LLDP_INTERFACE_CONFIG: &str =
    "/openconfig-lldp:lldp/interfaces/interface[name=%s]/config";
pub const BFD_PROFILES: &str = "/openconfig-bfd:bfd/profiles";
pub const BFD_PROFILE_CONFIG: &str = "/openconfig-bfd:bfd/profiles/profile[profile-name=%s]/config";
pub const ECMP_ROCE_CONFIG: &str = "/openconfig-loadshare-mode-ext:loadshare/roce-attrs/config";
pub const DHCP_RELAYS: &str = "/openconfig-relay-agent:relay-agent/dhcp/interfaces";
pub const DHCP_RELAY_CONFIG: &str =
    "/openconfig-relay-agent:relay-agent/dhcp/interfaces/interface[id=%s]/config";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SystemConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ZtpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Users {
    #[serde(default)]
    pub user: Vec<UserEntry>,
}

#[derive(Debug, Deserialize)]
pub struct UserEntry {
    pub username: String,
    pub config: Option<UserConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct UserConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hashed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ssh_key: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Ntp {
    pub config: Option<NtpConfig>,
    pub servers: Option<NtpServers>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NtpConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_interface: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NtpServers {
    #[serde(default)]
    pub server: Vec<NtpServerEntry>,
}

#[derive(Debug, Deserialize)]
pub struct NtpServerEntry {
    pub address: String,
    pub config: Option<NtpServerConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NtpServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefer: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortGroups {
    #[serde(default)]
    pub port_group: Vec<PortGroupEntry>,
}

#[derive(Debug, Deserialize)]
pub struct PortGroupEntry {
    pub id: String,
    pub config: Option<PortGroupConfig>,
    pub state: Option<PortGroupState>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortGroupConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<String>,
}

/// Read-only view of a port group
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PortGroupState {
    pub default_speed: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BreakoutTable {
    #[serde(rename = "BREAKOUT_CFG_LIST", default)]
    pub list: Vec<BreakoutEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakoutEntry {
    #[serde(default, skip_serializing)]
    pub port: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brkout_mode: Option<String>,
    /// progress of the last mode change, set by the switch
    #[serde(default, skip_serializing)]
    pub status: Option<String>,
}

/// Status of a breakout once the ports are re-created
pub const BREAKOUT_COMPLETED: &str = "Completed";

#[derive(Debug, Default, Deserialize)]
pub struct Lldp {
    pub config: Option<LldpConfig>,
    pub interfaces: Option<LldpInterfaces>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LldpConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hello_timer: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LldpInterfaces {
    #[serde(default)]
    pub interface: Vec<LldpInterfaceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct LldpInterfaceEntry {
    pub name: String,
    pub config: Option<LldpInterfaceConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct LldpInterfaceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub management_address_ipv4: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct BfdProfiles {
    #[serde(default)]
    pub profile: Vec<BfdProfileEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BfdProfileEntry {
    pub profile_name: String,
    pub config: Option<BfdProfileConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BfdProfileConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passive_mode: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_minimum_receive: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub desired_minimum_tx_interval: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detection_multiplier: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RoceConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_roce_qpn: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RelayInterfaces {
    #[serde(default)]
    pub interface: Vec<RelayInterfaceEntry>,
}

#[derive(Debug, Deserialize)]
pub struct RelayInterfaceEntry {
    pub id: String,
    pub config: Option<RelayConfig>,
}

/// The selection flags are always written, `false` included
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RelayConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub helper_address: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_intf: Option<String>,
    #[serde(default)]
    pub link_select: bool,
    #[serde(default)]
    pub vrf_select: bool,
}
