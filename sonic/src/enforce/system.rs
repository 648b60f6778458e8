// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! System-wide entities

use serde_json::{Value, json};
use spec::{
    SpecBfdProfile, SpecDhcpRelay, SpecLldp, SpecLldpInterface, SpecNtp, SpecNtpServer,
    Spec, SpecPortBreakout, SpecPortGroup, SpecUser,
};
use tracing::debug;

use crate::enforce::{
    Action, ActionKind, ActionQueue, ActionWeight, CustomAction, EnforcerError, ValueEnforcer,
    enforce_map, to_value,
};
use crate::schema::expand_path;
use crate::schema::system::{
    BFD_PROFILE_CONFIG, BREAKOUT, BfdProfileConfig, DHCP_RELAY_CONFIG, ECMP_ROCE_CONFIG,
    LLDP_CONFIG, LLDP_INTERFACE_CONFIG, LldpConfig, LldpInterfaceConfig, NTP_CONFIG,
    NTP_SERVER_CONFIG, NtpConfig, NtpServerConfig, PORT_GROUP_CONFIG, PortGroupConfig,
    RelayConfig, RoceConfig, SYSTEM_HOSTNAME, USER_CONFIG, UserConfig, ZTP_CONFIG, ZtpConfig,
};

/// Hashed passwords are recognized by their crypt(3) prefix
pub(crate) fn is_hashed(password: &str) -> bool {
    password.starts_with('$')
}

fn marshal_hostname(_: &&'static str, hostname: &String) -> Result<Value, EnforcerError> {
    Ok(json!(hostname))
}
static HOSTNAME: ValueEnforcer<&'static str, String> = ValueEnforcer {
    summary: "hostname",
    path: SYSTEM_HOSTNAME,
    marshal: Some(marshal_hostname),
    update_weight: ActionWeight::HostnameUpdate,
    delete_weight: ActionWeight::HostnameDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_ztp(_: &&'static str, ztp: &Option<bool>) -> Result<Value, EnforcerError> {
    to_value("ZTP", &ZtpConfig { admin_state: *ztp })
}
static ZTP: ValueEnforcer<&'static str, Option<bool>> = ValueEnforcer {
    summary: "ZTP",
    path: ZTP_CONFIG,
    marshal: Some(marshal_ztp),
    update_weight: ActionWeight::ZtpUpdate,
    delete_weight: ActionWeight::ZtpDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_user(name: &String, user: &SpecUser) -> Result<Value, EnforcerError> {
    let (password, password_hashed) = match &user.password {
        Some(password) if is_hashed(password) => (None, Some(password.clone())),
        other => (other.clone(), None),
    };
    let config = UserConfig {
        password,
        password_hashed,
        role: user.role.clone(),
        ssh_key: user.authorized_keys.clone(),
    };
    to_value(&format!("user {name}"), &config)
}
static USERS: ValueEnforcer<String, SpecUser> = ValueEnforcer {
    summary: "user %s",
    path: USER_CONFIG,
    marshal: Some(marshal_user),
    update_weight: ActionWeight::UserUpdate,
    delete_weight: ActionWeight::UserDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_ntp(_: &&'static str, ntp: &SpecNtp) -> Result<Value, EnforcerError> {
    let config = NtpConfig {
        source_interface: ntp.source_interface.clone(),
    };
    to_value("NTP", &config)
}
static NTP: ValueEnforcer<&'static str, SpecNtp> = ValueEnforcer {
    summary: "NTP",
    path: NTP_CONFIG,
    marshal: Some(marshal_ntp),
    update_weight: ActionWeight::NtpUpdate,
    delete_weight: ActionWeight::NtpDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_ntp_server(address: &String, server: &SpecNtpServer) -> Result<Value, EnforcerError> {
    let config = NtpServerConfig {
        prefer: server.prefer,
    };
    to_value(&format!("NTP server {address}"), &config)
}
static NTP_SERVERS: ValueEnforcer<String, SpecNtpServer> = ValueEnforcer {
    summary: "NTP server %s",
    path: NTP_SERVER_CONFIG,
    marshal: Some(marshal_ntp_server),
    update_weight: ActionWeight::NtpServerUpdate,
    delete_weight: ActionWeight::NtpServerDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_roce(_: &&'static str, qpn: &Option<bool>) -> Result<Value, EnforcerError> {
    to_value("ECMP RoCE", &RoceConfig { hash_roce_qpn: *qpn })
}
static ECMP_ROCE: ValueEnforcer<&'static str, Option<bool>> = ValueEnforcer {
    summary: "ECMP RoCE QPN hashing",
    path: ECMP_ROCE_CONFIG,
    marshal: Some(marshal_roce),
    update_weight: ActionWeight::EcmpRoceUpdate,
    delete_weight: ActionWeight::EcmpRoceDelete,
    /* platforms without RoCE queue pair hashing reject it */
    warning_on_error: true,
    ..ValueEnforcer::DEFAULT
};

fn marshal_port_group(id: &String, group: &SpecPortGroup) -> Result<Value, EnforcerError> {
    let config = PortGroupConfig {
        speed: group.speed.clone(),
    };
    to_value(&format!("port group {id}"), &config)
}
static PORT_GROUPS: ValueEnforcer<String, SpecPortGroup> = ValueEnforcer {
    summary: "port group %s",
    path: PORT_GROUP_CONFIG,
    marshal: Some(marshal_port_group),
    update_weight: ActionWeight::PortGroupUpdate,
    delete_weight: ActionWeight::PortGroupDelete,
    ..ValueEnforcer::DEFAULT
};

/// Breakouts are changed through a custom procedure and never removed: a port always
/// has a breakout mode.
fn handle_breakout(
    basepath: &str,
    port: &String,
    actual: Option<&SpecPortBreakout>,
    desired: Option<&SpecPortBreakout>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    let Some(mode) = desired.and_then(|d| d.mode.clone()) else {
        debug!("Ignoring removal of breakout of port {port}");
        return Ok(());
    };
    if actual.and_then(|a| a.mode.as_deref()) == Some(mode.as_str()) {
        return Ok(());
    }
    queue.add(Action {
        weight: ActionWeight::PortBreakoutUpdate,
        summary: format!("Breakout port {port} to {mode}"),
        kind: ActionKind::Custom,
        path: format!("{basepath}{}", expand_path(BREAKOUT, port)),
        value: Some(json!({ "brkout_mode": mode })),
        custom: Some(CustomAction::PortBreakout {
            port: port.clone(),
            mode,
        }),
        warning_on_error: false,
    })
}
static PORT_BREAKOUTS: ValueEnforcer<String, SpecPortBreakout> = ValueEnforcer {
    summary: "breakout of port %s",
    custom_handler: Some(handle_breakout),
    ..ValueEnforcer::DEFAULT
};

fn marshal_lldp(_: &&'static str, lldp: &SpecLldp) -> Result<Value, EnforcerError> {
    let config = LldpConfig {
        enabled: lldp.enabled,
        hello_timer: lldp.hello_timer,
        system_name: lldp.system_name.clone(),
        system_description: lldp.system_description.clone(),
    };
    to_value("LLDP", &config)
}
static LLDP: ValueEnforcer<&'static str, SpecLldp> = ValueEnforcer {
    summary: "LLDP",
    path: LLDP_CONFIG,
    marshal: Some(marshal_lldp),
    update_weight: ActionWeight::LldpUpdate,
    delete_weight: ActionWeight::LldpDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_lldp_interface(
    name: &String,
    iface: &SpecLldpInterface,
) -> Result<Value, EnforcerError> {
    let config = LldpInterfaceConfig {
        enabled: iface.enabled,
        management_address_ipv4: iface.management_ipv4.clone(),
    };
    to_value(&format!("LLDP on {name}"), &config)
}
static LLDP_INTERFACES: ValueEnforcer<String, SpecLldpInterface> = ValueEnforcer {
    summary: "LLDP on interface %s",
    path: LLDP_INTERFACE_CONFIG,
    marshal: Some(marshal_lldp_interface),
    update_weight: ActionWeight::LldpInterfaceUpdate,
    delete_weight: ActionWeight::LldpInterfaceDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_bfd_profile(name: &String, profile: &SpecBfdProfile) -> Result<Value, EnforcerError> {
    let config = BfdProfileConfig {
        passive_mode: profile.passive_mode,
        required_minimum_receive: profile.required_min_rx,
        desired_minimum_tx_interval: profile.desired_min_tx,
        detection_multiplier: profile.detection_multiplier,
    };
    to_value(&format!("BFD profile {name}"), &config)
}
static BFD_PROFILES: ValueEnforcer<String, SpecBfdProfile> = ValueEnforcer {
    summary: "BFD profile %s",
    path: BFD_PROFILE_CONFIG,
    marshal: Some(marshal_bfd_profile),
    update_weight: ActionWeight::BfdProfileUpdate,
    delete_weight: ActionWeight::BfdProfileDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_dhcp_relay(name: &String, relay: &SpecDhcpRelay) -> Result<Value, EnforcerError> {
    let config = RelayConfig {
        helper_address: relay.relay_address.clone(),
        src_intf: relay.source_interface.clone(),
        link_select: relay.link_select,
        vrf_select: relay.vrf_select,
    };
    to_value(&format!("DHCP relay on {name}"), &config)
}
static DHCP_RELAYS: ValueEnforcer<String, SpecDhcpRelay> = ValueEnforcer {
    summary: "DHCP relay on interface %s",
    path: DHCP_RELAY_CONFIG,
    marshal: Some(marshal_dhcp_relay),
    update_weight: ActionWeight::DhcpRelayUpdate,
    delete_weight: ActionWeight::DhcpRelayDelete,
    ..ValueEnforcer::DEFAULT
};

pub(super) fn enforce(
    actual: &Spec,
    desired: &Spec,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    HOSTNAME.handle(
        "",
        &"hostname",
        actual.hostname.as_ref(),
        desired.hostname.as_ref(),
        queue,
    )?;
    ZTP.handle("", &"ztp", Some(&actual.ztp), Some(&desired.ztp), queue)?;
    ECMP_ROCE.handle(
        "",
        &"roce",
        Some(&actual.ecmp_roce_qpn),
        Some(&desired.ecmp_roce_qpn),
        queue,
    )?;
    NTP.handle("", &"ntp", actual.ntp.as_ref(), desired.ntp.as_ref(), queue)?;
    LLDP.handle("", &"lldp", actual.lldp.as_ref(), desired.lldp.as_ref(), queue)?;
    enforce_map(&USERS, "", Some(&actual.users), Some(&desired.users), queue)?;
    enforce_map(
        &NTP_SERVERS,
        "",
        Some(&actual.ntp_servers),
        Some(&desired.ntp_servers),
        queue,
    )?;
    enforce_map(
        &PORT_GROUPS,
        "",
        Some(&actual.port_groups),
        Some(&desired.port_groups),
        queue,
    )?;
    enforce_map(
        &PORT_BREAKOUTS,
        "",
        Some(&actual.port_breakouts),
        Some(&desired.port_breakouts),
        queue,
    )?;
    enforce_map(
        &LLDP_INTERFACES,
        "",
        Some(&actual.lldp_interfaces),
        Some(&desired.lldp_interfaces),
        queue,
    )?;
    enforce_map(
        &BFD_PROFILES,
        "",
        Some(&actual.bfd_profiles),
        Some(&desired.bfd_profiles),
        queue,
    )?;
    enforce_map(
        &DHCP_RELAYS,
        "",
        Some(&actual.dhcp_relays),
        Some(&desired.dhcp_relays),
        queue,
    )
}
