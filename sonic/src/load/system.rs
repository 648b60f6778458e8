// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use spec::{
    Spec, SpecBfdProfile, SpecDhcpRelay, SpecLldp, SpecLldpInterface, SpecNtp, SpecNtpServer,
    SpecPortBreakout, SpecPortGroup, SpecUser,
};
use tracing::trace;

use crate::load::LoaderOptions;
use crate::schema::system::{
    BfdProfiles, BreakoutTable, Lldp, Ntp, PortGroups, RelayInterfaces, RoceConfig, SystemConfig,
    Users, ZtpConfig,
};

pub(super) fn load_system(config: SystemConfig, spec: &mut Spec) {
    spec.hostname = config.hostname;
}

pub(super) fn load_ztp(config: ZtpConfig, spec: &mut Spec) {
    spec.ztp = config.admin_state;
}

pub(super) fn load_roce(config: RoceConfig, spec: &mut Spec) {
    spec.ecmp_roce_qpn = config.hash_roce_qpn;
}

pub(super) fn load_users(users: Users, options: &LoaderOptions, spec: &mut Spec) {
    for entry in users.user {
        if entry.username == options.agent_user {
            continue;
        }
        let config = entry.config.unwrap_or_default();
        spec.users.insert(
            entry.username,
            SpecUser {
                password: config.password_hashed.or(config.password),
                role: config.role,
                authorized_keys: config.ssh_key,
            },
        );
    }
}

pub(super) fn load_ntp(ntp: Ntp, spec: &mut Spec) {
    if let Some(config) = ntp.config {
        spec.ntp = Some(SpecNtp {
            source_interface: config.source_interface,
        });
    }
    for server in ntp.servers.map(|s| s.server).unwrap_or_default() {
        let config = server.config.unwrap_or_default();
        spec.ntp_servers.insert(
            server.address,
            SpecNtpServer {
                prefer: config.prefer,
            },
        );
    }
}

pub(super) fn load_port_groups(groups: PortGroups, spec: &mut Spec) {
    for group in groups.port_group {
        let speed = group.config.and_then(|c| c.speed);
        let default = group.state.and_then(|s| s.default_speed);
        if speed.is_none() || speed == default {
            trace!("Port group {} at default speed", group.id);
            continue;
        }
        spec.port_groups.insert(group.id, SpecPortGroup { speed });
    }
}

pub(super) fn load_breakouts(table: BreakoutTable, spec: &mut Spec) {
    for entry in table.list {
        spec.port_breakouts.insert(
            entry.port,
            SpecPortBreakout {
                mode: entry.brkout_mode,
            },
        );
    }
}

pub(super) fn load_lldp(lldp: Lldp, spec: &mut Spec) {
    if let Some(config) = lldp.config {
        spec.lldp = Some(SpecLldp {
            enabled: config.enabled,
            hello_timer: config.hello_timer,
            system_name: config.system_name,
            system_description: config.system_description,
        });
    }
    for iface in lldp.interfaces.map(|i| i.interface).unwrap_or_default() {
        let config = iface.config.unwrap_or_default();
        spec.lldp_interfaces.insert(
            iface.name,
            SpecLldpInterface {
                enabled: config.enabled,
                management_ipv4: config.management_address_ipv4,
            },
        );
    }
}

pub(super) fn load_bfd_profiles(profiles: BfdProfiles, spec: &mut Spec) {
    for profile in profiles.profile {
        let config = profile.config.unwrap_or_default();
        spec.bfd_profiles.insert(
            profile.profile_name,
            SpecBfdProfile {
                passive_mode: config.passive_mode,
                required_min_rx: config.required_minimum_receive,
                desired_min_tx: config.desired_minimum_tx_interval,
                detection_multiplier: config.detection_multiplier,
            },
        );
    }
}

pub(super) fn load_dhcp_relays(relays: RelayInterfaces, spec: &mut Spec) {
    for relay in relays.interface {
        let config = relay.config.unwrap_or_default();
        spec.dhcp_relays.insert(
            relay.id,
            SpecDhcpRelay {
                source_interface: config.src_intf,
                relay_address: config.helper_address,
                link_select: config.link_select,
                vrf_select: config.vrf_select,
            },
        );
    }
}
