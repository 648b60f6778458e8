// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Switch-wide settings: identity, ports, LLDP, users, NTP and hashing

use config::AgentSpec;
use config::intent::Connection;
use spec::{
    Spec, SpecLldp, SpecLldpInterface, SpecNtp, SpecNtpServer, SpecPortBreakout, SpecPortGroup,
    SpecUser,
};
use tracing::trace;

use crate::{AGENT_USER, LLDP_HELLO_TIMER, LOOPBACK_SWITCH, PlanError, local_port};

pub(crate) fn plan_global(intent: &AgentSpec, spec: &mut Spec) {
    spec.hostname = Some(intent.name.clone());
    spec.ztp = Some(false);
    spec.default_vrf_mut().enabled = Some(true);
}

pub(crate) fn plan_ports(intent: &AgentSpec, spec: &mut Spec) {
    for (group, speed) in &intent.port_groups {
        spec.port_groups.insert(
            group.clone(),
            SpecPortGroup {
                speed: Some(speed.clone()),
            },
        );
    }
    for (port, mode) in &intent.port_breakouts {
        spec.port_breakouts.insert(
            port.clone(),
            SpecPortBreakout {
                mode: Some(mode.clone()),
            },
        );
    }
}

/// LLDP, and the description of fabric ports along with the address LLDP advertises
/// on them
pub(crate) fn plan_lldp(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    spec.lldp = Some(SpecLldp {
        enabled: Some(true),
        hello_timer: Some(LLDP_HELLO_TIMER),
        system_name: Some(intent.name.clone()),
        system_description: None,
    });

    for (_, conn) in intent.local_connections() {
        let Connection::Fabric { links } = conn else {
            continue;
        };
        for (local, remote) in links.iter().filter_map(|link| link.ends_for(&intent.name)) {
            let port = local_port(&local.port)?;
            let peer = intent
                .switch(&remote.port.device)
                .ok_or_else(|| PlanError::NoSuchSwitch(remote.port.device.clone()))?;
            spec.interfaces.entry(port.clone()).or_default().description =
                Some(format!("Fabric {}", remote.port));
            spec.lldp_interfaces.insert(
                port,
                SpecLldpInterface {
                    enabled: Some(true),
                    management_ipv4: Some(peer.ip.addr().to_string()),
                },
            );
        }
    }
    Ok(())
}

pub(crate) fn plan_users(intent: &AgentSpec, spec: &mut Spec) {
    for user in &intent.users {
        if user.name == AGENT_USER {
            trace!("Skipping reserved user {}", user.name);
            continue;
        }
        spec.users.insert(
            user.name.clone(),
            SpecUser {
                password: Some(user.password.clone()),
                role: Some(user.role.clone()),
                authorized_keys: user.ssh_keys.clone(),
            },
        );
    }
}

pub(crate) fn plan_ntp(intent: &AgentSpec, spec: &mut Spec) {
    spec.ntp = Some(SpecNtp {
        source_interface: vec![LOOPBACK_SWITCH.to_owned()],
    });
    for server in &intent.ntp_servers {
        spec.ntp_servers.insert(
            server.clone(),
            SpecNtpServer {
                prefer: Some(false),
            },
        );
    }
}

pub(crate) fn plan_roce(intent: &AgentSpec, spec: &mut Spec) {
    if intent.roce {
        spec.ecmp_roce_qpn = Some(true);
    }
}
