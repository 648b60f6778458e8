// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Server-facing connections and the MCLAG domain two leaves form

use config::AgentSpec;
use config::intent::{Connection, SwitchLink};
use ipnet::Ipv4Net;
use spec::{
    Spec, SpecInterface, SpecLstGroup, SpecLstInterface, SpecMclagDomain, SpecMclagInterface,
    SpecPortChannelConfig, SpecVrfBgpNeighbor,
};
use std::collections::BTreeSet;
use std::net::Ipv4Addr;

use crate::{
    LST_GROUP, MCLAG_DOMAIN_ID, MCLAG_PEER_LINK, MCLAG_SESSION_LINK, MCLAG_SYSTEM_MAC, PlanError,
    address, attached_subnet, local_port, portchannel,
};

/// First address of the /31 the MCLAG session link uses
const MCLAG_SESSION_BASE: Ipv4Addr = Ipv4Addr::new(172, 30, 5, 0);
const MCLAG_SESSION_PREFIX_LEN: u8 = 31;

/// VLANs of the subnets attached through `connection`, or through any local connection
fn attached_vlans(intent: &AgentSpec, connection: Option<&str>) -> Result<Vec<String>, PlanError> {
    let mut vlans = BTreeSet::new();
    for (_, attach) in intent.local_attachments() {
        if connection.is_some_and(|name| name != attach.connection) {
            continue;
        }
        let (_, _, subnet) = attached_subnet(intent, attach)?;
        vlans.insert(subnet.vlan);
    }
    Ok(vlans.into_iter().map(|vlan| vlan.to_string()).collect())
}

/// Bundle `members` into the port channel `name`
fn plan_bundle(
    spec: &mut Spec,
    name: &str,
    description: &str,
    members: impl IntoIterator<Item = String>,
    channel: SpecInterface,
) {
    for member in members {
        spec.interfaces.insert(
            member,
            SpecInterface {
                description: Some(description.to_owned()),
                enabled: Some(true),
                aggregate_id: Some(name.to_owned()),
                ..Default::default()
            },
        );
    }
    spec.interfaces.insert(
        name.to_owned(),
        SpecInterface {
            description: Some(description.to_owned()),
            enabled: Some(true),
            ..channel
        },
    );
}

pub(crate) fn plan_server_facing(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    for (name, conn) in intent.local_connections() {
        if !conn.is_server_facing() {
            continue;
        }
        let trunk_vlans = attached_vlans(intent, Some(name))?;
        let description = format!("{} {name}", conn.kind());
        let ports = conn
            .server_ports_on(&intent.name)
            .into_iter()
            .map(local_port)
            .collect::<Result<Vec<_>, _>>()?;

        match conn {
            Connection::Mclag { .. } | Connection::Bundled { .. } => {
                let id = intent
                    .port_channels
                    .get(name)
                    .ok_or_else(|| PlanError::MissingPortChannel(name.clone()))?;
                let channel = portchannel(*id);
                plan_bundle(
                    spec,
                    &channel,
                    &description,
                    ports,
                    SpecInterface {
                        trunk_vlans,
                        ..Default::default()
                    },
                );
                if matches!(conn, Connection::Mclag { .. }) {
                    spec.mclag_interfaces.insert(
                        channel,
                        SpecMclagInterface {
                            domain_id: Some(MCLAG_DOMAIN_ID),
                        },
                    );
                }
            }
            _ => {
                for port in ports {
                    spec.interfaces.insert(
                        port,
                        SpecInterface {
                            description: Some(description.clone()),
                            enabled: Some(true),
                            trunk_vlans: trunk_vlans.clone(),
                            ..Default::default()
                        },
                    );
                }
            }
        }
    }
    Ok(())
}

fn local_ports(links: &[SwitchLink], switch: &str) -> Result<Vec<String>, PlanError> {
    links
        .iter()
        .filter_map(|link| link.ports_for(switch))
        .map(|(local, _)| local_port(local))
        .collect()
}

/// Session addresses of the local and the peer switch. The switch whose name sorts
/// first takes the lower one.
fn session_addresses(local: &str, peer: &str) -> Result<(Ipv4Net, Ipv4Net), PlanError> {
    let low = MCLAG_SESSION_BASE;
    let high = Ipv4Addr::from(u32::from(MCLAG_SESSION_BASE) + 1);
    let (local_ip, peer_ip) = if local < peer { (low, high) } else { (high, low) };
    let net = |ip| {
        Ipv4Net::new(ip, MCLAG_SESSION_PREFIX_LEN)
            .map_err(|_| PlanError::InvalidCidr(format!("{ip}/{MCLAG_SESSION_PREFIX_LEN}")))
    };
    Ok((net(local_ip)?, net(peer_ip)?))
}

pub(crate) fn plan_mclag_domain(intent: &AgentSpec, spec: &mut Spec) -> Result<(), PlanError> {
    let domain = intent.local_connections().find_map(|(name, conn)| match conn {
        Connection::MclagDomain {
            peer_links,
            session_links,
        } => Some((name, peer_links, session_links)),
        _ => None,
    });
    let Some((name, peer_links, session_links)) = domain else {
        return Ok(());
    };
    let peer = peer_links
        .iter()
        .chain(session_links)
        .find_map(|link| link.ports_for(&intent.name))
        .map(|(_, remote)| remote.device.clone())
        .ok_or_else(|| PlanError::NoSuchConnection(name.clone()))?;
    let (local_ip, peer_ip) = session_addresses(&intent.name, &peer)?;

    plan_bundle(
        spec,
        MCLAG_PEER_LINK,
        &format!("MCLAG peer link {peer}"),
        local_ports(peer_links, &intent.name)?,
        SpecInterface {
            trunk_vlans: attached_vlans(intent, None)?,
            ..Default::default()
        },
    );
    plan_bundle(
        spec,
        MCLAG_SESSION_LINK,
        &format!("MCLAG session link {peer}"),
        local_ports(session_links, &intent.name)?,
        SpecInterface {
            ips: [address(&local_ip)].into(),
            ..Default::default()
        },
    );

    spec.mclag_domains.insert(
        MCLAG_DOMAIN_ID,
        SpecMclagDomain {
            source_ip: Some(local_ip.addr().to_string()),
            peer_ip: Some(peer_ip.addr().to_string()),
            peer_link: Some(MCLAG_PEER_LINK.to_owned()),
        },
    );
    spec.default_vrf_mut().bgp_mut().neighbors.insert(
        peer_ip.addr().to_string(),
        SpecVrfBgpNeighbor {
            enabled: Some(true),
            description: Some(format!("MCLAG session {peer}")),
            remote_as: Some(intent.asn),
            peer_type: Some("internal".to_owned()),
            ipv4_unicast: Some(true),
            ..Default::default()
        },
    );

    let channels: Vec<String> = spec.mclag_interfaces.keys().cloned().collect();
    for channel in channels {
        spec.portchannel_configs.insert(
            channel,
            SpecPortChannelConfig {
                system_mac: Some(MCLAG_SYSTEM_MAC.to_owned()),
                fallback: None,
            },
        );
    }

    /* uplinks going down take the server-facing MCLAG port channels down with them */
    spec.lst_groups.insert(
        LST_GROUP.to_owned(),
        SpecLstGroup {
            all_mclags_downstream: Some(true),
            timeout: None,
        },
    );
    let uplinks: Vec<String> = spec.lldp_interfaces.keys().cloned().collect();
    for uplink in uplinks {
        spec.lst_interfaces.insert(
            uplink,
            SpecLstInterface {
                groups: vec![LST_GROUP.to_owned()],
            },
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan;
    use pretty_assertions::assert_eq;
    use spec::DEFAULT_VRF;
    use test_utils::{leaf_intent, mclag_intent};

    #[test]
    fn test_mclag_tie_break() {
        let a = plan(&mclag_intent("s-a")).unwrap();
        let domain = &a.mclag_domains[&MCLAG_DOMAIN_ID];
        assert_eq!(domain.source_ip.as_deref(), Some("172.30.5.0"));
        assert_eq!(domain.peer_ip.as_deref(), Some("172.30.5.1"));
        assert_eq!(domain.peer_link.as_deref(), Some(MCLAG_PEER_LINK));

        let b = plan(&mclag_intent("s-b")).unwrap();
        let domain = &b.mclag_domains[&MCLAG_DOMAIN_ID];
        assert_eq!(domain.source_ip.as_deref(), Some("172.30.5.1"));
        assert_eq!(domain.peer_ip.as_deref(), Some("172.30.5.0"));

        assert_eq!(
            b.interfaces[MCLAG_SESSION_LINK].ips["172.30.5.1"].prefix_len,
            Some(31)
        );
        let bgp = b.vrfs[DEFAULT_VRF].bgp.as_ref().unwrap();
        let neighbor = &bgp.neighbors["172.30.5.0"];
        assert_eq!(neighbor.remote_as, Some(65101));
        assert_eq!(neighbor.peer_type.as_deref(), Some("internal"));
    }

    #[test]
    fn test_mclag_server_connection() {
        let spec = plan(&mclag_intent("s-a")).unwrap();
        let channel = &spec.interfaces["PortChannel1"];
        assert_eq!(channel.trunk_vlans, vec!["1000".to_owned()]);
        assert_eq!(
            spec.interfaces["Ethernet1"].aggregate_id.as_deref(),
            Some("PortChannel1")
        );
        assert_eq!(
            spec.mclag_interfaces["PortChannel1"].domain_id,
            Some(MCLAG_DOMAIN_ID)
        );
        assert_eq!(
            spec.portchannel_configs["PortChannel1"].system_mac.as_deref(),
            Some(MCLAG_SYSTEM_MAC)
        );
        assert_eq!(
            spec.interfaces["Ethernet56"].aggregate_id.as_deref(),
            Some(MCLAG_PEER_LINK)
        );
        assert_eq!(
            spec.interfaces["Ethernet60"].aggregate_id.as_deref(),
            Some(MCLAG_SESSION_LINK)
        );
        assert_eq!(
            spec.interfaces[MCLAG_PEER_LINK].trunk_vlans,
            vec!["1000".to_owned()]
        );
        assert_eq!(
            spec.lst_groups[LST_GROUP].all_mclags_downstream,
            Some(true)
        );
    }

    #[test]
    fn test_missing_port_channel() {
        let mut intent = mclag_intent("s-a");
        intent.port_channels.clear();
        assert_eq!(
            plan(&intent),
            Err(PlanError::MissingPortChannel(
                "server-1--mclag--s-a--s-b".to_owned()
            ))
        );
    }

    #[test]
    fn test_unbundled_trunk() {
        let spec = plan(&leaf_intent()).unwrap();
        let port = &spec.interfaces["Ethernet1"];
        assert_eq!(port.trunk_vlans, vec!["1000".to_owned()]);
        assert_eq!(port.aggregate_id, None);
        assert!(spec.mclag_domains.is_empty());
        assert!(spec.lst_groups.is_empty());
    }

    #[test]
    fn test_invalid_server_port() {
        let mut intent = leaf_intent();
        intent.connections.insert(
            "server-2--unbundled--leaf-1".to_owned(),
            serde_yaml_ng::from_str(
                r"
type: unbundled
link:
  switch: leaf-1/Vlan12
  server: server-2/enp2s1
",
            )
            .unwrap(),
        );
        assert_eq!(
            plan(&intent),
            Err(PlanError::InvalidPort("leaf-1/Vlan12".to_owned()))
        );
    }
}
