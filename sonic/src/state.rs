// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Operational state of a switch, as opposed to its configuration

use gnmi::ConfigEndpoint;
use spec::SpecInterface;
use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::load::{LoaderError, LoaderOptions, Reader, is_managed_vrf};
use crate::schema::interfaces::{INTERFACES, Interfaces};
use crate::schema::network::{NETWORK_INSTANCES, NetworkInstances, PROTOCOL_BGP};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceCounters {
    pub in_octets: u64,
    pub out_octets: u64,
    pub in_pkts: u64,
    pub out_pkts: u64,
    pub in_errors: u64,
    pub out_errors: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InterfaceStatus {
    pub admin_up: bool,
    pub oper_up: bool,
    pub counters: InterfaceCounters,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BgpNeighborStatus {
    pub session_state: String,
    pub established_transitions: u64,
}
impl BgpNeighborStatus {
    #[must_use]
    pub fn is_established(&self) -> bool {
        self.session_state.eq_ignore_ascii_case("established")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SwitchState {
    pub interfaces: BTreeMap<String, InterfaceStatus>,
    /// keyed by VRF and neighbor address
    pub bgp_neighbors: BTreeMap<(String, String), BgpNeighborStatus>,
}

fn is_up(status: Option<&String>) -> bool {
    status.is_some_and(|s| s.eq_ignore_ascii_case("up"))
}

fn interface_state(interfaces: Interfaces) -> BTreeMap<String, InterfaceStatus> {
    interfaces
        .interface
        .into_iter()
        .filter(|entry| SpecInterface::is_known(&entry.name))
        .filter_map(|entry| {
            let state = entry.state?;
            let counters = state.counters.unwrap_or_default();
            let status = InterfaceStatus {
                admin_up: is_up(state.admin_status.as_ref()),
                oper_up: is_up(state.oper_status.as_ref()),
                counters: InterfaceCounters {
                    in_octets: counters.in_octets.unwrap_or_default(),
                    out_octets: counters.out_octets.unwrap_or_default(),
                    in_pkts: counters.in_pkts.unwrap_or_default(),
                    out_pkts: counters.out_pkts.unwrap_or_default(),
                    in_errors: counters.in_errors.unwrap_or_default(),
                    out_errors: counters.out_errors.unwrap_or_default(),
                },
            };
            Some((entry.name, status))
        })
        .collect()
}

fn bgp_neighbor_state(
    instances: NetworkInstances,
) -> BTreeMap<(String, String), BgpNeighborStatus> {
    let mut neighbors = BTreeMap::new();
    for instance in instances.network_instance {
        if !is_managed_vrf(&instance.name) {
            continue;
        }
        let protocols = instance.protocols.map(|p| p.protocol).unwrap_or_default();
        for protocol in protocols.into_iter().filter(|p| p.identifier == PROTOCOL_BGP) {
            let entries = protocol
                .bgp
                .and_then(|bgp| bgp.neighbors)
                .map(|n| n.neighbor)
                .unwrap_or_default();
            for neighbor in entries {
                let state = neighbor.state.unwrap_or_default();
                neighbors.insert(
                    (instance.name.clone(), neighbor.neighbor_address),
                    BgpNeighborStatus {
                        session_state: state.session_state.unwrap_or_default(),
                        established_transitions: state.established_transitions.unwrap_or_default(),
                    },
                );
            }
        }
    }
    neighbors
}

/// Read interface status and counters and BGP session states
pub async fn load_state<E>(
    endpoint: &E,
    options: &LoaderOptions,
    cancel: &CancellationToken,
) -> Result<SwitchState, LoaderError>
where
    E: ConfigEndpoint + ?Sized,
{
    let reader = Reader::new(endpoint, options, cancel);
    let state = SwitchState {
        interfaces: interface_state(reader.fetch(INTERFACES).await?),
        bgp_neighbors: bgp_neighbor_state(reader.fetch(NETWORK_INSTANCES).await?),
    };
    debug!(
        "Loaded state of {} interfaces and {} BGP neighbors",
        state.interfaces.len(),
        state.bgp_neighbors.len()
    );
    Ok(state)
}
