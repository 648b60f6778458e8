// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Last observed operational state of the switch, exported as metrics

use chrono::{DateTime, Utc};
use metrics::{describe_gauge, gauge};
use parking_lot::RwLock;
use sonic::SwitchState;

pub const IF_ADMIN_UP: &str = "switch_interface_admin_up";
pub const IF_OPER_UP: &str = "switch_interface_oper_up";
pub const IF_IN_OCTETS: &str = "switch_interface_in_octets";
pub const IF_OUT_OCTETS: &str = "switch_interface_out_octets";
pub const IF_IN_PKTS: &str = "switch_interface_in_pkts";
pub const IF_OUT_PKTS: &str = "switch_interface_out_pkts";
pub const IF_IN_ERRORS: &str = "switch_interface_in_errors";
pub const IF_OUT_ERRORS: &str = "switch_interface_out_errors";
pub const BGP_ESTABLISHED: &str = "switch_bgp_neighbor_established";
pub const BGP_TRANSITIONS: &str = "switch_bgp_neighbor_established_transitions";

pub fn describe_metrics() {
    describe_gauge!(IF_ADMIN_UP, "Interface administratively up");
    describe_gauge!(IF_OPER_UP, "Interface operationally up");
    describe_gauge!(IF_IN_OCTETS, "Octets received per interface");
    describe_gauge!(IF_OUT_OCTETS, "Octets sent per interface");
    describe_gauge!(IF_IN_PKTS, "Packets received per interface");
    describe_gauge!(IF_OUT_PKTS, "Packets sent per interface");
    describe_gauge!(IF_IN_ERRORS, "Receive errors per interface");
    describe_gauge!(IF_OUT_ERRORS, "Transmit errors per interface");
    describe_gauge!(BGP_ESTABLISHED, "BGP session established");
    describe_gauge!(BGP_TRANSITIONS, "Times the BGP session got established");
}

#[derive(Default)]
struct Observed {
    state: Option<SwitchState>,
    updated: Option<DateTime<Utc>>,
}

/// Written once per cycle, read by the metrics exporter
#[derive(Default)]
pub struct SwitchStateRegistry {
    observed: RwLock<Observed>,
}

impl SwitchStateRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update(&self, state: SwitchState) {
        let mut observed = self.observed.write();
        observed.state = Some(state);
        observed.updated = Some(Utc::now());
    }

    #[must_use]
    pub fn snapshot(&self) -> Option<SwitchState> {
        self.observed.read().state.clone()
    }

    #[must_use]
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.observed.read().updated
    }

    /// Set gauges from the last observation. Returns the number of series set.
    #[allow(clippy::cast_precision_loss)]
    pub fn export_metrics(&self) -> usize {
        let observed = self.observed.read();
        let Some(state) = &observed.state else {
            return 0;
        };
        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let mut series = 0;
        for (name, status) in &state.interfaces {
            let counters = &status.counters;
            let values = [
                (IF_ADMIN_UP, flag(status.admin_up)),
                (IF_OPER_UP, flag(status.oper_up)),
                (IF_IN_OCTETS, counters.in_octets as f64),
                (IF_OUT_OCTETS, counters.out_octets as f64),
                (IF_IN_PKTS, counters.in_pkts as f64),
                (IF_OUT_PKTS, counters.out_pkts as f64),
                (IF_IN_ERRORS, counters.in_errors as f64),
                (IF_OUT_ERRORS, counters.out_errors as f64),
            ];
            for (metric, value) in values {
                gauge!(metric, "interface" => name.clone()).set(value);
                series += 1;
            }
        }
        for ((vrf, neighbor), status) in &state.bgp_neighbors {
            gauge!(BGP_ESTABLISHED, "vrf" => vrf.clone(), "neighbor" => neighbor.clone())
                .set(flag(status.is_established()));
            gauge!(BGP_TRANSITIONS, "vrf" => vrf.clone(), "neighbor" => neighbor.clone())
                .set(status.established_transitions as f64);
            series += 2;
        }
        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use sonic::state::{BgpNeighborStatus, InterfaceStatus};

    fn state() -> SwitchState {
        let mut state = SwitchState::default();
        state.interfaces.insert(
            "Ethernet0".to_owned(),
            InterfaceStatus {
                admin_up: true,
                oper_up: true,
                ..Default::default()
            },
        );
        state.bgp_neighbors.insert(
            ("default".to_owned(), "172.30.30.0".to_owned()),
            BgpNeighborStatus {
                session_state: "ESTABLISHED".to_owned(),
                established_transitions: 1,
            },
        );
        state
    }

    #[test]
    fn test_registry() {
        let registry = SwitchStateRegistry::new();
        assert!(registry.snapshot().is_none());
        assert_eq!(registry.export_metrics(), 0);

        describe_metrics();
        registry.update(state());
        assert_eq!(registry.snapshot(), Some(state()));
        assert!(registry.last_update().is_some());
        assert_eq!(registry.export_metrics(), 10);
    }
}
