// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! A switch seen through its configuration endpoint: observing it loads its
//! configuration, reconciling it enforces a desired [`Spec`] and applies the result.

use gnmi::ConfigEndpoint;
use rekon::{Observe, Reconcile};
use spec::Spec;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::apply::{ApplyError, ApplyOptions, ApplyReport, apply};
use crate::enforce::{EnforcerError, enforce};
use crate::load::{LoaderError, LoaderOptions, load};

#[derive(Debug, Error)]
pub enum ReconcileError {
    #[error("Failed to compute actions: {0}")]
    Enforcer(#[from] EnforcerError),
    #[error(transparent)]
    Apply(#[from] ApplyError),
}

pub struct SonicSwitch<'e, E: ConfigEndpoint + ?Sized> {
    endpoint: &'e E,
    loader: LoaderOptions,
    apply: ApplyOptions,
    cancel: CancellationToken,
}

impl<'e, E: ConfigEndpoint + ?Sized> SonicSwitch<'e, E> {
    pub fn new(endpoint: &'e E, loader: LoaderOptions, apply: ApplyOptions) -> Self {
        Self {
            endpoint,
            loader,
            apply,
            cancel: CancellationToken::new(),
        }
    }
    /// Stop reconciliations on `cancel`
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
    #[must_use]
    pub fn endpoint(&self) -> &'e E {
        self.endpoint
    }
}

impl<E: ConfigEndpoint + ?Sized> Observe for SonicSwitch<'_, E> {
    type Observation<'a>
        = Result<Spec, LoaderError>
    where
        Self: 'a;

    async fn observe<'a>(&'a self) -> Self::Observation<'a>
    where
        Self: 'a,
    {
        load(self.endpoint, &self.loader, &self.cancel).await
    }
}

impl<E: ConfigEndpoint + ?Sized> Reconcile for SonicSwitch<'_, E> {
    type Requirement<'a>
        = &'a Spec
    where
        Self: 'a;
    type Observation<'a>
        = &'a Spec
    where
        Self: 'a;
    type Outcome<'a>
        = Result<ApplyReport, ReconcileError>
    where
        Self: 'a;

    async fn reconcile<'a>(
        &'a self,
        requirement: &'a Spec,
        observation: &'a Spec,
    ) -> Self::Outcome<'a>
    where
        Self: 'a,
    {
        let queue = enforce(observation, requirement)?;
        if queue.is_empty() {
            debug!("Switch is in sync");
            return Ok(ApplyReport::default());
        }
        Ok(apply(self.endpoint, queue, &self.apply, &self.cancel).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gnmi::MemoryEndpoint;
    use pretty_assertions::assert_eq;
    use spec::{
        DEFAULT_VRF, SpecInterface, SpecInterfaceIp, SpecLldp, SpecNtp, SpecPortBreakout,
        SpecUser, SpecVrf, SpecVrfBgp, SpecVrfBgpIpv4Unicast, SpecVrfBgpNeighbor,
        SpecVrfInterface, SpecVrfTableConnection, SpecVxlanTunnel, SpecVxlanTunnelMap,
    };
    use tracing_test::traced_test;

    fn desired() -> Spec {
        let mut spec = Spec {
            hostname: Some("leaf-01".to_owned()),
            ztp: Some(false),
            ..Default::default()
        };
        spec.users.insert(
            "admin".to_owned(),
            SpecUser {
                password: Some("$5$salt$hash".to_owned()),
                role: Some("admin".to_owned()),
                authorized_keys: vec!["ssh-ed25519 AAAA".to_owned()],
            },
        );
        spec.port_breakouts.insert(
            "Ethernet0".to_owned(),
            SpecPortBreakout {
                mode: Some("1x100G".to_owned()),
            },
        );
        spec.lldp = Some(SpecLldp {
            enabled: Some(true),
            hello_timer: Some(5),
            system_name: Some("leaf-01".to_owned()),
            system_description: None,
        });
        spec.ntp = Some(SpecNtp {
            source_interface: vec!["Loopback0".to_owned()],
        });
        spec.interfaces.insert(
            "Loopback0".to_owned(),
            SpecInterface {
                enabled: Some(true),
                ips: [("10.0.0.1".to_owned(), SpecInterfaceIp { prefix_len: Some(32) })].into(),
                ..Default::default()
            },
        );
        spec.interfaces.insert(
            "Ethernet4".to_owned(),
            SpecInterface {
                description: Some("fabric spine-01/Ethernet0".to_owned()),
                enabled: Some(true),
                ips: [("172.30.0.1".to_owned(), SpecInterfaceIp { prefix_len: Some(31) })].into(),
                ..Default::default()
            },
        );
        spec.interfaces.insert(
            "Vlan1000".to_owned(),
            SpecInterface {
                enabled: Some(true),
                vlan_anycast_gateway: vec!["10.0.1.1/24".to_owned()],
                ..Default::default()
            },
        );
        spec.vxlan_tunnels.insert(
            "vtepfabric".to_owned(),
            SpecVxlanTunnel {
                source_ip: Some("10.0.2.1".to_owned()),
                ..Default::default()
            },
        );
        spec.vxlan_tunnel_maps.insert(
            "map_100_Vlan1000".to_owned(),
            SpecVxlanTunnelMap {
                vtep: Some("vtepfabric".to_owned()),
                vni: Some(100),
                vlan: Some("Vlan1000".to_owned()),
            },
        );
        spec.vrfs.insert(
            DEFAULT_VRF.to_owned(),
            SpecVrf {
                enabled: Some(true),
                bgp: Some(SpecVrfBgp {
                    asn: Some(65101),
                    router_id: Some("10.0.0.2".to_owned()),
                    ipv4_unicast: SpecVrfBgpIpv4Unicast {
                        enabled: true,
                        max_paths: Some(64),
                        ..Default::default()
                    },
                    neighbors: [(
                        "172.30.0.0".to_owned(),
                        SpecVrfBgpNeighbor {
                            enabled: Some(true),
                            remote_as: Some(65100),
                            ipv4_unicast: Some(true),
                            bfd_profile: Some("fabric".to_owned()),
                            ..Default::default()
                        },
                    )]
                    .into(),
                    ..Default::default()
                }),
                table_connections: [(
                    "DIRECTLY_CONNECTED".to_owned(),
                    SpecVrfTableConnection::default(),
                )]
                .into(),
                ..Default::default()
            },
        );
        spec.vrfs.insert(
            "VrfVvpc-1".to_owned(),
            SpecVrf {
                enabled: Some(true),
                interfaces: [("Vlan1000".to_owned(), SpecVrfInterface {})].into(),
                ..Default::default()
            },
        );
        spec.normalized()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_converges_in_one_cycle() {
        let endpoint = MemoryEndpoint::new();
        let switch = SonicSwitch::new(&endpoint, LoaderOptions::default(), ApplyOptions::default());
        let desired = desired();

        let actual = switch.observe().await.unwrap();
        let report = switch.reconcile(&desired, &actual).await.unwrap();
        assert!(!report.applied.is_empty());
        assert!(report.warnings.is_empty());

        let actual = switch.observe().await.unwrap();
        assert_eq!(actual, desired);
        let queue = enforce(&actual, &desired).unwrap();
        assert!(queue.is_empty(), "{:?}", queue.actions());

        endpoint.clear_history();
        let report = switch.reconcile(&desired, &actual).await.unwrap();
        assert_eq!(report, ApplyReport::default());
        assert!(endpoint.history().is_empty());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_removal_converges() {
        let endpoint = MemoryEndpoint::new();
        let switch = SonicSwitch::new(&endpoint, LoaderOptions::default(), ApplyOptions::default());
        let first = desired();
        let actual = switch.observe().await.unwrap();
        switch.reconcile(&first, &actual).await.unwrap();

        let mut second = first.clone();
        second.vrfs.remove("VrfVvpc-1");
        second.vxlan_tunnel_maps.clear();
        second.interfaces.remove("Vlan1000");
        second.interfaces.remove("Ethernet4");

        let actual = switch.observe().await.unwrap();
        switch.reconcile(&second, &actual).await.unwrap();
        let actual = switch.observe().await.unwrap();

        assert!(!actual.vrfs.contains_key("VrfVvpc-1"));
        assert!(!actual.interfaces.contains_key("Vlan1000"));
        /* the physical port is disabled rather than removed, which the loader skips */
        assert!(!actual.interfaces.contains_key("Ethernet4"));
        assert!(enforce(&actual, &second).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_reconcile() {
        let endpoint = MemoryEndpoint::new();
        let cancel = CancellationToken::new();
        let switch = SonicSwitch::new(&endpoint, LoaderOptions::default(), ApplyOptions::default())
            .with_cancel(cancel.clone());
        let actual = switch.observe().await.unwrap();
        cancel.cancel();

        let err = switch.reconcile(&desired(), &actual).await.unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::Apply(ApplyError { ref applied, .. }) if applied.is_empty()
        ));
        assert!(matches!(switch.observe().await, Err(LoaderError::Cancelled)));
        assert!(endpoint.history().is_empty());
    }
}
