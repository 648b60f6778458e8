// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Read the configuration of a switch back into a [`Spec`].
//!
//! Loading is the exact inverse of what the enforcer writes: the enforcer applied to the
//! desired spec and to what the loader reads after applying it finds nothing to do.
//! Whatever the switch holds outside of what the agent manages is left out: the agent
//! user, physical ports the agent disabled, port groups at their default speed and
//! interfaces or VRFs outside the managed name-spaces.

mod interfaces;
mod nat;
mod overlay;
mod policy;
mod system;
mod vrfs;

pub(crate) use vrfs::is_managed_vrf;

use gnmi::{ConfigEndpoint, EndpointError, Path, get_or_default};
use serde::de::DeserializeOwned;
use spec::Spec;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::schema::{interfaces as sif, nat as snat, network, overlay as sov, policy as spol};
use crate::schema::system as ssys;

#[derive(Debug, Error)]
pub enum LoaderError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("Unexpected structure at {path}: {reason}")]
    Structure { path: String, reason: String },
    #[error("No response for {0} after {1:?}")]
    Timeout(String, Duration),
    #[error("Cancelled")]
    Cancelled,
}

impl LoaderError {
    pub(crate) fn structure(path: impl Into<String>, reason: impl Into<String>) -> Self {
        LoaderError::Structure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct LoaderOptions {
    /// The user the agent logs in as, which is never part of a spec
    pub agent_user: String,
    /// bound on every request to the endpoint
    pub timeout: Duration,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self {
            agent_user: "agent".to_owned(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Reads subtrees of one switch, each bounded by a timeout and abandoned on cancellation
pub(crate) struct Reader<'a, E: ConfigEndpoint + ?Sized> {
    endpoint: &'a E,
    timeout: Duration,
    cancel: &'a CancellationToken,
}

impl<'a, E: ConfigEndpoint + ?Sized> Reader<'a, E> {
    pub(crate) fn new(
        endpoint: &'a E,
        options: &LoaderOptions,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            endpoint,
            timeout: options.timeout,
            cancel,
        }
    }

    /// Fetch the subtree at `path`, missing subtrees reading as default
    pub(crate) async fn fetch<T>(&self, path: &str) -> Result<T, LoaderError>
    where
        T: DeserializeOwned + Default,
    {
        let parsed = Path::from_str(path)?;
        let request = tokio::time::timeout(self.timeout, get_or_default(self.endpoint, &parsed));
        let result = tokio::select! {
            biased;
            () = self.cancel.cancelled() => return Err(LoaderError::Cancelled),
            result = request => {
                result.map_err(|_| LoaderError::Timeout(path.to_owned(), self.timeout))?
            }
        };
        match result {
            Ok(value) => Ok(value),
            Err(EndpointError::Decode(path, reason)) => {
                Err(LoaderError::Structure { path, reason })
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Parse a list key into a number
pub(crate) fn parse_key<T: FromStr>(template: &str, key: &str) -> Result<T, LoaderError> {
    key.parse().map_err(|_| {
        LoaderError::structure(
            crate::schema::expand_path(template, key),
            format!("invalid key '{key}'"),
        )
    })
}

/// Read the whole configuration the agent manages from `endpoint`. The result is
/// normalized. `cancel` abandons the read at the next request.
pub async fn load<E>(
    endpoint: &E,
    options: &LoaderOptions,
    cancel: &CancellationToken,
) -> Result<Spec, LoaderError>
where
    E: ConfigEndpoint + ?Sized,
{
    let reader = Reader::new(endpoint, options, cancel);
    let mut spec = Spec::default();

    system::load_system(reader.fetch(ssys::SYSTEM_CONFIG).await?, &mut spec);
    system::load_ztp(reader.fetch(ssys::ZTP_CONFIG).await?, &mut spec);
    system::load_users(reader.fetch(ssys::USERS).await?, options, &mut spec);
    system::load_ntp(reader.fetch(ssys::NTP).await?, &mut spec);
    system::load_roce(reader.fetch(ssys::ECMP_ROCE_CONFIG).await?, &mut spec);
    system::load_port_groups(reader.fetch(ssys::PORT_GROUPS).await?, &mut spec);
    system::load_breakouts(reader.fetch(ssys::BREAKOUTS).await?, &mut spec);
    system::load_lldp(reader.fetch(ssys::LLDP).await?, &mut spec);
    system::load_bfd_profiles(reader.fetch(ssys::BFD_PROFILES).await?, &mut spec);
    system::load_dhcp_relays(reader.fetch(ssys::DHCP_RELAYS).await?, &mut spec);

    interfaces::load_interfaces(reader.fetch(sif::INTERFACES).await?, &mut spec)?;

    overlay::load_vxlan(reader.fetch(sov::SONIC_VXLAN).await?, &mut spec);
    overlay::load_vrf_vnis(reader.fetch(sov::SONIC_VRF).await?, &mut spec);
    overlay::load_mclag(reader.fetch(sov::MCLAG).await?, &mut spec)?;
    overlay::load_lst(reader.fetch(sov::LST).await?, &mut spec);

    policy::load_routing_policy(reader.fetch(spol::ROUTING_POLICY).await?, &mut spec)?;
    policy::load_acl(reader.fetch(spol::ACL).await?, &mut spec)?;

    vrfs::load_vrfs(reader.fetch(network::NETWORK_INSTANCES).await?, &mut spec);

    nat::load_nat(reader.fetch(snat::NAT_INSTANCES).await?, &mut spec)?;

    spec.normalize();
    debug!(
        "Loaded {} interfaces and {} VRFs from switch",
        spec.interfaces.len(),
        spec.vrfs.len()
    );
    Ok(spec)
}
