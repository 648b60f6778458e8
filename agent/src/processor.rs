// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reconciliation cycles of one switch. A cycle plans the desired configuration from the
//! Agent object, loads what the switch holds, applies the difference and reports the
//! outcome in the Agent status. Cycles never overlap.

use chrono::Utc;
use config::{Agent, AgentSettings, AgentSpec, AgentStatus, DhcpSubnet, Object};
use futures::StreamExt;
use gnmi::ConfigEndpoint;
use planner::{dhcp_subnets, plan};
use rekon::{Observe, Reconcile};
use sonic::{ApplyOptions, ApplyReport, LoaderOptions, SonicSwitch, load_state};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, interval_at};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::compat::Compat;
use crate::endpoint::EndpointFactory;
use crate::errors::{AgentError, CycleError, StoreError};
use crate::state::SwitchStateRegistry;
use crate::store::{ObjectStore, WatchEvent};
use crate::user::{AGENT_USER, ensure_agent_user};

/// Prefix of the labels of a DHCP subnet naming the switches that serve it
pub const LABEL_PUBLISHER_PREFIX: &str = "publisher.";
/// Cycles also run this long after the last one, to undo changes made behind our back
pub const RESYNC_INTERVAL: Duration = Duration::from_secs(300);

#[must_use]
pub fn publisher_label(switch: &str) -> String {
    format!("{LABEL_PUBLISHER_PREFIX}{switch}")
}

/// Switches serving `subnet`
pub fn publishers(subnet: &DhcpSubnet) -> impl Iterator<Item = &str> {
    subnet
        .meta
        .labels
        .keys()
        .filter_map(|key| key.strip_prefix(LABEL_PUBLISHER_PREFIX))
}

pub struct Processor<E: ConfigEndpoint> {
    name: String,
    endpoint: E,
    agents: Arc<dyn ObjectStore<Agent>>,
    subnets: Arc<dyn ObjectStore<DhcpSubnet>>,
    loader: LoaderOptions,
    apply: ApplyOptions,
    registry: Arc<SwitchStateRegistry>,
    nos_version: Option<String>,
    resync: Duration,
    cancel: CancellationToken,
}

impl<E: ConfigEndpoint> Processor<E> {
    /// A processor for switch `name`, reading Agent objects from `agents` and publishing
    /// DHCP subnets to `subnets`
    pub fn new(
        name: &str,
        endpoint: E,
        agents: Arc<dyn ObjectStore<Agent>>,
        subnets: Arc<dyn ObjectStore<DhcpSubnet>>,
        settings: &AgentSettings,
    ) -> Self {
        Self {
            name: name.to_owned(),
            endpoint,
            agents,
            subnets,
            loader: LoaderOptions {
                agent_user: AGENT_USER.to_owned(),
                timeout: settings.apply_timeout(),
            },
            apply: ApplyOptions {
                timeout: settings.apply_timeout(),
                ..Default::default()
            },
            registry: Arc::new(SwitchStateRegistry::new()),
            nos_version: None,
            resync: RESYNC_INTERVAL,
            cancel: CancellationToken::new(),
        }
    }

    /// Log in as the agent user, creating it first if needed, and build a processor on
    /// the resulting session
    pub async fn connect<F>(
        name: &str,
        settings: &AgentSettings,
        factory: &F,
        agents: Arc<dyn ObjectStore<Agent>>,
        subnets: Arc<dyn ObjectStore<DhcpSubnet>>,
    ) -> Result<Self, AgentError>
    where
        F: EndpointFactory<Endpoint = E>,
    {
        let credentials =
            ensure_agent_user(&settings.basedir, factory, &settings.default_credentials).await?;
        let endpoint = factory.connect(&credentials).await?;
        let capabilities = endpoint.capabilities().await?;
        info!(
            "Connected to switch {name} as {} (version {}, {} models)",
            credentials.username,
            capabilities.version,
            capabilities.models.len()
        );
        Ok(Self::new(name, endpoint, agents, subnets, settings))
    }

    #[must_use]
    pub fn with_compat(mut self, compat: &Compat) -> Self {
        self.nos_version = Some(compat.version.to_string());
        self
    }
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }
    #[must_use]
    pub fn with_resync(mut self, resync: Duration) -> Self {
        self.resync = resync;
        self
    }
    #[must_use]
    pub fn with_apply_options(mut self, apply: ApplyOptions) -> Self {
        self.apply = apply;
        self
    }
    #[must_use]
    pub fn registry(&self) -> Arc<SwitchStateRegistry> {
        self.registry.clone()
    }
    #[must_use]
    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    /// Publish the DHCP subnets of `intent` and stop serving those this switch published
    /// earlier and no longer serves. A subnet stays in the store as long as one of its
    /// publishers still serves it.
    async fn publish_subnets(&self, intent: &AgentSpec) -> Result<(), CycleError> {
        let label = publisher_label(&self.name);
        let mut wanted: BTreeMap<String, DhcpSubnet> = dhcp_subnets(intent)?
            .into_iter()
            .map(|subnet| (subnet.name().to_owned(), subnet))
            .collect();

        for mut current in self.subnets.list().await? {
            let ours = current.meta.labels.contains_key(&label);
            match wanted.remove(current.name()) {
                Some(subnet) if ours && subnet.spec == current.spec => {}
                Some(mut subnet) => {
                    /* served by both switches of an MCLAG pair */
                    subnet.meta.labels = std::mem::take(&mut current.meta.labels);
                    subnet.meta.labels.insert(label.clone(), self.name.clone());
                    info!("Published DHCP subnet {}", subnet.name());
                    self.subnets.upsert(subnet).await?;
                }
                None if ours => {
                    current.meta.labels.remove(&label);
                    if publishers(&current).next().is_some() {
                        info!("Stopped serving DHCP subnet {}", current.name());
                        self.subnets.upsert(current).await?;
                    } else {
                        info!("Withdrew DHCP subnet {}", current.name());
                        self.subnets.delete(current.name()).await?;
                    }
                }
                None => {}
            }
        }
        for (name, mut subnet) in wanted {
            subnet.meta.labels.insert(label.clone(), self.name.clone());
            self.subnets.upsert(subnet).await?;
            info!("Published DHCP subnet {name}");
        }
        Ok(())
    }

    /// One reconciliation cycle: plan, observe, reconcile, then record operational state
    /// and publish DHCP subnets
    pub async fn cycle(&self, agent: &Agent) -> Result<ApplyReport, CycleError> {
        let desired = plan(&agent.spec)?;
        let switch = SonicSwitch::new(&self.endpoint, self.loader.clone(), self.apply.clone())
            .with_cancel(self.cancel.clone());
        let actual = switch.observe().await?;
        let report = switch.reconcile(&desired, &actual).await?;

        match load_state(&self.endpoint, &self.loader, &self.cancel).await {
            Ok(state) => self.registry.update(state),
            Err(e) => warn!("Failed to load operational state: {e}"),
        }
        self.publish_subnets(&agent.spec).await?;
        Ok(report)
    }

    fn status(&self, agent: &Agent, outcome: &Result<ApplyReport, CycleError>) -> AgentStatus {
        let now = Utc::now();
        let mut status = AgentStatus {
            last_attempt_time: Some(now),
            nos_version: self.nos_version.clone(),
            ..agent.status.clone()
        };
        match outcome {
            Ok(report) => {
                status.last_applied_generation = agent.generation();
                status.last_applied_time = Some(now);
                status.applied_actions = report.applied.len();
                status.warnings.clone_from(&report.warnings);
                status.error = None;
            }
            Err(e) => {
                status.applied_actions = e.applied();
                status.warnings.clear();
                status.error = Some(e.to_string());
            }
        }
        status
    }

    /// Run a cycle for `agent` and write its outcome to the Agent status
    #[instrument(
        level = "debug",
        skip_all,
        fields(agent = agent.name(), generation = agent.generation())
    )]
    pub async fn process(&self, agent: &Agent) -> Result<AgentStatus, StoreError> {
        let outcome = self.cycle(agent).await;
        match &outcome {
            Ok(report) if report.applied.is_empty() => debug!("Switch {} is in sync", self.name),
            Ok(report) => info!(
                "Applied {} actions to switch {} ({} warnings)",
                report.applied.len(),
                self.name,
                report.warnings.len()
            ),
            Err(e) => error!("Reconciliation of switch {} failed: {e}", self.name),
        }
        let status = self.status(agent, &outcome);
        self.agents.update_status(agent.name(), status.clone()).await?;
        Ok(status)
    }

    async fn process_current(&self) -> Result<Option<i64>, StoreError> {
        let Some(agent) = self.agents.get(&self.name).await? else {
            debug!("No agent object for switch {}", self.name);
            return Ok(None);
        };
        self.process(&agent).await?;
        Ok(Some(agent.generation()))
    }

    /// Reconcile on every new generation of the Agent object and periodically, until
    /// cancelled. A broken watch ends the loop with an error; the caller reconnects.
    pub async fn run(&self) -> Result<(), StoreError> {
        let mut events = self.agents.watch().await?;
        let mut processed = self.process_current().await?;
        let mut resync = interval_at(Instant::now() + self.resync, self.resync);

        loop {
            tokio::select! {
                () = self.cancel.cancelled() => {
                    info!("Stopping reconciliation of switch {}", self.name);
                    return Ok(());
                }
                _ = resync.tick() => {
                    processed = self.process_current().await?;
                }
                event = events.next() => match event {
                    Some(WatchEvent::Added(agent) | WatchEvent::Modified(agent)) => {
                        /* status updates come back as modifications of the same generation */
                        if agent.name() == self.name && processed != Some(agent.generation()) {
                            self.process(&agent).await?;
                            processed = Some(agent.generation());
                            resync.reset();
                        }
                    }
                    Some(WatchEvent::Deleted(agent)) => {
                        if agent.name() == self.name {
                            warn!("Agent object of switch {} was deleted", self.name);
                            processed = None;
                        }
                    }
                    Some(WatchEvent::Bookmark) => {}
                    Some(WatchEvent::Error(reason)) => return Err(StoreError::Watch(reason)),
                    None => return Err(StoreError::WatchClosed),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::MemoryEndpointFactory;
    use crate::store::MemoryStore;
    use config::{Credentials, ObjectMeta};
    use gnmi::{EndpointError, MemoryEndpoint, Path};
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use test_utils::leaf_intent;
    use tracing_test::traced_test;

    struct Fixture {
        agents: Arc<MemoryStore<Agent>>,
        subnets: Arc<MemoryStore<DhcpSubnet>>,
        processor: Processor<Arc<MemoryEndpoint>>,
    }

    fn fixture() -> Fixture {
        let agents: Arc<MemoryStore<Agent>> = Arc::new(MemoryStore::new());
        let subnets: Arc<MemoryStore<DhcpSubnet>> = Arc::new(MemoryStore::new());
        let processor = Processor::new(
            "leaf-1",
            Arc::new(MemoryEndpoint::new()),
            agents.clone(),
            subnets.clone(),
            &AgentSettings::default(),
        );
        Fixture {
            agents,
            subnets,
            processor,
        }
    }

    fn agent(generation: i64, spec: AgentSpec) -> Agent {
        Agent::new(ObjectMeta::new("leaf-1").with_generation(generation), spec)
    }

    async fn stored_status(fixture: &Fixture) -> AgentStatus {
        fixture.agents.get("leaf-1").await.unwrap().unwrap().status
    }

    #[tokio::test]
    #[traced_test]
    async fn test_cycle_converges() {
        let f = fixture();
        let leaf = agent(1, leaf_intent());
        f.agents.upsert(leaf.clone()).await.unwrap();

        let status = f.processor.process(&leaf).await.unwrap();
        assert_eq!(status.error, None);
        assert!(status.applied_actions > 0);
        assert_eq!(status.last_applied_generation, 1);
        assert!(status.last_applied_time.is_some());
        assert_eq!(stored_status(&f).await, status);
        assert!(f.processor.registry().snapshot().is_some());

        let subnets = f.subnets.list().await.unwrap();
        assert_eq!(subnets.len(), 1);
        assert_eq!(subnets[0].name(), "v1--s1");
        assert_eq!(publishers(&subnets[0]).collect::<Vec<_>>(), vec!["leaf-1"]);

        /* nothing left to do on the next cycle */
        f.processor.endpoint().clear_history();
        let status = f.processor.process(&leaf).await.unwrap();
        assert_eq!(status.error, None);
        assert_eq!(status.applied_actions, 0);
        assert!(f.processor.endpoint().history().is_empty());
        assert!(logs_contain("is in sync"));
    }

    #[tokio::test]
    async fn test_plan_error_in_status() {
        let f = fixture();
        let mut spec = leaf_intent();
        spec.protocol_ip = None;
        let leaf = agent(3, spec);
        f.agents.upsert(leaf.clone()).await.unwrap();

        let status = f.processor.process(&leaf).await.unwrap();
        assert!(status.error.unwrap().contains("protocolIP"));
        assert_eq!(status.applied_actions, 0);
        assert_eq!(status.last_applied_generation, 0);
        assert!(status.last_attempt_time.is_some());
        assert!(f.processor.endpoint().history().is_empty());
        assert!(f.subnets.is_empty());
    }

    #[tokio::test]
    async fn test_cancelled_cycle_touches_nothing() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let processor = f.processor.with_cancel(cancel.clone());
        let leaf = agent(1, leaf_intent());
        f.agents.upsert(leaf.clone()).await.unwrap();
        cancel.cancel();

        let err = processor.cycle(&leaf).await.unwrap_err();
        assert!(matches!(err, CycleError::Load(sonic::LoaderError::Cancelled)));
        let status = processor.process(&leaf).await.unwrap();
        assert_eq!(status.error.as_deref(), Some(err.to_string().as_str()));
        assert_eq!(status.last_applied_generation, 0);
        assert!(processor.endpoint().history().is_empty());
        assert!(f.subnets.is_empty());
    }

    #[tokio::test]
    async fn test_apply_failure_keeps_last_applied() {
        let f = fixture();
        let leaf = agent(1, leaf_intent());
        f.agents.upsert(leaf.clone()).await.unwrap();
        f.processor.process(&leaf).await.unwrap();

        let mut spec = leaf_intent();
        spec.ntp_servers.push("10.0.0.101".to_owned());
        f.agents.upsert(agent(2, spec)).await.unwrap();
        let updated = f.agents.get("leaf-1").await.unwrap().unwrap();
        f.processor.endpoint().inject_failure(
            Path::from_str("/openconfig-system:system").unwrap(),
            EndpointError::Rejected("/openconfig-system:system".to_owned(), "busy".to_owned()),
        );

        let status = f.processor.process(&updated).await.unwrap();
        assert!(status.error.is_some());
        assert_eq!(status.last_applied_generation, 1);
        assert_eq!(stored_status(&f).await, status);

        f.processor.endpoint().clear_failures();
        let status = f.processor.process(&updated).await.unwrap();
        assert_eq!(status.error, None);
        assert_eq!(status.last_applied_generation, 2);
    }

    #[tokio::test]
    async fn test_withdraw_dhcp_subnet() {
        let f = fixture();
        let leaf = agent(1, leaf_intent());
        f.agents.upsert(leaf.clone()).await.unwrap();
        f.processor.process(&leaf).await.unwrap();
        assert_eq!(f.subnets.len(), 1);

        f.processor.process(&agent(2, without_dhcp())).await.unwrap();
        assert!(f.subnets.is_empty());
    }

    fn without_dhcp() -> AgentSpec {
        let mut spec = leaf_intent();
        for subnet in spec.vpcs.values_mut().flat_map(|vpc| vpc.subnets.values_mut()) {
            subnet.dhcp.enable = false;
        }
        spec
    }

    #[tokio::test]
    #[traced_test]
    async fn test_subnet_shared_by_mclag_pair() {
        let f = fixture();
        let peer = Processor::new(
            "leaf-2",
            Arc::new(MemoryEndpoint::new()),
            f.agents.clone(),
            f.subnets.clone(),
            &AgentSettings::default(),
        );
        let first = agent(1, leaf_intent());
        let second = Agent::new(ObjectMeta::new("leaf-2").with_generation(1), leaf_intent());
        f.agents.upsert(first.clone()).await.unwrap();
        f.agents.upsert(second.clone()).await.unwrap();

        f.processor.process(&first).await.unwrap();
        peer.process(&second).await.unwrap();
        let subnet = f.subnets.get("v1--s1").await.unwrap().unwrap();
        assert_eq!(publishers(&subnet).collect::<Vec<_>>(), vec!["leaf-1", "leaf-2"]);

        /* the first publisher stops serving, its peer still does */
        f.processor.process(&agent(2, without_dhcp())).await.unwrap();
        let subnet = f.subnets.get("v1--s1").await.unwrap().unwrap();
        assert_eq!(publishers(&subnet).collect::<Vec<_>>(), vec!["leaf-2"]);
        assert!(logs_contain("Stopped serving DHCP subnet v1--s1"));

        let second = Agent::new(ObjectMeta::new("leaf-2").with_generation(2), without_dhcp());
        peer.process(&second).await.unwrap();
        assert!(f.subnets.is_empty());
    }

    #[tokio::test]
    async fn test_foreign_subnet_kept() {
        let f = fixture();
        let foreign = DhcpSubnet {
            meta: ObjectMeta {
                labels: [(publisher_label("leaf-2"), "leaf-2".to_owned())].into(),
                ..ObjectMeta::new("v2--s1")
            },
            ..Default::default()
        };
        f.subnets.upsert(foreign).await.unwrap();

        let leaf = agent(1, leaf_intent());
        f.agents.upsert(leaf.clone()).await.unwrap();
        f.processor.process(&leaf).await.unwrap();
        let names: Vec<String> = f
            .subnets
            .list()
            .await
            .unwrap()
            .iter()
            .map(|s| s.name().to_owned())
            .collect();
        assert_eq!(names, vec!["v1--s1".to_owned(), "v2--s1".to_owned()]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_run_until_cancelled() {
        let f = fixture();
        let cancel = CancellationToken::new();
        let processor = f.processor.with_cancel(cancel.clone());
        let agents = f.agents.clone();

        let driver = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            agents.upsert(agent(1, leaf_intent())).await.unwrap();
            for _ in 0..200 {
                let status = agents.get("leaf-1").await.unwrap().unwrap().status;
                if status.last_applied_generation == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
            cancel.cancel();
        };
        let (result, ()) = tokio::join!(processor.run(), driver);
        assert_eq!(result, Ok(()));

        let status = f.agents.get("leaf-1").await.unwrap().unwrap().status;
        assert_eq!(status.last_applied_generation, 1);
        assert!(logs_contain("Stopping reconciliation of switch leaf-1"));
    }

    #[tokio::test]
    async fn test_broken_watch() {
        let f = fixture();
        let agents = f.agents.clone();
        let driver = async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            agents.fail_watches("connection reset");
        };
        let (result, ()) = tokio::join!(f.processor.run(), driver);
        assert_eq!(result, Err(StoreError::Watch("connection reset".to_owned())));
    }

    #[tokio::test]
    async fn test_connect_bootstraps_agent_user() {
        let dir = tempfile::tempdir().unwrap();
        let admin = Credentials::new("admin", "YourPaSsWoRd");
        let settings = AgentSettings {
            basedir: dir.path().to_path_buf(),
            default_credentials: vec![admin.clone()],
            ..Default::default()
        };
        let factory = MemoryEndpointFactory::new(Arc::new(MemoryEndpoint::new())).accepting(admin);
        let processor = Processor::connect(
            "leaf-1",
            &settings,
            &factory,
            Arc::new(MemoryStore::<Agent>::new()),
            Arc::new(MemoryStore::<DhcpSubnet>::new()),
        )
        .await
        .unwrap()
        .with_compat(&Compat::default());
        assert_eq!(processor.nos_version.as_deref(), Some("0.0.0"));
        assert!(settings.passwd_file().exists());
    }
}
