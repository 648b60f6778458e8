// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use config::{Agent, AgentSettings, DhcpSubnet};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracectl::LogControl;
use tracing::{info, warn};

use crate::compat;
use crate::endpoint::EndpointFactory;
use crate::errors::AgentError;
use crate::processor::Processor;
use crate::state::describe_metrics;
use crate::store::ObjectStore;

/// Pause before watching the object store again after a broken watch
const REWATCH_DELAY: Duration = Duration::from_secs(5);

/// Start the agent of switch `name`: set up logging, detect the installed OS version,
/// log into the switch and reconcile it until `cancel` fires
pub async fn start_agent<F: EndpointFactory>(
    name: &str,
    settings: &AgentSettings,
    factory: &F,
    agents: Arc<dyn ObjectStore<Agent>>,
    subnets: Arc<dyn ObjectStore<DhcpSubnet>>,
    cancel: CancellationToken,
) -> Result<(), AgentError> {
    LogControl::init(Some(&settings.log_level))?;
    describe_metrics();
    let compat = compat::get()?;

    let processor = Processor::connect(name, settings, factory, agents, subnets)
        .await?
        .with_compat(&compat)
        .with_cancel(cancel.clone());
    info!("Agent of switch {name} started");

    while let Err(e) = processor.run().await {
        warn!("Lost the watch on agent objects: {e}");
        tokio::select! {
            () = cancel.cancelled() => break,
            () = tokio::time::sleep(REWATCH_DELAY) => {}
        }
    }
    info!("Agent of switch {name} stopped");
    Ok(())
}
