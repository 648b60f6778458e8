// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Execute the actions of an [`ActionQueue`] against a switch, in weight order, one
//! set request per action.

use gnmi::{ConfigEndpoint, EndpointError, Path, SetOp, get_as};
use serde_json::json;
use std::future::Future;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::enforce::{Action, ActionKind, ActionQueue, CustomAction};
use crate::schema::system::{BREAKOUT_COMPLETED, BreakoutEntry};

#[derive(Debug, Error)]
pub enum ActionError {
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
    #[error("Cancelled")]
    Cancelled,
    #[error("No response after {0:?}")]
    Timeout(Duration),
    #[error("Action has no payload")]
    MissingPayload,
    #[error("Custom action has no procedure")]
    MissingProcedure,
    #[error("Port {0} did not reach breakout mode {1}")]
    BreakoutNotReady(String, String),
}

/// An action failed and stopped the application. Actions before it were applied.
#[derive(Debug, Error)]
#[error("Failed to apply action #{failed} ({summary}): {source}")]
pub struct ApplyError {
    /// summaries of the actions applied before the failure
    pub applied: Vec<String>,
    /// index of the failed action, in application order
    pub failed: usize,
    pub summary: String,
    pub source: ActionError,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub applied: Vec<String>,
    /// failures of actions that tolerate them
    pub warnings: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ApplyOptions {
    /// bound on every request to the endpoint
    pub timeout: Duration,
    pub breakout_poll_interval: Duration,
    pub breakout_poll_retries: u32,
}

impl Default for ApplyOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            breakout_poll_interval: Duration::from_secs(2),
            breakout_poll_retries: 60,
        }
    }
}

async fn bounded<T, F>(timeout: Duration, request: F) -> Result<T, ActionError>
where
    F: Future<Output = Result<T, EndpointError>>,
{
    tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| ActionError::Timeout(timeout))?
        .map_err(ActionError::from)
}

async fn set<E>(endpoint: &E, op: SetOp, timeout: Duration) -> Result<(), ActionError>
where
    E: ConfigEndpoint + ?Sized,
{
    bounded(timeout, endpoint.set(vec![op])).await
}

/// Set the breakout mode of a port, then wait for the switch to report it done
async fn port_breakout<E>(
    endpoint: &E,
    path: Path,
    port: &str,
    mode: &str,
    options: &ApplyOptions,
) -> Result<(), ActionError>
where
    E: ConfigEndpoint + ?Sized,
{
    set(
        endpoint,
        SetOp::update(path.clone(), json!({ "brkout_mode": mode })),
        options.timeout,
    )
    .await?;

    for attempt in 0..=options.breakout_poll_retries {
        match bounded(options.timeout, get_as::<BreakoutEntry, E>(endpoint, &path)).await {
            Ok(entry)
                if entry.brkout_mode.as_deref() == Some(mode)
                    && entry.status.as_deref().is_none_or(|s| s == BREAKOUT_COMPLETED) =>
            {
                debug!("Port {port} is in breakout mode {mode}");
                return Ok(());
            }
            Ok(entry) => debug!(
                "Port {port} breakout pending (attempt {attempt}): mode={:?} status={:?}",
                entry.brkout_mode, entry.status
            ),
            Err(ActionError::Endpoint(e)) if e.is_not_found() || e.is_transient() => {
                debug!("Port {port} breakout state unavailable (attempt {attempt}): {e}");
            }
            Err(e) => return Err(e),
        }
        tokio::time::sleep(options.breakout_poll_interval).await;
    }
    Err(ActionError::BreakoutNotReady(
        port.to_owned(),
        mode.to_owned(),
    ))
}

async fn run_action<E>(
    endpoint: &E,
    action: &Action,
    options: &ApplyOptions,
) -> Result<(), ActionError>
where
    E: ConfigEndpoint + ?Sized,
{
    let path = Path::from_str(&action.path)?;
    let payload = || action.value.clone().ok_or(ActionError::MissingPayload);
    match action.kind {
        ActionKind::Update => {
            set(endpoint, SetOp::update(path, payload()?), options.timeout).await
        }
        ActionKind::Replace => {
            set(endpoint, SetOp::replace(path, payload()?), options.timeout).await
        }
        ActionKind::Delete => set(endpoint, SetOp::delete(path), options.timeout).await,
        ActionKind::Custom => match &action.custom {
            Some(CustomAction::PortBreakout { port, mode }) => {
                port_breakout(endpoint, path, port, mode, options).await
            }
            None => Err(ActionError::MissingProcedure),
        },
    }
}

/// Apply the actions of `queue` in weight order. The first failure of an action not
/// flagged `warning_on_error` stops the application; `cancel` is checked before every
/// action.
pub async fn apply<E>(
    endpoint: &E,
    queue: ActionQueue,
    options: &ApplyOptions,
    cancel: &CancellationToken,
) -> Result<ApplyReport, ApplyError>
where
    E: ConfigEndpoint + ?Sized,
{
    let mut report = ApplyReport::default();
    for (index, action) in queue.into_sorted().into_iter().enumerate() {
        let result = if cancel.is_cancelled() {
            Err(ActionError::Cancelled)
        } else {
            run_action(endpoint, &action, options).await
        };
        match result {
            Ok(()) => {
                debug!("Applied {action}");
                report.applied.push(action.summary);
            }
            Err(e) if action.warning_on_error && !matches!(e, ActionError::Cancelled) => {
                warn!("Failed to apply {action}: {e}");
                report.warnings.push(format!("{}: {e}", action.summary));
            }
            Err(source) => {
                error!("Failed to apply {action}: {source}");
                return Err(ApplyError {
                    applied: report.applied,
                    failed: index,
                    summary: action.summary,
                    source,
                });
            }
        }
    }
    if !report.applied.is_empty() || !report.warnings.is_empty() {
        info!(
            "Applied {} actions, {} warnings",
            report.applied.len(),
            report.warnings.len()
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enforce::ActionWeight;
    use gnmi::{MemoryEndpoint, SetKind};
    use pretty_assertions::assert_eq;
    use serde_json::Value;
    use tracing_test::traced_test;

    fn action(
        weight: ActionWeight,
        summary: &str,
        kind: ActionKind,
        path: &str,
        value: Option<Value>,
    ) -> Action {
        Action {
            weight,
            summary: summary.to_owned(),
            kind,
            path: path.to_owned(),
            value,
            custom: None,
            warning_on_error: false,
        }
    }

    const HOSTNAME: &str = "/openconfig-system:system/config/hostname";
    const VLAN: &str = "/openconfig-interfaces:interfaces/interface[name=Vlan1000]/config";
    const LLDP: &str = "/openconfig-lldp:lldp/config";

    fn hostname() -> Action {
        action(
            ActionWeight::HostnameUpdate,
            "Create hostname",
            ActionKind::Update,
            HOSTNAME,
            Some(json!("leaf-01")),
        )
    }

    fn vlan() -> Action {
        action(
            ActionWeight::InterfaceBaseUpdate,
            "Create interface Vlan1000",
            ActionKind::Update,
            VLAN,
            Some(json!({"enabled": true})),
        )
    }

    fn lldp() -> Action {
        action(
            ActionWeight::LldpInterfaceUpdate,
            "Create LLDP",
            ActionKind::Update,
            LLDP,
            Some(json!({"enabled": true})),
        )
    }

    #[tokio::test]
    #[traced_test]
    async fn test_weight_order() {
        let endpoint = MemoryEndpoint::new();
        let mut queue = ActionQueue::new();
        queue.add(vlan()).unwrap();
        queue.add(hostname()).unwrap();

        let report = apply(&endpoint, queue, &ApplyOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["Create hostname", "Create interface Vlan1000"]);
        let paths: Vec<String> = endpoint.history().iter().map(|op| op.path.to_string()).collect();
        assert_eq!(paths, vec![HOSTNAME, VLAN]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_failure_stops_application() {
        let endpoint = MemoryEndpoint::new();
        endpoint.inject_failure(
            Path::from_str("/openconfig-interfaces:interfaces").unwrap(),
            EndpointError::Rejected(VLAN.to_owned(), "no such VLAN".to_owned()),
        );
        let mut queue = ActionQueue::new();
        queue.add(hostname()).unwrap();
        queue.add(vlan()).unwrap();
        queue.add(lldp()).unwrap();

        let err = apply(&endpoint, queue, &ApplyOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.applied, vec!["Create hostname"]);
        assert_eq!(err.failed, 1);
        assert_eq!(err.summary, "Create interface Vlan1000");
        assert!(matches!(err.source, ActionError::Endpoint(EndpointError::Rejected(..))));
        assert_eq!(endpoint.history().len(), 1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_tolerated_failure_is_a_warning() {
        let endpoint = MemoryEndpoint::new();
        endpoint.inject_failure(
            Path::from_str("/openconfig-interfaces:interfaces").unwrap(),
            EndpointError::Rejected(VLAN.to_owned(), "busy".to_owned()),
        );
        let mut queue = ActionQueue::new();
        let mut tolerated = vlan();
        tolerated.warning_on_error = true;
        queue.add(tolerated).unwrap();
        queue.add(lldp()).unwrap();

        let report = apply(&endpoint, queue, &ApplyOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.applied, vec!["Create LLDP"]);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Create interface Vlan1000: "));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unsupported_roce_is_a_warning() {
        let endpoint = MemoryEndpoint::new();
        endpoint.inject_failure(
            Path::from_str("/openconfig-loadshare-mode-ext:loadshare").unwrap(),
            EndpointError::Rejected("roce-attrs".to_owned(), "not supported".to_owned()),
        );
        let desired = spec::Spec {
            hostname: Some("leaf-01".to_owned()),
            ecmp_roce_qpn: Some(true),
            ..Default::default()
        };
        let queue = crate::enforce::enforce(&spec::Spec::default(), &desired).unwrap();
        assert_eq!(queue.len(), 2);

        let report = apply(&endpoint, queue, &ApplyOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(report.applied.len(), 1);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].starts_with("Create ECMP RoCE QPN hashing: "));
        assert!(logs_contain("Failed to apply"));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_action() {
        let endpoint = MemoryEndpoint::new();
        let mut queue = ActionQueue::new();
        queue.add(hostname()).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = apply(&endpoint, queue, &ApplyOptions::default(), &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err.source, ActionError::Cancelled));
        assert!(err.applied.is_empty());
        assert!(endpoint.history().is_empty());
    }

    #[tokio::test]
    async fn test_missing_payload() {
        let endpoint = MemoryEndpoint::new();
        let mut queue = ActionQueue::new();
        let mut replace = hostname();
        replace.kind = ActionKind::Replace;
        replace.value = None;
        queue.add(replace).unwrap();
        let err = apply(&endpoint, queue, &ApplyOptions::default(), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err.source, ActionError::MissingPayload));
    }

    const BREAKOUT: &str =
        "/sonic-port-breakout:sonic-port-breakout/BREAKOUT_CFG/BREAKOUT_CFG_LIST[port=Ethernet0]";

    fn breakout(mode: &str) -> Action {
        Action {
            custom: Some(CustomAction::PortBreakout {
                port: "Ethernet0".to_owned(),
                mode: mode.to_owned(),
            }),
            ..action(
                ActionWeight::PortBreakoutUpdate,
                "Breakout port Ethernet0",
                ActionKind::Custom,
                BREAKOUT,
                Some(json!({"brkout_mode": mode})),
            )
        }
    }

    #[tokio::test]
    #[traced_test]
    async fn test_port_breakout() {
        let endpoint = MemoryEndpoint::new();
        let mut queue = ActionQueue::new();
        queue.add(breakout("4x25G")).unwrap();

        apply(&endpoint, queue, &ApplyOptions::default(), &CancellationToken::new())
            .await
            .unwrap();
        let history = endpoint.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, SetKind::Update);
        let entry: BreakoutEntry = get_as(&endpoint, &Path::from_str(BREAKOUT).unwrap())
            .await
            .unwrap();
        assert_eq!(entry.brkout_mode.as_deref(), Some("4x25G"));
    }

    #[tokio::test(start_paused = true)]
    #[traced_test]
    async fn test_port_breakout_never_completes() {
        let endpoint = MemoryEndpoint::with_tree(json!({
            "sonic-port-breakout:sonic-port-breakout": {"BREAKOUT_CFG": {"BREAKOUT_CFG_LIST": [
                {"port": "Ethernet0", "brkout_mode": "1x100G", "status": "InProgress"}
            ]}}
        }));
        let mut queue = ActionQueue::new();
        queue.add(breakout("4x25G")).unwrap();
        let options = ApplyOptions {
            breakout_poll_retries: 3,
            ..Default::default()
        };

        let err = apply(&endpoint, queue, &options, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err.source,
            ActionError::BreakoutNotReady(ref port, ref mode)
                if port == "Ethernet0" && mode == "4x25G"
        ));
    }
}
