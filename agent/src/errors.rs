// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Agent errors

use gnmi::EndpointError;
use planner::PlanError;
use sonic::{LoaderError, ReconcileError};
use thiserror::Error;
use tracectl::TraceCtlError;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("No such object: {0}")]
    NotFound(String),
    #[error("Watch failed: {0}")]
    Watch(String),
    #[error("Watch stream closed")]
    WatchClosed,
    #[error("Object store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that end a reconciliation cycle. They are reported in the status of the
/// Agent object; the next cycle starts afresh.
#[derive(Debug, Error)]
pub enum CycleError {
    #[error("Planning failed: {0}")]
    Plan(#[from] PlanError),
    #[error("Loading switch configuration failed: {0}")]
    Load(#[from] LoaderError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("Publishing DHCP subnets failed: {0}")]
    Store(#[from] StoreError),
}

impl CycleError {
    /// Number of actions applied before the cycle failed
    #[must_use]
    pub fn applied(&self) -> usize {
        match self {
            CycleError::Reconcile(ReconcileError::Apply(e)) => e.applied.len(),
            _ => 0,
        }
    }
}

#[derive(Debug, Error)]
pub enum UserError {
    #[error("None of the default credentials could connect")]
    NoCredentials,
    #[error("Failed to create the agent user: {0}")]
    Create(#[source] EndpointError),
    #[error("Password file {0} is empty")]
    EmptyPasswordFile(String),
    #[error("Failed to access {0}: {1}")]
    Io(String, #[source] std::io::Error),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompatError {
    #[error("Failed to read {0}: {1}")]
    Io(String, String),
    #[error("Found several installed images: {}", .0.join(", "))]
    MultipleImages(Vec<String>),
    #[error("Invalid image version '{0}'")]
    BadVersion(String),
}

/// Errors preventing the agent from starting
#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    User(#[from] UserError),
    #[error("Failed to connect to the switch: {0}")]
    Endpoint(#[from] EndpointError),
    #[error(transparent)]
    Compat(#[from] CompatError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Bad log configuration: {0}")]
    Log(#[from] TraceCtlError),
}
