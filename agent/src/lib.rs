// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The switch agent: drives reconciliation cycles of one switch from the Agent objects of
//! an object store and reports their outcome.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

pub mod compat;
pub mod endpoint;
pub mod errors;
mod launch;
pub mod processor;
pub mod state;
pub mod store;
pub mod user;

pub use endpoint::{EndpointFactory, MemoryEndpointFactory};
pub use errors::{AgentError, CompatError, CycleError, StoreError, UserError};
pub use launch::start_agent;
pub use processor::Processor;
pub use state::SwitchStateRegistry;
pub use store::{MemoryStore, ObjectStore, WatchEvent, WatchStream};
pub use user::ensure_agent_user;

use tracectl::trace_target;
trace_target!("agent", LevelFilter::INFO, &["agent"]);
