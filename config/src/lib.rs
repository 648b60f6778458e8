// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Objects the switch agent consumes and publishes. The intent ([`AgentSpec`]) is what the
//! control plane wants the switch to look like; it is opaque to everything but the planner.
//! [`DhcpSubnet`]s are published for the DHCP server and [`AgentSettings`] configure the
//! agent process itself.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::struct_excessive_bools)]

pub mod dhcp;
pub mod errors;
pub mod intent;
pub mod meta;
pub mod settings;

pub use dhcp::{DhcpAllocated, DhcpSubnet, DhcpSubnetSpec, DhcpSubnetStatus}; // re-export
pub use errors::{ConfigError, ConfigResult}; // re-export
pub use intent::{Agent, AgentSpec, AgentStatus, Switch, SwitchSpec}; // re-export
pub use meta::{Object, ObjectMeta}; // re-export
pub use settings::{AgentSettings, Credentials, EndpointSettings}; // re-export

use tracectl::trace_target;
trace_target!("config", LevelFilter::INFO, &["agent"]);
