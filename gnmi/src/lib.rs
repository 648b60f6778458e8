// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! South-bound interface of the agent: a switch configuration endpoint addressed with
//! schema paths (`/elem[key=value]/elem`) and JSON-IETF payloads.
//!
//! The agent only relies on the [`ConfigEndpoint`] trait. [`MemoryEndpoint`] keeps the
//! configuration tree in memory and honours the update / replace / delete semantics of
//! a real endpoint, which makes it usable for tests and dry runs.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]

mod endpoint;
mod errors;
mod memory;
mod path;

pub use endpoint::{Capabilities, ConfigEndpoint, SetKind, SetOp, get_as, get_or_default};
pub use errors::EndpointError;
pub use memory::MemoryEndpoint;
pub use path::{Path, PathElem, escape_value};

use tracectl::trace_target;
trace_target!("gnmi", LevelFilter::INFO, &["switch"]);
