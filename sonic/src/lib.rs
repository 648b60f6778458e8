// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reconciliation of a switch configuration tree with a desired [`spec::Spec`].
//!
//! The [`load`] module reads what the switch holds into a [`spec::Spec`], [`enforce`]
//! diffs it with the desired one into weighted actions and [`apply`] executes them
//! in order. [`SonicSwitch`] ties the three together behind the [`rekon`] traits.

#![deny(
    unsafe_code,
    clippy::all,
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]
#![allow(clippy::missing_errors_doc)]
// enforcer callbacks share one fn pointer signature per entity type
#![allow(clippy::ptr_arg, clippy::ref_option, clippy::trivially_copy_pass_by_ref)]

pub mod apply;
pub mod enforce;
pub mod load;
pub mod schema;
pub mod state;
mod switch;

pub use apply::{ActionError, ApplyError, ApplyOptions, ApplyReport, apply};
pub use enforce::{Action, ActionKind, ActionQueue, ActionWeight, EnforcerError, enforce};
pub use load::{LoaderError, LoaderOptions, load};
pub use state::{SwitchState, load_state};
pub use switch::{ReconcileError, SonicSwitch};

use tracectl::trace_target;
trace_target!("sonic", LevelFilter::INFO, &["switch"]);
