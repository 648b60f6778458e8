// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Log control for the switch agent. Every crate declares its tracing targets with
//! [`trace_target!`]; the targets are collected at link time and their levels can be
//! changed at runtime, individually or by tag.

pub mod control;
pub mod display;
pub mod targets;

pub use control::{LogControl, TraceCtlError, get_log_ctl};
pub use tracing_subscriber::filter::LevelFilter;
