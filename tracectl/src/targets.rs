// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Link-time registry of the log targets declared by the agent crates

use crate::LevelFilter;
use linkme::distributed_slice;

/// A log target as declared in source. `target` is the tracing target (module path for
/// [`trace_target!`]), `name` the short name operators use to refer to it.
pub struct LogTarget {
    pub(crate) target: &'static str,
    pub(crate) name: &'static str,
    pub(crate) level: LevelFilter,
    pub(crate) tags: &'static [&'static str],
}
impl LogTarget {
    #[must_use]
    pub const fn new(
        target: &'static str,
        name: &'static str,
        level: LevelFilter,
        tags: &'static [&'static str],
    ) -> Self {
        Self {
            target,
            name,
            level,
            tags,
        }
    }
}

#[distributed_slice]
pub static LOG_TARGETS: [LogTarget];

#[doc(hidden)]
#[macro_export]
macro_rules! log_target_deps {
    () => {
        use linkme::distributed_slice;
        use $crate::LevelFilter;
        use $crate::targets::{LOG_TARGETS, LogTarget};
    };
}

/// Declare the log target of the calling module, with a short name, a default level and tags.
#[macro_export]
macro_rules! trace_target {
    // the const scope lets the macro be invoked several times per crate without the
    // statics colliding
    ($name:expr, $level:expr, $tags:expr) => {
        const _: () = {
            $crate::log_target_deps!();

            #[distributed_slice(LOG_TARGETS)]
            static LOG_TGT: LogTarget = LogTarget::new(module_path!(), $name, $level, $tags);
        };
    };
}

/// Declare a target that is not a module path, for logs emitted with `target: "..."`.
#[macro_export]
macro_rules! custom_target {
    ($target:expr, $level:expr, $tags:expr) => {
        const _: () = {
            $crate::log_target_deps!();

            #[distributed_slice(LOG_TARGETS)]
            static LOG_TGT: LogTarget = LogTarget::new($target, $target, $level, $tags);
        };
    };
}
