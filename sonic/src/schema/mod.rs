// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Bindings to the configuration models the switch exposes.
//!
//! Each sub-module holds the path templates of one family of models and the serde types
//! of their JSON-IETF encoding. A `%s` in a template stands for the (escaped) key of the
//! entity. Templates starting with `/` but not naming a model are relative to the path
//! of their parent entity.
//!
//! Payload types skip absent leaves when serialized, so that what the enforcer writes is
//! exactly what the loader reads back.

pub mod interfaces;
pub mod nat;
pub mod network;
pub mod overlay;
pub mod policy;
pub mod system;

use gnmi::escape_value;

/// Key placeholder of path templates
pub const KEY: &str = "%s";

/// Substitute the escaped `key` into a path `template`. A template without a placeholder
/// is returned as is.
#[must_use]
pub fn expand_path(template: &str, key: &str) -> String {
    if template.contains(KEY) {
        template.replacen(KEY, &escape_value(key), 1)
    } else {
        template.to_owned()
    }
}

/// Like [`expand_path`], without escaping. Used for human readable summaries.
#[must_use]
pub fn expand_text(template: &str, key: &str) -> String {
    template.replacen(KEY, key, 1)
}
