// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Metadata common to the objects exchanged with the object store

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Debug;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default)]
    pub generation: i64,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}
impl ObjectMeta {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            ..Default::default()
        }
    }
    #[must_use]
    pub fn with_generation(mut self, generation: i64) -> Self {
        self.generation = generation;
        self
    }
}

/// An object kept in the object store: named, versioned by generation, with a status that
/// only its owner writes.
pub trait Object: Clone + Debug + Send + Sync + 'static {
    type Status: Clone + Debug + Default + Send + Sync + 'static;

    fn meta(&self) -> &ObjectMeta;
    fn meta_mut(&mut self) -> &mut ObjectMeta;
    fn status(&self) -> &Self::Status;
    fn set_status(&mut self, status: Self::Status);

    fn name(&self) -> &str {
        &self.meta().name
    }
    fn generation(&self) -> i64 {
        self.meta().generation
    }
}
