// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! North-bound object store: where Agent and Switch objects are read and DHCP subnets
//! published.

use async_trait::async_trait;
use config::Object;
use futures::StreamExt;
use futures::stream::BoxStream;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::debug;

use crate::errors::StoreError;

const WATCH_CAPACITY: usize = 64;

#[derive(Clone, Debug, PartialEq)]
pub enum WatchEvent<T> {
    Added(T),
    Modified(T),
    Deleted(T),
    /// progress marker with no object, ignored by consumers
    Bookmark,
    /// the watch is broken and must be re-established
    Error(String),
}

pub type WatchStream<T> = BoxStream<'static, WatchEvent<T>>;

#[async_trait]
pub trait ObjectStore<T: Object>: Send + Sync {
    async fn list(&self) -> Result<Vec<T>, StoreError>;
    async fn get(&self, name: &str) -> Result<Option<T>, StoreError>;
    async fn watch(&self) -> Result<WatchStream<T>, StoreError>;
    /// Create or replace an object. The status of an existing object is kept.
    async fn upsert(&self, obj: T) -> Result<(), StoreError>;
    async fn delete(&self, name: &str) -> Result<(), StoreError>;
    async fn update_status(&self, name: &str, status: T::Status) -> Result<(), StoreError>;
}

/// An object store held in memory, for tests and standalone runs
pub struct MemoryStore<T: Object> {
    objects: RwLock<BTreeMap<String, T>>,
    events: broadcast::Sender<WatchEvent<T>>,
}

impl<T: Object> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Object> MemoryStore<T> {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(WATCH_CAPACITY);
        Self {
            objects: RwLock::new(BTreeMap::new()),
            events,
        }
    }
    fn notify(&self, event: WatchEvent<T>) {
        /* no receiver is not an error */
        let _ = self.events.send(event);
    }
    /// Break every open watch
    pub fn fail_watches(&self, reason: &str) {
        self.notify(WatchEvent::Error(reason.to_owned()));
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.read().len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.read().is_empty()
    }
}

#[async_trait]
impl<T: Object> ObjectStore<T> for MemoryStore<T> {
    async fn list(&self) -> Result<Vec<T>, StoreError> {
        Ok(self.objects.read().values().cloned().collect())
    }

    async fn get(&self, name: &str) -> Result<Option<T>, StoreError> {
        Ok(self.objects.read().get(name).cloned())
    }

    async fn watch(&self) -> Result<WatchStream<T>, StoreError> {
        let stream = BroadcastStream::new(self.events.subscribe()).map(|event| match event {
            Ok(event) => event,
            Err(BroadcastStreamRecvError::Lagged(missed)) => {
                WatchEvent::Error(format!("watcher lagged behind by {missed} events"))
            }
        });
        Ok(stream.boxed())
    }

    async fn upsert(&self, mut obj: T) -> Result<(), StoreError> {
        let event = {
            let mut objects = self.objects.write();
            match objects.get(obj.name()) {
                Some(existing) => {
                    obj.set_status(existing.status().clone());
                    objects.insert(obj.name().to_owned(), obj.clone());
                    WatchEvent::Modified(obj)
                }
                None => {
                    objects.insert(obj.name().to_owned(), obj.clone());
                    WatchEvent::Added(obj)
                }
            }
        };
        self.notify(event);
        Ok(())
    }

    async fn delete(&self, name: &str) -> Result<(), StoreError> {
        let removed = self
            .objects
            .write()
            .remove(name)
            .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
        debug!("Deleted object {name}");
        self.notify(WatchEvent::Deleted(removed));
        Ok(())
    }

    async fn update_status(&self, name: &str, status: T::Status) -> Result<(), StoreError> {
        let updated = {
            let mut objects = self.objects.write();
            let obj = objects
                .get_mut(name)
                .ok_or_else(|| StoreError::NotFound(name.to_owned()))?;
            obj.set_status(status);
            obj.clone()
        };
        self.notify(WatchEvent::Modified(updated));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::{Agent, AgentStatus, ObjectMeta};
    use pretty_assertions::assert_eq;
    use test_utils::leaf_intent;

    fn agent(generation: i64) -> Agent {
        Agent::new(
            ObjectMeta::new("leaf-1").with_generation(generation),
            leaf_intent(),
        )
    }

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryStore::new();
        assert!(store.get("leaf-1").await.unwrap().is_none());

        store.upsert(agent(1)).await.unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("leaf-1").await.unwrap().unwrap().generation(), 1);

        let status = AgentStatus {
            last_applied_generation: 1,
            ..Default::default()
        };
        store.update_status("leaf-1", status.clone()).await.unwrap();

        /* a new generation of the spec keeps the status */
        store.upsert(agent(2)).await.unwrap();
        let stored = store.get("leaf-1").await.unwrap().unwrap();
        assert_eq!(stored.generation(), 2);
        assert_eq!(stored.status, status);
        assert_eq!(store.list().await.unwrap().len(), 1);

        store.delete("leaf-1").await.unwrap();
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_missing_object() {
        let store: MemoryStore<Agent> = MemoryStore::new();
        assert_eq!(
            store.delete("leaf-1").await,
            Err(StoreError::NotFound("leaf-1".to_owned()))
        );
        assert_eq!(
            store.update_status("leaf-1", AgentStatus::default()).await,
            Err(StoreError::NotFound("leaf-1".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_watch_events() {
        let store = MemoryStore::new();
        let mut events = store.watch().await.unwrap();

        store.upsert(agent(1)).await.unwrap();
        store.upsert(agent(2)).await.unwrap();
        store.delete("leaf-1").await.unwrap();
        store.fail_watches("connection reset");

        assert!(matches!(events.next().await, Some(WatchEvent::Added(a)) if a.generation() == 1));
        assert!(
            matches!(events.next().await, Some(WatchEvent::Modified(a)) if a.generation() == 2)
        );
        assert!(
            matches!(events.next().await, Some(WatchEvent::Deleted(a)) if a.name() == "leaf-1")
        );
        assert_eq!(
            events.next().await,
            Some(WatchEvent::Error("connection reset".to_owned()))
        );
    }

    #[tokio::test]
    async fn test_lagging_watcher() {
        let store = MemoryStore::new();
        let mut events = store.watch().await.unwrap();
        for generation in 0..=i64::try_from(WATCH_CAPACITY).unwrap() {
            store.upsert(agent(generation)).await.unwrap();
        }
        assert!(matches!(events.next().await, Some(WatchEvent::Error(_))));
    }
}
