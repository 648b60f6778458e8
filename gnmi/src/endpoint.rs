// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::fmt::Display;
use std::sync::Arc;

use crate::{EndpointError, Path};

/// What an endpoint reports when connecting to it
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Capabilities {
    pub version: String,
    pub models: Vec<String>,
    pub encodings: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetKind {
    Update,  /* merge into the existing subtree */
    Replace, /* wipe the subtree, then write */
    Delete,  /* remove the subtree */
}
impl Display for SetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SetKind::Update => write!(f, "update"),
            SetKind::Replace => write!(f, "replace"),
            SetKind::Delete => write!(f, "delete"),
        }
    }
}

/// One mutation of a set request
#[derive(Clone, Debug, PartialEq)]
pub struct SetOp {
    pub kind: SetKind,
    pub path: Path,
    pub value: Option<Value>,
}
impl SetOp {
    #[must_use]
    pub fn update(path: Path, value: Value) -> Self {
        Self {
            kind: SetKind::Update,
            path,
            value: Some(value),
        }
    }
    #[must_use]
    pub fn replace(path: Path, value: Value) -> Self {
        Self {
            kind: SetKind::Replace,
            path,
            value: Some(value),
        }
    }
    #[must_use]
    pub fn delete(path: Path) -> Self {
        Self {
            kind: SetKind::Delete,
            path,
            value: None,
        }
    }
}
impl Display for SetOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.kind, self.path)
    }
}

/// A switch configuration endpoint
#[async_trait]
pub trait ConfigEndpoint: Send + Sync {
    /// Health check done once when connecting
    async fn capabilities(&self) -> Result<Capabilities, EndpointError>;

    /// Fetch the subtree rooted at `path`, JSON-IETF encoded
    async fn get(&self, path: &Path) -> Result<Value, EndpointError>;

    /// Apply a batch of mutations atomically
    async fn set(&self, batch: Vec<SetOp>) -> Result<(), EndpointError>;
}

#[async_trait]
impl<E: ConfigEndpoint + ?Sized> ConfigEndpoint for Arc<E> {
    async fn capabilities(&self) -> Result<Capabilities, EndpointError> {
        (**self).capabilities().await
    }
    async fn get(&self, path: &Path) -> Result<Value, EndpointError> {
        (**self).get(path).await
    }
    async fn set(&self, batch: Vec<SetOp>) -> Result<(), EndpointError> {
        (**self).set(batch).await
    }
}

/// Fetch a subtree and decode it into `T`
pub async fn get_as<T, E>(endpoint: &E, path: &Path) -> Result<T, EndpointError>
where
    T: DeserializeOwned,
    E: ConfigEndpoint + ?Sized,
{
    let value = endpoint.get(path).await?;
    serde_json::from_value(value)
        .map_err(|e| EndpointError::Decode(path.to_string(), e.to_string()))
}

/// Like [`get_as`], with a missing subtree read as the default value of `T`
pub async fn get_or_default<T, E>(endpoint: &E, path: &Path) -> Result<T, EndpointError>
where
    T: DeserializeOwned + Default,
    E: ConfigEndpoint + ?Sized,
{
    match get_as(endpoint, path).await {
        Err(e) if e.is_not_found() => Ok(T::default()),
        other => other,
    }
}
