// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Connections to the switch configuration endpoint

use async_trait::async_trait;
use config::Credentials;
use gnmi::{ConfigEndpoint, EndpointError, MemoryEndpoint, Path, get_or_default};
use parking_lot::Mutex;
use sonic::schema::expand_path;
use sonic::schema::system::{USER_CONFIG, UserConfig};
use std::str::FromStr;
use std::sync::Arc;

/// Opens authenticated sessions to the switch
#[async_trait]
pub trait EndpointFactory: Send + Sync {
    type Endpoint: ConfigEndpoint + 'static;

    async fn connect(&self, credentials: &Credentials) -> Result<Self::Endpoint, EndpointError>;
}

/// Hands out a shared [`MemoryEndpoint`] to callers whose credentials are either
/// explicitly accepted or those of a user configured in the endpoint's tree
pub struct MemoryEndpointFactory {
    endpoint: Arc<MemoryEndpoint>,
    accepted: Mutex<Vec<Credentials>>,
}

impl MemoryEndpointFactory {
    #[must_use]
    pub fn new(endpoint: Arc<MemoryEndpoint>) -> Self {
        Self {
            endpoint,
            accepted: Mutex::new(vec![]),
        }
    }
    #[must_use]
    pub fn accepting(self, credentials: Credentials) -> Self {
        self.accepted.lock().push(credentials);
        self
    }
    #[must_use]
    pub fn endpoint(&self) -> &Arc<MemoryEndpoint> {
        &self.endpoint
    }

    async fn is_configured_user(&self, credentials: &Credentials) -> Result<bool, EndpointError> {
        let path = Path::from_str(&expand_path(USER_CONFIG, &credentials.username))?;
        let user: UserConfig = get_or_default(self.endpoint.as_ref(), &path).await?;
        Ok(user.password.as_deref() == Some(credentials.password.as_str()))
    }
}

#[async_trait]
impl EndpointFactory for MemoryEndpointFactory {
    type Endpoint = Arc<MemoryEndpoint>;

    async fn connect(&self, credentials: &Credentials) -> Result<Self::Endpoint, EndpointError> {
        let accepted = self.accepted.lock().contains(credentials);
        if accepted || self.is_configured_user(credentials).await? {
            return Ok(self.endpoint.clone());
        }
        Err(EndpointError::Unauthenticated(credentials.username.clone()))
    }
}
