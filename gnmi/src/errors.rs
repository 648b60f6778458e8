// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum EndpointError {
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("Timed out: {0}")]
    Timeout(String),
    #[error("Rejected at {0}: {1}")]
    Rejected(String, String),
    #[error("Failed to decode {0}: {1}")]
    Decode(String, String),
    #[error("Failed to encode payload: {0}")]
    Encode(String),
    #[error("Invalid path '{0}': {1}")]
    InvalidPath(String, String),
    #[error("Authentication failed for user '{0}'")]
    Unauthenticated(String),
}

impl EndpointError {
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, EndpointError::NotFound(_))
    }
    /// Errors worth a retry in a later cycle, as opposed to a refusal of the endpoint
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EndpointError::Unavailable(_) | EndpointError::Timeout(_)
        )
    }
}
