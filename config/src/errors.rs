// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Errors found when reading or validating agent objects and settings

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Invalid port reference '{0}': expected <switch>/<port>")]
    InvalidPort(String),
    #[error("Invalid VPC subnet reference '{0}': expected <vpc>/<subnet>")]
    InvalidSubnetRef(String),
    #[error("Missing mandatory parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
    #[error("VPC peering '{0}' must reference two distinct VPCs")]
    BadPeering(String),
    #[error("Failed to read {0}: {1}")]
    Io(String, String),
    #[error("Failed to parse {0}: {1}")]
    Parse(String, String),
}

/// Result-like type for validations
pub type ConfigResult = Result<(), ConfigError>;
