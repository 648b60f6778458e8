// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Reasons an intent can't be turned into a switch configuration

use config::ConfigError;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PlanError {
    #[error("Invalid intent: {0}")]
    Config(#[from] ConfigError),
    #[error("No such VPC '{0}'")]
    NoSuchVpc(String),
    #[error("No subnet '{1}' in VPC '{0}'")]
    NoSuchSubnet(String, String),
    #[error("No IRB VLAN allocated to VPC '{0}'")]
    MissingIrbVlan(String),
    #[error("No VNI allocated to '{0}'")]
    MissingVni(String),
    #[error("No port channel allocated to connection '{0}'")]
    MissingPortChannel(String),
    #[error("Invalid CIDR '{0}'")]
    InvalidCidr(String),
    #[error("Invalid port '{0}'")]
    InvalidPort(String),
    #[error("No such switch '{0}'")]
    NoSuchSwitch(String),
    #[error("Missing parameter: {0}")]
    MissingParameter(&'static str),
    #[error("No such connection '{0}'")]
    NoSuchConnection(String),
}
