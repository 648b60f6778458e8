// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Settings of the agent process

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::ConfigError;

const DEFAULT_BASEDIR: &str = "/etc/sonic/hedgehog";
const DEFAULT_ENDPOINT_PORT: u16 = 8080;
const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_basedir() -> PathBuf {
    PathBuf::from(DEFAULT_BASEDIR)
}
fn default_port() -> u16 {
    DEFAULT_ENDPOINT_PORT
}
fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
fn default_log_level() -> String {
    "default=info".to_owned()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointSettings {
    #[serde(default = "EndpointSettings::default_address")]
    pub address: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}
impl EndpointSettings {
    fn default_address() -> String {
        "127.0.0.1".to_owned()
    }
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            port: DEFAULT_ENDPOINT_PORT,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Username and password pair
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}
impl Credentials {
    #[must_use]
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_owned(),
            password: password.to_owned(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    #[serde(default = "default_basedir")]
    pub basedir: PathBuf,
    #[serde(default)]
    pub endpoint: EndpointSettings,
    /// Well-known credentials tried once to create the agent user
    #[serde(default)]
    pub default_credentials: Vec<Credentials>,
    /// Log levels, e.g. `default=info,sonic=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_timeout")]
    pub apply_timeout_secs: u64,
}
impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            basedir: default_basedir(),
            endpoint: EndpointSettings::default(),
            default_credentials: vec![],
            log_level: default_log_level(),
            apply_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AgentSettings {
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(input)
            .map_err(|e| ConfigError::Parse("agent settings".to_owned(), e.to_string()))
    }

    /// Load settings from a YAML file. Missing fields take their defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let name = path.display().to_string();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(name.clone(), e.to_string()))?;
        let settings: Self = serde_yaml_ng::from_str(&content)
            .map_err(|e| ConfigError::Parse(name.clone(), e.to_string()))?;
        info!("Loaded agent settings from {name}");
        Ok(settings)
    }

    #[must_use]
    pub fn apply_timeout(&self) -> Duration {
        Duration::from_secs(self.apply_timeout_secs)
    }

    #[must_use]
    pub fn passwd_file(&self) -> PathBuf {
        self.basedir.join("agent-passwd")
    }
}
