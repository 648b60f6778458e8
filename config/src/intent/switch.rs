// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Switch identity as seen by the fabric

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SwitchRole {
    Spine,
    #[default]
    ServerLeaf,
    BorderLeaf,
}
impl SwitchRole {
    #[must_use]
    pub fn is_leaf(self) -> bool {
        matches!(self, SwitchRole::ServerLeaf | SwitchRole::BorderLeaf)
    }
    #[must_use]
    pub fn is_spine(self) -> bool {
        self == SwitchRole::Spine
    }
}

/// What the agent of one switch knows about every switch of the fabric
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchInfo {
    pub role: SwitchRole,
    pub asn: u32,
    pub ip: Ipv4Net,
    #[serde(rename = "protocolIP")]
    pub protocol_ip: Ipv4Net,
    #[serde(rename = "vtepIP", default, skip_serializing_if = "Option::is_none")]
    pub vtep_ip: Option<Ipv4Net>,
}

/// A local user to be created on the switch
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreds {
    pub name: String,
    pub password: String,
    pub role: String,
    #[serde(default)]
    pub ssh_keys: Vec<String>,
}
