// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! NAT instance models. Templates other than [`NAT_INSTANCES`] and [`NAT_INSTANCE`] are
//! relative to the path of an instance.

use serde::{Deserialize, Serialize};

pub const NAT_INSTANCES: &str = "/openconfig-nat:nat/instances";
pub const NAT_INSTANCE: &str = "/openconfig-nat:nat/instances/instance[id=%s]";
pub const NAT_CONFIG: &str = "/config";
pub const NAT_POOL: &str = "/nat-pool/nat-pool-entry[pool-name=%s]/config";
pub const NAT_BINDING: &str = "/nat-acl-pool-binding/nat-acl-pool-binding-entry[name=%s]/config";
pub const NAT_MAPPING: &str = "/nat-mapping-table/nat-mapping-entry[external-address=%s]/config";

pub const SNAT: &str = "SNAT";
pub const DNAT: &str = "DNAT";

#[derive(Debug, Default, Deserialize)]
pub struct NatInstances {
    #[serde(default)]
    pub instance: Vec<NatInstanceEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatInstanceEntry {
    pub id: String,
    pub config: Option<NatConfig>,
    pub nat_pool: Option<NatPools>,
    pub nat_acl_pool_binding: Option<NatBindings>,
    pub nat_mapping_table: Option<NatMappings>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatPools {
    #[serde(default)]
    pub nat_pool_entry: Vec<NatPoolEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatPoolEntry {
    pub pool_name: String,
    pub config: Option<NatPoolConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatPoolConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_ip: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatBindings {
    #[serde(default)]
    pub nat_acl_pool_binding_entry: Vec<NatBindingEntry>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NatBindingEntry {
    pub name: String,
    pub config: Option<NatBindingConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatBindingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nat_pool: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub nat_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatMappings {
    #[serde(default)]
    pub nat_mapping_entry: Vec<NatMappingEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatMappingEntry {
    pub external_address: String,
    pub config: Option<NatMappingConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NatMappingConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub internal_address: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub nat_type: Option<String>,
}
