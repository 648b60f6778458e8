// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Routing policy and ACL models. Prefix sets and policy definitions are written as a
//! whole, their statements being ordered lists the switch keeps as is.

use serde::{Deserialize, Serialize};

pub const ROUTING_POLICY: &str = "/openconfig-routing-policy:routing-policy";
pub const PREFIX_SET: &str =
    "/openconfig-routing-policy:routing-policy/defined-sets/prefix-sets/prefix-set[name=%s]";
pub const COMMUNITY_SET_CONFIG: &str =
    "/openconfig-routing-policy:routing-policy/defined-sets/bgp-defined-sets/community-sets/community-set[community-set-name=%s]/config";
pub const POLICY_DEFINITION: &str =
    "/openconfig-routing-policy:routing-policy/policy-definitions/policy-definition[name=%s]";

pub const ACL: &str = "/openconfig-acl:acl";
pub const ACL_SET: &str = "/openconfig-acl:acl/acl-sets/acl-set[name=%s][type=ACL_IPV4]";
pub const ACL_SET_CONFIG: &str = "/config";
pub const ACL_ENTRY: &str = "/acl-entries/acl-entry[sequence-id=%s]";
pub const ACL_INTERFACE: &str = "/openconfig-acl:acl/interfaces/interface[id=%s]";
pub const ACL_IPV4: &str = "ACL_IPV4";

pub const PERMIT: &str = "PERMIT";
pub const DENY: &str = "DENY";
pub const ACCEPT_ROUTE: &str = "ACCEPT_ROUTE";
pub const REJECT_ROUTE: &str = "REJECT_ROUTE";
pub const ACCEPT: &str = "ACCEPT";
pub const DROP: &str = "DROP";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RoutingPolicy {
    pub defined_sets: Option<DefinedSets>,
    pub policy_definitions: Option<PolicyDefinitions>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DefinedSets {
    pub prefix_sets: Option<PrefixSets>,
    pub bgp_defined_sets: Option<BgpDefinedSets>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrefixSets {
    #[serde(default)]
    pub prefix_set: Vec<PrefixSetEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PrefixSetEntry {
    #[serde(default, skip_serializing)]
    pub name: String,
    #[serde(default)]
    pub prefixes: Vec<PrefixEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PrefixEntry {
    pub sequence: u32,
    pub ip_prefix: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masklength_le: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub masklength_ge: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BgpDefinedSets {
    pub community_sets: Option<CommunitySets>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommunitySets {
    #[serde(default)]
    pub community_set: Vec<CommunitySetEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommunitySetEntry {
    pub community_set_name: String,
    pub config: Option<CommunitySetConfig>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CommunitySetConfig {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub community_member: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_set_options: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyDefinitions {
    #[serde(default)]
    pub policy_definition: Vec<PolicyDefinitionEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicyDefinitionEntry {
    #[serde(default, skip_serializing)]
    pub name: String,
    #[serde(default)]
    pub statements: Vec<PolicyStatement>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyStatement {
    pub name: String, /* the sequence number */
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conditions: Option<PolicyConditions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<PolicyActions>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directly_connected: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_prefix_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_community_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_evpn_vni: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PolicyActions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_community: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_result: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Acl {
    pub acl_sets: Option<AclSets>,
    pub interfaces: Option<AclInterfaces>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclSets {
    #[serde(default)]
    pub acl_set: Vec<AclSetEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclSetEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub acl_type: String,
    pub config: Option<AclSetConfig>,
    pub acl_entries: Option<AclEntries>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclSetConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclEntries {
    #[serde(default)]
    pub acl_entry: Vec<AclEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclEntry {
    #[serde(default, skip_serializing)]
    pub sequence_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<AclActions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ipv4: Option<AclIpv4>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport: Option<AclTransport>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclActions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forwarding_action: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclIpv4 {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_address: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclTransport {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_port: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination_port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AclInterfaces {
    #[serde(default)]
    pub interface: Vec<AclInterfaceEntry>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AclInterfaceEntry {
    #[serde(default, skip_serializing)]
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingress_acl_set: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub egress_acl_set: Option<String>,
}
