// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Routing policies and ACLs

use std::collections::BTreeMap;
use std::fmt::Display;

use crate::{empty_if_all_empty, presence};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecRouteMapResult {
    Accept,
    Reject,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecRouteMapConditions {
    pub directly_connected: Option<bool>,
    pub match_prefix_list: Option<String>,
    pub match_community_list: Option<String>,
    pub match_evpn_vni: Option<u32>,
}
empty_if_all_empty!(SpecRouteMapConditions {
    directly_connected,
    match_prefix_list,
    match_community_list,
    match_evpn_vni
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecRouteMapStatement {
    pub conditions: SpecRouteMapConditions,
    pub set_community: Option<String>,
    pub result: Option<SpecRouteMapResult>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecRouteMap {
    pub statements: BTreeMap<u32, SpecRouteMapStatement>, /* keyed by sequence */
}
empty_if_all_empty!(SpecRouteMap { statements });

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecPrefixListAction {
    Permit,
    Deny,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecPrefixListEntry {
    pub prefix: String,
    pub le: Option<u8>,
    pub ge: Option<u8>,
    pub action: Option<SpecPrefixListAction>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecPrefixList {
    pub prefixes: BTreeMap<u32, SpecPrefixListEntry>, /* keyed by sequence */
}
empty_if_all_empty!(SpecPrefixList { prefixes });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecCommunityList {
    pub members: Vec<String>,
}
empty_if_all_empty!(SpecCommunityList { members });

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecAclAction {
    Accept,
    Drop,
}
impl Display for SpecAclAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SpecAclAction::Accept => write!(f, "accept"),
            SpecAclAction::Drop => write!(f, "drop"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecAclEntry {
    pub description: Option<String>,
    pub action: Option<SpecAclAction>,
    pub protocol: Option<u8>,
    pub source_address: Option<String>,
    pub destination_address: Option<String>,
    pub source_port: Option<u16>,
    pub destination_port: Option<u16>,
}

empty_if_all_empty!(SpecAclEntry {
    description,
    action,
    protocol,
    source_address,
    destination_address,
    source_port,
    destination_port
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecAcl {
    pub description: Option<String>,
    pub entries: BTreeMap<u32, SpecAclEntry>, /* keyed by sequence */
}
empty_if_all_empty!(SpecAcl {
    description,
    entries
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecAclInterface {
    pub ingress: Option<String>,
    pub egress: Option<String>,
}
empty_if_all_empty!(SpecAclInterface { ingress, egress });

presence!(SpecRouteMapResult, SpecPrefixListAction, SpecAclAction);
