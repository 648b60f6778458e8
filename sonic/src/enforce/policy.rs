// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Prefix lists, community lists, route maps and ACLs

use serde_json::Value;
use spec::{
    IsEmpty, Spec, SpecAcl, SpecAclAction, SpecAclEntry, SpecAclInterface, SpecCommunityList,
    SpecPrefixList, SpecPrefixListAction, SpecRouteMap, SpecRouteMapResult,
};

use crate::enforce::{
    ActionQueue, ActionWeight, EnforcerError, ValueEnforcer, enforce_map, to_value,
};
use crate::schema::expand_path;
use crate::schema::policy::{
    ACCEPT, ACCEPT_ROUTE, ACL_ENTRY, ACL_INTERFACE, ACL_SET, ACL_SET_CONFIG, AclActions,
    AclEntry, AclInterfaceEntry, AclIpv4, AclSetConfig, AclTransport, COMMUNITY_SET_CONFIG,
    CommunitySetConfig, DENY, DROP, PERMIT, POLICY_DEFINITION, PREFIX_SET, PolicyActions,
    PolicyConditions, PolicyDefinitionEntry, PolicyStatement, PrefixEntry, PrefixSetEntry,
    REJECT_ROUTE,
};

fn marshal_prefix_list(name: &String, list: &SpecPrefixList) -> Result<Value, EnforcerError> {
    let entry = PrefixSetEntry {
        name: name.clone(),
        prefixes: list
            .prefixes
            .iter()
            .map(|(seq, prefix)| PrefixEntry {
                sequence: *seq,
                ip_prefix: prefix.prefix.clone(),
                masklength_le: prefix.le,
                masklength_ge: prefix.ge,
                action: prefix.action.map(|action| {
                    match action {
                        SpecPrefixListAction::Permit => PERMIT,
                        SpecPrefixListAction::Deny => DENY,
                    }
                    .to_owned()
                }),
            })
            .collect(),
    };
    to_value(&format!("prefix list {name}"), &entry)
}
static PREFIX_LISTS: ValueEnforcer<String, SpecPrefixList> = ValueEnforcer {
    summary: "prefix list %s",
    path: PREFIX_SET,
    marshal: Some(marshal_prefix_list),
    update_weight: ActionWeight::PrefixListUpdate,
    delete_weight: ActionWeight::PrefixListDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_community_list(name: &String, list: &SpecCommunityList) -> Result<Value, EnforcerError> {
    let config = CommunitySetConfig {
        community_member: list.members.clone(),
        match_set_options: Some("ANY".to_owned()),
    };
    to_value(&format!("community list {name}"), &config)
}
static COMMUNITY_LISTS: ValueEnforcer<String, SpecCommunityList> = ValueEnforcer {
    summary: "community list %s",
    path: COMMUNITY_SET_CONFIG,
    marshal: Some(marshal_community_list),
    update_weight: ActionWeight::CommunityListUpdate,
    delete_weight: ActionWeight::CommunityListDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_route_map(name: &String, map: &SpecRouteMap) -> Result<Value, EnforcerError> {
    let statements = map
        .statements
        .iter()
        .map(|(seq, statement)| {
            let cond = &statement.conditions;
            let conditions = (!cond.is_empty()).then(|| PolicyConditions {
                directly_connected: cond.directly_connected,
                match_prefix_set: cond.match_prefix_list.clone(),
                match_community_set: cond.match_community_list.clone(),
                match_evpn_vni: cond.match_evpn_vni,
            });
            let actions = (statement.set_community.is_some() || statement.result.is_some())
                .then(|| PolicyActions {
                    set_community: statement.set_community.clone(),
                    policy_result: statement.result.map(|result| {
                        match result {
                            SpecRouteMapResult::Accept => ACCEPT_ROUTE,
                            SpecRouteMapResult::Reject => REJECT_ROUTE,
                        }
                        .to_owned()
                    }),
                });
            PolicyStatement {
                name: seq.to_string(),
                conditions,
                actions,
            }
        })
        .collect();
    let entry = PolicyDefinitionEntry {
        name: name.clone(),
        statements,
    };
    to_value(&format!("route map {name}"), &entry)
}
static ROUTE_MAPS: ValueEnforcer<String, SpecRouteMap> = ValueEnforcer {
    summary: "route map %s",
    path: POLICY_DEFINITION,
    marshal: Some(marshal_route_map),
    update_weight: ActionWeight::RouteMapUpdate,
    delete_weight: ActionWeight::RouteMapDelete,
    ..ValueEnforcer::DEFAULT
};

fn get_acl_base(acl: &SpecAcl) -> SpecAcl {
    SpecAcl {
        description: acl.description.clone(),
        ..Default::default()
    }
}
fn marshal_acl_base(name: &String, acl: &SpecAcl) -> Result<Value, EnforcerError> {
    let config = AclSetConfig {
        description: acl.description.clone(),
    };
    to_value(&format!("ACL {name}"), &config)
}
static ACL_BASE: ValueEnforcer<String, SpecAcl> = ValueEnforcer {
    summary: "ACL %s",
    path: ACL_SET_CONFIG,
    getter: Some(get_acl_base),
    marshal: Some(marshal_acl_base),
    update_weight: ActionWeight::AclBaseUpdate,
    delete_weight: ActionWeight::AclBaseDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_acl_entry(seq: &u32, entry: &SpecAclEntry) -> Result<Value, EnforcerError> {
    let ipv4 = AclIpv4 {
        protocol: entry.protocol,
        source_address: entry.source_address.clone(),
        destination_address: entry.destination_address.clone(),
    };
    let transport = AclTransport {
        source_port: entry.source_port,
        destination_port: entry.destination_port,
    };
    let entry = AclEntry {
        sequence_id: seq.to_string(),
        description: entry.description.clone(),
        actions: entry.action.map(|action| AclActions {
            forwarding_action: Some(
                match action {
                    SpecAclAction::Accept => ACCEPT,
                    SpecAclAction::Drop => DROP,
                }
                .to_owned(),
            ),
        }),
        ipv4: (ipv4 != AclIpv4::default()).then_some(ipv4),
        transport: (transport != AclTransport::default()).then_some(transport),
    };
    to_value(&format!("ACL entry {seq}"), &entry)
}
static ACL_ENTRIES: ValueEnforcer<u32, SpecAclEntry> = ValueEnforcer {
    summary: "ACL entry %s",
    path: ACL_ENTRY,
    marshal: Some(marshal_acl_entry),
    update_weight: ActionWeight::AclEntryUpdate,
    delete_weight: ActionWeight::AclEntryDelete,
    ..ValueEnforcer::DEFAULT
};

fn handle_acl(
    basepath: &str,
    name: &String,
    actual: Option<&SpecAcl>,
    desired: Option<&SpecAcl>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    let base = format!("{basepath}{}", expand_path(ACL_SET, name));
    ACL_BASE.handle(&base, name, actual, desired, queue)?;
    enforce_map(
        &ACL_ENTRIES,
        &base,
        actual.map(|acl| &acl.entries),
        desired.map(|acl| &acl.entries),
        queue,
    )
}
static ACLS: ValueEnforcer<String, SpecAcl> = ValueEnforcer {
    summary: "ACL %s",
    custom_handler: Some(handle_acl),
    ..ValueEnforcer::DEFAULT
};

fn marshal_acl_interface(name: &String, iface: &SpecAclInterface) -> Result<Value, EnforcerError> {
    let entry = AclInterfaceEntry {
        id: name.clone(),
        ingress_acl_set: iface.ingress.clone(),
        egress_acl_set: iface.egress.clone(),
    };
    to_value(&format!("ACLs of {name}"), &entry)
}
static ACL_INTERFACES: ValueEnforcer<String, SpecAclInterface> = ValueEnforcer {
    summary: "ACLs of interface %s",
    path: ACL_INTERFACE,
    marshal: Some(marshal_acl_interface),
    update_weight: ActionWeight::AclInterfaceUpdate,
    delete_weight: ActionWeight::AclInterfaceDelete,
    ..ValueEnforcer::DEFAULT
};

pub(super) fn enforce(
    actual: &Spec,
    desired: &Spec,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    enforce_map(&PREFIX_LISTS, "", Some(&actual.prefix_lists), Some(&desired.prefix_lists), queue)?;
    enforce_map(
        &COMMUNITY_LISTS,
        "",
        Some(&actual.community_lists),
        Some(&desired.community_lists),
        queue,
    )?;
    enforce_map(&ROUTE_MAPS, "", Some(&actual.route_maps), Some(&desired.route_maps), queue)?;
    enforce_map(&ACLS, "", Some(&actual.acls), Some(&desired.acls), queue)?;
    enforce_map(
        &ACL_INTERFACES,
        "",
        Some(&actual.acl_interfaces),
        Some(&desired.acl_interfaces),
        queue,
    )
}
