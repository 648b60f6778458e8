// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use spec::{
    Spec, SpecAcl, SpecAclAction, SpecAclEntry, SpecAclInterface, SpecCommunityList,
    SpecPrefixList, SpecPrefixListAction, SpecPrefixListEntry, SpecRouteMap,
    SpecRouteMapConditions, SpecRouteMapResult, SpecRouteMapStatement,
};
use tracing::trace;

use crate::load::{LoaderError, parse_key};
use crate::schema::expand_path;
use crate::schema::policy::{
    ACCEPT, ACCEPT_ROUTE, ACL_ENTRY, ACL_IPV4, ACL_SET, Acl, DENY, DROP, PERMIT,
    POLICY_DEFINITION, REJECT_ROUTE, RoutingPolicy,
};

pub(super) fn load_routing_policy(
    policy: RoutingPolicy,
    spec: &mut Spec,
) -> Result<(), LoaderError> {
    let sets = policy.defined_sets.unwrap_or_default();
    for set in sets.prefix_sets.map(|s| s.prefix_set).unwrap_or_default() {
        let prefixes = set
            .prefixes
            .into_iter()
            .map(|entry| {
                let action = match entry.action.as_deref() {
                    Some(PERMIT) => Some(SpecPrefixListAction::Permit),
                    Some(DENY) => Some(SpecPrefixListAction::Deny),
                    _ => None,
                };
                (
                    entry.sequence,
                    SpecPrefixListEntry {
                        prefix: entry.ip_prefix,
                        le: entry.masklength_le,
                        ge: entry.masklength_ge,
                        action,
                    },
                )
            })
            .collect();
        spec.prefix_lists.insert(set.name, SpecPrefixList { prefixes });
    }

    let community_sets = sets
        .bgp_defined_sets
        .and_then(|s| s.community_sets)
        .map(|s| s.community_set)
        .unwrap_or_default();
    for set in community_sets {
        let members = set.config.map(|c| c.community_member).unwrap_or_default();
        spec.community_lists
            .insert(set.community_set_name, SpecCommunityList { members });
    }

    let definitions = policy
        .policy_definitions
        .map(|p| p.policy_definition)
        .unwrap_or_default();
    for definition in definitions {
        let mut map = SpecRouteMap::default();
        for statement in definition.statements {
            let template = format!(
                "{}/statements",
                expand_path(POLICY_DEFINITION, &definition.name)
            );
            let seq: u32 = parse_key(&format!("{template}[name=%s]"), &statement.name)?;
            let conditions = statement.conditions.unwrap_or_default();
            let actions = statement.actions.unwrap_or_default();
            let result = match actions.policy_result.as_deref() {
                Some(ACCEPT_ROUTE) => Some(SpecRouteMapResult::Accept),
                Some(REJECT_ROUTE) => Some(SpecRouteMapResult::Reject),
                _ => None,
            };
            map.statements.insert(
                seq,
                SpecRouteMapStatement {
                    conditions: SpecRouteMapConditions {
                        directly_connected: conditions.directly_connected,
                        match_prefix_list: conditions.match_prefix_set,
                        match_community_list: conditions.match_community_set,
                        match_evpn_vni: conditions.match_evpn_vni,
                    },
                    set_community: actions.set_community,
                    result,
                },
            );
        }
        spec.route_maps.insert(definition.name, map);
    }
    Ok(())
}

pub(super) fn load_acl(acl: Acl, spec: &mut Spec) -> Result<(), LoaderError> {
    for set in acl.acl_sets.map(|s| s.acl_set).unwrap_or_default() {
        if set.acl_type != ACL_IPV4 {
            trace!("Skipping ACL {} of type {}", set.name, set.acl_type);
            continue;
        }
        let base = expand_path(ACL_SET, &set.name);
        let mut spec_acl = SpecAcl {
            description: set.config.and_then(|c| c.description),
            ..Default::default()
        };
        for entry in set.acl_entries.map(|e| e.acl_entry).unwrap_or_default() {
            let seq: u32 = parse_key(&format!("{base}{ACL_ENTRY}"), &entry.sequence_id)?;
            let action = match entry
                .actions
                .and_then(|a| a.forwarding_action)
                .as_deref()
            {
                Some(ACCEPT) => Some(SpecAclAction::Accept),
                Some(DROP) => Some(SpecAclAction::Drop),
                _ => None,
            };
            let ipv4 = entry.ipv4.unwrap_or_default();
            let transport = entry.transport.unwrap_or_default();
            spec_acl.entries.insert(
                seq,
                SpecAclEntry {
                    description: entry.description,
                    action,
                    protocol: ipv4.protocol,
                    source_address: ipv4.source_address,
                    destination_address: ipv4.destination_address,
                    source_port: transport.source_port,
                    destination_port: transport.destination_port,
                },
            );
        }
        spec.acls.insert(set.name, spec_acl);
    }
    for iface in acl.interfaces.map(|i| i.interface).unwrap_or_default() {
        spec.acl_interfaces.insert(
            iface.id,
            SpecAclInterface {
                ingress: iface.ingress_acl_set,
                egress: iface.egress_acl_set,
            },
        );
    }
    Ok(())
}
