// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use fabric_planner::plan;
use gnmi::MemoryEndpoint;
use pretty_assertions::assert_eq;
use rekon::{Observe, Reconcile};
use sonic::{
    Action, ActionKind, ActionWeight, ApplyOptions, LoaderOptions, SonicSwitch, enforce,
};
use std::collections::BTreeSet;
use test_utils::{leaf_intent, mclag_intent};
use tracing_test::traced_test;

fn position(actions: &[Action], weight: ActionWeight, path_part: &str) -> usize {
    actions
        .iter()
        .position(|a| a.weight == weight && a.path.contains(path_part))
        .unwrap_or_else(|| panic!("no {weight:?} action on {path_part}"))
}

#[tokio::test]
#[traced_test]
async fn test_rerun_is_idempotent() {
    let endpoint = MemoryEndpoint::new();
    let switch = SonicSwitch::new(&endpoint, LoaderOptions::default(), ApplyOptions::default());
    let desired = plan(&leaf_intent()).unwrap();

    let actual = switch.observe().await.unwrap();
    let report = switch.reconcile(&desired, &actual).await.unwrap();
    assert!(report.warnings.is_empty());

    let actual = switch.observe().await.unwrap();
    let queue = enforce(&actual, &desired).unwrap();
    assert!(queue.is_empty(), "{:#?}", queue.actions());

    endpoint.clear_history();
    let report = switch.reconcile(&desired, &actual).await.unwrap();
    assert!(report.applied.is_empty());
    assert!(endpoint.history().is_empty());
}

#[tokio::test]
async fn test_mclag_rerun_is_idempotent() {
    let endpoint = MemoryEndpoint::new();
    let switch = SonicSwitch::new(&endpoint, LoaderOptions::default(), ApplyOptions::default());
    let desired = plan(&mclag_intent("s-b")).unwrap();

    let actual = switch.observe().await.unwrap();
    switch.reconcile(&desired, &actual).await.unwrap();
    let actual = switch.observe().await.unwrap();
    let queue = enforce(&actual, &desired).unwrap();
    assert!(queue.is_empty(), "{:#?}", queue.actions());
}

#[test]
fn test_vpc_removal_order() {
    let intent = leaf_intent();
    let before = plan(&intent).unwrap();

    let mut without = intent.clone();
    without.vpcs.remove("v1");
    without.vpc_attachments.clear();
    without.vnis.clear();
    without.irb_vlans.clear();
    let after = plan(&without).unwrap();

    let actions = enforce(&before, &after).unwrap().into_sorted();
    let vpc_actions: Vec<&Action> = actions
        .iter()
        .filter(|a| ["VrfVv1", "Vlan1000", "Vlan3000"].iter().any(|p| a.path.contains(p)))
        .collect();
    assert!(!vpc_actions.is_empty());
    assert!(
        vpc_actions.iter().all(|a| a.kind == ActionKind::Delete),
        "{vpc_actions:#?}"
    );

    let bgp = position(&actions, ActionWeight::VrfBgpBaseDelete, "VrfVv1");
    let vrf = position(&actions, ActionWeight::VrfBaseDelete, "VrfVv1");
    assert!(bgp < vrf);
    let anycast = position(&actions, ActionWeight::InterfaceAnycastGatewayDelete, "Vlan1000");
    let iface = position(&actions, ActionWeight::InterfaceBaseDelete, "Vlan1000");
    assert!(anycast < iface);
    assert_eq!(actions.last().map(|a| a.weight), Some(ActionWeight::InterfaceBaseDelete));

    /* nothing is both written and deleted */
    let deleted: BTreeSet<&str> = actions
        .iter()
        .filter(|a| a.kind == ActionKind::Delete)
        .map(|a| a.path.as_str())
        .collect();
    assert!(
        actions
            .iter()
            .filter(|a| a.kind != ActionKind::Delete)
            .all(|a| !deleted.contains(a.path.as_str()))
    );
}
