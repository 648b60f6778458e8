// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! NAT instances, their pools, bindings and static entries

use serde_json::Value;
use spec::{Spec, SpecNat, SpecNatBinding, SpecNatEntry, SpecNatPool, SpecNatType};

use crate::enforce::{
    ActionQueue, ActionWeight, EnforcerError, ValueEnforcer, enforce_map, to_value,
};
use crate::schema::expand_path;
use crate::schema::nat::{
    DNAT, NAT_BINDING, NAT_CONFIG, NAT_INSTANCE, NAT_MAPPING, NAT_POOL, NatBindingConfig,
    NatConfig, NatMappingConfig, NatPoolConfig, SNAT,
};

pub(crate) fn nat_type_name(nat_type: SpecNatType) -> String {
    match nat_type {
        SpecNatType::Snat => SNAT,
        SpecNatType::Dnat => DNAT,
    }
    .to_owned()
}

fn get_nat_base(nat: &SpecNat) -> SpecNat {
    SpecNat {
        enable: nat.enable,
        ..Default::default()
    }
}
fn marshal_nat_base(id: &u32, nat: &SpecNat) -> Result<Value, EnforcerError> {
    to_value(&format!("NAT instance {id}"), &NatConfig { enable: nat.enable })
}
static NAT_BASE: ValueEnforcer<u32, SpecNat> = ValueEnforcer {
    summary: "NAT instance %s",
    path: NAT_CONFIG,
    getter: Some(get_nat_base),
    marshal: Some(marshal_nat_base),
    update_weight: ActionWeight::NatBaseUpdate,
    delete_weight: ActionWeight::NatBaseDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_nat_pool(name: &String, pool: &SpecNatPool) -> Result<Value, EnforcerError> {
    let config = NatPoolConfig {
        nat_ip: pool.range.clone(),
    };
    to_value(&format!("NAT pool {name}"), &config)
}
static NAT_POOLS: ValueEnforcer<String, SpecNatPool> = ValueEnforcer {
    summary: "NAT pool %s",
    path: NAT_POOL,
    marshal: Some(marshal_nat_pool),
    update_weight: ActionWeight::NatPoolUpdate,
    delete_weight: ActionWeight::NatPoolDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_nat_binding(name: &String, binding: &SpecNatBinding) -> Result<Value, EnforcerError> {
    let config = NatBindingConfig {
        nat_pool: binding.pool.clone(),
        nat_type: binding.nat_type.map(nat_type_name),
    };
    to_value(&format!("NAT binding {name}"), &config)
}
static NAT_BINDINGS: ValueEnforcer<String, SpecNatBinding> = ValueEnforcer {
    summary: "NAT binding %s",
    path: NAT_BINDING,
    marshal: Some(marshal_nat_binding),
    update_weight: ActionWeight::NatBindingUpdate,
    delete_weight: ActionWeight::NatBindingDelete,
    ..ValueEnforcer::DEFAULT
};

fn marshal_nat_entry(external: &String, entry: &SpecNatEntry) -> Result<Value, EnforcerError> {
    let config = NatMappingConfig {
        internal_address: entry.internal_address.clone(),
        nat_type: entry.nat_type.map(nat_type_name),
    };
    to_value(&format!("static NAT entry {external}"), &config)
}
static NAT_ENTRIES: ValueEnforcer<String, SpecNatEntry> = ValueEnforcer {
    summary: "static NAT entry %s",
    path: NAT_MAPPING,
    marshal: Some(marshal_nat_entry),
    update_weight: ActionWeight::NatEntryUpdate,
    delete_weight: ActionWeight::NatEntryDelete,
    ..ValueEnforcer::DEFAULT
};

fn handle_nat(
    basepath: &str,
    id: &u32,
    actual: Option<&SpecNat>,
    desired: Option<&SpecNat>,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    let base = format!("{basepath}{}", expand_path(NAT_INSTANCE, &id.to_string()));
    NAT_BASE.handle(&base, id, actual, desired, queue)?;
    enforce_map(
        &NAT_POOLS,
        &base,
        actual.map(|nat| &nat.pools),
        desired.map(|nat| &nat.pools),
        queue,
    )?;
    enforce_map(
        &NAT_BINDINGS,
        &base,
        actual.map(|nat| &nat.bindings),
        desired.map(|nat| &nat.bindings),
        queue,
    )?;
    enforce_map(
        &NAT_ENTRIES,
        &base,
        actual.map(|nat| &nat.static_entries),
        desired.map(|nat| &nat.static_entries),
        queue,
    )
}
static NATS: ValueEnforcer<u32, SpecNat> = ValueEnforcer {
    summary: "NAT instance %s",
    custom_handler: Some(handle_nat),
    ..ValueEnforcer::DEFAULT
};

pub(super) fn enforce(
    actual: &Spec,
    desired: &Spec,
    queue: &mut ActionQueue,
) -> Result<(), EnforcerError> {
    enforce_map(&NATS, "", Some(&actual.nats), Some(&desired.nats), queue)
}
