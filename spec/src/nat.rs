// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! NAT instances

use std::collections::BTreeMap;

use crate::{empty_if_all_empty, presence};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecNatType {
    Snat,
    Dnat,
}
presence!(SpecNatType);

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecNatPool {
    pub range: Option<String>, /* single address or `first-last` */
}
empty_if_all_empty!(SpecNatPool { range });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecNatBinding {
    pub pool: Option<String>,
    pub nat_type: Option<SpecNatType>,
}
empty_if_all_empty!(SpecNatBinding { pool, nat_type });

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecNatEntry {
    pub internal_address: Option<String>,
    pub nat_type: Option<SpecNatType>,
}
empty_if_all_empty!(SpecNatEntry {
    internal_address,
    nat_type
});

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpecNat {
    pub enable: Option<bool>,
    pub pools: BTreeMap<String, SpecNatPool>,
    pub bindings: BTreeMap<String, SpecNatBinding>,
    pub static_entries: BTreeMap<String, SpecNatEntry>, /* keyed by external address */
}
empty_if_all_empty!(SpecNat {
    enable,
    pools,
    bindings,
    static_entries
});
