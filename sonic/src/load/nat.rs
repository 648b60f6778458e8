// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

use spec::{Spec, SpecNat, SpecNatBinding, SpecNatEntry, SpecNatPool, SpecNatType};

use crate::load::{LoaderError, parse_key};
use crate::schema::nat::{DNAT, NAT_INSTANCE, NatInstances, SNAT};

fn nat_type(name: Option<String>) -> Option<SpecNatType> {
    match name.as_deref() {
        Some(SNAT) => Some(SpecNatType::Snat),
        Some(DNAT) => Some(SpecNatType::Dnat),
        _ => None,
    }
}

pub(super) fn load_nat(instances: NatInstances, spec: &mut Spec) -> Result<(), LoaderError> {
    for instance in instances.instance {
        let id: u32 = parse_key(NAT_INSTANCE, &instance.id)?;
        let mut nat = SpecNat {
            enable: instance.config.and_then(|c| c.enable),
            ..Default::default()
        };
        for pool in instance.nat_pool.map(|p| p.nat_pool_entry).unwrap_or_default() {
            nat.pools.insert(
                pool.pool_name,
                SpecNatPool {
                    range: pool.config.and_then(|c| c.nat_ip),
                },
            );
        }
        for binding in instance
            .nat_acl_pool_binding
            .map(|b| b.nat_acl_pool_binding_entry)
            .unwrap_or_default()
        {
            let config = binding.config.unwrap_or_default();
            nat.bindings.insert(
                binding.name,
                SpecNatBinding {
                    pool: config.nat_pool,
                    nat_type: nat_type(config.nat_type),
                },
            );
        }
        for mapping in instance
            .nat_mapping_table
            .map(|m| m.nat_mapping_entry)
            .unwrap_or_default()
        {
            let config = mapping.config.unwrap_or_default();
            nat.static_entries.insert(
                mapping.external_address,
                SpecNatEntry {
                    internal_address: config.internal_address,
                    nat_type: nat_type(config.nat_type),
                },
            );
        }
        spec.nats.insert(id, nat);
    }
    Ok(())
}
