// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! DHCP subnets published for the DHCP server of the fabric

use chrono::{DateTime, Utc};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::meta::{Object, ObjectMeta};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DhcpSubnetSpec {
    /// `<vpc>/<subnet>`
    pub subnet: String,
    pub cidr: Option<Ipv4Net>,
    pub gateway: Option<Ipv4Addr>,
    #[serde(rename = "startIP")]
    pub start_ip: Option<Ipv4Addr>,
    #[serde(rename = "endIP")]
    pub end_ip: Option<Ipv4Addr>,
    pub vrf: String,
    #[serde(rename = "circuitID")]
    pub circuit_id: String,
    #[serde(default, rename = "pxeURL", skip_serializing_if = "Option::is_none")]
    pub pxe_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ntp_servers: Vec<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    #[serde(default, rename = "defaultURL", skip_serializing_if = "Option::is_none")]
    pub default_url: Option<String>,
}

/// A lease handed out by the DHCP server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpAllocated {
    pub ip: Ipv4Addr,
    pub expiry: DateTime<Utc>,
    #[serde(default)]
    pub hostname: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpSubnetStatus {
    /// mac address or client-id to lease
    #[serde(default)]
    pub allocated: BTreeMap<String, DhcpAllocated>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpSubnet {
    pub meta: ObjectMeta,
    pub spec: DhcpSubnetSpec,
    #[serde(default)]
    pub status: DhcpSubnetStatus,
}
impl DhcpSubnet {
    /// Object name for a subnet reference, `<vpc>/<subnet>` becomes `<vpc>--<subnet>`
    #[must_use]
    pub fn object_name(subnet: &str) -> String {
        subnet.replace('/', "--")
    }
    #[must_use]
    pub fn new(spec: DhcpSubnetSpec) -> Self {
        Self {
            meta: ObjectMeta::new(&Self::object_name(&spec.subnet)),
            spec,
            status: DhcpSubnetStatus::default(),
        }
    }
    /// Tell if an allocation is still valid at `now`
    #[must_use]
    pub fn is_leased(&self, client: &str, now: DateTime<Utc>) -> bool {
        self.status
            .allocated
            .get(client)
            .is_some_and(|lease| lease.expiry > now)
    }
}
impl Object for DhcpSubnet {
    type Status = DhcpSubnetStatus;
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
    fn status(&self) -> &DhcpSubnetStatus {
        &self.status
    }
    fn set_status(&mut self, status: DhcpSubnetStatus) {
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_dhcp_subnet_object() {
        let mut subnet = DhcpSubnet::new(DhcpSubnetSpec {
            subnet: "v1/s1".to_owned(),
            vrf: "VrfVv1".to_owned(),
            circuit_id: "Vlan1000".to_owned(),
            ..Default::default()
        });
        assert_eq!(subnet.name(), "v1--s1");

        let now = Utc::now();
        let mut status = DhcpSubnetStatus::default();
        status.allocated.insert(
            "02:00:00:00:00:01".to_owned(),
            DhcpAllocated {
                ip: Ipv4Addr::new(10, 10, 10, 10),
                expiry: now + Duration::hours(1),
                hostname: "server-1".to_owned(),
            },
        );
        subnet.set_status(status);
        assert!(subnet.is_leased("02:00:00:00:00:01", now));
        assert!(!subnet.is_leased("02:00:00:00:00:01", now + Duration::hours(2)));
        assert!(!subnet.is_leased("02:00:00:00:00:02", now));
    }
}
