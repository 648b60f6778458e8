// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! The intent for one switch, as carried by its [`Agent`] object

pub mod connection;
pub mod switch;
pub mod vpc;

use chrono::{DateTime, Utc};
use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub use connection::{
    Connection, FabricLink, LinkEnd, ManagementLink, PortRef, ServerLink, SwitchLink,
};
pub use switch::{SwitchInfo, SwitchRole, UserCreds};
pub use vpc::{DhcpRange, VpcAttachment, VpcDhcp, VpcPeering, VpcSpec, VpcSubnet};

use crate::meta::{Object, ObjectMeta};
use crate::{ConfigError, ConfigResult};

/// Everything the planner needs to build the configuration of one switch
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSpec {
    pub name: String,
    #[serde(default)]
    pub role: SwitchRole,
    /// Simulated switch (lower ECMP fan-out)
    #[serde(default, rename = "virtual")]
    pub is_virtual: bool,
    #[serde(default)]
    pub asn: u32,
    pub ip: Option<Ipv4Net>,
    #[serde(rename = "protocolIP")]
    pub protocol_ip: Option<Ipv4Net>,
    #[serde(rename = "vtepIP", default, skip_serializing_if = "Option::is_none")]
    pub vtep_ip: Option<Ipv4Net>,
    #[serde(rename = "controlVIP")]
    pub control_vip: Option<Ipv4Net>,

    #[serde(default)]
    pub switches: BTreeMap<String, SwitchInfo>,
    #[serde(default)]
    pub users: Vec<UserCreds>,
    #[serde(default)]
    pub port_groups: BTreeMap<String, String>,
    #[serde(default)]
    pub port_breakouts: BTreeMap<String, String>,
    #[serde(default)]
    pub port_channels: BTreeMap<String, u16>,
    #[serde(default)]
    pub vnis: BTreeMap<String, u32>,
    #[serde(default)]
    pub irb_vlans: BTreeMap<String, u16>,

    #[serde(default)]
    pub vpcs: BTreeMap<String, VpcSpec>,
    #[serde(default)]
    pub vpc_attachments: BTreeMap<String, VpcAttachment>,
    #[serde(default)]
    pub vpc_peerings: BTreeMap<String, VpcPeering>,
    #[serde(default)]
    pub connections: BTreeMap<String, Connection>,

    #[serde(default)]
    pub ntp_servers: Vec<String>,
    #[serde(default)]
    pub roce: bool,
}

impl AgentSpec {
    /// Parse an intent from its YAML form
    pub fn from_yaml(input: &str) -> Result<Self, ConfigError> {
        serde_yaml_ng::from_str(input)
            .map_err(|e| ConfigError::Parse("agent spec".to_owned(), e.to_string()))
    }

    #[must_use]
    pub fn switch(&self, name: &str) -> Option<&SwitchInfo> {
        self.switches.get(name)
    }

    /// Connections that have at least one port on this switch
    pub fn local_connections(&self) -> impl Iterator<Item = (&String, &Connection)> {
        self.connections
            .iter()
            .filter(|(_, conn)| conn.involves(&self.name))
    }

    /// Attachments landing on a connection of this switch
    pub fn local_attachments(&self) -> impl Iterator<Item = (&String, &VpcAttachment)> {
        self.vpc_attachments.iter().filter(|(_, attach)| {
            self.connections
                .get(&attach.connection)
                .is_some_and(|conn| conn.involves(&self.name))
        })
    }

    /// Check the minimum the planner relies on
    pub fn validate(&self) -> ConfigResult {
        debug!("Validating intent for switch '{}'", self.name);
        if self.name.is_empty() {
            return Err(ConfigError::MissingParameter("name"));
        }
        if self.asn == 0 {
            return Err(ConfigError::MissingParameter("asn"));
        }
        if self.ip.is_none() {
            return Err(ConfigError::MissingParameter("ip"));
        }
        if self.protocol_ip.is_none() {
            return Err(ConfigError::MissingParameter("protocolIP"));
        }
        if self.role.is_leaf() && self.vtep_ip.is_none() {
            return Err(ConfigError::MissingParameter("vtepIP"));
        }
        for vpc in self.vpcs.values() {
            for subnet in vpc.subnets.values() {
                subnet.cidr()?;
                if subnet.vlan == 0 || subnet.vlan > 4094 {
                    return Err(ConfigError::InvalidValue("vlan", subnet.vlan.to_string()));
                }
            }
        }
        for attach in self.vpc_attachments.values() {
            attach.vpc_subnet()?;
        }
        for (name, peering) in &self.vpc_peerings {
            peering.validate(name)?;
        }
        Ok(())
    }
}

/// Outcome of the last reconciliation, written back by the agent once per cycle
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentStatus {
    #[serde(default)]
    pub last_applied_generation: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_applied_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_attempt_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub applied_actions: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nos_version: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub meta: ObjectMeta,
    pub spec: AgentSpec,
    #[serde(default)]
    pub status: AgentStatus,
}
impl Agent {
    #[must_use]
    pub fn new(meta: ObjectMeta, spec: AgentSpec) -> Self {
        Self {
            meta,
            spec,
            status: AgentStatus::default(),
        }
    }
}
impl Object for Agent {
    type Status = AgentStatus;
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
    fn status(&self) -> &AgentStatus {
        &self.status
    }
    fn set_status(&mut self, status: AgentStatus) {
        self.status = status;
    }
}

/// Identity and boot metadata of a switch
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchSpec {
    #[serde(default)]
    pub role: SwitchRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boot_mac: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Switch {
    pub meta: ObjectMeta,
    pub spec: SwitchSpec,
}
impl Object for Switch {
    type Status = ();
    fn meta(&self) -> &ObjectMeta {
        &self.meta
    }
    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.meta
    }
    fn status(&self) -> &() {
        &()
    }
    fn set_status(&mut self, (): ()) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const LEAF: &str = r"
name: leaf-1
role: server-leaf
asn: 65101
ip: 10.0.0.1/32
protocolIP: 10.0.1.1/32
vtepIP: 10.0.2.1/32
controlVIP: 172.30.1.1/32
vpcs:
  v1:
    subnets:
      s1:
        subnet: 10.10.10.0/24
        vlan: 1000
        dhcp:
          enable: true
vpcAttachments:
  server-1--v1:
    subnet: v1/s1
    connection: server-1--leaf-1
connections:
  server-1--leaf-1:
    type: unbundled
    link:
      switch: leaf-1/Ethernet1
      server: server-1/enp2s1
  server-2--leaf-2:
    type: unbundled
    link:
      switch: leaf-2/Ethernet1
      server: server-2/enp2s1
";

    #[test]
    fn test_agent_spec_yaml() {
        let spec = AgentSpec::from_yaml(LEAF).unwrap();
        assert_eq!(spec.name, "leaf-1");
        assert_eq!(spec.role, SwitchRole::ServerLeaf);
        assert!(!spec.is_virtual);
        assert_eq!(spec.vpcs["v1"].subnets["s1"].vlan, 1000);
        assert!(spec.vpcs["v1"].subnets["s1"].dhcp.enable);
        assert_eq!(spec.local_connections().count(), 1);
        assert_eq!(spec.local_attachments().count(), 1);
        spec.validate().unwrap();
    }

    #[test]
    fn test_validate() {
        let mut spec = AgentSpec::from_yaml(LEAF).unwrap();
        spec.vtep_ip = None;
        assert_eq!(spec.validate(), Err(ConfigError::MissingParameter("vtepIP")));

        let mut spec = AgentSpec::from_yaml(LEAF).unwrap();
        spec.asn = 0;
        assert_eq!(spec.validate(), Err(ConfigError::MissingParameter("asn")));

        let mut spec = AgentSpec::from_yaml(LEAF).unwrap();
        if let Some(vpc) = spec.vpcs.get_mut("v1") {
            if let Some(subnet) = vpc.subnets.get_mut("s1") {
                subnet.subnet = "10.10.10.0".to_owned();
            }
        }
        assert!(matches!(
            spec.validate(),
            Err(ConfigError::InvalidValue("subnet", _))
        ));
    }

    #[test]
    fn test_bad_yaml() {
        let err = AgentSpec::from_yaml("name: [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_, _)));
    }
}
