// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! VPCs, their attachments to server connections and peerings between them

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::Ipv4Addr;

use crate::{ConfigError, ConfigResult};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DhcpRange {
    pub start: Ipv4Addr,
    pub end: Ipv4Addr,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcDhcp {
    #[serde(default)]
    pub enable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<DhcpRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pxe_url: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dns_servers: Vec<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ntp_servers: Vec<Ipv4Addr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_url: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VpcSubnet {
    /// CIDR of the subnet, kept as text so a bad value is reported by validation
    pub subnet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway: Option<Ipv4Addr>,
    pub vlan: u16,
    #[serde(default)]
    pub isolated: bool,
    #[serde(default)]
    pub dhcp: VpcDhcp,
}
impl VpcSubnet {
    pub fn cidr(&self) -> Result<Ipv4Net, ConfigError> {
        self.subnet
            .parse::<Ipv4Net>()
            .map_err(|_| ConfigError::InvalidValue("subnet", self.subnet.clone()))
    }
    /// The gateway of the subnet: the configured one or else the first host address
    pub fn gateway(&self) -> Result<Ipv4Addr, ConfigError> {
        if let Some(gateway) = self.gateway {
            return Ok(gateway);
        }
        self.cidr()?
            .hosts()
            .next()
            .ok_or_else(|| ConfigError::InvalidValue("subnet", self.subnet.clone()))
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcSpec {
    #[serde(default)]
    pub subnets: BTreeMap<String, VpcSubnet>,
}

/// Attaches one subnet of a VPC (`<vpc>/<subnet>`) to a server-facing connection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcAttachment {
    pub subnet: String,
    pub connection: String,
}
impl VpcAttachment {
    /// Split the subnet reference into VPC name and subnet name
    pub fn vpc_subnet(&self) -> Result<(&str, &str), ConfigError> {
        match self.subnet.split_once('/') {
            Some((vpc, subnet)) if !vpc.is_empty() && !subnet.is_empty() => Ok((vpc, subnet)),
            _ => Err(ConfigError::InvalidSubnetRef(self.subnet.clone())),
        }
    }
    pub fn vpc(&self) -> Result<&str, ConfigError> {
        self.vpc_subnet().map(|(vpc, _)| vpc)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpcPeering {
    pub vpcs: (String, String),
}
impl VpcPeering {
    pub fn validate(&self, name: &str) -> ConfigResult {
        let (a, b) = &self.vpcs;
        if a.is_empty() || b.is_empty() || a == b {
            return Err(ConfigError::BadPeering(name.to_owned()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_subnet_gateway() {
        let mut subnet = VpcSubnet {
            subnet: "10.10.10.0/24".to_owned(),
            vlan: 1000,
            ..Default::default()
        };
        assert_eq!(subnet.gateway(), Ok(Ipv4Addr::new(10, 10, 10, 1)));
        subnet.gateway = Some(Ipv4Addr::new(10, 10, 10, 254));
        assert_eq!(subnet.gateway(), Ok(Ipv4Addr::new(10, 10, 10, 254)));
        subnet.subnet = "10.10.10.0/33".to_owned();
        assert!(subnet.cidr().is_err());
    }

    #[test]
    fn test_dhcp_range() {
        let yaml = r"
subnet: 10.10.10.0/24
vlan: 1000
dhcp:
  enable: true
  range:
    start: 10.10.10.10
    end: 10.10.10.99
";
        let subnet: VpcSubnet = serde_yaml_ng::from_str(yaml).unwrap();
        assert!(subnet.dhcp.enable);
        assert_eq!(
            subnet.dhcp.range,
            Some(DhcpRange {
                start: Ipv4Addr::new(10, 10, 10, 10),
                end: Ipv4Addr::new(10, 10, 10, 99),
            })
        );
        assert_eq!(VpcDhcp::default().range, None);
    }

    #[test]
    fn test_attachment_ref() {
        let attach = VpcAttachment {
            subnet: "v1/s1".to_owned(),
            connection: "server-1--leaf-1".to_owned(),
        };
        assert_eq!(attach.vpc_subnet(), Ok(("v1", "s1")));
        let bad = VpcAttachment {
            subnet: "v1".to_owned(),
            connection: "server-1--leaf-1".to_owned(),
        };
        assert_eq!(
            bad.vpc(),
            Err(ConfigError::InvalidSubnetRef("v1".to_owned()))
        );
    }

    #[test]
    fn test_peering_validation() {
        let peering = VpcPeering {
            vpcs: ("v1".to_owned(), "v1".to_owned()),
        };
        assert_eq!(
            peering.validate("v1--v1"),
            Err(ConfigError::BadPeering("v1--v1".to_owned()))
        );
    }
}
