// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Connections between switches, servers and the control node

use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;
use strum::IntoStaticStr;

use crate::ConfigError;

/// Reference to a port of a device, written `<device>/<port>`
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PortRef {
    pub device: String,
    pub port: String,
}
impl PortRef {
    #[must_use]
    pub fn new(device: &str, port: &str) -> Self {
        Self {
            device: device.to_owned(),
            port: port.to_owned(),
        }
    }
    #[must_use]
    pub fn is_on(&self, device: &str) -> bool {
        self.device == device
    }
}
impl FromStr for PortRef {
    type Err = ConfigError;
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.split_once('/') {
            Some((device, port)) if !device.is_empty() && !port.is_empty() => {
                Ok(Self::new(device, port))
            }
            _ => Err(ConfigError::InvalidPort(value.to_owned())),
        }
    }
}
impl TryFrom<String> for PortRef {
    type Error = ConfigError;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_str(&value)
    }
}
impl From<PortRef> for String {
    fn from(value: PortRef) -> Self {
        value.to_string()
    }
}
impl Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.device, self.port)
    }
}

/// One side of a routed link
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkEnd {
    pub port: PortRef,
    pub ip: Ipv4Net,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FabricLink {
    pub spine: LinkEnd,
    pub leaf: LinkEnd,
}
impl FabricLink {
    /// The (local, remote) ends of this link as seen from `switch`
    #[must_use]
    pub fn ends_for(&self, switch: &str) -> Option<(&LinkEnd, &LinkEnd)> {
        if self.spine.port.is_on(switch) {
            Some((&self.spine, &self.leaf))
        } else if self.leaf.port.is_on(switch) {
            Some((&self.leaf, &self.spine))
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ManagementLink {
    pub switch: LinkEnd,
    pub control: LinkEnd,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServerLink {
    pub switch: PortRef,
    pub server: PortRef,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SwitchLink {
    pub switch1: PortRef,
    pub switch2: PortRef,
}
impl SwitchLink {
    /// The (local, remote) ports of this link as seen from `switch`
    #[must_use]
    pub fn ports_for(&self, switch: &str) -> Option<(&PortRef, &PortRef)> {
        if self.switch1.is_on(switch) {
            Some((&self.switch1, &self.switch2))
        } else if self.switch2.is_on(switch) {
            Some((&self.switch2, &self.switch1))
        } else {
            None
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, IntoStaticStr)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Connection {
    Fabric {
        links: Vec<FabricLink>,
    },
    Management {
        link: ManagementLink,
    },
    Mclag {
        links: Vec<ServerLink>,
    },
    #[serde(rename_all = "camelCase")]
    MclagDomain {
        peer_links: Vec<SwitchLink>,
        session_links: Vec<SwitchLink>,
    },
    Bundled {
        links: Vec<ServerLink>,
    },
    Unbundled {
        link: ServerLink,
    },
    VpcLoopback {
        links: Vec<SwitchLink>,
    },
}

impl Connection {
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.into()
    }

    /// Tell if this connection faces servers, i.e. can carry VPC attachments
    #[must_use]
    pub fn is_server_facing(&self) -> bool {
        matches!(
            self,
            Connection::Mclag { .. } | Connection::Bundled { .. } | Connection::Unbundled { .. }
        )
    }

    /// Ports of `switch` used by a server-facing connection
    #[must_use]
    pub fn server_ports_on(&self, switch: &str) -> Vec<&PortRef> {
        match self {
            Connection::Mclag { links } | Connection::Bundled { links } => links
                .iter()
                .map(|l| &l.switch)
                .filter(|p| p.is_on(switch))
                .collect(),
            Connection::Unbundled { link } if link.switch.is_on(switch) => vec![&link.switch],
            _ => vec![],
        }
    }

    /// Tell if `switch` has a port in this connection
    #[must_use]
    pub fn involves(&self, switch: &str) -> bool {
        match self {
            Connection::Fabric { links } => links.iter().any(|l| l.ends_for(switch).is_some()),
            Connection::Management { link } => link.switch.port.is_on(switch),
            Connection::MclagDomain {
                peer_links,
                session_links,
            } => peer_links
                .iter()
                .chain(session_links.iter())
                .any(|l| l.ports_for(switch).is_some()),
            Connection::VpcLoopback { links } => {
                links.iter().any(|l| l.ports_for(switch).is_some())
            }
            _ => !self.server_ports_on(switch).is_empty(),
        }
    }
}
