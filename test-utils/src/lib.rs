// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Sample intents shared by the tests of the workspace

use config::AgentSpec;

/// A server leaf with one uplink, a management link and one VPC attached to an
/// unbundled server connection
pub const LEAF: &str = r#"
name: leaf-1
role: server-leaf
asn: 65101
ip: 10.0.0.1/32
protocolIP: 10.0.1.1/32
vtepIP: 10.0.2.1/32
controlVIP: 172.30.1.1/32
switches:
  spine-1:
    role: spine
    asn: 65100
    ip: 10.0.0.10/32
    protocolIP: 10.0.1.10/32
  leaf-1:
    role: server-leaf
    asn: 65101
    ip: 10.0.0.1/32
    protocolIP: 10.0.1.1/32
    vtepIP: 10.0.2.1/32
users:
  - name: admin
    password: "$5$salt$hash"
    role: admin
    sshKeys:
      - ssh-ed25519 AAAA admin@fabric
portGroups:
  "1": SPEED_25GB
portBreakouts:
  Ethernet0: 1x100G
vnis:
  v1: 100000
  v1/s1: 110000
irbVlans:
  v1: 3000
vpcs:
  v1:
    subnets:
      s1:
        subnet: 10.10.10.0/24
        vlan: 1000
        dhcp:
          enable: true
vpcAttachments:
  server-1--v1--s1:
    subnet: v1/s1
    connection: server-1--unbundled--leaf-1
connections:
  mgmt--leaf-1:
    type: management
    link:
      switch:
        port: leaf-1/Management0
        ip: 172.30.20.1/31
      control:
        port: control-1/enp2s0
        ip: 172.30.20.0/31
  spine-1--fabric--leaf-1:
    type: fabric
    links:
      - spine:
          port: spine-1/Ethernet0
          ip: 172.30.30.0/31
        leaf:
          port: leaf-1/Ethernet48
          ip: 172.30.30.1/31
  server-1--unbundled--leaf-1:
    type: unbundled
    link:
      switch: leaf-1/Ethernet1
      server: server-1/enp2s1
ntpServers:
  - 10.0.0.100
"#;

/// Two leaves `s-a` and `s-b` forming an MCLAG domain, with a dual-homed server
pub const MCLAG_PAIR: &str = r"
name: s-a
role: server-leaf
asn: 65101
ip: 10.0.0.1/32
protocolIP: 10.0.1.1/32
vtepIP: 10.0.2.1/32
controlVIP: 172.30.1.1/32
switches:
  s-a:
    role: server-leaf
    asn: 65101
    ip: 10.0.0.1/32
    protocolIP: 10.0.1.1/32
    vtepIP: 10.0.2.1/32
  s-b:
    role: server-leaf
    asn: 65101
    ip: 10.0.0.2/32
    protocolIP: 10.0.1.2/32
    vtepIP: 10.0.2.1/32
portChannels:
  server-1--mclag--s-a--s-b: 1
vnis:
  v1: 100000
  v1/s1: 110000
irbVlans:
  v1: 3000
vpcs:
  v1:
    subnets:
      s1:
        subnet: 10.10.10.0/24
        vlan: 1000
vpcAttachments:
  server-1--v1--s1:
    subnet: v1/s1
    connection: server-1--mclag--s-a--s-b
connections:
  s-a--mclag-domain--s-b:
    type: mclag-domain
    peerLinks:
      - switch1: s-a/Ethernet56
        switch2: s-b/Ethernet56
    sessionLinks:
      - switch1: s-a/Ethernet60
        switch2: s-b/Ethernet60
  server-1--mclag--s-a--s-b:
    type: mclag
    links:
      - switch: s-a/Ethernet1
        server: server-1/enp2s1
      - switch: s-b/Ethernet1
        server: server-1/enp2s2
";

/// A spine with a single downlink
pub const SPINE: &str = r"
name: spine-1
role: spine
asn: 65100
ip: 10.0.0.10/32
protocolIP: 10.0.1.10/32
switches:
  leaf-1:
    role: server-leaf
    asn: 65101
    ip: 10.0.0.1/32
    protocolIP: 10.0.1.1/32
    vtepIP: 10.0.2.1/32
connections:
  spine-1--fabric--leaf-1:
    type: fabric
    links:
      - spine:
          port: spine-1/Ethernet0
          ip: 172.30.30.0/31
        leaf:
          port: leaf-1/Ethernet48
          ip: 172.30.30.1/31
";

fn parse(yaml: &str) -> AgentSpec {
    AgentSpec::from_yaml(yaml).unwrap_or_else(|e| panic!("bad sample intent: {e}"))
}

#[must_use]
pub fn leaf_intent() -> AgentSpec {
    parse(LEAF)
}

/// The intent of one switch of [`MCLAG_PAIR`], `s-a` or `s-b`
#[must_use]
pub fn mclag_intent(name: &str) -> AgentSpec {
    let mut intent = parse(MCLAG_PAIR);
    let info = intent
        .switch(name)
        .cloned()
        .unwrap_or_else(|| panic!("no switch {name} in the MCLAG sample"));
    intent.name = name.to_owned();
    intent.ip = Some(info.ip);
    intent.protocol_ip = Some(info.protocol_ip);
    intent.vtep_ip = info.vtep_ip;
    intent
}

#[must_use]
pub fn spine_intent() -> AgentSpec {
    parse(SPINE)
}
