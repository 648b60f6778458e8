// SPDX-License-Identifier: Apache-2.0
// Copyright Open Network Fabric Authors

//! Actions produced by the enforcer and the order they are applied in

use serde_json::Value;
use std::fmt::Display;
use strum::EnumIter;

use crate::enforce::EnforcerError;

/// Position of an action in the application order, lowest first.
///
/// Creations and updates come first, in dependency order. Deletions follow in the
/// reverse order, each `*Delete` mirroring its `*Update` around the middle of the range,
/// except for interface removal which comes last of all.
#[repr(u16)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, EnumIter)]
pub enum ActionWeight {
    #[default]
    Unset = 0,

    ZtpUpdate = 1,
    HostnameUpdate = 2,
    NtpUpdate = 3,
    NtpServerUpdate = 4,
    EcmpRoceUpdate = 5,
    UserUpdate = 6,
    PortGroupUpdate = 7,
    PortBreakoutUpdate = 8,
    LldpUpdate = 9,
    BfdProfileUpdate = 10,
    InterfaceBaseUpdate = 11,
    InterfaceSpeedUpdate = 12,
    InterfaceIpsUpdate = 13,
    InterfaceAnycastGatewayUpdate = 14,
    InterfaceSubinterfaceUpdate = 15,
    InterfaceSubinterfaceIpsUpdate = 16,
    PortChannelConfigUpdate = 17,
    InterfacePortChannelMemberUpdate = 18,
    InterfaceVlansUpdate = 19,
    InterfaceNatZoneUpdate = 20,
    LldpInterfaceUpdate = 21,
    VxlanTunnelUpdate = 22,
    VxlanEvpnNvoUpdate = 23,
    McLagDomainUpdate = 24,
    McLagInterfaceUpdate = 25,
    LstGroupUpdate = 26,
    LstInterfaceUpdate = 27,
    DhcpRelayUpdate = 28,
    PrefixListUpdate = 29,
    CommunityListUpdate = 30,
    RouteMapUpdate = 31,
    AclBaseUpdate = 32,
    AclEntryUpdate = 33,
    AclInterfaceUpdate = 34,
    VrfBaseUpdate = 35,
    VrfInterfaceUpdate = 36,
    VrfVniUpdate = 37,
    VxlanTunnelMapUpdate = 38,
    SuppressVlanNeighUpdate = 39,
    VrfBgpBaseUpdate = 40,
    VrfBgpIpv4Update = 41,
    VrfBgpL2vpnUpdate = 42,
    VrfBgpImportVrfUpdate = 43,
    VrfBgpNeighborUpdate = 44,
    VrfBgpNetworkUpdate = 45,
    VrfTableConnectionUpdate = 46,
    VrfStaticRouteUpdate = 47,
    NatBaseUpdate = 48,
    NatPoolUpdate = 49,
    NatBindingUpdate = 50,
    NatEntryUpdate = 51,

    NatEntryDelete = 101,
    NatBindingDelete = 102,
    NatPoolDelete = 103,
    NatBaseDelete = 104,
    VrfStaticRouteDelete = 105,
    VrfTableConnectionDelete = 106,
    VrfBgpNetworkDelete = 107,
    VrfBgpNeighborDelete = 108,
    VrfBgpImportVrfDelete = 109,
    VrfBgpL2vpnDelete = 110,
    VrfBgpIpv4Delete = 111,
    VrfBgpBaseDelete = 112,
    SuppressVlanNeighDelete = 113,
    VxlanTunnelMapDelete = 114,
    VrfVniDelete = 115,
    VrfInterfaceDelete = 116,
    VrfBaseDelete = 117,
    AclInterfaceDelete = 118,
    AclEntryDelete = 119,
    AclBaseDelete = 120,
    RouteMapDelete = 121,
    CommunityListDelete = 122,
    PrefixListDelete = 123,
    DhcpRelayDelete = 124,
    LstInterfaceDelete = 125,
    LstGroupDelete = 126,
    McLagInterfaceDelete = 127,
    McLagDomainDelete = 128,
    VxlanEvpnNvoDelete = 129,
    VxlanTunnelDelete = 130,
    LldpInterfaceDelete = 131,
    InterfaceNatZoneDelete = 132,
    InterfaceVlansDelete = 133,
    InterfacePortChannelMemberDelete = 134,
    PortChannelConfigDelete = 135,
    InterfaceSubinterfaceIpsDelete = 136,
    InterfaceSubinterfaceDelete = 137,
    InterfaceAnycastGatewayDelete = 138,
    InterfaceIpsDelete = 139,
    InterfaceSpeedDelete = 140,
    BfdProfileDelete = 142,
    LldpDelete = 143,
    PortBreakoutDelete = 144,
    PortGroupDelete = 145,
    UserDelete = 146,
    EcmpRoceDelete = 147,
    NtpServerDelete = 148,
    NtpDelete = 149,
    HostnameDelete = 150,
    ZtpDelete = 151,

    InterfaceBaseDelete = 199,

    Max = 1000,
}

impl ActionWeight {
    #[must_use]
    pub fn value(self) -> u16 {
        self as u16
    }
    /// Tell if actions may carry this weight
    #[must_use]
    pub fn is_valid(self) -> bool {
        !matches!(self, ActionWeight::Unset | ActionWeight::Max)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    Update,
    Replace,
    Delete,
    Custom,
}
impl Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionKind::Update => write!(f, "update"),
            ActionKind::Replace => write!(f, "replace"),
            ActionKind::Delete => write!(f, "delete"),
            ActionKind::Custom => write!(f, "custom"),
        }
    }
}

/// Procedures that don't fit a single set request
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CustomAction {
    /// Change the breakout mode of a port, then wait for the port to be re-created
    PortBreakout { port: String, mode: String },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Action {
    pub weight: ActionWeight,
    pub summary: String,
    pub kind: ActionKind,
    pub path: String,
    pub value: Option<Value>,
    pub custom: Option<CustomAction>,
    pub warning_on_error: bool, /* a failure is reported but doesn't stop the application */
}
impl Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} {} ({})",
            self.weight.value(),
            self.kind,
            self.path,
            self.summary
        )
    }
}

/// The actions of one enforcement, in the order they were produced
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: Vec<Action>,
}

impl ActionQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
    /// Queue an action. Its weight must be set and below [`ActionWeight::Max`].
    pub fn add(&mut self, action: Action) -> Result<(), EnforcerError> {
        if !action.weight.is_valid() {
            return Err(EnforcerError::InvalidWeight(
                action.summary,
                action.weight.value(),
            ));
        }
        self.actions.push(action);
        Ok(())
    }
    #[must_use]
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
    /// The actions in application order. Sorting is stable, so actions of equal weight
    /// keep the order they were produced in.
    #[must_use]
    pub fn into_sorted(mut self) -> Vec<Action> {
        self.actions.sort_by_key(|action| action.weight);
        self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use strum::IntoEnumIterator;

    fn action(weight: ActionWeight, summary: &str) -> Action {
        Action {
            weight,
            summary: summary.to_owned(),
            kind: ActionKind::Update,
            path: "/x".to_owned(),
            value: None,
            custom: None,
            warning_on_error: false,
        }
    }

    #[test]
    fn test_weights_disjoint() {
        let updates: Vec<u16> = ActionWeight::iter()
            .filter(|w| format!("{w:?}").ends_with("Update"))
            .map(ActionWeight::value)
            .collect();
        let deletes: Vec<u16> = ActionWeight::iter()
            .filter(|w| format!("{w:?}").ends_with("Delete"))
            .map(ActionWeight::value)
            .collect();
        assert_eq!(updates.len(), deletes.len());
        let last_update = updates.iter().max().copied().unwrap_or_default();
        let first_delete = deletes.iter().min().copied().unwrap_or_default();
        assert!(last_update < first_delete);
        assert!(deletes.iter().all(|d| *d < ActionWeight::Max.value()));
        assert_eq!(
            deletes.iter().max().copied(),
            Some(ActionWeight::InterfaceBaseDelete.value())
        );
    }

    #[test]
    fn test_weights_mirrored() {
        assert_eq!(
            ActionWeight::ZtpUpdate.value() + ActionWeight::ZtpDelete.value(),
            152
        );
        assert_eq!(
            ActionWeight::NatEntryUpdate.value() + ActionWeight::NatEntryDelete.value(),
            152
        );
        assert_eq!(
            ActionWeight::VrfBgpNeighborUpdate.value() + ActionWeight::VrfBgpNeighborDelete.value(),
            152
        );
    }

    #[test]
    fn test_invalid_weights_rejected() {
        let mut queue = ActionQueue::new();
        assert!(matches!(
            queue.add(action(ActionWeight::Unset, "unset")),
            Err(EnforcerError::InvalidWeight(_, 0))
        ));
        assert!(matches!(
            queue.add(action(ActionWeight::Max, "max")),
            Err(EnforcerError::InvalidWeight(_, 1000))
        ));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_sort_stable() {
        let mut queue = ActionQueue::new();
        for (weight, summary) in [
            (ActionWeight::InterfaceBaseDelete, "a"),
            (ActionWeight::UserUpdate, "b"),
            (ActionWeight::HostnameUpdate, "c"),
            (ActionWeight::UserUpdate, "d"),
        ] {
            queue.add(action(weight, summary)).unwrap();
        }
        let order: Vec<String> = queue.into_sorted().into_iter().map(|a| a.summary).collect();
        assert_eq!(order, vec!["c", "b", "d", "a"]);
    }
}
