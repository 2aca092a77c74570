//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Change-path vocabulary.
//!
//! Every configurable leaf is addressed by a short tuple of tokens. Fixed
//! positions name the node; variable positions (interface name, VLAN ID, IP
//! address, subinterface index) carry payload. Classification is a pattern
//! match on path length and fixed-position tokens.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

// Path tokens.
pub const INTERFACE: &str = "Interface";
pub const NAME: &str = "Name";
pub const DESCRIPTION: &str = "Description";
pub const MTU: &str = "Mtu";
pub const ENABLED: &str = "Enabled";
pub const ETHERNET: &str = "Ethernet";
pub const AGGREGATE_ID: &str = "AggregateId";
pub const AUTO_NEGOTIATE: &str = "AutoNegotiate";
pub const PORT_SPEED: &str = "PortSpeed";
pub const AGGREGATION: &str = "Aggregation";
pub const LAG_TYPE: &str = "LagType";
pub const MIN_LINKS: &str = "MinLinks";
pub const SUBINTERFACE: &str = "Subinterface";
pub const IPV4_ADDR: &str = "Ipv4Addr";
pub const IPV6_ADDR: &str = "Ipv6Addr";
pub const ADDRESS: &str = "Address";
pub const IP: &str = "Ip";
pub const PREFIX_LENGTH: &str = "PrefixLength";
pub const SWITCHED_VLAN: &str = "SwitchedVlan";
pub const INTERFACE_MODE: &str = "InterfaceMode";
pub const ACCESS_VLAN: &str = "AccessVlan";
pub const NATIVE_VLAN: &str = "NativeVlan";
pub const TRUNK_VLANS: &str = "TrunkVlans";
pub const COMPONENT: &str = "Component";
pub const PORT: &str = "Port";
pub const BREAKOUT_MODE: &str = "BreakoutMode";
pub const NUM_CHANNELS: &str = "NumChannels";
pub const CHANNEL_SPEED: &str = "ChannelSpeed";
pub const LACP: &str = "Lacp";
pub const INTERVAL: &str = "Interval";
pub const LACP_MODE: &str = "LacpMode";

// Placeholder for variable positions.
pub const WILDCARD: &str = "*";

// Payload positions.
pub const IFNAME_POS: usize = 1;
pub const SUBIF_POS: usize = 3;
pub const ADDRESS_POS: usize = 6;
pub const TRUNK_VID_POS: usize = 5;
pub const LACP_IFNAME_POS: usize = 2;

// Only the first subinterface carries L3 configuration.
pub const SUBIF_INDEX: &str = "0";

// Interface leaves.
pub const INTF_NAME: PathPattern = PathPattern(&[INTERFACE, WILDCARD, NAME]);
pub const INTF_DESCRIPTION: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, DESCRIPTION]);
pub const INTF_MTU: PathPattern = PathPattern(&[INTERFACE, WILDCARD, MTU]);
pub const INTF_ENABLED: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, ENABLED]);

// Ethernet leaves.
pub const ETH_AGGREGATE_ID: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, ETHERNET, AGGREGATE_ID]);
pub const ETH_AUTO_NEGOTIATE: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, ETHERNET, AUTO_NEGOTIATE]);
pub const ETH_PORT_SPEED: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, ETHERNET, PORT_SPEED]);

// Aggregation leaves.
pub const AGG_LAG_TYPE: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, AGGREGATION, LAG_TYPE]);
pub const AGG_MIN_LINKS: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, AGGREGATION, MIN_LINKS]);

// Address leaves.
pub const IPV4_IP: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    SUBINTERFACE,
    WILDCARD,
    IPV4_ADDR,
    ADDRESS,
    WILDCARD,
    IP,
]);
pub const IPV4_PREFIX_LENGTH: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    SUBINTERFACE,
    WILDCARD,
    IPV4_ADDR,
    ADDRESS,
    WILDCARD,
    PREFIX_LENGTH,
]);
pub const IPV6_IP: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    SUBINTERFACE,
    WILDCARD,
    IPV6_ADDR,
    ADDRESS,
    WILDCARD,
    IP,
]);
pub const IPV6_PREFIX_LENGTH: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    SUBINTERFACE,
    WILDCARD,
    IPV6_ADDR,
    ADDRESS,
    WILDCARD,
    PREFIX_LENGTH,
]);

// Switched VLAN leaves.
pub const ETH_VLAN_MODE: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    ETHERNET,
    SWITCHED_VLAN,
    INTERFACE_MODE,
]);
pub const ETH_ACCESS_VLAN: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, ETHERNET, SWITCHED_VLAN, ACCESS_VLAN]);
pub const ETH_NATIVE_VLAN: PathPattern =
    PathPattern(&[INTERFACE, WILDCARD, ETHERNET, SWITCHED_VLAN, NATIVE_VLAN]);
pub const ETH_TRUNK_VLAN: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    ETHERNET,
    SWITCHED_VLAN,
    TRUNK_VLANS,
    WILDCARD,
]);
pub const AGG_VLAN_MODE: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    AGGREGATION,
    SWITCHED_VLAN,
    INTERFACE_MODE,
]);
pub const AGG_ACCESS_VLAN: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    AGGREGATION,
    SWITCHED_VLAN,
    ACCESS_VLAN,
]);
pub const AGG_NATIVE_VLAN: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    AGGREGATION,
    SWITCHED_VLAN,
    NATIVE_VLAN,
]);
pub const AGG_TRUNK_VLAN: PathPattern = PathPattern(&[
    INTERFACE,
    WILDCARD,
    AGGREGATION,
    SWITCHED_VLAN,
    TRUNK_VLANS,
    WILDCARD,
]);

// Port breakout leaves.
pub const BREAKOUT_NUM_CHANNELS: PathPattern =
    PathPattern(&[COMPONENT, WILDCARD, PORT, BREAKOUT_MODE, NUM_CHANNELS]);
pub const BREAKOUT_CHANNEL_SPEED: PathPattern =
    PathPattern(&[COMPONENT, WILDCARD, PORT, BREAKOUT_MODE, CHANNEL_SPEED]);

// LACP leaves.
pub const LACP_NAME: PathPattern =
    PathPattern(&[LACP, INTERFACE, WILDCARD, NAME]);
pub const LACP_INTERVAL: PathPattern =
    PathPattern(&[LACP, INTERFACE, WILDCARD, INTERVAL]);
pub const LACP_ACTIVITY: PathPattern =
    PathPattern(&[LACP, INTERFACE, WILDCARD, LACP_MODE]);

// Sequence of path tokens addressing a configuration leaf.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct DataPath(Vec<String>);

// Path template made of fixed tokens and wildcards.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PathPattern(&'static [&'static str]);

// Every leaf kind known to the configuration engine.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LeafKind {
    IntfName,
    IntfDescription,
    IntfMtu,
    IntfEnabled,
    EthAggregateId,
    EthAutoNegotiate,
    EthPortSpeed,
    AggLagType,
    AggMinLinks,
    Ipv4Ip,
    Ipv4PrefixLength,
    Ipv6Ip,
    Ipv6PrefixLength,
    EthVlanMode,
    EthAccessVlan,
    EthNativeVlan,
    EthTrunkVlan,
    AggVlanMode,
    AggAccessVlan,
    AggNativeVlan,
    AggTrunkVlan,
    BreakoutNumChannels,
    BreakoutChannelSpeed,
    LacpName,
    LacpInterval,
    LacpActivity,
}

// ===== impl DataPath =====

impl DataPath {
    pub fn new(tokens: &[&str]) -> DataPath {
        DataPath(tokens.iter().map(|token| (*token).to_owned()).collect())
    }

    pub fn from_tokens(tokens: Vec<String>) -> DataPath {
        DataPath(tokens)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    // Returns the token at the given position, or an empty string if the path
    // is shorter.
    pub fn token(&self, pos: usize) -> &str {
        self.0.get(pos).map(String::as_str).unwrap_or_default()
    }

    // Returns a copy of this path with the last token replaced.
    pub fn with_leaf(&self, leaf: &str) -> DataPath {
        let mut tokens = self.0.clone();
        if let Some(last) = tokens.last_mut() {
            *last = leaf.to_owned();
        }
        DataPath(tokens)
    }
}

impl std::fmt::Display for DataPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({})", self.0.iter().join(", "))
    }
}

// ===== impl PathPattern =====

impl PathPattern {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, path: &DataPath) -> bool {
        path.len() == self.len()
            && self
                .0
                .iter()
                .zip(path.tokens())
                .all(|(pattern, token)| {
                    *pattern == WILDCARD || *pattern == token
                })
    }

    // Instantiates the pattern, filling wildcards in order.
    pub fn instantiate(&self, payload: &[&str]) -> DataPath {
        let mut payload = payload.iter();
        DataPath(
            self.0
                .iter()
                .map(|token| match *token {
                    WILDCARD => payload
                        .next()
                        .map(|value| (*value).to_owned())
                        .unwrap_or_default(),
                    token => token.to_owned(),
                })
                .collect(),
        )
    }
}

// ===== impl LeafKind =====

impl LeafKind {
    pub const ALL: [LeafKind; 26] = [
        LeafKind::IntfName,
        LeafKind::IntfDescription,
        LeafKind::IntfMtu,
        LeafKind::IntfEnabled,
        LeafKind::EthAggregateId,
        LeafKind::EthAutoNegotiate,
        LeafKind::EthPortSpeed,
        LeafKind::AggLagType,
        LeafKind::AggMinLinks,
        LeafKind::Ipv4Ip,
        LeafKind::Ipv4PrefixLength,
        LeafKind::Ipv6Ip,
        LeafKind::Ipv6PrefixLength,
        LeafKind::EthVlanMode,
        LeafKind::EthAccessVlan,
        LeafKind::EthNativeVlan,
        LeafKind::EthTrunkVlan,
        LeafKind::AggVlanMode,
        LeafKind::AggAccessVlan,
        LeafKind::AggNativeVlan,
        LeafKind::AggTrunkVlan,
        LeafKind::BreakoutNumChannels,
        LeafKind::BreakoutChannelSpeed,
        LeafKind::LacpName,
        LeafKind::LacpInterval,
        LeafKind::LacpActivity,
    ];

    pub fn pattern(&self) -> PathPattern {
        match self {
            LeafKind::IntfName => INTF_NAME,
            LeafKind::IntfDescription => INTF_DESCRIPTION,
            LeafKind::IntfMtu => INTF_MTU,
            LeafKind::IntfEnabled => INTF_ENABLED,
            LeafKind::EthAggregateId => ETH_AGGREGATE_ID,
            LeafKind::EthAutoNegotiate => ETH_AUTO_NEGOTIATE,
            LeafKind::EthPortSpeed => ETH_PORT_SPEED,
            LeafKind::AggLagType => AGG_LAG_TYPE,
            LeafKind::AggMinLinks => AGG_MIN_LINKS,
            LeafKind::Ipv4Ip => IPV4_IP,
            LeafKind::Ipv4PrefixLength => IPV4_PREFIX_LENGTH,
            LeafKind::Ipv6Ip => IPV6_IP,
            LeafKind::Ipv6PrefixLength => IPV6_PREFIX_LENGTH,
            LeafKind::EthVlanMode => ETH_VLAN_MODE,
            LeafKind::EthAccessVlan => ETH_ACCESS_VLAN,
            LeafKind::EthNativeVlan => ETH_NATIVE_VLAN,
            LeafKind::EthTrunkVlan => ETH_TRUNK_VLAN,
            LeafKind::AggVlanMode => AGG_VLAN_MODE,
            LeafKind::AggAccessVlan => AGG_ACCESS_VLAN,
            LeafKind::AggNativeVlan => AGG_NATIVE_VLAN,
            LeafKind::AggTrunkVlan => AGG_TRUNK_VLAN,
            LeafKind::BreakoutNumChannels => BREAKOUT_NUM_CHANNELS,
            LeafKind::BreakoutChannelSpeed => BREAKOUT_CHANNEL_SPEED,
            LeafKind::LacpName => LACP_NAME,
            LeafKind::LacpInterval => LACP_INTERVAL,
            LeafKind::LacpActivity => LACP_ACTIVITY,
        }
    }

    // Returns the leaf kind the given path belongs to, if any.
    pub fn classify(path: &DataPath) -> Option<LeafKind> {
        LeafKind::ALL
            .into_iter()
            .find(|kind| kind.pattern().matches(path))
    }

    // Position of the interface (or component) name in paths of this kind.
    pub fn ifname_pos(&self) -> usize {
        match self {
            LeafKind::LacpName
            | LeafKind::LacpInterval
            | LeafKind::LacpActivity => LACP_IFNAME_POS,
            _ => IFNAME_POS,
        }
    }

    // Returns whether the leaf lives under the ethernet container.
    pub fn is_ethernet(&self) -> bool {
        matches!(
            self,
            LeafKind::EthAggregateId
                | LeafKind::EthAutoNegotiate
                | LeafKind::EthPortSpeed
                | LeafKind::EthVlanMode
                | LeafKind::EthAccessVlan
                | LeafKind::EthNativeVlan
                | LeafKind::EthTrunkVlan
        )
    }

    // Returns whether the leaf lives under the aggregation container, or
    // belongs to the LACP configuration of an aggregate.
    pub fn is_aggregation(&self) -> bool {
        matches!(
            self,
            LeafKind::AggLagType
                | LeafKind::AggMinLinks
                | LeafKind::AggVlanMode
                | LeafKind::AggAccessVlan
                | LeafKind::AggNativeVlan
                | LeafKind::AggTrunkVlan
                | LeafKind::LacpName
                | LeafKind::LacpInterval
                | LeafKind::LacpActivity
        )
    }

    // Returns whether the leaf belongs to an IP address entry.
    pub fn is_address(&self) -> bool {
        matches!(
            self,
            LeafKind::Ipv4Ip
                | LeafKind::Ipv4PrefixLength
                | LeafKind::Ipv6Ip
                | LeafKind::Ipv6PrefixLength
        )
    }
}

// ===== unit tests =====
