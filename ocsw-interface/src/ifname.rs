//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::tables::Limits;

pub const ETHERNET_PREFIX: &str = "eth-";
pub const AGGREGATE_PREFIX: &str = "ae";

// Maximum number of channels a front-panel port can be split into.
pub const MAX_CHANNELS: u8 = 4;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum InterfaceKind {
    Ethernet,
    Aggregate,
}

// Parsed interface name.
//
// Ethernet interfaces are named after their front-panel port ("eth-5") or
// one of the port's channels once it's split ("eth-5/2"). Aggregates are
// named "ae<N>".
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum IfName {
    Ethernet { port: u32, channel: Option<u8> },
    Aggregate(u32),
}

// ===== impl InterfaceKind =====

impl std::fmt::Display for InterfaceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterfaceKind::Ethernet => write!(f, "ethernet"),
            InterfaceKind::Aggregate => write!(f, "aggregate"),
        }
    }
}

// ===== impl IfName =====

impl IfName {
    pub fn parse(name: &str, limits: &Limits) -> Result<IfName, Error> {
        let malformed = || Error::MalformedIfName(name.to_owned());

        if let Some(rest) = name.strip_prefix(ETHERNET_PREFIX) {
            let (port, channel) = match rest.split_once('/') {
                Some((port, channel)) => (port, Some(channel)),
                None => (rest, None),
            };
            let port = parse_number(port)
                .filter(|port| (1..=limits.max_ports).contains(port))
                .ok_or_else(malformed)?;
            let channel = channel
                .map(|channel| {
                    parse_number(channel)
                        .and_then(|channel| u8::try_from(channel).ok())
                        .filter(|channel| (1..=MAX_CHANNELS).contains(channel))
                        .ok_or_else(malformed)
                })
                .transpose()?;
            return Ok(IfName::Ethernet { port, channel });
        }

        if name.starts_with("eth") {
            return Err(malformed());
        }

        if let Some(rest) = name.strip_prefix(AGGREGATE_PREFIX) {
            let lag = parse_number(rest)
                .filter(|lag| *lag < limits.max_lags)
                .ok_or_else(malformed)?;
            return Ok(IfName::Aggregate(lag));
        }

        Err(Error::UnsupportedInterface(name.to_owned()))
    }

    pub fn kind(&self) -> InterfaceKind {
        match self {
            IfName::Ethernet { .. } => InterfaceKind::Ethernet,
            IfName::Aggregate(_) => InterfaceKind::Aggregate,
        }
    }

    // Name of the front-panel port a channel belongs to.
    pub fn master_port(&self) -> Option<String> {
        match self {
            IfName::Ethernet {
                port,
                channel: Some(_),
            } => Some(port_name(*port)),
            _ => None,
        }
    }

    // Returns whether this names a whole front-panel port.
    pub fn is_port(&self) -> bool {
        matches!(self, IfName::Ethernet { channel: None, .. })
    }
}

impl std::fmt::Display for IfName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IfName::Ethernet {
                port,
                channel: None,
            } => write!(f, "{ETHERNET_PREFIX}{port}"),
            IfName::Ethernet {
                port,
                channel: Some(channel),
            } => write!(f, "{ETHERNET_PREFIX}{port}/{channel}"),
            IfName::Aggregate(lag) => write!(f, "{AGGREGATE_PREFIX}{lag}"),
        }
    }
}

// ===== global functions =====

pub fn port_name(port: u32) -> String {
    format!("{ETHERNET_PREFIX}{port}")
}

// Names of every channel of the given front-panel port.
pub fn channel_names(port: u32) -> impl Iterator<Item = String> {
    (1..=MAX_CHANNELS).map(move |channel| {
        IfName::Ethernet {
            port,
            channel: Some(channel),
        }
        .to_string()
    })
}

// ===== helper functions =====

// Parses a decimal number in canonical form (no sign, no leading zeros).
fn parse_number(s: &str) -> Option<u32> {
    let number = s.parse::<u32>().ok()?;
    (number.to_string() == s).then_some(number)
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ethernet() {
        let limits = Limits::default();
        assert_eq!(
            IfName::parse("eth-5", &limits).unwrap(),
            IfName::Ethernet {
                port: 5,
                channel: None
            }
        );
        let ifname = IfName::parse("eth-5/2", &limits).unwrap();
        assert_eq!(ifname.kind(), InterfaceKind::Ethernet);
        assert_eq!(ifname.master_port().as_deref(), Some("eth-5"));
        assert_eq!(ifname.to_string(), "eth-5/2");
    }

    #[test]
    fn parse_aggregate() {
        let limits = Limits::default();
        let ifname = IfName::parse("ae0", &limits).unwrap();
        assert_eq!(ifname, IfName::Aggregate(0));
        assert_eq!(ifname.kind(), InterfaceKind::Aggregate);
        assert!(!ifname.is_port());
    }

    #[test]
    fn parse_errors() {
        let limits = Limits::default();
        for name in ["eth-0", "eth-05", "eth-1/5", "eth-1/", "eth1", "eth-x"] {
            assert!(
                matches!(
                    IfName::parse(name, &limits),
                    Err(Error::MalformedIfName(_))
                ),
                "{name}"
            );
        }
        let name = format!("eth-{}", limits.max_ports + 1);
        assert!(IfName::parse(&name, &limits).is_err());
        let name = format!("ae{}", limits.max_lags);
        assert!(IfName::parse(&name, &limits).is_err());
        assert!(matches!(
            IfName::parse("lo", &limits),
            Err(Error::UnsupportedInterface(_))
        ));
    }

    #[test]
    fn port_channels() {
        let channels = channel_names(3).collect::<Vec<_>>();
        assert_eq!(channels, ["eth-3/1", "eth-3/2", "eth-3/3", "eth-3/4"]);
    }
}
