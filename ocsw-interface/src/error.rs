//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ipnetwork::IpNetwork;
use itertools::Itertools;
use ocsw_northbound::paths::DataPath;
use tracing::{error, warn};

use crate::southbound::SwitchError;
use crate::tables::Dependency;

// Configuration transaction errors.
#[derive(Debug)]
pub enum Error {
    // Malformed or unsupported input.
    UnknownPath(DataPath),
    InvalidValue(DataPath),
    MalformedIfName(String),
    UnsupportedInterface(String),
    WrongInterfaceKind(String, DataPath),
    UnsupportedSubinterface(String, String),
    InvalidComponent(String),
    InvalidVlanId(u64),
    // Requested state violates a table invariant.
    UnknownInterface(String),
    InterfaceExists(String),
    InterfaceInLag(String, String),
    InterfaceHasL3State(String, Vec<IpNetwork>),
    InterfaceHasVlanState(String),
    LagHasMembers(String, Vec<String>),
    DependencyConflict(String, Vec<Dependency>),
    VlanModeConflict(String, &'static str),
    CidrInUse(IpNetwork, String),
    RecreateLagRequired(String),
    LagTypeRequired(String),
    LacpNotSupported(String),
    OrphanIpComponent(String, String),
    InvalidBreakoutMode(String),
    PortSplitConflict(String, String),
    IndexSpaceExhausted(&'static str),
    // Downstream failures.
    Downstream(String, SwitchError),
    DownstreamTimeout(String),
    ApplyAborted(String, Box<Error>),
    RollbackFailed(String, Box<Error>, Vec<String>),
    // Internal consistency errors.
    UnprocessedChanges(Vec<String>),
    DuplicateCommand(String),
    InvalidCommandState(String, bool),
    InvalidAppend(String, String),
    InconsistentTables(String),
}

// Error classes, as reported to gNMI clients.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    InvalidArgument,
    FailedPrecondition,
    Aborted,
    Internal,
}

// ===== impl Error =====

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::UnknownPath(..)
            | Error::InvalidValue(..)
            | Error::MalformedIfName(..)
            | Error::UnsupportedInterface(..)
            | Error::WrongInterfaceKind(..)
            | Error::UnsupportedSubinterface(..)
            | Error::InvalidComponent(..)
            | Error::InvalidVlanId(..) => ErrorKind::InvalidArgument,
            Error::UnknownInterface(..)
            | Error::InterfaceExists(..)
            | Error::InterfaceInLag(..)
            | Error::InterfaceHasL3State(..)
            | Error::InterfaceHasVlanState(..)
            | Error::LagHasMembers(..)
            | Error::DependencyConflict(..)
            | Error::VlanModeConflict(..)
            | Error::CidrInUse(..)
            | Error::RecreateLagRequired(..)
            | Error::LagTypeRequired(..)
            | Error::LacpNotSupported(..)
            | Error::OrphanIpComponent(..)
            | Error::InvalidBreakoutMode(..)
            | Error::PortSplitConflict(..)
            | Error::IndexSpaceExhausted(..) => ErrorKind::FailedPrecondition,
            Error::Downstream(..)
            | Error::DownstreamTimeout(..)
            | Error::ApplyAborted(..) => ErrorKind::Aborted,
            Error::RollbackFailed(..)
            | Error::UnprocessedChanges(..)
            | Error::DuplicateCommand(..)
            | Error::InvalidCommandState(..)
            | Error::InvalidAppend(..)
            | Error::InconsistentTables(..) => ErrorKind::Internal,
        }
    }

    // Picks the most relevant error for an interface that can't be removed
    // or reshaped because of the given dependencies.
    pub(crate) fn from_dependencies(
        ifname: &str,
        dependencies: Vec<Dependency>,
    ) -> Error {
        let addrs = dependencies
            .iter()
            .filter_map(|dep| match dep {
                Dependency::Address(addr) => Some(*addr),
                _ => None,
            })
            .collect::<Vec<_>>();
        if !addrs.is_empty() {
            return Error::InterfaceHasL3State(ifname.to_owned(), addrs);
        }
        if let Some(lag) = dependencies.iter().find_map(|dep| match dep {
            Dependency::LagMember(lag) => Some(lag.clone()),
            _ => None,
        }) {
            return Error::InterfaceInLag(ifname.to_owned(), lag);
        }
        if dependencies.iter().any(Dependency::is_vlan) {
            return Error::InterfaceHasVlanState(ifname.to_owned());
        }
        if let Some(members) = dependencies.iter().find_map(|dep| match dep {
            Dependency::LagMembers(members) => Some(members.clone()),
            _ => None,
        }) {
            return Error::LagHasMembers(ifname.to_owned(), members);
        }
        Error::DependencyConflict(ifname.to_owned(), dependencies)
    }

    pub fn log(&self) {
        match self {
            Error::UnknownPath(path)
            | Error::InvalidValue(path)
            | Error::WrongInterfaceKind(_, path) => {
                warn!(%path, "{}", self);
            }
            Error::Downstream(command, error) => {
                warn!(%command, %error, "{}", self);
            }
            Error::DownstreamTimeout(command) => {
                warn!(%command, "{}", self);
            }
            Error::ApplyAborted(command, error) => {
                warn!(%command, %error, "{}", self);
            }
            Error::RollbackFailed(command, error, failures) => {
                error!(
                    %command,
                    %error,
                    failures = %failures.iter().join(", "),
                    "{}", self
                );
            }
            Error::UnprocessedChanges(..)
            | Error::DuplicateCommand(..)
            | Error::InvalidCommandState(..)
            | Error::InvalidAppend(..)
            | Error::InconsistentTables(..) => {
                error!("{}", self);
            }
            _ => {
                warn!("{}", self);
            }
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownPath(path) => {
                write!(f, "unknown configuration path {path}")
            }
            Error::InvalidValue(path) => {
                write!(f, "invalid value for {path}")
            }
            Error::MalformedIfName(ifname) => {
                write!(f, "malformed interface name: {ifname}")
            }
            Error::UnsupportedInterface(ifname) => {
                write!(f, "unsupported interface: {ifname}")
            }
            Error::WrongInterfaceKind(ifname, path) => {
                write!(f, "{path} isn't applicable to interface {ifname}")
            }
            Error::UnsupportedSubinterface(ifname, index) => {
                write!(
                    f,
                    "unsupported subinterface {index} on interface {ifname}"
                )
            }
            Error::InvalidComponent(name) => {
                write!(f, "invalid port component: {name}")
            }
            Error::InvalidVlanId(vid) => {
                write!(f, "invalid VLAN ID: {vid}")
            }
            Error::UnknownInterface(ifname) => {
                write!(f, "interface {ifname} isn't configured")
            }
            Error::InterfaceExists(ifname) => {
                write!(f, "interface {ifname} already exists")
            }
            Error::InterfaceInLag(ifname, lag) => {
                write!(f, "interface {ifname} is in LAG {lag}")
            }
            Error::InterfaceHasL3State(ifname, addrs) => {
                write!(
                    f,
                    "interface {ifname} has L3 state ({})",
                    addrs.iter().join(", ")
                )
            }
            Error::InterfaceHasVlanState(ifname) => {
                write!(f, "interface {ifname} has VLAN state")
            }
            Error::LagHasMembers(lag, members) => {
                write!(
                    f,
                    "LAG {lag} has members ({})",
                    members.iter().join(", ")
                )
            }
            Error::DependencyConflict(ifname, dependencies) => {
                write!(
                    f,
                    "interface {ifname} is still referenced ({})",
                    dependencies.iter().join(", ")
                )
            }
            Error::VlanModeConflict(ifname, reason) => {
                write!(f, "VLAN mode conflict on {ifname}: {reason}")
            }
            Error::CidrInUse(addr, ifname) => {
                write!(f, "CIDR {addr} in use by interface {ifname}")
            }
            Error::RecreateLagRequired(lag) => {
                write!(
                    f,
                    "changing the type of LAG {lag} requires deleting and \
                     recreating it"
                )
            }
            Error::LagTypeRequired(lag) => {
                write!(f, "LAG {lag} requires a LAG type")
            }
            Error::LacpNotSupported(lag) => {
                write!(f, "LAG {lag} isn't an LACP aggregate")
            }
            Error::OrphanIpComponent(ifname, addr) => {
                write!(
                    f,
                    "address {addr} on interface {ifname} needs both an IP \
                     and a prefix length"
                )
            }
            Error::InvalidBreakoutMode(port) => {
                write!(f, "invalid breakout mode for port {port}")
            }
            Error::PortSplitConflict(port, ifname) => {
                write!(
                    f,
                    "interface {ifname} conflicts with the breakout mode of \
                     port {port}"
                )
            }
            Error::IndexSpaceExhausted(space) => {
                write!(f, "{space} index space exhausted")
            }
            Error::Downstream(command, error) => {
                write!(f, "switch rejected {command}: {error}")
            }
            Error::DownstreamTimeout(command) => {
                write!(f, "switch didn't answer {command} in time")
            }
            Error::ApplyAborted(_, error) => {
                write!(f, "{error} (rolled back)")
            }
            Error::RollbackFailed(_, error, failures) => {
                write!(
                    f,
                    "{error} (rollback failed: {}; switch state is \
                     inconsistent)",
                    failures.iter().join("; ")
                )
            }
            Error::UnprocessedChanges(changes) => {
                write!(
                    f,
                    "changes left unprocessed: {}",
                    changes.iter().join("; ")
                )
            }
            Error::DuplicateCommand(key) => {
                write!(f, "duplicate command for {key}")
            }
            Error::InvalidCommandState(name, executed) => {
                let state = if *executed { "executed" } else { "pending" };
                write!(f, "command {name} is {state}")
            }
            Error::InvalidAppend(name, other) => {
                write!(f, "can't append {other} to {name}")
            }
            Error::InconsistentTables(reason) => {
                write!(f, "lookup tables out of sync: {reason}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Downstream(_, error) => Some(error),
            Error::ApplyAborted(_, error)
            | Error::RollbackFailed(_, error, _) => Some(error.as_ref()),
            _ => None,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::InvalidArgument => write!(f, "invalid argument"),
            ErrorKind::FailedPrecondition => write!(f, "failed precondition"),
            ErrorKind::Aborted => write!(f, "aborted"),
            ErrorKind::Internal => write!(f, "internal"),
        }
    }
}
