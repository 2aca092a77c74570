//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Downstream switch service.
//!
//! Commands drive the switch through the [`SwitchClient`] trait, one request
//! per primitive operation. [`SimulatedSwitch`] is an in-memory
//! implementation that keeps the resulting switch state, used when no
//! hardware service is available and throughout the test suite.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use ipnetwork::IpNetwork;
use itertools::Itertools;
use ocsw_northbound::configuration::LeafValue;
use ocsw_yang::ToYang;
use ocsw_yang::device::{AggregationType, VlanModeType};

use crate::tables::{BreakoutMode, LacpAttr, PortAttr, Vid};

// Client of the downstream switch service.
#[async_trait]
pub trait SwitchClient: std::fmt::Debug + Send + Sync {
    async fn send(&self, request: SwitchRequest) -> Result<(), SwitchError>;
}

// Downstream switch requests.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SwitchRequest {
    CreateEthernetIntf {
        ifname: String,
    },
    DeleteEthernetIntf {
        ifname: String,
    },
    CreateAggregateIntf {
        ifname: String,
        lag_type: AggregationType,
    },
    DeleteAggregateIntf {
        ifname: String,
    },
    AddEthernetIntfToAggregateIntf {
        lag: String,
        members: Vec<String>,
    },
    RemoveEthernetIntfFromAggregateIntf {
        lag: String,
        members: Vec<String>,
    },
    SetPortBreakout {
        port: String,
        mode: BreakoutMode,
    },
    SetIpAddress {
        ifname: String,
        addr: IpNetwork,
    },
    DeleteIpAddress {
        ifname: String,
        addr: IpNetwork,
    },
    SetVlanMode {
        ifname: String,
        mode: Option<VlanModeType>,
    },
    AddVlanMembers {
        ifname: String,
        tagging: VlanTagging,
        vids: Vec<Vid>,
    },
    RemoveVlanMembers {
        ifname: String,
        tagging: VlanTagging,
        vids: Vec<Vid>,
    },
    // Attributes without a value are reset to their defaults.
    SetPortAttributes {
        ifname: String,
        attrs: BTreeMap<PortAttr, Option<LeafValue>>,
    },
    SetLacp {
        ifname: String,
        attrs: BTreeMap<LacpAttr, Option<LeafValue>>,
    },
    DeleteLacp {
        ifname: String,
    },
}

// How an interface carries a VLAN.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum VlanTagging {
    Access,
    Native,
    Trunk,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SwitchError {
    // The switch refused the request.
    Rejected(String),
    // The switch couldn't be reached.
    Unavailable(String),
}

// Simulated switch.
#[derive(Debug, Default)]
pub struct SimulatedSwitch {
    inner: Mutex<Simulation>,
}

#[derive(Debug, Default)]
struct Simulation {
    state: SwitchState,
    log: Vec<SwitchRequest>,
    failure: FailurePolicy,
    delay: Option<Duration>,
}

// Failure injection policy of the simulated switch.
#[derive(Clone, Copy, Debug, Default)]
pub enum FailurePolicy {
    #[default]
    Never,
    Always,
    // Fail every request once the given number of requests succeeded.
    After(usize),
    // Fail every request matching the predicate.
    Matching(fn(&SwitchRequest) -> bool),
}

// Observable state of the simulated switch.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SwitchState {
    pub ethernet: BTreeSet<String>,
    pub aggregates: BTreeMap<String, AggregationType>,
    pub members: BTreeMap<String, BTreeSet<String>>,
    pub breakout: BTreeMap<String, BreakoutMode>,
    pub addresses: BTreeMap<String, BTreeSet<IpNetwork>>,
    pub vlan_modes: BTreeMap<String, VlanModeType>,
    pub vlans: BTreeMap<(String, VlanTagging), BTreeSet<Vid>>,
    pub port_attrs: BTreeMap<String, BTreeMap<PortAttr, LeafValue>>,
    pub lacp: BTreeMap<String, BTreeMap<LacpAttr, LeafValue>>,
}

// ===== impl SwitchRequest =====

impl SwitchRequest {
    pub fn name(&self) -> &'static str {
        match self {
            SwitchRequest::CreateEthernetIntf { .. } => "CreateEthernetIntf",
            SwitchRequest::DeleteEthernetIntf { .. } => "DeleteEthernetIntf",
            SwitchRequest::CreateAggregateIntf { .. } => "CreateAggregateIntf",
            SwitchRequest::DeleteAggregateIntf { .. } => "DeleteAggregateIntf",
            SwitchRequest::AddEthernetIntfToAggregateIntf { .. } => {
                "AddEthernetIntfToAggregateIntf"
            }
            SwitchRequest::RemoveEthernetIntfFromAggregateIntf { .. } => {
                "RemoveEthernetIntfFromAggregateIntf"
            }
            SwitchRequest::SetPortBreakout { .. } => "SetPortBreakout",
            SwitchRequest::SetIpAddress { .. } => "SetIpAddress",
            SwitchRequest::DeleteIpAddress { .. } => "DeleteIpAddress",
            SwitchRequest::SetVlanMode { .. } => "SetVlanMode",
            SwitchRequest::AddVlanMembers { .. } => "AddVlanMembers",
            SwitchRequest::RemoveVlanMembers { .. } => "RemoveVlanMembers",
            SwitchRequest::SetPortAttributes { .. } => "SetPortAttributes",
            SwitchRequest::SetLacp { .. } => "SetLacp",
            SwitchRequest::DeleteLacp { .. } => "DeleteLacp",
        }
    }
}

impl std::fmt::Display for SwitchRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())?;
        match self {
            SwitchRequest::CreateEthernetIntf { ifname }
            | SwitchRequest::DeleteEthernetIntf { ifname }
            | SwitchRequest::DeleteAggregateIntf { ifname }
            | SwitchRequest::DeleteLacp { ifname } => write!(f, " {ifname}"),
            SwitchRequest::CreateAggregateIntf { ifname, lag_type } => {
                write!(f, " {ifname} {}", lag_type.to_yang())
            }
            SwitchRequest::AddEthernetIntfToAggregateIntf { lag, members }
            | SwitchRequest::RemoveEthernetIntfFromAggregateIntf {
                lag,
                members,
            } => write!(f, " {lag} [{}]", members.iter().join(", ")),
            SwitchRequest::SetPortBreakout { port, mode } => {
                write!(f, " {port} {mode}")
            }
            SwitchRequest::SetIpAddress { ifname, addr }
            | SwitchRequest::DeleteIpAddress { ifname, addr } => {
                write!(f, " {ifname} {addr}")
            }
            SwitchRequest::SetVlanMode { ifname, mode } => match mode {
                Some(mode) => write!(f, " {ifname} {}", mode.to_yang()),
                None => write!(f, " {ifname} none"),
            },
            SwitchRequest::AddVlanMembers {
                ifname,
                tagging,
                vids,
            }
            | SwitchRequest::RemoveVlanMembers {
                ifname,
                tagging,
                vids,
            } => {
                write!(f, " {ifname} {tagging:?} [{}]", vids.iter().join(", "))
            }
            SwitchRequest::SetPortAttributes { ifname, attrs } => {
                write!(f, " {ifname}")?;
                write_attrs(f, attrs)
            }
            SwitchRequest::SetLacp { ifname, attrs } => {
                write!(f, " {ifname}")?;
                write_attrs(f, attrs)
            }
        }
    }
}

// ===== impl SwitchError =====

impl std::fmt::Display for SwitchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchError::Rejected(reason) => {
                write!(f, "request rejected: {reason}")
            }
            SwitchError::Unavailable(reason) => {
                write!(f, "switch unavailable: {reason}")
            }
        }
    }
}

impl std::error::Error for SwitchError {}

// ===== impl SimulatedSwitch =====

impl SimulatedSwitch {
    pub fn new() -> SimulatedSwitch {
        Default::default()
    }

    pub fn set_failure(&self, failure: FailurePolicy) {
        self.inner.lock().unwrap().failure = failure;
    }

    // Delays every answer, for exercising request deadlines.
    pub fn set_delay(&self, delay: Option<Duration>) {
        self.inner.lock().unwrap().delay = delay;
    }

    pub fn state(&self) -> SwitchState {
        self.inner.lock().unwrap().state.clone()
    }

    // Requests accepted so far, in arrival order.
    pub fn log(&self) -> Vec<SwitchRequest> {
        self.inner.lock().unwrap().log.clone()
    }

    pub fn clear_log(&self) {
        self.inner.lock().unwrap().log.clear();
    }
}

#[async_trait]
impl SwitchClient for SimulatedSwitch {
    async fn send(&self, request: SwitchRequest) -> Result<(), SwitchError> {
        let delay = self.inner.lock().unwrap().delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut sim = self.inner.lock().unwrap();
        let fail = match &mut sim.failure {
            FailurePolicy::Never => false,
            FailurePolicy::Always => true,
            FailurePolicy::After(0) => true,
            FailurePolicy::After(remaining) => {
                *remaining -= 1;
                false
            }
            FailurePolicy::Matching(predicate) => predicate(&request),
        };
        if fail {
            return Err(SwitchError::Unavailable("injected failure".to_owned()));
        }

        sim.state.apply(&request)?;
        sim.log.push(request);
        Ok(())
    }
}

// ===== impl SwitchState =====

impl SwitchState {
    // Applies a request. Requests that don't fit the current state are
    // rejected without side effects.
    fn apply(&mut self, request: &SwitchRequest) -> Result<(), SwitchError> {
        let reject = |reason: String| Err(SwitchError::Rejected(reason));

        match request {
            SwitchRequest::CreateEthernetIntf { ifname } => {
                if !self.ethernet.insert(ifname.clone()) {
                    return reject(format!("{ifname} exists"));
                }
            }
            SwitchRequest::DeleteEthernetIntf { ifname } => {
                if self.members.values().any(|set| set.contains(ifname)) {
                    return reject(format!("{ifname} is a LAG member"));
                }
                if !self.ethernet.remove(ifname) {
                    return reject(format!("{ifname} doesn't exist"));
                }
            }
            SwitchRequest::CreateAggregateIntf { ifname, lag_type } => {
                if self.aggregates.contains_key(ifname) {
                    return reject(format!("{ifname} exists"));
                }
                self.aggregates.insert(ifname.clone(), *lag_type);
            }
            SwitchRequest::DeleteAggregateIntf { ifname } => {
                if self.members.contains_key(ifname) {
                    return reject(format!("{ifname} has members"));
                }
                if self.aggregates.remove(ifname).is_none() {
                    return reject(format!("{ifname} doesn't exist"));
                }
            }
            SwitchRequest::AddEthernetIntfToAggregateIntf { lag, members } => {
                if !self.aggregates.contains_key(lag) {
                    return reject(format!("{lag} doesn't exist"));
                }
                for member in members {
                    let in_lag =
                        self.members.values().any(|set| set.contains(member));
                    if !self.ethernet.contains(member) || in_lag {
                        return reject(format!("{member} can't join {lag}"));
                    }
                }
                self.members
                    .entry(lag.clone())
                    .or_default()
                    .extend(members.iter().cloned());
            }
            SwitchRequest::RemoveEthernetIntfFromAggregateIntf {
                lag,
                members,
            } => {
                let Some(current) = self.members.get_mut(lag) else {
                    return reject(format!("{lag} has no members"));
                };
                if !members.iter().all(|member| current.contains(member)) {
                    return reject(format!("unknown members of {lag}"));
                }
                for member in members {
                    current.remove(member);
                }
                if current.is_empty() {
                    self.members.remove(lag);
                }
            }
            SwitchRequest::SetPortBreakout { port, mode } => {
                if *mode == BreakoutMode::default() {
                    self.breakout.remove(port);
                } else {
                    self.breakout.insert(port.clone(), *mode);
                }
            }
            SwitchRequest::SetIpAddress { ifname, addr } => {
                let addrs = self.addresses.entry(ifname.clone()).or_default();
                if !addrs.insert(*addr) {
                    return reject(format!("{addr} exists on {ifname}"));
                }
            }
            SwitchRequest::DeleteIpAddress { ifname, addr } => {
                let removed = self
                    .addresses
                    .get_mut(ifname)
                    .is_some_and(|addrs| addrs.remove(addr));
                if !removed {
                    return reject(format!("{addr} not found on {ifname}"));
                }
                self.addresses.retain(|_, addrs| !addrs.is_empty());
            }
            SwitchRequest::SetVlanMode { ifname, mode } => match mode {
                Some(mode) => {
                    self.vlan_modes.insert(ifname.clone(), *mode);
                }
                None => {
                    self.vlan_modes.remove(ifname);
                }
            },
            SwitchRequest::AddVlanMembers {
                ifname,
                tagging,
                vids,
            } => {
                self.vlans
                    .entry((ifname.clone(), *tagging))
                    .or_default()
                    .extend(vids.iter().copied());
            }
            SwitchRequest::RemoveVlanMembers {
                ifname,
                tagging,
                vids,
            } => {
                if let Some(current) =
                    self.vlans.get_mut(&(ifname.clone(), *tagging))
                {
                    for vid in vids {
                        current.remove(vid);
                    }
                }
                self.vlans.retain(|_, vids| !vids.is_empty());
            }
            SwitchRequest::SetPortAttributes { ifname, attrs } => {
                apply_attrs(&mut self.port_attrs, ifname, attrs);
            }
            SwitchRequest::SetLacp { ifname, attrs } => {
                if !self.aggregates.contains_key(ifname) {
                    return reject(format!("{ifname} doesn't exist"));
                }
                // The entry outlives its attributes.
                let current = self.lacp.entry(ifname.clone()).or_default();
                for (attr, value) in attrs {
                    match value {
                        Some(value) => {
                            current.insert(*attr, value.clone());
                        }
                        None => {
                            current.remove(attr);
                        }
                    }
                }
            }
            SwitchRequest::DeleteLacp { ifname } => {
                if self.lacp.remove(ifname).is_none() {
                    return reject(format!("{ifname} has no LACP"));
                }
            }
        }

        Ok(())
    }
}

// ===== helper functions =====

fn write_attrs<A: std::fmt::Display>(
    f: &mut std::fmt::Formatter<'_>,
    attrs: &BTreeMap<A, Option<LeafValue>>,
) -> std::fmt::Result {
    for (attr, value) in attrs {
        match value {
            Some(value) => write!(f, " {attr}={value}")?,
            None => write!(f, " {attr}=default")?,
        }
    }
    Ok(())
}

fn apply_attrs(
    table: &mut BTreeMap<String, BTreeMap<PortAttr, LeafValue>>,
    ifname: &str,
    attrs: &BTreeMap<PortAttr, Option<LeafValue>>,
) {
    let current = table.entry(ifname.to_owned()).or_default();
    for (attr, value) in attrs {
        match value {
            Some(value) => {
                current.insert(*attr, value.clone());
            }
            None => {
                current.remove(attr);
            }
        }
    }
    if current.is_empty() {
        table.remove(ifname);
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn simulated_lag() {
        let switch = SimulatedSwitch::new();
        for ifname in ["eth-1", "eth-2"] {
            switch
                .send(SwitchRequest::CreateEthernetIntf {
                    ifname: ifname.to_owned(),
                })
                .await
                .unwrap();
        }
        switch
            .send(SwitchRequest::CreateAggregateIntf {
                ifname: "ae0".to_owned(),
                lag_type: AggregationType::Lacp,
            })
            .await
            .unwrap();
        switch
            .send(SwitchRequest::AddEthernetIntfToAggregateIntf {
                lag: "ae0".to_owned(),
                members: vec!["eth-1".to_owned(), "eth-2".to_owned()],
            })
            .await
            .unwrap();

        let state = switch.state();
        assert_eq!(state.members["ae0"].len(), 2);
        let error = switch
            .send(SwitchRequest::DeleteAggregateIntf {
                ifname: "ae0".to_owned(),
            })
            .await
            .unwrap_err();
        assert!(matches!(error, SwitchError::Rejected(_)));
        assert_eq!(switch.state(), state);
        assert_eq!(switch.log().len(), 4);
    }

    #[tokio::test]
    async fn simulated_failures() {
        let switch = SimulatedSwitch::new();
        let request = |ifname: &str| SwitchRequest::CreateEthernetIntf {
            ifname: ifname.to_owned(),
        };

        switch.set_failure(FailurePolicy::After(1));
        switch.send(request("eth-1")).await.unwrap();
        assert!(switch.send(request("eth-2")).await.is_err());

        switch.set_failure(FailurePolicy::Matching(|request| {
            *request
                == SwitchRequest::CreateEthernetIntf {
                    ifname: "eth-3".to_owned(),
                }
        }));
        switch.send(request("eth-2")).await.unwrap();
        assert!(switch.send(request("eth-3")).await.is_err());
        assert_eq!(switch.state().ethernet.len(), 2);
    }

    #[test]
    fn request_display() {
        let request = SwitchRequest::RemoveEthernetIntfFromAggregateIntf {
            lag: "ae1".to_owned(),
            members: vec!["eth-1".to_owned(), "eth-2".to_owned()],
        };
        assert_eq!(
            request.to_string(),
            "RemoveEthernetIntfFromAggregateIntf ae1 [eth-1, eth-2]"
        );
    }
}
