//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use derive_new::new;
use ocsw_northbound::configuration::{Change, ChangeType};
use ocsw_northbound::paths::{self, LeafKind};
use ocsw_yang::TryFromYang;
use ocsw_yang::device::{AggregationType, PortSpeed, VlanModeType};

use crate::debug::Debug;
use crate::error::Error;
use crate::southbound::{SwitchClient, SwitchRequest, VlanTagging};
use crate::tables::{BreakoutMode, LacpAttr, PortAttr};

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum CommandKind {
    SetEthernet,
    DeleteEthernet,
    SetLag,
    DeleteLag,
    SetLagMember,
    DeleteLagMember,
    SetPortBreakout,
    SetIpv4,
    DeleteIpv4,
    SetIpv6,
    DeleteIpv6,
    SetVlanMode,
    DeleteVlanMode,
    SetAccessVlan,
    DeleteAccessVlan,
    SetNativeVlan,
    DeleteNativeVlan,
    SetTrunkVlan,
    DeleteTrunkVlan,
    SetPortAttr,
    DeletePortAttr,
    SetLacp,
    DeleteLacp,
}

// Reversible unit of work against the switch.
//
// A command records the configuration changes it applies. Once executed,
// the recorded changes are inverted so that running the command again
// reverts it.
#[derive(Debug, new)]
pub struct Command {
    kind: CommandKind,
    key: String,
    changes: Vec<Change>,
    client: Arc<dyn SwitchClient>,
    deadline: Duration,
    #[new(default)]
    executed: bool,
}

// ===== impl CommandKind =====

impl CommandKind {
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::SetEthernet => "create-eth",
            CommandKind::DeleteEthernet => "delete-eth",
            CommandKind::SetLag => "create-agg",
            CommandKind::DeleteLag => "delete-agg",
            CommandKind::SetLagMember => "add-members",
            CommandKind::DeleteLagMember => "remove-members",
            CommandKind::SetPortBreakout => "set-breakout",
            CommandKind::SetIpv4 => "add-ipv4",
            CommandKind::DeleteIpv4 => "delete-ipv4",
            CommandKind::SetIpv6 => "add-ipv6",
            CommandKind::DeleteIpv6 => "delete-ipv6",
            CommandKind::SetVlanMode => "set-vlan-mode",
            CommandKind::DeleteVlanMode => "delete-vlan-mode",
            CommandKind::SetAccessVlan => "set-access-vlan",
            CommandKind::DeleteAccessVlan => "delete-access-vlan",
            CommandKind::SetNativeVlan => "set-native-vlan",
            CommandKind::DeleteNativeVlan => "delete-native-vlan",
            CommandKind::SetTrunkVlan => "add-trunk-vlans",
            CommandKind::DeleteTrunkVlan => "remove-trunk-vlans",
            CommandKind::SetPortAttr => "set-port-attrs",
            CommandKind::DeletePortAttr => "reset-port-attrs",
            CommandKind::SetLacp => "set-lacp",
            CommandKind::DeleteLacp => "delete-lacp",
        }
    }

    // Commands that batch several subjects under a single key.
    pub fn is_appendable(&self) -> bool {
        matches!(
            self,
            CommandKind::SetLagMember
                | CommandKind::DeleteLagMember
                | CommandKind::SetTrunkVlan
                | CommandKind::DeleteTrunkVlan
        )
    }
}

// ===== impl Command =====

impl Command {
    pub fn kind(&self) -> CommandKind {
        self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn changes(&self) -> &[Change] {
        &self.changes
    }

    pub fn is_executed(&self) -> bool {
        self.executed
    }

    // Structural equality, ignoring the execution state and the client.
    pub fn equals(&self, other: &Command) -> bool {
        self.kind == other.kind
            && self.key == other.key
            && self.changes == other.changes
    }

    // Moves the changes of another command of the same kind and key into
    // this one.
    pub fn append(&mut self, other: &mut Command) -> Result<(), Error> {
        if !self.kind.is_appendable()
            || self.kind != other.kind
            || self.key != other.key
            || self.executed
            || other.executed
        {
            return Err(Error::InvalidAppend(
                self.to_string(),
                other.to_string(),
            ));
        }

        self.changes.append(&mut other.changes);
        Ok(())
    }

    pub async fn execute(&mut self) -> Result<(), Error> {
        if self.executed {
            return Err(Error::InvalidCommandState(self.to_string(), true));
        }

        Debug::CommandExecute(self).log();
        self.apply().await?;
        self.flip();
        self.executed = true;
        Ok(())
    }

    pub async fn undo(&mut self) -> Result<(), Error> {
        if !self.executed {
            return Err(Error::InvalidCommandState(self.to_string(), false));
        }

        Debug::CommandUndo(self).log();
        self.apply().await?;
        self.flip();
        self.executed = false;
        Ok(())
    }

    // Builds the switch request that applies the recorded changes.
    pub fn request(&self) -> Result<SwitchRequest, Error> {
        match self.kind {
            CommandKind::SetEthernet | CommandKind::DeleteEthernet => {
                let change = self.change(LeafKind::IntfName)?;
                let ifname = string_value(change)?.to_owned();
                Ok(match change.op {
                    ChangeType::Delete => {
                        SwitchRequest::DeleteEthernetIntf { ifname }
                    }
                    _ => SwitchRequest::CreateEthernetIntf { ifname },
                })
            }
            CommandKind::SetLag | CommandKind::DeleteLag => {
                let change = self.change(LeafKind::IntfName)?;
                let ifname = string_value(change)?.to_owned();
                if change.op == ChangeType::Delete {
                    return Ok(SwitchRequest::DeleteAggregateIntf { ifname });
                }
                let lag_type = self.change(LeafKind::AggLagType)?;
                Ok(SwitchRequest::CreateAggregateIntf {
                    ifname,
                    lag_type: enum_value::<AggregationType>(lag_type)?,
                })
            }
            CommandKind::SetLagMember | CommandKind::DeleteLagMember => {
                let op = self.uniform_op()?;
                let lag = self
                    .changes
                    .first()
                    .map(string_value)
                    .transpose()?
                    .unwrap_or_default()
                    .to_owned();
                let members = self
                    .changes
                    .iter()
                    .map(|change| change.path.token(paths::IFNAME_POS))
                    .map(str::to_owned)
                    .collect();
                Ok(match op {
                    ChangeType::Delete => {
                        SwitchRequest::RemoveEthernetIntfFromAggregateIntf {
                            lag,
                            members,
                        }
                    }
                    _ => SwitchRequest::AddEthernetIntfToAggregateIntf {
                        lag,
                        members,
                    },
                })
            }
            CommandKind::SetPortBreakout => {
                // Removed leaves fall back to their defaults.
                let default = BreakoutMode::default();
                let mut mode = default;
                for change in &self.changes {
                    match LeafKind::classify(&change.path) {
                        Some(LeafKind::BreakoutNumChannels) => {
                            mode.num_channels = match &change.to {
                                Some(_) => new_uint_value(change)?,
                                None => default.num_channels,
                            };
                        }
                        Some(LeafKind::BreakoutChannelSpeed) => {
                            mode.channel_speed = match &change.to {
                                Some(_) => new_enum_value::<PortSpeed>(change)?,
                                None => default.channel_speed,
                            };
                        }
                        _ => {
                            return Err(Error::UnknownPath(
                                change.path.clone(),
                            ));
                        }
                    }
                }
                Ok(SwitchRequest::SetPortBreakout {
                    port: self.key.clone(),
                    mode,
                })
            }
            CommandKind::SetIpv4
            | CommandKind::DeleteIpv4
            | CommandKind::SetIpv6
            | CommandKind::DeleteIpv6 => {
                let ip = self
                    .changes
                    .iter()
                    .find(|change| {
                        matches!(
                            LeafKind::classify(&change.path),
                            Some(LeafKind::Ipv4Ip | LeafKind::Ipv6Ip)
                        )
                    })
                    .ok_or_else(|| self.missing_change())?;
                let plen = self
                    .changes
                    .iter()
                    .find(|change| {
                        matches!(
                            LeafKind::classify(&change.path),
                            Some(
                                LeafKind::Ipv4PrefixLength
                                    | LeafKind::Ipv6PrefixLength
                            )
                        )
                    })
                    .ok_or_else(|| self.missing_change())?;
                let invalid = || Error::InvalidValue(ip.path.clone());
                let addr = string_value(ip)?
                    .parse::<IpAddr>()
                    .map_err(|_| invalid())?;
                let addr = ipnetwork::IpNetwork::new(addr, uint_value(plen)?)
                    .map_err(|_| invalid())?;
                let ifname = ip.path.token(paths::IFNAME_POS).to_owned();
                Ok(match ip.op {
                    ChangeType::Delete => {
                        SwitchRequest::DeleteIpAddress { ifname, addr }
                    }
                    _ => SwitchRequest::SetIpAddress { ifname, addr },
                })
            }
            CommandKind::SetVlanMode | CommandKind::DeleteVlanMode => {
                let change = self.single_change()?;
                let mode = match &change.to {
                    Some(_) => Some(new_enum_value::<VlanModeType>(change)?),
                    None => None,
                };
                Ok(SwitchRequest::SetVlanMode {
                    ifname: change.path.token(paths::IFNAME_POS).to_owned(),
                    mode,
                })
            }
            CommandKind::SetAccessVlan | CommandKind::DeleteAccessVlan => {
                self.vlan_request(VlanTagging::Access)
            }
            CommandKind::SetNativeVlan | CommandKind::DeleteNativeVlan => {
                self.vlan_request(VlanTagging::Native)
            }
            CommandKind::SetTrunkVlan | CommandKind::DeleteTrunkVlan => {
                self.vlan_request(VlanTagging::Trunk)
            }
            CommandKind::SetPortAttr | CommandKind::DeletePortAttr => {
                let mut attrs = BTreeMap::new();
                for change in &self.changes {
                    let attr = LeafKind::classify(&change.path)
                        .and_then(PortAttr::from_leaf)
                        .ok_or_else(|| {
                            Error::UnknownPath(change.path.clone())
                        })?;
                    attrs.insert(attr, change.to.clone());
                }
                Ok(SwitchRequest::SetPortAttributes {
                    ifname: self.key.clone(),
                    attrs,
                })
            }
            CommandKind::SetLacp | CommandKind::DeleteLacp => {
                let ifname = self.key.clone();
                let mut attrs = BTreeMap::new();
                for change in &self.changes {
                    match LeafKind::classify(&change.path) {
                        Some(LeafKind::LacpName) => {
                            if change.op == ChangeType::Delete {
                                return Ok(SwitchRequest::DeleteLacp { ifname });
                            }
                        }
                        Some(kind) => {
                            let attr = LacpAttr::from_leaf(kind).ok_or_else(
                                || Error::UnknownPath(change.path.clone()),
                            )?;
                            attrs.insert(attr, change.to.clone());
                        }
                        None => {
                            return Err(Error::UnknownPath(change.path.clone()));
                        }
                    }
                }
                Ok(SwitchRequest::SetLacp { ifname, attrs })
            }
        }
    }

    // ===== helper methods =====

    async fn apply(&self) -> Result<(), Error> {
        let request = self.request()?;
        match tokio::time::timeout(self.deadline, self.client.send(request))
            .await
        {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(Error::Downstream(self.to_string(), error)),
            Err(_) => Err(Error::DownstreamTimeout(self.to_string())),
        }
    }

    fn flip(&mut self) {
        for change in &mut self.changes {
            change.invert();
        }
    }

    fn missing_change(&self) -> Error {
        Error::InconsistentTables(format!("{self} is incomplete"))
    }

    fn change(&self, leaf: LeafKind) -> Result<&Change, Error> {
        self.changes
            .iter()
            .find(|change| LeafKind::classify(&change.path) == Some(leaf))
            .ok_or_else(|| self.missing_change())
    }

    fn single_change(&self) -> Result<&Change, Error> {
        match self.changes.as_slice() {
            [change] => Ok(change),
            _ => Err(self.missing_change()),
        }
    }

    // Operation shared by every recorded change.
    fn uniform_op(&self) -> Result<ChangeType, Error> {
        let mut ops = self.changes.iter().map(|change| change.op);
        let op = ops.next().ok_or_else(|| self.missing_change())?;
        if ops.any(|other| other != op) {
            return Err(Error::InconsistentTables(format!(
                "{self} mixes operations"
            )));
        }
        Ok(op)
    }

    fn vlan_request(
        &self,
        tagging: VlanTagging,
    ) -> Result<SwitchRequest, Error> {
        let op = self.uniform_op()?;
        let ifname = self
            .changes
            .first()
            .map(|change| change.path.token(paths::IFNAME_POS).to_owned())
            .unwrap_or_default();
        let vids = self
            .changes
            .iter()
            .map(uint_value)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(match op {
            ChangeType::Delete => SwitchRequest::RemoveVlanMembers {
                ifname,
                tagging,
                vids,
            },
            _ => SwitchRequest::AddVlanMembers {
                ifname,
                tagging,
                vids,
            },
        })
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", self.name(), self.key)
    }
}

// ===== helper functions =====

fn string_value(change: &Change) -> Result<&str, Error> {
    change
        .value()
        .and_then(|value| value.as_string())
        .map(String::as_str)
        .ok_or_else(|| Error::InvalidValue(change.path.clone()))
}

fn uint_value<T: TryFrom<u64>>(change: &Change) -> Result<T, Error> {
    change
        .value()
        .and_then(|value| value.to_uint())
        .ok_or_else(|| Error::InvalidValue(change.path.clone()))
}

fn enum_value<T: TryFromYang>(change: &Change) -> Result<T, Error> {
    change
        .value()
        .and_then(|value| value.to_enum())
        .ok_or_else(|| Error::InvalidValue(change.path.clone()))
}

fn new_uint_value<T: TryFrom<u64>>(change: &Change) -> Result<T, Error> {
    change
        .to
        .as_ref()
        .and_then(|value| value.to_uint())
        .ok_or_else(|| Error::InvalidValue(change.path.clone()))
}

fn new_enum_value<T: TryFromYang>(change: &Change) -> Result<T, Error> {
    change
        .to
        .as_ref()
        .and_then(|value| value.to_enum())
        .ok_or_else(|| Error::InvalidValue(change.path.clone()))
}

// ===== unit tests =====
