//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Feature validators.
//!
//! Each feature module drains the changelog records it owns for a given
//! phase: it checks them against the transient lookup tables, updates the
//! tables, emits the corresponding commands and marks the records as
//! processed.

pub mod breakout;
pub mod ethernet;
pub mod ip;
pub mod lacp;
pub mod lag;
pub mod port;
pub mod vlan;

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::LazyLock as Lazy;
use std::time::Duration;

use ocsw_northbound::configuration::{
    Change, ChangeId, ChangeType, Changelog, LeafValue,
};
use ocsw_northbound::paths::{self, LeafKind};

use crate::command::{Command, CommandKind};
use crate::error::Error;
use crate::ifname::InterfaceKind;
use crate::southbound::SwitchClient;
use crate::tables::LookupTables;
use crate::transaction::{Phase, Transaction};

// Phase processor.
pub type Processor = fn(&mut Context<'_>, Phase) -> Result<(), Error>;

// Processors of every phase, in execution order.
pub static PROCESSORS: Lazy<BTreeMap<Phase, Processor>> =
    Lazy::new(load_processors);

// Operations handled by the creation phases.
pub(crate) const SET_OPS: [ChangeType; 2] =
    [ChangeType::Create, ChangeType::Update];
// Operations handled by the tear-down phases.
pub(crate) const DELETE_OPS: [ChangeType; 1] = [ChangeType::Delete];

// State shared by the phase processors of a transaction.
pub struct Context<'a> {
    pub changelog: &'a mut Changelog,
    pub tables: &'a mut LookupTables,
    pub transaction: &'a mut Transaction,
    client: Arc<dyn SwitchClient>,
    deadline: Duration,
}

// ===== impl Context =====

impl<'a> Context<'a> {
    pub fn new(
        changelog: &'a mut Changelog,
        tables: &'a mut LookupTables,
        transaction: &'a mut Transaction,
        client: Arc<dyn SwitchClient>,
        deadline: Duration,
    ) -> Context<'a> {
        Context {
            changelog,
            tables,
            transaction,
            client,
            deadline,
        }
    }

    // Returns the first unprocessed record of one of the given leaf kinds
    // and operations, further filtered by the given predicate.
    pub(crate) fn find<F>(
        &self,
        leaves: &[LeafKind],
        ops: &[ChangeType],
        predicate: F,
    ) -> Option<(ChangeId, LeafKind)>
    where
        F: Fn(LeafKind, &Change) -> bool,
    {
        self.changelog.unprocessed().find_map(|(id, change)| {
            let kind = LeafKind::classify(&change.path)?;
            (leaves.contains(&kind)
                && ops.contains(&change.op)
                && predicate(kind, change))
            .then_some((id, kind))
        })
    }

    // Like `find`, restricted to records of the given interface kind.
    pub(crate) fn find_by_kind(
        &self,
        leaves: &[LeafKind],
        ops: &[ChangeType],
        iface_kind: InterfaceKind,
    ) -> Option<(ChangeId, LeafKind)> {
        self.find(leaves, ops, |kind, change| {
            self.tables
                .parse_ifname(change.path.token(kind.ifname_pos()))
                .is_ok_and(|name| name.kind() == iface_kind)
        })
    }

    // Returns every unprocessed record of the given leaf kinds and
    // operations that belongs to the given interface.
    pub(crate) fn find_all(
        &self,
        leaves: &[LeafKind],
        ops: &[ChangeType],
        ifname: &str,
    ) -> Vec<(ChangeId, LeafKind)> {
        self.changelog
            .unprocessed()
            .filter_map(|(id, change)| {
                let kind = LeafKind::classify(&change.path)?;
                (leaves.contains(&kind)
                    && ops.contains(&change.op)
                    && change.path.token(kind.ifname_pos()) == ifname)
                    .then_some((id, kind))
            })
            .collect()
    }

    // Marks a record as processed, returning a copy of it.
    pub(crate) fn take(&mut self, id: ChangeId) -> Change {
        self.changelog.mark_processed(id);
        self.changelog.get(id).clone()
    }

    // Emits a command in the given phase.
    pub(crate) fn add_command(
        &mut self,
        phase: Phase,
        kind: CommandKind,
        key: String,
        changes: Vec<Change>,
    ) -> Result<(), Error> {
        let command = Command::new(
            kind,
            key,
            changes,
            self.client.clone(),
            self.deadline,
        );
        self.transaction.add(phase, command)
    }
}

// ===== global functions =====

// Checks that every record names a known leaf of a supported interface and
// carries a value of the expected type.
pub fn validate_changes(
    changelog: &Changelog,
    tables: &LookupTables,
) -> Result<(), Error> {
    for (_, change) in changelog.unprocessed() {
        validate_change(change, tables)?;
    }
    Ok(())
}

// Turns updates that can't be applied in place into a deletion of the old
// value followed by a creation of the new one.
pub fn split_moves(changelog: &mut Changelog) {
    let updates = changelog
        .unprocessed()
        .filter(|(_, change)| change.op == ChangeType::Update)
        .filter_map(|(id, change)| {
            LeafKind::classify(&change.path).map(|kind| (id, kind))
        })
        .filter(|(_, kind)| {
            matches!(
                kind,
                LeafKind::EthAggregateId
                    | LeafKind::EthVlanMode
                    | LeafKind::EthAccessVlan
                    | LeafKind::EthNativeVlan
                    | LeafKind::AggVlanMode
                    | LeafKind::AggAccessVlan
                    | LeafKind::AggNativeVlan
                    | LeafKind::Ipv4PrefixLength
                    | LeafKind::Ipv6PrefixLength
            )
        })
        .collect::<Vec<_>>();

    for (id, kind) in updates {
        let path = changelog.get(id).path.clone();
        if changelog.split_update(id).is_none() {
            continue;
        }

        // The address itself is unchanged, but it has to be removed and
        // installed again along with its new prefix length.
        if matches!(
            kind,
            LeafKind::Ipv4PrefixLength | LeafKind::Ipv6PrefixLength
        ) {
            let ip = path.token(paths::ADDRESS_POS).to_owned();
            let ip = LeafValue::String(ip);
            let path = path.with_leaf(paths::IP);
            changelog.push(Change::delete(path.clone(), ip.clone()));
            changelog.push(Change::create(path, ip));
        }
    }
}

// ===== helper functions =====

fn load_processors() -> BTreeMap<Phase, Processor> {
    let processors: [(Phase, Processor); 35] = [
        (Phase::DeleteIpv4Eth, ip::process),
        (Phase::DeleteIpv4Lag, ip::process),
        (Phase::DeleteIpv6Eth, ip::process),
        (Phase::DeleteIpv6Lag, ip::process),
        (Phase::DeleteAccessVlanEth, vlan::process),
        (Phase::DeleteNativeVlanEth, vlan::process),
        (Phase::DeleteTrunkVlanEth, vlan::process),
        (Phase::DeleteVlanModeEth, vlan::process),
        (Phase::DeleteAccessVlanLag, vlan::process),
        (Phase::DeleteNativeVlanLag, vlan::process),
        (Phase::DeleteTrunkVlanLag, vlan::process),
        (Phase::DeleteVlanModeLag, vlan::process),
        (Phase::DeleteLacp, lacp::process),
        (Phase::DeletePortAttr, port::process),
        (Phase::DeleteLagMember, lag::process_members),
        (Phase::DeleteLag, lag::process),
        (Phase::DeleteEthernet, ethernet::process),
        (Phase::PortBreakout, breakout::process),
        (Phase::SetEthernet, ethernet::process),
        (Phase::SetLag, lag::process),
        (Phase::SetLagMember, lag::process_members),
        (Phase::SetPortAttr, port::process),
        (Phase::SetIpv4Eth, ip::process),
        (Phase::SetIpv4Lag, ip::process),
        (Phase::SetIpv6Eth, ip::process),
        (Phase::SetIpv6Lag, ip::process),
        (Phase::SetVlanModeEth, vlan::process),
        (Phase::SetVlanModeLag, vlan::process),
        (Phase::SetAccessVlanEth, vlan::process),
        (Phase::SetNativeVlanEth, vlan::process),
        (Phase::SetTrunkVlanEth, vlan::process),
        (Phase::SetAccessVlanLag, vlan::process),
        (Phase::SetNativeVlanLag, vlan::process),
        (Phase::SetTrunkVlanLag, vlan::process),
        (Phase::SetLacp, lacp::process),
    ];
    processors.into_iter().collect()
}

fn validate_change(
    change: &Change,
    tables: &LookupTables,
) -> Result<(), Error> {
    let Some(kind) = LeafKind::classify(&change.path) else {
        return Err(Error::UnknownPath(change.path.clone()));
    };
    let ifname = change.path.token(kind.ifname_pos());
    let name = tables.parse_ifname(ifname)?;

    let wrong_kind = || {
        Error::WrongInterfaceKind(ifname.to_owned(), change.path.clone())
    };
    match kind {
        LeafKind::BreakoutNumChannels | LeafKind::BreakoutChannelSpeed => {
            if !name.is_port() {
                return Err(Error::InvalidComponent(ifname.to_owned()));
            }
        }
        _ if kind.is_ethernet() => {
            if name.kind() != InterfaceKind::Ethernet {
                return Err(wrong_kind());
            }
        }
        _ if kind.is_aggregation() => {
            if name.kind() != InterfaceKind::Aggregate {
                return Err(wrong_kind());
            }
        }
        _ => (),
    }

    if kind.is_address() {
        let index = change.path.token(paths::SUBIF_POS);
        if index != paths::SUBIF_INDEX {
            return Err(Error::UnsupportedSubinterface(
                ifname.to_owned(),
                index.to_owned(),
            ));
        }
        let addr = change
            .path
            .token(paths::ADDRESS_POS)
            .parse::<IpAddr>()
            .map_err(|_| Error::InvalidValue(change.path.clone()))?;
        let ipv4 =
            matches!(kind, LeafKind::Ipv4Ip | LeafKind::Ipv4PrefixLength);
        if addr.is_ipv4() != ipv4 {
            return Err(Error::InvalidValue(change.path.clone()));
        }
    }

    for value in change.from.iter().chain(change.to.iter()) {
        if !value_fits(kind, value) {
            return Err(Error::InvalidValue(change.path.clone()));
        }
    }

    Ok(())
}

fn value_fits(kind: LeafKind, value: &LeafValue) -> bool {
    match kind {
        LeafKind::IntfEnabled | LeafKind::EthAutoNegotiate => value.is_bool(),
        LeafKind::IntfMtu
        | LeafKind::AggMinLinks
        | LeafKind::Ipv4PrefixLength
        | LeafKind::Ipv6PrefixLength
        | LeafKind::EthAccessVlan
        | LeafKind::EthNativeVlan
        | LeafKind::EthTrunkVlan
        | LeafKind::AggAccessVlan
        | LeafKind::AggNativeVlan
        | LeafKind::AggTrunkVlan
        | LeafKind::BreakoutNumChannels => value.is_uint(),
        _ => value.is_string(),
    }
}

// Returns the interface a record belongs to.
pub(crate) fn ifname_of(change: &Change, kind: LeafKind) -> String {
    change.path.token(kind.ifname_pos()).to_owned()
}

// Interface kind served by a phase, for phases split per kind.
pub(crate) fn phase_kind(phase: Phase) -> InterfaceKind {
    match phase {
        Phase::DeleteIpv4Lag
        | Phase::DeleteIpv6Lag
        | Phase::DeleteAccessVlanLag
        | Phase::DeleteNativeVlanLag
        | Phase::DeleteTrunkVlanLag
        | Phase::DeleteVlanModeLag
        | Phase::DeleteLag
        | Phase::SetLag
        | Phase::SetIpv4Lag
        | Phase::SetIpv6Lag
        | Phase::SetVlanModeLag
        | Phase::SetAccessVlanLag
        | Phase::SetNativeVlanLag
        | Phase::SetTrunkVlanLag => InterfaceKind::Aggregate,
        _ => InterfaceKind::Ethernet,
    }
}

// ===== unit tests =====
