//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use derive_new::new;
use enum_as_inner::EnumAsInner;
use itertools::{EitherOrBoth, Itertools};
use ocsw_yang::device::{Device, Interface, SwitchedVlan};
use ocsw_yang::{ToYang, TryFromYang};
use serde::{Deserialize, Serialize};

use crate::debug::Debug;
use crate::paths::{self, DataPath};

// Value of a configuration leaf.
#[derive(Clone, Debug, EnumAsInner, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LeafValue {
    Bool(bool),
    Uint(u64),
    String(String),
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

// Single leaf-level configuration change.
#[derive(Clone, Debug, Eq, PartialEq, new)]
#[derive(Deserialize, Serialize)]
pub struct Change {
    pub op: ChangeType,
    pub path: DataPath,
    pub from: Option<LeafValue>,
    pub to: Option<LeafValue>,
}

// Identifier of a changelog record.
pub type ChangeId = usize;

// Work queue of configuration changes.
//
// Records are never removed. Consumers mark the records they handle as
// processed; a changelog is complete once every record is processed.
#[derive(Debug, Default)]
pub struct Changelog {
    entries: Vec<ChangelogEntry>,
}

#[derive(Debug)]
struct ChangelogEntry {
    change: Change,
    processed: bool,
}

// Flattened configuration: every leaf of the device tree indexed by path.
pub type ConfigLeaves = BTreeMap<DataPath, LeafValue>;

// ===== impl LeafValue =====

impl LeafValue {
    // Parses a leaf value as an enumeration or identity.
    pub fn to_enum<T: TryFromYang>(&self) -> Option<T> {
        self.as_string().and_then(|value| T::try_from_yang(value))
    }

    // Returns a numeric leaf value narrowed to the requested integer type.
    pub fn to_uint<T: TryFrom<u64>>(&self) -> Option<T> {
        self.as_uint().and_then(|value| T::try_from(*value).ok())
    }
}

impl std::fmt::Display for LeafValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LeafValue::Bool(value) => write!(f, "{value}"),
            LeafValue::Uint(value) => write!(f, "{value}"),
            LeafValue::String(value) => write!(f, "{value}"),
        }
    }
}

// ===== impl ChangeType =====

impl ChangeType {
    // Returns the operation that reverts this one.
    pub fn inverse(&self) -> ChangeType {
        match self {
            ChangeType::Create => ChangeType::Delete,
            ChangeType::Update => ChangeType::Update,
            ChangeType::Delete => ChangeType::Create,
        }
    }
}

impl std::fmt::Display for ChangeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeType::Create => write!(f, "CREATE"),
            ChangeType::Update => write!(f, "UPDATE"),
            ChangeType::Delete => write!(f, "DELETE"),
        }
    }
}

// ===== impl Change =====

impl Change {
    pub fn create(path: DataPath, to: LeafValue) -> Change {
        Change::new(ChangeType::Create, path, None, Some(to))
    }

    pub fn update(path: DataPath, from: LeafValue, to: LeafValue) -> Change {
        Change::new(ChangeType::Update, path, Some(from), Some(to))
    }

    pub fn delete(path: DataPath, from: LeafValue) -> Change {
        Change::new(ChangeType::Delete, path, Some(from), None)
    }

    // Returns the value the change is about: the new value for creations and
    // updates, the old value for deletions.
    pub fn value(&self) -> Option<&LeafValue> {
        match self.op {
            ChangeType::Create | ChangeType::Update => self.to.as_ref(),
            ChangeType::Delete => self.from.as_ref(),
        }
    }

    // Turns the change into the one that reverts it.
    pub fn invert(&mut self) {
        self.op = self.op.inverse();
        std::mem::swap(&mut self.from, &mut self.to);
    }
}

impl std::fmt::Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.op, self.path)?;
        if let Some(from) = &self.from {
            write!(f, " from {from}")?;
        }
        if let Some(to) = &self.to {
            write!(f, " to {to}")?;
        }
        Ok(())
    }
}

// ===== impl Changelog =====

impl Changelog {
    pub fn new(changes: Vec<Change>) -> Changelog {
        Changelog {
            entries: changes
                .into_iter()
                .map(|change| ChangelogEntry {
                    change,
                    processed: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: ChangeId) -> &Change {
        &self.entries[id].change
    }

    pub fn is_processed(&self, id: ChangeId) -> bool {
        self.entries[id].processed
    }

    // Iterates over the records still awaiting processing.
    pub fn unprocessed(&self) -> impl Iterator<Item = (ChangeId, &Change)> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| !entry.processed)
            .map(|(id, entry)| (id, &entry.change))
    }

    // Returns the first unprocessed record satisfying the given predicate.
    pub fn find<F>(&self, predicate: F) -> Option<ChangeId>
    where
        F: Fn(&Change) -> bool,
    {
        self.unprocessed()
            .find(|(_, change)| predicate(change))
            .map(|(id, _)| id)
    }

    pub fn mark_processed(&mut self, id: ChangeId) {
        self.entries[id].processed = true;
    }

    // Appends a synthetic record, returning its identifier.
    pub fn push(&mut self, change: Change) -> ChangeId {
        self.entries.push(ChangelogEntry {
            change,
            processed: false,
        });
        self.entries.len() - 1
    }

    // Replaces an UPDATE record by a DELETE of the old value followed by a
    // CREATE of the new one. The original record is marked as processed.
    pub fn split_update(
        &mut self,
        id: ChangeId,
    ) -> Option<(ChangeId, ChangeId)> {
        let change = self.get(id).clone();
        let (ChangeType::Update, Some(from), Some(to)) =
            (change.op, change.from, change.to)
        else {
            return None;
        };

        Debug::ChangeSplit(&change.path).log();
        self.mark_processed(id);
        let delete_id = self.push(Change::delete(change.path.clone(), from));
        let create_id = self.push(Change::create(change.path, to));
        Some((delete_id, create_id))
    }

    pub fn all_processed(&self) -> bool {
        self.entries.iter().all(|entry| entry.processed)
    }
}

// ===== global functions =====

// Flattens a device tree into its configuration leaves.
pub fn flatten(device: &Device) -> ConfigLeaves {
    let mut leaves = ConfigLeaves::new();

    for iface in device.interfaces() {
        flatten_interface(iface, &mut leaves);
    }

    for component in device.components() {
        let name = component.name.as_str();
        if let Some(config) = component.breakout_config() {
            if let Some(num_channels) = config.num_channels {
                leaves.insert(
                    paths::BREAKOUT_NUM_CHANNELS.instantiate(&[name]),
                    LeafValue::Uint(num_channels.into()),
                );
            }
            if let Some(speed) = &config.channel_speed {
                leaves.insert(
                    paths::BREAKOUT_CHANNEL_SPEED.instantiate(&[name]),
                    LeafValue::String(speed.to_yang().into_owned()),
                );
            }
        }
    }

    for lacp_iface in device.lacp_interfaces() {
        let name = lacp_iface.name.as_str();
        leaves.insert(
            paths::LACP_NAME.instantiate(&[name]),
            LeafValue::String(name.to_owned()),
        );
        if let Some(config) = &lacp_iface.config {
            if let Some(interval) = &config.interval {
                leaves.insert(
                    paths::LACP_INTERVAL.instantiate(&[name]),
                    LeafValue::String(interval.to_yang().into_owned()),
                );
            }
            if let Some(mode) = &config.lacp_mode {
                leaves.insert(
                    paths::LACP_ACTIVITY.instantiate(&[name]),
                    LeafValue::String(mode.to_yang().into_owned()),
                );
            }
        }
    }

    leaves
}

// Computes the leaf-level changes that turn one configuration into another.
pub fn changes_from_diff(old: &Device, new: &Device) -> Vec<Change> {
    let old = flatten(old);
    let new = flatten(new);

    let changes = old
        .into_iter()
        .merge_join_by(new, |(old_path, _), (new_path, _)| {
            old_path.cmp(new_path)
        })
        .filter_map(|item| match item {
            EitherOrBoth::Left((path, from)) => {
                Some(Change::delete(path, from))
            }
            EitherOrBoth::Right((path, to)) => Some(Change::create(path, to)),
            EitherOrBoth::Both((path, from), (_, to)) => {
                (from != to).then(|| Change::update(path, from, to))
            }
        })
        .collect::<Vec<_>>();

    Debug::DiffComputed(changes.len()).log();
    changes
}

// ===== helper functions =====

fn flatten_interface(iface: &Interface, leaves: &mut ConfigLeaves) {
    let name = iface.name.as_str();

    leaves.insert(
        paths::INTF_NAME.instantiate(&[name]),
        LeafValue::String(name.to_owned()),
    );
    if let Some(config) = &iface.config {
        if let Some(description) = &config.description {
            leaves.insert(
                paths::INTF_DESCRIPTION.instantiate(&[name]),
                LeafValue::String(description.clone()),
            );
        }
        if let Some(mtu) = config.mtu {
            leaves.insert(
                paths::INTF_MTU.instantiate(&[name]),
                LeafValue::Uint(mtu.into()),
            );
        }
        if let Some(enabled) = config.enabled {
            leaves.insert(
                paths::INTF_ENABLED.instantiate(&[name]),
                LeafValue::Bool(enabled),
            );
        }
    }

    if let Some(ethernet) = &iface.ethernet {
        if let Some(config) = &ethernet.config {
            if let Some(lag) = &config.aggregate_id {
                leaves.insert(
                    paths::ETH_AGGREGATE_ID.instantiate(&[name]),
                    LeafValue::String(lag.clone()),
                );
            }
            if let Some(autoneg) = config.auto_negotiate {
                leaves.insert(
                    paths::ETH_AUTO_NEGOTIATE.instantiate(&[name]),
                    LeafValue::Bool(autoneg),
                );
            }
            if let Some(speed) = &config.port_speed {
                leaves.insert(
                    paths::ETH_PORT_SPEED.instantiate(&[name]),
                    LeafValue::String(speed.to_yang().into_owned()),
                );
            }
        }
        flatten_switched_vlan(
            name,
            paths::ETHERNET,
            ethernet.switched_vlan.as_ref(),
            leaves,
        );
    }

    if let Some(aggregation) = &iface.aggregation {
        if let Some(config) = &aggregation.config {
            if let Some(lag_type) = &config.lag_type {
                leaves.insert(
                    paths::AGG_LAG_TYPE.instantiate(&[name]),
                    LeafValue::String(lag_type.to_yang().into_owned()),
                );
            }
            if let Some(min_links) = config.min_links {
                leaves.insert(
                    paths::AGG_MIN_LINKS.instantiate(&[name]),
                    LeafValue::Uint(min_links.into()),
                );
            }
        }
        flatten_switched_vlan(
            name,
            paths::AGGREGATION,
            aggregation.switched_vlan.as_ref(),
            leaves,
        );
    }

    for subif in iface.subinterfaces() {
        let index = subif.index.to_string();
        for (family, (ip_pattern, plen_pattern)) in [
            (
                subif.ipv4_addresses().collect::<Vec<_>>(),
                (paths::IPV4_IP, paths::IPV4_PREFIX_LENGTH),
            ),
            (
                subif.ipv6_addresses().collect::<Vec<_>>(),
                (paths::IPV6_IP, paths::IPV6_PREFIX_LENGTH),
            ),
        ] {
            for addr in family {
                let ip = addr.ip.to_string();
                let payload = [name, index.as_str(), ip.as_str()];
                leaves.insert(
                    ip_pattern.instantiate(&payload),
                    LeafValue::String(ip.clone()),
                );
                if let Some(plen) =
                    addr.config.as_ref().and_then(|c| c.prefix_length)
                {
                    leaves.insert(
                        plen_pattern.instantiate(&payload),
                        LeafValue::Uint(plen.into()),
                    );
                }
            }
        }
    }
}

fn flatten_switched_vlan(
    name: &str,
    container: &str,
    switched_vlan: Option<&SwitchedVlan>,
    leaves: &mut ConfigLeaves,
) {
    let Some(config) = switched_vlan.and_then(|vlan| vlan.config.as_ref())
    else {
        return;
    };
    let path = |leaf: &str| {
        DataPath::new(&[
            paths::INTERFACE,
            name,
            container,
            paths::SWITCHED_VLAN,
            leaf,
        ])
    };

    if let Some(mode) = &config.interface_mode {
        leaves.insert(
            path(paths::INTERFACE_MODE),
            LeafValue::String(mode.to_yang().into_owned()),
        );
    }
    if let Some(vid) = config.access_vlan {
        leaves.insert(path(paths::ACCESS_VLAN), LeafValue::Uint(vid.into()));
    }
    if let Some(vid) = config.native_vlan {
        leaves.insert(path(paths::NATIVE_VLAN), LeafValue::Uint(vid.into()));
    }
    for vid in &config.trunk_vlans {
        let vid_str = vid.to_string();
        leaves.insert(
            DataPath::new(&[
                paths::INTERFACE,
                name,
                container,
                paths::SWITCHED_VLAN,
                paths::TRUNK_VLANS,
                vid_str.as_str(),
            ]),
            LeafValue::Uint((*vid).into()),
        );
    }
}

// ===== unit tests =====
