//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod index;
pub mod relation;

use std::collections::{BTreeMap, BTreeSet};

use ipnetwork::IpNetwork;
use itertools::Itertools;
use ocsw_northbound::configuration::LeafValue;
use ocsw_northbound::paths::LeafKind;
use ocsw_utils::ip::{AddressFamilies, AddressFamily, IpNetworkExt};
use ocsw_yang::ToYang;
use ocsw_yang::device::{AggregationType, PortSpeed, VlanModeType};
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::ifname::{self, IfName, InterfaceKind};
use crate::tables::index::IndexSpace;
use crate::tables::relation::{ManyToMany, OneToMany};

pub type IfIndex = u32;
pub type Vid = u16;

pub const VLAN_ID_MIN: Vid = 1;
pub const VLAN_ID_MAX: Vid = 4094;

// Sizes of the dense index spaces.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Limits {
    pub max_ports: u32,
    pub max_lags: u32,
    pub max_vlans: u32,
    pub max_stp_instances: u32,
}

// Per-kind storage for relations kept apart for ethernet interfaces and LAGs.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PerKind<T> {
    pub ethernet: T,
    pub aggregate: T,
}

// Front-panel port breakout mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
pub struct BreakoutMode {
    pub num_channels: u8,
    pub channel_speed: PortSpeed,
}

// Scalar attributes of ethernet interfaces and LAGs.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum PortAttr {
    Description,
    Mtu,
    Enabled,
    AutoNegotiate,
    PortSpeed,
    MinLinks,
}

// LACP attributes of a LAG.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum LacpAttr {
    Interval,
    Mode,
}

// Relation that prevents an interface from being removed or reshaped.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Dependency {
    LagMember(String),
    LagMembers(Vec<String>),
    Address(IpNetwork),
    VlanMode(VlanModeType),
    AccessVlan(Vid),
    NativeVlan(Vid),
    TrunkVlans(Vec<Vid>),
    PortAttributes(Vec<PortAttr>),
    Lacp,
}

// Configuration lookup tables.
//
// Indexed view of the configuration, used to check the cross-feature
// invariants of a candidate configuration. A transaction works on a clone of
// the running tables and the clone replaces them once the transaction
// commits.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LookupTables {
    limits: Limits,
    // Dense index spaces.
    ports: IndexSpace,
    lags: IndexSpace,
    vlans: IndexSpace,
    stp_instances: IndexSpace,
    // Configured interfaces.
    configured: BTreeSet<IfIndex>,
    lag_types: BTreeMap<IfIndex, AggregationType>,
    // LAG -> member ethernet interfaces.
    lag_members: OneToMany<IfIndex, IfIndex>,
    // Switched VLAN state.
    vlan_modes: BTreeMap<IfIndex, VlanModeType>,
    access_vlans: PerKind<OneToMany<Vid, IfIndex>>,
    native_vlans: PerKind<OneToMany<Vid, IfIndex>>,
    trunk_vlans: PerKind<ManyToMany<Vid, IfIndex>>,
    // Interface -> addresses.
    addresses: AddressFamilies<PerKind<OneToMany<IfIndex, IpNetwork>>>,
    // Explicitly configured breakout modes, keyed by port number.
    breakout: BTreeMap<u32, BreakoutMode>,
    port_attrs: BTreeMap<IfIndex, BTreeMap<PortAttr, LeafValue>>,
    lacp: BTreeMap<IfIndex, BTreeMap<LacpAttr, LeafValue>>,
}

// ===== impl Limits =====

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            max_ports: 64,
            max_lags: 128,
            max_vlans: VLAN_ID_MAX.into(),
            max_stp_instances: VLAN_ID_MAX.into(),
        }
    }
}

// ===== impl PerKind =====

impl<T> PerKind<T> {
    pub fn get(&self, kind: InterfaceKind) -> &T {
        match kind {
            InterfaceKind::Ethernet => &self.ethernet,
            InterfaceKind::Aggregate => &self.aggregate,
        }
    }

    pub fn get_mut(&mut self, kind: InterfaceKind) -> &mut T {
        match kind {
            InterfaceKind::Ethernet => &mut self.ethernet,
            InterfaceKind::Aggregate => &mut self.aggregate,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (InterfaceKind, &T)> {
        [
            (InterfaceKind::Ethernet, &self.ethernet),
            (InterfaceKind::Aggregate, &self.aggregate),
        ]
        .into_iter()
    }
}

// ===== impl BreakoutMode =====

impl BreakoutMode {
    // Supported combinations of channel count and speed.
    pub const VALID: [BreakoutMode; 3] = [
        BreakoutMode {
            num_channels: 1,
            channel_speed: PortSpeed::Speed100Gb,
        },
        BreakoutMode {
            num_channels: 1,
            channel_speed: PortSpeed::Speed40Gb,
        },
        BreakoutMode {
            num_channels: 4,
            channel_speed: PortSpeed::Speed10Gb,
        },
    ];

    pub fn is_valid(&self) -> bool {
        BreakoutMode::VALID.contains(self)
    }

    pub fn is_split(&self) -> bool {
        self.num_channels > 1
    }
}

impl Default for BreakoutMode {
    fn default() -> BreakoutMode {
        BreakoutMode::VALID[0]
    }
}

impl std::fmt::Display for BreakoutMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{}",
            self.num_channels,
            self.channel_speed.to_yang()
        )
    }
}

// ===== impl PortAttr =====

impl PortAttr {
    pub fn from_leaf(kind: LeafKind) -> Option<PortAttr> {
        match kind {
            LeafKind::IntfDescription => Some(PortAttr::Description),
            LeafKind::IntfMtu => Some(PortAttr::Mtu),
            LeafKind::IntfEnabled => Some(PortAttr::Enabled),
            LeafKind::EthAutoNegotiate => Some(PortAttr::AutoNegotiate),
            LeafKind::EthPortSpeed => Some(PortAttr::PortSpeed),
            LeafKind::AggMinLinks => Some(PortAttr::MinLinks),
            _ => None,
        }
    }
}

impl std::fmt::Display for PortAttr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortAttr::Description => write!(f, "description"),
            PortAttr::Mtu => write!(f, "mtu"),
            PortAttr::Enabled => write!(f, "enabled"),
            PortAttr::AutoNegotiate => write!(f, "auto-negotiate"),
            PortAttr::PortSpeed => write!(f, "port-speed"),
            PortAttr::MinLinks => write!(f, "min-links"),
        }
    }
}

// ===== impl LacpAttr =====

impl LacpAttr {
    pub fn from_leaf(kind: LeafKind) -> Option<LacpAttr> {
        match kind {
            LeafKind::LacpInterval => Some(LacpAttr::Interval),
            LeafKind::LacpActivity => Some(LacpAttr::Mode),
            _ => None,
        }
    }
}

impl std::fmt::Display for LacpAttr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LacpAttr::Interval => write!(f, "interval"),
            LacpAttr::Mode => write!(f, "lacp-mode"),
        }
    }
}

// ===== impl Dependency =====

impl Dependency {
    pub fn is_vlan(&self) -> bool {
        matches!(
            self,
            Dependency::VlanMode(_)
                | Dependency::AccessVlan(_)
                | Dependency::NativeVlan(_)
                | Dependency::TrunkVlans(_)
        )
    }
}

impl std::fmt::Display for Dependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Dependency::LagMember(lag) => write!(f, "member of {lag}"),
            Dependency::LagMembers(members) => {
                write!(f, "members {}", members.iter().join(" "))
            }
            Dependency::Address(addr) => write!(f, "address {addr}"),
            Dependency::VlanMode(mode) => {
                write!(f, "VLAN mode {}", mode.to_yang())
            }
            Dependency::AccessVlan(vid) => write!(f, "access VLAN {vid}"),
            Dependency::NativeVlan(vid) => write!(f, "native VLAN {vid}"),
            Dependency::TrunkVlans(vids) => {
                write!(f, "trunk VLANs {}", vids.iter().join(" "))
            }
            Dependency::PortAttributes(attrs) => {
                write!(f, "attributes {}", attrs.iter().join(" "))
            }
            Dependency::Lacp => write!(f, "LACP configuration"),
        }
    }
}

// ===== impl LookupTables =====

impl LookupTables {
    pub fn new(limits: Limits) -> LookupTables {
        // Every port can be split into channels, each with its own index.
        let port_indexes =
            limits.max_ports * (u32::from(ifname::MAX_CHANNELS) + 1);
        let ports = IndexSpace::new("port", 0, port_indexes);
        let lags = IndexSpace::new("LAG", ports.range().end, limits.max_lags);
        let vlans =
            IndexSpace::new("VLAN", lags.range().end, limits.max_vlans);
        let stp_instances = IndexSpace::new(
            "STP instance",
            vlans.range().end,
            limits.max_stp_instances,
        );

        LookupTables {
            limits,
            ports,
            lags,
            vlans,
            stp_instances,
            configured: Default::default(),
            lag_types: Default::default(),
            lag_members: Default::default(),
            vlan_modes: Default::default(),
            access_vlans: Default::default(),
            native_vlans: Default::default(),
            trunk_vlans: Default::default(),
            addresses: Default::default(),
            breakout: Default::default(),
            port_attrs: Default::default(),
            lacp: Default::default(),
        }
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn parse_ifname(&self, ifname: &str) -> Result<IfName, Error> {
        IfName::parse(ifname, &self.limits)
    }

    // ----- interfaces -----

    pub fn add_interface(&mut self, ifname: &str) -> Result<IfIndex, Error> {
        let name = self.parse_ifname(ifname)?;
        if self.is_configured(ifname) {
            return Err(Error::InterfaceExists(ifname.to_owned()));
        }

        // Whole ports and channels are mutually exclusive.
        if let IfName::Ethernet { port, channel } = name {
            let split = self.breakout_mode(port).is_split();
            if split != channel.is_some() {
                return Err(Error::PortSplitConflict(
                    ifname::port_name(port),
                    ifname.to_owned(),
                ));
            }
        }

        let index = match name.kind() {
            InterfaceKind::Ethernet => self.ports.assign(ifname)?,
            InterfaceKind::Aggregate => self.lags.assign(ifname)?,
        };
        self.configured.insert(index);
        Ok(index)
    }

    pub fn delete_interface(&mut self, ifname: &str) -> Result<(), Error> {
        let (index, _) = self.configured_index(ifname)?;
        let dependencies = self.check_dependencies_for_delete(ifname);
        if !dependencies.is_empty() {
            return Err(Error::from_dependencies(ifname, dependencies));
        }

        self.configured.remove(&index);
        self.lag_types.remove(&index);
        Ok(())
    }

    // Lists the relations that prevent the given interface from being
    // removed.
    pub fn check_dependencies_for_delete(
        &self,
        ifname: &str,
    ) -> Vec<Dependency> {
        let mut dependencies = vec![];
        let Some((index, kind)) = self.lookup(ifname) else {
            return dependencies;
        };

        match kind {
            InterfaceKind::Ethernet => {
                if let Some(lag) = self.lag_members.owner(&index) {
                    dependencies
                        .push(Dependency::LagMember(self.ifname(*lag)));
                }
            }
            InterfaceKind::Aggregate => {
                let members = self
                    .lag_members
                    .members(&index)
                    .map(|member| self.ifname(*member))
                    .collect::<Vec<_>>();
                if !members.is_empty() {
                    dependencies.push(Dependency::LagMembers(members));
                }
            }
        }
        for (_, addresses) in self.addresses.iter() {
            dependencies.extend(
                addresses
                    .get(kind)
                    .members(&index)
                    .map(|addr| Dependency::Address(*addr)),
            );
        }
        dependencies.extend(self.vlan_dependencies(index, kind));
        if let Some(attrs) = self.port_attrs.get(&index) {
            dependencies.push(Dependency::PortAttributes(
                attrs.keys().copied().collect(),
            ));
        }
        if self.lacp.contains_key(&index) {
            dependencies.push(Dependency::Lacp);
        }

        dependencies
    }

    // ----- LAGs -----

    pub fn set_lag_type(
        &mut self,
        lag: &str,
        lag_type: AggregationType,
    ) -> Result<(), Error> {
        let index = self.aggregate_index(lag)?;
        if self.lag_types.contains_key(&index) {
            return Err(Error::RecreateLagRequired(lag.to_owned()));
        }
        self.lag_types.insert(index, lag_type);
        Ok(())
    }

    pub fn set_lag_member(
        &mut self,
        lag: &str,
        eth: &str,
    ) -> Result<(), Error> {
        let lag_index = self.aggregate_index(lag)?;
        let (index, kind) = self.configured_index(eth)?;
        if kind != InterfaceKind::Ethernet {
            return Err(Error::WrongInterfaceKind(
                eth.to_owned(),
                ocsw_northbound::paths::ETH_AGGREGATE_ID.instantiate(&[eth]),
            ));
        }
        if let Some(owner) = self.lag_members.owner(&index) {
            return Err(Error::InterfaceInLag(
                eth.to_owned(),
                self.ifname(*owner),
            ));
        }

        // Members can't carry L3 or VLAN state of their own.
        let dependencies = self
            .check_dependencies_for_delete(eth)
            .into_iter()
            .filter(|dep| {
                matches!(dep, Dependency::Address(_)) || dep.is_vlan()
            })
            .collect::<Vec<_>>();
        if !dependencies.is_empty() {
            return Err(Error::from_dependencies(eth, dependencies));
        }

        self.lag_members
            .insert(lag_index, index)
            .map_err(|_| Error::InconsistentTables(eth.to_owned()))
    }

    pub fn delete_lag_member(
        &mut self,
        lag: &str,
        eth: &str,
    ) -> Result<(), Error> {
        let lag_index = self.aggregate_index(lag)?;
        let (index, _) = self.configured_index(eth)?;
        if self.lag_members.owner(&index) != Some(&lag_index) {
            return Err(Error::InconsistentTables(format!(
                "{eth} isn't a member of {lag}"
            )));
        }
        self.lag_members.remove(&index);
        Ok(())
    }

    // ----- switched VLANs -----

    pub fn set_vlan_mode(
        &mut self,
        ifname: &str,
        mode: VlanModeType,
    ) -> Result<(), Error> {
        let (index, _) = self.switched_index(ifname)?;
        if self.vlan_modes.contains_key(&index) {
            return Err(Error::VlanModeConflict(
                ifname.to_owned(),
                "VLAN mode already set",
            ));
        }
        self.vlan_modes.insert(index, mode);
        Ok(())
    }

    pub fn delete_vlan_mode(&mut self, ifname: &str) -> Result<(), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        if !self.vlan_modes.contains_key(&index) {
            return Err(Error::InconsistentTables(format!(
                "{ifname} has no VLAN mode"
            )));
        }
        if self
            .vlan_dependencies(index, kind)
            .iter()
            .any(|dep| !matches!(dep, Dependency::VlanMode(_)))
        {
            return Err(Error::VlanModeConflict(
                ifname.to_owned(),
                "VLAN memberships remain",
            ));
        }
        self.vlan_modes.remove(&index);
        Ok(())
    }

    pub fn set_access_vlan(
        &mut self,
        ifname: &str,
        vid: Vid,
    ) -> Result<(), Error> {
        check_vid(vid)?;
        let (index, kind) = self.switched_index(ifname)?;
        self.check_vlan_mode(ifname, index, VlanModeType::Access)?;
        if self.access_vlans.get(kind).owner(&index).is_some() {
            return Err(Error::VlanModeConflict(
                ifname.to_owned(),
                "access VLAN already set",
            ));
        }
        self.assign_vlan(vid)?;
        self.access_vlans
            .get_mut(kind)
            .insert(vid, index)
            .map_err(|_| Error::InconsistentTables(ifname.to_owned()))
    }

    pub fn delete_access_vlan(
        &mut self,
        ifname: &str,
        vid: Vid,
    ) -> Result<(), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        let relation = self.access_vlans.get_mut(kind);
        if relation.owner(&index) != Some(&vid) {
            return Err(Error::InconsistentTables(format!(
                "{ifname} isn't in access VLAN {vid}"
            )));
        }
        relation.remove(&index);
        Ok(())
    }

    pub fn set_native_vlan(
        &mut self,
        ifname: &str,
        vid: Vid,
    ) -> Result<(), Error> {
        check_vid(vid)?;
        let (index, kind) = self.switched_index(ifname)?;
        self.check_vlan_mode(ifname, index, VlanModeType::Trunk)?;
        if self.native_vlans.get(kind).owner(&index).is_some() {
            return Err(Error::VlanModeConflict(
                ifname.to_owned(),
                "native VLAN already set",
            ));
        }
        self.assign_vlan(vid)?;
        self.native_vlans
            .get_mut(kind)
            .insert(vid, index)
            .map_err(|_| Error::InconsistentTables(ifname.to_owned()))
    }

    pub fn delete_native_vlan(
        &mut self,
        ifname: &str,
        vid: Vid,
    ) -> Result<(), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        let relation = self.native_vlans.get_mut(kind);
        if relation.owner(&index) != Some(&vid) {
            return Err(Error::InconsistentTables(format!(
                "{ifname} has no native VLAN {vid}"
            )));
        }
        relation.remove(&index);
        Ok(())
    }

    pub fn add_trunk_vlan(
        &mut self,
        ifname: &str,
        vid: Vid,
    ) -> Result<(), Error> {
        check_vid(vid)?;
        let (index, kind) = self.switched_index(ifname)?;
        self.check_vlan_mode(ifname, index, VlanModeType::Trunk)?;
        if self.trunk_vlans.get(kind).contains(&vid, &index) {
            return Err(Error::InconsistentTables(format!(
                "{ifname} already trunks VLAN {vid}"
            )));
        }
        self.assign_vlan(vid)?;
        self.trunk_vlans.get_mut(kind).insert(vid, index);
        Ok(())
    }

    pub fn delete_trunk_vlan(
        &mut self,
        ifname: &str,
        vid: Vid,
    ) -> Result<(), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        if !self.trunk_vlans.get_mut(kind).remove(&vid, &index) {
            return Err(Error::InconsistentTables(format!(
                "{ifname} doesn't trunk VLAN {vid}"
            )));
        }
        Ok(())
    }

    // ----- addresses -----

    pub fn add_address(
        &mut self,
        ifname: &str,
        addr: IpNetwork,
    ) -> Result<(), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        if let Some(lag) = self.lag_members.owner(&index) {
            return Err(Error::InterfaceInLag(
                ifname.to_owned(),
                self.ifname(*lag),
            ));
        }
        if let Some(owner) = self.address_owner(&addr) {
            return Err(Error::CidrInUse(addr, owner.to_owned()));
        }

        self.addresses
            .get_mut(addr.address_family())
            .get_mut(kind)
            .insert(index, addr)
            .map_err(|_| Error::InconsistentTables(addr.to_string()))
    }

    pub fn delete_address(
        &mut self,
        ifname: &str,
        addr: IpNetwork,
    ) -> Result<(), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        let relation = self
            .addresses
            .get_mut(addr.address_family())
            .get_mut(kind);
        if relation.owner(&addr) != Some(&index) {
            return Err(Error::InconsistentTables(format!(
                "{addr} isn't assigned to {ifname}"
            )));
        }
        relation.remove(&addr);
        Ok(())
    }

    // ----- port breakout -----

    pub fn set_port_breakout(
        &mut self,
        port: &str,
        mode: BreakoutMode,
    ) -> Result<(), Error> {
        let IfName::Ethernet {
            port: number,
            channel: None,
        } = self.parse_ifname(port)?
        else {
            return Err(Error::InvalidComponent(port.to_owned()));
        };
        if !mode.is_valid() {
            return Err(Error::InvalidBreakoutMode(port.to_owned()));
        }

        // Splitting retires the whole port, collapsing retires the channels.
        if self.breakout_mode(number).is_split() != mode.is_split() {
            let retired = if mode.is_split() {
                vec![port.to_owned()]
            } else {
                ifname::channel_names(number).collect()
            };
            for ifname in retired {
                let dependencies = self.check_dependencies_for_delete(&ifname);
                if !dependencies.is_empty() {
                    return Err(Error::from_dependencies(
                        &ifname,
                        dependencies,
                    ));
                }
                if self.is_configured(&ifname) {
                    return Err(Error::PortSplitConflict(
                        port.to_owned(),
                        ifname,
                    ));
                }
            }
        }

        if mode == BreakoutMode::default() {
            self.breakout.remove(&number);
        } else {
            self.breakout.insert(number, mode);
        }
        Ok(())
    }

    // ----- scalar attributes -----

    pub fn set_port_attribute(
        &mut self,
        ifname: &str,
        attr: PortAttr,
        value: LeafValue,
    ) -> Result<(), Error> {
        let (index, _) = self.configured_index(ifname)?;
        self.port_attrs
            .entry(index)
            .or_default()
            .insert(attr, value);
        Ok(())
    }

    pub fn delete_port_attribute(
        &mut self,
        ifname: &str,
        attr: PortAttr,
    ) -> Result<(), Error> {
        let (index, _) = self.configured_index(ifname)?;
        let Some(attrs) = self.port_attrs.get_mut(&index) else {
            return Err(Error::InconsistentTables(format!(
                "{ifname} has no {attr}"
            )));
        };
        if attrs.remove(&attr).is_none() {
            return Err(Error::InconsistentTables(format!(
                "{ifname} has no {attr}"
            )));
        }
        if attrs.is_empty() {
            self.port_attrs.remove(&index);
        }
        Ok(())
    }

    // ----- LACP -----

    pub fn set_lacp(&mut self, lag: &str) -> Result<(), Error> {
        let index = self.aggregate_index(lag)?;
        if self.lag_types.get(&index) != Some(&AggregationType::Lacp) {
            return Err(Error::LacpNotSupported(lag.to_owned()));
        }
        if self.lacp.contains_key(&index) {
            return Err(Error::InconsistentTables(format!(
                "{lag} already has LACP configuration"
            )));
        }
        self.lacp.insert(index, Default::default());
        Ok(())
    }

    pub fn delete_lacp(&mut self, lag: &str) -> Result<(), Error> {
        let index = self.aggregate_index(lag)?;
        match self.lacp.get(&index) {
            Some(attrs) if attrs.is_empty() => {
                self.lacp.remove(&index);
                Ok(())
            }
            Some(_) => Err(Error::InconsistentTables(format!(
                "{lag} still has LACP attributes"
            ))),
            None => Err(Error::InconsistentTables(format!(
                "{lag} has no LACP configuration"
            ))),
        }
    }

    pub fn set_lacp_attribute(
        &mut self,
        lag: &str,
        attr: LacpAttr,
        value: LeafValue,
    ) -> Result<(), Error> {
        let index = self.aggregate_index(lag)?;
        let Some(attrs) = self.lacp.get_mut(&index) else {
            return Err(Error::InconsistentTables(format!(
                "{lag} has no LACP configuration"
            )));
        };
        attrs.insert(attr, value);
        Ok(())
    }

    pub fn delete_lacp_attribute(
        &mut self,
        lag: &str,
        attr: LacpAttr,
    ) -> Result<(), Error> {
        let index = self.aggregate_index(lag)?;
        if self
            .lacp
            .get_mut(&index)
            .and_then(|attrs| attrs.remove(&attr))
            .is_none()
        {
            return Err(Error::InconsistentTables(format!(
                "{lag} has no LACP {attr}"
            )));
        }
        Ok(())
    }

    // ----- accessors -----

    pub fn index_of(&self, ifname: &str) -> Option<IfIndex> {
        self.ports.get(ifname).or_else(|| self.lags.get(ifname))
    }

    pub fn is_configured(&self, ifname: &str) -> bool {
        self.index_of(ifname)
            .is_some_and(|index| self.configured.contains(&index))
    }

    // Names of the configured interfaces, in index order.
    pub fn interfaces(&self) -> impl Iterator<Item = String> + '_ {
        self.configured.iter().map(|index| self.ifname(*index))
    }

    pub fn lag_type(&self, lag: &str) -> Option<AggregationType> {
        let index = self.index_of(lag)?;
        self.lag_types.get(&index).copied()
    }

    pub fn lag_by_eth(&self, eth: &str) -> Option<String> {
        let index = self.index_of(eth)?;
        self.lag_members.owner(&index).map(|lag| self.ifname(*lag))
    }

    pub fn eths_by_lag(&self, lag: &str) -> Vec<String> {
        let Some(index) = self.index_of(lag) else {
            return vec![];
        };
        self.lag_members
            .members(&index)
            .map(|member| self.ifname(*member))
            .collect()
    }

    pub fn addresses(&self, ifname: &str, af: AddressFamily) -> Vec<IpNetwork> {
        let Some((index, kind)) = self.lookup(ifname) else {
            return vec![];
        };
        self.addresses
            .get(af)
            .get(kind)
            .members(&index)
            .copied()
            .collect()
    }

    // Interface the given address is assigned to, whether ethernet or LAG.
    pub fn address_owner(&self, addr: &IpNetwork) -> Option<String> {
        self.addresses
            .get(addr.address_family())
            .iter()
            .find_map(|(_, relation)| relation.owner(addr))
            .map(|index| self.ifname(*index))
    }

    pub fn vlan_mode(&self, ifname: &str) -> Option<VlanModeType> {
        let index = self.index_of(ifname)?;
        self.vlan_modes.get(&index).copied()
    }

    pub fn access_vlan(&self, ifname: &str) -> Option<Vid> {
        let (index, kind) = self.lookup(ifname)?;
        self.access_vlans.get(kind).owner(&index).copied()
    }

    pub fn native_vlan(&self, ifname: &str) -> Option<Vid> {
        let (index, kind) = self.lookup(ifname)?;
        self.native_vlans.get(kind).owner(&index).copied()
    }

    pub fn trunk_vlans(&self, ifname: &str) -> Vec<Vid> {
        let Some((index, kind)) = self.lookup(ifname) else {
            return vec![];
        };
        self.trunk_vlans
            .get(kind)
            .by_right(&index)
            .copied()
            .collect()
    }

    // Breakout mode of the given port, defaulting to a single channel.
    pub fn breakout(&self, port: &str) -> BreakoutMode {
        match self.parse_ifname(port) {
            Ok(IfName::Ethernet {
                port,
                channel: None,
            }) => self.breakout_mode(port),
            _ => BreakoutMode::default(),
        }
    }

    // Explicitly configured breakout mode of the given port.
    pub fn breakout_config(&self, port: &str) -> Option<BreakoutMode> {
        match self.parse_ifname(port) {
            Ok(IfName::Ethernet {
                port,
                channel: None,
            }) => self.breakout.get(&port).copied(),
            _ => None,
        }
    }

    pub fn port_attribute(
        &self,
        ifname: &str,
        attr: PortAttr,
    ) -> Option<&LeafValue> {
        let index = self.index_of(ifname)?;
        self.port_attrs.get(&index)?.get(&attr)
    }

    pub fn lacp_attribute(
        &self,
        lag: &str,
        attr: LacpAttr,
    ) -> Option<&LeafValue> {
        let index = self.index_of(lag)?;
        self.lacp.get(&index)?.get(&attr)
    }

    pub fn has_lacp(&self, lag: &str) -> bool {
        self.index_of(lag)
            .is_some_and(|index| self.lacp.contains_key(&index))
    }

    pub fn vlan_index(&self, vid: Vid) -> Option<u32> {
        self.vlans.get(&vlan_key(vid))
    }

    // STP instance serving the given VLAN.
    pub fn stp_index(&self, vid: Vid) -> Option<u32> {
        self.stp_instances.get(&vlan_key(vid))
    }

    // ----- consistency -----

    // Verifies every table invariant, returning a description of the first
    // violation found.
    pub fn check_invariants(&self) -> Result<(), String> {
        for space in [&self.ports, &self.lags, &self.vlans, &self.stp_instances]
        {
            space.check()?;
        }
        if !self.lag_members.is_consistent()
            || self.access_vlans.iter().any(|(_, r)| !r.is_consistent())
            || self.native_vlans.iter().any(|(_, r)| !r.is_consistent())
            || self.trunk_vlans.iter().any(|(_, r)| !r.is_consistent())
            || self
                .addresses
                .iter()
                .any(|(_, r)| r.iter().any(|(_, r)| !r.is_consistent()))
        {
            return Err("relation indexes disagree".to_owned());
        }

        // Interfaces exist in the index space of their kind and honor the
        // breakout mode of their port.
        for index in &self.configured {
            let ifname = self.ifname(*index);
            let name = self.parse_ifname(&ifname).map_err(|e| e.to_string())?;
            if let IfName::Ethernet { port, channel } = name
                && self.breakout_mode(port).is_split() != channel.is_some()
            {
                return Err(format!("{ifname} conflicts with port breakout"));
            }
        }

        // Every relation refers to configured interfaces of the right kind.
        let is_kind = |index: &IfIndex, kind: InterfaceKind| {
            self.configured.contains(index) && self.kind_of(*index) == kind
        };
        for (member, lag) in self.lag_members.iter() {
            if !is_kind(member, InterfaceKind::Ethernet)
                || !is_kind(lag, InterfaceKind::Aggregate)
            {
                return Err(format!("dangling LAG membership {member}"));
            }
        }
        for index in self.lag_types.keys() {
            if !is_kind(index, InterfaceKind::Aggregate) {
                return Err(format!("dangling LAG type {index}"));
            }
        }
        for index in self.configured.iter() {
            if self.kind_of(*index) == InterfaceKind::Aggregate
                && !self.lag_types.contains_key(index)
            {
                return Err(format!("{} has no LAG type", self.ifname(*index)));
            }
        }
        for index in self.lacp.keys() {
            if self.lag_types.get(index) != Some(&AggregationType::Lacp) {
                return Err(format!("dangling LACP config {index}"));
            }
        }
        for index in self.port_attrs.keys().chain(self.vlan_modes.keys()) {
            if !self.configured.contains(index) {
                return Err(format!("dangling attributes {index}"));
            }
        }

        // Switched VLAN memberships agree with the VLAN mode, and LAG members
        // carry neither VLAN nor L3 state.
        for (kind, relation) in self.access_vlans.iter() {
            for (index, vid) in relation.iter() {
                let mode = VlanModeType::Access;
                self.check_vlan_member(*index, kind, *vid, mode)?;
            }
        }
        for (kind, relation) in self.native_vlans.iter() {
            for (index, vid) in relation.iter() {
                let mode = VlanModeType::Trunk;
                self.check_vlan_member(*index, kind, *vid, mode)?;
            }
        }
        for (kind, relation) in self.trunk_vlans.iter() {
            for (vid, index) in relation.iter() {
                let mode = VlanModeType::Trunk;
                self.check_vlan_member(*index, kind, *vid, mode)?;
            }
        }
        for index in self.vlan_modes.keys() {
            if self.lag_members.owner(index).is_some() {
                return Err(format!("LAG member {index} has a VLAN mode"));
            }
        }

        // Addresses are unique within their family across interface kinds.
        for (af, relations) in self.addresses.iter() {
            let mut seen = BTreeSet::new();
            for (kind, relation) in relations.iter() {
                for (addr, index) in relation.iter() {
                    if !is_kind(index, kind)
                        || addr.address_family() != af
                        || self.lag_members.owner(index).is_some()
                        || !seen.insert(*addr)
                    {
                        return Err(format!("invalid address {addr}"));
                    }
                }
            }
        }

        Ok(())
    }

    // ===== helper methods =====

    fn ifname(&self, index: IfIndex) -> String {
        self.ports
            .name(index)
            .or_else(|| self.lags.name(index))
            .unwrap_or_default()
            .to_owned()
    }

    fn kind_of(&self, index: IfIndex) -> InterfaceKind {
        if self.lags.range().contains(&index) {
            InterfaceKind::Aggregate
        } else {
            InterfaceKind::Ethernet
        }
    }

    // Index and kind of an interface that has ever been configured.
    fn lookup(&self, ifname: &str) -> Option<(IfIndex, InterfaceKind)> {
        let index = self.index_of(ifname)?;
        Some((index, self.kind_of(index)))
    }

    fn configured_index(
        &self,
        ifname: &str,
    ) -> Result<(IfIndex, InterfaceKind), Error> {
        self.lookup(ifname)
            .filter(|(index, _)| self.configured.contains(index))
            .ok_or_else(|| Error::UnknownInterface(ifname.to_owned()))
    }

    fn aggregate_index(&self, lag: &str) -> Result<IfIndex, Error> {
        match self.configured_index(lag)? {
            (index, InterfaceKind::Aggregate) => Ok(index),
            _ => Err(Error::UnknownInterface(lag.to_owned())),
        }
    }

    // Index of an interface that may carry switched VLAN state.
    fn switched_index(
        &self,
        ifname: &str,
    ) -> Result<(IfIndex, InterfaceKind), Error> {
        let (index, kind) = self.configured_index(ifname)?;
        if let Some(lag) = self.lag_members.owner(&index) {
            return Err(Error::InterfaceInLag(
                ifname.to_owned(),
                self.ifname(*lag),
            ));
        }
        Ok((index, kind))
    }

    fn check_vlan_mode(
        &self,
        ifname: &str,
        index: IfIndex,
        required: VlanModeType,
    ) -> Result<(), Error> {
        if self.vlan_modes.get(&index) == Some(&required) {
            return Ok(());
        }
        let reason = match required {
            VlanModeType::Access => "access VLAN requires ACCESS mode",
            VlanModeType::Trunk => "native and trunk VLANs require TRUNK mode",
        };
        Err(Error::VlanModeConflict(ifname.to_owned(), reason))
    }

    fn check_vlan_member(
        &self,
        index: IfIndex,
        kind: InterfaceKind,
        vid: Vid,
        mode: VlanModeType,
    ) -> Result<(), String> {
        if self.kind_of(index) != kind
            || !self.configured.contains(&index)
            || self.vlan_modes.get(&index) != Some(&mode)
            || self.vlan_index(vid).is_none()
            || self.stp_index(vid).is_none()
        {
            return Err(format!(
                "invalid VLAN {vid} membership of {}",
                self.ifname(index)
            ));
        }
        Ok(())
    }

    fn vlan_dependencies(
        &self,
        index: IfIndex,
        kind: InterfaceKind,
    ) -> Vec<Dependency> {
        let mut dependencies = vec![];
        if let Some(mode) = self.vlan_modes.get(&index) {
            dependencies.push(Dependency::VlanMode(*mode));
        }
        if let Some(vid) = self.access_vlans.get(kind).owner(&index) {
            dependencies.push(Dependency::AccessVlan(*vid));
        }
        if let Some(vid) = self.native_vlans.get(kind).owner(&index) {
            dependencies.push(Dependency::NativeVlan(*vid));
        }
        let trunk = self
            .trunk_vlans
            .get(kind)
            .by_right(&index)
            .copied()
            .collect::<Vec<_>>();
        if !trunk.is_empty() {
            dependencies.push(Dependency::TrunkVlans(trunk));
        }
        dependencies
    }

    fn breakout_mode(&self, port: u32) -> BreakoutMode {
        self.breakout.get(&port).copied().unwrap_or_default()
    }

    // Makes sure the VLAN has both a VLAN index and an STP instance. Nothing
    // is assigned unless both can be.
    fn assign_vlan(&mut self, vid: Vid) -> Result<(), Error> {
        let key = vlan_key(vid);
        for space in [&self.vlans, &self.stp_instances] {
            if space.get(&key).is_none() && space.is_full() {
                return Err(Error::IndexSpaceExhausted(space.kind()));
            }
        }
        self.vlans.assign(&key)?;
        self.stp_instances.assign(&key)?;
        Ok(())
    }
}

impl Default for LookupTables {
    fn default() -> LookupTables {
        LookupTables::new(Limits::default())
    }
}

impl std::fmt::Display for LookupTables {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for ifname in self.interfaces() {
            let Some((index, kind)) = self.lookup(&ifname) else {
                continue;
            };
            write!(f, "{ifname} (index {index}, {kind})")?;
            if let Some(lag_type) = self.lag_types.get(&index) {
                write!(f, " type {}", lag_type.to_yang())?;
            }
            if let Some(lag) = self.lag_by_eth(&ifname) {
                write!(f, " lag {lag}")?;
            }
            let members = self.eths_by_lag(&ifname);
            if !members.is_empty() {
                write!(f, " members {}", members.iter().join(","))?;
            }
            if let Some(mode) = self.vlan_modes.get(&index) {
                write!(f, " mode {}", mode.to_yang())?;
            }
            if let Some(vid) = self.access_vlan(&ifname) {
                write!(f, " access {vid}")?;
            }
            if let Some(vid) = self.native_vlan(&ifname) {
                write!(f, " native {vid}")?;
            }
            let trunk = self.trunk_vlans(&ifname);
            if !trunk.is_empty() {
                write!(f, " trunk {}", trunk.iter().join(","))?;
            }
            for af in [AddressFamily::Ipv4, AddressFamily::Ipv6] {
                let addrs = self.addresses(&ifname, af);
                if !addrs.is_empty() {
                    write!(f, " {af} {}", addrs.iter().join(","))?;
                }
            }
            if let Some(attrs) = self.port_attrs.get(&index) {
                for (attr, value) in attrs {
                    write!(f, " {attr} {value}")?;
                }
            }
            if let Some(attrs) = self.lacp.get(&index) {
                write!(f, " lacp")?;
                for (attr, value) in attrs {
                    write!(f, " {attr} {value}")?;
                }
            }
            writeln!(f)?;
        }
        for (port, mode) in &self.breakout {
            writeln!(f, "{} breakout {mode}", ifname::port_name(*port))?;
        }
        Ok(())
    }
}

// ===== helper functions =====

fn check_vid(vid: Vid) -> Result<(), Error> {
    if !(VLAN_ID_MIN..=VLAN_ID_MAX).contains(&vid) {
        return Err(Error::InvalidVlanId(vid.into()));
    }
    Ok(())
}

fn vlan_key(vid: Vid) -> String {
    format!("vlan{vid}")
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> LookupTables {
        LookupTables::new(Limits {
            max_ports: 8,
            max_lags: 4,
            max_vlans: 16,
            max_stp_instances: 16,
        })
    }

    fn addr(s: &str) -> IpNetwork {
        s.parse().unwrap()
    }

    #[test]
    fn interface_indexes() {
        let mut tables = tables();
        let eth1 = tables.add_interface("eth-1").unwrap();
        let ae0 = tables.add_interface("ae0").unwrap();
        tables.set_lag_type("ae0", AggregationType::Lacp).unwrap();
        assert_eq!(eth1, 0);
        assert_eq!(ae0, 40);
        assert_eq!(tables.vlan_index(1), None);
        assert!(matches!(
            tables.add_interface("eth-1"),
            Err(Error::InterfaceExists(_))
        ));

        // Indexes survive deletion and are reused for the same name.
        tables.delete_interface("eth-1").unwrap();
        assert!(!tables.is_configured("eth-1"));
        tables.add_interface("eth-2").unwrap();
        assert_eq!(tables.add_interface("eth-1").unwrap(), eth1);
        assert!(tables.check_invariants().is_ok());
    }

    #[test]
    fn lag_membership() {
        let mut tables = tables();
        tables.add_interface("eth-1").unwrap();
        tables.add_interface("ae0").unwrap();
        tables.add_interface("ae1").unwrap();
        tables.set_lag_type("ae0", AggregationType::Lacp).unwrap();
        tables.set_lag_type("ae1", AggregationType::Static).unwrap();
        assert!(matches!(
            tables.set_lag_type("ae0", AggregationType::Static),
            Err(Error::RecreateLagRequired(_))
        ));

        tables.set_lag_member("ae0", "eth-1").unwrap();
        assert!(matches!(
            tables.set_lag_member("ae1", "eth-1"),
            Err(Error::InterfaceInLag(ifname, lag))
                if ifname == "eth-1" && lag == "ae0"
        ));
        assert_eq!(tables.lag_by_eth("eth-1").as_deref(), Some("ae0"));
        assert_eq!(tables.eths_by_lag("ae0"), ["eth-1"]);

        // Neither side can go away while the membership exists.
        assert!(matches!(
            tables.delete_interface("ae0"),
            Err(Error::LagHasMembers(..))
        ));
        assert!(matches!(
            tables.delete_interface("eth-1"),
            Err(Error::InterfaceInLag(..))
        ));

        // Members can't carry L3 state.
        assert!(matches!(
            tables.add_address("eth-1", addr("10.0.0.1/24")),
            Err(Error::InterfaceInLag(..))
        ));
        assert!(tables.check_invariants().is_ok());

        tables.delete_lag_member("ae0", "eth-1").unwrap();
        tables.delete_interface("ae0").unwrap();
        assert!(tables.check_invariants().is_ok());
    }

    #[test]
    fn member_with_l3_state() {
        let mut tables = tables();
        tables.add_interface("eth-1").unwrap();
        tables.add_interface("ae0").unwrap();
        tables.set_lag_type("ae0", AggregationType::Static).unwrap();
        tables.add_address("eth-1", addr("10.0.0.1/24")).unwrap();
        assert!(matches!(
            tables.set_lag_member("ae0", "eth-1"),
            Err(Error::InterfaceHasL3State(..))
        ));
        assert_eq!(tables.lag_by_eth("eth-1"), None);
    }

    #[test]
    fn address_uniqueness() {
        let mut tables = tables();
        tables.add_interface("eth-1").unwrap();
        tables.add_interface("eth-2").unwrap();
        tables.add_interface("ae0").unwrap();
        tables.set_lag_type("ae0", AggregationType::Static).unwrap();
        tables.add_address("eth-1", addr("10.0.0.1/24")).unwrap();
        tables.add_address("eth-1", addr("2001:db8::1/64")).unwrap();

        assert!(matches!(
            tables.add_address("eth-2", addr("10.0.0.1/24")),
            Err(Error::CidrInUse(_, owner)) if owner == "eth-1"
        ));
        assert!(matches!(
            tables.add_address("ae0", addr("10.0.0.1/24")),
            Err(Error::CidrInUse(..))
        ));
        tables.add_address("eth-2", addr("10.0.0.2/24")).unwrap();

        assert_eq!(
            tables.addresses("eth-1", AddressFamily::Ipv4),
            [addr("10.0.0.1/24")]
        );
        assert_eq!(
            tables.address_owner(&addr("2001:db8::1/64")).as_deref(),
            Some("eth-1")
        );
        assert!(matches!(
            tables.delete_interface("eth-1"),
            Err(Error::InterfaceHasL3State(..))
        ));
        assert!(tables.delete_address("eth-2", addr("10.0.0.1/24")).is_err());
        assert!(tables.check_invariants().is_ok());
    }

    #[test]
    fn vlan_modes() {
        let mut tables = tables();
        tables.add_interface("eth-1").unwrap();
        assert!(matches!(
            tables.set_access_vlan("eth-1", 10),
            Err(Error::VlanModeConflict(..))
        ));

        tables.set_vlan_mode("eth-1", VlanModeType::Trunk).unwrap();
        assert!(matches!(
            tables.set_access_vlan("eth-1", 10),
            Err(Error::VlanModeConflict(..))
        ));
        assert!(matches!(
            tables.add_trunk_vlan("eth-1", 4095),
            Err(Error::InvalidVlanId(4095))
        ));
        tables.set_native_vlan("eth-1", 10).unwrap();
        tables.add_trunk_vlan("eth-1", 20).unwrap();
        tables.add_trunk_vlan("eth-1", 30).unwrap();
        assert_eq!(tables.trunk_vlans("eth-1"), [20, 30]);
        assert!(tables.vlan_index(20).is_some());
        assert!(tables.stp_index(20).is_some());
        assert!(tables.vlan_index(40).is_none());

        assert!(matches!(
            tables.delete_vlan_mode("eth-1"),
            Err(Error::VlanModeConflict(..))
        ));
        assert!(matches!(
            tables.delete_interface("eth-1"),
            Err(Error::InterfaceHasVlanState(..))
        ));
        assert!(tables.check_invariants().is_ok());

        tables.delete_native_vlan("eth-1", 10).unwrap();
        tables.delete_trunk_vlan("eth-1", 20).unwrap();
        tables.delete_trunk_vlan("eth-1", 30).unwrap();
        tables.delete_vlan_mode("eth-1").unwrap();
        tables.delete_interface("eth-1").unwrap();
        assert!(tables.check_invariants().is_ok());
    }

    #[test]
    fn vlan_space_exhaustion() {
        let mut tables = LookupTables::new(Limits {
            max_ports: 2,
            max_lags: 1,
            max_vlans: 2,
            max_stp_instances: 1,
        });
        tables.add_interface("eth-1").unwrap();
        tables.set_vlan_mode("eth-1", VlanModeType::Trunk).unwrap();
        tables.add_trunk_vlan("eth-1", 10).unwrap();

        let before = tables.clone();
        assert!(matches!(
            tables.add_trunk_vlan("eth-1", 20),
            Err(Error::IndexSpaceExhausted("STP instance"))
        ));
        assert_eq!(tables, before);
    }

    #[test]
    fn port_breakout() {
        let mut tables = tables();
        let split = BreakoutMode::VALID[2];
        tables.add_interface("eth-5").unwrap();
        assert!(matches!(
            tables.add_interface("eth-5/1"),
            Err(Error::PortSplitConflict(..))
        ));
        assert!(matches!(
            tables.set_port_breakout("eth-5", split),
            Err(Error::PortSplitConflict(port, ifname))
                if port == "eth-5" && ifname == "eth-5"
        ));

        tables.add_address("eth-5", addr("10.0.0.5/24")).unwrap();
        assert!(matches!(
            tables.set_port_breakout("eth-5", split),
            Err(Error::InterfaceHasL3State(..))
        ));

        tables.delete_address("eth-5", addr("10.0.0.5/24")).unwrap();
        tables.delete_interface("eth-5").unwrap();
        tables.set_port_breakout("eth-5", split).unwrap();
        tables.add_interface("eth-5/1").unwrap();
        assert_eq!(tables.breakout("eth-5"), split);
        assert!(matches!(
            tables.set_port_breakout("eth-5", BreakoutMode::default()),
            Err(Error::PortSplitConflict(..))
        ));
        assert!(matches!(
            tables.set_port_breakout("eth-5/1", split),
            Err(Error::InvalidComponent(_))
        ));
        assert!(matches!(
            tables.set_port_breakout(
                "eth-6",
                BreakoutMode {
                    num_channels: 4,
                    channel_speed: PortSpeed::Speed25Gb,
                }
            ),
            Err(Error::InvalidBreakoutMode(_))
        ));

        // Speed changes that keep the port whole need no cleanup.
        tables.add_interface("eth-6").unwrap();
        tables
            .set_port_breakout("eth-6", BreakoutMode::VALID[1])
            .unwrap();
        assert!(tables.check_invariants().is_ok());
    }

    #[test]
    fn lacp_config() {
        let mut tables = tables();
        tables.add_interface("ae0").unwrap();
        tables.set_lag_type("ae0", AggregationType::Static).unwrap();
        assert!(matches!(
            tables.set_lacp("ae0"),
            Err(Error::LacpNotSupported(_))
        ));

        tables.add_interface("ae1").unwrap();
        tables.set_lag_type("ae1", AggregationType::Lacp).unwrap();
        tables.set_lacp("ae1").unwrap();
        let fast = LeafValue::String("FAST".to_owned());
        tables
            .set_lacp_attribute("ae1", LacpAttr::Interval, fast.clone())
            .unwrap();
        assert_eq!(
            tables.lacp_attribute("ae1", LacpAttr::Interval),
            Some(&fast)
        );
        assert!(tables.delete_lacp("ae1").is_err());
        assert!(matches!(
            tables.delete_interface("ae1"),
            Err(Error::DependencyConflict(_, deps))
                if deps == [Dependency::Lacp]
        ));

        tables.delete_lacp_attribute("ae1", LacpAttr::Interval).unwrap();
        tables.delete_lacp("ae1").unwrap();
        tables.delete_interface("ae1").unwrap();
        assert!(tables.check_invariants().is_ok());
    }
}
