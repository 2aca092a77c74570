//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use crate::error::Error;
use crate::serde::keyed_list::{self, ListEntry};
use crate::{ToYang, TryFromYang, strip_prefix};

//
// Typed OpenConfig device tree.
//
// Member names follow the IETF-JSON encoding (RFC 7951): nodes that belong to
// a different module than their parent carry the module name as prefix. The
// unprefixed form is accepted on input.
//

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Device {
    #[serde(rename = "openconfig-interfaces:interfaces", alias = "interfaces")]
    pub interfaces: Option<Interfaces>,
    #[serde(rename = "openconfig-platform:components", alias = "components")]
    pub components: Option<Components>,
    #[serde(rename = "openconfig-lacp:lacp", alias = "lacp")]
    pub lacp: Option<Lacp>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Interfaces {
    #[serde(
        default,
        with = "keyed_list",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub interface: BTreeMap<String, Interface>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Interface {
    pub name: String,
    pub config: Option<InterfaceConfig>,
    #[serde(rename = "openconfig-if-ethernet:ethernet", alias = "ethernet")]
    pub ethernet: Option<Ethernet>,
    #[serde(
        rename = "openconfig-if-aggregate:aggregation",
        alias = "aggregation"
    )]
    pub aggregation: Option<Aggregation>,
    pub subinterfaces: Option<Subinterfaces>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct InterfaceConfig {
    pub name: Option<String>,
    pub description: Option<String>,
    pub mtu: Option<u16>,
    pub enabled: Option<bool>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Ethernet {
    pub config: Option<EthernetConfig>,
    #[serde(rename = "openconfig-vlan:switched-vlan", alias = "switched-vlan")]
    pub switched_vlan: Option<SwitchedVlan>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct EthernetConfig {
    #[serde(
        rename = "openconfig-if-aggregate:aggregate-id",
        alias = "aggregate-id"
    )]
    pub aggregate_id: Option<String>,
    pub auto_negotiate: Option<bool>,
    pub port_speed: Option<PortSpeed>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Aggregation {
    pub config: Option<AggregationConfig>,
    #[serde(rename = "openconfig-vlan:switched-vlan", alias = "switched-vlan")]
    pub switched_vlan: Option<SwitchedVlan>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AggregationConfig {
    pub lag_type: Option<AggregationType>,
    pub min_links: Option<u16>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchedVlan {
    pub config: Option<SwitchedVlanConfig>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct SwitchedVlanConfig {
    pub interface_mode: Option<VlanModeType>,
    pub access_vlan: Option<u16>,
    pub native_vlan: Option<u16>,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub trunk_vlans: BTreeSet<u16>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Subinterfaces {
    #[serde(
        default,
        with = "keyed_list",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub subinterface: BTreeMap<u32, Subinterface>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Subinterface {
    pub index: u32,
    pub config: Option<SubinterfaceConfig>,
    #[serde(rename = "openconfig-if-ip:ipv4", alias = "ipv4")]
    pub ipv4: Option<Ip>,
    #[serde(rename = "openconfig-if-ip:ipv6", alias = "ipv6")]
    pub ipv6: Option<Ip>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SubinterfaceConfig {
    pub index: Option<u32>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Ip {
    pub addresses: Option<Addresses>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Addresses {
    #[serde(
        default,
        with = "keyed_list",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub address: BTreeMap<IpAddr, Address>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Address {
    pub ip: IpAddr,
    pub config: Option<AddressConfig>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct AddressConfig {
    pub ip: Option<IpAddr>,
    pub prefix_length: Option<u8>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Components {
    #[serde(
        default,
        with = "keyed_list",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub component: BTreeMap<String, Component>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Component {
    pub name: String,
    pub config: Option<ComponentConfig>,
    pub port: Option<Port>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ComponentConfig {
    pub name: Option<String>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Port {
    #[serde(
        rename = "openconfig-platform-port:breakout-mode",
        alias = "breakout-mode"
    )]
    pub breakout_mode: Option<BreakoutMode>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BreakoutMode {
    pub config: Option<BreakoutModeConfig>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct BreakoutModeConfig {
    pub num_channels: Option<u8>,
    pub channel_speed: Option<PortSpeed>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Lacp {
    pub interfaces: Option<LacpInterfaces>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LacpInterfaces {
    #[serde(
        default,
        with = "keyed_list",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    pub interface: BTreeMap<String, LacpInterface>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LacpInterface {
    pub name: String,
    pub config: Option<LacpInterfaceConfig>,
}

#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[skip_serializing_none]
#[derive(Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LacpInterfaceConfig {
    pub name: Option<String>,
    pub interval: Option<LacpPeriodType>,
    pub lacp_mode: Option<LacpActivityType>,
}

// Ethernet port speed identities (openconfig-if-ethernet).
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub enum PortSpeed {
    #[serde(rename = "openconfig-if-ethernet:SPEED_1GB", alias = "SPEED_1GB")]
    Speed1Gb,
    #[serde(
        rename = "openconfig-if-ethernet:SPEED_10GB",
        alias = "SPEED_10GB"
    )]
    Speed10Gb,
    #[serde(
        rename = "openconfig-if-ethernet:SPEED_25GB",
        alias = "SPEED_25GB"
    )]
    Speed25Gb,
    #[serde(
        rename = "openconfig-if-ethernet:SPEED_40GB",
        alias = "SPEED_40GB"
    )]
    Speed40Gb,
    #[serde(
        rename = "openconfig-if-ethernet:SPEED_50GB",
        alias = "SPEED_50GB"
    )]
    Speed50Gb,
    #[serde(
        rename = "openconfig-if-ethernet:SPEED_100GB",
        alias = "SPEED_100GB"
    )]
    Speed100Gb,
    #[serde(
        rename = "openconfig-if-ethernet:SPEED_400GB",
        alias = "SPEED_400GB"
    )]
    Speed400Gb,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VlanModeType {
    Access,
    Trunk,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregationType {
    Lacp,
    Static,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LacpPeriodType {
    Fast,
    Slow,
}

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LacpActivityType {
    Active,
    Passive,
}

// ===== impl Device =====

impl Device {
    // Decodes a device tree from IETF-JSON text.
    pub fn from_json(data: &str) -> Result<Device, Error> {
        let device: Device =
            serde_json::from_str(data).map_err(Error::Decode)?;
        device.validate()?;
        Ok(device)
    }

    // Decodes a device tree from an already parsed JSON value.
    pub fn from_value(value: Value) -> Result<Device, Error> {
        let device: Device =
            serde_json::from_value(value).map_err(Error::Decode)?;
        device.validate()?;
        Ok(device)
    }

    pub fn to_value(&self) -> Result<Value, Error> {
        serde_json::to_value(self).map_err(Error::Encode)
    }

    pub fn to_json_pretty(&self) -> Result<String, Error> {
        serde_json::to_string_pretty(self).map_err(Error::Encode)
    }

    // Checks that the key leaves replicated inside "config" containers agree
    // with the list keys.
    pub fn validate(&self) -> Result<(), Error> {
        for iface in self.interfaces() {
            if let Some(config) = &iface.config
                && let Some(name) = &config.name
                && *name != iface.name
            {
                return Err(Error::ListKeyMismatch(
                    "interface",
                    iface.name.clone(),
                    name.clone(),
                ));
            }
            for subif in iface.subinterfaces() {
                if let Some(index) =
                    subif.config.as_ref().and_then(|c| c.index)
                    && index != subif.index
                {
                    return Err(Error::ListKeyMismatch(
                        "subinterface",
                        subif.index.to_string(),
                        index.to_string(),
                    ));
                }
                for addr in subif.ipv4_addresses().chain(subif.ipv6_addresses())
                {
                    if let Some(ip) = addr.config.as_ref().and_then(|c| c.ip)
                        && ip != addr.ip
                    {
                        return Err(Error::ListKeyMismatch(
                            "address",
                            addr.ip.to_string(),
                            ip.to_string(),
                        ));
                    }
                }
            }
        }
        for component in self.components() {
            if let Some(name) =
                component.config.as_ref().and_then(|c| c.name.as_ref())
                && *name != component.name
            {
                return Err(Error::ListKeyMismatch(
                    "component",
                    component.name.clone(),
                    name.clone(),
                ));
            }
        }
        for lacp_iface in self.lacp_interfaces() {
            if let Some(name) =
                lacp_iface.config.as_ref().and_then(|c| c.name.as_ref())
                && *name != lacp_iface.name
            {
                return Err(Error::ListKeyMismatch(
                    "lacp interface",
                    lacp_iface.name.clone(),
                    name.clone(),
                ));
            }
        }

        Ok(())
    }

    pub fn interfaces(&self) -> impl Iterator<Item = &Interface> {
        self.interfaces
            .iter()
            .flat_map(|interfaces| interfaces.interface.values())
    }

    pub fn interface(&self, name: &str) -> Option<&Interface> {
        self.interfaces
            .as_ref()
            .and_then(|interfaces| interfaces.interface.get(name))
    }

    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components
            .iter()
            .flat_map(|components| components.component.values())
    }

    pub fn lacp_interfaces(&self) -> impl Iterator<Item = &LacpInterface> {
        self.lacp
            .iter()
            .filter_map(|lacp| lacp.interfaces.as_ref())
            .flat_map(|interfaces| interfaces.interface.values())
    }
}

// ===== impl Interface =====

impl Interface {
    pub fn subinterfaces(&self) -> impl Iterator<Item = &Subinterface> {
        self.subinterfaces
            .iter()
            .flat_map(|subifs| subifs.subinterface.values())
    }

    pub fn ethernet_config(&self) -> Option<&EthernetConfig> {
        self.ethernet.as_ref().and_then(|eth| eth.config.as_ref())
    }

    pub fn aggregation_config(&self) -> Option<&AggregationConfig> {
        self.aggregation.as_ref().and_then(|agg| agg.config.as_ref())
    }
}

impl ListEntry for Interface {
    type Key = String;

    fn list_key(&self) -> String {
        self.name.clone()
    }
}

// ===== impl Subinterface =====

impl Subinterface {
    pub fn ipv4_addresses(&self) -> impl Iterator<Item = &Address> {
        Self::addresses(&self.ipv4)
    }

    pub fn ipv6_addresses(&self) -> impl Iterator<Item = &Address> {
        Self::addresses(&self.ipv6)
    }

    fn addresses(ip: &Option<Ip>) -> impl Iterator<Item = &Address> {
        ip.iter()
            .filter_map(|ip| ip.addresses.as_ref())
            .flat_map(|addresses| addresses.address.values())
    }
}

impl ListEntry for Subinterface {
    type Key = u32;

    fn list_key(&self) -> u32 {
        self.index
    }
}

// ===== impl Address =====

impl ListEntry for Address {
    type Key = IpAddr;

    fn list_key(&self) -> IpAddr {
        self.ip
    }
}

// ===== impl Component =====

impl Component {
    pub fn breakout_config(&self) -> Option<&BreakoutModeConfig> {
        self.port
            .as_ref()
            .and_then(|port| port.breakout_mode.as_ref())
            .and_then(|mode| mode.config.as_ref())
    }
}

impl ListEntry for Component {
    type Key = String;

    fn list_key(&self) -> String {
        self.name.clone()
    }
}

// ===== impl LacpInterface =====

impl ListEntry for LacpInterface {
    type Key = String;

    fn list_key(&self) -> String {
        self.name.clone()
    }
}

// ===== impl PortSpeed =====

impl PortSpeed {
    // Speed in megabits per second.
    pub fn mbps(&self) -> u32 {
        match self {
            PortSpeed::Speed1Gb => 1_000,
            PortSpeed::Speed10Gb => 10_000,
            PortSpeed::Speed25Gb => 25_000,
            PortSpeed::Speed40Gb => 40_000,
            PortSpeed::Speed50Gb => 50_000,
            PortSpeed::Speed100Gb => 100_000,
            PortSpeed::Speed400Gb => 400_000,
        }
    }
}

impl ToYang for PortSpeed {
    fn to_yang(&self) -> Cow<'static, str> {
        match self {
            PortSpeed::Speed1Gb => "SPEED_1GB".into(),
            PortSpeed::Speed10Gb => "SPEED_10GB".into(),
            PortSpeed::Speed25Gb => "SPEED_25GB".into(),
            PortSpeed::Speed40Gb => "SPEED_40GB".into(),
            PortSpeed::Speed50Gb => "SPEED_50GB".into(),
            PortSpeed::Speed100Gb => "SPEED_100GB".into(),
            PortSpeed::Speed400Gb => "SPEED_400GB".into(),
        }
    }
}

impl TryFromYang for PortSpeed {
    fn try_from_yang(identity: &str) -> Option<PortSpeed> {
        match strip_prefix(identity) {
            "SPEED_1GB" => Some(PortSpeed::Speed1Gb),
            "SPEED_10GB" => Some(PortSpeed::Speed10Gb),
            "SPEED_25GB" => Some(PortSpeed::Speed25Gb),
            "SPEED_40GB" => Some(PortSpeed::Speed40Gb),
            "SPEED_50GB" => Some(PortSpeed::Speed50Gb),
            "SPEED_100GB" => Some(PortSpeed::Speed100Gb),
            "SPEED_400GB" => Some(PortSpeed::Speed400Gb),
            _ => None,
        }
    }
}

// ===== impl VlanModeType =====

impl ToYang for VlanModeType {
    fn to_yang(&self) -> Cow<'static, str> {
        match self {
            VlanModeType::Access => "ACCESS".into(),
            VlanModeType::Trunk => "TRUNK".into(),
        }
    }
}

impl TryFromYang for VlanModeType {
    fn try_from_yang(value: &str) -> Option<VlanModeType> {
        match value {
            "ACCESS" => Some(VlanModeType::Access),
            "TRUNK" => Some(VlanModeType::Trunk),
            _ => None,
        }
    }
}

// ===== impl AggregationType =====

impl ToYang for AggregationType {
    fn to_yang(&self) -> Cow<'static, str> {
        match self {
            AggregationType::Lacp => "LACP".into(),
            AggregationType::Static => "STATIC".into(),
        }
    }
}

impl TryFromYang for AggregationType {
    fn try_from_yang(value: &str) -> Option<AggregationType> {
        match value {
            "LACP" => Some(AggregationType::Lacp),
            "STATIC" => Some(AggregationType::Static),
            _ => None,
        }
    }
}

// ===== impl LacpPeriodType =====

impl ToYang for LacpPeriodType {
    fn to_yang(&self) -> Cow<'static, str> {
        match self {
            LacpPeriodType::Fast => "FAST".into(),
            LacpPeriodType::Slow => "SLOW".into(),
        }
    }
}

impl TryFromYang for LacpPeriodType {
    fn try_from_yang(value: &str) -> Option<LacpPeriodType> {
        match value {
            "FAST" => Some(LacpPeriodType::Fast),
            "SLOW" => Some(LacpPeriodType::Slow),
            _ => None,
        }
    }
}

// ===== impl LacpActivityType =====

impl ToYang for LacpActivityType {
    fn to_yang(&self) -> Cow<'static, str> {
        match self {
            LacpActivityType::Active => "ACTIVE".into(),
            LacpActivityType::Passive => "PASSIVE".into(),
        }
    }
}

impl TryFromYang for LacpActivityType {
    fn try_from_yang(value: &str) -> Option<LacpActivityType> {
        match value {
            "ACTIVE" => Some(LacpActivityType::Active),
            "PASSIVE" => Some(LacpActivityType::Passive),
            _ => None,
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decode_prefixed_and_unprefixed() {
        let prefixed = json!({
            "openconfig-interfaces:interfaces": {
                "interface": [{
                    "name": "eth-1",
                    "config": {"name": "eth-1", "mtu": 9000},
                    "openconfig-if-ethernet:ethernet": {
                        "config": {
                            "openconfig-if-aggregate:aggregate-id": "ae1",
                            "port-speed": "openconfig-if-ethernet:SPEED_10GB"
                        }
                    }
                }]
            }
        });
        let unprefixed = json!({
            "interfaces": {
                "interface": [{
                    "name": "eth-1",
                    "config": {"name": "eth-1", "mtu": 9000},
                    "ethernet": {
                        "config": {
                            "aggregate-id": "ae1",
                            "port-speed": "SPEED_10GB"
                        }
                    }
                }]
            }
        });
        let a = Device::from_value(prefixed.clone()).unwrap();
        let b = Device::from_value(unprefixed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_value().unwrap(), prefixed);

        let eth = a.interface("eth-1").unwrap().ethernet_config().unwrap();
        assert_eq!(eth.aggregate_id.as_deref(), Some("ae1"));
        assert_eq!(eth.port_speed, Some(PortSpeed::Speed10Gb));
    }

    #[test]
    fn decode_rejects_unknown_member() {
        let value = json!({
            "interfaces": {"interface": [{"name": "eth-1", "bogus": 1}]}
        });
        assert!(matches!(Device::from_value(value), Err(Error::Decode(_))));
    }

    #[test]
    fn decode_rejects_wrong_type() {
        let value = json!({
            "interfaces": {
                "interface": [{"name": "eth-1", "config": {"mtu": "big"}}]
            }
        });
        assert!(matches!(Device::from_value(value), Err(Error::Decode(_))));
    }

    #[test]
    fn decode_rejects_duplicate_key() {
        let value = json!({
            "interfaces": {
                "interface": [{"name": "eth-1"}, {"name": "eth-1"}]
            }
        });
        assert!(matches!(Device::from_value(value), Err(Error::Decode(_))));
    }

    #[test]
    fn key_mismatch() {
        let value = json!({
            "interfaces": {
                "interface": [{"name": "eth-1", "config": {"name": "eth-2"}}]
            }
        });
        assert!(matches!(
            Device::from_value(value),
            Err(Error::ListKeyMismatch("interface", _, _))
        ));
    }

    #[test]
    fn identity_conversion() {
        assert_eq!(
            PortSpeed::try_from_yang("openconfig-if-ethernet:SPEED_40GB"),
            Some(PortSpeed::Speed40Gb)
        );
        assert_eq!(PortSpeed::Speed100Gb.to_yang(), "SPEED_100GB");
        assert_eq!(PortSpeed::try_from_yang("SPEED_3GB"), None);
    }
}
