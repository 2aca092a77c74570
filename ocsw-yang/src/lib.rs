//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod device;
pub mod error;
pub mod path;
pub mod serde;
pub mod tree;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::LazyLock as Lazy;

use maplit::btreemap;

pub use crate::device::Device;
pub use crate::error::Error;
pub use crate::path::{Path, PathElem};

// OpenConfig module advertised through the capabilities RPC.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ModuleData {
    pub name: &'static str,
    pub organization: &'static str,
    pub version: &'static str,
}

// All modules currently implemented.
pub static YANG_IMPLEMENTED_MODULES: Lazy<Vec<ModuleData>> = Lazy::new(|| {
    [
        ("openconfig-interfaces", "2.4.3"),
        ("openconfig-if-aggregate", "2.4.2"),
        ("openconfig-if-ethernet", "2.7.2"),
        ("openconfig-if-ip", "3.0.0"),
        ("openconfig-if-ip-ext", "2.3.1"),
        ("openconfig-lacp", "1.1.1"),
        ("openconfig-lldp", "0.2.1"),
        ("openconfig-platform-transceiver", "0.7.0"),
        ("openconfig-spanning-tree", "0.3.1"),
    ]
    .into_iter()
    .map(|(name, version)| ModuleData {
        name,
        organization: "OpenConfig working group",
        version,
    })
    .collect()
});

// Keys of the YANG lists present in the supported data model, indexed by
// list name.
pub static YANG_LIST_KEYS: Lazy<BTreeMap<&'static str, &'static str>> =
    Lazy::new(|| {
        btreemap! {
            "interface" => "name",
            "subinterface" => "index",
            "address" => "ip",
            "component" => "name",
        }
    });

// Supported gNMI encodings.
pub const YANG_ENCODINGS: [&str; 2] = ["JSON", "JSON_IETF"];

//
// YANG conversion traits.
//

pub trait ToYang {
    // Return YANG textual representation of the value.
    fn to_yang(&self) -> Cow<'static, str>;
}

pub trait TryFromYang: Sized {
    // Construct value from YANG identity or enum value.
    //
    // Identities can be given with or without their module prefix.
    fn try_from_yang(identity: &str) -> Option<Self>;
}

// ===== global functions =====

// Strips the module prefix from a YANG node name or identity.
pub fn strip_prefix(name: &str) -> &str {
    match name.split_once(':') {
        Some((_, name)) => name,
        None => name,
    }
}
