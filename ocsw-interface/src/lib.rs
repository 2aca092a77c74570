//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

#![warn(rust_2018_idioms)]

pub mod command;
pub mod debug;
pub mod error;
pub mod ifname;
pub mod northbound;
pub mod southbound;
pub mod tables;
pub mod transaction;

pub use crate::error::{Error, ErrorKind};
pub use crate::southbound::{SimulatedSwitch, SwitchClient};
pub use crate::tables::{Limits, LookupTables};
pub use crate::transaction::{CommitOutcome, Engine};
