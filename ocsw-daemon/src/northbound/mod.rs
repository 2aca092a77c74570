//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod client;
mod core;
mod error;
mod snapshot;

pub use self::core::{Northbound, Transaction};
pub use self::error::{Error, Result};
