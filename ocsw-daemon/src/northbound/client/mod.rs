//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod api;
pub mod gnmi;
pub mod shell;
