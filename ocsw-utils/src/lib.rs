//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

pub mod ip;
pub mod task;

pub type Receiver<T> = tokio::sync::mpsc::Receiver<T>;
