//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{trace, trace_span};

use crate::paths::DataPath;

#[derive(Debug)]
pub enum Debug<'a> {
    DiffComputed(usize),
    ChangeSplit(&'a DataPath),
}

// ===== impl Debug =====

impl Debug<'_> {
    pub fn log(&self) {
        match self {
            Debug::DiffComputed(count) => {
                trace_span!("northbound").in_scope(|| {
                    trace!(%count, "{}", self);
                });
            }
            Debug::ChangeSplit(path) => {
                trace_span!("northbound").in_scope(|| {
                    trace!(%path, "{}", self);
                });
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::DiffComputed(..) => {
                write!(f, "configuration diff computed")
            }
            Debug::ChangeSplit(..) => {
                write!(f, "update split into delete and create")
            }
        }
    }
}
