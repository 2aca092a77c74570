//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use tracing::{debug, debug_span, trace};

use crate::command::Command;
use crate::transaction::Phase;

// Transaction debug messages.
#[derive(Debug)]
pub enum Debug<'a> {
    TransactionStart(usize),
    PhaseStart(Phase),
    CommandAdd(Phase, &'a Command),
    CommandMerge(Phase, &'a Command),
    CommandExecute(&'a Command),
    CommandUndo(&'a Command),
    RollbackStart(usize),
    TransactionCommit(usize),
}

// ===== impl Debug =====

impl Debug<'_> {
    // Log debug message using the tracing API.
    pub fn log(&self) {
        match self {
            Debug::TransactionStart(changes) => {
                debug_span!("transaction").in_scope(|| {
                    debug!(%changes, "{}", self);
                });
            }
            Debug::PhaseStart(phase) => {
                debug_span!("transaction").in_scope(|| {
                    trace!(?phase, "{}", self);
                });
            }
            Debug::CommandAdd(phase, command)
            | Debug::CommandMerge(phase, command) => {
                debug_span!("transaction").in_scope(|| {
                    trace!(?phase, %command, "{}", self);
                });
            }
            Debug::CommandExecute(command) | Debug::CommandUndo(command) => {
                debug_span!("transaction").in_scope(|| {
                    debug!(%command, "{}", self);
                });
            }
            Debug::RollbackStart(commands) => {
                debug_span!("transaction").in_scope(|| {
                    debug!(%commands, "{}", self);
                });
            }
            Debug::TransactionCommit(commands) => {
                debug_span!("transaction").in_scope(|| {
                    debug!(%commands, "{}", self);
                });
            }
        }
    }
}

impl std::fmt::Display for Debug<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Debug::TransactionStart(..) => {
                write!(f, "starting transaction")
            }
            Debug::PhaseStart(..) => {
                write!(f, "validating phase")
            }
            Debug::CommandAdd(..) => {
                write!(f, "command added")
            }
            Debug::CommandMerge(..) => {
                write!(f, "command merged")
            }
            Debug::CommandExecute(..) => {
                write!(f, "executing command")
            }
            Debug::CommandUndo(..) => {
                write!(f, "undoing command")
            }
            Debug::RollbackStart(..) => {
                write!(f, "rolling back executed commands")
            }
            Debug::TransactionCommit(..) => {
                write!(f, "transaction committed")
            }
        }
    }
}
