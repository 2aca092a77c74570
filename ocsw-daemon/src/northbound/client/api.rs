//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_yang::device::Device;
use ocsw_yang::{Path, tree};
use serde_json::Value;

use crate::northbound::{Error, Result};

// Configuration to be committed.
#[derive(Debug)]
pub enum CommitConfiguration {
    // Full candidate configuration.
    Replace(Device),
    // Edits applied on top of the running configuration, in order.
    Edit(Vec<Edit>),
}

// Single edit of the running configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Edit {
    Delete(Path),
    Replace(Path, Value),
    Update(Path, Value),
}

#[derive(Debug)]
pub struct CommitResponse {
    // Zero when the configuration didn't change.
    pub transaction_id: u32,
    // Executed commands, in execution order.
    pub commands: Vec<String>,
}

// ===== impl Edit =====

impl Edit {
    pub fn path(&self) -> &Path {
        match self {
            Edit::Delete(path)
            | Edit::Replace(path, _)
            | Edit::Update(path, _) => path,
        }
    }

    // Applies the edit to an IETF-JSON encoded configuration.
    pub(crate) fn apply(self, config: &mut Value) -> Result<()> {
        match self {
            Edit::Delete(path) => tree::delete(config, &path),
            Edit::Replace(path, value) => tree::replace(config, &path, value),
            Edit::Update(path, value) => tree::update(config, &path, value),
        }
        .map_err(Error::YangInvalidPath)
    }
}
