//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::path::Path;

use ocsw_yang::device::Device;

use crate::northbound::{Error, Result};

// Loads the configuration snapshot from a file, or returns `None` if the file
// doesn't exist.
pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Option<Device>> {
    let path = path.as_ref();
    if !path.exists() {
        return Ok(None);
    }

    let data = std::fs::read_to_string(path).map_err(Error::SnapshotIo)?;
    let device = Device::from_json(&data).map_err(Error::SnapshotData)?;
    Ok(Some(device))
}

// Writes the configuration snapshot, replacing the previous one.
pub(crate) fn save<P: AsRef<Path>>(path: P, device: &Device) -> Result<()> {
    let path = path.as_ref();
    let data = device.to_json_pretty().map_err(Error::YangInternal)?;

    // Write to a temporary file first, then move it into place.
    let tmp_path = path.with_extension("tmp");
    std::fs::write(&tmp_path, data).map_err(Error::SnapshotIo)?;
    std::fs::rename(&tmp_path, path).map_err(Error::SnapshotIo)?;
    Ok(())
}

// ===== unit tests =====
