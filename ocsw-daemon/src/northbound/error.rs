//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use ocsw_interface::ErrorKind;
use ocsw_yang::Path;
use tonic::Status;

//
// Type aliases.
//
pub type Result<T> = std::result::Result<T, Error>;

//
// Northbound errors.
//
#[derive(Debug)]
pub enum Error {
    YangInvalidPath(ocsw_yang::Error),
    YangInvalidData(ocsw_yang::Error),
    YangInternal(ocsw_yang::Error),
    PathNotFound(Path),
    Transaction(ocsw_interface::Error),
    SnapshotIo(std::io::Error),
    SnapshotData(ocsw_yang::Error),
}

// ===== impl Error =====

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::YangInvalidPath(err) => {
                write!(f, "Invalid data path: {}", err)
            }
            Error::YangInvalidData(err) => {
                write!(f, "Invalid instance data: {}", err)
            }
            Error::YangInternal(err) => {
                write!(f, "Data model internal error: {}", err)
            }
            Error::PathNotFound(path) => {
                write!(f, "Data path not found: {}", path)
            }
            Error::Transaction(err) => {
                write!(f, "Transaction failed: {}", err)
            }
            Error::SnapshotIo(err) => {
                write!(f, "Failed to access configuration snapshot: {}", err)
            }
            Error::SnapshotData(err) => {
                write!(f, "Invalid configuration snapshot: {}", err)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::YangInvalidPath(err)
            | Error::YangInvalidData(err)
            | Error::YangInternal(err)
            | Error::SnapshotData(err) => Some(err),
            Error::Transaction(err) => Some(err),
            Error::SnapshotIo(err) => Some(err),
            Error::PathNotFound(_) => None,
        }
    }
}

impl From<Error> for Status {
    fn from(error: Error) -> Status {
        match &error {
            Error::YangInvalidPath(..) | Error::YangInvalidData(..) => {
                Status::invalid_argument(error.to_string())
            }
            Error::PathNotFound(..) => Status::not_found(error.to_string()),
            Error::Transaction(err) => match err.kind() {
                ErrorKind::InvalidArgument => {
                    Status::invalid_argument(error.to_string())
                }
                ErrorKind::FailedPrecondition => {
                    Status::failed_precondition(error.to_string())
                }
                ErrorKind::Aborted => Status::aborted(error.to_string()),
                ErrorKind::Internal => Status::internal(error.to_string()),
            },
            Error::YangInternal(..)
            | Error::SnapshotIo(..)
            | Error::SnapshotData(..) => Status::internal(error.to_string()),
        }
    }
}

// ===== unit tests =====
