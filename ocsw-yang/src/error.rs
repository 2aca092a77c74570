//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

// Data model errors.
#[derive(Debug)]
pub enum Error {
    Decode(serde_json::Error),
    Encode(serde_json::Error),
    ListKeyMismatch(&'static str, String, String),
    InvalidPath(String),
    PathNotContainer(String),
}

// ===== impl Error =====

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Decode(error) => {
                write!(f, "failed to decode configuration: {error}")
            }
            Error::Encode(error) => {
                write!(f, "failed to encode configuration: {error}")
            }
            Error::ListKeyMismatch(list, key, value) => {
                write!(
                    f,
                    "{list} list key mismatch: entry {key} has key leaf {value}"
                )
            }
            Error::InvalidPath(path) => {
                write!(f, "invalid path: {path}")
            }
            Error::PathNotContainer(path) => {
                write!(f, "path traverses a non-container node: {path}")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(error) | Error::Encode(error) => Some(error),
            _ => None,
        }
    }
}
