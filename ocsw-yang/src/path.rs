//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::str::FromStr;

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::strip_prefix;

// Structured data path, as carried by gNMI messages.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct Path {
    pub origin: Option<String>,
    pub elem: Vec<PathElem>,
}

// Single element of a data path. List elements carry their keys.
#[derive(Clone, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[derive(Deserialize, Serialize)]
pub struct PathElem {
    pub name: String,
    pub key: BTreeMap<String, String>,
}

// ===== impl Path =====

impl Path {
    pub fn new(elem: Vec<PathElem>) -> Path {
        Path { origin: None, elem }
    }

    pub fn is_root(&self) -> bool {
        self.elem.is_empty()
    }

    // Concatenates a request prefix with a request path.
    pub fn join(prefix: Option<&Path>, path: &Path) -> Path {
        match prefix {
            Some(prefix) => Path {
                origin: path.origin.clone().or_else(|| prefix.origin.clone()),
                elem: prefix
                    .elem
                    .iter()
                    .chain(path.elem.iter())
                    .cloned()
                    .collect(),
            },
            None => path.clone(),
        }
    }
}

impl std::fmt::Display for Path {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.elem.iter().join("/"))
    }
}

impl FromStr for Path {
    type Err = Error;

    // Parses the gNMI string encoding of a path, for instance
    // "/interfaces/interface[name=eth-1/1]/config/mtu".
    fn from_str(s: &str) -> Result<Path, Error> {
        let s = s.trim();
        let s = s.strip_prefix('/').unwrap_or(s);
        if s.is_empty() {
            return Ok(Path::default());
        }

        // Split on slashes that are not part of a key value.
        let mut elems = vec![];
        let mut depth = 0;
        let mut start = 0;
        for (pos, c) in s.char_indices() {
            match c {
                '[' => depth += 1,
                ']' if depth > 0 => depth -= 1,
                '/' if depth == 0 => {
                    elems.push(&s[start..pos]);
                    start = pos + 1;
                }
                _ => (),
            }
        }
        if depth != 0 {
            return Err(Error::InvalidPath(s.to_owned()));
        }
        elems.push(&s[start..]);

        let elem = elems
            .into_iter()
            .map(|elem| {
                elem.parse::<PathElem>()
                    .map_err(|_| Error::InvalidPath(s.to_owned()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Path::new(elem))
    }
}

// ===== impl PathElem =====

impl PathElem {
    pub fn new(name: &str) -> PathElem {
        PathElem {
            name: name.to_owned(),
            key: Default::default(),
        }
    }

    pub fn with_key(mut self, key: &str, value: &str) -> PathElem {
        self.key.insert(key.to_owned(), value.to_owned());
        self
    }

    // Element name without its module prefix.
    pub fn local_name(&self) -> &str {
        strip_prefix(&self.name)
    }
}

impl std::fmt::Display for PathElem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)?;
        for (key, value) in &self.key {
            write!(f, "[{key}={value}]")?;
        }
        Ok(())
    }
}

impl FromStr for PathElem {
    type Err = Error;

    fn from_str(s: &str) -> Result<PathElem, Error> {
        let invalid = || Error::InvalidPath(s.to_owned());

        let (name, mut rest) = match s.find('[') {
            Some(pos) => (&s[..pos], &s[pos..]),
            None => (s, ""),
        };
        if name.is_empty() {
            return Err(invalid());
        }

        let mut elem = PathElem::new(name);
        while !rest.is_empty() {
            let body = rest.strip_prefix('[').ok_or_else(invalid)?;
            let end = body.find(']').ok_or_else(invalid)?;
            let (key, value) =
                body[..end].split_once('=').ok_or_else(invalid)?;
            if key.is_empty() {
                return Err(invalid());
            }
            elem.key.insert(key.to_owned(), value.to_owned());
            rest = &body[end + 1..];
        }

        Ok(elem)
    }
}

// ===== unit tests =====
