//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;
use std::ops::Range;

use crate::error::Error;

// Dense index space.
//
// Indexes are handed out in increasing order starting at the base of the
// space. Once a name is given an index, the assignment is kept for the
// lifetime of the tables and the index is never reused.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IndexSpace {
    name: &'static str,
    base: u32,
    size: u32,
    next: u32,
    by_name: BTreeMap<String, u32>,
    by_index: BTreeMap<u32, String>,
}

// ===== impl IndexSpace =====

impl IndexSpace {
    pub fn new(name: &'static str, base: u32, size: u32) -> IndexSpace {
        IndexSpace {
            name,
            base,
            size,
            next: 0,
            by_name: Default::default(),
            by_index: Default::default(),
        }
    }

    // Returns the index of the given name, assigning a new one on first use.
    pub fn assign(&mut self, name: &str) -> Result<u32, Error> {
        if let Some(index) = self.by_name.get(name) {
            return Ok(*index);
        }
        if self.is_full() {
            return Err(Error::IndexSpaceExhausted(self.name));
        }

        let index = self.base + self.next;
        self.next += 1;
        self.by_name.insert(name.to_owned(), index);
        self.by_index.insert(index, name.to_owned());
        Ok(index)
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, index: u32) -> Option<&str> {
        self.by_index.get(&index).map(String::as_str)
    }

    pub fn range(&self) -> Range<u32> {
        self.base..self.base + self.size
    }

    pub fn kind(&self) -> &'static str {
        self.name
    }

    pub fn is_full(&self) -> bool {
        self.next >= self.size
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.by_name
            .iter()
            .map(|(name, index)| (name.as_str(), *index))
    }

    // Checks that assignments are dense, in range and bijective.
    pub(crate) fn check(&self) -> Result<(), String> {
        if self.by_name.len() != self.by_index.len()
            || self.by_name.len() != self.next as usize
        {
            return Err(format!("{} index space isn't dense", self.name));
        }
        for (name, index) in &self.by_name {
            if !self.range().contains(index)
                || self.by_index.get(index) != Some(name)
            {
                return Err(format!(
                    "{} index {} of {} is invalid",
                    self.name, index, name
                ));
            }
        }
        Ok(())
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dense_assignment() {
        let mut space = IndexSpace::new("port", 100, 2);
        assert_eq!(space.assign("eth-1").unwrap(), 100);
        assert_eq!(space.assign("eth-2").unwrap(), 101);
        assert_eq!(space.assign("eth-1").unwrap(), 100);
        assert_eq!(space.name(101), Some("eth-2"));
        assert!(matches!(
            space.assign("eth-3"),
            Err(Error::IndexSpaceExhausted("port"))
        ));
        assert_eq!(space.len(), 2);
        assert!(space.check().is_ok());
    }
}
