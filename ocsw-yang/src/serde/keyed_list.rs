//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::BTreeMap;

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// YANG list entry identified by its key leaf.
pub trait ListEntry {
    type Key: Ord;

    fn list_key(&self) -> Self::Key;
}

// Serialize a keyed YANG list as a JSON array, ordered by key.
pub fn serialize<S, K, V>(
    list: &BTreeMap<K, V>,
    s: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    V: Serialize,
{
    s.collect_seq(list.values())
}

// Deserialize a JSON array into a keyed YANG list, rejecting duplicate keys.
pub fn deserialize<'de, D, V>(
    deserializer: D,
) -> Result<BTreeMap<V::Key, V>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de> + ListEntry,
{
    let entries = Vec::<V>::deserialize(deserializer)?;
    let mut list = BTreeMap::new();
    for entry in entries {
        if list.insert(entry.list_key(), entry).is_some() {
            return Err(D::Error::custom("duplicate list entry"));
        }
    }
    Ok(list)
}
