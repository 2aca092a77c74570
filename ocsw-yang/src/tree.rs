//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

//! Lookup and edit operations over IETF-JSON encoded configuration.
//!
//! Container members are matched by their local name, so a path element
//! resolves regardless of whether the member (or the element) carries a
//! module prefix. List entries are selected by key.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::error::Error;
use crate::path::{Path, PathElem};
use crate::{YANG_LIST_KEYS, strip_prefix};

// Returns the data node addressed by the given path.
pub fn lookup<'a>(root: &'a Value, path: &Path) -> Option<&'a Value> {
    let mut node = root;
    for elem in &path.elem {
        let object = node.as_object()?;
        let member = member_name(object, &elem.name)?;
        node = &object[member];
        if !elem.key.is_empty() {
            node = node
                .as_array()?
                .iter()
                .find(|entry| key_matches(entry, &elem.key))?;
        }
    }
    Some(node)
}

// Removes the data node addressed by the given path.
//
// Deleting a node that doesn't exist isn't an error.
pub fn delete(root: &mut Value, path: &Path) -> Result<(), Error> {
    let Some((last, parents)) = path.elem.split_last() else {
        *root = Value::Object(Map::new());
        return Ok(());
    };

    let Some(parent) = lookup_mut(root, parents) else {
        return Ok(());
    };
    let object = parent
        .as_object_mut()
        .ok_or_else(|| Error::PathNotContainer(path.to_string()))?;
    let Some(member) = member_name(object, &last.name).cloned() else {
        return Ok(());
    };

    if last.key.is_empty() {
        object.remove(&member);
    } else if let Some(list) =
        object.get_mut(&member).and_then(Value::as_array_mut)
    {
        list.retain(|entry| !key_matches(entry, &last.key));
        if list.is_empty() {
            object.remove(&member);
        }
    }

    Ok(())
}

// Replaces the data node addressed by the given path, creating any missing
// ancestors.
pub fn replace(
    root: &mut Value,
    path: &Path,
    value: Value,
) -> Result<(), Error> {
    let node = node_mut(root, path)?;
    *node = value;
    restore_keys(node, path);
    Ok(())
}

// Merges the given value into the data node addressed by the given path,
// creating any missing ancestors.
pub fn update(
    root: &mut Value,
    path: &Path,
    value: Value,
) -> Result<(), Error> {
    let node = node_mut(root, path)?;
    merge(node, value);
    restore_keys(node, path);
    Ok(())
}

// ===== helper functions =====

fn member_name<'a>(
    object: &'a Map<String, Value>,
    name: &str,
) -> Option<&'a String> {
    let local = strip_prefix(name);
    object
        .keys()
        .find(|member| *member == name || strip_prefix(member) == local)
}

fn key_value(value: &Value) -> String {
    match value {
        Value::String(value) => value.clone(),
        value => value.to_string(),
    }
}

fn key_matches(entry: &Value, keys: &BTreeMap<String, String>) -> bool {
    keys.iter().all(|(key, value)| {
        entry
            .get(key)
            .is_some_and(|entry_value| key_value(entry_value) == *value)
    })
}

fn new_list_entry(keys: &BTreeMap<String, String>) -> Value {
    let entry = keys
        .iter()
        .map(|(key, value)| (key.clone(), typed_key(value)))
        .collect();
    Value::Object(entry)
}

// Numeric list keys (e.g. subinterface index) are encoded as JSON numbers.
fn typed_key(value: &str) -> Value {
    match value.parse::<u64>() {
        Ok(number) => Value::from(number),
        Err(_) => Value::from(value),
    }
}

fn restore_keys(node: &mut Value, path: &Path) {
    let Some(last) = path.elem.last() else {
        return;
    };
    if let Some(object) = node.as_object_mut() {
        for (key, value) in &last.key {
            object
                .entry(key.clone())
                .or_insert_with(|| typed_key(value));
        }
    }
}

fn lookup_mut<'a>(
    root: &'a mut Value,
    elems: &[PathElem],
) -> Option<&'a mut Value> {
    let mut node = root;
    for elem in elems {
        let object = node.as_object_mut()?;
        let member = member_name(object, &elem.name)?.clone();
        node = object.get_mut(&member)?;
        if !elem.key.is_empty() {
            node = node
                .as_array_mut()?
                .iter_mut()
                .find(|entry| key_matches(entry, &elem.key))?;
        }
    }
    Some(node)
}

fn node_mut<'a>(
    root: &'a mut Value,
    path: &Path,
) -> Result<&'a mut Value, Error> {
    let mut node = root;
    for elem in &path.elem {
        let object = node
            .as_object_mut()
            .ok_or_else(|| Error::PathNotContainer(path.to_string()))?;
        let member = member_name(object, &elem.name)
            .cloned()
            .unwrap_or_else(|| elem.name.clone());
        let child = object.entry(member).or_insert_with(|| {
            if elem.key.is_empty() {
                Value::Object(Map::new())
            } else {
                Value::Array(vec![])
            }
        });

        if elem.key.is_empty() {
            node = child;
            continue;
        }

        let list = child
            .as_array_mut()
            .ok_or_else(|| Error::PathNotContainer(path.to_string()))?;
        let pos = match list
            .iter()
            .position(|entry| key_matches(entry, &elem.key))
        {
            Some(pos) => pos,
            None => {
                list.push(new_list_entry(&elem.key));
                list.len() - 1
            }
        };
        node = &mut list[pos];
    }
    Ok(node)
}

fn merge(target: &mut Value, source: Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (name, value) in source {
                let member =
                    member_name(target, &name).cloned().unwrap_or(name);
                let list_key =
                    YANG_LIST_KEYS.get(strip_prefix(&member)).copied();
                match target.get_mut(&member) {
                    Some(existing) => match (existing, value, list_key) {
                        (
                            Value::Array(entries),
                            Value::Array(new_entries),
                            Some(key),
                        ) => merge_list(entries, new_entries, key),
                        (existing, value, _) => merge(existing, value),
                    },
                    None => {
                        target.insert(member, value);
                    }
                }
            }
        }
        (target, source) => *target = source,
    }
}

fn merge_list(entries: &mut Vec<Value>, new_entries: Vec<Value>, key: &str) {
    for new_entry in new_entries {
        let new_key = new_entry.get(key).map(key_value);
        let existing = entries.iter_mut().find(|entry| {
            new_key.is_some() && entry.get(key).map(key_value) == new_key
        });
        match existing {
            Some(existing) => merge(existing, new_entry),
            None => entries.push(new_entry),
        }
    }
}

// ===== unit tests =====

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn running() -> Value {
        json!({
            "openconfig-interfaces:interfaces": {
                "interface": [
                    {"name": "eth-1", "config": {"name": "eth-1", "mtu": 1500}},
                    {"name": "eth-2", "config": {"name": "eth-2"}}
                ]
            }
        })
    }

    #[test]
    fn lookup_leaf() {
        let root = running();
        let path = "/interfaces/interface[name=eth-1]/config/mtu"
            .parse()
            .unwrap();
        assert_eq!(lookup(&root, &path), Some(&json!(1500)));

        let path = "/interfaces/interface[name=eth-9]".parse().unwrap();
        assert_eq!(lookup(&root, &path), None);
    }

    #[test]
    fn update_creates_entry() {
        let mut root = running();
        let path = "/interfaces/interface[name=ae1]/config".parse().unwrap();
        update(&mut root, &path, json!({"name": "ae1"})).unwrap();

        let path = "/interfaces/interface[name=ae1]/config/name"
            .parse()
            .unwrap();
        assert_eq!(lookup(&root, &path), Some(&json!("ae1")));
        let list = lookup(&root, &"/interfaces/interface".parse().unwrap());
        assert_eq!(list.and_then(Value::as_array).map(Vec::len), Some(3));
    }

    #[test]
    fn update_merges_lists() {
        let mut root = running();
        let path = "/interfaces".parse().unwrap();
        let value = json!({
            "interface": [{"name": "eth-1", "config": {"description": "up"}}]
        });
        update(&mut root, &path, value).unwrap();

        let entry = lookup(
            &root,
            &"/interfaces/interface[name=eth-1]/config".parse().unwrap(),
        )
        .unwrap();
        assert_eq!(
            entry,
            &json!({"name": "eth-1", "mtu": 1500, "description": "up"})
        );
    }

    #[test]
    fn replace_entry() {
        let mut root = running();
        let path = "/interfaces/interface[name=eth-1]".parse().unwrap();
        replace(&mut root, &path, json!({"config": {"enabled": false}}))
            .unwrap();
        let entry = lookup(&root, &path).unwrap();
        assert_eq!(
            entry,
            &json!({"name": "eth-1", "config": {"enabled": false}})
        );
    }

    #[test]
    fn delete_entry() {
        let mut root = running();
        let path = "/interfaces/interface[name=eth-2]".parse().unwrap();
        delete(&mut root, &path).unwrap();
        assert_eq!(lookup(&root, &path), None);

        // Deleting again is a no-op.
        delete(&mut root, &path).unwrap();

        let path = "/interfaces/interface[name=eth-1]".parse().unwrap();
        delete(&mut root, &path).unwrap();
        assert_eq!(root, json!({"openconfig-interfaces:interfaces": {}}));
    }

    #[test]
    fn edit_through_leaf() {
        let mut root = running();
        let path = "/interfaces/interface[name=eth-1]/config/mtu/x"
            .parse()
            .unwrap();
        assert!(matches!(
            update(&mut root, &path, json!(1)),
            Err(Error::PathNotContainer(_))
        ));
    }
}
