//
// Copyright (c) The Holo Core Contributors
//
// SPDX-License-Identifier: MIT
//

use std::collections::{BTreeMap, BTreeSet};

// One-to-many relation indexed in both directions.
//
// Every member belongs to exactly one owner.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OneToMany<O: Ord, M: Ord> {
    by_owner: BTreeMap<O, BTreeSet<M>>,
    by_member: BTreeMap<M, O>,
}

// Many-to-many relation indexed in both directions.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ManyToMany<A: Ord, B: Ord> {
    by_left: BTreeMap<A, BTreeSet<B>>,
    by_right: BTreeMap<B, BTreeSet<A>>,
}

// ===== impl OneToMany =====

impl<O, M> OneToMany<O, M>
where
    O: Clone + Ord,
    M: Clone + Ord,
{
    // Adds a member to the given owner.
    //
    // Fails with the current owner if the member already belongs somewhere.
    pub fn insert(&mut self, owner: O, member: M) -> Result<(), O> {
        if let Some(current) = self.by_member.get(&member) {
            return Err(current.clone());
        }
        self.by_owner
            .entry(owner.clone())
            .or_default()
            .insert(member.clone());
        self.by_member.insert(member, owner);
        Ok(())
    }

    // Removes a member, returning its former owner.
    pub fn remove(&mut self, member: &M) -> Option<O> {
        let owner = self.by_member.remove(member)?;
        if let Some(members) = self.by_owner.get_mut(&owner) {
            members.remove(member);
            if members.is_empty() {
                self.by_owner.remove(&owner);
            }
        }
        Some(owner)
    }

    pub fn owner(&self, member: &M) -> Option<&O> {
        self.by_member.get(member)
    }

    pub fn members(&self, owner: &O) -> impl Iterator<Item = &M> {
        self.by_owner.get(owner).into_iter().flatten()
    }

    pub fn has_members(&self, owner: &O) -> bool {
        self.by_owner.contains_key(owner)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&M, &O)> {
        self.by_member.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.by_member.is_empty()
    }

    // Checks that both directions describe the same relation.
    pub(crate) fn is_consistent(&self) -> bool {
        let count = self.by_owner.values().map(BTreeSet::len).sum::<usize>();
        count == self.by_member.len()
            && self.by_owner.iter().all(|(owner, members)| {
                !members.is_empty()
                    && members
                        .iter()
                        .all(|member| self.by_member.get(member) == Some(owner))
            })
    }
}

impl<O: Ord, M: Ord> Default for OneToMany<O, M> {
    fn default() -> OneToMany<O, M> {
        OneToMany {
            by_owner: Default::default(),
            by_member: Default::default(),
        }
    }
}

// ===== impl ManyToMany =====

impl<A, B> ManyToMany<A, B>
where
    A: Clone + Ord,
    B: Clone + Ord,
{
    // Adds a pair, returning whether it was new.
    pub fn insert(&mut self, left: A, right: B) -> bool {
        if !self
            .by_left
            .entry(left.clone())
            .or_default()
            .insert(right.clone())
        {
            return false;
        }
        self.by_right.entry(right).or_default().insert(left);
        true
    }

    // Removes a pair, returning whether it was present.
    pub fn remove(&mut self, left: &A, right: &B) -> bool {
        let Some(rights) = self.by_left.get_mut(left) else {
            return false;
        };
        if !rights.remove(right) {
            return false;
        }
        if rights.is_empty() {
            self.by_left.remove(left);
        }
        if let Some(lefts) = self.by_right.get_mut(right) {
            lefts.remove(left);
            if lefts.is_empty() {
                self.by_right.remove(right);
            }
        }
        true
    }

    pub fn contains(&self, left: &A, right: &B) -> bool {
        self.by_left
            .get(left)
            .is_some_and(|rights| rights.contains(right))
    }

    pub fn by_left(&self, left: &A) -> impl Iterator<Item = &B> {
        self.by_left.get(left).into_iter().flatten()
    }

    pub fn by_right(&self, right: &B) -> impl Iterator<Item = &A> {
        self.by_right.get(right).into_iter().flatten()
    }

    pub fn has_right(&self, right: &B) -> bool {
        self.by_right.contains_key(right)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&A, &B)> {
        self.by_left
            .iter()
            .flat_map(|(left, rights)| rights.iter().map(move |r| (left, r)))
    }

    pub(crate) fn is_consistent(&self) -> bool {
        let left: usize = self.by_left.values().map(BTreeSet::len).sum();
        let right: usize = self.by_right.values().map(BTreeSet::len).sum();
        left == right
            && self.by_left.values().all(|set| !set.is_empty())
            && self.by_right.values().all(|set| !set.is_empty())
            && self.iter().all(|(left, right)| {
                self.by_right
                    .get(right)
                    .is_some_and(|lefts| lefts.contains(left))
            })
    }
}

impl<A: Ord, B: Ord> Default for ManyToMany<A, B> {
    fn default() -> ManyToMany<A, B> {
        ManyToMany {
            by_left: Default::default(),
            by_right: Default::default(),
        }
    }
}

// ===== unit tests =====
