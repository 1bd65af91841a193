//! Delegation store view.
//!
//! A delegation hands the delegator's *entire* visibility scope to the
//! delegate for the grant's window — subordinates included. The view only
//! answers "who is delegating to this identity right now"; the resolver
//! expands each delegator's scope itself, which is what keeps delegation
//! one-directional and non-transitive (a delegator's own incoming
//! delegations are not followed).

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sightline_store::DirectorySnapshot;
use sightline_types::Carnet;

/// Read-only view over a snapshot's delegation grants.
#[derive(Debug, Clone, Copy)]
pub struct DelegationView<'a> {
    snapshot: &'a DirectorySnapshot,
}

impl<'a> DelegationView<'a> {
    pub fn new(snapshot: &'a DirectorySnapshot) -> Self {
        Self { snapshot }
    }

    /// Returns the identities currently delegating their visibility scope
    /// to `delegate`: grants that are active and whose window contains
    /// `as_of`.
    pub fn delegators_for(&self, delegate: &Carnet, as_of: NaiveDate) -> BTreeSet<Carnet> {
        self.snapshot
            .delegations()
            .iter()
            .filter(|grant| {
                grant.active && grant.delegate == *delegate && grant.window.contains(as_of)
            })
            .map(|grant| grant.delegator.clone())
            .collect()
    }
}
