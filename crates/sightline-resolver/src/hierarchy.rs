//! Hierarchy index: the manager/subordinate forest.
//!
//! Identity records expose two manager-reference fields — `manager` and a
//! `legacy_manager` left over from an earlier HR schema migration. Rather
//! than special-casing the pair forever, the index resolves each record's
//! manager through an ordered list of [`ManagerSource`] providers: the
//! first provider returning a non-null reference wins.
//!
//! The manager graph is supposed to be a forest, but the source data is
//! not trusted: traversal is iterative with an explicit visited set, so a
//! cyclic chain is logged and truncated instead of looping indefinitely.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use sightline_store::DirectorySnapshot;
use sightline_types::{Carnet, Identity};
use tracing::warn;

use crate::cancel::CancelToken;
use crate::error::{ResolveError, Result};

/// Hard bound on traversal depth, a second guard behind the visited set.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// ============================================================================
// Manager sources
// ============================================================================

/// A provider of manager references for an identity record.
///
/// Providers are consulted in order; the first non-null reference wins.
pub trait ManagerSource: std::fmt::Debug + Send + Sync {
    /// Returns the manager this source knows for `identity`, if any.
    fn manager_of<'a>(&self, identity: &'a Identity) -> Option<&'a Carnet>;
}

/// Reads the current `manager` field.
#[derive(Debug, Clone, Copy)]
pub struct PrimaryManagerField;

impl ManagerSource for PrimaryManagerField {
    fn manager_of<'a>(&self, identity: &'a Identity) -> Option<&'a Carnet> {
        identity.manager.as_ref()
    }
}

/// Reads the `legacy_manager` field left behind by the old HR schema.
/// Some records still populate only this one.
#[derive(Debug, Clone, Copy)]
pub struct LegacyManagerField;

impl ManagerSource for LegacyManagerField {
    fn manager_of<'a>(&self, identity: &'a Identity) -> Option<&'a Carnet> {
        identity.legacy_manager.as_ref()
    }
}

/// The fixed-precedence provider list: current field first, legacy second.
pub fn default_manager_sources() -> Vec<Box<dyn ManagerSource>> {
    vec![Box::new(PrimaryManagerField), Box::new(LegacyManagerField)]
}

/// Resolves one identity's manager through the ordered provider list.
fn effective_manager<'a>(
    sources: &[Box<dyn ManagerSource>],
    identity: &'a Identity,
) -> Option<&'a Carnet> {
    sources.iter().find_map(|source| source.manager_of(identity))
}

// ============================================================================
// Index
// ============================================================================

/// Traversable manager/subordinate forest over one directory snapshot.
///
/// Built once per resolution from the snapshot's identity records; the
/// child adjacency is keyed by carnet and ordered deterministically
/// (snapshot iteration is carnet order).
#[derive(Debug)]
pub struct HierarchyIndex {
    children: HashMap<Carnet, Vec<Carnet>>,
    active: HashSet<Carnet>,
    max_depth: usize,
}

impl HierarchyIndex {
    /// Builds the index with the default provider precedence and depth bound.
    pub fn build(snapshot: &DirectorySnapshot) -> Self {
        Self::build_with(snapshot, &default_manager_sources(), DEFAULT_MAX_DEPTH)
    }

    /// Builds the index with explicit manager sources and depth bound.
    pub fn build_with(
        snapshot: &DirectorySnapshot,
        sources: &[Box<dyn ManagerSource>],
        max_depth: usize,
    ) -> Self {
        let mut children: HashMap<Carnet, Vec<Carnet>> = HashMap::new();
        let mut active = HashSet::new();

        for identity in snapshot.identities() {
            if identity.active {
                active.insert(identity.carnet.clone());
            }
            if let Some(manager) = effective_manager(sources, identity) {
                children
                    .entry(manager.clone())
                    .or_default()
                    .push(identity.carnet.clone());
            }
        }

        Self {
            children,
            active,
            max_depth,
        }
    }

    /// Returns all identities transitively reachable via manager-of edges
    /// from `root`, deduplicated, excluding inactive identities and `root`
    /// itself.
    ///
    /// Traversal is breadth-first with an explicit visited set. A repeat
    /// sighting means the source data contains a cycle: it is logged and
    /// the offending edge skipped. Inactive identities are excluded from
    /// the result but still traversed, so the subtree beneath an inactive
    /// middle manager stays reachable.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Cancelled`] if the caller's token fires
    /// mid-traversal; no partial result is surfaced.
    pub fn descendants(&self, root: &Carnet, cancel: &CancelToken) -> Result<BTreeSet<Carnet>> {
        let mut result = BTreeSet::new();
        let mut visited: HashSet<&Carnet> = HashSet::new();
        let mut queue: VecDeque<(&Carnet, usize)> = VecDeque::new();

        visited.insert(root);
        queue.push_back((root, 0));

        while let Some((current, depth)) = queue.pop_front() {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            if depth >= self.max_depth {
                warn!(
                    root = %root,
                    at = %current,
                    max_depth = self.max_depth,
                    "manager chain exceeds depth bound; truncating traversal"
                );
                continue;
            }

            let Some(subordinates) = self.children.get(current) else {
                continue;
            };
            for subordinate in subordinates {
                if !visited.insert(subordinate) {
                    warn!(
                        root = %root,
                        repeated = %subordinate,
                        "cycle in manager references; truncating traversal"
                    );
                    continue;
                }
                if self.active.contains(subordinate) {
                    result.insert(subordinate.clone());
                }
                queue.push_back((subordinate, depth + 1));
            }
        }

        Ok(result)
    }
}

// ============================================================================
// Tests
// ============================================================================
