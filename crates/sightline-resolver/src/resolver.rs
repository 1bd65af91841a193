//! The visibility resolver: composes hierarchy, delegation, grants, and
//! role authority into one deterministic result.
//!
//! `resolve` is a pure read-only query over a single point-in-time
//! snapshot. Concurrent calls share nothing mutable; the only suspension
//! point is fetching the snapshot from the store.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use sightline_store::DirectoryStore;
use sightline_types::Carnet;
use tracing::debug;

use crate::authority::RoleAuthority;
use crate::cancel::CancelToken;
use crate::delegation::DelegationView;
use crate::error::{ResolveError, Result};
use crate::grants::GrantView;
use crate::hierarchy::{DEFAULT_MAX_DEPTH, HierarchyIndex, ManagerSource, default_manager_sources};

/// Resolves the set of identities an actor is permitted to see.
///
/// # Algorithm
///
/// 1. Elevated role ⇒ start from all active identities.
/// 2. Otherwise, let `actors = {actor} ∪ delegators(actor)`; union each
///    member's descendants with `actors` itself (self-visibility included).
/// 3. Union in the actor's ALLOW targets.
/// 4. Subtract the actor's DENY targets — on the elevated path too; DENY
///    wins unconditionally.
/// 5. The actor is always present in its own result; other inactive
///    identities are excluded.
///
/// The result is a `BTreeSet`: order-independent set semantics with a
/// deterministic iteration order. Display ordering is a presentation
/// concern that lives elsewhere.
#[derive(Debug)]
pub struct VisibilityResolver<S> {
    store: S,
    authority: RoleAuthority,
    manager_sources: Vec<Box<dyn ManagerSource>>,
    max_hierarchy_depth: usize,
}

impl<S: DirectoryStore> VisibilityResolver<S> {
    /// Creates a resolver with the default role authority and manager
    /// source precedence.
    pub fn new(store: S) -> Self {
        Self {
            store,
            authority: RoleAuthority::default(),
            manager_sources: default_manager_sources(),
            max_hierarchy_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Replaces the role authority (the configured elevated role set).
    pub fn with_authority(mut self, authority: RoleAuthority) -> Self {
        self.authority = authority;
        self
    }

    /// Replaces the ordered manager-source provider list.
    pub fn with_manager_sources(mut self, sources: Vec<Box<dyn ManagerSource>>) -> Self {
        self.manager_sources = sources;
        self
    }

    /// Replaces the hierarchy traversal depth bound.
    pub fn with_max_hierarchy_depth(mut self, max_depth: usize) -> Self {
        self.max_hierarchy_depth = max_depth;
        self
    }

    /// Computes the visible set for `actor` at the evaluation date.
    ///
    /// # Errors
    ///
    /// Fails closed: a store failure propagates as
    /// [`ResolveError::DataUnavailable`] and is never converted into a
    /// successful empty result. An unknown or inactive actor is *not* an
    /// error (empty set and actor-only set respectively).
    pub fn resolve(&self, actor: &Carnet, as_of: NaiveDate) -> Result<BTreeSet<Carnet>> {
        self.resolve_with_cancel(actor, as_of, &CancelToken::new())
    }

    /// Like [`resolve`](Self::resolve), polling `cancel` at traversal
    /// boundaries. On cancellation the call returns
    /// [`ResolveError::Cancelled`] and surfaces no partial result.
    pub fn resolve_with_cancel(
        &self,
        actor: &Carnet,
        as_of: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<BTreeSet<Carnet>> {
        let snapshot = self.store.snapshot()?;
        if cancel.is_cancelled() {
            return Err(ResolveError::Cancelled);
        }

        let Some(actor_record) = snapshot.identity(actor) else {
            debug!(actor = %actor, "actor not found in directory; visible set is empty");
            return Ok(BTreeSet::new());
        };
        if !actor_record.active {
            debug!(actor = %actor, "actor is inactive; visible set is actor-only");
            return Ok(BTreeSet::from([actor.clone()]));
        }

        let grants = GrantView::new(&snapshot);

        let mut visible: BTreeSet<Carnet> = if self.authority.has_global_visibility(actor_record) {
            debug!(actor = %actor, role = %actor_record.role, "elevated role; starting from all active identities");
            snapshot
                .identities()
                .filter(|identity| identity.active)
                .map(|identity| identity.carnet.clone())
                .collect()
        } else {
            let delegation = DelegationView::new(&snapshot);
            let mut actors = delegation.delegators_for(actor, as_of);
            actors.insert(actor.clone());

            let hierarchy =
                HierarchyIndex::build_with(&snapshot, &self.manager_sources, self.max_hierarchy_depth);

            let mut accumulated = actors.clone();
            for member in &actors {
                accumulated.extend(hierarchy.descendants(member, cancel)?);
            }
            accumulated
        };

        visible.extend(grants.allowed_targets(actor, as_of, cancel)?);

        // DENY wins over everything accumulated so far, the elevated path
        // included.
        for denied in grants.denied_targets(actor, as_of, cancel)? {
            visible.remove(&denied);
        }

        // Drop identities that are unknown or inactive, then restore the
        // actor: it is always present in its own result.
        visible.retain(|carnet| {
            snapshot
                .identity(carnet)
                .is_some_and(|identity| identity.active)
        });
        visible.insert(actor.clone());

        Ok(visible)
    }
}

// ============================================================================
// Tests
// ============================================================================
