//! # sightline-store: The data boundary
//!
//! The resolver never talks to a database directly; it asks a
//! [`DirectoryStore`] for a [`DirectorySnapshot`] and computes over that.
//! A snapshot is an immutable point-in-time view of the whole directory:
//! identities, org units, delegation grants, and permission grants.
//!
//! Two properties of this boundary carry the concurrency contract:
//!
//! - **Read-committed isolation.** [`MemoryStore`] hands out `Arc` clones
//!   of the current snapshot. A resolver call sees the directory entirely
//!   before or entirely after an administrative edit, never halfway.
//! - **Transactional mutation.** [`MemoryStore::commit`] builds a fresh
//!   snapshot and swaps it in atomically, so a multi-record edit is a
//!   single visible event. Admins observe their own writes on the next
//!   `snapshot()` call — there is no cache in between.
//!
//! Failure is always explicit: a store that cannot serve a snapshot
//! returns [`StoreError`], never an empty view. Callers are expected to
//! fail closed on it.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use sightline_types::{Carnet, DelegationGrant, Identity, OrgUnit, OrgUnitId, PermissionGrant};
use thiserror::Error;
use tracing::debug;

// ============================================================================
// Errors
// ============================================================================

/// Errors surfaced by the data boundary.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store could not be reached or served no consistent view.
    #[error("directory store unavailable: {0}")]
    Unavailable(String),

    /// The backing store did not answer within the caller's deadline.
    #[error("directory store timed out: {0}")]
    Timeout(String),
}

// ============================================================================
// Snapshot
// ============================================================================

/// An immutable point-in-time view of the directory.
///
/// Identities and org units are indexed by their keys; grants are kept as
/// flat slices since every consumer filters them by recipient anyway.
/// Iteration order over the indexed maps is the key order, which keeps
/// everything built from a snapshot deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    identities: BTreeMap<Carnet, Identity>,
    org_units: BTreeMap<OrgUnitId, OrgUnit>,
    delegations: Vec<DelegationGrant>,
    grants: Vec<PermissionGrant>,
}

impl DirectorySnapshot {
    /// Returns the identity with the given carnet, if present.
    pub fn identity(&self, carnet: &Carnet) -> Option<&Identity> {
        self.identities.get(carnet)
    }

    /// Iterates over all identities in carnet order.
    pub fn identities(&self) -> impl Iterator<Item = &Identity> {
        self.identities.values()
    }

    /// Returns the org unit with the given id, if present.
    pub fn org_unit(&self, id: OrgUnitId) -> Option<&OrgUnit> {
        self.org_units.get(&id)
    }

    /// Iterates over all org units in id order.
    pub fn org_units(&self) -> impl Iterator<Item = &OrgUnit> {
        self.org_units.values()
    }

    /// All delegation grants, revoked ones included.
    pub fn delegations(&self) -> &[DelegationGrant] {
        &self.delegations
    }

    /// All permission grants, revoked ones included.
    pub fn grants(&self) -> &[PermissionGrant] {
        &self.grants
    }

    /// Number of identity records in the snapshot.
    pub fn identity_count(&self) -> usize {
        self.identities.len()
    }

    /// Starts a builder seeded with this snapshot's contents, for
    /// copy-on-write edits inside [`MemoryStore::commit`].
    pub fn to_builder(&self) -> SnapshotBuilder {
        SnapshotBuilder {
            identities: self.identities.clone(),
            org_units: self.org_units.clone(),
            delegations: self.delegations.clone(),
            grants: self.grants.clone(),
        }
    }
}

/// Builder for [`DirectorySnapshot`].
///
/// Inserting an identity or org unit with an existing key replaces the
/// previous record, mirroring how the HR synchronization upserts rows.
#[derive(Debug, Clone, Default)]
pub struct SnapshotBuilder {
    identities: BTreeMap<Carnet, Identity>,
    org_units: BTreeMap<OrgUnitId, OrgUnit>,
    delegations: Vec<DelegationGrant>,
    grants: Vec<PermissionGrant>,
}

impl SnapshotBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity(mut self, identity: Identity) -> Self {
        self.identities.insert(identity.carnet.clone(), identity);
        self
    }

    pub fn org_unit(mut self, unit: OrgUnit) -> Self {
        self.org_units.insert(unit.id, unit);
        self
    }

    pub fn delegation(mut self, grant: DelegationGrant) -> Self {
        self.delegations.push(grant);
        self
    }

    pub fn grant(mut self, grant: PermissionGrant) -> Self {
        self.grants.push(grant);
        self
    }

    pub fn build(self) -> DirectorySnapshot {
        DirectorySnapshot {
            identities: self.identities,
            org_units: self.org_units,
            delegations: self.delegations,
            grants: self.grants,
        }
    }
}

// ============================================================================
// Store trait
// ============================================================================

/// Source of directory snapshots.
///
/// This is the engine's only suspension and failure point: everything after
/// `snapshot()` is pure computation over immutable data.
pub trait DirectoryStore {
    /// Returns the current point-in-time view of the directory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when no consistent view can be served. The
    /// contract is fail-closed: implementations must never substitute an
    /// empty snapshot for a failure.
    fn snapshot(&self) -> Result<Arc<DirectorySnapshot>, StoreError>;
}

impl<S: DirectoryStore + ?Sized> DirectoryStore for Arc<S> {
    fn snapshot(&self) -> Result<Arc<DirectorySnapshot>, StoreError> {
        (**self).snapshot()
    }
}

// ============================================================================
// In-memory store
// ============================================================================

/// In-memory [`DirectoryStore`] with atomic snapshot replacement.
///
/// Readers clone the current `Arc` under a read lock; writers build the
/// next snapshot outside the critical section's visibility and swap it in
/// under the write lock. A poisoned lock maps to
/// [`StoreError::Unavailable`] — a store that panicked mid-write has no
/// consistent view to offer.
#[derive(Debug)]
pub struct MemoryStore {
    current: RwLock<Arc<DirectorySnapshot>>,
}

impl MemoryStore {
    /// Creates a store serving the given snapshot.
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Creates an empty store.
    pub fn empty() -> Self {
        Self::new(DirectorySnapshot::default())
    }

    /// Applies an administrative edit transactionally.
    ///
    /// The closure receives a builder seeded with the current contents and
    /// returns the edited builder; the resulting snapshot replaces the
    /// current one in a single swap. Concurrent readers keep whatever
    /// snapshot they already hold.
    pub fn commit<F>(&self, edit: F) -> Result<(), StoreError>
    where
        F: FnOnce(SnapshotBuilder) -> SnapshotBuilder,
    {
        let mut guard = self
            .current
            .write()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))?;
        let next = edit(guard.to_builder()).build();
        debug!(identities = next.identity_count(), "directory snapshot replaced");
        *guard = Arc::new(next);
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::empty()
    }
}

impl DirectoryStore for MemoryStore {
    fn snapshot(&self) -> Result<Arc<DirectorySnapshot>, StoreError> {
        let guard = self
            .current
            .read()
            .map_err(|_| StoreError::Unavailable("snapshot lock poisoned".to_string()))?;
        Ok(Arc::clone(&guard))
    }
}

// ============================================================================
// Tests
// ============================================================================
