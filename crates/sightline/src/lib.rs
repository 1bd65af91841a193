//! # Sightline
//!
//! Organizational visibility and access resolution.
//!
//! Given a requesting identity, Sightline computes the authoritative set of
//! other identities the requester is permitted to see, reconciling four
//! independent sources of authority under strict precedence:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Sightline                            │
//! │  ┌───────────┐  ┌────────────┐  ┌─────────┐  ┌────────────┐ │
//! │  │ Hierarchy │  │ Delegation │  │ Grants  │  │   Role     │ │
//! │  │  (forest) │  │ (windowed) │  │(±/area) │  │ authority  │ │
//! │  └─────┬─────┘  └─────┬──────┘  └────┬────┘  └─────┬──────┘ │
//! │        └──────────────┴──── resolve ─┴──────────────┘        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **Explicit DENY always wins** — over hierarchy, delegation, ALLOW
//!   grants, and the elevated-role override.
//! - **Fail-closed** — a store failure or cancellation is an error, never
//!   an empty result.
//!
//! # Quick Start
//!
//! ```
//! use chrono::NaiveDate;
//! use sightline::{Carnet, Identity, MemoryStore, SnapshotBuilder, VisibilityResolver};
//!
//! let store = MemoryStore::new(
//!     SnapshotBuilder::new()
//!         .identity(Identity::new("A-1", "Ada", "manager"))
//!         .identity(Identity::new("B-2", "Bea", "employee").with_manager("A-1"))
//!         .build(),
//! );
//!
//! let resolver = VisibilityResolver::new(store);
//! let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
//! let visible = resolver.resolve(&Carnet::new("A-1"), as_of)?;
//! assert_eq!(visible.len(), 2);
//! # Ok::<(), sightline::ResolveError>(())
//! ```
//!
//! # Configuration
//!
//! [`resolver_from_config`] wires a resolver from a loaded
//! [`SightlineConfig`] (elevated role set, hierarchy depth bound).

use sightline_resolver::RoleAuthority;

// Core types
pub use sightline_types::{
    AccessType, ActiveWindow, Carnet, DelegationGrant, GrantScope, Identity, OrgUnit, OrgUnitId,
    PermissionGrant, RoleTag,
};

// Data boundary
pub use sightline_store::{
    DirectorySnapshot, DirectoryStore, MemoryStore, SnapshotBuilder, StoreError,
};

// Engine
pub use sightline_resolver::{
    CancelToken, HierarchyIndex, ManagerSource, ResolveError, VisibilityResolver,
};

// Configuration
pub use sightline_config::{ConfigLoader, SightlineConfig};

/// Builds a resolver over `store` with the policy knobs taken from a
/// loaded configuration.
pub fn resolver_from_config<S: DirectoryStore>(
    store: S,
    config: &SightlineConfig,
) -> VisibilityResolver<S> {
    VisibilityResolver::new(store)
        .with_authority(RoleAuthority::from_roles(&config.authority.elevated_roles))
        .with_max_hierarchy_depth(config.hierarchy.max_depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn resolver_from_config_applies_the_elevated_set() {
        let store = MemoryStore::new(
            SnapshotBuilder::new()
                .identity(Identity::new("A", "Ada", "overseer"))
                .identity(Identity::new("B", "Bea", "employee"))
                .build(),
        );

        let mut config = SightlineConfig::default();
        config.authority.elevated_roles = vec!["overseer".to_string()];

        let resolver = resolver_from_config(store, &config);
        let as_of = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let visible = resolver.resolve(&Carnet::new("A"), as_of).unwrap();

        assert_eq!(visible.len(), 2);
    }
}
