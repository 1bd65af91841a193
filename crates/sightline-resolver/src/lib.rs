//! # sightline-resolver: Organizational visibility resolution
//!
//! Given a requesting identity (the *actor*), compute the authoritative set
//! of identities the actor is permitted to see. Four independent sources of
//! authority are reconciled under a strict precedence rule:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  resolve(actor, as_of)                                   │
//! └───────────────┬──────────────────────────────────────────┘
//!                 │
//!                 ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  VisibilityResolver                                      │
//! │  ├─ RoleAuthority      (elevated role ⇒ all active)      │
//! │  ├─ DelegationView     (time-bounded scope transfer)     │
//! │  ├─ HierarchyIndex     (manager/subordinate forest)      │
//! │  └─ GrantView          (ALLOW ∪ … ∖ DENY)                │
//! └───────────────┬──────────────────────────────────────────┘
//!                 │
//!                 ▼
//!           BTreeSet<Carnet>   (the visible set)
//! ```
//!
//! ## Precedence
//!
//! An explicit DENY always wins: over hierarchy-derived visibility, over
//! delegation, over ALLOW grants, and over the elevated-role override.
//! The actor itself is the one exception — it is always present in its own
//! result.
//!
//! ## Failure policy
//!
//! The engine fails closed. A store failure or a caller cancellation
//! surfaces as [`ResolveError`]; a partial or empty-but-successful result
//! is never returned in their place, since that would be indistinguishable
//! from "legitimately no access".
//!
//! ## Example
//!
//! ```
//! use chrono::NaiveDate;
//! use sightline_resolver::VisibilityResolver;
//! use sightline_store::{MemoryStore, SnapshotBuilder};
//! use sightline_types::{Carnet, Identity};
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
//!
//! assert!(visible.contains(&Carnet::new("A-1")));
//! assert!(visible.contains(&Carnet::new("B-2")));
//! # Ok::<(), sightline_resolver::ResolveError>(())
//! ```

pub mod authority;
pub mod cancel;
pub mod delegation;
pub mod error;
pub mod grants;
pub mod hierarchy;
pub mod resolver;

pub use authority::RoleAuthority;
pub use cancel::CancelToken;
pub use delegation::DelegationView;
pub use error::{ResolveError, Result};
pub use grants::GrantView;
pub use hierarchy::{
    HierarchyIndex, LegacyManagerField, ManagerSource, PrimaryManagerField,
    default_manager_sources,
};
pub use resolver::VisibilityResolver;
