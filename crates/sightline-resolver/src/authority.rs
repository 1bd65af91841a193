//! Role authority: elevated roles confer global visibility.
//!
//! Role tags arrive from the HR synchronization with inconsistent casing
//! and padding, so membership in the elevated set is decided on the
//! normalized form (trimmed, lowercased). `"  Admin "` and `"admin"` are
//! the same role.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use sightline_types::Identity;

/// Elevated roles configured when nothing else is.
pub const DEFAULT_ELEVATED_ROLES: &[&str] = &["admin", "director"];

/// Decides whether an identity's role confers global visibility.
///
/// When it does, the resolver short-circuits to "all active identities"
/// (DENY grants still subtract afterwards).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleAuthority {
    elevated: BTreeSet<String>,
}

impl RoleAuthority {
    /// Creates an authority from the configured elevated role tags.
    /// Tags are normalized on the way in.
    pub fn from_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            elevated: roles
                .into_iter()
                .map(|role| role.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// Returns true iff the identity is active and its normalized role tag
    /// is in the elevated set.
    pub fn has_global_visibility(&self, identity: &Identity) -> bool {
        identity.active && self.elevated.contains(&identity.role.normalized())
    }

    /// The normalized elevated set, for diagnostics.
    pub fn elevated_roles(&self) -> impl Iterator<Item = &str> {
        self.elevated.iter().map(String::as_str)
    }
}

impl Default for RoleAuthority {
    fn default() -> Self {
        Self::from_roles(DEFAULT_ELEVATED_ROLES.iter().copied())
    }
}
