//! # sightline-types: Core types for Sightline
//!
//! This crate contains shared types used across the Sightline system:
//! - Entity IDs ([`Carnet`], [`OrgUnitId`])
//! - Directory records ([`Identity`], [`OrgUnit`])
//! - Grant records ([`DelegationGrant`], [`PermissionGrant`], [`GrantScope`], [`AccessType`])
//! - Temporal types ([`ActiveWindow`])
//! - Role tags ([`RoleTag`])
//!
//! All records here are plain data: they originate from an external HR
//! synchronization (identities, org units) or from administrative actions
//! (delegations, permission grants). Interpretation — who can see whom —
//! lives in `sightline-resolver`.

use std::fmt::{self, Display};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs
// ============================================================================

/// Stable identifier for an identity across hierarchy and permission records.
///
/// The carnet is the primary key the HR synchronization uses; every manager
/// reference, delegation, and grant names identities by carnet.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Carnet(String);

impl Carnet {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the carnet as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Carnet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Carnet {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for Carnet {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Unique identifier for a node in the organizational tree.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct OrgUnitId(u64);

impl OrgUnitId {
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl Display for OrgUnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for OrgUnitId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<OrgUnitId> for u64 {
    fn from(id: OrgUnitId) -> Self {
        id.0
    }
}

// ============================================================================
// Role tags
// ============================================================================

/// A role tag as recorded by the HR synchronization.
///
/// Role strings arrive with inconsistent casing and padding (`"  Admin "`,
/// `"ADMIN"`, `"admin"` all name the same role), so every comparison goes
/// through [`RoleTag::normalized`] rather than raw string equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoleTag(String);

impl RoleTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Returns the raw tag exactly as stored.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the canonical form used for comparisons: trimmed and
    /// lowercased.
    pub fn normalized(&self) -> String {
        self.0.trim().to_lowercase()
    }
}

impl Display for RoleTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RoleTag {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

// ============================================================================
// Temporal types
// ============================================================================

/// A date window during which a grant is in force.
///
/// Both bounds are inclusive. A `None` end means the window is open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveWindow {
    pub start: NaiveDate,
    pub end: Option<NaiveDate>,
}

impl ActiveWindow {
    /// Creates a window with both bounds.
    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Creates a window with no end date.
    pub fn open_ended(start: NaiveDate) -> Self {
        Self { start, end: None }
    }

    /// Returns whether `date` falls inside `[start, end]`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.has_started_by(date) && self.end.is_none_or(|end| date <= end)
    }

    /// Returns whether the window has begun by `date`, ignoring the end
    /// bound entirely.
    ///
    /// DENY grants are evaluated with this predicate: an expired DENY still
    /// denies (see the grant store in `sightline-resolver`).
    pub fn has_started_by(&self, date: NaiveDate) -> bool {
        self.start <= date
    }
}

// ============================================================================
// Directory records
// ============================================================================

/// An identity record from the HR synchronization.
///
/// Carries two manager references: `manager` is the current field, while
/// `legacy_manager` is a remnant of an earlier schema that some records
/// still populate exclusively. Hierarchy construction resolves the pair
/// through an ordered provider list (first non-null wins) rather than
/// special-casing the two fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub carnet: Carnet,
    pub display_name: String,
    pub active: bool,
    pub role: RoleTag,
    pub manager: Option<Carnet>,
    pub legacy_manager: Option<Carnet>,
    pub org_unit: Option<OrgUnitId>,
}

impl Identity {
    /// Creates an active identity with no manager or org-unit references.
    pub fn new(carnet: impl Into<Carnet>, display_name: impl Into<String>, role: impl Into<RoleTag>) -> Self {
        Self {
            carnet: carnet.into(),
            display_name: display_name.into(),
            active: true,
            role: role.into(),
            manager: None,
            legacy_manager: None,
            org_unit: None,
        }
    }

    /// Sets the current manager reference.
    pub fn with_manager(mut self, manager: impl Into<Carnet>) -> Self {
        self.manager = Some(manager.into());
        self
    }

    /// Sets the legacy manager reference.
    pub fn with_legacy_manager(mut self, manager: impl Into<Carnet>) -> Self {
        self.legacy_manager = Some(manager.into());
        self
    }

    /// Sets the organizational unit reference.
    pub fn with_org_unit(mut self, unit: OrgUnitId) -> Self {
        self.org_unit = Some(unit);
        self
    }

    /// Marks the identity inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

/// A node in the organizational tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgUnit {
    pub id: OrgUnitId,
    pub parent: Option<OrgUnitId>,
    pub name: String,
    pub kind: String,
    pub active: bool,
}

impl OrgUnit {
    /// Creates an active root unit (no parent).
    pub fn root(id: OrgUnitId, name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            id,
            parent: None,
            name: name.into(),
            kind: kind.into(),
            active: true,
        }
    }

    /// Creates an active unit under `parent`.
    pub fn child_of(
        id: OrgUnitId,
        parent: OrgUnitId,
        name: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            id,
            parent: Some(parent),
            name: name.into(),
            kind: kind.into(),
            active: true,
        }
    }

    /// Marks the unit inactive.
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }
}

// ============================================================================
// Grant records
// ============================================================================

/// Time-bounded transfer of one identity's full visibility scope to another.
///
/// While the grant is active and the evaluation date falls inside the
/// window, the delegate inherits the delegator's entire scope, including
/// the delegator's own subordinates. Delegation is one-directional and is
/// never chained beyond one hop unless further explicit grants exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelegationGrant {
    pub delegator: Carnet,
    pub delegate: Carnet,
    pub window: ActiveWindow,
    pub active: bool,
}

impl DelegationGrant {
    pub fn new(delegator: impl Into<Carnet>, delegate: impl Into<Carnet>, window: ActiveWindow) -> Self {
        Self {
            delegator: delegator.into(),
            delegate: delegate.into(),
            window,
            active: true,
        }
    }

    /// Marks the grant revoked.
    pub fn revoked(mut self) -> Self {
        self.active = false;
        self
    }
}

/// Whether a permission grant widens or narrows visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccessType {
    Allow,
    Deny,
}

/// What a permission grant targets: one identity, or every identity under
/// an organizational subtree (an *area grant*).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrantScope {
    Individual(Carnet),
    Area(OrgUnitId),
}

/// A fine-grained ALLOW/DENY visibility grant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionGrant {
    pub recipient: Carnet,
    pub scope: GrantScope,
    pub access: AccessType,
    pub window: ActiveWindow,
    pub active: bool,
}

impl PermissionGrant {
    /// Creates an active ALLOW grant.
    pub fn allow(recipient: impl Into<Carnet>, scope: GrantScope, window: ActiveWindow) -> Self {
        Self {
            recipient: recipient.into(),
            scope,
            access: AccessType::Allow,
            window,
            active: true,
        }
    }

    /// Creates an active DENY grant.
    pub fn deny(recipient: impl Into<Carnet>, scope: GrantScope, window: ActiveWindow) -> Self {
        Self {
            recipient: recipient.into(),
            scope,
            access: AccessType::Deny,
            window,
            active: true,
        }
    }

    /// Marks the grant revoked.
    pub fn revoked(mut self) -> Self {
        self.active = false;
        self
    }
}

// ============================================================================
// Tests
// ============================================================================
