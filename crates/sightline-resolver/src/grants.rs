//! Permission grant store view.
//!
//! Grants come in two scopes — a single target identity, or an *area*: an
//! organizational subtree whose every member the grant covers. Area
//! expansion walks the org-unit tree iteratively with a visited set, the
//! same defensive posture the hierarchy index takes against malformed
//! parent references.
//!
//! The two access types are deliberately asymmetric in how they read the
//! grant window: an ALLOW is in force only inside `[start, end]`, while a
//! DENY stays in force once started — its end date is ignored, so an
//! expired DENY still denies. Do not unify the two predicates; the
//! asymmetry is load-bearing observed behavior.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};

use chrono::NaiveDate;
use sightline_store::DirectorySnapshot;
use sightline_types::{AccessType, Carnet, GrantScope, OrgUnitId, PermissionGrant};
use tracing::warn;

use crate::cancel::CancelToken;
use crate::error::{ResolveError, Result};

/// Read-only view over a snapshot's permission grants, with the org tree
/// indexed for area expansion.
#[derive(Debug)]
pub struct GrantView<'a> {
    snapshot: &'a DirectorySnapshot,
    unit_children: HashMap<OrgUnitId, Vec<OrgUnitId>>,
    unit_members: HashMap<OrgUnitId, Vec<Carnet>>,
}

impl<'a> GrantView<'a> {
    pub fn new(snapshot: &'a DirectorySnapshot) -> Self {
        let mut unit_children: HashMap<OrgUnitId, Vec<OrgUnitId>> = HashMap::new();
        let mut unit_members: HashMap<OrgUnitId, Vec<Carnet>> = HashMap::new();

        for unit in snapshot.org_units() {
            if let Some(parent) = unit.parent {
                unit_children.entry(parent).or_default().push(unit.id);
            }
        }
        for identity in snapshot.identities() {
            if let Some(unit) = identity.org_unit {
                unit_members.entry(unit).or_default().push(identity.carnet.clone());
            }
        }

        Self {
            snapshot,
            unit_children,
            unit_members,
        }
    }

    /// Union of individually granted ALLOW targets and all identities
    /// under ALLOW'd organizational subtrees, restricted to grants active
    /// at `as_of` (start and end both respected).
    pub fn allowed_targets(
        &self,
        recipient: &Carnet,
        as_of: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<BTreeSet<Carnet>> {
        self.targets(recipient, as_of, AccessType::Allow, cancel)
    }

    /// Same shape for DENY grants. A DENY applies irrespective of any
    /// end-date expiry: only `active` and the start bound are checked.
    pub fn denied_targets(
        &self,
        recipient: &Carnet,
        as_of: NaiveDate,
        cancel: &CancelToken,
    ) -> Result<BTreeSet<Carnet>> {
        self.targets(recipient, as_of, AccessType::Deny, cancel)
    }

    fn targets(
        &self,
        recipient: &Carnet,
        as_of: NaiveDate,
        access: AccessType,
        cancel: &CancelToken,
    ) -> Result<BTreeSet<Carnet>> {
        let mut result = BTreeSet::new();

        for grant in self.snapshot.grants() {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            if !grant.active || grant.access != access || grant.recipient != *recipient {
                continue;
            }
            if !Self::in_force(grant, as_of) {
                continue;
            }
            match &grant.scope {
                GrantScope::Individual(target) => {
                    result.insert(target.clone());
                }
                GrantScope::Area(unit) => {
                    self.collect_area_members(*unit, cancel, &mut result)?;
                }
            }
        }

        Ok(result)
    }

    /// Window predicate per access type. The DENY side ignores expiry.
    fn in_force(grant: &PermissionGrant, as_of: NaiveDate) -> bool {
        match grant.access {
            AccessType::Allow => grant.window.contains(as_of),
            AccessType::Deny => grant.window.has_started_by(as_of),
        }
    }

    /// Collects every identity assigned to `root` or any unit below it.
    ///
    /// Inactive units are not expanded and contribute no members.
    /// Iterative with a visited set; a repeated unit id means the parent
    /// references form a cycle, which is logged and skipped.
    fn collect_area_members(
        &self,
        root: OrgUnitId,
        cancel: &CancelToken,
        out: &mut BTreeSet<Carnet>,
    ) -> Result<()> {
        let mut visited: HashSet<OrgUnitId> = HashSet::new();
        let mut queue: VecDeque<OrgUnitId> = VecDeque::new();

        visited.insert(root);
        queue.push_back(root);

        while let Some(unit_id) = queue.pop_front() {
            if cancel.is_cancelled() {
                return Err(ResolveError::Cancelled);
            }
            let Some(unit) = self.snapshot.org_unit(unit_id) else {
                continue;
            };
            if !unit.active {
                continue;
            }
            if let Some(members) = self.unit_members.get(&unit_id) {
                out.extend(members.iter().cloned());
            }
            if let Some(children) = self.unit_children.get(&unit_id) {
                for child in children {
                    if !visited.insert(*child) {
                        warn!(
                            root = %root,
                            repeated = %child,
                            "cycle in org unit parent references; truncating expansion"
                        );
                        continue;
                    }
                    queue.push_back(*child);
                }
            }
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use sightline_store::SnapshotBuilder;
    use sightline_types::{ActiveWindow, Identity, OrgUnit};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn carnet(id: &str) -> Carnet {
        Carnet::new(id)
    }

    fn names(set: &BTreeSet<Carnet>) -> Vec<&str> {
        set.iter().map(Carnet::as_str).collect()
    }

    #[test]
    fn individual_allow_inside_window() {
        let window = ActiveWindow::between(date(2025, 1, 1), date(2025, 6, 30));
        let snapshot = SnapshotBuilder::new()
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Individual(carnet("T")),
                window,
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let inside = view.allowed_targets(&carnet("R"), date(2025, 3, 1), &token).unwrap();
        assert_eq!(names(&inside), vec!["T"]);
    }

    #[test]
    fn allow_respects_expiry_but_deny_does_not() {
        let window = ActiveWindow::between(date(2025, 1, 1), date(2025, 6, 30));
        let snapshot = SnapshotBuilder::new()
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Individual(carnet("T1")),
                window,
            ))
            .grant(PermissionGrant::deny(
                "R",
                GrantScope::Individual(carnet("T2")),
                window,
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();
        let after_expiry = date(2025, 7, 1);

        let allowed = view.allowed_targets(&carnet("R"), after_expiry, &token).unwrap();
        let denied = view.denied_targets(&carnet("R"), after_expiry, &token).unwrap();

        assert!(allowed.is_empty(), "expired ALLOW no longer grants");
        assert_eq!(names(&denied), vec!["T2"], "expired DENY still denies");
    }

    #[test]
    fn deny_still_respects_its_start_date() {
        let snapshot = SnapshotBuilder::new()
            .grant(PermissionGrant::deny(
                "R",
                GrantScope::Individual(carnet("T")),
                ActiveWindow::open_ended(date(2025, 5, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let before = view.denied_targets(&carnet("R"), date(2025, 4, 30), &token).unwrap();
        assert!(before.is_empty());
    }

    #[test]
    fn revoked_grants_are_ignored() {
        let snapshot = SnapshotBuilder::new()
            .grant(
                PermissionGrant::deny(
                    "R",
                    GrantScope::Individual(carnet("T")),
                    ActiveWindow::open_ended(date(2025, 1, 1)),
                )
                .revoked(),
            )
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let denied = view.denied_targets(&carnet("R"), date(2025, 3, 1), &token).unwrap();
        assert!(denied.is_empty());
    }

    #[test]
    fn grants_are_scoped_to_their_recipient() {
        let snapshot = SnapshotBuilder::new()
            .grant(PermissionGrant::allow(
                "R1",
                GrantScope::Individual(carnet("T")),
                ActiveWindow::open_ended(date(2025, 1, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let other = view.allowed_targets(&carnet("R2"), date(2025, 3, 1), &token).unwrap();
        assert!(other.is_empty());
    }

    #[test]
    fn area_grant_expands_the_whole_subtree() {
        // Unit 1 ── Unit 2 ── Unit 3; members scattered across all three.
        let snapshot = SnapshotBuilder::new()
            .org_unit(OrgUnit::root(OrgUnitId::new(1), "Engineering", "division"))
            .org_unit(OrgUnit::child_of(OrgUnitId::new(2), OrgUnitId::new(1), "Platform", "team"))
            .org_unit(OrgUnit::child_of(OrgUnitId::new(3), OrgUnitId::new(2), "Infra", "squad"))
            .identity(Identity::new("A", "Ada", "employee").with_org_unit(OrgUnitId::new(1)))
            .identity(Identity::new("B", "Bea", "employee").with_org_unit(OrgUnitId::new(2)))
            .identity(Identity::new("C", "Cid", "employee").with_org_unit(OrgUnitId::new(3)))
            .identity(Identity::new("D", "Dan", "employee"))
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Area(OrgUnitId::new(1)),
                ActiveWindow::open_ended(date(2025, 1, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let allowed = view.allowed_targets(&carnet("R"), date(2025, 3, 1), &token).unwrap();
        assert_eq!(names(&allowed), vec!["A", "B", "C"]);
    }

    #[test]
    fn area_grant_on_a_mid_tree_unit_covers_only_its_subtree() {
        let snapshot = SnapshotBuilder::new()
            .org_unit(OrgUnit::root(OrgUnitId::new(1), "Engineering", "division"))
            .org_unit(OrgUnit::child_of(OrgUnitId::new(2), OrgUnitId::new(1), "Platform", "team"))
            .identity(Identity::new("A", "Ada", "employee").with_org_unit(OrgUnitId::new(1)))
            .identity(Identity::new("B", "Bea", "employee").with_org_unit(OrgUnitId::new(2)))
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Area(OrgUnitId::new(2)),
                ActiveWindow::open_ended(date(2025, 1, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let allowed = view.allowed_targets(&carnet("R"), date(2025, 3, 1), &token).unwrap();
        assert_eq!(names(&allowed), vec!["B"]);
    }

    #[test]
    fn inactive_units_are_not_expanded() {
        let snapshot = SnapshotBuilder::new()
            .org_unit(OrgUnit::root(OrgUnitId::new(1), "Engineering", "division"))
            .org_unit(
                OrgUnit::child_of(OrgUnitId::new(2), OrgUnitId::new(1), "Sunset", "team")
                    .inactive(),
            )
            .org_unit(OrgUnit::child_of(OrgUnitId::new(3), OrgUnitId::new(2), "Orphan", "squad"))
            .identity(Identity::new("A", "Ada", "employee").with_org_unit(OrgUnitId::new(1)))
            .identity(Identity::new("B", "Bea", "employee").with_org_unit(OrgUnitId::new(2)))
            .identity(Identity::new("C", "Cid", "employee").with_org_unit(OrgUnitId::new(3)))
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Area(OrgUnitId::new(1)),
                ActiveWindow::open_ended(date(2025, 1, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let allowed = view.allowed_targets(&carnet("R"), date(2025, 3, 1), &token).unwrap();
        assert_eq!(names(&allowed), vec!["A"]);
    }

    #[test]
    fn cyclic_unit_parents_truncate_instead_of_looping() {
        // Malformed data: unit 2's child list leads back to unit 1.
        let snapshot = SnapshotBuilder::new()
            .org_unit(OrgUnit::child_of(OrgUnitId::new(1), OrgUnitId::new(2), "A", "team"))
            .org_unit(OrgUnit::child_of(OrgUnitId::new(2), OrgUnitId::new(1), "B", "team"))
            .identity(Identity::new("A", "Ada", "employee").with_org_unit(OrgUnitId::new(1)))
            .identity(Identity::new("B", "Bea", "employee").with_org_unit(OrgUnitId::new(2)))
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Area(OrgUnitId::new(1)),
                ActiveWindow::open_ended(date(2025, 1, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();

        let allowed = view.allowed_targets(&carnet("R"), date(2025, 3, 1), &token).unwrap();
        assert_eq!(names(&allowed), vec!["A", "B"]);
    }

    #[test]
    fn cancelled_expansion_fails_closed() {
        let snapshot = SnapshotBuilder::new()
            .grant(PermissionGrant::allow(
                "R",
                GrantScope::Individual(carnet("T")),
                ActiveWindow::open_ended(date(2025, 1, 1)),
            ))
            .build();
        let view = GrantView::new(&snapshot);
        let token = CancelToken::new();
        token.cancel();

        let result = view.allowed_targets(&carnet("R"), date(2025, 3, 1), &token);
        assert!(matches!(result, Err(ResolveError::Cancelled)));
    }
}
