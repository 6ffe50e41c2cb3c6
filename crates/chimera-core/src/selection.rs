//! Generation selection: which slots go into a paid request.
//!
//! Scoped to one generate-confirmation interaction and rebuilt every time
//! the confirmation opens. The final selection re-applies the lock filter
//! independently of toggle state, so a stale selection can never leak a
//! locked pairing into a paid request.

use std::collections::BTreeMap;

use chimera_types::catalog::Catalog;
use chimera_types::part::PartKey;

use crate::policy::LockPolicy;
use crate::session::BuilderSession;

/// Hard floor: a generation request covers at least this many slots.
pub const MIN_SELECTED: usize = 2;

/// Per-slot inclusion state for one generation request.
#[derive(Debug, Clone)]
pub struct SelectionController {
    included: BTreeMap<PartKey, bool>,
    eligible: BTreeMap<PartKey, bool>,
}

impl SelectionController {
    /// Build the default selection: every currently eligible slot starts
    /// included, ineligible slots start excluded and stay untoggleable.
    pub fn init(catalog: &Catalog, session: &BuilderSession, policy: &LockPolicy<'_>) -> Self {
        let mut included = BTreeMap::new();
        let mut eligible = BTreeMap::new();
        for part in &catalog.parts {
            let ok = !policy.is_part_locked(part.key)
                && !policy.is_animal_locked(session.assigned_index(part.key));
            included.insert(part.key, ok);
            eligible.insert(part.key, ok);
        }
        Self { included, eligible }
    }

    /// Whether a slot is currently marked for inclusion.
    pub fn is_included(&self, part: PartKey) -> bool {
        self.included.get(&part).copied().unwrap_or(false)
    }

    /// Number of slots currently marked for inclusion.
    pub fn selected_count(&self) -> usize {
        self.included.values().filter(|&&on| on).count()
    }

    /// Flip a slot's inclusion. Returns whether anything changed.
    ///
    /// Rejected when it would drop the selected count to or below
    /// `min_selected`, and when toggling an ineligible slot on.
    pub fn toggle(&mut self, part: PartKey, min_selected: usize) -> bool {
        let currently_on = self.is_included(part);
        if currently_on {
            if self.selected_count() <= min_selected {
                return false;
            }
            self.included.insert(part, false);
            true
        } else {
            if !self.eligible.get(&part).copied().unwrap_or(false) {
                return false;
            }
            self.included.insert(part, true);
            true
        }
    }

    /// Whether a slot's row is disabled in the confirmation view: locked
    /// slot or locked assigned animal.
    pub fn is_row_disabled(
        part: PartKey,
        session: &BuilderSession,
        policy: &LockPolicy<'_>,
    ) -> bool {
        policy.is_part_locked(part) || policy.is_animal_locked(session.assigned_index(part))
    }

    /// The slot -> animal-index map actually submitted: included AND slot
    /// unlocked AND assigned animal unlocked. The lock filter runs again
    /// here regardless of what the toggles allowed.
    pub fn build_final(
        &self,
        catalog: &Catalog,
        session: &BuilderSession,
        policy: &LockPolicy<'_>,
    ) -> BTreeMap<PartKey, usize> {
        catalog
            .parts
            .iter()
            .filter(|part| self.is_included(part.key))
            .filter(|part| !policy.is_part_locked(part.key))
            .filter_map(|part| {
                let index = session.assigned_index(part.key);
                (!policy.is_animal_locked(index)).then_some((part.key, index))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Session with every part assigned a free-tier animal.
    fn base_session() -> BuilderSession {
        let catalog = Catalog::builtin();
        BuilderSession {
            assignments: catalog.parts.iter().map(|p| (p.key, 0)).collect(),
            active_idx: 0,
        }
    }

    #[test]
    fn test_init_defaults_follow_eligibility() {
        let catalog = Catalog::builtin();
        let session = base_session();
        let policy = LockPolicy::new(&catalog, false);
        let selection = SelectionController::init(&catalog, &session, &policy);

        // Free slots with free-tier animals start included.
        assert!(selection.is_included(PartKey::Head));
        assert!(selection.is_included(PartKey::Body));
        assert!(selection.is_included(PartKey::Arms));
        // Premium slots start excluded.
        assert!(!selection.is_included(PartKey::Legs));
        assert!(!selection.is_included(PartKey::Wings));
        assert_eq!(selection.selected_count(), 3);
    }

    #[test]
    fn test_init_after_top_up_includes_everything() {
        let catalog = Catalog::builtin();
        let session = base_session();
        let policy = LockPolicy::new(&catalog, true);
        let selection = SelectionController::init(&catalog, &session, &policy);
        assert_eq!(selection.selected_count(), catalog.parts.len());
    }

    #[test]
    fn test_locked_animal_makes_slot_ineligible() {
        let catalog = Catalog::builtin();
        let mut session = base_session();
        // Head assigned a premium animal (index >= 3).
        session.assignments.insert(PartKey::Head, 5);
        let policy = LockPolicy::new(&catalog, false);
        let selection = SelectionController::init(&catalog, &session, &policy);
        assert!(!selection.is_included(PartKey::Head));
    }

    #[test]
    fn test_toggle_enforces_floor_of_two() {
        let catalog = Catalog::builtin();
        let session = base_session();
        let policy = LockPolicy::new(&catalog, false);
        let mut selection = SelectionController::init(&catalog, &session, &policy);
        assert_eq!(selection.selected_count(), 3);

        assert!(selection.toggle(PartKey::Head, MIN_SELECTED));
        assert_eq!(selection.selected_count(), 2);

        // From exactly 2 selected, neither remaining slot can turn off.
        assert!(!selection.toggle(PartKey::Body, MIN_SELECTED));
        assert!(!selection.toggle(PartKey::Arms, MIN_SELECTED));
        assert_eq!(selection.selected_count(), 2);
        assert!(selection.is_included(PartKey::Body));
        assert!(selection.is_included(PartKey::Arms));
    }

    #[test]
    fn test_toggle_back_on_allowed_for_eligible() {
        let catalog = Catalog::builtin();
        let session = base_session();
        let policy = LockPolicy::new(&catalog, false);
        let mut selection = SelectionController::init(&catalog, &session, &policy);

        assert!(selection.toggle(PartKey::Head, MIN_SELECTED));
        assert!(selection.toggle(PartKey::Head, MIN_SELECTED));
        assert!(selection.is_included(PartKey::Head));
    }

    #[test]
    fn test_ineligible_slot_cannot_be_toggled_on() {
        let catalog = Catalog::builtin();
        let session = base_session();
        let policy = LockPolicy::new(&catalog, false);
        let mut selection = SelectionController::init(&catalog, &session, &policy);

        assert!(!selection.toggle(PartKey::Wings, MIN_SELECTED));
        assert!(!selection.is_included(PartKey::Wings));
    }

    #[test]
    fn test_build_final_filters_locked_regardless_of_toggles() {
        let catalog = Catalog::builtin();
        let session = base_session();
        let policy = LockPolicy::new(&catalog, false);
        let mut selection = SelectionController::init(&catalog, &session, &policy);

        // Force a premium slot on by direct state manipulation, simulating
        // a stale or tampered selection.
        selection.included.insert(PartKey::Legs, true);

        let final_map = selection.build_final(&catalog, &session, &policy);
        assert!(!final_map.contains_key(&PartKey::Legs));
        assert_eq!(
            final_map.keys().copied().collect::<Vec<_>>(),
            vec![PartKey::Head, PartKey::Body, PartKey::Arms]
        );
    }

    #[test]
    fn test_build_final_filters_locked_animal() {
        let catalog = Catalog::builtin();
        let mut session = base_session();
        session.assignments.insert(PartKey::Body, 13);
        let policy = LockPolicy::new(&catalog, false);
        let mut selection = SelectionController::init(&catalog, &session, &policy);
        selection.included.insert(PartKey::Body, true);

        let final_map = selection.build_final(&catalog, &session, &policy);
        assert!(!final_map.contains_key(&PartKey::Body));
    }

    #[test]
    fn test_is_row_disabled() {
        let catalog = Catalog::builtin();
        let mut session = base_session();
        session.assignments.insert(PartKey::Body, 10);
        let policy = LockPolicy::new(&catalog, false);

        assert!(!SelectionController::is_row_disabled(
            PartKey::Head,
            &session,
            &policy
        ));
        // Premium slot.
        assert!(SelectionController::is_row_disabled(
            PartKey::Tail,
            &session,
            &policy
        ));
        // Free slot, premium animal.
        assert!(SelectionController::is_row_disabled(
            PartKey::Body,
            &session,
            &policy
        ));
    }
}
