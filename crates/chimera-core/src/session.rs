//! The part/animal assignment store.
//!
//! `BuilderStore` is the central state machine: a total mapping from every
//! part slot to an animal catalog index, plus the active-slot cursor. Every
//! mutation persists the full session through the gateway, and a
//! consistency repair keeps the invariant "the active slot's assigned
//! animal supports that slot" true after every transition, even when the
//! persisted snapshot was tampered with.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use rand::Rng;
use tracing::debug;

use chimera_types::catalog::Catalog;
use chimera_types::part::PartKey;
use chimera_types::snapshot::BuilderSnapshot;

use crate::policy::LockPolicy;
use crate::storage::{KvStore, PersistenceGateway};

/// The live, mutable builder aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuilderSession {
    /// Total mapping: every catalog part has an assigned animal index.
    pub assignments: BTreeMap<PartKey, usize>,
    /// Position of the active part in the catalog's ordered part list.
    pub active_idx: usize,
}

impl BuilderSession {
    /// Assigned animal index for a part (0 when the part is unknown, which
    /// cannot happen for a session built from a catalog).
    pub fn assigned_index(&self, part: PartKey) -> usize {
        self.assignments.get(&part).copied().unwrap_or(0)
    }
}

/// State machine over [`BuilderSession`], wired to a catalog and the
/// persistence gateway.
pub struct BuilderStore<S: KvStore> {
    catalog: Arc<Catalog>,
    gateway: Arc<PersistenceGateway<S>>,
    session: BuilderSession,
}

impl<S: KvStore> BuilderStore<S> {
    /// Restore a persisted session or initialize a fresh randomized one.
    ///
    /// Snapshot present: each part reads its persisted index, substituting
    /// a uniform random index for missing entries and wrapping everything
    /// into catalog range; the active part is restored by name when it
    /// matches a known slot. Snapshot absent: each part picks uniformly
    /// from the free-tier subset of its supporting animals, falling back to
    /// all supporting animals, then to the whole catalog; the fresh session
    /// persists immediately.
    ///
    /// The second return value is whether the first-run tutorial should be
    /// shown.
    pub async fn load_or_init(
        catalog: Arc<Catalog>,
        gateway: Arc<PersistenceGateway<S>>,
        ever_topped_up: bool,
        rng: &mut impl Rng,
    ) -> (Self, bool) {
        let snapshot = gateway.load_snapshot().await;
        let mut store = match snapshot {
            Some(snapshot) => {
                let session = Self::session_from_snapshot(&catalog, &snapshot, rng);
                debug!(active_idx = session.active_idx, "restored persisted session");
                Self {
                    catalog,
                    gateway,
                    session,
                }
            }
            None => {
                let session = BuilderSession {
                    assignments: randomized_assignments(&catalog, ever_topped_up, rng),
                    active_idx: 0,
                };
                debug!("no persisted session, randomized a fresh one");
                let store = Self {
                    catalog,
                    gateway,
                    session,
                };
                store.persist().await;
                store
            }
        };

        store.repair_active();
        let show_tutorial = !store.gateway.tutorial_seen().await;
        (store, show_tutorial)
    }

    fn session_from_snapshot(
        catalog: &Catalog,
        snapshot: &BuilderSnapshot,
        rng: &mut impl Rng,
    ) -> BuilderSession {
        let animal_count = catalog.animals.len().max(1);
        let assignments = catalog
            .parts
            .iter()
            .map(|part| {
                let raw = snapshot
                    .assignments
                    .get(part.key.as_str())
                    .copied()
                    .unwrap_or_else(|| rng.gen_range(0..animal_count) as i64);
                (part.key, catalog.normalize_index(raw))
            })
            .collect();

        let active_idx = snapshot
            .active_part
            .as_deref()
            .and_then(|name| name.parse::<PartKey>().ok())
            .and_then(|key| catalog.part_position(key))
            .unwrap_or(0);

        BuilderSession {
            assignments,
            active_idx,
        }
    }

    /// The current session state.
    pub fn session(&self) -> &BuilderSession {
        &self.session
    }

    /// The active part slot.
    pub fn active_part(&self) -> PartKey {
        self.catalog.parts[self.session.active_idx].key
    }

    /// The catalog index assigned to the active part.
    pub fn active_animal_index(&self) -> usize {
        self.session.assigned_index(self.active_part())
    }

    /// Support-filtered catalog indices for the active part: the cycling
    /// scope and the candidate thumbnails.
    pub fn animals_for_active_part(&self) -> Vec<usize> {
        self.catalog.supported_indices(self.active_part())
    }

    /// Whether the active pairing is gated: locked slot or locked animal.
    pub fn is_active_selection_locked(&self, policy: &LockPolicy<'_>) -> bool {
        policy.is_part_locked(self.active_part())
            || policy.is_animal_locked(self.active_animal_index())
    }

    /// Make a slot the active one. Unknown slots are ignored.
    pub async fn select_part(&mut self, part: PartKey) {
        let Some(position) = self.catalog.part_position(part) else {
            return;
        };
        self.session.active_idx = position;
        self.repair_active();
        self.persist().await;
    }

    /// Advance the active slot cursor by one, wrapping.
    pub async fn next_part(&mut self) {
        self.cycle_part(1).await;
    }

    /// Move the active slot cursor back by one, wrapping.
    pub async fn prev_part(&mut self) {
        self.cycle_part(-1).await;
    }

    async fn cycle_part(&mut self, delta: i64) {
        let len = self.catalog.parts.len() as i64;
        let idx = self.session.active_idx as i64;
        self.session.active_idx = ((((idx + delta) % len) + len) % len) as usize;
        self.repair_active();
        self.persist().await;
    }

    /// Assign an animal to the active slot by raw catalog index.
    ///
    /// Out-of-range input wraps; it is never an error.
    pub async fn select_animal(&mut self, index: i64) {
        let normalized = self.catalog.normalize_index(index);
        let part = self.active_part();
        self.session.assignments.insert(part, normalized);
        self.persist().await;
    }

    /// Advance the active slot's animal by one within the support-filtered
    /// list (not the raw catalog).
    pub async fn next_animal(&mut self) {
        self.cycle_animal(1).await;
    }

    /// Move the active slot's animal back by one within the
    /// support-filtered list.
    pub async fn prev_animal(&mut self) {
        self.cycle_animal(-1).await;
    }

    async fn cycle_animal(&mut self, delta: i64) {
        let part = self.active_part();
        let filtered = self.catalog.supported_indices(part);
        if filtered.is_empty() {
            return;
        }
        let current = self.session.assigned_index(part);
        let position = filtered.iter().position(|&i| i == current).unwrap_or(0) as i64;
        let len = filtered.len() as i64;
        let next = (((position + delta) % len) + len) % len;
        self.session.assignments.insert(part, filtered[next as usize]);
        self.persist().await;
    }

    /// Clear persisted state and rebuild a fresh randomized session (the
    /// explicit exit/reset action).
    pub async fn reset(&mut self, ever_topped_up: bool, rng: &mut impl Rng) {
        self.gateway.clear_snapshot().await;
        self.session = BuilderSession {
            assignments: randomized_assignments(&self.catalog, ever_topped_up, rng),
            active_idx: 0,
        };
        self.repair_active();
        self.persist().await;
    }

    /// Repair the active pairing when the assigned animal does not support
    /// the active slot: replace with the first supporting catalog entry
    /// (index 0 when nothing supports the slot, a catalog configuration
    /// error that well-formed catalogs never hit).
    fn repair_active(&mut self) {
        let part = self.active_part();
        let index = self.session.assigned_index(part);
        let supported = self
            .catalog
            .animals
            .get(index)
            .is_some_and(|animal| animal.supports(part));
        if !supported {
            let replacement = self
                .catalog
                .supported_indices(part)
                .first()
                .copied()
                .unwrap_or(0);
            debug!(%part, from = index, to = replacement, "repaired unsupported pairing");
            self.session.assignments.insert(part, replacement);
        }
    }

    async fn persist(&self) {
        let snapshot = BuilderSnapshot {
            assignments: self
                .session
                .assignments
                .iter()
                .map(|(part, index)| (part.as_str().to_string(), *index as i64))
                .collect(),
            active_part: Some(self.active_part().as_str().to_string()),
            updated_at: Utc::now(),
        };
        self.gateway.save_snapshot(&snapshot).await;
    }
}

fn randomized_assignments(
    catalog: &Catalog,
    ever_topped_up: bool,
    rng: &mut impl Rng,
) -> BTreeMap<PartKey, usize> {
    let animal_count = catalog.animals.len();
    let unlocked_cap = if ever_topped_up {
        animal_count
    } else {
        catalog.free_tier_count
    };

    catalog
        .parts
        .iter()
        .map(|part| {
            let supported = catalog.supported_indices(part.key);
            let free: Vec<usize> = supported
                .iter()
                .copied()
                .filter(|&i| i < unlocked_cap)
                .collect();
            let pool = if !free.is_empty() {
                free
            } else if !supported.is_empty() {
                supported
            } else {
                (0..animal_count).collect()
            };
            let pick = if pool.is_empty() {
                0
            } else {
                pool[rng.gen_range(0..pool.len())]
            };
            (part.key, pick)
        })
        .collect()
}
