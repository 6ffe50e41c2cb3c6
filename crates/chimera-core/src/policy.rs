//! Freemium lock policy.
//!
//! Pure derivation over the catalog's gating tables and the ledger's
//! ever-topped-up flag. Construct one at the query site; it holds no
//! mutable state of its own.

use chimera_types::catalog::Catalog;
use chimera_types::part::PartKey;

/// Eligibility predicates for parts and animals.
///
/// Once `ever_topped_up` is true both predicates are permanently false:
/// a one-way upgrade, never a downgrade (the flag itself is persisted).
#[derive(Debug, Clone, Copy)]
pub struct LockPolicy<'a> {
    catalog: &'a Catalog,
    ever_topped_up: bool,
}

impl<'a> LockPolicy<'a> {
    pub fn new(catalog: &'a Catalog, ever_topped_up: bool) -> Self {
        Self {
            catalog,
            ever_topped_up,
        }
    }

    /// Whether a part slot is locked behind the first top-up.
    pub fn is_part_locked(&self, part: PartKey) -> bool {
        !self.ever_topped_up && self.catalog.premium_parts.contains(&part)
    }

    /// Whether an animal catalog index is outside the free tier.
    pub fn is_animal_locked(&self, index: usize) -> bool {
        !self.ever_topped_up && index >= self.catalog.free_tier_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premium_parts_locked_before_top_up() {
        let catalog = Catalog::builtin();
        let policy = LockPolicy::new(&catalog, false);

        assert!(policy.is_part_locked(PartKey::Legs));
        assert!(policy.is_part_locked(PartKey::Wings));
        assert!(!policy.is_part_locked(PartKey::Head));
        assert!(!policy.is_part_locked(PartKey::Body));
    }

    #[test]
    fn test_free_tier_boundary() {
        let catalog = Catalog::builtin();
        let policy = LockPolicy::new(&catalog, false);

        assert!(!policy.is_animal_locked(0));
        assert!(!policy.is_animal_locked(2));
        assert!(policy.is_animal_locked(3));
        assert!(policy.is_animal_locked(13));
    }

    #[test]
    fn test_top_up_unlocks_everything() {
        let catalog = Catalog::builtin();
        let policy = LockPolicy::new(&catalog, true);

        for part in PartKey::ALL {
            assert!(!policy.is_part_locked(part));
        }
        for index in 0..catalog.animals.len() {
            assert!(!policy.is_animal_locked(index));
        }
        // Out-of-range indices are not the policy's concern either.
        assert!(!policy.is_animal_locked(usize::MAX));
    }
}
