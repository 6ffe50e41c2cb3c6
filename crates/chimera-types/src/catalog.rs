//! Animal catalog and freemium gating tables.
//!
//! The catalog is immutable after construction. Animal identity is the
//! position in `animals`; catalog order matters because the leading
//! `free_tier_count` indices are usable before any credit top-up.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::part::{PartDef, PartKey};

/// One animal "skin" usable for the slots in its support set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimalVariant {
    /// Display label ("Bunny", "Giraffe").
    pub label: String,
    /// Path to the animal illustration.
    pub image: String,
    /// The slots this variant can legally occupy.
    pub supports: BTreeSet<PartKey>,
}

impl AnimalVariant {
    /// Whether this variant can occupy the given slot.
    pub fn supports(&self, part: PartKey) -> bool {
        self.supports.contains(&part)
    }
}

/// The immutable part/animal catalog plus gating tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    /// Ordered slot definitions.
    pub parts: Vec<PartDef>,
    /// Ordered animal variants; index is identity.
    pub animals: Vec<AnimalVariant>,
    /// Leading animal indices usable before the first top-up.
    pub free_tier_count: usize,
    /// Slots locked before the first top-up.
    pub premium_parts: BTreeSet<PartKey>,
}

/// Slots every base animal supports.
const BASE_PARTS: [PartKey; 5] = [
    PartKey::Head,
    PartKey::Body,
    PartKey::Arms,
    PartKey::Legs,
    PartKey::Tail,
];

fn supports(extra: &[PartKey]) -> BTreeSet<PartKey> {
    BASE_PARTS.iter().chain(extra).copied().collect()
}

fn animal(label: &str, file: &str, extra: &[PartKey]) -> AnimalVariant {
    AnimalVariant {
        label: label.to_string(),
        image: format!("images/animals/base/{file}"),
        supports: supports(extra),
    }
}

fn part(key: PartKey, name: &str, file: &str) -> PartDef {
    PartDef {
        key,
        name: name.to_string(),
        image: format!("images/bodyparts/{file}"),
    }
}

impl Catalog {
    /// The built-in catalog: 8 slots, 14 animals, free tier of 3,
    /// everything past the base five slots premium.
    pub fn builtin() -> Self {
        use PartKey::{Horn, Horns, Wings};

        let parts = vec![
            part(PartKey::Head, "Head", "face.webp"),
            part(PartKey::Body, "Body", "body.webp"),
            part(PartKey::Arms, "Arms", "hands.webp"),
            part(PartKey::Legs, "Legs", "legs.webp"),
            part(PartKey::Tail, "Tail", "tail.webp"),
            part(PartKey::Wings, "Wings", "wings.webp"),
            part(PartKey::Horn, "Horn", "horn.webp"),
            part(PartKey::Horns, "Horns", "horns.webp"),
        ];

        let animals = vec![
            animal("Bunny", "bunny.jpg", &[]),
            animal("Cat", "cat.jpg", &[]),
            animal("Giraffe", "giraffe.jpg", &[Horn, Horns]),
            animal("Dog", "dog.jpg", &[]),
            animal("Fox", "fox.jpg", &[]),
            animal("Hippo", "hippo.jpg", &[]),
            animal("Monkey", "monkey.jpg", &[]),
            animal("Camel", "camel.jpg", &[]),
            animal("Deer", "deer.jpg", &[Horn, Horns]),
            animal("Duck", "duck.jpg", &[Wings]),
            animal("Eagle", "eagle.jpg", &[Wings]),
            animal("Elephant", "elephant.jpg", &[]),
            animal("Ostrich", "ostrich.jpg", &[Wings]),
            animal("Parrot", "parrot.jpg", &[Wings]),
        ];

        Self {
            parts,
            animals,
            free_tier_count: 3,
            premium_parts: [PartKey::Legs, PartKey::Tail, Wings, Horn, Horns]
                .into_iter()
                .collect(),
        }
    }

    /// Wrap an arbitrary signed index into `[0, animals.len())`.
    ///
    /// Negative-safe modulo: the result is congruent to `index` mod the
    /// catalog size. Returns 0 for an empty catalog.
    pub fn normalize_index(&self, index: i64) -> usize {
        let n = self.animals.len() as i64;
        if n == 0 {
            return 0;
        }
        (((index % n) + n) % n) as usize
    }

    /// Ordered catalog indices of animals whose support set contains `part`.
    pub fn supported_indices(&self, part: PartKey) -> Vec<usize> {
        self.animals
            .iter()
            .enumerate()
            .filter(|(_, a)| a.supports(part))
            .map(|(i, _)| i)
            .collect()
    }

    /// Position of a part key in the ordered slot list, if present.
    pub fn part_position(&self, key: PartKey) -> Option<usize> {
        self.parts.iter().position(|p| p.key == key)
    }
}
