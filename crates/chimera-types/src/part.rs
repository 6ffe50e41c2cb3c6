//! Body-part slot identifiers and display metadata.

use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

/// A named body-part slot a creature is assembled from.
///
/// The set is fixed at compile time and ordered; `PartKey::ALL` preserves
/// the catalog order used for slot navigation. Serialized as lowercase
/// strings ("head", "horns", ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKey {
    Head,
    Body,
    Arms,
    Legs,
    Tail,
    Wings,
    Horn,
    Horns,
}

impl PartKey {
    /// All part slots in catalog order.
    pub const ALL: [PartKey; 8] = [
        PartKey::Head,
        PartKey::Body,
        PartKey::Arms,
        PartKey::Legs,
        PartKey::Tail,
        PartKey::Wings,
        PartKey::Horn,
        PartKey::Horns,
    ];

    /// Lowercase wire name for this slot.
    pub fn as_str(self) -> &'static str {
        match self {
            PartKey::Head => "head",
            PartKey::Body => "body",
            PartKey::Arms => "arms",
            PartKey::Legs => "legs",
            PartKey::Tail => "tail",
            PartKey::Wings => "wings",
            PartKey::Horn => "horn",
            PartKey::Horns => "horns",
        }
    }
}

impl fmt::Display for PartKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for parsing an unknown part name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown part key: '{0}'")]
pub struct UnknownPartKey(pub String);

impl FromStr for PartKey {
    type Err = UnknownPartKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PartKey::ALL
            .iter()
            .copied()
            .find(|p| p.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownPartKey(s.to_string()))
    }
}

/// Display metadata for a part slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartDef {
    pub key: PartKey,
    /// Human-readable name ("Head", "Wings").
    pub name: String,
    /// Path to the representative slot illustration.
    pub image: String,
}
