//! Persisted builder session snapshot.
//!
//! The snapshot is written after every assignment mutation and read once at
//! session start. Persisted data is untrusted: decoding is a total function
//! from an arbitrary JSON value to `Option<BuilderSnapshot>`, and all
//! tolerance of malformed data lives here rather than in the store.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted builder state: slot-name -> animal-index map plus the active
/// slot and a save timestamp.
///
/// Index values are kept as raw `i64` here; range normalization and
/// support repair happen when the session is rebuilt, not at decode time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuilderSnapshot {
    /// Slot name -> assigned animal catalog index.
    pub assignments: BTreeMap<String, i64>,
    /// Name of the slot that was active when the snapshot was saved.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_part: Option<String>,
    /// When the snapshot was written.
    pub updated_at: DateTime<Utc>,
}

impl BuilderSnapshot {
    /// Decode an untrusted persisted blob.
    ///
    /// Returns `None` for anything that is not an object with a usable
    /// `assignments` map: missing record, wrong shape, non-object
    /// assignments. Individual non-numeric index entries are dropped (the
    /// session loader substitutes randomized indices for missing slots).
    /// Never errors.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        let obj = value.as_object()?;
        let raw_assignments = obj.get("assignments")?.as_object()?;

        let assignments: BTreeMap<String, i64> = raw_assignments
            .iter()
            .filter_map(|(k, v)| v.as_i64().map(|n| (k.clone(), n)))
            .collect();

        let active_part = obj
            .get("active_part")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let updated_at = obj
            .get("updated_at")
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or_else(Utc::now);

        Some(Self {
            assignments,
            active_part,
            updated_at,
        })
    }
}
