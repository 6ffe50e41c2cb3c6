//! Generation pipeline step tables, progress events, and the result card.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::part::PartKey;

/// One simulated pipeline step: how long it takes and what to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStep {
    pub duration_ms: u64,
    pub message: String,
}

impl GenerationStep {
    pub fn new(duration_ms: u64, message: impl Into<String>) -> Self {
        Self {
            duration_ms,
            message: message.into(),
        }
    }
}

/// The built-in five-step table. Callers may substitute any non-empty
/// table; durations and copy are data, not behavior.
pub fn default_steps() -> Vec<GenerationStep> {
    vec![
        GenerationStep::new(900, "Mixing the DNA..."),
        GenerationStep::new(1100, "Fitting the parts together..."),
        GenerationStep::new(900, "Adding sparks of imagination ✨"),
        GenerationStep::new(1100, "Quasi-hyper synthesis..."),
        GenerationStep::new(1000, "Final touches..."),
    ]
}

/// Events emitted while a generation run is in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GenerationEvent {
    /// The run has begun stepping.
    Started,
    /// A step became current. `percent` is monotone non-decreasing and
    /// reaches exactly 100 on the final step.
    Progress { percent: u8, message: String },
    /// The run finished its full step sequence. Emitted exactly once;
    /// never emitted for a cancelled run.
    Completed,
}

/// The themed result card shown after a successful generation.
///
/// Content is canned: the pipeline sequences progress, it does not
/// generate imagery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HybridCard {
    pub image: String,
    pub name: String,
    pub story: String,
}

impl HybridCard {
    /// The fixed placeholder result.
    pub fn placeholder() -> Self {
        Self {
            image: "images/results/hybrid-placeholder.webp".to_string(),
            name: "The Patchwork Wanderer".to_string(),
            story: "Stitched together from borrowed shapes, it wandered out of \
                    the workshop before the glue had dried, and it has been \
                    collecting compliments ever since."
                .to_string(),
        }
    }
}

/// Write-only audit record of a submitted generation request.
///
/// Persisted when a run starts and never read back by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRecord {
    pub run_id: Uuid,
    /// The slot -> animal-index map actually submitted.
    pub assignments: BTreeMap<PartKey, usize>,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_steps_shape() {
        let steps = default_steps();
        assert_eq!(steps.len(), 5);
        assert!(steps.iter().all(|s| s.duration_ms >= 900));
        assert_eq!(steps[0].message, "Mixing the DNA...");
    }

    #[test]
    fn test_event_serde_tagging() {
        let event = GenerationEvent::Progress {
            percent: 40,
            message: "Fitting the parts together...".to_string(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "progress");
        assert_eq!(json["percent"], 40);
    }

    #[test]
    fn test_placeholder_card_is_stable() {
        assert_eq!(HybridCard::placeholder(), HybridCard::placeholder());
        assert!(!HybridCard::placeholder().story.is_empty());
    }

    #[test]
    fn test_record_round_trip() {
        let record = GenerationRecord {
            run_id: Uuid::now_v7(),
            assignments: [(PartKey::Head, 2), (PartKey::Body, 0)].into_iter().collect(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        let back: GenerationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }
}
