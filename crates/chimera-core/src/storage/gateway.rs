//! Typed, best-effort persistence gateway.
//!
//! Everything above this layer deals in domain types and never sees a
//! storage error: reads decode-or-default, writes are fire-and-forget with
//! a `warn!` on failure. The in-memory state stays authoritative for the
//! rest of the session whenever storage misbehaves.

use chrono::Utc;
use tracing::warn;

use chimera_types::credits::CreditsState;
use chimera_types::generation::GenerationRecord;
use chimera_types::snapshot::BuilderSnapshot;

use super::kv_store::KvStore;

/// Storage key for the builder session snapshot.
pub const SNAPSHOT_KEY: &str = "builder.session.v1";
/// Storage key for the credits balance (decimal string).
pub const CREDITS_BALANCE_KEY: &str = "credits.balance.v1";
/// Storage key for the ever-topped-up flag ("0"/"1").
pub const CREDITS_TOPPED_UP_KEY: &str = "credits.topped_up.v1";
/// Storage key for the write-only last-generated audit record.
pub const LAST_GENERATED_KEY: &str = "builder.last_generated.v1";
/// Storage key for the first-run tutorial flag.
pub const TUTORIAL_SEEN_KEY: &str = "tutorial.seen.v1";

/// Best-effort facade over a raw [`KvStore`].
pub struct PersistenceGateway<S: KvStore> {
    store: S,
}

impl<S: KvStore> PersistenceGateway<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Access the underlying raw store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Load the persisted builder snapshot.
    ///
    /// A missing key, malformed JSON, or a record without an `assignments`
    /// map all read as "no prior state".
    pub async fn load_snapshot(&self) -> Option<BuilderSnapshot> {
        match self.store.load(SNAPSHOT_KEY).await {
            Ok(Some(value)) => BuilderSnapshot::from_value(&value),
            Ok(None) => None,
            Err(err) => {
                warn!(key = SNAPSHOT_KEY, %err, "snapshot load failed, starting fresh");
                None
            }
        }
    }

    /// Persist the builder snapshot, stamping the current time.
    pub async fn save_snapshot(&self, snapshot: &BuilderSnapshot) {
        let stamped = BuilderSnapshot {
            updated_at: Utc::now(),
            ..snapshot.clone()
        };
        match serde_json::to_value(&stamped) {
            Ok(value) => self.save_best_effort(SNAPSHOT_KEY, &value).await,
            Err(err) => warn!(key = SNAPSHOT_KEY, %err, "snapshot encode failed"),
        }
    }

    /// Erase the persisted builder snapshot (explicit exit/reset).
    pub async fn clear_snapshot(&self) {
        if let Err(err) = self.store.clear(SNAPSHOT_KEY).await {
            warn!(key = SNAPSHOT_KEY, %err, "snapshot clear failed");
        }
    }

    /// Load credits state; anything malformed reads as `{0, false}`.
    pub async fn load_credits(&self) -> CreditsState {
        let balance = self.load_string(CREDITS_BALANCE_KEY).await;
        let topped_up = self.load_string(CREDITS_TOPPED_UP_KEY).await;
        CreditsState::decode(balance.as_deref(), topped_up.as_deref())
    }

    /// Persist credits state as its two string-encoded keys.
    pub async fn save_credits(&self, state: &CreditsState) {
        self.save_best_effort(
            CREDITS_BALANCE_KEY,
            &serde_json::Value::String(state.encode_balance()),
        )
        .await;
        self.save_best_effort(
            CREDITS_TOPPED_UP_KEY,
            &serde_json::Value::String(state.encode_topped_up()),
        )
        .await;
    }

    /// Write the audit record of a submitted generation. Write-only: the
    /// core never reads this key back.
    pub async fn record_generation(&self, record: &GenerationRecord) {
        match serde_json::to_value(record) {
            Ok(value) => self.save_best_effort(LAST_GENERATED_KEY, &value).await,
            Err(err) => warn!(key = LAST_GENERATED_KEY, %err, "audit record encode failed"),
        }
    }

    /// Whether the first-run tutorial was already acknowledged.
    ///
    /// A storage *read* failure reports `true` so a broken store does not
    /// re-surface the overlay on every visit.
    pub async fn tutorial_seen(&self) -> bool {
        match self.store.load(TUTORIAL_SEEN_KEY).await {
            Ok(value) => value.is_some(),
            Err(err) => {
                warn!(key = TUTORIAL_SEEN_KEY, %err, "tutorial flag load failed");
                true
            }
        }
    }

    /// Mark the tutorial as acknowledged.
    pub async fn mark_tutorial_seen(&self) {
        self.save_best_effort(TUTORIAL_SEEN_KEY, &serde_json::Value::String("1".into()))
            .await;
    }

    async fn load_string(&self, key: &str) -> Option<String> {
        match self.store.load(key).await {
            Ok(Some(serde_json::Value::String(s))) => Some(s),
            Ok(Some(other)) => Some(other.to_string()),
            Ok(None) => None,
            Err(err) => {
                warn!(key, %err, "load failed, using default");
                None
            }
        }
    }

    async fn save_best_effort(&self, key: &str, value: &serde_json::Value) {
        if let Err(err) = self.store.save(key, value).await {
            warn!(key, %err, "save failed, in-memory state stays authoritative");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use chimera_types::error::StorageError;
    use chimera_types::part::PartKey;
    use chrono::Utc;
    use uuid::Uuid;

    use crate::storage::memory::MemoryKvStore;

    use super::*;

    /// Store whose every operation fails, for degraded-mode tests.
    struct BrokenKvStore;

    impl KvStore for BrokenKvStore {
        async fn load(&self, _key: &str) -> Result<Option<serde_json::Value>, StorageError> {
            Err(StorageError::Io("quota exceeded".into()))
        }

        async fn save(&self, _key: &str, _value: &serde_json::Value) -> Result<(), StorageError> {
            Err(StorageError::Io("quota exceeded".into()))
        }

        async fn clear(&self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Io("quota exceeded".into()))
        }
    }

    fn sample_snapshot() -> BuilderSnapshot {
        BuilderSnapshot {
            assignments: [("head".to_string(), 2), ("body".to_string(), 5)]
                .into_iter()
                .collect(),
            active_part: Some("body".to_string()),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_snapshot_round_trip() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        let snapshot = sample_snapshot();
        gateway.save_snapshot(&snapshot).await;

        let loaded = gateway.load_snapshot().await.unwrap();
        assert_eq!(loaded.assignments, snapshot.assignments);
        assert_eq!(loaded.active_part, snapshot.active_part);
    }

    #[tokio::test]
    async fn test_save_stamps_updated_at() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        let mut snapshot = sample_snapshot();
        snapshot.updated_at = Utc::now() - chrono::Duration::days(7);
        let before = Utc::now();
        gateway.save_snapshot(&snapshot).await;

        let loaded = gateway.load_snapshot().await.unwrap();
        assert!(loaded.updated_at >= before);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_none() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        assert!(gateway.load_snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_snapshot_is_none() {
        let store = MemoryKvStore::new();
        store
            .save(SNAPSHOT_KEY, &serde_json::json!({"activePartKey": "head"}))
            .await
            .unwrap();
        let gateway = PersistenceGateway::new(store);
        assert!(gateway.load_snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_clear_snapshot() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        gateway.save_snapshot(&sample_snapshot()).await;
        gateway.clear_snapshot().await;
        assert!(gateway.load_snapshot().await.is_none());
    }

    #[tokio::test]
    async fn test_credits_round_trip() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        let state = CreditsState {
            balance: 9,
            ever_topped_up: true,
        };
        gateway.save_credits(&state).await;
        assert_eq!(gateway.load_credits().await, state);
    }

    #[tokio::test]
    async fn test_credits_default_when_absent() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        assert_eq!(gateway.load_credits().await, CreditsState::default());
    }

    #[tokio::test]
    async fn test_tutorial_flag() {
        let gateway = PersistenceGateway::new(MemoryKvStore::new());
        assert!(!gateway.tutorial_seen().await);
        gateway.mark_tutorial_seen().await;
        assert!(gateway.tutorial_seen().await);
    }

    #[tokio::test]
    async fn test_broken_store_degrades_quietly() {
        let gateway = PersistenceGateway::new(BrokenKvStore);

        // Reads fall back to defaults.
        assert!(gateway.load_snapshot().await.is_none());
        assert_eq!(gateway.load_credits().await, CreditsState::default());
        // A failed tutorial read reports "seen".
        assert!(gateway.tutorial_seen().await);

        // Writes are swallowed.
        gateway.save_snapshot(&sample_snapshot()).await;
        gateway
            .save_credits(&CreditsState {
                balance: 1,
                ever_topped_up: true,
            })
            .await;
        gateway.clear_snapshot().await;
        gateway.mark_tutorial_seen().await;
    }

    #[tokio::test]
    async fn test_record_generation_is_write_only() {
        let store = MemoryKvStore::new();
        let gateway = PersistenceGateway::new(store);
        let record = GenerationRecord {
            run_id: Uuid::now_v7(),
            assignments: BTreeMap::from([(PartKey::Head, 1), (PartKey::Body, 2)]),
            created_at: Utc::now(),
        };
        gateway.record_generation(&record).await;
        // The gateway exposes no reader for this key; verify at the raw
        // store level that the blob landed.
        let raw = gateway
            .store()
            .load(LAST_GENERATED_KEY)
            .await
            .unwrap()
            .unwrap();
        let back: GenerationRecord = serde_json::from_value(raw).unwrap();
        assert_eq!(back, record);
    }
}
