//! Paid-generation orchestration.
//!
//! One place owns the generate sequence: validate the final selection,
//! debit credits, write the audit record, start the flow engine, and hand
//! the caller the event stream plus the canned result card to show on
//! completion. The engine itself stays content-agnostic.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::mpsc;
use tracing::info;
use uuid::Uuid;

use chimera_types::catalog::Catalog;
use chimera_types::generation::{GenerationEvent, GenerationRecord, GenerationStep, HybridCard};

use crate::credits::CreditsLedger;
use crate::generation::GenerationFlowEngine;
use crate::policy::LockPolicy;
use crate::selection::{MIN_SELECTED, SelectionController};
use crate::session::BuilderSession;
use crate::storage::{KvStore, PersistenceGateway};

/// Outcome of a generate attempt.
pub enum GenerateOutcome {
    /// The run is in flight. `card` is what to display when the event
    /// stream yields `Completed`.
    Started {
        run_id: Uuid,
        events: mpsc::Receiver<GenerationEvent>,
        card: HybridCard,
    },
    /// Fewer than the minimum number of slots survived the lock filter.
    TooFewParts { selected: usize },
    /// The ledger could not cover the cost; the caller should route the
    /// user toward a top-up.
    InsufficientCredits { balance: u64, cost: u64 },
}

/// Orchestrates paid generations over the flow engine.
pub struct GenerationCoordinator<S: KvStore> {
    gateway: Arc<PersistenceGateway<S>>,
    engine: GenerationFlowEngine,
    cost: u64,
    steps: Vec<GenerationStep>,
}

impl<S: KvStore> GenerationCoordinator<S> {
    pub fn new(
        gateway: Arc<PersistenceGateway<S>>,
        cost: u64,
        steps: Vec<GenerationStep>,
    ) -> Self {
        Self {
            gateway,
            engine: GenerationFlowEngine::new(),
            cost,
            steps,
        }
    }

    /// Attempt one paid generation.
    ///
    /// Validation order matters: the selection filter and part floor run
    /// before any credits are spent, so a rejected request never debits.
    pub async fn generate(
        &mut self,
        catalog: &Catalog,
        session: &BuilderSession,
        selection: &SelectionController,
        ledger: &mut CreditsLedger<S>,
    ) -> GenerateOutcome {
        let policy = LockPolicy::new(catalog, ledger.ever_topped_up());
        let final_assignments = selection.build_final(catalog, session, &policy);

        if final_assignments.len() < MIN_SELECTED {
            return GenerateOutcome::TooFewParts {
                selected: final_assignments.len(),
            };
        }

        if !ledger.try_spend(self.cost as i64).await {
            return GenerateOutcome::InsufficientCredits {
                balance: ledger.balance(),
                cost: self.cost,
            };
        }

        let (run_id, events) = self.engine.start(self.steps.clone());
        info!(%run_id, parts = final_assignments.len(), cost = self.cost, "generation submitted");

        self.gateway
            .record_generation(&GenerationRecord {
                run_id,
                assignments: final_assignments,
                created_at: Utc::now(),
            })
            .await;

        GenerateOutcome::Started {
            run_id,
            events,
            card: HybridCard::placeholder(),
        }
    }

    /// Cancel the in-flight run, if any.
    pub fn cancel(&mut self) {
        self.engine.cancel();
    }

    /// Whether a run is in flight.
    pub fn is_running(&self) -> bool {
        self.engine.is_running()
    }
}
