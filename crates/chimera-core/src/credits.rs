//! Credits ledger: the simulated local wallet behind the freemium gate.

use std::sync::Arc;

use tracing::debug;

use chimera_types::credits::CreditsState;

use crate::storage::{KvStore, PersistenceGateway};

/// Tracks a non-negative balance and the one-way ever-topped-up flag.
///
/// Insufficient balance is an expected boolean outcome, never an error.
/// Every mutation persists through the gateway; persistence failures are
/// swallowed there, so the in-memory ledger stays authoritative.
pub struct CreditsLedger<S: KvStore> {
    state: CreditsState,
    gateway: Arc<PersistenceGateway<S>>,
}

impl<S: KvStore> CreditsLedger<S> {
    /// Restore the ledger from persisted state (malformed values decode to
    /// `{0, false}`).
    pub async fn load(gateway: Arc<PersistenceGateway<S>>) -> Self {
        let state = gateway.load_credits().await;
        Self { state, gateway }
    }

    /// Current balance.
    pub fn balance(&self) -> u64 {
        self.state.balance
    }

    /// Whether credits were ever added. Monotonic: never reset by spending
    /// or by the balance reaching zero.
    pub fn ever_topped_up(&self) -> bool {
        self.state.ever_topped_up
    }

    /// Add credits. Negative input clamps to 0; adding 0 is a no-op that
    /// leaves the ever-topped-up flag untouched.
    pub async fn add(&mut self, amount: i64) {
        let amount = amount.max(0) as u64;
        if amount == 0 {
            return;
        }
        self.state.balance += amount;
        self.state.ever_topped_up = true;
        debug!(balance = self.state.balance, "credits added");
        self.gateway.save_credits(&self.state).await;
    }

    /// Spend credits if the balance covers them.
    ///
    /// Returns `false` (no mutation) on insufficient balance. Never touches
    /// the ever-topped-up flag.
    pub async fn try_spend(&mut self, amount: i64) -> bool {
        let amount = amount.max(0) as u64;
        if self.state.balance < amount {
            return false;
        }
        self.state.balance -= amount;
        debug!(balance = self.state.balance, spent = amount, "credits spent");
        self.gateway.save_credits(&self.state).await;
        true
    }
}
