//! Credits ledger state and its persisted string encoding.

use serde::{Deserialize, Serialize};

/// Live credits state.
///
/// `ever_topped_up` is monotonic: once set it is never cleared, not by
/// spending and not by the balance reaching zero. It is the single input to
/// the freemium lock policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditsState {
    pub balance: u64,
    pub ever_topped_up: bool,
}

impl CreditsState {
    /// Encode balance for persistence (decimal string, matching the
    /// original wire format).
    pub fn encode_balance(&self) -> String {
        self.balance.to_string()
    }

    /// Encode the ever-topped-up flag as `"0"` / `"1"`.
    pub fn encode_topped_up(&self) -> String {
        if self.ever_topped_up { "1" } else { "0" }.to_string()
    }

    /// Rebuild state from the two persisted values.
    ///
    /// A missing or non-numeric balance defaults to 0; a missing flag
    /// defaults to false. Total: malformed input never errors.
    pub fn decode(balance: Option<&str>, topped_up: Option<&str>) -> Self {
        Self {
            balance: balance.and_then(|s| s.trim().parse().ok()).unwrap_or(0),
            ever_topped_up: topped_up.map(|s| s.trim() == "1").unwrap_or(false),
        }
    }
}
