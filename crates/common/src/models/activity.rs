use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Success,
    /// Policy decision, not an error (risk gate declined, hold signal).
    Skipped,
    Failed,
}

/// One dispatch attempt or outcome, as shown in the activity trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub symbol: String,
    pub qty: u32,
    pub reason: String,
    pub outcome: Outcome,
}

impl LogEntry {
    pub fn new(
        action: impl Into<String>,
        symbol: impl Into<String>,
        qty: u32,
        reason: impl Into<String>,
        outcome: Outcome,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            action: action.into(),
            symbol: symbol.into(),
            qty,
            reason: reason.into(),
            outcome,
        }
    }
}
