use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalAction {
    Buy,
    Sell,
    Hold,
}

/// Directional recommendation produced by a strategy for one symbol.
/// `strength` is 0..=100, `confidence` is 0..=1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub action: SignalAction,
    pub strength: f64,
    pub confidence: f64,
    pub reason: String,
}

impl Signal {
    pub fn hold(reason: impl Into<String>) -> Self {
        Self {
            action: SignalAction::Hold,
            strength: 0.0,
            confidence: 0.0,
            reason: reason.into(),
        }
    }
}

/// The most recent evaluation, published for observers (UI, logs).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolSignal {
    pub symbol: String,
    pub signal: Signal,
}
