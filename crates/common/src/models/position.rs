use serde::{Deserialize, Serialize};

/// An open position as reported by the broker account. The sign of `qty`
/// encodes direction: positive long, negative short. Read-only to the
/// dispatch engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Position {
    pub symbol: String,
    pub qty: f64,
    pub avg_entry_price: f64,
    pub current_price: f64,
    pub unrealized_pl: f64,
}

impl Position {
    pub fn is_long(&self) -> bool {
        self.qty > 0.0
    }
}
