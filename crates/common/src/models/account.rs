use serde::{Deserialize, Serialize};

/// Point-in-time view of the trading account. Only the fields the
/// dispatch engine reads; currency amounts are in the account currency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountSnapshot {
    pub buying_power: f64,
    pub portfolio_value: f64,
    pub currency: String,
}
