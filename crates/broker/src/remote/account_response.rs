use anyhow::Context;
use serde::Deserialize;

use common::models::AccountSnapshot;

#[derive(Debug, Deserialize)]
pub struct AccountResponse {
    pub buying_power: String,
    pub portfolio_value: String,
    pub currency: String,
}

impl AccountResponse {
    pub fn into_snapshot(self) -> anyhow::Result<AccountSnapshot> {
        Ok(AccountSnapshot {
            buying_power: self
                .buying_power
                .parse()
                .with_context(|| format!("Failed to parse buying_power: {:?}", self.buying_power))?,
            portfolio_value: self.portfolio_value.parse().with_context(|| {
                format!("Failed to parse portfolio_value: {:?}", self.portfolio_value)
            })?,
            currency: self.currency,
        })
    }
}
