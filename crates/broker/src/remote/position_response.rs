use anyhow::Context;
use serde::Deserialize;

use common::models::Position;

/// Alpaca position payload. Numeric fields come over the wire as strings.
#[derive(Debug, Deserialize)]
pub struct PositionResponse {
    pub symbol: String,
    pub qty: String,
    pub avg_entry_price: String,
    pub current_price: String,
    pub unrealized_pl: String,
    pub side: String,
}

fn parse_field(value: &str, field: &str) -> anyhow::Result<f64> {
    value
        .parse::<f64>()
        .with_context(|| format!("Failed to parse position field {field}: {value:?}"))
}

impl PositionResponse {
    pub fn into_position(self) -> anyhow::Result<Position> {
        let mut qty = parse_field(&self.qty, "qty")?;
        // Short positions report a "short" side; normalise the sign.
        if self.side.eq_ignore_ascii_case("short") && qty > 0.0 {
            qty = -qty;
        }
        Ok(Position {
            symbol: self.symbol.to_uppercase(),
            qty,
            avg_entry_price: parse_field(&self.avg_entry_price, "avg_entry_price")?,
            current_price: parse_field(&self.current_price, "current_price")?,
            unrealized_pl: parse_field(&self.unrealized_pl, "unrealized_pl")?,
        })
    }
}
