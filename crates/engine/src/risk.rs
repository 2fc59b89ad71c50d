use common::models::{OrderSide, Position};

use crate::config::DispatchConfig;

/// Never commit more than this fraction of buying power to one new position.
const BUYING_POWER_FRACTION: f64 = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    MaxOpenPositions,
    InsufficientBuyingPower,
    PositionTooSmall,
    NoPositionToSell,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::MaxOpenPositions => "Max positions reached",
            RejectReason::InsufficientBuyingPower => "Insufficient buying power",
            RejectReason::PositionTooSmall => "Position too small",
            RejectReason::NoPositionToSell => "No open position to sell",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskVerdict {
    Approved { qty: u32 },
    Rejected(RejectReason),
}

/// Admission control and sizing. A pure decision function over its
/// inputs: no clock, no I/O, no hidden state.
#[derive(Debug, Clone)]
pub struct RiskGate {
    max_open_positions: usize,
    max_position_size: f64,
    min_position_notional: f64,
}

impl RiskGate {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            max_open_positions: config.max_open_positions,
            max_position_size: config.max_position_size,
            min_position_notional: config.min_position_notional,
        }
    }

    /// Decide whether an order for `symbol`/`side` may go out, and at
    /// what quantity. Rejections are policy outcomes, not errors.
    pub fn admit(
        &self,
        symbol: &str,
        side: OrderSide,
        positions: &[Position],
        buying_power: f64,
        current_price: f64,
    ) -> RiskVerdict {
        match side {
            OrderSide::Buy => self.admit_buy(positions, buying_power, current_price),
            OrderSide::Sell => Self::admit_sell(symbol, positions),
        }
    }

    fn admit_buy(
        &self,
        positions: &[Position],
        buying_power: f64,
        current_price: f64,
    ) -> RiskVerdict {
        if positions.len() >= self.max_open_positions {
            return RiskVerdict::Rejected(RejectReason::MaxOpenPositions);
        }

        let size = self
            .max_position_size
            .min(buying_power * BUYING_POWER_FRACTION);
        if size < self.min_position_notional {
            return RiskVerdict::Rejected(RejectReason::InsufficientBuyingPower);
        }

        // Sub-cent and non-finite quotes would size into absurd
        // quantities (the f64 to u32 cast saturates), so they never
        // reach the division.
        if !current_price.is_finite() || current_price < 0.01 {
            return RiskVerdict::Rejected(RejectReason::PositionTooSmall);
        }

        let qty = (size / current_price).floor() as u32;
        if qty < 1 {
            return RiskVerdict::Rejected(RejectReason::PositionTooSmall);
        }

        RiskVerdict::Approved { qty }
    }

    // Sells only close what the account already holds, so neither the
    // position cap nor sizing applies.
    fn admit_sell(symbol: &str, positions: &[Position]) -> RiskVerdict {
        let held = positions
            .iter()
            .find(|p| p.symbol.eq_ignore_ascii_case(symbol));
        match held {
            Some(p) if p.qty.abs() >= 1.0 => RiskVerdict::Approved {
                qty: p.qty.abs().floor() as u32,
            },
            _ => RiskVerdict::Rejected(RejectReason::NoPositionToSell),
        }
    }
}
