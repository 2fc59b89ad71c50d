use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    Market,
    Stop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeInForce {
    Day,
    Gtc,
    Ioc,
}

impl TimeInForce {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Some(TimeInForce::Day),
            "gtc" => Some(TimeInForce::Gtc),
            "ioc" => Some(TimeInForce::Ioc),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeInForce::Day => "day",
            TimeInForce::Gtc => "gtc",
            TimeInForce::Ioc => "ioc",
        }
    }
}

/// A single order to be submitted to the broker. Submitted once, never
/// retried automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: String,
    pub qty: u32,
    pub side: OrderSide,
    pub order_type: OrderType,
    pub stop_price: Option<f64>,
    pub time_in_force: TimeInForce,
    pub client_order_id: String,
}

impl OrderRequest {
    pub fn market(
        symbol: &str,
        qty: u32,
        side: OrderSide,
        time_in_force: TimeInForce,
        client_order_id: String,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            qty,
            side,
            order_type: OrderType::Market,
            stop_price: None,
            time_in_force,
            client_order_id,
        }
    }

    pub fn stop(
        symbol: &str,
        qty: u32,
        side: OrderSide,
        stop_price: f64,
        client_order_id: String,
    ) -> Self {
        Self {
            symbol: symbol.to_uppercase(),
            qty,
            side,
            order_type: OrderType::Stop,
            stop_price: Some(stop_price),
            time_in_force: TimeInForce::Gtc,
            client_order_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: String,
    pub status: String,
}
