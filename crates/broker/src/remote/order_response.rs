use serde::{Deserialize, Serialize};

use common::models::{OrderReceipt, OrderRequest, OrderSide, OrderType};

/// Order payload in the shape the Alpaca trading API expects:
/// quantities as strings, lowercase side/type/tif.
#[derive(Debug, Serialize)]
pub struct OrderPayload {
    pub symbol: String,
    pub qty: String,
    pub side: &'static str,
    #[serde(rename = "type")]
    pub order_type: &'static str,
    pub time_in_force: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<String>,
    pub client_order_id: String,
}

impl From<&OrderRequest> for OrderPayload {
    fn from(order: &OrderRequest) -> Self {
        Self {
            symbol: order.symbol.clone(),
            qty: order.qty.to_string(),
            side: match order.side {
                OrderSide::Buy => "buy",
                OrderSide::Sell => "sell",
            },
            order_type: match order.order_type {
                OrderType::Market => "market",
                OrderType::Stop => "stop",
            },
            time_in_force: order.time_in_force.as_str(),
            stop_price: order.stop_price.map(|p| format!("{p:.2}")),
            client_order_id: order.client_order_id.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct OrderResponse {
    pub id: String,
    pub status: String,
}

impl OrderResponse {
    pub fn into_receipt(self) -> OrderReceipt {
        OrderReceipt {
            order_id: self.id,
            status: self.status,
        }
    }
}
