use async_trait::async_trait;
use chrono::{DateTime, Utc};

use common::models::{AccountSnapshot, Bar, OrderReceipt, OrderRequest, Position};

/// Boundary to the market-data/broker backend. The dispatch engine only
/// ever talks to this trait; concrete transports live under `remote`.
#[async_trait]
pub trait BrokerClient: Send + Sync {
    /// Historical bars for one symbol, oldest first.
    async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Bar>>;

    async fn get_positions(&self) -> anyhow::Result<Vec<Position>>;

    /// Latest traded price for one symbol.
    async fn get_latest_price(&self, symbol: &str) -> anyhow::Result<f64>;

    async fn get_account(&self) -> anyhow::Result<AccountSnapshot>;

    async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderReceipt>;

    async fn cancel_order(&self, order_id: &str) -> anyhow::Result<()>;
}
