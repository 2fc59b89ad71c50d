use std::env;
use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use tracing::{error, info};

use common::models::{AccountSnapshot, Bar, OrderReceipt, OrderRequest, Position};

use crate::remote::account_response::AccountResponse;
use crate::remote::bar_response::BarsResponse;
use crate::remote::order_response::{OrderPayload, OrderResponse};
use crate::remote::position_response::PositionResponse;
use crate::remote::trade_response::LatestTradeResponse;
use crate::traits::BrokerClient;

/// REST client for the Alpaca trading + data APIs. Credentials and base
/// URLs come from the environment; defaults target the paper endpoint.
#[derive(Clone)]
pub struct AlpacaClient {
    client: Client,
    trading_url: String,
    data_url: String,
    api_key_id: String,
    api_secret: String,
}

impl AlpacaClient {
    pub fn from_env() -> anyhow::Result<Self> {
        let api_key_id = env::var("APCA_API_KEY_ID").context("APCA_API_KEY_ID not set")?;
        let api_secret = env::var("APCA_API_SECRET_KEY").context("APCA_API_SECRET_KEY not set")?;
        let trading_url = env::var("APCA_API_BASE_URL")
            .unwrap_or_else(|_| "https://paper-api.alpaca.markets".to_string());
        let data_url = env::var("APCA_DATA_BASE_URL")
            .unwrap_or_else(|_| "https://data.alpaca.markets".to_string());

        let client = Client::builder()
            .user_agent("order-dispatch-bot/0.1.0")
            .timeout(Duration::from_secs(10))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            trading_url,
            data_url,
            api_key_id,
            api_secret,
        })
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .header("APCA-API-KEY-ID", &self.api_key_id)
            .header("APCA-API-SECRET-KEY", &self.api_secret)
    }

    async fn ensure_success(
        resp: reqwest::Response,
        what: &str,
    ) -> anyhow::Result<reqwest::Response> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            error!("{} failed: HTTP {} {}", what, status, body);
            bail!("{what} failed: HTTP {status}: {body}");
        }
        Ok(resp)
    }
}

#[async_trait]
impl BrokerClient for AlpacaClient {
    async fn get_historical_bars(
        &self,
        symbol: &str,
        timeframe: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> anyhow::Result<Vec<Bar>> {
        let url = format!(
            "{}/v2/stocks/{}/bars",
            self.data_url,
            symbol.to_uppercase()
        );
        let start = start.to_rfc3339_opts(SecondsFormat::Secs, true);
        let end = end.to_rfc3339_opts(SecondsFormat::Secs, true);
        let resp = self
            .authed(self.client.get(&url).query(&[
                ("timeframe", timeframe),
                ("start", start.as_str()),
                ("end", end.as_str()),
                ("adjustment", "raw"),
            ]))
            .send()
            .await
            .with_context(|| format!("Failed to request bars for {symbol}"))?;

        let resp = Self::ensure_success(resp, "Historical bars").await?;
        let bars = resp
            .json::<BarsResponse>()
            .await
            .context("Failed to parse bars response")?;
        Ok(bars.into_bars())
    }

    async fn get_positions(&self) -> anyhow::Result<Vec<Position>> {
        let url = format!("{}/v2/positions", self.trading_url);
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .await
            .context("Failed to request positions")?;

        let resp = Self::ensure_success(resp, "Positions").await?;
        let raw = resp
            .json::<Vec<PositionResponse>>()
            .await
            .context("Failed to parse positions response")?;
        raw.into_iter().map(|p| p.into_position()).collect()
    }

    async fn get_latest_price(&self, symbol: &str) -> anyhow::Result<f64> {
        let url = format!(
            "{}/v2/stocks/{}/trades/latest",
            self.data_url,
            symbol.to_uppercase()
        );
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .await
            .with_context(|| format!("Failed to request latest trade for {symbol}"))?;

        let resp = Self::ensure_success(resp, "Latest trade").await?;
        let trade = resp
            .json::<LatestTradeResponse>()
            .await
            .context("Failed to parse latest trade response")?;
        Ok(trade.trade.price)
    }

    async fn get_account(&self) -> anyhow::Result<AccountSnapshot> {
        let url = format!("{}/v2/account", self.trading_url);
        let resp = self
            .authed(self.client.get(&url))
            .send()
            .await
            .context("Failed to request account")?;

        let resp = Self::ensure_success(resp, "Account").await?;
        resp.json::<AccountResponse>()
            .await
            .context("Failed to parse account response")?
            .into_snapshot()
    }

    async fn submit_order(&self, order: &OrderRequest) -> anyhow::Result<OrderReceipt> {
        let url = format!("{}/v2/orders", self.trading_url);
        let payload = OrderPayload::from(order);

        info!(
            "Placing order: {:?} {} x{} ({:?})",
            order.side, order.symbol, order.qty, order.order_type
        );

        let resp = self
            .authed(self.client.post(&url).json(&payload))
            .send()
            .await
            .with_context(|| format!("Failed to submit order for {}", order.symbol))?;

        let resp = Self::ensure_success(resp, "Order submission").await?;
        let order_resp = resp
            .json::<OrderResponse>()
            .await
            .context("Failed to parse order response")?;
        Ok(order_resp.into_receipt())
    }

    async fn cancel_order(&self, order_id: &str) -> anyhow::Result<()> {
        let url = format!("{}/v2/orders/{}", self.trading_url, order_id);
        let resp = self
            .authed(self.client.delete(&url))
            .send()
            .await
            .with_context(|| format!("Failed to cancel order {order_id}"))?;

        Self::ensure_success(resp, "Order cancellation").await?;
        Ok(())
    }
}
