use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LatestTrade {
    #[serde(rename = "p")]
    pub price: f64,
}

#[derive(Debug, Deserialize)]
pub struct LatestTradeResponse {
    pub trade: LatestTrade,
}
