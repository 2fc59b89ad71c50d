use chrono::{DateTime, Utc};
use serde::Deserialize;

use common::models::Bar;

/// Raw bar payload as returned by the Alpaca data API.
#[derive(Debug, Deserialize)]
pub struct RawBar {
    #[serde(rename = "t")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "o")]
    pub open: f64,
    #[serde(rename = "h")]
    pub high: f64,
    #[serde(rename = "l")]
    pub low: f64,
    #[serde(rename = "c")]
    pub close: f64,
    #[serde(rename = "v")]
    pub volume: f64,
}

#[derive(Debug, Deserialize)]
pub struct BarsResponse {
    pub bars: Option<Vec<RawBar>>,
}

impl BarsResponse {
    /// Bars oldest first; a null/absent `bars` field means no data.
    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
            .unwrap_or_default()
            .into_iter()
            .map(|b| Bar {
                timestamp: b.timestamp,
                open: b.open,
                high: b.high,
                low: b.low,
                close: b.close,
                volume: b.volume,
            })
            .collect()
    }
}
