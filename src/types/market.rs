use serde::{Deserialize, Serialize};

/// Synthetic 24h ticker for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketTick {
    pub symbol: String,
    /// Last price
    pub price: f64,
    /// Absolute 24h change
    pub change_24h: f64,
    /// 24h change in percent
    pub change_24h_percent: f64,
    /// 24h volume
    pub volume: f64,
    pub high_24h: f64,
    pub low_24h: f64,
}
