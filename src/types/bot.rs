//! Bot configuration types.

use serde::{Deserialize, Serialize};

/// Strategy the simulated bot runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BotStrategy {
    Grid,
    Twap,
    Momentum,
    MeanReversion,
}

/// Risk appetite of the simulated bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Configuration of the simulated trading bot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfig {
    /// Whether the bot is switched on
    pub enabled: bool,
    pub strategy: BotStrategy,
    /// Symbols the bot trades
    pub symbols: Vec<String>,
    pub risk_level: RiskLevel,
    /// Maximum position size in quote currency
    pub max_position_size: f64,
    /// Stop loss in percent
    pub stop_loss: f64,
    /// Take profit in percent
    pub take_profit: f64,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            strategy: BotStrategy::Grid,
            symbols: vec!["BTCUSDT".to_string(), "ETHUSDT".to_string()],
            risk_level: RiskLevel::Low,
            max_position_size: 1000.0,
            stop_loss: 5.0,
            take_profit: 10.0,
        }
    }
}

/// Partial bot configuration update. Only supplied fields change.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BotConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<BotStrategy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbols: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_position_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_loss: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub take_profit: Option<f64>,
}

impl BotConfigUpdate {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }

    pub fn stop_loss(stop_loss: f64) -> Self {
        Self {
            stop_loss: Some(stop_loss),
            ..Default::default()
        }
    }

    /// Apply updates to a config.
    pub fn apply_to(&self, config: &mut BotConfig) {
        if let Some(v) = self.enabled {
            config.enabled = v;
        }
        if let Some(v) = self.strategy {
            config.strategy = v;
        }
        if let Some(v) = &self.symbols {
            config.symbols = v.clone();
        }
        if let Some(v) = self.risk_level {
            config.risk_level = v;
        }
        if let Some(v) = self.max_position_size {
            config.max_position_size = v;
        }
        if let Some(v) = self.stop_loss {
            config.stop_loss = v;
        }
        if let Some(v) = self.take_profit {
            config.take_profit = v;
        }
    }

    /// True when no field is supplied.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
