//! Immutable views of the dashboard state handed to observers.

use super::{Balance, BotConfig, LogEntry, MarketTick, Order, OrderStatus, Position};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// Complete dashboard state at one instant.
///
/// Collections are shared with the store, so cloning a snapshot or publishing a
/// new one only copies the collections that actually changed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
    /// Incremented once per published mutation
    pub version: u64,
    /// Newest first
    pub orders: Arc<Vec<Order>>,
    pub positions: Arc<Vec<Position>>,
    pub balances: Arc<Vec<Balance>>,
    /// Newest first, bounded
    pub logs: Arc<VecDeque<LogEntry>>,
    pub market_data: Arc<Vec<MarketTick>>,
    pub bot_config: Arc<BotConfig>,
}

impl DashboardSnapshot {
    /// Look up an order by id.
    pub fn order(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    /// Current feed price for a symbol.
    pub fn price_of(&self, symbol: &str) -> Option<f64> {
        self.market_data
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.price)
    }

    /// Header figures derived from balances, positions and orders.
    pub fn summary(&self) -> DashboardSummary {
        let total_balance: f64 = self.balances.iter().map(|b| b.balance).sum();
        let total_pnl: f64 = self.positions.iter().map(|p| p.pnl).sum();
        let total_pnl_percent = if total_balance > 0.0 {
            total_pnl / total_balance * 100.0
        } else {
            0.0
        };

        DashboardSummary {
            total_balance,
            total_pnl,
            total_pnl_percent,
            active_orders: self
                .orders
                .iter()
                .filter(|o| o.status == OrderStatus::New)
                .count(),
            bot_enabled: self.bot_config.enabled,
        }
    }
}

/// Aggregate figures for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_balance: f64,
    pub total_pnl: f64,
    pub total_pnl_percent: f64,
    /// Orders still in NEW
    pub active_orders: usize,
    pub bot_enabled: bool,
}
