//! Dashboard Service
//!
//! The single object a presentation layer talks to. It owns the order,
//! market-data, log and bot-configuration state, runs the synthetic feed, and
//! publishes a new [`DashboardSnapshot`] to subscribers after every mutation.

use crate::config::Config;
use crate::error::Result;
use crate::services::config_store::ConfigStore;
use crate::services::log_store::LogStore;
use crate::services::market_feed::{self, MarketFeed};
use crate::services::store::{DashboardState, Store};
use crate::services::trading::{OrderManager, OrderTicket, RiskCheck, TradingError};
use crate::types::{
    Balance, BotConfig, BotConfigUpdate, DashboardSnapshot, DashboardSummary, LogEntry,
    LogLevel, MarketTick, Order, PlaceOrderRequest, Position,
};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Simulated trading dashboard.
pub struct Dashboard {
    store: Arc<Store>,
    orders: OrderManager,
    /// Shutdown signal sender for the feed loop
    shutdown_tx: broadcast::Sender<()>,
    feed_handle: Mutex<Option<JoinHandle<()>>>,
    running: AtomicBool,
}

impl Dashboard {
    /// Build the state and start the market feed.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: &Config) -> Result<Self> {
        Self::build(config, None)
    }

    /// Like [`Dashboard::start`], with a risk review applied to every submission.
    pub fn with_risk_check(config: &Config, risk_check: Arc<dyn RiskCheck>) -> Result<Self> {
        Self::build(config, Some(risk_check))
    }

    fn build(config: &Config, risk_check: Option<Arc<dyn RiskCheck>>) -> Result<Self> {
        config.validate()?;

        let state = DashboardState::new(
            LogStore::new(config.log_capacity),
            MarketFeed::new(&config.feed),
            ConfigStore::new(config.bot.clone()),
        );
        let store = Arc::new(Store::new(state, config.channel_capacity));
        let orders = OrderManager::new(store.clone(), config.execution.clone(), risk_check);

        let (shutdown_tx, _) = broadcast::channel(1);
        let feed_handle = tokio::spawn(market_feed::run_feed(
            store.clone(),
            config.feed.tick_interval,
            shutdown_tx.subscribe(),
        ));

        info!(
            "Dashboard started: {} symbols, tick every {:?}",
            config.feed.symbols.len(),
            config.feed.tick_interval
        );

        Ok(Self {
            store,
            orders,
            shutdown_tx,
            feed_handle: Mutex::new(Some(feed_handle)),
            running: AtomicBool::new(true),
        })
    }

    // ==========================================================================
    // Commands
    // ==========================================================================

    /// Submit an order. See [`OrderTicket`] for completion.
    pub fn place_order(&self, request: PlaceOrderRequest) -> std::result::Result<OrderTicket, TradingError> {
        self.orders.place_order(request)
    }

    /// Cancel an open order.
    pub fn cancel_order(&self, order_id: &str) -> std::result::Result<Order, TradingError> {
        self.orders.cancel_order(order_id)
    }

    /// Merge a partial bot configuration.
    pub fn update_bot_config(&self, update: BotConfigUpdate) -> BotConfig {
        let details = serde_json::to_value(&update).ok();
        let config = self.store.mutate(|state| {
            let config = state.bot.update(&update);
            state
                .logs
                .push(LogLevel::Info, "Bot configuration updated", details);
            config
        });
        debug!("Bot configuration updated: {:?}", update);
        config
    }

    /// Switch the bot on or off.
    pub fn toggle_bot(&self) -> BotConfig {
        let config = self.store.mutate(|state| {
            let previous = state.bot.toggle();
            let verb = if previous { "stopped" } else { "started" };
            state.logs.push(
                LogLevel::Info,
                format!("Trading bot {}", verb),
                Some(json!({ "previousState": previous })),
            );
            state.bot.config()
        });
        info!("Trading bot enabled: {}", config.enabled);
        (*config).clone()
    }

    /// Append an operator log entry.
    pub fn add_log(&self, level: LogLevel, message: impl Into<String>, details: Option<Value>) -> LogEntry {
        let message = message.into();
        self.store
            .mutate(|state| state.logs.push(level, message, details))
    }

    // ==========================================================================
    // Reads
    // ==========================================================================

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.store.snapshot()
    }

    /// Receive every snapshot published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DashboardSnapshot>> {
        self.store.subscribe()
    }

    pub fn orders(&self) -> Arc<Vec<Order>> {
        self.snapshot().orders.clone()
    }

    pub fn positions(&self) -> Arc<Vec<Position>> {
        self.snapshot().positions.clone()
    }

    pub fn balances(&self) -> Arc<Vec<Balance>> {
        self.snapshot().balances.clone()
    }

    pub fn logs(&self) -> Arc<VecDeque<LogEntry>> {
        self.snapshot().logs.clone()
    }

    /// Log entries of one level, newest first.
    pub fn logs_by_level(&self, level: LogLevel) -> Vec<LogEntry> {
        self.store.read(|state| state.logs.by_level(level))
    }

    pub fn market_data(&self) -> Arc<Vec<MarketTick>> {
        self.snapshot().market_data.clone()
    }

    pub fn bot_config(&self) -> Arc<BotConfig> {
        self.snapshot().bot_config.clone()
    }

    /// Orders that can still fill or be cancelled.
    pub fn open_orders(&self) -> Vec<Order> {
        self.store.read(|state| state.orders.open_orders())
    }

    pub fn summary(&self) -> DashboardSummary {
        self.snapshot().summary()
    }

    /// Number of submission/fill timers still scheduled.
    pub fn pending_tasks(&self) -> usize {
        self.orders.pending_tasks()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    // ==========================================================================
    // Lifecycle
    // ==========================================================================

    /// Stop the feed and, if configured, abort pending order timers.
    pub async fn shutdown(&self) {
        if !self.running.swap(false, Ordering::SeqCst) {
            return;
        }

        let _ = self.shutdown_tx.send(());
        let aborted = self.orders.shutdown();

        let handle = self
            .feed_handle
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        info!("Dashboard stopped ({} pending order timers aborted)", aborted);
    }
}

impl Drop for Dashboard {
    fn drop(&mut self) {
        if let Some(handle) = self
            .feed_handle
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
        if self.running.load(Ordering::SeqCst) {
            self.orders.shutdown();
        }
    }
}
