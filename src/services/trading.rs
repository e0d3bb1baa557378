//! Order Lifecycle
//!
//! Handles simulated order execution:
//! - Validation and submission with a simulated network delay
//! - Fills after a simulated matching delay, priced from the limit or the feed
//! - Cancellation guarded by order status
//! - Optional risk review that rejects orders at submission time
//!
//! Timers are tokio tasks tracked so they can be aborted on shutdown.

use crate::services::store::Store;
use crate::types::{BotConfig, LogLevel, Order, OrderStatus, PlaceOrderRequest};
use dashmap::DashMap;
use serde_json::json;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Trading service errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TradingError {
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Order not found: {0}")]
    OrderNotFound(String),

    #[error("Order cannot be cancelled: status is {0}")]
    CannotCancelOrder(OrderStatus),

    #[error("Order cannot be filled: status is {0}")]
    CannotFillOrder(OrderStatus),

    #[error("Order {order_id} rejected: {reason}")]
    OrderRejected { order_id: String, reason: String },

    #[error("Trading engine is stopped")]
    EngineStopped,
}

/// Configuration for order execution simulation.
#[derive(Debug, Clone)]
pub struct ExecutionConfig {
    /// Delay between a request and the NEW order
    pub submit_latency: Duration,
    /// Delay between NEW and FILLED
    pub fill_latency: Duration,
    /// Let cancellation overwrite FILLED/CANCELED/REJECTED orders
    pub allow_terminal_cancel: bool,
    /// Abort pending submission and fill timers on shutdown
    pub cancel_pending_on_shutdown: bool,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            submit_latency: Duration::from_millis(1000),
            fill_latency: Duration::from_millis(2000),
            allow_terminal_cancel: false,
            cancel_pending_on_shutdown: true,
        }
    }
}

/// Risk review consulted when a submission completes.
///
/// `reference_price` is the feed price for the order's symbol (0 if unknown).
pub trait RiskCheck: Send + Sync {
    fn review(&self, order: &Order, reference_price: f64, config: &BotConfig) -> Result<(), String>;
}

impl<F> RiskCheck for F
where
    F: Fn(&Order, f64, &BotConfig) -> Result<(), String> + Send + Sync,
{
    fn review(&self, order: &Order, reference_price: f64, config: &BotConfig) -> Result<(), String> {
        self(order, reference_price, config)
    }
}

/// Rejects orders whose notional exceeds the bot's max position size.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxPositionSize;

impl RiskCheck for MaxPositionSize {
    fn review(&self, order: &Order, reference_price: f64, config: &BotConfig) -> Result<(), String> {
        let notional = order.notional(reference_price);
        if notional > config.max_position_size {
            return Err(format!(
                "notional {:.2} exceeds max position size {:.2}",
                notional, config.max_position_size
            ));
        }
        Ok(())
    }
}

/// Newest-first collection of orders.
#[derive(Debug, Clone, Default)]
pub struct OrderLedger {
    orders: Arc<Vec<Order>>,
}

impl OrderLedger {
    /// Prepend an order.
    pub fn insert(&mut self, order: Order) {
        Arc::make_mut(&mut self.orders).insert(0, order);
    }

    pub fn get(&self, order_id: &str) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == order_id)
    }

    fn index_of(&self, order_id: &str) -> Result<usize, TradingError> {
        self.orders
            .iter()
            .position(|o| o.id == order_id)
            .ok_or_else(|| TradingError::OrderNotFound(order_id.to_string()))
    }

    /// Fill an open order. Terminal orders are left untouched.
    pub fn fill(&mut self, order_id: &str, market_price: f64) -> Result<Order, TradingError> {
        let idx = self.index_of(order_id)?;
        let status = self.orders[idx].status;
        if !status.is_open() {
            return Err(TradingError::CannotFillOrder(status));
        }

        let order = &mut Arc::make_mut(&mut self.orders)[idx];
        order.fill(market_price);
        Ok(order.clone())
    }

    /// Cancel an order; terminal orders only when `force` is set.
    pub fn cancel(&mut self, order_id: &str, force: bool) -> Result<Order, TradingError> {
        let idx = self.index_of(order_id)?;
        let status = self.orders[idx].status;
        if !force && !status.is_open() {
            return Err(TradingError::CannotCancelOrder(status));
        }

        let order = &mut Arc::make_mut(&mut self.orders)[idx];
        order.cancel(force);
        Ok(order.clone())
    }

    /// Orders that can still fill or be cancelled.
    pub fn open_orders(&self) -> Vec<Order> {
        self.orders
            .iter()
            .filter(|o| o.status.is_open())
            .cloned()
            .collect()
    }

    pub fn orders(&self) -> Arc<Vec<Order>> {
        self.orders.clone()
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Resolves with the NEW order once the submission delay has elapsed.
#[derive(Debug)]
pub struct OrderTicket {
    rx: oneshot::Receiver<Result<Order, TradingError>>,
}

impl Future for OrderTicket {
    type Output = Result<Order, TradingError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        // A dropped sender means the submission task was aborted by shutdown.
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TradingError::EngineStopped)))
    }
}

/// Drives orders through NEW -> FILLED on simulated timers.
#[derive(Clone)]
pub(crate) struct OrderManager {
    store: Arc<Store>,
    config: ExecutionConfig,
    risk_check: Option<Arc<dyn RiskCheck>>,
    /// Pending timer tasks (task key -> handle)
    pending: Arc<DashMap<String, JoinHandle<()>>>,
    stopped: Arc<AtomicBool>,
}

impl OrderManager {
    pub fn new(
        store: Arc<Store>,
        config: ExecutionConfig,
        risk_check: Option<Arc<dyn RiskCheck>>,
    ) -> Self {
        Self {
            store,
            config,
            risk_check,
            pending: Arc::new(DashMap::new()),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Validate and submit an order.
    ///
    /// Validation failures are returned immediately and logged at ERROR level.
    /// Otherwise an INFO entry is logged right away and the returned ticket
    /// resolves once the order exists with status NEW.
    pub fn place_order(&self, request: PlaceOrderRequest) -> Result<OrderTicket, TradingError> {
        let details = serde_json::to_value(&request).ok();

        if let Err(reason) = request.validate() {
            warn!("Refused order request for {:?}: {}", request.symbol, reason);
            self.store.mutate(|state| {
                state.logs.push(
                    LogLevel::Error,
                    format!("Failed to place order: {}", reason),
                    details,
                );
            });
            return Err(TradingError::InvalidOrder(reason));
        }

        if self.stopped.load(Ordering::SeqCst) {
            return Err(TradingError::EngineStopped);
        }

        self.store.mutate(|state| {
            state.logs.push(
                LogLevel::Info,
                format!(
                    "Placing {} order: {} {} {}",
                    request.order_type, request.side, request.quantity, request.symbol
                ),
                details,
            );
        });

        let (tx, rx) = oneshot::channel();
        let manager = self.clone();
        self.track(async move {
            let result = manager.submit(request).await;
            let _ = tx.send(result);
        });

        Ok(OrderTicket { rx })
    }

    /// Cancel an open order.
    pub fn cancel_order(&self, order_id: &str) -> Result<Order, TradingError> {
        let force = self.config.allow_terminal_cancel;
        let result = self.store.try_mutate(|state| {
            let order = state.orders.cancel(order_id, force)?;
            state
                .logs
                .push(LogLevel::Info, format!("Order {} cancelled", order.id), None);
            Ok(order)
        });

        match &result {
            Ok(order) => info!("Cancelled order {} ({})", order.id, order.symbol),
            Err(e) => warn!("Cancel of order {} refused: {}", order_id, e),
        }
        result
    }

    /// Submission phase: wait, then record the order as NEW (or REJECTED).
    async fn submit(&self, request: PlaceOrderRequest) -> Result<Order, TradingError> {
        tokio::time::sleep(self.config.submit_latency).await;

        let mut order = Order::new(request);
        let risk_check = self.risk_check.clone();

        let outcome = self.store.mutate(|state| {
            if let Some(check) = &risk_check {
                let reference_price = state.feed.price_of(&order.symbol).unwrap_or(0.0);
                let bot_config = state.bot.config();
                if let Err(reason) = check.review(&order, reference_price, &bot_config) {
                    order.reject();
                    state.orders.insert(order.clone());
                    state.logs.push(
                        LogLevel::Error,
                        format!("Order {} rejected: {}", order.id, reason),
                        Some(json!({ "orderId": order.id, "reason": reason })),
                    );
                    return Err(TradingError::OrderRejected {
                        order_id: order.id.clone(),
                        reason,
                    });
                }
            }

            state.orders.insert(order.clone());
            Ok(order.clone())
        });

        match outcome {
            Ok(order) => {
                info!(
                    "Order {} is NEW: {} {} {} {}",
                    order.id, order.order_type, order.side, order.quantity, order.symbol
                );
                self.schedule_fill(order.id.clone());
                Ok(order)
            }
            Err(e) => {
                warn!("{}", e);
                Err(e)
            }
        }
    }

    fn schedule_fill(&self, order_id: String) {
        let manager = self.clone();
        self.track(async move {
            tokio::time::sleep(manager.config.fill_latency).await;
            manager.fill(&order_id);
        });
    }

    /// Fill phase: a no-op unless the order is still open.
    fn fill(&self, order_id: &str) {
        let result: Result<Order, TradingError> = self.store.try_mutate(|state| {
            let market_price = state
                .orders
                .get(order_id)
                .and_then(|o| state.feed.price_of(&o.symbol))
                .unwrap_or(0.0);

            let order = state.orders.fill(order_id, market_price)?;
            state.logs.push(
                LogLevel::Success,
                format!("Order {} executed successfully", order.id),
                Some(json!({
                    "executedQty": order.executed_qty,
                    "executedPrice": order.executed_price,
                })),
            );
            Ok(order)
        });

        match result {
            Ok(order) => info!(
                "Filled order {}: {} {} @ {:?}",
                order.id, order.executed_qty, order.symbol, order.executed_price
            ),
            Err(e) => debug!("Skipped fill for order {}: {}", order_id, e),
        }
    }

    fn halted(&self) -> bool {
        self.config.cancel_pending_on_shutdown && self.stopped.load(Ordering::SeqCst)
    }

    /// Spawn a timer task and keep its handle until it completes.
    fn track<F>(&self, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.halted() {
            return;
        }

        let key = uuid::Uuid::new_v4().to_string();
        let pending = self.pending.clone();
        let task_key = key.clone();

        let handle = tokio::spawn(async move {
            task.await;
            pending.remove(&task_key);
        });
        self.pending.insert(key.clone(), handle);

        // The task may have finished, or shutdown may have swept, before insertion.
        self.pending.remove_if(&key, |_, handle| handle.is_finished());
        if self.halted() {
            if let Some((_, handle)) = self.pending.remove(&key) {
                handle.abort();
            }
        }
    }

    /// Stop accepting orders and, if configured, abort pending timers.
    ///
    /// Returns the number of aborted tasks.
    pub fn shutdown(&self) -> usize {
        self.stopped.store(true, Ordering::SeqCst);
        if !self.config.cancel_pending_on_shutdown {
            return 0;
        }

        let keys: Vec<String> = self.pending.iter().map(|e| e.key().clone()).collect();
        let mut aborted = 0;
        for key in keys {
            if let Some((_, handle)) = self.pending.remove(&key) {
                handle.abort();
                aborted += 1;
            }
        }
        aborted
    }

    pub fn pending_tasks(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::OrderSide;

    fn ledger_with(request: PlaceOrderRequest) -> (OrderLedger, String) {
        let mut ledger = OrderLedger::default();
        let order = Order::new(request);
        let id = order.id.clone();
        ledger.insert(order);
        (ledger, id)
    }

    #[test]
    fn test_insert_prepends() {
        let mut ledger = OrderLedger::default();
        let first = Order::new(PlaceOrderRequest::market("BTCUSDT", OrderSide::Buy, 1.0));
        let second = Order::new(PlaceOrderRequest::market("ETHUSDT", OrderSide::Sell, 2.0));
        let second_id = second.id.clone();

        ledger.insert(first);
        ledger.insert(second);

        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.orders()[0].id, second_id);
    }

    #[test]
    fn test_fill_market_order_uses_feed_price() {
        let (mut ledger, id) =
            ledger_with(PlaceOrderRequest::market("ETHUSDT", OrderSide::Buy, 2.0));

        let order = ledger.fill(&id, 2_345.5).unwrap();

        assert_eq!(order.status, OrderStatus::Filled);
        assert_eq!(order.executed_qty, 2.0);
        assert_eq!(order.executed_price, Some(2_345.5));
        assert!(ledger.open_orders().is_empty());
    }

    #[test]
    fn test_fill_after_cancel_is_refused() {
        let (mut ledger, id) =
            ledger_with(PlaceOrderRequest::market("ETHUSDT", OrderSide::Sell, 1.0));

        ledger.cancel(&id, false).unwrap();
        let before = ledger.orders();
        let err = ledger.fill(&id, 2_000.0).unwrap_err();

        assert_eq!(err, TradingError::CannotFillOrder(OrderStatus::Canceled));
        assert!(Arc::ptr_eq(&before, &ledger.orders()));
        assert_eq!(ledger.get(&id).unwrap().executed_qty, 0.0);
    }

    #[test]
    fn test_cancel_terminal_order() {
        let (mut ledger, id) =
            ledger_with(PlaceOrderRequest::limit("BTCUSDT", OrderSide::Buy, 0.5, 30_000.0));
        ledger.fill(&id, 0.0).unwrap();

        let err = ledger.cancel(&id, false).unwrap_err();
        assert_eq!(err, TradingError::CannotCancelOrder(OrderStatus::Filled));

        let forced = ledger.cancel(&id, true).unwrap();
        assert_eq!(forced.status, OrderStatus::Canceled);
    }

    #[test]
    fn test_unknown_order() {
        let mut ledger = OrderLedger::default();
        assert_eq!(
            ledger.cancel("missing", false).unwrap_err(),
            TradingError::OrderNotFound("missing".to_string())
        );
        assert!(ledger.fill("missing", 1.0).is_err());
    }

    #[test]
    fn test_max_position_size() {
        let config = BotConfig::default();
        let small = Order::new(PlaceOrderRequest::limit("BTCUSDT", OrderSide::Buy, 0.01, 30_000.0));
        let large = Order::new(PlaceOrderRequest::market("BTCUSDT", OrderSide::Buy, 1.0));

        assert!(MaxPositionSize.review(&small, 30_000.0, &config).is_ok());
        let reason = MaxPositionSize.review(&large, 30_000.0, &config).unwrap_err();
        assert!(reason.contains("exceeds max position size"));
    }

    #[test]
    fn test_closure_risk_check() {
        let only_btc = |order: &Order, _: f64, _: &BotConfig| {
            if order.symbol == "BTCUSDT" {
                Ok(())
            } else {
                Err(format!("{} not allowed", order.symbol))
            }
        };
        let eth = Order::new(PlaceOrderRequest::market("ETHUSDT", OrderSide::Buy, 1.0));
        assert_eq!(
            only_btc.review(&eth, 0.0, &BotConfig::default()),
            Err("ETHUSDT not allowed".to_string())
        );
    }
}
