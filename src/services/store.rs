//! Owned dashboard state with snapshot publishing.
//!
//! Every mutation runs inside one critical section that also builds and
//! broadcasts the resulting snapshot, so subscribers see snapshots in mutation
//! order and never observe a half-applied change.

use crate::services::config_store::ConfigStore;
use crate::services::log_store::LogStore;
use crate::services::market_feed::MarketFeed;
use crate::services::trading::OrderLedger;
use crate::types::{Balance, DashboardSnapshot, Position};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;

/// Mutable state behind the dashboard.
pub(crate) struct DashboardState {
    pub orders: OrderLedger,
    pub logs: LogStore,
    pub feed: MarketFeed,
    pub bot: ConfigStore,
    pub positions: Arc<Vec<Position>>,
    pub balances: Arc<Vec<Balance>>,
    latest: Arc<DashboardSnapshot>,
}

impl DashboardState {
    pub fn new(logs: LogStore, feed: MarketFeed, bot: ConfigStore) -> Self {
        let mut state = Self {
            orders: OrderLedger::default(),
            logs,
            feed,
            bot,
            positions: Arc::new(Vec::new()),
            balances: Arc::new(Balance::seed()),
            latest: Arc::new(DashboardSnapshot {
                version: 0,
                orders: Arc::default(),
                positions: Arc::default(),
                balances: Arc::default(),
                logs: Arc::default(),
                market_data: Arc::default(),
                bot_config: Arc::default(),
            }),
        };
        state.latest = Arc::new(state.build(0));
        state
    }

    fn build(&self, version: u64) -> DashboardSnapshot {
        DashboardSnapshot {
            version,
            orders: self.orders.orders(),
            positions: self.positions.clone(),
            balances: self.balances.clone(),
            logs: self.logs.entries(),
            market_data: self.feed.ticks(),
            bot_config: self.bot.config(),
        }
    }
}

/// Single owner of the dashboard state and its subscribers.
pub(crate) struct Store {
    state: Mutex<DashboardState>,
    tx: broadcast::Sender<Arc<DashboardSnapshot>>,
}

impl Store {
    pub fn new(state: DashboardState, channel_capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(channel_capacity.max(1));
        Self {
            state: Mutex::new(state),
            tx,
        }
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply a mutation and publish exactly one snapshot.
    pub fn mutate<R>(&self, f: impl FnOnce(&mut DashboardState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.publish(&mut state);
        result
    }

    /// Apply a mutation that may decline. A snapshot is published only on `Ok`;
    /// the closure must not touch the state before deciding to return `Err`.
    pub fn try_mutate<R, E>(
        &self,
        f: impl FnOnce(&mut DashboardState) -> Result<R, E>,
    ) -> Result<R, E> {
        let mut state = self.lock();
        let result = f(&mut state)?;
        self.publish(&mut state);
        Ok(result)
    }

    /// Read the state without publishing.
    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.lock())
    }

    fn publish(&self, state: &mut DashboardState) {
        let snapshot = Arc::new(state.build(state.latest.version + 1));
        state.latest = snapshot.clone();
        // No receivers is fine; the snapshot is still retained as latest.
        let _ = self.tx.send(snapshot);
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<DashboardSnapshot> {
        self.lock().latest.clone()
    }

    pub fn version(&self) -> u64 {
        self.lock().latest.version
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DashboardSnapshot>> {
        self.tx.subscribe()
    }
}
