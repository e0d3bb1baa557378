pub mod config_store;
pub mod dashboard;
pub mod log_store;
pub mod market_feed;
pub(crate) mod store;
pub mod trading;

pub use config_store::ConfigStore;
pub use dashboard::Dashboard;
pub use log_store::{LogStore, DEFAULT_LOG_CAPACITY};
pub use market_feed::{FeedConfig, MarketFeed, DEFAULT_SYMBOLS};
pub use trading::{
    ExecutionConfig, MaxPositionSize, OrderLedger, OrderTicket, RiskCheck, TradingError,
};
