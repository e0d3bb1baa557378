//! Paperdesk - simulated trading dashboard core
//!
//! Owns order, market-data, log and bot-configuration state, drives orders
//! through their lifecycle on simulated timers, and publishes immutable
//! snapshots to whatever presentation layer subscribes.

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, Result};
pub use services::{Dashboard, ExecutionConfig, FeedConfig, OrderTicket, TradingError};
pub use types::*;
