use paperdesk::{Config, Dashboard, LogLevel, OrderSide, PlaceOrderRequest};
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "paperdesk=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Starting paperdesk: submit {:?}, fill {:?}, symbols {:?}",
        config.execution.submit_latency, config.execution.fill_latency, config.feed.symbols
    );

    let dashboard = Dashboard::start(&config)?;
    dashboard.add_log(LogLevel::Info, "Dashboard started", None);

    // Headless observer: one summary line per published snapshot
    let mut updates = dashboard.subscribe();
    let observer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(snapshot) => {
                    let summary = snapshot.summary();
                    debug!(
                        "snapshot {}: {} orders ({} active), {} logs, balance {:.2}, bot {}",
                        snapshot.version,
                        snapshot.orders.len(),
                        summary.active_orders,
                        snapshot.logs.len(),
                        summary.total_balance,
                        if summary.bot_enabled { "on" } else { "off" },
                    );
                    if let Some(entry) = snapshot.logs.front() {
                        debug!("latest log [{}] {}", entry.level, entry.message);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Observer lagged, skipped {} snapshots", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    if config.demo {
        run_demo(&dashboard).await;
    }

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");

    dashboard.shutdown().await;
    observer.abort();

    Ok(())
}

/// Place a couple of sample orders so the feed and lifecycle are visible.
async fn run_demo(dashboard: &Dashboard) {
    let Some(first) = dashboard.market_data().first().cloned() else {
        return;
    };

    let limit = PlaceOrderRequest::limit(first.symbol.clone(), OrderSide::Buy, 0.5, first.price);
    match dashboard.place_order(limit) {
        Ok(ticket) => match ticket.await {
            Ok(order) => info!("Demo limit order {} is {}", order.id, order.status),
            Err(e) => error!("Demo limit order failed: {}", e),
        },
        Err(e) => error!("Demo limit order refused: {}", e),
    }

    let market = PlaceOrderRequest::market(first.symbol, OrderSide::Sell, 1.0);
    match dashboard.place_order(market) {
        Ok(ticket) => match ticket.await {
            Ok(order) => {
                if let Err(e) = dashboard.cancel_order(&order.id) {
                    warn!("Demo cancel failed: {}", e);
                }
            }
            Err(e) => error!("Demo market order failed: {}", e),
        },
        Err(e) => error!("Demo market order refused: {}", e),
    }

    dashboard.toggle_bot();
}
