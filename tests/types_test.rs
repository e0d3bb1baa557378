//! Unit tests for types module

use paperdesk::types::*;
use serde_json::json;

#[test]
fn test_enum_display() {
    assert_eq!(format!("{}", OrderSide::Buy), "BUY");
    assert_eq!(format!("{}", OrderType::StopLimit), "STOP_LIMIT");
    assert_eq!(format!("{}", OrderStatus::PartiallyFilled), "PARTIALLY_FILLED");
    assert_eq!(format!("{}", OrderStatus::Canceled), "CANCELED");
    assert_eq!(format!("{}", LogLevel::Success), "SUCCESS");
}

#[test]
fn test_enum_serialization() {
    assert_eq!(serde_json::to_string(&OrderSide::Sell).unwrap(), "\"SELL\"");
    assert_eq!(serde_json::to_string(&OrderType::Twap).unwrap(), "\"TWAP\"");
    assert_eq!(serde_json::to_string(&BotStrategy::MeanReversion).unwrap(), "\"MEAN_REVERSION\"");
    assert_eq!(serde_json::to_string(&RiskLevel::Medium).unwrap(), "\"MEDIUM\"");
    assert_eq!(serde_json::to_string(&LogLevel::Warning).unwrap(), "\"WARNING\"");

    let parsed: OrderType = serde_json::from_str("\"OCO\"").unwrap();
    assert_eq!(parsed, OrderType::Oco);
}

#[test]
fn test_order_json_shape() {
    let order = Order::new(PlaceOrderRequest::limit("BTCUSDT", OrderSide::Buy, 0.5, 30_000.0));
    let value = serde_json::to_value(&order).unwrap();

    assert_eq!(value["symbol"], "BTCUSDT");
    assert_eq!(value["side"], "BUY");
    assert_eq!(value["type"], "LIMIT");
    assert_eq!(value["status"], "NEW");
    assert_eq!(value["quantity"], 0.5);
    assert_eq!(value["price"], 30_000.0);
    assert_eq!(value["executedQty"], 0.0);
    assert!(value.get("executedPrice").is_none());
    assert!(value.get("stopPrice").is_none());
    assert!(value["timestamp"].as_i64().unwrap() > 0);
}

#[test]
fn test_request_from_json() {
    let request: PlaceOrderRequest = serde_json::from_value(json!({
        "symbol": "BTCUSDT",
        "side": "SELL",
        "type": "STOP_LIMIT",
        "quantity": 2.0,
        "price": 29_000.0,
        "stopPrice": 29_500.0
    }))
    .unwrap();

    assert_eq!(request, PlaceOrderRequest::stop_limit("BTCUSDT", OrderSide::Sell, 2.0, 29_000.0, 29_500.0));
    assert!(request.validate().is_ok());
}

#[test]
fn test_market_tick_field_names() {
    let tick = MarketTick {
        symbol: "ETHUSDT".to_string(),
        price: 2_000.0,
        change_24h: -12.5,
        change_24h_percent: -0.6,
        volume: 1_234.0,
        high_24h: 2_100.0,
        low_24h: 1_950.0,
    };
    let value = serde_json::to_value(&tick).unwrap();

    assert_eq!(value["change24h"], -12.5);
    assert_eq!(value["change24hPercent"], -0.6);
    assert_eq!(value["high24h"], 2_100.0);
    assert_eq!(value["low24h"], 1_950.0);
}

#[test]
fn test_bot_config_defaults() {
    let config = BotConfig::default();
    let value = serde_json::to_value(&config).unwrap();

    assert_eq!(
        value,
        json!({
            "enabled": false,
            "strategy": "GRID",
            "symbols": ["BTCUSDT", "ETHUSDT"],
            "riskLevel": "LOW",
            "maxPositionSize": 1000.0,
            "stopLoss": 5.0,
            "takeProfit": 10.0
        })
    );
}

#[test]
fn test_bot_config_update_from_partial_json() {
    let update: BotConfigUpdate = serde_json::from_value(json!({ "riskLevel": "HIGH" })).unwrap();
    let mut config = BotConfig::default();
    update.apply_to(&mut config);

    assert_eq!(config.risk_level, RiskLevel::High);
    assert_eq!(config.strategy, BotStrategy::Grid);
}

#[test]
fn test_log_entry_ids_are_unique() {
    let a = LogEntry::new(LogLevel::Info, "a", None);
    let b = LogEntry::new(LogLevel::Info, "b", None);
    assert_ne!(a.id, b.id);

    let value = serde_json::to_value(&a).unwrap();
    assert!(value.get("details").is_none());
}

#[test]
fn test_snapshot_summary() {
    use std::sync::Arc;

    let mut filled = Order::new(PlaceOrderRequest::market("BTCUSDT", OrderSide::Buy, 1.0));
    filled.fill(30_000.0);
    let open = Order::new(PlaceOrderRequest::market("ETHUSDT", OrderSide::Sell, 1.0));

    let snapshot = DashboardSnapshot {
        version: 4,
        orders: Arc::new(vec![open.clone(), filled]),
        positions: Arc::new(vec![Position {
            symbol: "BTCUSDT".to_string(),
            side: PositionSide::Long,
            size: 1.0,
            entry_price: 30_000.0,
            mark_price: 30_500.0,
            pnl: 500.0,
            pnl_percent: 1.67,
            margin: 30_000.0,
        }]),
        balances: Arc::new(Balance::seed()),
        logs: Arc::default(),
        market_data: Arc::default(),
        bot_config: Arc::new(BotConfig::default()),
    };

    let summary = snapshot.summary();
    assert_eq!(summary.total_balance, 10_000.0);
    assert_eq!(summary.total_pnl, 500.0);
    assert!((summary.total_pnl_percent - 5.0).abs() < 1e-9);
    assert_eq!(summary.active_orders, 1);
    assert!(!summary.bot_enabled);
    assert_eq!(snapshot.order(&open.id).map(|o| o.status), Some(OrderStatus::New));
    assert_eq!(snapshot.price_of("BTCUSDT"), None);
}
