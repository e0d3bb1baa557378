//! Order, balance and position types for the simulated trading desk.

use serde::{Deserialize, Serialize};

/// Order side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderType {
    /// Execute at the current feed price
    Market,
    /// Execute at the specified price
    Limit,
    /// Limit order armed by a stop price
    StopLimit,
    /// One-cancels-the-other pair
    Oco,
    /// Time-weighted execution
    Twap,
    /// Grid ladder order
    Grid,
}

impl OrderType {
    /// Whether a limit price must accompany this order type.
    pub fn requires_price(&self) -> bool {
        !matches!(self, OrderType::Market)
    }

    /// Whether a stop price must accompany this order type.
    pub fn requires_stop_price(&self) -> bool {
        matches!(self, OrderType::StopLimit)
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderType::Market => write!(f, "MARKET"),
            OrderType::Limit => write!(f, "LIMIT"),
            OrderType::StopLimit => write!(f, "STOP_LIMIT"),
            OrderType::Oco => write!(f, "OCO"),
            OrderType::Twap => write!(f, "TWAP"),
            OrderType::Grid => write!(f, "GRID"),
        }
    }
}

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order accepted and waiting for execution
    New,
    /// Order is partially filled
    PartiallyFilled,
    /// Order is completely filled
    Filled,
    /// Order was cancelled
    Canceled,
    /// Order was rejected
    Rejected,
}

impl OrderStatus {
    /// Open orders can still be filled or cancelled.
    pub fn is_open(&self) -> bool {
        matches!(self, OrderStatus::New | OrderStatus::PartiallyFilled)
    }

    pub fn is_terminal(&self) -> bool {
        !self.is_open()
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::PartiallyFilled => write!(f, "PARTIALLY_FILLED"),
            OrderStatus::Filled => write!(f, "FILLED"),
            OrderStatus::Canceled => write!(f, "CANCELED"),
            OrderStatus::Rejected => write!(f, "REJECTED"),
        }
    }
}

/// Request to place an order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<f64>,
}

impl PlaceOrderRequest {
    /// Create a market order request.
    pub fn market(symbol: impl Into<String>, side: OrderSide, quantity: f64) -> Self {
        Self {
            symbol: symbol.into(),
            side,
            order_type: OrderType::Market,
            quantity,
            price: None,
            stop_price: None,
        }
    }

    /// Create a limit order request.
    pub fn limit(symbol: impl Into<String>, side: OrderSide, quantity: f64, price: f64) -> Self {
        let mut request = Self::market(symbol, side, quantity);
        request.order_type = OrderType::Limit;
        request.price = Some(price);
        request
    }

    /// Create a stop-limit order request.
    pub fn stop_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: f64,
        price: f64,
        stop_price: f64,
    ) -> Self {
        let mut request = Self::limit(symbol, side, quantity, price);
        request.order_type = OrderType::StopLimit;
        request.stop_price = Some(stop_price);
        request
    }

    /// Check the request shape, returning a human readable reason on failure.
    pub fn validate(&self) -> Result<(), String> {
        if self.symbol.trim().is_empty() {
            return Err("Symbol must not be empty".to_string());
        }

        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err(format!("Quantity must be positive, got {}", self.quantity));
        }

        if self.order_type.requires_price() {
            match self.price {
                Some(p) if p.is_finite() && p > 0.0 => {}
                Some(p) => return Err(format!("{} order price must be positive, got {}", self.order_type, p)),
                None => return Err(format!("{} order requires price", self.order_type)),
            }
        }

        if self.order_type.requires_stop_price() {
            match self.stop_price {
                Some(p) if p.is_finite() && p > 0.0 => {}
                Some(p) => return Err(format!("Stop price must be positive, got {}", p)),
                None => return Err(format!("{} order requires stop_price", self.order_type)),
            }
        }

        Ok(())
    }
}

/// A simulated order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub symbol: String,
    pub side: OrderSide,
    #[serde(rename = "type")]
    pub order_type: OrderType,
    pub quantity: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_price: Option<f64>,
    pub status: OrderStatus,
    /// Creation time (Unix millis)
    pub timestamp: i64,
    pub executed_qty: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub executed_price: Option<f64>,
}

impl Order {
    /// Create a NEW order from a request.
    pub fn new(request: PlaceOrderRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            symbol: request.symbol,
            side: request.side,
            order_type: request.order_type,
            quantity: request.quantity,
            price: request.price,
            stop_price: request.stop_price,
            status: OrderStatus::New,
            timestamp: chrono::Utc::now().timestamp_millis(),
            executed_qty: 0.0,
            executed_price: None,
        }
    }

    /// Fill the whole order. The limit price wins over `market_price`.
    ///
    /// Returns false and leaves the order untouched when it is no longer open.
    pub fn fill(&mut self, market_price: f64) -> bool {
        if !self.status.is_open() {
            return false;
        }
        self.status = OrderStatus::Filled;
        self.executed_qty = self.quantity;
        self.executed_price = Some(self.price.unwrap_or(market_price));
        true
    }

    /// Cancel the order. Terminal orders are only overwritten when `force` is set.
    pub fn cancel(&mut self, force: bool) -> bool {
        if !force && !self.status.is_open() {
            return false;
        }
        self.status = OrderStatus::Canceled;
        true
    }

    /// Mark a freshly submitted order as rejected.
    pub fn reject(&mut self) -> bool {
        if self.status != OrderStatus::New {
            return false;
        }
        self.status = OrderStatus::Rejected;
        true
    }

    /// Notional value at the given reference price (limit price preferred).
    pub fn notional(&self, reference_price: f64) -> f64 {
        self.quantity * self.price.unwrap_or(reference_price)
    }
}

/// Position side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionSide {
    Long,
    Short,
}

/// An open position. Read surface only; fills never create positions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub symbol: String,
    pub side: PositionSide,
    pub size: f64,
    pub entry_price: f64,
    pub mark_price: f64,
    pub pnl: f64,
    pub pnl_percent: f64,
    pub margin: f64,
}

/// Asset balance. Read surface only; fills never move balances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Balance {
    pub asset: String,
    pub balance: f64,
    pub available_balance: f64,
}

impl Balance {
    pub fn new(asset: impl Into<String>, balance: f64) -> Self {
        Self {
            asset: asset.into(),
            balance,
            available_balance: balance,
        }
    }

    /// Starting balances shown before any trading.
    pub fn seed() -> Vec<Balance> {
        vec![
            Balance::new("USDT", 10_000.0),
            Balance::new("BTC", 0.0),
            Balance::new("ETH", 0.0),
        ]
    }
}
