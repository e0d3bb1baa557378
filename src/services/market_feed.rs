//! Synthetic market data feed.
//!
//! Seeds a fixed symbol set with random tickers and perturbs every ticker with a
//! bounded random walk on each tick. Each tick replaces the whole ticker set.

use crate::services::store::Store;
use crate::types::MarketTick;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Symbols tracked when none are configured.
pub const DEFAULT_SYMBOLS: [&str; 5] = ["BTCUSDT", "ETHUSDT", "BNBUSDT", "ADAUSDT", "SOLUSDT"];

/// Lowest price the random walk may reach.
const PRICE_FLOOR: f64 = 0.01;

/// Configuration for the synthetic feed.
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Symbols to track (fixed for the feed lifetime)
    pub symbols: Vec<String>,
    /// Time between ticks
    pub tick_interval: Duration,
    /// Seed for a reproducible walk
    pub seed: Option<u64>,
    /// Max absolute price move per tick
    pub price_step: f64,
    /// Max absolute 24h change move per tick
    pub change_step: f64,
    /// Max absolute 24h percent move per tick
    pub percent_step: f64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            tick_interval: Duration::from_millis(2000),
            seed: None,
            price_step: 50.0,
            change_step: 5.0,
            percent_step: 0.25,
        }
    }
}

/// Random-walk ticker generator.
#[derive(Debug)]
pub struct MarketFeed {
    rng: StdRng,
    ticks: Arc<Vec<MarketTick>>,
    price_step: f64,
    change_step: f64,
    percent_step: f64,
}

impl MarketFeed {
    /// Seed a ticker for every configured symbol.
    pub fn new(config: &FeedConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let ticks = config
            .symbols
            .iter()
            .map(|symbol| MarketTick {
                symbol: symbol.clone(),
                price: rng.gen_range(1_000.0..51_000.0),
                change_24h: rng.gen_range(-500.0..500.0),
                change_24h_percent: rng.gen_range(-10.0..10.0),
                volume: rng.gen_range(0.0..1_000_000.0),
                high_24h: rng.gen_range(1_000.0..56_000.0),
                low_24h: rng.gen_range(1_000.0..46_000.0),
            })
            .collect();

        Self {
            rng,
            ticks: Arc::new(ticks),
            price_step: config.price_step,
            change_step: config.change_step,
            percent_step: config.percent_step,
        }
    }

    /// Produce the next ticker set.
    pub fn advance(&mut self) -> Arc<Vec<MarketTick>> {
        let rng = &mut self.rng;
        let (price_step, change_step, percent_step) =
            (self.price_step, self.change_step, self.percent_step);

        let next: Vec<MarketTick> = self
            .ticks
            .iter()
            .map(|tick| {
                let price = (tick.price + walk(rng, price_step)).max(PRICE_FLOOR);
                MarketTick {
                    price,
                    change_24h: tick.change_24h + walk(rng, change_step),
                    change_24h_percent: tick.change_24h_percent + walk(rng, percent_step),
                    high_24h: tick.high_24h.max(price),
                    low_24h: tick.low_24h.min(price),
                    ..tick.clone()
                }
            })
            .collect();

        self.ticks = Arc::new(next);
        self.ticks.clone()
    }

    pub fn ticks(&self) -> Arc<Vec<MarketTick>> {
        self.ticks.clone()
    }

    /// Last price for a symbol, if tracked.
    pub fn price_of(&self, symbol: &str) -> Option<f64> {
        self.ticks
            .iter()
            .find(|t| t.symbol == symbol)
            .map(|t| t.price)
    }
}

/// Uniform step in [-step, step).
fn walk(rng: &mut StdRng, step: f64) -> f64 {
    if step <= 0.0 {
        return 0.0;
    }
    rng.gen_range(-step..step)
}

/// Tick the feed held by `store` until a shutdown signal arrives.
pub(crate) async fn run_feed(
    store: Arc<Store>,
    tick_interval: Duration,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    info!("Market feed started, tick interval {:?}", tick_interval);

    let mut ticker = interval_at(Instant::now() + tick_interval, tick_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                store.mutate(|state| {
                    state.feed.advance();
                });
                debug!("Market feed tick published (snapshot {})", store.version());
            }
            _ = shutdown_rx.recv() => {
                info!("Market feed received shutdown signal");
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded(seed: u64) -> FeedConfig {
        FeedConfig {
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_seeds_every_symbol() {
        let feed = MarketFeed::new(&seeded(7));
        let ticks = feed.ticks();

        assert_eq!(ticks.len(), DEFAULT_SYMBOLS.len());
        for (tick, symbol) in ticks.iter().zip(DEFAULT_SYMBOLS) {
            assert_eq!(tick.symbol, symbol);
            assert!((1_000.0..51_000.0).contains(&tick.price));
            assert!((0.0..1_000_000.0).contains(&tick.volume));
        }
    }

    #[test]
    fn test_same_seed_same_walk() {
        let mut a = MarketFeed::new(&seeded(42));
        let mut b = MarketFeed::new(&seeded(42));

        for _ in 0..50 {
            assert_eq!(a.advance(), b.advance());
        }
    }

    #[test]
    fn test_every_tick_covers_every_symbol() {
        let mut feed = MarketFeed::new(&seeded(3));
        for _ in 0..20 {
            let ticks = feed.advance();
            let symbols: Vec<&str> = ticks.iter().map(|t| t.symbol.as_str()).collect();
            assert_eq!(symbols, DEFAULT_SYMBOLS);
        }
    }

    #[test]
    fn test_step_is_bounded() {
        let mut feed = MarketFeed::new(&seeded(11));
        let before = feed.ticks();
        let after = feed.advance();

        for (old, new) in before.iter().zip(after.iter()) {
            assert!((new.price - old.price).abs() <= 50.0);
            assert!((new.change_24h - old.change_24h).abs() <= 5.0);
            assert!((new.change_24h_percent - old.change_24h_percent).abs() <= 0.25);
            assert_eq!(new.volume, old.volume);
        }
    }

    #[test]
    fn test_price_stays_positive_and_finite() {
        let config = FeedConfig {
            symbols: vec!["DUSTUSDT".to_string()],
            seed: Some(99),
            price_step: 5_000.0,
            ..Default::default()
        };
        let mut feed = MarketFeed::new(&config);

        for _ in 0..100_000 {
            feed.advance();
        }

        let price = feed.price_of("DUSTUSDT").unwrap();
        assert!(price.is_finite());
        assert!(price > 0.0);
    }

    #[test]
    fn test_previous_snapshot_is_untouched() {
        let mut feed = MarketFeed::new(&seeded(5));
        let before = feed.ticks();
        let copy = (*before).clone();

        feed.advance();

        assert_eq!(*before, copy);
        assert!(feed.price_of("UNKNOWN").is_none());
    }
}
