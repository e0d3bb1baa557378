//! Holder of the bot configuration.

use crate::types::{BotConfig, BotConfigUpdate};
use std::sync::Arc;

/// Single mutable bot configuration record.
#[derive(Debug, Clone, Default)]
pub struct ConfigStore {
    config: Arc<BotConfig>,
}

impl ConfigStore {
    pub fn new(config: BotConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Merge the supplied fields into the current config.
    pub fn update(&mut self, update: &BotConfigUpdate) -> BotConfig {
        let config = Arc::make_mut(&mut self.config);
        update.apply_to(config);
        config.clone()
    }

    /// Flip the enabled flag, returning the previous state.
    pub fn toggle(&mut self) -> bool {
        let config = Arc::make_mut(&mut self.config);
        let previous = config.enabled;
        config.enabled = !previous;
        previous
    }

    pub fn config(&self) -> Arc<BotConfig> {
        self.config.clone()
    }
}
