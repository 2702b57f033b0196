use serde::{Deserialize, Serialize};

use crate::client::aliases::DEFAULT_HISTORY_LIMIT;
use crate::client::journal::DEFAULT_JOURNAL_CAPACITY;

fn default_tick_interval() -> u64 {
    50
}

fn default_journal_capacity() -> usize {
    DEFAULT_JOURNAL_CAPACITY
}

fn default_alias_history_limit() -> usize {
    DEFAULT_HISTORY_LIMIT
}

fn default_find_distance() -> Option<u32> {
    Some(18)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Scheduler tick period in milliseconds (default: 50ms)
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,

    /// Journal entries retained before the oldest is evicted
    #[serde(default = "default_journal_capacity")]
    pub journal_capacity: usize,

    /// Previous holders remembered per alias
    #[serde(default = "default_alias_history_limit")]
    pub alias_history_limit: usize,

    /// Search range used when a query omits one; unset means unlimited
    #[serde(default = "default_find_distance")]
    pub find_distance: Option<u32>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval(),
            journal_capacity: default_journal_capacity(),
            alias_history_limit: default_alias_history_limit(),
            find_distance: default_find_distance(),
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.tick_interval_ms.max(1))
    }
}
