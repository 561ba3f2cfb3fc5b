use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings shared by the CLI and any embedding scheduler.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// How many times a lost optimistic-concurrency race is retried before giving up.
    #[serde(default = "Config::default_max_conflict_retries")]
    pub max_conflict_retries: u32,
    /// Timezone given to schedules created without one.
    #[serde(default = "Config::default_timezone_value")]
    pub default_timezone: String,
    /// `tracing` filter directive applied on top of `RUST_LOG`.
    #[serde(default = "Config::default_log_directive")]
    pub log_directive: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    /// Optional default state file used when a command omits one.
    pub state_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_conflict_retries: Self::default_max_conflict_retries(),
            default_timezone: Self::default_timezone_value(),
            log_directive: Self::default_log_directive(),
            state_path: None,
        }
    }
}

impl Config {
    fn default_max_conflict_retries() -> u32 {
        3
    }

    fn default_timezone_value() -> String {
        "UTC".into()
    }

    fn default_log_directive() -> String {
        "campaign_pacing=info,pacing_core=info".into()
    }
}
