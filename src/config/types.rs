use serde::{Deserialize, Serialize};

use crate::error::{DblError, Result};

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub stats: StatsConfig,
}

impl Config {
    /// Rejects settings that would stall requests or spin the stats poster.
    pub fn validate(&self) -> Result<()> {
        if self.api.request_timeout_secs == 0 {
            return Err(DblError::Config(
                "api.request_timeout_secs must be greater than zero".into(),
            ));
        }
        if self.stats.interval_secs == 0 {
            return Err(DblError::Config(
                "stats.interval_secs must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_true")]
    pub verify_tls: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_timeout(),
            verify_tls: true,
        }
    }
}

/// Settings for the vote cache used by `has_user_voted`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_vote_ttl")]
    pub vote_ttl_secs: u64,
    #[serde(default = "default_vote_days")]
    pub vote_days: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            vote_ttl_secs: default_vote_ttl(),
            vote_days: default_vote_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_stats_interval")]
    pub interval_secs: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_stats_interval(),
        }
    }
}

fn default_base_url() -> String {
    crate::adapters::router::DEFAULT_BASE_URL.into()
}

fn default_user_agent() -> String {
    format!("dblapi-rs/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_vote_ttl() -> u64 {
    10
}

fn default_vote_days() -> u32 {
    31
}

fn default_stats_interval() -> u64 {
    300 // 5 minutes
}
