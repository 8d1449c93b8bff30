use async_trait::async_trait;

use crate::domain::bot::DblBot;
use crate::domain::search::SearchQuery;
use crate::domain::stats::{DblStats, StatsUpdate};
use crate::domain::user::DblUser;
use crate::error::Result;

#[async_trait]
pub trait DblApi: Send + Sync {
    async fn search_bots(&self, query: &SearchQuery) -> Result<Vec<DblBot>>;
    async fn get_bot(&self, bot_id: u64) -> Result<DblBot>;
    async fn get_bot_stats(&self, bot_id: u64) -> Result<DblStats>;
    async fn get_user(&self, user_id: u64) -> Result<DblUser>;

    /// Whether `user_id` voted for this bot within the configured window.
    async fn has_user_voted(&self, user_id: u64) -> Result<bool>;

    /// IDs of every user that voted for this bot within the configured window.
    async fn voters(&self) -> Result<Vec<u64>>;

    async fn post_stats(&self, stats: &StatsUpdate) -> Result<()>;
}
