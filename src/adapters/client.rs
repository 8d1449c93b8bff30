use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::adapters::http::DblHttp;
use crate::adapters::router::Router;
use crate::cache::{ExpiringCache, ExpiringList, RefreshArgs};
use crate::config::types::Config;
use crate::domain::bot::DblBot;
use crate::domain::search::SearchQuery;
use crate::domain::stats::{DblStats, StatsUpdate};
use crate::domain::user::DblUser;
use crate::error::{DblError, Result};
use crate::ports::bot_platform::BotPlatform;
use crate::ports::dbl_api::DblApi;
use crate::tasks::stats;

/// Shared handle to the DBL API: transport, routes and the bot's own ID.
/// Owned by [`DblClient`] and handed to the vote cache refresh and the
/// background tasks.
pub struct ApiHandle {
    http: DblHttp,
    router: Router,
    bot_id: OnceLock<u64>,
}

impl ApiHandle {
    pub fn bot_id(&self) -> Option<u64> {
        self.bot_id.get().copied()
    }

    pub fn set_bot_id(&self, id: u64) {
        if let Err(new_id) = self.bot_id.set(id)
            && self.bot_id() != Some(new_id)
        {
            warn!(
                current = ?self.bot_id(),
                ignored = new_id,
                "Bot user ID already set, ignoring new value"
            );
        }
    }

    pub async fn post_stats(&self, update: &StatsUpdate) -> Result<()> {
        let bot_id = self.bot_id().ok_or(DblError::BotNotReady)?;
        let url = self.router.bot_upload_stats.format_url(&[bot_id]);
        let response = self.http.post_json(&url, update).await?;
        debug!(?response, "Stats posted");
        Ok(())
    }
}

/// Client for the Discord Bot List API.
///
/// Vote lookups go through an expiring cache of voter IDs, so repeated
/// `has_user_voted` calls hit the network at most once per TTL window.
pub struct DblClient {
    api: Arc<ApiHandle>,
    votes: ExpiringList<String, Arc<ApiHandle>>,
    config: Config,
    tasks: Mutex<Vec<JoinHandle<()>>>,
}

impl DblClient {
    pub fn new(token: &str, config: Config) -> Result<Self> {
        config.validate()?;
        let http = DblHttp::new(token, &config.api)?;
        let router = Router::new(&config.api.base_url)?;
        let api = Arc::new(ApiHandle {
            http,
            router,
            bot_id: OnceLock::new(),
        });

        let votes = ExpiringCache::new(Arc::clone(&api), fetch_voters)
            .with_ttl(Duration::from_secs(config.cache.vote_ttl_secs))
            .with_refresh_arg("days", config.cache.vote_days.to_string());

        Ok(Self {
            api,
            votes,
            config,
            tasks: Mutex::new(Vec::new()),
        })
    }

    /// For bots whose ID is known up front, instead of waiting for
    /// [`start`](Self::start) to resolve it.
    #[must_use]
    pub fn with_bot_id(self, bot_id: u64) -> Self {
        self.api.set_bot_id(bot_id);
        self
    }

    pub fn bot_id(&self) -> Option<u64> {
        self.api.bot_id()
    }

    pub fn vote_cache(&self) -> &ExpiringList<String, Arc<ApiHandle>> {
        &self.votes
    }

    /// Spawns the bot ID resolver and, unless disabled, the periodic stats
    /// poster. Must be called from within a tokio runtime.
    pub fn start(&self, platform: Arc<dyn BotPlatform>) {
        let mut tasks = self.lock_tasks();
        tasks.push(stats::spawn_bot_id_resolver(
            Arc::clone(&self.api),
            Arc::clone(&platform),
        ));
        if self.config.stats.enabled {
            tasks.push(stats::spawn_stats_poster(
                Arc::clone(&self.api),
                platform,
                Duration::from_secs(self.config.stats.interval_secs),
            ));
        } else {
            info!("Stats posting disabled");
        }
    }

    /// Aborts the background tasks started by [`start`](Self::start).
    pub fn shutdown(&self) {
        let tasks: Vec<_> = self.lock_tasks().drain(..).collect();
        if !tasks.is_empty() {
            debug!(count = tasks.len(), "Stopping background tasks");
        }
        for task in tasks {
            task.abort();
        }
    }

    /// Records a vote delivered out of band (e.g. by a webhook) without
    /// waiting for the next refresh.
    pub async fn record_vote(&self, user_id: u64) -> Result<()> {
        let id = user_id.to_string();
        if self.votes.contains(id.as_str()).await? {
            return Ok(());
        }
        self.votes.append(id).await
    }

    pub fn widget_url(&self, bot_id: u64) -> String {
        self.api.router.widget_get.format_url(&[bot_id])
    }

    pub fn owner_widget_url(&self, user_id: u64) -> String {
        self.api.router.widget_owner.format_url(&[user_id])
    }

    fn lock_tasks(&self) -> std::sync::MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for DblClient {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[async_trait]
impl DblApi for DblClient {
    async fn search_bots(&self, query: &SearchQuery) -> Result<Vec<DblBot>> {
        query.validate()?;
        let url = self.api.router.bot_search.url()?;
        let json = self.api.http.get_json(url, &query.to_query()).await?;
        let results = json
            .get("results")
            .and_then(serde_json::Value::as_array)
            .ok_or_else(|| DblError::WeirdResponse {
                reason: "search response has no results array".into(),
            })?;
        results.iter().map(DblBot::parse).collect()
    }

    async fn get_bot(&self, bot_id: u64) -> Result<DblBot> {
        let url = self.api.router.bot_get.format_url(&[bot_id]);
        let json = self.api.http.get_json(&url, &[]).await?;
        DblBot::parse(&json)
    }

    async fn get_bot_stats(&self, bot_id: u64) -> Result<DblStats> {
        let url = self.api.router.bot_stats.format_url(&[bot_id]);
        let json = self.api.http.get_json(&url, &[]).await?;
        serde_json::from_value(json).map_err(|e| DblError::WeirdResponse {
            reason: format!("stats object: {e}"),
        })
    }

    async fn get_user(&self, user_id: u64) -> Result<DblUser> {
        let url = self.api.router.user_get.format_url(&[user_id]);
        let json = self.api.http.get_json(&url, &[]).await?;
        DblUser::parse(&json)
    }

    async fn has_user_voted(&self, user_id: u64) -> Result<bool> {
        self.votes.contains(user_id.to_string().as_str()).await
    }

    async fn voters(&self) -> Result<Vec<u64>> {
        let ids = self.votes.get().await?;
        Ok(ids
            .iter()
            .filter_map(|id| {
                id.parse::<u64>()
                    .inspect_err(|_| warn!(id = %id, "Skipping non-numeric voter ID"))
                    .ok()
            })
            .collect())
    }

    async fn post_stats(&self, stats: &StatsUpdate) -> Result<()> {
        self.api.post_stats(stats).await
    }
}

/// Refresh callback of the vote cache: voter IDs of this bot over the last
/// `days` days.
async fn fetch_voters(api: Arc<ApiHandle>, args: Arc<RefreshArgs>) -> Result<Vec<String>> {
    let bot_id = api.bot_id().ok_or(DblError::BotNotReady)?;
    let url = api.router.bot_votes.format_url(&[bot_id]);
    let query: Vec<(&str, String)> = args
        .iter()
        .map(|(key, value)| (key.as_str(), value.clone()))
        .collect();
    let json = api.http.get_json(&url, &query).await?;
    parse_voter_ids(&json)
}

/// Accepts either an array of IDs or an array of user objects with an `id`.
pub fn parse_voter_ids(json: &serde_json::Value) -> Result<Vec<String>> {
    let entries = json.as_array().ok_or_else(|| DblError::WeirdResponse {
        reason: "votes response is not an array".into(),
    })?;

    entries
        .iter()
        .map(|entry| {
            let id = entry.get("id").unwrap_or(entry);
            match id {
                serde_json::Value::String(s) => Ok(s.clone()),
                serde_json::Value::Number(n) => Ok(n.to_string()),
                other => Err(DblError::WeirdResponse {
                    reason: format!("unexpected voter entry: {other}"),
                }),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client() -> DblClient {
        DblClient::new("token", Config::default()).unwrap()
    }

    #[test]
    fn parse_voter_ids_from_user_objects() {
        let json = serde_json::json!([
            {"id": "1", "username": "a", "discriminator": "0001"},
            {"id": "2", "username": "b", "discriminator": "0002"}
        ]);
        assert_eq!(parse_voter_ids(&json).unwrap(), vec!["1", "2"]);
    }

    #[test]
    fn parse_voter_ids_from_plain_ids() {
        let json = serde_json::json!(["10", 20]);
        assert_eq!(parse_voter_ids(&json).unwrap(), vec!["10", "20"]);
    }

    #[test]
    fn parse_voter_ids_rejects_non_array() {
        let json = serde_json::json!({"error": "nope"});
        assert!(matches!(
            parse_voter_ids(&json),
            Err(DblError::WeirdResponse { .. })
        ));
    }

    #[test]
    fn parse_voter_ids_rejects_bad_entry() {
        let json = serde_json::json!([{"id": null}]);
        assert!(parse_voter_ids(&json).is_err());
    }

    #[test]
    fn vote_cache_uses_configured_ttl_and_days() {
        let mut config = Config::default();
        config.cache.vote_ttl_secs = 60;
        config.cache.vote_days = 7;
        let client = DblClient::new("token", config).unwrap();
        assert_eq!(client.vote_cache().ttl(), Duration::from_secs(60));
        assert_eq!(
            client.vote_cache().refresh_args().get("days").map(String::as_str),
            Some("7")
        );
        assert!(client.vote_cache().is_stale());
    }

    #[test]
    fn zero_stats_interval_rejected() {
        let mut config = Config::default();
        config.stats.interval_secs = 0;
        let result = DblClient::new("token", config);
        assert!(matches!(result, Err(DblError::Config(_))));
    }

    #[test]
    fn widget_urls() {
        let client = client();
        assert_eq!(
            client.widget_url(42),
            "https://discordbots.org/api/widget/42.svg"
        );
        assert_eq!(
            client.owner_widget_url(7),
            "https://discordbots.org/api/widget/owner/7.svg"
        );
    }

    #[test]
    fn bot_id_set_once() {
        let client = client().with_bot_id(5);
        client.api.set_bot_id(6);
        assert_eq!(client.bot_id(), Some(5));
    }

    #[tokio::test]
    async fn vote_lookup_before_ready_fails() {
        let client = client();
        let err = client.has_user_voted(1).await.unwrap_err();
        assert!(matches!(err, DblError::BotNotReady));
        assert!(client.vote_cache().is_stale());
    }

    #[tokio::test]
    async fn post_stats_before_ready_fails() {
        let update = StatsUpdate {
            server_count: 1,
            shard_count: None,
            shard_id: None,
        };
        let err = client().post_stats(&update).await.unwrap_err();
        assert!(matches!(err, DblError::BotNotReady));
    }

    #[tokio::test]
    async fn record_vote_on_seeded_cache() {
        let client = client().with_bot_id(1);
        client.vote_cache().overwrite(vec!["3".to_string()]);

        client.record_vote(4).await.unwrap();
        client.record_vote(3).await.unwrap();

        assert!(client.has_user_voted(4).await.unwrap());
        assert_eq!(client.voters().await.unwrap(), vec![3, 4]);
    }

    #[tokio::test]
    async fn invalid_search_limit_rejected_locally() {
        let err = client()
            .search_bots(&SearchQuery::new("x").limit(1000))
            .await
            .unwrap_err();
        assert!(matches!(err, DblError::InvalidParams { .. }));
    }
}
