use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::bot::DblBot;
use crate::domain::search::SearchQuery;
use crate::domain::stats::{DblStats, StatsUpdate};
use crate::domain::user::DblUser;
use crate::error::Result;
use crate::ports::bot_platform::{BotPlatform, ShardInfo};
use crate::ports::dbl_api::DblApi;

// ---------- Bot platform ----------

pub struct MockBotPlatform {
    user_id: u64,
    guilds: AtomicU64,
    shard: Option<ShardInfo>,
    ready: AtomicBool,
    ready_signal: Notify,
    closed: AtomicBool,
}

impl MockBotPlatform {
    pub fn ready(user_id: u64) -> Self {
        let platform = Self::pending(user_id);
        platform.ready.store(true, Ordering::SeqCst);
        platform
    }

    pub fn pending(user_id: u64) -> Self {
        Self {
            user_id,
            guilds: AtomicU64::new(0),
            shard: None,
            ready: AtomicBool::new(false),
            ready_signal: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn with_guilds(self, count: u64) -> Self {
        self.guilds.store(count, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub fn with_shard(mut self, shard: ShardInfo) -> Self {
        self.shard = Some(shard);
        self
    }

    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::SeqCst);
        self.ready_signal.notify_waiters();
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[async_trait]
impl BotPlatform for MockBotPlatform {
    async fn wait_until_ready(&self) {
        loop {
            let notified = self.ready_signal.notified();
            if self.ready.load(Ordering::SeqCst) {
                return;
            }
            notified.await;
        }
    }

    fn user_id(&self) -> Option<u64> {
        Some(self.user_id)
    }

    fn guild_count(&self) -> u64 {
        self.guilds.load(Ordering::SeqCst)
    }

    fn shard(&self) -> Option<ShardInfo> {
        self.shard
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

// ---------- DBL API ----------

type SearchFn = Box<dyn Fn(&SearchQuery) -> Result<Vec<DblBot>> + Send + Sync>;
type BotFn = Box<dyn Fn(u64) -> Result<DblBot> + Send + Sync>;
type StatsFn = Box<dyn Fn(u64) -> Result<DblStats> + Send + Sync>;
type UserFn = Box<dyn Fn(u64) -> Result<DblUser> + Send + Sync>;
type VotersFn = Box<dyn Fn() -> Result<Vec<u64>> + Send + Sync>;

#[allow(clippy::struct_field_names)]
pub struct MockDblApi {
    search_fn: Mutex<SearchFn>,
    bot_fn: Mutex<BotFn>,
    stats_fn: Mutex<StatsFn>,
    user_fn: Mutex<UserFn>,
    voters_fn: Mutex<VotersFn>,
}

impl Default for MockDblApi {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDblApi {
    pub fn new() -> Self {
        Self {
            search_fn: Mutex::new(Box::new(|_| Ok(vec![]))),
            bot_fn: Mutex::new(Box::new(|id| make_bot(id, "TestBot"))),
            stats_fn: Mutex::new(Box::new(|_| Ok(DblStats::default()))),
            user_fn: Mutex::new(Box::new(|id| make_user(id, "TestUser"))),
            voters_fn: Mutex::new(Box::new(|| Ok(vec![]))),
        }
    }

    #[must_use]
    pub fn with_search(
        self,
        f: impl Fn(&SearchQuery) -> Result<Vec<DblBot>> + Send + Sync + 'static,
    ) -> Self {
        *self.search_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_bot(self, f: impl Fn(u64) -> Result<DblBot> + Send + Sync + 'static) -> Self {
        *self.bot_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_stats(self, f: impl Fn(u64) -> Result<DblStats> + Send + Sync + 'static) -> Self {
        *self.stats_fn.lock().unwrap() = Box::new(f);
        self
    }

    #[must_use]
    pub fn with_voters(self, f: impl Fn() -> Result<Vec<u64>> + Send + Sync + 'static) -> Self {
        *self.voters_fn.lock().unwrap() = Box::new(f);
        self
    }
}

#[async_trait]
impl DblApi for MockDblApi {
    async fn search_bots(&self, query: &SearchQuery) -> Result<Vec<DblBot>> {
        let f = self.search_fn.lock().unwrap();
        f(query)
    }

    async fn get_bot(&self, bot_id: u64) -> Result<DblBot> {
        let f = self.bot_fn.lock().unwrap();
        f(bot_id)
    }

    async fn get_bot_stats(&self, bot_id: u64) -> Result<DblStats> {
        let f = self.stats_fn.lock().unwrap();
        f(bot_id)
    }

    async fn get_user(&self, user_id: u64) -> Result<DblUser> {
        let f = self.user_fn.lock().unwrap();
        f(user_id)
    }

    async fn has_user_voted(&self, user_id: u64) -> Result<bool> {
        let voters = {
            let f = self.voters_fn.lock().unwrap();
            f()?
        };
        Ok(voters.contains(&user_id))
    }

    async fn voters(&self) -> Result<Vec<u64>> {
        let f = self.voters_fn.lock().unwrap();
        f()
    }

    async fn post_stats(&self, _stats: &StatsUpdate) -> Result<()> {
        Ok(())
    }
}

// ---------- Fixtures ----------

pub fn bot_json(id: &str, username: &str) -> serde_json::Value {
    serde_json::json!({
        "id": id,
        "username": username,
        "discriminator": "1375",
        "avatar": "custom_hash",
        "defAvatar": "default_hash",
        "lib": "discord.py",
        "prefix": "?",
        "shortdesc": "A bot for testing",
        "longdesc": "Longer text",
        "tags": ["Fun", "Utility"],
        "owners": ["129908908096487424"],
        "date": "2017-04-26T18:08:17.125Z",
        "certifiedBot": true,
        "points": 1024,
        "vanity": "luca",
        "support": "abcdef",
        "website": "https://example.com"
    })
}

pub fn make_bot(id: u64, username: &str) -> Result<DblBot> {
    DblBot::parse(&bot_json(&id.to_string(), username))
}

pub fn make_user(id: u64, username: &str) -> Result<DblUser> {
    DblUser::parse(&serde_json::json!({
        "id": id.to_string(),
        "username": username,
        "discriminator": "0001",
        "defAvatar": "def",
        "bio": "Writes bots"
    }))
}
