//! Background tasks that follow the bot's lifecycle: resolving the bot's own
//! user ID once it is ready, and posting its server count to DBL.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::adapters::client::ApiHandle;
use crate::domain::stats::StatsUpdate;
use crate::ports::bot_platform::BotPlatform;

/// Waits for the bot to become ready and records its user ID.
pub(crate) fn spawn_bot_id_resolver(
    api: Arc<ApiHandle>,
    platform: Arc<dyn BotPlatform>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        platform.wait_until_ready().await;
        resolve_bot_id(&api, platform.as_ref());
    })
}

/// Posts the bot's statistics every `interval` until the platform reports
/// closed. Failed posts are logged and retried on the next tick.
pub(crate) fn spawn_stats_poster(
    api: Arc<ApiHandle>,
    platform: Arc<dyn BotPlatform>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        platform.wait_until_ready().await;
        resolve_bot_id(&api, platform.as_ref());

        info!(
            interval_secs = interval.as_secs(),
            "Starting stats poster"
        );

        while !platform.is_closed() {
            let update = stats_update(platform.as_ref());
            info!(
                server_count = update.server_count,
                "Posting bot statistics to DBL"
            );
            if let Err(e) = api.post_stats(&update).await {
                error!(error = %e, "Failed to post bot statistics");
            }
            tokio::time::sleep(interval).await;
        }

        debug!("Bot closed, stats poster stopped");
    })
}

pub fn stats_update(platform: &dyn BotPlatform) -> StatsUpdate {
    let shard = platform.shard();
    StatsUpdate {
        server_count: platform.guild_count(),
        shard_count: shard.map(|s| s.shard_count),
        shard_id: shard.map(|s| s.shard_id),
    }
}

fn resolve_bot_id(api: &ApiHandle, platform: &dyn BotPlatform) {
    if api.bot_id().is_some() {
        return;
    }
    match platform.user_id() {
        Some(id) => {
            api.set_bot_id(id);
            debug!(bot_id = id, "Got bot user ID");
        }
        None => warn!("Bot reported ready without a user ID"),
    }
}
