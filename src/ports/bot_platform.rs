use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShardInfo {
    pub shard_id: u64,
    pub shard_count: u64,
}

/// The Discord bot the client reports for. Implemented by the embedding
/// bot framework.
#[async_trait]
pub trait BotPlatform: Send + Sync {
    /// Resolves once the bot is connected and its user is known.
    async fn wait_until_ready(&self);

    fn user_id(&self) -> Option<u64>;

    fn guild_count(&self) -> u64;

    /// `None` for unsharded bots.
    fn shard(&self) -> Option<ShardInfo> {
        None
    }

    fn is_closed(&self) -> bool;
}
