use std::fmt::Write as _;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::search::SearchQuery;
use crate::error::Result;
use crate::ports::dbl_api::DblApi;

/// Query the Discord Bot List API from the command line.
#[derive(Debug, Parser)]
#[command(name = "dblapi", version, about, long_about = None)]
pub struct Cli {
    /// YAML config file (defaults to `dblapi.yaml` next to the binary or in
    /// the working directory)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// DBL API token
    #[arg(long, env = "DBL_TOKEN", hide_env_values = true)]
    pub token: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Show a listed bot
    Bot { bot_id: u64 },
    /// Show a bot's server and shard counts
    Stats { bot_id: u64 },
    /// Show a DBL user profile
    User { user_id: u64 },
    /// Search listed bots
    Search {
        text: String,
        /// Maximum number of results (at most 500)
        limit: Option<u32>,
    },
    /// Check whether a user voted for a bot
    Voted { bot_id: u64, user_id: u64 },
    /// List users that voted for a bot
    Voters { bot_id: u64 },
}

impl Command {
    /// The bot whose votes this command reads, if any.
    pub fn vote_bot_id(&self) -> Option<u64> {
        match self {
            Self::Voted { bot_id, .. } | Self::Voters { bot_id } => Some(*bot_id),
            _ => None,
        }
    }
}

pub async fn run(api: &dyn DblApi, command: &Command) -> Result<String> {
    let mut text = String::new();
    match command {
        Command::Bot { bot_id } => {
            let bot = api.get_bot(*bot_id).await?;
            let _ = writeln!(text, "{bot}");
            if !bot.tags.is_empty() {
                let _ = writeln!(text, "  Tags: {}", bot.tags.join(", "));
            }
            let _ = writeln!(text, "  Avatar: {}", bot.avatar);
        }
        Command::Stats { bot_id } => {
            let stats = api.get_bot_stats(*bot_id).await?;
            let _ = writeln!(text, "Bot {bot_id}: {stats}");
        }
        Command::User { user_id } => {
            let user = api.get_user(*user_id).await?;
            let _ = write!(text, "{} ({})", user.username_full(), user.id);
            if user.is_certified_dev {
                let _ = write!(text, " | Certified developer");
            }
            if user.is_supporter {
                let _ = write!(text, " | Supporter");
            }
            let _ = writeln!(text);
            if let Some(ref bio) = user.bio {
                let _ = writeln!(text, "  {bio}");
            }
        }
        Command::Search { text: search, limit } => {
            let mut query = SearchQuery::new(search.clone());
            if let Some(limit) = limit {
                query = query.limit(*limit);
            }
            let bots = api.search_bots(&query).await?;
            if bots.is_empty() {
                text.push_str("No bots found for this search.\n");
            } else {
                let _ = writeln!(text, "Found {} bots:\n", bots.len());
                for (i, bot) in bots.iter().enumerate() {
                    let _ = writeln!(text, "{}. {bot}\n", i + 1);
                }
            }
        }
        Command::Voted { bot_id, user_id } => {
            let voted = api.has_user_voted(*user_id).await?;
            let verdict = if voted { "has voted" } else { "has not voted" };
            let _ = writeln!(text, "User {user_id} {verdict} for bot {bot_id}");
        }
        Command::Voters { bot_id } => {
            let voters = api.voters().await?;
            let _ = writeln!(text, "{} voters for bot {bot_id}", voters.len());
            for id in voters {
                let _ = writeln!(text, "  {id}");
            }
        }
    }
    Ok(text)
}
