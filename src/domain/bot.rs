use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::avatar::Avatar;
use crate::domain::stats::DblStats;
use crate::error::{DblError, Result};
use crate::ports::dbl_api::DblApi;

const DBL_BOT_PAGE: &str = "https://discordbots.org/bot";
const DISCORD_INVITE: &str = "https://discord.gg";

/// Bot description. Displays as the short description; the long one is
/// optional on DBL and often blank.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Description {
    pub short: String,
    pub long: String,
}

impl fmt::Display for Description {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DblBot {
    pub id: u64,
    pub username: String,
    pub discriminator: String,
    pub avatar: Avatar,
    pub library: String,
    pub prefix: String,
    pub description: Description,
    pub tags: Vec<String>,
    pub owners: Vec<String>,
    pub approved_date: DateTime<Utc>,
    pub is_certified: bool,
    pub votes: u64,
    pub website: String,
    pub github: String,
    pub link: String,
    pub invite: String,
    pub support: String,
}

/// Bot object as returned by `bots` and `bots/{id}`.
#[derive(Debug, Deserialize)]
struct RawBot {
    id: String,
    username: String,
    discriminator: String,
    #[serde(rename = "defAvatar")]
    def_avatar: String,
    #[serde(default)]
    avatar: Option<String>,
    lib: String,
    prefix: String,
    shortdesc: String,
    #[serde(default, alias = "long_desc")]
    longdesc: Option<String>,
    tags: Vec<String>,
    owners: Vec<String>,
    date: DateTime<Utc>,
    #[serde(rename = "certifiedBot")]
    certified_bot: bool,
    points: u64,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    github: Option<String>,
    #[serde(default)]
    vanity: Option<String>,
    #[serde(default)]
    invite: Option<String>,
    #[serde(default)]
    support: Option<String>,
}

impl DblBot {
    /// Builds a bot from a DBL response, failing with
    /// [`DblError::WeirdResponse`] when required fields are missing.
    pub fn parse(value: &serde_json::Value) -> Result<Self> {
        let raw: RawBot =
            serde_json::from_value(value.clone()).map_err(|e| DblError::WeirdResponse {
                reason: format!("bot object: {e}"),
            })?;
        let id = parse_snowflake(&raw.id)?;

        let avatar_hash = raw
            .avatar
            .filter(|h| !h.is_empty())
            .unwrap_or(raw.def_avatar);
        let link_slug = raw
            .vanity
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| id.to_string());

        Ok(Self {
            id,
            avatar: Avatar::new(avatar_hash, id),
            username: raw.username,
            discriminator: raw.discriminator,
            library: raw.lib,
            prefix: raw.prefix,
            description: Description {
                short: raw.shortdesc,
                long: raw.longdesc.unwrap_or_default(),
            },
            tags: raw.tags,
            owners: raw.owners,
            approved_date: raw.date,
            is_certified: raw.certified_bot,
            votes: raw.points,
            website: raw.website.unwrap_or_default(),
            github: raw.github.unwrap_or_default(),
            link: format!("{DBL_BOT_PAGE}/{link_slug}"),
            invite: raw.invite.unwrap_or_default(),
            support: format!("{DISCORD_INVITE}/{}", raw.support.unwrap_or_default()),
        })
    }

    /// `Username#1234`
    pub fn username_full(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }

    pub fn mention(&self) -> String {
        format!("<@{}>", self.id)
    }

    /// Current server and shard counts of this bot.
    pub async fn stats(&self, api: &dyn DblApi) -> Result<DblStats> {
        api.get_bot_stats(self.id).await
    }
}

impl fmt::Display for DblBot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {} votes, prefix `{}`, {}",
            self.username_full(),
            self.id,
            self.votes,
            self.prefix,
            self.library
        )?;
        if self.is_certified {
            write!(f, " | Certified")?;
        }
        if !self.description.short.is_empty() {
            write!(f, "\n  {}", self.description)?;
        }
        write!(f, "\n  {}", self.link)
    }
}

pub(crate) fn parse_snowflake(raw: &str) -> Result<u64> {
    raw.trim().parse().map_err(|_| DblError::WeirdResponse {
        reason: format!("'{raw}' is not a Discord snowflake"),
    })
}
