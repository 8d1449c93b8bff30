use serde::{Deserialize, Serialize};

use crate::domain::avatar::Avatar;
use crate::domain::bot::parse_snowflake;
use crate::error::{DblError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DblUser {
    pub id: u64,
    pub username: String,
    pub discriminator: String,
    pub avatar: Avatar,
    pub bio: Option<String>,
    pub is_supporter: bool,
    pub is_certified_dev: bool,
    pub is_moderator: bool,
    pub is_admin: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUser {
    id: String,
    username: String,
    discriminator: String,
    #[serde(default)]
    avatar: Option<String>,
    def_avatar: String,
    #[serde(default)]
    bio: Option<String>,
    #[serde(default)]
    supporter: bool,
    #[serde(default)]
    certified_dev: bool,
    #[serde(default, rename = "mod")]
    moderator: bool,
    #[serde(default)]
    admin: bool,
}

impl DblUser {
    pub fn parse(value: &serde_json::Value) -> Result<Self> {
        let raw: RawUser =
            serde_json::from_value(value.clone()).map_err(|e| DblError::WeirdResponse {
                reason: format!("user object: {e}"),
            })?;
        let id = parse_snowflake(&raw.id)?;
        let avatar_hash = raw
            .avatar
            .filter(|h| !h.is_empty())
            .unwrap_or(raw.def_avatar);

        Ok(Self {
            id,
            avatar: Avatar::new(avatar_hash, id),
            username: raw.username,
            discriminator: raw.discriminator,
            bio: raw.bio.filter(|b| !b.is_empty()),
            is_supporter: raw.supporter,
            is_certified_dev: raw.certified_dev,
            is_moderator: raw.moderator,
            is_admin: raw.admin,
        })
    }

    pub fn username_full(&self) -> String {
        format!("{}#{}", self.username, self.discriminator)
    }
}
