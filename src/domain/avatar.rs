use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DblError, Result};

const CDN_AVATARS: &str = "https://cdn.discordapp.com/avatars";

/// Discord CDN avatar of a bot or user. Displays as the `.png` URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Avatar {
    pub hash: String,
    pub base_url: String,
}

impl Avatar {
    pub fn new(hash: impl Into<String>, owner_id: u64) -> Self {
        let hash = hash.into();
        let base_url = format!("{CDN_AVATARS}/{owner_id}/{hash}");
        Self { hash, base_url }
    }

    pub fn url(&self) -> String {
        format!("{}.png", self.base_url)
    }

    /// `.gif` URL; returns 404 on the CDN when the avatar is not animated.
    pub fn gif(&self) -> String {
        format!("{}.gif", self.base_url)
    }

    /// Resized `.png` URL. The CDN accepts powers of two from 16 to 2048.
    pub fn size(&self, px: u32) -> Result<String> {
        if !(16..=2048).contains(&px) || !px.is_power_of_two() {
            return Err(DblError::InvalidParams {
                reason: format!("avatar size {px} must be a power of two between 16 and 2048"),
            });
        }
        Ok(format!("{}.png?size={px}", self.base_url))
    }
}

impl fmt::Display for Avatar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.png", self.base_url)
    }
}
