use std::fmt;

use serde::{Deserialize, Serialize};

/// Statistics of a listed bot. Fields absent from the response are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DblStats {
    #[serde(default)]
    pub server_count: Option<u64>,
    #[serde(default)]
    pub shard_count: Option<u64>,
    #[serde(default)]
    pub shards: Vec<u64>,
}

impl fmt::Display for DblStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let or_na = |v: Option<u64>| v.map_or_else(|| "N/A".to_string(), |n| n.to_string());
        write!(
            f,
            "servers: {}, shards: {}",
            or_na(self.server_count),
            or_na(self.shard_count)
        )
    }
}

/// Body posted to `bots/{id}/stats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsUpdate {
    pub server_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shard_id: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_missing_fields_are_none() {
        let stats: DblStats = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(stats, DblStats::default());
        assert_eq!(stats.to_string(), "servers: N/A, shards: N/A");
    }

    #[test]
    fn stats_full() {
        let stats: DblStats = serde_json::from_value(serde_json::json!({
            "server_count": 1200,
            "shard_count": 2,
            "shards": [600, 600]
        }))
        .unwrap();
        assert_eq!(stats.server_count, Some(1200));
        assert_eq!(stats.shards, vec![600, 600]);
        assert_eq!(stats.to_string(), "servers: 1200, shards: 2");
    }

    #[test]
    fn stats_update_skips_missing_shards() {
        let body = StatsUpdate {
            server_count: 10,
            shard_count: None,
            shard_id: None,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"server_count": 10})
        );

        let sharded = StatsUpdate {
            server_count: 10,
            shard_count: Some(4),
            shard_id: Some(1),
        };
        assert_eq!(
            serde_json::to_value(&sharded).unwrap(),
            serde_json::json!({"server_count": 10, "shard_count": 4, "shard_id": 1})
        );
    }
}
