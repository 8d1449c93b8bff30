pub mod expiring;

pub use expiring::{
    CacheMode, Container, DEFAULT_TTL, ExpiringCache, ExpiringList, ExpiringMap, RefreshArgs,
};
