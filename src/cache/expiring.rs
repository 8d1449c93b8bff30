use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Debug;
use std::future::Future;
use std::hash::Hash;
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{DblError, Result};

pub const DEFAULT_TTL: Duration = Duration::from_secs(10);

/// Stand-in expiry for TTLs that overflow `Instant` (about 30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Extra parameters handed to the refresh callback on every call.
pub type RefreshArgs = BTreeMap<String, String>;

type RefreshFuture<C> = Pin<Box<dyn Future<Output = Result<C>> + Send>>;
type RefreshFn<O, C> = Box<dyn Fn(O, Arc<RefreshArgs>) -> RefreshFuture<C> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheMode {
    Sequence,
    Mapping,
}

/// Shape of the data held by an [`ExpiringCache`].
pub trait Container: Default + Clone + Send + 'static {
    const MODE: CacheMode;

    /// Element type for sequences, key type for mappings.
    type Key;

    fn clear(&mut self);

    fn len(&self) -> usize;

    /// Key membership for mappings, element membership for sequences.
    fn holds<Q>(&self, key: &Q) -> bool
    where
        Self::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq;
}

impl<T> Container for Vec<T>
where
    T: Clone + Send + 'static,
{
    const MODE: CacheMode = CacheMode::Sequence;
    type Key = T;

    fn clear(&mut self) {
        Vec::clear(self);
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn holds<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.iter().any(|item| item.borrow() == key)
    }
}

impl<K, V> Container for HashMap<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
{
    const MODE: CacheMode = CacheMode::Mapping;
    type Key = K;

    fn clear(&mut self) {
        HashMap::clear(self);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }

    fn holds<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.contains_key(key)
    }
}

struct Slot<C> {
    container: C,
    /// `None` until the first successful refresh or overwrite.
    expiry: Option<Instant>,
}

/// A container that repopulates itself through an async refresh callback
/// once its time-to-live has lapsed.
///
/// Every accessor except [`overwrite`](Self::overwrite) starts with a
/// staleness check. When the cache is stale the container is cleared, the
/// refresh callback is awaited and its result replaces the container, and
/// the expiry moves to `now + ttl`. A freshly built cache is stale and does
/// not call the refresh callback until first accessed.
///
/// Refreshes are single-flight: concurrent callers that observe a stale
/// cache queue behind one refresh and then read its result.
///
/// If the refresh fails the error is returned unchanged, the container stays
/// empty and the expiry is not advanced, so the next access refreshes again.
pub struct ExpiringCache<C, O> {
    owner: O,
    ttl: Duration,
    refresh_args: Arc<RefreshArgs>,
    refresh: RefreshFn<O, C>,
    slot: Mutex<Slot<C>>,
    refresh_gate: tokio::sync::Mutex<()>,
}

pub type ExpiringList<T, O> = ExpiringCache<Vec<T>, O>;
pub type ExpiringMap<K, V, O> = ExpiringCache<HashMap<K, V>, O>;

impl<C, O> ExpiringCache<C, O>
where
    C: Container,
    O: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(owner: O, refresh: F) -> Self
    where
        F: Fn(O, Arc<RefreshArgs>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<C>> + Send + 'static,
    {
        Self {
            owner,
            ttl: DEFAULT_TTL,
            refresh_args: Arc::new(RefreshArgs::new()),
            refresh: Box::new(move |owner, args| -> RefreshFuture<C> {
                Box::pin(refresh(owner, args))
            }),
            slot: Mutex::new(Slot {
                container: C::default(),
                expiry: None,
            }),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    #[must_use]
    pub fn with_refresh_arg(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        Arc::make_mut(&mut self.refresh_args).insert(key.into(), value.into());
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn mode(&self) -> CacheMode {
        C::MODE
    }

    pub fn owner(&self) -> &O {
        &self.owner
    }

    pub fn refresh_args(&self) -> &RefreshArgs {
        &self.refresh_args
    }

    /// Moment after which the container is stale, `None` before the first
    /// refresh.
    pub fn expiry(&self) -> Option<Instant> {
        self.lock_slot().expiry
    }

    pub fn is_stale(&self) -> bool {
        self.lock_slot()
            .expiry
            .is_none_or(|expiry| Instant::now() > expiry)
    }

    /// Current contents without a staleness check.
    pub fn peek(&self) -> C {
        self.lock_slot().container.clone()
    }

    pub async fn get(&self) -> Result<C> {
        self.ensure_fresh().await?;
        Ok(self.lock_slot().container.clone())
    }

    pub async fn contains<Q>(&self, key: &Q) -> Result<bool>
    where
        C::Key: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.ensure_fresh().await?;
        Ok(self.lock_slot().container.holds(key))
    }

    /// Replaces the container and restarts the TTL window without calling
    /// the refresh callback.
    pub fn overwrite(&self, value: C) {
        let mut slot = self.lock_slot();
        slot.container = value;
        slot.expiry = Some(self.expiry_from(Instant::now()));
    }

    async fn ensure_fresh(&self) -> Result<()> {
        if !self.is_stale() {
            return Ok(());
        }

        let _gate = self.refresh_gate.lock().await;
        // Re-check: a queued caller finds the refresh already done.
        if !self.is_stale() {
            return Ok(());
        }

        self.lock_slot().container.clear();
        debug!(
            mode = ?C::MODE,
            ttl_secs = self.ttl.as_secs(),
            "Refreshing expiring cache"
        );

        let fresh = (self.refresh)(self.owner.clone(), Arc::clone(&self.refresh_args))
            .await
            .inspect_err(|e| warn!(error = %e, "Cache refresh failed"))?;

        let mut slot = self.lock_slot();
        debug!(entries = fresh.len(), "Cache refreshed");
        slot.container = fresh;
        slot.expiry = Some(self.expiry_from(Instant::now()));
        Ok(())
    }

    /// `now + ttl`, saturating for TTLs too large to represent.
    fn expiry_from(&self, now: Instant) -> Instant {
        now.checked_add(self.ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }

    fn lock_slot(&self) -> MutexGuard<'_, Slot<C>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T, O> ExpiringCache<Vec<T>, O>
where
    T: Clone + Send + 'static,
    O: Clone + Send + Sync + 'static,
{
    pub async fn append(&self, value: T) -> Result<()> {
        self.ensure_fresh().await?;
        self.lock_slot().container.push(value);
        Ok(())
    }
}

impl<K, V, O> ExpiringCache<HashMap<K, V>, O>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Clone + Send + 'static,
    O: Clone + Send + Sync + 'static,
{
    pub async fn get_value<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + Debug,
    {
        self.ensure_fresh().await?;
        self.lock_slot()
            .container
            .get(key)
            .cloned()
            .ok_or_else(|| key_not_found(key))
    }

    /// Removes `key`, returning its value.
    pub async fn remove_value<Q>(&self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq + Debug,
    {
        self.ensure_fresh().await?;
        self.lock_slot()
            .container
            .remove(key)
            .ok_or_else(|| key_not_found(key))
    }

    /// Inserts or replaces `key`, returning the previous value if any.
    pub async fn update(&self, key: K, value: V) -> Result<Option<V>> {
        self.ensure_fresh().await?;
        Ok(self.lock_slot().container.insert(key, value))
    }
}

fn key_not_found<Q: ?Sized + Debug>(key: &Q) -> DblError {
    DblError::KeyNotFound {
        key: format!("{key:?}"),
    }
}
