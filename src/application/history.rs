use crate::domain::calculation::{CalculationId, CalculationRecord, NewCalculation, sort_newest_first};
use crate::domain::ports::{CalculationStoreBox, Clock, SystemClock};
use crate::error::Result;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, Notify, watch};
use tracing::{debug, info};

/// How long the cached snapshot outlives its last subscriber.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

#[derive(Debug, Default)]
struct CacheState {
    /// The watch channel holds the backend contents.
    loaded: bool,
    /// A release task is tracking the subscriber count.
    watching: bool,
}

/// Live subscription bookkeeping, shared with every `Subscription` and the
/// release task. Kept outside `Inner` so waiting on it does not keep the
/// history alive.
#[derive(Debug, Default)]
struct Subscribers {
    active: AtomicUsize,
    /// Bumped on every subscribe.
    generation: AtomicU64,
    /// Signalled when `active` drops to zero.
    idle: Notify,
}

struct Inner {
    backend: CalculationStoreBox,
    clock: Box<dyn Clock>,
    grace_period: Duration,
    snapshot: watch::Sender<Vec<CalculationRecord>>,
    subscribers: Arc<Subscribers>,
    cache: Mutex<CacheState>,
}

/// The calculation history, observable as a live, newest-first collection.
///
/// Mutations go through a single async mutex, so concurrent calls complete
/// one at a time and each is durable in the backend before it is published.
/// `Clone` shares the same history.
#[derive(Clone)]
pub struct HistoryStore {
    inner: Arc<Inner>,
}

impl HistoryStore {
    /// Creates a history over `backend` using the wall clock and
    /// [`DEFAULT_GRACE_PERIOD`].
    pub fn new(backend: CalculationStoreBox) -> Self {
        Self::with_options(backend, Box::new(SystemClock), DEFAULT_GRACE_PERIOD)
    }

    /// Creates a history with an explicit clock and grace period.
    ///
    /// # Arguments
    ///
    /// * `backend` - Durable storage for the records.
    /// * `clock` - Source of insert timestamps.
    /// * `grace_period` - How long the snapshot is kept after the last
    ///   subscriber goes away.
    pub fn with_options(
        backend: CalculationStoreBox,
        clock: Box<dyn Clock>,
        grace_period: Duration,
    ) -> Self {
        let (snapshot, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner {
                backend,
                clock,
                grace_period,
                snapshot,
                subscribers: Arc::new(Subscribers::default()),
                cache: Mutex::new(CacheState::default()),
            }),
        }
    }

    /// Subscribes to the history.
    ///
    /// The subscription yields the current collection right away and then the
    /// full collection again after every change. It ends once every handle to
    /// the history has been dropped.
    pub async fn observe_all(&self) -> Result<Subscription> {
        let mut cache = self.inner.cache.lock().await;
        if !cache.loaded {
            let records = self.load().await?;
            debug!(records = records.len(), "loaded history snapshot");
            self.inner.snapshot.send_replace(records);
            cache.loaded = true;
        }

        let subscribers = Arc::clone(&self.inner.subscribers);
        subscribers.generation.fetch_add(1, Ordering::SeqCst);
        subscribers.active.fetch_add(1, Ordering::SeqCst);
        let subscription = Subscription::new(self.inner.snapshot.subscribe(), subscribers);

        if !cache.watching {
            cache.watching = true;
            spawn_release_task(
                Arc::downgrade(&self.inner),
                Arc::clone(&self.inner.subscribers),
                self.inner.grace_period,
            );
        }

        Ok(subscription)
    }

    /// Returns the current collection, newest first.
    pub async fn all(&self) -> Result<Vec<CalculationRecord>> {
        let cache = self.inner.cache.lock().await;
        if cache.loaded {
            Ok(self.inner.snapshot.borrow().clone())
        } else {
            self.load().await
        }
    }

    /// Saves a calculation, stamping it with a fresh id and the current time.
    pub async fn insert(&self, calculation: NewCalculation) -> Result<CalculationId> {
        let cache = self.inner.cache.lock().await;
        let timestamp = self.inner.clock.now_millis();
        let record = self.inner.backend.insert(calculation, timestamp).await?;
        let id = record.id;
        info!(id = %id, timestamp, "saved calculation");

        if cache.loaded {
            self.inner.snapshot.send_modify(|records| {
                records.push(record);
                sort_newest_first(records);
            });
        }
        Ok(id)
    }

    /// Deletes a calculation. Unknown ids are ignored.
    pub async fn delete(&self, id: CalculationId) -> Result<()> {
        let cache = self.inner.cache.lock().await;
        let removed = self.inner.backend.delete(id).await?;
        if !removed {
            debug!(id = %id, "delete of unknown calculation ignored");
            return Ok(());
        }
        info!(id = %id, "deleted calculation");

        if cache.loaded {
            self.inner.snapshot.send_if_modified(|records| {
                let before = records.len();
                records.retain(|r| r.id != id);
                records.len() != before
            });
        }
        Ok(())
    }

    /// Deletes every calculation.
    pub async fn delete_all(&self) -> Result<()> {
        let cache = self.inner.cache.lock().await;
        let removed = self.inner.backend.delete_all().await?;
        info!(removed, "cleared history");

        if cache.loaded {
            self.inner.snapshot.send_if_modified(|records| {
                let changed = !records.is_empty();
                records.clear();
                changed
            });
        }
        Ok(())
    }

    async fn load(&self) -> Result<Vec<CalculationRecord>> {
        let mut records = self.inner.backend.get_all().await?;
        sort_newest_first(&mut records);
        Ok(records)
    }
}

/// Drops the cached snapshot once nobody has been subscribed for a full
/// grace period. Any subscribe during the wait restarts the period. The next
/// `observe_all` reloads the snapshot from the backend.
fn spawn_release_task(inner: Weak<Inner>, subscribers: Arc<Subscribers>, grace_period: Duration) {
    tokio::spawn(async move {
        loop {
            while subscribers.active.load(Ordering::SeqCst) > 0 {
                subscribers.idle.notified().await;
            }
            let generation = subscribers.generation.load(Ordering::SeqCst);

            tokio::time::sleep(grace_period).await;

            let Some(inner) = inner.upgrade() else {
                return;
            };
            let mut cache = inner.cache.lock().await;
            if subscribers.active.load(Ordering::SeqCst) == 0
                && subscribers.generation.load(Ordering::SeqCst) == generation
            {
                cache.loaded = false;
                cache.watching = false;
                inner.snapshot.send_replace(Vec::new());
                debug!("released history snapshot");
                return;
            }
        }
    });
}

/// A live view of the history.
///
/// The first call to [`Subscription::next`] returns the state at subscription
/// time; later calls wait for the next change. Dropping the subscription
/// unsubscribes.
pub struct Subscription {
    receiver: watch::Receiver<Vec<CalculationRecord>>,
    subscribers: Arc<Subscribers>,
    primed: bool,
}

impl Subscription {
    fn new(receiver: watch::Receiver<Vec<CalculationRecord>>, subscribers: Arc<Subscribers>) -> Self {
        Self {
            receiver,
            subscribers,
            primed: false,
        }
    }

    /// The most recently published collection, without waiting.
    pub fn current(&self) -> Vec<CalculationRecord> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next published collection. Returns `None` once every
    /// handle to the history has been dropped.
    pub async fn next(&mut self) -> Option<Vec<CalculationRecord>> {
        if !self.primed {
            self.primed = true;
            return Some(self.receiver.borrow_and_update().clone());
        }
        self.receiver.changed().await.ok()?;
        Some(self.receiver.borrow_and_update().clone())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.subscribers.active.fetch_sub(1, Ordering::SeqCst) == 1 {
            self.subscribers.idle.notify_one();
        }
    }
}
