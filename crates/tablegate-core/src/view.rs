//! Dataset loading for a protected listing view.

use std::sync::Arc;

use parking_lot::Mutex;
use tablegate_cache::{CacheConfig, CacheEntry, CacheKey, CacheStore};
use tablegate_client::ScrapeResponse;
use tracing::{debug, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::error::{FetchError, FetchResult};
use crate::guard::Mount;
use crate::service::{Dataset, DatasetSource};

/// Cache entries hold the listing in the same `{success, restaurants}`
/// shape the scrape endpoint returns.
fn stored(dataset: Dataset) -> ScrapeResponse {
    ScrapeResponse {
        success: true,
        restaurants: dataset,
        error: None,
    }
}

/// Where the view is in its load lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPhase {
    #[default]
    Idle,
    Loading,
    Ready,
    Failed,
}

/// What the view currently displays.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewSnapshot {
    /// The rendered dataset. Kept across failed loads.
    pub restaurants: Dataset,
    /// When the rendered dataset was fetched, in epoch milliseconds.
    pub last_fetched_at: Option<i64>,
    /// Reason of the last failed load, cleared by a successful one.
    pub error: Option<String>,
    pub phase: LoadPhase,
}

impl ViewSnapshot {
    /// Check if a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.phase == LoadPhase::Loading
    }
}

/// Produces the dataset a protected view renders, serving from the shared
/// cache while it is fresh.
///
/// One controller belongs to one view instance. It refuses a second load
/// while one is outstanding, and stops updating its snapshot once the view
/// is unmounted.
pub struct DataViewController<D> {
    source: D,
    cache: CacheStore,
    key: CacheKey,
    ttl_millis: i64,
    clock: Arc<dyn Clock>,
    snapshot: Mutex<ViewSnapshot>,
    mount: Mount,
}

impl<D> std::fmt::Debug for DataViewController<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataViewController")
            .field("key", &self.key)
            .field("ttl_millis", &self.ttl_millis)
            .field("snapshot", &*self.snapshot.lock())
            .finish()
    }
}

impl<D: DatasetSource> DataViewController<D> {
    /// Create a controller reading and writing `cache` under the configured key.
    pub fn new(source: D, cache: CacheStore, config: &CacheConfig) -> Self {
        Self {
            source,
            cache,
            key: CacheKey::new(config.key.clone()),
            ttl_millis: config.ttl_millis(),
            clock: Arc::new(SystemClock),
            snapshot: Mutex::new(ViewSnapshot::default()),
            mount: Mount::new(),
        }
    }

    /// Use `clock` instead of wall time.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Tie the controller to an existing view's liveness flag.
    pub fn with_mount(mut self, mount: Mount) -> Self {
        self.mount = mount;
        self
    }

    /// The cache key this view reads.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// The view's liveness flag.
    pub fn mount(&self) -> &Mount {
        &self.mount
    }

    /// Copy of the current view state.
    pub fn snapshot(&self) -> ViewSnapshot {
        self.snapshot.lock().clone()
    }

    /// Check if a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.snapshot.lock().is_loading()
    }

    /// The cached listing, fresh or not, without touching the network.
    pub fn cached_listing(&self) -> Option<CacheEntry<Dataset>> {
        self.cache
            .read::<ScrapeResponse>(&self.key)
            .map(|entry| CacheEntry::new(entry.value.restaurants, entry.fetched_at))
    }

    /// Whether the refresh control is enabled.
    pub fn can_refresh(&self) -> bool {
        !self.is_loading()
    }

    /// Load the dataset.
    ///
    /// Without `force`, a fresh cache entry is returned with no network
    /// call. Otherwise exactly one fetch is made; success replaces the cache
    /// entry, failure leaves the cache as it was. `force` discards the cached
    /// entry before fetching, so a failed forced load leaves no entry.
    pub async fn load_dataset(&self, force: bool) -> FetchResult<Dataset> {
        {
            let mut snapshot = self.snapshot.lock();
            if snapshot.is_loading() {
                debug!(key = self.key.value_slot(), "Load already in progress");
                return Err(FetchError::InFlight);
            }
            snapshot.phase = LoadPhase::Loading;
        }
        let _loading = LoadingGuard(&self.snapshot);

        if force {
            info!(key = self.key.value_slot(), "Forced refresh, discarding cached entry");
            self.cache.invalidate(&self.key);
        } else if let Some(entry) = self.cache.read_fresh::<ScrapeResponse>(
            &self.key,
            self.ttl_millis,
            self.clock.now_millis(),
        ) {
            let dataset = entry.value.restaurants;
            debug!(
                key = self.key.value_slot(),
                count = dataset.len(),
                "Serving dataset from cache"
            );
            self.publish(Ok(&dataset), Some(entry.fetched_at));
            return Ok(dataset);
        }

        match self.source.fetch_dataset().await {
            Ok(dataset) => {
                let now = self.clock.now_millis();
                let payload = stored(dataset);
                self.cache.write(&self.key, &payload, now);
                let dataset = payload.restaurants;
                info!(count = dataset.len(), "Dataset fetched");
                self.publish(Ok(&dataset), Some(now));
                Ok(dataset)
            }
            Err(e) => {
                warn!(reason = %e, "Dataset fetch failed");
                self.publish(Err(&e), None);
                Err(e)
            }
        }
    }

    fn publish(&self, outcome: std::result::Result<&Dataset, &FetchError>, fetched_at: Option<i64>) {
        if !self.mount.is_mounted() {
            debug!("View unmounted, dropping load result");
            return;
        }
        let mut snapshot = self.snapshot.lock();
        match outcome {
            Ok(dataset) => {
                snapshot.restaurants = dataset.clone();
                snapshot.last_fetched_at = fetched_at;
                snapshot.error = None;
                snapshot.phase = LoadPhase::Ready;
            }
            Err(e) => {
                snapshot.error = Some(e.reason());
                snapshot.phase = LoadPhase::Failed;
            }
        }
    }
}

/// Leaves the `Loading` phase when a load ends, including when its future
/// is dropped mid-flight.
struct LoadingGuard<'a>(&'a Mutex<ViewSnapshot>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut snapshot = self.0.lock();
        if snapshot.phase == LoadPhase::Loading {
            snapshot.phase = if snapshot.last_fetched_at.is_some() {
                LoadPhase::Ready
            } else {
                LoadPhase::Idle
            };
        }
    }
}
