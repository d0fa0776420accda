//! Image resolution pipeline: memory tier, then disk tier, then decode.
//!
//! ```text
//! resolve_preview(path)
//!   memory(preview) hit ──────────────────────────────▶ return
//!   disk hit ──────────────▶ memory(preview).put ────▶ return
//!   decode + orientation ─▶ resize lane ─▶ disk.put ─▶ memory(preview).put ─▶ return
//!
//! resolve_full(path)
//!   memory(full) hit ─────────────────────────────────▶ return
//!   decode + orientation ─▶ memory(full).put ────────▶ return
//! ```
//!
//! Concurrent misses on the same `(size class, key)` share one computation:
//! the first caller becomes the leader and every later caller blocks until
//! the leader publishes its result. Failures are handed to every waiter but
//! never cached, so the next request starts from scratch.
//!
//! Decoding and file I/O run on whatever thread calls `resolve_*` (usually the
//! rayon global pool via [`ImageResolver::request`]). Resizes are funnelled
//! through a dedicated single-thread pool so thumbnail generation never
//! occupies more than one core.

use crate::cache::{
    CacheCounters, CacheKey, CacheStats, FileCache, MemoryCache, SizeClass,
};
use crate::config::CacheConfig;
use crate::imaging::{CodecError, ImageCodec, RasterImage};
use crate::types::LoadState;
use std::collections::HashMap;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use thiserror::Error;

/// A decode or read failure for one image. Shared by every caller that was
/// waiting on the same load.
#[derive(Error, Debug, Clone)]
#[error("failed to load {}: {cause}", path.display())]
pub struct ImageLoadError {
    pub path: PathBuf,
    #[source]
    pub cause: Arc<CodecError>,
}

impl ImageLoadError {
    pub fn new(path: &Path, cause: CodecError) -> Self {
        Self {
            path: path.to_path_buf(),
            cause: Arc::new(cause),
        }
    }
}

#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("failed to start resize worker: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

type Resolved = Result<Arc<RasterImage>, ImageLoadError>;

/// Result slot for one in-flight load.
#[derive(Default)]
struct Pending {
    result: Mutex<Option<Resolved>>,
    ready: Condvar,
}

impl Pending {
    fn wait(&self) -> Resolved {
        let mut slot = self.result.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            if let Some(result) = slot.as_ref() {
                return result.clone();
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    fn publish(&self, result: Resolved) {
        *self.result.lock().unwrap_or_else(PoisonError::into_inner) = Some(result);
        self.ready.notify_all();
    }
}

type FlightKey = (SizeClass, CacheKey);

enum Role<'a> {
    Leader(Flight<'a>),
    Follower(Arc<Pending>),
}

/// Leader's handle on an in-flight load. Dropping it without calling
/// [`Flight::complete`] (a panic in the codec unwinding through
/// [`ImageResolver::resolve`]) wakes the waiters with
/// [`CodecError::Interrupted`].
struct Flight<'a> {
    resolver: &'a ImageResolver,
    key: FlightKey,
    path: PathBuf,
    pending: Arc<Pending>,
    done: bool,
}

impl Flight<'_> {
    fn complete(mut self, result: Resolved) -> Resolved {
        self.finish(result.clone());
        result
    }

    fn finish(&mut self, result: Resolved) {
        self.done = true;
        self.pending.publish(result);
        self.resolver.in_flight().remove(&self.key);
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if !self.done {
            let err = ImageLoadError::new(&self.path, CodecError::Interrupted);
            self.finish(Err(err));
        }
    }
}

/// Delivered to the presentation layer for every [`ImageResolver::request`].
#[derive(Debug, Clone)]
pub struct ImageUpdate {
    pub path: PathBuf,
    pub size: SizeClass,
    pub state: LoadState<Arc<RasterImage>, ImageLoadError>,
}

/// Lifetime of a view (a directory listing, an open photo window).
///
/// Requests carry a [`ViewTicket`]; once the scope is invalidated every
/// older ticket is stale and its results are dropped on arrival.
#[derive(Debug, Clone, Default)]
pub struct ViewScope {
    generation: Arc<AtomicU64>,
}

impl ViewScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ticket(&self) -> ViewTicket {
        ViewTicket {
            generation: Arc::clone(&self.generation),
            issued: self.generation.load(Ordering::Acquire),
        }
    }

    /// End the current view. Tickets issued so far become stale.
    pub fn invalidate(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
    }
}

#[derive(Debug, Clone)]
pub struct ViewTicket {
    generation: Arc<AtomicU64>,
    issued: u64,
}

impl ViewTicket {
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::Acquire) == self.issued
    }
}

/// Process-wide image cache service.
///
/// Constructed once by the application root and shared as
/// `Arc<ImageResolver>` with every view that shows images.
pub struct ImageResolver {
    codec: Arc<dyn ImageCodec>,
    preview: MemoryCache,
    full: MemoryCache,
    disk: Option<FileCache>,
    preview_edge: u32,
    resize_lane: rayon::ThreadPool,
    in_flight: Mutex<HashMap<FlightKey, Arc<Pending>>>,
    counters: CacheCounters,
}

impl ImageResolver {
    /// Build a resolver with explicit tiers. `disk: None` disables the
    /// on-disk preview tier.
    pub fn new(
        codec: Arc<dyn ImageCodec>,
        disk: Option<FileCache>,
        config: &CacheConfig,
    ) -> Result<Self, ResolverError> {
        let resize_lane = rayon::ThreadPoolBuilder::new()
            .num_threads(1)
            .thread_name(|_| "gallery-resize".to_string())
            .build()?;
        Ok(Self {
            codec,
            preview: MemoryCache::new(config.preview_capacity),
            full: MemoryCache::new(config.full_capacity),
            disk,
            preview_edge: config.preview_edge,
            resize_lane,
            in_flight: Mutex::new(HashMap::new()),
            counters: CacheCounters::default(),
        })
    }

    /// Build a resolver whose disk tier follows `config` (`disk`,
    /// `directory`, `jpeg_quality`).
    pub fn from_config(
        codec: Arc<dyn ImageCodec>,
        config: &CacheConfig,
    ) -> Result<Self, ResolverError> {
        let disk = config
            .disk_dir()
            .map(|dir| FileCache::with_quality(dir, config.jpeg_quality));
        Self::new(codec, disk, config)
    }

    pub fn memory(&self, size: SizeClass) -> &MemoryCache {
        match size {
            SizeClass::Preview => &self.preview,
            SizeClass::Full => &self.full,
        }
    }

    pub fn disk(&self) -> Option<&FileCache> {
        self.disk.as_ref()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    /// Memory-tier lookup only. Never touches the disk or the codec.
    pub fn cached(&self, path: &Path, size: SizeClass) -> Option<Arc<RasterImage>> {
        self.memory(size).get(&CacheKey::for_path(path))
    }

    /// Grid thumbnail for `path`. Blocking; call off the UI thread.
    pub fn resolve_preview(&self, path: &Path) -> Resolved {
        self.resolve(path, SizeClass::Preview)
    }

    /// Full-resolution image for `path`. Blocking; call off the UI thread.
    pub fn resolve_full(&self, path: &Path) -> Resolved {
        self.resolve(path, SizeClass::Full)
    }

    pub fn resolve(&self, path: &Path, size: SizeClass) -> Resolved {
        let key = CacheKey::for_path(path);
        let memory = self.memory(size);
        if let Some(image) = memory.get(&key) {
            self.counters.memory_hit();
            tracing::debug!(key = %key, ?size, "memory hit");
            return Ok(image);
        }

        let flight = match self.join_or_lead(size, &key, path) {
            Role::Follower(pending) => {
                tracing::debug!(key = %key, ?size, "waiting on in-flight load");
                return pending.wait();
            }
            Role::Leader(flight) => flight,
        };

        // A previous leader may have finished between the lookup and the
        // in-flight registration.
        if let Some(image) = memory.get(&key) {
            self.counters.memory_hit();
            return flight.complete(Ok(image));
        }

        let result = self.load(path, &key, size).map(Arc::new);
        match &result {
            Ok(image) => {
                memory.put(key, Arc::clone(image));
            }
            Err(err) => {
                self.counters.failure();
                tracing::debug!(error = %err, ?size, "image load failed");
            }
        }
        flight.complete(result)
    }

    fn in_flight(&self) -> MutexGuard<'_, HashMap<FlightKey, Arc<Pending>>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn join_or_lead(&self, size: SizeClass, key: &CacheKey, path: &Path) -> Role<'_> {
        let flight_key = (size, key.clone());
        let mut table = self.in_flight();
        if let Some(pending) = table.get(&flight_key) {
            return Role::Follower(Arc::clone(pending));
        }
        let pending = Arc::new(Pending::default());
        table.insert(flight_key.clone(), Arc::clone(&pending));
        Role::Leader(Flight {
            resolver: self,
            key: flight_key,
            path: path.to_path_buf(),
            pending,
            done: false,
        })
    }

    /// Miss path below the memory tier.
    fn load(
        &self,
        path: &Path,
        key: &CacheKey,
        size: SizeClass,
    ) -> Result<RasterImage, ImageLoadError> {
        let disk = match size {
            SizeClass::Preview => self.disk.as_ref(),
            SizeClass::Full => None,
        };

        if let Some(image) = disk.and_then(|d| d.get(key)) {
            self.counters.disk_hit();
            tracing::debug!(key = %key, "disk hit");
            return Ok(image);
        }

        tracing::debug!(key = %key, ?size, "decoding");
        self.counters.decode();
        let decoded = self
            .codec
            .decode(path)
            .map_err(|e| ImageLoadError::new(path, e))?;
        let orientation = self.codec.read_orientation(path);

        let image = match size {
            SizeClass::Preview => self.resize_on_lane(decoded, orientation, path)?,
            SizeClass::Full => self.codec.apply_orientation(decoded, orientation),
        };

        if let Some(disk) = disk {
            if let Err(err) = disk.put(key, &image) {
                tracing::warn!(
                    key = %key,
                    dir = %disk.dir().display(),
                    error = %err,
                    "failed to write preview to disk cache"
                );
            }
        }
        Ok(image)
    }

    /// Resize and orient on the single resize worker, blocking until done.
    ///
    /// Uses `spawn` + channel rather than `install` so a caller on a rayon
    /// worker does not steal unrelated jobs while it waits.
    fn resize_on_lane(
        &self,
        decoded: RasterImage,
        orientation: crate::imaging::Orientation,
        path: &Path,
    ) -> Result<RasterImage, ImageLoadError> {
        let codec = Arc::clone(&self.codec);
        let edge = self.preview_edge;
        let (tx, rx) = mpsc::channel();
        self.resize_lane.spawn(move || {
            // A panic escaping a rayon job aborts the process. Dropping `tx`
            // instead makes the caller see `Interrupted`.
            let resized = panic::catch_unwind(AssertUnwindSafe(|| {
                let small = codec.resize(&decoded, edge);
                codec.apply_orientation(small, orientation)
            }));
            match resized {
                Ok(image) => {
                    let _ = tx.send(image);
                }
                Err(_) => tracing::error!("resize worker panicked"),
            }
        });
        rx.recv()
            .map_err(|_| ImageLoadError::new(path, CodecError::Interrupted))
    }

    /// Start an asynchronous load for a view.
    ///
    /// Sends `Loading` (or `Success` straight away on a memory hit), then
    /// resolves on the rayon pool and sends the outcome if `ticket` is still
    /// current. A send to a dropped receiver is ignored.
    pub fn request(
        self: &Arc<Self>,
        path: PathBuf,
        size: SizeClass,
        ticket: ViewTicket,
        updates: Sender<ImageUpdate>,
    ) {
        if let Some(image) = self.cached(&path, size) {
            self.counters.memory_hit();
            let _ = updates.send(ImageUpdate {
                path,
                size,
                state: LoadState::Success(image),
            });
            return;
        }

        let _ = updates.send(ImageUpdate {
            path: path.clone(),
            size,
            state: LoadState::Loading,
        });

        let resolver = Arc::clone(self);
        rayon::spawn(move || {
            if !ticket.is_current() {
                tracing::debug!(path = %path.display(), "view closed before load started");
                return;
            }
            let result = panic::catch_unwind(AssertUnwindSafe(|| resolver.resolve(&path, size)))
                .unwrap_or_else(|_| {
                    tracing::error!(path = %path.display(), "image load panicked");
                    resolver.counters.failure();
                    Err(ImageLoadError::new(&path, CodecError::Interrupted))
                });
            if !ticket.is_current() {
                tracing::debug!(path = %path.display(), "dropping result for closed view");
                return;
            }
            let _ = updates.send(ImageUpdate {
                path,
                size,
                state: result.into(),
            });
        });
    }
}
