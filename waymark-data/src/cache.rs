//! Memoising wrapper around a [`RouteProvider`].
//!
//! Legs are keyed by vehicle profile plus the requested points rounded to six
//! decimals (about 0.1 m). Successful paths and permanent rejections are
//! cached; timeouts, network failures, rate limits and server errors are not,
//! so a later call may still succeed.
//!
//! With persistence enabled the cache is loaded from a JSON file on
//! construction and written back atomically by [`CachedRouteProvider::flush`]
//! or on drop.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use waymark_core::{GeoPoint, RouteError, RoutePath, RouteProvider, VehicleProfile};

use crate::fs::{read_utf8, write_atomic};

/// Default entry limit before the oldest fifth is pruned.
pub const DEFAULT_MAX_ENTRIES: usize = 5000;

const CACHE_FORMAT_VERSION: u32 = 1;

/// Errors raised while persisting the cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// Writing the cache file failed.
    #[error("failed to write route cache {path}: {source}")]
    Io {
        /// Cache file path.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Encoding the cache failed.
    #[error("failed to encode route cache: {0}")]
    Serialise(#[from] serde_json::Error),
}

/// Counters describing cache effectiveness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CacheStats {
    /// Requests answered from the cache.
    pub hits: u64,
    /// Requests forwarded to the inner provider.
    pub misses: u64,
    /// Entries currently held.
    pub entries: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum CachedOutcome {
    Route { path: RoutePath },
    NoPaths,
    Rejected { url: String, status: u16, message: String },
}

impl CachedOutcome {
    fn from_result(result: &Result<RoutePath, RouteError>) -> Option<Self> {
        match result {
            Ok(path) => Some(Self::Route { path: path.clone() }),
            Err(RouteError::NoPaths) => Some(Self::NoPaths),
            Err(err) if err.is_permanent_rejection() => match err {
                RouteError::HttpError {
                    url,
                    status,
                    message,
                } => Some(Self::Rejected {
                    url: url.clone(),
                    status: *status,
                    message: message.clone(),
                }),
                _ => None,
            },
            Err(_) => None,
        }
    }

    /// Whether a stored outcome may still be replayed.
    fn is_replayable(&self) -> bool {
        match self {
            Self::Route { .. } | Self::NoPaths => true,
            Self::Rejected { .. } => self
                .to_result()
                .is_err_and(|err| err.is_permanent_rejection()),
        }
    }

    fn to_result(&self) -> Result<RoutePath, RouteError> {
        match self {
            Self::Route { path } => Ok(path.clone()),
            Self::NoPaths => Err(RouteError::NoPaths),
            Self::Rejected {
                url,
                status,
                message,
            } => Err(RouteError::HttpError {
                url: url.clone(),
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Entry {
    seq: u64,
    outcome: CachedOutcome,
}

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    entries: Vec<StoredEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredEntry {
    key: String,
    #[serde(flatten)]
    entry: Entry,
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Entry>,
    next_seq: u64,
    dirty: bool,
    hits: u64,
    misses: u64,
}

impl CacheState {
    fn insert(&mut self, key: String, outcome: CachedOutcome, max_entries: usize) {
        let seq = self.next_seq;
        self.next_seq = self.next_seq.saturating_add(1);
        self.entries.insert(key, Entry { seq, outcome });
        self.dirty = true;
        if self.entries.len() > max_entries {
            self.prune();
        }
    }

    /// Drop the oldest fifth of the entries, at least one.
    fn prune(&mut self) {
        let excess = self.entries.len().checked_div(5).unwrap_or(0).max(1);
        let mut by_age: Vec<(u64, String)> = self
            .entries
            .iter()
            .map(|(key, entry)| (entry.seq, key.clone()))
            .collect();
        by_age.sort_unstable();
        for (_, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        log::debug!(
            "route cache pruned {excess} entries; {} remain",
            self.entries.len()
        );
    }

    fn to_file(&self) -> CacheFile {
        let mut entries: Vec<StoredEntry> = self
            .entries
            .iter()
            .map(|(key, entry)| StoredEntry {
                key: key.clone(),
                entry: entry.clone(),
            })
            .collect();
        entries.sort_unstable_by_key(|stored| stored.entry.seq);
        CacheFile {
            version: CACHE_FORMAT_VERSION,
            entries,
        }
    }

    fn from_file(file: CacheFile) -> Self {
        let next_seq = file
            .entries
            .iter()
            .map(|stored| stored.entry.seq.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self {
            entries: file
                .entries
                .into_iter()
                .filter(|stored| stored.entry.outcome.is_replayable())
                .map(|stored| (stored.key, stored.entry))
                .collect(),
            next_seq,
            ..Self::default()
        }
    }
}

/// Cache key for one request.
fn cache_key(points: &[GeoPoint], profile: VehicleProfile) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|point| format!("{:.6},{:.6}", point.lat, point.lon))
        .collect();
    format!("{}|{}", profile.as_str(), coords.join(";"))
}

/// [`RouteProvider`] that memoises another provider's answers.
///
/// The lock is never held while the inner provider runs, so concurrent
/// misses for the same leg may both reach the engine; the later answer wins.
///
/// # Examples
/// ```
/// use waymark_core::test_support::StraightLineRouteProvider;
/// use waymark_core::{GeoPoint, RouteProvider, VehicleProfile};
/// use waymark_data::CachedRouteProvider;
///
/// let cached = CachedRouteProvider::new(StraightLineRouteProvider::default());
/// let leg = [GeoPoint::new_unchecked(10.0, 106.0), GeoPoint::new_unchecked(11.0, 106.0)];
/// let first = cached.request_route(&leg, VehicleProfile::Car)?;
/// let second = cached.request_route(&leg, VehicleProfile::Car)?;
/// assert_eq!(first, second);
/// assert_eq!(cached.stats().hits, 1);
/// # Ok::<(), waymark_core::RouteError>(())
/// ```
pub struct CachedRouteProvider<P> {
    inner: P,
    state: Mutex<CacheState>,
    path: Option<Utf8PathBuf>,
    max_entries: usize,
}

impl<P> std::fmt::Debug for CachedRouteProvider<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedRouteProvider")
            .field("path", &self.path)
            .field("max_entries", &self.max_entries)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

impl<P> CachedRouteProvider<P> {
    /// Wrap `inner` with an in-memory cache.
    #[must_use]
    pub fn new(inner: P) -> Self {
        Self {
            inner,
            state: Mutex::new(CacheState::default()),
            path: None,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Wrap `inner` with a cache persisted at `path`.
    ///
    /// A missing file starts an empty cache. An unreadable or corrupt file is
    /// logged and ignored; it is overwritten on the next flush.
    #[must_use]
    pub fn with_persistence(inner: P, path: impl Into<Utf8PathBuf>) -> Self {
        let cache_path = path.into();
        let state = load_state(&cache_path);
        log::info!(
            "route cache at {cache_path} loaded with {} entries",
            state.entries.len()
        );
        Self {
            inner,
            state: Mutex::new(state),
            path: Some(cache_path),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Set the entry limit. Zero is treated as one.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Hit, miss and size counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.lock();
        CacheStats {
            hits: state.hits,
            misses: state.misses,
            entries: state.entries.len(),
        }
    }

    /// Number of cached legs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    /// True when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    /// The wrapped provider.
    #[must_use]
    pub const fn inner(&self) -> &P {
        &self.inner
    }

    /// Write the cache to its file if anything changed since the last write.
    ///
    /// Does nothing for in-memory caches.
    ///
    /// # Errors
    /// Returns [`CacheError`] when encoding or writing fails; the cache stays
    /// dirty so a later flush retries.
    pub fn flush(&self) -> Result<(), CacheError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let mut state = self.lock();
        if !state.dirty {
            return Ok(());
        }
        let encoded = serde_json::to_vec(&state.to_file())?;
        write_atomic(path, &encoded).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        state.dirty = false;
        log::debug!("route cache flushed {} entries to {path}", state.entries.len());
        Ok(())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<P: RouteProvider> RouteProvider for CachedRouteProvider<P> {
    fn request_route(
        &self,
        points: &[GeoPoint],
        profile: VehicleProfile,
    ) -> Result<RoutePath, RouteError> {
        let key = cache_key(points, profile);
        {
            let mut state = self.lock();
            let cached = state.entries.get(&key).map(|entry| entry.outcome.to_result());
            if let Some(result) = cached {
                state.hits = state.hits.saturating_add(1);
                log::debug!("route cache hit for {key}");
                return result;
            }
            state.misses = state.misses.saturating_add(1);
        }

        let result = self.inner.request_route(points, profile);
        if let Some(outcome) = CachedOutcome::from_result(&result) {
            self.lock().insert(key, outcome, self.max_entries);
        }
        result
    }
}

impl<P> Drop for CachedRouteProvider<P> {
    fn drop(&mut self) {
        if let Err(err) = self.flush() {
            log::warn!("{err}");
        }
    }
}

fn load_state(path: &Utf8Path) -> CacheState {
    let text = match read_utf8(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            log::debug!("route cache {path} does not exist yet");
            return CacheState::default();
        }
        Err(err) => {
            log::warn!("ignoring unreadable route cache {path}: {err}");
            return CacheState::default();
        }
    };
    match serde_json::from_str::<CacheFile>(&text) {
        Ok(file) if file.version == CACHE_FORMAT_VERSION => CacheState::from_file(file),
        Ok(file) => {
            log::warn!(
                "ignoring route cache {path} with unsupported version {}",
                file.version
            );
            CacheState::default()
        }
        Err(err) => {
            log::warn!("ignoring corrupt route cache {path}: {err}");
            CacheState::default()
        }
    }
}
