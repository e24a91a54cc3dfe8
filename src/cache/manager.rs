//! Cache manager for persisting upstream responses to disk
//!
//! Stores serializable values as JSON files stamped with an expiry time. Expired
//! entries are still readable so callers can degrade to stale data when the
//! upstream is unreachable.

use chrono::{DateTime, Duration, Utc};
use directories::ProjectDirs;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// On-disk envelope around a cached value
#[derive(Debug, Serialize, Deserialize)]
struct CacheEntry<T> {
    data: T,
    cached_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// A value read back from the cache, with freshness metadata
#[derive(Debug)]
pub struct CachedData<T> {
    pub data: T,
    /// When the value was written
    pub cached_at: DateTime<Utc>,
    /// Whether the TTL has elapsed
    pub is_expired: bool,
}

/// Reads and writes cached values under a single directory
///
/// Defaults to the XDG cache directory (`~/.cache/wxdash/` on Linux).
#[derive(Debug, Clone)]
pub struct CacheManager {
    cache_dir: PathBuf,
}

impl CacheManager {
    /// Creates a CacheManager rooted in the platform cache directory
    ///
    /// Returns `None` if no home directory can be determined.
    pub fn new() -> Option<Self> {
        let project_dirs = ProjectDirs::from("", "", "wxdash")?;
        Some(Self {
            cache_dir: project_dirs.cache_dir().to_path_buf(),
        })
    }

    /// Creates a CacheManager rooted at `cache_dir`
    pub fn with_dir(cache_dir: PathBuf) -> Self {
        Self { cache_dir }
    }

    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    fn cache_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.json", key))
    }

    /// Writes `data` under `key`, fresh for `ttl`
    ///
    /// Creates the cache directory if needed.
    pub fn write<T: Serialize>(&self, key: &str, data: &T, ttl: Duration) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;

        let now = Utc::now();
        let entry = CacheEntry {
            data,
            cached_at: now,
            expires_at: now + ttl,
        };

        let json = serde_json::to_string_pretty(&entry)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        fs::write(self.cache_path(key), json)
    }

    /// Reads the value stored under `key`
    ///
    /// Returns `None` when the entry is missing or unparseable. Expired entries are
    /// returned with `is_expired = true`.
    pub fn read<T: DeserializeOwned>(&self, key: &str) -> Option<CachedData<T>> {
        let content = fs::read_to_string(self.cache_path(key)).ok()?;
        let entry: CacheEntry<T> = serde_json::from_str(&content).ok()?;

        Some(CachedData {
            data: entry.data,
            cached_at: entry.cached_at,
            is_expired: Utc::now() > entry.expires_at,
        })
    }
}
