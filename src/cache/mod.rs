//! On-disk JSON cache with TTL and stale reads
//!
//! Used for the forecast samples and the last chosen location so the dashboard
//! can show something useful when the upstream is unavailable.

mod manager;

pub use manager::{CacheManager, CachedData};
