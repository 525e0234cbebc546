use std::collections::HashMap;
use std::net::IpAddr;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, RwLock};

use tunecheck_common::SafetyReport;

const MAX_CACHE_ENTRIES: usize = 500;
const RATE_WINDOW: Duration = Duration::from_secs(3600);
/// Sweep idle IPs once the table grows past this.
const MAX_TRACKED_IPS: usize = 1000;

// =============================================================================
// Report cache
// =============================================================================

#[derive(Debug, Clone)]
struct CacheEntry {
    report: SafetyReport,
    inserted_at: Instant,
}

/// Finished reports keyed by playlist id. A `None` TTL disables caching.
pub struct ReportCache {
    ttl: Option<Duration>,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl ReportCache {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            ttl,
            entries: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<SafetyReport> {
        let ttl = self.ttl?;
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() < ttl {
            Some(entry.report.clone())
        } else {
            None
        }
    }

    pub async fn insert(&self, key: String, report: SafetyReport) {
        let Some(ttl) = self.ttl else {
            return;
        };
        let mut entries = self.entries.write().await;
        // Opportunistic eviction when we hit the limit
        if entries.len() >= MAX_CACHE_ENTRIES {
            let now = Instant::now();
            entries.retain(|_, v| now.duration_since(v.inserted_at) < ttl);
        }
        if entries.len() >= MAX_CACHE_ENTRIES {
            return;
        }
        entries.insert(
            key,
            CacheEntry {
                report,
                inserted_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }
}

// =============================================================================
// Rate limiting
// =============================================================================

/// Record a request if the sliding window still has room.
/// Prunes expired timestamps first.
pub fn check_rate_limit(entries: &mut Vec<Instant>, now: Instant, max_per_window: usize) -> bool {
    let cutoff = now.checked_sub(RATE_WINDOW).unwrap_or(now);
    entries.retain(|t| *t > cutoff);
    if entries.len() >= max_per_window {
        return false;
    }
    entries.push(now);
    true
}

/// Per-IP hourly limit on analyze requests. A `None` limit disables it.
pub struct RateLimiter {
    max_per_hour: Option<u32>,
    requests: Mutex<HashMap<IpAddr, Vec<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_per_hour: Option<u32>) -> Self {
        Self {
            max_per_hour,
            requests: Mutex::new(HashMap::new()),
        }
    }

    /// Returns true if the request is allowed.
    pub async fn allow(&self, ip: IpAddr) -> bool {
        let Some(max) = self.max_per_hour else {
            return true;
        };
        let now = Instant::now();
        let mut requests = self.requests.lock().await;
        if requests.len() > MAX_TRACKED_IPS {
            let cutoff = now.checked_sub(RATE_WINDOW).unwrap_or(now);
            requests.retain(|_, times| times.iter().any(|t| *t > cutoff));
        }
        check_rate_limit(requests.entry(ip).or_default(), now, max as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tunecheck_common::{Assessment, PlaylistMeta, RawMetadata, ScoreBands};

    fn report() -> SafetyReport {
        SafetyReport::new(
            Assessment::fallback(&ScoreBands::STANDARD),
            PlaylistMeta::from_raw(RawMetadata::default()),
        )
    }

    #[test]
    fn test_rate_limit_window() {
        let start = Instant::now();
        let mut entries = Vec::new();
        assert!(check_rate_limit(&mut entries, start, 2));
        assert!(check_rate_limit(&mut entries, start, 2));
        assert!(!check_rate_limit(&mut entries, start, 2));
        // An hour later the old requests have aged out.
        let later = start + RATE_WINDOW + Duration::from_secs(1);
        assert!(check_rate_limit(&mut entries, later, 2));
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn test_rate_limiter_is_per_ip() {
        let limiter = RateLimiter::new(Some(1));
        let a: IpAddr = "10.0.0.1".parse().unwrap();
        let b: IpAddr = "10.0.0.2".parse().unwrap();
        assert!(limiter.allow(a).await);
        assert!(!limiter.allow(a).await);
        assert!(limiter.allow(b).await);
    }

    #[tokio::test]
    async fn test_disabled_rate_limiter() {
        let limiter = RateLimiter::new(None);
        let ip: IpAddr = "10.0.0.1".parse().unwrap();
        for _ in 0..100 {
            assert!(limiter.allow(ip).await);
        }
    }

    #[tokio::test]
    async fn test_cache_round_trip() {
        let cache = ReportCache::new(Some(Duration::from_secs(60)));
        assert!(cache.get("abc").await.is_none());
        cache.insert("abc".into(), report()).await;
        assert_eq!(cache.get("abc").await, Some(report()));
    }

    #[tokio::test]
    async fn test_cache_expiry() {
        let cache = ReportCache::new(Some(Duration::from_millis(20)));
        cache.insert("abc".into(), report()).await;
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("abc").await.is_none());
    }

    #[tokio::test]
    async fn test_disabled_cache_stores_nothing() {
        let cache = ReportCache::new(None);
        cache.insert("abc".into(), report()).await;
        assert_eq!(cache.len().await, 0);
        assert!(cache.get("abc").await.is_none());
    }
}
