//! Local snapshot caching
//!
//! Keeps the last chain snapshot per ticker on disk so repeated runs inside
//! the refresh window skip the network.

use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use chrono::NaiveDate;

use crate::core::{ChainSnapshot, GexError, GexResult};

use super::yahoo::YahooClient;

const SNAPSHOT_SUFFIX: &str = "_chain.json";

/// Cache configuration
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache directory
    pub cache_dir: PathBuf,
    /// Maximum age before refresh (in seconds)
    pub max_age_secs: u64,
    /// Whether to use cache
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            cache_dir: PathBuf::from("./data/cache"),
            max_age_secs: 300,
            enabled: true,
        }
    }
}

/// Per-ticker snapshot store
pub struct SnapshotCache {
    config: CacheConfig,
}

impl SnapshotCache {
    pub fn new(config: CacheConfig) -> GexResult<Self> {
        if config.enabled && !config.cache_dir.exists() {
            fs::create_dir_all(&config.cache_dir)?;
        }

        Ok(Self { config })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn cache_key(&self, ticker: &str) -> PathBuf {
        self.config
            .cache_dir
            .join(format!("{}{}", ticker.to_uppercase(), SNAPSHOT_SUFFIX))
    }

    /// Entry exists and is younger than `max_age_secs`
    pub fn is_valid(&self, ticker: &str) -> bool {
        if !self.config.enabled {
            return false;
        }

        let modified = fs::metadata(self.cache_key(ticker)).and_then(|m| m.modified());
        match modified {
            Ok(modified) => SystemTime::now()
                .duration_since(modified)
                .map(|age| age < Duration::from_secs(self.config.max_age_secs))
                .unwrap_or(false),
            Err(_) => false,
        }
    }

    pub fn save_snapshot(&self, snapshot: &ChainSnapshot) -> GexResult<()> {
        if !self.config.enabled {
            return Ok(());
        }

        let path = self.cache_key(&snapshot.underlying);
        snapshot.to_json_file(&path)?;

        tracing::info!(ticker = %snapshot.underlying, path = %path.display(), "cached snapshot");
        Ok(())
    }

    /// Fresh cached snapshot, optionally for a specific expiry
    pub fn load_snapshot(&self, ticker: &str, expiry: Option<NaiveDate>) -> GexResult<Option<ChainSnapshot>> {
        if !self.is_valid(ticker) {
            return Ok(None);
        }

        let json = fs::read_to_string(self.cache_key(ticker))?;
        let snapshot: ChainSnapshot =
            serde_json::from_str(&json).map_err(|e| GexError::Serialization(e.to_string()))?;

        if expiry.is_some_and(|e| e != snapshot.expiry) {
            tracing::debug!(ticker, cached = %snapshot.expiry, "cached expiry does not match");
            return Ok(None);
        }

        tracing::info!(ticker, expiry = %snapshot.expiry, "loaded snapshot from cache");
        Ok(Some(snapshot))
    }

    /// Clear cache for a ticker
    pub fn clear(&self, ticker: &str) -> GexResult<()> {
        let path = self.cache_key(ticker);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    /// Clear all cache
    pub fn clear_all(&self) -> GexResult<()> {
        if self.config.cache_dir.exists() {
            fs::remove_dir_all(&self.config.cache_dir)?;
            fs::create_dir_all(&self.config.cache_dir)?;
        }
        Ok(())
    }

    /// Cached tickers, sorted
    pub fn list_cached(&self) -> GexResult<Vec<String>> {
        let mut tickers = Vec::new();

        if !self.config.cache_dir.exists() {
            return Ok(tickers);
        }

        for entry in fs::read_dir(&self.config.cache_dir)? {
            let file_name = entry?.file_name().to_string_lossy().to_string();
            if let Some(ticker) = file_name.strip_suffix(SNAPSHOT_SUFFIX) {
                tickers.push(ticker.to_string());
            }
        }

        tickers.sort();
        Ok(tickers)
    }
}

/// Cached data fetcher - combines cache with live fetching
pub struct CachedFetcher {
    cache: SnapshotCache,
    client: YahooClient,
}

impl CachedFetcher {
    pub fn new(config: CacheConfig) -> GexResult<Self> {
        Ok(Self {
            cache: SnapshotCache::new(config)?,
            client: YahooClient::new()?,
        })
    }

    pub fn cache(&self) -> &SnapshotCache {
        &self.cache
    }

    /// Nearest-expiry snapshot (from cache or fetch)
    pub fn get_snapshot(&self, ticker: &str) -> GexResult<ChainSnapshot> {
        if let Some(snapshot) = self.cache.load_snapshot(ticker, None)? {
            return Ok(snapshot);
        }

        tracing::info!(ticker, "fetching fresh chain");
        let snapshot = self.client.get_nearest_chain(ticker)?;
        self.cache.save_snapshot(&snapshot)?;

        Ok(snapshot)
    }

    /// Force refresh (bypass cache)
    pub fn refresh_snapshot(&self, ticker: &str) -> GexResult<ChainSnapshot> {
        self.cache.clear(ticker)?;
        self.get_snapshot(ticker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::OptionContract;
    use tempfile::tempdir;

    fn snapshot(ticker: &str) -> ChainSnapshot {
        ChainSnapshot::new(ticker, 600.0, NaiveDate::from_ymd_opt(2025, 3, 14).unwrap())
            .with_contracts(vec![OptionContract::call(605.0, 1000, 0.2)])
    }

    fn cache_in(dir: &std::path::Path, max_age_secs: u64) -> SnapshotCache {
        SnapshotCache::new(CacheConfig {
            cache_dir: dir.to_path_buf(),
            max_age_secs,
            enabled: true,
        })
        .unwrap()
    }

    #[test]
    fn test_cache_operations() {
        let temp_dir = tempdir().unwrap();
        let cache = cache_in(temp_dir.path(), 300);

        cache.save_snapshot(&snapshot("QQQ")).unwrap();
        assert!(cache.is_valid("QQQ"));
        assert!(cache.is_valid("qqq"));

        let loaded = cache.load_snapshot("QQQ", None).unwrap().unwrap();
        assert_eq!(loaded.underlying, "QQQ");
        assert_eq!(loaded.contracts, snapshot("QQQ").contracts);

        assert_eq!(cache.list_cached().unwrap(), vec!["QQQ".to_string()]);

        cache.clear("QQQ").unwrap();
        assert!(!cache.is_valid("QQQ"));
        assert!(cache.load_snapshot("QQQ", None).unwrap().is_none());
    }

    #[test]
    fn test_expiry_mismatch_misses() {
        let temp_dir = tempdir().unwrap();
        let cache = cache_in(temp_dir.path(), 300);
        cache.save_snapshot(&snapshot("SPY")).unwrap();

        let other = NaiveDate::from_ymd_opt(2025, 3, 21).unwrap();
        assert!(cache.load_snapshot("SPY", Some(other)).unwrap().is_none());

        let same = NaiveDate::from_ymd_opt(2025, 3, 14).unwrap();
        assert!(cache.load_snapshot("SPY", Some(same)).unwrap().is_some());
    }

    #[test]
    fn test_expired_entry_is_ignored() {
        let temp_dir = tempdir().unwrap();
        let cache = cache_in(temp_dir.path(), 0);
        cache.save_snapshot(&snapshot("QQQ")).unwrap();

        assert!(!cache.is_valid("QQQ"));
        assert!(cache.load_snapshot("QQQ", None).unwrap().is_none());
    }

    #[test]
    fn test_disabled_cache_is_noop() {
        let temp_dir = tempdir().unwrap();
        let cache = SnapshotCache::new(CacheConfig {
            cache_dir: temp_dir.path().join("never"),
            max_age_secs: 300,
            enabled: false,
        })
        .unwrap();

        cache.save_snapshot(&snapshot("QQQ")).unwrap();
        assert!(!temp_dir.path().join("never").exists());
        assert!(cache.list_cached().unwrap().is_empty());
    }

    #[test]
    fn test_clear_all() {
        let temp_dir = tempdir().unwrap();
        let cache = cache_in(temp_dir.path(), 300);
        cache.save_snapshot(&snapshot("QQQ")).unwrap();
        cache.save_snapshot(&snapshot("SPY")).unwrap();
        assert_eq!(cache.list_cached().unwrap().len(), 2);

        cache.clear_all().unwrap();
        assert!(cache.list_cached().unwrap().is_empty());
    }
}
