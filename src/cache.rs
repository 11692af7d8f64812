//! Lazy, memoized loading of per-language translation dictionaries.
//!
//! Each supported code owns one entry, tri-state: unrequested, loading, or
//! loaded. Dictionaries are fetched at most once; the entry is marked
//! requested before the fetch's first suspension point, and concurrent first
//! requests share one in-flight fetch through the entry's `OnceCell`. Loaded
//! entries never revert, so reads need no synchronization beyond the cell.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::debug;

use crate::config::{Config, LanguageSource};
use crate::error::{Error, Result};

/// Load state of one language's dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageState {
    Unrequested,
    Loading,
    Loaded,
}

struct CacheEntry {
    requested: AtomicBool,
    cell: OnceCell<Value>,
}

/// Memoized dictionary cache over the configured language sources.
pub struct LanguageDataCache {
    config: Arc<Config>,
    entries: HashMap<String, CacheEntry>,
}

impl LanguageDataCache {
    pub fn new(config: Arc<Config>) -> Self {
        let entries = config
            .supported()
            .as_slice()
            .iter()
            .map(|code| {
                (
                    code.clone(),
                    CacheEntry {
                        requested: AtomicBool::new(false),
                        cell: OnceCell::new(),
                    },
                )
            })
            .collect();
        Self { config, entries }
    }

    /// Ensure `code`'s dictionary is loaded, fetching it on first request.
    ///
    /// Idempotent: once an entry is loaded (or currently loading) no second
    /// fetch is started; concurrent callers await the same fetch. A failed
    /// fetch leaves the entry re-requestable and surfaces [`Error::Loader`]
    /// to the awaiting caller. Expects the canonical code.
    pub async fn ensure_loaded(&self, code: &str) -> Result<&Value> {
        let entry = self
            .entries
            .get(code)
            .ok_or_else(|| Error::UnsupportedLanguage(code.to_string()))?;

        // Mark before the first await so loading_codes() sees the request
        // immediately.
        entry.requested.store(true, Ordering::SeqCst);

        let result = entry
            .cell
            .get_or_try_init(|| self.fetch(code))
            .await;

        if result.is_err() && entry.cell.get().is_none() {
            entry.requested.store(false, Ordering::SeqCst);
        }
        result
    }

    async fn fetch(&self, code: &str) -> Result<Value> {
        match self.config.source(code) {
            Some(LanguageSource::Static(value)) => Ok(value.clone()),
            Some(LanguageSource::Loader(factory)) => {
                debug!(code, "fetching language data");
                let value = factory().await.map_err(|source| Error::Loader {
                    code: code.to_string(),
                    source,
                })?;
                debug!(code, "language data loaded");
                Ok(value)
            }
            None => Err(Error::UnsupportedLanguage(code.to_string())),
        }
    }

    /// The loaded dictionary for `code`, if any. Never triggers a fetch.
    pub fn dictionary(&self, code: &str) -> Option<&Value> {
        self.entries.get(code).and_then(|entry| entry.cell.get())
    }

    pub fn state(&self, code: &str) -> LanguageState {
        match self.entries.get(code) {
            Some(entry) if entry.cell.get().is_some() => LanguageState::Loaded,
            Some(entry) if entry.requested.load(Ordering::SeqCst) => LanguageState::Loading,
            _ => LanguageState::Unrequested,
        }
    }

    /// Snapshot of codes currently loading, in supported-set order. Intended
    /// for loading-indicator consumers.
    pub fn loading_codes(&self) -> Vec<String> {
        self.config
            .supported()
            .as_slice()
            .iter()
            .filter(|code| self.state(code) == LanguageState::Loading)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;

    fn static_config() -> Arc<Config> {
        Arc::new(
            Config::builder()
                .static_language("en", json!({"hello": "Hello"}))
                .static_language("fr", json!({"hello": "Bonjour"}))
                .default_language("en")
                .build()
                .unwrap(),
        )
    }

    #[tokio::test]
    async fn test_static_dictionary_loads() {
        let cache = LanguageDataCache::new(static_config());
        let value = cache.ensure_loaded("en").await.unwrap();
        assert_eq!(value["hello"], "Hello");
        assert_eq!(cache.state("en"), LanguageState::Loaded);
        assert_eq!(cache.state("fr"), LanguageState::Unrequested);
    }

    #[tokio::test]
    async fn test_ensure_loaded_is_idempotent() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let fetches_in_loader = Arc::clone(&fetches);
        let config = Arc::new(
            Config::builder()
                .language(
                    "en",
                    LanguageSource::Loader(Box::new(move || {
                        let fetches = Arc::clone(&fetches_in_loader);
                        Box::pin(async move {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            Ok(json!({"hello": "Hello"}))
                        })
                    })),
                )
                .default_language("en")
                .build()
                .unwrap(),
        );

        let cache = LanguageDataCache::new(config);
        cache.ensure_loaded("en").await.unwrap();
        cache.ensure_loaded("en").await.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_first_requests_share_one_fetch() {
        let fetches = Arc::new(AtomicUsize::new(0));
        let fetches_in_loader = Arc::clone(&fetches);
        let config = Arc::new(
            Config::builder()
                .language(
                    "en",
                    LanguageSource::Loader(Box::new(move || {
                        let fetches = Arc::clone(&fetches_in_loader);
                        Box::pin(async move {
                            fetches.fetch_add(1, Ordering::SeqCst);
                            tokio::task::yield_now().await;
                            Ok(json!({}))
                        })
                    })),
                )
                .default_language("en")
                .build()
                .unwrap(),
        );

        let cache = LanguageDataCache::new(config);
        let (a, b) = tokio::join!(cache.ensure_loaded("en"), cache.ensure_loaded("en"));
        a.unwrap();
        b.unwrap();
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_load_resets_for_retry() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let attempts_in_loader = Arc::clone(&attempts);
        let config = Arc::new(
            Config::builder()
                .language(
                    "en",
                    LanguageSource::Loader(Box::new(move || {
                        let attempts = Arc::clone(&attempts_in_loader);
                        Box::pin(async move {
                            if attempts.fetch_add(1, Ordering::SeqCst) == 0 {
                                anyhow::bail!("fetch failed");
                            }
                            Ok(json!({"hello": "Hello"}))
                        })
                    })),
                )
                .default_language("en")
                .build()
                .unwrap(),
        );

        let cache = LanguageDataCache::new(config);
        let err = cache.ensure_loaded("en").await.unwrap_err();
        assert!(matches!(err, Error::Loader { ref code, .. } if code == "en"));
        assert_eq!(cache.state("en"), LanguageState::Unrequested);

        cache.ensure_loaded("en").await.unwrap();
        assert_eq!(cache.state("en"), LanguageState::Loaded);
    }

    #[tokio::test]
    async fn test_loading_codes_snapshot() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let gate_in_loader = Arc::clone(&gate);
        let config = Arc::new(
            Config::builder()
                .language(
                    "en",
                    LanguageSource::Loader(Box::new(move || {
                        let gate = Arc::clone(&gate_in_loader);
                        Box::pin(async move {
                            gate.notified().await;
                            Ok(json!({}))
                        })
                    })),
                )
                .static_language("fr", json!({}))
                .default_language("en")
                .build()
                .unwrap(),
        );

        let cache = Arc::new(LanguageDataCache::new(config));
        assert!(cache.loading_codes().is_empty());

        let loading = Arc::clone(&cache);
        let task = tokio::spawn(async move { loading.ensure_loaded("en").await.map(|_| ()) });
        tokio::task::yield_now().await;
        assert_eq!(cache.loading_codes(), vec!["en".to_string()]);

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(cache.loading_codes().is_empty());
        assert_eq!(cache.state("en"), LanguageState::Loaded);
    }

    #[tokio::test]
    async fn test_unknown_code_is_rejected() {
        let cache = LanguageDataCache::new(static_config());
        let err = cache.ensure_loaded("xx").await.unwrap_err();
        assert!(matches!(err, Error::UnsupportedLanguage(code) if code == "xx"));
    }

    #[test]
    fn test_dictionary_returns_none_before_load() {
        let cache = LanguageDataCache::new(static_config());
        assert!(cache.dictionary("en").is_none());
    }
}
