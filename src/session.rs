//! The per-configuration language session.
//!
//! A session owns the active language, the dictionary cache and the
//! preference-resolution pipeline. One process may host several independent
//! sessions (e.g. one per server-rendering request) without interference;
//! there is no global state.
//!
//! Switch ordering is arbitrated by a generation counter: every
//! `set_language` call stamps a fresh generation before awaiting its loads
//! and commits only if no later call has stamped a newer one. A slow, stale
//! load can therefore never clobber a more recent switch.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::LanguageDataCache;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::matcher;
use crate::resolver::TranslationResolver;
use crate::store::PreferenceStore;

pub struct Session {
    config: Arc<Config>,
    cache: LanguageDataCache,
    resolver: TranslationResolver,
    store: Option<Arc<dyn PreferenceStore>>,
    client_languages: Vec<String>,
    current: watch::Sender<Option<String>>,
    generation: AtomicU64,
    preferred: tokio::sync::Mutex<Option<Option<String>>>,
    best: OnceLock<String>,
}

impl Session {
    pub fn new(config: Arc<Config>) -> Self {
        let cache = LanguageDataCache::new(Arc::clone(&config));
        let resolver =
            TranslationResolver::new(config.fallback_language().map(str::to_string));
        let (current, _) = watch::channel(None);
        Self {
            config,
            cache,
            resolver,
            store: None,
            client_languages: Vec::new(),
            current,
            generation: AtomicU64::new(0),
            preferred: tokio::sync::Mutex::new(None),
            best: OnceLock::new(),
        }
    }

    /// Attach the host's preference store.
    pub fn with_store(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Supply the client's ordered language preferences (browser-reported
    /// list, or [`matcher::parse_accept_language`] output server-side).
    pub fn with_client_languages(mut self, languages: Vec<String>) -> Self {
        self.client_languages = languages;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cache(&self) -> &LanguageDataCache {
        &self.cache
    }

    /// The active language, if a switch has committed.
    pub fn current_language(&self) -> Option<String> {
        self.current.borrow().clone()
    }

    pub fn initialized(&self) -> bool {
        self.current.borrow().is_some()
    }

    /// Observe language changes; the receiver yields the canonical code of
    /// every committed switch.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.current.subscribe()
    }

    /// Codes whose dictionary fetch is currently in flight.
    pub fn loading_languages(&self) -> Vec<String> {
        self.cache.loading_codes()
    }

    /// Translate `key` in the active language. `None` before initialization.
    pub fn translate(&self, key: &str, params: Option<&Value>) -> Option<Value> {
        let language = self.current_language()?;
        self.resolver.resolve(&self.cache, &language, key, params)
    }

    /// Translate `key` in an explicit language (which must be loaded).
    pub fn translate_in(&self, language: &str, key: &str, params: Option<&Value>) -> Option<Value> {
        self.resolver.resolve(&self.cache, language, key, params)
    }

    /// Switch the active language.
    ///
    /// Validates membership, optionally persists the choice (without
    /// blocking the switch), loads the target dictionary (and the fallback's,
    /// concurrently, when one is configured) and commits unless a newer call
    /// superseded this one in the meantime. A superseded call returns `Ok`
    /// without mutating; check [`Session::current_language`] after awaiting
    /// when that matters.
    pub async fn set_language(&self, code: &str, persist: bool) -> Result<()> {
        let code = self.config.supported().require(code)?.to_string();

        if persist {
            self.remember_preference(&code).await;
        }

        // A no-op switch never re-fetches.
        if self.current_language().as_deref() == Some(code.as_str()) {
            return Ok(());
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        match self.config.fallback_language() {
            Some(fallback) if fallback != code => {
                futures::try_join!(
                    self.cache.ensure_loaded(&code),
                    self.cache.ensure_loaded(fallback),
                )?;
            }
            _ => {
                self.cache.ensure_loaded(&code).await?;
            }
        }

        if self.generation.load(Ordering::SeqCst) == generation {
            info!(language = %code, "language switched");
            self.current.send_replace(Some(code));
        } else {
            debug!(language = %code, "language switch superseded, result discarded");
        }
        Ok(())
    }

    /// Initialize the session from the preference pipeline.
    pub async fn init(&self) -> Result<()> {
        let language = self.preferred_or_best().await?;
        self.set_language(&language, false).await
    }

    async fn remember_preference(&self, code: &str) {
        *self.preferred.lock().await = Some(Some(code.to_string()));

        // Fire-and-forget: the store's outcome never blocks or fails the
        // switch itself.
        if let Some(store) = self.store.clone() {
            let code = code.to_string();
            tokio::spawn(async move {
                if let Err(error) = store.save(&code).await {
                    warn!(%error, "failed to persist language preference");
                }
            });
        }
    }

    /// The previously chosen language, memoized for the session lifetime.
    ///
    /// Loads from the store once; an unsupported or absent saved code
    /// memoizes as `None`. Only an explicit `set_language(_, persist: true)`
    /// overwrites the memo.
    pub async fn preferred(&self) -> Result<Option<String>> {
        let mut memo = self.preferred.lock().await;
        if let Some(cached) = memo.as_ref() {
            return Ok(cached.clone());
        }

        let loaded = match &self.store {
            Some(store) => store.load().await.map_err(Error::Store)?,
            None => None,
        };
        let validated = loaded
            .as_deref()
            .and_then(|code| self.config.supported().canonical(code))
            .map(str::to_string);

        *memo = Some(validated.clone());
        Ok(validated)
    }

    /// The best supported match for the client's reported preferences,
    /// memoized; the configured default when nothing matches.
    pub fn best(&self) -> &str {
        self.best.get_or_init(|| {
            let ranked = matcher::rank(&self.client_languages, self.config.supported().as_slice());
            match ranked.first() {
                Some(code) => code.to_string(),
                None => self.config.default_language().to_string(),
            }
        })
    }

    /// The stored preference when valid, otherwise the best client match.
    pub async fn preferred_or_best(&self) -> Result<String> {
        Ok(match self.preferred().await? {
            Some(code) => code,
            None => self.best().to_string(),
        })
    }
}
