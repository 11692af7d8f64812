//! Error types for language resolution and loading.

use thiserror::Error;

/// Errors surfaced by sessions, caches and route guards.
#[derive(Debug, Error)]
pub enum Error {
    /// A language code outside the configured supported set was requested.
    ///
    /// Raised by `set_language`, route-prefix construction and route-guard
    /// prefix validation. Never silently coerced to the default language.
    #[error("language {0:?} is not supported")]
    UnsupportedLanguage(String),

    /// The configuration is unusable; raised by the builder before any use.
    #[error("missing configuration: {0}")]
    MissingConfiguration(&'static str),

    /// A language-data loader rejected. The cache entry is reset so a later
    /// request retries the fetch.
    #[error("failed to load language data for {code:?}")]
    Loader {
        code: String,
        #[source]
        source: anyhow::Error,
    },

    /// The preference store failed to load the saved language.
    #[error("preference store failed")]
    Store(#[source] anyhow::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
