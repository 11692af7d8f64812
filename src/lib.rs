//! Language negotiation, lazy translation loading and localized routing
//! for web clients and server rendering.
//!
//! The crate resolves which of a fixed set of supported languages should be
//! active for a client or request, loads that language's dictionary
//! asynchronously without races, renders parameterized translation strings,
//! and normalizes URLs that carry the language as a path prefix.
//!
//! # Architecture
//!
//! - `matcher`: pure ranking of supported languages against client
//!   preferences, plus `Accept-Language` parsing
//! - `store`: the host-supplied persistence contract for the chosen language
//! - `cache`: lazy, memoized per-language dictionary loading
//! - `resolver`: dotted-key lookup, fallback and compile-once templates
//! - `session`: the active language and the race-safe switch protocol
//! - `url` / `router`: prefix-aware URL normalization and per-navigation
//!   guard decisions for the host router
//!
//! # Example
//!
//! ```rust,ignore
//! use i18n_session::{Config, Session};
//! use std::sync::Arc;
//!
//! let config = Arc::new(
//!     Config::builder()
//!         .static_language("en", serde_json::json!({"hello": "Hello, {name}!"}))
//!         .static_language("fr", serde_json::json!({"hello": "Bonjour, {name}!"}))
//!         .default_language("en")
//!         .fallback_language("en")
//!         .build()?,
//! );
//!
//! let session = Session::new(config)
//!     .with_client_languages(vec!["fr-CA".to_string()]);
//! session.init().await?;
//! let greeting = session.translate("hello", Some(&serde_json::json!({"name": "Ada"})));
//! ```

pub mod cache;
pub mod config;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod router;
pub mod session;
pub mod store;
pub mod url;

pub use cache::{LanguageDataCache, LanguageState};
pub use config::{Config, ConfigBuilder, LanguageSource, RouteMatcher, SupportedLanguages};
pub use error::{Error, Result};
pub use resolver::TranslationResolver;
pub use router::{
    route_prefix_pattern, universal_route_prefix_pattern, Navigation, RouteDecision, RouteGuard,
};
pub use session::Session;
pub use store::{MemoryStore, PreferenceStore};
pub use url::{build_url, TrailingSlashes};
