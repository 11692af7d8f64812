//! Route-guard decisions for language-prefixed navigation.
//!
//! The host router calls [`RouteGuard::check`] on every navigation and acts
//! on the returned decision: serve a not-found page, redirect, or proceed.
//! Proceeding switches the session language, either awaited before the
//! navigation settles or fired without blocking it.

use std::sync::Arc;

use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::session::Session;
use crate::url::build_url;

/// One navigation event as reported by the host router.
///
/// `lang_param` is the parsed language-prefix parameter: `None` when the
/// matched route carries no prefix segment, `Some("")` when an optional
/// prefix segment matched empty, and the raw segment text otherwise.
#[derive(Debug, Clone, Copy)]
pub struct Navigation<'a> {
    pub full_path: &'a str,
    pub lang_param: Option<&'a str>,
    pub route_name: Option<&'a str>,
}

/// What the host router should do with a navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteDecision {
    /// Continue to the requested route; the language switch has been issued.
    Proceed,
    /// Navigate to this path instead (302 semantics server-side).
    Redirect(String),
    /// Serve the not-found page; no redirect, no language switch.
    NotFound,
}

pub struct RouteGuard {
    session: Arc<Session>,
    navigate_immediately: bool,
}

impl RouteGuard {
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            navigate_immediately: true,
        }
    }

    /// When `false`, `check` awaits the language switch before returning
    /// `Proceed`; when `true` (the default) the switch is spawned and
    /// navigation is not blocked by dictionary loading.
    pub fn navigate_immediately(mut self, enabled: bool) -> Self {
        self.navigate_immediately = enabled;
        self
    }

    pub async fn check(&self, nav: Navigation<'_>) -> Result<RouteDecision> {
        let config = self.session.config();
        let policy = config.trailing_slashes();

        if let Some(name) = nav.route_name {
            if config.is_not_found_route(name) {
                return Ok(RouteDecision::NotFound);
            }
        }

        // Validate a non-empty prefix up front; an unsupported prefix is the
        // caller's error, never coerced.
        let raw_prefix = nav.lang_param.filter(|p| !p.is_empty());
        let prefix = match raw_prefix {
            Some(raw) => Some(config.supported().require(raw)?),
            None => None,
        };

        if let Some(prefix) = prefix {
            if !config.prefix_for_default_language() && prefix == config.default_language() {
                let rest = strip_prefix_segment(nav.full_path, raw_prefix.unwrap_or_default());
                return Ok(RouteDecision::Redirect(build_url("", rest, policy)));
            }
        }

        if config.prefix_for_default_language() && nav.lang_param == Some("") {
            let language = self.session.preferred_or_best().await?;
            return Ok(RouteDecision::Redirect(build_url(
                &language,
                nav.full_path,
                policy,
            )));
        }

        let normalized = match prefix {
            Some(prefix) => build_url(
                prefix,
                strip_prefix_segment(nav.full_path, raw_prefix.unwrap_or_default()),
                policy,
            ),
            None => build_url("", nav.full_path, policy),
        };
        if normalized != nav.full_path {
            return Ok(RouteDecision::Redirect(normalized));
        }

        let language = match (prefix, nav.lang_param) {
            (Some(prefix), _) => prefix.to_string(),
            (None, Some("")) => config.default_language().to_string(),
            (None, _) => self.session.preferred_or_best().await?,
        };

        if self.navigate_immediately {
            let session = Arc::clone(&self.session);
            tokio::spawn(async move {
                if let Err(error) = session.set_language(&language, false).await {
                    warn!(%error, "language switch during navigation failed");
                }
            });
        } else {
            self.session.set_language(&language, false).await?;
        }

        Ok(RouteDecision::Proceed)
    }
}

/// The path with its leading `/{prefix}` segment removed.
fn strip_prefix_segment<'a>(full_path: &'a str, raw_prefix: &str) -> &'a str {
    full_path.get(raw_prefix.len() + 1..).unwrap_or("")
}

/// Host-router path pattern matching one language's prefix, e.g.
/// `/:lang(en)`; optional (`?`) when it is the default language.
pub fn route_prefix_pattern(config: &Config, code: &str) -> Result<String> {
    let code = config.supported().require(code)?;
    let optional = code == config.default_language();
    Ok(pattern(config, &[code], optional))
}

/// Host-router path pattern matching any supported language's prefix,
/// always optional, e.g. `/:lang(en|fr)?`.
pub fn universal_route_prefix_pattern(config: &Config) -> String {
    let codes: Vec<&str> = config
        .supported()
        .as_slice()
        .iter()
        .map(String::as_str)
        .collect();
    pattern(config, &codes, true)
}

fn pattern(config: &Config, codes: &[&str], optional: bool) -> String {
    format!(
        "/:{}({}){}",
        config.prefix_param(),
        codes.join("|"),
        if optional { "?" } else { "" }
    )
}
