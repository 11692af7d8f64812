//! Session configuration: supported languages, data sources and router
//! options, validated once at construction time.

use std::collections::HashMap;
use std::fmt;

use futures::future::BoxFuture;
use regex::Regex;
use serde_json::Value;

use crate::error::{Error, Result};
use crate::url::TrailingSlashes;

/// Where a language's dictionary comes from: a value known up front, or an
/// async factory invoked on first use (e.g. a dynamic import or an HTTP
/// fetch supplied by the host).
///
/// Loaders return the dictionary directly; hosts with module-shaped payloads
/// unwrap them in their own adapter closure.
pub enum LanguageSource {
    Static(Value),
    Loader(Box<dyn Fn() -> BoxFuture<'static, anyhow::Result<Value>> + Send + Sync>),
}

impl fmt::Debug for LanguageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LanguageSource::Static(_) => f.write_str("LanguageSource::Static"),
            LanguageSource::Loader(_) => f.write_str("LanguageSource::Loader"),
        }
    }
}

/// The ordered, fixed set of supported language codes.
///
/// Identity is case-insensitive; the casing given at configuration time is
/// canonical and is what every lookup returns.
#[derive(Debug, Clone, Default)]
pub struct SupportedLanguages {
    codes: Vec<String>,
}

impl SupportedLanguages {
    /// Resolve `code` to its canonical casing, or `None` if unsupported.
    pub fn canonical(&self, code: &str) -> Option<&str> {
        self.codes
            .iter()
            .find(|c| c.eq_ignore_ascii_case(code))
            .map(String::as_str)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.canonical(code).is_some()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.codes
    }

    /// Resolve `code` or fail with [`Error::UnsupportedLanguage`].
    pub fn require(&self, code: &str) -> Result<&str> {
        self.canonical(code)
            .ok_or_else(|| Error::UnsupportedLanguage(code.to_string()))
    }
}

/// Matches route names that should be treated as not-found pages.
#[derive(Debug, Clone)]
pub enum RouteMatcher {
    Exact(String),
    Pattern(Regex),
}

impl RouteMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            RouteMatcher::Exact(exact) => exact == name,
            RouteMatcher::Pattern(re) => re.is_match(name),
        }
    }
}

/// Validated configuration shared by every session built from it.
#[derive(Debug)]
pub struct Config {
    sources: HashMap<String, LanguageSource>,
    supported: SupportedLanguages,
    default_language: String,
    fallback_language: Option<String>,
    prefix_param: String,
    prefix_for_default_language: bool,
    trailing_slashes: Option<TrailingSlashes>,
    not_found_routes: Vec<RouteMatcher>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn supported(&self) -> &SupportedLanguages {
        &self.supported
    }

    pub fn source(&self, canonical_code: &str) -> Option<&LanguageSource> {
        self.sources.get(canonical_code)
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub fn fallback_language(&self) -> Option<&str> {
        self.fallback_language.as_deref()
    }

    pub fn prefix_param(&self) -> &str {
        &self.prefix_param
    }

    pub fn prefix_for_default_language(&self) -> bool {
        self.prefix_for_default_language
    }

    pub fn trailing_slashes(&self) -> Option<TrailingSlashes> {
        self.trailing_slashes
    }

    pub fn is_not_found_route(&self, name: &str) -> bool {
        self.not_found_routes.iter().any(|m| m.matches(name))
    }
}

/// Builder for [`Config`]; `build` fails fast on unusable configuration.
pub struct ConfigBuilder {
    sources: Vec<(String, LanguageSource)>,
    default_language: Option<String>,
    fallback_language: Option<String>,
    prefix_param: String,
    prefix_for_default_language: bool,
    trailing_slashes: Option<TrailingSlashes>,
    not_found_routes: Option<Vec<RouteMatcher>>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            default_language: None,
            fallback_language: None,
            prefix_param: "lang".to_string(),
            prefix_for_default_language: true,
            trailing_slashes: None,
            not_found_routes: None,
        }
    }
}

impl ConfigBuilder {
    /// Register a supported language. Insertion order defines the supported
    /// set's order; re-registering a code replaces its source.
    pub fn language(mut self, code: impl Into<String>, source: LanguageSource) -> Self {
        let code = code.into();
        if let Some(existing) = self
            .sources
            .iter_mut()
            .find(|(c, _)| c.eq_ignore_ascii_case(&code))
        {
            existing.1 = source;
        } else {
            self.sources.push((code, source));
        }
        self
    }

    /// Register a language with a dictionary known up front.
    pub fn static_language(self, code: impl Into<String>, dictionary: Value) -> Self {
        self.language(code, LanguageSource::Static(dictionary))
    }

    pub fn default_language(mut self, code: impl Into<String>) -> Self {
        self.default_language = Some(code.into());
        self
    }

    pub fn fallback_language(mut self, code: impl Into<String>) -> Self {
        self.fallback_language = Some(code.into());
        self
    }

    pub fn prefix_param(mut self, name: impl Into<String>) -> Self {
        self.prefix_param = name.into();
        self
    }

    pub fn prefix_for_default_language(mut self, enabled: bool) -> Self {
        self.prefix_for_default_language = enabled;
        self
    }

    pub fn trailing_slashes(mut self, policy: TrailingSlashes) -> Self {
        self.trailing_slashes = Some(policy);
        self
    }

    /// Replace the not-found route matchers (default: `(?i)not.*found`).
    pub fn not_found_routes(mut self, matchers: Vec<RouteMatcher>) -> Self {
        self.not_found_routes = Some(matchers);
        self
    }

    pub fn build(self) -> Result<Config> {
        if self.sources.is_empty() {
            return Err(Error::MissingConfiguration("no languages registered"));
        }

        let supported = SupportedLanguages {
            codes: self.sources.iter().map(|(c, _)| c.clone()).collect(),
        };

        let default_language = self
            .default_language
            .ok_or(Error::MissingConfiguration("default language not set"))?;
        let default_language = supported
            .canonical(&default_language)
            .ok_or(Error::MissingConfiguration(
                "default language is not a registered language",
            ))?
            .to_string();

        let fallback_language = match self.fallback_language {
            Some(code) => Some(
                supported
                    .canonical(&code)
                    .ok_or(Error::MissingConfiguration(
                        "fallback language is not a registered language",
                    ))?
                    .to_string(),
            ),
            None => None,
        };

        let not_found_routes = self.not_found_routes.unwrap_or_else(|| {
            let pattern = Regex::new("(?i)not.*found").expect("valid literal pattern");
            vec![RouteMatcher::Pattern(pattern)]
        });

        Ok(Config {
            sources: self.sources.into_iter().collect(),
            supported,
            default_language,
            fallback_language,
            prefix_param: self.prefix_param,
            prefix_for_default_language: self.prefix_for_default_language,
            trailing_slashes: self.trailing_slashes,
            not_found_routes,
        })
    }
}
