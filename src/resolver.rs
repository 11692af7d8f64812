//! Translation lookup and parameterized rendering.
//!
//! Keys address nested dictionary entries by dotted path. A resolved string
//! rendered with params goes through a compiled template, cached per
//! (language, key) pair; dictionaries are loaded at most once per process,
//! so cached templates never go stale.
//!
//! Template syntax has two marker families: `{path}` inserts the value
//! as-is, `{{path}}` HTML-escapes it. Marker paths resolve against the
//! params first, then against the language dictionary's own entries, which
//! lets strings reference sibling translations.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock};

use regex::Regex;
use serde_json::Value;
use tracing::debug;

use crate::cache::LanguageDataCache;

/// Walk a dotted path into a nested dictionary.
pub fn lookup<'a>(dictionary: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = dictionary;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn marker_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // `{{..}}` must be tried before `{..}`.
        Regex::new(r"\{\{([^{}]+)\}\}|\{([^{}]+)\}").expect("valid literal pattern")
    })
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Marker { path: String, escape: bool },
}

/// A translation string compiled into literal and marker segments.
#[derive(Debug, Clone)]
struct Template {
    segments: Vec<Segment>,
}

impl Template {
    fn compile(text: &str) -> Self {
        let mut segments = Vec::new();
        let mut last = 0;

        for captures in marker_regex().captures_iter(text) {
            let whole = captures.get(0).expect("match has a full capture");
            if whole.start() > last {
                segments.push(Segment::Literal(text[last..whole.start()].to_string()));
            }

            let (path, escape) = match (captures.get(1), captures.get(2)) {
                (Some(escaped), _) => (escaped.as_str(), true),
                (None, Some(plain)) => (plain.as_str(), false),
                (None, None) => unreachable!("one alternative always captures"),
            };
            segments.push(Segment::Marker {
                path: path.trim().to_string(),
                escape,
            });
            last = whole.end();
        }

        if last < text.len() {
            segments.push(Segment::Literal(text[last..].to_string()));
        }

        Template { segments }
    }

    fn render(&self, params: &Value, dictionary: &Value) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Marker { path, escape } => {
                    let value = lookup(params, path).or_else(|| lookup(dictionary, path));
                    let text = match value {
                        Some(value) => fragment_to_string(value),
                        None => {
                            debug!(path, "template marker did not resolve");
                            String::new()
                        }
                    };
                    if *escape {
                        out.push_str(&html_escape(&text));
                    } else {
                        out.push_str(&text);
                    }
                }
            }
        }
        out
    }
}

fn fragment_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Resolves keys against loaded dictionaries with single-level fallback and
/// a compile-once template cache.
pub struct TranslationResolver {
    fallback_language: Option<String>,
    templates: Mutex<HashMap<(String, String), Arc<Template>>>,
}

impl TranslationResolver {
    pub fn new(fallback_language: Option<String>) -> Self {
        Self {
            fallback_language,
            templates: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `key` in `language`'s dictionary.
    ///
    /// Returns `None` when the dictionary is not loaded (loading is the
    /// caller's job) or the key is absent everywhere. Non-string values and
    /// param-less calls return the raw value; a string with params renders
    /// through the cached template.
    pub fn resolve(
        &self,
        cache: &LanguageDataCache,
        language: &str,
        key: &str,
        params: Option<&Value>,
    ) -> Option<Value> {
        let dictionary = cache.dictionary(language)?;

        if let Some(params) = params {
            if let Some(template) = self.cached_template(language, key) {
                return Some(Value::String(template.render(params, dictionary)));
            }
        }

        match lookup(dictionary, key) {
            None => match self.fallback_language.as_deref() {
                Some(fallback) if fallback != language => {
                    self.resolve(cache, fallback, key, params)
                }
                _ => None,
            },
            Some(value) => {
                let (text, params) = match (value.as_str(), params) {
                    (Some(text), Some(params)) => (text, params),
                    _ => return Some(value.clone()),
                };

                let template = self.compile_template(language, key, text);
                Some(Value::String(template.render(params, dictionary)))
            }
        }
    }

    fn cached_template(&self, language: &str, key: &str) -> Option<Arc<Template>> {
        let templates = self.templates.lock().expect("template cache lock");
        templates
            .get(&(language.to_string(), key.to_string()))
            .cloned()
    }

    fn compile_template(&self, language: &str, key: &str, text: &str) -> Arc<Template> {
        let mut templates = self.templates.lock().expect("template cache lock");
        templates
            .entry((language.to_string(), key.to_string()))
            .or_insert_with(|| {
                debug!(language, key, "compiling translation template");
                Arc::new(Template::compile(text))
            })
            .clone()
    }
}
