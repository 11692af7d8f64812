//! Language-prefixed URL construction and trailing-slash normalization.

use serde::{Deserialize, Serialize};

/// Trailing-slash policy applied by [`build_url`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingSlashes {
    /// Strip all trailing slashes; the bare root collapses to `/`.
    None,
    /// Ensure exactly one trailing slash.
    Always,
    /// Keep a trailing slash only for the bare prefix root (`/lang/`),
    /// strip it everywhere else.
    Prefix,
}

/// Build a normalized absolute path from an optional language prefix and a
/// path. Leading slashes on `path` are collapsed; `policy == None` preserves
/// the input's trailing-slash shape unchanged.
pub fn build_url(prefix: &str, path: &str, policy: Option<TrailingSlashes>) -> String {
    let base = if prefix.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", prefix)
    };
    let url = format!("{}{}", base, path.trim_start_matches('/'));
    let stripped = url.trim_end_matches('/');

    match policy {
        None => url,
        Some(TrailingSlashes::None) => non_empty_or_root(stripped),
        Some(TrailingSlashes::Prefix) => {
            if !prefix.is_empty() && url == base {
                url
            } else {
                non_empty_or_root(stripped)
            }
        }
        Some(TrailingSlashes::Always) => format!("{}/", stripped),
    }
}

fn non_empty_or_root(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_policy_deserializes_from_lowercase_names() {
        let policy: TrailingSlashes = serde_json::from_str("\"prefix\"").unwrap();
        assert_eq!(policy, TrailingSlashes::Prefix);
        let policy: TrailingSlashes = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(policy, TrailingSlashes::None);
    }

    #[test]
    fn test_prefix_and_leading_slashes() {
        assert_eq!(build_url("fr", "/about", None), "/fr/about");
        assert_eq!(build_url("fr", "///about", None), "/fr/about");
        assert_eq!(build_url("", "about", None), "/about");
    }

    #[test]
    fn test_preserve_policy_keeps_trailing_shape() {
        assert_eq!(build_url("fr", "about/", None), "/fr/about/");
        assert_eq!(build_url("fr", "about", None), "/fr/about");
        assert_eq!(build_url("", "", None), "/");
    }

    #[test]
    fn test_none_policy_strips_trailing_slashes() {
        let policy = Some(TrailingSlashes::None);
        assert_eq!(build_url("fr", "about/", policy), "/fr/about");
        assert_eq!(build_url("fr", "", policy), "/fr");
        assert_eq!(build_url("", "", policy), "/");
        assert_eq!(build_url("", "///", policy), "/");
    }

    #[test]
    fn test_always_policy_ensures_one_trailing_slash() {
        let policy = Some(TrailingSlashes::Always);
        assert_eq!(build_url("fr", "about", policy), "/fr/about/");
        assert_eq!(build_url("fr", "about//", policy), "/fr/about/");
        assert_eq!(build_url("", "", policy), "/");
    }

    #[test]
    fn test_prefix_policy_keeps_slash_only_at_prefix_root() {
        let policy = Some(TrailingSlashes::Prefix);
        assert_eq!(build_url("fr", "", policy), "/fr/");
        assert_eq!(build_url("fr", "about/", policy), "/fr/about");
        assert_eq!(build_url("", "about/", policy), "/about");
        assert_eq!(build_url("", "", policy), "/");
    }

    proptest! {
        // Re-normalizing a normalized URL is a no-op for every policy.
        #[test]
        fn prop_build_url_is_a_fixed_point(
            prefix in prop_oneof![Just(String::new()), Just("fr".to_string())],
            path in "[a-z/]{0,12}",
            policy in prop_oneof![
                Just(None),
                Just(Some(TrailingSlashes::None)),
                Just(Some(TrailingSlashes::Always)),
                Just(Some(TrailingSlashes::Prefix)),
            ],
        ) {
            let once = build_url(&prefix, &path, policy);
            let remainder = if prefix.is_empty() {
                once.clone()
            } else {
                once.strip_prefix(&format!("/{}/", prefix))
                    .or_else(|| once.strip_prefix(&format!("/{}", prefix)))
                    .unwrap_or(&once)
                    .to_string()
            };
            let twice = build_url(&prefix, &remainder, policy);
            prop_assert_eq!(once, twice);
        }
    }
}
