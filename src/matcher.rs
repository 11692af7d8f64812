//! Language matching: ranks supported languages against client preferences.
//!
//! The ranking is a pure function with no I/O. Each supported code is scored
//! against the whole preference list and the best achievable weight wins:
//!
//! - weight 3: a preferred entry equals the supported code exactly
//! - weight 2: a preferred entry's primary subtag equals the supported code
//! - weight 1: a preferred entry equals the supported code's primary subtag
//!
//! Comparison is case-insensitive throughout; results keep the supported
//! list's original casing.

/// The primary subtag of a language code: everything before the first `-`.
fn primary_subtag(code: &str) -> &str {
    code.split('-').next().unwrap_or(code)
}

/// Rank `supported` codes against the client's ordered `preferred` list,
/// best match first. Codes with no match are excluded.
///
/// Ordering: descending weight, then ascending index of the winning
/// preferred entry, then ascending index in `supported`.
pub fn rank<'a>(preferred: &[String], supported: &'a [String]) -> Vec<&'a str> {
    struct Candidate<'a> {
        code: &'a str,
        weight: u8,
        preferred_index: usize,
        supported_index: usize,
    }

    let mut result: Vec<Candidate<'a>> = Vec::new();

    for (supported_index, code) in supported.iter().enumerate() {
        let lower = code.to_lowercase();
        let primary = primary_subtag(&lower);

        let mut weight = 0u8;
        let mut preferred_index = usize::MAX;

        for (i, pref) in preferred.iter().enumerate() {
            let pref_lower = pref.to_lowercase();
            let pref_primary = primary_subtag(&pref_lower);

            let w = if pref_lower == lower {
                3
            } else if pref_primary == lower {
                2
            } else if pref_lower == primary {
                1
            } else {
                continue;
            };

            // Higher weight wins; earlier preferred entry wins a weight tie.
            if w > weight || (w == weight && i < preferred_index) {
                weight = w;
                preferred_index = i;
            }
        }

        if weight > 0 {
            result.push(Candidate {
                code: code.as_str(),
                weight,
                preferred_index,
                supported_index,
            });
        }
    }

    result.sort_by(|a, b| {
        b.weight
            .cmp(&a.weight)
            .then(a.preferred_index.cmp(&b.preferred_index))
            .then(a.supported_index.cmp(&b.supported_index))
    });

    result.into_iter().map(|c| c.code).collect()
}

/// Parse an `Accept-Language` header value into an ordered preference list.
///
/// Entries are sorted by descending quality weight (default 1.0 when no
/// `q=` parameter is present); the original order breaks ties.
pub fn parse_accept_language(header: &str) -> Vec<String> {
    let mut entries: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|part| {
            let mut pieces = part.split(';');
            let tag = pieces.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = pieces
                .find_map(|p| p.trim().strip_prefix("q=").map(str::to_string))
                .and_then(|q| q.parse::<f32>().ok())
                .unwrap_or(1.0);
            Some((tag.to_string(), quality))
        })
        .collect();

    // Stable sort keeps the original order for equal weights.
    entries.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    entries.into_iter().map(|(tag, _)| tag).collect()
}
