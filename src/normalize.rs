//! Query normalization: split raw location text into a city token and an
//! optional state/province/country modifier.
//!
//! Comma splitting wins when the user typed one ("london, on"); otherwise
//! a longest-match suffix scan peels a known state or country name off the
//! end ("Frederick Maryland"). Everything else passes through as a bare
//! city token.

use crate::gazetteer::GazetteerStore;
use crate::types::{ModifierKind, NormalizedQuery};

/// Splits raw text against the gazetteer's name tables.
///
/// Pure and synchronous; holds only a borrow of the store.
pub struct QueryNormalizer<'a> {
    store: &'a GazetteerStore,
}

impl<'a> QueryNormalizer<'a> {
    pub fn new(store: &'a GazetteerStore) -> Self {
        Self { store }
    }

    /// Normalize arbitrary text. Never fails: empty or unrecognized input
    /// yields the whole (trimmed) text as the city token with no modifier.
    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        // Comma form: first part is the city, second the modifier.
        // Empty parts are dropped, which also collapses ",," runs, so the
        // output can never hold consecutive commas or more than one comma.
        let parts: Vec<&str> = raw
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.len() >= 2 {
            let city = collapse_ws(parts[0]);
            let modifier = collapse_ws(parts[1]);
            let kind = self.store.modifier_kind(&modifier);
            return NormalizedQuery {
                city,
                modifier: Some(modifier),
                kind,
                raw: raw.to_string(),
            };
        }

        let text = parts.first().copied().unwrap_or("");
        let words: Vec<&str> = text.split_whitespace().collect();

        // Suffix form: longest trailing word-run that names a known state
        // or country becomes the modifier. The city part must stay
        // non-empty, so a query that IS a state name stays a city token.
        let max_tail = self
            .store
            .max_modifier_words()
            .min(words.len().saturating_sub(1));
        for tail_len in (1..=max_tail).rev() {
            let tail = words[words.len() - tail_len..].join(" ");
            let kind = self.store.modifier_kind(&tail);
            if kind != ModifierKind::None {
                return NormalizedQuery {
                    city: words[..words.len() - tail_len].join(" "),
                    modifier: Some(tail),
                    kind,
                    raw: raw.to_string(),
                };
            }
        }

        NormalizedQuery {
            city: words.join(" "),
            modifier: None,
            kind: ModifierKind::None,
            raw: raw.to_string(),
        }
    }
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
