//! Disambiguation: pick one canonical gazetteer entry for a normalized
//! query.
//!
//! An explicit modifier always wins when it narrows to a single entry.
//! Past that the resolver is a deliberate heuristic: a small default-bias
//! table for globally ambiguous names, then the dataset's declared order.
//! True geographic scoring is the upstream provider's job once it has
//! coordinates; nothing here measures distance.

use crate::gazetteer::{fold_key, GazetteerEntry, GazetteerStore};
use crate::types::{AtlasError, ModifierKind, NormalizedQuery, ResolvedLocation};

/// Default country bias for city names that exist in several countries.
///
/// Extend this list when a new collision is discovered rather than
/// special-casing the resolver.
pub const DEFAULT_COUNTRY_BIAS: &[(&str, &str)] = &[
    ("london", "GB"),
    ("birmingham", "GB"),
    ("manchester", "GB"),
    ("cambridge", "GB"),
    ("paris", "FR"),
    ("rome", "IT"),
    ("athens", "GR"),
    ("dublin", "IE"),
    ("moscow", "RU"),
    ("kingston", "JM"),
    ("vancouver", "CA"),
];

/// Resolves normalized queries against a gazetteer.
pub struct Resolver<'a> {
    store: &'a GazetteerStore,
    /// Folded city name → preferred country code.
    overrides: Vec<(String, String)>,
}

impl<'a> Resolver<'a> {
    /// Resolver with the built-in [`DEFAULT_COUNTRY_BIAS`] table.
    pub fn new(store: &'a GazetteerStore) -> Self {
        Self::with_overrides(store, DEFAULT_COUNTRY_BIAS)
    }

    /// Resolver with a caller-supplied override table (city → country code).
    pub fn with_overrides(store: &'a GazetteerStore, overrides: &[(&str, &str)]) -> Self {
        Self {
            store,
            overrides: overrides
                .iter()
                .map(|(city, country)| (fold_key(city), fold_key(country)))
                .collect(),
        }
    }

    /// Pick the canonical entry for a query, or `AtlasError::NotFound`.
    ///
    /// NotFound is the miss outcome, not a fault: callers fall back to the
    /// raw query text. Read-only against the store; no side effects.
    pub fn resolve(&self, query: &NormalizedQuery) -> Result<ResolvedLocation, AtlasError> {
        let candidates = self.store.candidates(&query.city);
        if candidates.is_empty() {
            return Err(AtlasError::NotFound(query.raw.clone()));
        }

        let narrowed = match (query.kind, query.modifier.as_deref()) {
            // Explicit modifier wins outright when it isolates one entry.
            (ModifierKind::State, Some(m)) => {
                let hits: Vec<&GazetteerEntry> = candidates
                    .iter()
                    .copied()
                    .filter(|e| self.store.state_matches(e, m))
                    .collect();
                if hits.len() == 1 {
                    return Ok(to_resolved(hits[0]));
                }
                if hits.is_empty() { candidates } else { hits }
            }
            (ModifierKind::Country, Some(m)) => {
                let hits: Vec<&GazetteerEntry> = candidates
                    .iter()
                    .copied()
                    .filter(|e| self.store.country_matches(e, m))
                    .collect();
                if hits.len() == 1 {
                    return Ok(to_resolved(hits[0]));
                }
                if hits.is_empty() { candidates } else { hits }
            }
            // Token names both a state and a country: country reading is
            // preferred when both isolate one entry; a singleton from
            // either filter is still decisive on its own.
            (ModifierKind::Ambiguous, Some(m)) => {
                let by_country: Vec<&GazetteerEntry> = candidates
                    .iter()
                    .copied()
                    .filter(|e| self.store.country_matches(e, m))
                    .collect();
                if by_country.len() == 1 {
                    return Ok(to_resolved(by_country[0]));
                }
                let by_state: Vec<&GazetteerEntry> = candidates
                    .iter()
                    .copied()
                    .filter(|e| self.store.state_matches(e, m))
                    .collect();
                if by_state.len() == 1 {
                    return Ok(to_resolved(by_state[0]));
                }
                candidates
            }
            _ => candidates,
        };

        // Default-bias table, then first declared entry.
        if let Some(preferred) = self.override_for(&query.city) {
            if let Some(entry) = narrowed
                .iter()
                .find(|e| fold_key(&e.country_code) == preferred)
            {
                return Ok(to_resolved(entry));
            }
        }
        Ok(to_resolved(narrowed[0]))
    }

    fn override_for(&self, city: &str) -> Option<&str> {
        let folded = fold_key(city);
        self.overrides
            .iter()
            .find(|(name, _)| *name == folded)
            .map(|(_, country)| country.as_str())
    }
}

fn to_resolved(entry: &GazetteerEntry) -> ResolvedLocation {
    ResolvedLocation {
        key: entry.key(),
        city: entry.city.clone(),
        state: entry.state_code.clone(),
        country: entry.country_name.clone(),
    }
}
