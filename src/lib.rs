//! Nimbus Atlas — the location core of the Nimbus weather stack.
//!
//! Maps free-form location text ("london, on", "Frederick Maryland",
//! "tokyo") to a canonical gazetteer entry, formats display names, serves
//! paginated search and suggestions over the place dataset, and caches
//! upstream response payloads.
//!
//! The usual request flow: [`QueryNormalizer`] splits the raw text,
//! [`Resolver`] picks one [`ResolvedLocation`] (or reports NotFound, which
//! callers answer by falling back to the raw query), [`display::format`]
//! produces the user-facing name, and [`ResponseCache`] short-circuits
//! repeated upstream fetches. [`SearchIndex`] serves browse/suggest
//! requests straight off the [`GazetteerStore`].

pub mod cache;
pub mod display;
pub mod gazetteer;
pub mod normalize;
pub mod resolve;
pub mod search;
pub mod types;

pub use cache::ResponseCache;
pub use gazetteer::{fold_key, GazetteerEntry, GazetteerStore};
pub use normalize::QueryNormalizer;
pub use resolve::{Resolver, DEFAULT_COUNTRY_BIAS};
pub use search::{DatasetStats, Pagination, SearchFilters, SearchIndex, SearchPage};
pub use types::{AtlasError, ModifierKind, NormalizedQuery, ResolvedLocation};

#[cfg(test)]
mod tests {
    use super::*;

    /// The end-to-end pipeline the weather-fetch orchestrator runs.
    #[test]
    fn normalize_resolve_format_pipeline() {
        let store = GazetteerStore::embedded();
        let normalizer = QueryNormalizer::new(store);
        let resolver = Resolver::new(store);

        let query = normalizer.normalize("Frederick, Maryland");
        let resolved = resolver.resolve(&query).unwrap();
        assert_eq!(display::format(&resolved.display_name()), "Frederick, MD");

        let query = normalizer.normalize("london, on");
        let resolved = resolver.resolve(&query).unwrap();
        assert_eq!(display::format(&resolved.display_name()), "London, ON");
        assert_eq!(resolved.country, "Canada");

        let query = normalizer.normalize("tokyo");
        let resolved = resolver.resolve(&query).unwrap();
        assert_eq!(resolved.key, "tokyo::jp");
    }

    /// NotFound is answered with the formatted raw query, per contract.
    #[test]
    fn not_found_falls_back_to_raw_text() {
        let store = GazetteerStore::embedded();
        let normalizer = QueryNormalizer::new(store);
        let resolver = Resolver::new(store);

        let query = normalizer.normalize("middle of nowhere, xx");
        let err = resolver.resolve(&query).unwrap_err();
        match err {
            AtlasError::NotFound(raw) => {
                assert_eq!(display::format(&raw), "Middle of Nowhere, XX");
            }
            other => panic!("expected NotFound, got {other}"),
        }
    }
}
