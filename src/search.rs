//! Paginated, filterable search and suggestion over the gazetteer.
//!
//! Ordering is fixed: exact-prefix matches first, then substring matches,
//! each group alphabetical by city name with ties kept in declared dataset
//! order. Because the store never changes, walking the pages of one query
//! reproduces the full result list exactly once, in order.

use crate::gazetteer::{fold_key, GazetteerEntry, GazetteerStore};
use crate::types::AtlasError;
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::BTreeMap;

/// Optional result narrowing. Unknown values simply match nothing.
#[derive(Debug, Clone, Default)]
pub struct SearchFilters {
    /// ISO-2 code or full country name.
    pub country: Option<String>,
    /// Region name (e.g. "Europe", "Americas").
    pub region: Option<String>,
}

/// Page window. A zero limit is a caller-contract violation and is
/// rejected at the boundary.
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Pagination {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }
}

/// One page of results plus the size of the whole result set.
#[derive(Debug)]
pub struct SearchPage<'a> {
    pub items: Vec<&'a GazetteerEntry>,
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
}

/// Aggregate dataset counts for diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct DatasetStats {
    pub version: String,
    pub countries: usize,
    pub states: usize,
    pub cities: usize,
    /// City counts per region, in stable order.
    pub by_region: BTreeMap<String, usize>,
    /// City counts per ISO-2 country code, in stable order.
    pub by_country: BTreeMap<String, usize>,
}

/// Read-only search facade over a [`GazetteerStore`].
pub struct SearchIndex<'a> {
    store: &'a GazetteerStore,
}

impl<'a> SearchIndex<'a> {
    pub fn new(store: &'a GazetteerStore) -> Self {
        Self { store }
    }

    /// Substring search over city names (aliases and state names count as
    /// substring hits). An empty query matches every entry (browse mode).
    pub fn search(
        &self,
        query: &str,
        filters: &SearchFilters,
        page: Pagination,
    ) -> Result<SearchPage<'a>, AtlasError> {
        if page.limit == 0 {
            return Err(AtlasError::InvalidLimit);
        }
        let country = filters.country.as_deref().map(fold_key);
        let region = filters.region.as_deref().map(fold_key);
        let ranked = self.ranked(query, |e| {
            country.as_deref().is_none_or(|c| {
                fold_key(&e.country_code) == c || fold_key(&e.country_name) == c
            }) && region
                .as_deref()
                .is_none_or(|r| fold_key(&e.region) == r)
        });
        Ok(paginate(ranked, page))
    }

    /// Search restricted to one state/province.
    pub fn by_state(
        &self,
        country_code: &str,
        state_code: &str,
        query: Option<&str>,
        page: Pagination,
    ) -> Result<SearchPage<'a>, AtlasError> {
        if page.limit == 0 {
            return Err(AtlasError::InvalidLimit);
        }
        let country = fold_key(country_code);
        let state = fold_key(state_code);
        let ranked = self.ranked(query.unwrap_or(""), |e| {
            fold_key(&e.country_code) == country
                && e.state_code.as_deref().map(fold_key) == Some(state.clone())
        });
        Ok(paginate(ranked, page))
    }

    /// Autocomplete. With a prefix: alphabetical prefix matches on the
    /// city name. Without one: a uniform random sample of the dataset,
    /// without replacement (discovery mode).
    pub fn suggest(
        &self,
        prefix: Option<&str>,
        limit: usize,
    ) -> Result<Vec<&'a GazetteerEntry>, AtlasError> {
        if limit == 0 {
            return Err(AtlasError::InvalidLimit);
        }
        let folded = prefix.map(fold_key).filter(|p| !p.is_empty());
        match folded {
            Some(p) => {
                let mut hits: Vec<&GazetteerEntry> = self
                    .store
                    .entries()
                    .iter()
                    .filter(|e| fold_key(&e.city).starts_with(&p))
                    .collect();
                hits.sort_by_key(|e| fold_key(&e.city));
                hits.truncate(limit);
                Ok(hits)
            }
            None => {
                let mut rng = rand::thread_rng();
                Ok(self.store.entries().choose_multiple(&mut rng, limit).collect())
            }
        }
    }

    /// Aggregate counts by region and country.
    pub fn stats(&self) -> DatasetStats {
        let mut by_region: BTreeMap<String, usize> = BTreeMap::new();
        let mut by_country: BTreeMap<String, usize> = BTreeMap::new();
        for entry in self.store.entries() {
            *by_region.entry(entry.region.clone()).or_default() += 1;
            *by_country.entry(entry.country_code.clone()).or_default() += 1;
        }
        DatasetStats {
            version: self.store.version().to_string(),
            countries: self.store.country_count(),
            states: self.store.state_count(),
            cities: self.store.city_count(),
            by_region,
            by_country,
        }
    }

    /// Full ordered result list for a query under a predicate filter.
    fn ranked(
        &self,
        query: &str,
        keep: impl Fn(&GazetteerEntry) -> bool,
    ) -> Vec<&'a GazetteerEntry> {
        let q = fold_key(query);
        let mut prefix_hits: Vec<&GazetteerEntry> = Vec::new();
        let mut substring_hits: Vec<&GazetteerEntry> = Vec::new();

        for entry in self.store.entries() {
            if !keep(entry) {
                continue;
            }
            let name = fold_key(&entry.city);
            if name.starts_with(&q) {
                prefix_hits.push(entry);
            } else if name.contains(&q)
                || entry.aliases.iter().any(|a| fold_key(a).contains(&q))
                || entry
                    .state_name
                    .as_deref()
                    .is_some_and(|s| fold_key(s).contains(&q))
            {
                substring_hits.push(entry);
            }
        }

        // Stable sort: alphabetical within each group, declared order on ties.
        prefix_hits.sort_by_key(|e| fold_key(&e.city));
        substring_hits.sort_by_key(|e| fold_key(&e.city));
        prefix_hits.extend(substring_hits);
        prefix_hits
    }
}

fn paginate(ranked: Vec<&GazetteerEntry>, page: Pagination) -> SearchPage<'_> {
    let total = ranked.len();
    let items = ranked
        .into_iter()
        .skip(page.offset)
        .take(page.limit)
        .collect();
    SearchPage {
        items,
        total,
        limit: page.limit,
        offset: page.offset,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gazetteer::tests::fixture_store;
    use std::collections::HashSet;

    fn keys(page: &SearchPage<'_>) -> Vec<String> {
        page.items.iter().map(|e| e.key()).collect()
    }

    #[test]
    fn prefix_matches_sort_before_substring_matches() {
        let store = GazetteerStore::embedded();
        let index = SearchIndex::new(store);
        let page = index
            .search("york", &SearchFilters::default(), Pagination::new(10, 0))
            .unwrap();
        assert_eq!(page.items[0].city, "York");
        assert!(page.items.iter().skip(1).any(|e| e.city == "New York"));
    }

    #[test]
    fn groups_are_alphabetical_with_declared_ties() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let page = index
            .search("lo", &SearchFilters::default(), Pagination::new(10, 0))
            .unwrap();
        let cities: Vec<&str> = page.items.iter().map(|e| e.city.as_str()).collect();
        // Prefix group: three Londons in declared order (US, CA, GB), then
        // Los Angeles. São Paulo only contains "lo", so it trails.
        assert_eq!(
            cities,
            vec!["London", "London", "London", "Los Angeles", "São Paulo"]
        );
        let countries: Vec<&str> = page.items.iter().map(|e| e.country_code.as_str()).collect();
        assert_eq!(countries[..3], ["US", "CA", "GB"]);
    }

    #[test]
    fn alias_and_state_name_hits_are_substring_matches() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        // "nyc"-style alias lookup: fixture's LA alias.
        let page = index
            .search("la", &SearchFilters::default(), Pagination::new(10, 0))
            .unwrap();
        assert!(page.items.iter().any(|e| e.city == "Los Angeles"));
        // State-name hit: "maryland" matches Frederick via its state.
        let page = index
            .search("maryland", &SearchFilters::default(), Pagination::new(10, 0))
            .unwrap();
        assert_eq!(keys(&page), vec!["frederick:md:us"]);
    }

    #[test]
    fn empty_query_browses_everything() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let page = index
            .search("", &SearchFilters::default(), Pagination::new(100, 0))
            .unwrap();
        assert_eq!(page.total, store.city_count());
    }

    #[test]
    fn filtering_never_adds_matches() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let all = index
            .search("london", &SearchFilters::default(), Pagination::new(100, 0))
            .unwrap();
        let filtered = index
            .search(
                "london",
                &SearchFilters {
                    country: Some("CA".into()),
                    region: None,
                },
                Pagination::new(100, 0),
            )
            .unwrap();
        let all_keys: HashSet<String> = keys(&all).into_iter().collect();
        assert!(filtered.total < all.total);
        for key in keys(&filtered) {
            assert!(all_keys.contains(&key));
        }
    }

    #[test]
    fn country_filter_accepts_full_name() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let page = index
            .search(
                "london",
                &SearchFilters {
                    country: Some("United Kingdom".into()),
                    region: None,
                },
                Pagination::new(10, 0),
            )
            .unwrap();
        assert_eq!(keys(&page), vec!["london::gb"]);
    }

    #[test]
    fn region_filter_narrows() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let page = index
            .search(
                "london",
                &SearchFilters {
                    country: None,
                    region: Some("europe".into()),
                },
                Pagination::new(10, 0),
            )
            .unwrap();
        assert_eq!(keys(&page), vec!["london::gb"]);
    }

    #[test]
    fn unknown_filter_yields_empty_not_error() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let page = index
            .search(
                "london",
                &SearchFilters {
                    country: None,
                    region: Some("Atlantis".into()),
                },
                Pagination::new(10, 0),
            )
            .unwrap();
        assert_eq!(page.total, 0);
        assert!(page.items.is_empty());
    }

    #[test]
    fn sequential_pages_tile_the_result_set() {
        let store = GazetteerStore::embedded();
        let index = SearchIndex::new(store);
        let full = index
            .search("spring", &SearchFilters::default(), Pagination::new(1000, 0))
            .unwrap();
        assert!(full.total > 10, "dataset should have >10 spring matches");

        let first = index
            .search("spring", &SearchFilters::default(), Pagination::new(10, 0))
            .unwrap();
        let second = index
            .search("spring", &SearchFilters::default(), Pagination::new(10, 10))
            .unwrap();

        let first_keys = keys(&first);
        let second_keys = keys(&second);
        let overlap: HashSet<_> = first_keys.iter().collect();
        assert!(second_keys.iter().all(|k| !overlap.contains(k)));

        let mut walked = first_keys;
        walked.extend(second_keys);
        assert_eq!(walked, keys(&full));
    }

    #[test]
    fn offset_past_the_end_is_empty() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let page = index
            .search("london", &SearchFilters::default(), Pagination::new(10, 50))
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.is_empty());
    }

    #[test]
    fn zero_limit_is_rejected() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        assert!(matches!(
            index.search("x", &SearchFilters::default(), Pagination::new(0, 0)),
            Err(AtlasError::InvalidLimit)
        ));
        assert!(index.suggest(Some("x"), 0).is_err());
        assert!(index.by_state("US", "MD", None, Pagination::new(0, 0)).is_err());
    }

    #[test]
    fn by_state_restricts_and_orders() {
        let store = GazetteerStore::embedded();
        let index = SearchIndex::new(store);
        let page = index
            .by_state("US", "MD", None, Pagination::new(10, 0))
            .unwrap();
        let cities: Vec<&str> = page.items.iter().map(|e| e.city.as_str()).collect();
        assert_eq!(cities, vec!["Annapolis", "Baltimore", "Frederick"]);

        let narrowed = index
            .by_state("US", "MD", Some("fre"), Pagination::new(10, 0))
            .unwrap();
        assert_eq!(keys(&narrowed), vec!["frederick:md:us"]);
    }

    #[test]
    fn by_state_is_a_subset_of_search() {
        let store = GazetteerStore::embedded();
        let index = SearchIndex::new(store);
        let scoped = index
            .by_state("US", "IL", Some("spring"), Pagination::new(100, 0))
            .unwrap();
        let global = index
            .search("spring", &SearchFilters::default(), Pagination::new(100, 0))
            .unwrap();
        let global_keys: HashSet<String> = keys(&global).into_iter().collect();
        for key in keys(&scoped) {
            assert!(global_keys.contains(&key));
        }
    }

    #[test]
    fn suggest_prefix_is_bounded_and_prefixed() {
        let store = GazetteerStore::embedded();
        let index = SearchIndex::new(store);
        let hits = index.suggest(Some("Chi"), 5).unwrap();
        assert!(!hits.is_empty());
        assert!(hits.len() <= 5);
        for entry in &hits {
            assert!(
                fold_key(&entry.city).starts_with("chi"),
                "{} does not start with Chi",
                entry.city
            );
        }
    }

    #[test]
    fn suggest_without_prefix_samples_without_replacement() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let picks = index.suggest(None, 5).unwrap();
        assert_eq!(picks.len(), 5);
        let unique: HashSet<String> = picks.iter().map(|e| e.key()).collect();
        assert_eq!(unique.len(), 5);

        // Asking for more than the dataset holds returns everything once.
        let all = index.suggest(None, 1000).unwrap();
        assert_eq!(all.len(), store.city_count());
    }

    #[test]
    fn blank_prefix_falls_back_to_discovery() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let picks = index.suggest(Some("  "), 3).unwrap();
        assert_eq!(picks.len(), 3);
    }

    #[test]
    fn stats_aggregates_by_region_and_country() {
        let store = fixture_store();
        let index = SearchIndex::new(&store);
        let stats = index.stats();
        assert_eq!(stats.version, "test-1");
        assert_eq!(stats.cities, 8);
        assert_eq!(stats.countries, 5);
        assert_eq!(stats.states, 5);
        assert_eq!(stats.by_region.get("Americas"), Some(&6));
        assert_eq!(stats.by_region.get("Europe"), Some(&1));
        assert_eq!(stats.by_country.get("US"), Some(&4));
        assert_eq!(stats.by_country.get("GB"), Some(&1));
    }
}
