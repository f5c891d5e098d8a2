//! The gazetteer: a load-once, immutable reference dataset of countries,
//! states/provinces, and a curated city list, with lookup indexes.
//!
//! The dataset ships as a versioned JSON asset embedded in the binary
//! (`data/gazetteer.json`); deployments can substitute their own file via
//! [`GazetteerStore::from_path`]. Once built the store is never mutated,
//! so it is safe to share across threads without synchronization.

use crate::types::{AtlasError, ModifierKind};
use deunicode::deunicode;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

/// Lowercase, diacritic-stripped, whitespace-collapsed matching key.
///
/// Every component that compares place names goes through this one
/// function, so "São Paulo", "sao  paulo", and "SAO PAULO" are the same
/// city everywhere.
pub fn fold_key(s: &str) -> String {
    deunicode(s)
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// One place in the gazetteer, denormalized for direct display.
///
/// Unique by (folded city name, state code, country code). `region` is
/// always present; the loader rejects datasets where a country lacks one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GazetteerEntry {
    pub city: String,
    pub state_code: Option<String>,
    pub state_name: Option<String>,
    pub country_code: String,
    pub country_name: String,
    pub is_capital: bool,
    pub region: String,
    /// Alternate spellings and colloquial names ("NYC", "Bombay").
    pub aliases: Vec<String>,
}

impl GazetteerEntry {
    /// Stable key: folded `city:state:country`.
    pub fn key(&self) -> String {
        format!(
            "{}:{}:{}",
            fold_key(&self.city),
            self.state_code.as_deref().map(fold_key).unwrap_or_default(),
            fold_key(&self.country_code),
        )
    }
}

// ─── Raw dataset schema ──────────────────────────────────────────

#[derive(Deserialize)]
struct RawDataset {
    version: String,
    countries: Vec<RawCountry>,
    states: Vec<RawState>,
    cities: Vec<RawCity>,
}

#[derive(Deserialize)]
struct RawCountry {
    code: String,
    name: String,
    region: String,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Deserialize)]
struct RawState {
    code: String,
    name: String,
    country: String,
    #[serde(default)]
    aliases: Vec<String>,
}

#[derive(Deserialize)]
struct RawCity {
    name: String,
    #[serde(default)]
    state: Option<String>,
    country: String,
    #[serde(default)]
    capital: bool,
    #[serde(default)]
    aliases: Vec<String>,
}

// ─── The store ───────────────────────────────────────────────────

/// Immutable place dataset with lookup indexes and name tables.
#[derive(Debug)]
pub struct GazetteerStore {
    version: String,
    entries: Vec<GazetteerEntry>,
    /// Folded city name or alias → entry indices, in declared order.
    by_city: HashMap<String, Vec<u32>>,
    /// Folded state names, codes, and aliases.
    state_tokens: HashSet<String>,
    /// Folded country names, codes, and aliases.
    country_tokens: HashSet<String>,
    /// Folded country code → folded aliases, for modifier matching.
    country_aliases: HashMap<String, Vec<String>>,
    country_count: usize,
    state_count: usize,
    /// Longest known modifier name, in words. Bounds the suffix scan.
    max_modifier_words: usize,
}

impl GazetteerStore {
    /// Parse and validate a dataset from its JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, AtlasError> {
        let raw: RawDataset = serde_json::from_str(json)
            .map_err(|e| AtlasError::Dataset(format!("invalid JSON: {}", e)))?;
        Self::build(raw)
    }

    /// Load a dataset file from disk (same JSON format as the embedded one).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, AtlasError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            AtlasError::Dataset(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&json)
    }

    /// The dataset compiled into the binary, built on first use.
    pub fn embedded() -> &'static GazetteerStore {
        static EMBEDDED: Lazy<GazetteerStore> = Lazy::new(|| {
            GazetteerStore::from_json_str(include_str!("../data/gazetteer.json"))
                .expect("embedded gazetteer dataset is valid")
        });
        &EMBEDDED
    }

    fn build(raw: RawDataset) -> Result<Self, AtlasError> {
        let mut countries: HashMap<String, &RawCountry> = HashMap::new();
        for country in &raw.countries {
            if country.region.trim().is_empty() {
                return Err(AtlasError::Dataset(format!(
                    "country '{}' has no region",
                    country.code
                )));
            }
            if countries.insert(fold_key(&country.code), country).is_some() {
                return Err(AtlasError::Dataset(format!(
                    "duplicate country code '{}'",
                    country.code
                )));
            }
        }

        let mut states: HashMap<(String, String), &RawState> = HashMap::new();
        for state in &raw.states {
            let country_key = fold_key(&state.country);
            if !countries.contains_key(&country_key) {
                return Err(AtlasError::Dataset(format!(
                    "state '{}' references unknown country '{}'",
                    state.code, state.country
                )));
            }
            let key = (fold_key(&state.code), country_key);
            if states.insert(key, state).is_some() {
                return Err(AtlasError::Dataset(format!(
                    "duplicate state '{}' in country '{}'",
                    state.code, state.country
                )));
            }
        }

        // Name tables for modifier classification and suffix splitting.
        let mut state_tokens = HashSet::new();
        for state in &raw.states {
            state_tokens.insert(fold_key(&state.code));
            state_tokens.insert(fold_key(&state.name));
            for alias in &state.aliases {
                state_tokens.insert(fold_key(alias));
            }
        }
        let mut country_tokens = HashSet::new();
        let mut country_aliases: HashMap<String, Vec<String>> = HashMap::new();
        for country in &raw.countries {
            country_tokens.insert(fold_key(&country.code));
            country_tokens.insert(fold_key(&country.name));
            let folded: Vec<String> = country.aliases.iter().map(|a| fold_key(a)).collect();
            for alias in &folded {
                country_tokens.insert(alias.clone());
            }
            country_aliases.insert(fold_key(&country.code), folded);
        }
        let max_modifier_words = state_tokens
            .iter()
            .chain(country_tokens.iter())
            .map(|t| t.split(' ').count())
            .max()
            .unwrap_or(1);

        let mut entries = Vec::with_capacity(raw.cities.len());
        let mut by_city: HashMap<String, Vec<u32>> = HashMap::new();
        let mut seen = HashSet::new();
        for city in &raw.cities {
            let country_key = fold_key(&city.country);
            let country = *countries.get(&country_key).ok_or_else(|| {
                AtlasError::Dataset(format!(
                    "city '{}' references unknown country '{}'",
                    city.name, city.country
                ))
            })?;

            let state = match &city.state {
                Some(code) => Some(
                    *states
                        .get(&(fold_key(code), country_key.clone()))
                        .ok_or_else(|| {
                            AtlasError::Dataset(format!(
                                "city '{}' references unknown state '{}' in '{}'",
                                city.name, code, city.country
                            ))
                        })?,
                ),
                None => None,
            };

            let entry = GazetteerEntry {
                city: city.name.clone(),
                state_code: state.map(|s| s.code.clone()),
                state_name: state.map(|s| s.name.clone()),
                country_code: country.code.clone(),
                country_name: country.name.clone(),
                is_capital: city.capital,
                region: country.region.clone(),
                aliases: city.aliases.clone(),
            };
            if !seen.insert(entry.key()) {
                return Err(AtlasError::Dataset(format!(
                    "duplicate city entry '{}'",
                    entry.key()
                )));
            }

            let idx = entries.len() as u32;
            let mut keys: Vec<String> = vec![fold_key(&entry.city)];
            keys.extend(entry.aliases.iter().map(|a| fold_key(a)));
            keys.dedup();
            for key in keys {
                let indices = by_city.entry(key).or_default();
                if indices.last() != Some(&idx) {
                    indices.push(idx);
                }
            }
            entries.push(entry);
        }

        Ok(Self {
            version: raw.version,
            entries,
            by_city,
            state_tokens,
            country_tokens,
            country_aliases,
            country_count: raw.countries.len(),
            state_count: raw.states.len(),
            max_modifier_words,
        })
    }

    /// Dataset version string, as declared in the JSON resource.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Every entry, in the dataset's declared order.
    pub fn entries(&self) -> &[GazetteerEntry] {
        &self.entries
    }

    pub fn city_count(&self) -> usize {
        self.entries.len()
    }

    pub fn country_count(&self) -> usize {
        self.country_count
    }

    pub fn state_count(&self) -> usize {
        self.state_count
    }

    /// All entries whose city name or alias matches the token
    /// (case-insensitive, diacritic-normalized), in declared order.
    pub fn candidates(&self, city: &str) -> Vec<&GazetteerEntry> {
        match self.by_city.get(&fold_key(city)) {
            Some(indices) => indices.iter().map(|&i| &self.entries[i as usize]).collect(),
            None => Vec::new(),
        }
    }

    /// Classify a would-be modifier token against the name tables.
    pub fn modifier_kind(&self, token: &str) -> ModifierKind {
        let folded = fold_key(token);
        if folded.is_empty() {
            return ModifierKind::None;
        }
        let state = self.state_tokens.contains(&folded);
        let country = self.country_tokens.contains(&folded);
        match (state, country) {
            (true, true) => ModifierKind::Ambiguous,
            (true, false) => ModifierKind::State,
            (false, true) => ModifierKind::Country,
            (false, false) => ModifierKind::None,
        }
    }

    /// Does this entry's state/province match the token (code or full name)?
    pub(crate) fn state_matches(&self, entry: &GazetteerEntry, token: &str) -> bool {
        let folded = fold_key(token);
        entry.state_code.as_deref().map(fold_key) == Some(folded.clone())
            || entry.state_name.as_deref().map(fold_key) == Some(folded)
    }

    /// Does this entry's country match the token (code, name, or alias)?
    pub(crate) fn country_matches(&self, entry: &GazetteerEntry, token: &str) -> bool {
        let folded = fold_key(token);
        if fold_key(&entry.country_code) == folded || fold_key(&entry.country_name) == folded {
            return true;
        }
        self.country_aliases
            .get(&fold_key(&entry.country_code))
            .is_some_and(|aliases| aliases.iter().any(|a| *a == folded))
    }

    pub(crate) fn max_modifier_words(&self) -> usize {
        self.max_modifier_words
    }
}
