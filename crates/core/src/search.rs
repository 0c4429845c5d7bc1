//! Store search over the in-memory directory.
//!
//! Matching is a case-insensitive substring scan. There is no ranking,
//! pagination or fuzzy matching; results keep directory order.

use core::str::FromStr;

use crate::types::StoreRecord;

/// How a query is matched against the store list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchMode {
    /// Stores whose city, state, zip code or address contain the query.
    #[default]
    Substring,
    /// Resolve the query to a single state (by state, then by city) and
    /// return every store in that state.
    StateExpansion,
}

impl SearchMode {
    /// Configuration value for this mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Substring => "substring",
            Self::StateExpansion => "state",
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "substring" => Ok(Self::Substring),
            "state" | "state-expansion" => Ok(Self::StateExpansion),
            other => Err(format!("unknown search mode '{other}'")),
        }
    }
}

/// Result of running a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome<'a> {
    /// The query was empty or whitespace; the results view stays hidden.
    NotSearched,
    /// The query ran; `matches` may be empty.
    Searched {
        query: String,
        matches: Vec<&'a StoreRecord>,
    },
}

impl<'a> SearchOutcome<'a> {
    /// Whether a search actually ran.
    #[must_use]
    pub const fn has_searched(&self) -> bool {
        matches!(self, Self::Searched { .. })
    }

    /// Matched stores; empty when nothing was searched.
    #[must_use]
    pub fn matches(&self) -> &[&'a StoreRecord] {
        match self {
            Self::NotSearched => &[],
            Self::Searched { matches, .. } => matches,
        }
    }

    /// Heading shown above the results, or `None` when nothing was searched.
    #[must_use]
    pub fn summary(&self) -> Option<String> {
        let Self::Searched { query, matches } = self else {
            return None;
        };
        Some(match matches.len() {
            0 => format!("No stores found near \"{query}\""),
            1 => format!("Found 1 store near \"{query}\""),
            n => format!("Found {n} stores near \"{query}\""),
        })
    }
}

/// Search `stores` for `query`.
///
/// The query is trimmed; a blank query yields [`SearchOutcome::NotSearched`].
#[must_use]
pub fn search_stores<'a>(
    stores: &'a [StoreRecord],
    query: &str,
    mode: SearchMode,
) -> SearchOutcome<'a> {
    let query = query.trim();
    if query.is_empty() {
        return SearchOutcome::NotSearched;
    }

    let needle = query.to_lowercase();
    let matches = match mode {
        SearchMode::Substring => stores
            .iter()
            .filter(|store| matches_any_field(store, &needle))
            .collect(),
        SearchMode::StateExpansion => expand_to_state(stores, &needle),
    };

    SearchOutcome::Searched {
        query: query.to_owned(),
        matches,
    }
}

/// Whether any searchable field of `store` contains the lowercased `needle`.
#[must_use]
pub fn matches_any_field(store: &StoreRecord, needle: &str) -> bool {
    [&store.city, &store.state, &store.zip_code, &store.address]
        .into_iter()
        .any(|field| contains_ignore_case(field, needle))
}

fn contains_ignore_case(haystack: &str, lowered_needle: &str) -> bool {
    haystack.to_lowercase().contains(lowered_needle)
}

fn expand_to_state<'a>(stores: &'a [StoreRecord], needle: &str) -> Vec<&'a StoreRecord> {
    let anchor = stores
        .iter()
        .find(|store| contains_ignore_case(&store.state, needle))
        .or_else(|| {
            stores
                .iter()
                .find(|store| contains_ignore_case(&store.city, needle))
        });

    let Some(anchor) = anchor else {
        return Vec::new();
    };

    let target = anchor.state.to_lowercase();
    stores
        .iter()
        .filter(|store| store.state.to_lowercase() == target)
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::types::StoreId;

    fn store(name: &str, address: &str, city: &str, state: &str, zip: &str) -> StoreRecord {
        StoreRecord {
            id: StoreId::random(),
            name: name.to_string(),
            address: address.to_string(),
            city: city.to_string(),
            state: state.to_string(),
            zip_code: zip.to_string(),
            phone: None,
            hours: None,
            created_at: None,
            created_by: None,
        }
    }

    fn directory() -> Vec<StoreRecord> {
        vec![
            store("Hollywood", "123 Main St", "Los Angeles", "CA", "90210"),
            store("Bay", "9 Market St", "San Francisco", "CA", "94103"),
            store("Downtown", "500 Congress Ave", "Austin", "TX", "73301"),
            store("Strip", "77 Fremont St", "Las Vegas", "NV", "89101"),
        ]
    }

    fn names(outcome: &SearchOutcome<'_>) -> Vec<String> {
        outcome.matches().iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_zip_query_matches_single_store() {
        let stores = vec![store("LA", "123 Main St", "Los Angeles", "CA", "90210")];
        let outcome = search_stores(&stores, "90210", SearchMode::Substring);
        assert_eq!(outcome.matches().len(), 1);
        assert_eq!(outcome.matches()[0].zip_code, "90210");
    }

    #[test]
    fn test_unknown_query_matches_nothing() {
        let stores = vec![store("LA", "123 Main St", "Los Angeles", "CA", "90210")];
        let outcome = search_stores(&stores, "Texas", SearchMode::Substring);
        assert!(outcome.has_searched());
        assert!(outcome.matches().is_empty());
    }

    #[test]
    fn test_blank_query_is_not_searched() {
        let stores = directory();
        for query in ["", "   ", "\t\n"] {
            let outcome = search_stores(&stores, query, SearchMode::Substring);
            assert_eq!(outcome, SearchOutcome::NotSearched);
            assert!(outcome.matches().is_empty());
            assert!(outcome.summary().is_none());
        }
    }

    #[test]
    fn test_case_insensitive_across_fields() {
        let stores = directory();
        assert_eq!(
            names(&search_stores(&stores, "los angeles", SearchMode::Substring)),
            vec!["Hollywood"]
        );
        assert_eq!(
            names(&search_stores(&stores, "ca", SearchMode::Substring)),
            vec!["Hollywood", "Bay"]
        );
        assert_eq!(
            names(&search_stores(&stores, "MARKET", SearchMode::Substring)),
            vec!["Bay"]
        );
    }

    #[test]
    fn test_name_is_not_searched() {
        let stores = directory();
        let outcome = search_stores(&stores, "Hollywood", SearchMode::Substring);
        assert!(outcome.matches().is_empty());
    }

    #[test]
    fn test_matches_and_non_matches_partition_directory() {
        let stores = directory();
        for query in ["st", "a", "9", "San", "nv", "zzz", "1"] {
            let outcome = search_stores(&stores, query, SearchMode::Substring);
            let needle = query.to_lowercase();
            for s in &stores {
                let included = outcome.matches().iter().any(|m| m.id == s.id);
                assert_eq!(included, matches_any_field(s, &needle), "query {query}");
            }
        }
    }

    #[test]
    fn test_query_is_trimmed() {
        let stores = directory();
        let outcome = search_stores(&stores, "  austin ", SearchMode::Substring);
        assert_eq!(names(&outcome), vec!["Downtown"]);
        assert_eq!(
            outcome.summary().as_deref(),
            Some("Found 1 store near \"austin\"")
        );
    }

    #[test]
    fn test_summary_pluralizes() {
        let stores = directory();
        let outcome = search_stores(&stores, "ca", SearchMode::Substring);
        assert_eq!(
            outcome.summary().as_deref(),
            Some("Found 2 stores near \"ca\"")
        );
        let outcome = search_stores(&stores, "Texas", SearchMode::Substring);
        assert_eq!(
            outcome.summary().as_deref(),
            Some("No stores found near \"Texas\"")
        );
    }

    #[test]
    fn test_state_expansion_from_city() {
        let stores = directory();
        let outcome = search_stores(&stores, "san francisco", SearchMode::StateExpansion);
        assert_eq!(names(&outcome), vec!["Hollywood", "Bay"]);
    }

    #[test]
    fn test_state_expansion_prefers_state_match() {
        let mut stores = directory();
        stores.push(store("Reno", "1 Virginia St", "Reno", "NV", "89501"));
        let outcome = search_stores(&stores, "nv", SearchMode::StateExpansion);
        assert_eq!(names(&outcome), vec!["Strip", "Reno"]);
    }

    #[test]
    fn test_state_expansion_ignores_zip() {
        let stores = directory();
        let outcome = search_stores(&stores, "90210", SearchMode::StateExpansion);
        assert!(outcome.has_searched());
        assert!(outcome.matches().is_empty());
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!("substring".parse::<SearchMode>().unwrap(), SearchMode::Substring);
        assert_eq!("State".parse::<SearchMode>().unwrap(), SearchMode::StateExpansion);
        assert!("fuzzy".parse::<SearchMode>().is_err());
    }
}
