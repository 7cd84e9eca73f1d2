use regex::RegexBuilder;

use crate::api::types::CityWeather;

// ---------------------------------------------------------------------------
// Search state
// ---------------------------------------------------------------------------

/// What the search box currently holds: either the typed query text, or the
/// record the user picked. Holding a record *is* the selected state, so a
/// selection without a record cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchValue {
    Query(String),
    Selection(CityWeather),
}

impl Default for SearchValue {
    fn default() -> Self {
        SearchValue::Query(String::new())
    }
}

/// Transient search/selection state owned by the app.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchState {
    pub loading: bool,
    pub results: Vec<CityWeather>,
    pub value: SearchValue,
}

impl SearchState {
    /// The current query text; empty while a selection is active.
    pub fn query(&self) -> &str {
        match &self.value {
            SearchValue::Query(q) => q,
            SearchValue::Selection(_) => "",
        }
    }

    pub fn selection(&self) -> Option<&CityWeather> {
        match &self.value {
            SearchValue::Selection(city) => Some(city),
            SearchValue::Query(_) => None,
        }
    }

    pub fn is_selected(&self) -> bool {
        self.selection().is_some()
    }

    /// Whether a query is in effect, i.e. the grid should show `results`
    /// rather than the full accumulator.
    pub fn is_filtering(&self) -> bool {
        !self.is_selected() && (!self.query().is_empty() || self.loading)
    }
}

// ---------------------------------------------------------------------------
// Reducer
// ---------------------------------------------------------------------------

/// Actions on [`SearchState`]. The match in [`SearchState::apply`] is
/// exhaustive, so an unhandled action cannot get past the compiler.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchAction {
    /// Reset to the empty baseline: no query, no results, no selection.
    CleanQuery,
    /// A keystroke arrived; filtering has not run yet.
    StartSearch(String),
    /// The debounce delay elapsed and filtering ran.
    FinishSearch(Vec<CityWeather>),
    /// The user picked one record.
    UpdateSelection(CityWeather),
}

impl SearchState {
    pub fn apply(&mut self, action: SearchAction) {
        match action {
            SearchAction::CleanQuery => *self = SearchState::default(),
            SearchAction::StartSearch(query) => {
                self.loading = true;
                self.value = SearchValue::Query(query);
            }
            SearchAction::FinishSearch(results) => {
                self.loading = false;
                self.results = results;
            }
            SearchAction::UpdateSelection(city) => {
                self.value = SearchValue::Selection(city);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Filtering
// ---------------------------------------------------------------------------

/// Case-insensitive literal substring match of `query` against each title.
/// The query is escaped before compiling, so metacharacters match literally.
pub fn filter_cities(cities: &[CityWeather], query: &str) -> Vec<CityWeather> {
    let Ok(re) = RegexBuilder::new(&regex::escape(query))
        .case_insensitive(true)
        .build()
    else {
        // Escaped patterns only fail to compile past the size limit.
        tracing::warn!(query, "query too large to compile, returning no matches");
        return Vec::new();
    };

    cities
        .iter()
        .filter(|city| re.is_match(&city.title))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(title: &str, temp_c: f64, description: &str, icon_url: &str) -> CityWeather {
        CityWeather {
            title: title.to_string(),
            temp_c,
            description: description.to_string(),
            icon_url: icon_url.to_string(),
            country: None,
        }
    }

    fn baseline_list() -> Vec<CityWeather> {
        vec![
            city("Paris", 18.0, "Sunny", "url1"),
            city("London", 15.0, "Cloudy", "url2"),
        ]
    }

    #[test]
    fn filter_is_case_insensitive_substring() {
        let cities = baseline_list();
        let results = filter_cities(&cities, "lon");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "London");

        assert_eq!(filter_cities(&cities, "PAR")[0].title, "Paris");
        assert!(filter_cities(&cities, "berlin").is_empty());
    }

    #[test]
    fn filter_returns_exact_matching_subset() {
        let cities = vec![
            city("Zagreb", 24.0, "Clear", "u1"),
            city("Zadar", 27.0, "Sunny", "u2"),
            city("London", 15.0, "Cloudy", "u3"),
        ];
        let results = filter_cities(&cities, "za");
        assert_eq!(
            results.iter().map(|c| c.title.as_str()).collect::<Vec<_>>(),
            vec!["Zagreb", "Zadar"]
        );
    }

    #[test]
    fn filter_treats_metacharacters_literally() {
        let cities = vec![
            city("St. Louis", 20.0, "Fair", "u1"),
            city("Stx Louis", 20.0, "Fair", "u2"),
        ];
        // An unescaped "." would match both titles.
        let results = filter_cities(&cities, "St. ");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].title, "St. Louis");

        // A stray metacharacter is a literal, not a pattern error.
        assert!(filter_cities(&cities, "(lou").is_empty());
    }

    #[test]
    fn start_search_sets_loading_and_keeps_results() {
        let mut state = SearchState {
            loading: false,
            results: baseline_list(),
            value: SearchValue::Query("par".into()),
        };
        state.apply(SearchAction::StartSearch("pari".into()));
        assert!(state.loading);
        assert_eq!(state.query(), "pari");
        assert_eq!(state.results, baseline_list());
        assert!(!state.is_selected());
    }

    #[test]
    fn start_search_discards_active_selection() {
        let mut state = SearchState::default();
        state.apply(SearchAction::UpdateSelection(city("Paris", 18.0, "Sunny", "url1")));
        assert!(state.is_selected());

        state.apply(SearchAction::StartSearch("l".into()));
        assert!(!state.is_selected());
        assert_eq!(state.query(), "l");
    }

    #[test]
    fn finish_search_clears_loading_and_replaces_results() {
        let mut state = SearchState::default();
        state.apply(SearchAction::StartSearch("lon".into()));
        state.apply(SearchAction::FinishSearch(filter_cities(
            &baseline_list(),
            "lon",
        )));
        assert!(!state.loading);
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].title, "London");
    }

    #[test]
    fn clean_query_is_idempotent() {
        let mut state = SearchState::default();
        state.apply(SearchAction::StartSearch("lon".into()));
        state.apply(SearchAction::FinishSearch(baseline_list()));

        state.apply(SearchAction::CleanQuery);
        let once = state.clone();
        state.apply(SearchAction::CleanQuery);
        assert_eq!(state, once);
        assert_eq!(state, SearchState::default());
    }

    #[test]
    fn selection_then_clean_query_restores_baseline() {
        let mut state = SearchState::default();
        state.apply(SearchAction::UpdateSelection(city("Paris", 18.0, "Sunny", "url1")));
        assert_eq!(
            state.selection().map(|c| c.title.as_str()),
            Some("Paris")
        );

        state.apply(SearchAction::CleanQuery);
        assert_eq!(state, SearchState::default());
        assert!(!state.is_selected());
        assert_eq!(state.query(), "");
        assert!(state.results.is_empty());
    }

    #[test]
    fn selecting_a_card_keeps_the_record() {
        let mut state = SearchState::default();
        let paris = city("Paris", 18.0, "Sunny", "url1");
        state.apply(SearchAction::UpdateSelection(paris.clone()));
        let selected = state.selection().unwrap();
        assert_eq!(selected, &paris);
        assert_eq!(selected.temp_c, 18.0);
        assert_eq!(selected.description, "Sunny");
    }

    #[test]
    fn baseline_is_not_filtering() {
        let state = SearchState::default();
        assert!(!state.is_filtering());

        let mut searching = SearchState::default();
        searching.apply(SearchAction::StartSearch("z".into()));
        assert!(searching.is_filtering());
    }
}
