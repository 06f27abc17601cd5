//! Dashboard views.
//!
//! Each view runs one throttle, fetch, shape, filter and summarize pass and
//! reports an outcome the front end can render directly. Views never return
//! errors: failures become [`ViewOutcome::Failed`] and empty data becomes
//! [`ViewOutcome::Empty`], so one view going wrong leaves the others usable.

use crate::analysis::{
    popularity_points, score_histogram, summarize, type_distribution, HistogramBin,
    PopularityPoint, ResultSet, Summary, TypeShare, HISTOGRAM_BINS,
};
use crate::api::{HttpTransport, JikanClient, Transport};
use crate::cache::SuggestionCache;
use crate::compare::{compare, ComparisonPair, Side};
use crate::error::DashboardError;
use crate::shaper::{shape_all, shape_detail, shape_suggestion};
use serde::Serialize;
use serde_json::Value;
use shared::{Config, SearchParameters, SuggestionEntry, TopParameters};
use std::time::Duration;
use tracing::{error, info, warn};

pub const MSG_ENTER_SEARCH_TERM: &str = "Enter a search term";
pub const MSG_NO_SEARCH_RESULTS: &str = "No results found. Try a different search term.";
pub const MSG_NO_SEARCH_MATCHES: &str = "No results match your filters.";
pub const MSG_NO_TOP_RESULTS: &str = "Unable to fetch top anime at the moment.";
pub const MSG_NO_TOP_MATCHES: &str = "No anime match your current filters.";
pub const MSG_SELECT_TWO: &str = "Select two anime to compare";
pub const MSG_NOT_FOUND: &str = "One or both anime not found. Please check the titles.";

/// What a view produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ViewOutcome<T> {
    Ready(T),
    /// Nothing to show; the message tells the user why
    Empty(String),
    /// The request failed; the message describes the failure
    Failed(String),
}

impl<T> ViewOutcome<T> {
    fn empty(message: &str) -> Self {
        ViewOutcome::Empty(message.to_string())
    }

    fn failed(view: &str, e: DashboardError) -> Self {
        error!(view = view, error = %e, "View failed");
        ViewOutcome::Failed(e.to_string())
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewOutcome::Ready(value) => Some(value),
            _ => None,
        }
    }
}

/// Search results with their charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub rows: ResultSet,
    pub summary: Summary,
    pub histogram: Vec<HistogramBin>,
    pub types: Vec<TypeShare>,
}

/// Ranked results with their charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopReport {
    pub rows: ResultSet,
    pub summary: Summary,
    pub histogram: Vec<HistogramBin>,
    pub types: Vec<TypeShare>,
    pub scatter: Vec<PopularityPoint>,
}

/// Titles chosen for the comparison view
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComparisonSelection {
    pub left: Option<String>,
    pub right: Option<String>,
}

impl ComparisonSelection {
    fn slot_mut(&mut self, slot: Side) -> &mut Option<String> {
        match slot {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    /// Both titles, if both slots are filled
    pub fn both(&self) -> Option<(&str, &str)> {
        Some((self.left.as_deref()?, self.right.as_deref()?))
    }
}

/// Session state shared by every view
pub struct AppState<T = HttpTransport> {
    client: JikanClient<T>,
    suggestions: SuggestionCache,
    suggestion_limit: u32,
    selection: ComparisonSelection,
}

impl AppState<HttpTransport> {
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let client = JikanClient::from_config(&config.jikan)?;
        Ok(Self::new(
            client,
            SuggestionCache::new(Duration::from_secs(config.suggestions.ttl_seconds)),
            config.suggestions.limit,
        ))
    }
}

impl<T: Transport> AppState<T> {
    pub fn new(client: JikanClient<T>, suggestions: SuggestionCache, suggestion_limit: u32) -> Self {
        Self {
            client,
            suggestions,
            suggestion_limit,
            selection: ComparisonSelection::default(),
        }
    }

    pub fn client(&self) -> &JikanClient<T> {
        &self.client
    }

    pub fn suggestion_cache(&self) -> &SuggestionCache {
        &self.suggestions
    }

    pub fn selection(&self) -> &ComparisonSelection {
        &self.selection
    }

    /// Put a title in a comparison slot; a blank title clears the slot
    pub fn select(&mut self, slot: Side, title: &str) {
        let title = title.trim();
        *self.selection.slot_mut(slot) = if title.is_empty() {
            None
        } else {
            Some(title.to_string())
        };
    }

    pub fn clear(&mut self, slot: Side) {
        *self.selection.slot_mut(slot) = None;
    }

    /// Suggestions for a partially typed title
    ///
    /// Blank terms return nothing without a request. Failures are logged and
    /// also return nothing; only successful lookups are cached.
    pub async fn suggest(&mut self, term: &str) -> Vec<SuggestionEntry> {
        let term = term.trim();
        if term.is_empty() {
            return Vec::new();
        }
        if let Some(cached) = self.suggestions.get(term) {
            return cached;
        }

        match self.client.suggestions(term, self.suggestion_limit).await {
            Ok(records) => {
                let entries: Vec<SuggestionEntry> = records
                    .iter()
                    .filter_map(|raw| match shape_suggestion(raw) {
                        Ok(entry) => Some(entry),
                        Err(e) => {
                            warn!(term = term, error = %e, "Skipping malformed suggestion");
                            None
                        }
                    })
                    .collect();
                self.suggestions.insert(term, entries.clone());
                entries
            }
            Err(e) => {
                error!(term = term, error = %e, "Error fetching suggestions");
                Vec::new()
            }
        }
    }
}

/// Search view
pub async fn search_view<T: Transport>(
    state: &mut AppState<T>,
    params: &SearchParameters,
) -> ViewOutcome<SearchReport> {
    if params.query.trim().is_empty() {
        return ViewOutcome::empty(MSG_ENTER_SEARCH_TERM);
    }

    let records = match state.client.search_anime(params).await {
        Ok(records) => records,
        Err(e) => return ViewOutcome::failed("search", e),
    };

    let rows = shape_all(&records);
    if rows.is_empty() {
        return ViewOutcome::empty(MSG_NO_SEARCH_RESULTS);
    }

    let filtered = rows.filter_by_score(params.min_score());
    let summary = match summarize(&filtered) {
        Ok(summary) => summary,
        Err(_) => return ViewOutcome::empty(MSG_NO_SEARCH_MATCHES),
    };
    info!(
        query = %params.query,
        fetched = rows.len(),
        shown = filtered.len(),
        "Search view ready"
    );

    ViewOutcome::Ready(SearchReport {
        histogram: score_histogram(&filtered, HISTOGRAM_BINS),
        types: type_distribution(&filtered),
        summary,
        rows: filtered,
    })
}

/// Top anime view
pub async fn top_view<T: Transport>(
    state: &mut AppState<T>,
    params: &TopParameters,
) -> ViewOutcome<TopReport> {
    let records = match state.client.top_anime(params).await {
        Ok(records) => records,
        Err(e) => return ViewOutcome::failed("top", e),
    };

    let rows = shape_all(&records);
    if rows.is_empty() {
        return ViewOutcome::empty(MSG_NO_TOP_RESULTS);
    }

    let filtered = rows.filter_by_score(params.min_score());
    let summary = match summarize(&filtered) {
        Ok(summary) => summary,
        Err(_) => return ViewOutcome::empty(MSG_NO_TOP_MATCHES),
    };
    info!(
        category = %params.category,
        fetched = rows.len(),
        shown = filtered.len(),
        "Top view ready"
    );

    ViewOutcome::Ready(TopReport {
        histogram: score_histogram(&filtered, HISTOGRAM_BINS),
        types: type_distribution(&filtered),
        scatter: popularity_points(&filtered),
        summary,
        rows: filtered,
    })
}

fn found_detail(record: Option<Value>) -> Option<shared::AnimeDetail> {
    let raw = record?;
    match shape_detail(&raw) {
        Ok(detail) => Some(detail),
        Err(e) => {
            warn!(error = %e, "Lookup returned an unusable record");
            None
        }
    }
}

/// Comparison view over the two selected titles
pub async fn compare_view<T: Transport>(state: &mut AppState<T>) -> ViewOutcome<ComparisonPair> {
    let Some((left_title, right_title)) = state
        .selection
        .both()
        .map(|(l, r)| (l.to_string(), r.to_string()))
    else {
        return ViewOutcome::empty(MSG_SELECT_TWO);
    };

    let left = match state.client.lookup(&left_title).await {
        Ok(record) => record,
        Err(e) => return ViewOutcome::failed("compare", e),
    };
    let right = match state.client.lookup(&right_title).await {
        Ok(record) => record,
        Err(e) => return ViewOutcome::failed("compare", e),
    };

    match (found_detail(left), found_detail(right)) {
        (Some(left), Some(right)) => {
            info!(left = %left_title, right = %right_title, "Compare view ready");
            ViewOutcome::Ready(compare(left, right))
        }
        _ => ViewOutcome::empty(MSG_NOT_FOUND),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::api::RateLimiter;
    use serde_json::json;
    use shared::{AnimeFormat, TopCategory};

    fn state(responses: Vec<crate::error::Result<Value>>) -> AppState<ScriptedTransport> {
        let client = JikanClient::with_transport(
            ScriptedTransport::new(responses),
            "https://api.jikan.moe/v4".to_string(),
            RateLimiter::new(Duration::from_secs(1), 60),
        );
        AppState::new(client, SuggestionCache::new(Duration::from_secs(300)), 5)
    }

    fn search(query: &str, min_score: f64) -> SearchParameters {
        SearchParameters::new(query, min_score, &[]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_view_ready() {
        let mut state = state(vec![Ok(json!({"data": [
            {"title": "A", "score": 6.0, "type": "TV"},
            {"title": "B", "score": 8.0, "type": "TV"},
            {"title": "C", "score": 10.0, "type": "Movie"},
            {"title": "Low", "score": 2.0, "type": "OVA"}
        ]}))]);

        let outcome = search_view(&mut state, &search("x", 5.0)).await;
        let report = outcome.ready().unwrap();

        assert_eq!(report.rows.len(), 3);
        assert_eq!(report.summary.mean_score, 8.0);
        assert_eq!(report.summary.modal_type, "TV");
        assert_eq!(report.types.len(), 2);
        assert_eq!(report.histogram.iter().map(|b| b.count).sum::<usize>(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_view_sends_type_filter() {
        let mut state = state(vec![Ok(json!({"data": [{"title": "A", "score": 9.0}]}))]);
        let params =
            SearchParameters::new("bebop", 0.0, &[AnimeFormat::Tv, AnimeFormat::Movie]).unwrap();

        search_view(&mut state, &params).await;

        let calls = state.client().transport().calls();
        assert_eq!(calls[0].0, "https://api.jikan.moe/v4/anime");
        assert_eq!(calls[0].1.to_string(), "q=bebop&sfw=true&type=tv,movie");
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_view_empty_states() {
        let mut state = state(vec![
            Ok(json!({"data": []})),
            Ok(json!({"data": [{"title": "A", "score": 3.0}]})),
        ]);

        assert_eq!(
            search_view(&mut state, &search("   ", 5.0)).await,
            ViewOutcome::Empty(MSG_ENTER_SEARCH_TERM.to_string())
        );
        assert!(state.client().transport().calls().is_empty());

        assert_eq!(
            search_view(&mut state, &search("nothing", 5.0)).await,
            ViewOutcome::Empty(MSG_NO_SEARCH_RESULTS.to_string())
        );
        assert_eq!(
            search_view(&mut state, &search("low", 5.0)).await,
            ViewOutcome::Empty(MSG_NO_SEARCH_MATCHES.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_view_failures() {
        let mut state = state(vec![
            Err(DashboardError::transport("https://api.jikan.moe/v4/anime", "timed out")),
            Ok(json!({"error": "first"})),
            Ok(json!({"error": "BadRequest", "messages": {"error": "still bad"}})),
        ]);

        match search_view(&mut state, &search("x", 5.0)).await {
            ViewOutcome::Failed(message) => assert!(message.contains("timed out")),
            other => panic!("Expected Failed, got: {other:?}"),
        }
        match search_view(&mut state, &search("x", 5.0)).await {
            ViewOutcome::Failed(message) => assert!(message.contains("still bad")),
            other => panic!("Expected Failed, got: {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_view_ready_and_filtered() {
        let mut state = state(vec![
            Ok(json!({"data": [
                {"title": "A", "score": 9.1, "type": "TV", "members": 100, "rank": 1},
                {"title": "B", "score": 6.0, "type": "TV", "members": 50, "rank": 900}
            ]})),
            Ok(json!({"data": [{"title": "C", "score": 5.0}]})),
            Ok(json!({"data": []})),
        ]);
        let params = TopParameters::new(TopCategory::Airing, None, 7.0).unwrap();

        let outcome = top_view(&mut state, &params).await;
        let report = outcome.ready().unwrap();
        assert_eq!(report.rows.len(), 1);
        assert_eq!(report.scatter[0].rank, Some(1));
        assert_eq!(report.summary.total_members, 100);

        assert_eq!(
            top_view(&mut state, &params).await,
            ViewOutcome::Empty(MSG_NO_TOP_MATCHES.to_string())
        );
        assert_eq!(
            top_view(&mut state, &params).await,
            ViewOutcome::Empty(MSG_NO_TOP_RESULTS.to_string())
        );

        let calls = state.client().transport().calls();
        assert_eq!(calls[0].0, "https://api.jikan.moe/v4/top/anime");
        assert_eq!(calls[0].1.to_string(), "filter=airing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_view_needs_two_titles() {
        let mut state = state(Vec::new());
        state.select(Side::Left, "Frieren");

        assert_eq!(
            compare_view(&mut state).await,
            ViewOutcome::Empty(MSG_SELECT_TWO.to_string())
        );
        assert!(state.client().transport().calls().is_empty());

        state.select(Side::Right, "Bebop");
        state.clear(Side::Left);
        assert_eq!(state.selection().left, None);
        state.select(Side::Right, "  ");
        assert_eq!(state.selection().right, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_view_ready() {
        let mut state = state(vec![
            Ok(json!({"data": [{"title": "Frieren", "score": 9.3, "episodes": 28,
                "genres": [{"name": "Adventure"}, {"name": "Drama"}]}]})),
            Ok(json!({"data": [{"title": "Bebop", "score": 8.75, "episodes": 26,
                "genres": [{"name": "Action"}, {"name": "Drama"}]}]})),
        ]);
        state.select(Side::Left, "frieren");
        state.select(Side::Right, "bebop");

        let outcome = compare_view(&mut state).await;
        let pair = outcome.ready().unwrap();

        assert_eq!(pair.higher_rated, Some(Side::Left));
        assert_eq!(pair.episode_delta, Some(2));
        assert!(pair.shared_genres.contains("Drama"));
        assert_eq!(pair.shared_genres.len(), 1);

        let calls = state.client().transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1.to_string(), "q=frieren&sfw=true&limit=1");
        assert_eq!(calls[1].1.get("q"), Some("bebop"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_compare_view_not_found() {
        let mut state = state(vec![
            Ok(json!({"data": [{"title": "Frieren"}]})),
            Ok(json!({"data": []})),
        ]);
        state.select(Side::Left, "frieren");
        state.select(Side::Right, "does not exist");

        assert_eq!(
            compare_view(&mut state).await,
            ViewOutcome::Empty(MSG_NOT_FOUND.to_string())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_reads_through_cache() {
        let mut state = state(vec![Ok(json!({"data": [
            {"mal_id": 1, "title": "Naruto"},
            {"mal_id": 20, "title": "Naruto: Shippuden"}
        ]}))]);

        let first = state.suggest(" naruto ").await;
        assert_eq!(first.len(), 2);
        let second = state.suggest("naruto").await;
        assert_eq!(second, first);

        let calls = state.client().transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.to_string(), "q=naruto&sfw=true&limit=5");
        assert_eq!(state.suggestion_cache().stats().live_entries, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_refetches_after_ttl() {
        let mut state = state(vec![
            Ok(json!({"data": [{"title": "Old"}]})),
            Ok(json!({"data": [{"title": "New"}]})),
        ]);

        assert_eq!(state.suggest("x").await[0].title, "Old");
        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(state.suggest("x").await[0].title, "New");
        assert_eq!(state.client().transport().calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_suggest_blank_and_failures_are_empty() {
        let mut state = state(vec![Err(DashboardError::transport(
            "https://api.jikan.moe/v4/anime",
            "connection reset",
        ))]);

        assert!(state.suggest("   ").await.is_empty());
        assert!(state.client().transport().calls().is_empty());

        assert!(state.suggest("naruto").await.is_empty());
        assert_eq!(state.suggestion_cache().stats().total_entries, 0);
    }
}
