//! Jikan API client with rate limiting and a narrowing retry.

use super::rate_limiter::RateLimiter;
use super::transport::{HttpTransport, Transport};
use super::types::{ApiEnvelope, QueryParams, QUERY_KEY};
use crate::error::Result;
use serde_json::Value;
use shared::config::JikanConfig;
use shared::{SearchParameters, TopParameters};
use std::time::Duration;
use tracing::{error, info};

/// Free-text anime search endpoint
pub const SEARCH_ENDPOINT: &str = "/anime";

/// Ranked anime endpoint
pub const TOP_ENDPOINT: &str = "/top/anime";

/// Retries allowed after an API-level error (each one narrows the parameters)
pub const MAX_NARROWING_RETRIES: u32 = 1;

/// Jikan API v4 client
pub struct JikanClient<T = HttpTransport> {
    /// Outbound transport
    transport: T,
    /// Base URL for Jikan API
    base_url: String,
    /// Process-wide rate limiter
    rate_limiter: RateLimiter,
}

impl JikanClient<HttpTransport> {
    /// Create a new Jikan client backed by reqwest
    pub fn new(
        base_url: String,
        rate_limiter: RateLimiter,
        timeout: Duration,
        user_agent: &str,
    ) -> anyhow::Result<Self> {
        let transport = HttpTransport::new(timeout, user_agent)?;
        Ok(Self::with_transport(transport, base_url, rate_limiter))
    }

    pub fn from_config(config: &JikanConfig) -> anyhow::Result<Self> {
        Self::new(
            config.base_url.clone(),
            RateLimiter::from_config(&config.rate_limit),
            Duration::from_secs(config.timeout_secs),
            &config.user_agent,
        )
    }
}

impl<T: Transport> JikanClient<T> {
    pub fn with_transport(transport: T, base_url: String, rate_limiter: RateLimiter) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            rate_limiter,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Throttled GET with the narrowing retry policy
    ///
    /// When the body is an API error and the parameters hold more than the
    /// query key, the request is repeated once with only the query key. If
    /// that also fails, or nothing could be narrowed, the error body itself is
    /// returned; callers check it with [`ApiEnvelope`]. Transport errors are
    /// returned immediately.
    pub async fn request(&mut self, endpoint: &str, params: &QueryParams) -> Result<Value> {
        let url = format!("{}{}", self.base_url, endpoint);
        let mut params = params.clone();
        let mut retries = 0;

        loop {
            self.rate_limiter.acquire().await;
            let body = self.transport.fetch(&url, &params).await?;

            let Some(message) = ApiEnvelope::error_message(&body) else {
                return Ok(body);
            };
            error!(url = %url, params = %params, error = %message, "API returned error");

            if retries < MAX_NARROWING_RETRIES {
                if let Some(narrowed) = params.narrowed() {
                    retries += 1;
                    info!(url = %url, params = %narrowed, "Retrying with simplified parameters");
                    params = narrowed;
                    continue;
                }
            }

            return Ok(body);
        }
    }

    /// Search anime by title, returning the raw `data` records
    pub async fn search_anime(&mut self, params: &SearchParameters) -> Result<Vec<Value>> {
        info!(query = %params.query, "Searching for anime");
        let body = self.request(SEARCH_ENDPOINT, &search_query(params)).await?;
        ApiEnvelope::into_records(body)
    }

    /// Fetch a ranked list, returning the raw `data` records
    pub async fn top_anime(&mut self, params: &TopParameters) -> Result<Vec<Value>> {
        info!(category = %params.category, "Fetching top anime");
        let body = self.request(TOP_ENDPOINT, &top_query(params)).await?;
        ApiEnvelope::into_records(body)
    }

    /// Best match for a title, if any
    pub async fn lookup(&mut self, title: &str) -> Result<Option<Value>> {
        let body = self.request(SEARCH_ENDPOINT, &lookup_query(title)).await?;
        Ok(ApiEnvelope::into_records(body)?.into_iter().next())
    }

    /// Short candidate list for the suggestion box
    pub async fn suggestions(&mut self, term: &str, limit: u32) -> Result<Vec<Value>> {
        let body = self
            .request(SEARCH_ENDPOINT, &suggestion_query(term, limit))
            .await?;
        ApiEnvelope::into_records(body)
    }
}

/// `/anime` parameters for the search view
pub fn search_query(params: &SearchParameters) -> QueryParams {
    let mut query = QueryParams::new()
        .with(QUERY_KEY, &params.query)
        .with("sfw", true);
    if let Some(types) = params.type_filter() {
        query.insert("type", types);
    }
    if let Some(limit) = params.limit {
        query.insert("limit", limit);
    }
    query
}

/// `/top/anime` parameters for the top view
pub fn top_query(params: &TopParameters) -> QueryParams {
    let mut query = QueryParams::new();
    if let Some(filter) = params.category.api_filter() {
        query.insert("filter", filter);
    }
    if let Some(format) = params.format {
        query.insert("type", format.api_code());
    }
    query
}

pub fn lookup_query(title: &str) -> QueryParams {
    QueryParams::new()
        .with(QUERY_KEY, title)
        .with("sfw", true)
        .with("limit", 1)
}

pub fn suggestion_query(term: &str, limit: u32) -> QueryParams {
    QueryParams::new()
        .with(QUERY_KEY, term)
        .with("sfw", true)
        .with("limit", limit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::ScriptedTransport;
    use crate::error::DashboardError;
    use serde_json::json;
    use shared::{AnimeFormat, TopCategory};
    use tokio::time::Instant;

    fn client(transport: ScriptedTransport) -> JikanClient<ScriptedTransport> {
        JikanClient::with_transport(
            transport,
            "https://api.jikan.moe/v4/".to_string(),
            RateLimiter::new(Duration::from_secs(1), 60),
        )
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = JikanClient::from_config(&shared::Config::default().jikan);
        assert!(client.is_ok());
        assert_eq!(client.unwrap().base_url(), "https://api.jikan.moe/v4");
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_returns_body_without_retry() {
        let transport = ScriptedTransport::new(vec![Ok(json!({"data": [{"title": "A"}]}))]);
        let mut client = client(transport);

        let params = QueryParams::new().with("q", "foo").with("sfw", true);
        let body = client.request(SEARCH_ENDPOINT, &params).await.unwrap();

        assert_eq!(body["data"][0]["title"], "A");
        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://api.jikan.moe/v4/anime");
        assert_eq!(calls[0].1, params);
    }

    #[tokio::test(start_paused = true)]
    async fn test_api_error_retries_once_with_query_only() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!({"error": "rate limited"})),
            Ok(json!({"data": [{"title": "Foo"}]})),
        ]);
        let mut client = client(transport);

        let params = QueryParams::new().with("q", "foo").with("sfw", true);
        let body = client.request(SEARCH_ENDPOINT, &params).await.unwrap();

        assert_eq!(body["data"][0]["title"], "Foo");
        let calls = client.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, params);
        assert_eq!(calls[1].1, QueryParams::new().with("q", "foo"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_type_filter_error_narrows_to_query() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!({"error": "rate limited"})),
            Ok(json!({"data": []})),
        ]);
        let mut client = client(transport);

        let params = QueryParams::new().with("q", "foo").with("type", "tv");
        client.request(SEARCH_ENDPOINT, &params).await.unwrap();

        let calls = client.transport().calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[1].1.get("q"), Some("foo"));
        assert_eq!(calls[1].1.get("type"), None);
        assert_eq!(calls[1].1.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_query_only_error_is_not_retried() {
        let error_body = json!({"error": "rate limited"});
        let transport = ScriptedTransport::new(vec![Ok(error_body.clone())]);
        let mut client = client(transport);

        let params = QueryParams::new().with("q", "foo");
        let body = client.request(SEARCH_ENDPOINT, &params).await.unwrap();

        assert_eq!(body, error_body);
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_is_bounded_and_returns_error_body() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!({"error": "first"})),
            Ok(json!({"error": "second"})),
            Ok(json!({"data": [{"title": "never fetched"}]})),
        ]);
        let mut client = client(transport);

        let params = QueryParams::new()
            .with("q", "foo")
            .with("sfw", true)
            .with("type", "tv");
        let body = client.request(SEARCH_ENDPOINT, &params).await.unwrap();

        assert_eq!(body["error"], "second");
        assert_eq!(client.transport().calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_is_throttled() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!({"error": "rate limited"})),
            Ok(json!({"data": []})),
        ]);
        let mut client = client(transport);

        let start = Instant::now();
        let params = QueryParams::new().with("q", "foo").with("sfw", true);
        client.request(SEARCH_ENDPOINT, &params).await.unwrap();

        let stamps = client.transport().call_times();
        assert_eq!(stamps.len(), 2);
        assert_eq!(stamps[0], start);
        assert!(stamps[1] - stamps[0] >= Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_error_is_not_retried() {
        let transport = ScriptedTransport::new(vec![Err(DashboardError::transport(
            "https://api.jikan.moe/v4/anime",
            "connection reset",
        ))]);
        let mut client = client(transport);

        let params = QueryParams::new().with("q", "foo").with("sfw", true);
        let err = client.request(SEARCH_ENDPOINT, &params).await.unwrap_err();

        assert!(matches!(err, DashboardError::Transport { .. }));
        assert_eq!(client.transport().calls().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_top_anime_without_query_surfaces_api_error() {
        let transport = ScriptedTransport::new(vec![Ok(json!({
            "error": "BadRequestException",
            "messages": {"error": "invalid filter"}
        }))]);
        let mut client = client(transport);

        let params = TopParameters::new(TopCategory::Airing, Some(AnimeFormat::Tv), 7.0).unwrap();
        let err = client.top_anime(&params).await.unwrap_err();

        assert!(matches!(err, DashboardError::Api { message } if message == "invalid filter"));
        let calls = client.transport().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://api.jikan.moe/v4/top/anime");
    }

    #[tokio::test(start_paused = true)]
    async fn test_lookup_takes_first_record() {
        let transport = ScriptedTransport::new(vec![
            Ok(json!({"data": [{"title": "First"}, {"title": "Second"}]})),
            Ok(json!({"data": []})),
        ]);
        let mut client = client(transport);

        let found = client.lookup("first").await.unwrap();
        assert_eq!(found.unwrap()["title"], "First");
        assert!(client.lookup("nothing").await.unwrap().is_none());

        let calls = client.transport().calls();
        assert_eq!(calls[0].1.get("limit"), Some("1"));
        assert_eq!(calls[0].1.get("sfw"), Some("true"));
    }

    #[test]
    fn test_search_query_assembly() {
        let params = SearchParameters::new("bebop", 5.0, &[AnimeFormat::Tv, AnimeFormat::Ova])
            .unwrap()
            .with_limit(10);
        let query = search_query(&params);

        assert_eq!(query.to_string(), "q=bebop&sfw=true&type=tv,ova&limit=10");

        let params = SearchParameters::new("bebop", 5.0, &[]).unwrap();
        assert_eq!(search_query(&params).to_string(), "q=bebop&sfw=true");
    }

    #[test]
    fn test_top_query_assembly() {
        let params = TopParameters::new(TopCategory::AllTimeBest, None, 7.0).unwrap();
        assert!(top_query(&params).is_empty());

        let params = TopParameters::new(TopCategory::MostPopular, Some(AnimeFormat::Movie), 7.0).unwrap();
        assert_eq!(top_query(&params).to_string(), "filter=bypopularity&type=movie");
    }

    #[test]
    fn test_suggestion_query_assembly() {
        assert_eq!(
            suggestion_query("frieren", 5).to_string(),
            "q=frieren&sfw=true&limit=5"
        );
    }
}
