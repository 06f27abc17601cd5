//! Single outbound HTTP request, JSON in, JSON out.

use super::types::QueryParams;
use crate::error::{DashboardError, Result};
use anyhow::Context;
use reqwest::Client;
use serde_json::Value;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, info};

/// Issues one GET request and returns the parsed JSON body.
///
/// Implementations must return the body whatever the HTTP status is: the
/// Jikan API reports some errors inside a 200 body and some inside a 4xx
/// body, and the retry policy inspects both the same way.
pub trait Transport: Send + Sync {
    fn fetch(
        &self,
        url: &str,
        params: &QueryParams,
    ) -> impl Future<Output = Result<Value>> + Send;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration, user_agent: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    async fn fetch(&self, url: &str, params: &QueryParams) -> Result<Value> {
        info!(url = %url, params = %params, "Making API request");

        let response = self
            .client
            .get(url)
            .query(params.pairs())
            .send()
            .await
            .map_err(|e| DashboardError::transport(url, e))?;

        let status = response.status();
        info!(url = %url, status = %status, "API response status");

        let text = response
            .text()
            .await
            .map_err(|e| DashboardError::transport(url, e))?;

        let body: Value =
            serde_json::from_str(&text).map_err(|e| DashboardError::transport(url, e))?;

        debug!(url = %url, keys = ?top_level_keys(&body), "API returned body");
        if let Some(items) = body.get("data").and_then(Value::as_array) {
            info!(url = %url, results = items.len(), "API returned results");
        }

        Ok(body)
    }
}

fn top_level_keys(body: &Value) -> Vec<&str> {
    body.as_object()
        .map(|fields| fields.keys().map(String::as_str).collect())
        .unwrap_or_default()
}
