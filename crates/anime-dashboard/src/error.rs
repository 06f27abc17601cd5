use thiserror::Error;

/// Errors raised by the dashboard core.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network failure, timeout, or a body that is not JSON. Never retried.
    #[error("Failed to fetch data from {endpoint}: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The API answered with an error payload instead of data.
    #[error("API returned error: {message}")]
    Api { message: String },

    /// A single record could not be shaped into a row.
    #[error("malformed record: {reason}")]
    MalformedRecord { reason: String },

    /// Nothing left to aggregate.
    #[error("no rows to summarize")]
    EmptyResult,
}

impl DashboardError {
    pub(crate) fn transport(
        endpoint: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        DashboardError::Transport {
            endpoint: endpoint.into(),
            source: source.into(),
        }
    }

    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        DashboardError::MalformedRecord {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
