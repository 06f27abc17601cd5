//! Anime dashboard library built on the Jikan API v4.
//!
//! This library fetches anime records through a rate-limited client, shapes
//! them into fixed-schema rows, and computes the summaries, charts and
//! comparisons shown by the dashboard views.

pub mod analysis;
pub mod api;
pub mod cache;
pub mod compare;
pub mod error;
pub mod export;
pub mod shaper;
pub mod views;

pub use analysis::{summarize, ResultSet, Summary};
pub use api::{JikanClient, RateLimiter};
pub use cache::SuggestionCache;
pub use compare::{compare, ComparisonPair, Side};
pub use error::DashboardError;
pub use views::{compare_view, search_view, top_view, AppState, ViewOutcome};
