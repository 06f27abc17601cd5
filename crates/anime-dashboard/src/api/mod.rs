//! Jikan API v4 access layer.
//!
//! This module provides a rate-limited client for the Jikan API (the
//! unofficial MyAnimeList API) that retries API-level errors once with
//! narrowed parameters.

pub mod client;
pub mod rate_limiter;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use client::JikanClient;
pub use rate_limiter::RateLimiter;
pub use transport::{HttpTransport, Transport};
pub use types::*;
