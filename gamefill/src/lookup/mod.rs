//! Title lookup boundary
//!
//! A [`GameLookup`] answers one question: which games does the provider know
//! under this title? Errors stay at this boundary; the row enricher turns each
//! of them into an empty candidate set.

pub mod hltb_client;

pub use hltb_client::HltbClient;

use crate::models::Candidate;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Lookup failures
#[derive(Debug, Error)]
pub enum LookupError {
    /// Response did not have the expected shape
    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Lookup timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limit exceeded")]
    RateLimited,

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Search capability of an external game database
///
/// Callers await [`GameLookup::ready`] before each [`GameLookup::search`]. Only
/// the search itself is subject to a lookup timeout; waiting for a permit is
/// local throttling, not provider latency.
#[async_trait]
pub trait GameLookup: Send + Sync {
    /// Provider name, carried in lookup events
    fn name(&self) -> &'static str;

    /// Wait until the provider may be queried again
    async fn ready(&self) {}

    /// Candidates matching `title`, possibly none
    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError>;
}
