//! HowLongToBeat search client
//!
//! Concept: POST a title search, score every returned game against the
//! searched title, keep the ones above the similarity floor.
//!
//! The provider reports completion times in seconds and uses `0` for any
//! attribute it has no data for.

use super::{GameLookup, LookupError};
use crate::models::Candidate;
use async_trait::async_trait;
use gamefill_common::config::LookupConfig;
use governor::{Quota, RateLimiter};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::num::NonZeroU32;
use std::time::Duration;

const REFERER: &str = "https://howlongtobeat.com/";
const SECONDS_PER_HOUR: f64 = 3600.0;

/// Search response body
#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    game_name: String,
    #[serde(default)]
    game_alias: Option<String>,
    /// Main story time in seconds
    #[serde(default)]
    comp_main: Option<f64>,
    #[serde(default)]
    release_world: Option<i64>,
    #[serde(default)]
    review_score: Option<i64>,
}

/// HowLongToBeat client
///
/// Requests are rate limited with a token bucket. [`GameLookup::ready`] waits
/// for a permit; [`GameLookup::search`] sends immediately.
pub struct HltbClient {
    client: Client,
    search_url: String,
    user_agent: String,
    page_size: u32,
    minimum_similarity: f64,
    case_sensitive: bool,
    rate_limiter: RateLimiter<
        governor::state::direct::NotKeyed,
        governor::state::InMemoryState,
        governor::clock::DefaultClock,
    >,
}

impl HltbClient {
    /// Build a client from the `[lookup]` configuration section
    pub fn from_config(config: &LookupConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| LookupError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let per_second = NonZeroU32::new(config.requests_per_second).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = RateLimiter::direct(Quota::per_second(per_second));

        Ok(Self {
            client,
            search_url: join_url(&config.base_url, &config.search_path),
            user_agent: config.user_agent.clone(),
            page_size: config.page_size,
            minimum_similarity: config.minimum_similarity,
            case_sensitive: config.case_sensitive,
            rate_limiter,
        })
    }

    fn request_body(&self, title: &str) -> serde_json::Value {
        json!({
            "searchType": "games",
            "searchTerms": title.split_whitespace().collect::<Vec<_>>(),
            "searchPage": 1,
            "size": self.page_size,
            "searchOptions": {
                "games": {
                    "userId": 0,
                    "platform": "",
                    "sortCategory": "popular",
                    "rangeCategory": "main",
                    "rangeTime": { "min": 0, "max": 0 },
                    "gameplay": { "perspective": "", "flow": "", "genre": "", "difficulty": "" },
                    "rangeYear": { "min": "", "max": "" },
                    "modifier": ""
                },
                "users": { "sortCategory": "postcount" },
                "lists": { "sortCategory": "follows" },
                "filter": "",
                "sort": 0,
                "randomizer": 0
            },
            "useCache": true
        })
    }
}

#[async_trait]
impl GameLookup for HltbClient {
    fn name(&self) -> &'static str {
        "HowLongToBeat"
    }

    async fn ready(&self) {
        self.rate_limiter.until_ready().await;
    }

    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError> {
        if title.trim().is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(title = %title, url = %self.search_url, "Querying HowLongToBeat");

        let response = self
            .client
            .post(&self.search_url)
            .header("User-Agent", &self.user_agent)
            .header("Referer", REFERER)
            .json(&self.request_body(title))
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LookupError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let candidates = parse_search_response(
            &body,
            title,
            self.case_sensitive,
            self.minimum_similarity,
        )?;

        tracing::debug!(title = %title, candidates = candidates.len(), "HowLongToBeat search complete");

        Ok(candidates)
    }
}

/// Decode a search response into scored candidates, in response order
///
/// Candidates below `minimum_similarity` are dropped.
pub fn parse_search_response(
    body: &str,
    title: &str,
    case_sensitive: bool,
    minimum_similarity: f64,
) -> Result<Vec<Candidate>, LookupError> {
    let response: SearchResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Malformed(e.to_string()))?;

    Ok(response
        .data
        .into_iter()
        .map(|entry| to_candidate(entry, title, case_sensitive))
        .filter(|candidate| candidate.similarity >= minimum_similarity)
        .collect())
}

fn to_candidate(entry: SearchEntry, title: &str, case_sensitive: bool) -> Candidate {
    let name_similarity = title_similarity(title, &entry.game_name, case_sensitive);
    let alias_similarity = entry
        .game_alias
        .as_deref()
        .filter(|alias| !alias.trim().is_empty())
        .map(|alias| title_similarity(title, alias, case_sensitive))
        .unwrap_or(0.0);

    Candidate {
        similarity: name_similarity.max(alias_similarity),
        main_story_hours: entry
            .comp_main
            .filter(|secs| *secs > 0.0)
            .map(|secs| round_hundredths(secs / SECONDS_PER_HOUR)),
        release_year: entry.release_world.filter(|year| *year > 0),
        review_score: entry.review_score.filter(|score| *score > 0),
        name: entry.game_name,
    }
}

/// Normalized Levenshtein similarity (0.0-1.0)
pub fn title_similarity(searched: &str, candidate: &str, case_sensitive: bool) -> f64 {
    if case_sensitive {
        strsim::normalized_levenshtein(searched.trim(), candidate.trim())
    } else {
        strsim::normalized_levenshtein(
            &searched.trim().to_lowercase(),
            &candidate.trim().to_lowercase(),
        )
    }
}

fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn join_url(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
