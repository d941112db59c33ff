//! Shared test doubles for enrichment integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use gamefill::{Candidate, EnrichmentEvent, EnrichmentSink, GameLookup, LookupError};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// Scripted reply for one title
pub enum Reply {
    Candidates(Vec<Candidate>),
    Malformed,
    Network,
    /// Sleep, then answer with these candidates
    Delayed(Duration, Vec<Candidate>),
}

/// Lookup answering from a fixed script; unknown titles get no candidates
#[derive(Default)]
pub struct StubLookup {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    /// Permits are handed out one at a time, this far apart
    permit_interval: Option<Duration>,
    permits: tokio::sync::Mutex<()>,
}

impl StubLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, title: &str, reply: Reply) -> Self {
        self.replies.insert(title.to_string(), reply);
        self
    }

    pub fn permit_interval(mut self, interval: Duration) -> Self {
        self.permit_interval = Some(interval);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameLookup for StubLookup {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn ready(&self) {
        if let Some(interval) = self.permit_interval {
            let _permit = self.permits.lock().await;
            tokio::time::sleep(interval).await;
        }
    }

    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError> {
        self.calls.lock().unwrap().push(title.to_string());
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let result = match self.replies.get(title) {
            None => Ok(Vec::new()),
            Some(Reply::Candidates(candidates)) => Ok(candidates.clone()),
            Some(Reply::Malformed) => Err(LookupError::Malformed("invalid type: string, expected f64".to_string())),
            Some(Reply::Network) => Err(LookupError::Network("connection reset".to_string())),
            Some(Reply::Delayed(delay, candidates)) => {
                tokio::time::sleep(*delay).await;
                Ok(candidates.clone())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

/// Sink keeping every event for inspection
#[derive(Default)]
pub struct CollectingSink {
    events: Mutex<Vec<EnrichmentEvent>>,
}

impl CollectingSink {
    pub fn events(&self) -> Vec<EnrichmentEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl EnrichmentSink for CollectingSink {
    fn record(&self, event: &EnrichmentEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn candidate(
    name: &str,
    similarity: f64,
    hours: Option<f64>,
    year: Option<i64>,
    score: Option<i64>,
) -> Candidate {
    Candidate {
        name: name.to_string(),
        similarity,
        main_story_hours: hours,
        release_year: year,
        review_score: score,
    }
}
