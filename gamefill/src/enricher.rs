//! Row enricher
//!
//! Drives one lookup cycle for one row:
//! type check → lookup → best-match selection → per-field finalize.
//!
//! Every error is contained here. A row always comes out with a value or a
//! not-found marker for each field it asked for.

use crate::events::{EnrichmentEvent, EnrichmentSink, FieldStatus};
use crate::lookup::{GameLookup, LookupError};
use crate::matcher::select_best;
use crate::models::{Candidate, EnrichmentResult, FieldSet, FieldValue, TargetField, TitleCell};
use crate::normalizer::normalize_duration;
use std::sync::Arc;
use std::time::Duration;

/// How a row cycle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    /// A candidate was selected (individual fields may still be not found)
    Matched,
    /// Lookup succeeded with no usable candidate
    NoMatch,
    /// Lookup raised an error or timed out
    LookupFailed,
    /// Title is not a string, no lookup was made
    InvalidTitle,
}

/// Result of one row cycle
#[derive(Debug, Clone, PartialEq)]
pub struct RowOutcome {
    pub status: RowStatus,
    pub result: EnrichmentResult,
}

/// Per-row enrichment driver
pub struct RowEnricher {
    lookup: Arc<dyn GameLookup>,
    sink: Arc<dyn EnrichmentSink>,
    lookup_timeout: Option<Duration>,
}

impl RowEnricher {
    pub fn new(lookup: Arc<dyn GameLookup>, sink: Arc<dyn EnrichmentSink>) -> Self {
        Self {
            lookup,
            sink,
            lookup_timeout: None,
        }
    }

    /// Bound each lookup; expiry is handled like any other lookup failure
    pub fn with_lookup_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    /// Resolve the `requested` fields of row `row`
    pub async fn enrich_row(&self, row: usize, title: &TitleCell, requested: FieldSet) -> RowOutcome {
        let Some(text) = title.as_text() else {
            for field in requested.fields() {
                self.sink.record(&EnrichmentEvent::Field {
                    row,
                    field,
                    status: FieldStatus::InvalidTitle,
                    title: title.display().to_string(),
                    value: None,
                });
            }
            return RowOutcome {
                status: RowStatus::InvalidTitle,
                result: EnrichmentResult::not_found(requested),
            };
        };

        self.sink.record(&EnrichmentEvent::LookupStarted {
            row,
            title: text.to_string(),
            provider: self.lookup.name(),
        });

        let (candidates, lookup_failed) = match self.search(text).await {
            Ok(candidates) => (candidates, false),
            Err(e) => {
                self.sink.record(&EnrichmentEvent::LookupFailed {
                    row,
                    title: text.to_string(),
                    provider: self.lookup.name(),
                    error: e.to_string(),
                });
                (Vec::new(), true)
            }
        };

        let Some(best) = select_best(&candidates) else {
            if !lookup_failed {
                self.sink.record(&EnrichmentEvent::NoMatch {
                    row,
                    title: text.to_string(),
                });
            }
            self.record_fields(row, text, requested, &EnrichmentResult::not_found(requested));
            return RowOutcome {
                status: if lookup_failed {
                    RowStatus::LookupFailed
                } else {
                    RowStatus::NoMatch
                },
                result: EnrichmentResult::not_found(requested),
            };
        };

        let result = finalize(best, requested);
        self.record_fields(row, text, requested, &result);

        RowOutcome {
            status: RowStatus::Matched,
            result,
        }
    }

    /// Wait for a permit, then run the (optionally timed) search
    async fn search(&self, title: &str) -> Result<Vec<Candidate>, LookupError> {
        self.lookup.ready().await;
        match self.lookup_timeout {
            Some(limit) => tokio::time::timeout(limit, self.lookup.search(title))
                .await
                .map_err(|_| LookupError::Timeout(limit))?,
            None => self.lookup.search(title).await,
        }
    }

    fn record_fields(&self, row: usize, title: &str, requested: FieldSet, result: &EnrichmentResult) {
        for field in requested.fields() {
            let value = result.get(field).and_then(|v| v.value().copied());
            self.sink.record(&EnrichmentEvent::Field {
                row,
                field,
                status: if value.is_some() {
                    FieldStatus::Found
                } else {
                    FieldStatus::NotFound
                },
                title: title.to_string(),
                value,
            });
        }
    }
}

/// Per-field finalize of a selected candidate
fn finalize(best: &Candidate, requested: FieldSet) -> EnrichmentResult {
    let mut result = EnrichmentResult::default();
    for field in requested.fields() {
        let value = match field {
            TargetField::TimeToBeat => best.main_story_hours.map(normalize_duration),
            TargetField::Year => best.release_year.map(|year| year as f64),
            TargetField::Score => best.review_score.map(|score| score as f64),
        };
        result.set(field, FieldValue::from_lookup(value));
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::NullSink;
    use async_trait::async_trait;

    struct FixedLookup(Vec<Candidate>);

    #[async_trait]
    impl GameLookup for FixedLookup {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn search(&self, _title: &str) -> Result<Vec<Candidate>, LookupError> {
            Ok(self.0.clone())
        }
    }

    struct FailingLookup;

    #[async_trait]
    impl GameLookup for FailingLookup {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn search(&self, _title: &str) -> Result<Vec<Candidate>, LookupError> {
            Err(LookupError::Malformed("expected list".to_string()))
        }
    }

    /// Permits come slowly, searches answer at once
    struct ThrottledLookup(Duration);

    #[async_trait]
    impl GameLookup for ThrottledLookup {
        fn name(&self) -> &'static str {
            "throttled"
        }

        async fn ready(&self) {
            tokio::time::sleep(self.0).await;
        }

        async fn search(&self, _title: &str) -> Result<Vec<Candidate>, LookupError> {
            Ok(vec![candidate(Some(10.0), Some(2020), Some(90))])
        }
    }

    fn enricher(lookup: impl GameLookup + 'static) -> RowEnricher {
        RowEnricher::new(Arc::new(lookup), Arc::new(NullSink))
    }

    fn candidate(hours: Option<f64>, year: Option<i64>, score: Option<i64>) -> Candidate {
        Candidate {
            name: "Outer Wilds".to_string(),
            similarity: 1.0,
            main_story_hours: hours,
            release_year: year,
            review_score: score,
        }
    }

    #[tokio::test]
    async fn test_only_requested_fields_are_resolved() {
        let enricher = enricher(FixedLookup(vec![candidate(Some(16.6), Some(2019), Some(88))]));
        let requested = FieldSet {
            time_to_beat: true,
            year: false,
            score: true,
        };

        let outcome = enricher.enrich_row(0, &"Outer Wilds".into(), requested).await;

        assert_eq!(outcome.status, RowStatus::Matched);
        assert_eq!(outcome.result.time_to_beat, Some(FieldValue::Present(16.75)));
        assert_eq!(outcome.result.year, None);
        assert_eq!(outcome.result.score, Some(FieldValue::Present(88.0)));
    }

    #[tokio::test]
    async fn test_lookup_error_becomes_not_found() {
        let enricher = enricher(FailingLookup);

        let outcome = enricher.enrich_row(0, &"Outer Wilds".into(), FieldSet::ALL).await;

        assert_eq!(outcome.status, RowStatus::LookupFailed);
        assert_eq!(outcome.result, EnrichmentResult::not_found(FieldSet::ALL));
    }

    #[tokio::test]
    async fn test_invalid_title_marks_requested_fields() {
        let enricher = enricher(FailingLookup);
        let title = TitleCell::Invalid {
            kind: "real".to_string(),
            repr: "3.5".to_string(),
        };
        let requested = FieldSet {
            time_to_beat: false,
            year: true,
            score: true,
        };

        let outcome = enricher.enrich_row(0, &title, requested).await;

        assert_eq!(outcome.status, RowStatus::InvalidTitle);
        assert_eq!(outcome.result.time_to_beat, None);
        assert_eq!(outcome.result.year, Some(FieldValue::NotFound));
        assert_eq!(outcome.result.score, Some(FieldValue::NotFound));
    }

    #[tokio::test]
    async fn test_permit_wait_is_not_timed() {
        let enricher = enricher(ThrottledLookup(Duration::from_millis(200)))
            .with_lookup_timeout(Some(Duration::from_millis(50)));

        let outcome = enricher.enrich_row(0, &"Outer Wilds".into(), FieldSet::ALL).await;

        assert_eq!(outcome.status, RowStatus::Matched);
        assert_eq!(outcome.result.time_to_beat, Some(FieldValue::Present(10.0)));
    }
}
