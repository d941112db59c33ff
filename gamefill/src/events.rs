//! Enrichment observability events
//!
//! The enricher and updater report what happened to each row through an
//! injected [`EnrichmentSink`] instead of logging directly, so callers decide
//! where the trail goes.

use crate::models::TargetField;
use serde::Serialize;

/// Outcome of one target field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Found,
    NotFound,
    InvalidTitle,
}

/// Enrichment events, one stream per update run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnrichmentEvent {
    /// A lookup is about to be sent for this row
    LookupStarted {
        row: usize,
        title: String,
        provider: &'static str,
    },

    /// Lookup raised an error; the row proceeds with no candidates
    LookupFailed {
        row: usize,
        title: String,
        provider: &'static str,
        error: String,
    },

    /// Lookup succeeded but no candidate qualified
    NoMatch { row: usize, title: String },

    /// One target field was resolved or marked not found
    Field {
        row: usize,
        field: TargetField,
        status: FieldStatus,
        title: String,
        value: Option<f64>,
    },

    /// A selected row finished processing
    Progress { processed: usize, total: usize },
}

/// Destination for enrichment events
pub trait EnrichmentSink: Send + Sync {
    fn record(&self, event: &EnrichmentEvent);
}

/// Forwards events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EnrichmentSink for TracingSink {
    fn record(&self, event: &EnrichmentEvent) {
        match event {
            EnrichmentEvent::LookupStarted {
                row,
                title,
                provider,
            } => {
                tracing::info!(row, title = %title, provider, "Searching details");
            }
            EnrichmentEvent::LookupFailed {
                row,
                title,
                provider,
                error,
            } => {
                tracing::error!(row, title = %title, provider, error = %error, "Lookup failed");
            }
            EnrichmentEvent::NoMatch { row, title } => {
                tracing::warn!(row, title = %title, "No results found");
            }
            EnrichmentEvent::Field {
                row,
                field,
                status,
                title,
                value,
            } => match status {
                FieldStatus::Found => {
                    tracing::info!(row, field = %field, title = %title, value = ?value, "Field updated");
                }
                FieldStatus::NotFound => {
                    tracing::warn!(row, field = %field, title = %title, "Field not found, marked as not found");
                }
                FieldStatus::InvalidTitle => {
                    tracing::error!(row, field = %field, title = %title, "Invalid title, field marked as not found");
                }
            },
            EnrichmentEvent::Progress { processed, total } => {
                tracing::info!(processed, total, "Updating game details");
            }
        }
    }
}

/// Discards every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EnrichmentSink for NullSink {
    fn record(&self, _event: &EnrichmentEvent) {}
}
