//! Table updater
//!
//! Selects every row with at least one missing target field, runs a row cycle
//! for each, and merges the results back in table order.
//!
//! Up to `concurrency` lookups may be in flight at once. Results are still
//! consumed in row order and written by this single loop, so the table never
//! sees concurrent writers.

use crate::enricher::{RowEnricher, RowOutcome, RowStatus};
use crate::events::{EnrichmentEvent, EnrichmentSink};
use crate::lookup::GameLookup;
use crate::models::{FieldSet, GameTable};
use futures::stream::{self, StreamExt};
use gamefill_common::config::TomlConfig;
use std::sync::Arc;
use std::time::Duration;

/// Knobs for one update run
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateOptions {
    /// Maximum lookups in flight (values below 1 behave as 1)
    pub concurrency: usize,
    /// Treat not-found cells from earlier runs as missing
    pub retry_not_found: bool,
    pub lookup_timeout: Option<Duration>,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            concurrency: 1,
            retry_not_found: false,
            lookup_timeout: None,
        }
    }
}

impl From<&TomlConfig> for UpdateOptions {
    fn from(config: &TomlConfig) -> Self {
        let timeout_secs = config.lookup.lookup_timeout_secs;
        Self {
            concurrency: config.enrich.concurrency,
            retry_not_found: config.enrich.retry_not_found,
            lookup_timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
        }
    }
}

/// Counters for one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub rows_total: usize,
    pub rows_selected: usize,
    pub rows_processed: usize,
    pub fields_found: usize,
    pub fields_not_found: usize,
    pub invalid_titles: usize,
    pub lookup_failures: usize,
    pub no_matches: usize,
}

impl UpdateSummary {
    fn record(&mut self, outcome: &RowOutcome, written: FieldSet) {
        self.rows_processed += 1;
        match outcome.status {
            RowStatus::Matched => {}
            RowStatus::NoMatch => self.no_matches += 1,
            RowStatus::LookupFailed => self.lookup_failures += 1,
            RowStatus::InvalidTitle => self.invalid_titles += 1,
        }
        for field in written.fields() {
            match outcome.result.get(field) {
                Some(value) if value.is_present() => self.fields_found += 1,
                Some(_) => self.fields_not_found += 1,
                None => {}
            }
        }
    }
}

/// Applies row enrichment across a whole table
pub struct TableUpdater {
    enricher: RowEnricher,
    sink: Arc<dyn EnrichmentSink>,
    options: UpdateOptions,
}

impl TableUpdater {
    pub fn new(
        lookup: Arc<dyn GameLookup>,
        sink: Arc<dyn EnrichmentSink>,
        options: UpdateOptions,
    ) -> Self {
        let enricher = RowEnricher::new(lookup, Arc::clone(&sink))
            .with_lookup_timeout(options.lookup_timeout);
        Self {
            enricher,
            sink,
            options,
        }
    }

    /// Fill every missing target cell of `table` in place
    ///
    /// Cells that already hold a value are never touched; rows without
    /// missing cells are skipped entirely.
    pub async fn update(&self, table: &mut GameTable) -> UpdateSummary {
        let retry_not_found = self.options.retry_not_found;
        let selected: Vec<_> = table
            .rows()
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let requested = row.record.fields_to_enrich(retry_not_found);
                requested
                    .any()
                    .then(|| (index, row.record.title.clone(), requested))
            })
            .collect();

        let mut summary = UpdateSummary {
            rows_total: table.len(),
            rows_selected: selected.len(),
            ..Default::default()
        };
        let total = selected.len();

        tracing::info!(
            rows = summary.rows_total,
            selected = total,
            concurrency = self.options.concurrency,
            "Updating game details"
        );

        let enricher = &self.enricher;
        let mut outcomes = stream::iter(selected)
            .map(|(index, title, requested)| async move {
                let outcome = enricher.enrich_row(index, &title, requested).await;
                (index, outcome)
            })
            .buffered(self.options.concurrency.max(1));

        while let Some((index, outcome)) = outcomes.next().await {
            let written = table.apply(index, &outcome.result);
            summary.record(&outcome, written);
            self.sink.record(&EnrichmentEvent::Progress {
                processed: summary.rows_processed,
                total,
            });
        }

        summary
    }
}
