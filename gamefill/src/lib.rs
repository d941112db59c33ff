//! gamefill library interface
//!
//! Fills the missing completion time, release year and review score cells of
//! a games table from an external lookup service.
//!
//! Flow: [`updater::TableUpdater`] selects rows with missing cells →
//! [`enricher::RowEnricher`] runs one lookup cycle per row →
//! [`matcher::select_best`] resolves ambiguous results →
//! [`normalizer::normalize_duration`] finalizes completion times →
//! the updater merges the values back into the table.

pub mod db;
pub mod enricher;
pub mod events;
pub mod lookup;
pub mod matcher;
pub mod models;
pub mod normalizer;
pub mod updater;

pub use crate::enricher::{RowEnricher, RowOutcome, RowStatus};
pub use crate::events::{EnrichmentEvent, EnrichmentSink, FieldStatus, NullSink, TracingSink};
pub use crate::lookup::{GameLookup, HltbClient, LookupError};
pub use crate::models::{
    Candidate, EnrichmentResult, FieldSet, FieldValue, GameRecord, GameTable, TargetField,
    TitleCell, NOT_FOUND_SENTINEL,
};
pub use crate::updater::{TableUpdater, UpdateOptions, UpdateSummary};
