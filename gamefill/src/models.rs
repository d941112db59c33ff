//! Game table data model
//!
//! A [`GameTable`] is the in-memory image of one dataset for the duration of a
//! single update run. Rows keep their storage key so the store can write back
//! exactly the cells a run filled.

use serde::Serialize;
use std::fmt;

/// On-disk encoding of [`FieldValue::NotFound`]
pub const NOT_FOUND_SENTINEL: i64 = -1;

/// One target cell
///
/// `NotFound` is the failure marker written when no real value could be
/// resolved. It is a distinct state in memory and only collapses to
/// [`NOT_FOUND_SENTINEL`] when persisted.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FieldValue<T> {
    /// Blank cell
    #[default]
    Missing,
    /// Real value, either from the source data or resolved by a lookup
    Present(T),
    /// A previous lookup could not resolve this cell
    NotFound,
}

impl<T> FieldValue<T> {
    /// Resolved value if found, failure marker otherwise
    pub fn from_lookup(value: Option<T>) -> Self {
        match value {
            Some(v) => FieldValue::Present(v),
            None => FieldValue::NotFound,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, FieldValue::Missing)
    }

    pub fn is_present(&self) -> bool {
        matches!(self, FieldValue::Present(_))
    }

    /// Row-selection predicate for one cell
    ///
    /// A `NotFound` cell only counts as missing when the run retries failures.
    pub fn needs_enrichment(&self, retry_not_found: bool) -> bool {
        match self {
            FieldValue::Missing => true,
            FieldValue::NotFound => retry_not_found,
            FieldValue::Present(_) => false,
        }
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            FieldValue::Present(v) => Some(v),
            _ => None,
        }
    }
}

/// Title cell as loaded from the dataset
#[derive(Debug, Clone, PartialEq)]
pub enum TitleCell {
    Text(String),
    /// Anything that is not a string (number, blob, empty cell)
    Invalid {
        /// Storage class of the cell, e.g. "integer" or "null"
        kind: String,
        /// Printable rendition for logs
        repr: String,
    },
}

impl TitleCell {
    /// Searchable title; `None` for non-string cells
    pub fn as_text(&self) -> Option<&str> {
        match self {
            TitleCell::Text(title) => Some(title),
            TitleCell::Invalid { .. } => None,
        }
    }

    /// Rendition used in events and logs
    pub fn display(&self) -> &str {
        match self {
            TitleCell::Text(title) => title,
            TitleCell::Invalid { repr, .. } => repr,
        }
    }
}

impl From<&str> for TitleCell {
    fn from(title: &str) -> Self {
        TitleCell::Text(title.to_string())
    }
}

impl From<String> for TitleCell {
    fn from(title: String) -> Self {
        TitleCell::Text(title)
    }
}

/// The three attributes a run derives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    TimeToBeat,
    Year,
    Score,
}

impl TargetField {
    pub const ALL: [TargetField; 3] = [TargetField::TimeToBeat, TargetField::Year, TargetField::Score];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::TimeToBeat => "time_to_beat",
            TargetField::Year => "year",
            TargetField::Score => "score",
        }
    }
}

impl fmt::Display for TargetField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which target fields of a row are involved (requested, or written)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldSet {
    pub time_to_beat: bool,
    pub year: bool,
    pub score: bool,
}

impl FieldSet {
    pub const ALL: FieldSet = FieldSet {
        time_to_beat: true,
        year: true,
        score: true,
    };

    pub fn any(&self) -> bool {
        self.time_to_beat || self.year || self.score
    }

    pub fn contains(&self, field: TargetField) -> bool {
        match field {
            TargetField::TimeToBeat => self.time_to_beat,
            TargetField::Year => self.year,
            TargetField::Score => self.score,
        }
    }

    pub fn insert(&mut self, field: TargetField) {
        match field {
            TargetField::TimeToBeat => self.time_to_beat = true,
            TargetField::Year => self.year = true,
            TargetField::Score => self.score = true,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = TargetField> + '_ {
        TargetField::ALL.into_iter().filter(|f| self.contains(*f))
    }

    pub fn len(&self) -> usize {
        self.fields().count()
    }

    pub fn is_empty(&self) -> bool {
        !self.any()
    }
}

/// One table row
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub title: TitleCell,
    /// Main story completion time in hours
    pub time_to_beat: FieldValue<f64>,
    pub year: FieldValue<f64>,
    pub score: FieldValue<f64>,
}

impl GameRecord {
    /// Row with a text title and all target cells blank
    pub fn new(title: impl Into<TitleCell>) -> Self {
        Self {
            title: title.into(),
            time_to_beat: FieldValue::Missing,
            year: FieldValue::Missing,
            score: FieldValue::Missing,
        }
    }

    pub fn field(&self, field: TargetField) -> FieldValue<f64> {
        match field {
            TargetField::TimeToBeat => self.time_to_beat,
            TargetField::Year => self.year,
            TargetField::Score => self.score,
        }
    }

    fn field_mut(&mut self, field: TargetField) -> &mut FieldValue<f64> {
        match field {
            TargetField::TimeToBeat => &mut self.time_to_beat,
            TargetField::Year => &mut self.year,
            TargetField::Score => &mut self.score,
        }
    }

    /// Target fields the row-selection predicate considers missing
    pub fn fields_to_enrich(&self, retry_not_found: bool) -> FieldSet {
        let mut set = FieldSet::default();
        for field in TargetField::ALL {
            if self.field(field).needs_enrichment(retry_not_found) {
                set.insert(field);
            }
        }
        set
    }
}

/// One lookup result
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Title as known to the lookup service
    pub name: String,
    /// Match quality against the searched title, higher is better
    pub similarity: f64,
    pub main_story_hours: Option<f64>,
    pub release_year: Option<i64>,
    pub review_score: Option<i64>,
}

/// Values resolved for one row
///
/// `None` means the field was not requested and must not be written.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EnrichmentResult {
    pub time_to_beat: Option<FieldValue<f64>>,
    pub year: Option<FieldValue<f64>>,
    pub score: Option<FieldValue<f64>>,
}

impl EnrichmentResult {
    /// Failure marker for every requested field
    pub fn not_found(requested: FieldSet) -> Self {
        let mut result = Self::default();
        for field in requested.fields() {
            result.set(field, FieldValue::NotFound);
        }
        result
    }

    pub fn get(&self, field: TargetField) -> Option<FieldValue<f64>> {
        match field {
            TargetField::TimeToBeat => self.time_to_beat,
            TargetField::Year => self.year,
            TargetField::Score => self.score,
        }
    }

    pub fn set(&mut self, field: TargetField, value: FieldValue<f64>) {
        match field {
            TargetField::TimeToBeat => self.time_to_beat = Some(value),
            TargetField::Year => self.year = Some(value),
            TargetField::Score => self.score = Some(value),
        }
    }
}

/// Table row plus its storage identity
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    /// Storage key (SQLite rowid)
    pub key: i64,
    pub record: GameRecord,
    /// Cells written during the current run
    pub filled: FieldSet,
}

/// In-memory table, in storage order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameTable {
    rows: Vec<TableRow>,
}

impl GameTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table from bare records, keyed 1..=n
    pub fn from_records(records: impl IntoIterator<Item = GameRecord>) -> Self {
        let mut table = Self::new();
        for (index, record) in records.into_iter().enumerate() {
            table.push(index as i64 + 1, record);
        }
        table
    }

    pub fn push(&mut self, key: i64, record: GameRecord) {
        self.rows.push(TableRow {
            key,
            record,
            filled: FieldSet::default(),
        });
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn get(&self, index: usize) -> Option<&TableRow> {
        self.rows.get(index)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn records(&self) -> impl Iterator<Item = &GameRecord> {
        self.rows.iter().map(|row| &row.record)
    }

    /// Merge one row's enrichment into the table
    ///
    /// Cells holding a real value are never overwritten, whatever the result
    /// carries. Returns the fields actually written.
    pub fn apply(&mut self, index: usize, result: &EnrichmentResult) -> FieldSet {
        let mut written = FieldSet::default();
        let Some(row) = self.rows.get_mut(index) else {
            return written;
        };

        for field in TargetField::ALL {
            let Some(value) = result.get(field) else {
                continue;
            };
            let cell = row.record.field_mut(field);
            if cell.is_present() {
                continue;
            }
            *cell = value;
            written.insert(field);
        }

        row.filled.time_to_beat |= written.time_to_beat;
        row.filled.year |= written.year;
        row.filled.score |= written.score;
        written
    }
}
