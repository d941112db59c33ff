//! Games table load/save
//!
//! SQLite is dynamically typed, so the title's storage class is read
//! alongside its value: a title stored as anything but TEXT loads as
//! [`TitleCell::Invalid`].
//!
//! Target cells: NULL or blank text → missing, `-1` → not found,
//! any other number → present.

use crate::models::{FieldValue, GameRecord, GameTable, TargetField, TitleCell, NOT_FOUND_SENTINEL};
use gamefill_common::config::TableConfig;
use gamefill_common::{Error, Result};
use sqlx::{Row, SqlitePool};

/// Table and column names of the games table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableLayout {
    pub table: String,
    pub title: String,
    pub duration: String,
    pub year: String,
    pub score: String,
}

impl TableLayout {
    pub fn column(&self, field: TargetField) -> &str {
        match field {
            TargetField::TimeToBeat => &self.duration,
            TargetField::Year => &self.year,
            TargetField::Score => &self.score,
        }
    }
}

impl Default for TableLayout {
    fn default() -> Self {
        Self::from(&TableConfig::default())
    }
}

impl From<&TableConfig> for TableLayout {
    fn from(config: &TableConfig) -> Self {
        Self {
            table: config.name.clone(),
            title: config.title_column.clone(),
            duration: config.duration_column.clone(),
            year: config.year_column.clone(),
            score: config.score_column.clone(),
        }
    }
}

/// Quote an SQL identifier (column names may contain spaces)
fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Cell as printable text; blobs are not decoded
fn text_expr(column: &str) -> String {
    let column = quote_ident(column);
    format!("CASE typeof({column}) WHEN 'blob' THEN '<blob>' ELSE CAST({column} AS TEXT) END")
}

/// Load the whole table in rowid order
pub async fn load_table(pool: &SqlitePool, layout: &TableLayout) -> Result<GameTable> {
    let mut selects = vec!["rowid AS row_key".to_string()];
    for (alias, column) in [
        ("title", &layout.title),
        ("duration", &layout.duration),
        ("year", &layout.year),
        ("score", &layout.score),
    ] {
        selects.push(format!("typeof({}) AS {}_type", quote_ident(column), alias));
        selects.push(format!("{} AS {}_text", text_expr(column), alias));
    }
    let sql = format!(
        "SELECT {} FROM {} ORDER BY rowid",
        selects.join(", "),
        quote_ident(&layout.table)
    );

    let rows = sqlx::query(&sql).fetch_all(pool).await?;

    let mut table = GameTable::new();
    for row in rows {
        let key: i64 = row.try_get("row_key")?;
        let record = GameRecord {
            title: title_cell(row.try_get("title_type")?, row.try_get("title_text")?),
            time_to_beat: numeric_cell(
                key,
                &layout.duration,
                row.try_get("duration_type")?,
                row.try_get("duration_text")?,
            )?,
            year: numeric_cell(key, &layout.year, row.try_get("year_type")?, row.try_get("year_text")?)?,
            score: numeric_cell(
                key,
                &layout.score,
                row.try_get("score_type")?,
                row.try_get("score_text")?,
            )?,
        };
        table.push(key, record);
    }

    tracing::info!(table = %layout.table, rows = table.len(), "Loaded games table");
    Ok(table)
}

fn title_cell(kind: String, text: Option<String>) -> TitleCell {
    match text {
        Some(title) if kind == "text" => TitleCell::Text(title),
        text => TitleCell::Invalid {
            repr: text.unwrap_or_else(|| "NULL".to_string()),
            kind,
        },
    }
}

fn numeric_cell(key: i64, column: &str, kind: String, text: Option<String>) -> Result<FieldValue<f64>> {
    let text = match (kind.as_str(), text) {
        ("null", _) | (_, None) => return Ok(FieldValue::Missing),
        ("text", Some(text)) if text.trim().is_empty() => return Ok(FieldValue::Missing),
        ("integer" | "real" | "text", Some(text)) => text,
        (other, _) => {
            return Err(Error::InvalidInput(format!(
                "row {}: column '{}' holds a {} value",
                key, column, other
            )))
        }
    };

    // "NaN" and "inf" parse as f64 but are not values a cell can hold
    let value = text
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "row {}: column '{}' holds non-numeric value {:?}",
                key, column, text
            ))
        })?;

    if value == NOT_FOUND_SENTINEL as f64 {
        Ok(FieldValue::NotFound)
    } else {
        Ok(FieldValue::Present(value))
    }
}

/// Persist the cells filled during this run, in one transaction
///
/// Returns the number of cells written. Rows and cells the run did not fill
/// are never written.
pub async fn save_table(pool: &SqlitePool, layout: &TableLayout, table: &GameTable) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut written = 0;

    for row in table.rows() {
        for field in row.filled.fields() {
            let sql = format!(
                "UPDATE {} SET {} = ? WHERE rowid = ?",
                quote_ident(&layout.table),
                quote_ident(layout.column(field))
            );
            let query = sqlx::query(&sql);
            let query = match (field, row.record.field(field)) {
                (_, FieldValue::Missing) => continue,
                (_, FieldValue::NotFound) => query.bind(NOT_FOUND_SENTINEL),
                (TargetField::TimeToBeat, FieldValue::Present(hours)) => query.bind(hours),
                (_, FieldValue::Present(value)) if value.fract() == 0.0 => query.bind(value as i64),
                (_, FieldValue::Present(value)) => query.bind(value),
            };
            query.bind(row.key).execute(&mut *tx).await?;
            written += 1;
        }
    }

    tx.commit().await?;

    tracing::info!(table = %layout.table, cells = written, "Saved games table");
    Ok(written)
}
