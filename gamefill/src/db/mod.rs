//! Dataset access
//!
//! The dataset is a SQLite file holding one games table. Only the title and
//! the three target columns are read; only filled target cells are written.

pub mod games;

pub use games::{load_table, save_table, TableLayout};

use gamefill_common::{Error, Result};
use sqlx::SqlitePool;
use std::path::Path;

/// Open an existing dataset
///
/// The file must already exist: a missing dataset is a fatal load failure,
/// not something to create empty.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!("Dataset {}", db_path.display())));
    }

    let db_url = format!("sqlite://{}?mode=rw", db_path.display());
    tracing::debug!("Connecting to dataset: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;
    Ok(pool)
}
