pub mod cleaner;
pub mod loader;
pub mod persister;

use crate::config::Config;
use crate::error::Result;
use crate::metrics::{self, StageTimer};
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

/// Result of a complete pipeline run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub joined_rows: usize,
    pub saved_rows: usize,
    pub duplicates_dropped: usize,
    pub category_columns: Vec<String>,
    pub table_name: String,
    pub database: PathBuf,
}

/// Load, clean and save. Nothing is written unless loading and cleaning
/// both succeed.
#[instrument(skip(config), fields(table = %config.table_name))]
pub fn run(
    messages_path: &Path,
    categories_path: &Path,
    database_path: &Path,
    config: &Config,
) -> Result<RunSummary> {
    println!(
        "Loading data...\n    MESSAGES: {}\n    CATEGORIES: {}",
        messages_path.display(),
        categories_path.display()
    );
    let joined = {
        let _timer = StageTimer::start("load");
        loader::load(messages_path, categories_path, &config.csv_options())?
    };
    metrics::record_joined(joined.num_rows());
    let joined_rows = joined.num_rows();

    println!("Cleaning data...");
    let schema = match config.category_schema()? {
        Some(schema) => schema,
        None => cleaner::derive_schema(&joined)?,
    };
    let cleaned = {
        let _timer = StageTimer::start("clean");
        cleaner::clean_with_schema(joined, &schema)?
    };
    let duplicates_dropped = joined_rows - cleaned.num_rows();
    metrics::record_cleaned(duplicates_dropped, schema.len());

    println!("Saving data...\n    DATABASE: {}", database_path.display());
    {
        let _timer = StageTimer::start("save");
        persister::save(&cleaned, database_path, &config.table_name)?;
    }
    metrics::record_saved(cleaned.num_rows());

    println!("Cleaned data saved to database!");
    info!(
        "Run complete: {} joined rows, {} saved, {} duplicates dropped",
        joined_rows,
        cleaned.num_rows(),
        duplicates_dropped
    );

    Ok(RunSummary {
        joined_rows,
        saved_rows: cleaned.num_rows(),
        duplicates_dropped,
        category_columns: schema.names().to_vec(),
        table_name: config.table_name.clone(),
        database: database_path.to_path_buf(),
    })
}
