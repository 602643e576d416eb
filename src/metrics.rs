//! Pipeline metrics
//!
//! Recorded through the `metrics` facade. Nothing is exported unless the
//! embedding process installs a recorder.

use ::metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram, Unit};
use std::time::Instant;

pub const ROWS_LOADED_TOTAL: &str = "disaster_etl_rows_loaded_total";
pub const ROWS_JOINED_TOTAL: &str = "disaster_etl_rows_joined_total";
pub const DUPLICATES_DROPPED_TOTAL: &str = "disaster_etl_duplicates_dropped_total";
pub const ROWS_SAVED_TOTAL: &str = "disaster_etl_rows_saved_total";
pub const CATEGORY_COLUMNS: &str = "disaster_etl_category_columns";
pub const STAGE_DURATION_SECONDS: &str = "disaster_etl_stage_duration_seconds";

/// Register metric descriptions with the installed recorder
pub fn describe() {
    describe_counter!(ROWS_LOADED_TOTAL, "Rows read from both input files");
    describe_counter!(ROWS_JOINED_TOTAL, "Rows produced by the id join");
    describe_counter!(DUPLICATES_DROPPED_TOTAL, "Rows dropped as duplicate ids");
    describe_counter!(ROWS_SAVED_TOTAL, "Rows written to the output table");
    describe_gauge!(CATEGORY_COLUMNS, "Category columns in the last cleaned table");
    describe_histogram!(STAGE_DURATION_SECONDS, Unit::Seconds, "Duration of each pipeline stage");
}

/// Records the elapsed time of a stage when dropped
pub struct StageTimer {
    start: Instant,
    stage: &'static str,
}

impl StageTimer {
    pub fn start(stage: &'static str) -> Self {
        Self {
            start: Instant::now(),
            stage,
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        histogram!(STAGE_DURATION_SECONDS, "stage" => self.stage).record(duration);
    }
}

pub fn record_loaded(rows: usize) {
    counter!(ROWS_LOADED_TOTAL).increment(rows as u64);
}

pub fn record_joined(rows: usize) {
    counter!(ROWS_JOINED_TOTAL).increment(rows as u64);
}

pub fn record_cleaned(duplicates_dropped: usize, category_columns: usize) {
    counter!(DUPLICATES_DROPPED_TOTAL).increment(duplicates_dropped as u64);
    gauge!(CATEGORY_COLUMNS).set(category_columns as f64);
}

pub fn record_saved(rows: usize) {
    counter!(ROWS_SAVED_TOTAL).increment(rows as u64);
}
