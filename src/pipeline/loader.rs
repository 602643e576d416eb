use crate::constants::{ID_COLUMN, LEFT_SUFFIX, RIGHT_SUFFIX};
use crate::error::Result;
use crate::metrics;
use crate::table::{Column, Table, Value};
use csv::ReaderBuilder;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Options for reading delimited input files
#[derive(Debug, Clone, Copy)]
pub struct CsvOptions {
    pub delimiter: u8,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

/// Read both input files and inner-join them on `id`
#[instrument(skip_all, fields(messages = %messages_path.display(), categories = %categories_path.display()))]
pub fn load(messages_path: &Path, categories_path: &Path, options: &CsvOptions) -> Result<Table> {
    let messages = read_table(messages_path, options)?;
    let categories = read_table(categories_path, options)?;
    metrics::record_loaded(messages.num_rows() + categories.num_rows());
    info!(
        "Read {} message rows and {} category rows",
        messages.num_rows(),
        categories.num_rows()
    );
    merge(messages, categories, ID_COLUMN)
}

/// Read one delimited file with a header row into a typed table
pub fn read_table(path: &Path, options: &CsvOptions) -> Result<Table> {
    let file = File::open(path)?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    read_table_from(name, file, options)
}

pub fn read_table_from<R: Read>(name: impl Into<String>, reader: R, options: &CsvOptions) -> Result<Table> {
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut records = Vec::new();
    for result in reader.records() {
        let record = result?;
        records.push(record.iter().map(str::to_string).collect());
    }

    let table = Table::from_raw(name, headers, records)?;
    debug!(
        "Parsed {} rows x {} columns from {}",
        table.num_rows(),
        table.num_columns(),
        table.name()
    );
    Ok(table)
}

/// Inner join on `key`. Rows keep the left table's order; each left row is
/// followed by its right matches in right order, so duplicate keys multiply.
/// Non-key columns present on both sides get `_x`/`_y` suffixes.
pub fn merge(left: Table, right: Table, key: &str) -> Result<Table> {
    let left_key = left.require_column(key)?;
    let right_key = right.require_column(key)?;

    let left_names: HashSet<&str> = left.column_names().into_iter().collect();
    let right_names: HashSet<&str> = right
        .column_names()
        .into_iter()
        .filter(|name| *name != key)
        .collect();

    let rename = |name: &str, suffix: &str| {
        if name != key && left_names.contains(name) && right_names.contains(name) {
            format!("{name}{suffix}")
        } else {
            name.to_string()
        }
    };

    let mut columns: Vec<Column> = left
        .columns()
        .iter()
        .map(|c| Column::new(rename(&c.name, LEFT_SUFFIX), c.kind))
        .collect();
    let right_columns: Vec<usize> = (0..right.num_columns()).filter(|&i| i != right_key).collect();
    columns.extend(
        right_columns
            .iter()
            .map(|&i| &right.columns()[i])
            .map(|c| Column::new(rename(&c.name, RIGHT_SUFFIX), c.kind)),
    );

    let name = format!("{}_{}", left.name(), right.name());
    let mut joined = Table::new(name, columns)?;

    let mut right_index: HashMap<String, Vec<usize>> = HashMap::new();
    for (i, row) in right.rows().iter().enumerate() {
        if let Some(k) = row[right_key].key() {
            right_index.entry(k).or_default().push(i);
        }
    }

    for left_row in left.rows() {
        let Some(k) = left_row[left_key].key() else {
            continue;
        };
        let Some(matches) = right_index.get(&k) else {
            continue;
        };
        for &r in matches {
            let right_row = &right.rows()[r];
            let mut row: Vec<Value> = left_row.clone();
            row.extend(right_columns.iter().map(|&i| right_row[i].clone()));
            joined.push_row(row);
        }
    }

    if joined.is_empty() {
        info!("Inputs share no '{}' values; joined table is empty", key);
    }
    Ok(joined)
}
