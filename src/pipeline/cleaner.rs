use crate::constants::{CATEGORIES_COLUMN, CATEGORY_SEPARATOR, ID_COLUMN};
use crate::error::{EtlError, Result};
use crate::table::{Column, ColumnKind, Table, Value};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

/// Ordered category names, one output column each.
///
/// Names are either declared up front or derived from a template encoding
/// such as `related-1;request-0;offer-0`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySchema {
    names: Vec<String>,
}

impl CategorySchema {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(EtlError::InvalidCategoryToken {
                    token: name.clone(),
                    reason: "category name is empty".to_string(),
                });
            }
            if !seen.insert(name.as_str()) {
                return Err(EtlError::DuplicateColumn(name.clone()));
            }
        }
        Ok(Self { names })
    }

    /// Derive names from a template encoding by stripping the trailing
    /// separator and digit from every token.
    pub fn from_template(encoding: &str) -> Result<Self> {
        let names = encoding
            .split(CATEGORY_SEPARATOR)
            .map(|token| {
                let mut chars = token.chars();
                if chars.next_back().is_none() || chars.next_back().is_none() {
                    return Err(EtlError::InvalidCategoryToken {
                        token: token.to_string(),
                        reason: "expected '<name>-<digit>'".to_string(),
                    });
                }
                Ok(chars.as_str().to_string())
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(names)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Expand the categories column using names taken from the first row, then
/// drop duplicate ids.
#[instrument(skip(joined), fields(rows = joined.num_rows()))]
pub fn clean(joined: Table) -> Result<Table> {
    let schema = derive_schema(&joined)?;
    clean_with_schema(joined, &schema)
}

/// Category names from the first row's encoding. An empty table yields an
/// empty schema.
pub fn derive_schema(joined: &Table) -> Result<CategorySchema> {
    let categories_idx = joined.require_column(CATEGORIES_COLUMN)?;
    match joined.rows().first() {
        Some(template) => CategorySchema::from_template(&template[categories_idx].to_string()),
        None => {
            debug!("Joined table is empty; no template row for category names");
            Ok(CategorySchema::default())
        }
    }
}

/// Expand the categories column into one integer column per schema name.
///
/// The token at position `i` of each row feeds column `i`. A row with fewer
/// tokens than the schema fails like a non-numeric value; extra tokens are
/// ignored.
pub fn clean_with_schema(joined: Table, schema: &CategorySchema) -> Result<Table> {
    let categories_idx = joined.require_column(CATEGORIES_COLUMN)?;
    joined.require_column(ID_COLUMN)?;

    let (name, columns, rows) = joined.into_parts();

    let mut out_columns: Vec<Column> = columns
        .into_iter()
        .enumerate()
        .filter(|(i, _)| *i != categories_idx)
        .map(|(_, c)| c)
        .collect();
    for category in schema.names() {
        if out_columns.iter().any(|c| &c.name == category) {
            return Err(EtlError::DuplicateColumn(category.clone()));
        }
        out_columns.push(Column::new(category.as_str(), ColumnKind::Integer));
    }

    let mut expanded = Table::new(name, out_columns)?;
    for (row_idx, mut row) in rows.into_iter().enumerate() {
        let encoding = row.remove(categories_idx).to_string();
        let mut tokens = encoding.split(CATEGORY_SEPARATOR);
        for category in schema.names() {
            let token = tokens.next().unwrap_or_default();
            row.push(Value::Integer(category_value(row_idx, category, token)?));
        }
        expanded.push_row(row);
    }

    info!(
        "Expanded {} category columns over {} rows",
        schema.len(),
        expanded.num_rows()
    );
    dedupe_by(expanded, ID_COLUMN)
}

/// Keep the first row for every distinct value of `key`.
///
/// All null keys count as one value, so only the first null-key row survives.
pub fn dedupe_by(table: Table, key: &str) -> Result<Table> {
    let key_idx = table.require_column(key)?;
    let before = table.num_rows();

    let (name, columns, rows) = table.into_parts();
    let mut deduped = Table::new(name, columns)?;
    let mut seen = HashSet::new();
    for row in rows {
        if seen.insert(row[key_idx].key()) {
            deduped.push_row(row);
        }
    }

    let dropped = before - deduped.num_rows();
    if dropped > 0 {
        info!("Dropped {} duplicate rows by '{}'", dropped, key);
    }
    Ok(deduped)
}

fn category_value(row: usize, column: &str, token: &str) -> Result<i64> {
    token
        .chars()
        .last()
        .and_then(|c| c.to_digit(10))
        .map(i64::from)
        .ok_or_else(|| EtlError::NonNumericCategory {
            row,
            column: column.to_string(),
            token: token.to_string(),
        })
}
