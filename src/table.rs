use crate::error::{EtlError, Result};
use std::fmt;

/// A single cell of a [`Table`]
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical textual key used for joins and dedupe. `Null` has no key.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// Storage affinity of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Real,
    Text,
}

impl ColumnKind {
    pub fn sql_type(&self) -> &'static str {
        match self {
            ColumnKind::Integer => "INTEGER",
            ColumnKind::Real => "REAL",
            ColumnKind::Text => "TEXT",
        }
    }

    pub fn from_sql_type(decl: &str) -> Self {
        let upper = decl.to_ascii_uppercase();
        if upper.contains("INT") {
            ColumnKind::Integer
        } else if upper.contains("REAL") || upper.contains("FLOA") || upper.contains("DOUB") {
            ColumnKind::Real
        } else {
            ColumnKind::Text
        }
    }

    /// Infer the narrowest kind that holds every raw field. Empty fields are ignored.
    pub fn infer<'a>(fields: impl IntoIterator<Item = &'a str> + Clone) -> Self {
        let non_empty = || fields.clone().into_iter().filter(|f| !f.is_empty());
        if non_empty().all(|f| f.parse::<i64>().is_ok()) {
            ColumnKind::Integer
        } else if non_empty().all(|f| f.parse::<f64>().is_ok() && f.bytes().any(|b| b.is_ascii_digit())) {
            ColumnKind::Real
        } else {
            ColumnKind::Text
        }
    }

    /// Coerce a raw field into a value of this kind. Callers infer the kind first,
    /// so a failed parse falls back to text.
    pub fn coerce(&self, field: &str) -> Value {
        if field.is_empty() {
            return Value::Null;
        }
        match self {
            ColumnKind::Integer => field
                .parse()
                .map(Value::Integer)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            ColumnKind::Real => field
                .parse()
                .map(Value::Real)
                .unwrap_or_else(|_| Value::Text(field.to_string())),
            ColumnKind::Text => Value::Text(field.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// Row-major table with named, typed columns
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<Column>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(EtlError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows: Vec::new(),
        })
    }

    /// Build a table from raw string fields, inferring each column's kind.
    pub fn from_raw(
        name: impl Into<String>,
        headers: Vec<String>,
        records: Vec<Vec<String>>,
    ) -> Result<Self> {
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(i, header)| {
                let kind = ColumnKind::infer(records.iter().map(|r| field_at(r, i)));
                Column::new(header, kind)
            })
            .collect();
        let mut table = Table::new(name, columns)?;
        for record in &records {
            let row = table
                .columns
                .iter()
                .enumerate()
                .map(|(i, column)| column.kind.coerce(field_at(record, i)))
                .collect();
            table.rows.push(row);
        }
        Ok(table)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn into_parts(self) -> (String, Vec<Column>, Vec<Vec<Value>>) {
        (self.name, self.columns, self.rows)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize> {
        self.column_index(name)
            .ok_or_else(|| EtlError::missing_column(&self.name, name))
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<&Value>> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| &row[idx]).collect())
    }

    /// Append a row. Short rows are padded with `Null`, long rows truncated.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }
}

fn field_at(record: &[String], i: usize) -> &str {
    record.get(i).map(String::as_str).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(rows: &[&[&str]]) -> Vec<Vec<String>> {
        rows.iter()
            .map(|r| r.iter().map(|s| s.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_kind_inference() {
        assert_eq!(ColumnKind::infer(["1", "", "-4"]), ColumnKind::Integer);
        assert_eq!(ColumnKind::infer(["1", "2.5"]), ColumnKind::Real);
        assert_eq!(ColumnKind::infer(["1", "news"]), ColumnKind::Text);
    }

    #[test]
    fn test_from_raw_coerces_columns() {
        let table = Table::from_raw(
            "messages",
            vec!["id".into(), "message".into(), "original".into()],
            raw(&[&["2", "hello", ""], &["7", "help", "aidez"]]),
        )
        .unwrap();

        assert_eq!(table.columns()[0].kind, ColumnKind::Integer);
        assert_eq!(table.columns()[1].kind, ColumnKind::Text);
        assert_eq!(table.rows()[0][0], Value::Integer(2));
        assert_eq!(table.rows()[0][2], Value::Null);
        assert_eq!(table.rows()[1][2], Value::Text("aidez".into()));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        let err = Table::new(
            "t",
            vec![
                Column::new("a", ColumnKind::Text),
                Column::new("a", ColumnKind::Integer),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, EtlError::DuplicateColumn(name) if name == "a"));
    }

    #[test]
    fn test_missing_column_names_table() {
        let table = Table::new("categories", vec![Column::new("x", ColumnKind::Text)]).unwrap();
        let err = table.require_column("id").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Missing required column 'id' in categories"
        );
    }

    #[test]
    fn test_keys_match_across_kinds() {
        assert_eq!(Value::Integer(12).key(), Value::Text("12".into()).key());
        assert_eq!(Value::Null.key(), None);
    }
}
