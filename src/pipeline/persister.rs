use crate::error::{EtlError, Result};
use crate::table::{Column, ColumnKind, Table, Value};
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use std::path::Path;
use tracing::{debug, info, instrument};

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Borrowed(ValueRef::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

/// Write `table` to the SQLite database at `destination` under `table_name`,
/// replacing any existing table of that name.
///
/// Drop, create and inserts run in one transaction, so a failed save leaves
/// the previous table untouched. No row index column is written.
#[instrument(skip_all, fields(table_name = %table_name, destination = %destination.as_ref().display(), rows = table.num_rows()))]
pub fn save<P: AsRef<Path>>(table: &Table, destination: P, table_name: &str) -> Result<()> {
    let mut conn = Connection::open(destination.as_ref())?;
    let tx = conn.transaction()?;

    tx.execute_batch(&format!("DROP TABLE IF EXISTS {}", quote_ident(table_name)))?;
    tx.execute_batch(&create_table_sql(table_name, table.columns()))?;
    debug!("Recreated table '{}' with {} columns", table_name, table.num_columns());

    {
        let mut stmt = tx.prepare(&insert_sql(table_name, table.columns()))?;
        for row in table.rows() {
            stmt.execute(params_from_iter(row.iter()))?;
        }
    }

    tx.commit()?;
    info!("Saved {} rows to table '{}'", table.num_rows(), table_name);
    Ok(())
}

/// Read a persisted table back with its declared column order and kinds
pub fn load<P: AsRef<Path>>(source: P, table_name: &str) -> Result<Table> {
    let conn = Connection::open(source.as_ref())?;

    let mut columns = Vec::new();
    {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", quote_ident(table_name)))?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let name: String = row.get(1)?;
            let decl: String = row.get(2)?;
            columns.push(Column::new(name, ColumnKind::from_sql_type(&decl)));
        }
    }
    if columns.is_empty() {
        return Err(EtlError::MissingTable(table_name.to_string()));
    }

    let mut table = Table::new(table_name, columns)?;
    let width = table.num_columns();
    let mut stmt = conn.prepare(&format!("SELECT * FROM {}", quote_ident(table_name)))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let values = (0..width)
            .map(|i| row.get_ref(i).map(Value::from))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        table.push_row(values);
    }
    Ok(table)
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn create_table_sql(table_name: &str, columns: &[Column]) -> String {
    let defs: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(&c.name), c.kind.sql_type()))
        .collect();
    format!("CREATE TABLE {} ({})", quote_ident(table_name), defs.join(", "))
}

fn insert_sql(table_name: &str, columns: &[Column]) -> String {
    let names: Vec<String> = columns.iter().map(|c| quote_ident(&c.name)).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(table_name),
        names.join(", "),
        placeholders.join(", ")
    )
}
