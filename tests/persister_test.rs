use anyhow::Result;
use disaster_etl::pipeline::persister;
use disaster_etl::{Column, ColumnKind, EtlError, Table, Value};
use rusqlite::Connection;
use tempfile::tempdir;

fn cleaned_table() -> Result<Table> {
    let mut table = Table::new(
        "cleaned",
        vec![
            Column::new("id", ColumnKind::Integer),
            Column::new("message", ColumnKind::Text),
            Column::new("original", ColumnKind::Text),
            Column::new("related", ColumnKind::Integer),
            Column::new("request", ColumnKind::Integer),
        ],
    )?;
    table.push_row(vec![
        Value::Integer(2),
        Value::Text("Weather update".into()),
        Value::Null,
        Value::Integer(1),
        Value::Integer(0),
    ]);
    table.push_row(vec![
        Value::Integer(7),
        Value::Text("Is the \"Hurricane\" over?".into()),
        Value::Text("Cyclone nan fini".into()),
        Value::Integer(1),
        Value::Null,
    ]);
    Ok(table)
}

#[test]
fn test_round_trip_preserves_columns_and_values() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("round_trip.db");
    let table = cleaned_table()?;

    persister::save(&table, &db, "df")?;
    let loaded = persister::load(&db, "df")?;

    assert_eq!(loaded.columns(), table.columns());
    assert_eq!(loaded.rows(), table.rows());
    Ok(())
}

#[test]
fn test_no_index_column_written() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("no_index.db");
    persister::save(&cleaned_table()?, &db, "df")?;

    let conn = Connection::open(&db)?;
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('df')")?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<rusqlite::Result<Vec<_>>>()?;

    assert_eq!(names, vec!["id", "message", "original", "related", "request"]);
    Ok(())
}

#[test]
fn test_save_replaces_existing_table_only() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("replace.db");
    {
        let conn = Connection::open(&db)?;
        conn.execute_batch(
            "CREATE TABLE df (stale TEXT); INSERT INTO df VALUES ('old');
             CREATE TABLE other (keep INTEGER); INSERT INTO other VALUES (1);",
        )?;
    }

    persister::save(&cleaned_table()?, &db, "df")?;

    let loaded = persister::load(&db, "df")?;
    assert_eq!(loaded.num_rows(), 2);
    assert!(loaded.column_index("stale").is_none());
    let other = persister::load(&db, "other")?;
    assert_eq!(other.rows(), &[vec![Value::Integer(1)]]);
    Ok(())
}

#[test]
fn test_unwritable_destination_fails() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("no_such_dir").join("out.db");

    let err = persister::save(&cleaned_table()?, &db, "df").unwrap_err();
    assert!(matches!(err, EtlError::Database(_)));
    Ok(())
}

#[test]
fn test_load_missing_table() -> Result<()> {
    let dir = tempdir()?;
    let db = dir.path().join("empty.db");
    persister::save(&cleaned_table()?, &db, "df")?;

    let err = persister::load(&db, "absent").unwrap_err();
    assert!(matches!(err, EtlError::MissingTable(ref name) if name == "absent"));
    Ok(())
}
