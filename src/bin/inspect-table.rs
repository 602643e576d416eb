use anyhow::Context;
use clap::Parser;
use disaster_etl::constants::DEFAULT_TABLE_NAME;
use disaster_etl::pipeline::persister;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "inspect-table")]
#[command(about = "Print the columns and first rows of a table written by process_data")]
struct Args {
    /// SQLite database written by process_data
    database: PathBuf,
    /// Table to read
    #[arg(long, default_value = DEFAULT_TABLE_NAME)]
    table: String,
    /// Number of rows to print
    #[arg(long, default_value_t = 5)]
    limit: usize,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();

    let table = persister::load(&args.database, &args.table).with_context(|| {
        format!(
            "Failed to read table '{}' from {}",
            args.table,
            args.database.display()
        )
    })?;

    println!("📋 Table '{}' in {}", args.table, args.database.display());
    println!("   Rows: {}", table.num_rows());
    println!("   Columns ({}):", table.num_columns());
    for column in table.columns() {
        println!("     - {} {}", column.name, column.kind.sql_type());
    }

    if table.is_empty() || args.limit == 0 {
        return Ok(());
    }
    println!("\n{}", table.column_names().join("\t"));
    for row in table.rows().iter().take(args.limit) {
        let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
        println!("{}", cells.join("\t"));
    }
    Ok(())
}
