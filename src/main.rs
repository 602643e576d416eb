use anyhow::Context;
use clap::error::ErrorKind;
use clap::Parser;
use disaster_etl::constants::USAGE;
use disaster_etl::{logging, metrics, pipeline, Config};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "process_data")]
#[command(about = "Merge disaster messages with their categories and save a cleaned table to SQLite")]
#[command(version = "0.1.0")]
struct Cli {
    /// CSV file of messages
    messages_filepath: PathBuf,
    /// CSV file of categories
    categories_filepath: PathBuf,
    /// SQLite database to write the cleaned table to
    database_filepath: PathBuf,
    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(_) => {
            println!("{USAGE}");
            return Ok(());
        }
    };

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _guard = logging::init_logging(&config.log_dir).context("Failed to initialize logging")?;
    metrics::describe();

    match pipeline::run(
        &cli.messages_filepath,
        &cli.categories_filepath,
        &cli.database_filepath,
        &config,
    ) {
        Ok(summary) => {
            info!(
                rows = summary.saved_rows,
                categories = summary.category_columns.len(),
                table = %summary.table_name,
                "Pipeline finished"
            );
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(e).with_context(|| {
                format!(
                    "Failed to process {} and {} into {}",
                    cli.messages_filepath.display(),
                    cli.categories_filepath.display(),
                    cli.database_filepath.display()
                )
            })
        }
    }
}
