//! oxide-db-parse CLI
//!
//! Parses batches of SQL statements against a schema fixture.

use std::io::Read;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use oxide_db_core::schema::Catalog;
use oxide_db_parse::{driver_by_id, run_batch, HarnessError, SchemaFile};

/// Batch SQL parser harness.
#[derive(Parser)]
#[command(name = "oxide-db-parse")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON schema fixture describing the tables.
    #[arg(short, long, env = "OXIDE_DB_SCHEMA")]
    schema: Option<PathBuf>,

    /// Driver used to render SQL: `generic` or `sqlite`.
    #[arg(short, long, default_value = "generic")]
    driver: String,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse every statement of a batch.
    Parse {
        /// Batch file; standard input if not given.
        file: Option<PathBuf>,
    },

    /// List the driver's reserved words.
    Keywords,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let driver = driver_by_id(&cli.driver)?;

    match cli.command {
        Commands::Keywords => {
            for keyword in driver.keywords() {
                println!("{keyword}");
            }
        }

        Commands::Parse { file } => {
            let catalog = match &cli.schema {
                Some(path) => SchemaFile::load(path)?.to_catalog()?,
                None => Catalog::new(),
            };
            let input = match &file {
                Some(path) => std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
                    path: path.clone(),
                    source,
                })?,
                None => {
                    let mut input = String::new();
                    std::io::stdin().read_to_string(&mut input)?;
                    input
                }
            };

            let outcomes = run_batch(&catalog, driver.as_ref(), &input);
            for outcome in &outcomes {
                println!("{}", outcome.report());
            }
            let failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count();
            info!(
                statements = outcomes.len(),
                failed, "Batch finished"
            );
            if failed > 0 {
                anyhow::bail!("{failed} of {} statements failed", outcomes.len());
            }
        }
    }

    Ok(())
}
