use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;
use sqlite_page_reader::sqlite::db::SQLiteDatabase;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

fn main() -> Result<()> {
    let args = cli::Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("Invalid log filter")?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    run(args)
}

pub fn run(args: cli::Args) -> Result<()> {
    info!("Running {} on {}", args.command, args.file.display());

    let mut db = SQLiteDatabase::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;

    match args.command {
        cli::Command::DbInfo => {
            let info = db.get_info().context("Failed to read database info")?;
            println!("database page size: {}", info.page_size());
            println!("number of tables: {}", info.num_tables());
        }
        cli::Command::Tables => {
            let tables = db.list_tables().context("Failed to list tables")?;
            println!("{}", tables.iter().join(" "));
        }
    }

    Ok(())
}
