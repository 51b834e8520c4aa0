use clap::{Parser, ValueEnum};
use std::fmt::Display;
use std::path::PathBuf;

/// Available commands for the SQLite CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// Print the page size and the number of tables
    #[value(name = ".dbinfo")]
    DbInfo,
    /// Print the names of all tables on one line
    #[value(name = ".tables")]
    Tables,
}

impl Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::DbInfo => write!(f, ".dbinfo"),
            Command::Tables => write!(f, ".tables"),
        }
    }
}

/// Command line arguments for the SQLite CLI
#[derive(Debug, Parser)]
#[command(version, about = "Inspect the schema page of a SQLite database file")]
pub struct Args {
    /// Path to the database file
    pub file: PathBuf,

    /// Command to run against the database
    #[arg(value_enum)]
    pub command: Command,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}
