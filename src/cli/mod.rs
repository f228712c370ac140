//! CLI module
//!
//! This module defines the command-line interface using clap and implements
//! the command execution logic.

use crate::{Config, Error, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::str::FromStr;

pub mod commands;
pub mod output;

/// Cohort pathway graph generator CLI
#[derive(Parser, Debug)]
#[command(name = "cohort-pathways")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (overrides config; RUST_LOG wins over both)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the transition graph and write it out
    Generate {
        /// Input CSV file (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Record source type
        #[arg(short, long, value_enum, default_value = "csv")]
        source: RecordSourceType,

        /// Keep only records with a reference year before this one
        #[arg(long)]
        max_year: Option<i32>,

        /// Last time bucket to synthesize
        #[arg(long)]
        time_max: Option<u32>,

        /// Native time units per bucket
        #[arg(long)]
        bucket_units: Option<u32>,

        /// Output format (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the state metadata table, or check a dataset against it
    Vocabulary {
        /// Input CSV file to check (overrides config)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Record source type; omit to only list the table
        #[arg(short, long, value_enum)]
        source: Option<RecordSourceType>,
    },
}

/// Record source types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RecordSourceType {
    /// CSV export on disk
    Csv,
    /// Built-in sample cohort
    Mock,
}

/// Output format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Node-link JSON
    Json,
    /// DOT format (Graphviz)
    Dot,
    /// Plain text table
    Table,
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true)
            .map_err(|_| Error::config(format!("unknown output format '{}'", s)))
    }
}

/// Execute the CLI command
pub fn execute(args: Cli, config: Config) -> Result<()> {
    match args.command {
        Commands::Generate { .. } => commands::generate::execute(args, config),
        Commands::Vocabulary { input, source } => {
            commands::vocabulary::execute(input, source, &config)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "cohort-pathways",
            "generate",
            "--input",
            "data/clearinghouse.csv",
            "--max-year",
            "2015",
            "--format",
            "dot",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                input,
                source,
                max_year,
                format,
                ..
            } => {
                assert_eq!(input, Some(PathBuf::from("data/clearinghouse.csv")));
                assert_eq!(source, RecordSourceType::Csv);
                assert_eq!(max_year, Some(2015));
                assert_eq!(format, Some(OutputFormat::Dot));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_vocabulary_parsing() {
        let cli = Cli::try_parse_from(["cohort-pathways", "vocabulary", "--source", "mock"]);
        assert!(cli.is_ok());
    }

    #[test]
    fn test_output_format_from_config_string() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("svg".parse::<OutputFormat>().is_err());
    }
}
