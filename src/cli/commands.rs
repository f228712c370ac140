//! CLI command implementations
//!
//! This module contains the implementation for each CLI command.

use crate::cli::{Cli, RecordSourceType};
use crate::data_source::{LoadParams, Record, create_record_source, fetch_and_load};
use crate::pathway::MetadataTable;
use crate::{Config, Result};
use std::path::PathBuf;

/// Read and load records with the configured cutoff and date formats
fn load(
    source: RecordSourceType,
    input: Option<PathBuf>,
    config: &Config,
) -> Result<Vec<Record>> {
    let data_source = create_record_source(source, config, input)?;

    let mut params = LoadParams::default().date_formats(config.input.date_formats.clone());
    if let Some(year) = config.pipeline.max_year {
        tracing::info!("Excluding records from {} onwards", year);
        params = params.max_year(year);
    }

    fetch_and_load(data_source.as_ref(), &params)
}

/// Generate command implementation
pub mod generate {
    use super::*;
    use crate::cli::{Commands, OutputFormat};
    use crate::pathway::{PipelineOptions, build_pathway_graph};
    use std::fs::File;
    use std::io::{BufWriter, Write};

    /// Execute the generate command
    pub fn execute(args: Cli, mut config: Config) -> Result<()> {
        let Commands::Generate {
            input,
            source,
            max_year,
            time_max,
            bucket_units,
            format,
            output,
        } = args.command
        else {
            unreachable!("generate::execute called with wrong command");
        };

        // Command-line flags take precedence over the config file
        if max_year.is_some() {
            config.pipeline.max_year = max_year;
        }
        if time_max.is_some() {
            config.pipeline.time_max = time_max;
        }
        if let Some(units) = bucket_units {
            config.pipeline.bucket_units = units;
        }
        config.validate()?;

        let format = match format {
            Some(format) => format,
            None => config.output.format.parse::<OutputFormat>()?,
        };
        let output = output.or_else(|| config.output.path.clone());

        let records = load(source, input, &config)?;

        let table = MetadataTable::reference().with_entries(&config.states);
        let options = PipelineOptions {
            bucket_units: config.pipeline.bucket_units,
            time_max: config.pipeline.time_max,
        };
        tracing::info!("Building pathway graph...");
        let run = build_pathway_graph(&records, &options, &table)?;

        if !run.warnings.is_empty() {
            tracing::warn!(
                "{} transitions had no source state; they are attached to the no-record node",
                run.warnings.len()
            );
        }

        let mut writer: Box<dyn Write> = match &output {
            Some(path) => {
                tracing::info!("Writing {:?} output to {:?}", format, path);
                Box::new(BufWriter::new(File::create(path)?))
            }
            None => Box::new(std::io::stdout().lock()),
        };

        match format {
            OutputFormat::Json => crate::cli::output::output_json(&mut writer, &run.graph)?,
            OutputFormat::Dot => crate::cli::output::output_dot(&mut writer, &run.graph)?,
            OutputFormat::Table => {
                crate::cli::output::output_table(&mut writer, &run.graph, &run.warnings)?
            }
        }
        writer.flush()?;

        let stats = run.graph.stats();
        tracing::info!(
            "Done: {} students, {} nodes, {} edges, {} gap warnings",
            stats.students,
            stats.total_nodes,
            stats.total_edges,
            run.warnings.len()
        );
        Ok(())
    }
}

/// Vocabulary command implementation
pub mod vocabulary {
    use super::*;
    use crate::pathway::labeler::label_record;
    use std::collections::BTreeMap;

    /// Tokens in the records with no entry in the table, with occurrence counts
    pub fn unknown_tokens(
        records: &[Record],
        table: &MetadataTable,
        bucket_units: u32,
    ) -> BTreeMap<String, usize> {
        let mut unknown = BTreeMap::new();
        for record in records {
            let label = label_record(record, bucket_units);
            if !table.contains(label.token.as_str()) {
                *unknown.entry(label.token.to_string()).or_insert(0) += 1;
            }
        }
        unknown
    }

    /// Execute the vocabulary command
    pub fn execute(
        input: Option<PathBuf>,
        source: Option<RecordSourceType>,
        config: &Config,
    ) -> Result<()> {
        let table = MetadataTable::reference().with_entries(&config.states);

        let source = match (source, &input) {
            (Some(source), _) => source,
            (None, Some(_)) => RecordSourceType::Csv,
            (None, None) => {
                crate::cli::output::output_vocabulary(&mut std::io::stdout(), &table)?;
                return Ok(());
            }
        };

        let records = load(source, input, config)?;
        let unknown = unknown_tokens(&records, &table, config.pipeline.bucket_units);

        println!("Checked {} records against {} states", records.len(), table.len());
        if unknown.is_empty() {
            println!("All state tokens have metadata");
            Ok(())
        } else {
            println!("Tokens missing from the state metadata table:");
            for (token, count) in &unknown {
                println!("  {:<30} {:>8} records", token, count);
            }
            Err(crate::custom_error!(
                "{} state token(s) missing from the metadata table",
                unknown.len()
            ))
        }
    }

}
