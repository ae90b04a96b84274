//! Convert GDF collar logs into one delimited fix table.
use std::path::PathBuf;

use chrono::FixedOffset;
use clap::{ArgAction, Parser};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use gdf_telem::{
    batch::{Batch, BatchOptions},
    FormatOptions, GdfResult,
};

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// GDF files to convert. Missing or non-GDF paths are skipped.
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Output table.
    #[arg(short, long, default_value = "gdfConverted.txt")]
    output: PathBuf,

    /// Field delimiter: `tab`, `comma` or any single character.
    #[arg(short, long, default_value = "tab", value_parser = parse_delimiter)]
    delimiter: char,

    /// Offset of the local time columns from UTC, e.g. -08:00.
    #[arg(long, default_value = "-08:00", allow_hyphen_values = true)]
    utc_offset: FixedOffset,

    /// Expected input file extension.
    #[arg(long, default_value = gdf_telem::batch::DEFAULT_EXTENSION)]
    extension: String,

    /// Append to an existing output table instead of replacing it.
    #[arg(long)]
    append: bool,

    /// Decode files one at a time.
    #[arg(long)]
    sequential: bool,

    /// More logging (-v, -vv).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn parse_delimiter(s: &str) -> Result<char, String> {
    match s {
        "tab" | "\\t" => Ok('\t'),
        "comma" => Ok(','),
        _ => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(c),
                _ => Err(format!("delimiter must be one character, got {s:?}")),
            }
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> GdfResult<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let options = BatchOptions {
        format: FormatOptions::default()
            .with_delimiter(cli.delimiter)
            .with_local_offset(cli.utc_offset),
        extension: cli.extension,
        parallel: !cli.sequential,
    };
    let batch = Batch::new(options);
    match batch.convert_to_file(&cli.files, &cli.output, cli.append) {
        Ok(report) => {
            info!(
                "wrote {} row(s) from {} file(s) to {}",
                report.rows(),
                report.converted.len(),
                cli.output.display()
            );
            Ok(())
        }
        Err(e) => {
            error!("{}: {}", cli.output.display(), e);
            Err(e)
        }
    }
}
