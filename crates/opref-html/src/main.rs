use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

use opref_html::{render_page, sections, PageOptions};
use opref_rs::enriched_database;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Generate the 6502-family opcode reference page", long_about = None)]
struct Cli {
    /// Output file (default: stdout)
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,
    /// Output format: html or json
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,
    /// Timestamp written into the page header (default: crate version)
    #[arg(long)]
    timestamp: Option<String>,
    /// Fail when any warning is reported
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let (groups, report) = enriched_database()?;
    let sections = sections(&groups);

    let mut opts = PageOptions::default();
    if let Some(ts) = cli.timestamp {
        opts.timestamp = ts;
    }

    let doc = match cli.format {
        OutputFormat::Html => render_page(&sections, &opts),
        OutputFormat::Json => serde_json::to_string_pretty(&sections)? + "\n",
    };

    if let Some(path) = &cli.output {
        std::fs::write(path, doc)?;
        info!(path = %path.display(), "page written");
    } else {
        print!("{doc}");
    }

    if cli.strict && report.warnings() > 0 {
        bail!("{} warnings in strict mode", report.warnings());
    }
    Ok(())
}
