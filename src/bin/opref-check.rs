use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use opref_rs::enriched_database;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Decode and annotate the opcode database and report diagnostics"
)]
struct Opts {
    /// Fail when any warning is reported
    #[arg(long)]
    strict: bool,
    /// Hide the per-diagnostic warnings logged to stderr
    #[arg(short, long)]
    quiet: bool,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

/// Filter used when `RUST_LOG` is unset. The enrichment pass logs each
/// diagnostic at `warn`.
fn default_filter(quiet: bool) -> &'static str {
    if quiet {
        "error"
    } else {
        "warn"
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(opts.quiet))),
        )
        .with_writer(std::io::stderr)
        .init();

    let (_, report) = enriched_database()?;

    match opts.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            println!(
                "{} groups, {} instructions, {} variants, {} warnings",
                report.groups,
                report.instructions,
                report.variants,
                report.warnings()
            );
        }
    }

    if opts.strict && report.warnings() > 0 {
        bail!("{} warnings in strict mode", report.warnings());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiet_hides_logged_warnings() {
        assert_eq!(default_filter(false), "warn");
        assert_eq!(default_filter(true), "error");
    }

    #[test]
    fn flags_parse() {
        let opts = Opts::try_parse_from(["opref-check", "--quiet", "--format", "json"]).unwrap();
        assert!(opts.quiet);
        assert!(matches!(opts.format, OutputFormat::Json));
    }
}
