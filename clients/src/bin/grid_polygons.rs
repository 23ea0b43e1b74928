//! `grid-polygons` — Writes the SQL transaction that cuts a PostGIS polygon
//! table along a regular grid.
//!
//! The script goes to stdout (or `--out`) and is meant to be piped into
//! `psql`. Logs go to stderr; `RUST_LOG` overrides the `-v` level.
//!
//! **Usage:**
//! ```
//! grid-polygons --input <table.column> --output <table.column>
//!     [-t <top>] [-b <bottom>] [-l <left>] [-r <right>] [-i <increment>]
//!     [--aggregate collect|union] [--include-truncate | --destination-empty]
//!     [--config <file.toml>] [--out <path>] [-v...]
//! ```

#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    missing_docs,
    clippy::missing_errors_doc
)]

use std::fs::{self, File};
use std::io::{self, BufWriter, IsTerminal};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gridpoly_codegen::{write_script, Pipeline, ScriptConfig};
use tracing::level_filters::LevelFilter;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate the gridding transaction for a polygon table.
///
/// Flags override values from `--config`; anything set in neither takes the
/// whole-globe, one-degree, `collect` default.
#[derive(Parser)]
#[command(
    name = "grid-polygons",
    about = "Emit SQL that grids, clips and aggregates a PostGIS polygon table"
)]
struct Args {
    /// Cell side length (default: 1.0).
    #[arg(short, long)]
    increment: Option<f64>,

    /// Upper Y bound of the extent (default: 90).
    #[arg(short, long, allow_negative_numbers = true)]
    top: Option<f64>,

    /// Lower X bound of the extent (default: -180).
    #[arg(short, long, allow_negative_numbers = true)]
    left: Option<f64>,

    /// Lower Y bound of the extent (default: -90).
    #[arg(short, long, allow_negative_numbers = true)]
    bottom: Option<f64>,

    /// Upper X bound of the extent (default: 180).
    #[arg(short, long, allow_negative_numbers = true)]
    right: Option<f64>,

    /// Source geometries, as `table.column`.
    #[arg(long)]
    input: Option<String>,

    /// Destination for the gridded geometries, as `table.column`.
    #[arg(long)]
    output: Option<String>,

    /// How fragments of one cell are combined: `collect` or `union`.
    #[arg(long)]
    aggregate: Option<String>,

    /// Truncate the destination table before inserting.
    #[arg(long, conflicts_with = "destination_empty")]
    include_truncate: bool,

    /// Declare the destination table empty, allowing a single-step `union`
    /// without truncating.
    #[arg(long)]
    destination_empty: bool,

    /// TOML file with any of the options above.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the script to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,

    /// Raise log verbosity (`-v` info, `-vv` debug).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Layers command-line flags over the config file, if any.
    fn script_config(&self) -> Result<ScriptConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read config: {}", path.display()))?;
                ScriptConfig::from_toml(&text)
                    .with_context(|| format!("Failed to parse config: {}", path.display()))?
            }
            None => ScriptConfig::default(),
        };

        if let Some(v) = self.top {
            config.top = v;
        }
        if let Some(v) = self.bottom {
            config.bottom = v;
        }
        if let Some(v) = self.left {
            config.left = v;
        }
        if let Some(v) = self.right {
            config.right = v;
        }
        if let Some(v) = self.increment {
            config.increment = v;
        }
        if self.input.is_some() {
            config.input.clone_from(&self.input);
        }
        if self.output.is_some() {
            config.output.clone_from(&self.output);
        }
        if let Some(v) = &self.aggregate {
            config.aggregate.clone_from(v);
        }
        if self.include_truncate {
            config.include_truncate = true;
            config.destination_empty = false;
        }
        if self.destination_empty {
            config.destination_empty = true;
            config.include_truncate = false;
        }
        Ok(config)
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    if let Err(e) = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .try_init()
    {
        eprintln!("Unable to set up logging: {e}");
    }
}

fn emit(pipeline: &Pipeline, out: Option<&PathBuf>) -> Result<usize> {
    match out {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create directory: {}", parent.display())
                })?;
            }
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_script(pipeline, &mut BufWriter::new(file))
                .with_context(|| format!("Failed to write {}", path.display()))
        }
        None => write_script(pipeline, &mut BufWriter::new(io::stdout().lock()))
            .context("Failed to write script to stdout"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = args.script_config()?;
    let pipeline = config.pipeline().context("Invalid gridding options")?;

    let written = emit(&pipeline, args.out.as_ref())?;

    info!(
        statements = written,
        plan = ?pipeline.plan(),
        out = %args.out.as_ref().map_or_else(|| "<stdout>".to_string(), |p| p.display().to_string()),
        "script complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("grid-polygons").chain(argv.iter().copied()))
            .unwrap()
    }

    #[test]
    fn defaults_cover_the_globe() {
        let config = parse(&["--input", "a.geom", "--output", "b.geom"])
            .script_config()
            .unwrap();
        assert_eq!((config.top, config.bottom), (90.0, -90.0));
        assert_eq!((config.left, config.right), (-180.0, 180.0));
        assert_eq!(config.increment, 1.0);
        assert_eq!(config.aggregate, "collect");
        assert!(!config.include_truncate);
    }

    #[test]
    fn short_flags_accept_negative_bounds() {
        let config = parse(&[
            "-t", "10", "-b", "-10", "-l", "-20", "-r", "20", "-i", "0.5", "--input", "a.geom",
            "--output", "b.geom",
        ])
        .script_config()
        .unwrap();
        assert_eq!((config.top, config.bottom), (10.0, -10.0));
        assert_eq!((config.left, config.right), (-20.0, 20.0));
        assert_eq!(config.increment, 0.5);
    }

    #[test]
    fn truncate_and_empty_conflict() {
        let argv = [
            "grid-polygons",
            "--include-truncate",
            "--destination-empty",
        ];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn union_with_truncate_builds() {
        let config = parse(&[
            "--input",
            "a.geom",
            "--output",
            "b.geom",
            "--aggregate",
            "union",
            "--include-truncate",
        ])
        .script_config()
        .unwrap();
        assert!(config.pipeline().is_ok());
    }

    #[test]
    fn missing_config_file_is_reported() {
        let args = parse(&["--config", "/nonexistent/grid.toml"]);
        let err = args.script_config().unwrap_err();
        assert!(err.to_string().contains("Failed to read config"));
    }
}
