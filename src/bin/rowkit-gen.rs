//! rowkit-gen - generate model declarations from table names
//!
//! Usage:
//!   rowkit-gen --out-dir src/models --strip-prefix ngb_ ngb_agendas ngb_alarmes
//!   rowkit-gen --out-dir src/models --tables-file tables.txt
//!
//! Environment variables:
//!   RUST_LOG                          # Log filter (default: info)

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "rowkit-gen",
    version,
    about = "Generate rowkit model declarations for database tables"
)]
struct Cli {
    /// Table names to generate models for
    tables: Vec<String>,

    /// File with one table name per line (blank lines and `#` comments ignored)
    #[arg(long)]
    tables_file: Option<PathBuf>,

    /// Directory the model files are written to
    #[arg(long, short = 'o', default_value = "src/models")]
    out_dir: PathBuf,

    /// Prefix removed from table names before deriving type names (e.g. `ngb_`)
    #[arg(long)]
    strip_prefix: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .init();

    let cli = Cli::parse();

    let mut tables = cli.tables;
    if let Some(path) = &cli.tables_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        tables.extend(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#'))
                .map(String::from),
        );
    }

    if tables.is_empty() {
        bail!("No tables given. Pass table names or --tables-file.");
    }

    let written = rowkit::codegen::write_models(&tables, &cli.out_dir, cli.strip_prefix.as_deref())
        .context("Failed to generate models")?;

    println!("Generated {} model(s) in {}", written.len(), cli.out_dir.display());
    Ok(())
}
