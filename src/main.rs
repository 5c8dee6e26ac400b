//! # chemrel
//!
//! Curation helpers for `xrefs.tsv`, the chemical cross-reference table.
//!
//! ## Usage
//!
//! ```text
//! # Show how many rows the table holds, and the first few
//! chemrel show --limit 5
//!
//! # Sort and de-duplicate the table in place
//! chemrel normalize
//!
//! # Ground free text against GILDA
//! chemrel ground "acetylsalicylic acid"
//!
//! # List ChEBI identifiers that map to exactly one target
//! chemrel single-mappings --column source_db --value chebi
//! ```
//!
//! ## Configuration
//!
//! - `XREFS_PATH`: table to operate on (default: `resources/xrefs.tsv` next to the crate)
//! - `EXPORT_DIRECTORY`: where exports are written (default: `export/`)
//! - `GILDA_URL`: grounding service origin (default: `http://grounding.indra.bio`)
//! - `GILDA_TIMEOUT_SECS`: grounding request timeout (default: 30)

use anyhow::{Context, Result};
use chemrel::config::Config;
use chemrel::grounding::GroundingClient;
use chemrel::xrefs::{self, NormalizeOptions, Selection};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to xrefs.tsv (overrides XREFS_PATH)
    #[arg(long, global = true)]
    xrefs: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load the table and print a preview
    Show {
        /// Number of rows to print
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Sort and de-duplicate the table in place
    Normalize {
        /// Keep comment lines above the header
        #[arg(long)]
        keep_comments: bool,
    },

    /// Send text to the grounding service and print the response
    Ground {
        /// Text to ground
        text: String,

        /// Grounding service origin (overrides GILDA_URL)
        #[arg(long)]
        url: Option<String>,

        /// Request timeout in seconds (overrides GILDA_TIMEOUT_SECS)
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Report source identifiers that map to exactly one target
    SingleMappings {
        /// Restrict the selection to rows where this column...
        #[arg(long, requires = "value")]
        column: Option<String>,

        /// ...equals this value
        #[arg(long, requires = "column")]
        value: Option<String>,

        /// Also write single_mappings.tsv to the export directory
        #[arg(long)]
        export: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    chemrel::logging::configure_logging();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.xrefs {
        config = config.with_xrefs_path(path);
    }

    match cli.command {
        Commands::Show { limit } => {
            let table = xrefs::load_table(&config).context("Failed to load xrefs table")?;
            println!("{} rows in {}", table.len(), config.xrefs_path.display());
            println!("{}", table.header.join("\t"));
            for row in table.rows.iter().take(limit) {
                println!("{}", row.join("\t"));
            }
        }

        Commands::Normalize { keep_comments } => {
            let summary = xrefs::normalize_table(&config, NormalizeOptions { keep_comments })
                .context("Failed to normalize xrefs table")?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }

        Commands::Ground { text, url, timeout } => {
            if let Some(url) = url {
                config = config.with_grounding_url(url);
            }
            if let Some(secs) = timeout {
                config = config.with_grounding_timeout(Duration::from_secs(secs));
            }

            let client = GroundingClient::new(&config.grounding)?;
            info!("Grounding '{}' via {}", text, client.endpoint());
            let response = client
                .ground(&text)
                .await
                .with_context(|| format!("Failed to reach {}", client.endpoint()))?;

            let status = response.status();
            let body = response.text().await?;
            println!("{}", status);
            match serde_json::from_str::<serde_json::Value>(&body) {
                Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
                Err(_) => println!("{}", body),
            }
        }

        Commands::SingleMappings {
            column,
            value,
            export,
        } => {
            let table = xrefs::load_table(&config).context("Failed to load xrefs table")?;
            let selection = match (column, value) {
                (Some(column), Some(value)) => Selection::equals(column, value),
                _ => Selection::All,
            };

            let report = xrefs::report_mappings(&table, &selection)?;
            report.write_diagnostics(&mut std::io::stdout().lock())?;
            info!(
                "{} single mappings, {} ambiguous source identifiers",
                report.singles.len(),
                report.ambiguous.len()
            );

            if export {
                let path = xrefs::export_single_mappings(&config, &report.singles)
                    .context("Failed to export single mappings")?;
                println!("Exported to {}", path.display());
            }
        }
    }

    Ok(())
}
