//! Bazaar CLI - catalog inspection tools.
//!
//! Runs the storefront listing engine over the embedded seed catalog and
//! prints JSON, the same shape the API returns.
//!
//! # Usage
//!
//! ```bash
//! # First page of the full catalog
//! bazaar listing
//!
//! # Office and kitchen products under 30000, cheapest first
//! bazaar listing --category office,kitchen --max-price 30000 --sort price_low_to_high
//!
//! # Slider bounds, categories and companies
//! bazaar facets
//!
//! # Text search
//! bazaar search chair
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};

mod commands;

use commands::catalog::ListingArgs;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar catalog tools")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pretty: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Filtered, sorted and paginated product listing
    Listing(ListingArgs),
    /// Price bounds, enabled categories and companies
    Facets,
    /// Products matching a search term
    Search {
        /// Text matched against name, description, company and category
        query: String,
    },
}

fn main() -> ExitCode {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bazaar_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Command failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let output = match cli.command {
        Commands::Listing(args) => commands::catalog::listing(args)?,
        Commands::Facets => commands::catalog::facets()?,
        Commands::Search { query } => commands::catalog::search(&query)?,
    };
    commands::print_json(&output, cli.pretty)
}
