mod export;

use std::fs::File;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use dirscout_core::load_scrape_config;
use dirscout_scraper::{run_scrape, SourceSelector};

#[derive(Debug, Parser)]
#[command(name = "dirscout")]
#[command(about = "Local-business listing aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scrape directory sites for a free-text query and export a CSV.
    Scrape(ScrapeArgs),
    /// List the available directory sources.
    Sources,
}

#[derive(Debug, Args)]
struct ScrapeArgs {
    /// Free-text query, e.g. "hotels in mumbai".
    #[arg(required = true)]
    query: Vec<String>,

    /// Source to scrape: a source name or "all".
    #[arg(long, default_value = "all")]
    source: String,

    /// Output CSV path.
    #[arg(long, default_value = "results.csv")]
    out: PathBuf,

    /// Drop records rated below this value (records with no rating are
    /// dropped too).
    #[arg(long)]
    min_rating: Option<f64>,

    /// Also write the session stats report as JSON to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Scrape(args) => scrape(args).await,
        Commands::Sources => {
            for adapter in dirscout_scraper::sources::all_adapters() {
                println!("{}", adapter.name());
            }
            Ok(())
        }
    }
}

async fn scrape(args: ScrapeArgs) -> anyhow::Result<()> {
    let config = load_scrape_config()?;
    let selector: SourceSelector = args.source.parse()?;
    let raw_query = args.query.join(" ");

    let mut outcome = run_scrape(&raw_query, &selector, config).await?;
    if let Some(min) = args.min_rating {
        outcome
            .records
            .retain(|r| r.rating.is_some_and(|v| v >= min));
    }

    if let Some(path) = &args.report {
        let file = File::create(path)
            .with_context(|| format!("creating report file {}", path.display()))?;
        serde_json::to_writer_pretty(file, &outcome.report)?;
        println!("Report written to {}", path.display());
    }

    if outcome.records.is_empty() {
        if outcome.report.error_count > 0 {
            println!(
                "No results, and {} error(s) occurred while scraping.",
                outcome.report.error_count
            );
            println!("Re-run with --report <path> to inspect the errors.");
        } else {
            println!("No results found for \"{raw_query}\".");
        }
        for suggestion in outcome.no_result_suggestions() {
            println!("Hint: {suggestion}");
        }
        return Ok(());
    }

    let file = File::create(&args.out)
        .with_context(|| format!("creating output file {}", args.out.display()))?;
    export::write_csv(file, &outcome.records)?;

    println!(
        "Wrote {} record(s) for {} ({}) to {}",
        outcome.records.len(),
        outcome.query.category,
        outcome.query.location.as_deref().unwrap_or("any location"),
        args.out.display()
    );
    println!(
        "{} request(s), {} cache hit(s), {} error(s), {:.1}s",
        outcome.report.requests_made,
        outcome.report.cache_hits,
        outcome.report.error_count,
        outcome.report.duration_secs
    );
    Ok(())
}
