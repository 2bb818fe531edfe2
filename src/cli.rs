use crate::api::{self, Components};
use crate::config::SearchConfig;
use crate::error::MarketError;
use crate::marketplace::Marketplace;
use crate::output;
use crate::runtime;
use crate::services::{ActivityLogger, Extractor};
use crate::types::{ApiResponse, Record, SearchRequest};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "marketcrawl", version, about = "Marketplace search results as JSON")]
pub struct Cli {
    /// JSON config file; defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search one query, no fallback
    Search(SearchArgs),
    /// Try the query, then each configured fallback query, until one yields results
    Fallback(FallbackArgs),
    /// Extract records from a saved search-results page
    Parse(ParseArgs),
    /// Show the activity log, newest first
    Logs(LogsArgs),
}

#[derive(Args)]
struct Artifacts {
    /// Also write the records as a JSON array
    #[arg(long)]
    json: Option<PathBuf>,
    /// Also render the records as a static HTML page
    #[arg(long)]
    html: Option<PathBuf>,
}

#[derive(Args)]
struct SearchArgs {
    #[arg(long, default_value = "IN")]
    country: String,
    query: String,
    #[command(flatten)]
    artifacts: Artifacts,
}

#[derive(Args)]
struct FallbackArgs {
    #[arg(long, default_value = "IN")]
    country: String,
    /// Primary query; the first configured fallback query when omitted
    query: Option<String>,
    #[command(flatten)]
    artifacts: Artifacts,
}

#[derive(Args)]
struct ParseArgs {
    file: PathBuf,
    /// Marketplace the page came from, for link resolution and currency
    #[arg(long, default_value = "IN")]
    country: String,
    #[command(flatten)]
    artifacts: Artifacts,
}

#[derive(Args)]
struct LogsArgs {
    /// Only failed operations
    #[arg(long)]
    errors: bool,
    #[arg(long)]
    country: Option<String>,
}

pub fn run() -> crate::Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SearchConfig::load(path)?,
        None => SearchConfig::default(),
    };

    match cli.cmd {
        Command::Search(args) => {
            let components = Components::new(config)?;
            let request = SearchRequest::new(args.country, args.query);
            let result = runtime::block_on(api::search(&components, &request));
            let result = result.and_then(|records| {
                write_artifacts(&args.artifacts, &records)?;
                Ok(records)
            });
            finish(result);
        }
        Command::Fallback(args) => {
            let marketplace = match Marketplace::from_country_code(&args.country) {
                Ok(m) => m,
                Err(e) => {
                    print_json(ApiResponse::<()>::from_error(&e.into()));
                    return Ok(());
                }
            };
            let mut queries = config.fallback_queries.clone();
            let primary = match args.query {
                Some(q) => q,
                None if !queries.is_empty() => queries.remove(0),
                None => {
                    print_json(ApiResponse::<()>::from_error(&MarketError::config(
                        "no query given and no fallback queries configured",
                    )));
                    return Ok(());
                }
            };
            let components = Components::new(config)?;
            let records = runtime::block_on(api::search_with_fallback(
                &components,
                marketplace,
                &primary,
                &queries,
            ));
            let result = write_artifacts(&args.artifacts, &records).map(|_| records);
            finish(result);
        }
        Command::Parse(args) => {
            let result = parse_file(&args.file, &args.country, config.max_containers)
                .and_then(|records| {
                    write_artifacts(&args.artifacts, &records)?;
                    Ok(records)
                });
            finish(result);
        }
        Command::Logs(args) => {
            let result = ActivityLogger::new()
                .and_then(|logger| logger.read_logs(args.country.as_deref(), args.errors));
            finish(result);
        }
    }
    Ok(())
}

fn parse_file(path: &Path, country: &str, max_containers: usize) -> crate::Result<Vec<Record>> {
    let marketplace = Marketplace::from_country_code(country)?;
    let html = fs::read_to_string(path)?;
    Ok(Extractor::for_marketplace(marketplace)
        .with_max_containers(max_containers)
        .parse_page(&html))
}

fn write_artifacts(artifacts: &Artifacts, records: &[Record]) -> crate::Result<()> {
    if let Some(path) = &artifacts.json {
        output::write_json(path, records)?;
    }
    if let Some(path) = &artifacts.html {
        output::write_html(path, records, "Amazon Products", chrono::Utc::now())?;
    }
    Ok(())
}

fn finish<T: serde::Serialize>(res: crate::Result<T>) {
    print_json(envelope(res));
}

fn envelope<T>(res: crate::Result<T>) -> ApiResponse<T> {
    match res {
        Ok(v) => ApiResponse::ok(v),
        Err(e) => ApiResponse::from_error(&e),
    }
}

fn print_json<T: serde::Serialize>(val: T) {
    match serde_json::to_string_pretty(&val) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to encode response: {}", e),
    }
}
