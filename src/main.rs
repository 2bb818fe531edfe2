use anyhow::Context;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("marketcrawl=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    marketcrawl::cli::run().context("marketcrawl failed")
}
