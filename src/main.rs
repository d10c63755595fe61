use clap::Parser;
use portfolio_api::cli::{self, Cli};
use portfolio_api::config::config;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL and friends.
    let _ = dotenvy::dotenv();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config().default_log_filter()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    if let Err(e) = cli::run(cli).await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
    Ok(())
}
