use anyhow::Result;
use clap::Parser;
use request_logger::config::{Cli, Config};
use request_logger::server::Server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Load configuration from environment, then apply CLI overrides
    let cli = Cli::parse();
    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?
        .with_overrides(cli);

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("request_logger={},tower_http=debug", config.log_level).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting request logger");
    tracing::info!(
        "Configuration: bind_addr={}, static_dir={}",
        config.bind_addr,
        config.static_dir.display()
    );

    // Create and run the server
    Server::new(config)
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
