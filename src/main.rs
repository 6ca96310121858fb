use clap::Parser;
use std::path::PathBuf;
use switchyard::clients;
use switchyard::config::ServerConfig;
use switchyard::server;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "switchyard")]
#[command(about = "Serves the medium and premium clients routers", long_about = None)]
struct Cli {
    /// TOML config file; defaults apply when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `bind_address` from the config
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "switchyard=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.bind_address = bind;
        config.validate()?;
    }

    tracing::info!(
        bind_address = %config.bind_address,
        max_connections = config.max_connections,
        "Configuration loaded"
    );

    let dispatcher = clients::dispatcher(&config)?;
    server::serve(dispatcher, &config).await?;
    Ok(())
}
