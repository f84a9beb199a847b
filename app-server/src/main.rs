use std::path::PathBuf;

use clap::Parser;
use readiscover_app_server::ServerConfig;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "readiscover-app-server")]
#[command(about = "Guided rediscovery of research papers over HTTP", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(long, env = "READISCOVER_CONFIG")]
    config: Option<PathBuf>,

    /// Socket address to listen on; overrides the configuration.
    #[arg(long)]
    listen: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::load(cli.config.as_deref())?;
    if let Some(listen) = cli.listen {
        config.listen = listen;
    }

    readiscover_app_server::run(config).await
}
