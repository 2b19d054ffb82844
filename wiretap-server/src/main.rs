use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use wiretap_core::config::AppConfig;

#[derive(Parser, Debug)]
#[command(name = "wiretap", version, about = "Wiretap — access-log middleware demo server")]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "/etc/wiretap/wiretap.yaml")]
    config: PathBuf,

    /// Log level
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // ── Tracing ──
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level)),
        )
        .with_target(false)
        .init();

    // ── Config ──
    let config = if cli.config.exists() {
        info!(path = %cli.config.display(), "Loading config file");
        AppConfig::load(&cli.config)?
    } else {
        info!("No config file found, using defaults");
        AppConfig::default()
    };

    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.addr,
        include_response = config.access_log.include_response,
        "Wiretap starting"
    );

    wiretap_server::server::serve(config).await
}
