use anyhow::Result;
use clap::Parser;
use taskassassin_backend::models::Config;
use taskassassin_backend::proxy::GeminiProxy;
use taskassassin_backend::server::ProxyServer;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(name = "taskassassin-backend")]
#[command(about = "Serve the TaskAssassin Gemini proxy")]
struct CliArgs {
    /// Address to bind (overrides HOST).
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides PORT).
    #[arg(long, short, value_parser = parse_port_arg)]
    port: Option<u16>,
}

fn parse_port_arg(input: &str) -> std::result::Result<u16, String> {
    match input.parse::<u16>() {
        Ok(port) if port > 0 => Ok(port),
        _ => Err(format!("Invalid port '{}'. Expected 1-65535", input)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskassassin_backend=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting taskassassin-backend");

    let args = CliArgs::parse();

    let mut config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(port) = args.port {
        config.port = port;
    }

    if config.api_key.resolve().is_err() {
        // Re-read on every request.
        tracing::warn!("GEMINI_API_KEY is not set; requests will fail until it is");
    }

    let proxy = GeminiProxy::from_config(&config);
    info!("Model priority: {}", proxy.models().join(", "));

    let server = ProxyServer::new(config.host, config.port, proxy);
    if let Err(e) = server.run().await {
        error!("Server failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
