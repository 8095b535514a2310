//! JWT gateway
//!
//! ```text
//!     Client ──POST /any?q──▶ ┌──────────────────────────────┐
//!                             │  http (axum router)          │
//!                             │    ├─ identity: sign JWT     │ ──POST /post?q──▶ Upstream
//!                             │    ├─ upstream: forward      │    x-my-jwt
//!     Client ◀── verbatim ─── │    └─ stats: count           │ ◀────────────────
//!                             │                              │
//!     Client ──GET /status──▶ │  stats snapshot (JSON)       │
//!                             └──────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use jwt_gateway::config::{load_config, validate_config, ConfigError, GatewayConfig};
use jwt_gateway::http::HttpServer;
use jwt_gateway::lifecycle::{signals, Shutdown};
use jwt_gateway::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "jwt-gateway")]
#[command(about = "Reverse proxy that signs every request with a fresh JWT", long_about = None)]
struct Cli {
    /// Listening port [default: 8080]
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable verbose mode
    #[arg(short, long)]
    verbose: bool,

    /// Optional TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the upstream base URL
    #[arg(long)]
    upstream: Option<String>,

    /// Override the token signing secret
    #[arg(long, env = "GATEWAY_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,
}

impl Cli {
    fn into_config(self) -> Result<GatewayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => GatewayConfig::default(),
        };

        if let Some(port) = self.port {
            config.set_port(port);
        }
        if self.verbose {
            config.observability.log_level = logging::VERBOSE_LEVEL.to_string();
        }
        if let Some(url) = self.upstream {
            config.upstream.base_url = url;
        }
        if let Some(secret) = self.jwt_secret {
            config.token.secret = secret;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init_logging(&config.observability)?;

    tracing::info!("jwt-gateway v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        "Configuration loaded"
    );
    if config.token.secret == jwt_gateway::identity::DEFAULT_SIGNING_SECRET {
        tracing::warn!("Signing tokens with the built-in development secret");
    }

    if config.observability.metrics_enabled {
        let addr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    signals::spawn_signal_listener(shutdown);

    let server = HttpServer::new(config)?;
    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
