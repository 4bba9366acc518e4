use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stride::api::server::{ApiServer, ApiServerConfig};

#[derive(Parser)]
#[command(name = "stride")]
#[command(about = "Stride fitness backend with mobile BFF", long_about = None)]
struct Cli {
    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind to
    #[arg(short, long, default_value = "8080")]
    port: u16,

    /// JWT secret key (can also use JWT_SECRET env var)
    #[arg(long)]
    jwt_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "stride=info,stride_bff=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let secret = cli
        .jwt_secret
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            println!("Warning: Using default JWT secret. Set JWT_SECRET env var or --jwt-secret for production.");
            "default_secret_change_in_production".to_string()
        });

    let config = ApiServerConfig {
        host: cli.host.clone(),
        port: cli.port,
        jwt_secret: secret,
        ..ApiServerConfig::default()
    };

    let server = ApiServer::new(config);
    println!("Starting API server on {}:{}", cli.host, cli.port);
    server.start().await?;

    Ok(())
}
