mod analysis;
mod auth;
mod config;
mod data_url;
mod error;
mod llm_client;
mod logging;
mod prompt;
mod request_id;
mod router;
mod upstream;

use clap::Parser;
use config::Config;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(name = "waste-classifier")]
#[command(about = "Classifies photographed waste with a vision model")]
struct Args {
    #[arg(short, long, default_value = "0.0.0.0")]
    ip: String,

    #[arg(short, long, default_value = "8000")]
    port: u16,

    /// Path to config file, built-in defaults are used when it does not exist
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Require `Authorization: Bearer <token>` on every request but /health
    #[arg(short, long)]
    token: Option<String>,

    /// trace, debug, info, warn, error
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[arg(long)]
    log_file: Option<String>,

    /// Largest accepted request body in bytes, overrides `max_body_bytes` in the config
    #[arg(long)]
    max_body_bytes: Option<usize>,

    /// socks and http proxy, example: socks5://192.168.0.2:10080
    #[arg(long)]
    proxy: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_level = Level::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", args.log_level);
        Level::INFO
    });
    logging::init_logging(log_level, args.log_file.as_deref());

    let mut config = Config::load_or_default(&args.config)?;
    if let Some(limit) = args.max_body_bytes {
        config.max_body_bytes = Some(limit);
    }
    info!(
        "Using {:?} model {} at {} (credential from {}, body limit {} bytes)",
        config.api_type,
        config.model(),
        config.api_base(),
        config.api_key_env(),
        config.max_body_bytes()
    );

    let client_builder = reqwest::Client::builder();
    let client_builder = if let Some(proxy) = &args.proxy {
        client_builder.proxy(reqwest::Proxy::all(proxy)?)
    } else {
        client_builder
    };
    let http_client = Arc::new(client_builder.build()?);

    let app_state = router::AppState {
        llm_client: Arc::new(llm_client::LlmClient::new(http_client, Arc::new(config))),
        token: args.token,
    };
    let app = router::build_router(app_state);

    let bind_address = format!("{}:{}", args.ip, args.port);
    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    info!("Server started on http://{}", bind_address);

    axum::serve(listener, app).await?;
    Ok(())
}
