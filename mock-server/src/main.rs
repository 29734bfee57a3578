use mock_server::{ServerConfig, DEFAULT_TABLE};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let config = ServerConfig {
        table: std::env::var("MOCK_TABLE").unwrap_or_else(|_| DEFAULT_TABLE.to_string()),
        api_key: std::env::var("MOCK_API_KEY").ok(),
    };
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(table = %config.table, keyed = config.api_key.is_some(), "listening on {addr}");
    mock_server::run_with(listener, config).await
}
