use rawhttp::config::ServerConfig;
use rawhttp::net::server::Server;
use tracing_subscriber::EnvFilter;

#[async_std::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => ServerConfig::from_file(&path),
        None => ServerConfig::default(),
    };

    let server = Server::bind(config).await?;
    tracing::info!("listening on {}", server.local_addr()?);
    server.run().await
}
