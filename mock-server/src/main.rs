use mock_server::{AppState, Config};
use tokio::net::TcpListener;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let config = Config::from_env();

    let env_filter = EnvFilter::builder()
        .with_default_directive(config.log_level.into())
        .from_env_lossy();
    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_filter(env_filter);
    tracing_subscriber::registry().with(stdout_layer).init();

    if config.voice_agent_key.is_none() {
        tracing::warn!("VOICE_AGENT_API_KEY not set, /agents/ will answer 503");
    }

    let addr = format!("127.0.0.1:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "listening");
    mock_server::serve(listener, AppState::new(config.voice_agent_key)).await
}
