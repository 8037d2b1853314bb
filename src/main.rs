use cfp_dashboard::{config, routes, state};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "cfp_dashboard=info,tower_http=info".into()),
        )
        .init();

    let config = match config::Config::from_env() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let state = Arc::new(state::AppState::new(config.clone())?);
    let app = routes::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!(
        "Dashboard for {} listening on http://{}",
        config.pretalx_base_url,
        addr
    );

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
