#![forbid(unsafe_code)]
use anyhow::Result;
use backend::{api, settings::Settings, AppState};
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::{
    catch_panic::CatchPanicLayer, compression::CompressionLayer, timeout::TimeoutLayer,
};
use tracing::{info, warn};
use tracing_subscriber::filter::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(e) = dotenvy::dotenv() {
        warn!("No .env loaded: {}", e);
    }
    let settings = Settings::from_env()?;

    info!("Starting server");
    let state = AppState::from_settings(&settings);
    if !state.notifier.is_configured() {
        warn!("Telegram credentials missing, signup notifications will fail");
    }
    info!(
        "Serving landing page from {} with {} snow particles",
        settings.frontend_dir.display(),
        state.snow.particle_count
    );

    let middleware = tower::ServiceBuilder::new()
        .layer(CompressionLayer::new().quality(tower_http::CompressionLevel::Fastest))
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .layer(CatchPanicLayer::new());

    let app = api(state)
        .fallback_service(ServeDir::new(&settings.frontend_dir))
        .layer(middleware);

    // run our app with hyper, listening globally on the configured port
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", settings.port)).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
