use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use snow_wasm::SnowConfig;
use std::sync::Arc;

pub mod api;
pub mod notify;
pub mod settings;

use notify::TelegramNotifier;
use settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub notifier: Arc<TelegramNotifier>,
    pub snow: Arc<SnowConfig>,
}

impl AppState {
    pub fn new(notifier: TelegramNotifier, snow: SnowConfig) -> Self {
        Self {
            notifier: Arc::new(notifier),
            snow: Arc::new(snow),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let notifier = TelegramNotifier::new(
            &settings.telegram_api_base,
            settings.telegram_bot_token.clone(),
            settings.telegram_chat_id.clone(),
        );
        let mut snow = SnowConfig::default();
        if let Some(count) = settings.snow_particles {
            snow = snow.with_particle_count(count);
        }
        Self::new(notifier, snow)
    }
}

async fn handle_snow_config(State(state): State<AppState>) -> Json<SnowConfig> {
    Json(state.snow.as_ref().clone())
}

/// API routes. Static files are attached by the binary as a fallback.
pub fn api(state: AppState) -> Router {
    Router::new()
        .route("/api/notify", post(notify::handle_notify))
        .route("/api/snow-config", get(handle_snow_config))
        .with_state(state)
}
