use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::api::{SendMessage, WebhookPayload};
use crate::AppState;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Missing Telegram configuration")]
    MissingConfig,
    #[error("unreadable webhook payload: {0}")]
    Payload(#[from] JsonRejection),
    #[error("invalid signup timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),
    #[error("request to Telegram failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Telegram rejected the message")]
    Rejected(Value),
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let body = match &self {
            NotifyError::MissingConfig => json!({ "error": "Missing Telegram configuration" }),
            NotifyError::Rejected(details) => json!({
                "error": "Failed to send Telegram notification",
                "details": details,
            }),
            _ => json!({ "error": "Internal server error" }),
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(api_base: &str, bot_token: Option<String>, chat_id: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_base: api_base.trim_end_matches('/').to_string(),
            bot_token,
            chat_id,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    pub async fn send(&self, text: &str) -> Result<(), NotifyError> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            return Err(NotifyError::MissingConfig);
        };
        let url = format!("{}/bot{}/sendMessage", self.api_base, token);
        let response = self
            .client
            .post(url)
            .json(&SendMessage {
                chat_id,
                text,
                parse_mode: "Markdown",
            })
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        if !status.is_success() {
            error!("Telegram API error ({}): {}", status, body);
            return Err(NotifyError::Rejected(body));
        }
        Ok(())
    }
}

/// Renders a database timestamp like `Jan 5, 2026, 3:04 PM` in UTC.
pub fn format_timestamp(created_at: &str) -> Result<String, NotifyError> {
    let utc = match DateTime::parse_from_rfc3339(created_at) {
        Ok(dt) => dt.with_timezone(&Utc),
        Err(_) => NaiveDateTime::parse_from_str(created_at, "%Y-%m-%dT%H:%M:%S%.f")?.and_utc(),
    };
    Ok(utc.format("%b %-d, %Y, %-I:%M %p").to_string())
}

pub fn format_message(email: &str, created_at: &str) -> Result<String, NotifyError> {
    let timestamp = format_timestamp(created_at)?;
    Ok(format!(
        "🎿 *New SkiGenius Signup!*\n\n\
         📧 Email: `{email}`\n\
         🕐 Time: {timestamp} UTC\n\
         📍 Source: Landing Page\n\n\
         Total signups growing! 🚀"
    ))
}

pub async fn handle_notify(
    State(state): State<AppState>,
    payload: Result<Json<WebhookPayload>, JsonRejection>,
) -> Result<Json<Value>, NotifyError> {
    if !state.notifier.is_configured() {
        error!("Missing TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID");
        return Err(NotifyError::MissingConfig);
    }

    let Json(payload) = payload.map_err(|e| {
        error!("Error processing webhook: {}", e);
        NotifyError::from(e)
    })?;

    if payload.event_type != "INSERT" {
        debug!(
            "Ignoring {} on {}.{}",
            payload.event_type, payload.schema, payload.table
        );
        return Ok(Json(json!({ "message": "Ignored non-INSERT event" })));
    }

    let record = payload.record;
    let message = format_message(&record.email, &record.created_at)?;
    state.notifier.send(&message).await?;
    info!("Notification sent for signup {}", record.id);

    Ok(Json(json!({ "success": true, "email": record.email })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_render_in_utc() {
        assert_eq!(
            format_timestamp("2026-01-05T15:04:59.123456+00:00").unwrap(),
            "Jan 5, 2026, 3:04 PM"
        );
        assert_eq!(
            format_timestamp("2026-01-05T01:30:00+02:00").unwrap(),
            "Jan 4, 2026, 11:30 PM"
        );
        assert_eq!(
            format_timestamp("2025-12-24T00:07:00.5").unwrap(),
            "Dec 24, 2025, 12:07 AM"
        );
    }

    #[test]
    fn garbage_timestamps_are_errors() {
        assert!(matches!(
            format_timestamp("yesterday"),
            Err(NotifyError::Timestamp(_))
        ));
    }

    #[test]
    fn message_mentions_email_and_time() {
        let message = format_message("a@b.co", "2026-01-05T15:04:00Z").unwrap();
        assert!(message.starts_with("🎿 *New SkiGenius Signup!*"));
        assert!(message.contains("📧 Email: `a@b.co`"));
        assert!(message.contains("🕐 Time: Jan 5, 2026, 3:04 PM UTC"));
        assert!(message.ends_with("Total signups growing! 🚀"));
    }

    #[tokio::test]
    async fn unconfigured_notifier_refuses_to_send() {
        let notifier = TelegramNotifier::new("http://127.0.0.1:9", None, Some("1".into()));
        assert!(!notifier.is_configured());
        assert!(matches!(
            notifier.send("hi").await,
            Err(NotifyError::MissingConfig)
        ));
    }
}
