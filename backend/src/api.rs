use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Row-change event posted by the database when the signup table changes.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(rename = "type")]
    pub event_type: String,
    pub table: String,
    pub record: SignupRecord,
    pub schema: String,
    pub old_record: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct SignupRecord {
    pub id: String,
    pub email: String,
    pub created_at: String,
    pub source: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessage<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
}
