use serde::{Deserialize, Serialize};

// -- Session --

/// Claims carried in the signed session cookie. `sub` is the agent's user id
/// in decimal form (JWT subjects are strings).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub username: String,
    pub exp: usize,
}

// -- Customer API --

/// Keys every customer API payload must carry.
pub const REQUIRED_MESSAGE_KEYS: &[&str] = &["user_id", "message_body"];

/// Body of `POST /api/message`. The timestamp is stored verbatim when given.
#[derive(Debug, Deserialize)]
pub struct NewMessageRequest {
    pub user_id: i64,
    pub message_body: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of `POST /api/send_message`.
#[derive(Debug, Deserialize)]
pub struct OutboundMessageRequest {
    pub user_id: i64,
    pub message_body: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub message: String,
}

impl StatusResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
