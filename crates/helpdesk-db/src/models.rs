use helpdesk_types::models::Message;

/// Database row types — these map directly to SQLite rows.
/// Distinct from helpdesk-types API models to keep the DB layer independent.
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: i64,
    pub userid: i64,
    pub timestamp: String,
    pub message_body: String,
    pub response: Option<String>,
}

/// A message that has not been stored yet.
#[derive(Debug, Clone)]
pub struct NewMessage {
    pub userid: i64,
    pub timestamp: String,
    pub message_body: String,
}

impl From<MessageRow> for Message {
    fn from(row: MessageRow) -> Self {
        Message {
            id: row.id,
            user_id: row.userid,
            timestamp: row.timestamp,
            message_body: row.message_body,
            response: row.response,
        }
    }
}
