//! Storage capabilities the handlers rely on, independent of the backend.

use anyhow::Result;

use crate::models::{MessageRow, NewMessage, UserRow};

pub trait UserRepository {
    /// Insert an agent. Returns `None` when the username is already taken.
    fn create_user(&self, username: &str, password_hash: &str) -> Result<Option<i64>>;

    fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>>;
}

pub trait MessageRepository {
    fn insert_message(&self, message: &NewMessage) -> Result<i64>;

    /// Insert all messages or none of them. Returns how many were stored.
    fn insert_messages(&self, messages: &[NewMessage]) -> Result<usize>;

    fn get_message(&self, id: i64) -> Result<Option<MessageRow>>;

    /// Every message, oldest id first.
    fn list_messages(&self) -> Result<Vec<MessageRow>>;

    /// Read-only filter on `userid`. Receiving goes through
    /// `stamp_messages_for_user`, which also rewrites timestamps.
    fn messages_for_user(&self, userid: i64) -> Result<Vec<MessageRow>>;

    /// Case-insensitive substring match on the message body.
    fn search_messages(&self, keyword: &str) -> Result<Vec<MessageRow>>;

    /// Overwrite the timestamp of every message for `userid`, then return them.
    fn stamp_messages_for_user(&self, userid: i64, timestamp: &str) -> Result<Vec<MessageRow>>;

    /// Set the agent response. Returns `false` when no such message exists.
    fn set_response(&self, id: i64, response: &str) -> Result<bool>;
}
