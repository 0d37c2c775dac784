//! Form bodies posted by the HTML views, and their validation.
//!
//! Every field deserializes to a string (missing fields become empty) so that
//! extraction never fails and validation can report all problems at once.

use serde::{Deserialize, Serialize};

/// Longest username the user table accepts.
pub const MAX_USERNAME_LEN: usize = 50;

const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Turn a raw form into its checked value, or every field error found.
pub trait Validate {
    type Valid;

    fn validate(&self) -> Result<Self::Valid, Vec<FieldError>>;
}

/// Messages for one field, in the order they were reported.
pub fn errors_for<'a>(errors: &'a [FieldError], field: &'a str) -> impl Iterator<Item = &'a str> {
    errors
        .iter()
        .filter(move |e| e.field == field)
        .map(|e| e.message.as_str())
}

fn required<'a>(field: &'static str, value: &'a str, errors: &mut Vec<FieldError>) -> Option<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        errors.push(FieldError::new(field, REQUIRED));
        return None;
    }
    Some(trimmed)
}

fn customer_id(field: &'static str, value: &str, errors: &mut Vec<FieldError>) -> Option<i64> {
    let raw = required(field, value, errors)?;
    match raw.parse() {
        Ok(id) => Some(id),
        Err(_) => {
            errors.push(FieldError::new(field, "User ID must be a whole number."));
            None
        }
    }
}

fn finish<T>(value: Option<T>, errors: Vec<FieldError>) -> Result<T, Vec<FieldError>> {
    match value {
        Some(v) if errors.is_empty() => Ok(v),
        _ => Err(errors),
    }
}

// -- Send --

#[derive(Debug, Default, Deserialize)]
pub struct SendMessageForm {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub message_body: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct SendMessage {
    pub user_id: i64,
    pub message_body: String,
}

impl Validate for SendMessageForm {
    type Valid = SendMessage;

    fn validate(&self) -> Result<SendMessage, Vec<FieldError>> {
        let mut errors = Vec::new();
        let user_id = customer_id("user_id", &self.user_id, &mut errors);
        let body = required("message_body", &self.message_body, &mut errors);
        let valid = user_id.zip(body).map(|(user_id, body)| SendMessage {
            user_id,
            message_body: body.to_string(),
        });
        finish(valid, errors)
    }
}

// -- Receive --

#[derive(Debug, Default, Deserialize)]
pub struct ReceiveMessageForm {
    #[serde(default)]
    pub user_id: String,
}

impl Validate for ReceiveMessageForm {
    type Valid = i64;

    fn validate(&self) -> Result<i64, Vec<FieldError>> {
        let mut errors = Vec::new();
        let user_id = customer_id("user_id", &self.user_id, &mut errors);
        finish(user_id, errors)
    }
}

// -- Search --

#[derive(Debug, Default, Deserialize)]
pub struct SearchForm {
    #[serde(default)]
    pub keyword: String,
}

impl Validate for SearchForm {
    type Valid = String;

    fn validate(&self) -> Result<String, Vec<FieldError>> {
        let mut errors = Vec::new();
        let keyword = required("keyword", &self.keyword, &mut errors).map(str::to_string);
        finish(keyword, errors)
    }
}

// -- Respond --

#[derive(Debug, Default, Deserialize)]
pub struct RespondForm {
    #[serde(default)]
    pub response: String,
}

impl Validate for RespondForm {
    type Valid = String;

    fn validate(&self) -> Result<String, Vec<FieldError>> {
        let mut errors = Vec::new();
        let response = required("response", &self.response, &mut errors).map(str::to_string);
        finish(response, errors)
    }
}

// -- Auth --

/// Shared by the login and registration forms.
#[derive(Debug, Default, Deserialize)]
pub struct CredentialsForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Validate for CredentialsForm {
    type Valid = Credentials;

    fn validate(&self) -> Result<Credentials, Vec<FieldError>> {
        let mut errors = Vec::new();
        let username = required("username", &self.username, &mut errors);
        if let Some(name) = username {
            if name.chars().count() > MAX_USERNAME_LEN {
                errors.push(FieldError::new(
                    "username",
                    format!("Username must be at most {MAX_USERNAME_LEN} characters."),
                ));
            }
        }
        // Passwords are taken as typed; only emptiness is checked.
        if self.password.is_empty() {
            errors.push(FieldError::new("password", REQUIRED));
        }
        let valid = username.map(|name| Credentials {
            username: name.to_string(),
            password: self.password.clone(),
        });
        finish(valid, errors)
    }
}
