use std::error::Error as StdError;

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

use crate::auth::ValidationError;

/// Shown when a rejection carries no usable message.
pub const GENERIC_REJECTION_MESSAGE: &str = "Unable to sign in.";

/// Shown when a transport failure has no description.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "Unexpected error.";

/// Body fields that may carry a human-readable message, in lookup order.
const MESSAGE_FIELDS: [&str; 2] = ["detail", "message"];

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{message}")]
    RemoteRejection { status: u16, message: String },

    #[error("Invalid response: missing access_token.")]
    MalformedResponse,

    #[error("{0}")]
    Transport(String),

    #[error("Could not save the session: {0}")]
    Storage(String),
}

impl LoginError {
    /// Build a rejection from a non-success response.
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = extract_message(body).unwrap_or_else(|| GENERIC_REJECTION_MESSAGE.to_string());
        LoginError::RemoteRejection {
            status: status.as_u16(),
            message,
        }
    }

    /// Top-level description plus the innermost cause, so a refused
    /// connection, DNS failure and timeout read differently.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        LoginError::Transport(describe_chain(err))
    }

    /// Text for the form's inline error element. Never empty.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }

    /// Short label for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            LoginError::Validation(_) => "validation",
            LoginError::RemoteRejection { .. } => "remote_rejection",
            LoginError::MalformedResponse => "malformed_response",
            LoginError::Transport(_) => "transport",
            LoginError::Storage(_) => "storage",
        }
    }
}

/// First non-blank string among [`MESSAGE_FIELDS`] in a JSON object body.
/// Non-JSON bodies, non-object JSON and non-string fields yield `None`.
pub fn extract_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;
    MESSAGE_FIELDS
        .iter()
        .filter_map(|field| object.get(*field))
        .filter_map(Value::as_str)
        .find(|text| !text.trim().is_empty())
        .map(str::to_string)
}

fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let top = err.to_string();
    let mut root = err;
    let mut depth = 0;
    while let Some(source) = root.source() {
        root = source;
        depth += 1;
    }
    let cause = root.to_string();
    if depth == 0 || cause.is_empty() || top.contains(&cause) {
        top
    } else if top.is_empty() {
        cause
    } else {
        format!("{}: {}", top, cause)
    }
}

/// Truncate a response body to avoid logging excessive data
pub(crate) fn truncate_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let mut end = MAX_ERROR_BODY_LENGTH;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
}
