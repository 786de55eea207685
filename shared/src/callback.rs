//! Handling for the OAuth redirect target, `GET /code-ack?code=...`.
//!
//! Shells run the actual listener; they hand the query string to
//! [`handle_code_ack`] and answer with the returned status and body, then push
//! `outcome` into the authorization status stream.

use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::error::AccountError;
use crate::event::AuthorizationStatus;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct CallbackReply {
    pub status: u16,
    pub body: String,
    pub outcome: AuthorizationStatus,
}

impl CallbackReply {
    /// For shells that fail while forwarding a received code.
    pub fn internal_error(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            status: 500,
            body: format!("Sign-in could not be completed: {message}"),
            outcome: AuthorizationStatus::Failure {
                error: AccountError::Callback { message },
            },
        }
    }
}

#[must_use]
pub fn handle_code_ack(query: &str) -> CallbackReply {
    let query = query.trim_start_matches('?');
    let mut code = None;
    let mut error = None;
    for (key, value) in form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "code" if !value.is_empty() => code = Some(value.into_owned()),
            "error" if !value.is_empty() => error = Some(value.into_owned()),
            _ => {}
        }
    }

    match (code, error) {
        (Some(code), _) => CallbackReply {
            status: 200,
            body: format!("Signed in. You can close this window. ({code})"),
            outcome: AuthorizationStatus::Success { code },
        },
        (None, Some(reason)) => CallbackReply {
            status: 400,
            body: format!("Sign-in was not approved: {reason}"),
            outcome: AuthorizationStatus::Failure {
                error: AccountError::AccessDenied { reason },
            },
        },
        (None, None) => CallbackReply {
            status: 400,
            body: "Missing authorization code".into(),
            outcome: AuthorizationStatus::Failure {
                error: AccountError::MissingCode,
            },
        },
    }
}
