use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Http,
    SlackApi,
    Decode,
    Configuration,
    Authorization,
    Timeout,
    Tunnel,
    Image,
    Storage,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Http => "HTTP_ERROR",
            Self::SlackApi => "SLACK_API_ERROR",
            Self::Decode => "DECODE_ERROR",
            Self::Configuration => "CONFIG_ERROR",
            Self::Authorization => "AUTH_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::Tunnel => "TUNNEL_ERROR",
            Self::Image => "IMAGE_ERROR",
            Self::Storage => "STORAGE_ERROR",
        }
    }

    /// Whether signing in again has a reasonable chance of succeeding.
    /// Nothing is retried automatically.
    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Http | Self::Timeout | Self::Tunnel | Self::Storage
        )
    }
}

/// Recoverable failures. These end up in `Account::Invalid`, or are logged
/// and dropped when the model can stay where it is.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AccountError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("unexpected HTTP status {status}")]
    Http { status: u16 },

    #[error("slack {method} failed: {code}")]
    Slack { method: String, code: String },

    #[error("malformed response: {message}")]
    Decode { message: String },

    #[error("SLACK_CLIENT_SECRET is not set")]
    MissingClientSecret,

    #[error("authorization denied: {reason}")]
    AccessDenied { reason: String },

    #[error("authorization callback carried no code")]
    MissingCode,

    #[error("no authorization callback within {secs}s")]
    Timeout { secs: u64 },

    #[error("tunnel failed: {message}")]
    Tunnel { message: String },

    #[error("callback server failed: {message}")]
    Callback { message: String },

    #[error("avatar could not be decoded: {message}")]
    Image { message: String },

    #[error("storage error: {message}")]
    Storage { message: String },
}

impl AccountError {
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    pub fn slack(method: impl Into<String>, code: impl Into<String>) -> Self {
        Self::Slack {
            method: method.into(),
            code: code.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::Http { .. } => ErrorKind::Http,
            Self::Slack { .. } => ErrorKind::SlackApi,
            Self::Decode { .. } => ErrorKind::Decode,
            Self::MissingClientSecret => ErrorKind::Configuration,
            Self::AccessDenied { .. } | Self::MissingCode | Self::Callback { .. } => {
                ErrorKind::Authorization
            }
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Tunnel { .. } => ErrorKind::Tunnel,
            Self::Image { .. } => ErrorKind::Image,
            Self::Storage { .. } => ErrorKind::Storage,
        }
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind().code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self {
            Self::Network { .. } | Self::Http { .. } => {
                "Unable to reach Slack. Please check your connection and sign in again.".into()
            }
            Self::Slack { code, .. } => format!("Slack rejected the request ({code})."),
            Self::Decode { .. } => "Slack sent a response we could not read.".into(),
            Self::MissingClientSecret => {
                "The Slack client secret is not configured (SLACK_CLIENT_SECRET).".into()
            }
            Self::AccessDenied { .. } => "Access to Slack was not granted.".into(),
            Self::MissingCode | Self::Callback { .. } => {
                "The sign-in callback could not be processed. Please try again.".into()
            }
            Self::Timeout { .. } => "Sign-in timed out. Please try again.".into(),
            Self::Tunnel { .. } => "Could not open the sign-in tunnel. Please try again.".into(),
            Self::Image { .. } => "The profile picture could not be loaded.".into(),
            Self::Storage { .. } => "Saved account data could not be accessed.".into(),
        }
    }
}

/// An event arrived that the current account state does not accept. This is a
/// programming error in the shell or the core, not a runtime condition.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IllegalState {
    #[error("event `{event}` is not valid while the account is `{state}`")]
    UnexpectedEvent {
        event: &'static str,
        state: &'static str,
    },

    #[error("authorization code received before the redirect URI was known")]
    MissingRedirectUri,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_classify_retryability() {
        assert!(AccountError::network("reset").is_retryable());
        assert!(AccountError::Timeout { secs: 60 }.is_retryable());
        assert!(!AccountError::MissingClientSecret.is_retryable());
        assert!(!AccountError::slack("oauth.v2.access", "invalid_code").is_retryable());
    }

    #[test]
    fn codes_are_stable() {
        assert_eq!(AccountError::MissingCode.code(), "AUTH_ERROR");
        assert_eq!(AccountError::decode("eof").code(), "DECODE_ERROR");
    }

    #[test]
    fn errors_serialize_with_kind_tag() {
        let json = serde_json::to_string(&AccountError::Http { status: 502 }).unwrap();
        assert_eq!(json, r#"{"kind":"http","status":502}"#);
        let back: AccountError = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AccountError::Http { status: 502 });
    }

    #[test]
    fn illegal_state_names_event_and_state() {
        let err = IllegalState::UnexpectedEvent {
            event: "sign_out",
            state: "blank",
        };
        assert_eq!(
            err.to_string(),
            "event `sign_out` is not valid while the account is `blank`"
        );
    }
}
