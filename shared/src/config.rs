use std::time::Duration;

use secrecy::SecretString;
use tracing::warn;

pub const CLIENT_ID_ENV: &str = "SLACK_CLIENT_ID";
pub const CLIENT_SECRET_ENV: &str = "SLACK_CLIENT_SECRET";
pub const BOT_SCOPES_ENV: &str = "SLACK_BOT_SCOPES";
pub const USER_SCOPES_ENV: &str = "SLACK_USER_SCOPES";

pub const CALLBACK_PATH: &str = "/code-ack";
pub const AUTH_SCOPE_TIMEOUT: Duration = Duration::from_secs(60);

/// Bot scopes needed to read tagged messages.
pub const DEFAULT_BOT_SCOPES: &[&str] = &[
    "channels:history",
    "groups:history",
    "im:history",
    "mpim:history",
    "reactions:read",
];

pub const DEFAULT_USER_SCOPES: &[&str] = &["users:read", "users:read.email", "users.profile:read"];

/// Slack app settings. The secret is only ever held in memory.
#[derive(Clone, Debug)]
pub struct SlackConfig {
    pub client_id: String,
    pub client_secret: Option<SecretString>,
    pub bot_scopes: Vec<String>,
    pub user_scopes: Vec<String>,
    pub callback_path: String,
    pub auth_timeout: Duration,
}

impl Default for SlackConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: None,
            bot_scopes: to_owned(DEFAULT_BOT_SCOPES),
            user_scopes: to_owned(DEFAULT_USER_SCOPES),
            callback_path: CALLBACK_PATH.into(),
            auth_timeout: AUTH_SCOPE_TIMEOUT,
        }
    }
}

impl SlackConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();

        match get(CLIENT_ID_ENV) {
            Some(id) => config.client_id = id,
            None => warn!(var = CLIENT_ID_ENV, "slack client id not set"),
        }
        config.client_secret = get(CLIENT_SECRET_ENV).map(SecretString::new);
        if let Some(scopes) = get(BOT_SCOPES_ENV) {
            config.bot_scopes = split_scopes(&scopes);
        }
        if let Some(scopes) = get(USER_SCOPES_ENV) {
            config.user_scopes = split_scopes(&scopes);
        }
        config
    }

    #[must_use]
    pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
        self.client_secret = Some(SecretString::new(secret.into()));
        self
    }
}

fn to_owned(scopes: &[&str]) -> Vec<String> {
    scopes.iter().map(|s| (*s).to_owned()).collect()
}

fn split_scopes(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
