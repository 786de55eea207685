use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::Zeroize;

use crate::error::AccountError;

/// Slack bearer token. Redacts `Debug`, zeroizes on drop.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl Drop for Token {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub bot_token: Token,
    pub user_token: Token,
    pub user_id: UserId,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    Active,
    Away,
    #[default]
    Unknown,
}

impl Presence {
    /// Maps Slack's `users.getPresence` value.
    #[must_use]
    pub fn from_wire(s: &str) -> Self {
        match s {
            "active" => Self::Active,
            "away" => Self::Away,
            _ => Self::Unknown,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: UserId,
    pub image: String,
    pub name: String,
    pub real_name: String,
    pub email: String,
    pub presence: Presence,
}

/// Decoded, down-scaled avatar, PNG encoded for the shell.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvatarImage {
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

impl fmt::Debug for AvatarImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvatarImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("png_bytes", &self.png.len())
            .finish()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Account {
    #[default]
    Blank,
    Pending {
        redirect_uri: Option<String>,
    },
    Invalid {
        error: AccountError,
    },
    Authorized {
        credentials: Credentials,
    },
    Retrieved {
        credentials: Credentials,
        id: UserId,
        image: String,
        /// Filled in by the avatar download; never persisted.
        #[serde(skip)]
        image_buffer: Option<AvatarImage>,
        name: String,
        real_name: String,
        email: String,
        presence: Presence,
    },
}

impl Account {
    #[must_use]
    pub const fn state_name(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Pending { .. } => "pending",
            Self::Invalid { .. } => "invalid",
            Self::Authorized { .. } => "authorized",
            Self::Retrieved { .. } => "retrieved",
        }
    }

    pub fn retrieved(credentials: Credentials, info: UserInfo) -> Self {
        Self::Retrieved {
            credentials,
            id: info.id,
            image: info.image,
            image_buffer: None,
            name: info.name,
            real_name: info.real_name,
            email: info.email,
            presence: info.presence,
        }
    }

    /// The part of the account worth keeping across sessions.
    #[must_use]
    pub fn persistable(&self) -> Self {
        match self {
            Self::Authorized { .. } | Self::Retrieved { .. } => self.clone(),
            _ => Self::Blank,
        }
    }
}

/// Generation counter for in-flight work. Results tagged with an older epoch
/// belong to a cancelled flow and are dropped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Epoch(pub u64);

impl Epoch {
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for Epoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Model {
    pub account: Account,
    pub epoch: Epoch,
}

impl Model {
    pub fn new(account: Account) -> Self {
        Self {
            account,
            epoch: Epoch::default(),
        }
    }
}

pub fn encode_account(account: &Account) -> Result<String, AccountError> {
    serde_json::to_string(account).map_err(|e| AccountError::storage(e.to_string()))
}

pub fn decode_account(blob: &str) -> Result<Account, AccountError> {
    serde_json::from_str(blob).map_err(|e| AccountError::storage(e.to_string()))
}
