use serde::{Deserialize, Serialize};

use crate::error::AccountError;
use crate::model::{AvatarImage, Credentials, Epoch, UserInfo};
use crate::slack::SlackProfile;

/// Lifecycle of the local callback route.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "route", rename_all = "snake_case")]
pub enum Route {
    Init,
    Started,
    /// The callback server is reachable from the internet at `url`.
    Exposed { url: String },
}

/// Status reported by the shell while it waits for the OAuth redirect.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AuthorizationStatus {
    Requested,
    Route(Route),
    Success { code: String },
    Failure { error: AccountError },
}

impl AuthorizationStatus {
    /// The shell closes the status stream after a terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Failure { .. })
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Route(Route::Init) => "route_init",
            Self::Route(Route::Started) => "route_started",
            Self::Route(Route::Exposed { .. }) => "route_exposed",
            Self::Success { .. } => "success",
            Self::Failure { .. } => "failure",
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum Event {
    // Shell initiated
    Startup,
    SignIn,
    SignInCancel,
    SignOut,
    Refresh,
    /// Window close: save what can be saved.
    Persist,
    Reset,

    // Capability responses
    #[serde(skip)]
    Restored {
        epoch: Epoch,
        result: Result<Option<String>, AccountError>,
    },
    #[serde(skip)]
    AuthStatus {
        epoch: Epoch,
        status: AuthorizationStatus,
    },
    #[serde(skip)]
    AccessToken {
        epoch: Epoch,
        result: Result<Credentials, AccountError>,
    },
    #[serde(skip)]
    ProfileFetched {
        epoch: Epoch,
        result: Result<SlackProfile, AccountError>,
    },
    #[serde(skip)]
    UserInfo {
        epoch: Epoch,
        result: Result<UserInfo, AccountError>,
    },
    #[serde(skip)]
    FetchedUserImage {
        epoch: Epoch,
        result: Box<Result<AvatarImage, AccountError>>,
    },
    #[serde(skip)]
    TokenRevoked(Result<(), AccountError>),
    #[serde(skip)]
    Stored(Result<(), AccountError>),
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Startup => "startup",
            Self::SignIn => "sign_in",
            Self::SignInCancel => "sign_in_cancel",
            Self::SignOut => "sign_out",
            Self::Refresh => "refresh",
            Self::Persist => "persist",
            Self::Reset => "reset",
            Self::Restored { .. } => "restored",
            Self::AuthStatus { .. } => "auth_status",
            Self::AccessToken { .. } => "access_token",
            Self::ProfileFetched { .. } => "profile_fetched",
            Self::UserInfo { .. } => "user_info",
            Self::FetchedUserImage { .. } => "fetched_user_image",
            Self::TokenRevoked(_) => "token_revoked",
            Self::Stored(_) => "stored",
        }
    }

    /// Epoch of the flow that produced this result, if it belongs to one.
    #[must_use]
    pub const fn epoch(&self) -> Option<Epoch> {
        match self {
            Self::Restored { epoch, .. }
            | Self::AuthStatus { epoch, .. }
            | Self::AccessToken { epoch, .. }
            | Self::ProfileFetched { epoch, .. }
            | Self::UserInfo { epoch, .. }
            | Self::FetchedUserImage { epoch, .. } => Some(*epoch),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::SignIn | Self::SignInCancel | Self::SignOut | Self::Refresh | Self::Reset
        )
    }
}
