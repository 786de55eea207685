use serde::{Deserialize, Serialize};

use crate::model::{Account, AvatarImage, Model, Presence};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AccountView {
    SignedOut,
    SigningIn {
        /// The authorize page has been opened and we wait for the redirect.
        awaiting_browser: bool,
    },
    Failed {
        message: String,
        code: String,
        retryable: bool,
    },
    Loading {
        user_id: String,
    },
    Profile {
        id: String,
        name: String,
        real_name: String,
        email: String,
        presence: Presence,
        image_url: String,
        avatar: Option<AvatarImage>,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct ViewModel {
    pub account: AccountView,
    pub can_sign_in: bool,
    pub can_cancel: bool,
    pub can_sign_out: bool,
    pub can_refresh: bool,
    pub can_reset: bool,
}

impl From<&Model> for ViewModel {
    fn from(model: &Model) -> Self {
        let account = match &model.account {
            Account::Blank => AccountView::SignedOut,
            Account::Pending { redirect_uri } => AccountView::SigningIn {
                awaiting_browser: redirect_uri.is_some(),
            },
            Account::Invalid { error } => AccountView::Failed {
                message: error.user_facing_message(),
                code: error.code().to_owned(),
                retryable: error.is_retryable(),
            },
            Account::Authorized { credentials } => AccountView::Loading {
                user_id: credentials.user_id.to_string(),
            },
            Account::Retrieved {
                id,
                image,
                image_buffer,
                name,
                real_name,
                email,
                presence,
                ..
            } => AccountView::Profile {
                id: id.to_string(),
                name: name.clone(),
                real_name: real_name.clone(),
                email: email.clone(),
                presence: *presence,
                image_url: image.clone(),
                avatar: image_buffer.clone(),
            },
        };

        let state = &model.account;
        Self {
            account,
            can_sign_in: matches!(state, Account::Blank | Account::Invalid { .. }),
            can_cancel: matches!(state, Account::Pending { .. }),
            can_sign_out: matches!(state, Account::Retrieved { .. }),
            can_refresh: matches!(state, Account::Retrieved { .. }),
            can_reset: true,
        }
    }
}
