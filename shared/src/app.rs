use crux_http::http::{Method, Url};
use tracing::{debug, error, info, warn};

use crate::avatar::decode_avatar;
use crate::capabilities::Capabilities;
use crate::config::SlackConfig;
use crate::error::AccountError;
use crate::event::Event;
use crate::machine::{self, Action};
use crate::model::{Credentials, Epoch, Model, Token};
use crate::slack::{self, AccessRequest, SlackProfile};
use crate::view::ViewModel;

/// Key of the single persisted account blob.
pub const STORAGE_KEY: &str = "account";

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

pub struct App {
    config: SlackConfig,
}

impl Default for App {
    fn default() -> Self {
        Self::new(SlackConfig::from_env())
    }
}

impl App {
    #[must_use]
    pub fn new(config: SlackConfig) -> Self {
        Self { config }
    }

    fn perform(&self, action: Action, caps: &Capabilities) {
        match action {
            Action::LoadAccount { epoch } => {
                caps.kv.get(STORAGE_KEY, move |result| Event::Restored {
                    epoch,
                    result: result
                        .map(|value| value.map(|bytes| String::from_utf8_lossy(&bytes).into_owned()))
                        .map_err(|e| AccountError::storage(e.to_string())),
                });
            }
            Action::StoreAccount { blob } => {
                caps.kv.set(STORAGE_KEY, blob.into_bytes(), |result| {
                    Event::Stored(result.map_err(|e| AccountError::storage(e.to_string())))
                });
            }
            Action::ClearAccount => {
                caps.kv.delete(STORAGE_KEY, |result| {
                    Event::Stored(result.map_err(|e| AccountError::storage(e.to_string())))
                });
            }
            Action::RequestAuthScopes { epoch } => {
                caps.login.request_auth_scopes(
                    self.config.callback_path.clone(),
                    self.config.auth_timeout.as_secs(),
                    move |status| Event::AuthStatus { epoch, status },
                );
            }
            Action::OpenBrowser { url } => caps.login.open_browser(url),
            Action::TearDownLogin => caps.login.tear_down(),
            Action::ExchangeCode { epoch, request } => Self::exchange_code(epoch, &request, caps),
            Action::FetchProfile { epoch, credentials } => {
                Self::fetch_profile(epoch, &credentials, caps);
            }
            Action::FetchPresence {
                epoch,
                credentials,
                profile,
            } => Self::fetch_presence(epoch, &credentials, profile, caps),
            Action::FetchAvatar { epoch, url } => Self::fetch_avatar(epoch, &url, caps),
            Action::Revoke { token } => Self::revoke(&token, caps),
            Action::Render => caps.render.render(),
        }
    }

    fn exchange_code(epoch: Epoch, request: &AccessRequest, caps: &Capabilities) {
        caps.http
            .post(slack::method_url(slack::OAUTH_ACCESS))
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body_string(slack::access_request_body(request))
            .send(move |result| Event::AccessToken {
                epoch,
                result: slack::response_body(result).and_then(|body| slack::parse_access(&body)),
            });
    }

    fn fetch_profile(epoch: Epoch, credentials: &Credentials, caps: &Capabilities) {
        caps.http
            .get(slack::users_info_url(&credentials.user_id))
            .header("Authorization", slack::bearer(&credentials.user_token).as_str())
            .send(move |result| Event::ProfileFetched {
                epoch,
                result: slack::response_body(result).and_then(|body| slack::parse_profile(&body)),
            });
    }

    fn fetch_presence(
        epoch: Epoch,
        credentials: &Credentials,
        profile: SlackProfile,
        caps: &Capabilities,
    ) {
        caps.http
            .get(slack::presence_url(&credentials.user_id))
            .header("Authorization", slack::bearer(&credentials.user_token).as_str())
            .send(move |result| Event::UserInfo {
                epoch,
                result: slack::response_body(result)
                    .and_then(|body| slack::parse_presence(&body))
                    .map(|presence| profile.with_presence(presence)),
            });
    }

    fn fetch_avatar(epoch: Epoch, url: &str, caps: &Capabilities) {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(error) => {
                warn!(%error, "profile image URL is malformed, skipping avatar");
                return;
            }
        };
        caps.http
            .request(Method::Get, url)
            .send(move |result| Event::FetchedUserImage {
                epoch,
                result: Box::new(
                    slack::response_body(result).and_then(|body| decode_avatar(&body)),
                ),
            });
    }

    fn revoke(token: &Token, caps: &Capabilities) {
        caps.http
            .post(slack::method_url(slack::AUTH_REVOKE))
            .header("Authorization", slack::bearer(token).as_str())
            .send(|result| {
                Event::TokenRevoked(
                    slack::response_body(result).and_then(|body| slack::parse_revoke(&body)),
                )
            });
    }
}

impl crux_core::App for App {
    type Event = Event;
    type Model = Model;
    type ViewModel = ViewModel;
    type Capabilities = Capabilities;

    fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
        let event_name = event.name();
        let from = model.account.state_name();
        if event.is_user_initiated() {
            info!(event = event_name, state = from, "user action");
        }

        let next = match machine::next(model, event, &self.config) {
            Ok(next) => next,
            Err(illegal) => {
                error!(event = event_name, state = from, %illegal, "illegal account transition");
                panic!("{illegal}");
            }
        };

        model.account = next.account;
        if model.epoch != next.epoch {
            debug!(from = %model.epoch, to = %next.epoch, "flow epoch rotated");
            model.epoch = next.epoch;
        }
        let to = model.account.state_name();
        if from != to {
            info!(event = event_name, from, to, epoch = %model.epoch, "account transition");
        }

        for action in next.actions {
            self.perform(action, caps);
        }
    }

    fn view(&self, model: &Model) -> ViewModel {
        ViewModel::from(model)
    }
}
