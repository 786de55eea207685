//! The account state machine.
//!
//! [`next`] is pure: given the model and an event it decides the next account
//! and the work the app has to start. The app performs the [`Action`]s through
//! its capabilities; their results come back as events tagged with the epoch
//! that requested them.

use tracing::{debug, info, warn};

use crate::config::SlackConfig;
use crate::error::{AccountError, IllegalState};
use crate::event::{AuthorizationStatus, Event, Route};
use crate::model::{encode_account, Account, Credentials, Epoch, Model, Token};
use crate::slack::{self, AccessRequest, SlackProfile};

#[derive(Clone, Debug)]
pub enum Action {
    LoadAccount { epoch: Epoch },
    StoreAccount { blob: String },
    ClearAccount,
    RequestAuthScopes { epoch: Epoch },
    OpenBrowser { url: String },
    TearDownLogin,
    ExchangeCode { epoch: Epoch, request: AccessRequest },
    FetchProfile { epoch: Epoch, credentials: Credentials },
    FetchPresence {
        epoch: Epoch,
        credentials: Credentials,
        profile: SlackProfile,
    },
    /// Never carries credentials: avatar URLs can point outside Slack.
    FetchAvatar { epoch: Epoch, url: String },
    Revoke { token: Token },
    Render,
}

#[derive(Clone, Debug)]
pub struct Next {
    pub account: Account,
    pub epoch: Epoch,
    pub actions: Vec<Action>,
}

impl Next {
    fn stay(model: &Model, actions: Vec<Action>) -> Self {
        Self {
            account: model.account.clone(),
            epoch: model.epoch,
            actions,
        }
    }

    fn to(account: Account, epoch: Epoch, actions: Vec<Action>) -> Self {
        Self {
            account,
            epoch,
            actions,
        }
    }
}

#[allow(clippy::too_many_lines)]
pub fn next(model: &Model, event: Event, config: &SlackConfig) -> Result<Next, IllegalState> {
    if let Some(epoch) = event.epoch() {
        if epoch != model.epoch {
            debug!(
                event = event.name(),
                %epoch,
                current = %model.epoch,
                "dropping result from cancelled flow"
            );
            return Ok(Next::stay(model, Vec::new()));
        }
    }

    let illegal = IllegalState::UnexpectedEvent {
        event: event.name(),
        state: model.account.state_name(),
    };
    let current = model.epoch;
    let rotated = current.next();

    match (&model.account, event) {
        (Account::Blank, Event::Startup) => Ok(Next::stay(
            model,
            vec![Action::LoadAccount { epoch: current }],
        )),

        (Account::Blank, Event::Restored { result, .. }) => Ok(restore(model, result)),
        (account, Event::Restored { .. }) => {
            warn!(
                state = account.state_name(),
                "stored account arrived after the flow started, ignoring"
            );
            Ok(Next::stay(model, Vec::new()))
        }

        (Account::Blank | Account::Invalid { .. }, Event::SignIn) => Ok(Next::to(
            Account::Pending { redirect_uri: None },
            rotated,
            vec![Action::RequestAuthScopes { epoch: rotated }, Action::Render],
        )),

        (Account::Pending { redirect_uri }, Event::AuthStatus { status, .. }) => {
            on_auth_status(model, redirect_uri.as_deref(), status, config)
        }

        (Account::Pending { .. }, Event::AccessToken { result, .. }) => Ok(match result {
            Ok(credentials) => Next::to(
                Account::Authorized {
                    credentials: credentials.clone(),
                },
                current,
                vec![
                    Action::FetchProfile {
                        epoch: current,
                        credentials,
                    },
                    Action::Render,
                ],
            ),
            Err(error) => invalid(error, current, vec![Action::Render]),
        }),

        (Account::Authorized { credentials }, Event::ProfileFetched { result, .. }) => {
            Ok(match result {
                Ok(profile) => Next::stay(
                    model,
                    vec![Action::FetchPresence {
                        epoch: current,
                        credentials: credentials.clone(),
                        profile,
                    }],
                ),
                Err(error) => invalid(error, current, vec![Action::Render]),
            })
        }

        (Account::Authorized { credentials }, Event::UserInfo { result, .. }) => Ok(match result {
            Ok(info) => {
                let mut actions = Vec::with_capacity(2);
                if !info.image.is_empty() {
                    actions.push(Action::FetchAvatar {
                        epoch: current,
                        url: info.image.clone(),
                    });
                }
                actions.push(Action::Render);
                Next::to(
                    Account::retrieved(credentials.clone(), info),
                    current,
                    actions,
                )
            }
            Err(error) => invalid(error, current, vec![Action::Render]),
        }),

        (Account::Retrieved { .. }, Event::FetchedUserImage { result, .. }) => match *result {
            Ok(avatar) => {
                let mut account = model.account.clone();
                if let Account::Retrieved { image_buffer, .. } = &mut account {
                    *image_buffer = Some(avatar);
                }
                Ok(Next::to(account, current, vec![Action::Render]))
            }
            Err(error) => {
                warn!(%error, "avatar fetch failed");
                Ok(Next::stay(model, Vec::new()))
            }
        },

        (Account::Retrieved { credentials, .. }, Event::SignOut) => Ok(Next::to(
            Account::Blank,
            rotated,
            vec![
                Action::TearDownLogin,
                Action::Revoke {
                    token: credentials.user_token.clone(),
                },
                Action::Render,
            ],
        )),

        (Account::Retrieved { credentials, .. }, Event::Refresh) => Ok(Next::to(
            Account::Authorized {
                credentials: credentials.clone(),
            },
            rotated,
            vec![
                Action::FetchProfile {
                    epoch: rotated,
                    credentials: credentials.clone(),
                },
                Action::Render,
            ],
        )),

        (_, Event::SignInCancel) => Ok(Next::to(
            Account::Blank,
            rotated,
            vec![Action::TearDownLogin, Action::Render],
        )),

        (account, Event::Persist) => Ok(persist(model, account, rotated)),

        (_, Event::Reset) => Ok(Next::to(
            Account::Blank,
            rotated,
            vec![Action::ClearAccount, Action::TearDownLogin, Action::Render],
        )),

        (_, Event::TokenRevoked(result)) => {
            match result {
                Ok(()) => info!("token revoked"),
                Err(error) => warn!(%error, "token revocation failed"),
            }
            Ok(Next::stay(model, Vec::new()))
        }

        (_, Event::Stored(result)) => {
            match result {
                Ok(()) => debug!("account storage updated"),
                Err(error) => warn!(%error, "account storage failed"),
            }
            Ok(Next::stay(model, Vec::new()))
        }

        _ => Err(illegal),
    }
}

fn on_auth_status(
    model: &Model,
    redirect_uri: Option<&str>,
    status: AuthorizationStatus,
    config: &SlackConfig,
) -> Result<Next, IllegalState> {
    let epoch = model.epoch;
    match status {
        AuthorizationStatus::Requested
        | AuthorizationStatus::Route(Route::Init | Route::Started) => {
            info!(status = status.name(), %epoch, "authorization progress");
            Ok(Next::stay(model, Vec::new()))
        }
        AuthorizationStatus::Route(Route::Exposed { url }) => {
            let redirect_uri = slack::encode_redirect_uri(&url, &config.callback_path);
            let authorize = slack::authorize_url(config, &redirect_uri);
            info!(%url, %epoch, "callback exposed, opening browser");
            Ok(Next::to(
                Account::Pending {
                    redirect_uri: Some(redirect_uri),
                },
                epoch,
                vec![Action::OpenBrowser { url: authorize }, Action::Render],
            ))
        }
        AuthorizationStatus::Success { code } => {
            let redirect_uri = redirect_uri.ok_or(IllegalState::MissingRedirectUri)?;
            let Some(client_secret) = config.client_secret.clone() else {
                warn!("cannot exchange authorization code without a client secret");
                return Ok(invalid(
                    AccountError::MissingClientSecret,
                    epoch,
                    vec![Action::TearDownLogin, Action::Render],
                ));
            };
            let request = AccessRequest {
                code,
                client_id: config.client_id.clone(),
                client_secret,
                redirect_uri: redirect_uri.to_owned(),
            };
            Ok(Next::stay(
                model,
                vec![Action::ExchangeCode { epoch, request }],
            ))
        }
        AuthorizationStatus::Failure { error } => Ok(invalid(
            error,
            epoch,
            vec![Action::TearDownLogin, Action::Render],
        )),
    }
}

fn restore(model: &Model, result: Result<Option<String>, AccountError>) -> Next {
    let stored = match result {
        Ok(Some(blob)) => match crate::model::decode_account(&blob) {
            Ok(account) => account.persistable(),
            Err(error) => {
                warn!(%error, "stored account is unreadable, starting blank");
                Account::Blank
            }
        },
        Ok(None) => Account::Blank,
        Err(error) => {
            warn!(%error, "stored account could not be loaded, starting blank");
            Account::Blank
        }
    };

    let epoch = model.epoch;
    let mut actions = Vec::with_capacity(2);
    match &stored {
        Account::Authorized { credentials } => actions.push(Action::FetchProfile {
            epoch,
            credentials: credentials.clone(),
        }),
        Account::Retrieved { image, .. } if !image.is_empty() => {
            actions.push(Action::FetchAvatar {
                epoch,
                url: image.clone(),
            });
        }
        _ => {}
    }
    actions.push(Action::Render);
    info!(state = stored.state_name(), "account restored");
    Next::to(stored, epoch, actions)
}

fn persist(model: &Model, account: &Account, rotated: Epoch) -> Next {
    let mut actions = Vec::with_capacity(3);
    match encode_account(&account.persistable()) {
        Ok(blob) => actions.push(Action::StoreAccount { blob }),
        Err(error) => warn!(%error, "account could not be serialized"),
    }

    if matches!(account, Account::Pending { .. }) {
        // A half-finished sign-in cannot be resumed next session.
        actions.insert(0, Action::TearDownLogin);
        actions.push(Action::Render);
        return Next::to(Account::Blank, rotated, actions);
    }
    Next::stay(model, actions)
}

fn invalid(error: AccountError, epoch: Epoch, actions: Vec<Action>) -> Next {
    warn!(%error, code = error.code(), "account flow failed");
    Next::to(Account::Invalid { error }, epoch, actions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{credentials, retrieved, user_info};
    use crate::model::{AvatarImage, Presence, UserId};
    use assert_matches::assert_matches;
    use proptest::prelude::*;

    fn config() -> SlackConfig {
        SlackConfig {
            client_id: "123.456".into(),
            ..SlackConfig::default()
        }
        .with_client_secret("s3cr3t")
    }

    fn model(account: Account) -> Model {
        Model {
            account,
            epoch: Epoch(7),
        }
    }

    fn pending(redirect_uri: Option<&str>) -> Account {
        Account::Pending {
            redirect_uri: redirect_uri.map(str::to_owned),
        }
    }

    fn auth(status: AuthorizationStatus) -> Event {
        Event::AuthStatus {
            epoch: Epoch(7),
            status,
        }
    }

    fn restored(result: Result<Option<String>, AccountError>) -> Event {
        Event::Restored {
            epoch: Epoch(7),
            result,
        }
    }

    fn step(account: Account, event: Event) -> Next {
        next(&model(account), event, &config()).unwrap()
    }

    #[test]
    fn sign_in_from_blank_starts_one_auth_stream() {
        let next = step(Account::Blank, Event::SignIn);
        assert_eq!(next.account, pending(None));
        assert_eq!(next.epoch, Epoch(8));
        let streams = next
            .actions
            .iter()
            .filter(|a| matches!(a, Action::RequestAuthScopes { .. }))
            .count();
        assert_eq!(streams, 1);
        assert_matches!(
            next.actions[0],
            Action::RequestAuthScopes { epoch: Epoch(8) }
        );
    }

    #[test]
    fn sign_in_is_allowed_again_after_failure() {
        let next = step(
            Account::Invalid {
                error: AccountError::MissingCode,
            },
            Event::SignIn,
        );
        assert_eq!(next.account, pending(None));
    }

    #[test]
    fn route_progress_is_only_logged() {
        for status in [
            AuthorizationStatus::Requested,
            AuthorizationStatus::Route(Route::Init),
            AuthorizationStatus::Route(Route::Started),
        ] {
            let next = step(pending(None), auth(status));
            assert_eq!(next.account, pending(None));
            assert!(next.actions.is_empty());
        }
    }

    #[test]
    fn exposed_route_sets_encoded_redirect_and_opens_browser() {
        let next = step(
            pending(None),
            auth(AuthorizationStatus::Route(Route::Exposed {
                url: "https://ab12.ngrok.app".into(),
            })),
        );
        let expected = "https%3A%2F%2Fab12.ngrok.app%2Fcode-ack";
        assert_eq!(next.account, pending(Some(expected)));
        assert_matches!(&next.actions[0], Action::OpenBrowser { url } => {
            assert!(url.starts_with("https://slack.com/oauth/v2/authorize?"));
            assert!(url.ends_with(&format!("&redirect_uri={expected}")));
        });
    }

    #[test]
    fn success_exchanges_code_with_known_redirect() {
        let next = step(
            pending(Some("https%3A%2F%2Fx%2Fcode-ack")),
            auth(AuthorizationStatus::Success {
                code: "abc".into(),
            }),
        );
        assert_eq!(next.account, pending(Some("https%3A%2F%2Fx%2Fcode-ack")));
        assert_matches!(&next.actions[..], [Action::ExchangeCode { epoch: Epoch(7), request }] => {
            assert_eq!(request.code, "abc");
            assert_eq!(request.client_id, "123.456");
            assert_eq!(request.redirect_uri, "https%3A%2F%2Fx%2Fcode-ack");
        });
    }

    #[test]
    fn success_without_redirect_fails_fast() {
        let result = next(
            &model(pending(None)),
            auth(AuthorizationStatus::Success { code: "abc".into() }),
            &config(),
        );
        assert_matches!(result, Err(IllegalState::MissingRedirectUri));
    }

    #[test]
    fn missing_client_secret_is_recoverable() {
        let config = SlackConfig::default();
        let next = next(
            &model(pending(Some("r"))),
            auth(AuthorizationStatus::Success { code: "abc".into() }),
            &config,
        )
        .unwrap();
        assert_eq!(
            next.account,
            Account::Invalid {
                error: AccountError::MissingClientSecret
            }
        );
        assert_matches!(next.actions[0], Action::TearDownLogin);
    }

    #[test]
    fn failure_status_invalidates_and_tears_down() {
        let next = step(
            pending(Some("r")),
            auth(AuthorizationStatus::Failure {
                error: AccountError::Timeout { secs: 60 },
            }),
        );
        assert_eq!(
            next.account,
            Account::Invalid {
                error: AccountError::Timeout { secs: 60 }
            }
        );
        assert_matches!(next.actions[0], Action::TearDownLogin);
    }

    #[test]
    fn access_token_authorizes_and_fetches_profile() {
        let next = step(
            pending(Some("r")),
            Event::AccessToken {
                epoch: Epoch(7),
                result: Ok(credentials()),
            },
        );
        assert_eq!(
            next.account,
            Account::Authorized {
                credentials: credentials()
            }
        );
        assert_matches!(next.actions[0], Action::FetchProfile { epoch: Epoch(7), .. });
    }

    #[test]
    fn access_token_failure_invalidates() {
        let error = AccountError::slack("oauth.v2.access", "invalid_code");
        let next = step(
            pending(Some("r")),
            Event::AccessToken {
                epoch: Epoch(7),
                result: Err(error.clone()),
            },
        );
        assert_eq!(next.account, Account::Invalid { error });
    }

    #[test]
    fn profile_then_presence_then_retrieved() {
        let authorized = Account::Authorized {
            credentials: credentials(),
        };
        let profile = SlackProfile {
            id: UserId::new("U024BE7LH"),
            name: "spengler".into(),
            real_name: "Egon Spengler".into(),
            email: "spengler@ghostbusters.example.com".into(),
            image: "https://avatars.slack-edge.com/u024be7lh_192.png".into(),
        };
        let next = step(
            authorized.clone(),
            Event::ProfileFetched {
                epoch: Epoch(7),
                result: Ok(profile.clone()),
            },
        );
        assert_eq!(next.account, authorized);
        assert_matches!(&next.actions[..], [Action::FetchPresence { profile: p, .. }] => {
            assert_eq!(p, &profile);
        });

        let next = step(
            authorized,
            Event::UserInfo {
                epoch: Epoch(7),
                result: Ok(profile.with_presence(Presence::Active)),
            },
        );
        assert_eq!(next.account, retrieved());
        assert_matches!(&next.actions[0], Action::FetchAvatar { epoch: Epoch(7), url } => {
            assert_eq!(url, "https://avatars.slack-edge.com/u024be7lh_192.png");
        });
    }

    #[test]
    fn user_info_failure_invalidates() {
        let next = step(
            Account::Authorized {
                credentials: credentials(),
            },
            Event::UserInfo {
                epoch: Epoch(7),
                result: Err(AccountError::Http { status: 500 }),
            },
        );
        assert_eq!(
            next.account,
            Account::Invalid {
                error: AccountError::Http { status: 500 }
            }
        );
    }

    #[test]
    fn avatar_fills_buffer_and_failure_keeps_state() {
        let avatar = AvatarImage {
            width: 2,
            height: 2,
            png: vec![0x89],
        };
        let next = step(
            retrieved(),
            Event::FetchedUserImage {
                epoch: Epoch(7),
                result: Box::new(Ok(avatar.clone())),
            },
        );
        assert_matches!(next.account, Account::Retrieved { image_buffer: Some(ref img), .. } => {
            assert_eq!(img, &avatar);
        });

        let next = step(
            retrieved(),
            Event::FetchedUserImage {
                epoch: Epoch(7),
                result: Box::new(Err(AccountError::Http { status: 404 })),
            },
        );
        assert_eq!(next.account, retrieved());
        assert!(next.actions.is_empty());
    }

    #[test]
    fn sign_out_tears_down_and_revokes() {
        let next = step(retrieved(), Event::SignOut);
        assert_eq!(next.account, Account::Blank);
        assert_eq!(next.epoch, Epoch(8));
        assert!(next
            .actions
            .iter()
            .any(|a| matches!(a, Action::TearDownLogin)));
        assert_matches!(&next.actions[1], Action::Revoke { token } => {
            assert_eq!(token.expose(), "xoxp-user");
        });
    }

    #[test]
    fn refresh_goes_back_to_authorized_under_new_epoch() {
        let next = step(retrieved(), Event::Refresh);
        assert_eq!(
            next.account,
            Account::Authorized {
                credentials: credentials()
            }
        );
        assert_matches!(next.actions[0], Action::FetchProfile { epoch: Epoch(8), .. });
    }

    #[test]
    fn cancel_from_any_state_is_blank() {
        for account in [Account::Blank, pending(Some("r")), retrieved()] {
            let next = step(account, Event::SignInCancel);
            assert_eq!(next.account, Account::Blank);
            assert_eq!(next.epoch, Epoch(8));
            assert_matches!(next.actions[0], Action::TearDownLogin);
        }
    }

    #[test]
    fn persisting_while_pending_stores_blank_and_cancels() {
        let next = step(pending(Some("r")), Event::Persist);
        assert_eq!(next.account, Account::Blank);
        assert_eq!(next.epoch, Epoch(8));
        assert_matches!(next.actions[0], Action::TearDownLogin);
        assert_matches!(&next.actions[1], Action::StoreAccount { blob } => {
            assert_eq!(blob, r#"{"state":"blank"}"#);
        });
    }

    #[test]
    fn persisting_retrieved_keeps_model() {
        let next = step(retrieved(), Event::Persist);
        assert_eq!(next.account, retrieved());
        assert_matches!(&next.actions[..], [Action::StoreAccount { blob }] => {
            assert_eq!(crate::model::decode_account(blob).unwrap(), retrieved());
        });
    }

    #[test]
    fn persisting_invalid_stores_blank() {
        let invalid = Account::Invalid {
            error: AccountError::MissingCode,
        };
        let next = step(invalid.clone(), Event::Persist);
        assert_eq!(next.account, invalid);
        assert_matches!(&next.actions[..], [Action::StoreAccount { blob }] => {
            assert_eq!(blob, r#"{"state":"blank"}"#);
        });
    }

    #[test]
    fn reset_clears_storage_and_cancels() {
        let next = step(pending(None), Event::Reset);
        assert_eq!(next.account, Account::Blank);
        assert_matches!(
            &next.actions[..],
            [Action::ClearAccount, Action::TearDownLogin, Action::Render]
        );
    }

    #[test]
    fn stale_results_are_dropped() {
        let next = step(
            Account::Blank,
            Event::AccessToken {
                epoch: Epoch(3),
                result: Ok(credentials()),
            },
        );
        assert_eq!(next.account, Account::Blank);
        assert_eq!(next.epoch, Epoch(7));
        assert!(next.actions.is_empty());
    }

    #[test]
    fn restore_picks_up_stored_account() {
        let blob = encode_account(&retrieved()).unwrap();
        let next = step(Account::Blank, restored(Ok(Some(blob))));
        assert_eq!(next.account, retrieved());
        assert_matches!(next.actions[0], Action::FetchAvatar { .. });

        let blob = encode_account(&Account::Authorized {
            credentials: credentials(),
        })
        .unwrap();
        let next = step(Account::Blank, restored(Ok(Some(blob))));
        assert_matches!(next.actions[0], Action::FetchProfile { .. });
    }

    #[test]
    fn restore_falls_back_to_blank() {
        for result in [
            Ok(None),
            Ok(Some("garbage".to_owned())),
            Ok(Some(r#"{"state":"pending","redirect_uri":null}"#.to_owned())),
            Err(AccountError::storage("locked")),
        ] {
            let next = step(Account::Blank, restored(result));
            assert_eq!(next.account, Account::Blank);
        }
    }

    #[test]
    fn startup_load_is_tagged_with_current_epoch() {
        let next = step(Account::Blank, Event::Startup);
        assert_matches!(&next.actions[..], [Action::LoadAccount { epoch: Epoch(7) }]);
    }

    #[test]
    fn load_started_before_reset_is_dropped() {
        let reset = step(Account::Blank, Event::Reset);
        assert_eq!(reset.epoch, Epoch(8));

        let after_reset = Model {
            account: reset.account,
            epoch: reset.epoch,
        };
        let blob = encode_account(&retrieved()).unwrap();
        let next = next(&after_reset, restored(Ok(Some(blob))), &config()).unwrap();
        assert_eq!(next.account, Account::Blank);
        assert_eq!(next.epoch, Epoch(8));
        assert!(next.actions.is_empty());
    }

    #[test]
    fn late_restore_does_not_clobber_flow() {
        let blob = encode_account(&retrieved()).unwrap();
        let next = step(pending(None), restored(Ok(Some(blob))));
        assert_eq!(next.account, pending(None));
    }

    #[test]
    fn sign_out_from_blank_is_illegal() {
        let result = next(&model(Account::Blank), Event::SignOut, &config());
        assert_eq!(
            result.unwrap_err(),
            IllegalState::UnexpectedEvent {
                event: "sign_out",
                state: "blank",
            }
        );
    }

    /// Events each state accepts. Flow results are tagged with the current
    /// epoch, so they are never dropped as stale.
    fn accepts(account: &Account, event: &Event) -> bool {
        use Account as A;
        use Event as E;
        match event {
            E::SignInCancel
            | E::Persist
            | E::Reset
            | E::TokenRevoked(_)
            | E::Stored(_)
            | E::Restored { .. } => true,
            E::Startup => matches!(account, A::Blank),
            E::SignIn => matches!(account, A::Blank | A::Invalid { .. }),
            E::AuthStatus { status, .. } => match account {
                A::Pending { redirect_uri } => {
                    !matches!(status, AuthorizationStatus::Success { .. }) || redirect_uri.is_some()
                }
                _ => false,
            },
            E::AccessToken { .. } => matches!(account, A::Pending { .. }),
            E::ProfileFetched { .. } | E::UserInfo { .. } => {
                matches!(account, A::Authorized { .. })
            }
            E::FetchedUserImage { .. } | E::SignOut | E::Refresh => {
                matches!(account, A::Retrieved { .. })
            }
        }
    }

    fn any_account() -> impl Strategy<Value = Account> {
        prop_oneof![
            Just(Account::Blank),
            Just(pending(None)),
            Just(pending(Some("https%3A%2F%2Fx%2Fcode-ack"))),
            Just(Account::Invalid {
                error: AccountError::MissingCode
            }),
            Just(Account::Authorized {
                credentials: credentials()
            }),
            Just(retrieved()),
        ]
    }

    fn any_status() -> impl Strategy<Value = AuthorizationStatus> {
        prop_oneof![
            Just(AuthorizationStatus::Requested),
            Just(AuthorizationStatus::Route(Route::Init)),
            Just(AuthorizationStatus::Route(Route::Started)),
            "[a-z0-9]{1,12}".prop_map(|host| AuthorizationStatus::Route(Route::Exposed {
                url: format!("https://{host}.ngrok.app")
            })),
            "[A-Za-z0-9.]{1,24}".prop_map(|code| AuthorizationStatus::Success { code }),
            Just(AuthorizationStatus::Failure {
                error: AccountError::Timeout { secs: 60 }
            }),
        ]
    }

    fn any_event() -> impl Strategy<Value = Event> {
        let e = Epoch(7);
        let shell = prop_oneof![
            Just(Event::Startup),
            Just(Event::SignIn),
            Just(Event::SignInCancel),
            Just(Event::SignOut),
            Just(Event::Refresh),
            Just(Event::Persist),
            Just(Event::Reset),
        ];
        let stored = encode_account(&retrieved()).unwrap();
        let profile = SlackProfile {
            id: UserId::new("U024BE7LH"),
            name: "spengler".into(),
            real_name: "Egon Spengler".into(),
            email: "spengler@ghostbusters.example.com".into(),
            image: String::new(),
        };
        let restores = prop_oneof![
            Just(restored(Ok(None))),
            Just(restored(Ok(Some(stored)))),
            Just(restored(Err(AccountError::storage("locked")))),
        ];
        let profiles = prop_oneof![
            Just(Event::ProfileFetched {
                epoch: e,
                result: Ok(profile)
            }),
            Just(Event::ProfileFetched {
                epoch: e,
                result: Err(AccountError::slack("users.info", "user_not_found"))
            }),
            Just(Event::FetchedUserImage {
                epoch: e,
                result: Box::new(Ok(AvatarImage {
                    width: 1,
                    height: 1,
                    png: vec![0x89],
                }))
            }),
        ];
        let results = prop_oneof![
            any_status().prop_map(move |status| Event::AuthStatus { epoch: e, status }),
            Just(Event::AccessToken {
                epoch: e,
                result: Ok(credentials())
            }),
            Just(Event::AccessToken {
                epoch: e,
                result: Err(AccountError::network("reset"))
            }),
            Just(Event::UserInfo {
                epoch: e,
                result: Ok(user_info())
            }),
            Just(Event::FetchedUserImage {
                epoch: e,
                result: Box::new(Err(AccountError::Http { status: 404 }))
            }),
            Just(Event::TokenRevoked(Ok(()))),
            Just(Event::Stored(Ok(()))),
        ];
        prop_oneof![shell, restores, profiles, results]
    }

    proptest! {
        #[test]
        fn events_outside_the_valid_set_are_illegal(
            account in any_account(),
            event in any_event(),
        ) {
            let expected = accepts(&account, &event);
            let result = next(&model(account), event, &config());
            prop_assert_eq!(result.is_ok(), expected);
        }

        #[test]
        fn epoch_never_goes_backwards(
            account in any_account(),
            event in any_event(),
        ) {
            if let Ok(next) = next(&model(account), event, &config()) {
                prop_assert!(next.epoch >= Epoch(7));
            }
        }
    }
}
