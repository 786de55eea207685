//! Slack Web API wire layer: URLs, request bodies and response parsing.
//!
//! Everything here is pure so the requests the core sends and the way it reads
//! Slack's answers can be tested without a shell.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::form_urlencoded;

use crate::config::SlackConfig;
use crate::error::AccountError;
use crate::model::{Credentials, Presence, Token, UserId, UserInfo};

pub const AUTHORIZE_URL: &str = "https://slack.com/oauth/v2/authorize";
pub const API_BASE: &str = "https://slack.com/api";

pub const OAUTH_ACCESS: &str = "oauth.v2.access";
pub const USERS_INFO: &str = "users.info";
pub const USERS_GET_PRESENCE: &str = "users.getPresence";
pub const AUTH_REVOKE: &str = "auth.revoke";

#[must_use]
pub fn method_url(method: &str) -> String {
    format!("{API_BASE}/{method}")
}

/// Redirect URI registered with Slack for one sign-in attempt: the public
/// tunnel URL plus the callback path, form-URL-encoded.
#[must_use]
pub fn encode_redirect_uri(exposed_url: &str, callback_path: &str) -> String {
    let raw = format!("{}{callback_path}", exposed_url.trim_end_matches('/'));
    form_urlencoded::byte_serialize(raw.as_bytes()).collect()
}

/// `redirect_uri` is expected to be encoded already.
#[must_use]
pub fn authorize_url(config: &SlackConfig, redirect_uri: &str) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("scope", &config.bot_scopes.join(","))
        .append_pair("user_scope", &config.user_scopes.join(","))
        .append_pair("client_id", &config.client_id);
    format!(
        "{AUTHORIZE_URL}?{}&redirect_uri={redirect_uri}",
        query.finish()
    )
}

/// Everything `oauth.v2.access` needs to turn a code into tokens.
#[derive(Clone, Debug)]
pub struct AccessRequest {
    pub code: String,
    pub client_id: String,
    pub client_secret: SecretString,
    /// Encoded, exactly as sent to the authorize endpoint.
    pub redirect_uri: String,
}

#[must_use]
pub fn access_request_body(request: &AccessRequest) -> String {
    let mut form = form_urlencoded::Serializer::new(String::new());
    form.append_pair("code", &request.code)
        .append_pair("client_id", &request.client_id)
        .append_pair("client_secret", request.client_secret.expose_secret());
    format!("{}&redirect_uri={}", form.finish(), request.redirect_uri)
}

#[must_use]
pub fn users_info_url(user: &UserId) -> String {
    with_user_query(USERS_INFO, user)
}

#[must_use]
pub fn presence_url(user: &UserId) -> String {
    with_user_query(USERS_GET_PRESENCE, user)
}

fn with_user_query(method: &str, user: &UserId) -> String {
    let query: String = form_urlencoded::Serializer::new(String::new())
        .append_pair("user", user.as_str())
        .finish();
    format!("{}?{query}", method_url(method))
}

#[must_use]
pub fn bearer(token: &Token) -> String {
    format!("Bearer {}", token.expose())
}

/// Profile fields from `users.info`, before presence is known.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct SlackProfile {
    pub id: UserId,
    pub name: String,
    pub real_name: String,
    pub email: String,
    pub image: String,
}

impl SlackProfile {
    #[must_use]
    pub fn with_presence(self, presence: Presence) -> UserInfo {
        UserInfo {
            id: self.id,
            image: self.image,
            name: self.name,
            real_name: self.real_name,
            email: self.email,
            presence,
        }
    }
}

#[derive(Deserialize)]
struct Envelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Checks `{"ok": ...}` and decodes the payload on success.
fn decode<T: serde::de::DeserializeOwned>(method: &str, body: &[u8]) -> Result<T, AccountError> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| AccountError::decode(format!("{method}: {e}")))?;
    if !envelope.ok {
        let code = envelope.error.unwrap_or_else(|| "unknown_error".into());
        return Err(AccountError::slack(method, code));
    }
    serde_json::from_slice(body).map_err(|e| AccountError::decode(format!("{method}: {e}")))
}

#[derive(Deserialize)]
struct AccessResponse {
    #[serde(default)]
    access_token: Option<String>,
    authed_user: AuthedUser,
}

#[derive(Deserialize)]
struct AuthedUser {
    id: String,
    #[serde(default)]
    access_token: Option<String>,
}

pub fn parse_access(body: &[u8]) -> Result<Credentials, AccountError> {
    let response: AccessResponse = decode(OAUTH_ACCESS, body)?;
    let user_token = response
        .authed_user
        .access_token
        .ok_or_else(|| AccountError::decode("oauth.v2.access: missing authed_user.access_token"))?;
    Ok(Credentials {
        bot_token: Token::new(response.access_token.unwrap_or_default()),
        user_token: Token::new(user_token),
        user_id: UserId::new(response.authed_user.id),
    })
}

#[derive(Deserialize)]
struct UsersInfoResponse {
    user: WireUser,
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
    name: String,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    profile: WireProfile,
}

#[derive(Deserialize, Default)]
struct WireProfile {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    real_name: Option<String>,
    #[serde(default)]
    image_192: Option<String>,
    #[serde(default)]
    image_72: Option<String>,
}

pub fn parse_profile(body: &[u8]) -> Result<SlackProfile, AccountError> {
    let response: UsersInfoResponse = decode(USERS_INFO, body)?;
    let user = response.user;
    let real_name = user
        .real_name
        .or(user.profile.real_name)
        .unwrap_or_else(|| user.name.clone());
    Ok(SlackProfile {
        id: UserId::new(user.id),
        name: user.name,
        real_name,
        email: user.profile.email.unwrap_or_default(),
        image: user
            .profile
            .image_192
            .or(user.profile.image_72)
            .unwrap_or_default(),
    })
}

#[derive(Deserialize)]
struct PresenceResponse {
    presence: String,
}

pub fn parse_presence(body: &[u8]) -> Result<Presence, AccountError> {
    let response: PresenceResponse = decode(USERS_GET_PRESENCE, body)?;
    Ok(Presence::from_wire(&response.presence))
}

#[derive(Deserialize)]
struct RevokeResponse {
    #[serde(default)]
    revoked: bool,
}

pub fn parse_revoke(body: &[u8]) -> Result<(), AccountError> {
    let response: RevokeResponse = decode(AUTH_REVOKE, body)?;
    if response.revoked {
        Ok(())
    } else {
        Err(AccountError::slack(AUTH_REVOKE, "not_revoked"))
    }
}

/// Unwraps a `crux_http` response into its body, mapping transport failures
/// and non-2xx statuses.
pub fn response_body(
    result: crux_http::Result<crux_http::Response<Vec<u8>>>,
) -> Result<Vec<u8>, AccountError> {
    let mut response = result.map_err(|e| AccountError::network(e.to_string()))?;
    let status = u16::from(response.status());
    if !(200..300).contains(&status) {
        return Err(AccountError::Http { status });
    }
    Ok(response.take_body().unwrap_or_default())
}
