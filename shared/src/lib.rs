// lib.rs - Slack account core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::missing_errors_doc)]

pub mod app;
pub mod avatar;
pub mod callback;
pub mod capabilities;
pub mod config;
pub mod error;
pub mod event;
pub mod machine;
pub mod model;
pub mod slack;
pub mod view;

pub use app::{App, STORAGE_KEY};
pub use callback::{handle_code_ack, CallbackReply};
pub use capabilities::{Capabilities, Effect, KvOperation, KvOutput, LoginOperation, LoginOutput};
pub use config::SlackConfig;
pub use crux_core::{render::Render, App as CruxApp};
pub use error::{AccountError, ErrorKind, IllegalState};
pub use event::{AuthorizationStatus, Event, Route};
pub use model::{Account, AvatarImage, Credentials, Epoch, Model, Presence, Token, UserId, UserInfo};
pub use view::{AccountView, ViewModel};
