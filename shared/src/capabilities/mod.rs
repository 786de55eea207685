mod kv;
mod login;

pub use self::kv::{KeyValue, KvError, KvOperation, KvOutput, KvResult};
pub use self::login::{Login, LoginOperation, LoginOutput};

// Render and HTTP come straight from Crux.
pub use crux_core::render::{Render, RenderOperation};
pub use crux_http::protocol::HttpRequest;
pub use crux_http::Http;

use crux_core::bridge::ResolveSerialized;
use crux_core::capability::ProtoContext;
use crux_core::Request;
use serde::{Deserialize, Serialize};

use crate::app::App;
use crate::event::Event;

pub type AppHttp = Http<Event>;
pub type AppKv = KeyValue<Event>;
pub type AppRender = Render<Event>;
pub type AppLogin = Login<Event>;

pub struct Capabilities {
    pub http: AppHttp,
    pub kv: AppKv,
    pub render: AppRender,
    pub login: AppLogin,
}

/// Effects requested from the shell, one variant per capability.
#[derive(Debug)]
pub enum Effect {
    Http(Request<HttpRequest>),
    Kv(Request<KvOperation>),
    Render(Request<RenderOperation>),
    Login(Request<LoginOperation>),
}

/// Serialized form of [`Effect`] handed across the FFI bridge.
#[derive(Serialize, Deserialize)]
#[serde(rename = "Effect")]
pub enum EffectFfi {
    Http(HttpRequest),
    Kv(KvOperation),
    Render(RenderOperation),
    Login(LoginOperation),
}

impl crux_core::Effect for Effect {
    type Ffi = EffectFfi;

    fn serialize(self) -> (Self::Ffi, ResolveSerialized) {
        match self {
            Effect::Http(request) => request.serialize(EffectFfi::Http),
            Effect::Kv(request) => request.serialize(EffectFfi::Kv),
            Effect::Render(request) => request.serialize(EffectFfi::Render),
            Effect::Login(request) => request.serialize(EffectFfi::Login),
        }
    }
}

impl crux_core::WithContext<App, Effect> for Capabilities {
    fn new_with_context(context: ProtoContext<Effect, Event>) -> Capabilities {
        Capabilities {
            http: Http::new(context.specialize(Effect::Http)),
            kv: KeyValue::new(context.specialize(Effect::Kv)),
            render: Render::new(context.specialize(Effect::Render)),
            login: Login::new(context.specialize(Effect::Login)),
        }
    }
}

impl Effect {
    pub fn into_http(self) -> Option<Request<HttpRequest>> {
        match self {
            Effect::Http(request) => Some(request),
            _ => None,
        }
    }

    pub fn into_kv(self) -> Option<Request<KvOperation>> {
        match self {
            Effect::Kv(request) => Some(request),
            _ => None,
        }
    }

    pub fn into_login(self) -> Option<Request<LoginOperation>> {
        match self {
            Effect::Login(request) => Some(request),
            _ => None,
        }
    }
}
