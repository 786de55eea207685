//! Login capability: the shell side of the OAuth authorization code flow.
//!
//! `RequestAuthScopes` is a streaming operation. The shell starts the local
//! callback listener (answering it with [`crate::callback::handle_code_ack`]),
//! exposes it through a tunnel and reports each step as an
//! [`AuthorizationStatus`]. It ends the stream after a terminal status, after
//! `timeout_secs` without one (reporting `Failure { Timeout }`), or on
//! `TearDown`. Only one stream may be live; a new request replaces the old
//! listener and tunnel.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

use crate::event::AuthorizationStatus;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoginOperation {
    RequestAuthScopes {
        callback_path: String,
        timeout_secs: u64,
    },
    OpenBrowser {
        url: String,
    },
    /// Stops listener, tunnel and timer. Safe to send when nothing is running.
    TearDown,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum LoginOutput {
    Status(AuthorizationStatus),
    /// Acknowledges `OpenBrowser` and `TearDown`.
    Done,
}

impl Operation for LoginOperation {
    type Output = LoginOutput;
}

pub struct Login<Ev> {
    context: CapabilityContext<LoginOperation, Ev>,
}

impl<Ev> Capability<Ev> for Login<Ev> {
    type Operation = LoginOperation;
    type MappedSelf<MappedEv> = Login<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Login::new(self.context.map_event(f))
    }
}

impl<Ev> Login<Ev> {
    pub fn new(context: CapabilityContext<LoginOperation, Ev>) -> Self {
        Self { context }
    }
}

impl<Ev> Login<Ev>
where
    Ev: Send + 'static,
{
    /// Streams authorization statuses into the app until the shell closes
    /// the stream.
    pub fn request_auth_scopes<F>(&self, callback_path: String, timeout_secs: u64, make_event: F)
    where
        F: Fn(AuthorizationStatus) -> Ev + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let mut statuses = ctx.stream_from_shell(LoginOperation::RequestAuthScopes {
                callback_path,
                timeout_secs,
            });
            while let Some(output) = statuses.next().await {
                match output {
                    LoginOutput::Status(status) => {
                        let terminal = status.is_terminal();
                        ctx.update_app(make_event(status));
                        if terminal {
                            break;
                        }
                    }
                    LoginOutput::Done => break,
                }
            }
        });
    }

    pub fn open_browser(&self, url: String) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(LoginOperation::OpenBrowser { url }).await;
        });
    }

    pub fn tear_down(&self) {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            ctx.notify_shell(LoginOperation::TearDown).await;
        });
    }
}
