//! Background work: every network call runs on the tokio runtime and reports back through
//! one channel that the UI drains each frame.

use eframe::egui;
use std::future::Future;
use std::sync::mpsc;

use lib::api::ApiError;
use lib::chat::{ChatError, ConnectTicket, SendKind};
use lib::detail::ProfileTicket;
use lib::list::{AgentAction, FetchTicket};
use lib::model::{Collection, Kind};

/// Completion of a background call, applied on the UI thread.
pub enum Outcome {
    Collection(FetchTicket, Result<Collection, ApiError>),
    Profile(Kind, ProfileTicket, Result<String, ApiError>),
    ProfileSaved(Kind, ProfileTicket, Result<(), ApiError>),
    Updated(Kind, String, Result<(), ApiError>),
    Action(AgentAction, Result<(), ApiError>),
    ChatConnected(ConnectTicket, Result<Option<String>, ChatError>),
    ChatSent(SendKind, Result<(), ChatError>),
}

pub struct Tasks {
    runtime: tokio::runtime::Runtime,
    ctx: egui::Context,
    tx: mpsc::Sender<Outcome>,
    rx: mpsc::Receiver<Outcome>,
}

impl Tasks {
    pub fn new(runtime: tokio::runtime::Runtime, ctx: egui::Context) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            runtime,
            ctx,
            tx,
            rx,
        }
    }

    pub fn ctx(&self) -> &egui::Context {
        &self.ctx
    }

    /// Run `fut` in the background; its outcome arrives through [`Tasks::try_next`].
    pub fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = Outcome> + Send + 'static,
    {
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        self.runtime.spawn(async move {
            let outcome = fut.await;
            if tx.send(outcome).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    pub fn try_next(&self) -> Option<Outcome> {
        self.rx.try_recv().ok()
    }
}
