//! Bihua admin console: app state, navigation and background completions.

use eframe::egui;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedReceiver;

use lib::api::{ApiClient, ProfileOwner};
use lib::auth::{AuthState, TokenStore};
use lib::chat::{
    self, ChatClient, ChatSession, Ingest, RetryPolicy, SendKind, TimelineEvent, Upload,
};
use lib::config::{self, Config};
use lib::detail::{DetailState, ProfileTicket};
use lib::i18n::{Language, Text};
use lib::layout::SplitPane;
use lib::list::{ActionStates, AgentAction, ListState, RegisterDialog};
use lib::model::{Group, ItemRef, Kind, Resident};
use lib::route::{self, Route};

use crate::tasks::{Outcome, Tasks};

/// Everything the console needs at start-up.
pub struct Startup {
    pub config: Config,
    pub config_path: PathBuf,
    pub token_store: Arc<dyn TokenStore>,
    pub runtime: tokio::runtime::Runtime,
}

/// Chat widget state: transport, session and the inputs of the panel.
pub(crate) struct ChatPanel {
    pub client: Option<Arc<dyn ChatClient>>,
    pub session: ChatSession,
    pub events: Option<UnboundedReceiver<TimelineEvent>>,
    pub input: String,
    pub file_path: String,
}

pub struct AdminApp {
    pub(crate) tasks: Tasks,
    pub(crate) config: Config,
    pub(crate) config_path: PathBuf,
    pub(crate) api_base_url: String,
    pub(crate) api: ApiClient,
    pub(crate) auth: AuthState,
    pub(crate) language: Language,
    pub(crate) route: Route,
    /// Token typed on the login page. Never logged.
    pub(crate) token_input: String,
    pub(crate) login_error: Option<String>,
    pub(crate) list: ListState,
    pub(crate) actions: ActionStates,
    pub(crate) register: RegisterDialog,
    pub(crate) residents: DetailState<Resident>,
    pub(crate) groups: DetailState<Group>,
    pub(crate) split: SplitPane,
    pub(crate) chat: ChatPanel,
    /// Set when the route or collection changed and the detail panel must be re-synced.
    detail_dirty: bool,
}

impl AdminApp {
    pub fn new(cc: &eframe::CreationContext<'_>, startup: Startup) -> Self {
        let Startup {
            config,
            config_path,
            token_store,
            runtime,
        } = startup;

        if let Some(path) = &config.ui.cjk_font_path {
            install_cjk_font(&cc.egui_ctx, path);
        }

        let auth = AuthState::new(token_store);
        let api_base_url = config::resolve_api_base_url(&config);
        let api = ApiClient::new(api_base_url.clone()).with_bearer(auth.bearer_token());
        let chat = ChatPanel {
            client: chat::client_from_config(&config),
            session: ChatSession::new(
                RetryPolicy::from(&config.chat.retry),
                config.chat.navigation_commands,
            ),
            events: None,
            input: String::new(),
            file_path: String::new(),
        };

        let mut app = Self {
            tasks: Tasks::new(runtime, cc.egui_ctx.clone()),
            language: config.ui.language,
            split: SplitPane::from_config(&config.ui.list_width),
            config,
            config_path,
            api_base_url,
            api,
            auth,
            route: Route::Home,
            token_input: String::new(),
            login_error: None,
            list: ListState::new(Kind::Residents),
            actions: ActionStates::new(),
            register: RegisterDialog::new(),
            residents: DetailState::new(),
            groups: DetailState::new(),
            chat,
            detail_dirty: false,
        };
        app.navigate(Route::Home);
        app.start_chat();
        log::info!("desktop started");
        app
    }

    pub(crate) fn tr(&self, text: Text) -> &'static str {
        text.tr(self.language)
    }

    /// Go to `target`, subject to the auth guard. Entering a list from anywhere else, or
    /// switching kind, refetches the collection.
    pub(crate) fn navigate(&mut self, target: Route) {
        let target = route::guard(target, self.auth.is_authenticated());
        let previous_kind = self.route.kind();
        if let Some(kind) = target.kind() {
            if previous_kind != Some(kind) {
                self.fetch(kind);
            }
        }
        if self.route != target {
            log::debug!("navigate {} -> {}", self.route.to_path(), target.to_path());
        }
        self.route = target;
        self.detail_dirty = true;
    }

    pub(crate) fn fetch(&mut self, kind: Kind) {
        let ticket = self.list.begin_fetch(kind);
        let api = self.api.clone();
        self.tasks.spawn(async move {
            let result = api.fetch_collection(kind).await;
            Outcome::Collection(ticket, result)
        });
    }

    pub(crate) fn sign_in(&mut self) {
        match self.auth.login(&self.token_input) {
            Ok(true) => {
                self.token_input.clear();
                self.login_error = None;
                self.api = ApiClient::new(self.api_base_url.clone())
                    .with_bearer(self.auth.bearer_token());
                self.navigate(Route::Home);
                self.start_chat();
            }
            Ok(false) => {}
            Err(e) => {
                log::warn!("could not store token: {}", e);
                self.login_error = Some(e.to_string());
            }
        }
    }

    pub(crate) fn sign_out(&mut self) {
        if let Err(e) = self.auth.logout() {
            log::warn!("could not clear stored token: {}", e);
        }
        self.api = ApiClient::new(self.api_base_url.clone());
        self.stop_chat();
        self.residents.clear();
        self.groups.clear();
        self.navigate(Route::Login);
    }

    pub(crate) fn run_action(&mut self, action: AgentAction) {
        let credentials = match action {
            AgentAction::Register => match self.register.submit() {
                Some(credentials) => Some(credentials),
                None => return,
            },
            _ => None,
        };
        if !self.actions.try_begin(action) {
            return;
        }
        let api = self.api.clone();
        self.tasks.spawn(async move {
            let result = match (action, credentials) {
                (AgentAction::Register, Some((username, password))) => {
                    api.register(&username, &password).await
                }
                (AgentAction::StopAgents, _) => api.stop_agents().await,
                _ => api.run_agents().await,
            };
            Outcome::Action(action, result)
        });
    }

    pub(crate) fn submit_resident(&mut self) {
        if let Some(resident) = self.residents.begin_submit() {
            let api = self.api.clone();
            self.tasks.spawn(async move {
                let result = api.update_resident(&resident).await;
                Outcome::Updated(Kind::Residents, resident.resident_id, result)
            });
        }
    }

    pub(crate) fn submit_group(&mut self) {
        if let Some(group) = self.groups.begin_submit() {
            let api = self.api.clone();
            self.tasks.spawn(async move {
                let result = api.update_group(&group).await;
                Outcome::Updated(Kind::Groups, group.group_id, result)
            });
        }
    }

    fn load_profile(&self, kind: Kind, ticket: ProfileTicket) {
        let Some(owner) = ProfileOwner::for_kind(kind) else {
            return;
        };
        let api = self.api.clone();
        self.tasks.spawn(async move {
            let result = api.fetch_profile(owner, &ticket.id).await;
            Outcome::Profile(kind, ticket, result)
        });
    }

    pub(crate) fn save_profile(&mut self, kind: Kind) {
        let pending = match kind {
            Kind::Residents => self.residents.profile.begin_save(),
            Kind::Groups => self.groups.profile.begin_save(),
            Kind::Models => None,
        };
        let (Some((ticket, text)), Some(owner)) = (pending, ProfileOwner::for_kind(kind)) else {
            return;
        };
        let api = self.api.clone();
        self.tasks.spawn(async move {
            let result = api.save_profile(owner, &ticket.id, &text).await;
            Outcome::ProfileSaved(kind, ticket, result)
        });
    }

    /// Point the detail panel at the routed item, or clear it.
    fn sync_detail(&mut self) {
        if !self.detail_dirty || self.list.is_loading() {
            return;
        }
        self.detail_dirty = false;
        let (kind, id) = match &self.route {
            Route::List { kind, id, .. } => (*kind, id.clone()),
            _ => return,
        };
        let found = id.as_deref().and_then(|id| self.list.find(id));
        match found {
            Some(ItemRef::Resident(r)) => {
                let resident = r.clone();
                self.groups.clear();
                if let Some(ticket) = self.residents.show(resident) {
                    self.load_profile(kind, ticket);
                }
            }
            Some(ItemRef::Group(g)) => {
                let group = g.clone();
                self.residents.clear();
                if let Some(ticket) = self.groups.show(group) {
                    self.load_profile(kind, ticket);
                }
            }
            Some(ItemRef::Model(_)) | None => {
                self.residents.clear();
                self.groups.clear();
            }
        }
    }

    fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Collection(ticket, result) => {
                if self.list.complete_fetch(ticket, result) {
                    self.detail_dirty = true;
                }
            }
            Outcome::Profile(kind, ticket, result) => {
                match kind {
                    Kind::Residents => self.residents.profile.complete_load(&ticket, result),
                    Kind::Groups => self.groups.profile.complete_load(&ticket, result),
                    Kind::Models => false,
                };
            }
            Outcome::ProfileSaved(kind, ticket, result) => {
                match kind {
                    Kind::Residents => self.residents.profile.complete_save(&ticket, result),
                    Kind::Groups => self.groups.profile.complete_save(&ticket, result),
                    Kind::Models => false,
                };
            }
            Outcome::Updated(Kind::Residents, id, result) => {
                if let Some(updated) = self.residents.complete_submit(&id, result) {
                    self.list.collection_mut().replace_resident(&updated);
                }
            }
            Outcome::Updated(Kind::Groups, id, result) => {
                if let Some(updated) = self.groups.complete_submit(&id, result) {
                    self.list.collection_mut().replace_group(&updated);
                }
            }
            Outcome::Updated(Kind::Models, _, _) => {}
            Outcome::Action(action, result) => {
                self.actions.finish(action, &result);
                if action == AgentAction::Register {
                    self.register.finish(&result);
                    if result.is_ok() && self.list.kind() == Kind::Residents {
                        self.fetch(Kind::Residents);
                    }
                }
            }
            Outcome::ChatConnected(ticket, Ok(user_id)) => {
                if !self.chat.session.connect_succeeded(&ticket, user_id) {
                    self.drop_stale_connection();
                }
            }
            Outcome::ChatConnected(ticket, Err(e)) => {
                if let Some(delay) = self.chat.session.connect_failed(&ticket, &e, Instant::now()) {
                    self.tasks.ctx().request_repaint_after(delay);
                }
            }
            Outcome::ChatSent(kind, Ok(())) => {
                self.chat.session.send_succeeded(kind);
                if kind == SendKind::Text {
                    self.chat.input.clear();
                }
            }
            Outcome::ChatSent(kind, Err(e)) => {
                log::warn!("chat send failed: {}", e);
                self.chat.session.send_failed(kind);
            }
        }
    }

    /// Connect the chat panel when a client is configured and the user is signed in.
    pub(crate) fn start_chat(&mut self) {
        if !self.auth.is_authenticated() {
            return;
        }
        let Some(client) = self.chat.client.clone() else {
            return;
        };
        let Some(ticket) = self.chat.session.begin_connect() else {
            return;
        };
        log::info!("connecting chat");
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.chat.events = Some(rx);
        self.tasks.spawn(async move {
            let result = client.connect(tx).await.map(|()| client.user_id());
            Outcome::ChatConnected(ticket, result)
        });
    }

    /// A connect that finished after sign-out or a restart left a live sync behind. Stop
    /// it; when a newer connection had already been applied it shared the same client
    /// slot, so reconnect that one.
    fn drop_stale_connection(&mut self) {
        let Some(client) = self.chat.client.clone() else {
            return;
        };
        client.stop();
        if self.chat.session.is_connected() {
            self.chat.events = None;
            self.chat.session.disconnect();
            self.start_chat();
        }
    }

    pub(crate) fn stop_chat(&mut self) {
        if let Some(client) = &self.chat.client {
            client.stop();
        }
        self.chat.events = None;
        self.chat.session.disconnect();
    }

    /// Drain timeline events and fire a due connect retry.
    fn poll_chat(&mut self) {
        let mut commands = Vec::new();
        if let Some(rx) = &mut self.chat.events {
            while let Ok(event) = rx.try_recv() {
                if let Ingest::Appended {
                    command: Some(command),
                } = self.chat.session.ingest(event)
                {
                    commands.push(command);
                }
            }
        }
        for command in commands {
            self.navigate(command.route());
        }
        if self.chat.session.retry_due(Instant::now()) {
            self.start_chat();
        }
    }

    pub(crate) fn send_chat_text(&mut self) {
        let Some(body) = self.chat.session.prepare_text(&self.chat.input) else {
            return;
        };
        let Some(client) = self.chat.client.clone() else {
            return;
        };
        if !self.chat.session.begin_send(SendKind::Text) {
            return;
        }
        self.tasks.spawn(async move {
            Outcome::ChatSent(SendKind::Text, client.send_text(&body).await)
        });
    }

    /// Send the file named in the path field, as a plain file or as a voice note.
    pub(crate) fn send_chat_file(&mut self, kind: SendKind) {
        let path = PathBuf::from(self.chat.file_path.trim());
        if path.as_os_str().is_empty() {
            return;
        }
        let Some(client) = self.chat.client.clone() else {
            return;
        };
        if !self.chat.session.begin_send(kind) {
            return;
        }
        self.tasks.spawn(async move {
            let result = match Upload::from_path(&path).await {
                Ok(upload) if kind == SendKind::Voice => client.send_voice(upload).await,
                Ok(upload) => client.send_file(upload).await,
                Err(e) => Err(e),
            };
            Outcome::ChatSent(kind, result)
        });
    }

    pub(crate) fn toggle_language(&mut self) {
        self.language = self.language.toggle();
    }
}

impl eframe::App for AdminApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        while let Some(outcome) = self.tasks.try_next() {
            self.apply(outcome);
        }
        self.poll_chat();
        self.sync_detail();

        if self.route != Route::Login {
            self.ui_sidebar(ctx);
        }
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::Frame::none()
                .inner_margin(egui::Margin::symmetric(24.0, 0.0))
                .show(ui, |ui| match self.route.clone() {
                    Route::Login => self.ui_login(ui),
                    Route::Home => self.ui_text_page(ui, Text::WelcomeTitle, Text::WelcomeBody),
                    Route::Learn => self.ui_text_page(ui, Text::LearnTitle, Text::LearnBody),
                    Route::Settings => self.ui_settings(ui),
                    Route::List { kind, id, page } => self.ui_list(ui, kind, id.as_deref(), page),
                    Route::Invalid(_) => {
                        ui.add_space(24.0);
                        ui.heading(self.tr(Text::InvalidPage));
                    }
                });
        });
        self.ui_register_dialog(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.stop_chat();
    }
}

/// Add the configured CJK font as a fallback so Chinese strings render.
fn install_cjk_font(ctx: &egui::Context, path: &std::path::Path) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("could not read CJK font {}: {}", path.display(), e);
            return;
        }
    };
    let name = "cjk".to_string();
    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(name.clone(), egui::FontData::from_owned(bytes));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts.families.entry(family).or_default().push(name.clone());
    }
    ctx.set_fonts(fonts);
    log::info!("loaded CJK font {}", path.display());
}
