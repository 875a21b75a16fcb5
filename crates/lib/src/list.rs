//! State of the list+detail container: the fetched collection, resident actions and the
//! register dialog.
//!
//! Every fetch is stamped with a generation; only the response to the latest fetch is
//! applied.

use crate::api::ApiError;
use crate::i18n::Text;
use crate::model::{Collection, ItemRef, Kind};
use crate::pagination::{self, PageControls};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Loaded,
    Failed(Text),
}

/// Identifies one collection fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub kind: Kind,
    pub generation: u64,
}

/// One rendered page of the collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<'a> {
    pub items: Vec<ItemRef<'a>>,
    pub total_pages: u32,
    pub current: u32,
    pub show_pagination: bool,
}

impl Page<'_> {
    pub fn controls(&self) -> PageControls {
        PageControls::new(self.current, self.total_pages)
    }
}

fn load_failed_text(kind: Kind) -> Text {
    match kind {
        Kind::Residents => Text::LoadResidentsFailed,
        Kind::Groups => Text::LoadGroupsFailed,
        Kind::Models => Text::LoadModelsFailed,
    }
}

#[derive(Debug)]
pub struct ListState {
    kind: Kind,
    generation: u64,
    status: LoadStatus,
    collection: Collection,
}

impl ListState {
    pub fn new(kind: Kind) -> Self {
        Self {
            kind,
            generation: 0,
            status: LoadStatus::Idle,
            collection: Collection::empty(kind),
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn is_loading(&self) -> bool {
        self.status == LoadStatus::Loading
    }

    /// Localized error key of the last failed fetch.
    pub fn error(&self) -> Option<Text> {
        match self.status {
            LoadStatus::Failed(text) => Some(text),
            _ => None,
        }
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    /// Start fetching `kind`: the list is emptied and any in-flight fetch becomes stale.
    pub fn begin_fetch(&mut self, kind: Kind) -> FetchTicket {
        self.generation += 1;
        self.kind = kind;
        self.status = LoadStatus::Loading;
        self.collection = Collection::empty(kind);
        FetchTicket {
            kind,
            generation: self.generation,
        }
    }

    /// Apply a fetch result. Returns false (and changes nothing) for a stale ticket.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Collection, ApiError>,
    ) -> bool {
        if ticket.generation != self.generation || ticket.kind != self.kind {
            log::debug!(
                "dropping stale {} response (generation {}, current {})",
                ticket.kind,
                ticket.generation,
                self.generation
            );
            return false;
        }
        match result {
            Ok(collection) if collection.kind() == self.kind => {
                self.collection = collection;
                self.status = LoadStatus::Loaded;
            }
            Ok(collection) => {
                log::warn!(
                    "expected {} but received {}",
                    self.kind,
                    collection.kind()
                );
                self.collection = Collection::empty(self.kind);
                self.status = LoadStatus::Failed(load_failed_text(self.kind));
            }
            Err(e) => {
                log::warn!("failed to load {}: {}", self.kind, e);
                self.collection = Collection::empty(self.kind);
                self.status = LoadStatus::Failed(load_failed_text(self.kind));
            }
        }
        true
    }

    pub fn page(&self, page: u32) -> Page<'_> {
        let total_pages = pagination::total_pages(self.collection.len());
        Page {
            items: self.collection.page(page),
            total_pages,
            current: page,
            show_pagination: total_pages > 1,
        }
    }

    pub fn find(&self, id: &str) -> Option<ItemRef<'_>> {
        self.collection.find(id)
    }

    pub fn collection_mut(&mut self) -> &mut Collection {
        &mut self.collection
    }
}

/// Resident-level actions offered above the residents list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgentAction {
    Register,
    RunAgents,
    StopAgents,
}

impl AgentAction {
    pub const ALL: [AgentAction; 3] = [
        AgentAction::Register,
        AgentAction::RunAgents,
        AgentAction::StopAgents,
    ];

    pub fn label(self) -> Text {
        match self {
            AgentAction::Register => Text::RegisterResident,
            AgentAction::RunAgents => Text::RunAgents,
            AgentAction::StopAgents => Text::StopAgents,
        }
    }

    pub fn failure(self) -> Text {
        match self {
            AgentAction::Register => Text::RegisterFailed,
            AgentAction::RunAgents => Text::RunAgentsFailed,
            AgentAction::StopAgents => Text::StopAgentsFailed,
        }
    }

    fn index(self) -> usize {
        match self {
            AgentAction::Register => 0,
            AgentAction::RunAgents => 1,
            AgentAction::StopAgents => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct ActionSlot {
    pending: bool,
    error: Option<Text>,
}

/// Pending flag and last error per action. Actions are independent of each other.
#[derive(Debug, Default)]
pub struct ActionStates {
    slots: [ActionSlot; 3],
}

impl ActionStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `action` pending. Refused (false) while the same action is still pending.
    pub fn try_begin(&mut self, action: AgentAction) -> bool {
        let slot = &mut self.slots[action.index()];
        if slot.pending {
            return false;
        }
        slot.pending = true;
        slot.error = None;
        true
    }

    pub fn finish(&mut self, action: AgentAction, result: &Result<(), ApiError>) {
        let slot = &mut self.slots[action.index()];
        slot.pending = false;
        slot.error = match result {
            Ok(()) => None,
            Err(e) => {
                log::warn!("{:?} failed: {}", action, e);
                Some(action.failure())
            }
        };
    }

    pub fn is_pending(&self, action: AgentAction) -> bool {
        self.slots[action.index()].pending
    }

    pub fn error(&self, action: AgentAction) -> Option<Text> {
        self.slots[action.index()].error
    }

    /// First error among the agent run/stop actions, for the banner above the list.
    pub fn agents_error(&self) -> Option<Text> {
        self.error(AgentAction::RunAgents)
            .or_else(|| self.error(AgentAction::StopAgents))
    }
}

/// Modal form for registering a resident.
#[derive(Debug, Default)]
pub struct RegisterDialog {
    pub open: bool,
    pub username: String,
    pub password: String,
    pub error: Option<Text>,
}

impl RegisterDialog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open(&mut self) {
        self.open = true;
    }

    /// Close without submitting. Clears the error; inputs stay for the next open.
    pub fn close(&mut self) {
        self.open = false;
        self.error = None;
    }

    /// Credentials to send, or None when either field is empty.
    pub fn submit(&self) -> Option<(String, String)> {
        if self.username.is_empty() || self.password.is_empty() {
            return None;
        }
        Some((self.username.clone(), self.password.clone()))
    }

    /// Success closes the dialog and clears the inputs; failure keeps it open with an error.
    pub fn finish(&mut self, result: &Result<(), ApiError>) {
        match result {
            Ok(()) => {
                self.open = false;
                self.username.clear();
                self.password.clear();
                self.error = None;
            }
            Err(_) => {
                self.open = true;
                self.error = Some(Text::RegisterFailed);
            }
        }
    }
}
