//! Detail view state for residents and groups: read/edit mode, the edit buffer and the
//! separately stored profile text.

use crate::api::{ApiError, ProfileOwner};
use crate::i18n::Text;
use crate::model::{Group, Resident};

/// A record that can be edited in place and carries a profile.
pub trait Editable: Clone {
    /// Profile endpoint family for this record type.
    const OWNER: ProfileOwner;
    /// Shown when the update call fails.
    const UPDATE_FAILED: Text;

    fn id(&self) -> &str;
    fn set_id(&mut self, id: &str);
}

impl Editable for Resident {
    const OWNER: ProfileOwner = ProfileOwner::Resident;
    const UPDATE_FAILED: Text = Text::UpdateResidentFailed;

    fn id(&self) -> &str {
        &self.resident_id
    }

    fn set_id(&mut self, id: &str) {
        self.resident_id = id.to_string();
    }
}

impl Editable for Group {
    const OWNER: ProfileOwner = ProfileOwner::Group;
    const UPDATE_FAILED: Text = Text::UpdateGroupFailed;

    fn id(&self) -> &str {
        &self.group_id
    }

    fn set_id(&mut self, id: &str) {
        self.group_id = id.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Read,
    Edit,
}

/// Identifies one profile load or save for the item shown at the time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileTicket {
    pub generation: u64,
    pub id: String,
}

/// Profile text of the shown item.
#[derive(Debug, Default)]
pub struct ProfileState {
    generation: u64,
    item_id: Option<String>,
    pub loading: bool,
    pub saving: bool,
    /// Edit buffer; sent verbatim on save.
    pub text: String,
    pub error: Option<Text>,
    pub fullscreen: bool,
}

impl ProfileState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item_id(&self) -> Option<&str> {
        self.item_id.as_deref()
    }

    fn ticket(&self) -> Option<ProfileTicket> {
        self.item_id.as_ref().map(|id| ProfileTicket {
            generation: self.generation,
            id: id.clone(),
        })
    }

    fn is_current(&self, ticket: &ProfileTicket) -> bool {
        ticket.generation == self.generation && self.item_id.as_deref() == Some(&ticket.id)
    }

    /// Start loading the profile of `id`; earlier loads and saves become stale.
    pub fn begin_load(&mut self, id: &str) -> ProfileTicket {
        self.generation += 1;
        self.item_id = Some(id.to_string());
        self.loading = true;
        self.saving = false;
        self.text.clear();
        self.error = None;
        self.fullscreen = false;
        ProfileTicket {
            generation: self.generation,
            id: id.to_string(),
        }
    }

    /// Apply a load result. Failure leaves the text empty and editable.
    pub fn complete_load(&mut self, ticket: &ProfileTicket, result: Result<String, ApiError>) -> bool {
        if !self.is_current(ticket) {
            log::debug!("dropping stale profile for {}", ticket.id);
            return false;
        }
        self.loading = false;
        match result {
            Ok(text) => {
                self.text = text;
                self.error = None;
            }
            Err(e) => {
                log::warn!("failed to load profile {}: {}", ticket.id, e);
                self.text.clear();
                self.error = Some(Text::LoadProfileFailed);
            }
        }
        true
    }

    /// Ticket and text to post, or None when nothing is shown or a save is in flight.
    pub fn begin_save(&mut self) -> Option<(ProfileTicket, String)> {
        if self.saving {
            return None;
        }
        let ticket = self.ticket()?;
        self.saving = true;
        self.error = None;
        Some((ticket, self.text.clone()))
    }

    /// Success leaves fullscreen; failure keeps the text with an error.
    pub fn complete_save(&mut self, ticket: &ProfileTicket, result: Result<(), ApiError>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.saving = false;
        match result {
            Ok(()) => {
                self.fullscreen = false;
                self.error = None;
            }
            Err(e) => {
                log::warn!("failed to save profile {}: {}", ticket.id, e);
                self.error = Some(Text::SaveProfileFailed);
            }
        }
        true
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    /// Nothing shown; pending responses become stale.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.item_id = None;
        self.loading = false;
        self.saving = false;
        self.text.clear();
        self.error = None;
        self.fullscreen = false;
    }
}

/// Detail panel of one editable kind.
#[derive(Debug)]
pub struct DetailState<T: Editable> {
    item: Option<T>,
    mode: Mode,
    /// Edit form contents while in edit mode.
    pub buffer: Option<T>,
    pub error: Option<Text>,
    saving: bool,
    pub profile: ProfileState,
}

impl<T: Editable> Default for DetailState<T> {
    fn default() -> Self {
        Self {
            item: None,
            mode: Mode::Read,
            buffer: None,
            error: None,
            saving: false,
            profile: ProfileState::new(),
        }
    }
}

impl<T: Editable> DetailState<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self) -> Option<&T> {
        self.item.as_ref()
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Show `item`. A different identifier resets to read mode and returns the ticket for
    /// the profile fetch; the same identifier only refreshes the displayed record.
    pub fn show(&mut self, item: T) -> Option<ProfileTicket> {
        let same = self.item.as_ref().map(|i| i.id()) == Some(item.id());
        if same {
            if self.mode == Mode::Read {
                self.item = Some(item);
            }
            return None;
        }
        let ticket = self.profile.begin_load(item.id());
        self.item = Some(item);
        self.mode = Mode::Read;
        self.buffer = None;
        self.error = None;
        self.saving = false;
        Some(ticket)
    }

    /// No item selected.
    pub fn clear(&mut self) {
        self.item = None;
        self.mode = Mode::Read;
        self.buffer = None;
        self.error = None;
        self.saving = false;
        self.profile.reset();
    }

    /// Enter edit mode with the buffer seeded from the shown item.
    pub fn begin_edit(&mut self) {
        if let Some(item) = &self.item {
            self.buffer = Some(item.clone());
            self.mode = Mode::Edit;
            self.error = None;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Read;
        self.buffer = None;
        self.error = None;
        self.saving = false;
    }

    /// The record to send: the buffer with its identifier forced back to the original.
    pub fn begin_submit(&mut self) -> Option<T> {
        if self.mode != Mode::Edit || self.saving {
            return None;
        }
        let original_id = self.item.as_ref()?.id().to_string();
        let buffer = self.buffer.as_mut()?;
        buffer.set_id(&original_id);
        self.saving = true;
        self.error = None;
        Some(buffer.clone())
    }

    /// Apply an update result for `id`. Success shows the buffer as the item and returns it
    /// so the caller can patch its collection; failure stays in edit mode with an error.
    pub fn complete_submit(&mut self, id: &str, result: Result<(), ApiError>) -> Option<T> {
        if self.item.as_ref().map(|i| i.id()) != Some(id) || !self.saving {
            return None;
        }
        self.saving = false;
        match result {
            Ok(()) => {
                let updated = self.buffer.take()?;
                self.item = Some(updated.clone());
                self.mode = Mode::Read;
                self.error = None;
                log::info!("updated {}", id);
                Some(updated)
            }
            Err(e) => {
                log::warn!("failed to update {}: {}", id, e);
                self.error = Some(T::UPDATE_FAILED);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;

    fn err() -> ApiError {
        ApiError::Status {
            status: 500,
            body: String::new(),
        }
    }

    #[test]
    fn editing_display_name_keeps_other_fields() {
        let original = fixtures::resident("R1");
        let mut detail = DetailState::new();
        detail.show(original.clone());
        detail.begin_edit();
        detail.buffer.as_mut().unwrap().display_name = "Foo".to_string();

        let body = detail.begin_submit().unwrap();
        assert_eq!(body.display_name, "Foo");
        assert_eq!(
            Resident {
                display_name: original.display_name.clone(),
                ..body.clone()
            },
            original
        );

        let updated = detail.complete_submit("R1", Ok(())).unwrap();
        assert_eq!(updated.display_name, "Foo");
        assert_eq!(detail.mode(), Mode::Read);
        assert_eq!(detail.item().unwrap().display_name, "Foo");
    }

    #[test]
    fn identifier_is_forced_to_original() {
        let mut detail = DetailState::new();
        detail.show(fixtures::group("G1"));
        detail.begin_edit();
        let buffer = detail.buffer.as_mut().unwrap();
        buffer.group_id = "G2".to_string();
        buffer.name = "Foo".to_string();
        let body = detail.begin_submit().unwrap();
        assert_eq!(body.group_id, "G1");
        assert_eq!(body.name, "Foo");
    }

    #[test]
    fn failed_update_stays_in_edit() {
        let mut detail = DetailState::new();
        detail.show(fixtures::group("G1"));
        detail.begin_edit();
        detail.begin_submit().unwrap();
        assert!(detail.begin_submit().is_none());
        assert!(detail.complete_submit("G1", Err(err())).is_none());
        assert_eq!(detail.mode(), Mode::Edit);
        assert_eq!(detail.error, Some(Text::UpdateGroupFailed));
        assert!(!detail.is_saving());
    }

    #[test]
    fn selecting_another_item_resets_and_reloads_profile() {
        let mut detail = DetailState::new();
        let first = detail.show(fixtures::resident("R1")).unwrap();
        detail.begin_edit();
        assert!(detail.show(fixtures::resident("R1")).is_none());
        assert_eq!(detail.mode(), Mode::Edit);

        let second = detail.show(fixtures::resident("R2")).unwrap();
        assert_eq!(detail.mode(), Mode::Read);
        assert!(detail.buffer.is_none());
        assert!(!detail.profile.complete_load(&first, Ok("old".to_string())));
        assert!(detail.profile.complete_load(&second, Ok("new".to_string())));
        assert_eq!(detail.profile.text, "new");
    }

    #[test]
    fn profile_failure_is_empty_and_editable() {
        let mut profile = ProfileState::new();
        let ticket = profile.begin_load("R1");
        profile.complete_load(&ticket, Err(err()));
        assert_eq!(profile.error, Some(Text::LoadProfileFailed));
        assert!(profile.text.is_empty());
        assert!(!profile.loading);
        profile.text = "hello".to_string();
        let (save, text) = profile.begin_save().unwrap();
        assert_eq!(text, "hello");
        assert_eq!(save.id, "R1");
    }

    #[test]
    fn save_success_exits_fullscreen() {
        let mut profile = ProfileState::new();
        let ticket = profile.begin_load("G1");
        profile.complete_load(&ticket, Ok("  spaced  ".to_string()));
        profile.toggle_fullscreen();
        let (save, text) = profile.begin_save().unwrap();
        assert_eq!(text, "  spaced  ");
        assert!(profile.begin_save().is_none());
        profile.complete_save(&save, Ok(()));
        assert!(!profile.fullscreen);
        assert!(!profile.saving);
    }

    #[test]
    fn save_failure_reports_error() {
        let mut profile = ProfileState::new();
        let ticket = profile.begin_load("G1");
        profile.complete_load(&ticket, Ok(String::new()));
        profile.toggle_fullscreen();
        let (save, _) = profile.begin_save().unwrap();
        profile.complete_save(&save, Err(err()));
        assert_eq!(profile.error, Some(Text::SaveProfileFailed));
        assert!(profile.fullscreen);
    }

    #[test]
    fn save_without_item_is_refused() {
        let mut profile = ProfileState::new();
        assert!(profile.begin_save().is_none());
    }
}
