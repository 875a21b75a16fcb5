//! Detail panel: resident and group read/edit forms, model details and the profile
//! editor.

use eframe::egui;

use lib::detail::{Mode, ProfileState};
use lib::i18n::Text;
use lib::model::{AgentState, ItemRef, Kind, LifecycleState, Role};

use super::{error_banner, format_millis};
use crate::app::AdminApp;

const PROFILE_ROWS: usize = 8;
const FULLSCREEN_PROFILE_ROWS: usize = 30;

/// Text field bound to an optional string; an emptied field becomes None.
fn optional_text(ui: &mut egui::Ui, value: &mut Option<String>) {
    let mut text = value.clone().unwrap_or_default();
    if ui.text_edit_singleline(&mut text).changed() {
        *value = if text.is_empty() { None } else { Some(text) };
    }
}

impl AdminApp {
    fn profile_mut(&mut self, kind: Kind) -> Option<&mut ProfileState> {
        match kind {
            Kind::Residents => Some(&mut self.residents.profile),
            Kind::Groups => Some(&mut self.groups.profile),
            Kind::Models => None,
        }
    }

    /// True when the profile editor of the shown item covers the list area.
    pub(crate) fn profile_fullscreen(&self, kind: Kind) -> bool {
        match kind {
            Kind::Residents => self.residents.item().is_some() && self.residents.profile.fullscreen,
            Kind::Groups => self.groups.item().is_some() && self.groups.profile.fullscreen,
            Kind::Models => false,
        }
    }

    pub(crate) fn ui_detail(&mut self, ui: &mut egui::Ui, kind: Kind, selected: Option<&str>) {
        egui::ScrollArea::vertical()
            .id_source("detail_panel")
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.add_space(4.0);
                match kind {
                    Kind::Residents if self.residents.item().is_some() => {
                        self.ui_resident_detail(ui);
                        ui.add_space(16.0);
                        self.ui_profile(ui, kind);
                    }
                    Kind::Groups if self.groups.item().is_some() => {
                        self.ui_group_detail(ui);
                        ui.add_space(16.0);
                        self.ui_profile(ui, kind);
                    }
                    Kind::Models => self.ui_model_detail(ui, selected),
                    _ => {
                        ui.label(egui::RichText::new(self.tr(Text::SelectItem)).weak());
                    }
                }
            });
    }

    fn ui_model_detail(&mut self, ui: &mut egui::Ui, selected: Option<&str>) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        let Some(ItemRef::Model(model)) = selected.and_then(|id| self.list.find(id)) else {
            ui.label(egui::RichText::new(t(Text::SelectItem)).weak());
            return;
        };
        ui.heading(format!("{} {}", model.provider, model.version));
        ui.label(egui::RichText::new(&model.model_id).weak());
        ui.add_space(12.0);
        egui::Grid::new("model_detail")
            .num_columns(2)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                ui.label(t(Text::Parameters));
                ui.label(format!("{}B", model.size));
                ui.end_row();
                ui.label(t(Text::GroupLabel));
                ui.label(&model.group_id);
                ui.end_row();
            });
        ui.add_space(12.0);
        ui.label(egui::RichText::new(t(Text::ModelDetailsPlaceholder)).weak());
    }

    fn ui_resident_detail(&mut self, ui: &mut egui::Ui) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        let Some(resident) = self.residents.item().cloned() else {
            return;
        };
        let mode = self.residents.mode();
        let saving = self.residents.is_saving();

        let mut toggle = false;
        ui.horizontal(|ui| {
            ui.heading(&resident.display_name);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = match mode {
                    Mode::Read => t(Text::Edit),
                    Mode::Edit => t(Text::Cancel),
                };
                if ui.add_enabled(!saving, egui::Button::new(label)).clicked() {
                    toggle = true;
                }
            });
        });
        ui.label(egui::RichText::new(&resident.resident_id).weak());
        if resident.avatar_url.is_empty() {
            ui.label(egui::RichText::new(t(Text::NoAvatar)).weak());
        } else {
            ui.hyperlink_to(t(Text::Avatar), &resident.avatar_url);
        }
        ui.add_space(8.0);
        if let Some(err) = self.residents.error {
            error_banner(ui, t(err));
        }

        let mut submit = false;
        match (mode, self.residents.buffer.as_mut()) {
            (Mode::Edit, Some(buffer)) => {
                egui::Grid::new("resident_edit")
                    .num_columns(2)
                    .spacing([24.0, 8.0])
                    .show(ui, |ui| {
                        ui.label(t(Text::DisplayName));
                        ui.text_edit_singleline(&mut buffer.display_name);
                        ui.end_row();
                        ui.label(t(Text::Email));
                        optional_text(ui, &mut buffer.email);
                        ui.end_row();
                        ui.label(t(Text::AgentStatus));
                        egui::ComboBox::from_id_source("resident_agent")
                            .selected_text(agent_label(buffer.agent).map_or("", t))
                            .show_ui(ui, |ui| {
                                ui.selectable_value(
                                    &mut buffer.agent,
                                    Some(AgentState::Enabled),
                                    t(Text::Enabled),
                                );
                                ui.selectable_value(
                                    &mut buffer.agent,
                                    Some(AgentState::Disabled),
                                    t(Text::Disabled),
                                );
                            });
                        ui.end_row();
                        ui.label(t(Text::Role));
                        egui::ComboBox::from_id_source("resident_role")
                            .selected_text(role_label(buffer.role).map_or("", t))
                            .show_ui(ui, |ui| {
                                ui.selectable_value(&mut buffer.role, Some(Role::Admin), t(Text::Admin));
                                ui.selectable_value(&mut buffer.role, Some(Role::User), t(Text::User));
                            });
                        ui.end_row();
                    });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!saving, egui::Button::new(t(Text::SaveChanges)))
                        .clicked()
                    {
                        submit = true;
                    }
                    if saving {
                        ui.spinner();
                    }
                });
            }
            _ => {
                egui::Grid::new("resident_read")
                    .num_columns(2)
                    .spacing([24.0, 6.0])
                    .show(ui, |ui| {
                        ui.label(t(Text::Role));
                        ui.label(t(match resident.role {
                            Some(Role::Admin) => Text::Administrator,
                            Some(Role::User) => Text::User,
                            None => Text::NotSet,
                        }));
                        ui.end_row();
                        ui.label(t(Text::Email));
                        ui.label(resident.email.as_deref().unwrap_or(t(Text::NotSet)));
                        ui.end_row();
                        ui.label(t(Text::LastLogin));
                        let last_login = resident
                            .last_login_timestamp_ms
                            .and_then(|ms| format_millis(ms, "%Y-%m-%d %H:%M"))
                            .unwrap_or_else(|| t(Text::Never).to_string());
                        ui.label(last_login);
                        ui.end_row();
                        ui.label(t(Text::AgentStatus));
                        ui.label(t(match resident.agent {
                            Some(AgentState::Enabled) => Text::EnabledState,
                            Some(AgentState::Disabled) => Text::DisabledState,
                            None => Text::NotSet,
                        }));
                        ui.end_row();
                        ui.label(t(Text::Status));
                        ui.label(t(match resident.state {
                            Some(LifecycleState::Active) => Text::Active,
                            Some(LifecycleState::Inactive) => Text::Inactive,
                            None => Text::NotSet,
                        }));
                        ui.end_row();
                    });
            }
        }

        if toggle {
            match mode {
                Mode::Read => self.residents.begin_edit(),
                Mode::Edit => self.residents.cancel_edit(),
            }
        }
        if submit {
            self.submit_resident();
        }
    }

    fn ui_group_detail(&mut self, ui: &mut egui::Ui) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        let Some(group) = self.groups.item().cloned() else {
            return;
        };
        let mode = self.groups.mode();
        let saving = self.groups.is_saving();

        let mut toggle = false;
        ui.horizontal(|ui| {
            ui.heading(&group.name);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = match mode {
                    Mode::Read => t(Text::Edit),
                    Mode::Edit => t(Text::Cancel),
                };
                if ui.add_enabled(!saving, egui::Button::new(label)).clicked() {
                    toggle = true;
                }
            });
        });
        match group.avatar_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => {
                ui.hyperlink_to(t(Text::Avatar), url);
            }
            None => {
                ui.label(egui::RichText::new(t(Text::NoAvatar)).weak());
            }
        }
        ui.add_space(8.0);
        if let Some(err) = self.groups.error {
            error_banner(ui, t(err));
        }

        let mut submit = false;
        match (mode, self.groups.buffer.as_mut()) {
            (Mode::Edit, Some(buffer)) => {
                egui::Grid::new("group_edit")
                    .num_columns(2)
                    .spacing([24.0, 8.0])
                    .show(ui, |ui| {
                        ui.label(t(Text::GroupName));
                        ui.text_edit_singleline(&mut buffer.name);
                        ui.end_row();
                        ui.label(t(Text::Alias));
                        ui.text_edit_singleline(&mut buffer.alias);
                        ui.end_row();
                        ui.label(t(Text::Visibility));
                        ui.checkbox(&mut buffer.public, t(Text::Public));
                        ui.end_row();
                        ui.label(t(Text::AvatarUrl));
                        optional_text(ui, &mut buffer.avatar_url);
                        ui.end_row();
                    });
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!saving, egui::Button::new(t(Text::SaveChanges)))
                        .clicked()
                    {
                        submit = true;
                    }
                    if saving {
                        ui.spinner();
                    }
                });
            }
            _ => {
                egui::Grid::new("group_read")
                    .num_columns(2)
                    .spacing([24.0, 6.0])
                    .show(ui, |ui| {
                        ui.label(t(Text::GroupId));
                        ui.label(&group.group_id);
                        ui.end_row();
                        ui.label(t(Text::Alias));
                        ui.label(if group.alias.is_empty() {
                            t(Text::NotSet)
                        } else {
                            group.alias.as_str()
                        });
                        ui.end_row();
                        ui.label(t(Text::Members));
                        ui.label(group.size.to_string());
                        ui.end_row();
                        ui.label(t(Text::Visibility));
                        ui.label(t(if group.public { Text::Public } else { Text::Private }));
                        ui.end_row();
                        ui.label(t(Text::Encryption));
                        ui.label(t(if group.encryption.is_some() {
                            Text::Encrypted
                        } else {
                            Text::NotEncrypted
                        }));
                        ui.end_row();
                    });
            }
        }

        if toggle {
            match mode {
                Mode::Read => self.groups.begin_edit(),
                Mode::Edit => self.groups.cancel_edit(),
            }
        }
        if submit {
            self.submit_group();
        }
    }

    /// Profile editor of the shown resident or group, inline or covering the list area.
    pub(crate) fn ui_profile(&mut self, ui: &mut egui::Ui, kind: Kind) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        let (title, placeholder) = match kind {
            Kind::Groups => (Text::GroupProfile, Text::GroupProfilePlaceholder),
            _ => (Text::ResidentProfile, Text::ResidentProfilePlaceholder),
        };
        let Some(profile) = self.profile_mut(kind) else {
            return;
        };

        let mut save = false;
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(t(title)).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let label = if profile.fullscreen {
                    t(Text::ExitFullscreen)
                } else {
                    t(Text::Fullscreen)
                };
                if ui.small_button(label).clicked() {
                    profile.toggle_fullscreen();
                }
            });
        });
        ui.add_space(6.0);
        if let Some(err) = profile.error {
            error_banner(ui, t(err));
        }
        if profile.loading {
            ui.spinner();
            return;
        }
        let rows = if profile.fullscreen {
            FULLSCREEN_PROFILE_ROWS
        } else {
            PROFILE_ROWS
        };
        ui.add(
            egui::TextEdit::multiline(&mut profile.text)
                .hint_text(t(placeholder))
                .desired_rows(rows)
                .desired_width(f32::INFINITY),
        );
        ui.add_space(8.0);
        ui.horizontal(|ui| {
            if ui
                .add_enabled(!profile.saving, egui::Button::new(t(Text::SaveProfile)))
                .clicked()
            {
                save = true;
            }
            if profile.saving {
                ui.spinner();
            }
        });
        if save {
            self.save_profile(kind);
        }
    }
}

fn role_label(role: Option<Role>) -> Option<Text> {
    role.map(|r| match r {
        Role::Admin => Text::Admin,
        Role::User => Text::User,
    })
}

fn agent_label(agent: Option<AgentState>) -> Option<Text> {
    agent.map(|a| match a {
        AgentState::Enabled => Text::Enabled,
        AgentState::Disabled => Text::Disabled,
    })
}
