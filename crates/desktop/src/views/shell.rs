//! Sidebar, login and the static pages.

use eframe::egui;

use lib::i18n::Text;
use lib::model::Kind;
use lib::route::Route;

use crate::app::AdminApp;
use crate::logger;

const SCREEN_TITLE_BOTTOM_SPACING: f32 = 18.0;
const SCREEN_FOOTER_SPACING: f32 = 24.0;

impl AdminApp {
    pub(crate) fn ui_sidebar(&mut self, ctx: &egui::Context) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        let nav = [
            (Text::NavResidents, Route::list(Kind::Residents)),
            (Text::NavGroups, Route::list(Kind::Groups)),
            (Text::NavModels, Route::list(Kind::Models)),
            (Text::NavHome, Route::Home),
            (Text::NavLearn, Route::Learn),
            (Text::NavSettings, Route::Settings),
        ];
        egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(300.0)
            .width_range(240.0..=520.0)
            .show(ctx, |ui| {
                egui::Frame::none()
                    .inner_margin(egui::Margin::symmetric(16.0, 0.0))
                    .show(ui, |ui| {
                        ui.add_space(16.0);
                        ui.heading(t(Text::Brand));
                        ui.add_space(8.0);
                        ui.horizontal(|ui| {
                            if ui.small_button(t(Text::SwitchLanguage)).clicked() {
                                self.toggle_language();
                            }
                            if ui.small_button(t(Text::SignOut)).clicked() {
                                self.sign_out();
                            }
                        });
                        ui.add_space(12.0);
                        ui.separator();
                        ui.add_space(8.0);
                        for (label, target) in nav {
                            let selected = match (&self.route, &target) {
                                (Route::List { kind: a, .. }, Route::List { kind: b, .. }) => a == b,
                                (current, target) => current == target,
                            };
                            if ui.selectable_label(selected, t(label)).clicked() {
                                self.navigate(target);
                            }
                            ui.add_space(6.0);
                        }
                        ui.add_space(6.0);
                        ui.separator();
                        ui.add_space(8.0);
                        self.ui_chat(ui);
                    });
            });
    }

    pub(crate) fn ui_login(&mut self, ui: &mut egui::Ui) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        ui.add_space(64.0);
        ui.vertical_centered(|ui| {
            ui.heading(t(Text::LoginTitle));
            ui.add_space(SCREEN_TITLE_BOTTOM_SPACING);
            ui.label(t(Text::AccessToken));
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.token_input)
                    .password(true)
                    .desired_width(320.0),
            );
            let enter = response.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
            ui.add_space(8.0);
            let ready = !self.token_input.trim().is_empty();
            if ui
                .add_enabled(ready, egui::Button::new(t(Text::SignIn)))
                .clicked()
                || (ready && enter)
            {
                self.sign_in();
            }
            if let Some(err) = &self.login_error {
                ui.add_space(8.0);
                ui.colored_label(egui::Color32::RED, err);
            }
            ui.add_space(16.0);
            if ui.small_button(t(Text::SwitchLanguage)).clicked() {
                self.toggle_language();
            }
        });
    }

    pub(crate) fn ui_text_page(&mut self, ui: &mut egui::Ui, title: Text, body: Text) {
        ui.add_space(24.0);
        ui.heading(self.tr(title));
        ui.add_space(SCREEN_TITLE_BOTTOM_SPACING);
        ui.label(self.tr(body));
    }

    /// Effective configuration and the captured log lines.
    pub(crate) fn ui_settings(&mut self, ui: &mut egui::Ui) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        ui.add_space(24.0);
        ui.heading(t(Text::SettingsTitle));
        ui.add_space(SCREEN_TITLE_BOTTOM_SPACING);
        ui.label(t(Text::SettingsBody));
        ui.add_space(12.0);

        let not_set = t(Text::NotSet).to_string();
        let matrix = &self.config.matrix;
        egui::Grid::new("settings_grid")
            .num_columns(2)
            .spacing([24.0, 6.0])
            .show(ui, |ui| {
                ui.label(t(Text::ConfigFile));
                ui.label(self.config_path.display().to_string());
                ui.end_row();
                ui.label(t(Text::ApiBaseUrl));
                ui.label(&self.api_base_url);
                ui.end_row();
                ui.label(t(Text::MatrixHomeserver));
                ui.label(matrix.homeserver_url.as_deref().unwrap_or(&not_set));
                ui.end_row();
                ui.label(t(Text::MatrixUser));
                ui.label(matrix.user_id.as_deref().unwrap_or(&not_set));
                ui.end_row();
                ui.label(t(Text::MatrixRoom));
                ui.label(matrix.default_room_id.as_deref().unwrap_or(&not_set));
                ui.end_row();
                ui.label(t(Text::ChatNavigationCommands));
                ui.label(if self.config.chat.navigation_commands {
                    t(Text::EnabledState)
                } else {
                    t(Text::DisabledState)
                });
                ui.end_row();
            });

        ui.add_space(SCREEN_TITLE_BOTTOM_SPACING);
        ui.label(egui::RichText::new(t(Text::Logs)).strong());
        ui.add_space(6.0);
        let lines = logger::lines();
        let scroll_height = (ui.available_height() - SCREEN_FOOTER_SPACING).max(0.0);
        egui::ScrollArea::vertical()
            .id_source("log_lines")
            .max_height(scroll_height)
            .stick_to_bottom(true)
            .show(ui, |ui| {
                for line in &lines {
                    ui.label(egui::RichText::new(line.as_str()).family(egui::FontFamily::Monospace));
                }
                if lines.is_empty() {
                    ui.label(t(Text::NoLogs));
                }
            });
    }
}
