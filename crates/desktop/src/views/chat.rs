//! Chat panel at the bottom of the sidebar.

use eframe::egui;

use lib::chat::{ConnectionState, SendKind};
use lib::i18n::Text;

use super::{error_banner, format_millis};
use crate::app::AdminApp;

const OWN_BUBBLE: egui::Color32 = egui::Color32::from_rgb(219, 234, 254);
const OTHER_BUBBLE: egui::Color32 = egui::Color32::from_rgb(243, 244, 246);
const INPUT_ROWS: usize = 2;
const FOOTER_HEIGHT: f32 = 140.0;

impl AdminApp {
    pub(crate) fn ui_chat(&mut self, ui: &mut egui::Ui) {
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        if self.chat.client.is_none() {
            ui.label(egui::RichText::new(t(Text::ChatUnavailable)).weak());
            return;
        }

        let session = &self.chat.session;
        let connected = session.is_connected();
        if *session.state() == ConnectionState::Connecting {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(t(Text::Connecting));
            });
        }
        let mut dismiss = false;
        if let Some(err) = session.error() {
            ui.horizontal(|ui| {
                if ui.small_button("×").clicked() {
                    dismiss = true;
                }
                ui.vertical(|ui| error_banner(ui, t(err)));
            });
        }
        if let ConnectionState::Failed {
            retry_at: Some(_), ..
        } = session.state()
        {
            ui.label(egui::RichText::new(t(Text::RetryScheduled)).small().weak());
        }

        let height = (ui.available_height() - FOOTER_HEIGHT).max(80.0);
        egui::ScrollArea::vertical()
            .id_source("chat_transcript")
            .max_height(height)
            .auto_shrink([false, false])
            .stick_to_bottom(true)
            .show(ui, |ui| {
                let transcript = session.transcript();
                if transcript.is_empty() {
                    ui.label(egui::RichText::new(t(Text::NoMessages)).weak());
                }
                for entry in transcript {
                    let fill = if session.is_own(entry) {
                        OWN_BUBBLE
                    } else {
                        OTHER_BUBBLE
                    };
                    egui::Frame::none()
                        .fill(fill)
                        .rounding(egui::Rounding::same(6.0))
                        .inner_margin(egui::Margin::same(6.0))
                        .show(ui, |ui| {
                            ui.set_width(ui.available_width());
                            ui.horizontal(|ui| {
                                ui.label(egui::RichText::new(&entry.sender).small().strong());
                                if let Some(time) = format_millis(entry.timestamp_ms, "%H:%M:%S") {
                                    ui.label(egui::RichText::new(time).small().weak());
                                }
                            });
                            ui.label(&entry.body);
                        });
                    ui.add_space(4.0);
                }
            });
        let sending_text = session.is_sending(SendKind::Text);
        let sending_file = session.is_sending(SendKind::File);
        let sending_voice = session.is_sending(SendKind::Voice);

        ui.add_space(6.0);
        let input_id = egui::Id::new("chat_input");
        // Taken before the text edit runs so Enter never lands in the message.
        let enter = connected
            && ui.memory(|m| m.has_focus(input_id))
            && ui.input_mut(consume_send_key);
        ui.add_enabled(
            connected,
            egui::TextEdit::multiline(&mut self.chat.input)
                .id(input_id)
                .hint_text(t(Text::TypeMessage))
                .desired_rows(INPUT_ROWS)
                .desired_width(f32::INFINITY),
        );
        let mut send_text = enter;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(connected && !sending_text, egui::Button::new(t(Text::Send)))
                .clicked()
            {
                send_text = true;
            }
            if sending_text {
                ui.spinner();
            }
        });

        ui.add_space(6.0);
        ui.add_enabled(
            connected,
            egui::TextEdit::singleline(&mut self.chat.file_path)
                .hint_text(t(Text::FilePath))
                .desired_width(f32::INFINITY),
        );
        let has_path = !self.chat.file_path.trim().is_empty();
        let mut send_file = None;
        ui.horizontal(|ui| {
            if ui
                .add_enabled(
                    connected && has_path && !sending_file,
                    egui::Button::new(t(Text::UploadFile)),
                )
                .clicked()
            {
                send_file = Some(SendKind::File);
            }
            if ui
                .add_enabled(
                    connected && has_path && !sending_voice,
                    egui::Button::new(t(Text::SendVoice)),
                )
                .clicked()
            {
                send_file = Some(SendKind::Voice);
            }
            if sending_file || sending_voice {
                ui.spinner();
            }
        });

        if dismiss {
            self.chat.session.clear_error();
        }
        if send_text {
            self.send_chat_text();
        }
        if let Some(kind) = send_file {
            self.send_chat_file(kind);
        }
    }
}

/// Enter without shift sends; shift+Enter stays a newline in the input.
fn consume_send_key(input: &mut egui::InputState) -> bool {
    !input.modifiers.shift && input.consume_key(egui::Modifiers::NONE, egui::Key::Enter)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key_event(modifiers: egui::Modifiers) -> egui::Event {
        egui::Event::Key {
            key: egui::Key::Enter,
            pressed: true,
            repeat: false,
            modifiers,
        }
    }

    #[test]
    fn plain_enter_is_taken_from_the_input() {
        let mut input = egui::InputState::default();
        input.events.push(key_event(egui::Modifiers::NONE));
        assert!(consume_send_key(&mut input));
        assert!(input.events.is_empty());
    }

    #[test]
    fn shift_enter_is_left_for_the_text_edit() {
        let mut input = egui::InputState::default();
        input.modifiers = egui::Modifiers::SHIFT;
        input.events.push(key_event(egui::Modifiers::SHIFT));
        assert!(!consume_send_key(&mut input));
        assert_eq!(input.events.len(), 1);
    }
}
