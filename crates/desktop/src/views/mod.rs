//! egui rendering, split by screen region. Each module adds `ui_*` methods to the app.

mod chat;
mod detail;
mod list;
mod shell;

use eframe::egui;

const BANNER_TEXT: egui::Color32 = egui::Color32::from_rgb(220, 38, 38);
const BANNER_FILL: egui::Color32 = egui::Color32::from_rgb(254, 242, 242);

/// Red inline error, scoped to the section that failed.
pub(crate) fn error_banner(ui: &mut egui::Ui, text: &str) {
    egui::Frame::none()
        .fill(BANNER_FILL)
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.colored_label(BANNER_TEXT, text);
        });
    ui.add_space(8.0);
}

/// Small coloured tag next to a name.
pub(crate) fn badge(ui: &mut egui::Ui, text: &str, color: egui::Color32) {
    ui.label(
        egui::RichText::new(format!(" {} ", text))
            .small()
            .color(egui::Color32::WHITE)
            .background_color(color),
    );
}

/// Local time of a millisecond timestamp, e.g. `format_millis(ms, "%H:%M")`.
pub(crate) fn format_millis(ms: i64, fmt: &str) -> Option<String> {
    chrono::DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.with_timezone(&chrono::Local).format(fmt).to_string())
}
