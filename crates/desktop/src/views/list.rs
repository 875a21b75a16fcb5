//! List+detail container: resident actions, list rows, pagination, divider and the
//! register dialog.

use eframe::egui;

use lib::i18n::{Language, Text};
use lib::list::AgentAction;
use lib::model::{ItemRef, Kind};
use lib::pagination::PageControls;
use lib::route::Route;

use super::{badge, error_banner};
use crate::app::AdminApp;

const DIVIDER_WIDTH: f32 = 8.0;
const PAGINATION_HEIGHT: f32 = 36.0;
const AGENT_BADGE: egui::Color32 = egui::Color32::from_rgb(79, 70, 229);
const PRIVATE_BADGE: egui::Color32 = egui::Color32::from_rgb(107, 114, 128);
const ENCRYPTED_BADGE: egui::Color32 = egui::Color32::from_rgb(22, 163, 74);

impl AdminApp {
    pub(crate) fn ui_list(&mut self, ui: &mut egui::Ui, kind: Kind, selected: Option<&str>, page: u32) {
        ui.add_space(16.0);
        if self.profile_fullscreen(kind) {
            self.ui_profile(ui, kind);
            return;
        }
        if kind == Kind::Residents {
            self.ui_resident_actions(ui);
            ui.add_space(8.0);
        }
        if let Some(err) = self.list.error() {
            error_banner(ui, self.tr(err));
        }
        if kind == Kind::Residents {
            if let Some(err) = self.actions.agents_error() {
                error_banner(ui, self.tr(err));
            }
        }

        let height = ui.available_height();
        let list_width = self.split.width();
        ui.horizontal_top(|ui| {
            ui.allocate_ui_with_layout(
                egui::vec2(list_width, height),
                egui::Layout::top_down(egui::Align::Min),
                |ui| {
                    ui.set_min_size(egui::vec2(list_width, height));
                    self.ui_list_column(ui, kind, selected, page, height);
                },
            );
            self.ui_divider(ui, height);
            ui.allocate_ui_with_layout(
                egui::vec2(ui.available_width(), height),
                egui::Layout::top_down(egui::Align::Min),
                |ui| self.ui_detail(ui, kind, selected),
            );
        });
    }

    fn ui_resident_actions(&mut self, ui: &mut egui::Ui) {
        let lang = self.language;
        ui.horizontal(|ui| {
            for action in AgentAction::ALL {
                let pending = self.actions.is_pending(action);
                let clicked = ui
                    .add_enabled(!pending, egui::Button::new(action.label().tr(lang)))
                    .clicked();
                if pending {
                    ui.spinner();
                }
                if clicked {
                    match action {
                        AgentAction::Register => self.register.open(),
                        _ => self.run_action(action),
                    }
                }
                ui.add_space(4.0);
            }
        });
    }

    fn ui_list_column(
        &mut self,
        ui: &mut egui::Ui,
        kind: Kind,
        selected: Option<&str>,
        page: u32,
        height: f32,
    ) {
        if self.list.is_loading() {
            ui.add_space(24.0);
            ui.vertical_centered(|ui| ui.spinner());
            return;
        }
        let lang = self.language;
        let mut target = None;
        {
            let page_data = self.list.page(page);
            egui::ScrollArea::vertical()
                .id_source("item_list")
                .max_height((height - PAGINATION_HEIGHT).max(0.0))
                .show(ui, |ui| {
                    for item in &page_data.items {
                        let is_selected = selected == Some(item.id());
                        if item_row(ui, *item, is_selected, lang).clicked() {
                            target = Some(Route::List {
                                kind,
                                id: Some(item.id().to_string()),
                                page,
                            });
                        }
                    }
                });
            if page_data.show_pagination {
                ui.add_space(8.0);
                if let Some(p) = pagination(ui, &page_data.controls(), lang) {
                    target = Some(Route::List {
                        kind,
                        id: selected.map(str::to_string),
                        page: p,
                    });
                }
            }
        }
        if let Some(target) = target {
            self.navigate(target);
        }
    }

    /// Draggable divider between the list and the detail panel.
    fn ui_divider(&mut self, ui: &mut egui::Ui, height: f32) {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(DIVIDER_WIDTH, height), egui::Sense::drag());
        let response = response.on_hover_cursor(egui::CursorIcon::ResizeHorizontal);
        if response.drag_started() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.split.begin_drag(pos.x);
            }
        }
        if response.dragged() {
            if let Some(pos) = response.interact_pointer_pos() {
                self.split.drag_to(pos.x);
            }
        }
        if response.drag_released() {
            self.split.end_drag();
        }
        let color = if response.hovered() || self.split.is_dragging() {
            ui.visuals().selection.stroke.color
        } else {
            ui.visuals().widgets.noninteractive.bg_stroke.color
        };
        ui.painter().line_segment(
            [rect.center_top(), rect.center_bottom()],
            egui::Stroke::new(2.0, color),
        );
    }

    pub(crate) fn ui_register_dialog(&mut self, ctx: &egui::Context) {
        if !self.register.open {
            return;
        }
        let lang = self.language;
        let t = move |text: Text| text.tr(lang);
        let pending = self.actions.is_pending(AgentAction::Register);
        let mut submit = false;
        let mut cancel = false;
        egui::Window::new(t(Text::RegisterNewResident))
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("register_form")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label(t(Text::Username));
                        ui.text_edit_singleline(&mut self.register.username);
                        ui.end_row();
                        ui.label(t(Text::Password));
                        ui.add(
                            egui::TextEdit::singleline(&mut self.register.password).password(true),
                        );
                        ui.end_row();
                    });
                if let Some(err) = self.register.error {
                    ui.add_space(8.0);
                    error_banner(ui, err.tr(lang));
                }
                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui
                        .add_enabled(!pending, egui::Button::new(t(Text::Cancel)))
                        .clicked()
                    {
                        cancel = true;
                    }
                    let ready = !pending && self.register.submit().is_some();
                    if ui
                        .add_enabled(ready, egui::Button::new(t(Text::Register)))
                        .clicked()
                    {
                        submit = true;
                    }
                    if pending {
                        ui.spinner();
                    }
                });
            });
        if cancel {
            self.register.close();
        }
        if submit {
            self.run_action(AgentAction::Register);
        }
    }
}

/// One clickable row of the list.
fn item_row(ui: &mut egui::Ui, item: ItemRef<'_>, selected: bool, lang: Language) -> egui::Response {
    let fill = if selected {
        ui.visuals().selection.bg_fill
    } else {
        ui.visuals().faint_bg_color
    };
    let frame = egui::Frame::none()
        .fill(fill)
        .rounding(egui::Rounding::same(6.0))
        .inner_margin(egui::Margin::same(8.0))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            match item {
                ItemRef::Resident(r) => {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&r.display_name).strong());
                        if r.is_agent {
                            badge(ui, Text::AiAgent.tr(lang), AGENT_BADGE);
                        }
                    });
                    ui.label(egui::RichText::new(&r.resident_id).small().weak());
                }
                ItemRef::Group(g) => {
                    ui.horizontal(|ui| {
                        ui.label(egui::RichText::new(&g.name).strong());
                        if !g.public {
                            badge(ui, Text::Private.tr(lang), PRIVATE_BADGE);
                        }
                        if g.encryption.is_some() {
                            badge(ui, Text::Encrypted.tr(lang), ENCRYPTED_BADGE);
                        }
                    });
                    ui.label(egui::RichText::new(&g.group_id).small().weak());
                    ui.label(
                        egui::RichText::new(format!("{} {}", g.size, Text::Members.tr(lang))).small(),
                    );
                }
                ItemRef::Model(m) => {
                    ui.label(egui::RichText::new(format!("{} {}", m.provider, m.version)).strong());
                    ui.label(egui::RichText::new(&m.model_id).small().weak());
                    ui.label(
                        egui::RichText::new(format!("{}B {}", m.size, Text::Parameters.tr(lang)))
                            .small(),
                    );
                    ui.label(
                        egui::RichText::new(format!("{}: {}", Text::GroupLabel.tr(lang), m.group_id))
                            .small(),
                    );
                }
            }
        });
    let response = ui.interact(
        frame.response.rect,
        ui.id().with(("item_row", item.id())),
        egui::Sense::click(),
    );
    ui.add_space(6.0);
    response.on_hover_cursor(egui::CursorIcon::PointingHand)
}

/// Previous, numbered window and next. Returns the page clicked, if any.
fn pagination(ui: &mut egui::Ui, controls: &PageControls, lang: Language) -> Option<u32> {
    let mut target = None;
    ui.horizontal(|ui| {
        if ui
            .add_enabled(controls.prev_enabled, egui::Button::new("‹"))
            .on_hover_text(Text::PreviousPage.tr(lang))
            .clicked()
        {
            target = Some(controls.prev());
        }
        for &p in &controls.pages {
            if ui
                .selectable_label(p == controls.current, p.to_string())
                .clicked()
            {
                target = Some(p);
            }
        }
        if ui
            .add_enabled(controls.next_enabled, egui::Button::new("›"))
            .on_hover_text(Text::NextPage.tr(lang))
            .clicked()
        {
            target = Some(controls.next());
        }
    });
    target
}
