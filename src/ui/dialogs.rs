use crate::app::TimelineApp;
use crate::model::QuarterKey;
use crate::ui::theme;
use egui::{Color32, Context, RichText, Window};

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Timeline Board").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("Project timelines, dependencies");
                ui.label("and team capacity at a glance.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the per-quarter capacity editor for the visible window.
pub fn show_capacity_dialog(app: &mut TimelineApp, ctx: &Context) {
    let quarters: Vec<(QuarterKey, String)> = app
        .layout()
        .quarters
        .iter()
        .map(|q| (q.key, q.label.clone()))
        .collect();
    let current = QuarterKey::containing(app.today());
    let Some(draft) = app.capacity_draft.as_mut() else {
        return;
    };

    let mut save = false;
    let mut cancel = false;
    Window::new(RichText::new("Team Capacity").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;
            ui.visuals_mut().faint_bg_color = Color32::TRANSPARENT;

            ui.checkbox(&mut draft.enabled, "Show capacity overlay on the board");
            ui.add_space(6.0);

            egui::ScrollArea::vertical().max_height(320.0).show(ui, |ui| {
                egui::Grid::new("capacity_grid")
                    .num_columns(2)
                    .striped(false)
                    .spacing([12.0, 6.0])
                    .show(ui, |ui| {
                        for (key, label) in &quarters {
                            let text = RichText::new(label);
                            if *key == current {
                                ui.label(text.strong().color(theme::ACCENT));
                            } else {
                                ui.label(text.color(theme::TEXT_SECONDARY));
                            }
                            let mut percentage = draft.percentage_for(*key);
                            let drag = ui.add(
                                egui::DragValue::new(&mut percentage)
                                    .range(0..=100)
                                    .suffix(" %"),
                            );
                            if drag.changed() {
                                draft.set_percentage(*key, percentage);
                            }
                            ui.end_row();
                        }
                    });
            });

            let unrecognized = draft.quarters.iter().filter(|e| e.quarter.key().is_none()).count();
            if unrecognized > 0 {
                ui.add_space(4.0);
                ui.label(
                    RichText::new(format!("{} stored entries use an unknown quarter label and are ignored", unrecognized))
                        .size(10.5)
                        .color(theme::TEXT_DIM),
                );
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_sized([80.0, 28.0], save_btn).clicked() {
                    save = true;
                }
                if ui.add_sized([80.0, 28.0], egui::Button::new("Cancel")).clicked() {
                    cancel = true;
                }
            });
        });

    if save {
        if let Some(capacity) = app.capacity_draft.take() {
            app.save_capacity(capacity);
        }
    } else if cancel || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.capacity_draft = None;
    }
}

/// List rows and dependencies the layout could not place.
pub fn show_diagnostics_dialog(app: &mut TimelineApp, ctx: &Context) {
    let mut open = true;
    Window::new(RichText::new("Layout Issues").strong().size(14.0))
        .open(&mut open)
        .resizable(true)
        .collapsible(false)
        .default_size([460.0, 260.0])
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            let diagnostics = &app.layout().diagnostics;
            if diagnostics.is_empty() {
                ui.label(RichText::new("Every enabled timeline is on the board.").color(theme::TEXT_SECONDARY));
                return;
            }
            egui::ScrollArea::vertical().show(ui, |ui| {
                for diagnostic in diagnostics {
                    let color = if diagnostic.skips_row() {
                        theme::TEXT_ERROR
                    } else {
                        theme::TEXT_SECONDARY
                    };
                    ui.label(
                        RichText::new(format!("{} {}", egui_phosphor::regular::WARNING, diagnostic.message()))
                            .color(color),
                    );
                }
            });
        });
    if !open || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_diagnostics = false;
    }
}
