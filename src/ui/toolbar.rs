use crate::app::TimelineApp;
use crate::config::VISIBLE_YEAR_CHOICES;
use crate::ui::theme;
use egui::{menu, RichText, Ui};

/// Render the top toolbar / menu bar.
pub fn show_toolbar(app: &mut TimelineApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Reload Data          F5").clicked() {
                app.reload();
                ui.close_menu();
            }
            if ui.button("  Choose Data Folder...").clicked() {
                app.choose_data_dir();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Export Document").clicked() {
                app.export_document();
                ui.close_menu();
            }
            if ui.button("  Export Document As...").clicked() {
                app.export_document_as();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            ui.separator();
            if ui
                .checkbox(&mut app.settings.open_after_export, "Open after export")
                .changed()
            {
                app.save_settings();
            }
            if ui.button("  Open Export Folder").clicked() {
                app.open_export_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Visible Range").small().weak());
            let current = app.settings.visible_years;
            for years in VISIBLE_YEAR_CHOICES {
                let label = if years == 1 {
                    "1 year".to_string()
                } else {
                    format!("{} years", years)
                };
                if ui.radio(current == years, label).clicked() {
                    app.set_visible_years(years);
                    ui.close_menu();
                }
            }
            ui.separator();
            let mut overlay = app.capacity.enabled;
            if ui.checkbox(&mut overlay, "Capacity overlay").changed() {
                app.set_capacity_overlay(overlay);
            }
            if ui.button("  Edit Capacity...").clicked() {
                app.capacity_draft = Some(app.capacity.clone());
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Layout Issues...").clicked() {
                app.show_diagnostics = true;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        // Right-aligned data folder
        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(app.data_dir().display().to_string())
                    .size(11.0)
                    .weak(),
            );
        });
    });
}
