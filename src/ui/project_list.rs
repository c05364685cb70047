use crate::model::Project;
use crate::ui::theme;
use egui::{Color32, RichText, Ui};
use uuid::Uuid;

/// Actions that the project list can request.
pub enum ProjectListAction {
    None,
    Select(Uuid),
    EnableTimeline(Uuid),
}

/// Compact period label, or why the project is not on the board.
fn schedule_label(project: &Project) -> String {
    match &project.timeline {
        None => "not scheduled".to_string(),
        Some(t) if !t.enabled => "timeline off".to_string(),
        Some(t) => match (t.start(), t.end()) {
            (Some(start), Some(end)) if t.duration_weeks > 0 => {
                format!("{} → {}", start.format("%d/%m/%y"), end.format("%d/%m/%y"))
            }
            _ => "invalid dates".to_string(),
        },
    }
}

/// Render the left-side project list.
pub fn show_project_list(
    projects: &[Project],
    selected: Option<Uuid>,
    filter: &mut String,
    ui: &mut Ui,
) -> ProjectListAction {
    let mut action = ProjectListAction::None;

    ui.add_space(2.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new("Projects")
                .strong()
                .size(15.0)
                .color(theme::TEXT_PRIMARY),
        );
        ui.add_space(4.0);
        let scheduled = projects.iter().filter(|p| p.active_timeline().is_some()).count();
        ui.label(
            RichText::new(format!("({} / {} on board)", scheduled, projects.len()))
                .size(11.0)
                .color(theme::TEXT_DIM),
        );
    });
    ui.add_space(4.0);
    ui.add_sized(
        [ui.available_width(), 22.0],
        egui::TextEdit::singleline(filter).hint_text(format!(
            "{} Filter projects...",
            egui_phosphor::regular::MAGNIFYING_GLASS
        )),
    );
    ui.add_space(4.0);
    ui.separator();

    let needle = filter.trim().to_lowercase();

    egui::ScrollArea::vertical()
        .id_salt("project_list")
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let visible = projects
                .iter()
                .filter(|p| needle.is_empty() || p.name.to_lowercase().contains(&needle));
            for (i, project) in visible.enumerate() {
                let is_selected = selected == Some(project.id);
                let row_bg = if is_selected {
                    theme::BG_SELECTED
                } else if i % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };

                let frame = egui::Frame {
                    fill: row_bg,
                    rounding: egui::Rounding::same(4.0),
                    inner_margin: egui::Margin::symmetric(6.0, 4.0),
                    outer_margin: egui::Margin::ZERO,
                    stroke: egui::Stroke::NONE,
                    shadow: egui::epaint::Shadow::NONE,
                };

                let frame_resp = frame.show(ui, |ui| {
                    ui.horizontal(|ui| {
                        ui.spacing_mut().item_spacing.x = 6.0;

                        let (dot_rect, _) =
                            ui.allocate_exact_size(egui::vec2(6.0, 6.0), egui::Sense::hover());
                        ui.painter().circle_filled(
                            dot_rect.center(),
                            3.0,
                            theme::to_color32(crate::layout::status_fill(project.status)),
                        );

                        let name_text = RichText::new(&project.name).size(12.0).color(if is_selected {
                            Color32::WHITE
                        } else {
                            theme::TEXT_PRIMARY
                        });
                        ui.add(egui::Label::new(name_text).truncate());

                        ui.with_layout(
                            egui::Layout::right_to_left(egui::Align::Center),
                            |ui| {
                                ui.spacing_mut().item_spacing.x = 4.0;
                                if project.timeline.is_none() {
                                    let btn = ui.add(
                                        egui::Button::new(
                                            RichText::new(egui_phosphor::regular::CALENDAR_PLUS)
                                                .size(12.0)
                                                .color(theme::TEXT_SECONDARY),
                                        )
                                        .frame(false),
                                    );
                                    if btn.on_hover_text("Add to timeline").clicked() {
                                        action = ProjectListAction::EnableTimeline(project.id);
                                    }
                                }
                                ui.label(
                                    RichText::new(schedule_label(project))
                                        .size(10.0)
                                        .color(theme::TEXT_SECONDARY),
                                );
                            },
                        );
                    });
                });

                let row_click = ui.interact(
                    frame_resp.response.rect,
                    egui::Id::new(("project-row", project.id)),
                    egui::Sense::click(),
                );
                if row_click.clicked() {
                    action = ProjectListAction::Select(project.id);
                }

                ui.add_space(1.0);
            }
        });

    action
}
