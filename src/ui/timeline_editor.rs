use crate::model::{CalendarDate, Contact, DependencyKind, Project, ProjectStatus};
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, Id, RichText, Ui};
use uuid::Uuid;

/// Actions the editor can request.
///
/// `Changed` means the draft was edited in place; the rest go through the
/// validated scheduling operations.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    None,
    Changed,
    Enable,
    Detach,
    AddDependency { source: Uuid, kind: DependencyKind },
    RemoveDependency(Uuid),
    AddMilestone { name: String, date: NaiveDate },
    ToggleMilestone(Uuid),
    RemoveMilestone(Uuid),
}

/// Persistent state for the "add dependency" picker.
#[derive(Clone)]
struct DepPickerState {
    source_id: Option<Uuid>,
    kind: DependencyKind,
}

/// Persistent state for the "add milestone" row.
#[derive(Clone)]
struct MilestoneDraft {
    name: String,
    date: NaiveDate,
}

fn field_label(ui: &mut Ui, text: &str) {
    ui.label(RichText::new(text).size(10.0).color(theme::TEXT_DIM).strong());
}

fn remove_button(ui: &mut Ui, hover: &str) -> bool {
    ui.add(
        egui::Button::new(RichText::new(egui_phosphor::regular::X).size(9.0).color(theme::TEXT_DIM))
            .frame(false),
    )
    .on_hover_text(hover)
    .clicked()
}

/// Render the timeline editor for the selected project draft.
pub fn show_timeline_editor(
    project: &mut Project,
    all_projects: &[Project],
    contacts: &[Contact],
    today: NaiveDate,
    ui: &mut Ui,
) -> EditorAction {
    let mut action = EditorAction::None;
    let project_id = project.id;

    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label(
            RichText::new(&project.name)
                .strong()
                .size(13.0)
                .color(theme::TEXT_PRIMARY),
        );
    });
    ui.add_space(4.0);

    let frame = egui::Frame {
        fill: theme::BG_DARK,
        rounding: egui::Rounding::same(5.0),
        inner_margin: egui::Margin::same(8.0),
        outer_margin: egui::Margin::ZERO,
        stroke: egui::Stroke::new(1.0, theme::BORDER_SUBTLE),
        shadow: egui::epaint::Shadow::NONE,
    };

    frame.show(ui, |ui| {
        ui.spacing_mut().item_spacing.y = 6.0;
        ui.visuals_mut().extreme_bg_color = theme::BG_FIELD;

        // ── Status ─────────────────────────────────────────────────────
        field_label(ui, "Status");
        egui::ComboBox::from_id_salt(("status_combo", project_id))
            .selected_text(RichText::new(project.status.label()).size(11.0))
            .width(ui.available_width())
            .show_ui(ui, |ui| {
                for status in ProjectStatus::all() {
                    if ui
                        .selectable_value(&mut project.status, *status, status.label())
                        .changed()
                    {
                        action = EditorAction::Changed;
                    }
                }
            });

        let Some(timeline) = project.timeline.as_mut() else {
            ui.add_space(4.0);
            ui.label(
                RichText::new("This project is not on the timeline")
                    .size(10.5)
                    .color(theme::TEXT_DIM),
            );
            let btn = egui::Button::new(
                RichText::new(format!("{}  Add to timeline", egui_phosphor::regular::CALENDAR_PLUS))
                    .color(Color32::WHITE)
                    .size(12.0),
            )
            .fill(theme::ACCENT)
            .rounding(egui::Rounding::same(4.0));
            if ui.add_sized([ui.available_width(), 26.0], btn).clicked() {
                action = EditorAction::Enable;
            }
            return;
        };

        if ui.checkbox(&mut timeline.enabled, "Show on board").changed() {
            action = EditorAction::Changed;
        }

        // ── Start and duration ─────────────────────────────────────────
        if let CalendarDate::Malformed(raw) = &timeline.start_date {
            ui.label(
                RichText::new(format!("Stored start date '{}' is invalid", raw))
                    .size(10.0)
                    .color(theme::TEXT_ERROR),
            );
        }
        ui.horizontal(|ui| {
            ui.vertical(|ui| {
                field_label(ui, "Start");
                let mut start = timeline.start().unwrap_or(today);
                let resp = ui.add(
                    egui_extras::DatePickerButton::new(&mut start).id_salt("dp_timeline_start"),
                );
                if resp.changed() {
                    timeline.start_date = CalendarDate::Valid(start);
                    action = EditorAction::Changed;
                }
            });

            ui.add_space(8.0);

            ui.vertical(|ui| {
                field_label(ui, "Duration");
                let resp = ui.add(
                    egui::DragValue::new(&mut timeline.duration_weeks)
                        .range(1..=520)
                        .suffix(" weeks"),
                );
                if resp.changed() {
                    action = EditorAction::Changed;
                }
            });
        });
        if let Some(end) = timeline.end() {
            ui.label(
                RichText::new(format!("Ends {}", end.format("%d/%m/%Y")))
                    .size(10.0)
                    .color(theme::TEXT_SECONDARY),
            );
        }

        // ── Progress ───────────────────────────────────────────────────
        field_label(ui, "Progress");
        let slider = egui::Slider::new(&mut timeline.progress, 0..=100).suffix("%");
        if ui.add_sized([ui.available_width(), 20.0], slider).changed() {
            action = EditorAction::Changed;
        }

        // ── Team ───────────────────────────────────────────────────────
        ui.separator();
        field_label(ui, "Team");
        let mut remove_member = None;
        for member in &timeline.team {
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(crate::model::contact::resolve_name(contacts, *member))
                        .size(11.0)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if remove_button(ui, "Remove from team") {
                        remove_member = Some(*member);
                    }
                });
            });
        }
        if let Some(member) = remove_member {
            timeline.team.retain(|id| *id != member);
            action = EditorAction::Changed;
        }
        let available: Vec<&Contact> = contacts
            .iter()
            .filter(|c| !timeline.team.contains(&c.id))
            .collect();
        if !available.is_empty() {
            egui::ComboBox::from_id_salt(("team_add", project_id))
                .selected_text(RichText::new("— add member —").size(11.0))
                .width(ui.available_width())
                .show_ui(ui, |ui| {
                    for contact in available {
                        if ui.selectable_label(false, contact.display_name()).clicked() {
                            timeline.team.push(contact.id);
                            action = EditorAction::Changed;
                        }
                    }
                });
        }

        // ── Milestones ─────────────────────────────────────────────────
        ui.separator();
        field_label(ui, "Milestones");
        if timeline.milestones.is_empty() {
            ui.label(RichText::new("No milestones yet").size(9.5).color(theme::TEXT_DIM));
        }
        for milestone in &timeline.milestones {
            ui.horizontal(|ui| {
                let mut done = milestone.completed;
                if ui.checkbox(&mut done, "").changed() {
                    action = EditorAction::ToggleMilestone(milestone.id);
                }
                ui.label(
                    RichText::new(format!("{} · {}", milestone.name, milestone.date))
                        .size(11.0)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if remove_button(ui, "Remove milestone") {
                        action = EditorAction::RemoveMilestone(milestone.id);
                    }
                });
            });
        }

        let draft_id = Id::new(("milestone-draft", project_id));
        let mut draft: MilestoneDraft = ui.ctx().data_mut(|d| {
            d.get_temp(draft_id).unwrap_or(MilestoneDraft {
                name: String::new(),
                date: timeline.start().unwrap_or(today),
            })
        });
        ui.horizontal(|ui| {
            let name_w = (ui.available_width() - 130.0).max(60.0);
            ui.add_sized(
                [name_w, 22.0],
                egui::TextEdit::singleline(&mut draft.name).hint_text("Milestone..."),
            );
            ui.add(egui_extras::DatePickerButton::new(&mut draft.date).id_salt("dp_milestone_new"));
            let can_add = !draft.name.trim().is_empty();
            let btn = egui::Button::new(RichText::new("＋").size(13.0).color(Color32::WHITE))
                .fill(if can_add { theme::ACCENT } else { theme::BG_FIELD })
                .rounding(egui::Rounding::same(4.0));
            if ui.add_enabled(can_add, btn).clicked() {
                action = EditorAction::AddMilestone {
                    name: draft.name.trim().to_string(),
                    date: draft.date,
                };
                draft.name.clear();
            }
        });
        ui.ctx().data_mut(|d| d.insert_temp(draft_id, draft));

        // ── Dependencies ───────────────────────────────────────────────
        ui.separator();
        field_label(ui, "Depends on");
        if timeline.dependencies.is_empty() {
            ui.label(RichText::new("No dependencies yet").size(9.5).color(theme::TEXT_DIM));
        }
        for dep in &timeline.dependencies {
            let source_name = all_projects
                .iter()
                .find(|p| p.id == dep.project_id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| crate::model::contact::UNKNOWN_NAME.to_string());
            ui.horizontal(|ui| {
                ui.label(
                    RichText::new(format!("[{}] {}", dep.kind.short_label(), dep.kind.describe(&source_name)))
                        .size(11.0)
                        .color(theme::TEXT_SECONDARY),
                );
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if remove_button(ui, "Remove dependency") {
                        action = EditorAction::RemoveDependency(dep.project_id);
                    }
                });
            });
        }

        let candidates: Vec<(Uuid, String)> = all_projects
            .iter()
            .filter(|p| {
                p.id != project_id && p.timeline.is_some() && !timeline.depends_on(p.id)
            })
            .map(|p| (p.id, p.name.clone()))
            .collect();

        if !candidates.is_empty() {
            let picker_id = Id::new(("dep-picker", project_id));
            let mut state: DepPickerState = ui.ctx().data_mut(|d| {
                d.get_temp(picker_id).unwrap_or(DepPickerState {
                    source_id: None,
                    kind: DependencyKind::FinishToStart,
                })
            });

            let source_label = state
                .source_id
                .and_then(|id| candidates.iter().find(|(cid, _)| *cid == id))
                .map(|(_, name)| name.clone())
                .unwrap_or_else(|| "— pick project —".to_string());

            ui.horizontal(|ui| {
                let kind_resp = egui::ComboBox::from_id_salt("new-dep-kind")
                    .selected_text(RichText::new(state.kind.short_label()).size(11.0))
                    .width(46.0)
                    .show_ui(ui, |ui| {
                        for k in DependencyKind::all() {
                            let row = ui.selectable_label(state.kind == *k, k.short_label());
                            if row.on_hover_text(k.label()).clicked() {
                                state.kind = *k;
                            }
                        }
                    });
                kind_resp.response.on_hover_text(state.kind.label());

                let combo_w = (ui.available_width() - 30.0).clamp(60.0, 220.0);
                egui::ComboBox::from_id_salt("new-dep-source")
                    .selected_text(RichText::new(&source_label).size(11.0))
                    .width(combo_w)
                    .show_ui(ui, |ui| {
                        for (cid, cname) in &candidates {
                            if ui.selectable_label(state.source_id == Some(*cid), cname.as_str()).clicked() {
                                state.source_id = Some(*cid);
                            }
                        }
                    });

                let can_add = state.source_id.is_some();
                let btn = egui::Button::new(RichText::new("＋").size(13.0).color(Color32::WHITE))
                    .fill(if can_add { theme::ACCENT } else { theme::BG_FIELD })
                    .rounding(egui::Rounding::same(4.0));
                if ui.add_enabled(can_add, btn).clicked() {
                    if let Some(source) = state.source_id.take() {
                        action = EditorAction::AddDependency {
                            source,
                            kind: state.kind,
                        };
                    }
                }
            });

            ui.ctx().data_mut(|d| d.insert_temp(picker_id, state));
        }

        ui.add_space(4.0);
        ui.separator();
        let detach = ui.add(
            egui::Button::new(
                RichText::new(format!("{}  Remove from timeline", egui_phosphor::regular::TRASH))
                    .size(11.0)
                    .color(theme::TEXT_ERROR),
            )
            .frame(false),
        );
        if detach
            .on_hover_text("Deletes the timeline with its milestones and dependencies")
            .clicked()
        {
            action = EditorAction::Detach;
        }
    });

    action
}
