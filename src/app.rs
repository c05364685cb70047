use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::config::AppSettings;
use crate::error::TimelineError;
use crate::export::{render_document, ExportOptions, ExportSink, LocalFileSink};
use crate::io::{CapacityStore, ContactStore, JsonFileStore, ProjectPatch, ProjectStore};
use crate::layout::{compute_layout, plan_reorder, TimelineLayout};
use crate::model::{scheduling, CapacityUtilization, Contact, Directory, Project};
use crate::ui;
use crate::ui::timeline_editor::EditorAction;

pub const EXPORT_TITLE: &str = "Project Timeline";

/// Main application state.
pub struct TimelineApp {
    pub settings: AppSettings,
    settings_path: PathBuf,
    store: JsonFileStore,
    today: NaiveDate,

    pub projects: Vec<Project>,
    pub contacts: Vec<Contact>,
    pub capacity: CapacityUtilization,
    layout: TimelineLayout,

    pub selected: Option<Uuid>,
    /// Editable copy of the selected project.
    draft: Option<Project>,
    pub filter: String,

    // Dialog state
    pub show_about: bool,
    pub show_diagnostics: bool,
    pub capacity_draft: Option<CapacityUtilization>,

    // Status message
    pub status_message: String,
}

/// Run one editor action against the project list.
/// Returns the status message, or `None` when nothing changed.
fn apply_action(
    projects: &mut [Project],
    draft: Option<&Project>,
    id: Uuid,
    action: EditorAction,
    today: NaiveDate,
) -> Result<Option<String>, TimelineError> {
    let index = projects
        .iter()
        .position(|p| p.id == id)
        .ok_or(TimelineError::UnknownProject(id))?;
    let name = projects[index].name.clone();

    let message = match action {
        EditorAction::None => return Ok(None),
        EditorAction::Changed => {
            let Some(draft) = draft.filter(|d| d.id == id) else {
                return Ok(None);
            };
            let project = &mut projects[index];
            project.status = draft.status;
            project.timeline = draft.timeline.clone();
            project.touch();
            format!("Updated '{}'", name)
        }
        EditorAction::Enable => {
            scheduling::enable(&mut projects[index], today);
            format!("'{}' added to the timeline", name)
        }
        EditorAction::Detach => {
            scheduling::detach(&mut projects[index]);
            format!("'{}' removed from the timeline", name)
        }
        EditorAction::AddDependency { source, kind } => {
            scheduling::add_dependency(projects, id, source, kind)?;
            let source_name = Directory::new(projects, &[]).project_name(source);
            format!("'{}' now depends on '{}' ({})", name, source_name, kind.short_label())
        }
        EditorAction::RemoveDependency(source) => {
            scheduling::remove_dependency(&mut projects[index], source)?;
            "Dependency removed".to_string()
        }
        EditorAction::AddMilestone { name: title, date } => {
            scheduling::add_milestone(&mut projects[index], title.clone(), date)?;
            format!("Milestone '{}' added", title)
        }
        EditorAction::ToggleMilestone(milestone) => {
            if scheduling::toggle_milestone(&mut projects[index], milestone)? {
                "Milestone completed".to_string()
            } else {
                "Milestone reopened".to_string()
            }
        }
        EditorAction::RemoveMilestone(milestone) => {
            scheduling::remove_milestone(&mut projects[index], milestone)?;
            "Milestone removed".to_string()
        }
    };
    Ok(Some(message))
}

impl TimelineApp {
    pub fn new(cc: &eframe::CreationContext<'_>, settings: AppSettings, settings_path: PathBuf) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let today = chrono::Local::now().date_naive();
        let store = JsonFileStore::new(settings.data_dir());
        Self::with_store(settings, settings_path, store, today)
    }

    pub fn with_store(
        settings: AppSettings,
        settings_path: PathBuf,
        store: JsonFileStore,
        today: NaiveDate,
    ) -> Self {
        let layout = compute_layout(&[], settings.visible_years as f64, today);
        let mut app = Self {
            settings,
            settings_path,
            store,
            today,
            projects: Vec::new(),
            contacts: Vec::new(),
            capacity: CapacityUtilization::default(),
            layout,
            selected: None,
            draft: None,
            filter: String::new(),
            show_about: false,
            show_diagnostics: false,
            capacity_draft: None,
            status_message: "Ready".to_string(),
        };
        app.reload();
        app
    }

    pub fn layout(&self) -> &TimelineLayout {
        &self.layout
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn data_dir(&self) -> &Path {
        self.store.dir()
    }

    fn relayout(&mut self) {
        self.layout = compute_layout(&self.projects, self.settings.visible_years as f64, self.today);
        for diagnostic in &self.layout.diagnostics {
            tracing::debug!(message = %diagnostic.message(), "layout diagnostic");
        }
    }

    fn refresh_draft(&mut self) {
        self.draft = self
            .selected
            .and_then(|id| self.projects.iter().find(|p| p.id == id))
            .cloned();
    }

    pub fn select(&mut self, id: Option<Uuid>) {
        self.selected = id;
        self.refresh_draft();
    }

    // --- Data ---

    pub fn reload(&mut self) {
        let loaded = self
            .store
            .all()
            .and_then(|projects| Ok((projects, self.store.contacts()?, self.store.capacity()?)));
        match loaded {
            Ok((projects, contacts, capacity)) => {
                self.projects = projects;
                self.contacts = contacts;
                self.capacity = capacity;
                self.relayout();
                self.refresh_draft();
                tracing::info!(
                    projects = self.projects.len(),
                    contacts = self.contacts.len(),
                    dir = %self.store.dir().display(),
                    "data loaded"
                );
                let skipped = self.layout.diagnostics.iter().filter(|d| d.skips_row()).count();
                self.status_message = if skipped > 0 {
                    format!("Loaded {} projects ({} rows skipped)", self.projects.len(), skipped)
                } else {
                    format!("Loaded {} projects", self.projects.len())
                };
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load data");
                self.status_message = format!("Error loading: {}", e);
            }
        }
    }

    pub fn choose_data_dir(&mut self) {
        if let Some(dir) = rfd::FileDialog::new()
            .set_directory(self.store.dir())
            .pick_folder()
        {
            self.store = JsonFileStore::new(&dir);
            self.settings.data_dir = Some(dir);
            self.save_settings();
            self.select(None);
            self.reload();
        }
    }

    pub fn save_settings(&mut self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            tracing::warn!(error = %e, "settings not saved");
            self.status_message = e.to_string();
        }
    }

    // --- View ---

    pub fn set_visible_years(&mut self, years: u8) {
        match self.settings.set_visible_years(years) {
            Ok(()) => {
                self.relayout();
                self.save_settings();
                self.status_message = format!("Showing {} year(s)", years);
            }
            Err(e) => self.status_message = e.to_string(),
        }
    }

    pub fn set_capacity_overlay(&mut self, enabled: bool) {
        let mut capacity = self.capacity.clone();
        capacity.enabled = enabled;
        self.save_capacity(capacity);
    }

    pub fn save_capacity(&mut self, capacity: CapacityUtilization) {
        match self.store.replace_capacity(&capacity) {
            Ok(()) => {
                self.capacity = capacity;
                self.status_message = "Capacity saved".to_string();
            }
            Err(e) => {
                tracing::error!(error = %e, "capacity not saved");
                self.status_message = format!("Error saving capacity: {}", e);
            }
        }
    }

    // --- Timeline edits ---

    /// Persist a board drag as one batch of sort orders.
    pub fn reorder(&mut self, project_id: Uuid, target_index: usize) {
        let plan = plan_reorder(&self.layout.bars, project_id, target_index);
        if plan.is_empty() {
            return;
        }
        match self.store.apply_sort_orders(&plan) {
            Ok(_) => {
                for update in &plan {
                    if let Some(timeline) = self
                        .projects
                        .iter_mut()
                        .find(|p| p.id == update.project_id)
                        .and_then(|p| p.timeline.as_mut())
                    {
                        timeline.sort_order = Some(update.sort_order);
                    }
                }
                self.relayout();
                self.refresh_draft();
                let name = self.layout.bar_name(project_id).unwrap_or_default().to_string();
                self.status_message = format!("Moved '{}' to row {}", name, target_index + 1);
            }
            Err(e) => {
                tracing::error!(error = %e, "reorder not saved");
                self.status_message = format!("Reorder failed: {}", e);
            }
        }
    }

    pub fn apply_editor_action(&mut self, project_id: Uuid, action: EditorAction) {
        let mut projects = self.projects.clone();
        let message = match apply_action(&mut projects, self.draft.as_ref(), project_id, action, self.today) {
            Ok(Some(message)) => message,
            Ok(None) => return,
            Err(e) => {
                tracing::warn!(error = %e, "timeline edit rejected");
                self.status_message = e.to_string();
                self.refresh_draft();
                return;
            }
        };

        let Some(project) = projects.iter().find(|p| p.id == project_id) else {
            return;
        };
        let patch = ProjectPatch {
            status: Some(project.status),
            timeline: Some(project.timeline.clone()),
            ..Default::default()
        };
        match self.store.update(project_id, patch) {
            Ok(_) => {
                self.projects = projects;
                self.relayout();
                self.refresh_draft();
                self.status_message = message;
            }
            Err(e) => {
                tracing::error!(error = %e, "project not saved");
                self.status_message = format!("Error saving: {}", e);
                self.refresh_draft();
            }
        }
    }

    // --- Export ---

    fn export_to(&mut self, sink: impl FnOnce(&crate::export::ExportDocument) -> LocalFileSink) {
        let options = ExportOptions::new(EXPORT_TITLE, self.today);
        let directory = Directory::new(&self.projects, &self.contacts);
        let result = render_document(&self.layout, &self.capacity, directory, &options)
            .and_then(|document| sink(&document).deliver(&document));
        match result {
            Ok(receipt) => self.status_message = receipt.describe(),
            Err(e) => {
                tracing::error!(error = %e, "export failed");
                self.status_message = format!("Export failed: {}", e);
            }
        }
    }

    /// Export into the configured export folder.
    pub fn export_document(&mut self) {
        let dir = self.settings.export_dir();
        let open_after = self.settings.open_after_export;
        self.export_to(|document| LocalFileSink::in_directory(&dir, document).open_after(open_after));
    }

    pub fn export_document_as(&mut self) {
        let default_name = format!("{}-{}.html", "project-timeline", self.today.format("%Y-%m-%d"));
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("HTML document", &["html"])
            .set_directory(self.settings.export_dir())
            .set_file_name(&default_name)
            .save_file()
        {
            let open_after = self.settings.open_after_export;
            self.export_to(|_| LocalFileSink::new(path).open_after(open_after));
        }
    }

    pub fn export_csv(&mut self) {
        if self.layout.bars.is_empty() {
            self.status_message = "Nothing to export: no project has an enabled timeline".to_string();
            return;
        }
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("schedule.csv")
            .save_file()
        {
            let directory = Directory::new(&self.projects, &self.contacts);
            match crate::io::export_schedule_csv(&self.layout, directory, &path) {
                Ok(count) => self.status_message = format!("Exported {} projects to CSV", count),
                Err(e) => self.status_message = format!("CSV export failed: {}", e),
            }
        }
    }

    pub fn open_export_folder(&mut self) {
        let dir = self.settings.export_dir();
        if let Err(e) = std::fs::create_dir_all(&dir).and_then(|_| open::that(&dir)) {
            self.status_message = format!("Cannot open {}: {}", dir.display(), e);
        }
    }
}

impl eframe::App for TimelineApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx);

        let should_reload = ctx.input(|i| i.key_pressed(egui::Key::F5));
        if should_reload {
            self.reload();
        }

        // Top panel: toolbar
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_toolbar(self, ui);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(ui::theme::STATUS_BAR_HEIGHT)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::STATUS_BAR_BG)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .font(ui::theme::font_status())
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        let issues = self.layout.diagnostics.len();
                        if issues > 0 {
                            let link = ui.link(
                                egui::RichText::new(format!("{} warning(s)", issues))
                                    .size(10.5)
                                    .color(ui::theme::TEXT_ERROR),
                            );
                            if link.clicked() {
                                self.show_diagnostics = true;
                            }
                            ui.label(egui::RichText::new(" · ").size(10.5).color(ui::theme::TEXT_DIM));
                        }
                        ui.label(
                            egui::RichText::new(format!(
                                "{} – {}",
                                self.layout.window.start.format("%d/%m/%Y"),
                                self.layout.window.end.format("%d/%m/%Y")
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_DIM),
                        );
                    });
                });
            });

        // Left panel: editor + project list
        let mut list_action = ui::project_list::ProjectListAction::None;
        let mut editor_action = EditorAction::None;
        egui::SidePanel::left("project_panel")
            .default_width(ui::theme::SIDE_PANEL_WIDTH)
            .min_width(240.0)
            .resizable(true)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_PANEL)
                    .inner_margin(egui::Margin::same(8.0))
                    .stroke(egui::Stroke::new(1.0, ui::theme::BORDER_SUBTLE)),
            )
            .show(ctx, |ui| {
                if let Some(draft) = self.draft.as_mut() {
                    egui::ScrollArea::vertical()
                        .id_salt("editor_scroll")
                        .max_height(ui.available_height() * 0.6)
                        .show(ui, |ui| {
                            editor_action = ui::timeline_editor::show_timeline_editor(
                                draft,
                                &self.projects,
                                &self.contacts,
                                self.today,
                                ui,
                            );
                        });
                    ui.add_space(4.0);
                    ui.separator();
                    ui.add_space(2.0);
                }

                list_action = ui::project_list::show_project_list(
                    &self.projects,
                    self.selected,
                    &mut self.filter,
                    ui,
                );
            });

        if let Some(id) = self.selected {
            if editor_action != EditorAction::None {
                self.apply_editor_action(id, editor_action);
            }
        }
        match list_action {
            ui::project_list::ProjectListAction::Select(id) => self.select(Some(id)),
            ui::project_list::ProjectListAction::EnableTimeline(id) => {
                self.select(Some(id));
                self.apply_editor_action(id, EditorAction::Enable);
            }
            ui::project_list::ProjectListAction::None => {}
        }

        // Central panel: board
        let board_frame = egui::Frame::default()
            .fill(ui::theme::BG_DARK)
            .inner_margin(egui::Margin::ZERO);
        let interaction = egui::CentralPanel::default()
            .frame(board_frame)
            .show(ctx, |ui| {
                let capacity = self.capacity.enabled.then_some(&self.capacity);
                ui::board::show_board(
                    &self.layout,
                    capacity,
                    Directory::new(&self.projects, &self.contacts),
                    self.today,
                    self.selected,
                    ui,
                )
            })
            .inner;

        if let Some(id) = interaction.selected {
            self.select(Some(id));
        } else if interaction.cleared_selection {
            self.select(None);
        }
        if let Some((id, target)) = interaction.reorder {
            self.reorder(id, target);
        }

        // Dialogs
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_diagnostics {
            ui::dialogs::show_diagnostics_dialog(self, ctx);
        }
        if self.capacity_draft.is_some() {
            ui::dialogs::show_capacity_dialog(self, ctx);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::file::write_json;
    use crate::layout::tests::{depend, scenario, timed, ymd};
    use crate::model::DependencyKind;
    use tempfile::TempDir;

    fn app_with(projects: &[Project]) -> (TempDir, TimelineApp) {
        let dir = TempDir::new().unwrap();
        write_json(&dir.path().join("projects.json"), &projects, "projects").unwrap();
        let settings = AppSettings {
            data_dir: Some(dir.path().to_path_buf()),
            export_dir: Some(dir.path().join("exports")),
            open_after_export: false,
            ..Default::default()
        };
        let store = JsonFileStore::new(dir.path());
        let app = TimelineApp::with_store(settings, dir.path().join("settings.json"), store, ymd(2026, 1, 1));
        (dir, app)
    }

    fn names(app: &TimelineApp) -> Vec<String> {
        app.layout().bars.iter().map(|b| b.name.clone()).collect()
    }

    #[test]
    fn loads_and_lays_out_on_start() {
        let (_dir, app) = app_with(&scenario());
        assert_eq!(names(&app), ["A", "B"]);
        assert_eq!(app.status_message, "Loaded 2 projects");
    }

    #[test]
    fn reorder_is_persisted_and_survives_reload() {
        let projects = vec![
            timed("Gin", None, ymd(2026, 1, 5), 4),
            timed("Rum", None, ymd(2026, 2, 5), 4),
            timed("Vodka", None, ymd(2026, 3, 5), 4),
        ];
        let (_dir, mut app) = app_with(&projects);
        let vodka = app.layout().bars[2].project_id;

        app.reorder(vodka, 0);
        assert_eq!(names(&app), ["Vodka", "Gin", "Rum"]);
        app.reload();
        assert_eq!(names(&app), ["Vodka", "Gin", "Rum"]);

        // Same row again: no write, nothing moves.
        app.status_message.clear();
        app.reorder(vodka, 0);
        assert!(app.status_message.is_empty());
    }

    #[test]
    fn rejected_edits_report_and_keep_data() {
        let mut projects = scenario();
        let (a, b) = (projects[1].clone(), projects[0].clone());
        assert_eq!(a.name, "A");
        depend(&mut projects[1], &Project::new("ghost"), DependencyKind::StartToStart);
        let (_dir, mut app) = app_with(&projects);

        app.select(Some(a.id));
        app.apply_editor_action(a.id, EditorAction::AddDependency { source: b.id, kind: DependencyKind::FinishToStart });
        assert!(app.status_message.contains("cycle"), "{}", app.status_message);
        assert!(!app.projects.iter().find(|p| p.id == a.id).unwrap().timeline.as_ref().unwrap().depends_on(b.id));

        // Unresolved dependency surfaces as a diagnostic, not an error.
        assert_eq!(app.layout().diagnostics.len(), 1);
    }

    #[test]
    fn editor_changes_are_saved_through_the_store() {
        let (_dir, mut app) = app_with(&scenario());
        let a = app.layout().bars[0].project_id;
        app.select(Some(a));

        app.apply_editor_action(a, EditorAction::AddMilestone { name: "Tasting".into(), date: ymd(2026, 1, 10) });
        assert_eq!(app.status_message, "Milestone 'Tasting' added");

        if let Some(draft) = app.draft.as_mut() {
            draft.timeline.as_mut().unwrap().duration_weeks = 6;
        }
        app.apply_editor_action(a, EditorAction::Changed);
        app.reload();

        let saved = app.projects.iter().find(|p| p.id == a).unwrap();
        let timeline = saved.timeline.as_ref().unwrap();
        assert_eq!(timeline.duration_weeks, 6);
        assert_eq!(timeline.milestones.len(), 1);
    }

    #[test]
    fn enable_then_detach_moves_project_on_and_off_the_board() {
        let (_dir, mut app) = app_with(&[Project::new("Cider")]);
        let id = app.projects[0].id;
        assert!(app.layout().bars.is_empty());

        app.apply_editor_action(id, EditorAction::Enable);
        assert_eq!(names(&app), ["Cider"]);
        app.apply_editor_action(id, EditorAction::Detach);
        assert!(app.layout().bars.is_empty());
    }

    #[test]
    fn export_writes_into_the_export_folder() {
        let (dir, mut app) = app_with(&scenario());
        app.export_document();
        let path = dir.path().join("exports").join("project-timeline-2026-01-01.html");
        assert!(path.exists(), "{}", app.status_message);
        assert_eq!(app.status_message, format!("Exported to {}", path.display()));
    }

    #[test]
    fn exporting_nothing_reports_instead_of_writing() {
        let (dir, mut app) = app_with(&[]);
        app.export_document();
        assert!(app.status_message.starts_with("Export failed: Nothing to export"));
        assert!(!dir.path().join("exports").exists());
    }

    #[test]
    fn visible_years_and_capacity_flag_are_persisted() {
        let (dir, mut app) = app_with(&scenario());
        app.set_visible_years(2);
        assert_eq!(app.layout().quarters.len(), 8);
        assert_eq!(AppSettings::load(&dir.path().join("settings.json")).visible_years, 2);

        app.set_visible_years(5);
        assert_eq!(app.settings.visible_years, 2);

        app.set_capacity_overlay(true);
        app.reload();
        assert!(app.capacity.enabled);
    }
}
