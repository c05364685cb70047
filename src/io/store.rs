//! JSON-file persistence for projects, contacts and the capacity document.

use std::path::{Path, PathBuf};

use uuid::Uuid;

use super::file::{read_json, write_json};
use crate::error::StoreError;
use crate::layout::SortUpdate;
use crate::model::{CapacityUtilization, Contact, Project, ProjectStatus, ProjectTimeline};

pub const PROJECTS_FILE: &str = "projects.json";
pub const CONTACTS_FILE: &str = "contacts.json";
pub const CAPACITY_FILE: &str = "capacity.json";

/// Fields to change on one project. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub status: Option<ProjectStatus>,
    pub description: Option<String>,
    /// `Some(None)` removes the timeline.
    pub timeline: Option<Option<ProjectTimeline>>,
}

impl ProjectPatch {
    pub fn timeline(timeline: Option<ProjectTimeline>) -> Self {
        Self {
            timeline: Some(timeline),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &ProjectPatch::default()
    }

    fn apply(self, project: &mut Project) {
        if let Some(name) = self.name {
            project.name = name;
        }
        if let Some(status) = self.status {
            project.status = status;
        }
        if let Some(description) = self.description {
            project.description = description;
        }
        if let Some(timeline) = self.timeline {
            project.timeline = timeline;
        }
        project.touch();
    }
}

pub trait ProjectStore {
    fn all(&self) -> Result<Vec<Project>, StoreError>;

    fn update(&mut self, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError>;

    /// Apply a reorder batch. Either every update is written or none is.
    fn apply_sort_orders(&mut self, updates: &[SortUpdate]) -> Result<usize, StoreError>;
}

pub trait ContactStore {
    fn contacts(&self) -> Result<Vec<Contact>, StoreError>;
}

pub trait CapacityStore {
    fn capacity(&self) -> Result<CapacityUtilization, StoreError>;

    fn replace_capacity(&mut self, capacity: &CapacityUtilization) -> Result<(), StoreError>;
}

/// All documents live side by side in one data directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.dir.join(file)
    }

    fn save_projects(&self, projects: &[Project]) -> Result<(), StoreError> {
        write_json(&self.path(PROJECTS_FILE), &projects, "projects")
    }
}

impl ProjectStore for JsonFileStore {
    fn all(&self) -> Result<Vec<Project>, StoreError> {
        read_json(&self.path(PROJECTS_FILE))
    }

    fn update(&mut self, id: Uuid, patch: ProjectPatch) -> Result<Project, StoreError> {
        let mut projects = self.all()?;
        let project = projects
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StoreError::ProjectNotFound(id))?;
        if patch.is_empty() {
            return Ok(project.clone());
        }
        patch.apply(project);
        let updated = project.clone();
        self.save_projects(&projects)?;
        tracing::debug!(project = %updated.name, "project updated");
        Ok(updated)
    }

    fn apply_sort_orders(&mut self, updates: &[SortUpdate]) -> Result<usize, StoreError> {
        if updates.is_empty() {
            return Ok(0);
        }
        let mut projects = self.all()?;
        for update in updates {
            let timeline = projects
                .iter_mut()
                .find(|p| p.id == update.project_id)
                .and_then(|p| p.timeline.as_mut())
                .ok_or(StoreError::ProjectNotFound(update.project_id))?;
            timeline.sort_order = Some(update.sort_order);
        }
        for project in projects.iter_mut().filter(|p| updates.iter().any(|u| u.project_id == p.id)) {
            project.touch();
        }
        self.save_projects(&projects)?;
        tracing::info!(rows = updates.len(), "sort orders saved");
        Ok(updates.len())
    }
}

impl ContactStore for JsonFileStore {
    fn contacts(&self) -> Result<Vec<Contact>, StoreError> {
        read_json(&self.path(CONTACTS_FILE))
    }
}

impl CapacityStore for JsonFileStore {
    fn capacity(&self) -> Result<CapacityUtilization, StoreError> {
        read_json(&self.path(CAPACITY_FILE))
    }

    fn replace_capacity(&mut self, capacity: &CapacityUtilization) -> Result<(), StoreError> {
        write_json(&self.path(CAPACITY_FILE), capacity, "capacity")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::tests::{timed, ymd};
    use crate::model::{QuarterKey, QuarterSlot};
    use tempfile::TempDir;

    fn seeded() -> (TempDir, JsonFileStore, Vec<Project>) {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path());
        let projects = vec![
            timed("Gin", Some(0), ymd(2026, 1, 5), 4),
            timed("Rum", Some(1), ymd(2026, 2, 5), 4),
            Project::new("Unscheduled"),
        ];
        store.save_projects(&projects).unwrap();
        (dir, store, projects)
    }

    #[test]
    fn empty_directory_has_no_documents() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing"));
        assert!(store.all().unwrap().is_empty());
        assert!(store.contacts().unwrap().is_empty());
        assert_eq!(store.capacity().unwrap(), CapacityUtilization::default());
    }

    #[test]
    fn one_bad_row_does_not_sink_the_document() {
        let dir = TempDir::new().unwrap();
        let json = format!(
            r#"[
                {{"id":"{}","name":"Good","timeline":{{"enabled":true,"startDate":"2026-01-05","durationWeeks":4,"progress":300}}}},
                {{"id":"{}","name":"Negative","timeline":{{"enabled":true,"startDate":"2026-02-02","durationWeeks":-2}}}},
                {{"id":"{}","name":"Dateless","timeline":{{"enabled":false,"startDate":null,"durationWeeks":1.5}}}}
            ]"#,
            Uuid::new_v4(),
            Uuid::new_v4(),
            Uuid::new_v4()
        );
        std::fs::write(dir.path().join(PROJECTS_FILE), json).unwrap();

        let projects = JsonFileStore::new(dir.path()).all().unwrap();
        assert_eq!(projects.len(), 3);

        let layout = crate::layout::compute_layout(&projects, 1.0, ymd(2026, 1, 1));
        assert_eq!(layout.bars.len(), 1);
        assert_eq!(layout.bars[0].name, "Good");
        assert_eq!(layout.bars[0].progress, 100);
        assert_eq!(layout.diagnostics.len(), 1);
        assert!(layout.diagnostics[0].message().starts_with("'Negative' skipped"));
    }

    #[test]
    fn updates_keep_fields_this_app_does_not_edit() {
        let (_dir, mut store, mut projects) = seeded();
        projects[0].color = Some("#AA3300".into());
        store.save_projects(&projects).unwrap();

        store
            .update(projects[0].id, ProjectPatch::timeline(None))
            .unwrap();
        assert_eq!(store.all().unwrap()[0].color.as_deref(), Some("#AA3300"));
    }

    #[test]
    fn update_applies_only_given_fields() {
        let (_dir, mut store, projects) = seeded();
        let patch = ProjectPatch {
            status: Some(ProjectStatus::Paused),
            ..Default::default()
        };
        let updated = store.update(projects[0].id, patch).unwrap();
        assert_eq!(updated.status, ProjectStatus::Paused);
        assert_eq!(updated.name, "Gin");
        assert_eq!(updated.timeline, projects[0].timeline);

        let updated = store.update(projects[1].id, ProjectPatch::timeline(None)).unwrap();
        assert!(updated.timeline.is_none());
        assert!(store.all().unwrap()[1].timeline.is_none());

        assert!(matches!(
            store.update(Uuid::new_v4(), ProjectPatch::default()),
            Err(StoreError::ProjectNotFound(_))
        ));
    }

    #[test]
    fn sort_batch_is_written_together() {
        let (_dir, mut store, projects) = seeded();
        let batch = [
            SortUpdate { project_id: projects[0].id, sort_order: 1 },
            SortUpdate { project_id: projects[1].id, sort_order: 0 },
        ];
        assert_eq!(store.apply_sort_orders(&batch).unwrap(), 2);
        let orders: Vec<Option<i32>> = store
            .all()
            .unwrap()
            .iter()
            .map(|p| p.timeline.as_ref().and_then(|t| t.sort_order))
            .collect();
        assert_eq!(orders, [Some(1), Some(0), None]);
    }

    #[test]
    fn failed_sort_batch_writes_nothing() {
        let (_dir, mut store, projects) = seeded();
        let before = store.all().unwrap();
        let batch = [
            SortUpdate { project_id: projects[0].id, sort_order: 5 },
            // No timeline to reorder.
            SortUpdate { project_id: projects[2].id, sort_order: 6 },
        ];
        assert!(store.apply_sort_orders(&batch).is_err());
        assert_eq!(store.all().unwrap(), before);
    }

    #[test]
    fn capacity_round_trips_with_unrecognised_labels() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CAPACITY_FILE),
            r#"{ "enabled": true, "quarters": [
                { "quarter": "Q1/26", "percentage": 70 },
                { "quarter": "Q1/2026", "percentage": 90 }
            ] }"#,
        )
        .unwrap();
        let mut store = JsonFileStore::new(dir.path());
        let mut capacity = store.capacity().unwrap();
        assert!(capacity.enabled);
        assert_eq!(capacity.quarters[1].quarter, QuarterSlot::Unrecognized("Q1/2026".into()));

        let q2 = QuarterKey::new(2026, 2).unwrap();
        capacity.set_percentage(q2, 40);
        store.replace_capacity(&capacity).unwrap();
        let reloaded = store.capacity().unwrap();
        assert_eq!(reloaded.percentage_for(q2), 40);
        assert_eq!(reloaded.quarters.len(), 3);
    }

    #[test]
    fn contacts_are_read_from_their_own_document() {
        let dir = TempDir::new().unwrap();
        let id = Uuid::new_v4();
        std::fs::write(
            dir.path().join(CONTACTS_FILE),
            format!(r#"[{{ "id": "{id}", "firstName": "Ada", "lastName": "Brand" }}]"#),
        )
        .unwrap();
        let contacts = JsonFileStore::new(dir.path()).contacts().unwrap();
        assert_eq!(contacts[0].display_name(), "Ada Brand");
    }
}
