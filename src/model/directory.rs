use uuid::Uuid;

use super::contact::{resolve_name, UNKNOWN_NAME};
use super::{Contact, Project};

/// Read-only name lookup shared by the renderers.
#[derive(Debug, Clone, Copy)]
pub struct Directory<'a> {
    pub projects: &'a [Project],
    pub contacts: &'a [Contact],
}

impl<'a> Directory<'a> {
    pub fn new(projects: &'a [Project], contacts: &'a [Contact]) -> Self {
        Self { projects, contacts }
    }

    pub fn project_name(&self, id: Uuid) -> String {
        self.projects
            .iter()
            .find(|p| p.id == id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| UNKNOWN_NAME.to_string())
    }

    pub fn contact_name(&self, id: Uuid) -> String {
        resolve_name(self.contacts, id)
    }

    /// Comma-separated team names, or `None` for an empty team.
    pub fn team_names(&self, team: &[Uuid]) -> Option<String> {
        if team.is_empty() {
            return None;
        }
        Some(
            team.iter()
                .map(|id| self.contact_name(*id))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}
