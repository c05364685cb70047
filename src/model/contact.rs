use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Placeholder shown for team members or projects that cannot be resolved.
pub const UNKNOWN_NAME: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl Contact {
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if !full.is_empty() {
            return full.to_string();
        }
        self.company
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(UNKNOWN_NAME)
            .to_string()
    }
}

/// Resolve a contact id to a display name, falling back to [`UNKNOWN_NAME`].
pub fn resolve_name(contacts: &[Contact], id: Uuid) -> String {
    contacts
        .iter()
        .find(|c| c.id == id)
        .map(Contact::display_name)
        .unwrap_or_else(|| UNKNOWN_NAME.to_string())
}
