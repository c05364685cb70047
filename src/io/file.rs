use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;

use crate::error::StoreError;

/// Load a JSON document. A missing file reads as the empty document.
pub fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T, StoreError> {
    let json = match std::fs::read_to_string(path) {
        Ok(json) => json,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "document missing, starting empty");
            return Ok(T::default());
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    if json.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(&json).map_err(|source| StoreError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save a JSON document through a temporary file so readers never see half a write.
pub fn write_json<T: Serialize>(path: &Path, value: &T, what: &'static str) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| StoreError::Encode { what, source })?;
    let write_error = |source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json).map_err(write_error)?;
    std::fs::rename(&tmp, path).map_err(write_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Project;
    use tempfile::TempDir;

    #[test]
    fn missing_and_blank_files_are_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("projects.json");
        let projects: Vec<Project> = read_json(&path).unwrap();
        assert!(projects.is_empty());

        std::fs::write(&path, "  \n").unwrap();
        let projects: Vec<Project> = read_json(&path).unwrap();
        assert!(projects.is_empty());
    }

    #[test]
    fn write_replaces_atomically_and_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("projects.json");
        write_json(&path, &vec![Project::new("Gin")], "projects").unwrap();
        write_json(&path, &vec![Project::new("Rum")], "projects").unwrap();

        let projects: Vec<Project> = read_json(&path).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].name, "Rum");
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn invalid_json_names_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("contacts.json");
        std::fs::write(&path, "{ nope").unwrap();
        let err = read_json::<Vec<Project>>(&path).unwrap_err();
        assert!(matches!(err, StoreError::Parse { .. }));
        assert!(err.to_string().contains("contacts.json"));
    }
}
