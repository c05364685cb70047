use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

/// Failures reading or writing the JSON documents in the data directory.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        source: serde_json::Error,
    },

    #[error("Project {0} not found")]
    ProjectNotFound(Uuid),

    #[error("CSV export failed: {0}")]
    Csv(#[from] csv::Error),
}

/// Rejected timeline edits.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimelineError {
    #[error("'{0}' has no timeline")]
    NoTimeline(String),

    #[error("A project cannot depend on itself")]
    SelfDependency,

    #[error("'{target}' already depends on '{source_name}'")]
    DuplicateDependency { target: String, source_name: String },

    #[error("Dependency source {0} does not exist")]
    UnknownProject(Uuid),

    #[error("Linking '{target}' to '{source_name}' would create a dependency cycle")]
    Cycle { target: String, source_name: String },

    #[error("Milestone {0} not found")]
    MilestoneNotFound(Uuid),
}

/// Failures handing a finished document to an output sink.
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Nothing to export: no project has an enabled timeline")]
    Empty,

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to write settings to {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Visible years must be 1, 2 or 3 (got {0})")]
    VisibleYears(u8),
}
