use std::path::{Path, PathBuf};

use super::document::ExportDocument;
use super::svg::document_to_html;
use crate::error::ExportError;

/// Where a delivered document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportReceipt {
    File(PathBuf),
}

impl ExportReceipt {
    pub fn describe(&self) -> String {
        match self {
            ExportReceipt::File(path) => format!("Exported to {}", path.display()),
        }
    }
}

/// Destination for a finished export.
pub trait ExportSink {
    fn deliver(&self, document: &ExportDocument) -> Result<ExportReceipt, ExportError>;
}

/// Writes the document as a single printable HTML file.
#[derive(Debug, Clone)]
pub struct LocalFileSink {
    pub path: PathBuf,
    pub open_after: bool,
}

impl LocalFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            open_after: false,
        }
    }

    /// A sink writing `<dir>/<title-slug>-<date>.html`.
    pub fn in_directory(dir: &Path, document: &ExportDocument) -> Self {
        Self::new(dir.join(format!("{}.html", document.file_stem())))
    }

    pub fn open_after(mut self, open: bool) -> Self {
        self.open_after = open;
        self
    }
}

impl ExportSink for LocalFileSink {
    fn deliver(&self, document: &ExportDocument) -> Result<ExportReceipt, ExportError> {
        if document.pages.is_empty() {
            return Err(ExportError::Empty);
        }
        let io_error = |source| ExportError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        std::fs::write(&self.path, document_to_html(document)).map_err(io_error)?;
        tracing::info!(path = %self.path.display(), pages = document.pages.len(), "export written");

        if self.open_after {
            if let Err(e) = open::that(&self.path) {
                tracing::warn!(error = %e, path = %self.path.display(), "could not open exported document");
            }
        }
        Ok(ExportReceipt::File(self.path.clone()))
    }
}
