use crate::error::StoreError;
use crate::layout::{Bar, TimelineLayout};
use crate::model::Directory;
use std::path::Path;

/// "A (FS), B (SS)" for the dependency column.
fn depends_on(bar: &Bar, directory: Directory<'_>) -> String {
    bar.dependencies
        .iter()
        .map(|dep| format!("{} ({})", directory.project_name(dep.project_id), dep.kind.short_label()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Export the laid-out schedule to a semicolon-delimited CSV file, in row order.
///
/// Columns: Project ; Status ; Start ; End ; Weeks ; Progress ; Depends on
/// Dates are formatted as DD/MM/YYYY.
/// Returns the number of rows written.
pub fn export_schedule_csv(
    layout: &TimelineLayout,
    directory: Directory<'_>,
    path: &Path,
) -> Result<usize, StoreError> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(b';')
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(["Project", "Status", "Start", "End", "Weeks", "Progress", "Depends on"])?;

    for bar in &layout.bars {
        let start = bar.start.format("%d/%m/%Y").to_string();
        let end = bar.end.format("%d/%m/%Y").to_string();
        let weeks = bar.duration_weeks.to_string();
        let progress = format!("{}%", bar.progress);
        let deps = depends_on(bar, directory);
        wtr.write_record([
            bar.name.as_str(),
            bar.status.label(),
            start.as_str(),
            end.as_str(),
            weeks.as_str(),
            progress.as_str(),
            deps.as_str(),
        ])?;
    }

    wtr.flush().map_err(|source| StoreError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), rows = layout.bars.len(), "schedule exported as CSV");
    Ok(layout.bars.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::layout::tests::{scenario, ymd};
    use tempfile::TempDir;

    #[test]
    fn writes_one_row_per_bar_in_board_order() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schedule.csv");
        let projects = scenario();
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));

        let written = export_schedule_csv(&layout, Directory::new(&projects, &[]), &path).unwrap();
        assert_eq!(written, 2);

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b';')
            .from_path(&path)
            .unwrap();
        let rows: Vec<csv::StringRecord> = rdr.records().map(Result::unwrap).collect();
        assert_eq!(&rows[0][0], "A");
        assert_eq!(&rows[0][2], "01/01/2026");
        assert_eq!(&rows[0][3], "29/01/2026");
        assert_eq!(&rows[1][0], "B");
        assert_eq!(&rows[1][4], "2");
        assert_eq!(&rows[1][6], "A (FS)");
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let layout = compute_layout(&scenario(), 1.0, ymd(2026, 1, 1));
        let result = export_schedule_csv(&layout, Directory::new(&[], &[]), &dir.path().join("no/such/file.csv"));
        assert!(matches!(result, Err(StoreError::Csv(_))));
    }
}
