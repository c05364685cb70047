//! Timeline layout engine.
//!
//! Turns the project list into renderer-neutral geometry: every horizontal
//! position is a fraction of the visible window (`0.0` = window start,
//! `1.0` = window end), rows are indices into the sorted bar list. Both the
//! interactive board and the paginated export draw from this output only.

pub mod capacity;
pub mod reorder;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::model::{
    CalendarDate, DependencyKind, Milestone, Project, ProjectStatus, QuarterKey, Rgb,
    TimelineDependency, TimelineWindow,
};

pub use capacity::{capacity_segments, CapacitySegment};
pub use reorder::{plan_reorder, SortUpdate};

/// Column marker at the start of a calendar quarter.
#[derive(Debug, Clone, PartialEq)]
pub struct QuarterMarker {
    pub key: QuarterKey,
    pub label: String,
    pub start: NaiveDate,
    pub x: f64,
}

/// One project's span within the window.
#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub project_id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
    pub description: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub duration_weeks: u32,
    pub start_x: f64,
    pub width: f64,
    pub fill: Rgb,
    pub progress: u8,
    pub team: Vec<Uuid>,
    pub dependencies: Vec<TimelineDependency>,
    pub milestones: Vec<Milestone>,
    pub sort_key: i32,
    pub row: usize,
}

impl Bar {
    pub fn end_x(&self) -> f64 {
        self.start_x + self.width
    }

    /// Milestones dated inside `[start, end]`; malformed dates are never shown.
    pub fn visible_milestones(&self) -> impl Iterator<Item = (&Milestone, NaiveDate)> {
        self.milestones.iter().filter_map(move |m| {
            m.date
                .date()
                .filter(|d| *d >= self.start && *d <= self.end)
                .map(|d| (m, d))
        })
    }
}

/// Arrow between two bars, routed from the source bar to the dependent bar.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DependencyArrow {
    pub source_id: Uuid,
    pub target_id: Uuid,
    pub kind: DependencyKind,
    pub from_row: usize,
    pub to_row: usize,
    pub from_x: f64,
    pub to_x: f64,
}

impl DependencyArrow {
    /// Where the vertical leg of the elbow sits.
    pub fn elbow_x(&self) -> f64 {
        (self.from_x + self.to_x) / 2.0
    }
}

/// Rows and references the engine could not place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutDiagnostic {
    MalformedStartDate {
        project_id: Uuid,
        name: String,
        raw: String,
    },
    NonPositiveDuration {
        project_id: Uuid,
        name: String,
    },
    UnresolvedDependency {
        project_id: Uuid,
        name: String,
        missing: Uuid,
    },
}

impl LayoutDiagnostic {
    pub fn message(&self) -> String {
        match self {
            LayoutDiagnostic::MalformedStartDate { name, raw, .. } => {
                format!("'{}' skipped: invalid start date '{}'", name, raw)
            }
            LayoutDiagnostic::NonPositiveDuration { name, .. } => {
                format!("'{}' skipped: duration must be at least one week", name)
            }
            LayoutDiagnostic::UnresolvedDependency { name, missing, .. } => {
                format!("'{}': dependency on {} is not on the timeline", name, missing)
            }
        }
    }

    /// True when the whole row was left out of the layout.
    pub fn skips_row(&self) -> bool {
        !matches!(self, LayoutDiagnostic::UnresolvedDependency { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TimelineLayout {
    pub window: TimelineWindow,
    pub quarters: Vec<QuarterMarker>,
    pub bars: Vec<Bar>,
    pub arrows: Vec<DependencyArrow>,
    pub diagnostics: Vec<LayoutDiagnostic>,
}

impl TimelineLayout {
    /// Renderers draw nothing for a degenerate window.
    pub fn is_degenerate(&self) -> bool {
        self.window.degenerate
    }

    pub fn fraction(&self, date: NaiveDate) -> f64 {
        self.window.fraction(date)
    }

    pub fn bar(&self, project_id: Uuid) -> Option<&Bar> {
        self.bars.iter().find(|b| b.project_id == project_id)
    }

    pub fn bar_name(&self, project_id: Uuid) -> Option<&str> {
        self.bar(project_id).map(|b| b.name.as_str())
    }
}

/// Fill colour for a bar of the given status.
pub fn status_fill(status: ProjectStatus) -> Rgb {
    match status {
        ProjectStatus::Archived => Rgb::new(0xE0, 0xE0, 0xE0),
        ProjectStatus::Completed => Rgb::new(0xBD, 0xBD, 0xBD),
        ProjectStatus::Active => Rgb::new(0x15, 0x65, 0xC0),
        ProjectStatus::Paused => Rgb::new(0x64, 0xB5, 0xF6),
    }
}

/// Lay out every project with an enabled timeline.
pub fn compute_layout(
    projects: &[Project],
    visible_years: f64,
    reference: NaiveDate,
) -> TimelineLayout {
    let window = TimelineWindow::covering(reference, visible_years);
    let quarters = quarter_markers(&window, reference, visible_years);
    let mut diagnostics = Vec::new();

    let mut bars: Vec<Bar> = Vec::new();
    for project in projects {
        let Some(timeline) = project.active_timeline() else {
            continue;
        };
        let start = match &timeline.start_date {
            CalendarDate::Valid(date) => *date,
            CalendarDate::Malformed(raw) => {
                tracing::warn!(project = %project.name, raw = %raw, "skipping timeline row with invalid start date");
                diagnostics.push(LayoutDiagnostic::MalformedStartDate {
                    project_id: project.id,
                    name: project.name.clone(),
                    raw: raw.clone(),
                });
                continue;
            }
        };
        let end = match timeline.end() {
            Some(end) if timeline.duration_weeks > 0 => end,
            _ => {
                tracing::warn!(project = %project.name, weeks = timeline.duration_weeks, "skipping timeline row without a positive duration");
                diagnostics.push(LayoutDiagnostic::NonPositiveDuration {
                    project_id: project.id,
                    name: project.name.clone(),
                });
                continue;
            }
        };

        bars.push(Bar {
            project_id: project.id,
            name: project.name.clone(),
            status: project.status,
            description: project.description.clone(),
            start,
            end,
            duration_weeks: timeline.duration_weeks,
            start_x: window.fraction(start),
            width: window.span(timeline.duration_days()),
            fill: status_fill(project.status),
            progress: timeline.progress.min(100),
            team: timeline.team.clone(),
            dependencies: timeline.dependencies.clone(),
            milestones: timeline.milestones.clone(),
            sort_key: timeline.sort_key(),
            row: 0,
        });
    }

    // Stable: full ties keep document order.
    bars.sort_by(|a, b| a.sort_key.cmp(&b.sort_key).then(a.start.cmp(&b.start)));
    for (row, bar) in bars.iter_mut().enumerate() {
        bar.row = row;
    }

    let arrows = dependency_arrows(&bars, &mut diagnostics);

    TimelineLayout {
        window,
        quarters,
        bars,
        arrows,
        diagnostics,
    }
}

fn quarter_markers(
    window: &TimelineWindow,
    reference: NaiveDate,
    visible_years: f64,
) -> Vec<QuarterMarker> {
    if window.degenerate {
        return Vec::new();
    }
    let count = if visible_years.is_finite() {
        (visible_years * 4.0).ceil().max(0.0) as usize
    } else {
        0
    };
    let first = QuarterKey {
        year: chrono::Datelike::year(&reference),
        quarter: 1,
    };
    std::iter::successors(Some(first), |k| Some(k.next()))
        .take(count)
        .map(|key| {
            let start = key.start_date();
            QuarterMarker {
                key,
                label: key.label(),
                start,
                x: window.fraction(start),
            }
        })
        .collect()
}

fn dependency_arrows(bars: &[Bar], diagnostics: &mut Vec<LayoutDiagnostic>) -> Vec<DependencyArrow> {
    let mut arrows = Vec::new();
    for target in bars {
        for dep in &target.dependencies {
            let Some(source) = bars.iter().find(|b| b.project_id == dep.project_id) else {
                tracing::debug!(project = %target.name, missing = %dep.project_id, "dropping dependency arrow with unresolved source");
                diagnostics.push(LayoutDiagnostic::UnresolvedDependency {
                    project_id: target.project_id,
                    name: target.name.clone(),
                    missing: dep.project_id,
                });
                continue;
            };
            let from_x = if dep.kind.from_source_end() {
                source.end_x()
            } else {
                source.start_x
            };
            let to_x = if dep.kind.to_target_end() {
                target.end_x()
            } else {
                target.start_x
            };
            arrows.push(DependencyArrow {
                source_id: source.project_id,
                target_id: target.project_id,
                kind: dep.kind,
                from_row: source.row,
                to_row: target.row,
                from_x,
                to_x,
            });
        }
    }
    arrows
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::ProjectTimeline;
    use proptest::prelude::*;
    use rstest::rstest;

    pub(crate) fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn timed(name: &str, sort: Option<i32>, start: NaiveDate, weeks: u32) -> Project {
        let mut project = Project::new(name);
        let mut timeline = ProjectTimeline::new(start);
        timeline.duration_weeks = weeks;
        timeline.sort_order = sort;
        project.timeline = Some(timeline);
        project
    }

    pub(crate) fn depend(target: &mut Project, source: &Project, kind: DependencyKind) {
        target
            .timeline
            .as_mut()
            .unwrap()
            .dependencies
            .push(TimelineDependency {
                project_id: source.id,
                kind,
            });
    }

    /// The two-project scenario: A then B, B starting after A ends.
    pub(crate) fn scenario() -> Vec<Project> {
        let a = timed("A", Some(0), ymd(2026, 1, 1), 4);
        let mut b = timed("B", Some(1), ymd(2026, 1, 15), 2);
        depend(&mut b, &a, DependencyKind::FinishToStart);
        vec![b, a]
    }

    #[test]
    fn end_to_end_scenario() {
        let layout = compute_layout(&scenario(), 1.0, ymd(2026, 1, 1));
        let names: Vec<_> = layout.bars.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["A", "B"]);

        let a = &layout.bars[0];
        assert!(a.start_x.abs() < 1e-9);
        assert_eq!(layout.arrows.len(), 1);
        let arrow = layout.arrows[0];
        assert_eq!((arrow.from_row, arrow.to_row), (0, 1));
        assert!((arrow.from_x - (a.start_x + a.width)).abs() < 1e-9);
        assert!((arrow.to_x - layout.bars[1].start_x).abs() < 1e-9);
        assert!(layout.diagnostics.is_empty());
    }

    #[test]
    fn full_window_bar_spans_zero_to_one() {
        let window = TimelineWindow::covering(ymd(2026, 1, 1), 1.0);
        let weeks = (window.total_days / 7) as u32;
        let projects = [timed("Full", None, window.start, weeks)];
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
        let bar = &layout.bars[0];
        assert!(bar.start_x.abs() < 1e-9);
        assert!((bar.end_x() - 1.0).abs() < 1e-9);
    }

    #[rstest]
    #[case(DependencyKind::FinishToStart, ymd(2026, 3, 1), ymd(2026, 3, 15))]
    #[case(DependencyKind::StartToStart, ymd(2026, 2, 1), ymd(2026, 3, 15))]
    #[case(DependencyKind::FinishToFinish, ymd(2026, 3, 1), ymd(2026, 4, 12))]
    #[case(DependencyKind::StartToFinish, ymd(2026, 2, 1), ymd(2026, 4, 12))]
    fn arrow_endpoints_follow_kind(
        #[case] kind: DependencyKind,
        #[case] from: NaiveDate,
        #[case] to: NaiveDate,
    ) {
        let source = timed("Source", Some(0), ymd(2026, 2, 1), 4);
        let mut target = timed("Target", Some(1), ymd(2026, 3, 15), 4);
        depend(&mut target, &source, kind);

        let layout = compute_layout(&[source, target], 1.0, ymd(2026, 1, 10));
        let arrow = layout.arrows[0];
        assert_eq!(arrow.kind, kind);
        assert!((arrow.from_x - layout.fraction(from)).abs() < 1e-9);
        assert!((arrow.to_x - layout.fraction(to)).abs() < 1e-9);
    }

    #[rstest]
    #[case(0.0)]
    #[case(-2.0)]
    #[case(f64::NAN)]
    #[case(f64::INFINITY)]
    #[case(1e6)]
    fn degenerate_window_never_yields_non_finite_geometry(#[case] years: f64) {
        let layout = compute_layout(&scenario(), years, ymd(2026, 1, 1));
        assert!(layout.is_degenerate());
        for bar in &layout.bars {
            assert!(bar.start_x.is_finite() && bar.width.is_finite());
        }
        for arrow in &layout.arrows {
            assert!(arrow.from_x.is_finite() && arrow.to_x.is_finite());
        }
        assert!(layout.quarters.is_empty());
    }

    #[test]
    fn milestone_visibility_is_inclusive_of_start() {
        let mut project = timed("Gin", None, ymd(2026, 3, 1), 2);
        let timeline = project.timeline.as_mut().unwrap();
        timeline.milestones = vec![
            Milestone::new("Day before", ymd(2026, 2, 28)),
            Milestone::new("On start", ymd(2026, 3, 1)),
            Milestone::new("On end", ymd(2026, 3, 15)),
            Milestone::new("After", ymd(2026, 3, 16)),
        ];
        timeline.milestones.push(Milestone {
            date: CalendarDate::Malformed("soon".into()),
            ..Milestone::new("Broken", ymd(2026, 3, 2))
        });

        let layout = compute_layout(&[project], 1.0, ymd(2026, 1, 1));
        let shown: Vec<_> = layout.bars[0]
            .visible_milestones()
            .map(|(m, _)| m.name.as_str())
            .collect();
        assert_eq!(shown, ["On start", "On end"]);
        // Layout keeps every milestone; only rendering filters.
        assert_eq!(layout.bars[0].milestones.len(), 5);
    }

    #[test]
    fn quarter_markers_start_at_reference_year() {
        let layout = compute_layout(&[], 2.0, ymd(2026, 5, 20));
        let labels: Vec<_> = layout.quarters.iter().map(|q| q.label.as_str()).collect();
        assert_eq!(labels, ["Q1/26", "Q2/26", "Q3/26", "Q4/26", "Q1/27", "Q2/27", "Q3/27", "Q4/27"]);
        // Window starts in May, so the first quarters sit left of the window.
        assert!(layout.quarters[0].x < 0.0);
        assert!(layout.quarters[3].x > 0.0);
    }

    #[test]
    fn disabled_and_invalid_timelines_are_left_out() {
        let mut disabled = timed("Disabled", None, ymd(2026, 1, 5), 3);
        disabled.timeline.as_mut().unwrap().enabled = false;
        let untimed = Project::new("Untimed");
        let mut malformed = timed("Malformed", None, ymd(2026, 1, 5), 3);
        malformed.timeline.as_mut().unwrap().start_date = CalendarDate::Malformed("2026-13-01".into());
        let zero = timed("Zero", None, ymd(2026, 1, 5), 0);
        let ok = timed("Ok", None, ymd(2026, 1, 5), 3);

        let layout = compute_layout(&[disabled, untimed, malformed, zero, ok], 1.0, ymd(2026, 1, 1));
        assert_eq!(layout.bars.len(), 1);
        assert_eq!(layout.bars[0].name, "Ok");
        assert_eq!(layout.diagnostics.len(), 2);
        assert!(layout.diagnostics.iter().all(LayoutDiagnostic::skips_row));
    }

    #[test]
    fn unresolved_dependencies_are_dropped_with_diagnostic() {
        let ghost = timed("Ghost", None, ymd(2026, 1, 5), 3);
        let mut target = timed("Target", None, ymd(2026, 2, 5), 3);
        depend(&mut target, &ghost, DependencyKind::StartToStart);

        let layout = compute_layout(&[target], 1.0, ymd(2026, 1, 1));
        assert!(layout.arrows.is_empty());
        assert_eq!(
            layout.diagnostics,
            vec![LayoutDiagnostic::UnresolvedDependency {
                project_id: layout.bars[0].project_id,
                name: "Target".into(),
                missing: ghost.id,
            }]
        );
    }

    #[test]
    fn bars_outside_window_are_kept() {
        let early = timed("Early", None, ymd(2024, 1, 1), 2);
        let layout = compute_layout(&[early], 1.0, ymd(2026, 1, 1));
        assert_eq!(layout.bars.len(), 1);
        assert!(layout.bars[0].end_x() < 0.0);
    }

    #[test]
    fn fill_follows_status() {
        let mut archived = timed("Old", None, ymd(2026, 1, 5), 1);
        archived.status = ProjectStatus::Archived;
        let layout = compute_layout(&[archived], 1.0, ymd(2026, 1, 1));
        assert_eq!(layout.bars[0].fill, status_fill(ProjectStatus::Archived));
        assert_ne!(
            status_fill(ProjectStatus::Active),
            status_fill(ProjectStatus::Paused)
        );
    }

    proptest! {
        #[test]
        fn bar_order_matches_sort_key_then_start(
            rows in prop::collection::vec((prop::option::of(0i32..4), 0i64..90, 1u32..10), 0..24)
        ) {
            let projects: Vec<Project> = rows
                .iter()
                .enumerate()
                .map(|(i, (sort, offset, weeks))| {
                    timed(&format!("P{i}"), *sort, ymd(2026, 1, 1) + chrono::Duration::days(*offset), *weeks)
                })
                .collect();

            let mut expected: Vec<&Project> = projects.iter().collect();
            expected.sort_by_key(|p| {
                let t = p.timeline.as_ref().unwrap();
                (t.sort_order.unwrap_or(999), t.start().unwrap())
            });
            let expected: Vec<Uuid> = expected.iter().map(|p| p.id).collect();

            let first = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
            let second = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
            let ids: Vec<Uuid> = first.bars.iter().map(|b| b.project_id).collect();
            prop_assert_eq!(&ids, &expected);
            prop_assert_eq!(first, second);
        }
    }
}
