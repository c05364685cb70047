use chrono::{DateTime, Datelike, Days, Months, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Sort key used for timelines that were never explicitly ordered.
pub const UNORDERED_SORT_KEY: i32 = 999;

/// A calendar date as stored in the project documents.
///
/// Unparseable input is kept verbatim as `Malformed` instead of failing the
/// whole document, so the layout can skip that one row with a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CalendarDate {
    Valid(NaiveDate),
    Malformed(String),
}

impl CalendarDate {
    /// Accepts `YYYY-MM-DD` or a full ISO-8601 timestamp (truncated to its date).
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            return Self::Valid(date);
        }
        if let Ok(ts) = DateTime::parse_from_rfc3339(trimmed) {
            return Self::Valid(ts.date_naive());
        }
        if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
            return Self::Valid(ts.date());
        }
        Self::Malformed(raw.to_string())
    }

    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            Self::Valid(date) => Some(*date),
            Self::Malformed(_) => None,
        }
    }
}

impl From<NaiveDate> for CalendarDate {
    fn from(date: NaiveDate) -> Self {
        Self::Valid(date)
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Valid(date) => write!(f, "{}", date.format("%Y-%m-%d")),
            Self::Malformed(raw) => f.write_str(raw),
        }
    }
}

impl Serialize for CalendarDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

/// A missing date reads as malformed so the row is skipped, not the document.
impl Default for CalendarDate {
    fn default() -> Self {
        Self::Malformed(String::new())
    }
}

impl<'de> Deserialize<'de> for CalendarDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(raw) => Self::parse(&raw),
            serde_json::Value::Null => Self::default(),
            other => Self::Malformed(other.to_string()),
        })
    }
}

/// Whole, non-negative week counts; anything else reads as 0 and the layout
/// skips the row.
fn lenient_weeks<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    let weeks = value
        .as_f64()
        .filter(|w| w.fract() == 0.0 && *w >= 0.0 && *w <= u32::MAX as f64)
        .map(|w| w as u32);
    Ok(weeks.unwrap_or_else(|| {
        tracing::warn!(raw = %value, "unusable durationWeeks, reading as 0");
        0
    }))
}

/// Progress is clamped to `0..=100`; non-numbers read as 0.
fn lenient_progress<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value
        .as_f64()
        .map(|p| p.round().clamp(0.0, 100.0) as u8)
        .unwrap_or(0))
}

/// Temporal relationship between a source project and the dependent project.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    FinishToStart,
    StartToStart,
    FinishToFinish,
    StartToFinish,
}

impl DependencyKind {
    pub fn all() -> &'static [DependencyKind] {
        &[
            DependencyKind::FinishToStart,
            DependencyKind::StartToStart,
            DependencyKind::FinishToFinish,
            DependencyKind::StartToFinish,
        ]
    }

    pub fn short_label(self) -> &'static str {
        match self {
            DependencyKind::FinishToStart => "FS",
            DependencyKind::StartToStart => "SS",
            DependencyKind::FinishToFinish => "FF",
            DependencyKind::StartToFinish => "SF",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DependencyKind::FinishToStart => "Finish to start",
            DependencyKind::StartToStart => "Start to start",
            DependencyKind::FinishToFinish => "Finish to finish",
            DependencyKind::StartToFinish => "Start to finish",
        }
    }

    /// True when the arrow leaves the source project at its end date.
    pub fn from_source_end(self) -> bool {
        matches!(self, DependencyKind::FinishToStart | DependencyKind::FinishToFinish)
    }

    /// True when the arrow lands on the dependent project at its end date.
    pub fn to_target_end(self) -> bool {
        matches!(self, DependencyKind::FinishToFinish | DependencyKind::StartToFinish)
    }

    /// Human-readable sentence from the dependent project's point of view.
    pub fn describe(self, source_name: &str) -> String {
        match self {
            DependencyKind::FinishToStart => format!("→ Start after end of {}", source_name),
            DependencyKind::StartToStart => format!("→ Start together with {}", source_name),
            DependencyKind::FinishToFinish => format!("→ Finish together with {}", source_name),
            DependencyKind::StartToFinish => format!("→ Finish after start of {}", source_name),
        }
    }
}

/// Dependency of the owning project on another project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineDependency {
    pub project_id: Uuid,
    #[serde(rename = "type")]
    pub kind: DependencyKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub date: CalendarDate,
    #[serde(default)]
    pub completed: bool,
}

impl Milestone {
    pub fn new(name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            date: date.into(),
            completed: false,
        }
    }
}

/// Scheduling record embedded in a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectTimeline {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub start_date: CalendarDate,
    #[serde(default, deserialize_with = "lenient_weeks")]
    pub duration_weeks: u32,
    #[serde(default)]
    pub team: Vec<Uuid>,
    #[serde(default)]
    pub dependencies: Vec<TimelineDependency>,
    #[serde(default)]
    pub milestones: Vec<Milestone>,
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
}

impl ProjectTimeline {
    /// A fresh timeline: enabled, four weeks long, nothing attached.
    pub fn new(start: NaiveDate) -> Self {
        Self {
            enabled: true,
            start_date: start.into(),
            duration_weeks: 4,
            team: Vec::new(),
            dependencies: Vec::new(),
            milestones: Vec::new(),
            progress: 0,
            sort_order: None,
        }
    }

    pub fn start(&self) -> Option<NaiveDate> {
        self.start_date.date()
    }

    /// `start + duration_weeks * 7 days`; never stored.
    pub fn end(&self) -> Option<NaiveDate> {
        self.start()?
            .checked_add_days(Days::new(self.duration_days() as u64))
    }

    pub fn duration_days(&self) -> i64 {
        self.duration_weeks as i64 * 7
    }

    pub fn sort_key(&self) -> i32 {
        self.sort_order.unwrap_or(UNORDERED_SORT_KEY)
    }

    pub fn depends_on(&self, project_id: Uuid) -> bool {
        self.dependencies.iter().any(|d| d.project_id == project_id)
    }
}

/// The visible date range of a timeline view.
///
/// Starts on the first day of the reference month and spans
/// `ceil(visible_years * 12)` whole calendar months.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimelineWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Day count from `start` to `end`, never below 1.
    pub total_days: i64,
    /// Set when the requested span produced an empty or inverted range.
    pub degenerate: bool,
}

impl TimelineWindow {
    pub fn covering(reference: NaiveDate, visible_years: f64) -> Self {
        let months = if visible_years.is_finite() {
            (visible_years * 12.0).ceil().max(0.0) as u32
        } else {
            0
        };
        let start = reference.with_day(1).unwrap_or(reference);
        let end = start
            .checked_add_months(Months::new(months))
            .and_then(|d| d.checked_sub_days(Days::new(1)))
            .unwrap_or(start);
        let raw_days = (end - start).num_days();

        Self {
            start,
            end,
            total_days: raw_days.max(1),
            degenerate: raw_days <= 0,
        }
    }

    /// Position of `date` as a fraction of the window width (may lie outside `0..=1`).
    pub fn fraction(&self, date: NaiveDate) -> f64 {
        (date - self.start).num_days() as f64 / self.total_days as f64
    }

    /// Width fraction of a span of `days` days.
    pub fn span(&self, days: i64) -> f64 {
        days as f64 / self.total_days as f64
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn calendar_date_accepts_iso_timestamps() {
        assert_eq!(CalendarDate::parse("2026-03-04"), CalendarDate::Valid(ymd(2026, 3, 4)));
        assert_eq!(
            CalendarDate::parse("2026-03-04T00:00:00.000Z"),
            CalendarDate::Valid(ymd(2026, 3, 4))
        );
        assert_eq!(
            CalendarDate::parse("2026-03-04T10:30:00"),
            CalendarDate::Valid(ymd(2026, 3, 4))
        );
        assert_eq!(
            CalendarDate::parse("next tuesday"),
            CalendarDate::Malformed("next tuesday".into())
        );
    }

    #[test]
    fn malformed_dates_survive_a_save() {
        let timeline: ProjectTimeline = serde_json::from_str(
            r#"{"enabled":true,"startDate":"31.02.2026","durationWeeks":3}"#,
        )
        .unwrap();
        assert_eq!(timeline.start(), None);
        let json = serde_json::to_string(&timeline).unwrap();
        assert!(json.contains(r#""startDate":"31.02.2026""#));
    }

    #[test]
    fn out_of_range_numbers_read_leniently() {
        let read = |json: &str| serde_json::from_str::<ProjectTimeline>(json).unwrap();

        let negative = read(r#"{"enabled":true,"startDate":"2026-01-05","durationWeeks":-2,"progress":300}"#);
        assert_eq!(negative.duration_weeks, 0);
        assert_eq!(negative.progress, 100);

        let fractional = read(r#"{"enabled":true,"startDate":"2026-01-05","durationWeeks":2.5,"progress":-4}"#);
        assert_eq!(fractional.duration_weeks, 0);
        assert_eq!(fractional.progress, 0);

        let whole_float = read(r#"{"enabled":true,"startDate":"2026-01-05","durationWeeks":3.0,"progress":42.6}"#);
        assert_eq!(whole_float.duration_weeks, 3);
        assert_eq!(whole_float.progress, 43);

        let missing = read(r#"{"enabled":true,"startDate":null}"#);
        assert_eq!(missing.start_date, CalendarDate::Malformed(String::new()));
        assert_eq!(missing.duration_weeks, 0);

        let absent = read(r#"{"enabled":true,"durationWeeks":"four"}"#);
        assert_eq!(absent.start(), None);
        assert_eq!(absent.duration_weeks, 0);
    }

    #[test]
    fn timeline_json_uses_camel_case_and_kebab_kinds() {
        let json = r#"{
            "enabled": true,
            "startDate": "2026-01-01",
            "durationWeeks": 4,
            "dependencies": [
                {"projectId": "6f0d1d52-2b8e-4c39-9a57-1a0c7f3b8b11", "type": "start-to-finish"}
            ],
            "progress": 40,
            "sortOrder": 2
        }"#;
        let timeline: ProjectTimeline = serde_json::from_str(json).unwrap();
        assert_eq!(timeline.dependencies[0].kind, DependencyKind::StartToFinish);
        assert_eq!(timeline.sort_key(), 2);
        assert_eq!(timeline.end(), Some(ymd(2026, 1, 29)));
        assert!(timeline.team.is_empty());
    }

    #[test]
    fn window_spans_whole_months() {
        let w = TimelineWindow::covering(ymd(2026, 1, 17), 1.0);
        assert_eq!(w.start, ymd(2026, 1, 1));
        assert_eq!(w.end, ymd(2026, 12, 31));
        assert_eq!(w.total_days, 364);
        assert!(!w.degenerate);

        let w = TimelineWindow::covering(ymd(2026, 11, 3), 2.0);
        assert_eq!(w.start, ymd(2026, 11, 1));
        assert_eq!(w.end, ymd(2028, 10, 31));
    }

    #[test]
    fn zero_year_window_is_degenerate_but_finite() {
        for years in [0.0, -1.0, f64::NAN] {
            let w = TimelineWindow::covering(ymd(2026, 5, 5), years);
            assert!(w.degenerate);
            assert_eq!(w.total_days, 1);
            assert!(w.fraction(ymd(2026, 6, 1)).is_finite());
        }
    }

    #[test]
    fn dependency_descriptions() {
        assert_eq!(
            DependencyKind::FinishToStart.describe("Gin"),
            "→ Start after end of Gin"
        );
        assert_eq!(
            DependencyKind::StartToFinish.describe("Gin"),
            "→ Finish after start of Gin"
        );
    }
}
