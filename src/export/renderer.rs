//! Paginated rendering of a [`TimelineLayout`] onto fixed-size pages.
//!
//! Uses its own page geometry (millimetres, fixed margins and name column)
//! but takes every position, order and arrow route from the layout.

use chrono::NaiveDate;

use super::document::{Element, ExportDocument, Page, PageKind, PageSize, TextAnchor};
use crate::error::ExportError;
use crate::layout::{capacity_segments, status_fill, Bar, TimelineLayout};
use crate::model::{CapacityUtilization, DependencyKind, Directory, ProjectStatus, Rgb};

const MARGIN: f32 = 12.0;
const NAME_COLUMN: f32 = 58.0;
const TITLE_HEIGHT: f32 = 14.0;
const HEADER_HEIGHT: f32 = 8.0;
const ROW_HEIGHT: f32 = 7.0;
const BAR_INSET: f32 = 1.3;
const MIN_BAR_WIDTH: f32 = 0.8;
const FOOTER_HEIGHT: f32 = 8.0;
const CAPACITY_HEIGHT: f32 = 9.0;
const LEGEND_HEIGHT: f32 = 20.0;
const SECTION_GAP: f32 = 3.0;
const LINE_HEIGHT: f32 = 5.5;
const HEADING_SIZE: f32 = 6.0;
const TEXT_SIZE: f32 = 3.2;
const SMALL_TEXT: f32 = 2.6;
/// Rough advance of one character relative to the font size.
const CHAR_WIDTH: f32 = 0.5;

const TEXT: Rgb = Rgb::new(0x21, 0x21, 0x21);
const TEXT_DIM: Rgb = Rgb::new(0x75, 0x75, 0x75);
const GRID: Rgb = Rgb::new(0xDD, 0xDD, 0xDD);
const HEADER_BG: Rgb = Rgb::new(0xF2, 0xF4, 0xF7);
const ROW_STRIPE: Rgb = Rgb::new(0xFA, 0xFA, 0xFA);
const ARROW: Rgb = Rgb::new(0x54, 0x6E, 0x7A);
const MILESTONE_OPEN: Rgb = Rgb::new(0xFB, 0x8C, 0x00);
const MILESTONE_DONE: Rgb = Rgb::new(0x2E, 0x7D, 0x32);

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub title: String,
    pub generated: NaiveDate,
    pub page: PageSize,
    pub include_details: bool,
}

impl ExportOptions {
    pub fn new(title: impl Into<String>, generated: NaiveDate) -> Self {
        Self {
            title: title.into(),
            generated,
            page: PageSize::A4_LANDSCAPE,
            include_details: true,
        }
    }
}

/// Render the timeline pages, then one detail section per project.
pub fn render_document(
    layout: &TimelineLayout,
    capacity: &CapacityUtilization,
    directory: Directory<'_>,
    options: &ExportOptions,
) -> Result<ExportDocument, ExportError> {
    if layout.bars.is_empty() || layout.is_degenerate() {
        return Err(ExportError::Empty);
    }

    let mut writer = PageWriter::new(options.page);
    render_timeline(&mut writer, layout, capacity, options);
    if options.include_details {
        for bar in &layout.bars {
            render_details(&mut writer, bar, directory);
        }
    }

    let pages = writer.finish(&options.title);
    tracing::info!(pages = pages.len(), rows = layout.bars.len(), "timeline document rendered");
    Ok(ExportDocument {
        title: options.title.clone(),
        generated: options.generated,
        size: options.page,
        pages,
    })
}

struct PageWriter {
    size: PageSize,
    pages: Vec<Page>,
    y: f32,
}

impl PageWriter {
    fn new(size: PageSize) -> Self {
        Self {
            size,
            pages: Vec::new(),
            y: MARGIN,
        }
    }

    fn new_page(&mut self, kind: PageKind) {
        self.pages.push(Page::new(kind));
        self.y = MARGIN;
    }

    fn bottom(&self) -> f32 {
        self.size.height - MARGIN - FOOTER_HEIGHT
    }

    fn fits(&self, height: f32) -> bool {
        self.y + height <= self.bottom()
    }

    fn page_index(&self) -> usize {
        self.pages.len().saturating_sub(1)
    }

    fn push(&mut self, element: Element) {
        if let Some(page) = self.pages.last_mut() {
            page.elements.push(element);
        }
    }

    fn push_to(&mut self, page: usize, element: Element) {
        if let Some(page) = self.pages.get_mut(page) {
            page.elements.push(element);
        }
    }

    fn text(&mut self, x: f32, y: f32, text: impl Into<String>, size: f32, color: Rgb, bold: bool) {
        self.push(Element::Text {
            x,
            y,
            text: text.into(),
            size,
            color,
            bold,
            anchor: TextAnchor::Start,
        });
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32, fill: Rgb) {
        self.push(Element::Rect {
            x,
            y,
            width,
            height,
            fill: Some(fill),
            stroke: None,
        });
    }

    /// Stamp the footer on every page and hand the pages over.
    fn finish(mut self, title: &str) -> Vec<Page> {
        let total = self.pages.len();
        let baseline = self.size.height - MARGIN - 2.0;
        let right = self.size.width - MARGIN;
        for (i, page) in self.pages.iter_mut().enumerate() {
            page.elements.push(Element::Line {
                x1: MARGIN,
                y1: baseline - 4.0,
                x2: right,
                y2: baseline - 4.0,
                color: GRID,
                width: 0.2,
            });
            page.elements.push(Element::Text {
                x: MARGIN,
                y: baseline,
                text: title.to_string(),
                size: SMALL_TEXT,
                color: TEXT_DIM,
                bold: false,
                anchor: TextAnchor::Start,
            });
            page.elements.push(Element::Text {
                x: right,
                y: baseline,
                text: format!("Page {} / {}", i + 1, total),
                size: SMALL_TEXT,
                color: TEXT_DIM,
                bold: false,
                anchor: TextAnchor::End,
            });
        }
        self.pages
    }
}

/// Horizontal mapping of window fractions onto the chart area of a page.
#[derive(Clone, Copy)]
struct Chart {
    left: f32,
    width: f32,
}

impl Chart {
    fn for_page(size: PageSize) -> Self {
        let left = MARGIN + NAME_COLUMN;
        Self {
            left,
            width: size.width - left - MARGIN,
        }
    }

    fn x(&self, fraction: f64) -> f32 {
        self.left + fraction.clamp(0.0, 1.0) as f32 * self.width
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

fn truncate(text: &str, width: f32, size: f32) -> String {
    let max = (width / (size * CHAR_WIDTH)).floor().max(1.0) as usize;
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Greedy word wrap; explicit newlines start a new line and words longer
/// than a line are split.
fn wrap(text: &str, width: f32, size: f32) -> Vec<String> {
    let max = (width / (size * CHAR_WIDTH)).floor().max(8.0) as usize;
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        let pieces = paragraph.split_whitespace().flat_map(|word| {
            let chars: Vec<char> = word.chars().collect();
            chars
                .chunks(max)
                .map(|chunk| chunk.iter().collect::<String>())
                .collect::<Vec<_>>()
        });
        for word in pieces {
            let word = word.as_str();
            if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(word);
        }
        lines.push(line);
    }
    lines
}

fn draw_quarter_header(writer: &mut PageWriter, layout: &TimelineLayout, chart: Chart) {
    let top = writer.y;
    let bottom = writer.bottom();
    writer.rect(MARGIN, top, chart.right() - MARGIN, HEADER_HEIGHT, HEADER_BG);
    writer.text(MARGIN + 1.0, top + HEADER_HEIGHT * 0.68, "Project", TEXT_SIZE, TEXT, true);

    for (i, quarter) in layout.quarters.iter().enumerate() {
        let next_x = layout.quarters.get(i + 1).map(|q| q.x).unwrap_or(1.0);
        if next_x <= 0.0 || quarter.x >= 1.0 {
            continue;
        }
        let x = chart.x(quarter.x);
        writer.push(Element::Line {
            x1: x,
            y1: top,
            x2: x,
            y2: bottom,
            color: GRID,
            width: 0.25,
        });
        if chart.x(next_x) - x > 8.0 {
            writer.text(x + 1.5, top + HEADER_HEIGHT * 0.68, quarter.label.clone(), TEXT_SIZE, TEXT, true);
        }
    }
    writer.y += HEADER_HEIGHT;
}

fn start_timeline_page(writer: &mut PageWriter, layout: &TimelineLayout, chart: Chart) {
    writer.new_page(PageKind::Timeline);
    draw_quarter_header(writer, layout, chart);
}

fn draw_row(writer: &mut PageWriter, layout: &TimelineLayout, chart: Chart, bar: &Bar) -> f32 {
    let top = writer.y;
    if bar.row % 2 == 1 {
        writer.rect(MARGIN, top, chart.right() - MARGIN, ROW_HEIGHT, ROW_STRIPE);
    }
    writer.text(
        MARGIN + 1.0,
        top + ROW_HEIGHT * 0.68,
        truncate(&bar.name, NAME_COLUMN - 2.0, TEXT_SIZE),
        TEXT_SIZE,
        TEXT,
        false,
    );

    let visible_start = bar.start_x.max(0.0);
    let visible_end = bar.end_x().min(1.0);
    if visible_end > visible_start {
        let x0 = chart.x(visible_start);
        let width = (chart.x(visible_end) - x0).max(MIN_BAR_WIDTH);
        let bar_top = top + BAR_INSET;
        let bar_height = ROW_HEIGHT - BAR_INSET * 2.0;
        writer.rect(x0, bar_top, width, bar_height, bar.fill);

        if bar.progress > 0 {
            let progress_end = (bar.start_x + bar.width * bar.progress as f64 / 100.0).min(1.0);
            if progress_end > visible_start {
                let progress_width = chart.x(progress_end) - x0;
                writer.rect(x0, bar_top + bar_height * 0.6, progress_width, bar_height * 0.4, bar.fill.lerp(Rgb::BLACK, 0.35));
            }
        }
    }

    for (milestone, date) in bar.visible_milestones() {
        let fraction = layout.fraction(date);
        if !(0.0..=1.0).contains(&fraction) {
            continue;
        }
        let x = chart.x(fraction);
        let fill = if milestone.completed { MILESTONE_DONE } else { MILESTONE_OPEN };
        writer.push(Element::Polygon {
            points: vec![(x - 1.4, top + 0.6), (x + 1.4, top + 0.6), (x, top + 3.0)],
            fill,
        });
    }

    writer.y += ROW_HEIGHT;
    top + ROW_HEIGHT / 2.0
}

fn draw_arrows(writer: &mut PageWriter, layout: &TimelineLayout, chart: Chart, rows: &[Option<(usize, f32)>]) {
    for arrow in &layout.arrows {
        let (Some(Some((from_page, from_y))), Some(Some((to_page, to_y)))) =
            (rows.get(arrow.from_row), rows.get(arrow.to_row))
        else {
            continue;
        };
        // Rows on different pages cannot be joined.
        if from_page != to_page {
            continue;
        }
        let fx = chart.x(arrow.from_x);
        let tx = chart.x(arrow.to_x);
        let ex = chart.x(arrow.elbow_x());
        writer.push_to(
            *from_page,
            Element::Polyline {
                points: vec![(fx, *from_y), (ex, *from_y), (ex, *to_y), (tx, *to_y)],
                color: ARROW,
                width: 0.3,
            },
        );
        let dir = if tx >= ex { 1.0 } else { -1.0 };
        writer.push_to(
            *to_page,
            Element::Polygon {
                points: vec![(tx, *to_y), (tx - 1.2 * dir, *to_y - 0.8), (tx - 1.2 * dir, *to_y + 0.8)],
                fill: ARROW,
            },
        );
    }
}

fn draw_capacity(writer: &mut PageWriter, layout: &TimelineLayout, chart: Chart, capacity: &CapacityUtilization) {
    if !writer.fits(CAPACITY_HEIGHT + SECTION_GAP) {
        start_timeline_page(writer, layout, chart);
    }
    writer.y += SECTION_GAP;
    let top = writer.y;
    writer.text(MARGIN + 1.0, top + CAPACITY_HEIGHT * 0.62, "Capacity", TEXT_SIZE, TEXT, true);

    for segment in capacity_segments(&layout.quarters, capacity) {
        let Some((x, width)) = segment.clipped() else {
            continue;
        };
        let x0 = chart.x(x);
        let width_mm = chart.x(x + width) - x0;
        writer.push(Element::Rect {
            x: x0,
            y: top,
            width: width_mm,
            height: CAPACITY_HEIGHT,
            fill: Some(segment.color),
            stroke: Some(Rgb::WHITE),
        });
        if segment.percentage > 0 && width_mm >= 8.0 {
            writer.push(Element::Text {
                x: x0 + width_mm / 2.0,
                y: top + CAPACITY_HEIGHT * 0.62,
                text: format!("{}%", segment.percentage),
                size: TEXT_SIZE,
                color: segment.label_color(),
                bold: true,
                anchor: TextAnchor::Middle,
            });
        }
    }
    writer.y += CAPACITY_HEIGHT;
}

fn draw_legend(writer: &mut PageWriter) {
    if !writer.fits(LEGEND_HEIGHT + SECTION_GAP) {
        writer.new_page(PageKind::Timeline);
    }
    writer.y += SECTION_GAP;
    let top = writer.y;
    writer.text(MARGIN, top + 4.0, "Legend", TEXT_SIZE, TEXT, true);

    let mut x = MARGIN;
    for status in ProjectStatus::all() {
        writer.push(Element::Rect {
            x,
            y: top + 6.5,
            width: 6.0,
            height: 3.5,
            fill: Some(status_fill(*status)),
            stroke: Some(GRID),
        });
        writer.text(x + 7.5, top + 9.5, status.label(), SMALL_TEXT, TEXT, false);
        x += 36.0;
    }

    let mut x = MARGIN;
    for kind in DependencyKind::all() {
        writer.text(x, top + 16.0, format!("{}  {}", kind.short_label(), kind.label()), SMALL_TEXT, TEXT_DIM, false);
        x += 45.0;
    }
    writer.y += LEGEND_HEIGHT;
}

fn render_timeline(
    writer: &mut PageWriter,
    layout: &TimelineLayout,
    capacity: &CapacityUtilization,
    options: &ExportOptions,
) {
    let chart = Chart::for_page(writer.size);

    writer.new_page(PageKind::Timeline);
    writer.text(MARGIN, writer.y + 7.0, options.title.clone(), HEADING_SIZE, TEXT, true);
    writer.text(
        MARGIN,
        writer.y + 12.0,
        format!(
            "{} – {} · generated {}",
            format_date(layout.window.start),
            format_date(layout.window.end),
            format_date(options.generated)
        ),
        SMALL_TEXT,
        TEXT_DIM,
        false,
    );
    writer.y += TITLE_HEIGHT;
    draw_quarter_header(writer, layout, chart);

    let mut rows: Vec<Option<(usize, f32)>> = vec![None; layout.bars.len()];
    for bar in &layout.bars {
        if !writer.fits(ROW_HEIGHT) {
            start_timeline_page(writer, layout, chart);
        }
        let mid = draw_row(writer, layout, chart, bar);
        if let Some(slot) = rows.get_mut(bar.row) {
            *slot = Some((writer.page_index(), mid));
        }
    }
    draw_arrows(writer, layout, chart, &rows);

    if capacity.enabled {
        draw_capacity(writer, layout, chart, capacity);
    }
    draw_legend(writer);
}

/// Writes one line of a detail section, continuing on a new page when full.
fn detail_line(writer: &mut PageWriter, project: &str, text: String, size: f32, color: Rgb, bold: bool) {
    if !writer.fits(LINE_HEIGHT) {
        writer.new_page(PageKind::Details);
        writer.text(MARGIN, writer.y + 5.0, format!("{} (continued)", project), TEXT_SIZE + 1.0, TEXT, true);
        writer.y += LINE_HEIGHT * 1.6;
    }
    writer.text(MARGIN, writer.y + LINE_HEIGHT * 0.75, text, size, color, bold);
    writer.y += LINE_HEIGHT;
}

fn render_details(writer: &mut PageWriter, bar: &Bar, directory: Directory<'_>) {
    writer.new_page(PageKind::Details);
    writer.text(MARGIN, writer.y + 6.0, bar.name.clone(), HEADING_SIZE, TEXT, true);
    writer.push(Element::Rect {
        x: writer.size.width - MARGIN - 30.0,
        y: writer.y + 1.5,
        width: 30.0,
        height: 6.0,
        fill: Some(bar.fill),
        stroke: None,
    });
    writer.y += 11.0;

    let text_width = writer.size.width - MARGIN * 2.0;
    let team = directory.team_names(&bar.team).unwrap_or_else(|| "—".to_string());
    let facts = [
        ("Status", bar.status.label().to_string()),
        ("Period", format!("{} – {}", format_date(bar.start), format_date(bar.end))),
        ("Duration", format!("{} weeks", bar.duration_weeks)),
        ("Progress", format!("{}%", bar.progress)),
        ("Team", team),
    ];
    for (label, value) in facts {
        detail_line(writer, &bar.name, format!("{}: {}", label, value), TEXT_SIZE, TEXT, false);
    }

    if !bar.description.trim().is_empty() {
        writer.y += 2.0;
        detail_line(writer, &bar.name, "Description".into(), TEXT_SIZE, TEXT, true);
        for line in wrap(&bar.description, text_width, TEXT_SIZE) {
            detail_line(writer, &bar.name, line, TEXT_SIZE, TEXT, false);
        }
    }

    writer.y += 2.0;
    detail_line(writer, &bar.name, "Milestones".into(), TEXT_SIZE, TEXT, true);
    if bar.milestones.is_empty() {
        detail_line(writer, &bar.name, "—".into(), TEXT_SIZE, TEXT_DIM, false);
    }
    for milestone in &bar.milestones {
        let marker = if milestone.completed { "✓" } else { "○" };
        let date = milestone
            .date
            .date()
            .map(format_date)
            .unwrap_or_else(|| milestone.date.to_string());
        detail_line(writer, &bar.name, format!("{} {} ({})", marker, milestone.name, date), TEXT_SIZE, TEXT, false);
    }

    writer.y += 2.0;
    detail_line(writer, &bar.name, "Dependencies".into(), TEXT_SIZE, TEXT, true);
    if bar.dependencies.is_empty() {
        detail_line(writer, &bar.name, "—".into(), TEXT_SIZE, TEXT_DIM, false);
    }
    for dep in &bar.dependencies {
        let source = directory.project_name(dep.project_id);
        detail_line(writer, &bar.name, dep.kind.describe(&source), TEXT_SIZE, TEXT, false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::layout::tests::{scenario, timed, ymd};
    use crate::model::{Contact, Milestone, Project, QuarterKey};
    use uuid::Uuid;

    fn options() -> ExportOptions {
        ExportOptions::new("Project Timeline", ymd(2026, 1, 2))
    }

    fn render(projects: &[Project], capacity: &CapacityUtilization) -> ExportDocument {
        let layout = compute_layout(projects, 1.0, ymd(2026, 1, 1));
        render_document(&layout, capacity, Directory::new(projects, &[]), &options()).unwrap()
    }

    fn count_text(doc: &ExportDocument, kind: PageKind, needle: &str) -> usize {
        doc.pages_of(kind).flat_map(|p| p.texts()).filter(|t| *t == needle).count()
    }

    #[test]
    fn small_timeline_fits_one_page_plus_details() {
        let doc = render(&scenario(), &CapacityUtilization::default());
        assert_eq!(doc.pages_of(PageKind::Timeline).count(), 1);
        assert_eq!(doc.pages_of(PageKind::Details).count(), 2);

        let page = &doc.pages[0];
        for text in ["Q1/26", "Q4/26", "A", "B", "Legend", "Page 1 / 3"] {
            assert!(page.contains_text(text), "missing {text}");
        }
        let arrows = page
            .elements
            .iter()
            .filter(|e| matches!(e, Element::Polyline { .. }))
            .count();
        assert_eq!(arrows, 1);
    }

    #[test]
    fn long_timelines_break_pages_and_repeat_the_header() {
        let projects: Vec<Project> = (0..45)
            .map(|i| timed(&format!("Still {i:02}"), Some(i), ymd(2026, 1, 5), 3))
            .collect();
        let doc = render(&projects, &CapacityUtilization::default());

        let timeline_pages: Vec<&Page> = doc.pages_of(PageKind::Timeline).collect();
        assert!(timeline_pages.len() >= 2);
        for page in timeline_pages.iter().filter(|p| p.texts().any(|t| t.starts_with("Still "))) {
            assert!(page.contains_text("Q1/26"));
        }
        for i in 0..45 {
            assert_eq!(count_text(&doc, PageKind::Timeline, &format!("Still {i:02}")), 1);
        }
        assert_eq!(count_text(&doc, PageKind::Timeline, "Legend"), 1);
        assert_eq!(doc.pages_of(PageKind::Details).count(), 45);
    }

    #[test]
    fn arrows_across_a_page_break_are_not_drawn() {
        let mut projects: Vec<Project> = (0..30)
            .map(|i| timed(&format!("Row {i}"), Some(i), ymd(2026, 1, 5), 3))
            .collect();
        let first = projects[0].clone();
        crate::layout::tests::depend(&mut projects[29], &first, DependencyKind::FinishToStart);

        let doc = render(&projects, &CapacityUtilization::default());
        let polylines = doc
            .pages
            .iter()
            .flat_map(|p| &p.elements)
            .filter(|e| matches!(e, Element::Polyline { .. }))
            .count();
        assert_eq!(polylines, 0);
    }

    #[test]
    fn detail_pages_describe_dependencies_team_and_milestones() {
        let mut projects = scenario();
        let known = Contact {
            id: Uuid::new_v4(),
            first_name: "Ada".into(),
            last_name: "Brand".into(),
            company: None,
        };
        {
            let b = projects.iter_mut().find(|p| p.name == "B").unwrap();
            let timeline = b.timeline.as_mut().unwrap();
            timeline.team = vec![known.id, Uuid::new_v4()];
            let mut done = Milestone::new("Bottling", ymd(2026, 1, 20));
            done.completed = true;
            timeline.milestones.push(done);
        }
        let contacts = vec![known];
        let layout = compute_layout(&projects, 1.0, ymd(2026, 1, 1));
        let doc = render_document(&layout, &CapacityUtilization::default(), Directory::new(&projects, &contacts), &options())
            .unwrap();

        let b_page = doc
            .pages_of(PageKind::Details)
            .find(|p| p.contains_text("B"))
            .unwrap();
        assert!(b_page.contains_text("→ Start after end of A"));
        assert!(b_page.contains_text("Team: Ada Brand, Unknown"));
        assert!(b_page.contains_text("✓ Bottling (20/01/2026)"));
        assert!(b_page.contains_text("Duration: 2 weeks"));
    }

    #[test]
    fn capacity_strip_only_when_enabled() {
        let mut capacity = CapacityUtilization::default();
        capacity.set_percentage(QuarterKey::new(2026, 1).unwrap(), 70);

        let doc = render(&scenario(), &capacity);
        assert_eq!(count_text(&doc, PageKind::Timeline, "Capacity"), 0);

        capacity.enabled = true;
        let doc = render(&scenario(), &capacity);
        assert_eq!(count_text(&doc, PageKind::Timeline, "Capacity"), 1);
        assert_eq!(count_text(&doc, PageKind::Timeline, "70%"), 1);
        // Zero-percent quarters get no label.
        assert_eq!(count_text(&doc, PageKind::Timeline, "0%"), 0);
    }

    #[test]
    fn long_descriptions_continue_on_a_new_page() {
        let mut projects = vec![timed("Essay", None, ymd(2026, 2, 1), 4)];
        projects[0].description = "lorem ipsum ".repeat(900);
        let doc = render(&projects, &CapacityUtilization::default());
        let details: Vec<&Page> = doc.pages_of(PageKind::Details).collect();
        assert!(details.len() >= 2);
        assert!(details[1].contains_text("Essay (continued)"));
        assert!(details.last().unwrap().contains_text("Dependencies"));
    }

    #[test]
    fn nothing_to_export_is_an_error() {
        let layout = compute_layout(&[], 1.0, ymd(2026, 1, 1));
        let result = render_document(&layout, &CapacityUtilization::default(), Directory::new(&[], &[]), &options());
        assert!(matches!(result, Err(ExportError::Empty)));

        let layout = compute_layout(&scenario(), 0.0, ymd(2026, 1, 1));
        let result = render_document(&layout, &CapacityUtilization::default(), Directory::new(&[], &[]), &options());
        assert!(matches!(result, Err(ExportError::Empty)));
    }

    #[test]
    fn wrap_respects_width_and_newlines() {
        let lines = wrap("one two three\nfour", 13.0, TEXT_SIZE);
        assert_eq!(lines, ["one two", "three", "four"]);

        // 13mm at this size fits 8 characters.
        let lines = wrap("see https://example.org/guide", 13.0, TEXT_SIZE);
        assert_eq!(lines, ["see", "https://", "example.", "org/guid", "e"]);
        assert!(lines.iter().all(|l| l.chars().count() <= 8));
        assert_eq!(truncate("Distillery", 9.0, TEXT_SIZE), "Dist…");
    }
}
