use crate::layout::{capacity_segments, Bar, TimelineLayout};
use crate::model::{CapacityUtilization, Directory};
use crate::ui::theme;
use chrono::NaiveDate;
use egui::{Color32, Id, Pos2, Rect, Rounding, Sense, Shape, Stroke, Ui, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const ROW_PADDING: f32 = theme::ROW_GAP;
const ROW_PITCH: f32 = ROW_HEIGHT + ROW_PADDING;
const HEADER_HEIGHT: f32 = theme::HEADER_HEIGHT;
const NAME_WIDTH: f32 = theme::NAME_COLUMN_WIDTH;
const TOOLTIP_MILESTONES: usize = 3;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct DragSnapshot {
    project_id: Uuid,
    from_row: usize,
}

/// What the user did on the board this frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardInteraction {
    pub selected: Option<Uuid>,
    pub cleared_selection: bool,
    /// `(dragged project, target row)` once a drag ends on another row.
    pub reorder: Option<(Uuid, usize)>,
}

/// Screen mapping of window fractions and rows.
#[derive(Clone, Copy)]
struct Geometry {
    origin: Pos2,
    chart_left: f32,
    chart_width: f32,
}

impl Geometry {
    fn x(&self, fraction: f64) -> f32 {
        self.chart_left + fraction as f32 * self.chart_width
    }

    fn chart_right(&self) -> f32 {
        self.chart_left + self.chart_width
    }

    fn rows_top(&self) -> f32 {
        self.origin.y + HEADER_HEIGHT
    }

    fn row_top(&self, row: usize) -> f32 {
        self.rows_top() + row as f32 * ROW_PITCH
    }

    fn row_mid(&self, row: usize) -> f32 {
        self.row_top(row) + ROW_PADDING + ROW_HEIGHT / 2.0
    }
}

/// Row under a pointer at `pointer_y`, clamped to the existing rows.
fn drop_target(pointer_y: f32, rows_top: f32, row_count: usize) -> usize {
    if row_count == 0 {
        return 0;
    }
    let row = ((pointer_y - rows_top) / ROW_PITCH).floor();
    if row.is_finite() && row > 0.0 {
        (row as usize).min(row_count - 1)
    } else {
        0
    }
}

/// Up to three milestone lines plus the number left out.
fn milestone_lines(bar: &Bar) -> (Vec<String>, usize) {
    let lines = bar
        .milestones
        .iter()
        .take(TOOLTIP_MILESTONES)
        .map(|m| {
            let marker = if m.completed { "✓" } else { "○" };
            let date = m
                .date
                .date()
                .map(|d| d.format("%d/%m/%Y").to_string())
                .unwrap_or_else(|| m.date.to_string());
            format!("{} {} ({})", marker, m.name, date)
        })
        .collect();
    (lines, bar.milestones.len().saturating_sub(TOOLTIP_MILESTONES))
}

fn drag_id(project_id: Uuid) -> Id {
    Id::new(("reorder-drag", project_id))
}

/// Render the timeline board (central panel).
pub fn show_board(
    layout: &TimelineLayout,
    capacity: Option<&CapacityUtilization>,
    directory: Directory<'_>,
    today: NaiveDate,
    selected: Option<Uuid>,
    ui: &mut Ui,
) -> BoardInteraction {
    let mut interaction = BoardInteraction::default();

    if layout.is_degenerate() {
        ui.centered_and_justified(|ui| {
            ui.label(egui::RichText::new("The visible window is empty").color(theme::TEXT_DIM));
        });
        return interaction;
    }

    let available = ui.available_size();
    let chart_width = (available.x - NAME_WIDTH).max(theme::MIN_CHART_WIDTH);
    let capacity_height = if capacity.is_some() {
        theme::CAPACITY_HEIGHT + ROW_PADDING * 4.0
    } else {
        0.0
    };
    let board_height =
        HEADER_HEIGHT + layout.bars.len() as f32 * ROW_PITCH + capacity_height + 20.0;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(NAME_WIDTH + chart_width, board_height.max(available.y)),
                Sense::click(),
            );
            let geo = Geometry {
                origin: response.rect.min,
                chart_left: response.rect.min.x + NAME_WIDTH,
                chart_width,
            };
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, theme::BG_DARK);

            // Row backgrounds
            for bar in &layout.bars {
                let y = geo.row_top(bar.row);
                let row_rect = Rect::from_min_size(
                    Pos2::new(geo.origin.x, y),
                    Vec2::new(NAME_WIDTH + chart_width, ROW_PITCH),
                );
                let row_bg = if selected == Some(bar.project_id) {
                    theme::BG_SELECTED
                } else if bar.row % 2 == 0 {
                    theme::BG_PANEL
                } else {
                    theme::BG_DARK
                };
                painter.rect_filled(row_rect, 0.0, row_bg);
                painter.line_segment(
                    [
                        Pos2::new(geo.origin.x, y + ROW_PITCH),
                        Pos2::new(geo.chart_right(), y + ROW_PITCH),
                    ],
                    Stroke::new(0.5, theme::BORDER_SUBTLE),
                );
            }

            draw_quarter_header(&painter, &geo, layout, board_height);
            draw_today_line(&painter, &geo, layout, today, board_height);

            if layout.bars.is_empty() {
                painter.text(
                    Pos2::new(geo.chart_left + 12.0, geo.rows_top() + ROW_HEIGHT),
                    egui::Align2::LEFT_CENTER,
                    "No project has an enabled timeline",
                    theme::font_bar(),
                    theme::TEXT_DIM,
                );
            }

            for bar in &layout.bars {
                let is_selected = selected == Some(bar.project_id);
                draw_name(&painter, &geo, bar, is_selected);
                let bar_rect = draw_bar(&painter, &geo, bar, is_selected);
                draw_milestones(&painter, &geo, layout, bar);

                let row_rect = Rect::from_min_size(
                    Pos2::new(geo.origin.x, geo.row_top(bar.row)),
                    Vec2::new(NAME_WIDTH + chart_width, ROW_PITCH),
                );
                let row_response = ui.interact(
                    row_rect,
                    ui.make_persistent_id(("board-row", bar.project_id)),
                    Sense::click_and_drag(),
                );

                if row_response.clicked() {
                    interaction.selected = Some(bar.project_id);
                    consumed_click = true;
                }

                if row_response.drag_started() {
                    ui.ctx().data_mut(|data| {
                        data.insert_persisted(
                            drag_id(bar.project_id),
                            DragSnapshot {
                                project_id: bar.project_id,
                                from_row: bar.row,
                            },
                        );
                    });
                    consumed_click = true;
                }

                if row_response.dragged() {
                    ui.ctx().set_cursor_icon(egui::CursorIcon::Grabbing);
                    if let Some(ptr) = row_response.interact_pointer_pos() {
                        let target = drop_target(ptr.y, geo.rows_top(), layout.bars.len());
                        let line_y = if target > bar.row {
                            geo.row_top(target) + ROW_PITCH
                        } else {
                            geo.row_top(target)
                        };
                        if target != bar.row {
                            painter.line_segment(
                                [
                                    Pos2::new(geo.origin.x, line_y),
                                    Pos2::new(geo.chart_right(), line_y),
                                ],
                                Stroke::new(2.0, theme::DROP_INDICATOR),
                            );
                        }
                    }
                }

                if row_response.drag_stopped() {
                    let snapshot = ui.ctx().data_mut(|data| {
                        let snapshot = data.get_persisted::<DragSnapshot>(drag_id(bar.project_id));
                        data.remove::<DragSnapshot>(drag_id(bar.project_id));
                        snapshot
                    });
                    let pointer = row_response
                        .interact_pointer_pos()
                        .or_else(|| ui.ctx().pointer_latest_pos());
                    if let (Some(snapshot), Some(ptr)) = (snapshot, pointer) {
                        let target = drop_target(ptr.y, geo.rows_top(), layout.bars.len());
                        if target != snapshot.from_row {
                            tracing::debug!(project = %bar.name, from = snapshot.from_row, to = target, "row dropped");
                            interaction.reorder = Some((snapshot.project_id, target));
                        }
                    }
                }

                if row_response.hovered() && !row_response.dragged() {
                    if bar_rect.map_or(false, |r| r.contains(row_response.hover_pos().unwrap_or_default())) {
                        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
                    }
                    egui::show_tooltip_at_pointer(
                        ui.ctx(),
                        ui.layer_id(),
                        Id::new(("bar-tip", bar.project_id)),
                        |ui| bar_tooltip(ui, bar, layout, directory),
                    );
                }
            }

            draw_arrows(&painter, &geo, layout);

            if let Some(capacity) = capacity {
                draw_capacity(&painter, &geo, layout, capacity);
            }

            if response.clicked() && !consumed_click {
                interaction.cleared_selection = true;
            }
        });

    interaction
}

fn bar_tooltip(ui: &mut Ui, bar: &Bar, layout: &TimelineLayout, directory: Directory<'_>) {
    ui.strong(&bar.name);
    ui.label(format!(
        "{} → {}",
        bar.start.format("%d/%m/%Y"),
        bar.end.format("%d/%m/%Y"),
    ));
    ui.label(format!("Duration: {} weeks", bar.duration_weeks));
    ui.label(format!("Progress: {}%", bar.progress));
    if !bar.description.trim().is_empty() {
        ui.label(egui::RichText::new(&bar.description).color(theme::TEXT_SECONDARY));
    }
    if let Some(team) = directory.team_names(&bar.team) {
        ui.label(format!("Team: {}", team));
    }
    for dep in &bar.dependencies {
        let source = layout
            .bar_name(dep.project_id)
            .map(str::to_string)
            .unwrap_or_else(|| directory.project_name(dep.project_id));
        ui.label(dep.kind.describe(&source));
    }
    let (lines, more) = milestone_lines(bar);
    if !lines.is_empty() {
        ui.separator();
        for line in lines {
            ui.label(line);
        }
        if more > 0 {
            ui.label(egui::RichText::new(format!("+{} more", more)).color(theme::TEXT_DIM));
        }
    }
}

fn draw_quarter_header(painter: &egui::Painter, geo: &Geometry, layout: &TimelineLayout, height: f32) {
    let width = NAME_WIDTH + geo.chart_width;
    painter.rect_filled(
        Rect::from_min_size(geo.origin, Vec2::new(width, HEADER_HEIGHT)),
        0.0,
        theme::BG_HEADER,
    );
    painter.line_segment(
        [
            Pos2::new(geo.origin.x, geo.origin.y + HEADER_HEIGHT),
            Pos2::new(geo.origin.x + width, geo.origin.y + HEADER_HEIGHT),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    painter.line_segment(
        [
            Pos2::new(geo.chart_left, geo.origin.y),
            Pos2::new(geo.chart_left, geo.origin.y + height),
        ],
        Stroke::new(1.0, theme::BORDER_SUBTLE),
    );
    painter.text(
        Pos2::new(geo.origin.x + 10.0, geo.origin.y + HEADER_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        "Project",
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );

    let clipped = painter.with_clip_rect(Rect::from_min_max(
        Pos2::new(geo.chart_left, geo.origin.y),
        Pos2::new(geo.chart_right(), geo.origin.y + height),
    ));
    for (i, quarter) in layout.quarters.iter().enumerate() {
        let next_x = layout.quarters.get(i + 1).map(|q| q.x).unwrap_or(1.0);
        if next_x <= 0.0 || quarter.x >= 1.0 {
            continue;
        }
        let x = geo.x(quarter.x);
        clipped.line_segment(
            [
                Pos2::new(x, geo.origin.y + HEADER_HEIGHT),
                Pos2::new(x, geo.origin.y + height),
            ],
            Stroke::new(0.5, theme::GRID_LINE),
        );
        let label_x = x.max(geo.chart_left) + 5.0;
        clipped.text(
            Pos2::new(label_x, geo.origin.y + HEADER_HEIGHT / 2.0),
            egui::Align2::LEFT_CENTER,
            &quarter.label,
            theme::font_header(),
            theme::TEXT_PRIMARY,
        );
    }
}

fn draw_today_line(
    painter: &egui::Painter,
    geo: &Geometry,
    layout: &TimelineLayout,
    today: NaiveDate,
    height: f32,
) {
    if !layout.window.contains(today) {
        return;
    }
    let x = geo.x(layout.fraction(today));

    painter.line_segment(
        [
            Pos2::new(x, geo.origin.y + HEADER_HEIGHT),
            Pos2::new(x, geo.origin.y + height),
        ],
        Stroke::new(1.5, theme::TODAY_LINE),
    );

    // Top badge
    let badge_w = 42.0;
    let badge_rect = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, geo.origin.y + HEADER_HEIGHT - 1.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge_rect, Rounding::same(3.0), theme::TODAY_LINE);
    painter.text(
        badge_rect.center(),
        egui::Align2::CENTER_CENTER,
        "Today",
        theme::font_small(),
        Color32::WHITE,
    );
}

fn draw_name(painter: &egui::Painter, geo: &Geometry, bar: &Bar, is_selected: bool) {
    let cell = Rect::from_min_size(
        Pos2::new(geo.origin.x + 6.0, geo.row_top(bar.row)),
        Vec2::new(NAME_WIDTH - 12.0, ROW_PITCH),
    );
    painter.circle_filled(
        Pos2::new(cell.left() + 4.0, cell.center().y),
        3.5,
        theme::to_color32(bar.fill),
    );
    let color = if is_selected { Color32::WHITE } else { theme::TEXT_PRIMARY };
    painter.with_clip_rect(cell).text(
        Pos2::new(cell.left() + 14.0, cell.center().y),
        egui::Align2::LEFT_CENTER,
        &bar.name,
        theme::font_bar(),
        color,
    );
}

/// Paints the bar clipped to the window. `None` when it lies entirely outside.
fn draw_bar(painter: &egui::Painter, geo: &Geometry, bar: &Bar, is_selected: bool) -> Option<Rect> {
    let visible_start = bar.start_x.max(0.0);
    let visible_end = bar.end_x().min(1.0);
    if visible_end <= visible_start {
        return None;
    }
    let x_start = geo.x(visible_start);
    let bar_width = (geo.x(visible_end) - x_start).max(4.0);
    let inset = theme::BAR_INSET;
    let y = geo.row_top(bar.row) + ROW_PADDING;

    let bar_rect = Rect::from_min_size(
        Pos2::new(x_start, y + inset),
        Vec2::new(bar_width, ROW_HEIGHT - inset * 2.0),
    );
    let rounding = Rounding::same(theme::BAR_ROUNDING);
    let fill = theme::to_color32(bar.fill);

    // Soft shadow
    painter.rect_filled(bar_rect.translate(Vec2::new(1.0, 2.0)), rounding, Color32::from_black_alpha(35));
    painter.rect_filled(bar_rect, rounding, fill);

    // Progress fill (darkened overlay), measured on the full bar
    if bar.progress > 0 {
        let progress_end = (bar.start_x + bar.width * bar.progress as f64 / 100.0).min(1.0);
        if progress_end > visible_start {
            let progress_rect = Rect::from_min_max(
                bar_rect.min,
                Pos2::new(geo.x(progress_end).min(bar_rect.right()), bar_rect.bottom()),
            );
            painter.rect_filled(progress_rect, rounding, theme::PROGRESS_OVERLAY);
        }
    }

    if is_selected {
        painter.rect_stroke(
            bar_rect.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::BORDER_ACCENT),
        );
    }

    if bar_width > 30.0 {
        let text_color = if bar.fill.luminance() > 0.6 { Color32::from_rgb(33, 33, 33) } else { theme::TEXT_ON_BAR };
        let galley = painter.layout_no_wrap(format!("{}%", bar.progress), theme::font_small(), text_color);
        let clipped = painter.with_clip_rect(bar_rect);
        let text_y = bar_rect.top() + (bar_rect.height() - galley.size().y) / 2.0;
        clipped.galley(Pos2::new(bar_rect.left() + 6.0, text_y), galley, Color32::TRANSPARENT);
    }

    Some(bar_rect)
}

fn draw_milestones(painter: &egui::Painter, geo: &Geometry, layout: &TimelineLayout, bar: &Bar) {
    let top = geo.row_top(bar.row) + ROW_PADDING;
    for (milestone, date) in bar.visible_milestones() {
        let fraction = layout.fraction(date);
        if !(0.0..=1.0).contains(&fraction) {
            continue;
        }
        let x = geo.x(fraction);
        let color = if milestone.completed {
            theme::MILESTONE_DONE
        } else {
            theme::MILESTONE_OPEN
        };
        painter.add(Shape::convex_polygon(
            vec![
                Pos2::new(x - 5.0, top),
                Pos2::new(x + 5.0, top),
                Pos2::new(x, top + 8.0),
            ],
            color,
            Stroke::new(1.0, theme::BG_DARK),
        ));
    }
}

fn draw_arrows(painter: &egui::Painter, geo: &Geometry, layout: &TimelineLayout) {
    let stroke = Stroke::new(1.2, theme::ARROW);
    let clipped = painter.with_clip_rect(Rect::from_min_max(
        Pos2::new(geo.chart_left, geo.rows_top()),
        Pos2::new(geo.chart_right(), geo.rows_top() + layout.bars.len() as f32 * ROW_PITCH),
    ));
    for arrow in &layout.arrows {
        let fx = geo.x(arrow.from_x);
        let tx = geo.x(arrow.to_x);
        let ex = geo.x(arrow.elbow_x());
        let fy = geo.row_mid(arrow.from_row);
        let ty = geo.row_mid(arrow.to_row);

        clipped.add(Shape::line(
            vec![
                Pos2::new(fx, fy),
                Pos2::new(ex, fy),
                Pos2::new(ex, ty),
                Pos2::new(tx, ty),
            ],
            stroke,
        ));
        let dir = if tx >= ex { 1.0 } else { -1.0 };
        clipped.add(Shape::convex_polygon(
            vec![
                Pos2::new(tx, ty),
                Pos2::new(tx - 6.0 * dir, ty - 4.0),
                Pos2::new(tx - 6.0 * dir, ty + 4.0),
            ],
            theme::ARROW,
            Stroke::NONE,
        ));
    }
}

fn draw_capacity(
    painter: &egui::Painter,
    geo: &Geometry,
    layout: &TimelineLayout,
    capacity: &CapacityUtilization,
) {
    let top = geo.rows_top() + layout.bars.len() as f32 * ROW_PITCH + ROW_PADDING * 2.0;
    painter.text(
        Pos2::new(geo.origin.x + 10.0, top + theme::CAPACITY_HEIGHT / 2.0),
        egui::Align2::LEFT_CENTER,
        "Capacity",
        theme::font_header(),
        theme::TEXT_SECONDARY,
    );
    for segment in capacity_segments(&layout.quarters, capacity) {
        let Some((x, width)) = segment.clipped() else {
            continue;
        };
        let rect = Rect::from_min_max(
            Pos2::new(geo.x(x), top),
            Pos2::new(geo.x(x + width), top + theme::CAPACITY_HEIGHT),
        );
        painter.rect_filled(rect.shrink2(Vec2::new(0.5, 0.0)), Rounding::same(2.0), theme::to_color32(segment.color));
        if segment.percentage > 0 && rect.width() > 28.0 {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                format!("{}%", segment.percentage),
                theme::font_sub(),
                theme::to_color32(segment.label_color()),
            );
        }
    }
}
