use egui::{Align2, Color32, Painter, Pos2, Rect, Rounding, Sense, Stroke, Ui, Vec2};
use egui_phosphor::regular as icons;
use gantt_timeline::model::layout::{date_position, task_layout};
use gantt_timeline::model::tree::Row;
use gantt_timeline::model::{DateRange, Task, TaskId, TimeUnit, TimelinePlacement};
use gantt_timeline::GanttChart;

use crate::ui::theme::{self, ChartTheme};

const ROW_HEIGHT: f32 = theme::ROW_HEIGHT;
const TIMELINE_HEIGHT: f32 = theme::TIMELINE_HEIGHT;
const NAME_WIDTH: f32 = theme::NAME_COLUMN_WIDTH;

/// What the user did in the chart this frame.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ChartAction {
    #[default]
    None,
    Select(TaskId),
    ClearSelection,
    Edit(TaskId),
    ToggleCollapse(TaskId),
}

/// Pixel geometry of one frame of the chart.
struct Geometry {
    origin: Pos2,
    timeline_left: f32,
    timeline_width: f32,
    rows_top: f32,
    strip_top: f32,
    range: DateRange,
}

impl Geometry {
    fn x_at(&self, percent: f64) -> f32 {
        self.timeline_left + (percent as f32 / 100.0) * self.timeline_width
    }

    fn row_top(&self, index: usize) -> f32 {
        self.rows_top + index as f32 * ROW_HEIGHT
    }

    fn right(&self) -> f32 {
        self.timeline_left + self.timeline_width
    }
}

/// Render the whole chart: name column, bars, time-unit strip and marker.
pub fn show_gantt_chart(
    chart: &GanttChart,
    selected: Option<&TaskId>,
    colors: &ChartTheme,
    ui: &mut Ui,
) -> ChartAction {
    let mut action = ChartAction::None;
    let view = chart.view();
    let rows: Vec<Row<'_>> = chart.rows().collect();
    let units = chart.time_units();

    let available = ui.available_size();
    let timeline_width =
        (available.x - NAME_WIDTH).max(units.len() as f32 * theme::MIN_UNIT_WIDTH);
    let rows_height = rows.len() as f32 * ROW_HEIGHT;
    let content_height = rows_height + TIMELINE_HEIGHT;

    egui::ScrollArea::both()
        .auto_shrink([false, false])
        .show(ui, |ui| {
            let (response, painter) = ui.allocate_painter(
                Vec2::new(NAME_WIDTH + timeline_width, content_height.max(available.y)),
                Sense::click(),
            );
            let origin = response.rect.min;
            let (rows_top, strip_top) = match view.timeline_placement {
                TimelinePlacement::Top => (origin.y + TIMELINE_HEIGHT, origin.y),
                TimelinePlacement::Bottom => (origin.y, origin.y + rows_height),
            };
            let frame = Geometry {
                origin,
                timeline_left: origin.x + NAME_WIDTH,
                timeline_width,
                rows_top,
                strip_top,
                range: view.visible_range,
            };
            let mut consumed_click = false;

            painter.rect_filled(response.rect, 0.0, colors.background);

            draw_rows_background(&painter, &frame, &rows, selected, colors);
            draw_grid(&painter, &frame, &units, rows_height, colors);
            draw_time_strip(&painter, &frame, &units, colors);

            for (index, row) in rows.iter().enumerate() {
                let task = row.task;
                let row_action = show_name_cell(ui, &painter, &frame, index, row, colors);
                let bar_action = show_bar(ui, &painter, &frame, index, task, selected, colors);
                for candidate in [row_action, bar_action] {
                    if candidate != ChartAction::None {
                        consumed_click = true;
                        action = candidate;
                    }
                }
            }

            if rows.is_empty() {
                painter.text(
                    Pos2::new(frame.timeline_left + timeline_width / 2.0, rows_top + 40.0),
                    Align2::CENTER_CENTER,
                    "No tasks. Use File → Import CSV or Load Sample.",
                    theme::font_row(),
                    theme::TEXT_SECONDARY,
                );
            }

            if let Some(percent) = view.marker_position() {
                draw_current_marker(&painter, &frame, percent, rows_height, colors);
            }

            // Name column divider
            painter.line_segment(
                [
                    Pos2::new(frame.timeline_left, origin.y),
                    Pos2::new(frame.timeline_left, origin.y + content_height),
                ],
                Stroke::new(1.0, colors.grid),
            );

            if response.clicked() && !consumed_click && selected.is_some() {
                action = ChartAction::ClearSelection;
            }
        });

    action
}

fn draw_rows_background(
    painter: &Painter,
    frame: &Geometry,
    rows: &[Row<'_>],
    selected: Option<&TaskId>,
    colors: &ChartTheme,
) {
    for (index, row) in rows.iter().enumerate() {
        let top = frame.row_top(index);
        let rect = Rect::from_min_max(
            Pos2::new(frame.origin.x, top),
            Pos2::new(frame.right(), top + ROW_HEIGHT),
        );
        let is_selected = selected.is_some_and(|id| row.task.id == *id);
        let fill = if is_selected {
            theme::BG_SELECTED
        } else if index % 2 == 1 {
            theme::BG_ROW_ODD
        } else {
            colors.background
        };
        painter.rect_filled(rect, 0.0, fill);
        painter.line_segment(
            [rect.left_bottom(), rect.right_bottom()],
            Stroke::new(0.5, colors.grid),
        );
    }
}

/// Left and right edge of a unit, as clipped percentages of the range.
fn unit_span(unit: &TimeUnit, range: DateRange) -> (f64, f64) {
    let after = unit.end.succ_opt().unwrap_or(unit.end);
    (
        date_position(unit.start, range).clamp(0.0, 100.0),
        date_position(after, range).clamp(0.0, 100.0),
    )
}

fn draw_grid(
    painter: &Painter,
    frame: &Geometry,
    units: &[TimeUnit],
    rows_height: f32,
    colors: &ChartTheme,
) {
    for unit in units {
        let (left, _) = unit_span(unit, frame.range);
        if left <= 0.0 {
            continue;
        }
        let x = frame.x_at(left);
        painter.line_segment(
            [
                Pos2::new(x, frame.rows_top),
                Pos2::new(x, frame.rows_top + rows_height),
            ],
            Stroke::new(0.5, colors.grid),
        );
    }
}

fn draw_time_strip(painter: &Painter, frame: &Geometry, units: &[TimeUnit], colors: &ChartTheme) {
    let strip = Rect::from_min_size(
        Pos2::new(frame.origin.x, frame.strip_top),
        Vec2::new(NAME_WIDTH + frame.timeline_width, TIMELINE_HEIGHT),
    );
    painter.rect_filled(strip, 0.0, theme::BG_HEADER);
    painter.line_segment([strip.left_top(), strip.right_top()], Stroke::new(1.0, colors.grid));
    painter.line_segment(
        [strip.left_bottom(), strip.right_bottom()],
        Stroke::new(1.0, colors.grid),
    );

    painter.text(
        Pos2::new(frame.origin.x + theme::INDENT_BASE, strip.center().y),
        Align2::LEFT_CENTER,
        "Task",
        theme::font_header(),
        colors.text,
    );

    for unit in units {
        let (left, right) = unit_span(unit, frame.range);
        if right <= left {
            continue;
        }
        let cell = Rect::from_min_max(
            Pos2::new(frame.x_at(left), strip.top()),
            Pos2::new(frame.x_at(right), strip.bottom()),
        );
        painter.line_segment(
            [cell.left_top(), cell.left_bottom()],
            Stroke::new(1.0, colors.grid),
        );
        painter.with_clip_rect(cell).text(
            cell.center(),
            Align2::CENTER_CENTER,
            &unit.label,
            theme::font_header(),
            colors.text,
        );
    }
}

fn show_name_cell(
    ui: &Ui,
    painter: &Painter,
    frame: &Geometry,
    index: usize,
    row: &Row<'_>,
    colors: &ChartTheme,
) -> ChartAction {
    let task = row.task;
    let top = frame.row_top(index);
    let cell = Rect::from_min_size(
        Pos2::new(frame.origin.x, top),
        Vec2::new(NAME_WIDTH, ROW_HEIGHT),
    );
    let indent = row.depth as f32 * theme::INDENT_PER_LEVEL + theme::INDENT_BASE;
    let mut text_x = cell.left() + indent;
    let mut action = ChartAction::None;

    if !task.is_leaf() {
        let chevron = Rect::from_min_size(
            Pos2::new(text_x, cell.center().y - 9.0),
            Vec2::splat(18.0),
        );
        let glyph = if task.collapsed {
            icons::CARET_RIGHT
        } else {
            icons::CARET_DOWN
        };
        let response = ui.interact(
            chevron,
            ui.make_persistent_id(("collapse", &task.id)),
            Sense::click(),
        );
        if response.hovered() {
            painter.rect_filled(chevron, Rounding::same(3.0), theme::BORDER_SUBTLE);
        }
        painter.text(
            chevron.center(),
            Align2::CENTER_CENTER,
            glyph,
            theme::font_row(),
            colors.text,
        );
        if response.clicked() {
            action = ChartAction::ToggleCollapse(task.id.clone());
        }
        text_x += 20.0;
    } else {
        text_x += 4.0;
    }

    let label_rect = Rect::from_min_max(Pos2::new(text_x, cell.top()), cell.right_bottom());
    painter.with_clip_rect(label_rect.shrink2(Vec2::new(0.0, 1.0))).text(
        Pos2::new(text_x, cell.center().y),
        Align2::LEFT_CENTER,
        &task.name,
        theme::font_row(),
        colors.text,
    );

    if action == ChartAction::None {
        let response = ui.interact(
            label_rect,
            ui.make_persistent_id(("task-name", &task.id)),
            Sense::click(),
        );
        if response.double_clicked() {
            action = ChartAction::Edit(task.id.clone());
        } else if response.clicked() {
            action = ChartAction::Select(task.id.clone());
        }
    }
    action
}

fn show_bar(
    ui: &Ui,
    painter: &Painter,
    frame: &Geometry,
    index: usize,
    task: &Task,
    selected: Option<&TaskId>,
    colors: &ChartTheme,
) -> ChartAction {
    let top = frame.row_top(index);
    let is_selected = selected == Some(&task.id);

    let rect = if task.is_milestone() {
        if !frame.range.contains(task.start) {
            return ChartAction::None;
        }
        let x = frame.x_at(date_position(task.start, frame.range));
        draw_milestone(painter, Pos2::new(x, top + ROW_HEIGHT / 2.0), is_selected, colors)
    } else {
        let layout = task_layout(task, frame.range);
        if !layout.is_visible() {
            return ChartAction::None;
        }
        let bar = Rect::from_min_max(
            Pos2::new(frame.x_at(layout.left_percent), top + theme::BAR_INSET),
            Pos2::new(
                frame.x_at(layout.right_percent()).max(frame.x_at(layout.left_percent) + 2.0),
                top + ROW_HEIGHT - theme::BAR_INSET,
            ),
        );
        let fill_right =
            frame.x_at(layout.left_percent + layout.progress_width_percent(task.progress));
        draw_task_bar(painter, bar, fill_right, task, is_selected, colors);
        if layout.width_percent > theme::PROGRESS_LABEL_MIN_PERCENT {
            painter.with_clip_rect(bar).text(
                Pos2::new(bar.left() + 6.0, bar.center().y),
                Align2::LEFT_CENTER,
                format!("{}%", task.progress),
                theme::font_bar(),
                theme::TEXT_ON_BAR,
            );
        }
        bar
    };

    let response = ui.interact(
        rect.expand(2.0),
        ui.make_persistent_id(("task-bar", &task.id)),
        Sense::click(),
    );
    if response.hovered() {
        ui.ctx().set_cursor_icon(egui::CursorIcon::PointingHand);
        egui::show_tooltip_at_pointer(
            ui.ctx(),
            ui.layer_id(),
            egui::Id::new(("task-tip", &task.id)),
            |ui| {
                ui.strong(&task.name);
                if task.is_milestone() {
                    ui.label(task.start.format("%Y-%m-%d").to_string());
                } else {
                    ui.label(format!(
                        "{} → {}",
                        task.start.format("%Y-%m-%d"),
                        task.end.format("%Y-%m-%d"),
                    ));
                }
                ui.label(format!("Progress: {}%", task.progress));
            },
        );
    }

    if response.double_clicked() {
        ChartAction::Edit(task.id.clone())
    } else if response.clicked() {
        ChartAction::Select(task.id.clone())
    } else {
        ChartAction::None
    }
}

/// `fill_right` is the x where the progress fill ends.
fn draw_task_bar(
    painter: &Painter,
    bar: Rect,
    fill_right: f32,
    task: &Task,
    is_selected: bool,
    colors: &ChartTheme,
) {
    let rounding = Rounding::same(theme::BAR_ROUNDING);

    painter.rect_filled(
        bar.translate(Vec2::new(0.0, 1.0)),
        rounding,
        Color32::from_black_alpha(20),
    );
    painter.rect_filled(bar, rounding, colors.bar_color(task.color.as_deref()));

    let fill_right = fill_right.min(bar.right());
    if fill_right > bar.left() {
        let filled = Rect::from_min_max(bar.min, Pos2::new(fill_right, bar.bottom()));
        painter.rect_filled(filled, rounding, colors.progress.gamma_multiply(theme::BAR_OPACITY));
    }

    if is_selected {
        painter.rect_stroke(
            bar.expand(1.5),
            Rounding::same(theme::BAR_ROUNDING + 1.5),
            Stroke::new(2.0, theme::ACCENT),
        );
    }
}

fn draw_milestone(painter: &Painter, center: Pos2, is_selected: bool, colors: &ChartTheme) -> Rect {
    let size = (ROW_HEIGHT / 2.0 - theme::BAR_INSET).max(6.0);
    let points = vec![
        Pos2::new(center.x, center.y - size),
        Pos2::new(center.x + size, center.y),
        Pos2::new(center.x, center.y + size),
        Pos2::new(center.x - size, center.y),
    ];
    let stroke = if is_selected {
        Stroke::new(2.0, theme::ACCENT)
    } else {
        Stroke::NONE
    };
    painter.add(egui::Shape::convex_polygon(points, colors.milestone, stroke));

    Rect::from_center_size(center, Vec2::splat(size * 2.0))
}

fn draw_current_marker(
    painter: &Painter,
    frame: &Geometry,
    percent: f64,
    rows_height: f32,
    colors: &ChartTheme,
) {
    let x = frame.x_at(percent);
    painter.line_segment(
        [
            Pos2::new(x, frame.rows_top),
            Pos2::new(x, frame.rows_top + rows_height),
        ],
        Stroke::new(1.5, colors.current_date_line),
    );

    let badge_w = 42.0;
    let badge = Rect::from_min_size(
        Pos2::new(x - badge_w / 2.0, frame.strip_top + TIMELINE_HEIGHT - 15.0),
        Vec2::new(badge_w, 14.0),
    );
    painter.rect_filled(badge, Rounding::same(3.0), colors.current_date_line);
    painter.text(
        badge.center(),
        Align2::CENTER_CENTER,
        "Today",
        theme::font_bar(),
        Color32::WHITE,
    );
}
