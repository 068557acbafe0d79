use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;

use chrono::{Days, Months, NaiveDate};
use gantt_timeline::config::AppConfig;
use gantt_timeline::io::{csv_export, csv_import, png_export};
use gantt_timeline::model::{Task, TaskId, ViewState};
use gantt_timeline::GanttChart;
use tracing::{info, warn};

use crate::ui;
use crate::ui::dialogs::TaskEditForm;
use crate::ui::gantt_chart::ChartAction;
use crate::ui::theme::ChartTheme;

/// A chart image export waiting for its screenshot.
struct PngExport {
    path: PathBuf,
    requested: bool,
}

/// Crop a screenshot to `rect` (in points) and flatten it to RGBA8 bytes.
///
/// The rect is clamped to the screenshot; an empty overlap yields no pixels.
fn crop_to_rgba(
    image: &egui::ColorImage,
    rect: egui::Rect,
    pixels_per_point: f32,
) -> (u32, u32, Vec<u8>) {
    let bounds = egui::Rect::from_min_size(
        egui::Pos2::ZERO,
        egui::vec2(image.width() as f32, image.height() as f32) / pixels_per_point,
    );
    let rect = rect.intersect(bounds);
    if !rect.is_positive() {
        return (0, 0, Vec::new());
    }

    let region = image.region(&rect, Some(pixels_per_point));
    let rgba = region.pixels.iter().flat_map(|pixel| pixel.to_array()).collect();
    (region.width() as u32, region.height() as u32, rgba)
}

pub struct GanttApp {
    pub chart: GanttChart,
    pub config: AppConfig,
    pub config_path: PathBuf,
    pub chart_theme: ChartTheme,
    pub selected_task: Option<TaskId>,
    pub edit_form: Option<TaskEditForm>,
    pub show_about: bool,
    pub show_csv_help: bool,
    pub status_message: String,
    /// Screen area of the chart panel, in points, from the last frame.
    chart_rect: egui::Rect,
    pending_png: Option<PngExport>,
    view_events: Receiver<ViewState>,
    task_events: Receiver<Task>,
}

impl GanttApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig, config_path: PathBuf) -> Self {
        // Register Phosphor icon font as a fallback so icons render inline with text
        let mut fonts = egui::FontDefinitions::default();
        egui_phosphor::add_to_fonts(&mut fonts, egui_phosphor::Variant::Regular);
        cc.egui_ctx.set_fonts(fonts);

        let mut chart = GanttChart::new();
        let (view_tx, view_events) = mpsc::channel();
        chart.on_view_change(move |state| {
            let _ = view_tx.send(state.clone());
        });
        let (task_tx, task_events) = mpsc::channel();
        chart.on_task_update(move |task| {
            let _ = task_tx.send(task.clone());
        });

        let chart_theme = ChartTheme::from_colors(&config.colors);
        let mut app = Self {
            chart,
            config,
            config_path,
            chart_theme,
            selected_task: None,
            edit_form: None,
            show_about: false,
            show_csv_help: false,
            status_message: "Ready".to_string(),
            chart_rect: egui::Rect::NOTHING,
            pending_png: None,
            view_events,
            task_events,
        };
        app.load_sample();
        app
    }

    /// Two sample projects relative to today; the second starts collapsed.
    fn sample_tasks(today: NaiveDate) -> Vec<Task> {
        let days = |n: u64| today.checked_add_days(Days::new(n)).unwrap_or(today);
        let weeks = |n: u64| days(n * 7);
        let months = |n: u32| today.checked_add_months(Months::new(n)).unwrap_or(today);

        vec![
            Task::new("Project Alpha", today, months(6))
                .with_progress(30)
                .with_color("#3b82f6")
                .with_children(vec![
                    Task::new("Planning Phase", today, weeks(2))
                        .with_progress(100)
                        .with_color("#60a5fa")
                        .with_children(vec![
                            Task::new("Requirements Gathering", today, days(5)).with_progress(100),
                            Task::new("Stakeholder Approval", days(6), weeks(2)).with_progress(100),
                        ]),
                    Task::new("Design Phase", weeks(2), weeks(5))
                        .with_progress(60)
                        .with_color("#93c5fd")
                        .with_children(vec![
                            Task::new("UI/UX Design", weeks(2), weeks(4)).with_progress(80),
                            Task::new("Architecture Design", weeks(3), weeks(5)).with_progress(40),
                        ]),
                    Task::new("Development Phase", weeks(5), months(4))
                        .with_progress(20)
                        .with_color("#2563eb")
                        .with_children(vec![
                            Task::new("Frontend Development", weeks(5), months(3)).with_progress(30),
                            Task::new("Backend Development", weeks(6), months(3)).with_progress(20),
                            Task::new("API Integration", months(3), months(4)),
                        ]),
                    Task::new("Testing Phase", months(4), months(5)).with_color("#1d4ed8"),
                    Task::new("Deployment", months(5), months(6)).with_color("#1e40af"),
                    Task::new_milestone("Go Live", months(6)).with_color("#ef4444"),
                ]),
            Task::new("Project Beta", months(2), months(8))
                .with_color("#10b981")
                .collapsed(true)
                .with_children(vec![
                    Task::new("Planning", months(2), months(3)),
                    Task::new("Implementation", months(3), months(7)),
                    Task::new("Review", months(7), months(8)),
                ]),
        ]
    }

    fn replace_tasks(&mut self, tasks: Vec<Task>) {
        let options = self.config.view_options();
        self.chart.load(tasks, &options);
        self.selected_task = None;
        self.edit_form = None;
    }

    pub fn load_sample(&mut self) {
        let tasks = Self::sample_tasks(self.chart.today());
        self.replace_tasks(tasks);
        self.status_message = "Sample project loaded".to_string();
    }

    pub fn clear(&mut self) {
        self.replace_tasks(Vec::new());
        self.status_message = "Chart cleared".to_string();
    }

    pub fn add_task(&mut self) {
        let today = self.chart.today();
        let end = today.checked_add_months(Months::new(1)).unwrap_or(today);
        let task = Task::new("New Task", today, end).with_color("#3b82f6");
        let id = task.id.clone();
        self.chart.add_task(task);
        self.selected_task = Some(id.clone());
        self.open_edit(&id);
        self.status_message = "Task added".to_string();
    }

    pub fn import_csv(&mut self) {
        // Guard: if the chart has tasks, confirm before replacing
        if self.chart.total_task_count() > 0 {
            let confirm = rfd::MessageDialog::new()
                .set_title("Import CSV")
                .set_description("This will replace the current tasks. Continue?")
                .set_buttons(rfd::MessageButtons::YesNo)
                .show();
            if confirm != rfd::MessageDialogResult::Yes {
                return;
            }
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv", "txt"])
            .pick_file()
        else {
            return;
        };

        match csv_import::import_csv(&path) {
            Ok((tasks, skipped)) => {
                self.replace_tasks(tasks);
                let count = self.chart.total_task_count();
                self.status_message = if skipped > 0 {
                    format!("Imported {} tasks ({} rows skipped)", count, skipped)
                } else {
                    format!("Imported {} tasks", count)
                };
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "CSV import failed");
                self.status_message = format!("CSV import failed: {}", e);
            }
        }
    }

    pub fn export_csv(&mut self) {
        if self.chart.total_task_count() == 0 {
            self.status_message = "Nothing to export, the chart has no tasks".to_string();
            return;
        }

        let Some(path) = rfd::FileDialog::new()
            .add_filter("CSV Files", &["csv"])
            .set_file_name("timeline.csv")
            .save_file()
        else {
            return;
        };

        match csv_export::export_csv(self.chart.tasks(), &path) {
            Ok(count) => self.status_message = format!("Exported {} tasks to CSV", count),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "CSV export failed");
                self.status_message = format!("CSV export failed: {}", e);
            }
        }
    }

    /// Ask for a target file, then capture the chart on the next frame.
    pub fn export_png(&mut self, ctx: &egui::Context) {
        if self.pending_png.is_some() {
            return;
        }
        let Some(path) = rfd::FileDialog::new()
            .add_filter("PNG Image", &["png"])
            .set_file_name("gantt-chart.png")
            .save_file()
        else {
            return;
        };
        self.pending_png = Some(PngExport {
            path: png_export::ensure_png_extension(path),
            requested: false,
        });
        self.status_message = "Capturing chart...".to_string();
        ctx.request_repaint();
    }

    /// Request the screenshot for a pending export, or save one that arrived.
    ///
    /// Failures only reach the status bar; tasks and view are never touched.
    fn handle_png_export(&mut self, ctx: &egui::Context) {
        let Some(pending) = self.pending_png.as_mut() else {
            return;
        };
        if !pending.requested {
            pending.requested = true;
            ctx.send_viewport_cmd(egui::ViewportCommand::Screenshot);
            ctx.request_repaint();
            return;
        }

        let screenshot = ctx.input(|i| {
            i.raw.events.iter().find_map(|event| match event {
                egui::Event::Screenshot { image, .. } => Some(Arc::clone(image)),
                _ => None,
            })
        });
        let Some(screenshot) = screenshot else {
            return;
        };
        let Some(pending) = self.pending_png.take() else {
            return;
        };

        let (width, height, rgba) = crop_to_rgba(&screenshot, self.chart_rect, ctx.pixels_per_point());
        match png_export::write_png(&pending.path, width, height, &rgba) {
            Ok(()) => {
                self.status_message = format!("Exported chart image to {}", pending.path.display());
            }
            Err(e) => {
                warn!(path = %pending.path.display(), error = %e, "PNG export failed");
                self.status_message = format!("PNG export failed: {}", e);
            }
        }
    }

    pub fn open_config_folder(&mut self) {
        let Some(dir) = self.config_path.parent() else {
            return;
        };
        if let Err(e) = open::that(dir) {
            self.status_message = format!("Could not open {}: {}", dir.display(), e);
        }
    }

    pub fn open_edit(&mut self, id: &TaskId) {
        if let Some(task) = self.chart.find_task(id) {
            self.edit_form = Some(TaskEditForm::from_task(task, self.chart_theme.primary));
        }
    }

    pub fn apply_edit(&mut self) {
        let Some(form) = self.edit_form.take() else {
            return;
        };
        if !self.chart.update_task(&form.id, &form.to_patch()) {
            self.status_message = "Task no longer exists".to_string();
        }
    }

    fn handle_chart_action(&mut self, action: ChartAction) {
        match action {
            ChartAction::None => {}
            ChartAction::Select(id) => self.selected_task = Some(id),
            ChartAction::ClearSelection => self.selected_task = None,
            ChartAction::Edit(id) => {
                self.selected_task = Some(id.clone());
                self.open_edit(&id);
            }
            ChartAction::ToggleCollapse(id) => {
                self.chart.toggle_collapse(&id);
            }
        }
    }

    /// Drain observer notifications queued since the last frame.
    fn drain_events(&mut self) {
        for state in self.view_events.try_iter() {
            info!(
                granularity = %state.granularity,
                range = %state.visible_range,
                "view changed"
            );
            self.status_message = format!("{} view · {}", state.granularity, state.visible_range);
        }
        for task in self.task_events.try_iter() {
            info!(task_id = %task.id, name = %task.name, "task updated");
            self.status_message = format!(
                "Updated '{}' ({} → {}, {}%)",
                task.name,
                task.start.format("%Y-%m-%d"),
                task.end.format("%Y-%m-%d"),
                task.progress
            );
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if self.edit_form.is_some() {
            return;
        }
        let (zoom_in, zoom_out) = ctx.input(|i| {
            (
                i.modifiers.command && (i.key_pressed(egui::Key::Plus) || i.key_pressed(egui::Key::Equals)),
                i.modifiers.command && i.key_pressed(egui::Key::Minus),
            )
        });
        if zoom_in {
            self.chart.zoom_in();
        }
        if zoom_out {
            self.chart.zoom_out();
        }
    }
}

impl eframe::App for GanttApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ui::theme::apply_theme(ctx, &self.chart_theme);
        self.handle_png_export(ctx);
        self.handle_shortcuts(ctx);

        // Top panel: menu bar and chart header
        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            ui::toolbar::show_menu_bar(self, ui);
            ui.add_space(4.0);
            ui::toolbar::show_chart_header(self, ui);
            ui.add_space(4.0);
        });

        // Bottom panel: status bar
        egui::TopBottomPanel::bottom("status_bar")
            .exact_height(24.0)
            .frame(
                egui::Frame::default()
                    .fill(ui::theme::BG_HEADER)
                    .inner_margin(egui::Margin::symmetric(10.0, 0.0)),
            )
            .show(ctx, |ui| {
                ui.horizontal_centered(|ui| {
                    ui.label(
                        egui::RichText::new(&self.status_message)
                            .size(11.0)
                            .color(ui::theme::TEXT_SECONDARY),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        ui.label(
                            egui::RichText::new(format!(
                                "Visible: {} / {}",
                                self.chart.visible_task_count(),
                                self.chart.total_task_count()
                            ))
                            .size(10.5)
                            .color(ui::theme::TEXT_SECONDARY),
                        );
                    });
                });
            });

        // Central panel: Gantt chart
        let chart_frame = egui::Frame::default()
            .fill(self.chart_theme.background)
            .inner_margin(egui::Margin::ZERO);
        let panel = egui::CentralPanel::default()
            .frame(chart_frame)
            .show(ctx, |ui| {
                ui::gantt_chart::show_gantt_chart(
                    &self.chart,
                    self.selected_task.as_ref(),
                    &self.chart_theme,
                    ui,
                )
            });
        self.chart_rect = panel.response.rect;
        self.handle_chart_action(panel.inner);

        if self.edit_form.is_some() {
            ui::dialogs::show_edit_dialog(self, ctx);
        }
        if self.show_about {
            ui::dialogs::show_about_dialog(self, ctx);
        }
        if self.show_csv_help {
            ui::dialogs::show_csv_help_dialog(self, ctx);
        }

        self.drain_events();
    }
}
