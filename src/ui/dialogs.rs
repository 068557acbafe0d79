use chrono::NaiveDate;
use egui::{Color32, Context, RichText, Window};
use egui_phosphor::regular as icons;
use gantt_timeline::model::{Task, TaskId, TaskPatch};

use crate::app::GanttApp;
use crate::ui::theme;

/// Working copy of the fields shown in the edit modal.
#[derive(Debug, Clone)]
pub struct TaskEditForm {
    pub id: TaskId,
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub progress: u8,
    /// `None` while a task without its own color keeps the chart default.
    pub color: Option<Color32>,
    original_color: Option<Color32>,
    default_color: Color32,
}

impl TaskEditForm {
    pub fn from_task(task: &Task, default_color: Color32) -> Self {
        let color = task
            .color
            .as_deref()
            .and_then(|hex| theme::parse_hex_color(hex).ok());
        Self {
            id: task.id.clone(),
            name: task.name.clone(),
            start: task.start,
            end: task.end,
            progress: task.progress,
            color,
            original_color: color,
            default_color,
        }
    }

    /// The color the bar is drawn with.
    pub fn shown_color(&self) -> Color32 {
        self.color.unwrap_or(self.default_color)
    }

    pub fn problem(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("Task name is required.")
        } else if self.end < self.start {
            Some("End date is before start date.")
        } else {
            None
        }
    }

    /// Color is only patched when it was changed in the dialog.
    pub fn to_patch(&self) -> TaskPatch {
        let patch = TaskPatch::new()
            .name(self.name.trim())
            .start(self.start)
            .end(self.end)
            .progress(self.progress);
        if self.color == self.original_color {
            patch
        } else {
            patch.color(self.color.map(theme::to_hex))
        }
    }
}

enum EditOutcome {
    Open,
    Save,
    Cancel,
}

/// Render the "Edit Task" modal.
pub fn show_edit_dialog(app: &mut GanttApp, ctx: &Context) {
    let Some(form) = app.edit_form.as_mut() else {
        return;
    };
    let mut outcome = EditOutcome::Open;

    Window::new(RichText::new("Edit Task").strong().size(14.0))
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([360.0, 0.0])
        .show(ctx, |ui| {
            ui.add_space(4.0);

            egui::Grid::new("edit_task_grid")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label(RichText::new("Task Name").color(theme::TEXT_SECONDARY));
                    ui.add_sized(
                        [220.0, 24.0],
                        egui::TextEdit::singleline(&mut form.name).hint_text("Task name..."),
                    );
                    ui.end_row();

                    ui.label(RichText::new("Start Date").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut form.start).id_salt("edit_dp_start"));
                    ui.end_row();

                    ui.label(RichText::new("End Date").color(theme::TEXT_SECONDARY));
                    ui.add(egui_extras::DatePickerButton::new(&mut form.end).id_salt("edit_dp_end"));
                    ui.end_row();

                    ui.label(RichText::new("Progress").color(theme::TEXT_SECONDARY));
                    ui.add(egui::Slider::new(&mut form.progress, 0..=100).suffix("%"));
                    ui.end_row();

                    ui.label(RichText::new("Color").color(theme::TEXT_SECONDARY));
                    ui.horizontal(|ui| {
                        let [r, g, b, _] = form.shown_color().to_array();
                        let mut rgb = [r, g, b];
                        if ui.color_edit_button_srgb(&mut rgb).changed() {
                            form.color = Some(Color32::from_rgb(rgb[0], rgb[1], rgb[2]));
                        }
                        ui.label(RichText::new(theme::to_hex(form.shown_color())).monospace());
                    });
                    ui.end_row();
                });

            let problem = form.problem();
            if let Some(problem) = problem {
                ui.add_space(4.0);
                ui.label(RichText::new(problem).color(Color32::from_rgb(220, 38, 38)).small());
            }

            ui.add_space(6.0);
            ui.separator();
            ui.add_space(4.0);

            ui.horizontal(|ui| {
                let save_btn = egui::Button::new(RichText::new("Save").color(Color32::WHITE))
                    .fill(theme::ACCENT)
                    .rounding(egui::Rounding::same(4.0));
                if ui
                    .add_enabled(problem.is_none(), save_btn.min_size(egui::vec2(80.0, 28.0)))
                    .clicked()
                {
                    outcome = EditOutcome::Save;
                }
                if ui
                    .add_sized([80.0, 28.0], egui::Button::new(format!("{} Cancel", icons::X)))
                    .clicked()
                {
                    outcome = EditOutcome::Cancel;
                }
            });
            ui.add_space(2.0);
        });

    if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        outcome = EditOutcome::Cancel;
    }

    match outcome {
        EditOutcome::Open => {}
        EditOutcome::Save => app.apply_edit(),
        EditOutcome::Cancel => app.edit_form = None,
    }
}

/// Render the "About" dialog.
pub fn show_about_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;
    Window::new("About")
        .resizable(false)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .fixed_size([300.0, 180.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(12.0);
                ui.heading(RichText::new("Gantt Timeline").strong());
                ui.add_space(2.0);
                ui.label(
                    RichText::new(format!("Version {}", env!("CARGO_PKG_VERSION")))
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(10.0);
                ui.label("A zoomable project timeline");
                ui.label("built with Rust and egui.");
                ui.add_space(14.0);
                if ui.add_sized([100.0, 28.0], egui::Button::new("Close")).clicked() {
                    should_close = true;
                }
            });
        });
    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_about = false;
    }
}

/// Render the "CSV Format" help dialog.
pub fn show_csv_help_dialog(app: &mut GanttApp, ctx: &Context) {
    let mut should_close = false;

    Window::new(RichText::new("CSV Format").strong().size(14.0))
        .resizable(true)
        .collapsible(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .default_size([520.0, 420.0])
        .show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                ui.label(RichText::new("Columns").strong());
                egui::Grid::new("csv_columns")
                    .num_columns(2)
                    .striped(true)
                    .spacing([12.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new("Task Name").strong());
                        ui.label("Name, Task, Task Name, Task Label, Title, Activity");
                        ui.end_row();

                        ui.label(RichText::new("Start Date").strong());
                        ui.label("Start, Start Date, From, Begin");
                        ui.end_row();

                        ui.label(RichText::new("End Date").strong());
                        ui.label("End, End Date, To, Finish, Due");
                        ui.end_row();

                        ui.label(RichText::new("Progress (optional)").strong());
                        ui.label("45, 45%, 0.45, Done, In Progress, Not Started");
                        ui.end_row();
                    });
                ui.label(
                    RichText::new("Whole numbers are percent (1 = 1%). Decimals up to 1.0 are fractions (1.0 = 100%).")
                        .small()
                        .color(theme::TEXT_SECONDARY),
                );
                ui.add_space(8.0);

                ui.label(RichText::new("Nesting").strong());
                ui.label("Each leading tab in the task name nests the row one level deeper.");
                ui.label("Export writes only expanded rows; collapsed children are left out.");
                ui.add_space(8.0);

                ui.label(RichText::new("Dates").strong());
                for fmt in ["YYYY-MM-DD", "DD/MM/YYYY", "MM/DD/YYYY", "DD-MM-YYYY", "DD.MM.YYYY", "YYYY/MM/DD"] {
                    ui.label(RichText::new(fmt).monospace().size(11.0));
                }
                ui.add_space(8.0);

                ui.label(RichText::new("Example").strong());
                let example = "Task Name,Start Date,End Date,Progress\n\
                               Project Alpha,2025-01-06,2025-06-30,30\n\
                               \tPlanning Phase,2025-01-06,2025-01-20,100\n\
                               \tDesign Phase,2025-01-20,2025-02-10,60\n";
                egui::Frame::canvas(ui.style()).show(ui, |ui| {
                    ui.add(
                        egui::TextEdit::multiline(&mut example.to_string())
                            .font(egui::TextStyle::Monospace)
                            .desired_width(f32::INFINITY)
                            .interactive(false),
                    );
                });
            });

            ui.separator();
            if ui.add_sized([80.0, 28.0], egui::Button::new("Close")).clicked() {
                should_close = true;
            }
        });

    if should_close || ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
        app.show_csv_help = false;
    }
}
