use egui::{menu, RichText, Ui};
use egui_phosphor::regular as icons;
use gantt_timeline::model::{Granularity, TimelinePlacement};

use crate::app::GanttApp;
use crate::ui::theme;

/// Render the top menu bar.
pub fn show_menu_bar(app: &mut GanttApp, ui: &mut Ui) {
    menu::bar(ui, |ui| {
        ui.menu_button(RichText::new("  File  ").font(theme::font_menu()), |ui| {
            if ui.button("  Load Sample").clicked() {
                app.load_sample();
                ui.close_menu();
            }
            if ui.button("  Add Task").clicked() {
                app.add_task();
                ui.close_menu();
            }
            if ui.button("  Clear").clicked() {
                app.clear();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("  Import CSV...").clicked() {
                app.import_csv();
                ui.close_menu();
            }
            if ui.button("  Export CSV...").clicked() {
                app.export_csv();
                ui.close_menu();
            }
            if ui.button("  Export PNG...").clicked() {
                let ctx = ui.ctx().clone();
                app.export_png(&ctx);
                ui.close_menu();
            }
            if ui.button("  CSV Format...").clicked() {
                app.show_csv_help = true;
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  View  ").font(theme::font_menu()), |ui| {
            ui.label(RichText::new("Granularity").small().weak());
            let current = app.chart.view().granularity;
            for granularity in Granularity::ALL {
                if ui.radio(current == granularity, granularity.label()).clicked() {
                    app.chart.set_granularity(granularity);
                    ui.close_menu();
                }
            }
            ui.separator();
            if ui.button("  Zoom In").clicked() {
                app.chart.zoom_in();
                ui.close_menu();
            }
            if ui.button("  Zoom Out").clicked() {
                app.chart.zoom_out();
                ui.close_menu();
            }
            if ui.button("  Fit All Tasks").clicked() {
                app.chart.recalculate_full_range();
                ui.close_menu();
            }
            ui.separator();
            let view = app.chart.view().clone();
            let mut marker = view.current_marker.enabled;
            if ui.checkbox(&mut marker, "Show Current Date").clicked() {
                app.chart.toggle_current_marker();
                ui.close_menu();
            }
            let mut on_top = view.timeline_placement == TimelinePlacement::Top;
            if ui.checkbox(&mut on_top, "Timeline On Top").clicked() {
                app.chart.toggle_timeline_placement();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Settings  ").font(theme::font_menu()), |ui| {
            if ui.button("  Open Config Folder").clicked() {
                app.open_config_folder();
                ui.close_menu();
            }
        });

        ui.menu_button(RichText::new("  Help  ").font(theme::font_menu()), |ui| {
            if ui.button("About").clicked() {
                app.show_about = true;
                ui.close_menu();
            }
        });

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.label(
                RichText::new(format!("{} tasks", app.chart.total_task_count()))
                    .size(11.0)
                    .weak(),
            );
        });
    });
}

fn icon_button(ui: &mut Ui, icon: &str, hint: &str, selected: bool) -> bool {
    ui.add(egui::Button::new(RichText::new(icon).size(16.0)).selected(selected))
        .on_hover_text(hint)
        .clicked()
}

/// Render the chart header: granularity switch and view controls.
pub fn show_chart_header(app: &mut GanttApp, ui: &mut Ui) {
    let view = app.chart.view().clone();

    ui.horizontal(|ui| {
        ui.label(RichText::new("Project Timeline").strong().size(15.0));
        ui.add_space(12.0);
        ui.label(RichText::new(view.visible_range.to_string()).color(theme::TEXT_SECONDARY));

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            if icon_button(ui, icons::DOWNLOAD_SIMPLE, "Export as PNG", false) {
                let ctx = ui.ctx().clone();
                app.export_png(&ctx);
            }
            if icon_button(ui, icons::MAGNIFYING_GLASS_MINUS, "Zoom out", false) {
                app.chart.zoom_out();
            }
            if icon_button(ui, icons::MAGNIFYING_GLASS_PLUS, "Zoom in", false) {
                app.chart.zoom_in();
            }
            if icon_button(ui, icons::ARROWS_CLOCKWISE, "Fit range to all tasks", false) {
                app.chart.recalculate_full_range();
            }
            let (arrow, hint) = match view.timeline_placement {
                TimelinePlacement::Top => (icons::ARROW_DOWN, "Move timeline to bottom"),
                TimelinePlacement::Bottom => (icons::ARROW_UP, "Move timeline to top"),
            };
            if icon_button(ui, arrow, hint, false) {
                app.chart.toggle_timeline_placement();
            }
            if icon_button(
                ui,
                icons::CALENDAR,
                "Toggle current date line",
                view.current_marker.enabled,
            ) {
                app.chart.toggle_current_marker();
            }

            ui.separator();

            for granularity in Granularity::ALL.into_iter().rev() {
                let selected = view.granularity == granularity;
                if ui.selectable_label(selected, granularity.label()).clicked() && !selected {
                    app.chart.set_granularity(granularity);
                }
            }
        });
    });
}
