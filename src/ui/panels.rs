use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Left side panel – dataset summary and column profile
// ---------------------------------------------------------------------------

/// Render the left summary panel.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    let report = &state.report;
    let analysis = &report.analysis;

    ui.heading("Dataset");
    ui.separator();

    ui.label(format!("File: {}", report.input.display()));
    ui.label(format!(
        "Loaded: {} rows × {} columns",
        report.loaded_shape.0, report.loaded_shape.1
    ));
    ui.label(format!(
        "Cleaned: {} rows × {} columns",
        analysis.rows,
        analysis.columns.len()
    ));
    ui.label(format!("Rows dropped: {}", analysis.cleaning.dropped_rows));
    ui.label(format!("Unparsed dates: {}", analysis.cleaning.unparsed_dates));
    ui.label(format!("Stopwords: {}", report.stopwords));

    let dropped = &analysis.cleaning.dropped_columns;
    egui::CollapsingHeader::new(RichText::new(format!("Dropped columns ({})", dropped.len())).strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for col in dropped {
                ui.label(col);
            }
        });

    ui.add_space(6.0);
    ui.strong("Columns");
    ui.separator();

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .column(Column::auto())
            .column(Column::auto())
            .column(Column::remainder())
            .header(18.0, |mut header| {
                header.col(|ui| {
                    ui.strong("column");
                });
                header.col(|ui| {
                    ui.strong("non-null");
                });
                header.col(|ui| {
                    ui.strong("dtype");
                });
            })
            .body(|mut body| {
                for info in &analysis.columns {
                    body.row(16.0, |mut row| {
                        row.col(|ui| {
                            ui.label(&info.name);
                        });
                        row.col(|ui| {
                            ui.label(info.non_null.to_string());
                        });
                        row.col(|ui| {
                            ui.label(&info.dtype);
                        });
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the figure tabs and toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        for tab in Tab::ALL {
            if ui.selectable_label(state.tab == tab, tab.label()).clicked() {
                state.select_tab(tab);
            }
        }

        ui.separator();

        // The word cloud only exists as a PNG.
        ui.add_enabled_ui(state.tab != Tab::WordCloud, |ui: &mut Ui| {
            if ui
                .selectable_label(state.show_png, "Saved PNG")
                .clicked()
            {
                state.show_png = !state.show_png;
            }
        });

        ui.separator();
        ui.label(format!("Output: {}", state.report.output_dir.display()));
    });
}

// ---------------------------------------------------------------------------
// Bottom status bar
// ---------------------------------------------------------------------------

/// Path of the current figure, or the last error.
pub fn status_bar(ui: &mut Ui, state: &AppState) {
    ui.horizontal(|ui: &mut Ui| {
        match &state.status_message {
            Some(msg) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            None => match state.figure_path(state.tab) {
                Some(path) => {
                    ui.label(format!("Saved to {}", path.display()));
                }
                None => {
                    ui.weak("Figure not rendered");
                }
            },
        }
    });
}
