use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::{
    EmissionSource, RangeOption, ViewInput, YEAR_MARK_STEP, YEAR_MAX, YEAR_MIN, YEAR_STEP,
};
use crate::state::AppState;

const INTRO: &str = "Carbon dioxide emissions are the primary driver of global climate change. \
It's widely recognised that to avoid the worst impacts of climate change, the world needs to \
urgently reduce emissions. But, how this responsibility is shared between regions, countries, \
and individuals has been an endless point of contention in international discussions.";

// ---------------------------------------------------------------------------
// Header and year slider
// ---------------------------------------------------------------------------

pub fn header(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.heading("World CO2 Emissions Dashboard");
        ui.label(INTRO);
    });
}

pub fn year_slider(ui: &mut Ui, state: &mut AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("Timeline");
        let width = ui.available_width() * 0.8;
        ui.spacing_mut().slider_width = width;
        ui.add(
            egui::Slider::new(&mut state.input.year, YEAR_MIN..=YEAR_MAX)
                .step_by(YEAR_STEP as f64)
                .text("year"),
        );
        state.input.year = ViewInput::snap_year(state.input.year);
        let marks: Vec<String> = (YEAR_MIN..=YEAR_MAX)
            .step_by(YEAR_MARK_STEP as usize)
            .map(|y| y.to_string())
            .collect();
        ui.label(RichText::new(marks.join("  ·  ")).small().weak());
    });
}

// ---------------------------------------------------------------------------
// Source radio and range checklist
// ---------------------------------------------------------------------------

pub fn source_selector(ui: &mut Ui, state: &mut AppState) {
    ui.horizontal(|ui: &mut Ui| {
        for source in EmissionSource::ALL {
            ui.radio_value(&mut state.input.source, source, source.label());
        }
    });
}

pub fn range_checklist(ui: &mut Ui, state: &mut AppState) {
    ui.label("Checklist");
    for option in RangeOption::ALL {
        let mut checked = state.input.range_options.contains(&option);
        if ui.checkbox(&mut checked, option.label()).changed() {
            state.toggle_range_option(option);
        }
    }
    let text = &state.output().range_text;
    if !text.is_empty() {
        ui.label(text.as_str());
    }
}

// ---------------------------------------------------------------------------
// Scatter data table
// ---------------------------------------------------------------------------

pub fn scatter_table(ui: &mut Ui, state: &AppState) {
    let rows = &state.output().scatter;
    egui::CollapsingHeader::new(RichText::new(format!("Countries ({})", rows.len())).strong())
        .id_salt("scatter_table")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .max_scroll_height(240.0)
                .column(Column::auto().at_least(140.0))
                .column(Column::auto().at_least(120.0))
                .column(Column::remainder())
                .header(20.0, |mut header| {
                    header.col(|ui| {
                        ui.strong("country");
                    });
                    header.col(|ui| {
                        ui.strong("gdp_per_capita");
                    });
                    header.col(|ui| {
                        ui.strong("co2");
                    });
                })
                .body(|mut body| {
                    for p in rows {
                        body.row(18.0, |mut row| {
                            row.col(|ui| {
                                ui.label(p.region.as_str());
                            });
                            row.col(|ui| {
                                ui.label(format!("{:.2}", p.gdp_per_capita));
                            });
                            row.col(|ui| {
                                ui.label(format!("{:.3}", p.co2));
                            });
                        });
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export view…").clicked() {
                export_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let years = ds
                .year_range()
                .map(|(lo, hi)| format!(", years {lo}–{hi}"))
                .unwrap_or_default();
            ui.label(format!("{} rows loaded{years}", ds.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open emissions data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        if let Err(e) = state.load_path(&path) {
            log::error!("Failed to load file: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}

pub fn export_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export current view")
        .add_filter("JSON", &["json"])
        .set_file_name("co2-view.json")
        .save_file();

    let Some(path) = file else {
        return;
    };
    let result = state
        .export_json()
        .and_then(|json| std::fs::write(&path, json).map_err(Into::into));
    match result {
        Ok(()) => {
            log::info!("Exported view to {}", path.display());
            state.status_message = None;
        }
        Err(e) => {
            log::error!("Failed to export view: {e:#}");
            state.status_message = Some(format!("Error: {e:#}"));
        }
    }
}
