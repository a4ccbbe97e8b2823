use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: controls and charts ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    let state = &mut self.state;

                    panels::header(ui);
                    ui.separator();
                    panels::year_slider(ui, state);
                    state.refresh();
                    ui.separator();

                    ui.columns(2, |cols| {
                        plot::timeline_plot(&mut cols[0], state);

                        plot::scatter_plot(&mut cols[1], state);
                        panels::range_checklist(&mut cols[1], state);
                        state.refresh();
                        panels::scatter_table(&mut cols[1], state);
                    });
                    ui.separator();

                    ui.columns(2, |cols| {
                        panels::source_selector(&mut cols[0], state);
                        state.refresh();
                        plot::source_bar_plot(&mut cols[0], state);

                        plot::per_capita_pie_plot(&mut cols[1], state);
                    });
                });
        });
    }
}
