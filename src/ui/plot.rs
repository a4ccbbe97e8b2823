use std::f64::consts::TAU;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points, Polygon};

use crate::data::query::timeline_series;
use crate::state::AppState;

const CHART_HEIGHT: f32 = 360.0;

// ---------------------------------------------------------------------------
// Line chart: CO2 by aggregate region up to the selected year
// ---------------------------------------------------------------------------

pub fn timeline_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("CO2 Emission by Continent");
    });
    let series = timeline_series(&state.output().timeline);

    Plot::new("timeline_plot")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("year")
        .y_axis_label("co2")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (region, points) in series {
                let line = Line::new(PlotPoints::from(points))
                    .name(&region)
                    .color(state.color_map.color_for(&region))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Scatter: CO2 vs GDP per capita for countries in the selected year
// ---------------------------------------------------------------------------

pub fn scatter_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("CO2 vs GDP per capita");
    });

    Plot::new("scatter_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("gdp_per_capita")
        .y_axis_label("co2")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // One trace per country, no legend.
            for p in &state.output().scatter {
                let points = Points::new(vec![[p.gdp_per_capita, p.co2]])
                    .name(&p.region)
                    .radius(4.0)
                    .color(state.color_map.color_for_country(&p.region));
                plot_ui.points(points);
            }
        });
}

// ---------------------------------------------------------------------------
// Bar chart: selected fuel source per continent
// ---------------------------------------------------------------------------

pub fn source_bar_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("CO2 source by Country");
    });
    let rows = &state.output().source_bar;
    let labels: Vec<String> = rows.iter().map(|b| b.region.clone()).collect();

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, b)| {
            Bar::new(i as f64, b.value)
                .name(&b.region)
                .width(0.7)
                .fill(state.color_map.color_for(&b.region))
        })
        .collect();

    Plot::new("source_bar_plot")
        .height(CHART_HEIGHT)
        .x_axis_label("country")
        .y_axis_label(state.input.source.column())
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

// ---------------------------------------------------------------------------
// Pie chart: per-capita CO2 share per continent
// ---------------------------------------------------------------------------

/// Points approximating one pie slice, starting and ending at the centre.
pub fn slice_outline(start: f64, end: f64) -> Vec<[f64; 2]> {
    let steps = (((end - start) / TAU) * 128.0).ceil().max(2.0) as usize;
    let mut points = Vec::with_capacity(steps + 2);
    points.push([0.0, 0.0]);
    for i in 0..=steps {
        let angle = start + (end - start) * i as f64 / steps as f64;
        // Clockwise from twelve o'clock.
        points.push([angle.sin(), angle.cos()]);
    }
    points
}

pub fn per_capita_pie_plot(ui: &mut Ui, state: &AppState) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.strong("CO2 Emissions per Capita");
    });
    let slices = &state.output().per_capita_pie;
    let total: f64 = slices.iter().map(|s| s.co2_per_capita.max(0.0)).sum();

    Plot::new("per_capita_pie")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if total <= 0.0 {
                return;
            }
            let mut start = 0.0;
            for slice in slices {
                let share = slice.co2_per_capita.max(0.0) / total;
                let end = start + share * TAU;
                let name = format!("{} ({:.1}%)", slice.region, share * 100.0);
                let polygon = Polygon::new(PlotPoints::from(slice_outline(start, end)))
                    .name(name)
                    .fill_color(state.color_map.color_for(&slice.region));
                plot_ui.polygon(polygon);
                start = end;
            }
        });
}
