use eframe::egui::{self, Color32, TextureHandle, Ui};
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Line, Plot, PlotPoints, Points};
use palette::Srgb;

use crate::color::{coolwarm, to_color32, viridis};
use crate::state::{AppState, Tab};

// ---------------------------------------------------------------------------
// Central panel
// ---------------------------------------------------------------------------

/// Render the selected figure in the central panel.
pub fn figure_panel(ui: &mut Ui, state: &mut AppState) {
    if state.show_png || state.tab == Tab::WordCloud {
        let texture = state.current_texture(ui.ctx());
        match texture {
            Some(texture) => png_view(ui, &texture),
            None => empty_message(ui, state.tab),
        }
        return;
    }

    let analysis = &state.report.analysis;
    match state.tab {
        Tab::PapersPerYear if !analysis.papers_per_year.is_empty() => {
            papers_per_year_plot(ui, &analysis.papers_per_year)
        }
        Tab::TopJournals if !analysis.top_journals.is_empty() => count_bar_plot(
            ui,
            "top_journals",
            &analysis.top_journals,
            &viridis(analysis.top_journals.len()),
            "Journal",
        ),
        Tab::Sources => match &analysis.sources {
            Some(sources) if !sources.is_empty() => {
                count_bar_plot(ui, "sources", sources, &coolwarm(sources.len()), "Source")
            }
            _ => empty_message(ui, state.tab),
        },
        tab => empty_message(ui, tab),
    }
}

fn empty_message(ui: &mut Ui, tab: Tab) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading(format!("No data for \"{}\"", tab.label()));
    });
}

/// Show a saved PNG scaled to the available space.
fn png_view(ui: &mut Ui, texture: &TextureHandle) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.add(egui::Image::new((texture.id(), texture.size_vec2())).shrink_to_fit());
    });
}

// ---------------------------------------------------------------------------
// Papers per year (line + markers)
// ---------------------------------------------------------------------------

fn papers_per_year_plot(ui: &mut Ui, counts: &[(i64, usize)]) {
    let color = Color32::from_rgb(0x1f, 0x77, 0xb4);
    let points: Vec<[f64; 2]> = counts
        .iter()
        .map(|&(year, n)| [year as f64, n as f64])
        .collect();

    Plot::new("papers_per_year")
        .x_axis_label("Year")
        .y_axis_label("Number of Papers")
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            let line = Line::new(PlotPoints::from(points.clone()))
                .name("papers")
                .color(color)
                .width(2.0);
            plot_ui.line(line);
            plot_ui.points(Points::new(PlotPoints::from(points)).radius(4.0).color(color));
        });
}

// ---------------------------------------------------------------------------
// Horizontal bar chart (journals, sources)
// ---------------------------------------------------------------------------

/// Bars top-to-bottom in `counts` order, category names on the y axis.
fn count_bar_plot(
    ui: &mut Ui,
    id: &str,
    counts: &[(String, usize)],
    palette: &[Srgb<u8>],
    category_label: &str,
) {
    let n = counts.len();
    let bars: Vec<Bar> = counts
        .iter()
        .enumerate()
        .map(|(rank, (label, count))| {
            let fill = palette
                .get(rank)
                .copied()
                .map(to_color32)
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new(slot_of(rank, n), *count as f64)
                .name(label)
                .fill(fill)
        })
        .collect();

    let names: Vec<String> = counts.iter().map(|(l, _)| l.clone()).collect();

    Plot::new(id)
        .x_axis_label("Number of Papers")
        .y_axis_label(category_label)
        .y_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .y_axis_formatter(move |mark, _range| category_at(&names, mark.value))
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().width(0.7));
        });
}

/// Axis position of the bar at `rank`; rank 0 sits on top.
fn slot_of(rank: usize, n: usize) -> f64 {
    (n - 1 - rank) as f64
}

/// Category name for a y-axis grid mark, empty between categories.
fn category_at(names: &[String], value: f64) -> String {
    let n = names.len();
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 || rounded < 0.0 || rounded >= n as f64 {
        return String::new();
    }
    names[n - 1 - rounded as usize].clone()
}
