use eframe::egui::{Color32, Ui};
use egui_plot::{Plot, PlotPoint, PlotPoints, Points};

use crate::selection::pick_point;
use crate::state::AppState;

/// Screen distance (points) within which a click selects a sample.
const PICK_RADIUS: f32 = 8.0;

// ---------------------------------------------------------------------------
// CO2 scatter plot (central panel)
// ---------------------------------------------------------------------------

/// Render the CO2 trace and turn clicks on samples into picks.
pub fn co2_plot(ui: &mut Ui, state: &mut AppState) {
    let picked = {
        let trace = match &state.trace {
            Some(points) => points,
            None => {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading(
                        "Please upload a CSV file with 'ticks' and 'co2_concentration' columns",
                    );
                });
                return;
            }
        };
        let selected = state.selection.points();

        let response = Plot::new("co2_plot")
            .x_axis_label("ticks")
            .y_axis_label("co2_concentration")
            .allow_boxed_zoom(true)
            .allow_drag(true)
            .allow_scroll(true)
            .allow_zoom(true)
            .show(ui, |plot_ui| {
                let points: PlotPoints = trace.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(points)
                        .name("CO2 Concentration")
                        .color(Color32::LIGHT_BLUE)
                        .radius(2.5),
                );

                let highlighted: PlotPoints = selected.iter().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(highlighted)
                        .name("Selected")
                        .color(Color32::from_rgb(230, 80, 60))
                        .radius(5.0),
                );
            });

        if response.response.clicked() {
            response.response.interact_pointer_pos().and_then(|pos| {
                pick_point(trace, (pos.x, pos.y), PICK_RADIUS, |p| {
                    let screen = response
                        .transform
                        .position_from_point(&PlotPoint::new(p.x, p.y));
                    (screen.x, screen.y)
                })
            })
        } else {
            None
        }
    };

    if let Some(point) = picked {
        state.on_point_clicked(point);
    }
}
