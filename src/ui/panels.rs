use eframe::egui::{self, Color32, RichText, Ui};

use crate::selection::Phase;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – selection state
// ---------------------------------------------------------------------------

/// Render the left panel: buffered picks and the last analysis.
pub fn side_panel(ui: &mut Ui, state: &AppState) {
    ui.heading("Selection");
    ui.separator();

    let phase = match state.selection.phase() {
        Phase::Idle => "no points",
        Phase::Single => "one point",
        Phase::Paired => "two points",
    };
    ui.label(format!("Clicks: {}", state.selection.click_count()));
    ui.label(format!("Buffered: {phase}"));
    for (i, p) in state.selection.points().iter().enumerate() {
        ui.monospace(format!("P{}  ticks {:.4}  co2 {:.4}", i + 1, p.x, p.y));
    }

    ui.add_space(12.0);
    ui.heading("Analysis");
    ui.separator();
    ui.label(format!("Output folder: {}", state.out_dir.display()));
    match &state.last_output {
        Some(path) => {
            ui.label(format!("Last output: {}", path.display()));
        }
        None => {
            ui.label("No file analyzed yet.");
        }
    }
}

// ---------------------------------------------------------------------------
// Bottom panel – slope / delta text
// ---------------------------------------------------------------------------

pub fn slope_status(ui: &mut Ui, state: &AppState) {
    ui.label(RichText::new(state.report.to_string()).strong());
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Analyze respirometry file…").clicked() {
                analyze_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open CO2 trace…").clicked() {
                open_trace_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(points) = &state.trace {
            ui.label(format!("{} trace points", points.len()));
        }

        if let Some(msg) = &state.status_message {
            let color = if msg.starts_with("Error") {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

const TABLE_EXTENSIONS: [&str; 4] = ["csv", "json", "parquet", "pq"];

pub fn analyze_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Analyze respirometry data")
        .add_filter("Supported files", &TABLE_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.analyze(&path);
    }
}

pub fn open_trace_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open CO2 trace")
        .add_filter("Supported files", &TABLE_EXTENSIONS)
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.load_trace(&path);
    }
}
