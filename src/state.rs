use std::path::{Path, PathBuf};

use crate::data::export::analyze_file;
use crate::data::loader::load_table;
use crate::data::model::ScatterPoint;
use crate::data::validate::{validate, CO2_TRACE_SCHEMA};
use crate::selection::{evaluate, SelectionBuffer, SlopeReport};

/// Environment variable overriding where analysis outputs are written.
pub const OUT_DIR_ENV: &str = "RUSTY_RESPIRO_OUT_DIR";
pub const DEFAULT_OUT_DIR: &str = "analyzed";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Plotted CO2 trace (None until a valid trace is loaded).
    pub trace: Option<Vec<ScatterPoint>>,

    /// Picks on the trace plot. Survives loading a new trace.
    pub selection: SelectionBuffer,

    /// Display payload for the current selection.
    pub report: SlopeReport,

    /// Directory receiving `analyzed_*` files.
    pub out_dir: PathBuf,

    /// Path of the most recent analysis output.
    pub last_output: Option<PathBuf>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        let out_dir = std::env::var_os(OUT_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUT_DIR));
        Self::with_out_dir(out_dir)
    }
}

impl AppState {
    pub fn with_out_dir(out_dir: PathBuf) -> Self {
        let selection = SelectionBuffer::new();
        Self {
            trace: None,
            report: evaluate(&selection),
            selection,
            out_dir,
            last_output: None,
            status_message: None,
        }
    }

    /// Load a CO2 trace. An unreadable file or one lacking `ticks` /
    /// `co2_concentration` clears the plot to its placeholder.
    pub fn load_trace(&mut self, path: &Path) {
        let points = load_table(path).and_then(|table| {
            let validated = validate(table, &CO2_TRACE_SCHEMA)?;
            Ok(validated.scatter_points()?)
        });

        match points {
            Ok(points) => {
                log::info!("Loaded {} trace points from {}", points.len(), path.display());
                self.trace = Some(points);
                self.status_message = None;
            }
            Err(e) => {
                log::warn!("Rejected trace {}: {e:#}", path.display());
                self.trace = None;
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Handle one accepted pick on the trace plot.
    pub fn on_point_clicked(&mut self, point: ScatterPoint) {
        self.selection.click(point);
        self.report = evaluate(&self.selection);
        log::debug!(
            "click #{} at ({}, {}): {}",
            self.selection.click_count(),
            point.x,
            point.y,
            self.report
        );
    }

    /// Run the batch pipeline on a respirometry file.
    pub fn analyze(&mut self, path: &Path) {
        match analyze_file(path, &self.out_dir) {
            Ok(out) => {
                self.status_message = Some(format!("Wrote {}", out.display()));
                self.last_output = Some(out);
            }
            Err(e) => {
                log::error!("Analysis of {} failed: {e:#}", path.display());
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }
}
