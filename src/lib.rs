//! Respirometry glucose-utilisation analysis and CO2 slope picking.
//!
//! The computational core lives in [`data`] (batch pipeline) and
//! [`selection`] (interactive two-point picks). [`app`], [`state`] and
//! [`ui`] wrap them in an egui desktop viewer.

pub mod app;
pub mod data;
pub mod error;
pub mod selection;
pub mod state;
pub mod ui;

pub use error::AnalysisError;
