use thiserror::Error;

/// Domain failures of the analysis core.
///
/// I/O and parse failures travel as `anyhow::Error` with context attached;
/// these variants are the ones callers branch on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// One or more required columns are absent. Aborts the run.
    #[error("{schema} input is missing required column(s): {}", missing.join(", "))]
    Schema {
        schema: &'static str,
        missing: Vec<String>,
    },

    /// The artifact is not a tabular type we can read.
    #[error("unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A present value in a numeric column does not parse as a number.
    #[error("row {row}, column '{column}': '{value}' is not a number")]
    InvalidNumber {
        row: usize,
        column: String,
        value: String,
    },
}
