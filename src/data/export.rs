use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tempfile::NamedTempFile;

use super::formula::{run_pipeline, AnalyzedTable};
use super::loader::load_table;
use super::validate::{validate, RESPIROMETRY_SCHEMA};

/// Prefix of every analysis output file name.
pub const OUTPUT_PREFIX: &str = "analyzed_";

/// `analyzed_<base name of input>`.
pub fn output_file_name(input: &Path) -> String {
    let base = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{OUTPUT_PREFIX}{base}")
}

/// Write `analyzed` as CSV to `path` in one atomic step.
///
/// The file is staged next to `path` and renamed over it, so readers never
/// see a partial artifact.
pub fn write_csv(path: &Path, analyzed: &AnalyzedTable) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("failed to stage output in {}", dir.display()))?;

    {
        let mut w = csv::Writer::from_writer(staged.as_file());
        w.write_record(analyzed.columns())?;
        for row in analyzed.rows() {
            w.write_record(row.iter().map(|cell| cell.to_string()))?;
        }
        w.flush().context("flushing CSV output")?;
    }

    staged
        .persist(path)
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

/// Load, validate, derive and export one respirometry file.
///
/// Returns the path of the written artifact inside `out_dir`. Nothing is
/// written when loading or validation fails.
pub fn analyze_file(input: &Path, out_dir: &Path) -> Result<PathBuf> {
    let table = load_table(input).with_context(|| format!("loading {}", input.display()))?;
    let rows_in = table.len();
    let validated = validate(table, &RESPIROMETRY_SCHEMA)
        .with_context(|| format!("validating {}", input.display()))?;
    let analyzed = run_pipeline(&validated)?;

    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create {}", out_dir.display()))?;
    let out_path = out_dir.join(output_file_name(input));
    write_csv(&out_path, &analyzed)?;

    log::info!(
        "Analyzed {}: {} of {rows_in} rows kept, {} non-finite Ratio UT/GT, wrote {}",
        input.display(),
        analyzed.derived.len(),
        analyzed.non_finite_ratios(),
        out_path.display()
    );
    Ok(out_path)
}
