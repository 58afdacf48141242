use super::model::{CellValue, Sample, Table};
use super::validate::{ValidatedTable, SUBJECT_ID};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Derived columns
// ---------------------------------------------------------------------------

/// Names of the derived columns, in computation and export order.
pub const DERIVED_COLUMNS: [&str; 12] = [
    "Carb",
    "EE",
    "EE1",
    "EEA",
    "RQ-A",
    "Carb-Oxid",
    "EE_A-Carb",
    "L of CO2/d_carb",
    "CO2 ml/min",
    "Kcal/min from glucose",
    "Glucose utilise mg/min",
    "Ratio UT/GT",
];

/// The twelve quantities derived from one [`Sample`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DerivedFields {
    pub carb: f64,
    pub ee: f64,
    pub ee1: f64,
    pub eea: f64,
    pub rq_a: f64,
    pub carb_oxid: f64,
    pub ee_a_carb: f64,
    pub l_co2_per_day_carb: f64,
    pub co2_ml_per_min: f64,
    pub kcal_per_min_glucose: f64,
    pub glucose_mg_per_min: f64,
    /// Infinite or NaN when `GT_BGL` is zero; left as is.
    pub ratio_ut_gt: f64,
}

/// Compute every derived field of `s`. Each step may read earlier steps of
/// the same sample and nothing else.
pub fn derive(s: &Sample) -> DerivedFields {
    let carb = s.rq * 338.47 - 237.64;
    let ee = ((3.9 * s.vo2 + 1.1 * s.vco2) * 1440.0) * 70.0 / 1000.0;
    let ee1 = ee * 20.0 / 100.0;
    let eea = ee - ee1;
    let rq_a = (s.rq - 0.2) / 0.8;
    let carb_oxid = s.rq * 338.47 - 237.64;
    let ee_a_carb = ee * (carb_oxid / 100.0) - ee1 * (carb_oxid / 100.0);
    let l_co2_per_day_carb = ee_a_carb / 5.05;
    let co2_ml_per_min = l_co2_per_day_carb * 1000.0 / 1440.0;
    let kcal_per_min_glucose = (co2_ml_per_min * 5.05) / 1000.0;
    let glucose_mg_per_min = kcal_per_min_glucose * 1000.0 / 4.0;
    let ratio_ut_gt = glucose_mg_per_min / s.gt_bgl;

    DerivedFields {
        carb,
        ee,
        ee1,
        eea,
        rq_a,
        carb_oxid,
        ee_a_carb,
        l_co2_per_day_carb,
        co2_ml_per_min,
        kcal_per_min_glucose,
        glucose_mg_per_min,
        ratio_ut_gt,
    }
}

impl DerivedFields {
    /// Values in [`DERIVED_COLUMNS`] order.
    pub fn values(&self) -> [f64; 12] {
        [
            self.carb,
            self.ee,
            self.ee1,
            self.eea,
            self.rq_a,
            self.carb_oxid,
            self.ee_a_carb,
            self.l_co2_per_day_carb,
            self.co2_ml_per_min,
            self.kcal_per_min_glucose,
            self.glucose_mg_per_min,
            self.ratio_ut_gt,
        ]
    }
}

// ---------------------------------------------------------------------------
// Pipeline over a validated table
// ---------------------------------------------------------------------------

/// Validated input rows paired with their derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzedTable {
    /// Original columns, after validation.
    pub input: Table,
    /// One entry per input row, same order.
    pub derived: Vec<DerivedFields>,
}

impl AnalyzedTable {
    /// Header of the exported artifact: input columns, then derived ones.
    pub fn columns(&self) -> Vec<String> {
        self.input
            .columns
            .iter()
            .cloned()
            .chain(DERIVED_COLUMNS.iter().map(|c| c.to_string()))
            .collect()
    }

    /// Full output rows, matching [`AnalyzedTable::columns`].
    pub fn rows(&self) -> impl Iterator<Item = Vec<CellValue>> + '_ {
        self.input.rows.iter().zip(&self.derived).map(|(row, d)| {
            row.iter()
                .cloned()
                .chain(d.values().into_iter().map(CellValue::Float))
                .collect()
        })
    }

    /// Number of rows whose `Ratio UT/GT` is infinite or NaN.
    pub fn non_finite_ratios(&self) -> usize {
        self.derived
            .iter()
            .filter(|d| !d.ratio_ut_gt.is_finite())
            .count()
    }
}

/// Run the formula pipeline over every row of a validated respirometry table.
pub fn run_pipeline(validated: &ValidatedTable) -> Result<AnalyzedTable, AnalysisError> {
    let samples = validated.samples()?;
    let derived: Vec<DerivedFields> = samples
        .iter()
        .map(|s| {
            let d = derive(s);
            if !d.ratio_ut_gt.is_finite() {
                log::warn!(
                    "{SUBJECT_ID} {}: Ratio UT/GT is {} (GT_BGL = {})",
                    s.subject_id,
                    d.ratio_ut_gt,
                    s.gt_bgl
                );
            }
            d
        })
        .collect();

    Ok(AnalyzedTable {
        input: validated.table.clone(),
        derived,
    })
}
