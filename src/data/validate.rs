use super::model::{CellValue, Sample, ScatterPoint, Table};
use crate::error::AnalysisError;

// ---------------------------------------------------------------------------
// Schema descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
}

/// Required columns of an input artifact. Extra columns pass through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub name: &'static str,
    pub fields: &'static [(&'static str, FieldKind)],
    /// Column whose values are cut at their first `.`.
    pub id_column: Option<&'static str>,
}

pub const SUBJECT_ID: &str = "Subject_ID";
pub const RQ: &str = "RQ";
pub const VO2: &str = "VO2";
pub const VCO2: &str = "VCO2";
pub const GT_BGL: &str = "GT_BGL";
pub const TICKS: &str = "ticks";
pub const CO2_CONCENTRATION: &str = "co2_concentration";

pub const RESPIROMETRY_SCHEMA: Schema = Schema {
    name: "respirometry",
    fields: &[
        (SUBJECT_ID, FieldKind::Text),
        (RQ, FieldKind::Number),
        (VO2, FieldKind::Number),
        (VCO2, FieldKind::Number),
        (GT_BGL, FieldKind::Number),
    ],
    id_column: Some(SUBJECT_ID),
};

pub const CO2_TRACE_SCHEMA: Schema = Schema {
    name: "CO2 trace",
    fields: &[
        (TICKS, FieldKind::Number),
        (CO2_CONCENTRATION, FieldKind::Number),
    ],
    id_column: None,
};

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A table that passed [`validate`]: required columns exist, no cell is
/// null, and every cell of a numeric column holds a number.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedTable {
    pub table: Table,
    /// Rows removed for holding at least one missing value.
    pub dropped: usize,
}

/// Check `table` against `schema`, truncate the id column and drop
/// incomplete rows.
///
/// Rows are dropped when *any* column is null, required or not. Text in a
/// numeric column is not a missing value and fails the whole run.
pub fn validate(mut table: Table, schema: &Schema) -> Result<ValidatedTable, AnalysisError> {
    let missing: Vec<String> = schema
        .fields
        .iter()
        .filter(|(name, _)| table.column_index(name).is_none())
        .map(|(name, _)| name.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(AnalysisError::Schema {
            schema: schema.name,
            missing,
        });
    }

    if let Some(idx) = schema.id_column.and_then(|c| table.column_index(c)) {
        for row in &mut table.rows {
            row[idx] = truncate_id(&row[idx]);
        }
    }

    let before = table.rows.len();
    let kept: Vec<(usize, Vec<CellValue>)> = std::mem::take(&mut table.rows)
        .into_iter()
        .enumerate()
        .filter(|(_, row)| !row.iter().any(CellValue::is_null))
        .collect();
    let dropped = before - kept.len();

    let numeric: Vec<(usize, &str)> = schema
        .fields
        .iter()
        .filter(|(_, kind)| *kind == FieldKind::Number)
        .filter_map(|(name, _)| table.column_index(name).map(|i| (i, *name)))
        .collect();
    for (row_no, row) in &kept {
        for &(idx, name) in &numeric {
            if row[idx].as_f64().is_none() {
                return Err(AnalysisError::InvalidNumber {
                    row: *row_no,
                    column: name.to_string(),
                    value: row[idx].to_string(),
                });
            }
        }
    }

    table.rows = kept.into_iter().map(|(_, row)| row).collect();
    log::debug!(
        "validated {} input: {} rows kept, {dropped} dropped",
        schema.name,
        table.rows.len()
    );
    Ok(ValidatedTable { table, dropped })
}

fn truncate_id(cell: &CellValue) -> CellValue {
    if cell.is_null() {
        return CellValue::Null;
    }
    let text = cell.to_string();
    let head = text.split('.').next().unwrap_or_default();
    CellValue::Text(head.to_string())
}

impl ValidatedTable {
    /// Typed respirometry records, one per row.
    pub fn samples(&self) -> Result<Vec<Sample>, AnalysisError> {
        let [id, rq, vo2, vco2, gt] = self.require([SUBJECT_ID, RQ, VO2, VCO2, GT_BGL])?;
        Ok(self
            .table
            .rows
            .iter()
            .map(|row| Sample {
                subject_id: row[id].to_string(),
                rq: number(&row[rq]),
                vo2: number(&row[vo2]),
                vco2: number(&row[vco2]),
                gt_bgl: number(&row[gt]),
            })
            .collect())
    }

    /// `(ticks, co2_concentration)` pairs in file order.
    pub fn scatter_points(&self) -> Result<Vec<ScatterPoint>, AnalysisError> {
        let [x, y] = self.require([TICKS, CO2_CONCENTRATION])?;
        Ok(self
            .table
            .rows
            .iter()
            .map(|row| ScatterPoint::new(number(&row[x]), number(&row[y])))
            .collect())
    }

    fn require<const N: usize>(&self, names: [&str; N]) -> Result<[usize; N], AnalysisError> {
        let mut out = [0; N];
        let mut missing = Vec::new();
        for (slot, name) in out.iter_mut().zip(names) {
            match self.table.column_index(name) {
                Some(i) => *slot = i,
                None => missing.push(name.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(out)
        } else {
            Err(AnalysisError::Schema {
                schema: "validated",
                missing,
            })
        }
    }
}

// Numeric columns were checked in `validate`.
fn number(cell: &CellValue) -> f64 {
    cell.as_f64().unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.into())
    }

    fn respirometry(rows: Vec<Vec<CellValue>>) -> Table {
        let mut t = Table::new(
            ["Subject_ID", "RQ", "VO2", "VCO2", "GT_BGL", "Notes"]
                .map(String::from)
                .to_vec(),
        );
        t.rows = rows;
        t
    }

    fn row(id: &str, gt: CellValue, notes: CellValue) -> Vec<CellValue> {
        vec![
            text(id),
            CellValue::Float(0.85),
            CellValue::Float(0.30),
            CellValue::Float(0.26),
            gt,
            notes,
        ]
    }

    #[test]
    fn reports_every_missing_column() {
        let table = Table::new(vec!["Subject_ID".into(), "VO2".into()]);
        let err = validate(table, &RESPIROMETRY_SCHEMA).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::Schema {
                schema: "respirometry",
                missing: vec!["RQ".into(), "VCO2".into(), "GT_BGL".into()],
            }
        );
    }

    #[test]
    fn truncates_subject_id_at_first_dot() {
        let table = respirometry(vec![row("S1.run.csv", CellValue::Integer(90), text("ok"))]);
        let v = validate(table, &RESPIROMETRY_SCHEMA).unwrap();
        assert_eq!(v.table.rows[0][0], text("S1"));
        assert_eq!(v.samples().unwrap()[0].subject_id, "S1");
    }

    #[test]
    fn drops_rows_with_nulls_in_any_column() {
        let table = respirometry(vec![
            row("A.csv", CellValue::Integer(90), text("ok")),
            row("B.csv", CellValue::Null, text("ok")),
            row("C.csv", CellValue::Integer(80), CellValue::Null),
            row("D.csv", CellValue::Integer(70), text("ok")),
        ]);
        let v = validate(table, &RESPIROMETRY_SCHEMA).unwrap();
        assert_eq!(v.dropped, 2);
        let ids: Vec<String> = v.samples().unwrap().into_iter().map(|s| s.subject_id).collect();
        assert_eq!(ids, vec!["A", "D"]);
    }

    #[test]
    fn text_in_numeric_column_is_rejected() {
        let table = respirometry(vec![
            row("A.csv", CellValue::Integer(90), text("ok")),
            row("B.csv", text("high"), text("ok")),
        ]);
        let err = validate(table, &RESPIROMETRY_SCHEMA).unwrap_err();
        assert_eq!(
            err,
            AnalysisError::InvalidNumber {
                row: 1,
                column: "GT_BGL".into(),
                value: "high".into(),
            }
        );
    }

    #[test]
    fn scatter_points_follow_file_order() {
        let mut table = Table::new(vec!["ticks".into(), "co2_concentration".into()]);
        table.rows = vec![
            vec![CellValue::Integer(1), CellValue::Float(410.0)],
            vec![CellValue::Integer(2), CellValue::Null],
            vec![CellValue::Integer(3), CellValue::Float(415.5)],
        ];
        let v = validate(table, &CO2_TRACE_SCHEMA).unwrap();
        assert_eq!(
            v.scatter_points().unwrap(),
            vec![ScatterPoint::new(1.0, 410.0), ScatterPoint::new(3.0, 415.5)]
        );
    }
}
