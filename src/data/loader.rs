use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use arrow::array::{Array, AsArray};
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int8Type, Int16Type, Int32Type, Int64Type, UInt8Type,
    UInt16Type, UInt32Type, UInt64Type,
};
use arrow::util::display::{ArrayFormatter, FormatOptions};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;

use super::model::{CellValue, Table};
use crate::error::AnalysisError;

/// Tokens read as missing values, matching the pandas `read_csv` defaults.
pub const NA_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular artifact from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row plus one record per line
/// * `.json`    – `[{ "col": value, ... }, ...]` (records orientation)
/// * `.parquet` – flat scalar columns
///
/// Anything else fails with [`AnalysisError::UnsupportedFormat`].
pub fn load_table(path: &Path) -> Result<Table> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => Err(AnalysisError::UnsupportedFormat(format!(".{other}")).into()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Reads every field as text, then settles one type per column the way
/// pandas infers dtypes: all-integer, all-float, all-bool, otherwise text.
/// An integer column with missing values becomes float.
fn load_csv(path: &Path) -> Result<Table> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let columns: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut raw: Vec<Vec<Option<String>>> = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        raw.push(
            record
                .iter()
                .map(|field| (!is_na(field)).then(|| field.to_string()))
                .collect(),
        );
    }

    let kinds: Vec<ColumnKind> = (0..columns.len())
        .map(|col| infer_kind(raw.iter().filter_map(|row| row[col].as_deref())))
        .collect();

    let mut table = Table::new(columns);
    table.rows = raw
        .into_iter()
        .map(|row| {
            row.into_iter()
                .zip(&kinds)
                .map(|(field, kind)| match field {
                    Some(text) => kind.parse(&text),
                    None => CellValue::Null,
                })
                .collect()
        })
        .collect();

    promote_int_columns(&mut table);
    Ok(table)
}

fn is_na(field: &str) -> bool {
    NA_TOKENS.contains(&field)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ColumnKind {
    Integer,
    Float,
    Bool,
    Text,
}

impl ColumnKind {
    fn parse(self, s: &str) -> CellValue {
        let parsed = match self {
            ColumnKind::Integer => s.trim().parse::<i64>().ok().map(CellValue::Integer),
            ColumnKind::Float => s.trim().parse::<f64>().ok().map(CellValue::Float),
            ColumnKind::Bool => parse_bool(s).map(CellValue::Bool),
            ColumnKind::Text => None,
        };
        parsed.unwrap_or_else(|| CellValue::Text(s.to_string()))
    }
}

fn infer_kind<'a>(values: impl Iterator<Item = &'a str> + Clone) -> ColumnKind {
    if values.clone().all(|v| v.trim().parse::<i64>().is_ok()) {
        ColumnKind::Integer
    } else if values.clone().all(|v| v.trim().parse::<f64>().is_ok()) {
        ColumnKind::Float
    } else if values.clone().all(|v| parse_bool(v).is_some()) {
        ColumnKind::Bool
    } else {
        ColumnKind::Text
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s {
        "True" | "true" | "TRUE" => Some(true),
        "False" | "false" | "FALSE" => Some(false),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Subject_ID": "S1.csv", "RQ": 0.85, "VO2": 0.30, "VCO2": 0.26, "GT_BGL": 90 },
///   ...
/// ]
/// ```
///
/// Columns are ordered by first appearance; a key absent from a record is null.
fn load_json(path: &Path) -> Result<Table> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut columns: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !columns.contains(key) {
                columns.push(key.clone());
            }
        }
    }

    let mut table = Table::new(columns);
    for rec in records {
        let row = table
            .columns
            .iter()
            .map(|col| rec.get(col).map(json_to_cell).unwrap_or(CellValue::Null))
            .collect();
        table.rows.push(row);
    }

    promote_int_columns(&mut table);
    Ok(table)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

/// An integer column that also holds floats or nulls becomes all-float,
/// as a pandas int64 column turns float64 once it holds a NaN.
fn promote_int_columns(table: &mut Table) {
    for col in 0..table.columns.len() {
        let promote = table
            .rows
            .iter()
            .any(|row| matches!(row[col], CellValue::Float(_) | CellValue::Null));
        if !promote {
            continue;
        }
        for row in &mut table.rows {
            if let CellValue::Integer(i) = row[col] {
                row[col] = CellValue::Float(i as f64);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat scalar columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Columns of other Arrow types
/// (timestamps, dates, decimals, dictionaries) keep their values as text.
fn load_parquet(path: &Path) -> Result<Table> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let columns: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut table = Table::new(columns);

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        if batch.num_columns() != table.columns.len() {
            bail!(
                "parquet batch has {} columns, schema has {}",
                batch.num_columns(),
                table.columns.len()
            );
        }
        for row in 0..batch.num_rows() {
            let cells = batch
                .columns()
                .iter()
                .map(|col| extract_cell(col, row))
                .collect::<Result<Vec<_>>>()
                .with_context(|| format!("parquet row {}", table.rows.len()))?;
            table.rows.push(cells);
        }
    }

    promote_int_columns(&mut table);
    Ok(table)
}

/// Extract a single cell from an Arrow column at a given row.
fn extract_cell(col: &Arc<dyn Array>, row: usize) -> Result<CellValue> {
    if col.is_null(row) {
        return Ok(CellValue::Null);
    }
    let cell = match col.data_type() {
        DataType::Utf8 => CellValue::Text(col.as_string::<i32>().value(row).to_string()),
        DataType::LargeUtf8 => CellValue::Text(col.as_string::<i64>().value(row).to_string()),
        DataType::Int8 => CellValue::Integer(col.as_primitive::<Int8Type>().value(row) as i64),
        DataType::Int16 => CellValue::Integer(col.as_primitive::<Int16Type>().value(row) as i64),
        DataType::Int32 => CellValue::Integer(col.as_primitive::<Int32Type>().value(row) as i64),
        DataType::Int64 => CellValue::Integer(col.as_primitive::<Int64Type>().value(row)),
        DataType::UInt8 => CellValue::Integer(col.as_primitive::<UInt8Type>().value(row) as i64),
        DataType::UInt16 => CellValue::Integer(col.as_primitive::<UInt16Type>().value(row) as i64),
        DataType::UInt32 => CellValue::Integer(col.as_primitive::<UInt32Type>().value(row) as i64),
        DataType::UInt64 => {
            let v = col.as_primitive::<UInt64Type>().value(row);
            i64::try_from(v)
                .map(CellValue::Integer)
                .unwrap_or(CellValue::Float(v as f64))
        }
        DataType::Float32 => {
            let v = col.as_primitive::<Float32Type>().value(row) as f64;
            if v.is_nan() { CellValue::Null } else { CellValue::Float(v) }
        }
        DataType::Float64 => {
            // Pandas stores missing floats as NaN rather than a null slot.
            let v = col.as_primitive::<Float64Type>().value(row);
            if v.is_nan() { CellValue::Null } else { CellValue::Float(v) }
        }
        DataType::Boolean => CellValue::Bool(col.as_boolean().value(row)),
        _ => {
            let formatter = ArrayFormatter::try_new(col.as_ref(), &FormatOptions::default())
                .with_context(|| format!("formatting {} column", col.data_type()))?;
            CellValue::Text(formatter.value(row).to_string())
        }
    };
    Ok(cell)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, TimestampSecondArray};
    use arrow::datatypes::{Field, Schema, TimeUnit};
    use arrow::record_batch::RecordBatch;
    use parquet::arrow::ArrowWriter;

    fn write_tmp(name: &str, contents: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(name);
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        (dir, path)
    }

    #[test]
    fn csv_columns_get_one_type_each() {
        let (_dir, path) = write_tmp(
            "in.csv",
            "Subject_ID,RQ,GT_BGL,flag\nS1.csv,0.85,90,true\nS2.csv,1,NA,false\n",
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["Subject_ID", "RQ", "GT_BGL", "flag"]);
        assert_eq!(table.rows[0][0], CellValue::Text("S1.csv".into()));
        // "1" shares a column with "0.85", so both are floats.
        assert_eq!(table.rows[1][1], CellValue::Float(1.0));
        // An NA turns the integer column into floats.
        assert_eq!(table.rows[0][2], CellValue::Float(90.0));
        assert_eq!(table.rows[1][2], CellValue::Null);
        assert_eq!(table.rows[1][3], CellValue::Bool(false));
    }

    #[test]
    fn csv_integer_column_without_nulls_stays_integer() {
        let (_dir, path) = write_tmp("in.csv", "GT_BGL\n90\n0\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0][0], CellValue::Integer(90));
        assert_eq!(table.rows[0][0].to_string(), "90");
    }

    #[test]
    fn csv_text_in_numeric_column_keeps_column_as_text() {
        let (_dir, path) = write_tmp("in.csv", "RQ\n0.8\nabc\n");
        let table = load_table(&path).unwrap();
        assert_eq!(table.rows[0][0], CellValue::Text("0.8".into()));
    }

    #[test]
    fn json_records_fill_missing_keys_with_null() {
        let (_dir, path) = write_tmp(
            "in.json",
            r#"[{"ticks": 1, "co2_concentration": 400.5}, {"ticks": 2.5}]"#,
        );
        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["ticks", "co2_concentration"]);
        assert_eq!(table.rows[0][0], CellValue::Float(1.0));
        assert_eq!(table.rows[1][1], CellValue::Null);
    }

    fn write_parquet(path: &std::path::Path, batch: &RecordBatch) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = ArrowWriter::try_new(file, batch.schema(), None).unwrap();
        writer.write(batch).unwrap();
        writer.close().unwrap();
    }

    #[test]
    fn parquet_timestamp_column_keeps_its_value() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("in.parquet");
        let schema = Arc::new(Schema::new(vec![
            Field::new("RQ", DataType::Float64, false),
            Field::new("GT_BGL", DataType::Int64, true),
            Field::new("Measured", DataType::Timestamp(TimeUnit::Second, None), false),
        ]));
        let batch = RecordBatch::try_new(
            schema,
            vec![
                Arc::new(Float64Array::from(vec![0.85, 0.9])),
                Arc::new(Int64Array::from(vec![Some(90), None])),
                Arc::new(TimestampSecondArray::from(vec![1_700_000_000, 1_700_000_060])),
            ],
        )
        .unwrap();
        write_parquet(&path, &batch);

        let table = load_table(&path).unwrap();
        assert_eq!(table.columns, vec!["RQ", "GT_BGL", "Measured"]);
        assert_eq!(table.rows[0][0], CellValue::Float(0.85));
        assert_eq!(table.rows[0][1], CellValue::Float(90.0));
        assert_eq!(table.rows[1][1], CellValue::Null);
        match &table.rows[0][2] {
            CellValue::Text(s) => {
                assert!(s.starts_with("2023-11-14T22:13:20"), "got {s}");
            }
            other => panic!("expected text, got {other:?}"),
        }
        match &table.rows[1][2] {
            CellValue::Text(s) => assert!(s.starts_with("2023-11-14T22:14:20"), "got {s}"),
            other => panic!("expected text, got {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_unsupported() {
        let (_dir, path) = write_tmp("in.xlsx", "whatever");
        let err = load_table(&path).unwrap_err();
        assert_eq!(
            err.downcast_ref::<AnalysisError>(),
            Some(&AnalysisError::UnsupportedFormat(".xlsx".into()))
        );
    }
}
