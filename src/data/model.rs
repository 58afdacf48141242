use std::fmt;

// ---------------------------------------------------------------------------
// CellValue – a single cell of a loaded table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Renders a cell the way it is written back to CSV.
///
/// Floats follow Python's `repr`: shortest round-trip form, a decimal point
/// in positional notation, a signed two-digit exponent otherwise. Infinities
/// are `inf`/`-inf`, NaN and nulls are empty fields.
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{}", format_float(*v)),
            CellValue::Bool(b) => write!(f, "{}", if *b { "True" } else { "False" }),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Interpret the value as an `f64` for numeric columns.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

pub fn format_float(v: f64) -> String {
    if v.is_nan() {
        String::new()
    } else if v.is_infinite() {
        if v > 0.0 { "inf".into() } else { "-inf".into() }
    } else {
        // Debug keeps the trailing `.0` that Display drops and switches to
        // exponents at the same magnitudes as Python, but writes `1e-5`.
        let text = format!("{v:?}");
        match text.split_once('e') {
            Some((mantissa, exp)) => {
                let (sign, digits) = match exp.strip_prefix('-') {
                    Some(d) => ('-', d),
                    None => ('+', exp),
                };
                format!("{mantissa}e{sign}{digits:0>2}")
            }
            None => text,
        }
    }
}

// ---------------------------------------------------------------------------
// Table – rows × named columns, as loaded from disk
// ---------------------------------------------------------------------------

/// A loaded tabular artifact. Every row has exactly `columns.len()` cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    /// Column names in file order.
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Position of a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Typed records handed out by the validator
// ---------------------------------------------------------------------------

/// One respirometry measurement row after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Subject identifier, already cut at its first `.`.
    pub subject_id: String,
    pub rq: f64,
    pub vo2: f64,
    pub vco2: f64,
    pub gt_bgl: f64,
}

/// One plotted observation of a CO2 trace: `(ticks, co2_concentration)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: f64,
}

impl ScatterPoint {
    pub fn new(x: f64, y: f64) -> Self {
        ScatterPoint { x, y }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floats_render_like_pandas() {
        assert_eq!(CellValue::Float(90.0).to_string(), "90.0");
        assert_eq!(CellValue::Float(0.85).to_string(), "0.85");
        assert_eq!(CellValue::Float(f64::INFINITY).to_string(), "inf");
        assert_eq!(CellValue::Float(f64::NEG_INFINITY).to_string(), "-inf");
        assert_eq!(CellValue::Float(f64::NAN).to_string(), "");
        assert_eq!(CellValue::Null.to_string(), "");
    }

    #[test]
    fn exponents_render_like_python_repr() {
        assert_eq!(format_float(1e-5), "1e-05");
        assert_eq!(format_float(1.5e-7), "1.5e-07");
        assert_eq!(format_float(-2.5e-12), "-2.5e-12");
        assert_eq!(format_float(1e16), "1e+16");
        assert_eq!(format_float(1e300), "1e+300");
        assert_eq!(format_float(0.0001), "0.0001");
        assert_eq!(format_float(123456789.0), "123456789.0");
    }

    #[test]
    fn integers_are_numeric() {
        assert_eq!(CellValue::Integer(90).as_f64(), Some(90.0));
        assert_eq!(CellValue::Text("90".into()).as_f64(), None);
    }
}
