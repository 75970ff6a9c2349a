use std::fmt;

use crate::error::TableError;

// ---------------------------------------------------------------------------
// CellValue – a single cell of an input table
// ---------------------------------------------------------------------------

/// Text read as a missing value, Pandas' default `na_values`.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A dynamically-typed cell value mirroring common Pandas dtypes.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

impl CellValue {
    /// Guess the type of a raw text cell (CSV field).
    ///
    /// Empty text and the usual missing-value markers (`NA`, `NULL`, `None`,
    /// ...) become [`CellValue::Null`], which is written back as an empty field.
    pub fn from_text(s: &str) -> Self {
        if MISSING_TOKENS.contains(&s) {
            return CellValue::Null;
        }
        if let Ok(i) = s.parse::<i64>() {
            return CellValue::Integer(i);
        }
        if let Ok(f) = s.parse::<f64>() {
            return CellValue::Float(f);
        }
        match s {
            "True" | "TRUE" | "true" => CellValue::Bool(true),
            "False" | "FALSE" | "false" => CellValue::Bool(false),
            _ => CellValue::String(s.to_string()),
        }
    }

    /// Try to interpret the value as an `f64` feature.
    ///
    /// Nulls map to `NaN` so an imputing preprocessor can fill them. Returns
    /// `None` for text that does not parse as a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::Null => Some(f64::NAN),
            CellValue::String(s) => s.trim().parse::<f64>().ok(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::String(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // NaN is written as an empty field, like a missing value.
            CellValue::Float(v) if v.is_nan() => Ok(()),
            // Keep a trailing ".0" on whole floats so the column stays a float column.
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(true) => write!(f, "True"),
            CellValue::Bool(false) => write!(f, "False"),
            CellValue::Null => Ok(()),
        }
    }
}

// ---------------------------------------------------------------------------
// Table – the loaded input, row oriented
// ---------------------------------------------------------------------------

/// An in-memory table: ordered column names plus rows of cells.
///
/// Every row holds exactly `columns.len()` cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table {
            columns,
            rows: Vec::new(),
        }
    }

    /// Append a row, padding with nulls (or truncating) to the table width.
    pub fn push_row(&mut self, mut row: Vec<CellValue>) {
        row.resize(self.columns.len(), CellValue::Null);
        self.rows.push(row);
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the cells of one column, top to bottom.
    pub fn column(&self, name: &str) -> Option<impl Iterator<Item = &CellValue> + '_> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(move |row| &row[idx]))
    }

    /// Turn integer columns that also hold nulls or floats into float columns,
    /// the way Pandas infers `float64` for them.
    pub fn widen_numeric_columns(&mut self) {
        for idx in 0..self.columns.len() {
            let mut has_int = false;
            let mut has_gap = false;
            let numeric = self.rows.iter().all(|row| match row[idx] {
                CellValue::Integer(_) => {
                    has_int = true;
                    true
                }
                CellValue::Float(_) | CellValue::Null => {
                    has_gap = true;
                    true
                }
                _ => false,
            });
            if !(numeric && has_int && has_gap) {
                continue;
            }
            for row in &mut self.rows {
                if let CellValue::Integer(i) = row[idx] {
                    row[idx] = CellValue::Float(i as f64);
                }
            }
        }
    }

    /// Remove a column if present. Returns whether anything was removed.
    pub fn drop_column(&mut self, name: &str) -> bool {
        let Some(idx) = self.column_index(name) else {
            return false;
        };
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.remove(idx);
        }
        true
    }

    /// Append a column at the right edge. `values` must have one entry per row.
    ///
    /// An existing column with the same name is replaced in place, matching
    /// `df[name] = values`.
    pub fn push_column(&mut self, name: &str, values: Vec<CellValue>) -> Result<(), TableError> {
        if values.len() != self.rows.len() {
            return Err(TableError::ColumnLength {
                column: name.to_string(),
                expected: self.rows.len(),
                got: values.len(),
            });
        }
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
        Ok(())
    }
}
