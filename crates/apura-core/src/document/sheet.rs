//! Tabular sheets read from workbooks.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};
use tracing::debug;

use crate::error::ExtractionError;
use crate::extract::rules::amounts::{parse_locale_amount, AmountToken};

/// A single cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Empty,
}

impl AmountToken for CellValue {
    fn to_amount(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => parse_locale_amount(s),
            CellValue::Empty => 0.0,
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Int(i) => CellValue::Number(*i as f64),
            Data::Float(f) => CellValue::Number(*f),
            Data::Bool(b) => CellValue::Number(if *b { 1.0 } else { 0.0 }),
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Empty | Data::Error(_) => CellValue::Empty,
            other => CellValue::Text(other.to_string()),
        }
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

/// A named column, values in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub header: String,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(header: impl Into<String>, values: Vec<CellValue>) -> Self {
        Self {
            header: header.into(),
            values,
        }
    }

    /// Sum of every cell read as an amount.
    pub fn sum(&self) -> f64 {
        self.values.iter().map(AmountToken::to_amount).sum()
    }
}

/// Columns of one worksheet, left to right.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Sheet {
    pub columns: Vec<Column>,
}

impl Sheet {
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Build a sheet from a cell range whose first row holds the headers.
    pub fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let Some(header_row) = rows.next() else {
            return Self::default();
        };

        let mut columns: Vec<Column> = header_row
            .iter()
            .enumerate()
            .map(|(idx, cell)| {
                let header = match cell {
                    Data::Empty => format!("unnamed: {}", idx),
                    Data::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Column::new(header, Vec::new())
            })
            .collect();

        for row in rows {
            for (idx, column) in columns.iter_mut().enumerate() {
                let value = row.get(idx).map(CellValue::from).unwrap_or(CellValue::Empty);
                column.values.push(value);
            }
        }

        Self { columns }
    }

    /// Open a workbook and read its first worksheet.
    pub fn open(path: &Path) -> Result<Self, ExtractionError> {
        let mut workbook = open_workbook_auto(path)?;
        let range = workbook
            .worksheet_range_at(0)
            .ok_or(ExtractionError::EmptyWorkbook)??;

        let sheet = Self::from_range(&range);
        debug!(
            "Read sheet with {} columns from {}",
            sheet.columns.len(),
            path.display()
        );
        Ok(sheet)
    }
}
