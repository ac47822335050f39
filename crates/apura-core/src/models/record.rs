//! Batch input descriptors and the fixed-schema record table.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

/// A file handed over by the source provider, already readable on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Display name, used to tag the resulting record.
    pub name: String,

    /// Local path to the file bytes.
    pub local_path: PathBuf,

    /// Opaque metadata carried through from the provider.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl FileDescriptor {
    pub fn new(name: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            local_path: local_path.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Describe a local file, naming it after its final path component.
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::new(name, path)
    }

    /// Attach a passthrough metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// The six numeric figures extracted from one document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Financials {
    pub revenue: f64,
    pub total_tax: f64,
    /// Always `0.0`: no extractor derives a blended rate.
    pub tax_rate: f64,
    pub tax_base: f64,
    pub retentions: f64,
    pub net_value: f64,
}

impl Financials {
    /// Replace undefined (NaN) figures with zero.
    pub fn filled(self) -> Self {
        let fill = |v: f64| if v.is_nan() { 0.0 } else { v };
        Self {
            revenue: fill(self.revenue),
            total_tax: fill(self.total_tax),
            tax_rate: fill(self.tax_rate),
            tax_base: fill(self.tax_base),
            retentions: fill(self.retentions),
            net_value: fill(self.net_value),
        }
    }
}

impl std::ops::Add for Financials {
    type Output = Financials;

    fn add(self, rhs: Financials) -> Financials {
        Financials {
            revenue: self.revenue + rhs.revenue,
            total_tax: self.total_tax + rhs.total_tax,
            tax_rate: self.tax_rate + rhs.tax_rate,
            tax_base: self.tax_base + rhs.tax_base,
            retentions: self.retentions + rhs.retentions,
            net_value: self.net_value + rhs.net_value,
        }
    }
}

/// One row of the output table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialRecord {
    #[serde(rename = "FileName")]
    pub file_name: String,
    #[serde(rename = "Revenue")]
    pub revenue: f64,
    #[serde(rename = "TotalTax")]
    pub total_tax: f64,
    #[serde(rename = "TaxRate")]
    pub tax_rate: f64,
    #[serde(rename = "TaxBase")]
    pub tax_base: f64,
    #[serde(rename = "Retentions")]
    pub retentions: f64,
    #[serde(rename = "NetValue")]
    pub net_value: f64,
}

impl FinancialRecord {
    /// Tag extracted figures with the originating file name.
    pub fn new(file_name: impl Into<String>, figures: Financials) -> Self {
        let figures = figures.filled();
        Self {
            file_name: file_name.into(),
            revenue: figures.revenue,
            total_tax: figures.total_tax,
            tax_rate: figures.tax_rate,
            tax_base: figures.tax_base,
            retentions: figures.retentions,
            net_value: figures.net_value,
        }
    }

    /// Replace undefined (NaN) figures with zero, in place.
    pub fn fill_undefined(&mut self) {
        for value in [
            &mut self.revenue,
            &mut self.total_tax,
            &mut self.tax_rate,
            &mut self.tax_base,
            &mut self.retentions,
            &mut self.net_value,
        ] {
            if value.is_nan() {
                *value = 0.0;
            }
        }
    }

    /// The numeric part of the record.
    pub fn financials(&self) -> Financials {
        Financials {
            revenue: self.revenue,
            total_tax: self.total_tax,
            tax_rate: self.tax_rate,
            tax_base: self.tax_base,
            retentions: self.retentions,
            net_value: self.net_value,
        }
    }

    /// Render the seven cells in column order as plain decimal text.
    pub fn cells(&self) -> [String; 7] {
        [
            self.file_name.clone(),
            self.revenue.to_string(),
            self.total_tax.to_string(),
            self.tax_rate.to_string(),
            self.tax_base.to_string(),
            self.retentions.to_string(),
            self.net_value.to_string(),
        ]
    }
}

/// Ordered records of one batch, always exposing the full column set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    rows: Vec<FinancialRecord>,
}

impl RecordTable {
    /// Column names in output order.
    pub const COLUMNS: [&'static str; 7] = [
        "FileName",
        "Revenue",
        "TotalTax",
        "TaxRate",
        "TaxBase",
        "Retentions",
        "NetValue",
    ];

    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record, filling undefined figures with zero.
    pub fn push(&mut self, mut record: FinancialRecord) {
        record.fill_undefined();
        self.rows.push(record);
    }

    pub fn header(&self) -> &'static [&'static str; 7] {
        &Self::COLUMNS
    }

    pub fn rows(&self) -> &[FinancialRecord] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FinancialRecord> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column sums over every row.
    pub fn totals(&self) -> Financials {
        self.rows
            .iter()
            .map(FinancialRecord::financials)
            .fold(Financials::default(), |acc, f| acc + f)
    }
}

impl FromIterator<FinancialRecord> for RecordTable {
    fn from_iter<I: IntoIterator<Item = FinancialRecord>>(iter: I) -> Self {
        let mut table = RecordTable::new();
        for record in iter {
            table.push(record);
        }
        table
    }
}

impl<'a> IntoIterator for &'a RecordTable {
    type Item = &'a FinancialRecord;
    type IntoIter = std::slice::Iter<'a, FinancialRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

impl Serialize for RecordTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RecordTable", 2)?;
        state.serialize_field("columns", &Self::COLUMNS)?;
        state.serialize_field("rows", &self.rows)?;
        state.end()
    }
}
