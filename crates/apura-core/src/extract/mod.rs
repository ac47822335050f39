//! Financial figure extraction, one extractor per document format.

pub mod format;
pub mod rules;
mod spreadsheet;
mod text;
mod xml;

pub use format::DocumentFormat;
pub use spreadsheet::SpreadsheetExtractor;
pub use text::{TextReportExtractor, TextScan};
pub use xml::XmlInvoiceExtractor;

use std::path::Path;

use crate::error::ExtractionError;
use crate::models::record::Financials;

/// Result type for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Trait for format-specific extractors.
pub trait DocumentExtractor: Send + Sync {
    /// The format this extractor reads.
    fn format(&self) -> DocumentFormat;

    /// Extract figures from a local file.
    fn extract_path(&self, path: &Path) -> Result<Financials>;
}
