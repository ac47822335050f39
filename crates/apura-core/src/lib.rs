//! Core library for Brazilian tax document intake.
//!
//! This crate provides:
//! - Document readers (NF-e XML trees, workbooks, text reports)
//! - Per-format extraction of revenue, taxes, base and retentions
//! - Batch aggregation into a fixed-schema record table

pub mod error;
pub mod models;
pub mod document;
pub mod extract;
pub mod batch;

pub use error::{ApuraError, ExtractionError, Result, SkipKind};
pub use models::config::ApuraConfig;
pub use models::record::{FileDescriptor, FinancialRecord, Financials, RecordTable};
pub use extract::{
    DocumentExtractor, DocumentFormat, SpreadsheetExtractor, TextReportExtractor,
    XmlInvoiceExtractor,
};
pub use batch::{BatchReport, RecordAggregator, SkippedFile};
