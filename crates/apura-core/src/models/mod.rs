//! Data models.

pub mod config;
pub mod record;

pub use config::ApuraConfig;
pub use record::{FileDescriptor, FinancialRecord, Financials, RecordTable};
