//! Keyword heuristics for `;`-delimited text reports.

use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};

use crate::document::TextReport;
use crate::models::record::Financials;

use super::rules::amounts::parse_locale_amount;
use super::rules::patterns::{
    FINAL_TAX_LINE, RATE_LINE, SERVICES_SUBTOTAL, TOTAL_LINE, WITHHELD_LINE,
};
use super::{DocumentExtractor, DocumentFormat, Result};

/// Running state of a top-to-bottom scan over report lines.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TextScan {
    pub revenue: f64,
    pub total_tax: f64,
    pub tax_base: f64,
    pub retentions: f64,
}

impl TextScan {
    /// Fold one line into the scan.
    pub fn apply(mut self, line: &str) -> Self {
        let lower = line.to_lowercase();
        let values: Vec<f64> = line.split(';').map(parse_locale_amount).collect();
        let first_positive = || values.iter().copied().find(|v| *v > 0.0);

        // "Total Serviços" repeats a subtotal, never count it
        if TOTAL_LINE.is_match(&lower) && !SERVICES_SUBTOTAL.is_match(&lower) {
            let line_max = values.iter().copied().filter(|v| *v > 0.0).reduce(f64::max);
            if let Some(max) = line_max {
                if max > self.revenue {
                    self.revenue = max;
                    self.tax_base = max;
                }
            }
        }

        if FINAL_TAX_LINE.is_match(&lower) {
            if let Some(tax) = first_positive() {
                self.total_tax = tax;
            }
        }

        // Rate lines only fill in a tax nothing else has set
        if RATE_LINE.is_match(&lower) && self.total_tax == 0.0 {
            if let Some(tax) = first_positive() {
                self.total_tax = tax;
            }
        }

        if WITHHELD_LINE.is_match(&lower) {
            if let Some(retained) = first_positive() {
                self.retentions = retained;
            }
        }

        self
    }

    pub fn finish(self) -> Financials {
        Financials {
            revenue: self.revenue,
            total_tax: self.total_tax,
            tax_rate: 0.0,
            tax_base: self.tax_base,
            retentions: self.retentions,
            net_value: self.revenue - self.total_tax - self.retentions,
        }
    }
}

/// Extractor for text reports.
pub struct TextReportExtractor {
    fallback: &'static Encoding,
}

impl TextReportExtractor {
    pub fn new() -> Self {
        Self {
            fallback: WINDOWS_1252,
        }
    }

    /// Set the encoding used for reports that are not UTF-8.
    pub fn with_fallback_encoding(mut self, encoding: &'static Encoding) -> Self {
        self.fallback = encoding;
        self
    }

    /// Extract figures from lines, in order.
    pub fn extract_lines<'a, I>(&self, lines: I) -> Financials
    where
        I: IntoIterator<Item = &'a str>,
    {
        lines
            .into_iter()
            .fold(TextScan::default(), TextScan::apply)
            .finish()
    }

    pub fn extract_report(&self, report: &TextReport) -> Financials {
        self.extract_lines(report.iter())
    }
}

impl Default for TextReportExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for TextReportExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::UnstructuredText
    }

    fn extract_path(&self, path: &Path) -> Result<Financials> {
        let report = TextReport::open(path, self.fallback)?;
        Ok(self.extract_report(&report))
    }
}
