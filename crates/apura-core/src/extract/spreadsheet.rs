//! Header-keyword extraction from workbooks.

use std::path::Path;

use regex::Regex;

use crate::document::{Column, Sheet};
use crate::models::record::Financials;

use super::rules::patterns::{REVENUE_HEADER, TAX_HEADER};
use super::{DocumentExtractor, DocumentFormat, Result};

/// Extractor summing the first revenue-like and tax-like columns.
pub struct SpreadsheetExtractor;

impl SpreadsheetExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract figures from an in-memory sheet.
    pub fn extract_sheet(&self, sheet: &Sheet) -> Financials {
        let headers: Vec<String> = sheet
            .columns
            .iter()
            .map(|c| c.header.to_lowercase())
            .collect();

        let revenue = first_match(sheet, &headers, &REVENUE_HEADER)
            .map(Column::sum)
            .unwrap_or(0.0);
        let total_tax = first_match(sheet, &headers, &TAX_HEADER)
            .map(Column::sum)
            .unwrap_or(0.0);

        Financials {
            revenue,
            total_tax,
            tax_rate: 0.0,
            // Sheets carry no separate calculation base
            tax_base: revenue,
            retentions: 0.0,
            net_value: revenue - total_tax,
        }
    }
}

impl Default for SpreadsheetExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for SpreadsheetExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Spreadsheet
    }

    fn extract_path(&self, path: &Path) -> Result<Financials> {
        let sheet = Sheet::open(path)?;
        Ok(self.extract_sheet(&sheet))
    }
}

/// Leftmost column whose lower-cased header matches.
fn first_match<'a>(sheet: &'a Sheet, headers: &[String], pattern: &Regex) -> Option<&'a Column> {
    sheet
        .columns
        .iter()
        .zip(headers)
        .find(|(_, header)| pattern.is_match(header))
        .map(|(column, _)| column)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CellValue;
    use pretty_assertions::assert_eq;

    fn column(header: &str, values: &[f64]) -> Column {
        Column::new(header, values.iter().copied().map(CellValue::from).collect())
    }

    #[test]
    fn test_revenue_and_tax_columns() {
        let sheet = Sheet::new(vec![
            Column::new("Cliente", vec!["ACME".into(), "Beta".into()]),
            column("Valor Total", &[300.0, 200.0]),
            column("Imposto Devido", &[30.0, 20.0]),
        ]);

        let figures = SpreadsheetExtractor::new().extract_sheet(&sheet);
        assert_eq!(
            figures,
            Financials {
                revenue: 500.0,
                total_tax: 50.0,
                tax_rate: 0.0,
                tax_base: 500.0,
                retentions: 0.0,
                net_value: 450.0,
            }
        );
    }

    #[test]
    fn test_first_matching_column_wins() {
        let sheet = Sheet::new(vec![
            column("Valor Unitário", &[10.0, 10.0]),
            column("TOTAL", &[1000.0]),
            column("Tributos", &[1.0]),
            column("Imposto Retido", &[99.0]),
        ]);

        let figures = SpreadsheetExtractor::new().extract_sheet(&sheet);
        assert_eq!(figures.revenue, 20.0);
        assert_eq!(figures.total_tax, 1.0);
        assert_eq!(figures.net_value, 19.0);
    }

    #[test]
    fn test_no_matching_columns() {
        let sheet = Sheet::new(vec![column("Quantidade", &[3.0])]);
        let figures = SpreadsheetExtractor::new().extract_sheet(&sheet);
        assert_eq!(figures, Financials::default());
    }

    #[test]
    fn test_text_cells_use_locale() {
        let sheet = Sheet::new(vec![Column::new(
            "valor",
            vec!["1.200,00".into(), "300,00".into()],
        )]);
        assert_eq!(SpreadsheetExtractor::new().extract_sheet(&sheet).revenue, 1500.0);
    }
}
