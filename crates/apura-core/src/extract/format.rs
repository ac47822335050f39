//! File format classification by extension.

use serde::Serialize;

/// Document family a file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentFormat {
    /// NF-e style XML invoice.
    StructuredInvoice,
    /// Excel-like workbook.
    Spreadsheet,
    /// `;`-delimited text report.
    UnstructuredText,
    /// Anything else, skipped silently.
    Unsupported,
}

impl DocumentFormat {
    /// Classify a file name by its case-insensitive extension.
    pub fn classify(file_name: &str) -> Self {
        let name = file_name.to_lowercase();

        if name.ends_with(".xml") {
            DocumentFormat::StructuredInvoice
        } else if name.ends_with(".xlsx") || name.ends_with(".xls") {
            DocumentFormat::Spreadsheet
        } else if name.ends_with(".csv") {
            DocumentFormat::UnstructuredText
        } else {
            DocumentFormat::Unsupported
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, DocumentFormat::Unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(DocumentFormat::classify("nota.xml"), DocumentFormat::StructuredInvoice);
        assert_eq!(DocumentFormat::classify("NOTA.XML"), DocumentFormat::StructuredInvoice);
        assert_eq!(DocumentFormat::classify("faturas.xlsx"), DocumentFormat::Spreadsheet);
        assert_eq!(DocumentFormat::classify("antigo.XLS"), DocumentFormat::Spreadsheet);
        assert_eq!(DocumentFormat::classify("apuracao.csv"), DocumentFormat::UnstructuredText);
    }

    #[test]
    fn test_unsupported() {
        for name in ["contrato.docx", "scan.pdf", "README", "xml", "notas.xml.bak"] {
            let format = DocumentFormat::classify(name);
            assert_eq!(format, DocumentFormat::Unsupported, "{name}");
            assert!(!format.is_supported());
        }
    }
}
