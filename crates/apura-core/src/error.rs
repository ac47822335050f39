//! Error types for the apura-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the apura library.
#[derive(Error, Debug)]
pub enum ApuraError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while turning a single document into a record.
///
/// None of these escape a batch run: the aggregator converts every one of
/// them into a skipped file with a diagnostic. Malformed numeric tokens are
/// not represented here at all, they always read as `0.0`.
#[derive(Error, Debug)]
pub enum ExtractionError {
    /// The file extension maps to no known document format.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// The file is not present at its local path.
    #[error("file not found locally: {}", .0.display())]
    SourceUnavailable(PathBuf),

    /// None of the candidate node paths resolved in the document tree.
    #[error("missing node: {0}")]
    MissingNode(String),

    /// A field holds a value of the wrong shape or an unparseable amount.
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// The workbook contains no worksheet to read.
    #[error("workbook has no worksheets")]
    EmptyWorkbook,

    /// The XML document is not well formed.
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// The workbook could not be opened or read.
    #[error("unreadable spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Reading the file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of why a file produced no record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipKind {
    /// Unknown extension, skipped silently.
    Unsupported,
    /// Expected structure absent or malformed.
    Structural,
    /// Nothing readable at the local path.
    SourceUnavailable,
}

impl ExtractionError {
    /// Map this error onto the skip taxonomy.
    pub fn skip_kind(&self) -> SkipKind {
        match self {
            ExtractionError::UnsupportedFormat(_) => SkipKind::Unsupported,
            ExtractionError::SourceUnavailable(_) => SkipKind::SourceUnavailable,
            ExtractionError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                SkipKind::SourceUnavailable
            }
            _ => SkipKind::Structural,
        }
    }

    pub(crate) fn invalid(field: impl Into<String>, value: impl Into<String>) -> Self {
        ExtractionError::InvalidValue {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type for the apura library.
pub type Result<T> = std::result::Result<T, ApuraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skip_kind_mapping() {
        assert_eq!(
            ExtractionError::UnsupportedFormat("docx".into()).skip_kind(),
            SkipKind::Unsupported
        );
        assert_eq!(
            ExtractionError::SourceUnavailable(PathBuf::from("a.xml")).skip_kind(),
            SkipKind::SourceUnavailable
        );
        assert_eq!(
            ExtractionError::MissingNode("NFe/infNFe".into()).skip_kind(),
            SkipKind::Structural
        );
        let not_found = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert_eq!(
            ExtractionError::Io(not_found).skip_kind(),
            SkipKind::SourceUnavailable
        );
    }

    #[test]
    fn test_error_messages() {
        let err = ExtractionError::invalid("vNF", "abc");
        assert_eq!(err.to_string(), "invalid value for vNF: abc");
        assert_eq!(
            ExtractionError::SourceUnavailable(PathBuf::from("in/a.csv")).to_string(),
            "file not found locally: in/a.csv"
        );
    }
}
