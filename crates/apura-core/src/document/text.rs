//! Line-oriented text reports.

use std::borrow::Cow;
use std::path::Path;

use encoding_rs::{Encoding, WINDOWS_1252};
use tracing::debug;

use crate::error::ExtractionError;

/// Raw lines of a text report, top to bottom.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextReport {
    pub lines: Vec<String>,
}

impl TextReport {
    /// Split decoded text into lines on `\r\n`, `\n` or a lone `\r`.
    /// Blank lines are dropped.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text
                .split(['\n', '\r'])
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Decode report bytes. UTF-8 is tried first; anything else is read
    /// with `fallback`, which never fails.
    pub fn decode(data: &[u8], fallback: &'static Encoding) -> Self {
        let text: Cow<'_, str> = match std::str::from_utf8(data) {
            Ok(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
            Err(_) => {
                debug!("Report is not UTF-8, decoding as {}", fallback.name());
                let (decoded, _, _) = fallback.decode(data);
                decoded
            }
        };
        Self::from_text(&text)
    }

    /// Read and decode a report from disk.
    pub fn open(path: &Path, fallback: &'static Encoding) -> Result<Self, ExtractionError> {
        let data = std::fs::read(path)?;
        Ok(Self::decode(&data, fallback))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }
}

/// Look up an encoding by label, defaulting to Windows-1252.
pub fn encoding_for_label(label: &str) -> &'static Encoding {
    Encoding::for_label(label.as_bytes()).unwrap_or(WINDOWS_1252)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_lines() {
        let report = TextReport::decode("\u{feff}Total Geral;2.500,00\r\nValor Retido;100,00\n".as_bytes(), WINDOWS_1252);
        assert_eq!(report.lines, vec!["Total Geral;2.500,00", "Valor Retido;100,00"]);
    }

    #[test]
    fn test_carriage_return_only_lines() {
        let report = TextReport::decode(b"Total Geral;2.500,00\rValor Retido;100,00\r", WINDOWS_1252);
        assert_eq!(report.lines, vec!["Total Geral;2.500,00", "Valor Retido;100,00"]);

        let report = TextReport::from_text("a;1\r\n\r\nb;2\nc;3");
        assert_eq!(report.lines, vec!["a;1", "b;2", "c;3"]);
    }

    #[test]
    fn test_latin1_fallback() {
        // "Total Serviços;10,00" in Windows-1252
        let bytes = b"Total Servi\xe7os;10,00";
        let report = TextReport::decode(bytes, WINDOWS_1252);
        assert_eq!(report.lines, vec!["Total Serviços;10,00"]);
    }

    #[test]
    fn test_encoding_for_label() {
        assert_eq!(encoding_for_label("latin1"), WINDOWS_1252);
        assert_eq!(encoding_for_label("utf-8"), encoding_rs::UTF_8);
        assert_eq!(encoding_for_label("nonsense"), WINDOWS_1252);
    }

    #[test]
    fn test_open_missing_file() {
        let err = TextReport::open(Path::new("/nonexistent/apura/report.csv"), WINDOWS_1252);
        assert!(err.is_err());
    }
}
