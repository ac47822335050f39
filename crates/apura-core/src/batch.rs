//! Batch aggregation of documents into one record table.

use std::thread;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::document::encoding_for_label;
use crate::error::{ExtractionError, SkipKind};
use crate::extract::{
    DocumentExtractor, DocumentFormat, SpreadsheetExtractor, TextReportExtractor,
    XmlInvoiceExtractor,
};
use crate::models::config::ApuraConfig;
use crate::models::record::{FileDescriptor, FinancialRecord, RecordTable};

/// A file that produced no record, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub name: String,
    pub kind: SkipKind,
    pub reason: String,
}

/// Outcome of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    /// One row per successfully extracted file, in input order.
    pub table: RecordTable,

    /// Files that were skipped, in input order.
    pub skipped: Vec<SkippedFile>,
}

impl BatchReport {
    /// Skips other than unsupported formats.
    pub fn failures(&self) -> impl Iterator<Item = &SkippedFile> {
        self.skipped
            .iter()
            .filter(|s| s.kind != SkipKind::Unsupported)
    }
}

type Outcome = std::result::Result<FinancialRecord, SkippedFile>;

/// Routes each file to its extractor and collects the results.
pub struct RecordAggregator {
    xml: XmlInvoiceExtractor,
    spreadsheet: SpreadsheetExtractor,
    text: TextReportExtractor,
    workers: usize,
}

impl RecordAggregator {
    pub fn new(config: &ApuraConfig) -> Self {
        let fallback = encoding_for_label(&config.extraction.fallback_encoding);
        Self {
            xml: XmlInvoiceExtractor::new(),
            spreadsheet: SpreadsheetExtractor::new(),
            text: TextReportExtractor::new().with_fallback_encoding(fallback),
            workers: config.batch.workers.max(1),
        }
    }

    /// Set the number of worker threads. Zero is treated as one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// The extractor registered for `format`, if any.
    fn extractor(&self, format: DocumentFormat) -> Option<&dyn DocumentExtractor> {
        let extractors: [&dyn DocumentExtractor; 3] = [&self.xml, &self.spreadsheet, &self.text];
        extractors.into_iter().find(|e| e.format() == format)
    }

    /// Process every file, in order.
    pub fn process(&self, files: &[FileDescriptor]) -> BatchReport {
        self.process_with(files, |_| {})
    }

    /// Process every file, calling `observer` once per finished file.
    pub fn process_with<F>(&self, files: &[FileDescriptor], observer: F) -> BatchReport
    where
        F: Fn(&FileDescriptor) + Sync,
    {
        let outcomes = if self.workers > 1 && files.len() > 1 {
            self.run_parallel(files, &observer)
        } else {
            files
                .iter()
                .map(|file| {
                    let outcome = self.process_file(file);
                    observer(file);
                    outcome
                })
                .collect()
        };

        let mut report = BatchReport::default();
        for outcome in outcomes {
            match outcome {
                Ok(record) => report.table.push(record),
                Err(skipped) => report.skipped.push(skipped),
            }
        }

        info!(
            "Processed {} of {} files ({} skipped)",
            report.table.len(),
            files.len(),
            report.skipped.len()
        );
        report
    }

    fn run_parallel<F>(&self, files: &[FileDescriptor], observer: &F) -> Vec<Outcome>
    where
        F: Fn(&FileDescriptor) + Sync,
    {
        let chunk_size = files.len().div_ceil(self.workers);
        let mut slots: Vec<Option<Outcome>> = vec![None; files.len()];
        debug!(
            "Processing {} files on {} workers",
            files.len(),
            self.workers
        );

        thread::scope(|scope| {
            for (chunk, out) in files.chunks(chunk_size).zip(slots.chunks_mut(chunk_size)) {
                scope.spawn(move || {
                    for (file, slot) in chunk.iter().zip(out.iter_mut()) {
                        *slot = Some(self.process_file(file));
                        observer(file);
                    }
                });
            }
        });

        slots
            .into_iter()
            .zip(files)
            .map(|(slot, file)| {
                slot.unwrap_or_else(|| {
                    Err(SkippedFile {
                        name: file.name.clone(),
                        kind: SkipKind::Structural,
                        reason: "worker did not finish".to_string(),
                    })
                })
            })
            .collect()
    }

    /// Extract one file into a record or a skip entry.
    pub fn process_file(&self, file: &FileDescriptor) -> Outcome {
        match self.extract(file) {
            Ok(record) => {
                debug!("Extracted {}", file.name);
                Ok(record)
            }
            Err(e) => {
                let kind = e.skip_kind();
                if kind == SkipKind::Unsupported {
                    debug!("Skipping {}: {}", file.name, e);
                } else {
                    warn!("Skipping {}: {}", file.name, e);
                }
                Err(SkippedFile {
                    name: file.name.clone(),
                    kind,
                    reason: e.to_string(),
                })
            }
        }
    }

    fn extract(&self, file: &FileDescriptor) -> Result<FinancialRecord, ExtractionError> {
        let format = DocumentFormat::classify(&file.name);
        if !format.is_supported() {
            return Err(ExtractionError::UnsupportedFormat(file.name.clone()));
        }
        let extractor = self
            .extractor(format)
            .ok_or_else(|| ExtractionError::UnsupportedFormat(file.name.clone()))?;

        if !file.local_path.exists() {
            return Err(ExtractionError::SourceUnavailable(file.local_path.clone()));
        }

        let figures = extractor.extract_path(&file.local_path)?;
        Ok(FinancialRecord::new(file.name.clone(), figures))
    }
}

impl Default for RecordAggregator {
    fn default() -> Self {
        Self::new(&ApuraConfig::default())
    }
}
