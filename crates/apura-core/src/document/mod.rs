//! Document readers: XML trees, workbook sheets and text reports.

pub mod sheet;
pub mod text;
pub mod tree;

pub use sheet::{CellValue, Column, Sheet};
pub use text::{encoding_for_label, TextReport};
pub use tree::{parse_xml, Node};

use std::path::Path;

use crate::error::ExtractionError;

/// Read an XML file into a document tree.
pub fn read_tree(path: &Path) -> Result<Node, ExtractionError> {
    let data = std::fs::read(path)?;
    parse_xml(&data)
}
