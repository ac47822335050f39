//! NF-e XML invoice extraction.

use std::path::Path;

use tracing::debug;

use crate::document::{read_tree, Node};
use crate::error::ExtractionError;
use crate::models::record::Financials;

use super::rules::amounts::parse_plain_amount;
use super::{DocumentExtractor, DocumentFormat, Result};

/// Where the invoice info node may live, most specific first.
const INVOICE_INFO_PATHS: [&[&str]; 2] = [&["nfeProc", "NFe", "infNFe"], &["NFe", "infNFe"]];

/// Totals node below the invoice info.
const TOTALS_PATH: [&str; 2] = ["total", "ICMSTot"];

const NET_INVOICE_VALUE: &str = "vNF";
const TOTAL_WITHHELD_TAXES: &str = "vTotTrib";
const CALCULATION_BASE: &str = "vBC";

/// ICMS, IPI, PIS and COFINS, summed when no aggregate is present.
const SUB_TAXES: [&str; 4] = ["vICMS", "vIPI", "vPIS", "vCOFINS"];

/// Extractor for NF-e invoice trees.
pub struct XmlInvoiceExtractor;

impl XmlInvoiceExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract figures from a parsed invoice tree.
    pub fn extract_tree(&self, tree: &Node) -> Result<Financials> {
        let (path, info) = tree.resolve_first(&INVOICE_INFO_PATHS).ok_or_else(|| {
            ExtractionError::MissingNode(
                INVOICE_INFO_PATHS
                    .iter()
                    .map(|p| p.join("/"))
                    .collect::<Vec<_>>()
                    .join(" or "),
            )
        })?;
        debug!("Invoice info found at {}", path.join("/"));

        let totals = info
            .resolve(&TOTALS_PATH)
            .ok_or_else(|| ExtractionError::MissingNode(TOTALS_PATH.join("/")))?;

        let revenue = read_amount(totals, NET_INVOICE_VALUE)?;

        // A zero aggregate counts as absent
        let mut total_tax = read_amount(totals, TOTAL_WITHHELD_TAXES)?;
        if total_tax == 0.0 {
            total_tax = SUB_TAXES
                .iter()
                .map(|field| read_amount(totals, field))
                .sum::<Result<f64>>()?;
        }

        let tax_base = read_amount(totals, CALCULATION_BASE)?;

        // No reliable retention field at this level
        let retentions = 0.0;

        Ok(Financials {
            revenue,
            total_tax,
            tax_rate: 0.0,
            tax_base,
            retentions,
            // Taxes are not subtracted here, unlike the other formats
            net_value: revenue - retentions,
        })
    }

    /// Parse XML bytes and extract figures.
    pub fn extract_bytes(&self, data: &[u8]) -> Result<Financials> {
        let tree = crate::document::parse_xml(data)?;
        self.extract_tree(&tree)
    }
}

impl Default for XmlInvoiceExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentExtractor for XmlInvoiceExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::StructuredInvoice
    }

    fn extract_path(&self, path: &Path) -> Result<Financials> {
        let tree = read_tree(path)?;
        self.extract_tree(&tree)
    }
}

/// Read a decimal leaf; absent or empty fields are zero.
fn read_amount(node: &Node, field: &str) -> Result<f64> {
    match node.get(field) {
        None => Ok(0.0),
        Some(Node::Leaf(text)) if text.trim().is_empty() => Ok(0.0),
        Some(Node::Leaf(text)) => {
            parse_plain_amount(text).ok_or_else(|| ExtractionError::invalid(field, text.as_str()))
        }
        Some(_) => Err(ExtractionError::invalid(field, "nested element")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn nfe(totals: &str) -> String {
        format!(
            r#"<nfeProc xmlns="http://www.portalfiscal.inf.br/nfe" versao="4.00">
                 <NFe><infNFe Id="NFe1" versao="4.00"><total><ICMSTot>{}</ICMSTot></total></infNFe></NFe>
               </nfeProc>"#,
            totals
        )
    }

    #[test]
    fn test_sub_taxes_when_aggregate_is_zero() {
        let xml = nfe(
            "<vBC>1350.00</vBC><vICMS>100.00</vICMS><vIPI>20.00</vIPI>\
             <vPIS>10.00</vPIS><vCOFINS>5.00</vCOFINS><vNF>1500.00</vNF><vTotTrib>0</vTotTrib>",
        );
        let figures = XmlInvoiceExtractor::new().extract_bytes(xml.as_bytes()).unwrap();

        assert_eq!(
            figures,
            Financials {
                revenue: 1500.0,
                total_tax: 135.0,
                tax_rate: 0.0,
                tax_base: 1350.0,
                retentions: 0.0,
                net_value: 1500.0,
            }
        );
    }

    #[test]
    fn test_sub_taxes_when_aggregate_is_absent() {
        let xml = nfe("<vICMS>100.00</vICMS><vIPI>20.00</vIPI><vPIS>10.00</vPIS><vCOFINS>5.00</vCOFINS><vNF>1500.00</vNF>");
        let figures = XmlInvoiceExtractor::new().extract_bytes(xml.as_bytes()).unwrap();
        assert_eq!(figures.total_tax, 135.0);
        assert_eq!(figures.tax_base, 0.0);
        assert_eq!(figures.net_value, 1500.0);
    }

    #[test]
    fn test_aggregate_wins_when_present() {
        let xml = nfe("<vICMS>100.00</vICMS><vNF>800.00</vNF><vTotTrib>42.50</vTotTrib>");
        let figures = XmlInvoiceExtractor::new().extract_bytes(xml.as_bytes()).unwrap();
        assert_eq!(figures.total_tax, 42.5);
    }

    #[test]
    fn test_unwrapped_invoice_path() {
        let xml = "<NFe><infNFe><total><ICMSTot><vNF>99.90</vNF><vBC>99.90</vBC></ICMSTot></total></infNFe></NFe>";
        let figures = XmlInvoiceExtractor::new().extract_bytes(xml.as_bytes()).unwrap();
        assert_eq!(figures.revenue, 99.9);
        assert_eq!(figures.tax_base, 99.9);
    }

    #[test]
    fn test_missing_invoice_info_fails() {
        let err = XmlInvoiceExtractor::new()
            .extract_bytes(b"<CTe><infCte/></CTe>")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::MissingNode(_)));
    }

    #[test]
    fn test_missing_totals_fails() {
        let err = XmlInvoiceExtractor::new()
            .extract_bytes(b"<NFe><infNFe><ide><nNF>1</nNF></ide></infNFe></NFe>")
            .unwrap_err();
        assert_eq!(err.to_string(), "missing node: total/ICMSTot");
    }

    #[test]
    fn test_malformed_amount_fails() {
        let xml = nfe("<vNF>mil reais</vNF>");
        let err = XmlInvoiceExtractor::new().extract_bytes(xml.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractionError::InvalidValue { .. }));
    }
}
