//! Keyword patterns for Brazilian tax documents.
//!
//! All patterns are matched against lower-cased text.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Text report lines
    pub static ref TOTAL_LINE: Regex = Regex::new(r"total").unwrap();

    pub static ref SERVICES_SUBTOTAL: Regex = Regex::new(r"serviços").unwrap();

    pub static ref FINAL_TAX_LINE: Regex = Regex::new(
        r"valor final do imposto|imposto a recolher"
    ).unwrap();

    pub static ref RATE_LINE: Regex = Regex::new(r"alíquota|%").unwrap();

    pub static ref WITHHELD_LINE: Regex = Regex::new(r"valor retido").unwrap();

    // Spreadsheet headers
    pub static ref REVENUE_HEADER: Regex = Regex::new(r"total|valor").unwrap();

    pub static ref TAX_HEADER: Regex = Regex::new(r"imposto|tributo").unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_patterns() {
        assert!(TOTAL_LINE.is_match("total geral;2.500,00"));
        assert!(SERVICES_SUBTOTAL.is_match("total serviços;100,00"));
        assert!(FINAL_TAX_LINE.is_match("valor final do imposto;1.029,92"));
        assert!(FINAL_TAX_LINE.is_match("imposto a recolher: 10,00"));
        assert!(RATE_LINE.is_match("alíquota;3"));
        assert!(RATE_LINE.is_match("iss 5%;50,00"));
        assert!(!RATE_LINE.is_match("aliquota;3"));
        assert!(WITHHELD_LINE.is_match("valor retido;100,00"));
    }

    #[test]
    fn test_header_patterns() {
        assert!(REVENUE_HEADER.is_match("valor total"));
        assert!(REVENUE_HEADER.is_match("subtotal"));
        assert!(!REVENUE_HEADER.is_match("cliente"));
        assert!(TAX_HEADER.is_match("imposto devido"));
        assert!(TAX_HEADER.is_match("tributos federais"));
    }
}
