//! Rule primitives shared by the extractors.

pub mod amounts;
pub mod patterns;

pub use amounts::{parse_amount, parse_locale_amount, parse_plain_amount, AmountToken};
pub use patterns::*;
