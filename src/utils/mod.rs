pub mod decimal_serde;

use log::error;
use rust_decimal::Decimal;
use std::str::FromStr;

/// Parses a decimal stored as TEXT in the database.
///
/// Malformed values are logged and read as zero rather than poisoning the
/// whole row; they can only appear through external edits of the database.
pub fn parse_decimal(value: &str, field_name: &str) -> Decimal {
    match Decimal::from_str(value) {
        Ok(d) => d,
        Err(e) => {
            error!("Failed to parse {} '{}' as Decimal: {}", field_name, value, e);
            Decimal::ZERO
        }
    }
}
