//! Custom field validators used by request DTOs

use rust_decimal::Decimal;
use validator::ValidationError;

/// Catalog prices are bounded to 0.01..=999.99
pub fn validate_price(price: &Decimal) -> Result<(), ValidationError> {
    let min = Decimal::new(1, 2);
    let max = Decimal::new(99999, 2);
    if *price < min || *price > max {
        let mut err = ValidationError::new("price_range");
        err.message = Some("Price must be between 0.01 and 999.99".into());
        return Err(err);
    }
    Ok(())
}

/// `#RRGGBB`
pub fn validate_hex_code(code: &str) -> Result<(), ValidationError> {
    let valid = code.len() == 7
        && code.starts_with('#')
        && code[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        let mut err = ValidationError::new("hex_code");
        err.message = Some("Hex code must look like #RRGGBB".into());
        return Err(err);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_bounds_are_inclusive() {
        assert!(validate_price(&Decimal::new(1, 2)).is_ok());
        assert!(validate_price(&Decimal::new(99999, 2)).is_ok());
        assert!(validate_price(&Decimal::ZERO).is_err());
        assert!(validate_price(&Decimal::from(1000)).is_err());
    }

    #[test]
    fn hex_code_format() {
        assert!(validate_hex_code("#A1b2C3").is_ok());
        assert!(validate_hex_code("A1B2C3").is_err());
        assert!(validate_hex_code("#GGGGGG").is_err());
        assert!(validate_hex_code("#FFF").is_err());
    }
}
