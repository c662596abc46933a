//! Amount parsing and rendering for chat replies.

use crate::domain::DomainError;

/// Coerce a chat argument into an amount. Accepts anything `f64` parses, except non-finite values.
pub fn parse_amount(raw: &str) -> Result<f64, DomainError> {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(DomainError::InvalidAmount(raw.to_string())),
    }
}

/// Renders the stored value as-is: `300`, `12.5`, `0.001`. Never `-0`.
pub fn format_amount(amount: f64) -> String {
    if amount == 0.0 {
        return "0".to_string();
    }
    amount.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("500").unwrap(), 500.0);
        assert_eq!(parse_amount("12.75").unwrap(), 12.75);
        assert_eq!(parse_amount("-3").unwrap(), -3.0);
        assert!(matches!(
            parse_amount("abc"),
            Err(DomainError::InvalidAmount(s)) if s == "abc"
        ));
        assert!(parse_amount("inf").is_err());
        assert!(parse_amount("NaN").is_err());
        assert!(parse_amount("12,5").is_err());
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(300.0), "300");
        assert_eq!(format_amount(9000.0), "9000");
        assert_eq!(format_amount(12.5), "12.5");
        assert_eq!(format_amount(0.001), "0.001");
        assert_eq!(format_amount(2500.25), "2500.25");
        assert_eq!(format_amount(-200.0), "-200");
        assert_eq!(format_amount(0.0), "0");
        assert_eq!(format_amount(-0.0), "0");
    }
}
