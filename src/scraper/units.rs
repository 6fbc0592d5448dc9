//! Conversion of styled holdings cells into plain floats.
//!
//! Schwab renders the numeric columns as display text: `"$1.2M"`,
//! `"45.3%"`, `"3.5K"`. Raw mode strips the styling back off.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot convert {0:?} to a number")]
pub struct UnitParseError(pub String);

/// Convert one styled cell to a float.
///
/// Negative values come back as 0.0: the site reports small negative
/// portfolio weights and those are clamped rather than kept.
pub fn to_float(raw: &str) -> Result<f64, UnitParseError> {
    let token = raw.trim();
    let err = || UnitParseError(raw.to_string());

    if token.is_empty() {
        return Err(err());
    }
    if token.starts_with('-') {
        return Ok(0.0);
    }

    let body = token.strip_prefix('$').unwrap_or(token);

    if let Some(pct) = body.strip_suffix('%') {
        let v: f64 = pct.parse().map_err(|_| err())?;
        return Ok(v / 100.0);
    }

    let (num, multiplier) = if let Some(n) = body.strip_suffix('K') {
        (n, 1e3)
    } else if let Some(n) = body.strip_suffix('M') {
        (n, 1e6)
    } else if let Some(n) = body.strip_suffix('B') {
        (n, 1e9)
    } else {
        (body, 1.0)
    };

    let v: f64 = num.parse().map_err(|_| err())?;
    Ok(v * multiplier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_with_magnitude_suffix() {
        assert_eq!(to_float("$1.2M").unwrap(), 1_200_000.0);
        assert_eq!(to_float("$3.5K").unwrap(), 3_500.0);
        assert_eq!(to_float("$2B").unwrap(), 2_000_000_000.0);
    }

    #[test]
    fn percent_divides_by_hundred() {
        assert!((to_float("45.3%").unwrap() - 0.453).abs() < 1e-12);
        assert_eq!(to_float("25%").unwrap(), 0.25);
    }

    #[test]
    fn negative_weight_clamps_to_zero() {
        assert_eq!(to_float("-0.01%").unwrap(), 0.0);
        assert_eq!(to_float("-12.5").unwrap(), 0.0);
    }

    #[test]
    fn bare_magnitude_suffix() {
        assert_eq!(to_float("3.5K").unwrap(), 3_500.0);
    }

    #[test]
    fn plain_float_passes_through() {
        assert_eq!(to_float("123.45").unwrap(), 123.45);
        assert_eq!(to_float("$45.30").unwrap(), 45.30);
    }

    #[test]
    fn malformed_token_errors() {
        assert!(to_float("N/A").is_err());
        assert!(to_float("").is_err());
        assert!(to_float("$--").is_err());
    }
}
