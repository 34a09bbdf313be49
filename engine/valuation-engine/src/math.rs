//! Price rounding helpers

use crate::error::{Result, ValuationError};

// Digits 0..=6 are the supported instrument precisions.
const POW10: [f64; 7] = [1.0, 10.0, 100.0, 1_000.0, 10_000.0, 100_000.0, 1_000_000.0];

/// Round `value` to `digits` decimal places.
///
/// `digits` outside 0..=6 is a configuration error on the instrument, not a
/// valuation result.
pub fn normalize(value: f64, digits: u8) -> Result<f64> {
    let factor = POW10
        .get(digits as usize)
        .copied()
        .ok_or(ValuationError::InvalidDigits(digits))?;
    Ok((value * factor).round() / factor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_to_requested_digits() {
        assert_eq!(normalize(1.23456789, 5).unwrap(), 1.23457);
        assert_eq!(normalize(1.23456789, 2).unwrap(), 1.23);
        assert_eq!(normalize(99.5, 0).unwrap(), 100.0);
    }

    #[test]
    fn idempotent() {
        for digits in 0..=6u8 {
            let once = normalize(123.456789, digits).unwrap();
            assert_eq!(normalize(once, digits).unwrap(), once);
        }
    }

    #[test]
    fn rejects_unsupported_digits() {
        assert_eq!(normalize(1.0, 7), Err(ValuationError::InvalidDigits(7)));
        assert_eq!(normalize(1.0, 255), Err(ValuationError::InvalidDigits(255)));
    }
}
