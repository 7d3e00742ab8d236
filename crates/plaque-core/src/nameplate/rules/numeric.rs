//! Numeric canonicalization of value lines.

use tracing::trace;

use super::patterns::NON_NUMERIC;
use crate::models::extraction::FieldValue;

/// Fractional digits kept in normalized values.
pub const DECIMAL_PLACES: usize = 1;

/// Normalize a matched value line.
///
/// Units and other glyphs are dropped, a decimal comma becomes a point and
/// the number is rounded to [`DECIMAL_PLACES`]. Text that does not parse is
/// returned verbatim as [`FieldValue::Raw`].
pub fn normalize_value(raw: &str) -> FieldValue {
    let numeric = NON_NUMERIC.replace_all(raw, "").replace(',', ".");

    match numeric.parse::<f64>() {
        Ok(number) if number.is_finite() => {
            FieldValue::Numeric(format!("{:.*}", DECIMAL_PLACES, number))
        }
        _ => {
            trace!("Keeping {:?} verbatim, {:?} is not a number", raw, numeric);
            FieldValue::Raw(raw.to_string())
        }
    }
}
