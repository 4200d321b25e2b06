//! Exact quantity utilities.
//!
//! ## Overview
//!
//! Requested and donated amounts are `rust_decimal::Decimal` values. Units
//! are free text ("kg", "boxes", "litres"), so amounts may be fractional,
//! and allocation must never drift the way binary floats do: a pool of
//! `0.3` split into `0.1` three times has to land on exactly zero.
//!
//! ## Examples
//!
//! ```
//! use relief_hub::types::quantity::{parse_quantity, format_quantity};
//!
//! let qty = parse_quantity("12.50").unwrap();
//! assert_eq!(format_quantity(qty), "12.5");
//! ```

use std::str::FromStr;

use rust_decimal::Decimal;

// ============================================================================
// Conversion Functions
// ============================================================================

/// Parse a decimal string into a quantity
///
/// # Returns
///
/// * `Some(Decimal)` - The parsed value (may be zero or negative)
/// * `None` - If the text is not a number
///
/// # Example
///
/// ```
/// use relief_hub::types::quantity::parse_quantity;
/// use rust_decimal::Decimal;
///
/// assert_eq!(parse_quantity("60"), Some(Decimal::from(60)));
/// assert_eq!(parse_quantity(" 2.5 "), Some(Decimal::new(25, 1)));
/// assert_eq!(parse_quantity("lots"), None);
/// ```
pub fn parse_quantity(s: &str) -> Option<Decimal> {
    Decimal::from_str(s.trim()).ok()
}

/// Render a quantity without trailing zeros
///
/// # Example
///
/// ```
/// use relief_hub::types::quantity::format_quantity;
/// use rust_decimal::Decimal;
///
/// assert_eq!(format_quantity(Decimal::from(100)), "100");
/// assert_eq!(format_quantity(Decimal::new(1500, 3)), "1.5");
/// ```
pub fn format_quantity(value: Decimal) -> String {
    format!("{}", value.normalize())
}

/// Returns true if the quantity is strictly greater than zero
#[inline]
pub fn is_positive(value: Decimal) -> bool {
    value > Decimal::ZERO
}

// ============================================================================
// Allocation Arithmetic
// ============================================================================

/// The amount one side can give the other: `min(needed, available)`.
///
/// Returns `None` when either side has nothing left, so callers can skip the
/// candidate without special-casing zero or negative running totals.
///
/// # Example
///
/// ```
/// use relief_hub::types::quantity::allocatable;
/// use rust_decimal::Decimal;
///
/// assert_eq!(allocatable(Decimal::from(40), Decimal::from(60)), Some(Decimal::from(40)));
/// assert_eq!(allocatable(Decimal::from(40), Decimal::ZERO), None);
/// assert_eq!(allocatable(Decimal::from(-5), Decimal::from(10)), None);
/// ```
pub fn allocatable(needed: Decimal, available: Decimal) -> Option<Decimal> {
    let amount = needed.min(available);
    if is_positive(amount) {
        Some(amount)
    } else {
        None
    }
}

/// Outstanding need: `target - fulfilled`, floored at zero
pub fn outstanding(target: Decimal, fulfilled: Decimal) -> Decimal {
    (target - fulfilled).max(Decimal::ZERO)
}

// ============================================================================
// Unit Tests
// ============================================================================
