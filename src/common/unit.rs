//! Length units used by DrawingML geometry.
//!
//! Office stores drawing coordinates in English Metric Units (EMU). One inch
//! is exactly 914,400 EMU, which makes the unit divisible by both metric and
//! imperial display units without rounding.

/// English Metric Units per inch.
pub const EMUS_PER_INCH: i64 = 914_400;

/// English Metric Units per centimeter.
pub const EMUS_PER_CM: i64 = 360_000;

/// Convert inches to EMU, rounding to the nearest unit.
///
/// # Example
///
/// ```
/// use longan::common::unit::inches_to_emu;
///
/// assert_eq!(inches_to_emu(1.0), 914_400);
/// assert_eq!(inches_to_emu(0.5), 457_200);
/// ```
#[inline]
pub fn inches_to_emu(inches: f64) -> i64 {
    (inches * EMUS_PER_INCH as f64).round() as i64
}

/// Convert EMU to inches.
#[inline]
pub fn emu_to_inches(emu: i64) -> f64 {
    emu as f64 / EMUS_PER_INCH as f64
}
