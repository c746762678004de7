//! Number formatting.

/// Formats a number in its shortest fixed-point form.
///
/// The value is printed with six decimal places, then trailing zeros and a
/// trailing `.` are dropped.
///
/// ```
/// use django_core_common::utils::numbers::simple_format;
///
/// assert_eq!(simple_format(123.0), "123");
/// assert_eq!(simple_format(123.011_00), "123.011");
/// ```
pub fn simple_format(num: f64) -> String {
    let formatted = format!("{num:.6}");
    formatted.trim_end_matches('0').trim_end_matches('.').to_string()
}
