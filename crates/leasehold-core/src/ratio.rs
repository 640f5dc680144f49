//! Integer percentages for reports.

/// `part / whole` as a whole percentage, rounded half up.
///
/// A zero `whole` yields 0. Computed in integers: `floor((200 * part + whole)
/// / (2 * whole))`, so 1/8 is 13 and 2/3 is 67.
pub fn rounded_percentage(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    let part = u128::from(part);
    let whole = u128::from(whole);
    let pct = (200 * part + whole) / (2 * whole);
    u64::try_from(pct).unwrap_or(u64::MAX)
}
