//! Guarded arithmetic shared by the aggregator and the summary roll-up.
//!
//! Every helper here enforces the same policy: percentage and trend fields
//! in a response are always finite numbers inside a bounded range, so a
//! zero denominator can never surface as NaN or Infinity in the JSON.

/// Clamp range for the per-kitchen consumption trend
pub const TREND_CLAMP: (f64, f64) = (-100.0, 200.0);

/// Wider clamp range for the tenant-wide period comparison
pub const COMPARISON_CLAMP: (f64, f64) = (-100.0, 1000.0);

/// Coerce NaN and infinities to 0
pub fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// Round to one decimal place, for trend display values
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Waste share of total throughput: `wasted / (consumed + wasted) * 100`
///
/// 0 when the denominator is 0; always inside [0, 100].
pub fn waste_percentage(consumed: f64, wasted: f64) -> f64 {
    let denominator = consumed + wasted;
    if denominator == 0.0 {
        return 0.0;
    }
    finite_or_zero(wasted / denominator * 100.0).clamp(0.0, 100.0)
}

/// Zero-safe percentage change between two period totals
///
/// 0 when both periods are 0, exactly 100 when the previous period is 0
/// but the current is positive, otherwise the usual ratio clamped to
/// `[min, max]`.
pub fn percentage_change(current: f64, previous: f64, (min, max): (f64, f64)) -> f64 {
    if previous == 0.0 {
        if current == 0.0 {
            return 0.0;
        }
        return 100.0;
    }
    finite_or_zero((current - previous) / previous * 100.0).clamp(min, max)
}

/// Rank by a numeric key descending and keep the top N entries
///
/// The sort is stable, so ties keep their original encounter order; this
/// is the documented tie-break rule for all top-N lists.
pub fn rank_top<T, F>(mut items: Vec<T>, n: usize, key: F) -> Vec<T>
where
    F: Fn(&T) -> f64,
{
    items.sort_by(|a, b| {
        key(b)
            .partial_cmp(&key(a))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    items.truncate(n);
    items
}
