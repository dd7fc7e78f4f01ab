use chrono::{DateTime, Duration, Utc};

/// Default reporting window when `days` is absent or unusable
pub const DEFAULT_PERIOD_DAYS: i64 = 30;

/// Largest accepted window length (ten years); values beyond it would
/// overflow the date arithmetic, so they fall back to the default
pub const MAX_PERIOD_DAYS: i64 = 3650;

/// Resolved reporting window: a current window ending at `now` and a
/// previous window of equal length immediately preceding it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportingPeriod {
    pub current_start: DateTime<Utc>,
    pub current_end: DateTime<Utc>,
    pub previous_start: DateTime<Utc>,
    pub previous_end: DateTime<Utc>,
}

impl ReportingPeriod {
    /// Resolve the two windows from `now` and a positive day count
    ///
    /// Day counts outside `1..=MAX_PERIOD_DAYS` fall back to the default
    /// so the windows can never be inverted, zero-width, or outside the
    /// representable date range.
    pub fn resolve(now: DateTime<Utc>, days: i64) -> Self {
        let days = if (1..=MAX_PERIOD_DAYS).contains(&days) {
            days
        } else {
            DEFAULT_PERIOD_DAYS
        };
        let current_start = now - Duration::days(days);
        Self {
            current_start,
            current_end: now,
            previous_start: current_start - Duration::days(days),
            previous_end: current_start,
        }
    }
}

/// Lenient parse of the `days` query parameter
///
/// Anything outside `1..=MAX_PERIOD_DAYS` (missing, non-numeric, zero,
/// negative, or absurdly large) resolves to the default rather than
/// rejecting the request.
pub fn resolve_days(raw: Option<&str>) -> i64 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .filter(|days| (1..=MAX_PERIOD_DAYS).contains(days))
        .unwrap_or(DEFAULT_PERIOD_DAYS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 15, 10, 30, 0).unwrap()
    }

    #[test]
    fn test_resolve_basic_window() {
        let period = ReportingPeriod::resolve(now(), 7);
        assert_eq!(period.current_end, now());
        assert_eq!(period.current_start, now() - Duration::days(7));
        assert_eq!(period.previous_end, period.current_start);
        assert_eq!(period.previous_start, now() - Duration::days(14));
    }

    #[test]
    fn test_resolve_non_positive_days_falls_back_to_default() {
        for days in [0, -1, -30] {
            let period = ReportingPeriod::resolve(now(), days);
            assert_eq!(period.current_start, now() - Duration::days(30));
            assert_eq!(period.previous_start, now() - Duration::days(60));
        }
    }

    #[test]
    fn test_resolve_days_parses_positive_integers() {
        assert_eq!(resolve_days(Some("7")), 7);
        assert_eq!(resolve_days(Some(" 90 ")), 90);
        assert_eq!(resolve_days(Some("365")), 365);
    }

    #[test]
    fn test_resolve_days_falls_back_on_garbage() {
        assert_eq!(resolve_days(None), DEFAULT_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("")), DEFAULT_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("abc")), DEFAULT_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("12.5")), DEFAULT_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("0")), DEFAULT_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("-5")), DEFAULT_PERIOD_DAYS);
    }

    #[test]
    fn test_resolve_days_caps_oversized_values() {
        assert_eq!(resolve_days(Some("3650")), MAX_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("3651")), DEFAULT_PERIOD_DAYS);
        assert_eq!(resolve_days(Some("10000000000")), DEFAULT_PERIOD_DAYS);
        assert_eq!(
            resolve_days(Some(&i64::MAX.to_string())),
            DEFAULT_PERIOD_DAYS
        );
    }

    // A well-formed but absurd day count must degrade, never overflow
    #[test]
    fn test_resolve_oversized_days_falls_back_to_default() {
        for days in [MAX_PERIOD_DAYS + 1, 10_000_000_000, i64::MAX] {
            let period = ReportingPeriod::resolve(now(), days);
            assert_eq!(period.current_start, now() - Duration::days(30));
            assert_eq!(period.previous_start, now() - Duration::days(60));
        }
    }

    proptest! {
        // Both windows always have equal, positive width and are contiguous,
        // whatever day count the caller managed to produce
        #[test]
        fn prop_windows_are_contiguous_and_equal_width(days in any::<i64>()) {
            let period = ReportingPeriod::resolve(now(), days);

            prop_assert!(period.current_start < period.current_end);
            prop_assert!(period.previous_start < period.previous_end);
            prop_assert_eq!(period.previous_end, period.current_start);
            prop_assert_eq!(
                period.current_end - period.current_start,
                period.previous_end - period.previous_start
            );
        }

        // Lenient parsing never yields a day count outside the accepted range
        #[test]
        fn prop_resolved_days_always_in_range(raw in "\\PC{0,12}") {
            let days = resolve_days(Some(&raw));
            prop_assert!(days > 0);
            prop_assert!(days <= MAX_PERIOD_DAYS);
        }
    }
}
