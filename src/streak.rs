//! Streak analysis
//!
//! Scans the explicit day sequence from a range start up to "today" and reports
//! the run of consecutive active days ending today plus the longest run seen.

use crate::types::round1;
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Current and longest runs of consecutive active days
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    pub current: u32,
    pub longest: u32,
}

/// Compute streaks over `[range_start, today]`.
///
/// The current streak is the run ending exactly at `today` and is zero when today
/// itself is inactive, even if a run ended yesterday. The longest streak is never
/// shorter than the current one.
pub fn compute_streaks(
    active: &BTreeSet<NaiveDate>,
    range_start: NaiveDate,
    today: NaiveDate,
) -> Streaks {
    let mut running: u32 = 0;
    let mut longest: u32 = 0;
    let mut day = range_start;

    while day <= today {
        if active.contains(&day) {
            running += 1;
            longest = longest.max(running);
        } else {
            running = 0;
        }

        match day.checked_add_days(Days::new(1)) {
            Some(next) => day = next,
            None => break,
        }
    }

    let current = if range_start <= today && active.contains(&today) {
        running
    } else {
        0
    };

    Streaks {
        current,
        longest: longest.max(current),
    }
}

/// Normalized sessions-per-week figure: `active_days / total_days * 7`, one decimal
pub fn adherence_rate(active_days: usize, total_days: i64) -> f64 {
    if total_days <= 0 {
        return 0.0;
    }
    round1(active_days as f64 / total_days as f64 * 7.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn days(list: &[NaiveDate]) -> BTreeSet<NaiveDate> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_empty_set() {
        let streaks = compute_streaks(&BTreeSet::new(), date(2024, 3, 1), date(2024, 3, 15));
        assert_eq!(streaks, Streaks { current: 0, longest: 0 });
    }

    #[test]
    fn test_gap_breaks_current_streak() {
        // Mon Mar 11 .. Fri Mar 15, Thursday missing
        let active = days(&[
            date(2024, 3, 11),
            date(2024, 3, 12),
            date(2024, 3, 13),
            date(2024, 3, 15),
        ]);
        let streaks = compute_streaks(&active, date(2024, 3, 9), date(2024, 3, 15));
        assert_eq!(streaks, Streaks { current: 1, longest: 3 });
    }

    #[test]
    fn test_inactive_today_zeroes_current() {
        let active = days(&[date(2024, 3, 13), date(2024, 3, 14)]);
        let streaks = compute_streaks(&active, date(2024, 3, 1), date(2024, 3, 15));
        assert_eq!(streaks, Streaks { current: 0, longest: 2 });
    }

    #[test]
    fn test_run_through_today_is_longest() {
        let active = days(&[
            date(2024, 3, 1),
            date(2024, 3, 13),
            date(2024, 3, 14),
            date(2024, 3, 15),
        ]);
        let streaks = compute_streaks(&active, date(2024, 3, 1), date(2024, 3, 15));
        assert_eq!(streaks, Streaks { current: 3, longest: 3 });
    }

    #[test]
    fn test_days_outside_range_are_ignored() {
        let active = days(&[date(2024, 2, 28), date(2024, 2, 29), date(2024, 3, 1)]);
        let streaks = compute_streaks(&active, date(2024, 3, 1), date(2024, 3, 1));
        assert_eq!(streaks, Streaks { current: 1, longest: 1 });
    }

    #[test]
    fn test_start_after_today() {
        let active = days(&[date(2024, 3, 15)]);
        let streaks = compute_streaks(&active, date(2024, 3, 16), date(2024, 3, 15));
        assert_eq!(streaks, Streaks::default());
    }

    #[test]
    fn test_longest_never_below_current() {
        let start = date(2024, 1, 1);
        let today = date(2024, 1, 31);
        for mask in [0u32, 0b1, 0b1011, 0x7fff_ffff, 0x5555_5555, 0x4000_0001] {
            let active: BTreeSet<NaiveDate> = (0..31u64)
                .filter(|i| mask & (1 << i) != 0)
                .filter_map(|i| start.checked_add_days(Days::new(i)))
                .collect();
            let streaks = compute_streaks(&active, start, today);
            assert!(streaks.longest >= streaks.current, "mask {mask:#x}");
        }
    }

    #[test]
    fn test_adherence_rate() {
        assert_eq!(adherence_rate(12, 30), 2.8);
        assert_eq!(adherence_rate(7, 7), 7.0);
        assert_eq!(adherence_rate(0, 30), 0.0);
        assert_eq!(adherence_rate(3, 0), 0.0);
    }
}
