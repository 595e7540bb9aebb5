//! Range resolution
//!
//! Maps a symbolic range token (`7d`, `30d`, `90d`, `1y`, `all`) to concrete
//! calendar-day boundaries, and to a current/previous period pair for
//! period-over-period comparisons. "Today" is always injected by the caller.

use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::types::Dated;
use chrono::{
    DateTime, Days, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Symbolic lookback window selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RangeToken {
    #[serde(rename = "7d")]
    Week,
    #[serde(rename = "30d")]
    Month,
    #[serde(rename = "90d")]
    Quarter,
    #[serde(rename = "1y")]
    Year,
    #[serde(rename = "all")]
    All,
}

/// How far a token looks back
enum Lookback {
    /// Trailing N days including today
    Days(u64),
    /// Calendar-month subtraction
    Months(u32),
}

impl RangeToken {
    pub const ALL_TOKENS: [RangeToken; 5] = [
        RangeToken::Week,
        RangeToken::Month,
        RangeToken::Quarter,
        RangeToken::Year,
        RangeToken::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RangeToken::Week => "7d",
            RangeToken::Month => "30d",
            RangeToken::Quarter => "90d",
            RangeToken::Year => "1y",
            RangeToken::All => "all",
        }
    }

    /// Whether a comparable previous period exists
    pub fn has_comparison(&self) -> bool {
        !matches!(self, RangeToken::All)
    }

    fn lookback(&self) -> Option<Lookback> {
        match self {
            RangeToken::Week => Some(Lookback::Days(7)),
            RangeToken::Month => Some(Lookback::Days(30)),
            RangeToken::Quarter => Some(Lookback::Months(3)),
            RangeToken::Year => Some(Lookback::Months(12)),
            RangeToken::All => None,
        }
    }
}

impl fmt::Display for RangeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RangeToken {
    type Err = AnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RangeToken::ALL_TOKENS
            .into_iter()
            .find(|token| token.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AnalyticsError::InvalidRange(s.to_string()))
    }
}

/// Current window and its immediately-preceding comparison window.
///
/// All boundaries are inclusive calendar days. `previous_*` are `None` for the
/// `all` range, and `current_start` is `None` when the range is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodPair {
    pub current_start: Option<NaiveDate>,
    pub current_end: NaiveDate,
    pub previous_start: Option<NaiveDate>,
    pub previous_end: Option<NaiveDate>,
}

impl PeriodPair {
    pub fn has_comparison(&self) -> bool {
        self.previous_start.is_some() && self.previous_end.is_some()
    }

    pub fn contains_current(&self, day: NaiveDate) -> bool {
        day <= self.current_end && self.current_start.map_or(true, |start| day >= start)
    }

    pub fn contains_previous(&self, day: NaiveDate) -> bool {
        match (self.previous_start, self.previous_end) {
            (Some(start), Some(end)) => day >= start && day <= end,
            _ => false,
        }
    }

    /// Inclusive day count of the current period, if it is bounded
    pub fn current_day_count(&self) -> Option<i64> {
        self.current_start
            .map(|start| inclusive_days(start, self.current_end))
    }

    /// Inclusive day count of the previous period, if there is one
    pub fn previous_day_count(&self) -> Option<i64> {
        match (self.previous_start, self.previous_end) {
            (Some(start), Some(end)) => Some(inclusive_days(start, end)),
            _ => None,
        }
    }

    /// Current period as UTC instants (start-of-day, end-of-day) in the given offset,
    /// for handing to a record store
    pub fn current_bounds(&self, offset: FixedOffset) -> (Option<DateTime<Utc>>, DateTime<Utc>) {
        (
            self.current_start.map(|d| start_of_day(d, offset)),
            end_of_day(self.current_end, offset),
        )
    }

    /// Previous period as UTC instants, if there is one
    pub fn previous_bounds(&self, offset: FixedOffset) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        match (self.previous_start, self.previous_end) {
            (Some(start), Some(end)) => {
                Some((start_of_day(start, offset), end_of_day(end, offset)))
            }
            _ => None,
        }
    }
}

/// Resolve the first day of the lookback window, or `None` for `all`
pub fn resolve_start(
    token: RangeToken,
    today: NaiveDate,
) -> Result<Option<NaiveDate>, AnalyticsError> {
    match token.lookback() {
        None => Ok(None),
        Some(lookback) => step_back(today, &lookback, true).map(Some),
    }
}

/// Resolve the current period and its equal-length predecessor
pub fn resolve_periods(token: RangeToken, today: NaiveDate) -> Result<PeriodPair, AnalyticsError> {
    let Some(lookback) = token.lookback() else {
        return Ok(PeriodPair {
            current_start: None,
            current_end: today,
            previous_start: None,
            previous_end: None,
        });
    };

    let current_start = step_back(today, &lookback, true)?;
    let previous_end = current_start
        .checked_sub_days(Days::new(1))
        .ok_or_else(|| out_of_range(current_start))?;
    let previous_start = match lookback {
        Lookback::Days(_) => step_back(previous_end, &lookback, true)?,
        // Month windows step back from the current start, not the previous end,
        // so both periods cover the same number of calendar months
        Lookback::Months(_) => step_back(current_start, &lookback, false)?,
    };

    Ok(PeriodPair {
        current_start: Some(current_start),
        current_end: today,
        previous_start: Some(previous_start),
        previous_end: Some(previous_end),
    })
}

/// The start a series should actually begin at: the resolved start, or the first
/// record's day if that is later. `None` only for an unbounded range without data.
pub fn actual_start(
    resolved: Option<NaiveDate>,
    first_record: Option<NaiveDate>,
) -> Option<NaiveDate> {
    match (resolved, first_record) {
        (Some(resolved), Some(first)) => Some(resolved.max(first)),
        (Some(resolved), None) => Some(resolved),
        (None, first) => first,
    }
}

/// Number of calendar days in `[start, end]`, zero when `end < start`
pub fn inclusive_days(start: NaiveDate, end: NaiveDate) -> i64 {
    ((end - start).num_days() + 1).max(0)
}

/// Map a UTC instant to the local calendar day at the given offset
pub fn local_day(timestamp: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    timestamp.with_timezone(&offset).date_naive()
}

fn start_of_day(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    local_to_utc(day.and_time(NaiveTime::MIN), offset)
}

fn end_of_day(day: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    local_to_utc(day.and_time(last), offset)
}

fn local_to_utc(local: NaiveDateTime, offset: FixedOffset) -> DateTime<Utc> {
    // A fixed offset never produces ambiguous or skipped local times
    match offset.from_local_datetime(&local).single() {
        Some(dt) => dt.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&local),
    }
}

fn step_back(
    from: NaiveDate,
    lookback: &Lookback,
    include_from: bool,
) -> Result<NaiveDate, AnalyticsError> {
    let stepped = match *lookback {
        Lookback::Days(n) => {
            let back = if include_from { n - 1 } else { n };
            from.checked_sub_days(Days::new(back))
        }
        Lookback::Months(m) => from.checked_sub_months(Months::new(m)),
    };
    stepped.ok_or_else(|| out_of_range(from))
}

fn out_of_range(day: NaiveDate) -> AnalyticsError {
    AnalyticsError::DateOutOfRange(format!("cannot step back from {day}"))
}

/// Everything an assembler needs to know about "when": the token, the injected
/// today, the resolved periods and the user's local offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisWindow {
    pub range: RangeToken,
    pub today: NaiveDate,
    pub periods: PeriodPair,
    pub offset: FixedOffset,
}

impl AnalysisWindow {
    pub fn new(
        range: RangeToken,
        today: NaiveDate,
        config: &EngineConfig,
    ) -> Result<Self, AnalyticsError> {
        Ok(Self {
            range,
            today,
            periods: resolve_periods(range, today)?,
            offset: config.offset()?,
        })
    }

    /// Local calendar day of a record
    pub fn day_of<R: Dated>(&self, record: &R) -> NaiveDate {
        local_day(record.timestamp(), self.offset)
    }

    /// Records falling in the current period
    pub fn current<'a, R: Dated>(&self, records: &'a [R]) -> Vec<&'a R> {
        records
            .iter()
            .filter(|r| self.periods.contains_current(self.day_of(*r)))
            .collect()
    }

    /// Records falling in the previous period (empty when there is none)
    pub fn previous<'a, R: Dated>(&self, records: &'a [R]) -> Vec<&'a R> {
        records
            .iter()
            .filter(|r| self.periods.contains_previous(self.day_of(*r)))
            .collect()
    }

    /// Earliest and latest local day among the records
    pub fn day_span<R: Dated>(&self, records: &[&R]) -> Option<(NaiveDate, NaiveDate)> {
        let mut days = records.iter().map(|r| self.day_of(*r));
        let first = days.next()?;
        Some(days.fold((first, first), |(lo, hi), d| (lo.min(d), hi.max(d))))
    }

    /// Days in the current period. Bounded ranges use the calendar length; `all`
    /// uses the first-to-last record span of the given records (at least 1).
    pub fn days_in_current<R: Dated>(&self, records: &[&R]) -> i64 {
        match self.periods.current_day_count() {
            Some(days) => days,
            None => self
                .day_span(records)
                .map(|(first, last)| inclusive_days(first, last))
                .unwrap_or(0)
                .max(1),
        }
    }
}
