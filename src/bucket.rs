//! Time bucketing
//!
//! Groups dated records into an ordered, gap-free sequence of calendar buckets
//! (days, or Monday-started weeks). Buckets are enumerated from the boundaries,
//! never inferred from the data, so a unit without records still appears.

use crate::range::{inclusive_days, RangeToken};
use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Bucket size
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    #[default]
    Daily,
    Weekly,
}

impl Granularity {
    /// Granularity for a range. `7d`/`30d` are daily, `90d`/`1y` weekly; `all`
    /// is daily while the data spans at most `all_daily_max_days`.
    pub fn for_range(
        range: RangeToken,
        data_span: Option<(NaiveDate, NaiveDate)>,
        all_daily_max_days: i64,
    ) -> Self {
        match range {
            RangeToken::Week | RangeToken::Month => Granularity::Daily,
            RangeToken::Quarter | RangeToken::Year => Granularity::Weekly,
            RangeToken::All => match data_span {
                Some((first, last)) if inclusive_days(first, last) > all_daily_max_days => {
                    Granularity::Weekly
                }
                _ => Granularity::Daily,
            },
        }
    }

    /// The canonical start of the unit containing `day`
    pub fn unit_start(&self, day: NaiveDate) -> NaiveDate {
        match self {
            Granularity::Daily => day,
            Granularity::Weekly => week_start(day),
        }
    }

    fn step(&self) -> Days {
        match self {
            Granularity::Daily => Days::new(1),
            Granularity::Weekly => Days::new(7),
        }
    }

    /// Chart label for the unit starting at `unit_start`
    pub fn label(&self, unit_start: NaiveDate) -> String {
        match self {
            Granularity::Daily => unit_start.format("%b %-d").to_string(),
            Granularity::Weekly => format!("W/O {}", unit_start.format("%b %-d")),
        }
    }
}

/// One labeled slot of an aggregated series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket<T> {
    /// Canonical unit date (`yyyy-MM-dd` of the day or of the week's Monday)
    pub key: String,
    pub label: String,
    pub value: T,
}

/// Monday of the ISO week containing `day`
pub fn week_start(day: NaiveDate) -> NaiveDate {
    let back = u64::from(day.weekday().num_days_from_monday());
    day.checked_sub_days(Days::new(back)).unwrap_or(day)
}

/// Every unit start in `[start, end]`, in order. Empty when `end < start`.
pub fn enumerate_units(
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<NaiveDate> {
    let mut units = Vec::new();
    if end < start {
        return units;
    }

    let last = granularity.unit_start(end);
    let mut cursor = granularity.unit_start(start);

    while cursor <= last {
        units.push(cursor);
        match cursor.checked_add_days(granularity.step()) {
            Some(next) => cursor = next,
            None => break,
        }
    }
    units
}

/// Group `records` into one bucket per unit of `[start, end]`.
///
/// `day_of` maps a record to its calendar day; records outside `[start, end]`
/// are ignored. `aggregate` folds the records of one unit (possibly none) into
/// the bucket value, so the caller decides both the reduction and what an empty
/// unit means (zero, or `None`).
pub fn bucket<R, T, D, A>(
    records: &[R],
    granularity: Granularity,
    start: NaiveDate,
    end: NaiveDate,
    day_of: D,
    aggregate: A,
) -> Vec<Bucket<T>>
where
    D: Fn(&R) -> NaiveDate,
    A: Fn(&[&R]) -> T,
{
    let mut grouped: HashMap<NaiveDate, Vec<&R>> = HashMap::new();
    for record in records {
        let day = day_of(record);
        if day < start || day > end {
            continue;
        }
        grouped
            .entry(granularity.unit_start(day))
            .or_default()
            .push(record);
    }

    enumerate_units(granularity, start, end)
        .into_iter()
        .map(|unit| {
            let members = grouped.get(&unit).map(Vec::as_slice).unwrap_or(&[]);
            Bucket {
                key: unit.format("%Y-%m-%d").to_string(),
                label: granularity.label(unit),
                value: aggregate(members),
            }
        })
        .collect()
}

/// Aggregate: sum of a field
pub fn sum_of<R>(field: impl Fn(&R) -> f64) -> impl Fn(&[&R]) -> f64 {
    move |members: &[&R]| members.iter().map(|r| field(*r)).sum()
}

/// Aggregate: mean of a field, `None` for an empty unit
pub fn mean_of<R>(field: impl Fn(&R) -> f64) -> impl Fn(&[&R]) -> Option<f64> {
    move |members: &[&R]| {
        if members.is_empty() {
            return None;
        }
        let sum: f64 = members.iter().map(|r| field(*r)).sum();
        Some(sum / members.len() as f64)
    }
}
