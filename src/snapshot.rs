//! Snapshot loading and validation
//!
//! A snapshot is one user's profile plus their meal, workout and weight logs, as
//! handed over by the record store. Loading removes duplicates (overlapping
//! paginated fetches return the same row twice) and orders records by time.

use crate::error::AnalyticsError;
use crate::range::local_day;
use crate::types::{Dated, MealRecord, Profile, WeightRecord, WorkoutRecord};
use chrono::{FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub meals: Vec<MealRecord>,
    #[serde(default)]
    pub workouts: Vec<WorkoutRecord>,
    #[serde(default)]
    pub weights: Vec<WeightRecord>,
}

/// Which log a record came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Meal,
    Workout,
    Weight,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            RecordKind::Meal => "meal",
            RecordKind::Workout => "workout",
            RecordKind::Weight => "weight",
        })
    }
}

/// A problem with a single record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordIssue {
    pub kind: RecordKind,
    /// Position in the snapshot's (sorted) list
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub message: String,
}

impl Snapshot {
    /// Parse a snapshot document, then de-duplicate and sort it
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let mut snapshot: Snapshot = serde_json::from_str(json)?;
        snapshot.normalize();
        Ok(snapshot)
    }

    pub fn to_json(&self) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Drop repeated record ids (first occurrence wins) and sort each log by time
    pub fn normalize(&mut self) {
        dedup_and_sort(&mut self.meals);
        dedup_and_sort(&mut self.workouts);
        dedup_and_sort(&mut self.weights);
    }

    pub fn is_empty(&self) -> bool {
        self.meals.is_empty() && self.workouts.is_empty() && self.weights.is_empty()
    }

    /// Check every record without failing the batch.
    ///
    /// Reports non-finite or negative values and timestamps whose local day is
    /// after `today`.
    pub fn validate(&self, today: NaiveDate, offset: FixedOffset) -> Vec<RecordIssue> {
        let mut issues = Vec::new();
        collect_issues(
            &mut issues,
            RecordKind::Meal,
            &self.meals,
            MealRecord::check,
            today,
            offset,
        );
        collect_issues(
            &mut issues,
            RecordKind::Workout,
            &self.workouts,
            WorkoutRecord::check,
            today,
            offset,
        );
        collect_issues(
            &mut issues,
            RecordKind::Weight,
            &self.weights,
            WeightRecord::check,
            today,
            offset,
        );
        issues
    }
}

/// Number of distinct records named by `issues`
pub fn failing_record_count(issues: &[RecordIssue]) -> usize {
    issues
        .iter()
        .map(|issue| (issue.kind, issue.index))
        .collect::<HashSet<_>>()
        .len()
}

fn dedup_and_sort<R: Dated>(records: &mut Vec<R>) {
    let mut seen: HashSet<Uuid> = HashSet::new();
    records.retain(|r| match r.record_id() {
        Some(id) => seen.insert(id),
        None => true,
    });
    // Stable, so records sharing a timestamp keep their input order
    records.sort_by_key(|r| r.timestamp());
}

fn collect_issues<R: Dated>(
    issues: &mut Vec<RecordIssue>,
    kind: RecordKind,
    records: &[R],
    check: impl Fn(&R) -> Result<(), AnalyticsError>,
    today: NaiveDate,
    offset: FixedOffset,
) {
    for (index, record) in records.iter().enumerate() {
        let mut push = |message: String| {
            issues.push(RecordIssue {
                kind,
                index,
                id: record.record_id(),
                message,
            })
        };
        if let Err(e) = check(record) {
            push(e.to_string());
        }
        let day = local_day(record.timestamp(), offset);
        if day > today {
            push(format!("dated {day}, after {today}"));
        }
    }
}
