//! Period-over-period change
//!
//! Signed integer percentage deltas between a current and a previous scalar, with
//! explicit handling of zero baselines. An increase from a zero baseline has no
//! finite ratio and is reported with the [`PercentChange::Infinite`] sentinel.

use crate::types::round_half_up;
use serde::{Deserialize, Serialize};

/// JSON string used for the infinite-increase sentinel
pub const INFINITE_SENTINEL: &str = "infinity";

/// Result of a percentage-change computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChangeRepr", into = "ChangeRepr")]
pub enum PercentChange {
    /// Rounded signed percentage
    Percent(i64),
    /// Increase from a zero baseline
    Infinite,
}

impl PercentChange {
    pub fn is_infinite(&self) -> bool {
        matches!(self, PercentChange::Infinite)
    }

    /// The finite percentage, if any
    pub fn percent(&self) -> Option<i64> {
        match self {
            PercentChange::Percent(p) => Some(*p),
            PercentChange::Infinite => None,
        }
    }
}

/// Wire form: a JSON integer, or the sentinel string
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ChangeRepr {
    Percent(i64),
    Sentinel(String),
}

impl From<PercentChange> for ChangeRepr {
    fn from(change: PercentChange) -> Self {
        match change {
            PercentChange::Percent(p) => ChangeRepr::Percent(p),
            PercentChange::Infinite => ChangeRepr::Sentinel(INFINITE_SENTINEL.to_string()),
        }
    }
}

impl TryFrom<ChangeRepr> for PercentChange {
    type Error = String;

    fn try_from(repr: ChangeRepr) -> Result<Self, Self::Error> {
        match repr {
            ChangeRepr::Percent(p) => Ok(PercentChange::Percent(p)),
            ChangeRepr::Sentinel(s) if s.eq_ignore_ascii_case(INFINITE_SENTINEL) => {
                Ok(PercentChange::Infinite)
            }
            ChangeRepr::Sentinel(s) => Err(format!("unknown percent change sentinel: {s}")),
        }
    }
}

/// Percentage change from `previous` to `current`.
///
/// - `previous == 0`: infinite when `current > 0`, otherwise 0
/// - `current == 0` (previous non-zero): exactly -100
/// - otherwise the ratio delta, rounded to the nearest integer
pub fn percent_change(current: f64, previous: f64) -> PercentChange {
    if previous == 0.0 {
        return if current > 0.0 {
            PercentChange::Infinite
        } else {
            PercentChange::Percent(0)
        };
    }

    if current == 0.0 {
        return PercentChange::Percent(-100);
    }

    let ratio = ((current - previous) / previous) * 100.0;
    PercentChange::Percent(round_half_up(ratio) as i64)
}

/// Change against an optional baseline; `None` when there is no comparison period
pub fn compare(current: f64, previous: Option<f64>) -> Option<PercentChange> {
    previous.map(|previous| percent_change(current, previous))
}
