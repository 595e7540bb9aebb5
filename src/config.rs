//! Engine configuration
//!
//! Tunables that shape bucketing, smoothing and distribution tie-breaks. The
//! configuration is plain data: callers load it from JSON (or use the defaults)
//! and pass it by reference into every metric call.

use crate::error::AnalyticsError;
use crate::types::{Macro, WorkoutType};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

/// Default strict SMA window for daily series (days)
pub const DEFAULT_DAILY_TREND_PERIOD: usize = 7;

/// Default strict SMA window for weekly series (weeks)
pub const DEFAULT_WEEKLY_TREND_PERIOD: usize = 4;

/// Default tolerant SMA window for the weight chart
pub const DEFAULT_WEIGHT_TREND_PERIOD: usize = 7;

/// Longest data span (inclusive days) an `all` range still buckets daily
pub const DEFAULT_ALL_RANGE_DAILY_MAX_DAYS: i64 = 30;

const MAX_UTC_OFFSET_MINUTES: u32 = 14 * 60;

/// Configuration shared by all metric assemblers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed offset of the user's local time from UTC, in minutes
    pub utc_offset_minutes: i32,
    /// Strict moving-average window for daily duration/calorie charts
    pub daily_trend_period: usize,
    /// Strict moving-average window for weekly duration/calorie charts
    pub weekly_trend_period: usize,
    /// Half-window tolerant moving-average window for the weight chart
    pub weight_trend_period: usize,
    /// `all` ranges spanning at most this many days are bucketed daily
    pub all_range_daily_max_days: i64,
    /// Which macro absorbs the rounding remainder when shares tie
    pub macro_precedence: Vec<Macro>,
    /// Which workout type absorbs the rounding remainder when counts tie
    pub workout_type_precedence: Vec<WorkoutType>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            utc_offset_minutes: 0,
            daily_trend_period: DEFAULT_DAILY_TREND_PERIOD,
            weekly_trend_period: DEFAULT_WEEKLY_TREND_PERIOD,
            weight_trend_period: DEFAULT_WEIGHT_TREND_PERIOD,
            all_range_daily_max_days: DEFAULT_ALL_RANGE_DAILY_MAX_DAYS,
            macro_precedence: vec![Macro::Carbs, Macro::Protein, Macro::Fat],
            workout_type_precedence: WorkoutType::ALL.to_vec(),
        }
    }
}

impl EngineConfig {
    /// Check that every tunable is usable
    pub fn validate(&self) -> Result<(), AnalyticsError> {
        if self.utc_offset_minutes.unsigned_abs() > MAX_UTC_OFFSET_MINUTES {
            return Err(AnalyticsError::InvalidConfig(format!(
                "utc_offset_minutes {} exceeds ±{}",
                self.utc_offset_minutes, MAX_UTC_OFFSET_MINUTES
            )));
        }

        for (name, period) in [
            ("daily_trend_period", self.daily_trend_period),
            ("weekly_trend_period", self.weekly_trend_period),
            ("weight_trend_period", self.weight_trend_period),
        ] {
            if period == 0 {
                return Err(AnalyticsError::InvalidConfig(format!(
                    "{name} must be at least 1"
                )));
            }
        }

        if self.all_range_daily_max_days < 1 {
            return Err(AnalyticsError::InvalidConfig(
                "all_range_daily_max_days must be at least 1".to_string(),
            ));
        }

        if has_duplicates(&self.macro_precedence) {
            return Err(AnalyticsError::InvalidConfig(
                "macro_precedence contains duplicates".to_string(),
            ));
        }
        if has_duplicates(&self.workout_type_precedence) {
            return Err(AnalyticsError::InvalidConfig(
                "workout_type_precedence contains duplicates".to_string(),
            ));
        }

        Ok(())
    }

    /// The configured offset as a chrono timezone
    pub fn offset(&self) -> Result<FixedOffset, AnalyticsError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                AnalyticsError::InvalidConfig(format!(
                    "utc_offset_minutes {} is not a valid offset",
                    self.utc_offset_minutes
                ))
            })
    }

    /// Load and validate a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, AnalyticsError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn has_duplicates<T: PartialEq>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .any(|(i, item)| items[..i].contains(item))
}
