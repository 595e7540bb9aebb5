//! Per-domain metric assemblers
//!
//! Each assembler composes the engine primitives (range resolution, bucketing,
//! change, distribution, streaks, smoothing) over one record shape and returns a
//! UI-ready result. Assemblers never fail: a computation fault is logged and the
//! result degrades to the metric's empty shape.

mod calories;
mod consistency;
mod nutrition;
mod weight;
mod workouts;

pub use calories::{calorie_balance, CalorieBalance, CaloriePoint};
pub use consistency::{consistency, intensity_heatmap, Consistency, HeatmapCell, IntensityHeatmap};
pub use nutrition::{
    macro_distribution, nutrition_summary, MacroDistribution, MacroShare, MealTypeCalories,
    NutritionSummary,
};
pub use weight::{
    bmi, weight_summary, weight_trend, BmiCategory, WeightPoint, WeightSummary, WeightTrend,
};
pub use workouts::{
    calories_burned_trend, duration_trend, workout_summary, workout_type_distribution, TrendPoint,
    TrendSeries, TypeShare, WorkoutSummary, WorkoutTypeDistribution,
};

use crate::bucket::Granularity;
use crate::change::PercentChange;
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::range::{actual_start, AnalysisWindow};
use crate::types::Dated;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// A scalar with its change against the previous period
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricChange {
    pub value: f64,
    /// `None` when the range has no comparison period
    pub change: Option<PercentChange>,
}

/// Return the computed result, or log the fault and return the empty shape
fn degrade<T: Default>(metric: &'static str, result: Result<T, AnalyticsError>) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(metric, error = %e, "metric computation failed, returning empty result");
            T::default()
        }
    }
}

/// Validate every record with `check`, failing on the first bad one
fn check_all<R>(
    records: &[&R],
    check: impl Fn(&R) -> Result<(), AnalyticsError>,
) -> Result<(), AnalyticsError> {
    records.iter().try_for_each(|r| check(*r))
}

/// Series layout for the current-period records: granularity and `[start, end]`.
///
/// The start is the later of the resolved range start and the first record, so a
/// new user's chart does not open with a long run of empty units. A bounded range
/// without records still yields the full range; `all` without records yields `None`.
fn series_layout<R: Dated>(
    window: &AnalysisWindow,
    current: &[&R],
    config: &EngineConfig,
) -> Option<(Granularity, NaiveDate, NaiveDate)> {
    let span = window.day_span(current);
    let granularity = Granularity::for_range(window.range, span, config.all_range_daily_max_days);
    let start = actual_start(window.periods.current_start, span.map(|(first, _)| first))?;
    Some((granularity, start, window.today))
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::range::RangeToken;
    use crate::types::{EffortLevel, MealRecord, WeightRecord, WorkoutRecord, WorkoutType};
    use chrono::{DateTime, TimeZone, Utc};

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn at(y: i32, m: u32, d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, hour, 0, 0).unwrap()
    }

    pub fn window(range: RangeToken, today: NaiveDate) -> AnalysisWindow {
        AnalysisWindow::new(range, today, &EngineConfig::default()).unwrap()
    }

    pub fn meal(
        date: DateTime<Utc>,
        calories: f64,
        protein: f64,
        carbs: f64,
        fat: f64,
    ) -> MealRecord {
        MealRecord {
            id: None,
            date,
            calories,
            protein,
            carbs,
            fat,
            meal_type: None,
        }
    }

    pub fn workout(
        date: DateTime<Utc>,
        minutes: f64,
        burned: Option<f64>,
        workout_type: WorkoutType,
        effort_level: EffortLevel,
    ) -> WorkoutRecord {
        WorkoutRecord {
            id: None,
            date,
            duration_minutes: minutes,
            calories_burned: burned,
            workout_type,
            effort_level,
        }
    }

    pub fn weight(date: DateTime<Utc>, weight_kg: f64) -> WeightRecord {
        WeightRecord {
            id: None,
            date,
            weight_kg,
            body_fat_percent: None,
        }
    }
}
