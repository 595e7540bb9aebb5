//! Calorie balance: consumed calories per bucket against the calorie goal line

use super::{check_all, degrade, series_layout};
use crate::bucket::{bucket, Granularity};
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::range::AnalysisWindow;
use crate::types::{round_half_up, MealRecord, Profile};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One bucket of the calorie balance chart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaloriePoint {
    pub key: String,
    pub label: String,
    /// Calories consumed in the bucket (0 when nothing was logged)
    pub calories: f64,
    /// Goal line for the bucket (daily goal, or seven times it for weekly buckets)
    pub goal: Option<f64>,
}

/// Calorie balance chart data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalorieBalance {
    pub granularity: Granularity,
    pub points: Vec<CaloriePoint>,
    pub goal_per_bucket: Option<f64>,
    /// Mean consumption over buckets that had any meals
    pub average_per_logged_bucket: Option<f64>,
    pub buckets_over_goal: u32,
}

/// Build the calorie balance series for the window's current period
pub fn calorie_balance(
    meals: &[MealRecord],
    window: &AnalysisWindow,
    profile: &Profile,
    config: &EngineConfig,
) -> CalorieBalance {
    degrade("calorie_balance", build(meals, window, profile, config))
}

fn build(
    meals: &[MealRecord],
    window: &AnalysisWindow,
    profile: &Profile,
    config: &EngineConfig,
) -> Result<CalorieBalance, AnalyticsError> {
    let current = window.current(meals);
    check_all(&current, MealRecord::check)?;

    let Some((granularity, start, end)) = series_layout(window, &current, config) else {
        return Ok(CalorieBalance::default());
    };

    let goal_per_bucket = profile
        .daily_calorie_goal
        .filter(|goal| goal.is_finite() && *goal > 0.0)
        .map(|goal| match granularity {
            Granularity::Daily => goal,
            Granularity::Weekly => goal * 7.0,
        });

    let buckets = bucket(
        &current,
        granularity,
        start,
        end,
        |meal| window.day_of(*meal),
        |members: &[&&MealRecord]| {
            let calories: f64 = members.iter().map(|meal| meal.calories).sum();
            (calories, !members.is_empty())
        },
    );

    let logged: Vec<f64> = buckets
        .iter()
        .filter(|b| b.value.1)
        .map(|b| b.value.0)
        .collect();
    let average_per_logged_bucket = if logged.is_empty() {
        None
    } else {
        Some(round_half_up(logged.iter().sum::<f64>() / logged.len() as f64))
    };

    let buckets_over_goal = match goal_per_bucket {
        Some(goal) => buckets.iter().filter(|b| b.value.0 > goal).count() as u32,
        None => 0,
    };

    debug!(
        range = %window.range,
        ?granularity,
        buckets = buckets.len(),
        meals = current.len(),
        "built calorie balance"
    );

    let points = buckets
        .into_iter()
        .map(|b| CaloriePoint {
            key: b.key,
            label: b.label,
            calories: round_half_up(b.value.0),
            goal: goal_per_bucket,
        })
        .collect();

    Ok(CalorieBalance {
        granularity,
        points,
        goal_per_bucket,
        average_per_logged_bucket,
        buckets_over_goal,
    })
}
