//! Dashboard orchestration
//!
//! Runs every metric assembler over one snapshot and collects the results into a
//! single serializable document. Output depends only on the snapshot, the range,
//! the injected "today" and the config.

use crate::assemblers::{
    calorie_balance, calories_burned_trend, consistency, duration_trend, intensity_heatmap,
    macro_distribution, nutrition_summary, weight_summary, weight_trend, workout_summary,
    workout_type_distribution, CalorieBalance, Consistency, IntensityHeatmap, MacroDistribution,
    NutritionSummary, TrendSeries, WeightSummary, WeightTrend, WorkoutSummary,
    WorkoutTypeDistribution,
};
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::range::{AnalysisWindow, PeriodPair, RangeToken};
use crate::snapshot::Snapshot;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Every dashboard metric for one range
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub producer: String,
    pub engine_version: String,
    pub range: RangeToken,
    pub today: NaiveDate,
    pub periods: PeriodPair,
    pub calorie_balance: CalorieBalance,
    pub macro_distribution: MacroDistribution,
    pub nutrition_summary: NutritionSummary,
    pub weight_summary: WeightSummary,
    pub weight_trend: WeightTrend,
    pub workout_summary: WorkoutSummary,
    pub duration_trend: TrendSeries,
    pub calories_burned_trend: TrendSeries,
    pub workout_type_distribution: WorkoutTypeDistribution,
    pub consistency: Consistency,
    pub intensity_heatmap: IntensityHeatmap,
}

impl Dashboard {
    pub fn to_json(&self) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, AnalyticsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Build the dashboard for `range` as of `today`.
///
/// Fails only when the config is invalid or the range cannot be resolved around
/// `today`; individual metrics degrade to their empty shape instead.
pub fn build_dashboard(
    snapshot: &Snapshot,
    range: RangeToken,
    today: NaiveDate,
    config: &EngineConfig,
) -> Result<Dashboard, AnalyticsError> {
    config.validate()?;
    let window = AnalysisWindow::new(range, today, config)?;
    let profile = &snapshot.profile;

    debug!(
        %range,
        %today,
        meals = snapshot.meals.len(),
        workouts = snapshot.workouts.len(),
        weights = snapshot.weights.len(),
        "building dashboard"
    );

    Ok(Dashboard {
        producer: PRODUCER_NAME.to_string(),
        engine_version: ENGINE_VERSION.to_string(),
        range,
        today,
        periods: window.periods,
        calorie_balance: calorie_balance(&snapshot.meals, &window, profile, config),
        macro_distribution: macro_distribution(&snapshot.meals, &window, config),
        nutrition_summary: nutrition_summary(&snapshot.meals, &window),
        weight_summary: weight_summary(&snapshot.weights, &window, profile),
        weight_trend: weight_trend(&snapshot.weights, &window, profile, config),
        workout_summary: workout_summary(&snapshot.workouts, &window),
        duration_trend: duration_trend(&snapshot.workouts, &window, config),
        calories_burned_trend: calories_burned_trend(&snapshot.workouts, &window, config),
        workout_type_distribution: workout_type_distribution(&snapshot.workouts, &window, config),
        consistency: consistency(&snapshot.workouts, &window, profile),
        intensity_heatmap: intensity_heatmap(&snapshot.workouts, &window),
    })
}

/// Parse a snapshot document and build its dashboard as JSON.
///
/// # Example
/// ```ignore
/// let json = dashboard_json(&snapshot_json, "30d", "2024-03-15", None)?;
/// ```
pub fn dashboard_json(
    snapshot_json: &str,
    range: &str,
    today: &str,
    config_json: Option<&str>,
) -> Result<String, AnalyticsError> {
    let snapshot = Snapshot::from_json(snapshot_json)?;
    let range: RangeToken = range.parse()?;
    let today = parse_day(today)?;
    let config = match config_json {
        Some(json) => EngineConfig::from_json(json)?,
        None => EngineConfig::default(),
    };
    build_dashboard(&snapshot, range, today, &config)?.to_json()
}

/// Parse a `yyyy-MM-dd` calendar day
pub fn parse_day(value: &str) -> Result<NaiveDate, AnalyticsError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|e| AnalyticsError::ParseError(format!("invalid date '{value}': {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::PercentChange;

    const SNAPSHOT: &str = r#"{
        "profile": {
            "height_cm": 175,
            "starting_weight_kg": 84,
            "goal_weight_kg": 76,
            "daily_calorie_goal": 2200,
            "weekly_workout_goal": 4
        },
        "meals": [
            {"date": "2024-03-05T12:00:00Z", "calories": 1800, "protein": 100, "carbs": 200, "fat": 60, "meal_type": "lunch"},
            {"date": "2024-03-11T08:00:00Z", "calories": 500, "protein": 30, "carbs": 60, "fat": 15, "meal_type": "breakfast"},
            {"date": "2024-03-13T19:00:00Z", "calories": 900, "protein": 50, "carbs": 90, "fat": 35, "meal_type": "dinner"},
            {"date": "2024-03-15T12:30:00Z", "calories": 2400, "protein": 120, "carbs": 260, "fat": 80}
        ],
        "workouts": [
            {"date": "2024-03-11T07:00:00Z", "duration_minutes": 45, "calories_burned": 420, "type": "running", "effort_level": "hard"},
            {"date": "2024-03-12T18:00:00Z", "duration_minutes": 60, "type": "strength", "effort_level": "very_hard"},
            {"date": "2024-03-13T07:00:00Z", "duration_minutes": 30, "type": "yoga", "effort_level": "easy"},
            {"date": "2024-03-15T07:00:00Z", "duration_minutes": 40, "calories_burned": 380, "type": "running", "effort_level": "moderate"}
        ],
        "weights": [
            {"date": "2024-03-10T07:00:00Z", "weight_kg": 81.2},
            {"date": "2024-03-14T07:00:00Z", "weight_kg": 80.4, "body_fat_percent": 21.5}
        ]
    }"#;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn build(range: RangeToken) -> Dashboard {
        let snapshot = Snapshot::from_json(SNAPSHOT).unwrap();
        build_dashboard(&snapshot, range, date(2024, 3, 15), &EngineConfig::default()).unwrap()
    }

    #[test]
    fn test_build_week_dashboard() {
        let dashboard = build(RangeToken::Week);

        assert_eq!(dashboard.producer, PRODUCER_NAME);
        assert_eq!(dashboard.calorie_balance.points.len(), 5);
        assert_eq!(dashboard.macro_distribution.macros.len(), 3);
        assert_eq!(
            dashboard.macro_distribution.macros.iter().map(|m| m.percent).sum::<i64>(),
            100
        );
        assert_eq!(dashboard.workout_summary.total_workouts.value, 4.0);
        assert_eq!(
            dashboard.workout_summary.total_workouts.change,
            Some(PercentChange::Infinite)
        );
        assert_eq!(dashboard.consistency.current_streak, 1);
        assert_eq!(dashboard.consistency.longest_streak, 3);
        assert_eq!(dashboard.weight_summary.current_weight, Some(80.4));
        assert_eq!(dashboard.weight_summary.body_fat_percent, Some(21.5));
        assert_eq!(dashboard.intensity_heatmap.cells.len(), 5);
    }

    #[test]
    fn test_all_range_suppresses_comparison() {
        let dashboard = build(RangeToken::All);
        assert_eq!(dashboard.periods.previous_start, None);
        assert_eq!(dashboard.nutrition_summary.average_calories.change, None);
        assert_eq!(dashboard.workout_summary.total_minutes.change, None);
        assert!(dashboard
            .macro_distribution
            .macros
            .iter()
            .all(|m| m.change_points.is_none()));
    }

    #[test]
    fn test_dashboard_is_idempotent() {
        for range in RangeToken::ALL_TOKENS {
            let first = build(range).to_json().unwrap();
            let second = build(range).to_json().unwrap();
            assert_eq!(first, second, "range {range}");
        }
    }

    #[test]
    fn test_infinite_change_serializes_as_sentinel() {
        let json = build(RangeToken::Week).to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(
            value["workout_summary"]["total_workouts"]["change"],
            serde_json::json!("infinity")
        );
        assert_eq!(value["range"], serde_json::json!("7d"));
    }

    #[test]
    fn test_empty_snapshot_still_renders() {
        let dashboard = build_dashboard(
            &Snapshot::default(),
            RangeToken::Month,
            date(2024, 3, 15),
            &EngineConfig::default(),
        )
        .unwrap();
        assert_eq!(dashboard.calorie_balance.points.len(), 30);
        assert!(dashboard.macro_distribution.macros.is_empty());
        assert!(dashboard.workout_type_distribution.types.is_empty());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig {
            daily_trend_period: 0,
            ..Default::default()
        };
        let result =
            build_dashboard(&Snapshot::default(), RangeToken::Week, date(2024, 3, 15), &config);
        assert!(matches!(result, Err(AnalyticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_dashboard_json_entry_point() {
        let json = dashboard_json(SNAPSHOT, "30d", "2024-03-15", None).unwrap();
        assert!(json.contains("\"range\":\"30d\""));
        assert!(matches!(
            dashboard_json(SNAPSHOT, "2w", "2024-03-15", None),
            Err(AnalyticsError::InvalidRange(_))
        ));
        assert!(matches!(
            dashboard_json(SNAPSHOT, "7d", "15/03/2024", None),
            Err(AnalyticsError::ParseError(_))
        ));
    }
}
