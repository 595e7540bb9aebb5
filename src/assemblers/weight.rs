//! Weight summary and weight trend

use super::{check_all, degrade, series_layout};
use crate::bucket::{bucket, mean_of, Granularity};
use crate::config::EngineConfig;
use crate::error::AnalyticsError;
use crate::range::AnalysisWindow;
use crate::smoothing::sma_sparse;
use crate::types::{round1, Dated, Profile, WeightRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// WHO adult BMI band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiCategory {
    pub fn from_bmi(bmi: f64) -> Self {
        if bmi < 18.5 {
            BmiCategory::Underweight
        } else if bmi < 25.0 {
            BmiCategory::Normal
        } else if bmi < 30.0 {
            BmiCategory::Overweight
        } else {
            BmiCategory::Obese
        }
    }
}

/// Body mass index to one decimal; `None` without a usable height
pub fn bmi(weight_kg: f64, height_cm: Option<f64>) -> Option<f64> {
    let height_m = height_cm.filter(|h| h.is_finite() && *h > 0.0)? / 100.0;
    if !weight_kg.is_finite() {
        return None;
    }
    Some(round1(weight_kg / (height_m * height_m)))
}

/// Weight overview for the current period
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightSummary {
    /// Most recent reading in the period
    pub current_weight: Option<f64>,
    /// Profile baseline, not derived from the period
    pub starting_weight: Option<f64>,
    pub goal_weight: Option<f64>,
    pub change_since_start: Option<f64>,
    /// Last reading minus first reading in the period
    pub change_in_period: Option<f64>,
    /// Current minus goal; positive while above the goal
    pub remaining_to_goal: Option<f64>,
    pub bmi: Option<f64>,
    pub bmi_category: Option<BmiCategory>,
    pub body_fat_percent: Option<f64>,
    pub readings: usize,
}

/// One bucket of the weight chart. Buckets without a reading stay `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightPoint {
    pub key: String,
    pub label: String,
    pub weight: Option<f64>,
    pub bmi: Option<f64>,
    pub moving_average: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeightTrend {
    pub granularity: Granularity,
    pub points: Vec<WeightPoint>,
    pub goal_weight: Option<f64>,
}

pub fn weight_summary(
    weights: &[WeightRecord],
    window: &AnalysisWindow,
    profile: &Profile,
) -> WeightSummary {
    degrade("weight_summary", build_summary(weights, window, profile))
}

pub fn weight_trend(
    weights: &[WeightRecord],
    window: &AnalysisWindow,
    profile: &Profile,
    config: &EngineConfig,
) -> WeightTrend {
    degrade("weight_trend", build_trend(weights, window, profile, config))
}

fn build_summary(
    weights: &[WeightRecord],
    window: &AnalysisWindow,
    profile: &Profile,
) -> Result<WeightSummary, AnalyticsError> {
    let mut current = window.current(weights);
    check_all(&current, WeightRecord::check)?;
    current.sort_by_key(|w| w.timestamp());

    let first = current.first().map(|w| w.weight_kg);
    let latest = current.last().map(|w| w.weight_kg);

    let delta = |a: Option<f64>, b: Option<f64>| match (a, b) {
        (Some(a), Some(b)) => Some(round1(a - b)),
        _ => None,
    };

    let bmi_value = latest.and_then(|kg| bmi(kg, profile.height_cm));

    Ok(WeightSummary {
        current_weight: latest.map(round1),
        starting_weight: profile.starting_weight_kg,
        goal_weight: profile.goal_weight_kg,
        change_since_start: delta(latest, profile.starting_weight_kg),
        change_in_period: delta(latest, first),
        remaining_to_goal: delta(latest, profile.goal_weight_kg),
        bmi: bmi_value,
        bmi_category: bmi_value.map(BmiCategory::from_bmi),
        body_fat_percent: current.iter().rev().find_map(|w| w.body_fat_percent).map(round1),
        readings: current.len(),
    })
}

fn build_trend(
    weights: &[WeightRecord],
    window: &AnalysisWindow,
    profile: &Profile,
    config: &EngineConfig,
) -> Result<WeightTrend, AnalyticsError> {
    let current = window.current(weights);
    check_all(&current, WeightRecord::check)?;

    let Some((granularity, start, end)) = series_layout(window, &current, config) else {
        return Ok(WeightTrend {
            goal_weight: profile.goal_weight_kg,
            ..Default::default()
        });
    };

    let buckets = bucket(
        &current,
        granularity,
        start,
        end,
        |w| window.day_of(*w),
        mean_of(|w: &&WeightRecord| w.weight_kg),
    );

    let series: Vec<Option<f64>> = buckets.iter().map(|b| b.value).collect();
    let smoothed = sma_sparse(&series, config.weight_trend_period);

    debug!(
        range = %window.range,
        ?granularity,
        buckets = buckets.len(),
        readings = current.len(),
        "built weight trend"
    );

    let points = buckets
        .into_iter()
        .zip(smoothed)
        .map(|(b, moving_average)| WeightPoint {
            key: b.key,
            label: b.label,
            weight: b.value.map(round1),
            bmi: b.value.and_then(|kg| bmi(kg, profile.height_cm)),
            moving_average: moving_average.map(round1),
        })
        .collect();

    Ok(WeightTrend {
        granularity,
        points,
        goal_weight: profile.goal_weight_kg,
    })
}
