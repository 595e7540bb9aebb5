//! Workout metrics: summary, duration and calories-burned trends, type distribution

use super::{check_all, degrade, series_layout, MetricChange};
use crate::bucket::{bucket, sum_of, Granularity};
use crate::change::compare;
use crate::config::EngineConfig;
use crate::distribution::{normalize, TieBreak};
use crate::error::AnalyticsError;
use crate::range::AnalysisWindow;
use crate::smoothing::sma;
use crate::types::{round1, round_half_up, WorkoutRecord, WorkoutType};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Workout totals for the current period with change against the previous one
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutSummary {
    pub days_in_period: i64,
    pub total_workouts: MetricChange,
    pub total_minutes: MetricChange,
    pub total_calories_burned: MetricChange,
    pub average_minutes_per_workout: f64,
    pub average_daily_minutes: MetricChange,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub key: String,
    pub label: String,
    pub value: f64,
    /// Strict SMA: `None` until a full window of buckets exists
    pub moving_average: Option<f64>,
}

/// A summed workout series with its moving-average overlay
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub granularity: Granularity,
    pub points: Vec<TrendPoint>,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeShare {
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub count: u32,
    pub minutes: f64,
    pub percent: i64,
}

/// Workout counts per type, ranked by count
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkoutTypeDistribution {
    pub total_workouts: u32,
    pub types: Vec<TypeShare>,
}

pub fn workout_summary(workouts: &[WorkoutRecord], window: &AnalysisWindow) -> WorkoutSummary {
    degrade("workout_summary", build_summary(workouts, window))
}

/// Minutes trained per bucket
pub fn duration_trend(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> TrendSeries {
    degrade(
        "duration_trend",
        build_trend(workouts, window, config, |w| w.duration_minutes),
    )
}

/// Calories burned per bucket; workouts without an estimate count as zero
pub fn calories_burned_trend(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> TrendSeries {
    degrade(
        "calories_burned_trend",
        build_trend(workouts, window, config, |w| w.calories_burned.unwrap_or(0.0)),
    )
}

pub fn workout_type_distribution(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> WorkoutTypeDistribution {
    degrade(
        "workout_type_distribution",
        build_distribution(workouts, window, config),
    )
}

struct Totals {
    count: f64,
    minutes: f64,
    burned: f64,
}

impl Totals {
    fn of(workouts: &[&WorkoutRecord]) -> Self {
        Self {
            count: workouts.len() as f64,
            minutes: workouts.iter().map(|w| w.duration_minutes).sum(),
            burned: workouts.iter().filter_map(|w| w.calories_burned).sum(),
        }
    }
}

fn build_summary(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
) -> Result<WorkoutSummary, AnalyticsError> {
    let current = window.current(workouts);
    check_all(&current, WorkoutRecord::check)?;

    let previous = if window.periods.has_comparison() {
        let previous = window.previous(workouts);
        check_all(&previous, WorkoutRecord::check)?;
        Some(Totals::of(&previous))
    } else {
        None
    };

    let now = Totals::of(&current);
    let days_in_period = window.days_in_current(&current);
    let daily = now.minutes / days_in_period.max(1) as f64;
    let previous_daily = match (previous.as_ref(), window.periods.previous_day_count()) {
        (Some(p), Some(days)) => Some(p.minutes / days.max(1) as f64),
        _ => None,
    };

    let average_minutes_per_workout = if now.count > 0.0 {
        round1(now.minutes / now.count)
    } else {
        0.0
    };

    Ok(WorkoutSummary {
        days_in_period,
        total_workouts: MetricChange {
            value: now.count,
            change: compare(now.count, previous.as_ref().map(|p| p.count)),
        },
        total_minutes: MetricChange {
            value: round_half_up(now.minutes),
            change: compare(now.minutes, previous.as_ref().map(|p| p.minutes)),
        },
        total_calories_burned: MetricChange {
            value: round_half_up(now.burned),
            change: compare(now.burned, previous.as_ref().map(|p| p.burned)),
        },
        average_minutes_per_workout,
        average_daily_minutes: MetricChange {
            value: round1(daily),
            change: compare(daily, previous_daily),
        },
    })
}

fn build_trend(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
    field: fn(&WorkoutRecord) -> f64,
) -> Result<TrendSeries, AnalyticsError> {
    let current = window.current(workouts);
    check_all(&current, WorkoutRecord::check)?;

    let Some((granularity, start, end)) = series_layout(window, &current, config) else {
        return Ok(TrendSeries::default());
    };

    let buckets = bucket(
        &current,
        granularity,
        start,
        end,
        |w| window.day_of(*w),
        sum_of(|w: &&WorkoutRecord| field(w)),
    );

    let period = match granularity {
        Granularity::Daily => config.daily_trend_period,
        Granularity::Weekly => config.weekly_trend_period,
    };
    let values: Vec<f64> = buckets.iter().map(|b| b.value).collect();
    let smoothed = sma(&values, period);
    let total = round_half_up(values.iter().sum());

    debug!(
        range = %window.range,
        ?granularity,
        period,
        buckets = buckets.len(),
        "built workout trend"
    );

    let points = buckets
        .into_iter()
        .zip(smoothed)
        .map(|(b, moving_average)| TrendPoint {
            key: b.key,
            label: b.label,
            value: round_half_up(b.value),
            moving_average: moving_average.map(round1),
        })
        .collect();

    Ok(TrendSeries {
        granularity,
        points,
        total,
    })
}

fn build_distribution(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> Result<WorkoutTypeDistribution, AnalyticsError> {
    let current = window.current(workouts);
    check_all(&current, WorkoutRecord::check)?;

    let mut counts = [0u32; WorkoutType::ALL.len()];
    let mut minutes = [0.0_f64; WorkoutType::ALL.len()];
    for workout in &current {
        let i = workout.workout_type.index();
        counts[i] += 1;
        minutes[i] += workout.duration_minutes;
    }

    let totals: Vec<(WorkoutType, f64)> = WorkoutType::ALL
        .iter()
        .filter(|t| counts[t.index()] > 0)
        .map(|t| (*t, f64::from(counts[t.index()])))
        .collect();

    let precedence = config.workout_type_precedence.as_slice();
    let mut types: Vec<TypeShare> = normalize(&totals, TieBreak::Precedence(precedence))
        .into_iter()
        .map(|share| TypeShare {
            workout_type: share.category,
            count: counts[share.category.index()],
            minutes: round_half_up(minutes[share.category.index()]),
            percent: share.percent,
        })
        .collect();

    let rank = |t: WorkoutType| {
        precedence
            .iter()
            .position(|p| *p == t)
            .unwrap_or(precedence.len() + t.index())
    };
    types.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| rank(a.workout_type).cmp(&rank(b.workout_type)))
    });

    Ok(WorkoutTypeDistribution {
        total_workouts: counts.iter().sum(),
        types,
    })
}
