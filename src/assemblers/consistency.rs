//! Workout consistency (streaks, adherence) and the daily intensity heatmap

use super::{check_all, degrade};
use crate::bucket::{bucket, Granularity};
use crate::error::AnalyticsError;
use crate::range::{actual_start, inclusive_days, AnalysisWindow};
use crate::streak::{adherence_rate, compute_streaks};
use crate::types::{round_half_up, EffortLevel, Profile, WorkoutRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Consistency {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub active_days: usize,
    pub total_days: i64,
    /// Active days normalized to sessions per week
    pub adherence_rate: f64,
    pub weekly_goal: Option<u32>,
    /// Adherence rate against the weekly goal, capped at 100
    pub goal_adherence_percent: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub key: String,
    pub label: String,
    pub workouts: u32,
    pub minutes: f64,
    /// Averaged effort rank (1-5), `None` on rest days
    pub intensity: Option<u8>,
    pub effort_level: Option<EffortLevel>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntensityHeatmap {
    pub cells: Vec<HeatmapCell>,
}

pub fn consistency(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    profile: &Profile,
) -> Consistency {
    degrade("consistency", build_consistency(workouts, window, profile))
}

pub fn intensity_heatmap(workouts: &[WorkoutRecord], window: &AnalysisWindow) -> IntensityHeatmap {
    degrade("intensity_heatmap", build_heatmap(workouts, window))
}

/// Mean effort rank of a day's workouts, rounded and clamped to 1-5
fn average_effort(workouts: &[&&WorkoutRecord]) -> Option<u8> {
    if workouts.is_empty() {
        return None;
    }
    let sum: u32 = workouts.iter().map(|w| u32::from(w.effort_level.rank())).sum();
    let mean = round_half_up(f64::from(sum) / workouts.len() as f64);
    let rank = mean.clamp(
        f64::from(EffortLevel::MIN_RANK),
        f64::from(EffortLevel::MAX_RANK),
    ) as u8;
    Some(rank)
}

fn build_consistency(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
    profile: &Profile,
) -> Result<Consistency, AnalyticsError> {
    let current = window.current(workouts);
    check_all(&current, WorkoutRecord::check)?;

    let active: BTreeSet<_> = current.iter().map(|w| window.day_of(*w)).collect();
    // For `all` the streak walk and the day count start at the first workout
    let start = window
        .periods
        .current_start
        .or_else(|| active.first().copied())
        .unwrap_or(window.today);
    let total_days = inclusive_days(start, window.today);

    let streaks = compute_streaks(&active, start, window.today);
    let rate = adherence_rate(active.len(), total_days);

    let weekly_goal = profile.weekly_workout_goal.filter(|g| *g > 0);
    let goal_adherence_percent = weekly_goal.map(|goal| {
        let raw = active.len() as f64 / total_days.max(1) as f64 * 7.0;
        (round_half_up(raw / f64::from(goal) * 100.0) as i64).min(100)
    });

    debug!(
        range = %window.range,
        active_days = active.len(),
        total_days,
        current = streaks.current,
        longest = streaks.longest,
        "built consistency"
    );

    Ok(Consistency {
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        active_days: active.len(),
        total_days,
        adherence_rate: rate,
        weekly_goal,
        goal_adherence_percent,
    })
}

fn build_heatmap(
    workouts: &[WorkoutRecord],
    window: &AnalysisWindow,
) -> Result<IntensityHeatmap, AnalyticsError> {
    let current = window.current(workouts);
    check_all(&current, WorkoutRecord::check)?;

    let first = window.day_span(&current).map(|(first, _)| first);
    let Some(start) = actual_start(window.periods.current_start, first) else {
        return Ok(IntensityHeatmap::default());
    };

    let cells = bucket(
        &current,
        Granularity::Daily,
        start,
        window.today,
        |w| window.day_of(*w),
        |members: &[&&WorkoutRecord]| {
            let minutes: f64 = members.iter().map(|w| w.duration_minutes).sum();
            (members.len() as u32, minutes, average_effort(members))
        },
    )
    .into_iter()
    .map(|b| {
        let (count, minutes, intensity) = b.value;
        HeatmapCell {
            key: b.key,
            label: b.label,
            workouts: count,
            minutes: round_half_up(minutes),
            intensity,
            effort_level: intensity.map(EffortLevel::from_rank),
        }
    })
    .collect();

    Ok(IntensityHeatmap { cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemblers::test_support::{at, date, window, workout};
    use crate::range::RangeToken;
    use crate::types::WorkoutType;
    use pretty_assertions::assert_eq;

    fn session(day: u32, effort: EffortLevel) -> WorkoutRecord {
        workout(at(2024, 3, day, 7), 30.0, None, WorkoutType::Strength, effort)
    }

    #[test]
    fn test_streaks_with_gap_on_thursday() {
        // Mon 11, Tue 12, Wed 13, Fri 15
        let workouts: Vec<WorkoutRecord> = [11, 12, 13, 15]
            .into_iter()
            .map(|d| session(d, EffortLevel::Moderate))
            .collect();
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let result = consistency(&workouts, &w, &Profile::default());

        assert_eq!(result.current_streak, 1);
        assert_eq!(result.longest_streak, 3);
        assert_eq!(result.active_days, 4);
        assert_eq!(result.total_days, 7);
        assert_eq!(result.adherence_rate, 4.0);
        assert_eq!(result.goal_adherence_percent, None);
    }

    #[test]
    fn test_two_sessions_one_day_count_once() {
        let workouts = vec![
            session(15, EffortLevel::Easy),
            workout(at(2024, 3, 15, 18), 20.0, None, WorkoutType::Yoga, EffortLevel::Easy),
        ];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let result = consistency(&workouts, &w, &Profile::default());
        assert_eq!(result.active_days, 1);
        assert_eq!(result.current_streak, 1);
    }

    #[test]
    fn test_goal_adherence_is_capped() {
        let workouts: Vec<WorkoutRecord> =
            (9..=15).map(|d| session(d, EffortLevel::Hard)).collect();
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let profile = Profile {
            weekly_workout_goal: Some(4),
            ..Default::default()
        };
        let result = consistency(&workouts, &w, &profile);
        assert_eq!(result.weekly_goal, Some(4));
        assert_eq!(result.goal_adherence_percent, Some(100));

        let half = consistency(&workouts[..2], &w, &profile);
        assert_eq!(half.goal_adherence_percent, Some(50));
    }

    #[test]
    fn test_all_range_starts_at_first_workout() {
        let workouts = vec![session(6, EffortLevel::Easy), session(15, EffortLevel::Easy)];
        let w = window(RangeToken::All, date(2024, 3, 15));
        let result = consistency(&workouts, &w, &Profile::default());
        assert_eq!(result.total_days, 10);
        assert_eq!(result.adherence_rate, 1.4);
    }

    #[test]
    fn test_empty_consistency() {
        let w = window(RangeToken::Month, date(2024, 3, 15));
        let result = consistency(&[], &w, &Profile::default());
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 0);
        assert_eq!(result.total_days, 30);
        assert_eq!(result.adherence_rate, 0.0);
    }

    #[test]
    fn test_heatmap_averages_effort() {
        let workouts = vec![
            session(13, EffortLevel::Easy),
            session(13, EffortLevel::Hard),
            session(13, EffortLevel::Maximum),
            session(15, EffortLevel::VeryHard),
            session(15, EffortLevel::Maximum),
        ];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let heatmap = intensity_heatmap(&workouts, &w);

        assert_eq!(heatmap.cells.len(), 3);
        assert_eq!(heatmap.cells[0].workouts, 3);
        assert_eq!(heatmap.cells[0].intensity, Some(3));
        assert_eq!(heatmap.cells[0].effort_level, Some(EffortLevel::Hard));
        assert_eq!(heatmap.cells[1].intensity, None);
        assert_eq!(heatmap.cells[1].workouts, 0);
        // 4.5 rounds half up
        assert_eq!(heatmap.cells[2].intensity, Some(5));
        assert_eq!(heatmap.cells[2].minutes, 60.0);
    }

    #[test]
    fn test_heatmap_all_without_data_is_empty() {
        let w = window(RangeToken::All, date(2024, 3, 15));
        assert!(intensity_heatmap(&[], &w).cells.is_empty());
    }
}
