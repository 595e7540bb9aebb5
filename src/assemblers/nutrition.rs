//! Nutrition metrics: macro distribution and per-day nutrition averages

use super::{check_all, degrade, MetricChange};
use crate::change::compare;
use crate::config::EngineConfig;
use crate::distribution::{normalize, Share, TieBreak};
use crate::error::AnalyticsError;
use crate::range::AnalysisWindow;
use crate::types::{round1, round_half_up, Macro, MealRecord, MealType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One macronutrient's share of macro calories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MacroShare {
    #[serde(rename = "macro")]
    pub macro_kind: Macro,
    pub grams: f64,
    pub calories: f64,
    pub percent: i64,
    /// Percentage-point difference against the previous period's share
    pub change_points: Option<i64>,
}

/// Macro split of the current period (empty when no macro calories were logged)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroDistribution {
    pub total_calories: f64,
    pub macros: Vec<MacroShare>,
}

/// Calories logged per meal slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealTypeCalories {
    pub meal_type: MealType,
    pub calories: f64,
}

/// Per-day nutrition averages with period-over-period change
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutritionSummary {
    pub days_in_period: i64,
    pub meals_logged: usize,
    pub days_logged: usize,
    pub average_calories: MetricChange,
    pub average_protein: MetricChange,
    pub average_carbs: MetricChange,
    pub average_fat: MetricChange,
    pub calories_by_meal_type: Vec<MealTypeCalories>,
}

/// Macro distribution of the current period against the previous one
pub fn macro_distribution(
    meals: &[MealRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> MacroDistribution {
    degrade("macro_distribution", build_distribution(meals, window, config))
}

/// Nutrition averages of the current period against the previous one
pub fn nutrition_summary(meals: &[MealRecord], window: &AnalysisWindow) -> NutritionSummary {
    degrade("nutrition_summary", build_summary(meals, window))
}

/// Grams and calories per macro, in [`Macro::ALL`] order
fn macro_totals(meals: &[&MealRecord]) -> [(Macro, f64, f64); 3] {
    Macro::ALL.map(|m| {
        let grams: f64 = meals.iter().map(|meal| meal.grams(m)).sum();
        (m, grams, grams * m.kcal_per_gram())
    })
}

fn shares(totals: &[(Macro, f64, f64); 3], precedence: &[Macro]) -> Vec<Share<Macro>> {
    let calories: Vec<(Macro, f64)> = totals.iter().map(|(m, _, kcal)| (*m, *kcal)).collect();
    normalize(&calories, TieBreak::Precedence(precedence))
}

fn build_distribution(
    meals: &[MealRecord],
    window: &AnalysisWindow,
    config: &EngineConfig,
) -> Result<MacroDistribution, AnalyticsError> {
    let current = window.current(meals);
    check_all(&current, MealRecord::check)?;

    let totals = macro_totals(&current);
    let current_shares = shares(&totals, &config.macro_precedence);
    if current_shares.is_empty() {
        return Ok(MacroDistribution::default());
    }

    let previous_shares = if window.periods.has_comparison() {
        let previous = window.previous(meals);
        check_all(&previous, MealRecord::check)?;
        Some(shares(&macro_totals(&previous), &config.macro_precedence))
    } else {
        None
    };

    let macros = totals
        .iter()
        .zip(&current_shares)
        .map(|((m, grams, kcal), share)| {
            let change_points = previous_shares.as_ref().map(|prev| {
                // A previous period without macro calories counts as 0%
                let before = prev
                    .iter()
                    .find(|s| s.category == *m)
                    .map_or(0, |s| s.percent);
                share.percent - before
            });
            MacroShare {
                macro_kind: *m,
                grams: round1(*grams),
                calories: round_half_up(*kcal),
                percent: share.percent,
                change_points,
            }
        })
        .collect();

    let total_calories = round_half_up(totals.iter().map(|(_, _, kcal)| kcal).sum());

    Ok(MacroDistribution {
        total_calories,
        macros,
    })
}

struct DailyAverages {
    calories: f64,
    protein: f64,
    carbs: f64,
    fat: f64,
}

impl DailyAverages {
    fn of(meals: &[&MealRecord], days: i64) -> Self {
        let days = days.max(1) as f64;
        let sum = |f: fn(&MealRecord) -> f64| meals.iter().map(|m| f(m)).sum::<f64>() / days;
        Self {
            calories: sum(|m| m.calories),
            protein: sum(|m| m.protein),
            carbs: sum(|m| m.carbs),
            fat: sum(|m| m.fat),
        }
    }
}

fn build_summary(
    meals: &[MealRecord],
    window: &AnalysisWindow,
) -> Result<NutritionSummary, AnalyticsError> {
    let current = window.current(meals);
    check_all(&current, MealRecord::check)?;

    let days_in_period = window.days_in_current(&current);
    let now = DailyAverages::of(&current, days_in_period);

    let before = match window.periods.previous_day_count() {
        Some(days) => {
            let previous = window.previous(meals);
            check_all(&previous, MealRecord::check)?;
            Some(DailyAverages::of(&previous, days))
        }
        None => None,
    };

    let metric = |value: f64, previous: Option<f64>, round: fn(f64) -> f64| MetricChange {
        value: round(value),
        change: compare(value, previous),
    };

    let days_logged = current
        .iter()
        .map(|m| window.day_of(*m))
        .collect::<BTreeSet<_>>()
        .len();

    let mut by_type = [0.0_f64; MealType::ALL.len()];
    for meal in &current {
        if let Some(meal_type) = meal.meal_type {
            by_type[meal_type.index()] += meal.calories;
        }
    }
    let calories_by_meal_type = MealType::ALL
        .iter()
        .map(|t| MealTypeCalories {
            meal_type: *t,
            calories: round_half_up(by_type[t.index()]),
        })
        .collect();

    Ok(NutritionSummary {
        days_in_period,
        meals_logged: current.len(),
        days_logged,
        average_calories: metric(now.calories, before.as_ref().map(|b| b.calories), round_half_up),
        average_protein: metric(now.protein, before.as_ref().map(|b| b.protein), round1),
        average_carbs: metric(now.carbs, before.as_ref().map(|b| b.carbs), round1),
        average_fat: metric(now.fat, before.as_ref().map(|b| b.fat), round1),
        calories_by_meal_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemblers::test_support::{at, date, meal, window};
    use crate::change::PercentChange;
    use crate::range::RangeToken;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_macro_percentages_sum_to_100() {
        let meals = vec![
            meal(at(2024, 3, 14, 12), 700.0, 37.0, 81.0, 23.0),
            meal(at(2024, 3, 15, 12), 500.0, 21.0, 44.0, 19.0),
        ];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let dist = macro_distribution(&meals, &w, &EngineConfig::default());

        assert_eq!(dist.macros.len(), 3);
        assert_eq!(dist.macros.iter().map(|m| m.percent).sum::<i64>(), 100);
        assert_eq!(dist.macros[0].macro_kind, Macro::Protein);
        assert_eq!(dist.macros[0].grams, 58.0);
        assert_eq!(dist.macros[2].calories, 378.0);
    }

    #[test]
    fn test_macro_tie_goes_to_carbs_by_default() {
        // 36 kcal each
        let meals = vec![meal(at(2024, 3, 15, 12), 108.0, 9.0, 9.0, 4.0)];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let dist = macro_distribution(&meals, &w, &EngineConfig::default());

        let percents: Vec<i64> = dist.macros.iter().map(|m| m.percent).collect();
        assert_eq!(percents, vec![33, 34, 33]);
    }

    #[test]
    fn test_macro_change_is_point_difference() {
        let meals = vec![
            // previous week: 50% protein, 50% carbs
            meal(at(2024, 3, 5, 12), 400.0, 50.0, 50.0, 0.0),
            // current week: 25% protein, 75% carbs
            meal(at(2024, 3, 12, 12), 400.0, 25.0, 75.0, 0.0),
        ];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let dist = macro_distribution(&meals, &w, &EngineConfig::default());

        assert_eq!(dist.macros[0].change_points, Some(-25));
        assert_eq!(dist.macros[1].change_points, Some(25));
        assert_eq!(dist.macros[2].change_points, Some(0));
    }

    #[test]
    fn test_macro_no_comparison_for_all() {
        let meals = vec![meal(at(2024, 3, 12, 12), 400.0, 25.0, 75.0, 0.0)];
        let w = window(RangeToken::All, date(2024, 3, 15));
        let dist = macro_distribution(&meals, &w, &EngineConfig::default());
        assert!(dist.macros.iter().all(|m| m.change_points.is_none()));
    }

    #[test]
    fn test_macro_zero_total_is_empty() {
        let meals = vec![meal(at(2024, 3, 15, 12), 150.0, 0.0, 0.0, 0.0)];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let dist = macro_distribution(&meals, &w, &EngineConfig::default());
        assert_eq!(dist, MacroDistribution::default());
    }

    #[test]
    fn test_summary_averages_and_change() {
        let meals = vec![
            meal(at(2024, 3, 5, 12), 7000.0, 350.0, 700.0, 140.0),
            meal(at(2024, 3, 14, 12), 7000.0, 350.0, 700.0, 140.0),
            meal(at(2024, 3, 15, 12), 3500.0, 0.0, 0.0, 0.0),
        ];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let summary = nutrition_summary(&meals, &w);

        assert_eq!(summary.days_in_period, 7);
        assert_eq!(summary.meals_logged, 2);
        assert_eq!(summary.days_logged, 2);
        assert_eq!(summary.average_calories.value, 1500.0);
        assert_eq!(summary.average_calories.change, Some(PercentChange::Percent(50)));
        assert_eq!(summary.average_protein.value, 50.0);
        assert_eq!(summary.average_protein.change, Some(PercentChange::Percent(0)));
    }

    #[test]
    fn test_summary_all_uses_record_span() {
        let meals = vec![
            meal(at(2024, 3, 1, 12), 1000.0, 0.0, 0.0, 0.0),
            meal(at(2024, 3, 10, 12), 1000.0, 0.0, 0.0, 0.0),
        ];
        let w = window(RangeToken::All, date(2024, 3, 15));
        let summary = nutrition_summary(&meals, &w);

        assert_eq!(summary.days_in_period, 10);
        assert_eq!(summary.average_calories.value, 200.0);
        assert_eq!(summary.average_calories.change, None);
    }

    #[test]
    fn test_summary_infinite_increase() {
        let meals = vec![meal(at(2024, 3, 15, 12), 700.0, 0.0, 0.0, 0.0)];
        let w = window(RangeToken::Week, date(2024, 3, 15));
        let summary = nutrition_summary(&meals, &w);
        assert_eq!(summary.average_calories.change, Some(PercentChange::Infinite));
        assert_eq!(summary.average_fat.change, Some(PercentChange::Percent(0)));
    }

    #[test]
    fn test_calories_by_meal_type() {
        let mut breakfast = meal(at(2024, 3, 15, 8), 400.0, 0.0, 0.0, 0.0);
        breakfast.meal_type = Some(MealType::Breakfast);
        let mut snack = meal(at(2024, 3, 15, 16), 150.0, 0.0, 0.0, 0.0);
        snack.meal_type = Some(MealType::Snack);
        let untyped = meal(at(2024, 3, 15, 20), 900.0, 0.0, 0.0, 0.0);

        let w = window(RangeToken::Week, date(2024, 3, 15));
        let summary = nutrition_summary(&[breakfast, snack, untyped], &w);

        let by_type: Vec<f64> = summary.calories_by_meal_type.iter().map(|c| c.calories).collect();
        assert_eq!(by_type, vec![400.0, 0.0, 0.0, 150.0]);
    }
}
