//! Core record types for the FitTrack Trends engine
//!
//! This module defines the dated log records the engine consumes (meals, workouts,
//! weight readings), the user profile overlay, and the closed category enums used
//! for fixed-size aggregation.

use crate::error::AnalyticsError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Meal slot a food log belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    /// Position in [`MealType::ALL`], used for fixed-size accumulators
    pub fn index(&self) -> usize {
        match self {
            MealType::Breakfast => 0,
            MealType::Lunch => 1,
            MealType::Dinner => 2,
            MealType::Snack => 3,
        }
    }
}

/// Workout category (closed set of eight)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutType {
    Strength,
    Cardio,
    Hiit,
    Running,
    Cycling,
    Swimming,
    Yoga,
    Other,
}

impl WorkoutType {
    pub const ALL: [WorkoutType; 8] = [
        WorkoutType::Strength,
        WorkoutType::Cardio,
        WorkoutType::Hiit,
        WorkoutType::Running,
        WorkoutType::Cycling,
        WorkoutType::Swimming,
        WorkoutType::Yoga,
        WorkoutType::Other,
    ];

    pub fn index(&self) -> usize {
        match self {
            WorkoutType::Strength => 0,
            WorkoutType::Cardio => 1,
            WorkoutType::Hiit => 2,
            WorkoutType::Running => 3,
            WorkoutType::Cycling => 4,
            WorkoutType::Swimming => 5,
            WorkoutType::Yoga => 6,
            WorkoutType::Other => 7,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkoutType::Strength => "strength",
            WorkoutType::Cardio => "cardio",
            WorkoutType::Hiit => "hiit",
            WorkoutType::Running => "running",
            WorkoutType::Cycling => "cycling",
            WorkoutType::Swimming => "swimming",
            WorkoutType::Yoga => "yoga",
            WorkoutType::Other => "other",
        }
    }
}

/// Perceived effort, ordinally ranked 1 (easy) to 5 (maximum)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffortLevel {
    Easy,
    Moderate,
    Hard,
    VeryHard,
    Maximum,
}

impl EffortLevel {
    pub const MIN_RANK: u8 = 1;
    pub const MAX_RANK: u8 = 5;

    pub fn rank(&self) -> u8 {
        match self {
            EffortLevel::Easy => 1,
            EffortLevel::Moderate => 2,
            EffortLevel::Hard => 3,
            EffortLevel::VeryHard => 4,
            EffortLevel::Maximum => 5,
        }
    }

    /// Map a rank back to a level; ranks outside 1-5 are clamped
    pub fn from_rank(rank: u8) -> Self {
        match rank.clamp(Self::MIN_RANK, Self::MAX_RANK) {
            1 => EffortLevel::Easy,
            2 => EffortLevel::Moderate,
            3 => EffortLevel::Hard,
            4 => EffortLevel::VeryHard,
            _ => EffortLevel::Maximum,
        }
    }
}

/// Macronutrient
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Macro {
    Protein,
    Carbs,
    Fat,
}

impl Macro {
    pub const ALL: [Macro; 3] = [Macro::Protein, Macro::Carbs, Macro::Fat];

    /// Energy density in kcal per gram
    pub fn kcal_per_gram(&self) -> f64 {
        match self {
            Macro::Protein | Macro::Carbs => 4.0,
            Macro::Fat => 9.0,
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    /// When the meal was eaten
    pub date: DateTime<Utc>,
    /// Energy (kcal)
    pub calories: f64,
    /// Protein (g)
    #[serde(default)]
    pub protein: f64,
    /// Carbohydrates (g)
    #[serde(default)]
    pub carbs: f64,
    /// Fat (g)
    #[serde(default)]
    pub fat: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
}

impl MealRecord {
    /// Grams of a single macronutrient
    pub fn grams(&self, macro_kind: Macro) -> f64 {
        match macro_kind {
            Macro::Protein => self.protein,
            Macro::Carbs => self.carbs,
            Macro::Fat => self.fat,
        }
    }

    /// Reject non-finite or negative nutrition values
    pub fn check(&self) -> Result<(), AnalyticsError> {
        non_negative("calories", self.calories)?;
        non_negative("protein", self.protein)?;
        non_negative("carbs", self.carbs)?;
        non_negative("fat", self.fat)?;
        Ok(())
    }
}

/// A logged workout session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub duration_minutes: f64,
    /// Estimated energy expenditure (kcal), if the logger provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<f64>,
    #[serde(rename = "type")]
    pub workout_type: WorkoutType,
    pub effort_level: EffortLevel,
}

impl WorkoutRecord {
    pub fn check(&self) -> Result<(), AnalyticsError> {
        non_negative("duration_minutes", self.duration_minutes)?;
        if let Some(burned) = self.calories_burned {
            non_negative("calories_burned", burned)?;
        }
        Ok(())
    }
}

/// A body weight reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,
    pub date: DateTime<Utc>,
    pub weight_kg: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_fat_percent: Option<f64>,
}

impl WeightRecord {
    pub fn check(&self) -> Result<(), AnalyticsError> {
        if !self.weight_kg.is_finite() || self.weight_kg <= 0.0 {
            return Err(AnalyticsError::InvalidValue {
                field: "weight_kg",
                value: self.weight_kg,
            });
        }
        if let Some(body_fat) = self.body_fat_percent {
            if !(0.0..=100.0).contains(&body_fat) {
                return Err(AnalyticsError::InvalidValue {
                    field: "body_fat_percent",
                    value: body_fat,
                });
            }
        }
        Ok(())
    }
}

/// User profile values used as constant overlays (never aggregated)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub height_cm: Option<f64>,
    /// Baseline weight recorded at onboarding
    #[serde(default)]
    pub starting_weight_kg: Option<f64>,
    #[serde(default)]
    pub goal_weight_kg: Option<f64>,
    #[serde(default)]
    pub daily_calorie_goal: Option<f64>,
    #[serde(default)]
    pub weekly_workout_goal: Option<u32>,
}

/// Anything carrying a timestamp and an optional storage id
pub trait Dated {
    fn timestamp(&self) -> DateTime<Utc>;
    fn record_id(&self) -> Option<Uuid>;
}

impl Dated for MealRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }
    fn record_id(&self) -> Option<Uuid> {
        self.id
    }
}

impl Dated for WorkoutRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }
    fn record_id(&self) -> Option<Uuid> {
        self.id
    }
}

impl Dated for WeightRecord {
    fn timestamp(&self) -> DateTime<Utc> {
        self.date
    }
    fn record_id(&self) -> Option<Uuid> {
        self.id
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<f64, AnalyticsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(AnalyticsError::InvalidValue { field, value })
    }
}

/// Round to the nearest integer, halves toward positive infinity
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Round to one decimal place, halves toward positive infinity
pub fn round1(value: f64) -> f64 {
    round_half_up(value * 10.0) / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effort_rank_roundtrip() {
        for level in [
            EffortLevel::Easy,
            EffortLevel::Moderate,
            EffortLevel::Hard,
            EffortLevel::VeryHard,
            EffortLevel::Maximum,
        ] {
            assert_eq!(EffortLevel::from_rank(level.rank()), level);
        }
        assert_eq!(EffortLevel::from_rank(0), EffortLevel::Easy);
        assert_eq!(EffortLevel::from_rank(9), EffortLevel::Maximum);
    }

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round1(22.857), 22.9);
    }

    #[test]
    fn test_workout_deserialize() {
        let json = r#"{
            "date": "2024-01-15T07:30:00Z",
            "duration_minutes": 45,
            "type": "hiit",
            "effort_level": "very_hard"
        }"#;
        let workout: WorkoutRecord = serde_json::from_str(json).unwrap();
        assert_eq!(workout.workout_type, WorkoutType::Hiit);
        assert_eq!(workout.effort_level.rank(), 4);
        assert!(workout.calories_burned.is_none());
        assert!(workout.id.is_none());
    }

    #[test]
    fn test_record_checks() {
        let json = r#"{"date": "2024-01-15T12:00:00Z", "calories": -10}"#;
        let meal: MealRecord = serde_json::from_str(json).unwrap();
        assert!(matches!(
            meal.check(),
            Err(AnalyticsError::InvalidValue { field: "calories", .. })
        ));

        let weight = WeightRecord {
            id: None,
            date: meal.date,
            weight_kg: f64::NAN,
            body_fat_percent: None,
        };
        assert!(weight.check().is_err());
    }

    #[test]
    fn test_indices_match_all_order() {
        for (i, t) in WorkoutType::ALL.iter().enumerate() {
            assert_eq!(t.index(), i);
        }
        for (i, m) in MealType::ALL.iter().enumerate() {
            assert_eq!(m.index(), i);
        }
    }
}
