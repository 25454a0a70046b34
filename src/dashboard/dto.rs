use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    food::dto::{FoodLogEntry, MealType},
    formats::{iso_date, nullable_series},
    goals::dto::NutritionGoal,
};

/// One day's intake with the targets that applied to it.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct DailySummary {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub total_calories: f64,
    #[serde(default)]
    pub total_protein_g: f64,
    #[serde(default)]
    pub total_carbs_g: f64,
    #[serde(default)]
    pub total_fat_g: f64,
    #[serde(default)]
    pub total_fiber_g: f64,
    #[serde(default)]
    pub total_sugar_g: f64,
    #[serde(default)]
    pub total_sodium_mg: f64,
    #[serde(default)]
    pub calories_goal: Option<f64>,
    #[serde(default)]
    pub protein_goal_g: Option<f64>,
    #[serde(default)]
    pub carbs_goal_g: Option<f64>,
    #[serde(default)]
    pub fat_goal_g: Option<f64>,
    #[serde(default)]
    pub total_meals: u32,
    #[serde(default)]
    pub total_snacks: u32,
}

impl DailySummary {
    pub fn empty(date: Date) -> Self {
        Self {
            date,
            total_calories: 0.0,
            total_protein_g: 0.0,
            total_carbs_g: 0.0,
            total_fat_g: 0.0,
            total_fiber_g: 0.0,
            total_sugar_g: 0.0,
            total_sodium_mg: 0.0,
            calories_goal: None,
            protein_goal_g: None,
            carbs_goal_g: None,
            fat_goal_g: None,
            total_meals: 0,
            total_snacks: 0,
        }
    }

    /// Totals of `entries` logged on `date`; entries from other days are ignored.
    pub fn from_entries(date: Date, entries: &[FoodLogEntry], goal: Option<&NutritionGoal>) -> Self {
        let mut summary = entries
            .iter()
            .filter(|e| e.meal_time.date() == date)
            .fold(Self::empty(date), |mut acc, e| {
                acc.total_calories += e.calories;
                acc.total_protein_g += e.protein;
                acc.total_carbs_g += e.carbs;
                acc.total_fat_g += e.fat;
                acc.total_fiber_g += e.fiber;
                acc.total_sugar_g += e.sugar;
                acc.total_sodium_mg += e.sodium;
                if e.meal_type.is_main_meal() {
                    acc.total_meals += 1;
                } else if e.meal_type == MealType::Snack {
                    acc.total_snacks += 1;
                }
                acc
            });
        if let Some(goal) = goal {
            summary = summary.with_goal(goal);
        }
        summary
    }

    /// Fills targets the summary lacks from `goal`; targets already present are kept.
    pub fn with_goal(mut self, goal: &NutritionGoal) -> Self {
        self.calories_goal.get_or_insert(goal.daily_calories as f64);
        self.protein_goal_g.get_or_insert(goal.daily_protein_g);
        self.carbs_goal_g.get_or_insert(goal.daily_carbs_g);
        self.fat_goal_g.get_or_insert(goal.daily_fat_g);
        self
    }
}

/// Per-day chart series, index-aligned with `labels`.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct ProgressData {
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub calories: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub protein: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub carbs: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub fat: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub calories_goal: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub protein_goal: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub carbs_goal: Vec<f64>,
    #[serde(default, deserialize_with = "nullable_series")]
    pub fat_goal: Vec<f64>,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum InsightKind {
    Tip,
    Warning,
    Info,
    Success,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Insight {
    #[serde(rename = "type", default)]
    pub kind: InsightKind,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InsightsResponse {
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub total_entries: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WeekDay {
    #[serde(with = "iso_date")]
    pub date: Date,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub calories_progress: Option<f64>,
    #[serde(default)]
    pub protein_progress: Option<f64>,
    #[serde(default)]
    pub carbs_progress: Option<f64>,
    #[serde(default)]
    pub fat_progress: Option<f64>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WeeklySummary {
    #[serde(with = "iso_date")]
    pub week_start: Date,
    #[serde(with = "iso_date")]
    pub week_end: Date,
    #[serde(default)]
    pub summaries: Vec<WeekDay>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct NutrientTotals {
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbs: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u8,
    #[serde(with = "iso_date")]
    pub start_date: Date,
    #[serde(with = "iso_date")]
    pub end_date: Date,
    pub days_in_month: u32,
    #[serde(default)]
    pub monthly_totals: NutrientTotals,
    #[serde(default)]
    pub daily_averages: NutrientTotals,
    /// Entry count per meal type, keyed by the wire name.
    #[serde(default)]
    pub meal_distribution: BTreeMap<String, u32>,
    #[serde(default)]
    pub total_entries: u32,
}
