use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, PrimitiveDateTime};

use crate::formats::{iso_date, timestamp};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    WeightLoss,
    WeightGain,
    #[default]
    Maintenance,
    MuscleGain,
}

impl GoalType {
    pub const ALL: [GoalType; 4] = [
        GoalType::WeightLoss,
        GoalType::WeightGain,
        GoalType::Maintenance,
        GoalType::MuscleGain,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::WeightLoss => "weight_loss",
            GoalType::WeightGain => "weight_gain",
            GoalType::Maintenance => "maintenance",
            GoalType::MuscleGain => "muscle_gain",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            GoalType::WeightLoss => "Weight loss",
            GoalType::WeightGain => "Weight gain",
            GoalType::Maintenance => "Maintenance",
            GoalType::MuscleGain => "Muscle gain",
        }
    }
}

impl FromStr for GoalType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoalType::ALL.into_iter().find(|g| g.as_str() == s).ok_or(())
    }
}

/// A named bundle of daily targets. At most one per user is active.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct NutritionGoal {
    pub id: i64,
    pub daily_calories: u32,
    pub daily_protein_g: f64,
    pub daily_carbs_g: f64,
    pub daily_fat_g: f64,
    #[serde(default)]
    pub daily_fiber_g: Option<f64>,
    #[serde(default)]
    pub daily_sugar_g: Option<f64>,
    #[serde(default)]
    pub daily_sodium_mg: Option<f64>,
    #[serde(default)]
    pub target_weight_kg: Option<f64>,
    /// Display name of the goal.
    #[serde(default, alias = "name")]
    pub description: Option<String>,
    #[serde(default)]
    pub goal_type: GoalType,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default, with = "iso_date::option")]
    pub start_date: Option<Date>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<PrimitiveDateTime>,
}

impl NutritionGoal {
    pub fn name(&self) -> String {
        match self.description.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Goal #{}", self.id),
        }
    }
}

/// Body of create and update calls.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GoalInput {
    pub daily_calories: u32,
    pub daily_protein_g: f64,
    pub daily_carbs_g: f64,
    pub daily_fat_g: f64,
    pub daily_fiber_g: Option<f64>,
    pub daily_sugar_g: Option<f64>,
    pub daily_sodium_mg: Option<f64>,
    pub target_weight_kg: Option<f64>,
    pub description: String,
    pub goal_type: GoalType,
}

/// The user's goals as last listed, kept consistent with the single-active rule.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalSet {
    goals: Vec<NutritionGoal>,
}

impl GoalSet {
    pub fn new(goals: Vec<NutritionGoal>) -> Self {
        Self { goals }
    }

    pub fn iter(&self) -> impl Iterator<Item = &NutritionGoal> {
        self.goals.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&NutritionGoal> {
        self.goals.iter().find(|g| g.id == id)
    }

    /// Marks `id` as the only active goal. Unknown ids leave the set untouched.
    pub fn activate(&mut self, id: i64) -> bool {
        if self.get(id).is_none() {
            return false;
        }
        for goal in &mut self.goals {
            goal.is_active = goal.id == id;
        }
        true
    }
}

#[cfg(test)]
pub(crate) mod goal_dto_tests {
    use super::*;
    use serde_json::json;

    pub(crate) fn goal(id: i64, active: bool) -> NutritionGoal {
        NutritionGoal {
            id,
            daily_calories: 2000,
            daily_protein_g: 150.0,
            daily_carbs_g: 200.0,
            daily_fat_g: 65.0,
            daily_fiber_g: Some(25.0),
            daily_sugar_g: Some(50.0),
            daily_sodium_mg: Some(2300.0),
            target_weight_kg: None,
            description: Some(format!("Plan {id}")),
            goal_type: GoalType::Maintenance,
            is_active: active,
            start_date: None,
            created_at: None,
        }
    }

    fn active_ids(set: &GoalSet) -> Vec<i64> {
        set.iter().filter(|g| g.is_active).map(|g| g.id).collect()
    }

    #[test]
    fn activating_leaves_exactly_one_active() {
        let mut set = GoalSet::new(vec![goal(1, true), goal(2, false), goal(3, true)]);
        assert!(set.activate(2));
        assert_eq!(active_ids(&set), vec![2]);
        assert!(set.get(1).is_some_and(|g| !g.is_active));
    }

    #[test]
    fn activating_unknown_goal_changes_nothing() {
        let mut set = GoalSet::new(vec![goal(1, true), goal(2, false)]);
        let before = set.clone();
        assert!(!set.activate(42));
        assert_eq!(set, before);
    }

    #[test]
    fn api_payload_parses_with_name_alias() {
        let goal: NutritionGoal = serde_json::from_value(json!({
            "id": 9, "daily_calories": 1800, "daily_protein_g": 120.0,
            "daily_carbs_g": 180.0, "daily_fat_g": 60.0, "daily_fiber_g": null,
            "daily_sugar_g": null, "daily_sodium_mg": null, "target_weight_kg": 68.0,
            "name": "Summer cut", "goal_type": "weight_loss", "is_active": true,
            "start_date": "2024-05-01", "created_at": "2024-05-01T08:00:00"
        }))
        .unwrap();
        assert_eq!(goal.name(), "Summer cut");
        assert_eq!(goal.goal_type, GoalType::WeightLoss);
        assert_eq!(goal.start_date, Some(time::macros::date!(2024 - 05 - 01)));
    }

    #[test]
    fn unnamed_goal_falls_back_to_id() {
        let mut unnamed = goal(4, false);
        unnamed.description = Some("  ".into());
        assert_eq!(unnamed.name(), "Goal #4");
    }
}
