use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::formats::timestamp;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    #[default]
    Breakfast,
    Lunch,
    Dinner,
    Snack,
    Other,
}

impl MealType {
    pub const ALL: [MealType; 5] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
        MealType::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
            MealType::Other => "other",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MealType::Breakfast => "Breakfast",
            MealType::Lunch => "Lunch",
            MealType::Dinner => "Dinner",
            MealType::Snack => "Snack",
            MealType::Other => "Other",
        }
    }

    /// Breakfast, lunch and dinner count as meals in daily summaries.
    pub fn is_main_meal(self) -> bool {
        matches!(self, MealType::Breakfast | MealType::Lunch | MealType::Dinner)
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MealType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MealType::ALL.into_iter().find(|m| m.as_str() == s).ok_or(())
    }
}

/// Food database record returned by search.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FoodItem {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub calories_per_100g: Option<f64>,
    #[serde(default)]
    pub protein_per_100g: Option<f64>,
    #[serde(default)]
    pub carbs_per_100g: Option<f64>,
    #[serde(default)]
    pub fat_per_100g: Option<f64>,
    #[serde(default)]
    pub fiber_per_100g: Option<f64>,
    #[serde(default)]
    pub sugar_per_100g: Option<f64>,
    #[serde(default)]
    pub sodium_per_100g: Option<f64>,
    #[serde(default)]
    pub serving_size: Option<String>,
    #[serde(default)]
    pub serving_weight_grams: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct FoodLogEntry {
    pub id: i64,
    pub food_id: i64,
    pub food_name: String,
    pub quantity: f64,
    pub unit: String,
    #[serde(default)]
    pub weight_grams: Option<f64>,
    pub meal_type: MealType,
    #[serde(with = "timestamp")]
    pub meal_time: PrimitiveDateTime,
    #[serde(default)]
    pub notes: Option<String>,
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
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<PrimitiveDateTime>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FoodLogCreate {
    pub food_id: i64,
    pub quantity: f64,
    pub unit: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_grams: Option<f64>,
    pub meal_type: MealType,
    #[serde(with = "timestamp")]
    pub meal_time: PrimitiveDateTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NaturalLanguageEntry {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meal_type: Option<MealType>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "timestamp::option::serialize"
    )]
    pub meal_time: Option<PrimitiveDateTime>,
}

/// One food the parser recognised in free text.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParsedFood {
    pub item: String,
    pub quantity: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ParsedFoodEntry {
    #[serde(default)]
    pub foods: Vec<ParsedFood>,
    #[serde(default)]
    pub meal_type: Option<MealType>,
    #[serde(default, with = "timestamp::option")]
    pub meal_time: Option<PrimitiveDateTime>,
    #[serde(default)]
    pub confidence: f64,
}

#[cfg(test)]
mod food_dto_tests {
    use super::*;
    use serde_json::json;
    use time::macros::datetime;

    #[test]
    fn log_entry_parses_api_payload() {
        let entry: FoodLogEntry = serde_json::from_value(json!({
            "id": 3, "food_id": 11, "food_name": "Paneer", "quantity": 150.0, "unit": "g",
            "weight_grams": 150.0, "meal_type": "dinner", "meal_time": "2024-05-01T19:30:00",
            "notes": null, "calories": 397.5, "protein": 27.0, "carbs": 5.3, "fat": 30.0,
            "fiber": 0.0, "sugar": 3.0, "sodium": 27.0, "created_at": "2024-05-01T19:31:02.5"
        }))
        .unwrap();
        assert_eq!(entry.meal_type, MealType::Dinner);
        assert_eq!(entry.meal_time, datetime!(2024-05-01 19:30:00));
        assert!(entry.meal_type.is_main_meal());
    }

    #[test]
    fn create_body_matches_api_shape() {
        let body = serde_json::to_value(FoodLogCreate {
            food_id: 11,
            quantity: 100.0,
            unit: "g".into(),
            weight_grams: None,
            meal_type: MealType::Breakfast,
            meal_time: datetime!(2024-05-01 08:00:00),
            notes: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({"food_id": 11, "quantity": 100.0, "unit": "g",
                   "meal_type": "breakfast", "meal_time": "2024-05-01T08:00:00"})
        );
    }

    #[test]
    fn natural_entry_omits_unset_fields() {
        let body = serde_json::to_value(NaturalLanguageEntry {
            text: "2 rotis and dal".into(),
            meal_type: Some(MealType::Lunch),
            meal_time: None,
        })
        .unwrap();
        assert_eq!(body, json!({"text": "2 rotis and dal", "meal_type": "lunch"}));
    }

    #[test]
    fn meal_type_strings() {
        assert_eq!("snack".parse(), Ok(MealType::Snack));
        assert!(!MealType::Snack.is_main_meal());
        assert_eq!(MealType::default().to_string(), "breakfast");
    }
}
