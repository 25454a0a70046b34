use serde::Serialize;
use time::Date;
use tracing::{debug, instrument};

use super::dto::{
    FoodItem, FoodLogCreate, FoodLogEntry, MealType, NaturalLanguageEntry, ParsedFoodEntry,
};
use crate::{
    client::{ApiClient, ApiError},
    formats::iso_date,
};

pub const SEARCH_LIMIT: u32 = 20;

#[derive(Serialize)]
struct SearchQuery<'a> {
    query: &'a str,
    limit: u32,
}

#[derive(Serialize)]
struct LogsQuery {
    #[serde(with = "iso_date::option", skip_serializing_if = "Option::is_none")]
    date: Option<Date>,
    #[serde(skip_serializing_if = "Option::is_none")]
    meal_type: Option<MealType>,
}

#[derive(Serialize)]
struct ParseRequest<'a> {
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    meal_type: Option<MealType>,
}

impl ApiClient {
    #[instrument(skip_all, fields(food_id = entry.food_id, meal = %entry.meal_type))]
    pub async fn log_food(&self, entry: &FoodLogCreate) -> Result<FoodLogEntry, ApiError> {
        self.post("/food/log", entry).await
    }

    #[instrument(skip(self, text))]
    pub async fn parse_food(&self, text: &str, meal_type: Option<MealType>) -> Result<ParsedFoodEntry, ApiError> {
        self.post("/food/parse", &ParseRequest { text, meal_type }).await
    }

    #[instrument(skip_all)]
    pub async fn log_natural(&self, entry: &NaturalLanguageEntry) -> Result<Vec<FoodLogEntry>, ApiError> {
        self.post("/food/log-natural", entry).await
    }

    /// Food database search. A blank query yields no results without calling the API.
    #[instrument(skip(self))]
    pub async fn search_foods(&self, query: &str) -> Result<Vec<FoodItem>, ApiError> {
        let query = query.trim();
        if query.is_empty() {
            debug!("blank search query");
            return Ok(Vec::new());
        }
        self.get_with(
            "/food/search",
            &SearchQuery {
                query,
                limit: SEARCH_LIMIT,
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn food_logs(
        &self,
        date: Option<Date>,
        meal_type: Option<MealType>,
    ) -> Result<Vec<FoodLogEntry>, ApiError> {
        self.get_with("/food/logs", &LogsQuery { date, meal_type })
            .await
    }

    #[instrument(skip(self))]
    pub async fn food_log(&self, id: i64) -> Result<FoodLogEntry, ApiError> {
        self.get(&format!("/food/log/{id}")).await
    }
}
