use tracing::instrument;

use super::dto::{GoalInput, NutritionGoal};
use crate::client::{Ack, ApiClient, ApiError};

impl ApiClient {
    #[instrument(skip_all, fields(name = %input.description))]
    pub async fn create_goal(&self, input: &GoalInput) -> Result<NutritionGoal, ApiError> {
        self.post("/nutrition/goals", input).await
    }

    #[instrument(skip(self))]
    pub async fn goals(&self) -> Result<Vec<NutritionGoal>, ApiError> {
        self.get("/nutrition/goals").await
    }

    /// The active goal; `Ok(None)` when the user has none.
    #[instrument(skip(self))]
    pub async fn current_goal(&self) -> Result<Option<NutritionGoal>, ApiError> {
        match self.get("/nutrition/goals/current").await {
            Ok(goal) => Ok(Some(goal)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn update_goal(&self, id: i64, input: &GoalInput) -> Result<NutritionGoal, ApiError> {
        self.put(&format!("/nutrition/goals/{id}"), input).await
    }

    #[instrument(skip(self))]
    pub async fn delete_goal(&self, id: i64) -> Result<Option<Ack>, ApiError> {
        self.delete(&format!("/nutrition/goals/{id}")).await
    }

    #[instrument(skip(self))]
    pub async fn activate_goal(&self, id: i64) -> Result<Option<Ack>, ApiError> {
        self.post_empty(&format!("/nutrition/goals/{id}/activate"))
            .await
    }
}
