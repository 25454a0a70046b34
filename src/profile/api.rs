use tracing::instrument;

use super::dto::{PasswordChange, ProfileUpdate};
use crate::{
    auth::dto::User,
    client::{Ack, ApiClient, ApiError},
};

impl ApiClient {
    #[instrument(skip(self))]
    pub async fn profile(&self) -> Result<User, ApiError> {
        self.get("/users/profile").await
    }

    #[instrument(skip_all)]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.put("/users/profile", update).await
    }

    #[instrument(skip_all)]
    pub async fn change_password(&self, change: &PasswordChange) -> Result<Option<Ack>, ApiError> {
        self.post("/users/change-password", change).await
    }

    /// Soft delete; the API keeps the record but marks it inactive.
    #[instrument(skip(self))]
    pub async fn deactivate_account(&self) -> Result<Option<Ack>, ApiError> {
        self.delete("/users/account").await
    }
}
