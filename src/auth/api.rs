use tracing::instrument;

use super::dto::{LoginRequest, RegisterRequest, RegisterResponse, TokenResponse, User};
use crate::client::{ApiClient, ApiError};

impl ApiClient {
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        self.post("/auth/login", &body).await
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        self.post("/auth/register", request).await
    }

    #[instrument(skip(self))]
    pub async fn me(&self) -> Result<User, ApiError> {
        self.get("/auth/me").await
    }

    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<TokenResponse, ApiError> {
        self.post_empty("/auth/refresh").await
    }
}
