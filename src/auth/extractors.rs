use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};

use super::dto::User;
use crate::state::AppState;

const REFRESH_WINDOW: time::Duration = time::Duration::minutes(5);

/// The signed-in user; pages that need one send everybody else to `/login`. A token close to
/// expiry is renewed on the way in.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Redirect;

    async fn from_request_parts(_parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        state.session.keep_alive(REFRESH_WINDOW).await;
        state
            .session
            .current_user()
            .await
            .map(CurrentUser)
            .ok_or_else(|| Redirect::to("/login"))
    }
}
