use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod api;
pub mod bmi;
pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile_page).post(handlers::update_profile))
        .route("/profile/password", post(handlers::change_password))
        .route("/profile/deactivate", post(handlers::deactivate))
}
