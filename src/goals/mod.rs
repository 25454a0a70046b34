use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod api;
pub mod dto;
pub mod handlers;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/goals", get(handlers::goals_page).post(handlers::create_goal))
        .route("/goals/:id", post(handlers::update_goal))
        .route("/goals/:id/delete", post(handlers::delete_goal))
        .route("/goals/:id/activate", post(handlers::activate_goal))
}
