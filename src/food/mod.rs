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
        .route("/food", get(handlers::food_log_page))
        .route("/food/parse", post(handlers::parse_natural))
        .route("/food/natural", post(handlers::log_natural))
        .route("/food/manual", post(handlers::log_manual))
        .route("/food/log/:id", get(handlers::entry_detail))
}
