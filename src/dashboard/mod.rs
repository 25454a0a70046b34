use axum::{response::Redirect, routing::get, Router};

use crate::state::AppState;

mod api;
pub mod chart;
pub mod dto;
pub mod handlers;
pub mod insights;
pub mod progress;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/dashboard") }))
        .route("/dashboard", get(handlers::dashboard))
        .route("/dashboard/weekly", get(handlers::weekly))
        .route("/dashboard/monthly", get(handlers::monthly))
}
