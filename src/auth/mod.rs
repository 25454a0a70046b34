use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

mod api;
pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod session;
pub mod token;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(handlers::login_page).post(handlers::login))
        .route("/register", get(handlers::register_page).post(handlers::register))
        .route("/logout", post(handlers::logout))
}
