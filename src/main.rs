mod app;
mod auth;
mod client;
mod config;
mod dashboard;
mod food;
mod formats;
mod forms;
mod goals;
mod html;
mod notify;
mod profile;
mod state;
#[cfg(test)]
mod testing;
mod web;

use crate::{
    app::{build_app, serve},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "mealmind_web=debug,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;
    tracing::info!(api = %state.config.api.base_url, "nutrition api configured");

    serve(build_app(state)).await
}
