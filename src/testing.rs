//! Loopback servers for tests: a stand-in for the remote API and the web app itself.

use axum::Router;
use tokio::net::TcpListener;

use crate::{app::build_app, state::AppState};

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn_fake_api(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind fake api");
    let addr = listener.local_addr().expect("fake api addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("fake api serve");
    });
    format!("http://{addr}")
}

/// Runs the full web app against `state` and returns its base URL.
pub async fn spawn_app(state: AppState) -> String {
    spawn_fake_api(build_app(state)).await
}

/// Browser stand-in that does not follow redirects, so tests can assert on `Location`.
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("test client")
}

/// `POST /api/v1/auth/login` that signs anybody in as user 7.
pub fn login_route() -> Router {
    use axum::{routing::post, Json};
    use serde_json::json;

    Router::new().route(
        "/api/v1/auth/login",
        post(|| async {
            Json(json!({
                "access_token": "test-token",
                "token_type": "bearer",
                "user": {
                    "id": 7, "email": "ana@example.com", "username": "ana",
                    "first_name": "Ana", "is_active": true,
                    "created_at": "2024-05-01T12:30:00"
                }
            }))
        }),
    )
}

/// App state against `api` (plus [`login_route`]) with the session already signed in.
pub async fn signed_in_state(api: Router) -> AppState {
    let base = spawn_fake_api(api.merge(login_route())).await;
    let state = AppState::fake(&format!("{base}/api/v1"));
    state
        .session
        .login("ana@example.com", "Secret123")
        .await
        .expect("fake login");
    state
}
