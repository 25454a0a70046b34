use std::net::SocketAddr;

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{auth, dashboard, food, goals, profile, state::AppState, web::same_origin};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(food::router())
        .merge(goals::router())
        .merge(profile::router())
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(middleware::from_fn(same_origin))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>, latency: std::time::Duration, span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "3000".into())
    )
    .parse()?;

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod app_tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };

    use axum::{http::StatusCode, routing::delete, Json};
    use serde_json::json;

    use super::*;
    use crate::testing::{browser, signed_in_state, spawn_app};

    #[tokio::test]
    async fn health_and_root_redirect() {
        let app = spawn_app(AppState::fake("http://127.0.0.1:9/api/v1")).await;

        let health = browser().get(format!("{app}/health")).send().await.unwrap();
        assert_eq!(health.status(), StatusCode::OK);
        assert_eq!(health.text().await.unwrap(), "ok");

        let root = browser().get(format!("{app}/")).send().await.unwrap();
        assert_eq!(root.headers()["location"], "/dashboard");
    }

    #[tokio::test]
    async fn signed_out_pages_render_sign_in_form() {
        let app = spawn_app(AppState::fake("http://127.0.0.1:9/api/v1")).await;

        for path in ["/food", "/goals", "/profile"] {
            let res = browser().get(format!("{app}{path}")).send().await.unwrap();
            assert_eq!(res.headers()["location"], "/login", "{path}");
        }
        let html = browser().get(format!("{app}/login")).send().await.unwrap().text().await.unwrap();
        assert!(html.contains(r#"action="/login""#));
    }

    #[tokio::test]
    async fn cross_site_posts_are_forbidden() {
        let deletes = Arc::new(AtomicUsize::new(0));
        let counter = deletes.clone();
        let api = Router::new().route(
            "/api/v1/nutrition/goals/:id",
            delete(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"message": "Goal deleted successfully"}))
                }
            }),
        );
        let app = spawn_app(signed_in_state(api).await).await;

        for path in ["/goals/3/delete", "/profile/deactivate", "/logout"] {
            let res = browser()
                .post(format!("{app}{path}"))
                .header("origin", "https://evil.example")
                .send()
                .await
                .unwrap();
            assert_eq!(res.status(), StatusCode::FORBIDDEN, "{path}");
        }
        let res = browser()
            .post(format!("{app}/goals/3/delete"))
            .header("origin", "null")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(deletes.load(Ordering::SeqCst), 0);

        let res = browser()
            .post(format!("{app}/goals/3/delete"))
            .header("origin", app.clone())
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()["location"], "/goals");
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn same_site_referer_and_headerless_posts_pass() {
        let app = spawn_app(AppState::fake("http://127.0.0.1:9/api/v1")).await;

        let res = browser()
            .post(format!("{app}/goals/3/delete"))
            .header("referer", format!("{app}/goals"))
            .send()
            .await
            .unwrap();
        assert_eq!(res.headers()["location"], "/login");

        let res = browser().post(format!("{app}/goals/3/delete")).send().await.unwrap();
        assert_eq!(res.headers()["location"], "/login");

        let res = browser()
            .post(format!("{app}/goals/3/delete"))
            .header("referer", "https://evil.example/page")
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
