//! Glue between page handlers and the shared state: rendering with queued notices and
//! turning API failures into notices or a trip back to the sign-in page.

use axum::{
    extract::Request,
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::warn;

use crate::{
    auth::{dto::User, session::SESSION_EXPIRED},
    client::ApiError,
    html,
    state::AppState,
};

pub async fn render(state: &AppState, title: &str, user: Option<&User>, body: &str) -> Response {
    let notices = state.notices.drain().await;
    html::page(title, user, &notices, body).into_response()
}

/// Queues a notice for a failed call. A rejected session yields the redirect to `/login`
/// the caller must return; anything else lets the page render its empty state.
pub async fn api_failure(state: &AppState, err: &ApiError, fallback: &str) -> Option<Response> {
    if err.is_unauthorized() {
        state.notices.error(SESSION_EXPIRED).await;
        return Some(Redirect::to("/login").into_response());
    }
    warn!(error = %err, "api call failed");
    state.notices.error(err.user_message(fallback)).await;
    None
}

/// Unwraps `$result` or bails out of the handler via [`api_failure`]; yields `None` for soft
/// failures so the card can fall back to its empty state.
macro_rules! or_notice {
    ($state:expr, $result:expr, $fallback:expr) => {
        match $result {
            Ok(value) => Some(value),
            Err(err) => {
                if let Some(redirect) = $crate::web::api_failure(&$state, &err, $fallback).await {
                    return redirect;
                }
                None
            }
        }
    };
}

pub(crate) use or_notice;

/// `host[:port]` of an `Origin` or `Referer` value; `None` for opaque origins like `null`.
fn source_host(value: &str) -> Option<&str> {
    let rest = value
        .strip_prefix("http://")
        .or_else(|| value.strip_prefix("https://"))?;
    let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
    (!host.is_empty()).then_some(host)
}

/// Where a request came from, as the browser reported it. Prefers `Origin` over `Referer`.
fn request_source(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::ORIGIN)
        .or_else(|| headers.get(header::REFERER))
        .map(|v| v.to_str().unwrap_or_default())
}

/// Rejects state-changing requests submitted from another site. Requests that carry neither
/// `Origin` nor `Referer` are not from a browser form and pass.
pub async fn same_origin(request: Request, next: Next) -> Response {
    if request.method().is_safe() {
        return next.run(request).await;
    }
    let headers = request.headers();
    let Some(source) = request_source(headers) else {
        return next.run(request).await;
    };
    let host = headers.get(header::HOST).and_then(|v| v.to_str().ok());
    if host.is_some_and(|host| source_host(source) == Some(host)) {
        return next.run(request).await;
    }

    warn!(
        source,
        method = %request.method(),
        path = request.uri().path(),
        "cross-site request rejected"
    );
    (StatusCode::FORBIDDEN, "Cross-site request rejected").into_response()
}

#[cfg(test)]
mod web_tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn source_host_keeps_the_port() {
        assert_eq!(source_host("http://127.0.0.1:3000"), Some("127.0.0.1:3000"));
        assert_eq!(source_host("https://meals.example/goals?edit=1"), Some("meals.example"));
        assert_eq!(source_host("null"), None);
        assert_eq!(source_host("http://"), None);
    }

    #[test]
    fn origin_wins_over_referer() {
        let mut headers = HeaderMap::new();
        assert_eq!(request_source(&headers), None);
        headers.insert(header::REFERER, HeaderValue::from_static("http://127.0.0.1:3000/goals"));
        assert_eq!(request_source(&headers), Some("http://127.0.0.1:3000/goals"));
        headers.insert(header::ORIGIN, HeaderValue::from_static("https://evil.example"));
        assert_eq!(request_source(&headers), Some("https://evil.example"));
    }
}
