//! HTTP access to the remote nutrition API.
//!
//! Every request carries the stored bearer token (if any) and an `X-Request-Id`. A 401 clears
//! the stored token before the error is handed back. Failures are never retried.

pub mod error;

use std::{sync::Arc, time::Instant};

use anyhow::Context;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::{auth::token::TokenStore, config::ApiConfig};

pub use error::ApiError;

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig, tokens: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .context("build http client")?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            tokens,
        })
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.base_url, path))
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::GET, path, self.request(Method::GET, path))
            .await
    }

    pub(crate) async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        let req = self.request(Method::GET, path).query(query);
        self.send(Method::GET, path, req).await
    }

    pub(crate) async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::POST, path).json(body);
        self.send(Method::POST, path, req).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::POST, path, self.request(Method::POST, path))
            .await
    }

    pub(crate) async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let req = self.request(Method::PUT, path).json(body);
        self.send(Method::PUT, path, req).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send(Method::DELETE, path, self.request(Method::DELETE, path))
            .await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        mut req: RequestBuilder,
    ) -> Result<T, ApiError> {
        let request_id = Uuid::new_v4();
        req = req.header("X-Request-Id", request_id.to_string());
        if let Some(token) = self.tokens.load().await {
            req = req.bearer_auth(token);
        }

        let started = Instant::now();
        let response = req.send().await.map_err(|e| {
            warn!(%request_id, %method, path, error = %e, timeout = e.is_timeout(), "api call failed");
            ApiError::Network(e)
        })?;
        let status = response.status();
        let body = response.bytes().await.map_err(ApiError::Network)?;
        debug!(
            %request_id,
            %method,
            path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "api response"
        );

        if status == StatusCode::UNAUTHORIZED {
            if let Err(e) = self.tokens.clear().await {
                error!(%request_id, error = %e, "failed to clear rejected token");
            }
            warn!(%request_id, path, "api rejected credentials; stored token cleared");
        }
        if !status.is_success() {
            return Err(ApiError::from_response(status, &body));
        }

        // empty bodies decode as JSON null
        if body.is_empty() {
            return Ok(serde_json::from_slice(b"null")?);
        }
        Ok(serde_json::from_slice(&body)?)
    }
}

/// `{"message": "..."}` acknowledgements (delete, activate, change-password).
#[derive(Debug, Clone, serde::Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod client_tests {
    use std::sync::Mutex;

    use axum::{
        http::{HeaderMap, StatusCode as AxumStatus},
        routing::{get, post},
        Json, Router,
    };
    use serde_json::json;

    use super::*;
    use crate::{auth::token::MemoryTokenStore, testing::spawn_fake_api};

    #[derive(Clone, Default)]
    struct SeenHeaders(Arc<Mutex<Vec<Option<String>>>>);

    impl SeenHeaders {
        fn record(&self, headers: &HeaderMap) {
            let auth = headers
                .get("authorization")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            self.0.lock().unwrap().push(auth);
        }

        fn all(&self) -> Vec<Option<String>> {
            self.0.lock().unwrap().clone()
        }
    }

    fn fake_api(seen: SeenHeaders) -> Router {
        let ok_seen = seen.clone();
        let expired_seen = seen;
        Router::new()
            .route(
                "/api/v1/ok",
                get(move |headers: HeaderMap| {
                    let seen = ok_seen.clone();
                    async move {
                        seen.record(&headers);
                        Json(json!({"message": "fine"}))
                    }
                }),
            )
            .route(
                "/api/v1/expired",
                get(move |headers: HeaderMap| {
                    let seen = expired_seen.clone();
                    async move {
                        seen.record(&headers);
                        (
                            AxumStatus::UNAUTHORIZED,
                            Json(json!({"detail": "Could not validate credentials"})),
                        )
                    }
                }),
            )
            .route(
                "/api/v1/broken",
                post(|| async { (AxumStatus::BAD_GATEWAY, "upstream exploded") }),
            )
    }

    async fn client_for(base: &str, token: Option<&str>) -> ApiClient {
        let store = Arc::new(MemoryTokenStore::default());
        if let Some(token) = token {
            store.save(token).await.unwrap();
        }
        let config = ApiConfig {
            base_url: format!("{base}/api/v1"),
            timeout_secs: 5,
        };
        ApiClient::new(&config, store).unwrap()
    }

    #[tokio::test]
    async fn stored_token_is_attached_as_bearer() {
        let seen = SeenHeaders::default();
        let base = spawn_fake_api(fake_api(seen.clone())).await;
        let client = client_for(&base, Some("tok-1")).await;

        let ack: Ack = client.get("/ok").await.unwrap();
        assert_eq!(ack.message.as_deref(), Some("fine"));
        assert_eq!(seen.all(), vec![Some("Bearer tok-1".to_string())]);
    }

    #[tokio::test]
    async fn no_token_means_no_authorization_header() {
        let seen = SeenHeaders::default();
        let base = spawn_fake_api(fake_api(seen.clone())).await;
        let client = client_for(&base, None).await;

        let _: Ack = client.get("/ok").await.unwrap();
        assert_eq!(seen.all(), vec![None]);
    }

    #[tokio::test]
    async fn unauthorized_clears_token_for_later_requests() {
        let seen = SeenHeaders::default();
        let base = spawn_fake_api(fake_api(seen.clone())).await;
        let client = client_for(&base, Some("stale")).await;

        let err = client.get::<Ack>("/expired").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Could not validate credentials"));
        assert_eq!(client.tokens().load().await, None);

        let _: Ack = client.get("/ok").await.unwrap();
        assert_eq!(seen.all(), vec![Some("Bearer stale".to_string()), None]);
    }

    #[tokio::test]
    async fn other_failures_surface_without_touching_the_token() {
        let base = spawn_fake_api(fake_api(SeenHeaders::default())).await;
        let client = client_for(&base, Some("keep-me")).await;

        let err = client.post::<Ack, _>("/broken", &json!({})).await.unwrap_err();
        match &err {
            ApiError::Status { status, detail } => {
                assert_eq!(*status, StatusCode::BAD_GATEWAY);
                assert_eq!(*detail, None);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(client.tokens().load().await.as_deref(), Some("keep-me"));
    }

    #[tokio::test]
    async fn unreachable_api_is_a_network_error() {
        let client = client_for("http://127.0.0.1:9", None).await;
        let err = client.get::<Ack>("/ok").await.unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
    }
}
