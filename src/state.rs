use std::sync::Arc;

use crate::{
    auth::{
        session::AuthSession,
        token::{FileTokenStore, MemoryTokenStore, TokenStore},
    },
    client::ApiClient,
    config::AppConfig,
    notify::Notices,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub api: ApiClient,
    pub session: Arc<AuthSession>,
    pub notices: Notices,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let tokens = if config.session_file.as_os_str().is_empty() {
            Arc::new(MemoryTokenStore::default()) as Arc<dyn TokenStore>
        } else {
            Arc::new(FileTokenStore::open(&config.session_file).await?) as Arc<dyn TokenStore>
        };
        let api = ApiClient::new(&config.api, tokens)?;

        let state = Self::from_parts(config, api);
        state.session.init().await;
        Ok(state)
    }

    pub fn from_parts(config: Arc<AppConfig>, api: ApiClient) -> Self {
        Self {
            session: Arc::new(AuthSession::new(api.clone())),
            config,
            api,
            notices: Notices::default(),
        }
    }

    /// State wired to a fake API at `base_url` (which should end in `/api/v1`).
    #[cfg(test)]
    pub fn fake(base_url: &str) -> Self {
        use crate::config::ApiConfig;

        let config = Arc::new(AppConfig {
            api: ApiConfig {
                base_url: base_url.to_string(),
                timeout_secs: 5,
            },
            session_file: Default::default(),
        });
        let api = ApiClient::new(&config.api, Arc::new(MemoryTokenStore::default()))
            .expect("test api client");
        Self::from_parts(config, api)
    }
}
