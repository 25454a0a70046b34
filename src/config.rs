use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub session_file: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let base_url = std::env::var("API_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8000/api/v1".into())
            .trim_end_matches('/')
            .to_string();
        let timeout_secs = match std::env::var("REQUEST_TIMEOUT_SECS") {
            Ok(v) => v
                .parse::<u64>()
                .with_context(|| format!("REQUEST_TIMEOUT_SECS is not a number: {v}"))?,
            Err(_) => 10,
        };
        let session_file = std::env::var("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(".mealmind-session.json"));

        Ok(Self {
            api: ApiConfig {
                base_url,
                timeout_secs,
            },
            session_file,
        })
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;

    #[test]
    fn timeout_is_whole_seconds() {
        let api = ApiConfig {
            base_url: "http://localhost:8000/api/v1".into(),
            timeout_secs: 10,
        };
        assert_eq!(api.timeout(), Duration::from_secs(10));
    }
}
