use std::{io::ErrorKind, path::PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Where the bearer token lives between requests (and, for the file store, between runs).
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Option<String>;
    async fn save(&self, token: &str) -> anyhow::Result<()>;
    async fn clear(&self) -> anyhow::Result<()>;
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    async fn save(&self, token: &str) -> anyhow::Result<()> {
        *self.token.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        *self.token.write().await = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionFile {
    access_token: String,
}

/// Token persisted as a small JSON file, cached in memory after the first read.
pub struct FileTokenStore {
    path: PathBuf,
    cached: RwLock<Option<String>>,
}

impl FileTokenStore {
    pub async fn open(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let cached = match tokio::fs::read(&path).await {
            Ok(raw) => match serde_json::from_slice::<SessionFile>(&raw) {
                Ok(file) => Some(file.access_token),
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "unreadable session file; ignoring");
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => {
                return Err(e).with_context(|| format!("read session file {}", path.display()))
            }
        };
        debug!(path = %path.display(), has_token = cached.is_some(), "session file opened");
        Ok(Self {
            path,
            cached: RwLock::new(cached),
        })
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<String> {
        self.cached.read().await.clone()
    }

    async fn save(&self, token: &str) -> anyhow::Result<()> {
        let body = serde_json::to_vec(&SessionFile {
            access_token: token.to_string(),
        })?;
        let mut cached = self.cached.write().await;
        tokio::fs::write(&self.path, body)
            .await
            .with_context(|| format!("write session file {}", self.path.display()))?;
        *cached = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> anyhow::Result<()> {
        let mut cached = self.cached.write().await;
        *cached = None;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("remove session file {}", self.path.display())),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ExpiryClaims {
    exp: Option<i64>,
}

/// Reads the `exp` claim of a JWT without checking its signature. The API stays the authority
/// on validity; this only spares a round trip for tokens that are plainly stale.
pub fn token_expiry(token: &str) -> Option<OffsetDateTime> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<ExpiryClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    OffsetDateTime::from_unix_timestamp(data.claims.exp?).ok()
}

pub fn is_expired(token: &str, now: OffsetDateTime) -> bool {
    token_expiry(token).is_some_and(|exp| exp <= now)
}
