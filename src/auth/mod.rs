use async_trait::async_trait;
use axum::http::{header::COOKIE, HeaderMap};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

use crate::config::{AuthConfig, AuthMode};

pub mod jwt;
pub mod remote;

pub use jwt::{JwtSessionResolver, SessionClaims};
pub use remote::RemoteSessionResolver;

/// Prefix browsers require for cookies set with `Secure` under some auth setups
pub(crate) const SECURE_COOKIE_PREFIX: &str = "__Secure-";

/// Opaque session token carried in the session cookie.
///
/// Never parsed here; the auth service owns its structure and lifetime.
/// Remembers whether it arrived under the `__Secure-` name so it can be
/// forwarded the same way.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    token: String,
    secure: bool,
}

impl Credential {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secure: false,
        }
    }

    pub fn secure(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            secure: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.token
    }

    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `name=value` pair as the browser sent it
    pub fn cookie_pair(&self, cookie_name: &str) -> String {
        if self.secure {
            format!("{}{}={}", SECURE_COOKIE_PREFIX, cookie_name, self.token)
        } else {
            format!("{}={}", cookie_name, self.token)
        }
    }

    /// Find the session cookie among all `Cookie` headers.
    /// An empty value counts as absent.
    pub fn from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<Self> {
        let secure_name = format!("{}{}", SECURE_COOKIE_PREFIX, cookie_name);

        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|header| header.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .filter(|(_, value)| !value.trim().is_empty())
            .find_map(|(name, value)| {
                if name == cookie_name {
                    Some(Self::new(value.trim()))
                } else if name == secure_name {
                    Some(Self::secure(value.trim()))
                } else {
                    None
                }
            })
    }
}

/// Identity behind a credential, as reported by the auth service
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
    pub name: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Auth service not configured: {0}")]
    Misconfigured(&'static str),

    #[error("Auth service request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Auth service returned status {0}")]
    UnexpectedStatus(u16),
}

/// Resolves a credential into a live session.
///
/// `Ok(None)` means the credential is not (or no longer) valid. `Err` is
/// reserved for failing to ask at all.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    async fn resolve(&self, credential: &Credential) -> Result<Option<Session>, AuthError>;
}

/// Pick the resolver configured for this deployment
pub fn resolver_from_config(config: &AuthConfig) -> Result<Arc<dyn SessionResolver>, AuthError> {
    match config.mode {
        AuthMode::Remote => {
            let base_url = config
                .service_url
                .clone()
                .ok_or(AuthError::Misconfigured("AUTH_SERVICE_URL"))?;
            Ok(Arc::new(RemoteSessionResolver::new(
                base_url,
                config.cookie_name.clone(),
                std::time::Duration::from_secs(config.request_timeout_secs),
            )?))
        }
        AuthMode::Jwt => {
            if config.jwt_secret.is_empty() {
                return Err(AuthError::Misconfigured("AUTH_JWT_SECRET"));
            }
            Ok(Arc::new(JwtSessionResolver::new(&config.jwt_secret)))
        }
    }
}
