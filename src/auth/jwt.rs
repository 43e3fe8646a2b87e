use async_trait::async_trait;
use chrono::{Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use super::{AuthError, Credential, Session, SessionResolver};

/// Claims the auth service signs into a session token
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
}

impl SessionClaims {
    pub fn new(user_id: String, email: String, name: String, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            email,
            name,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }
}

/// Verifies HS256 session tokens locally with the secret shared with the auth service
pub struct JwtSessionResolver {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtSessionResolver {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::default();
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    /// Sign claims the same way the auth service does
    pub fn issue(&self, claims: &SessionClaims) -> Result<String, jsonwebtoken::errors::Error> {
        encode(&Header::default(), claims, &self.encoding_key)
    }
}

#[async_trait]
impl SessionResolver for JwtSessionResolver {
    async fn resolve(&self, credential: &Credential) -> Result<Option<Session>, AuthError> {
        let token_data = match decode::<SessionClaims>(credential.as_str(), &self.decoding_key, &self.validation) {
            Ok(data) => data,
            Err(e) => {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("Session token expired"),
                    _ => tracing::debug!("Rejected session token: {}", e),
                }
                return Ok(None);
            }
        };

        let claims = token_data.claims;
        if claims.sub.is_empty() {
            return Ok(None);
        }

        let Some(expires_at) = Utc.timestamp_opt(claims.exp, 0).single() else {
            return Ok(None);
        };

        Ok(Some(Session {
            user_id: claims.sub,
            email: claims.email,
            name: claims.name,
            expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(ttl: Duration) -> SessionClaims {
        SessionClaims::new("user-1".into(), "ada@example.com".into(), "Ada".into(), ttl)
    }

    #[tokio::test]
    async fn resolves_valid_token() {
        let resolver = JwtSessionResolver::new("secret");
        let token = resolver.issue(&claims(Duration::hours(1))).unwrap();

        let session = resolver.resolve(&Credential::new(token)).await.unwrap().unwrap();

        assert_eq!(session.user_id, "user-1");
        assert_eq!(session.email, "ada@example.com");
        assert!(session.expires_at > Utc::now());
    }

    #[tokio::test]
    async fn expired_token_is_no_session() {
        let resolver = JwtSessionResolver::new("secret");
        let token = resolver.issue(&claims(Duration::hours(-1))).unwrap();

        assert!(resolver.resolve(&Credential::new(token)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn foreign_signature_is_no_session() {
        let issuer = JwtSessionResolver::new("someone-else");
        let token = issuer.issue(&claims(Duration::hours(1))).unwrap();

        let resolver = JwtSessionResolver::new("secret");
        assert!(resolver.resolve(&Credential::new(token)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn garbage_token_is_no_session() {
        let resolver = JwtSessionResolver::new("secret");
        assert!(resolver
            .resolve(&Credential::new("not-a-jwt"))
            .await
            .unwrap()
            .is_none());
    }
}
