use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{header::COOKIE, StatusCode};
use serde::Deserialize;
use std::time::Duration;

use super::{AuthError, Credential, Session, SessionResolver};

const GET_SESSION_PATH: &str = "/api/auth/get-session";

#[derive(Debug, Deserialize)]
struct SessionBody {
    session: SessionRecord,
    user: UserRecord,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionRecord {
    expires_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    #[serde(default)]
    name: String,
}

/// Asks the auth service to resolve the session by forwarding the cookie
pub struct RemoteSessionResolver {
    client: reqwest::Client,
    endpoint: String,
    cookie_name: String,
}

impl RemoteSessionResolver {
    pub fn new(base_url: String, cookie_name: String, timeout: Duration) -> Result<Self, AuthError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), GET_SESSION_PATH),
            cookie_name,
        })
    }
}

#[async_trait]
impl SessionResolver for RemoteSessionResolver {
    async fn resolve(&self, credential: &Credential) -> Result<Option<Session>, AuthError> {
        let response = self
            .client
            .get(&self.endpoint)
            .header(COOKIE, credential.cookie_pair(&self.cookie_name))
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => {}
            StatusCode::UNAUTHORIZED => return Ok(None),
            status => return Err(AuthError::UnexpectedStatus(status.as_u16())),
        }

        // The service answers `null` when the cookie maps to no session
        let body: Option<SessionBody> = response.json().await?;
        let Some(body) = body else {
            return Ok(None);
        };

        if body.user.id.is_empty() || body.session.expires_at <= Utc::now() {
            return Ok(None);
        }

        Ok(Some(Session {
            user_id: body.user.id,
            email: body.user.email,
            name: body.user.name,
            expires_at: body.session.expires_at,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap, routing::get, Json, Router};
    use serde_json::{json, Value};

    /// Stand-in auth service: `good` resolves, `stale` is expired, `boom` errors.
    /// `tls` resolves only under the `__Secure-` name.
    async fn get_session(headers: HeaderMap) -> (axum::http::StatusCode, Json<Value>) {
        let cookie = headers
            .get("cookie")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();

        match cookie.as_str() {
            "sid=good" | "__Secure-sid=tls" => (
                axum::http::StatusCode::OK,
                Json(json!({
                    "session": { "id": "s1", "userId": "u1", "expiresAt": "2999-01-01T00:00:00Z" },
                    "user": { "id": "u1", "email": "ada@example.com", "name": "Ada" }
                })),
            ),
            "sid=stale" => (
                axum::http::StatusCode::OK,
                Json(json!({
                    "session": { "id": "s2", "userId": "u1", "expiresAt": "2000-01-01T00:00:00Z" },
                    "user": { "id": "u1", "email": "ada@example.com", "name": "Ada" }
                })),
            ),
            "sid=boom" => (axum::http::StatusCode::BAD_GATEWAY, Json(Value::Null)),
            _ => (axum::http::StatusCode::OK, Json(Value::Null)),
        }
    }

    async fn spawn_auth_service() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = Router::new().route(GET_SESSION_PATH, get(get_session));
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    async fn resolver() -> RemoteSessionResolver {
        RemoteSessionResolver::new(spawn_auth_service().await, "sid".into(), Duration::from_secs(2)).unwrap()
    }

    #[tokio::test]
    async fn resolves_active_session() {
        let session = resolver()
            .await
            .resolve(&Credential::new("good"))
            .await
            .unwrap()
            .unwrap();

        assert_eq!(session.user_id, "u1");
        assert_eq!(session.name, "Ada");
    }

    #[tokio::test]
    async fn secure_cookie_is_forwarded_under_its_prefixed_name() {
        let mut headers = HeaderMap::new();
        headers.insert("cookie", "__Secure-sid=tls".parse().unwrap());
        let credential = Credential::from_headers(&headers, "sid").unwrap();

        let resolver = resolver().await;
        let session = resolver.resolve(&credential).await.unwrap();

        assert_eq!(session.map(|s| s.user_id), Some("u1".to_string()));
        assert!(resolver.resolve(&Credential::new("tls")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn null_body_and_expired_sessions_are_none() {
        let resolver = resolver().await;
        assert!(resolver.resolve(&Credential::new("unknown")).await.unwrap().is_none());
        assert!(resolver.resolve(&Credential::new("stale")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn unexpected_status_is_an_error() {
        let err = resolver()
            .await
            .resolve(&Credential::new("boom"))
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::UnexpectedStatus(502)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let port = portpicker::pick_unused_port().unwrap();
        let resolver = RemoteSessionResolver::new(
            format!("http://127.0.0.1:{}", port),
            "sid".into(),
            Duration::from_millis(500),
        )
        .unwrap();

        let err = resolver.resolve(&Credential::new("good")).await.unwrap_err();
        assert!(matches!(err, AuthError::Transport(_)));
    }
}
