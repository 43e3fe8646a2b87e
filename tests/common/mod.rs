#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use jsonwebtoken::{encode, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

pub const JWT_SECRET: &str = "integration-test-secret";
pub const COOKIE_NAME: &str = "better-auth.session_token";

/// Server binary running on its own port; killed on drop
pub struct TestServer {
    pub base_url: String,
    child: Child,
}

impl TestServer {
    fn spawn(database_url: Option<&str>) -> Result<Self> {
        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        let mut cmd = Command::new(env!("CARGO_BIN_EXE_finwatch-api"));
        cmd.env("FINWATCH_API_PORT", port.to_string())
            .env("APP_ENV", "development")
            .env("AUTH_MODE", "jwt")
            .env("AUTH_JWT_SECRET", JWT_SECRET)
            .env("AUTH_COOKIE_NAME", COOKIE_NAME)
            // Empty wins over any .env file and means "not configured"
            .env("DATABASE_URL", database_url.unwrap_or(""))
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        let child = cmd.spawn().context("failed to spawn server binary")?;

        Ok(Self { base_url, child })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = reqwest::Client::new();
        let deadline = Instant::now() + timeout;
        loop {
            if Instant::now() > deadline {
                break;
            }
            let url = format!("{}/health", self.base_url);
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status() == StatusCode::OK || resp.status() == StatusCode::SERVICE_UNAVAILABLE {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

pub async fn start_server() -> Result<TestServer> {
    let server = TestServer::spawn(None)?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Postgres for data tests; these tests are skipped when it is unset
pub fn test_database_url() -> Option<String> {
    std::env::var("TEST_DATABASE_URL").ok().filter(|url| !url.trim().is_empty())
}

pub async fn start_server_with_database(database_url: &str) -> Result<TestServer> {
    let server = TestServer::spawn(Some(database_url))?;
    server.wait_ready(Duration::from_secs(10)).await?;
    Ok(server)
}

/// Client that reports redirects instead of following them
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("client builds")
}

/// Session token as the auth service would sign it
pub fn session_token(ttl_secs: i64) -> String {
    session_token_for("user-42", ttl_secs)
}

pub fn session_token_for(user_id: &str, ttl_secs: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = json!({
        "sub": user_id,
        "email": "grace@example.com",
        "name": "Grace",
        "iat": now,
        "exp": now + ttl_secs,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).expect("token encodes")
}

pub fn session_cookie(token: &str) -> String {
    format!("{}={}", COOKIE_NAME, token)
}

/// Unique user id so data tests sharing one database never collide
pub fn unique_user(prefix: &str) -> String {
    format!("{}-{}", prefix, uuid::Uuid::new_v4())
}
