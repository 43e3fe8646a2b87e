use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::auth::{AuthError, Credential, Session, SessionResolver};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::state::{AppState, GuardConfig};

enum Behavior {
    Accept(Session),
    Reject,
    Fail,
}

/// Session resolver that answers from a fixed script and counts its calls
pub struct CountingResolver {
    behavior: Behavior,
    calls: AtomicUsize,
}

impl CountingResolver {
    fn with(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn accepting(session: Session) -> Arc<Self> {
        Self::with(Behavior::Accept(session))
    }

    pub fn rejecting() -> Arc<Self> {
        Self::with(Behavior::Reject)
    }

    pub fn failing() -> Arc<Self> {
        Self::with(Behavior::Fail)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionResolver for CountingResolver {
    async fn resolve(&self, _credential: &Credential) -> Result<Option<Session>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.behavior {
            Behavior::Accept(session) => Ok(Some(session.clone())),
            Behavior::Reject => Ok(None),
            Behavior::Fail => Err(AuthError::UnexpectedStatus(503)),
        }
    }
}

pub fn sample_session() -> Session {
    Session {
        user_id: "user-1".to_string(),
        email: "ada@example.com".to_string(),
        name: "Ada".to_string(),
        expires_at: Utc::now() + Duration::hours(1),
    }
}

/// Development defaults with no database URL, so any acquire fails fast
pub fn test_state(resolver: Arc<dyn SessionResolver>) -> AppState {
    let mut config = AppConfig::from_env();
    config.database.url = None;
    config.auth.cookie_name = "better-auth.session_token".to_string();
    config.routes = Default::default();

    let guard = GuardConfig::from_config(&config).expect("default route scope is valid");
    AppState::new(DatabaseManager::new(&config.database), resolver, guard)
}
