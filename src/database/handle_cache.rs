use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info};

/// Errors from establishing the shared handle.
///
/// Cloneable because a single failed attempt is delivered to every caller
/// that was waiting on it.
#[derive(Debug, Clone, Error)]
pub enum ConnectError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Invalid database URL")]
    InvalidDatabaseUrl,

    #[error("Connection failed: {0}")]
    Connect(Arc<sqlx::Error>),
}

impl From<sqlx::Error> for ConnectError {
    fn from(err: sqlx::Error) -> Self {
        ConnectError::Connect(Arc::new(err))
    }
}

impl ConnectError {
    /// Configuration errors are fatal; retrying cannot fix them
    pub fn is_config(&self) -> bool {
        matches!(self, ConnectError::ConfigMissing(_) | ConnectError::InvalidDatabaseUrl)
    }
}

/// Creates the underlying resource behind a [`HandleCache`]
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Handle: Clone + Send + Sync + 'static;

    /// Reject a location before any creation attempt is recorded
    fn validate(&self, _location: &str) -> Result<(), ConnectError> {
        Ok(())
    }

    async fn connect(&self, location: &str) -> Result<Self::Handle, ConnectError>;
}

type PendingCreation<H> = Shared<BoxFuture<'static, Result<H, ConnectError>>>;

enum Slot<H> {
    Empty,
    Creating { attempt: u64, pending: PendingCreation<H> },
    Ready(H),
}

struct SlotState<H> {
    slot: Slot<H>,
    attempts: u64,
}

/// Single-slot, request-coalescing cache for a process-lifetime handle.
///
/// `EMPTY -> CREATING -> READY`, with `CREATING -> EMPTY` when the attempt
/// fails. Only successes are cached. Concurrent callers arriving while an
/// attempt is in flight await that same attempt instead of starting another.
pub struct HandleCache<C: Connector> {
    connector: Arc<C>,
    location: Option<String>,
    state: Mutex<SlotState<C::Handle>>,
}

impl<C: Connector> HandleCache<C> {
    pub fn new(connector: C, location: Option<String>) -> Self {
        Self {
            connector: Arc::new(connector),
            location,
            state: Mutex::new(SlotState {
                slot: Slot::Empty,
                attempts: 0,
            }),
        }
    }

    /// Return the shared handle, creating it on first demand
    pub async fn acquire(&self) -> Result<C::Handle, ConnectError> {
        let (attempt, pending) = {
            let mut guard = self.state.lock().await;
            let state = &mut *guard;

            // A finished attempt stays unsettled if all its waiters were dropped
            let finished = match &state.slot {
                Slot::Creating { attempt, pending } => pending.peek().map(|result| (*attempt, result.clone())),
                _ => None,
            };
            if let Some((attempt, result)) = finished {
                state.slot = Self::settled(attempt, &result);
            }

            match &state.slot {
                Slot::Ready(handle) => return Ok(handle.clone()),
                Slot::Creating { attempt, pending } => {
                    debug!("Joining in-flight handle creation (attempt {})", attempt);
                    (*attempt, pending.clone())
                }
                Slot::Empty => {
                    let location = self
                        .location
                        .clone()
                        .ok_or(ConnectError::ConfigMissing("DATABASE_URL"))?;
                    self.connector.validate(&location)?;

                    state.attempts += 1;
                    let attempt = state.attempts;
                    let connector = Arc::clone(&self.connector);
                    let pending = async move { connector.connect(&location).await }
                        .boxed()
                        .shared();

                    debug!("Starting handle creation (attempt {})", attempt);
                    state.slot = Slot::Creating {
                        attempt,
                        pending: pending.clone(),
                    };
                    (attempt, pending)
                }
            }
        };

        // The lock is released while the attempt runs
        let result = pending.await;

        let mut state = self.state.lock().await;
        let owns_slot = matches!(&state.slot, Slot::Creating { attempt: a, .. } if *a == attempt);
        if owns_slot {
            state.slot = Self::settled(attempt, &result);
        }

        result
    }

    fn settled(attempt: u64, result: &Result<C::Handle, ConnectError>) -> Slot<C::Handle> {
        match result {
            Ok(handle) => {
                info!("Database handle ready (attempt {})", attempt);
                Slot::Ready(handle.clone())
            }
            Err(e) => {
                error!("Database handle creation failed (attempt {}): {}", attempt, e);
                Slot::Empty
            }
        }
    }

    /// True once a handle has been stored; never performs I/O
    pub async fn is_ready(&self) -> bool {
        matches!(self.state.lock().await.slot, Slot::Ready(_))
    }

    /// Number of creation attempts started so far
    pub async fn attempts(&self) -> u64 {
        self.state.lock().await.attempts
    }
}
