//! Idempotent, coalescing loader for the map SDK.
//!
//! # State Machine
//!
//! ```text
//!            load() [precondition ok, online]
//!    Idle ────────────────────────────────► Loading
//!     ▲                                        │
//!     │ failure / timeout                      │ acquired + ready
//!     └────────────────────────────────────────┤
//!                                              ▼
//!                                           Loaded
//! ```
//!
//! Concurrent `load()` calls while `Loading` receive clones of the same
//! shared future, so at most one acquisition is ever in flight. Once
//! `Loaded`, `load()` resolves immediately. `reset()` returns to `Idle`
//! unconditionally and invalidates any in-flight acquisition.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::future::{self, BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::error::{categorize, MapError, MapErrorKind};
use super::retry::RetryPolicy;
use super::traits::{AlwaysOnline, ApiKeyCredentials, Connectivity, CredentialSource, MapSdk};

/// Default bound on the acquisition step (15 seconds).
pub const DEFAULT_LOAD_TIMEOUT: Duration = Duration::from_secs(15);

/// Default interval between readiness polls (100ms).
pub const DEFAULT_READINESS_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of readiness polls before giving up.
pub const DEFAULT_READINESS_MAX_POLLS: u32 = 50;

/// A pending or completed load. Clones observe the same outcome.
pub type LoadHandle = Shared<BoxFuture<'static, Result<(), MapError>>>;

/// Loader configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct LoaderConfig {
    /// API key used by the default credential check.
    pub api_key: Option<String>,
    /// Bound on the acquisition step.
    pub load_timeout: Duration,
    /// Interval between readiness polls after acquisition.
    pub readiness_poll_interval: Duration,
    /// Readiness polls before failing with `initialization-failed`.
    pub readiness_max_polls: u32,
    /// Policy used by [`load_with_retry`](super::load_with_retry) callers.
    pub retry: RetryPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            load_timeout: DEFAULT_LOAD_TIMEOUT,
            readiness_poll_interval: DEFAULT_READINESS_POLL_INTERVAL,
            readiness_max_polls: DEFAULT_READINESS_MAX_POLLS,
            retry: RetryPolicy::default(),
        }
    }
}

impl LoaderConfig {
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_load_timeout(mut self, timeout: Duration) -> Self {
        self.load_timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Externally visible loader status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderStatus {
    Idle,
    Loading,
    Loaded,
}

enum Status {
    Idle,
    Loading(LoadHandle),
    Loaded,
}

struct LoaderState {
    status: Status,
    /// Bumped on every new acquisition and on reset.
    generation: u64,
}

struct LoaderShared {
    config: LoaderConfig,
    sdk: Arc<dyn MapSdk>,
    credentials: Arc<dyn CredentialSource>,
    connectivity: Arc<dyn Connectivity>,
    state: Mutex<LoaderState>,
    acquisitions: AtomicU64,
}

/// Process-scoped owner of the map SDK load state.
///
/// Construct once and share by reference (or `Arc`) with every consumer.
/// `load()` must be called from within a tokio runtime.
#[derive(Clone)]
pub struct MapLoader {
    shared: Arc<LoaderShared>,
}

impl std::fmt::Debug for MapLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapLoader")
            .field("config", &self.shared.config)
            .field("status", &self.status())
            .finish_non_exhaustive()
    }
}

impl MapLoader {
    /// Create a loader checking the configured API key and assuming connectivity.
    pub fn new(config: LoaderConfig, sdk: Arc<dyn MapSdk>) -> Self {
        let credentials = Arc::new(ApiKeyCredentials::new(config.api_key.clone()));
        Self::with_collaborators(config, sdk, credentials, Arc::new(AlwaysOnline))
    }

    /// Create a loader with explicit collaborators.
    pub fn with_collaborators(
        config: LoaderConfig,
        sdk: Arc<dyn MapSdk>,
        credentials: Arc<dyn CredentialSource>,
        connectivity: Arc<dyn Connectivity>,
    ) -> Self {
        Self {
            shared: Arc::new(LoaderShared {
                config,
                sdk,
                credentials,
                connectivity,
                state: Mutex::new(LoaderState {
                    status: Status::Idle,
                    generation: 0,
                }),
                acquisitions: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.shared.config
    }

    /// Make the SDK available.
    ///
    /// Returns immediately-resolving handles when already loaded or when the
    /// precondition/offline checks fail; otherwise the shared handle of the
    /// (possibly already running) acquisition.
    pub fn load(&self) -> LoadHandle {
        let mut state = self.shared.state.lock();
        match &state.status {
            Status::Loaded => return resolved(Ok(())),
            Status::Loading(handle) => {
                debug!("Map load already in flight, joining");
                return handle.clone();
            }
            Status::Idle => {}
        }

        if let Err(e) = self.shared.credentials.check() {
            warn!(kind = %e.kind, details = ?e.details, "Map load precondition failed");
            return resolved(Err(e));
        }
        if !self.shared.connectivity.is_online() {
            warn!("Map load skipped, client is offline");
            return resolved(Err(MapError::offline()));
        }

        state.generation += 1;
        let generation = state.generation;
        self.shared.acquisitions.fetch_add(1, Ordering::Relaxed);
        info!(generation, "Loading map SDK");

        let shared = Arc::clone(&self.shared);
        let task = tokio::spawn(async move {
            let result = shared.acquire().await;
            shared.finish(generation, &result);
            result
        });

        let handle = async move {
            match task.await {
                Ok(result) => result,
                Err(e) => Err(MapError::new(
                    MapErrorKind::Unknown,
                    Some(format!("map load task failed: {}", e)),
                )),
            }
        }
        .boxed()
        .shared();

        state.status = Status::Loading(handle.clone());
        handle
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.shared.state.lock().status, Status::Loaded)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.shared.state.lock().status, Status::Loading(_))
    }

    pub fn status(&self) -> LoaderStatus {
        match self.shared.state.lock().status {
            Status::Idle => LoaderStatus::Idle,
            Status::Loading(_) => LoaderStatus::Loading,
            Status::Loaded => LoaderStatus::Loaded,
        }
    }

    /// Number of acquisitions started since creation.
    pub fn acquisition_count(&self) -> u64 {
        self.shared.acquisitions.load(Ordering::Relaxed)
    }

    /// Forget all state. In-flight acquisitions can no longer mark the loader loaded.
    pub fn reset(&self) {
        let mut state = self.shared.state.lock();
        state.generation += 1;
        state.status = Status::Idle;
        debug!("Map loader reset");
    }
}

impl LoaderShared {
    async fn acquire(&self) -> Result<(), MapError> {
        let timeout = self.config.load_timeout;
        match tokio::time::timeout(timeout, self.sdk.acquire()).await {
            Err(_) => return Err(MapError::timeout(timeout)),
            Ok(Err(message)) => {
                let err = categorize(&message, None);
                // Uncategorized failures during acquisition default to acquisition-failed.
                return Err(if err.kind == MapErrorKind::Unknown {
                    MapError::new(MapErrorKind::AcquisitionFailed, err.details)
                } else {
                    err
                });
            }
            Ok(Ok(())) => {}
        }

        self.wait_until_ready().await
    }

    /// Poll until the SDK object is usable, not merely present.
    async fn wait_until_ready(&self) -> Result<(), MapError> {
        for _ in 0..=self.config.readiness_max_polls {
            if self.sdk.is_ready() {
                return Ok(());
            }
            tokio::time::sleep(self.config.readiness_poll_interval).await;
        }
        Err(MapError::new(
            MapErrorKind::InitializationFailed,
            Some(format!(
                "SDK not ready after {} polls",
                self.config.readiness_max_polls
            )),
        ))
    }

    fn finish(&self, generation: u64, result: &Result<(), MapError>) {
        let mut state = self.state.lock();
        if state.generation != generation {
            debug!(generation, current = state.generation, "Discarding stale map load result");
            return;
        }
        state.status = match result {
            Ok(()) => {
                info!("Map SDK loaded");
                Status::Loaded
            }
            Err(e) => {
                warn!(kind = %e.kind, details = ?e.details, "Map SDK load failed");
                Status::Idle
            }
        };
    }
}

fn resolved(result: Result<(), MapError>) -> LoadHandle {
    future::ready(result).boxed().shared()
}
