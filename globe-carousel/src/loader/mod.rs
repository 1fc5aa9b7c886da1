//! Map SDK loading with categorized errors and retry.
//!
//! # Architecture
//!
//! ```text
//! load_with_retry ──► MapLoader::load ──► CredentialSource::check
//!                          │              Connectivity::is_online
//!                          ▼
//!                    spawned acquisition ──► MapSdk::acquire (timeout)
//!                          │                 MapSdk::is_ready (poll)
//!                          ▼
//!                    Shared handle ◄── every concurrent caller
//! ```

mod error;
mod loader;
mod retry;
mod traits;

pub use error::{categorize, ErrorContext, MapError, MapErrorKind};
pub use loader::{
    LoadHandle, LoaderConfig, LoaderStatus, MapLoader, DEFAULT_LOAD_TIMEOUT,
    DEFAULT_READINESS_MAX_POLLS, DEFAULT_READINESS_POLL_INTERVAL,
};
pub use retry::{load_with_retry, RetryPolicy, DEFAULT_BASE_DELAY_MS, DEFAULT_MAX_ATTEMPTS};
pub use traits::{
    AlwaysOnline, ApiKeyCredentials, Connectivity, CredentialSource, MapSdk, MIN_API_KEY_LEN,
};

#[cfg(test)]
pub(crate) use loader::tests::{FakeSdk, TEST_KEY};
