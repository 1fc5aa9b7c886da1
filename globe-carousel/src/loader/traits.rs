//! Collaborator traits consumed by the loader.
//!
//! These abstractions allow for dependency injection and easier testing by
//! enabling fake SDKs and connectivity probes in tests.

use futures::future::BoxFuture;

use super::error::{MapError, MapErrorKind};

/// Minimum plausible API key length.
pub const MIN_API_KEY_LEN: usize = 20;

/// The third-party map SDK being made available.
pub trait MapSdk: Send + Sync + 'static {
    /// Fetch the SDK. Resolves once the SDK object exists.
    ///
    /// Errors are plain messages; the loader categorizes them.
    fn acquire(&self) -> BoxFuture<'_, Result<(), String>>;

    /// Returns `true` once the acquired SDK is fully initialized and usable.
    fn is_ready(&self) -> bool;
}

/// Precondition check run before any acquisition is attempted.
pub trait CredentialSource: Send + Sync + 'static {
    /// Fails with a non-retryable credential error if loading cannot succeed.
    fn check(&self) -> Result<(), MapError>;
}

/// Connectivity probe.
pub trait Connectivity: Send + Sync + 'static {
    fn is_online(&self) -> bool;
}

/// Connectivity probe that always reports online.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysOnline;

impl Connectivity for AlwaysOnline {
    fn is_online(&self) -> bool {
        true
    }
}

/// Validates a configured API key.
#[derive(Debug, Clone, Default)]
pub struct ApiKeyCredentials {
    api_key: Option<String>,
}

impl ApiKeyCredentials {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl CredentialSource for ApiKeyCredentials {
    fn check(&self) -> Result<(), MapError> {
        let key = match self.api_key.as_deref().map(str::trim) {
            Some(k) if !k.is_empty() => k,
            _ => {
                return Err(MapError::new(
                    MapErrorKind::CredentialMissing,
                    Some("no API key configured".to_string()),
                ))
            }
        };

        let well_formed = key.len() >= MIN_API_KEY_LEN
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !well_formed {
            return Err(MapError::new(
                MapErrorKind::CredentialInvalid,
                Some("API key is malformed".to_string()),
            ));
        }

        Ok(())
    }
}
