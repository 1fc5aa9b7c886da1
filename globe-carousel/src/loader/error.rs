//! Categorized map loading errors.
//!
//! Every failure surfaced by the loader is bucketed into a [`MapErrorKind`]
//! that fixes both the user-facing message and whether retrying can help.
//!
//! # Categorization
//!
//! ```text
//! context hint given?  ──yes──► kind from context (api_key splits missing/invalid)
//!        │ no
//!        ▼
//! credential keywords ──► credential-missing / credential-invalid
//! network keywords    ──► network
//! acquisition keywords──► acquisition-failed
//! otherwise           ──► unknown
//! ```
//!
//! Keyword tests are case-insensitive substring matches.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

const CREDENTIAL_KEYWORDS: &[&str] = &[
    "api key",
    "apikey",
    "api_key",
    "invalidkeymaperror",
    "missingkeymaperror",
    "credential",
    "unauthorized",
    "forbidden",
    "authentication",
];

/// Within the credential bucket, these mark a present-but-rejected key.
const CREDENTIAL_INVALID_KEYWORDS: &[&str] = &[
    "invalid",
    "unauthorized",
    "forbidden",
    "denied",
    "expired",
    "referer",
];

const NETWORK_KEYWORDS: &[&str] = &[
    "network",
    "offline",
    "fetch",
    "timeout",
    "timed out",
    "connection",
    "dns",
    "unreachable",
];

const ACQUISITION_KEYWORDS: &[&str] = &["script", "load", "sdk", "download"];

/// Error category. Fixes the user-facing message and retryability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapErrorKind {
    /// No API key configured.
    CredentialMissing,
    /// The configured API key was rejected.
    CredentialInvalid,
    /// Connectivity problem or timeout.
    Network,
    /// The map SDK could not be fetched.
    AcquisitionFailed,
    /// The SDK arrived but never became usable.
    InitializationFailed,
    /// Anything else.
    Unknown,
}

impl MapErrorKind {
    /// Stable kebab-case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            MapErrorKind::CredentialMissing => "credential-missing",
            MapErrorKind::CredentialInvalid => "credential-invalid",
            MapErrorKind::Network => "network",
            MapErrorKind::AcquisitionFailed => "acquisition-failed",
            MapErrorKind::InitializationFailed => "initialization-failed",
            MapErrorKind::Unknown => "unknown",
        }
    }

    /// Message suitable for showing to an end user.
    pub fn user_message(&self) -> &'static str {
        match self {
            MapErrorKind::CredentialMissing => {
                "The map API key is missing. Add a key to the configuration and reload."
            }
            MapErrorKind::CredentialInvalid => {
                "The map API key was rejected. Check that the key is valid and allowed for this site."
            }
            MapErrorKind::Network => {
                "Unable to reach the map service. Check your internet connection."
            }
            MapErrorKind::AcquisitionFailed => "The map library failed to load. Please try again.",
            MapErrorKind::InitializationFailed => {
                "The map library loaded but could not start. Please try again."
            }
            MapErrorKind::Unknown => "Something went wrong while loading the map.",
        }
    }

    /// Credential problems need a configuration change; everything else may
    /// succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            MapErrorKind::CredentialMissing | MapErrorKind::CredentialInvalid
        )
    }
}

impl fmt::Display for MapErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where an error originated, when the caller knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorContext {
    ApiKey,
    Network,
    ScriptLoad,
    Initialization,
}

impl FromStr for ErrorContext {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" => Ok(ErrorContext::ApiKey),
            "network" => Ok(ErrorContext::Network),
            "script_load" => Ok(ErrorContext::ScriptLoad),
            "initialization" => Ok(ErrorContext::Initialization),
            other => Err(format!("unknown error context '{}'", other)),
        }
    }
}

/// A categorized loader failure.
///
/// `Clone` so a single coalesced load can hand the same error to every waiter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct MapError {
    /// Category.
    pub kind: MapErrorKind,
    /// Fixed user-facing message for `kind`.
    pub message: String,
    /// The underlying error text, if any.
    pub details: Option<String>,
    /// Whether retrying may succeed.
    pub retryable: bool,
}

impl MapError {
    /// Build an error of `kind` with optional underlying details.
    pub fn new(kind: MapErrorKind, details: Option<String>) -> Self {
        Self {
            kind,
            message: kind.user_message().to_string(),
            details,
            retryable: kind.is_retryable(),
        }
    }

    /// The dedicated offline error, raised without attempting acquisition.
    pub fn offline() -> Self {
        Self {
            kind: MapErrorKind::Network,
            message: "You appear to be offline. The map will load once the connection is back."
                .to_string(),
            details: Some("navigator reports offline".to_string()),
            retryable: true,
        }
    }

    /// Timeout on the acquisition step.
    pub fn timeout(after: std::time::Duration) -> Self {
        Self::new(
            MapErrorKind::Network,
            Some(format!("map load timed out after {}s", after.as_secs())),
        )
    }
}

/// Categorize an error message, honoring `context` when given.
pub fn categorize(message: &str, context: Option<ErrorContext>) -> MapError {
    let kind = match context {
        Some(ctx) => kind_for_context(ctx, message),
        None => kind_for_message(message),
    };
    MapError::new(kind, Some(message.to_string()))
}

fn kind_for_context(context: ErrorContext, message: &str) -> MapErrorKind {
    match context {
        ErrorContext::ApiKey => credential_kind(&message.to_lowercase()),
        ErrorContext::Network => MapErrorKind::Network,
        ErrorContext::ScriptLoad => MapErrorKind::AcquisitionFailed,
        ErrorContext::Initialization => MapErrorKind::InitializationFailed,
    }
}

fn kind_for_message(message: &str) -> MapErrorKind {
    let lower = message.to_lowercase();
    if contains_any(&lower, CREDENTIAL_KEYWORDS) {
        credential_kind(&lower)
    } else if contains_any(&lower, NETWORK_KEYWORDS) {
        MapErrorKind::Network
    } else if contains_any(&lower, ACQUISITION_KEYWORDS) {
        MapErrorKind::AcquisitionFailed
    } else {
        MapErrorKind::Unknown
    }
}

fn credential_kind(lower: &str) -> MapErrorKind {
    if contains_any(lower, CREDENTIAL_INVALID_KEYWORDS) {
        MapErrorKind::CredentialInvalid
    } else {
        MapErrorKind::CredentialMissing
    }
}

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}
