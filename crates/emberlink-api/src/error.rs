use thiserror::Error;

/// Top-level error type for the `emberlink-api` crate.
///
/// Covers every failure mode of the cloud API surface: authentication,
/// transport, and structured API errors. `emberlink-core` maps these into
/// consumer-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Sign-in failed (wrong credentials, account locked, etc.)
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// The bearer token was rejected (expired or revoked).
    #[error("Session expired -- re-authentication required")]
    SessionExpired,

    /// A request was made before `login()` established a session.
    #[error("Not authenticated -- call login() first")]
    NotAuthenticated,

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── API ─────────────────────────────────────────────────────────
    /// The requested resource does not exist (HTTP 404).
    ///
    /// Channel discovery relies on this variant to detect the end of a
    /// device's channel range.
    #[error("Resource not found: {resource}")]
    NotFound { resource: String },

    /// Structured error from the cloud API.
    #[error("Cloud API error (HTTP {status}): {message}")]
    Api { message: String, status: u16 },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }

    /// Returns `true` if this error indicates the session is invalid
    /// or could not be established.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::SessionExpired | Self::NotAuthenticated
        )
    }

    /// Returns `true` if this is a connectivity failure rather than an
    /// API-level rejection.
    pub fn is_connect_error(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            _ => false,
        }
    }
}
