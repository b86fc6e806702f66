// ── Core error types ──
//
// Consumer-facing errors from emberlink-core. Only fatal-to-cycle
// failures cross the coordinator boundary; record-level problems are
// absorbed and logged. The `From<emberlink_api::Error>` impl translates
// transport-layer errors into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The user record carried no account id, so there is nothing to
    /// enumerate devices against.
    #[error("No account id found for user")]
    MissingAccountId,

    /// A refresh cycle aborted; the previous snapshot is retained.
    #[error("Error communicating with cloud API: {message}")]
    UpdateFailed { message: String },

    /// A refresh was requested while another cycle was still in flight.
    #[error("Refresh already in progress")]
    RefreshInProgress,
}

impl From<emberlink_api::Error> for CoreError {
    fn from(err: emberlink_api::Error) -> Self {
        if err.is_auth_error() {
            CoreError::AuthenticationFailed {
                message: err.to_string(),
            }
        } else {
            CoreError::UpdateFailed {
                message: err.to_string(),
            }
        }
    }
}
