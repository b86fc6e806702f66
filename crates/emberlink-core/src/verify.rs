// ── Credential verification ──
//
// One-shot check used by the host's setup wizard before it persists
// anything: sign in and fetch the user once, mapping failures into the
// two cases a wizard can act on (bad credentials vs unreachable cloud).

use secrecy::SecretString;
use tracing::debug;

use crate::api::TelemetryApi;

/// Why credential verification failed.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Invalid email or password")]
    InvalidAuth,

    #[error("Cannot connect to the Emberlink cloud")]
    CannotConnect,

    #[error("Unexpected error: {message}")]
    Unknown { message: String },
}

impl From<emberlink_api::Error> for CredentialError {
    fn from(err: emberlink_api::Error) -> Self {
        if err.is_auth_error() {
            Self::InvalidAuth
        } else if err.is_connect_error() {
            Self::CannotConnect
        } else {
            Self::Unknown {
                message: err.to_string(),
            }
        }
    }
}

/// The account a successful verification resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedAccount {
    /// Cloud-side user id -- the host's stable unique id for this entry.
    pub user_id: String,
    pub account_id: Option<String>,
}

/// Sign in with the given credentials and confirm the account is readable.
///
/// Performs exactly one login and one user fetch; nothing is cached on
/// success, the caller constructs its coordinator separately.
pub async fn verify_credentials<A: TelemetryApi>(
    api: &A,
    email: &str,
    password: &SecretString,
) -> Result<VerifiedAccount, CredentialError> {
    api.login(email, password).await?;
    let user = api.get_user().await?;
    debug!(user_id = ?user.user_id, "credentials verified");

    Ok(VerifiedAccount {
        user_id: user.user_id.unwrap_or_else(|| email.to_owned()),
        account_id: user.account_id,
    })
}
