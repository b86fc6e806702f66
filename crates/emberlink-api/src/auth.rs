// Cloud authentication
//
// Email/password sign-in against the token endpoint. The bearer token is
// stored inside the client and attached to every subsequent request; there
// is no automatic refresh -- an expired token surfaces as SessionExpired
// and the owner decides whether to sign in again.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::client::{CloudClient, Session};
use crate::error::Error;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    /// The cloud-side user id for the signed-in account.
    local_id: String,
}

#[derive(Deserialize)]
struct SignInError {
    #[serde(default)]
    message: Option<String>,
}

impl CloudClient {
    /// Exchange email/password for a bearer session.
    ///
    /// On success the token and user id are stored in the client and used
    /// for all subsequent requests. Safe to call again to replace an
    /// expired session.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        let url = self.base_url().join("v1/auth:signIn")?;
        debug!("signing in at {url}");

        let body = json!({
            "email": email,
            "password": password.expose_secret(),
        });

        let resp = self
            .http()
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        if !status.is_success() {
            let raw = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<SignInError>(&raw)
                .ok()
                .and_then(|e| e.message)
                .unwrap_or_else(|| format!("sign-in failed (HTTP {status})"));
            return Err(Error::Authentication { message });
        }

        let signin: SignInResponse = resp.json().await.map_err(Error::Transport)?;

        *self.session.write().expect("session lock poisoned") = Some(Session {
            token: signin.id_token,
            user_id: signin.local_id,
        });

        debug!("sign-in successful");
        Ok(())
    }
}
