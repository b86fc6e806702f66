// Hand-crafted async HTTP client for the Emberlink cloud API (v1).
//
// Base path: /v1/
// Auth: bearer token obtained from the sign-in endpoint (see auth.rs)

use std::sync::RwLock;

use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{RawChannel, RawDevice, RawUser};

// ── Error response shape from the cloud API ──────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

/// A signed-in session: bearer token plus the cloud-side user id.
#[derive(Debug, Clone)]
pub(crate) struct Session {
    pub(crate) token: String,
    pub(crate) user_id: String,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the Emberlink cloud API.
///
/// Holds the session state established by [`login()`](CloudClient::login)
/// internally, so one authenticated client can be shared for the lifetime
/// of a coordinator. All reads are JSON REST endpoints under `/v1/`.
pub struct CloudClient {
    http: reqwest::Client,
    base_url: Url,
    pub(crate) session: RwLock<Option<Session>>,
}

impl CloudClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the given cloud endpoint.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self {
            http,
            base_url,
            session: RwLock::new(None),
        })
    }

    /// Wrap an existing `reqwest::Client` (used by tests against a mock
    /// server).
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        let base_url = ensure_trailing_slash(base_url);
        Self {
            http,
            base_url,
            session: RwLock::new(None),
        }
    }

    /// Parse and normalize the base URL so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        Ok(ensure_trailing_slash(url))
    }

    /// The cloud endpoint this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The underlying HTTP client (for the sign-in flow).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The signed-in user id, if a session has been established.
    pub fn user_id(&self) -> Option<String> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| s.user_id.clone())
    }

    /// Returns `true` once `login()` has established a session.
    pub fn is_authenticated(&self) -> bool {
        self.session
            .read()
            .expect("session lock poisoned")
            .is_some()
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join a relative path (e.g. `"v1/users/me"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        self.base_url.join(path).map_err(Error::InvalidUrl)
    }

    // ── Request plumbing ─────────────────────────────────────────────

    /// Clone the bearer token out of the session state.
    ///
    /// The read guard is released before any await point.
    fn bearer(&self) -> Result<String, Error> {
        self.session
            .read()
            .expect("session lock poisoned")
            .as_ref()
            .map(|s| format!("Bearer {}", s.token))
            .ok_or(Error::NotAuthenticated)
    }

    /// Send an authenticated GET and decode the JSON body.
    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        let bearer = self.bearer()?;
        debug!("GET {url}");

        let resp = self
            .http
            .get(url)
            .header(AUTHORIZATION, bearer)
            .send()
            .await?;
        self.handle_response(path, resp).await
    }

    async fn handle_response<T: DeserializeOwned>(
        &self,
        path: &str,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview = &body[..body.len().min(200)];
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(path, status, resp).await)
        }
    }

    async fn parse_error(
        &self,
        path: &str,
        status: reqwest::StatusCode,
        resp: reqwest::Response,
    ) -> Error {
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Error::SessionExpired;
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Error::NotFound {
                resource: path.to_owned(),
            };
        }

        let raw = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&raw)
            .ok()
            .and_then(|e| e.message)
            .unwrap_or_else(|| status.to_string());

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }

    // ── Read endpoints ───────────────────────────────────────────────

    /// Fetch the signed-in user's account record.
    pub async fn get_user(&self) -> Result<RawUser, Error> {
        self.get("v1/users/me").await
    }

    /// Fetch one device by serial number.
    pub async fn get_device(&self, serial: &str) -> Result<RawDevice, Error> {
        self.get(&format!("v1/devices/{serial}")).await
    }

    /// Fetch one probe channel of a device.
    ///
    /// The cloud returns 404 for an index past the device's last channel,
    /// which callers use to terminate discovery.
    pub async fn get_device_channel(&self, serial: &str, index: u32) -> Result<RawChannel, Error> {
        self.get(&format!("v1/devices/{serial}/channels/{index}"))
            .await
    }
}

fn ensure_trailing_slash(mut url: Url) -> Url {
    let path = url.path().trim_end_matches('/').to_owned();
    url.set_path(&format!("{path}/"));
    url
}
