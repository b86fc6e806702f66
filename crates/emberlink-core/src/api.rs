// ── Cloud API contract ──
//
// The coordinator depends on this trait, not on the concrete HTTP
// client, so tests can drive a full refresh cycle against an in-memory
// fake. `CloudClient` is the production implementation.

use std::future::Future;

use secrecy::SecretString;

use emberlink_api::{CloudClient, Error, RawChannel, RawDevice, RawUser};

/// The read surface the coordinator needs from the Emberlink cloud.
///
/// Implementations hold their session state internally: `login` is called
/// once per coordinator lifetime (lazily, on the first refresh) and every
/// other method reuses that session.
pub trait TelemetryApi: Send + Sync {
    /// Exchange credentials for a session held inside the client.
    fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// Fetch the signed-in user's account record.
    fn get_user(&self) -> impl Future<Output = Result<RawUser, Error>> + Send;

    /// Fetch one device by serial.
    fn get_device(&self, serial: &str) -> impl Future<Output = Result<RawDevice, Error>> + Send;

    /// Fetch one channel of a device; a not-found error marks the end of
    /// the device's channel range.
    fn get_device_channel(
        &self,
        serial: &str,
        index: u32,
    ) -> impl Future<Output = Result<RawChannel, Error>> + Send;
}

impl TelemetryApi for CloudClient {
    async fn login(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        CloudClient::login(self, email, password).await
    }

    async fn get_user(&self) -> Result<RawUser, Error> {
        CloudClient::get_user(self).await
    }

    async fn get_device(&self, serial: &str) -> Result<RawDevice, Error> {
        CloudClient::get_device(self, serial).await
    }

    async fn get_device_channel(&self, serial: &str, index: u32) -> Result<RawChannel, Error> {
        CloudClient::get_device_channel(self, serial, index).await
    }
}
