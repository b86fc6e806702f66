// ── Update coordinator ──
//
// Single-flight polling engine for Emberlink cloud telemetry. Owns the
// session lifecycle, the user → devices → channels dependent fetch, the
// channel-probing discovery loop, partial-failure tolerance, and the
// last-good snapshot. Consumers subscribe for push notification and read
// through the synchronous lookup accessors.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::api::TelemetryApi;
use crate::config::{AccountCredentials, CoordinatorConfig};
use crate::error::CoreError;
use crate::model::{Channel, Device};
use crate::snapshot::TelemetryData;

const EVENT_CHANNEL_SIZE: usize = 16;

// ── RefreshEvent ─────────────────────────────────────────────────────

/// Per-cycle outcome notification.
///
/// Exactly one event fires per refresh cycle -- never per device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshEvent {
    /// A new snapshot was committed.
    Updated,
    /// The cycle aborted; the previous snapshot is still current.
    Failed { cause: String },
}

// ── Coordinator ──────────────────────────────────────────────────────

/// The polling engine consumers hold.
///
/// Cheaply cloneable via `Arc` internals. Generic over [`TelemetryApi`]
/// so the refresh machinery is testable against an in-memory fake; the
/// production type is `Coordinator<CloudClient>`.
pub struct Coordinator<A> {
    inner: Arc<CoordinatorInner<A>>,
}

impl<A> Clone for Coordinator<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct CoordinatorInner<A> {
    api: A,
    credentials: AccountCredentials,
    config: CoordinatorConfig,
    /// Set after the first successful login; later cycles reuse the
    /// session held inside the api client.
    authenticated: AtomicBool,
    /// Single-flight guard: a cycle runs with this held, and a second
    /// cycle may not start while it is taken.
    refresh_gate: tokio::sync::Mutex<()>,
    data: watch::Sender<Arc<TelemetryData>>,
    events: broadcast::Sender<RefreshEvent>,
    last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    cancel: CancellationToken,
    poll_task: std::sync::Mutex<Option<JoinHandle<()>>>,
}

impl<A: TelemetryApi> Coordinator<A> {
    /// Create a coordinator. Does NOT authenticate or fetch anything --
    /// the session is established lazily by the first refresh cycle.
    pub fn new(api: A, credentials: AccountCredentials, config: CoordinatorConfig) -> Self {
        let (data, _) = watch::channel(Arc::new(TelemetryData::default()));
        let (events, _) = broadcast::channel(EVENT_CHANNEL_SIZE);
        let (last_refresh, _) = watch::channel(None);

        Self {
            inner: Arc::new(CoordinatorInner {
                api,
                credentials,
                config,
                authenticated: AtomicBool::new(false),
                refresh_gate: tokio::sync::Mutex::new(()),
                data,
                events,
                last_refresh,
                cancel: CancellationToken::new(),
                poll_task: std::sync::Mutex::new(None),
            }),
        }
    }

    /// Access the coordinator configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    // ── Subscriptions & snapshot access ──────────────────────────────

    /// Subscribe to snapshot replacements.
    ///
    /// The background poll task only runs cycles while at least one
    /// subscription from this method is alive.
    pub fn subscribe(&self) -> watch::Receiver<Arc<TelemetryData>> {
        self.inner.data.subscribe()
    }

    /// Subscribe to per-cycle outcome events.
    pub fn events(&self) -> broadcast::Receiver<RefreshEvent> {
        self.inner.events.subscribe()
    }

    /// The most recently committed snapshot (cheap `Arc` clone).
    pub fn current(&self) -> Arc<TelemetryData> {
        self.inner.data.borrow().clone()
    }

    /// Look up a device by resolved identifier in the current snapshot.
    ///
    /// Synchronous and read-only; never triggers a refresh. `None` means
    /// the device is gone from the latest data and its dependent sensors
    /// should render unavailable.
    pub fn find_device(&self, identifier: &str) -> Option<Device> {
        self.inner.data.borrow().find_device(identifier).cloned()
    }

    /// Look up a channel by device identifier and channel number in the
    /// current snapshot. Same contract as [`find_device`](Self::find_device).
    pub fn find_channel(&self, device_identifier: &str, number: &str) -> Option<Channel> {
        self.inner
            .data
            .borrow()
            .find_channel(device_identifier, number)
            .cloned()
    }

    /// When the last successful refresh committed, if ever.
    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.inner.last_refresh.borrow()
    }

    /// How stale the current snapshot is, or `None` if never refreshed.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }

    fn subscriber_count(&self) -> usize {
        self.inner.data.receiver_count()
    }

    // ── Refresh cycle ────────────────────────────────────────────────

    /// Run one refresh cycle now.
    ///
    /// Returns [`CoreError::RefreshInProgress`] without doing anything if
    /// another cycle is already in flight. On success the new snapshot is
    /// committed atomically and one [`RefreshEvent::Updated`] fires; on a
    /// fatal failure the previous snapshot is retained and one
    /// [`RefreshEvent::Failed`] fires with the cause text.
    pub async fn refresh_now(&self) -> Result<(), CoreError> {
        let Ok(_guard) = self.inner.refresh_gate.try_lock() else {
            return Err(CoreError::RefreshInProgress);
        };

        match self.run_cycle().await {
            Ok(data) => {
                debug!(devices = data.devices.len(), "refresh cycle complete");
                self.inner.data.send_replace(Arc::new(data));
                self.inner.last_refresh.send_replace(Some(Utc::now()));
                let _ = self.inner.events.send(RefreshEvent::Updated);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "refresh cycle failed; previous snapshot retained");
                let _ = self.inner.events.send(RefreshEvent::Failed {
                    cause: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// One full pass: session, user, ordered devices, channel discovery.
    ///
    /// Fatal-to-cycle errors propagate; record-level problems are logged
    /// and the offending record is dropped from the snapshot under
    /// construction.
    async fn run_cycle(&self) -> Result<TelemetryData, CoreError> {
        self.ensure_session().await?;

        let user = self.inner.api.get_user().await?;
        let account_id = user.account_id.ok_or(CoreError::MissingAccountId)?;
        let serials = user
            .device_order
            .get(&account_id)
            .cloned()
            .unwrap_or_default();
        debug!(%account_id, devices = serials.len(), "retrieved device order");

        let mut devices = Vec::with_capacity(serials.len());
        let mut channels = HashMap::with_capacity(serials.len());

        for serial in &serials {
            let raw = match self.inner.api.get_device(serial).await {
                Ok(raw) => raw,
                Err(e) if e.is_not_found() => {
                    // The order list can reference deleted units.
                    warn!(%serial, "ordered device no longer exists; skipping");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            let device = match Device::from_raw(raw) {
                Ok(device) => device,
                Err(e) => {
                    error!(%serial, %e, "skipping device with incomplete record");
                    continue;
                }
            };

            let discovered = self.discover_channels(&device).await;
            debug!(
                device = %device.display_name(),
                channels = discovered.len(),
                "channel discovery complete"
            );
            channels.insert(device.identifier().to_owned(), discovered);
            devices.push(device);
        }

        Ok(TelemetryData { devices, channels })
    }

    /// Establish the cloud session on the first cycle; reuse it afterwards.
    async fn ensure_session(&self) -> Result<(), CoreError> {
        if self.inner.authenticated.load(Ordering::Acquire) {
            return Ok(());
        }

        debug!(email = %self.inner.credentials.email, "establishing cloud session");
        self.inner
            .api
            .login(&self.inner.credentials.email, &self.inner.credentials.password)
            .await
            .map_err(|e| CoreError::AuthenticationFailed {
                message: e.to_string(),
            })?;
        self.inner.authenticated.store(true, Ordering::Release);
        Ok(())
    }

    /// Probe channel indices 1,2,3,… for one device.
    ///
    /// A not-found result ends discovery (that index and everything above
    /// it are absent). Any other fetch error skips that single index.
    /// The probe ceiling bounds worst-case latency per device.
    async fn discover_channels(&self, device: &Device) -> Vec<Channel> {
        let mut found = Vec::new();

        for index in 1..=self.inner.config.channel_probe_limit {
            let raw = match self
                .inner
                .api
                .get_device_channel(&device.serial, index)
                .await
            {
                Ok(raw) => raw,
                Err(e) if e.is_not_found() => {
                    debug!(device = %device.display_name(), index, "end of channel range");
                    break;
                }
                Err(e) => {
                    warn!(
                        device = %device.display_name(),
                        index,
                        error = %e,
                        "channel fetch failed; skipping index"
                    );
                    continue;
                }
            };

            match Channel::from_raw(raw) {
                Ok(channel) => found.push(channel),
                Err(e) => {
                    error!(
                        device = %device.display_name(),
                        index,
                        %e,
                        "skipping channel with incomplete record"
                    );
                }
            }
        }

        found
    }
}

impl<A: TelemetryApi + 'static> Coordinator<A> {
    // ── Background polling ───────────────────────────────────────────

    /// Start the background poll task.
    ///
    /// The task ticks on the configured interval and runs a cycle only
    /// while at least one [`subscribe()`](Self::subscribe) receiver is
    /// alive. Calling `spawn` again while the task is running is a no-op.
    pub fn spawn(&self) {
        let mut guard = self
            .inner
            .poll_task
            .lock()
            .expect("poll task lock poisoned");
        if guard.is_some() {
            debug!("poll task already running");
            return;
        }

        let coordinator = self.clone();
        let cancel = self.inner.cancel.clone();
        let period = self.inner.config.poll_interval;
        *guard = Some(tokio::spawn(poll_task(coordinator, period, cancel)));
    }

    /// Stop the background poll task and wait for it to finish.
    ///
    /// A cycle already in flight runs to completion first; there is no
    /// mid-cycle cancellation.
    pub async fn shutdown(&self) {
        self.inner.cancel.cancel();
        let handle = self
            .inner
            .poll_task
            .lock()
            .expect("poll task lock poisoned")
            .take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
        debug!("coordinator shut down");
    }
}

async fn poll_task<A: TelemetryApi + 'static>(
    coordinator: Coordinator<A>,
    period: Duration,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        if coordinator.subscriber_count() == 0 {
            debug!("no subscribers; skipping scheduled refresh");
            continue;
        }

        match coordinator.refresh_now().await {
            Ok(()) => {}
            Err(CoreError::RefreshInProgress) => {
                debug!("previous cycle still in flight; skipping tick");
            }
            // Already logged by refresh_now; the next tick retries.
            Err(_) => {}
        }
    }

    debug!("poll task stopped");
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::AtomicU32;

    use emberlink_api::{Error as ApiError, RawChannel, RawDevice, RawUser};
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;

    use super::*;

    // ── Fake cloud API ───────────────────────────────────────────────

    #[derive(Clone)]
    enum ChannelReply {
        Found(RawChannel),
        NotFound,
        Error,
    }

    #[derive(Default)]
    struct FakeApi {
        fail_login: bool,
        fail_user: AtomicBool,
        account_id: Option<String>,
        device_order: Vec<String>,
        devices: HashMap<String, RawDevice>,
        /// Channel replies per serial, positionally for probe index 1..;
        /// indices past the end answer not-found.
        channels: HashMap<String, Vec<ChannelReply>>,
        login_calls: AtomicU32,
        probes: Mutex<Vec<(String, u32)>>,
    }

    impl FakeApi {
        fn with_account(account_id: &str) -> Self {
            Self {
                account_id: Some(account_id.to_owned()),
                ..Self::default()
            }
        }

        fn add_device(&mut self, serial: &str, raw: RawDevice, channels: Vec<ChannelReply>) {
            self.device_order.push(serial.to_owned());
            self.devices.insert(serial.to_owned(), raw);
            self.channels.insert(serial.to_owned(), channels);
        }

        fn probes_for(&self, serial: &str) -> Vec<u32> {
            self.probes
                .lock()
                .unwrap()
                .iter()
                .filter(|(s, _)| s == serial)
                .map(|&(_, i)| i)
                .collect()
        }
    }

    impl TelemetryApi for Arc<FakeApi> {
        async fn login(&self, _email: &str, _password: &SecretString) -> Result<(), ApiError> {
            self.login_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_login {
                return Err(ApiError::Authentication {
                    message: "INVALID_PASSWORD".into(),
                });
            }
            Ok(())
        }

        async fn get_user(&self) -> Result<RawUser, ApiError> {
            if self.fail_user.load(Ordering::SeqCst) {
                return Err(ApiError::Api {
                    status: 500,
                    message: "user service exploded".into(),
                });
            }
            let mut device_order = HashMap::new();
            if let Some(account_id) = &self.account_id {
                device_order.insert(account_id.clone(), self.device_order.clone());
            }
            Ok(RawUser {
                user_id: Some("user-1".into()),
                account_id: self.account_id.clone(),
                device_order,
            })
        }

        async fn get_device(&self, serial: &str) -> Result<RawDevice, ApiError> {
            self.devices
                .get(serial)
                .cloned()
                .ok_or_else(|| ApiError::NotFound {
                    resource: format!("v1/devices/{serial}"),
                })
        }

        async fn get_device_channel(
            &self,
            serial: &str,
            index: u32,
        ) -> Result<RawChannel, ApiError> {
            self.probes
                .lock()
                .unwrap()
                .push((serial.to_owned(), index));

            let reply = self
                .channels
                .get(serial)
                .and_then(|replies| replies.get(index as usize - 1))
                .cloned()
                .unwrap_or(ChannelReply::NotFound);

            match reply {
                ChannelReply::Found(raw) => Ok(raw),
                ChannelReply::NotFound => Err(ApiError::NotFound {
                    resource: format!("v1/devices/{serial}/channels/{index}"),
                }),
                ChannelReply::Error => Err(ApiError::Api {
                    status: 500,
                    message: "channel service exploded".into(),
                }),
            }
        }
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn credentials() -> AccountCredentials {
        AccountCredentials {
            email: "cook@example.com".into(),
            password: SecretString::from("hunter2".to_owned()),
        }
    }

    fn raw_device(serial: &str, device_id: Option<&str>) -> RawDevice {
        RawDevice {
            serial: Some(serial.to_owned()),
            device_id: device_id.map(String::from),
            label: None,
            device_name: None,
            firmware: None,
            battery: None,
            battery_charging: None,
            wifi_strength: None,
        }
    }

    fn raw_channel(number: &str, value: f64, units: &str) -> RawChannel {
        RawChannel {
            number: Some(number.to_owned()),
            value: Some(value),
            units: Some(units.to_owned()),
            status: Some("NORMAL".to_owned()),
            label: None,
        }
    }

    fn found(number: &str, value: f64, units: &str) -> ChannelReply {
        ChannelReply::Found(raw_channel(number, value, units))
    }

    fn coordinator(api: Arc<FakeApi>) -> Coordinator<Arc<FakeApi>> {
        Coordinator::new(api, credentials(), CoordinatorConfig::default())
    }

    // ── Discovery ────────────────────────────────────────────────────

    #[tokio::test]
    async fn discovery_stops_at_first_not_found() {
        let mut api = FakeApi::with_account("acct");
        api.add_device(
            "SN1",
            raw_device("SN1", None),
            vec![
                found("1", 100.0, "F"),
                found("2", 101.0, "F"),
                found("3", 45.0, "H"),
            ],
        );
        let api = Arc::new(api);
        let coordinator = coordinator(Arc::clone(&api));

        coordinator.refresh_now().await.unwrap();

        let data = coordinator.current();
        let numbers: Vec<&str> = data
            .device_channels("SN1")
            .iter()
            .map(|c| c.number.as_str())
            .collect();
        assert_eq!(numbers, ["1", "2", "3"]);
        // Stopped at the first gap: probed 4, never 5..9.
        assert_eq!(api.probes_for("SN1"), [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn discovery_skips_errored_index_and_continues() {
        let mut api = FakeApi::with_account("acct");
        api.add_device(
            "SN1",
            raw_device("SN1", None),
            vec![
                found("1", 100.0, "F"),
                ChannelReply::Error,
                found("3", 102.0, "F"),
            ],
        );
        let api = Arc::new(api);
        let coordinator = coordinator(Arc::clone(&api));

        coordinator.refresh_now().await.unwrap();

        let data = coordinator.current();
        let numbers: Vec<&str> = data
            .device_channels("SN1")
            .iter()
            .map(|c| c.number.as_str())
            .collect();
        assert_eq!(numbers, ["1", "3"]);
        assert_eq!(api.probes_for("SN1"), [1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn discovery_respects_probe_ceiling() {
        let mut api = FakeApi::with_account("acct");
        api.add_device(
            "SN1",
            raw_device("SN1", None),
            vec![ChannelReply::Error; 20],
        );
        let api = Arc::new(api);
        let coordinator = coordinator(Arc::clone(&api));

        coordinator.refresh_now().await.unwrap();

        assert!(coordinator.current().device_channels("SN1").is_empty());
        assert_eq!(api.probes_for("SN1"), [1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[tokio::test]
    async fn invalid_channel_record_is_dropped_without_stopping_discovery() {
        let mut api = FakeApi::with_account("acct");
        api.add_device(
            "SN1",
            raw_device("SN1", None),
            vec![
                found("1", 100.0, "F"),
                ChannelReply::Found(RawChannel {
                    number: Some("2".into()),
                    value: None,
                    units: None,
                    status: None,
                    label: None,
                }),
                found("3", 102.0, "F"),
            ],
        );
        let api = Arc::new(api);
        let coordinator = coordinator(api);

        coordinator.refresh_now().await.unwrap();

        let data = coordinator.current();
        let numbers: Vec<&str> = data
            .device_channels("SN1")
            .iter()
            .map(|c| c.number.as_str())
            .collect();
        assert_eq!(numbers, ["1", "3"]);
    }

    // ── Cycle outcomes ───────────────────────────────────────────────

    #[tokio::test]
    async fn fatal_failure_retains_snapshot_and_reports_cause() {
        let mut api = FakeApi::with_account("acct");
        api.add_device("SN1", raw_device("SN1", Some("dev-1")), vec![]);
        let api = Arc::new(api);
        let coordinator = coordinator(Arc::clone(&api));
        let mut events = coordinator.events();

        coordinator.refresh_now().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), RefreshEvent::Updated);
        let committed = coordinator.current();
        assert_eq!(committed.devices.len(), 1);

        // The user endpoint starts failing; the committed snapshot must
        // survive and the failure event must carry the cause text.
        api.fail_user.store(true, Ordering::SeqCst);
        let err = coordinator.refresh_now().await.unwrap_err();
        assert!(matches!(err, CoreError::UpdateFailed { .. }));

        assert!(Arc::ptr_eq(&committed, &coordinator.current()));
        assert!(coordinator.find_device("dev-1").is_some());
        match events.recv().await.unwrap() {
            RefreshEvent::Failed { cause } => assert!(cause.contains("user service exploded")),
            RefreshEvent::Updated => panic!("expected failure event"),
        }
    }

    #[tokio::test]
    async fn login_failure_is_fatal_and_reported() {
        let api = Arc::new(FakeApi {
            fail_login: true,
            ..FakeApi::with_account("acct")
        });
        let coordinator = coordinator(Arc::clone(&api));
        let mut events = coordinator.events();

        let err = coordinator.refresh_now().await.unwrap_err();

        assert!(matches!(err, CoreError::AuthenticationFailed { .. }));
        let event = events.recv().await.unwrap();
        match event {
            RefreshEvent::Failed { cause } => assert!(cause.contains("INVALID_PASSWORD")),
            RefreshEvent::Updated => panic!("expected failure event"),
        }
        assert!(coordinator.last_refresh().is_none());
    }

    #[tokio::test]
    async fn session_is_established_once_across_cycles() {
        let mut api = FakeApi::with_account("acct");
        api.add_device("SN1", raw_device("SN1", None), vec![]);
        let api = Arc::new(api);
        let coordinator = coordinator(Arc::clone(&api));

        coordinator.refresh_now().await.unwrap();
        coordinator.refresh_now().await.unwrap();
        coordinator.refresh_now().await.unwrap();

        assert_eq!(api.login_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_account_is_a_successful_refresh() {
        let api = Arc::new(FakeApi::with_account("acct"));
        let coordinator = coordinator(api);
        let mut events = coordinator.events();

        coordinator.refresh_now().await.unwrap();

        assert_eq!(events.recv().await.unwrap(), RefreshEvent::Updated);
        assert!(coordinator.current().devices.is_empty());
        assert!(coordinator.last_refresh().is_some());
    }

    #[tokio::test]
    async fn missing_account_id_is_fatal() {
        let api = Arc::new(FakeApi::default());
        let coordinator = coordinator(api);

        let err = coordinator.refresh_now().await.unwrap_err();

        assert!(matches!(err, CoreError::MissingAccountId));
    }

    #[tokio::test]
    async fn invalid_device_record_is_skipped_but_siblings_survive() {
        let mut api = FakeApi::with_account("acct");
        api.add_device("SN1", raw_device("SN1", None), vec![]);
        api.add_device(
            "SN2",
            RawDevice {
                serial: None,
                device_id: None,
                label: None,
                device_name: None,
                firmware: None,
                battery: None,
                battery_charging: None,
                wifi_strength: None,
            },
            vec![],
        );
        api.add_device("SN3", raw_device("SN3", Some("dev-3")), vec![]);
        let api = Arc::new(api);
        let coordinator = coordinator(api);

        coordinator.refresh_now().await.unwrap();

        let data = coordinator.current();
        let serials: Vec<&str> = data.devices.iter().map(|d| d.serial.as_str()).collect();
        assert_eq!(serials, ["SN1", "SN3"]);
    }

    #[tokio::test]
    async fn stale_ordered_serial_is_skipped() {
        let mut api = FakeApi::with_account("acct");
        api.add_device("SN1", raw_device("SN1", None), vec![]);
        // In the order list but no device record behind it.
        api.device_order.push("SN-GONE".to_owned());
        let api = Arc::new(api);
        let coordinator = coordinator(api);

        coordinator.refresh_now().await.unwrap();

        assert_eq!(coordinator.current().devices.len(), 1);
    }

    #[tokio::test]
    async fn channels_are_keyed_by_resolved_identifier() {
        let mut api = FakeApi::with_account("acct");
        api.add_device(
            "SN1",
            raw_device("SN1", Some("dev-1")),
            vec![found("1", 100.0, "F")],
        );
        let api = Arc::new(api);
        let coordinator = coordinator(api);

        coordinator.refresh_now().await.unwrap();

        assert!(coordinator.find_channel("dev-1", "1").is_some());
        assert!(coordinator.find_channel("SN1", "1").is_none());
    }

    #[tokio::test]
    async fn refresh_is_single_flight() {
        let api = Arc::new(FakeApi::with_account("acct"));
        let coordinator = coordinator(api);

        let _gate = coordinator.inner.refresh_gate.try_lock().unwrap();
        let err = coordinator.refresh_now().await.unwrap_err();

        assert!(matches!(err, CoreError::RefreshInProgress));
    }

    // ── Background polling ───────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn poll_task_only_refreshes_while_subscribed() {
        let api = Arc::new(FakeApi::with_account("acct"));
        let coordinator = Coordinator::new(
            Arc::clone(&api),
            credentials(),
            CoordinatorConfig::new(Duration::from_secs(5)),
        );
        coordinator.spawn();

        // Several ticks elapse with no subscriber: nothing runs.
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(api.login_calls.load(Ordering::SeqCst), 0);

        let _rx = coordinator.subscribe();
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert!(api.login_calls.load(Ordering::SeqCst) >= 1);

        coordinator.shutdown().await;
    }
}
