//! Lift controller
//! Owns the single BLE session with one lift, exposes the open/close
//! commands and keeps the host informed about availability and the
//! believed lift position.

use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use log::{debug, error, info};
use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::core::bluetooth::{
    DeviceInfo, DisconnectCallback, LiftCommand, LiftConnection, LiftDevice, LiftModel,
    MAX_CONNECT_ATTEMPTS, Transport, UUID_CONTROL_CHAR,
};
use crate::error::TransportError;

/// What the host sees of a lift
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LiftSnapshot {
    pub available: bool,
    /// `None` until the first open or close command has been issued
    pub is_closed: Option<bool>,
}

/// Receives every state change of a lift.
///
/// `publish` is called while the controller's state lock is held, so it must
/// not call back into the controller.
pub trait StateSink: Send + Sync {
    fn publish(&self, snapshot: LiftSnapshot);
}

impl StateSink for watch::Sender<LiftSnapshot> {
    fn publish(&self, snapshot: LiftSnapshot) {
        self.send_replace(snapshot);
    }
}

/// State shared between the controller and the transport's disconnect callback
struct SharedState {
    snapshot: Mutex<LiftSnapshot>,
    sink: Arc<dyn StateSink>,
}

impl SharedState {
    fn update(&self, change: impl FnOnce(&mut LiftSnapshot)) {
        let mut snapshot = self.snapshot.lock().unwrap_or_else(|e| e.into_inner());
        change(&mut snapshot);
        self.sink.publish(*snapshot);
    }

    fn get(&self) -> LiftSnapshot {
        *self.snapshot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Controls one lift over one BLE session
pub struct LiftController {
    device: LiftDevice,
    name: String,
    transport: Arc<dyn Transport>,
    connect_attempts: u32,
    /// The only live session; every connect, disconnect and write holds this lock
    connection: tokio::sync::Mutex<Option<Box<dyn LiftConnection>>>,
    shared: Arc<SharedState>,
    shutdown: CancellationToken,
}

impl LiftController {
    pub fn new(
        device: LiftDevice,
        name: impl Into<String>,
        transport: Arc<dyn Transport>,
        sink: Arc<dyn StateSink>,
        shutdown: CancellationToken,
    ) -> Self {
        let name = name.into();
        info!("Initializing lift controller: {}, {}", name, device.address);
        Self {
            device,
            name,
            transport,
            connect_attempts: MAX_CONNECT_ATTEMPTS,
            connection: tokio::sync::Mutex::new(None),
            shared: Arc::new(SharedState {
                snapshot: Mutex::new(LiftSnapshot::default()),
                sink,
            }),
            shutdown,
        }
    }

    /// Overrides how many attempts each connect makes
    pub fn with_connect_attempts(mut self, attempts: u32) -> Self {
        self.connect_attempts = attempts;
        self
    }

    /// The host-facing unique id, the lift's hardware address
    pub fn unique_id(&self) -> &str {
        &self.device.address
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> LiftModel {
        self.device.model
    }

    pub fn device_info(&self) -> DeviceInfo {
        DeviceInfo::new(&self.device, &self.name)
    }

    /// The commands the host may offer for this lift
    pub fn supported_features(&self) -> &'static [LiftCommand] {
        &[LiftCommand::Open, LiftCommand::Close]
    }

    pub fn snapshot(&self) -> LiftSnapshot {
        self.shared.get()
    }

    pub fn is_available(&self) -> bool {
        self.snapshot().available
    }

    pub fn is_closed(&self) -> Option<bool> {
        self.snapshot().is_closed
    }

    /// Host "added" hook.
    ///
    /// Registers the shutdown listener, publishes the initial state and makes
    /// a best-effort first connection. The returned task finishes once the
    /// shutdown teardown has run.
    pub async fn start(self: &Arc<Self>) -> JoinHandle<()> {
        let controller: Weak<Self> = Arc::downgrade(self);
        let shutdown = self.shutdown.clone();
        let listener = tokio::spawn(async move {
            shutdown.cancelled().await;
            if let Some(controller) = controller.upgrade() {
                controller.remove().await;
            }
        });

        self.shared.update(|_| {});
        if let Err(e) = self.connect().await {
            debug!("Exception connecting to {}: {}", self.device.address, e);
        }
        listener
    }

    /// Host "will remove" hook, also run on shutdown
    pub async fn remove(&self) {
        debug!("Removing lift {}", self.device.address);
        self.disconnect().await;
    }

    /// Calls [`Self::poll_refresh`] every `interval` until shutdown
    pub fn spawn_polling(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let controller = Arc::clone(self);
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // the first tick completes immediately
            ticker.tick().await;
            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => break,
                    _ = ticker.tick() => controller.poll_refresh().await,
                }
            }
            debug!("Polling for {} stopped", controller.device.address);
        })
    }

    /// Replaces any existing session with a fresh one
    pub async fn connect(&self) -> Result<(), TransportError> {
        let mut connection = self.connection.lock().await;
        self.connect_locked(&mut connection).await
    }

    /// Tears the session down. A no-op without a session.
    pub async fn disconnect(&self) {
        let mut connection = self.connection.lock().await;
        self.disconnect_locked(&mut connection).await;
    }

    /// Writes `payload` to the control characteristic, connecting first when
    /// the lift is unavailable. Returns whether the write went through.
    pub async fn send_command(&self, payload: &[u8]) -> bool {
        let mut connection = self.connection.lock().await;
        self.send_locked(&mut connection, payload).await
    }

    /// Raises the lift.
    ///
    /// The believed position is updated whether or not the write succeeded.
    pub async fn open(&self) -> bool {
        self.run_command(LiftCommand::Open).await
    }

    /// Lowers the lift. Same optimistic update as [`Self::open`].
    pub async fn close(&self) -> bool {
        self.run_command(LiftCommand::Close).await
    }

    /// Scheduled refresh. The lift cannot report its position, so this only
    /// re-establishes a lost session.
    pub async fn poll_refresh(&self) {
        if !self.is_available() {
            debug!("Reconnecting to lift {}", self.device.address);
            if let Err(e) = self.connect().await {
                debug!("Refresh of {} failed: {}", self.device.address, e);
            }
        }
    }

    async fn run_command(&self, command: LiftCommand) -> bool {
        debug!("{:?} cover {}", command, self.device.address);
        let mut connection = self.connection.lock().await;
        let sent = self.send_locked(&mut connection, &command.to_bytes()).await;
        // the lift has no position feedback, record what was commanded
        self.shared.update(|s| s.is_closed = Some(command.is_closed_after()));
        sent
    }

    async fn send_locked(
        &self,
        connection: &mut Option<Box<dyn LiftConnection>>,
        payload: &[u8],
    ) -> bool {
        if !self.is_available() {
            if let Err(e) = self.connect_locked(connection).await {
                debug!("Send Cmd: could not reach {}: {}", self.device.address, e);
            }
        }

        let Some(handle) = connection.as_ref() else {
            error!("Send Cmd: no connection to {}", self.device.address);
            return false;
        };

        match handle.write(UUID_CONTROL_CHAR, payload).await {
            Ok(()) => true,
            Err(e) => {
                error!("Send Cmd: {}", e);
                false
            }
        }
    }

    async fn connect_locked(
        &self,
        connection: &mut Option<Box<dyn LiftConnection>>,
    ) -> Result<(), TransportError> {
        if let Some(existing) = connection.as_ref() {
            if !existing.is_connected().await {
                debug!("Connection to {} has dropped", self.device.address);
            }
        }
        self.disconnect_locked(connection).await;

        debug!("Connecting now to {} ({})", self.device.address, self.device.name);
        match self
            .transport
            .connect(&self.device, self.connect_attempts, self.disconnect_callback())
            .await
        {
            Ok(handle) => {
                *connection = Some(handle);
                info!("Connected to {}", self.device.address);
                self.shared.update(|s| s.available = true);
                Ok(())
            }
            Err(e) => {
                error!("Connection to {} failed: {}", self.device.address, e);
                Err(e)
            }
        }
    }

    async fn disconnect_locked(&self, connection: &mut Option<Box<dyn LiftConnection>>) {
        let Some(handle) = connection.take() else {
            return;
        };

        debug!("Disconnecting from {}", self.device.address);
        if let Err(e) = handle.disconnect().await {
            error!("Disconnection from {} failed: {}", self.device.address, e);
        }
        self.shared.update(|s| s.available = false);
    }

    fn disconnect_callback(&self) -> DisconnectCallback {
        let shared = Arc::clone(&self.shared);
        Arc::new(move |address: &str| {
            debug!("Disconnected callback from {}", address);
            shared.update(|s| s.available = false);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::bluetooth::{CLOSE_PAYLOAD, OPEN_PAYLOAD};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
    use tokio::sync::Notify;
    use tokio::time::timeout;
    use uuid::Uuid;

    const ADDRESS: &str = "AA:BB:CC:DD:EE:FF";

    /// Parks one mock call until released
    #[derive(Default)]
    struct Gate {
        entered: Notify,
        release: Notify,
    }

    impl Gate {
        async fn pass(&self) {
            self.entered.notify_one();
            self.release.notified().await;
        }
    }

    #[derive(Default)]
    struct MockState {
        fail_connect: AtomicBool,
        fail_write: AtomicBool,
        connect_calls: AtomicU32,
        attempts_requested: Mutex<Vec<u32>>,
        live: AtomicUsize,
        max_live: AtomicUsize,
        writes: Mutex<Vec<Vec<u8>>>,
        last_link: Mutex<Option<(Arc<AtomicBool>, DisconnectCallback)>>,
        connect_gates: Mutex<VecDeque<Arc<Gate>>>,
        write_gates: Mutex<VecDeque<Arc<Gate>>>,
    }

    impl MockState {
        /// Simulates the link dropping under the current session
        fn drop_link(&self) {
            let link = self.last_link.lock().unwrap().clone();
            let (connected, callback) = link.expect("no session to drop");
            connected.store(false, Ordering::SeqCst);
            callback(ADDRESS);
        }

        fn writes(&self) -> Vec<Vec<u8>> {
            self.writes.lock().unwrap().clone()
        }

        fn gate_next_connect(&self) -> Arc<Gate> {
            let gate = Arc::new(Gate::default());
            self.connect_gates.lock().unwrap().push_back(gate.clone());
            gate
        }

        fn gate_next_write(&self) -> Arc<Gate> {
            let gate = Arc::new(Gate::default());
            self.write_gates.lock().unwrap().push_back(gate.clone());
            gate
        }
    }

    struct MockTransport(Arc<MockState>);

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(
            &self,
            device: &LiftDevice,
            max_attempts: u32,
            on_disconnect: DisconnectCallback,
        ) -> Result<Box<dyn LiftConnection>, TransportError> {
            let state = &self.0;
            state.connect_calls.fetch_add(1, Ordering::SeqCst);
            state.attempts_requested.lock().unwrap().push(max_attempts);
            let gate = state.connect_gates.lock().unwrap().pop_front();
            if let Some(gate) = gate {
                gate.pass().await;
            }

            if state.fail_connect.load(Ordering::SeqCst) {
                return Err(TransportError::ConnectFailed {
                    attempts: max_attempts,
                    last_error: format!("{} out of range", device.address),
                });
            }

            let live = state.live.fetch_add(1, Ordering::SeqCst) + 1;
            state.max_live.fetch_max(live, Ordering::SeqCst);

            let connected = Arc::new(AtomicBool::new(true));
            *state.last_link.lock().unwrap() = Some((connected.clone(), on_disconnect));
            Ok(Box::new(MockConnection {
                state: state.clone(),
                connected,
                torn_down: AtomicBool::new(false),
            }))
        }
    }

    struct MockConnection {
        state: Arc<MockState>,
        connected: Arc<AtomicBool>,
        torn_down: AtomicBool,
    }

    #[async_trait]
    impl LiftConnection for MockConnection {
        async fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        async fn write(&self, uuid: Uuid, payload: &[u8]) -> Result<(), TransportError> {
            assert_eq!(uuid, UUID_CONTROL_CHAR);
            let gate = self.state.write_gates.lock().unwrap().pop_front();
            if let Some(gate) = gate {
                gate.pass().await;
            }
            if self.state.fail_write.load(Ordering::SeqCst) {
                return Err(TransportError::Write("GATT error".into()));
            }
            self.state.writes.lock().unwrap().push(payload.to_vec());
            Ok(())
        }

        async fn disconnect(&self) -> Result<(), TransportError> {
            self.connected.store(false, Ordering::SeqCst);
            if !self.torn_down.swap(true, Ordering::SeqCst) {
                self.state.live.fetch_sub(1, Ordering::SeqCst);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingSink(Mutex<Vec<LiftSnapshot>>);

    impl RecordingSink {
        fn published(&self) -> Vec<LiftSnapshot> {
            self.0.lock().unwrap().clone()
        }
    }

    impl StateSink for RecordingSink {
        fn publish(&self, snapshot: LiftSnapshot) {
            self.0.lock().unwrap().push(snapshot);
        }
    }

    struct Harness {
        controller: Arc<LiftController>,
        transport: Arc<MockState>,
        sink: Arc<RecordingSink>,
        shutdown: CancellationToken,
    }

    fn harness(name: &str) -> Harness {
        let transport = Arc::new(MockState::default());
        let sink = Arc::new(RecordingSink::default());
        let shutdown = CancellationToken::new();
        let controller = LiftController::new(
            LiftDevice::new(ADDRESS, name),
            "breagle",
            Arc::new(MockTransport(transport.clone())),
            sink.clone(),
            shutdown.clone(),
        );
        Harness {
            controller: Arc::new(controller),
            transport,
            sink,
            shutdown,
        }
    }

    #[tokio::test]
    async fn repeated_connects_keep_a_single_session() {
        let h = harness("limoss-lift-1");

        for _ in 0..5 {
            h.controller.connect().await.unwrap();
        }

        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 5);
        assert_eq!(h.transport.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.live.load(Ordering::SeqCst), 1);
        assert!(h.controller.is_available());
    }

    #[tokio::test]
    async fn disconnect_without_session_is_a_noop() {
        let h = harness("limoss-lift-1");

        h.controller.disconnect().await;
        h.controller.disconnect().await;

        assert!(h.sink.published().is_empty());
        assert_eq!(h.controller.snapshot(), LiftSnapshot::default());
    }

    #[tokio::test]
    async fn double_teardown_publishes_once() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();

        h.controller.disconnect().await;
        h.controller.disconnect().await;

        let published = h.sink.published();
        assert_eq!(published.len(), 2);
        assert!(!published[1].available);
        assert_eq!(h.transport.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn open_is_optimistic_even_when_the_write_fails() {
        let h = harness("limoss-lift-1");
        h.transport.fail_write.store(true, Ordering::SeqCst);
        h.controller.connect().await.unwrap();

        let sent = h.controller.open().await;

        assert!(!sent);
        assert!(h.controller.is_available());
        assert_eq!(h.controller.is_closed(), Some(false));
        assert!(h.transport.writes().is_empty());
    }

    #[tokio::test]
    async fn close_marks_the_lift_closed() {
        let h = harness("limoss-lift-1");

        assert!(h.controller.close().await);

        assert_eq!(h.controller.is_closed(), Some(true));
        assert_eq!(h.transport.writes(), vec![CLOSE_PAYLOAD.to_vec()]);
    }

    #[tokio::test]
    async fn position_is_unknown_until_a_command_is_sent() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();
        h.controller.poll_refresh().await;

        assert!(h.controller.is_available());
        assert_eq!(h.controller.is_closed(), None);
    }

    #[tokio::test]
    async fn link_drop_flips_availability_once_per_callback() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();
        let before = h.sink.published().len();

        h.transport.drop_link();

        let published = h.sink.published();
        assert_eq!(published.len(), before + 1);
        assert!(!published.last().unwrap().available);

        // a late duplicate is harmless
        h.transport.drop_link();
        let published = h.sink.published();
        assert_eq!(published.len(), before + 2);
        assert!(!published.last().unwrap().available);
    }

    #[tokio::test]
    async fn send_command_connects_first_when_unavailable() {
        let h = harness("limoss-lift-1");

        assert!(h.controller.send_command(&OPEN_PAYLOAD).await);

        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.writes(), vec![OPEN_PAYLOAD.to_vec()]);
        assert!(h.controller.is_available());
    }

    #[tokio::test]
    async fn send_command_reports_failure_when_connect_fails() {
        let h = harness("limoss-lift-1");
        h.transport.fail_connect.store(true, Ordering::SeqCst);

        assert!(!h.controller.send_command(&OPEN_PAYLOAD).await);

        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 1);
        assert!(h.transport.writes().is_empty());
        assert!(!h.controller.is_available());
    }

    #[tokio::test]
    async fn send_command_reuses_a_live_session() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();

        assert!(h.controller.send_command(&CLOSE_PAYLOAD).await);
        assert!(h.controller.send_command(&OPEN_PAYLOAD).await);

        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn model_comes_from_the_advertised_name() {
        let lift = harness("limoss-lift-1");
        assert_eq!(lift.controller.model(), LiftModel::Breagle);
        assert_eq!(lift.controller.unique_id(), ADDRESS);
        assert_eq!(lift.controller.device_info().model, "Breagle");
        assert_eq!(
            lift.controller.supported_features(),
            &[LiftCommand::Open, LiftCommand::Close]
        );

        let other = harness("other-device");
        assert_eq!(other.controller.model(), LiftModel::Unknown);
        assert_eq!(other.controller.device_info().model, "Unknown");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn parked_write_holds_off_other_commands_and_connects() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();
        let close_gate = h.transport.gate_next_write();
        let open_gate = h.transport.gate_next_write();

        let closing = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.close().await }
        });
        close_gate.entered.notified().await;

        let opening = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.open().await }
        });
        let reconnecting = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.connect().await }
        });
        tokio::time::sleep(Duration::from_millis(50)).await;

        // both are queued behind the parked close
        assert!(h.transport.writes().is_empty());
        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 1);
        assert_eq!(h.controller.is_closed(), None);

        close_gate.release.notify_one();
        timeout(Duration::from_secs(5), open_gate.entered.notified())
            .await
            .expect("open never reached its write");
        // the close was recorded before the lock was handed on
        assert_eq!(h.controller.is_closed(), Some(true));
        open_gate.release.notify_one();

        let (closed, opened, reconnected) = timeout(Duration::from_secs(5), async {
            (
                closing.await.unwrap(),
                opening.await.unwrap(),
                reconnecting.await.unwrap(),
            )
        })
        .await
        .expect("commands deadlocked");

        assert!(closed);
        assert!(opened);
        reconnected.unwrap();
        assert_eq!(
            h.transport.writes(),
            vec![CLOSE_PAYLOAD.to_vec(), OPEN_PAYLOAD.to_vec()]
        );
        assert_eq!(h.transport.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.live.load(Ordering::SeqCst), 1);
        assert_eq!(
            h.controller.snapshot(),
            LiftSnapshot { available: true, is_closed: Some(false) }
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn link_drop_during_a_parked_connect_is_harmless() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();
        let gate = h.transport.gate_next_connect();

        let reconnecting = tokio::spawn({
            let controller = h.controller.clone();
            async move { controller.connect().await }
        });
        gate.entered.notified().await;

        // the old session's callback fires from another task mid-connect
        let transport = h.transport.clone();
        let callback = tokio::spawn(async move { transport.drop_link() });
        timeout(Duration::from_secs(5), callback)
            .await
            .expect("callback blocked on the session lock")
            .unwrap();
        assert!(!h.controller.is_available());

        gate.release.notify_one();
        timeout(Duration::from_secs(5), reconnecting)
            .await
            .expect("connect deadlocked")
            .unwrap()
            .unwrap();

        let snapshot = h.controller.snapshot();
        let live = h.transport.live.load(Ordering::SeqCst);
        assert!(snapshot.available, "{snapshot:?}");
        assert_eq!(live, 1);
        assert_eq!(h.transport.max_live.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.sink.published().last(), Some(&snapshot));
    }

    #[tokio::test]
    async fn failed_startup_leaves_the_lift_unavailable() {
        let h = harness("limoss-lift-1");
        h.transport.fail_connect.store(true, Ordering::SeqCst);

        let listener = h.controller.start().await;

        assert!(!h.controller.is_available());
        assert_eq!(*h.transport.attempts_requested.lock().unwrap(), vec![4]);
        // the initial snapshot is still published
        assert_eq!(h.sink.published(), vec![LiftSnapshot::default()]);

        h.shutdown.cancel();
        listener.await.unwrap();
        assert!(!h.controller.is_available());
    }

    #[tokio::test]
    async fn close_then_open_writes_both_payloads_in_order() {
        let h = harness("limoss-lift-1");

        h.controller.close().await;
        h.controller.open().await;

        assert_eq!(h.controller.is_closed(), Some(false));
        assert_eq!(
            h.transport.writes(),
            vec![CLOSE_PAYLOAD.to_vec(), OPEN_PAYLOAD.to_vec()]
        );
    }

    #[tokio::test]
    async fn shutdown_tears_the_session_down() {
        let h = harness("limoss-lift-1");
        let listener = h.controller.start().await;
        assert!(h.controller.is_available());

        h.shutdown.cancel();
        listener.await.unwrap();

        assert!(!h.controller.is_available());
        assert_eq!(h.transport.live.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn refresh_reconnects_after_a_link_drop() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();
        h.transport.drop_link();

        h.controller.poll_refresh().await;

        assert!(h.controller.is_available());
        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 2);
        assert_eq!(h.transport.live.load(Ordering::SeqCst), 1);
        assert_eq!(h.transport.max_live.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn refresh_does_nothing_while_available() {
        let h = harness("limoss-lift-1");
        h.controller.connect().await.unwrap();

        h.controller.poll_refresh().await;

        assert_eq!(h.transport.connect_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn polling_stops_on_shutdown() {
        let h = harness("limoss-lift-1");
        let poller = h.controller.spawn_polling(Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(h.controller.is_available());

        h.shutdown.cancel();
        poller.await.unwrap();
    }

    #[tokio::test]
    async fn watch_sender_is_a_state_sink() {
        let (tx, rx) = watch::channel(LiftSnapshot::default());
        let controller = LiftController::new(
            LiftDevice::new(ADDRESS, "limoss-lift-1"),
            "breagle",
            Arc::new(MockTransport(Arc::new(MockState::default()))),
            Arc::new(tx),
            CancellationToken::new(),
        );

        controller.close().await;

        assert_eq!(
            *rx.borrow(),
            LiftSnapshot { available: true, is_closed: Some(true) }
        );
    }
}
