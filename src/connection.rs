use crate::config::{NodeConfig, FRAME_TOPIC};
use crate::error::SimulatorError;
use crate::frame::CanFrame;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, warn};

pub const MQTT_KEEPALIVE: Duration = Duration::from_secs(60);
const CONNECT_POLL_INTERVAL: Duration = Duration::from_millis(100);
const EVENT_ERROR_BACKOFF: Duration = Duration::from_secs(1);
const EVENT_CHANNEL_CAPACITY: usize = 10;

/// Where the publish loop hands frames off. The broker-backed
/// implementation lives below; tests substitute a recording fake.
#[allow(async_fn_in_trait)]
pub trait FrameSink {
    /// Non-blocking connectivity read, safe to call every cycle.
    fn is_connected(&self) -> bool;

    /// Best-effort, at-most-once transmission of one frame.
    async fn publish(&mut self, frame: &CanFrame) -> Result<(), SimulatorError>;

    /// Tears the transport down. Idempotent.
    async fn disconnect(&mut self);
}

/// Supervises the broker connection: owns the MQTT client, runs its
/// event loop on a background task, and reflects transport state into
/// a single flag.
///
/// The event task is the only writer of the flag; the publish loop
/// only ever reads it. No other state crosses the two contexts apart
/// from the startup error slot consumed by `connect`.
pub struct ConnectionSupervisor {
    client: AsyncClient,
    connected: Arc<AtomicBool>,
    qos: QoS,
    event_task: JoinHandle<()>,
    closed: bool,
}

impl ConnectionSupervisor {
    /// Initiates the connection and blocks until the connectivity flag
    /// comes up or `timeout` elapses. A transport-level failure during
    /// the attempt surfaces as `ConnectionError`; silence surfaces as
    /// `ConnectionTimeout`. Retry-or-abort is the caller's decision.
    pub async fn connect(config: &NodeConfig, timeout: Duration) -> Result<Self, SimulatorError> {
        let mut options = MqttOptions::new(
            config.client_id(),
            config.broker_host.clone(),
            config.broker_port,
        );
        options.set_keep_alive(MQTT_KEEPALIVE);

        let (client, event_loop) = AsyncClient::new(options, EVENT_CHANNEL_CAPACITY);
        let connected = Arc::new(AtomicBool::new(false));
        let connect_error = Arc::new(Mutex::new(None));
        let event_task = tokio::spawn(supervise_events(
            event_loop,
            Arc::clone(&connected),
            Arc::clone(&connect_error),
        ));

        let supervisor = Self {
            client,
            connected,
            qos: publish_qos(config.qos),
            event_task,
            closed: false,
        };
        wait_for_connection(&supervisor.connected, &connect_error, timeout).await?;
        Ok(supervisor)
    }
}

impl FrameSink for ConnectionSupervisor {
    fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    async fn publish(&mut self, frame: &CanFrame) -> Result<(), SimulatorError> {
        let payload =
            serde_json::to_vec(frame).map_err(|e| SimulatorError::PublishFailure(e.to_string()))?;
        self.client
            .publish(FRAME_TOPIC, self.qos, false, payload)
            .await
            .map_err(|e| SimulatorError::PublishFailure(e.to_string()))
    }

    async fn disconnect(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = self.client.disconnect().await {
            debug!("disconnect request not delivered: {e}");
        }
        self.event_task.abort();
        self.connected.store(false, Ordering::SeqCst);
        info!("broker connection closed");
    }
}

impl Drop for ConnectionSupervisor {
    fn drop(&mut self) {
        // Halts the event task when startup fails before the
        // supervisor is handed to the publish loop.
        self.event_task.abort();
    }
}

/// Background half of the controller: drives the rumqttc event loop
/// and mirrors transport transitions into the shared flag.
async fn supervise_events(
    mut event_loop: EventLoop,
    connected: Arc<AtomicBool>,
    connect_error: Arc<Mutex<Option<String>>>,
) {
    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(_))) => {
                connected.store(true, Ordering::SeqCst);
                info!("broker connection established");
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                connected.store(false, Ordering::SeqCst);
                warn!("broker requested disconnect");
            }
            Ok(_) => {}
            Err(e) => {
                if connected.swap(false, Ordering::SeqCst) {
                    warn!("broker connection lost: {e}");
                } else if let Ok(mut slot) = connect_error.lock() {
                    slot.get_or_insert_with(|| e.to_string());
                }
                sleep(EVENT_ERROR_BACKOFF).await;
            }
        }
    }
}

/// Polls the connectivity flag until it comes up, an attempt error is
/// recorded, or the deadline passes.
async fn wait_for_connection(
    connected: &AtomicBool,
    connect_error: &Mutex<Option<String>>,
    timeout: Duration,
) -> Result<(), SimulatorError> {
    let deadline = Instant::now() + timeout;
    loop {
        if connected.load(Ordering::SeqCst) {
            return Ok(());
        }
        if let Ok(mut slot) = connect_error.lock() {
            if let Some(reason) = slot.take() {
                return Err(SimulatorError::ConnectionError(reason));
            }
        }
        if Instant::now() >= deadline {
            return Err(SimulatorError::ConnectionTimeout(timeout));
        }
        sleep(CONNECT_POLL_INTERVAL).await;
    }
}

fn publish_qos(qos: u8) -> QoS {
    match qos {
        1 => QoS::AtLeastOnce,
        _ => QoS::AtMostOnce,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_wait_times_out_when_flag_never_rises() {
        let connected = AtomicBool::new(false);
        let connect_error = Mutex::new(None);

        let result =
            wait_for_connection(&connected, &connect_error, Duration::from_secs(2)).await;
        assert!(matches!(result, Err(SimulatorError::ConnectionTimeout(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_returns_once_flag_rises() {
        let connected = Arc::new(AtomicBool::new(false));
        let connect_error = Mutex::new(None);

        let setter = Arc::clone(&connected);
        tokio::spawn(async move {
            sleep(Duration::from_millis(350)).await;
            setter.store(true, Ordering::SeqCst);
        });

        let started = Instant::now();
        let result =
            wait_for_connection(&connected, &connect_error, Duration::from_secs(5)).await;
        assert!(result.is_ok());
        assert!(started.elapsed() >= Duration::from_millis(350));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_surfaces_transport_failure() {
        let connected = AtomicBool::new(false);
        let connect_error = Mutex::new(Some("connection refused".to_string()));

        let result =
            wait_for_connection(&connected, &connect_error, Duration::from_secs(5)).await;
        match result {
            Err(SimulatorError::ConnectionError(reason)) => {
                assert!(reason.contains("refused"));
            }
            other => panic!("expected ConnectionError, got {other:?}"),
        }
    }

    #[test]
    fn test_qos_mapping_defaults_to_at_most_once() {
        assert_eq!(publish_qos(0), QoS::AtMostOnce);
        assert_eq!(publish_qos(1), QoS::AtLeastOnce);
        assert_eq!(publish_qos(7), QoS::AtMostOnce);
    }
}
