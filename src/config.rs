/// MQTT topic every node publishes frames on.
pub const FRAME_TOPIC: &str = "can/frames";

pub const DEFAULT_NODE_ID: u16 = 1;
pub const DEFAULT_BROKER_HOST: &str = "localhost";
pub const DEFAULT_BROKER_PORT: u16 = 1883;
pub const DEFAULT_FREQUENCY_HZ: f64 = 10.0;

/// Immutable per-process node identity, fixed at startup. Every piece
/// of signal and connection state hangs off one `NodeConfig` instance,
/// so several simulated nodes can run in one process without sharing
/// anything.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub node_id: u16,
    pub broker_host: String,
    pub broker_port: u16,
    /// Target publish cadence; one cycle emits every signal once.
    pub frequency_hz: f64,
    /// MQTT publish quality of service, 0 or 1.
    pub qos: u8,
    /// Include the DD/MM/YYYY `date` field in the payload.
    pub with_date: bool,
}

impl NodeConfig {
    pub fn client_id(&self) -> String {
        format!("ecu-node-{}", self.node_id)
    }

    pub fn cycle_period(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(1.0 / self.frequency_hz)
    }
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            node_id: DEFAULT_NODE_ID,
            broker_host: DEFAULT_BROKER_HOST.to_string(),
            broker_port: DEFAULT_BROKER_PORT,
            frequency_hz: DEFAULT_FREQUENCY_HZ,
            qos: 0,
            with_date: false,
        }
    }
}
