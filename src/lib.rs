//! # ECU Node Simulator
//!
//! A vehicle ECU emulator that publishes synthetic CAN bus telemetry
//! (engine speed, vehicle speed, coolant temperature, fuel level,
//! battery voltage) to an MQTT broker. It stands in for real hardware
//! while integration-testing downstream consumers of vehicle-bus
//! telemetry.
//!
//! ## Features
//!
//! - **Plausible signal traces**: bounded random walks per signal, so
//!   consecutive samples drift smoothly inside realistic ranges
//! - **Connection supervision**: broker connectivity tracked from the
//!   MQTT event stream and reflected into a single flag
//! - **Gated publish loop**: fixed cadence while connected, backoff
//!   while the broker is away, cooperative shutdown
//! - **CAN-style payloads**: 8-byte frames with the classic encodings
//!   (big-endian rpm, offset coolant temperature), JSON on the wire
//!
//! ## Quick Start
//!
//! ```rust
//! use ecusim::{FrameGenerator, NodeConfig, SignalKind};
//!
//! let config = NodeConfig::default();
//! let mut generator = FrameGenerator::new(&config);
//!
//! let frame = generator.next(SignalKind::EngineSpeed);
//! assert_eq!(frame.dlc, 8);
//! ```
//!
//! ## Architecture
//!
//! - [`signals`] - signal catalogue, step arithmetic, payload codec
//! - [`generator`] - per-node random-walk state and frame packaging
//! - [`connection`] - broker connection supervision and the sink seam
//! - [`simulator`] - the publish-loop orchestrator
//! - [`config`] / [`error`] - node identity and the error taxonomy

pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod generator;
pub mod signals;
pub mod simulator;

// Re-export the main public types for convenience
pub use config::{NodeConfig, FRAME_TOPIC};
pub use connection::{ConnectionSupervisor, FrameSink};
pub use error::SimulatorError;
pub use frame::CanFrame;
pub use generator::FrameGenerator;
pub use signals::SignalKind;
pub use simulator::{LoopState, NodeSimulator, SimulatorStats};
