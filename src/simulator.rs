use crate::config::NodeConfig;
use crate::connection::FrameSink;
use crate::generator::FrameGenerator;
use crate::signals::SignalKind;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

/// Pause before re-checking connectivity while the broker is away.
/// Replaces the publish cycle rather than adding to it.
const RECONNECT_BACKOFF: Duration = Duration::from_secs(1);
/// Spacing between the per-signal publishes of one cycle, so the five
/// frames do not land as an instantaneous burst.
const INTER_FRAME_DELAY: Duration = Duration::from_millis(10);
/// Cadence of the cumulative frame-count report.
const REPORT_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SimulatorStats {
    pub frames_published: u64,
    pub publish_failures: u64,
    pub cycles_completed: u64,
    pub wait_intervals: u64,
}

/// Orchestrates one simulated node: on a fixed cadence, asks the frame
/// generator for every tracked signal and forwards the frames to the
/// sink, gated on connectivity.
///
/// Publication is best-effort and at-most-once. A failed publish is
/// reported and the loop moves on; a lost connection suspends
/// publication until the sink reports connectivity again.
pub struct NodeSimulator<S> {
    config: NodeConfig,
    generator: FrameGenerator,
    sink: S,
    state: LoopState,
    running: Arc<AtomicBool>,
    stats: SimulatorStats,
}

impl<S: FrameSink> NodeSimulator<S> {
    pub fn new(config: NodeConfig, sink: S) -> Self {
        let generator = FrameGenerator::new(&config);
        Self::with_generator(config, generator, sink)
    }

    pub fn with_generator(config: NodeConfig, generator: FrameGenerator, sink: S) -> Self {
        Self {
            config,
            generator,
            sink,
            state: LoopState::Idle,
            running: Arc::new(AtomicBool::new(true)),
            stats: SimulatorStats::default(),
        }
    }

    /// Shared stop flag. Clearing it from any task stops the loop at
    /// the next iteration boundary; the in-flight cycle completes
    /// first.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn stats(&self) -> &SimulatorStats {
        &self.stats
    }

    /// Runs until the stop flag clears, then tears the sink down and
    /// parks in `Stopped`.
    pub async fn run(&mut self) {
        self.state = LoopState::Running;
        info!(
            node_id = self.config.node_id,
            frequency_hz = self.config.frequency_hz,
            "node simulator running"
        );

        let period = self.config.cycle_period();
        let mut last_report = Instant::now();

        while self.running.load(Ordering::SeqCst) {
            if !self.sink.is_connected() {
                self.stats.wait_intervals += 1;
                info!("broker unavailable, publication suspended");
                sleep(RECONNECT_BACKOFF).await;
                continue;
            }

            let cycle_start = Instant::now();
            for kind in SignalKind::ALL {
                let frame = self.generator.next(kind);
                match self.sink.publish(&frame).await {
                    Ok(()) => self.stats.frames_published += 1,
                    Err(e) => {
                        self.stats.publish_failures += 1;
                        warn!(signal = kind.name(), "publish failed: {e}");
                    }
                }
                sleep(INTER_FRAME_DELAY).await;
            }
            self.stats.cycles_completed += 1;

            if last_report.elapsed() >= REPORT_INTERVAL {
                info!(
                    frames = self.stats.frames_published,
                    failures = self.stats.publish_failures,
                    "cumulative frames published"
                );
                last_report = Instant::now();
            }

            let elapsed = cycle_start.elapsed();
            if elapsed < period {
                sleep(period - elapsed).await;
            }
        }

        self.state = LoopState::Stopping;
        info!("stop requested, closing broker connection");
        self.sink.disconnect().await;
        self.state = LoopState::Stopped;
        info!(
            frames = self.stats.frames_published,
            cycles = self.stats.cycles_completed,
            "node simulator stopped"
        );
    }
}
