use crate::config::NodeConfig;
use crate::frame::CanFrame;
use crate::signals::SignalKind;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Produces the next plausible value for each tracked signal and
/// packages it as a `CanFrame`.
///
/// Each signal follows a bounded random walk: every call draws a
/// perturbation from the signal's declared step range, applies it to
/// the stored value, and saturates at the declared bounds. Consecutive
/// samples therefore never jump by more than the step bound, which
/// keeps downstream trend-detection consumers looking at realistic
/// traces instead of noise.
#[derive(Debug)]
pub struct FrameGenerator {
    node_id: u16,
    with_date: bool,
    values: [i32; SignalKind::COUNT],
    rng: StdRng,
}

impl FrameGenerator {
    pub fn new(config: &NodeConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic construction for tests.
    pub fn with_seed(config: &NodeConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: &NodeConfig, rng: StdRng) -> Self {
        let mut values = [0; SignalKind::COUNT];
        for kind in SignalKind::ALL {
            values[kind as usize] = kind.spec().initial;
        }
        Self {
            node_id: config.node_id,
            with_date: config.with_date,
            values,
            rng,
        }
    }

    /// Draws one perturbation for `kind` and returns the resulting
    /// frame. The stored value advances; nothing else changes.
    pub fn next(&mut self, kind: SignalKind) -> CanFrame {
        let spec = kind.spec();
        let delta = self.rng.gen_range(spec.step_down..=spec.step_up);
        self.step(kind, delta)
    }

    /// Applies a fixed perturbation instead of drawing one. `next`
    /// routes through here; scenario tests call it directly to force
    /// worst-case draws.
    pub fn step(&mut self, kind: SignalKind, delta: i32) -> CanFrame {
        let value = kind.apply_step(self.values[kind as usize], delta);
        self.values[kind as usize] = value;
        CanFrame::new(self.node_id, kind.can_id(), kind.encode(value), self.with_date)
    }

    pub fn value(&self, kind: SignalKind) -> i32 {
        self.values[kind as usize]
    }

    /// Seeds a signal's stored value, clamped to its declared range.
    pub fn set_value(&mut self, kind: SignalKind, value: i32) {
        self.values[kind as usize] = kind.apply_step(value, 0);
    }
}
