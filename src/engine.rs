//! Engine orchestration
//!
//! The long-lived engine object a host wires to its input-event source. It
//! dispatches raw events to capture, exposes the fingerprint accessor and
//! the form-submission side effect, and owns the Tracking → Stopped
//! lifecycle. One engine per page/session; the host constructs it at
//! application start and threads it to whatever registers event listeners.

use crate::capture::{CaptureState, RawInputEvent};
use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::fingerprint::{FingerprintEncoder, FormSubmission};
use crate::types::BehaviorFingerprint;
use tracing::debug;

/// Lifecycle phase of the engine.
///
/// Tracking is the default and only steady state. Stopped ends capture;
/// emission keeps reflecting the last-known buffers. `reset` returns to
/// Tracking with cleared data from either phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePhase {
    Tracking,
    Stopped,
}

/// Passive behavioral-telemetry engine.
///
/// All event handling runs to completion on the calling thread; there is no
/// locking, no async, and no timer. The only time-based policy is the
/// pointer sampling gate, a comparison against a stored timestamp.
pub struct BehaviorEngine {
    config: EngineConfig,
    clock: Box<dyn Clock>,
    state: CaptureState,
    encoder: FingerprintEncoder,
    phase: EnginePhase,
}

impl BehaviorEngine {
    /// Create an engine on the system clock.
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        Self::with_clock(config, Box::new(SystemClock))
    }

    /// Create an engine with an injected time source.
    pub fn with_clock(config: EngineConfig, clock: Box<dyn Clock>) -> Result<Self, EngineError> {
        config.validate()?;
        let session_start = clock.now();
        Ok(Self {
            state: CaptureState::new(&config, session_start),
            encoder: FingerprintEncoder::new(),
            config,
            clock,
            phase: EnginePhase::Tracking,
        })
    }

    pub fn phase(&self) -> EnginePhase {
        self.phase
    }

    pub fn is_tracking(&self) -> bool {
        self.phase == EnginePhase::Tracking
    }

    /// Producer instance ID stamped into every fingerprint.
    pub fn instance_id(&self) -> &str {
        self.encoder.instance_id()
    }

    /// Read access to the capture state, for diagnostics and tests.
    pub fn capture_state(&self) -> &CaptureState {
        &self.state
    }

    /// Feed one raw host event. O(1) work; ignored once stopped.
    pub fn process_event(&mut self, event: RawInputEvent) {
        if self.phase == EnginePhase::Stopped {
            return;
        }
        let now = self.clock.now();
        self.state.handle(event, now, &self.config);
    }

    /// Current fingerprint as plain data, for callers attaching it to an
    /// out-of-band request. Pure read over the current state.
    pub fn current_fingerprint(&self) -> BehaviorFingerprint {
        self.encoder.build(&self.state, &self.config, self.clock.now())
    }

    /// Current fingerprint serialized; degrades to `{}` rather than failing.
    pub fn fingerprint_json(&self) -> String {
        self.encoder.encode_to_json(&self.current_fingerprint())
    }

    /// Attach the fingerprint to an outgoing submission. Works in both
    /// phases; a stopped engine still reflects its last-known buffers.
    pub fn handle_submit(&self, submission: &mut FormSubmission) {
        self.encoder
            .attach(&self.state, &self.config, self.clock.now(), submission);
    }

    /// Clear all buffers and counters and return to Tracking, for reuse
    /// across logical sessions within one page.
    pub fn reset(&mut self) {
        let now = self.clock.now();
        self.state.clear(now);
        self.phase = EnginePhase::Tracking;
        debug!("engine reset, session restarted");
    }

    /// End capture. Terminal for event processing; emission and `reset`
    /// remain available.
    pub fn stop(&mut self) {
        self.phase = EnginePhase::Stopped;
        debug!("engine stopped, capture detached");
    }
}
