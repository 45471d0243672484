//! Traceprint - passive behavioral-biometrics engine for interaction fingerprints
//!
//! Traceprint observes raw input events (keystrokes, pointer movement,
//! clicks, scrolling, focus and visibility transitions) for the lifetime of
//! a page, keeps bounded in-memory buffers of recent activity, and reduces
//! them on demand into a compact statistical fingerprint for a downstream
//! fraud/bot-detection service: event capture → bounded buffers → pattern
//! analysis → fingerprint emission.
//!
//! The engine is advisory telemetry: handlers never fail, analysis returns
//! defined defaults on insufficient data, and emission degrades rather than
//! ever blocking the form submission it rides along with. Nothing is
//! persisted; buffers live in memory and die with the page.
//!
//! ## Example
//!
//! ```
//! use traceprint::{BehaviorEngine, EngineConfig, FormSubmission, RawInputEvent};
//!
//! let mut engine = BehaviorEngine::new(EngineConfig::default()).unwrap();
//!
//! // The host forwards its input events as they happen.
//! engine.process_event(RawInputEvent::PointerMove {
//!     x: Some(120.0),
//!     y: Some(48.0),
//! });
//!
//! // At submission time the fingerprint rides along as a hidden field.
//! let mut submission = FormSubmission::new();
//! engine.handle_submit(&mut submission);
//! assert!(submission.field(traceprint::BEHAVIORAL_DATA_FIELD).is_some());
//! ```

pub mod analysis;
pub mod buffer;
pub mod capture;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod types;

pub use capture::{CaptureState, RawInputEvent};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use engine::{BehaviorEngine, EnginePhase};
pub use error::EngineError;
pub use fingerprint::{FingerprintEncoder, FormField, FormSubmission, BEHAVIORAL_DATA_FIELD};
pub use types::{
    BehaviorFingerprint, DeviceClass, Modifiers, PointerButton, Smoothness, TargetKind,
    TypingRhythm, Visibility,
};

/// Engine version embedded in every fingerprint
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for fingerprint payloads
pub const PRODUCER_NAME: &str = "traceprint";
