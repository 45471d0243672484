//! Core types for the Traceprint engine
//!
//! This module defines the data that flows through each stage of the engine:
//! normalized event records, classification enums, and the emitted
//! fingerprint payload.

use crate::error::EngineError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Modifier keys held during a keystroke.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
}

/// Kind of element an event targeted.
///
/// Only text inputs and text areas qualify for focus-time accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetKind {
    TextInput,
    TextArea,
    Button,
    Link,
    #[default]
    Other,
}

impl TargetKind {
    /// Whether focus on this target counts toward accumulated focus time.
    pub fn is_qualifying(&self) -> bool {
        matches!(self, TargetKind::TextInput | TargetKind::TextArea)
    }
}

/// Pointer button that produced a click.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    #[default]
    Primary,
    Auxiliary,
    Secondary,
    Other,
}

/// Page visibility as last reported by the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
}

/// One captured key-down, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeystrokeEvent {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub key_code: u32,
    pub modifiers: Modifiers,
}

/// One stored pointer position.
///
/// Samples pass a time-based admission gate before storage, so consecutive
/// stored samples are always at least the sampling interval apart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerSample {
    pub x: f64,
    pub y: f64,
    pub timestamp: DateTime<Utc>,
}

/// One captured click.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub x: f64,
    pub y: f64,
    pub timestamp: DateTime<Utc>,
    pub target: TargetKind,
    pub button: PointerButton,
}

/// One captured scroll position change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScrollEvent {
    pub offset: f64,
    pub timestamp: DateTime<Utc>,
}

/// Classification of inter-keystroke pause variance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypingRhythm {
    InsufficientData,
    VeryConsistent,
    Consistent,
    Variable,
    HighlyVariable,
}

/// Classification of pointer-trajectory smoothness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Smoothness {
    InsufficientData,
    Smooth,
    Erratic,
}

/// Device class inferred from the user-agent string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceClass {
    Tablet,
    Mobile,
    Desktop,
}

/// Geometric summary of a pointer trajectory.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerPattern {
    /// Mean Euclidean step distance between consecutive samples
    pub avg_movement_distance: f64,
    /// Share of heading changes exceeding the sharp-turn threshold
    pub sharp_turn_ratio: f64,
    pub smoothness: Smoothness,
}

impl PointerPattern {
    /// Zeroed statistics for an undersized trajectory.
    pub fn insufficient() -> Self {
        Self {
            avg_movement_distance: 0.0,
            sharp_turn_ratio: 0.0,
            smoothness: Smoothness::InsufficientData,
        }
    }
}

/// Producer metadata stamped into every fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Typing statistics of the fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypingSummary {
    /// Rolling words-per-minute estimate; 0 until enough keystrokes arrive
    pub speed_wpm: f64,
    /// Mean inter-keystroke pause (ms); 0 when no pauses were captured
    pub average_pause_ms: f64,
    pub rhythm: TypingRhythm,
    /// Running keystroke total for the session, unaffected by buffer trims
    pub keystroke_count: u64,
}

/// Pointer statistics of the fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointerSummary {
    pub avg_movement_distance: f64,
    pub sharp_turn_ratio: f64,
    pub smoothness: Smoothness,
    /// Stored (gated) samples currently buffered
    pub sample_count: u64,
    /// Running click total for the session
    pub click_count: u64,
    /// Running scroll total for the session
    pub scroll_count: u64,
}

/// Session-level statistics of the fingerprint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub duration_ms: i64,
    /// Accumulated qualifying-field focus time, including any span still open
    pub focus_ms: i64,
    /// Heuristic focus estimate in [0, 100]
    pub focus_pct: f64,
    pub tab_switch_count: u32,
    pub visibility: Visibility,
}

/// The emitted behavioral fingerprint.
///
/// Produced fresh on every emission from the current buffers and counters,
/// never cached. All numeric fields are finite on every path; undersized
/// inputs show up as `insufficient_data` classifications with zeroed
/// statistics rather than NaN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BehaviorFingerprint {
    pub producer: FingerprintProducer,
    pub captured_at_utc: String,
    pub device_class: DeviceClass,
    pub typing: TypingSummary,
    pub pointer: PointerSummary,
    pub session: SessionSummary,
}

impl BehaviorFingerprint {
    /// Serialize to the wire JSON carried under the hidden form field.
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(EngineError::from)
    }

    /// Parse a previously emitted fingerprint.
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::from)
    }
}
